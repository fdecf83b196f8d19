use crate::ParseOptions;
use crate::ast::{Block, Inlines, map_blocks};
use crate::block::parse_blocks;
use crate::error::CompileError;
use crate::inline::{InlineContext, parse_inlines};
use crate::metadata::{Metadata, extract_metadata};
use crate::refs::ReferenceTable;
use crate::render::{Rendered, render_document, render_label};
use crate::toc::{AnchorSet, TocEntry, build_toc};

/// Tab stops used by `expand_spaces_to_tabs`.
const TAB_WIDTH: usize = 4;

/// Names one of the rendered text outputs of a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Output {
    Html,
    Css,
    TableOfContents,
}

/// A compiled Markdown document.
///
/// Everything is computed once by [`Document::compile`]; the accessors are
/// plain reads, so a document can be shared freely across threads.
#[derive(Clone, Debug)]
pub struct Document {
    options: ParseOptions,
    metadata: Metadata,
    blocks: Vec<Block>,
    footnotes: Vec<Block>,
    references: ReferenceTable,
    html: String,
    css: String,
    toc: Option<String>,
}

/// Compiles `source` with `options`. See [`Document::compile`].
pub fn compile(source: &str, options: ParseOptions) -> Result<Document, CompileError> {
    Document::compile(source, options)
}

/// Renders `source` straight to HTML. A source with nothing to compile
/// yields an empty string.
pub fn to_html(source: &str, options: ParseOptions) -> String {
    compile(source, options)
        .map(|doc| doc.html)
        .unwrap_or_default()
}

impl Document {
    /// Runs the whole pipeline: metadata, blocks, inlines, anchors,
    /// footnotes, HTML and CSS, and the table of contents when requested.
    ///
    /// Fails only when `source` holds nothing but whitespace. Malformed
    /// markup never fails; it comes out as literal text.
    pub fn compile(source: &str, options: ParseOptions) -> Result<Self, CompileError> {
        if source.trim().is_empty() {
            return Err(CompileError::Empty);
        }

        let expanded;
        let source = if options.expand_spaces_to_tabs && source.contains('\t') {
            expanded = expand_tabs(source);
            expanded.as_str()
        } else {
            source
        };

        let (metadata, body) = extract_metadata(source);
        if !metadata.is_empty() {
            log::debug!("metadata header: {metadata:?}");
        }

        let (raw_blocks, references) = parse_blocks(body, &options);
        log::debug!(
            "assembled {} top-level blocks, {} link references, {} footnote definitions",
            raw_blocks.len(),
            references.links_len(),
            references.footnotes_len()
        );

        let mut ctx = InlineContext::new(&references, options);
        let mut blocks = map_blocks(raw_blocks, &mut |raw: String| parse_inlines(&raw, &mut ctx));

        // footnote bodies may reference further footnotes
        let mut footnotes = Vec::new();
        while footnotes.len() < ctx.footnotes.len() {
            let number = footnotes.len() + 1;
            let label = ctx.footnotes[number - 1].clone();
            let body = references
                .footnote(&label)
                .map(<[_]>::to_vec)
                .unwrap_or_default();
            let children = map_blocks(body, &mut |raw: String| parse_inlines(&raw, &mut ctx));
            footnotes.push(Block::FootnoteDefinition {
                label,
                number,
                children,
            });
        }
        if !footnotes.is_empty() {
            log::debug!("{} footnotes referenced", footnotes.len());
        }

        let toc = options.generate_table_of_contents.then(|| {
            let mut anchors = AnchorSet::default();
            let mut entries = Vec::new();
            for block in &mut blocks {
                block.for_each_heading_mut(&mut |level: u8, content: &Inlines, anchor: &mut Option<String>| {
                    let id = anchors.assign(content);
                    entries.push(TocEntry {
                        level,
                        anchor: id.clone(),
                        label: render_label(content, &options),
                    });
                    *anchor = Some(id);
                });
            }
            log::debug!("{} headings in table of contents", entries.len());
            entries
        });

        let Rendered { html, css } = render_document(&blocks, &footnotes, &options);

        Ok(Self {
            options,
            metadata,
            blocks,
            footnotes,
            references,
            html,
            css,
            toc: toc.map(|entries| build_toc(&entries)),
        })
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// The contents of every `<style>` block, in document order, each
    /// followed by a newline.
    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.metadata.author.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.metadata.date.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The nested `<ul>` table of contents.
    ///
    /// Empty, with a logged warning, when the document was compiled without
    /// `generate_table_of_contents`.
    pub fn table_of_contents(&self) -> &str {
        match &self.toc {
            Some(toc) => toc,
            None => {
                log::warn!(
                    "table of contents requested from a document compiled without generateTableOfContents"
                );
                ""
            }
        }
    }

    pub fn output(&self, which: Output) -> &str {
        match which {
            Output::Html => self.html(),
            Output::Css => self.css(),
            Output::TableOfContents => self.table_of_contents(),
        }
    }

    /// The resolved block tree of the main flow.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Referenced footnotes in numbering order, as
    /// [`Block::FootnoteDefinition`]s.
    pub fn footnotes(&self) -> &[Block] {
        &self.footnotes
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }
}

/// Replaces each tab with spaces up to the next tab stop.
fn expand_tabs(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    let mut col = 0;
    for c in source.chars() {
        match c {
            '\t' => {
                let width = TAB_WIDTH - col % TAB_WIDTH;
                out.extend(std::iter::repeat_n(' ', width));
                col += width;
            }
            '\n' => {
                out.push('\n');
                col = 0;
            }
            c => {
                out.push(c);
                col += 1;
            }
        }
    }
    out
}
