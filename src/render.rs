use crate::ParseOptions;
use crate::ast::{Block, DefinitionItem, Inline, ListKind, TableAlignment};
use crate::html::{encode_url_escaped_into, escape_html_into, is_safe_url, push_cdata};
use std::fmt::Write;

/// The two output streams of one render.
#[derive(Debug, Default)]
pub(crate) struct Rendered {
    pub html: String,
    pub css: String,
}

/// How inline markup is written.
#[derive(Clone, Copy, PartialEq, Eq)]
enum InlineMode {
    Body,
    /// Inside a table-of-contents entry: no nested links, no footnote marks.
    Label,
}

enum Work<'a> {
    Block(&'a Block),
    TightListItem(&'a Block),
    TightBlock(&'a Block),
    DefinitionItem(&'a DefinitionItem),
    Definition(&'a [Block]),
    FootnoteParagraph(&'a [Inline], usize),
    Backlink(usize),
    CloseTag(&'static str),
}

/// Renders the main flow and, after it, the referenced footnotes.
///
/// Top-level blocks are separated by one blank line. Blocks that produce no
/// HTML, such as style blocks, leave no separator behind.
pub(crate) fn render_document(blocks: &[Block], footnotes: &[Block], opts: &ParseOptions) -> Rendered {
    let mut rendered = Rendered::default();
    let mut chunk = String::new();

    for block in blocks {
        chunk.clear();
        render_block(block, &mut chunk, &mut rendered.css, opts);
        push_chunk(&mut rendered.html, &chunk);
    }

    if !footnotes.is_empty() {
        chunk.clear();
        chunk.push_str("<div class=\"footnotes\">\n<hr/>\n<ol>\n");
        for footnote in footnotes {
            render_block(footnote, &mut chunk, &mut rendered.css, opts);
        }
        chunk.push_str("</ol>\n</div>\n");
        push_chunk(&mut rendered.html, &chunk);
    }
    rendered
}

fn push_chunk(html: &mut String, chunk: &str) {
    let chunk = chunk.trim_end_matches('\n');
    if chunk.is_empty() {
        return;
    }
    if !html.is_empty() {
        html.push_str("\n\n");
    }
    html.push_str(chunk);
}

/// Heading text as it appears in a table of contents entry.
pub(crate) fn render_label(inlines: &[Inline], opts: &ParseOptions) -> String {
    let mut out = String::new();
    render_inlines(&mut out, inlines, opts, InlineMode::Label);
    out
}

pub(crate) fn render_block(block: &Block, out: &mut String, css: &mut String, opts: &ParseOptions) {
    let mut stack: Vec<Work<'_>> = vec![Work::Block(block)];

    while let Some(work) = stack.pop() {
        match work {
            Work::CloseTag(tag) => out.push_str(tag),
            Work::TightListItem(block) => render_tight_list_item(block, out, css, opts, &mut stack),
            Work::TightBlock(block) => {
                if let Block::Paragraph { content } = block {
                    render_inlines(out, content, opts, InlineMode::Body);
                } else {
                    render_one(block, out, css, opts, &mut stack);
                }
            }
            Work::Block(block) => render_one(block, out, css, opts, &mut stack),
            Work::DefinitionItem(item) => {
                for term in &item.terms {
                    out.push_str("<dt>");
                    render_inlines(out, term, opts, InlineMode::Body);
                    out.push_str("</dt>\n");
                }
                for definition in item.definitions.iter().rev() {
                    stack.push(Work::Definition(definition));
                }
            }
            Work::Definition(blocks) => {
                if let [Block::Paragraph { content }] = blocks {
                    out.push_str("<dd>");
                    render_inlines(out, content, opts, InlineMode::Body);
                    out.push_str("</dd>\n");
                } else {
                    out.push_str("<dd>\n");
                    stack.push(Work::CloseTag("</dd>\n"));
                    for child in blocks.iter().rev() {
                        stack.push(Work::Block(child));
                    }
                }
            }
            Work::FootnoteParagraph(content, number) => {
                out.push_str("<p>");
                render_inlines(out, content, opts, InlineMode::Body);
                push_backlink(out, number);
                out.push_str("</p>\n");
            }
            Work::Backlink(number) => {
                out.push_str("<p>");
                push_backlink(out, number);
                out.push_str("</p>\n");
            }
        }
    }
}

fn push_backlink(out: &mut String, number: usize) {
    let _ = write!(out, "<a href=\"#fnref:{number}\" rev=\"footnote\">&#8617;</a>");
}

fn list_close_tag(kind: &ListKind) -> &'static str {
    match kind {
        ListKind::Bullet(_) => "</ul>\n",
        ListKind::Ordered(_) | ListKind::Alphabetic(_) => "</ol>\n",
    }
}

#[inline(always)]
fn emit_list_open(out: &mut String, kind: &ListKind, start: u32) {
    match kind {
        ListKind::Bullet(_) => out.push_str("<ul>\n"),
        ListKind::Ordered(_) | ListKind::Alphabetic(_) => {
            out.push_str("<ol");
            if let ListKind::Alphabetic(case) = kind {
                out.push_str(" type=\"");
                out.push(*case as char);
                out.push('"');
            }
            if start != 1 {
                let _ = write!(out, " start=\"{start}\"");
            }
            out.push_str(">\n");
        }
    }
}

#[inline]
fn render_one<'a>(
    block: &'a Block,
    out: &mut String,
    css: &mut String,
    opts: &ParseOptions,
    stack: &mut Vec<Work<'a>>,
) {
    match block {
        Block::ThematicBreak => out.push_str("<hr />\n"),
        Block::Heading {
            level,
            content,
            anchor,
        } => {
            if let Some(anchor) = anchor {
                out.push_str("<a name=\"");
                escape_html_into(out, anchor);
                out.push_str("\"></a>\n");
            }
            out.push_str("<h");
            out.push((b'0' + level) as char);
            out.push('>');
            render_inlines(out, content, opts, InlineMode::Body);
            out.push_str("</h");
            out.push((b'0' + level) as char);
            out.push_str(">\n");
        }
        Block::Paragraph { content } => {
            out.push_str("<p>");
            render_inlines(out, content, opts, InlineMode::Body);
            out.push_str("</p>\n");
        }
        Block::CodeBlock { info, literal } => {
            out.push_str("<pre><code");
            if let Some(lang) = info.split_whitespace().next() {
                out.push_str(" class=\"language-");
                escape_html_into(out, lang);
                out.push('"');
            }
            out.push('>');
            if opts.c_data {
                push_cdata(out, literal);
            } else {
                escape_html_into(out, literal);
            }
            out.push_str("</code></pre>\n");
        }
        Block::HtmlBlock { literal } => {
            if opts.c_data {
                push_cdata(out, literal);
            } else {
                out.push_str(literal);
            }
            out.push('\n');
        }
        Block::StyleBlock { literal } => {
            css.push_str(literal);
            css.push('\n');
        }
        Block::BlockQuote { children } => {
            out.push_str("<blockquote>\n");
            stack.push(Work::CloseTag("</blockquote>\n"));
            for child in children.iter().rev() {
                stack.push(Work::Block(child));
            }
        }
        Block::List {
            kind,
            start,
            tight,
            children,
        } => {
            emit_list_open(out, kind, *start);
            stack.push(Work::CloseTag(list_close_tag(kind)));
            for item in children.iter().rev() {
                stack.push(if *tight {
                    Work::TightListItem(item)
                } else {
                    Work::Block(item)
                });
            }
        }
        Block::ListItem { children } => {
            out.push_str("<li>");
            if children.is_empty() {
                out.push_str("</li>\n");
            } else {
                out.push('\n');
                stack.push(Work::CloseTag("</li>\n"));
                for child in children.iter().rev() {
                    stack.push(Work::Block(child));
                }
            }
        }
        Block::Table(table) => {
            let all_none = table.alignments.iter().all(|a| *a == TableAlignment::None);
            let align_of = |i: usize| {
                if all_none {
                    TableAlignment::None
                } else {
                    table.alignments.get(i).copied().unwrap_or(TableAlignment::None)
                }
            };
            out.push_str("<table>\n<thead>\n<tr>\n");
            for (i, cell) in table.header.iter().enumerate() {
                render_table_cell(out, cell, "th", align_of(i), opts);
            }
            out.push_str("</tr>\n</thead>\n");
            if !table.rows.is_empty() {
                out.push_str("<tbody>\n");
                for row in &table.rows {
                    out.push_str("<tr>\n");
                    for (i, cell) in row.iter().enumerate() {
                        render_table_cell(out, cell, "td", align_of(i), opts);
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("</tbody>\n");
            }
            out.push_str("</table>\n");
        }
        Block::DefinitionList { items } => {
            out.push_str("<dl>\n");
            stack.push(Work::CloseTag("</dl>\n"));
            for item in items.iter().rev() {
                stack.push(Work::DefinitionItem(item));
            }
        }
        Block::FootnoteDefinition {
            number, children, ..
        } => {
            let _ = writeln!(out, "<li id=\"fn:{number}\">");
            stack.push(Work::CloseTag("</li>\n"));
            // the back-link goes inside the last paragraph when there is one
            let leading = match children.split_last() {
                Some((Block::Paragraph { content }, rest)) => {
                    stack.push(Work::FootnoteParagraph(content, *number));
                    rest
                }
                _ => {
                    stack.push(Work::Backlink(*number));
                    &children[..]
                }
            };
            for child in leading.iter().rev() {
                stack.push(Work::Block(child));
            }
        }
    }
}

#[inline]
fn render_tight_list_item<'a>(
    block: &'a Block,
    out: &mut String,
    css: &mut String,
    opts: &ParseOptions,
    stack: &mut Vec<Work<'a>>,
) {
    let Block::ListItem { children } = block else {
        render_one(block, out, css, opts, stack);
        return;
    };

    out.push_str("<li>");

    if let [Block::Paragraph { content }] = children.as_slice() {
        render_inlines(out, content, opts, InlineMode::Body);
        out.push_str("</li>\n");
        return;
    }

    stack.push(Work::CloseTag("</li>\n"));
    let mut prev_was_para = false;
    for (idx, child) in children.iter().enumerate() {
        match child {
            Block::Paragraph { content } => {
                render_inlines(out, content, opts, InlineMode::Body);
                prev_was_para = true;
            }
            _ => {
                if prev_was_para || idx == 0 {
                    out.push('\n');
                }
                for remaining in children[idx..].iter().rev() {
                    stack.push(Work::TightBlock(remaining));
                }
                return;
            }
        }
    }
}

fn render_table_cell(
    out: &mut String,
    content: &[Inline],
    tag: &str,
    align: TableAlignment,
    opts: &ParseOptions,
) {
    out.push('<');
    out.push_str(tag);
    match align {
        TableAlignment::Left => out.push_str(" style=\"text-align: left\""),
        TableAlignment::Right => out.push_str(" style=\"text-align: right\""),
        TableAlignment::Center => out.push_str(" style=\"text-align: center\""),
        TableAlignment::None => {}
    }
    out.push('>');
    render_inlines(out, content, opts, InlineMode::Body);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn push_title(out: &mut String, title: &Option<String>) {
    if let Some(title) = title {
        out.push_str(" title=\"");
        escape_html_into(out, title);
        out.push('"');
    }
}

fn render_inlines(out: &mut String, inlines: &[Inline], opts: &ParseOptions, mode: InlineMode) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => escape_html_into(out, text),
            Inline::Emphasis(children) => wrap(out, "em", children, opts, mode),
            Inline::Strong(children) => wrap(out, "strong", children, opts, mode),
            Inline::Strikethrough(children) => wrap(out, "del", children, opts, mode),
            Inline::Superscript(children) => wrap(out, "sup", children, opts, mode),
            Inline::Code(code) => {
                out.push_str("<code>");
                escape_html_into(out, code);
                out.push_str("</code>");
            }
            Inline::Link {
                children,
                url,
                title,
            } => {
                if mode == InlineMode::Label || (opts.create_safe_links && !is_safe_url(url)) {
                    render_inlines(out, children, opts, mode);
                    continue;
                }
                out.push_str("<a href=\"");
                encode_url_escaped_into(out, url);
                out.push('"');
                push_title(out, title);
                out.push('>');
                render_inlines(out, children, opts, mode);
                out.push_str("</a>");
            }
            Inline::Image { alt, url, title } => {
                if opts.create_safe_links && !is_safe_url(url) {
                    escape_html_into(out, alt);
                    continue;
                }
                out.push_str("<img src=\"");
                encode_url_escaped_into(out, url);
                out.push_str("\" alt=\"");
                escape_html_into(out, alt);
                out.push('"');
                push_title(out, title);
                out.push_str(" />");
            }
            Inline::Autolink { url, text } => {
                if mode == InlineMode::Label || (opts.create_safe_links && !is_safe_url(url)) {
                    escape_html_into(out, text);
                    continue;
                }
                out.push_str("<a href=\"");
                encode_url_escaped_into(out, url);
                out.push_str("\">");
                escape_html_into(out, text);
                out.push_str("</a>");
            }
            Inline::RawHtml(html) | Inline::Entity(html) => out.push_str(html),
            Inline::LineBreak => match mode {
                InlineMode::Body => out.push_str("<br />\n"),
                InlineMode::Label => out.push(' '),
            },
            Inline::SoftBreak => match mode {
                InlineMode::Body => out.push('\n'),
                InlineMode::Label => out.push(' '),
            },
            Inline::SmartPunct(punct) => out.push_str(punct.entity()),
            Inline::FootnoteReference { number, .. } => {
                if mode == InlineMode::Body {
                    let _ = write!(
                        out,
                        "<sup id=\"fnref:{number}\"><a href=\"#fn:{number}\" rel=\"footnote\">{number}</a></sup>"
                    );
                }
            }
        }
    }
}

fn wrap(out: &mut String, tag: &str, children: &[Inline], opts: &ParseOptions, mode: InlineMode) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    render_inlines(out, children, opts, mode);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
