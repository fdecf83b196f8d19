use serde::Serialize;

/// A resolved inline sequence.
pub type Inlines = Vec<Inline>;

/// A block node.
///
/// The text payload `T` is the raw inline source (`String`) straight out of
/// the block assembler, and a resolved [`Inlines`] sequence once the inline
/// pass has run over it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Block<T = Inlines> {
    BlockQuote {
        children: Vec<Block<T>>,
    },
    List {
        kind: ListKind,
        start: u32,
        tight: bool,
        children: Vec<Block<T>>,
    },
    ListItem {
        children: Vec<Block<T>>,
    },
    Paragraph {
        content: T,
    },
    Heading {
        level: u8,
        content: T,
        anchor: Option<String>,
    },
    CodeBlock {
        info: String,
        literal: String,
    },
    HtmlBlock {
        literal: String,
    },
    StyleBlock {
        literal: String,
    },
    ThematicBreak,
    Table(Box<TableData<T>>),
    DefinitionList {
        items: Vec<DefinitionItem<T>>,
    },
    FootnoteDefinition {
        label: String,
        number: usize,
        children: Vec<Block<T>>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableData<T = Inlines> {
    pub alignments: Vec<TableAlignment>,
    pub header: Vec<T>,
    pub rows: Vec<Vec<T>>,
}

/// One or more terms sharing one or more definitions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DefinitionItem<T = Inlines> {
    pub terms: Vec<T>,
    pub definitions: Vec<Vec<Block<T>>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ListKind {
    Bullet(u8),     // marker character: b'-', b'*', b'+'
    Ordered(u8),    // delimiter: b'.' or b')'
    Alphabetic(u8), // case of the first marker: b'a' or b'A'
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TableAlignment {
    None,
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Inline {
    Text(String),
    Emphasis(Inlines),
    Strong(Inlines),
    Strikethrough(Inlines),
    Superscript(Inlines),
    Code(String),
    Link {
        children: Inlines,
        url: String,
        title: Option<String>,
    },
    Image {
        alt: String,
        url: String,
        title: Option<String>,
    },
    /// `url` is the link target (`mailto:` already prepended for addresses),
    /// `text` what the reader sees.
    Autolink {
        url: String,
        text: String,
    },
    RawHtml(String),
    /// A syntactically valid entity reference, kept verbatim.
    Entity(String),
    LineBreak,
    SoftBreak,
    SmartPunct(SmartPunct),
    FootnoteReference {
        label: String,
        number: usize,
    },
}

/// Typographic substitutions produced by smart formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SmartPunct {
    LeftDoubleQuote,
    RightDoubleQuote,
    LeftSingleQuote,
    RightSingleQuote,
    EnDash,
    EmDash,
    Ellipsis,
    Copyright,
    Registered,
    Trademark,
    OneHalf,
    OneQuarter,
    ThreeQuarters,
}

impl SmartPunct {
    /// The named entity written to HTML output.
    pub fn entity(self) -> &'static str {
        match self {
            SmartPunct::LeftDoubleQuote => "&ldquo;",
            SmartPunct::RightDoubleQuote => "&rdquo;",
            SmartPunct::LeftSingleQuote => "&lsquo;",
            SmartPunct::RightSingleQuote => "&rsquo;",
            SmartPunct::EnDash => "&ndash;",
            SmartPunct::EmDash => "&mdash;",
            SmartPunct::Ellipsis => "&hellip;",
            SmartPunct::Copyright => "&copy;",
            SmartPunct::Registered => "&reg;",
            SmartPunct::Trademark => "&trade;",
            SmartPunct::OneHalf => "&frac12;",
            SmartPunct::OneQuarter => "&frac14;",
            SmartPunct::ThreeQuarters => "&frac34;",
        }
    }

    /// The character the entity stands for.
    pub fn glyph(self) -> char {
        match self {
            SmartPunct::LeftDoubleQuote => '\u{201C}',
            SmartPunct::RightDoubleQuote => '\u{201D}',
            SmartPunct::LeftSingleQuote => '\u{2018}',
            SmartPunct::RightSingleQuote => '\u{2019}',
            SmartPunct::EnDash => '\u{2013}',
            SmartPunct::EmDash => '\u{2014}',
            SmartPunct::Ellipsis => '\u{2026}',
            SmartPunct::Copyright => '\u{A9}',
            SmartPunct::Registered => '\u{AE}',
            SmartPunct::Trademark => '\u{2122}',
            SmartPunct::OneHalf => '\u{BD}',
            SmartPunct::OneQuarter => '\u{BC}',
            SmartPunct::ThreeQuarters => '\u{BE}',
        }
    }
}

impl<T> Block<T> {
    /// Rebuilds the tree with every text payload passed through `f`, in
    /// document order.
    pub fn map_text<U, F>(self, f: &mut F) -> Block<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Block::BlockQuote { children } => Block::BlockQuote {
                children: map_blocks(children, f),
            },
            Block::List {
                kind,
                start,
                tight,
                children,
            } => Block::List {
                kind,
                start,
                tight,
                children: map_blocks(children, f),
            },
            Block::ListItem { children } => Block::ListItem {
                children: map_blocks(children, f),
            },
            Block::Paragraph { content } => Block::Paragraph {
                content: f(content),
            },
            Block::Heading {
                level,
                content,
                anchor,
            } => Block::Heading {
                level,
                content: f(content),
                anchor,
            },
            Block::CodeBlock { info, literal } => Block::CodeBlock { info, literal },
            Block::HtmlBlock { literal } => Block::HtmlBlock { literal },
            Block::StyleBlock { literal } => Block::StyleBlock { literal },
            Block::ThematicBreak => Block::ThematicBreak,
            Block::Table(table) => {
                let TableData {
                    alignments,
                    header,
                    rows,
                } = *table;
                let header = header.into_iter().map(&mut *f).collect::<Vec<U>>();
                let rows = rows
                    .into_iter()
                    .map(|row| row.into_iter().map(&mut *f).collect::<Vec<U>>())
                    .collect();
                Block::Table(Box::new(TableData {
                    alignments,
                    header,
                    rows,
                }))
            }
            Block::DefinitionList { items } => Block::DefinitionList {
                items: items
                    .into_iter()
                    .map(|item| DefinitionItem {
                        terms: item.terms.into_iter().map(&mut *f).collect(),
                        definitions: item
                            .definitions
                            .into_iter()
                            .map(|blocks| map_blocks(blocks, &mut *f))
                            .collect(),
                    })
                    .collect(),
            },
            Block::FootnoteDefinition {
                label,
                number,
                children,
            } => Block::FootnoteDefinition {
                label,
                number,
                children: map_blocks(children, f),
            },
        }
    }
}

pub(crate) fn map_blocks<T, U, F>(blocks: Vec<Block<T>>, f: &mut F) -> Vec<Block<U>>
where
    F: FnMut(T) -> U,
{
    blocks.into_iter().map(|b| b.map_text(&mut *f)).collect()
}

impl Block {
    /// Calls `visit` on every heading in document order, nested ones included.
    pub(crate) fn for_each_heading_mut(
        &mut self,
        visit: &mut dyn FnMut(u8, &Inlines, &mut Option<String>),
    ) {
        match self {
            Block::Heading {
                level,
                content,
                anchor,
            } => visit(*level, content, anchor),
            Block::BlockQuote { children }
            | Block::List { children, .. }
            | Block::ListItem { children }
            | Block::FootnoteDefinition { children, .. } => {
                for child in children {
                    child.for_each_heading_mut(visit);
                }
            }
            Block::DefinitionList { items } => {
                for def in items.iter_mut().flat_map(|item| item.definitions.iter_mut()) {
                    for child in def {
                        child.for_each_heading_mut(visit);
                    }
                }
            }
            _ => {}
        }
    }
}
