mod html_block;
mod leaf_blocks;
mod link_ref_def;
mod parser;

use html_block::*;
use leaf_blocks::*;
use link_ref_def::*;

pub(crate) use link_ref_def::{parse_link_destination, parse_link_title, resolve_escapes};

use crate::ParseOptions;
use crate::ast::{Block, DefinitionItem, ListKind, TableAlignment, TableData};
use crate::html::trim_cr;
use crate::refs::ReferenceTable;
use std::borrow::Cow;

/// A block whose text payloads are still raw inline source.
pub(crate) type RawBlock = Block<String>;

/// Continuation lines of a footnote definition are indented this far.
const FOOTNOTE_INDENT: usize = 4;

/// Containers nest at most this deep, counting the ones of enclosing
/// HTML blocks whose contents are parsed as markdown. Markers past the
/// limit are read as paragraph text.
const MAX_CONTAINER_NESTING: usize = 64;

/// Assembles `input` into a block tree, collecting link reference
/// definitions and footnote bodies into the returned table.
pub(crate) fn parse_blocks(input: &str, opts: &ParseOptions) -> (Vec<RawBlock>, ReferenceTable) {
    let mut parser = BlockParser::new(input, *opts);
    let blocks = parser.parse();
    (blocks, parser.refs)
}

const TAB_STOP: usize = 4;

#[inline]
fn tab_width(col: usize) -> usize {
    TAB_STOP - col % TAB_STOP
}

/// Where the first non-space byte at or after the cursor sits.
#[derive(Clone, Copy, Debug)]
struct NonSpace {
    col: usize,
    pos: usize,
    /// `None` once the line has run out.
    byte: Option<u8>,
}

/// One source line with a column-aware cursor. Tabs advance to the next
/// multiple of four; when only part of a tab is consumed, the columns left
/// over are kept in `tab_rest`.
#[derive(Clone, Debug)]
struct Line<'a> {
    text: &'a str,
    col: usize,
    pos: usize,
    tab_rest: usize,
    peeked: Option<NonSpace>,
}

impl<'a> Line<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            col: 0,
            pos: 0,
            tab_rest: 0,
            peeked: None,
        }
    }

    fn remainder(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or("")
    }

    /// The remainder with a half-consumed tab written out as spaces.
    fn remainder_padded(&self) -> Cow<'a, str> {
        if self.tab_rest == 0 {
            return Cow::Borrowed(self.remainder());
        }
        let mut s = " ".repeat(self.tab_rest);
        s.push_str(self.remainder());
        Cow::Owned(s)
    }

    /// Finds the next non-space byte without moving the cursor.
    #[inline]
    fn peek(&mut self) -> NonSpace {
        if let Some(ns) = self.peeked
            && ns.pos >= self.pos
        {
            return ns;
        }
        let bytes = self.text.as_bytes();
        let mut col = self.col + self.tab_rest;
        let mut pos = self.pos;
        let byte = loop {
            match bytes.get(pos) {
                Some(b' ') => col += 1,
                Some(b'\t') => col += tab_width(col),
                other => break other.copied(),
            }
            pos += 1;
        };
        let ns = NonSpace { col, pos, byte };
        self.peeked = Some(ns);
        ns
    }

    fn is_blank(&mut self) -> bool {
        self.tab_rest == 0 && self.peek().byte.is_none()
    }

    /// Columns of whitespace between the cursor and the first non-space byte.
    fn indent(&mut self) -> usize {
        self.peek().col - self.col
    }

    /// The line from its first non-space byte on.
    fn rest_of_line(&mut self) -> &'a str {
        let pos = self.peek().pos;
        self.text.get(pos..).unwrap_or("")
    }

    /// Consumes up to `max` columns of leading whitespace, splitting a tab
    /// when it straddles the limit. Returns the columns consumed.
    fn skip_indent(&mut self, max: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut taken = self.tab_rest.min(max);
        self.tab_rest -= taken;
        self.col += taken;
        while taken < max {
            let width = match bytes.get(self.pos) {
                Some(b' ') => 1,
                Some(b'\t') => tab_width(self.col),
                _ => break,
            };
            let used = width.min(max - taken);
            self.pos += 1;
            self.col += used;
            self.tab_rest = width - used;
            taken += used;
        }
        taken
    }

    /// Moves forward `n` columns over whatever bytes are there.
    fn advance_columns(&mut self, n: usize) {
        let bytes = self.text.as_bytes();
        let target = self.col + n;
        while self.col < target {
            let Some(&b) = bytes.get(self.pos) else {
                break;
            };
            self.col += if b == b'\t' { tab_width(self.col) } else { 1 };
            self.pos += 1;
        }
    }

    fn advance_to_nonspace(&mut self) {
        let ns = self.peek();
        self.tab_rest = 0;
        self.col = ns.col;
        self.pos = ns.pos;
    }

    /// Consumes a `>` marker (the caller has checked it is there) and the
    /// single optional space after it.
    fn skip_blockquote_marker(&mut self) {
        self.advance_to_nonspace();
        self.pos += 1;
        self.col += 1;
        match self.text.as_bytes().get(self.pos) {
            Some(b' ') => {
                self.pos += 1;
                self.col += 1;
            }
            Some(b'\t') => {
                // one column of the tab belongs to the marker
                let width = tab_width(self.col);
                self.pos += 1;
                self.col += 1;
                self.tab_rest = width - 1;
            }
            _ => {}
        }
    }
}

#[derive(Clone, Debug)]
struct FencedCodeData {
    fence_char: u8,
    fence_len: usize,
    fence_indent: usize,
    info: String,
}

#[derive(Clone, Debug)]
struct TableState {
    alignments: Vec<TableAlignment>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Clone, Debug)]
enum OpenBlockType {
    Document,
    BlockQuote,
    ListItem {
        content_col: usize,
        started_blank: bool,
    },
    Definition {
        content_col: usize,
    },
    FootnoteDef {
        label: String,
    },
    FencedCode(Box<FencedCodeData>),
    IndentedCode,
    HtmlBlock {
        end_condition: HtmlBlockEnd,
        style: bool,
    },
    Paragraph,
    Table(Box<TableState>),
}

impl OpenBlockType {
    fn is_leaf(&self) -> bool {
        matches!(
            self,
            OpenBlockType::FencedCode(_)
                | OpenBlockType::IndentedCode
                | OpenBlockType::HtmlBlock { .. }
                | OpenBlockType::Paragraph
                | OpenBlockType::Table(_)
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum HtmlBlockEnd {
    EndTag(&'static str),
    Comment,
    ProcessingInstruction,
    Declaration,
    Cdata,
    BlankLine,
}

#[derive(Clone, Debug)]
struct OpenBlock {
    block_type: OpenBlockType,
    content: String,
    children: Vec<RawBlock>,
    had_blank_in_item: bool,
    list_has_blank_between: bool,
    list_start: u32,
    list_kind: Option<ListKind>,
}

impl OpenBlock {
    #[inline]
    fn new(block_type: OpenBlockType) -> Self {
        Self {
            block_type,
            content: String::new(),
            children: Vec::new(),
            had_blank_in_item: false,
            list_has_blank_between: false,
            list_start: 0,
            list_kind: None,
        }
    }
}

pub(crate) struct BlockParser<'a> {
    input: &'a str,
    opts: ParseOptions,
    /// Containers already open around this parser's input.
    outer_depth: usize,
    open: Vec<OpenBlock>,
    pub(crate) refs: ReferenceTable,
}

impl<'a> BlockParser<'a> {
    pub fn new(input: &'a str, opts: ParseOptions) -> Self {
        Self::nested(input, opts, 0)
    }

    fn nested(input: &'a str, opts: ParseOptions, outer_depth: usize) -> Self {
        let mut open = Vec::with_capacity(16);
        open.push(OpenBlock::new(OpenBlockType::Document));
        Self {
            input,
            opts,
            outer_depth,
            open,
            refs: ReferenceTable::default(),
        }
    }

    pub fn parse(&mut self) -> Vec<RawBlock> {
        let input = self.input;
        let bytes = input.as_bytes();
        let mut start = 0;
        while start < bytes.len() {
            let end = memchr::memchr(b'\n', &bytes[start..]).map_or(bytes.len(), |i| start + i);
            let line = Line::new(trim_cr(&input[start..end]));
            self.process_line(line);
            start = end + 1;
        }
        while self.open.len() > 1 {
            self.close_top_block();
        }
        self.open
            .pop()
            .map(|doc| doc.children)
            .unwrap_or_default()
    }

    #[inline]
    fn tip_mut(&mut self) -> &mut OpenBlock {
        self.open
            .last_mut()
            .expect("the document block stays open until parse() returns")
    }

    /// Whether another container may open.
    fn can_nest(&self) -> bool {
        self.outer_depth + self.open.len() <= MAX_CONTAINER_NESTING
    }

    fn has_open_leaf_after(&self, idx: usize) -> bool {
        self.open[idx + 1..].iter().any(|b| b.block_type.is_leaf())
    }

    fn mark_blank_on_list_items(&mut self) {
        for block in self.open.iter_mut().skip(1).rev() {
            match block.block_type {
                OpenBlockType::ListItem { .. } => {
                    block.had_blank_in_item = true;
                    break;
                }
                OpenBlockType::BlockQuote => break,
                _ => {}
            }
        }
    }

    #[inline]
    fn close_top_block(&mut self) {
        if self.open.len() <= 1 {
            return;
        }
        let Some(block) = self.open.pop() else {
            return;
        };
        if let Some(block) = self.finalize_block(block) {
            self.tip_mut().children.push(block);
        }
    }
}
