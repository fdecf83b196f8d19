mod links;
mod scanner;
mod tree;

use crate::ParseOptions;
use crate::ast::{Inline, Inlines, SmartPunct};
use crate::refs::{ReferenceTable, normalize_reference_label};

pub(crate) use crate::{is_ascii_punctuation, utf8_char_len};

/// State shared by every inline pass of one document.
pub(crate) struct InlineContext<'a> {
    pub refs: &'a ReferenceTable,
    pub opts: ParseOptions,
    /// Normalized footnote labels in order of first reference.
    pub footnotes: Vec<String>,
    /// Parenthesized superscripts currently being parsed.
    superscript_depth: usize,
}

impl<'a> InlineContext<'a> {
    pub fn new(refs: &'a ReferenceTable, opts: ParseOptions) -> Self {
        Self {
            refs,
            opts,
            footnotes: Vec::new(),
            superscript_depth: 0,
        }
    }

    /// The 1-based number of the footnote `label`, assigned on first use.
    fn footnote_number(&mut self, label: &str) -> usize {
        let key = normalize_reference_label(label);
        if let Some(i) = self.footnotes.iter().position(|k| *k == *key) {
            return i + 1;
        }
        self.footnotes.push(key.into_owned());
        self.footnotes.len()
    }
}

static SPECIAL: [bool; 256] = {
    let mut t = [false; 256];
    let bytes = b"\\`*_~![]<&\n:@^\"'-.(13";
    let mut i = 0;
    while i < bytes.len() {
        t[bytes[i] as usize] = true;
        i += 1;
    }
    t
};

/// Resolves the raw source of one paragraph, heading or table cell into an
/// inline sequence.
pub(crate) fn parse_inlines(raw: &str, ctx: &mut InlineContext<'_>) -> Inlines {
    if raw.is_empty() {
        return Vec::new();
    }
    if !raw.bytes().any(|b| SPECIAL[b as usize]) {
        return vec![Inline::Text(raw.to_string())];
    }
    let mut scanner = InlineScanner::new(raw, ctx);
    scanner.scan_all();
    if !scanner.delims.is_empty() {
        scanner.process_emphasis(0);
    }
    scanner.into_inlines()
}

/// Appends the reader-visible text of `inlines`, markup stripped.
pub(crate) fn push_plain_text(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) | Inline::Entity(t) => out.push_str(t),
            Inline::Emphasis(c)
            | Inline::Strong(c)
            | Inline::Strikethrough(c)
            | Inline::Superscript(c)
            | Inline::Link { children: c, .. } => push_plain_text(out, c),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::Autolink { text, .. } => out.push_str(text),
            Inline::LineBreak | Inline::SoftBreak => out.push(' '),
            Inline::SmartPunct(p) => out.push(p.glyph()),
            Inline::RawHtml(_) | Inline::FootnoteReference { .. } => {}
        }
    }
}

/// `^(...)` groups nest at most this deep; deeper ones stay literal.
const MAX_SUPERSCRIPT_NESTING: usize = 4;

/// Emphasis, strikethrough and link frames nest at most this deep in one
/// inline tree.
const MAX_INLINE_NESTING: usize = 32;

/// Open/close tag codes recorded on delimiter runs.
const TAG_EM: u8 = 1;
const TAG_STRONG: u8 = 2;
const TAG_DEL: u8 = 3;

#[derive(Clone, Debug)]
struct SmallEmVec {
    data: [u8; 4],
    len: u8,
}

impl SmallEmVec {
    #[inline(always)]
    const fn new() -> Self {
        Self {
            data: [0; 4],
            len: 0,
        }
    }
    #[inline(always)]
    fn push(&mut self, val: u8) {
        if (self.len as usize) < 4 {
            self.data[self.len as usize] = val;
            self.len += 1;
        }
    }
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

#[derive(Clone, Debug)]
struct LinkInfo {
    url: String,
    title: Option<String>,
    is_image: bool,
}

#[derive(Clone, Debug)]
enum InlineItem {
    Text(usize, usize),
    Literal(&'static str),
    Entity(usize, usize),
    RawHtml(usize, usize),
    Code(String),
    Autolink { url: String, text: String },
    LineBreak,
    SoftBreak,
    Smart(SmartPunct),
    FootnoteRef { label: String, number: usize },
    Superscript(Inlines),
    DelimRun {
        kind: u8,
        count: u16,
        can_open: bool,
        can_close: bool,
        open_em: SmallEmVec,
        close_em: SmallEmVec,
    },
    BracketOpen { is_image: bool },
    LinkStart(u16),
    LinkEnd,
}

#[derive(Clone, Debug)]
struct BracketInfo {
    item_idx: usize,
    is_image: bool,
    delim_bottom: usize,
    active: bool,
    text_pos: usize,
}

struct InlineScanner<'a, 'r> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    ctx: &'a mut InlineContext<'r>,
    items: Vec<InlineItem>,
    delims: Vec<usize>,
    brackets: Vec<BracketInfo>,
    links: Vec<LinkInfo>,
    paren_pairs: Option<Vec<(usize, usize)>>,
}

impl<'a, 'r> InlineScanner<'a, 'r> {
    fn new(input: &'a str, ctx: &'a mut InlineContext<'r>) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            ctx,
            items: Vec::with_capacity(input.len() / 16 + 4),
            delims: Vec::new(),
            brackets: Vec::new(),
            links: Vec::new(),
            paren_pairs: None,
        }
    }

    #[inline]
    fn opts(&self) -> &ParseOptions {
        &self.ctx.opts
    }
}

/// Left/right flanking rules for a delimiter run, with the stricter
/// intraword rule for `_`.
fn flanking(marker: u8, before: char, after: char) -> (bool, bool) {
    let left_flanking = !after.is_whitespace()
        && (!is_punctuation_char(after) || before.is_whitespace() || is_punctuation_char(before));
    let right_flanking = !before.is_whitespace()
        && (!is_punctuation_char(before) || after.is_whitespace() || is_punctuation_char(after));
    if marker == b'_' {
        (
            left_flanking && (!right_flanking || is_punctuation_char(before)),
            right_flanking && (!left_flanking || is_punctuation_char(after)),
        )
    } else {
        (left_flanking, right_flanking)
    }
}

#[inline(always)]
fn is_punctuation_char(c: char) -> bool {
    if c.is_ascii() {
        is_ascii_punctuation(c as u8)
    } else {
        matches!(unicode_general_category(c), 'P' | 'S')
    }
}

/// Coarse Unicode category: punctuation, symbol, or other.
fn unicode_general_category(c: char) -> char {
    match c as u32 {
        0x00A1..=0x00BF
        | 0x2010..=0x2027
        | 0x2030..=0x205E
        | 0x2E00..=0x2E7F
        | 0x3001..=0x303F
        | 0xFE30..=0xFE6F
        | 0xFF01..=0xFF0F
        | 0xFF1A..=0xFF20
        | 0xFF3B..=0xFF40
        | 0xFF5B..=0xFF65 => 'P',
        0x20A0..=0x20CF
        | 0x2100..=0x214F
        | 0x2190..=0x23FF
        | 0x2500..=0x27BF => 'S',
        _ => 'L',
    }
}

#[inline(always)]
fn char_before(s: &str, byte_pos: usize) -> char {
    s.get(..byte_pos)
        .and_then(|head| head.chars().next_back())
        .unwrap_or(' ')
}

#[inline(always)]
fn char_at(s: &str, byte_pos: usize) -> char {
    s.get(byte_pos..)
        .and_then(|tail| tail.chars().next())
        .unwrap_or(' ')
}

#[inline]
fn is_email_local_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'.' | b'!'
                | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'/'
                | b'='
                | b'?'
                | b'^'
                | b'_'
                | b'`'
                | b'{'
                | b'|'
                | b'}'
                | b'~'
                | b'-'
        )
}

fn is_email_autolink(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && local.bytes().all(is_email_local_byte)
        && domain
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline::*;
    use pretty_assertions::assert_eq;

    fn inlines_with(raw: &str, opts: ParseOptions) -> Inlines {
        let refs = ReferenceTable::default();
        let mut ctx = InlineContext::new(&refs, opts);
        parse_inlines(raw, &mut ctx)
    }

    fn inlines(raw: &str) -> Inlines {
        inlines_with(raw, ParseOptions::default())
    }

    fn text(s: &str) -> Inline {
        Text(s.to_string())
    }

    #[test]
    fn plain_text_is_one_node() {
        assert_eq!(inlines("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn emphasis_and_strong() {
        assert_eq!(
            inlines("*a* **b** ***c***"),
            vec![
                Emphasis(vec![text("a")]),
                text(" "),
                Strong(vec![text("b")]),
                text(" "),
                Emphasis(vec![Strong(vec![text("c")])]),
            ]
        );
    }

    #[test]
    fn intraword_underscores_stay_literal() {
        assert_eq!(inlines("snake_case_name"), vec![text("snake_case_name")]);
        assert_eq!(inlines("snake*star*x"), vec![text("snake"), Emphasis(vec![text("star")]), text("x")]);
    }

    #[test]
    fn strikethrough_follows_option() {
        assert_eq!(inlines("~~gone~~"), vec![Strikethrough(vec![text("gone")])]);
        let opts = ParseOptions {
            disable_strikethrough: true,
            ..Default::default()
        };
        assert_eq!(inlines_with("~~gone~~", opts), vec![text("~~gone~~")]);
    }

    #[test]
    fn code_spans_are_raw() {
        assert_eq!(inlines("`a <b>`"), vec![Code("a <b>".into())]);
        assert_eq!(inlines("`` a`b ``"), vec![Code("a`b".into())]);
        assert_eq!(inlines("`open"), vec![text("`open")]);
    }

    #[test]
    fn superscript_word_and_group() {
        assert_eq!(inlines("x^2 y"), vec![text("x"), Superscript(vec![text("2")]), text(" y")]);
        assert_eq!(
            inlines("e^(i *pi*)"),
            vec![text("e"), Superscript(vec![text("i "), Emphasis(vec![text("pi")])])]
        );
        assert_eq!(inlines("^alone"), vec![text("^alone")]);
        assert_eq!(inlines("a ^ b"), vec![text("a ^ b")]);
    }

    #[test]
    fn smart_punctuation() {
        assert_eq!(
            inlines("\"hi\" -- it's..."),
            vec![
                SmartPunct(crate::ast::SmartPunct::LeftDoubleQuote),
                text("hi"),
                SmartPunct(crate::ast::SmartPunct::RightDoubleQuote),
                text(" "),
                SmartPunct(crate::ast::SmartPunct::EnDash),
                text(" it"),
                SmartPunct(crate::ast::SmartPunct::RightSingleQuote),
                text("s"),
                SmartPunct(crate::ast::SmartPunct::Ellipsis),
            ]
        );
        let opts = ParseOptions {
            disable_smart_formatting: true,
            ..Default::default()
        };
        assert_eq!(inlines_with("\"hi\" -- (c)", opts), vec![text("\"hi\" -- (c)")]);
    }

    #[test]
    fn symbols_and_fractions() {
        assert_eq!(
            inlines("(c) 1/2 x1/2"),
            vec![
                SmartPunct(crate::ast::SmartPunct::Copyright),
                text(" "),
                SmartPunct(crate::ast::SmartPunct::OneHalf),
                text(" x1/2"),
            ]
        );
    }

    #[test]
    fn inline_links_and_images() {
        assert_eq!(
            inlines("[a](/u \"t\") ![i](/p.png)"),
            vec![
                Link {
                    children: vec![text("a")],
                    url: "/u".into(),
                    title: Some("t".into()),
                },
                text(" "),
                Image {
                    alt: "i".into(),
                    url: "/p.png".into(),
                    title: None,
                },
            ]
        );
    }

    #[test]
    fn disabled_links_stay_literal() {
        let opts = ParseOptions {
            disable_links: true,
            ..Default::default()
        };
        assert_eq!(inlines_with("[a](/u)", opts), vec![text("[a](/u)")]);
        let opts = ParseOptions {
            disable_images: true,
            ..Default::default()
        };
        assert_eq!(inlines_with("![a](/u)", opts), vec![text("![a](/u)")]);
    }

    #[test]
    fn reference_links_resolve_through_table() {
        let mut refs = ReferenceTable::default();
        refs.define_link("Site", "https://example.com".into(), None);
        let mut ctx = InlineContext::new(&refs, ParseOptions::default());
        let got = parse_inlines("[x][site] [Site] [missing][]", &mut ctx);
        let link = |t: &str| Link {
            children: vec![text(t)],
            url: "https://example.com".into(),
            title: None,
        };
        assert_eq!(
            got,
            vec![link("x"), text(" "), link("Site"), text(" [missing][]")]
        );
    }

    #[test]
    fn autolinks_and_raw_html() {
        assert_eq!(
            inlines("<http://a.b> <me@x.org> <b>"),
            vec![
                Autolink {
                    url: "http://a.b".into(),
                    text: "http://a.b".into(),
                },
                text(" "),
                Autolink {
                    url: "mailto:me@x.org".into(),
                    text: "me@x.org".into(),
                },
                text(" "),
                RawHtml("<b>".into()),
            ]
        );
        let opts = ParseOptions {
            disable_html: true,
            ..Default::default()
        };
        assert_eq!(inlines_with("<b>x</b>", opts), vec![text("<b>x</b>")]);
    }

    #[test]
    fn bare_urls_need_option() {
        assert_eq!(inlines("see http://x.org."), vec![text("see http://x.org.")]);
        let opts = ParseOptions {
            automatically_create_links: true,
            ..Default::default()
        };
        assert_eq!(
            inlines_with("see http://x.org.", opts),
            vec![
                text("see "),
                Autolink {
                    url: "http://x.org".into(),
                    text: "http://x.org".into(),
                },
                text("."),
            ]
        );
    }

    #[test]
    fn breaks_and_entities() {
        assert_eq!(
            inlines("a  \nb\nc &copy; & d"),
            vec![
                text("a"),
                LineBreak,
                text("b"),
                SoftBreak,
                text("c "),
                Entity("&copy;".into()),
                text(" & d"),
            ]
        );
        assert_eq!(inlines("\\*not\\*"), vec![text("*not*")]);
    }

    #[test]
    fn footnote_references_number_in_order() {
        let mut refs = ReferenceTable::default();
        refs.define_footnote("b", Vec::new());
        refs.define_footnote("a", Vec::new());
        let opts = ParseOptions {
            enable_markdown_extra_footnotes: true,
            ..Default::default()
        };
        let mut ctx = InlineContext::new(&refs, opts);
        let got = parse_inlines("x[^a] y[^B] z[^a] [^none]", &mut ctx);
        assert_eq!(
            got,
            vec![
                text("x"),
                FootnoteReference {
                    label: "a".into(),
                    number: 1,
                },
                text(" y"),
                FootnoteReference {
                    label: "B".into(),
                    number: 2,
                },
                text(" z"),
                FootnoteReference {
                    label: "a".into(),
                    number: 1,
                },
                text(" [^none]"),
            ]
        );
        assert_eq!(ctx.footnotes, vec!["a".to_string(), "b".to_string()]);
    }
}
