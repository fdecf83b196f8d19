use super::*;

/// Block-level tags that open an HTML block which runs to the next blank line.
static BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "base",
    "basefont",
    "blockquote",
    "body",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hr",
    "html",
    "iframe",
    "legend",
    "li",
    "link",
    "main",
    "menu",
    "menuitem",
    "nav",
    "noframes",
    "ol",
    "optgroup",
    "option",
    "p",
    "param",
    "search",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "template",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
];

/// Raw-text elements whose block ends at the matching close tag, blank lines
/// notwithstanding.
static RAW_TEXT_TAGS: &[(&[u8], &str)] = &[
    (b"pre", "</pre>"),
    (b"script", "</script>"),
    (b"style", "</style>"),
    (b"textarea", "</textarea>"),
];

pub(super) fn starts_with_tag_ci(bytes: &[u8], tag: &[u8]) -> bool {
    if bytes.len() < 1 + tag.len() || bytes[0] != b'<' {
        return false;
    }
    if !bytes[1..=tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    matches!(
        bytes.get(1 + tag.len()),
        None | Some(b' ' | b'\t' | b'>' | b'\n')
    )
}

pub(super) fn is_style_block_start(line: &str) -> bool {
    starts_with_tag_ci(line.as_bytes(), b"style")
}

pub(super) fn parse_html_block_start(line: &str, in_paragraph: bool) -> Option<HtmlBlockEnd> {
    let bytes = line.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    for &(tag, close) in RAW_TEXT_TAGS {
        if starts_with_tag_ci(bytes, tag) {
            return Some(HtmlBlockEnd::EndTag(close));
        }
    }
    if bytes.starts_with(b"<!--") {
        return Some(HtmlBlockEnd::Comment);
    }
    if bytes.starts_with(b"<?") {
        return Some(HtmlBlockEnd::ProcessingInstruction);
    }
    if bytes.starts_with(b"<![CDATA[") {
        return Some(HtmlBlockEnd::Cdata);
    }
    if bytes.len() > 2 && bytes[1] == b'!' && bytes[2].is_ascii_alphabetic() {
        return Some(HtmlBlockEnd::Declaration);
    }
    if block_tag_name(line).is_some() {
        return Some(HtmlBlockEnd::BlankLine);
    }
    // a lone complete tag cannot interrupt a paragraph
    if !in_paragraph && is_complete_tag_line(line) {
        return Some(HtmlBlockEnd::BlankLine);
    }
    None
}

/// The lowercased name of a block-level open or close tag at line start.
fn block_tag_name(line: &str) -> Option<&'static str> {
    let bytes = line.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'<' {
        return None;
    }
    let start = if bytes[1] == b'/' { 2 } else { 1 };
    let end = start
        + bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
    if end == start || end - start > 10 {
        return None;
    }
    if let Some(&next) = bytes.get(end)
        && !matches!(next, b' ' | b'\t' | b'>' | b'/' | b'\n')
    {
        return None;
    }
    let mut buf = [0u8; 10];
    let name = &mut buf[..end - start];
    name.copy_from_slice(&bytes[start..end]);
    name.make_ascii_lowercase();
    BLOCK_TAGS
        .binary_search_by(|t| t.as_bytes().cmp(name))
        .ok()
        .map(|i| BLOCK_TAGS[i])
}

/// A line holding one complete open or close tag and nothing else.
fn is_complete_tag_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'<' {
        return false;
    }

    let is_close = bytes[1] == b'/';
    let mut i = if is_close { 2 } else { 1 };
    if !bytes[i].is_ascii_alphabetic() {
        return false;
    }
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }

    if is_close {
        i = skip_blanks(bytes, i);
        if bytes.get(i) != Some(&b'>') {
            return false;
        }
        i += 1;
    } else {
        match skip_attributes(bytes, i) {
            Some(end) => i = end,
            None => return false,
        }
    }
    bytes[i..].iter().all(|&b| b == b' ' || b == b'\t')
}

fn skip_blanks(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

/// Walks attributes after a tag name up to and including `>` or `/>`.
fn skip_attributes(bytes: &[u8], mut i: usize) -> Option<usize> {
    loop {
        let before = i;
        i = skip_blanks(bytes, i);
        let had_space = i > before;
        match *bytes.get(i)? {
            b'>' => return Some(i + 1),
            b'/' => return (bytes.get(i + 1) == Some(&b'>')).then_some(i + 2),
            b if !had_space || !(b.is_ascii_alphabetic() || b == b'_' || b == b':') => {
                return None;
            }
            _ => {}
        }
        while i < bytes.len()
            && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b':' | b'.' | b'-'))
        {
            i += 1;
        }
        i = skip_blanks(bytes, i);
        if bytes.get(i) == Some(&b'=') {
            i = skip_blanks(bytes, i + 1);
            match *bytes.get(i)? {
                quote @ (b'\'' | b'"') => {
                    let close = memchr::memchr(quote, &bytes[i + 1..])?;
                    i += close + 2;
                }
                _ => {
                    while i < bytes.len()
                        && !matches!(bytes[i], b' ' | b'\t' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
                    {
                        i += 1;
                    }
                }
            }
        }
    }
}

pub(super) fn contains_ci(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len()
        && haystack
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle))
}

pub(super) fn html_block_ends(condition: &HtmlBlockEnd, line: &str) -> bool {
    match condition {
        HtmlBlockEnd::EndTag(tag) => contains_ci(line.as_bytes(), tag.as_bytes()),
        HtmlBlockEnd::Comment => line.contains("-->"),
        HtmlBlockEnd::ProcessingInstruction => line.contains("?>"),
        HtmlBlockEnd::Declaration => line.contains('>'),
        HtmlBlockEnd::Cdata => line.contains("]]>"),
        HtmlBlockEnd::BlankLine => false,
    }
}

/// The tag name when `line` is nothing but a block-level open tag, such as
/// `<div class="x">`. Such a block may wrap markdown.
pub(super) fn lone_open_tag(line: &str) -> Option<&'static str> {
    let line = line.trim();
    if line.starts_with("</") || line.ends_with("/>") {
        return None;
    }
    let name = block_tag_name(line)?;
    let end = skip_attributes(line.as_bytes(), 1 + name.len())?;
    (end == line.len()).then_some(name)
}

/// `line` is exactly `</tag>`, optionally padded with blanks.
pub(super) fn is_lone_close_tag(line: &str, tag: &str) -> bool {
    let bytes = line.trim().as_bytes();
    bytes.len() == tag.len() + 3
        && bytes.starts_with(b"</")
        && bytes[2..2 + tag.len()].eq_ignore_ascii_case(tag.as_bytes())
        && bytes[bytes.len() - 1] == b'>'
}
