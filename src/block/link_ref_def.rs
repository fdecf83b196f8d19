use crate::{is_ascii_punctuation, utf8_char_len};

/// A `[label]: destination "title"` definition parsed off the front of a
/// paragraph.
#[derive(Debug, PartialEq)]
pub(super) struct LinkRefDef {
    pub label: String,
    pub url: String,
    pub title: Option<String>,
    pub consumed: usize,
}

fn push_char_at(out: &mut String, s: &str, i: usize) -> usize {
    let end = (i + utf8_char_len(s.as_bytes()[i])).min(s.len());
    out.push_str(s.get(i..end).unwrap_or("\u{FFFD}"));
    end
}

pub(super) fn parse_link_ref_def(input: &str) -> Option<LinkRefDef> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'[') || bytes.get(1) == Some(&b'^') {
        return None;
    }

    let mut i = 1;
    let mut label = String::new();
    loop {
        match bytes.get(i) {
            None | Some(b'[') => return None,
            Some(b']') => {
                i += 1;
                break;
            }
            Some(b'\\') if i + 1 < bytes.len() => {
                label.push('\\');
                i = push_char_at(&mut label, input, i + 1);
            }
            Some(_) => i = push_char_at(&mut label, input, i),
        }
    }
    if label.trim().is_empty() || label.len() > 999 {
        return None;
    }

    if bytes.get(i) != Some(&b':') {
        return None;
    }
    i = skip_spaces_and_optional_newline(bytes, i + 1);

    let (url, dest_end) = parse_link_destination(input, i)?;

    let title_start = skip_spaces_and_optional_newline(bytes, dest_end);
    if title_start < bytes.len()
        && title_start > dest_end
        && let Some((title, title_end)) = parse_link_title(input, title_start)
    {
        let after = skip_line_spaces(bytes, title_end);
        if after >= bytes.len() || bytes[after] == b'\n' {
            return Some(LinkRefDef {
                label,
                url,
                title: Some(title),
                consumed: (after + 1).min(bytes.len()),
            });
        }
    }

    let after_dest = skip_line_spaces(bytes, dest_end);
    if after_dest < bytes.len() && bytes[after_dest] != b'\n' {
        return None;
    }
    Some(LinkRefDef {
        label,
        url,
        title: None,
        consumed: (after_dest + 1).min(bytes.len()),
    })
}

/// Drops the backslash from backslash-escaped punctuation. Entity
/// references are left alone; they pass through to the output verbatim.
pub(crate) fn resolve_escapes(s: &str) -> String {
    let bytes = s.as_bytes();
    if memchr::memchr(b'\\', bytes).is_none() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) {
            out.push(bytes[i + 1] as char);
            i += 2;
        } else {
            i = push_char_at(&mut out, s, i);
        }
    }
    out
}

pub(super) fn skip_spaces_and_optional_newline(bytes: &[u8], i: usize) -> usize {
    let mut i = skip_line_spaces(bytes, i);
    if bytes.get(i) == Some(&b'\n') {
        i = skip_line_spaces(bytes, i + 1);
    }
    i
}

pub(super) fn skip_line_spaces(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

/// Parses a link destination, either `<...>` or a bare run with balanced
/// parentheses. Returns the unescaped URL and the end offset.
pub(crate) fn parse_link_destination(s: &str, start: usize) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    if start >= bytes.len() {
        return None;
    }

    if bytes[start] == b'<' {
        let mut i = start + 1;
        let mut dest = String::new();
        while i < bytes.len() {
            match bytes[i] {
                b'>' => return Some((dest, i + 1)),
                b'<' | b'\n' => return None,
                b'\\' if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => {
                    dest.push(bytes[i + 1] as char);
                    i += 2;
                }
                _ => i = push_char_at(&mut dest, s, i),
            }
        }
        return None;
    }

    let mut i = start;
    let mut paren_depth = 0u32;
    let mut dest = String::new();
    while i < bytes.len() {
        let b = bytes[i];
        if b <= b' ' {
            break;
        }
        match b {
            b'(' => {
                paren_depth += 1;
                if paren_depth > 32 {
                    return None;
                }
                dest.push('(');
                i += 1;
            }
            b')' => {
                if paren_depth == 0 {
                    break;
                }
                paren_depth -= 1;
                dest.push(')');
                i += 1;
            }
            b'\\' if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => {
                dest.push(bytes[i + 1] as char);
                i += 2;
            }
            _ => i = push_char_at(&mut dest, s, i),
        }
    }
    if paren_depth != 0 || i == start {
        return None;
    }
    Some((dest, i))
}

/// Parses a `"title"`, `'title'` or `(title)` starting at `start`.
pub(crate) fn parse_link_title(s: &str, start: usize) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    let open = *bytes.get(start)?;
    let close = match open {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut i = start + 1;
    let mut title = String::new();
    while i < bytes.len() {
        let b = bytes[i];
        if b == close {
            return Some((title, i + 1));
        }
        if b == b'(' && open == b'(' {
            return None;
        }
        if b == b'\\' && i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) {
            title.push(bytes[i + 1] as char);
            i += 2;
        } else {
            i = push_char_at(&mut title, s, i);
        }
    }
    None
}
