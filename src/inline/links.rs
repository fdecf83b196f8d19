use super::*;
use crate::block::{parse_link_destination, parse_link_title};

impl<'a, 'r> InlineScanner<'a, 'r> {
    /// Parses `(destination "title")` right after a closing bracket.
    pub(super) fn try_inline_link(&mut self) -> Option<(String, Option<String>)> {
        if self.bytes.get(self.pos) != Some(&b'(') {
            return None;
        }
        let saved = self.pos;
        self.pos += 1;
        self.skip_ws();

        if self.bytes.get(self.pos) == Some(&b')') {
            self.pos += 1;
            return Some((String::new(), None));
        }

        let Some((dest, dest_end)) = parse_link_destination(self.input, self.pos) else {
            self.pos = saved;
            return None;
        };
        self.pos = dest_end;
        let before_ws = self.pos;
        self.skip_ws();

        let mut title = None;
        if self.pos > before_ws
            && matches!(self.bytes.get(self.pos), Some(b'"' | b'\'' | b'('))
        {
            let Some((t, title_end)) = parse_link_title(self.input, self.pos) else {
                self.pos = saved;
                return None;
            };
            title = Some(t);
            self.pos = title_end;
            self.skip_ws();
        }

        if self.bytes.get(self.pos) != Some(&b')') {
            self.pos = saved;
            return None;
        }
        self.pos += 1;
        Some((dest, title))
    }

    /// Resolves `[text][label]`, `[text][]` and `[text]` against the
    /// reference table.
    pub(super) fn try_reference_link(
        &mut self,
        text_pos: usize,
        close_pos: usize,
    ) -> Option<(String, Option<String>)> {
        let saved = self.pos;
        let raw_label = &self.input[text_pos..close_pos];

        if self.bytes.get(self.pos) == Some(&b'[') {
            self.pos += 1;
            let label_start = self.pos;
            while self.pos < self.bytes.len() {
                match self.bytes[self.pos] {
                    b'\\' => self.pos += 2,
                    b'[' => break,
                    b']' => {
                        let label = &self.input[label_start..self.pos];
                        self.pos += 1;
                        let lookup = if label.trim().is_empty() {
                            raw_label
                        } else {
                            label
                        };
                        if let Some(r) = self.ctx.refs.link(lookup) {
                            return Some((r.url.clone(), r.title.clone()));
                        }
                        self.pos = saved;
                        return None;
                    }
                    _ => self.pos += 1,
                }
            }
            self.pos = saved;
            return None;
        }

        if !self.ctx.refs.has_links() {
            return None;
        }
        let r = self.ctx.refs.link(raw_label)?;
        Some((r.url.clone(), r.title.clone()))
    }

    /// `<scheme:...>` or `<user@host>`.
    pub(super) fn try_autolink(&mut self, text_start: usize) -> bool {
        let start = self.pos;
        let content_start = start + 1;
        let Some(len) = self.bytes[content_start..]
            .iter()
            .position(|&b| matches!(b, b'>' | b' ' | b'\n' | b'<'))
        else {
            return false;
        };
        let end = content_start + len;
        if self.bytes[end] != b'>' || len == 0 {
            return false;
        }
        let content = &self.input[content_start..end];

        let url = if has_uri_scheme(content) {
            content.to_string()
        } else if is_email_autolink(content) {
            format!("mailto:{content}")
        } else {
            return false;
        };

        self.flush_text_range(text_start, start);
        self.items.push(InlineItem::Autolink {
            url,
            text: content.to_string(),
        });
        self.pos = end + 1;
        true
    }

    pub(super) fn try_html_inline(&mut self, text_start: usize) -> bool {
        let rest = &self.input[self.pos..];
        let Some(len) = raw_html_len(rest) else {
            return false;
        };
        let tag = &rest[..len];
        let demoted = self.opts().disable_html
            || match tag_name(tag) {
                Some(name) if name.eq_ignore_ascii_case("a") => self.opts().disable_links,
                Some(name) if name.eq_ignore_ascii_case("img") => self.opts().disable_images,
                _ => false,
            };
        self.flush_text_range(text_start, self.pos);
        let (start, end) = (self.pos, self.pos + len);
        // a disabled tag is plain text, untouched by smart punctuation
        self.items.push(if demoted {
            InlineItem::Text(start, end)
        } else {
            InlineItem::RawHtml(start, end)
        });
        self.pos = end;
        true
    }

    #[inline]
    pub(super) fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && matches!(self.bytes[self.pos], b' ' | b'\t' | b'\n') {
            self.pos += 1;
        }
    }
}

fn has_uri_scheme(content: &str) -> bool {
    let Some(colon) = content.find(':') else {
        return false;
    };
    let scheme = &content.as_bytes()[..colon];
    (2..=32).contains(&scheme.len())
        && scheme[0].is_ascii_alphabetic()
        && scheme
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-'))
}

/// The name of an open or close tag, if `tag` is one.
fn tag_name(tag: &str) -> Option<&str> {
    let body = tag.strip_prefix("</").or_else(|| tag.strip_prefix('<'))?;
    let len = body
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
        .count();
    (len > 0).then(|| &body[..len])
}

/// Length of the raw HTML construct at the start of `rest`: a tag, comment,
/// processing instruction, declaration or CDATA section.
fn raw_html_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();

    if let Some(body) = rest.strip_prefix("<!--") {
        if body.starts_with('>') {
            return Some(5);
        }
        if body.starts_with("->") {
            return Some(6);
        }
        return body.find("-->").map(|end| end + 7);
    }
    if let Some(body) = rest.strip_prefix("<?") {
        return body.find("?>").map(|end| end + 4);
    }
    if let Some(body) = rest.strip_prefix("<![CDATA[") {
        return body.find("]]>").map(|end| end + 12);
    }
    if bytes.len() > 2 && bytes[1] == b'!' && bytes[2].is_ascii_alphabetic() {
        return rest.find('>').map(|end| end + 1);
    }

    if bytes.len() < 3 {
        return None;
    }
    let is_close = bytes[1] == b'/';
    let name_start = if is_close { 2 } else { 1 };
    if !bytes.get(name_start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = name_start + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }

    if is_close {
        i = skip_tag_ws(bytes, i);
        return (bytes.get(i) == Some(&b'>')).then_some(i + 1);
    }

    loop {
        let before = i;
        i = skip_tag_ws(bytes, i);
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
        let after_name = i;
        i = skip_tag_ws(bytes, i);
        if bytes.get(i) != Some(&b'=') {
            i = after_name;
            continue;
        }
        i = skip_tag_ws(bytes, i + 1);
        match *bytes.get(i)? {
            quote @ (b'\'' | b'"') => {
                let close = memchr::memchr(quote, &bytes[i + 1..])?;
                i += close + 2;
            }
            b' ' | b'\t' | b'=' | b'<' | b'>' | b'`' => return None,
            _ => {
                while i < bytes.len()
                    && !matches!(
                        bytes[i],
                        b' ' | b'\t' | b'\n' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`'
                    )
                {
                    i += 1;
                }
            }
        }
    }
}

fn skip_tag_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\n') {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_html_constructs() {
        assert_eq!(raw_html_len("<b>x"), Some(3));
        assert_eq!(raw_html_len("<a href=\"x\" title='y'>"), Some(22));
        assert_eq!(raw_html_len("<br/>"), Some(5));
        assert_eq!(raw_html_len("</em >"), Some(6));
        assert_eq!(raw_html_len("<!-- c -->z"), Some(10));
        assert_eq!(raw_html_len("<?php ?>"), Some(8));
        assert_eq!(raw_html_len("<a href=>"), None);
        assert_eq!(raw_html_len("<1>"), None);
        assert_eq!(raw_html_len("<b"), None);
    }

    #[test]
    fn tag_names() {
        assert_eq!(tag_name("<IMG src=x>"), Some("IMG"));
        assert_eq!(tag_name("</a>"), Some("a"));
        assert_eq!(tag_name("<!-- x -->"), None);
    }

    #[test]
    fn uri_schemes() {
        assert!(has_uri_scheme("http://a.b"));
        assert!(has_uri_scheme("irc+x:chan"));
        assert!(!has_uri_scheme("a:b"));
        assert!(!has_uri_scheme("1x:y"));
        assert!(!has_uri_scheme("no-colon"));
    }
}
