use std::collections::HashSet;

use crate::ast::Inline;
use crate::html::{escape_html_into, push_percent_encoded};
use crate::inline::push_plain_text;

/// Hands out heading anchors, unique within one document.
#[derive(Debug, Default)]
pub(crate) struct AnchorSet {
    taken: HashSet<String>,
}

impl AnchorSet {
    /// The anchor for a heading with inline content `content`. Repeats get
    /// `-1`, `-2`, ... appended, skipping any suffix already in use.
    pub fn assign(&mut self, content: &[Inline]) -> String {
        let mut text = String::new();
        push_plain_text(&mut text, content);
        let base = slug(&text);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{base}-{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for &b in text.trim().as_bytes() {
        if b.is_ascii_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':') {
            out.push(b as char);
        } else {
            push_percent_encoded(&mut out, b);
        }
    }
    if out.is_empty() {
        out.push_str("section");
    }
    out
}

/// One heading as listed in the table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TocEntry {
    pub level: u8,
    pub anchor: String,
    /// Inline HTML of the heading, links unwrapped.
    pub label: String,
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push(' ');
    }
}

fn open_list(out: &mut String, levels: &mut Vec<u8>, level: u8) {
    indent(out, levels.len());
    out.push_str("<ul>\n");
    levels.push(level);
}

fn close_list(out: &mut String, levels: &mut Vec<u8>) {
    levels.pop();
    indent(out, levels.len());
    out.push_str("</ul>\n");
    if !levels.is_empty() {
        indent(out, levels.len());
        out.push_str("</li>\n");
    }
}

/// Nests `entries` into `<ul>` lists by heading level.
///
/// A deeper heading opens a list inside the current entry, with an empty
/// `<li>` for every level it skips; a shallower one closes back out. Each
/// nesting level indents one space.
pub(crate) fn build_toc(entries: &[TocEntry]) -> String {
    let mut out = String::new();
    let mut levels: Vec<u8> = Vec::new();

    for entry in entries {
        match levels.last().copied() {
            None => open_list(&mut out, &mut levels, entry.level),
            Some(current) if entry.level > current => {
                out.push('\n');
                for skipped in current + 1..entry.level {
                    open_list(&mut out, &mut levels, skipped);
                    indent(&mut out, levels.len());
                    out.push_str("<li>\n");
                }
                open_list(&mut out, &mut levels, entry.level);
            }
            Some(_) => {
                out.push_str("</li>\n");
                while levels.len() > 1 && levels.last().is_some_and(|&l| entry.level < l) {
                    close_list(&mut out, &mut levels);
                }
            }
        }
        indent(&mut out, levels.len());
        out.push_str("<li><a href=\"#");
        escape_html_into(&mut out, &entry.anchor);
        out.push_str("\">");
        out.push_str(&entry.label);
        out.push_str("</a>");
    }

    if !levels.is_empty() {
        out.push_str("</li>\n");
    }
    while !levels.is_empty() {
        close_list(&mut out, &mut levels);
    }
    out
}
