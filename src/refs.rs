use std::borrow::Cow;
use std::collections::HashMap;

use serde::Serialize;

use crate::ast::Block;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LinkReference {
    pub url: String,
    pub title: Option<String>,
}

/// Link reference definitions and footnote bodies, keyed by normalized label.
///
/// Populated while blocks are assembled, consulted by the inline pass. The
/// first definition of a label wins; later ones are ignored.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    links: HashMap<String, LinkReference>,
    footnotes: HashMap<String, Vec<Block<String>>>,
}

impl ReferenceTable {
    pub fn link(&self, label: &str) -> Option<&LinkReference> {
        self.links.get(&*normalize_reference_label(label))
    }

    pub fn links_len(&self) -> usize {
        self.links.len()
    }

    pub fn has_footnote(&self, label: &str) -> bool {
        self.footnotes
            .contains_key(&*normalize_reference_label(label))
    }

    pub fn footnotes_len(&self) -> usize {
        self.footnotes.len()
    }

    pub(crate) fn has_links(&self) -> bool {
        !self.links.is_empty()
    }

    /// Returns `false` when the label was already defined.
    pub(crate) fn define_link(&mut self, label: &str, url: String, title: Option<String>) -> bool {
        let key = normalize_reference_label(label).into_owned();
        if self.links.contains_key(&key) {
            return false;
        }
        self.links.insert(key, LinkReference { url, title });
        true
    }

    pub(crate) fn define_footnote(&mut self, label: &str, body: Vec<Block<String>>) -> bool {
        let key = normalize_reference_label(label).into_owned();
        if self.footnotes.contains_key(&key) {
            return false;
        }
        self.footnotes.insert(key, body);
        true
    }

    pub(crate) fn footnote(&self, key: &str) -> Option<&[Block<String>]> {
        self.footnotes.get(key).map(Vec::as_slice)
    }

    /// Folds definitions from a nested parse into this table; existing
    /// labels keep their first definition.
    pub(crate) fn absorb(&mut self, other: ReferenceTable) {
        for (key, link) in other.links {
            self.links.entry(key).or_insert(link);
        }
        for (key, body) in other.footnotes {
            self.footnotes.entry(key).or_insert(body);
        }
    }
}

/// Case-folds and collapses internal whitespace.
pub(crate) fn normalize_reference_label(label: &str) -> Cow<'_, str> {
    let trimmed = label.trim();
    let bytes = trimmed.as_bytes();

    let mut simple = true;
    let mut prev_space = false;
    for &b in bytes {
        if b.is_ascii_uppercase() || b == b'\t' || b == b'\n' || b == b'\r' || b >= 0x80 {
            simple = false;
            break;
        }
        if b == b' ' {
            if prev_space {
                simple = false;
                break;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
    }
    if simple {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        match c {
            'ß' | 'ẞ' => out.push_str("ss"),
            c if c.is_ascii() => out.push(c.to_ascii_lowercase()),
            c => out.extend(c.to_lowercase()),
        }
    }
    Cow::Owned(out)
}
