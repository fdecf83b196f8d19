use serde::Serialize;

/// The `% title / % author / % date` header of a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.date.is_none()
    }
}

/// Splits a three-line `%` header off the front of `source`.
///
/// Extraction is all-or-nothing: unless the first three lines all qualify,
/// nothing is consumed and the returned body is `source` itself.
pub(crate) fn extract_metadata(source: &str) -> (Metadata, &str) {
    let mut rest = source;
    let mut fields: [Option<String>; 3] = [None, None, None];
    for field in fields.iter_mut() {
        if rest.is_empty() {
            return (Metadata::default(), source);
        }
        let (line, next) = match memchr::memchr(b'\n', rest.as_bytes()) {
            Some(nl) => (&rest[..nl], &rest[nl + 1..]),
            None => (rest, ""),
        };
        let Some(value) = header_value(line) else {
            return (Metadata::default(), source);
        };
        *field = (!value.is_empty()).then(|| value.to_string());
        rest = next;
    }
    let [title, author, date] = fields;
    (
        Metadata {
            title,
            author,
            date,
        },
        rest,
    )
}

fn header_value(line: &str) -> Option<&str> {
    let line = crate::html::trim_cr(line);
    let after = line.strip_prefix('%')?;
    match after.as_bytes().first() {
        None => Some(""),
        Some(b) if b.is_ascii_whitespace() => Some(after.trim()),
        Some(_) => None,
    }
}
