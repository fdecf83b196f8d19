use super::*;

pub(super) fn is_thematic_break(line: &str) -> bool {
    let mut marker: u8 = 0;
    let mut count: u32 = 0;
    for &b in line.as_bytes() {
        match b {
            b' ' | b'\t' => continue,
            b'*' | b'-' | b'_' => {
                if marker == 0 {
                    marker = b;
                } else if b != marker {
                    return false;
                }
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

pub(super) fn parse_atx_heading(line: &str) -> Option<(u8, &str)> {
    let bytes = line.as_bytes();
    let level = bytes.iter().take_while(|&&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    // must be followed by space/tab or end of line
    if level < bytes.len() && bytes[level] != b' ' && bytes[level] != b'\t' {
        return None;
    }
    let content = strip_closing_hashes(line[level..].trim());
    Some((level as u8, content))
}

pub(super) fn strip_closing_hashes(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b'#' {
        end -= 1;
    }
    if end == bytes.len() {
        return s;
    }
    if end == 0 {
        return "";
    }
    if bytes[end - 1] == b' ' || bytes[end - 1] == b'\t' {
        s[..end].trim_end()
    } else {
        s
    }
}

pub(super) fn parse_setext_underline(line: &str) -> Option<u8> {
    let trimmed = line.trim();
    let ch = *trimmed.as_bytes().first()?;
    if ch != b'=' && ch != b'-' {
        return None;
    }
    if !trimmed.bytes().all(|b| b == ch) {
        return None;
    }
    Some(if ch == b'=' { 1 } else { 2 })
}

pub(super) fn parse_fence_start(line: &str) -> Option<(u8, usize, &str)> {
    let ch = *line.as_bytes().first()?;
    if ch != b'`' && ch != b'~' {
        return None;
    }
    let count = line.bytes().take_while(|&b| b == ch).count();
    if count < 3 {
        return None;
    }
    let info = line[count..].trim();
    // backtick fences cannot have backticks in the info string
    if ch == b'`' && info.contains('`') {
        return None;
    }
    Some((ch, count, info))
}

#[inline]
pub(super) fn is_closing_fence(line: &str, fence_char: u8, fence_len: usize) -> bool {
    let bytes = line.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    while i < len && i < 3 && bytes[i] == b' ' {
        i += 1;
    }
    if i >= len || bytes[i] != fence_char {
        return false;
    }
    let fence_start = i;
    while i < len && bytes[i] == fence_char {
        i += 1;
    }
    if i - fence_start < fence_len {
        return false;
    }
    bytes[i..].iter().all(|&b| b == b' ' || b == b'\t')
}

/// Parses a table separator line like `| --- | :---: | ---: |`.
pub(super) fn parse_table_separator(line: &str) -> Option<Vec<TableAlignment>> {
    let trimmed = line.trim();
    if !trimmed.contains('|') {
        return None;
    }
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    if inner.trim().is_empty() {
        return None;
    }

    let mut alignments = Vec::new();
    for cell in inner.split('|') {
        let c = cell.trim();
        if c.is_empty() {
            return None;
        }
        let left = c.starts_with(':');
        let right = c.len() > 1 && c.ends_with(':');
        let dashes = &c[usize::from(left)..c.len() - usize::from(right)];
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        alignments.push(match (left, right) {
            (true, true) => TableAlignment::Center,
            (true, false) => TableAlignment::Left,
            (false, true) => TableAlignment::Right,
            (false, false) => TableAlignment::None,
        });
    }
    Some(alignments)
}

/// Splits a table row on unescaped pipes, trimming each cell. A leading and
/// a trailing pipe are optional.
pub(super) fn split_table_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = match inner.strip_suffix('|') {
        Some(s) if !s.ends_with('\\') => s,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut cell_start = 0;
    let bytes = inner.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1) == Some(&b'|') => i += 2,
            b'`' => {
                // pipes inside a code span do not split cells
                let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                let fence = &inner[i..i + run];
                match inner[i + run..].find(fence) {
                    Some(close) => i += run + close + run,
                    None => i += run,
                }
            }
            b'|' => {
                cells.push(inner[cell_start..i].trim().to_string());
                i += 1;
                cell_start = i;
            }
            _ => i += 1,
        }
    }
    cells.push(inner[cell_start..].trim().to_string());
    cells
}

/// A table row padded or truncated to `num_cols` cells.
pub(super) fn parse_table_row(line: &str, num_cols: usize) -> Vec<String> {
    let mut cells = split_table_row(line);
    cells.resize(num_cols, String::new());
    cells
}

#[derive(Debug, Clone)]
pub(super) struct ListMarkerInfo {
    pub kind: ListKind,
    pub marker_len: usize, // bytes of the marker itself: "-" = 1, "10." = 3
    pub start_num: u32,
    pub is_empty_item: bool, // marker followed by nothing or only blanks
}

fn rest_is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == b' ' || b == b'\t')
}

#[inline]
fn followed_by_space(bytes: &[u8], i: usize) -> bool {
    i >= bytes.len() || bytes[i] == b' ' || bytes[i] == b'\t'
}

/// Recognizes `-`, `*`, `+`, `1.`, `1)` and, when `alpha` is set, `a.` / `A.`.
#[inline]
pub(super) fn parse_list_marker(line: &str, alpha: bool) -> Option<ListMarkerInfo> {
    let bytes = line.as_bytes();
    let b0 = *bytes.first()?;

    if matches!(b0, b'-' | b'*' | b'+') {
        if !followed_by_space(bytes, 1) {
            return None;
        }
        return Some(ListMarkerInfo {
            kind: ListKind::Bullet(b0),
            marker_len: 1,
            start_num: 0,
            is_empty_item: rest_is_blank(&bytes[1..]),
        });
    }

    if b0.is_ascii_digit() {
        let digits = bytes.iter().take(9).take_while(|b| b.is_ascii_digit()).count();
        let delim = *bytes.get(digits)?;
        if (delim != b'.' && delim != b')') || !followed_by_space(bytes, digits + 1) {
            return None;
        }
        let start_num = line[..digits].parse::<u32>().ok()?;
        return Some(ListMarkerInfo {
            kind: ListKind::Ordered(delim),
            marker_len: digits + 1,
            start_num,
            is_empty_item: rest_is_blank(&bytes[digits + 1..]),
        });
    }

    if alpha && b0.is_ascii_alphabetic() && bytes.get(1) == Some(&b'.') && followed_by_space(bytes, 2)
    {
        let case = if b0.is_ascii_lowercase() { b'a' } else { b'A' };
        return Some(ListMarkerInfo {
            kind: ListKind::Alphabetic(case),
            marker_len: 2,
            start_num: u32::from(b0.to_ascii_lowercase() - b'a') + 1,
            is_empty_item: rest_is_blank(&bytes[2..]),
        });
    }

    None
}

pub(super) fn can_interrupt_paragraph(marker: &ListMarkerInfo) -> bool {
    if marker.is_empty_item {
        return false;
    }
    match marker.kind {
        ListKind::Bullet(_) => true,
        ListKind::Ordered(_) => marker.start_num == 1,
        ListKind::Alphabetic(_) => false,
    }
}

/// `: definition` (a colon followed by whitespace).
pub(super) fn is_definition_marker(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 2 && bytes[0] == b':' && (bytes[1] == b' ' || bytes[1] == b'\t')
}

/// Parses the `[^label]:` opener of a footnote definition, returning the
/// label and the bytes consumed through the colon.
pub(super) fn parse_footnote_label(line: &str) -> Option<(&str, usize)> {
    let rest = line.strip_prefix("[^")?;
    let close = rest.find(']')?;
    let label = &rest[..close];
    if label.trim().is_empty() || label.contains('[') || label.len() > 999 {
        return None;
    }
    if rest.as_bytes().get(close + 1) != Some(&b':') {
        return None;
    }
    Some((label, 2 + close + 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn atx_heading_basic() {
        assert_eq!(parse_atx_heading("# foo"), Some((1, "foo")));
        assert_eq!(parse_atx_heading("## foo"), Some((2, "foo")));
        assert_eq!(parse_atx_heading("###### foo"), Some((6, "foo")));
        assert_eq!(parse_atx_heading("####### foo"), None);
        assert_eq!(parse_atx_heading("#foo"), None);
        assert_eq!(parse_atx_heading("#"), Some((1, "")));
    }

    #[test]
    fn atx_heading_closing() {
        assert_eq!(parse_atx_heading("# foo ##"), Some((1, "foo")));
        assert_eq!(parse_atx_heading("## foo#"), Some((2, "foo#")));
        assert_eq!(parse_atx_heading("# ###"), Some((1, "")));
    }

    #[test]
    fn thematic_break_basic() {
        assert!(is_thematic_break("***"));
        assert!(is_thematic_break("---"));
        assert!(is_thematic_break("___"));
        assert!(is_thematic_break(" * * *"));
        assert!(!is_thematic_break("--"));
        assert!(!is_thematic_break("*-*"));
    }

    #[test]
    fn fence_start_basic() {
        assert_eq!(parse_fence_start("```"), Some((b'`', 3, "")));
        assert_eq!(parse_fence_start("```rust"), Some((b'`', 3, "rust")));
        assert_eq!(parse_fence_start("~~~~ py "), Some((b'~', 4, "py")));
        assert_eq!(parse_fence_start("``"), None);
        assert_eq!(parse_fence_start("``` a`b"), None);
        assert!(is_closing_fence("````", b'`', 3));
        assert!(!is_closing_fence("``", b'`', 3));
        assert!(!is_closing_fence("``` x", b'`', 3));
    }

    #[test]
    fn list_marker_basic() {
        let m = parse_list_marker("- foo", true).unwrap();
        assert_eq!(m.kind, ListKind::Bullet(b'-'));

        let m = parse_list_marker("12) foo", true).unwrap();
        assert_eq!(m.kind, ListKind::Ordered(b')'));
        assert_eq!(m.start_num, 12);
        assert_eq!(m.marker_len, 3);

        assert!(parse_list_marker("-foo", true).is_none());
        assert!(parse_list_marker("1.5 apples", true).is_none());
    }

    #[test]
    fn alphabetic_markers_follow_option() {
        let m = parse_list_marker("c. third", true).unwrap();
        assert_eq!(m.kind, ListKind::Alphabetic(b'a'));
        assert_eq!(m.start_num, 3);
        let m = parse_list_marker("B. second", true).unwrap();
        assert_eq!(m.kind, ListKind::Alphabetic(b'A'));
        assert!(parse_list_marker("c. third", false).is_none());
        assert!(parse_list_marker("ab. no", true).is_none());
        assert!(!can_interrupt_paragraph(&parse_list_marker("a. x", true).unwrap()));
    }

    #[test]
    fn table_separator_alignments() {
        assert_eq!(
            parse_table_separator("| :-- | :-: | --: | --- |"),
            Some(vec![
                TableAlignment::Left,
                TableAlignment::Center,
                TableAlignment::Right,
                TableAlignment::None,
            ])
        );
        assert_eq!(parse_table_separator("--- | ---"), Some(vec![TableAlignment::None; 2]));
        assert_eq!(parse_table_separator("---"), None);
        assert_eq!(parse_table_separator("| -x- |"), None);
    }

    #[test]
    fn table_rows_split_on_unescaped_pipes() {
        assert_eq!(split_table_row("| a | b \\| c |"), vec!["a", "b \\| c"]);
        assert_eq!(split_table_row("a | `x|y` | b"), vec!["a", "`x|y`", "b"]);
        assert_eq!(parse_table_row("| a |", 3), vec!["a", "", ""]);
        assert_eq!(parse_table_row("a|b|c|d", 2), vec!["a", "b"]);
    }

    #[test]
    fn definition_and_footnote_openers() {
        assert!(is_definition_marker(": a fruit"));
        assert!(!is_definition_marker(":fruit"));
        assert!(!is_definition_marker(":"));
        assert_eq!(parse_footnote_label("[^1]: text"), Some(("1", 5)));
        assert_eq!(parse_footnote_label("[^note]:"), Some(("note", 8)));
        assert_eq!(parse_footnote_label("[^note] text"), None);
        assert_eq!(parse_footnote_label("[note]: /url"), None);
        assert_eq!(parse_footnote_label("[^ ]: x"), None);
    }
}
