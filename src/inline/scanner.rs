use super::*;
use crate::html::entity_len;

impl<'a, 'r> InlineScanner<'a, 'r> {
    pub(super) fn scan_all(&mut self) {
        let mut text_start = self.pos;

        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if !SPECIAL[b as usize] {
                self.pos += 1;
                while self.pos < self.bytes.len() && !SPECIAL[self.bytes[self.pos] as usize] {
                    self.pos += 1;
                }
                continue;
            }

            let consumed = match b {
                b'\\' => self.scan_backslash(text_start),
                b'`' => {
                    self.flush_text_range(text_start, self.pos);
                    self.scan_code_span();
                    true
                }
                b'*' | b'_' => self.scan_delim_run(b, text_start),
                b'~' => {
                    !self.opts().disable_strikethrough
                        && self.bytes.get(self.pos + 1) == Some(&b'~')
                        && self.scan_delim_run(b'~', text_start)
                }
                b'!' => self.scan_image_open(text_start),
                b'[' => {
                    if self.opts().enable_markdown_extra_footnotes
                        && self.bytes.get(self.pos + 1) == Some(&b'^')
                        && self.try_footnote_ref(text_start)
                    {
                        true
                    } else if self.opts().disable_links {
                        false
                    } else {
                        self.flush_text_range(text_start, self.pos);
                        self.open_bracket(false);
                        true
                    }
                }
                b']' => {
                    self.flush_text_range(text_start, self.pos);
                    self.pos += 1;
                    self.handle_close_bracket();
                    true
                }
                b'<' => {
                    (!self.opts().disable_links && self.try_autolink(text_start))
                        || self.try_html_inline(text_start)
                }
                b'&' => match entity_len(self.bytes, self.pos) {
                    Some(len) => {
                        self.flush_text_range(text_start, self.pos);
                        self.items
                            .push(InlineItem::Entity(self.pos, self.pos + len));
                        self.pos += len;
                        true
                    }
                    None => false,
                },
                b'\n' => {
                    let is_hard = self.pos >= text_start + 2
                        && self.bytes[self.pos - 1] == b' '
                        && self.bytes[self.pos - 2] == b' ';
                    let mut text_end = self.pos;
                    while text_end > text_start && self.bytes[text_end - 1] == b' ' {
                        text_end -= 1;
                    }
                    self.flush_text_range(text_start, text_end);
                    self.items.push(if is_hard {
                        InlineItem::LineBreak
                    } else {
                        InlineItem::SoftBreak
                    });
                    self.pos += 1;
                    true
                }
                b':' => self.autolinks_enabled() && self.try_bare_url(text_start),
                b'@' => self.autolinks_enabled() && self.try_bare_email(text_start),
                b'^' => !self.opts().disable_superscript && self.try_superscript(text_start),
                _ => !self.opts().disable_smart_formatting && self.try_smart(text_start),
            };

            if consumed {
                text_start = self.pos;
            } else {
                self.pos += 1;
            }
        }
        self.flush_text_range(text_start, self.pos);
    }

    #[inline]
    pub(super) fn flush_text_range(&mut self, start: usize, end: usize) {
        if start < end {
            self.items.push(InlineItem::Text(start, end));
        }
    }

    #[inline]
    fn autolinks_enabled(&self) -> bool {
        self.opts().automatically_create_links && !self.opts().disable_links
    }

    fn scan_backslash(&mut self, text_start: usize) -> bool {
        let Some(&next) = self.bytes.get(self.pos + 1) else {
            return false;
        };
        if next == b'\n' {
            self.flush_text_range(text_start, self.pos);
            self.items.push(InlineItem::LineBreak);
            self.pos += 2;
            return true;
        }
        if is_ascii_punctuation(next) {
            self.flush_text_range(text_start, self.pos);
            self.items
                .push(InlineItem::Text(self.pos + 1, self.pos + 2));
            self.pos += 2;
            return true;
        }
        false
    }

    fn scan_image_open(&mut self, text_start: usize) -> bool {
        if self.bytes.get(self.pos + 1) != Some(&b'[') {
            return false;
        }
        if self.opts().disable_images {
            // step over both bytes so the `[` is not taken for a link
            self.pos += 1;
            return false;
        }
        self.flush_text_range(text_start, self.pos);
        self.pos += 1;
        self.open_bracket(true);
        true
    }

    fn open_bracket(&mut self, is_image: bool) {
        let idx = self.items.len();
        self.items.push(InlineItem::BracketOpen { is_image });
        self.pos += 1;
        self.brackets.push(BracketInfo {
            item_idx: idx,
            is_image,
            delim_bottom: self.delims.len(),
            active: true,
            text_pos: self.pos,
        });
    }

    pub(super) fn scan_code_span(&mut self) {
        let start = self.pos;
        let open_count = self.bytes[start..].iter().take_while(|&&b| b == b'`').count();
        let after_open = start + open_count;
        self.pos = after_open;
        loop {
            match memchr::memchr(b'`', &self.bytes[self.pos..]) {
                Some(idx) => self.pos += idx,
                None => {
                    // no closer: the backticks are literal
                    self.items.push(InlineItem::Text(start, after_open));
                    self.pos = after_open;
                    return;
                }
            }
            let close_start = self.pos;
            let close_count = self.bytes[close_start..]
                .iter()
                .take_while(|&&b| b == b'`')
                .count();
            self.pos += close_count;
            if close_count != open_count {
                continue;
            }
            let content = self.input[after_open..close_start].replace('\n', " ");
            let stripped = if content.len() >= 2
                && content.starts_with(' ')
                && content.ends_with(' ')
                && !content.bytes().all(|b| b == b' ')
            {
                content[1..content.len() - 1].to_string()
            } else {
                content
            };
            self.items.push(InlineItem::Code(stripped));
            return;
        }
    }

    /// Records a run of `marker`. Runs that can neither open nor close stay
    /// part of the surrounding text.
    pub(super) fn scan_delim_run(&mut self, marker: u8, text_start: usize) -> bool {
        let run_start = self.pos;
        let count = self.bytes[run_start..]
            .iter()
            .take_while(|&&b| b == marker)
            .count();
        let before = char_before(self.input, run_start);
        let after = char_at(self.input, run_start + count);
        let (can_open, can_close) = flanking(marker, before, after);
        if !can_open && !can_close {
            self.pos += count - 1;
            return false;
        }

        self.flush_text_range(text_start, run_start);
        self.pos = run_start + count;
        let idx = self.items.len();
        self.items.push(InlineItem::DelimRun {
            kind: marker,
            count: count as u16,
            can_open,
            can_close,
            open_em: SmallEmVec::new(),
            close_em: SmallEmVec::new(),
        });
        self.delims.push(idx);
        true
    }

    pub(super) fn handle_close_bracket(&mut self) {
        let Some(bracket) = self.brackets.last().cloned() else {
            self.items.push(InlineItem::Literal("]"));
            return;
        };
        if !bracket.active {
            self.brackets.pop();
            self.items.push(InlineItem::Literal("]"));
            return;
        }
        let bi = self.brackets.len() - 1;
        let close_pos = self.pos - 1;

        let target = self
            .try_inline_link()
            .or_else(|| self.try_reference_link(bracket.text_pos, close_pos));
        match target {
            Some((url, title)) => self.resolve_link(bi, &bracket, url, title),
            None => {
                self.brackets.pop();
                self.items.push(InlineItem::Literal("]"));
            }
        }
    }

    fn resolve_link(
        &mut self,
        bi: usize,
        bracket: &BracketInfo,
        url: String,
        title: Option<String>,
    ) {
        // links may not contain other links
        if !bracket.is_image {
            for b in &mut self.brackets[..bi] {
                if !b.is_image {
                    b.active = false;
                }
            }
        }
        self.brackets.truncate(bi);
        self.process_emphasis(bracket.delim_bottom);
        let link_idx = self.links.len() as u16;
        self.links.push(LinkInfo {
            url,
            title,
            is_image: bracket.is_image,
        });
        self.items[bracket.item_idx] = InlineItem::LinkStart(link_idx);
        self.items.push(InlineItem::LinkEnd);
    }

    fn delim_at(&self, di: usize) -> Option<(u8, u16, bool, bool)> {
        match &self.items[self.delims[di]] {
            InlineItem::DelimRun {
                kind,
                count,
                can_open,
                can_close,
                ..
            } => Some((*kind, *count, *can_open, *can_close)),
            _ => None,
        }
    }

    fn delim_count(&self, di: usize) -> u16 {
        self.delim_at(di).map_or(0, |(_, count, _, _)| count)
    }

    pub(super) fn process_emphasis(&mut self, stack_bottom: usize) {
        let mut closer_di = stack_bottom;
        while closer_di < self.delims.len() {
            let Some((ckind, ccount, ccan_open, ccan_close)) = self.delim_at(closer_di) else {
                closer_di += 1;
                continue;
            };
            if !ccan_close || ccount == 0 {
                closer_di += 1;
                continue;
            }

            let mut found = None;
            let mut odi = closer_di;
            while odi > stack_bottom {
                odi -= 1;
                let Some((okind, ocount, ocan_open, ocan_close)) = self.delim_at(odi) else {
                    continue;
                };
                if okind != ckind || !ocan_open || ocount == 0 {
                    continue;
                }
                if ckind == b'~' {
                    if ocount < 2 || ccount < 2 {
                        continue;
                    }
                } else if (ocan_close || ccan_open)
                    && (ocount + ccount) % 3 == 0
                    && (ocount % 3 != 0 || ccount % 3 != 0)
                {
                    continue;
                }
                found = Some((odi, ocount));
                break;
            }

            let Some((opener_di, ocount)) = found else {
                closer_di += 1;
                continue;
            };

            let (use_count, tag) = match ckind {
                b'~' => (2, TAG_DEL),
                _ if ocount >= 2 && ccount >= 2 => (2, TAG_STRONG),
                _ => (1, TAG_EM),
            };

            let oi = self.delims[opener_di];
            let ci = self.delims[closer_di];
            if let InlineItem::DelimRun { count, open_em, .. } = &mut self.items[oi] {
                *count -= use_count;
                open_em.push(tag);
            }
            if let InlineItem::DelimRun {
                count, close_em, ..
            } = &mut self.items[ci]
            {
                *count -= use_count;
                close_em.push(tag);
            }

            // delimiters between the pair can no longer match
            if opener_di + 1 < closer_di {
                self.delims.drain(opener_di + 1..closer_di);
                closer_di = opener_di + 1;
            }
            if self.delim_count(opener_di) == 0 {
                self.delims.remove(opener_di);
                closer_di -= 1;
            }
            if self.delim_count(closer_di) == 0 {
                self.delims.remove(closer_di);
            }
        }
        self.delims.truncate(stack_bottom);
    }

    fn try_footnote_ref(&mut self, text_start: usize) -> bool {
        let rest = &self.input[self.pos..];
        let Some(close) = rest.find(']') else {
            return false;
        };
        let label = &rest[2..close];
        if label.trim().is_empty()
            || label.contains(['[', '\n'])
            || !self.ctx.refs.has_footnote(label)
        {
            return false;
        }
        self.flush_text_range(text_start, self.pos);
        let number = self.ctx.footnote_number(label);
        self.items.push(InlineItem::FootnoteRef {
            label: label.to_string(),
            number,
        });
        self.pos += close + 1;
        true
    }

    /// The `)` balancing the `(` at `open`. Every pair in the input is
    /// matched on first use, so repeated lookups stay linear overall.
    fn closing_paren(&mut self, open: usize) -> Option<usize> {
        let bytes = self.bytes;
        let pairs = self.paren_pairs.get_or_insert_with(|| {
            let mut pairs = Vec::new();
            let mut opens = Vec::new();
            for (i, &b) in bytes.iter().enumerate() {
                match b {
                    b'(' => opens.push(i),
                    b')' => {
                        if let Some(o) = opens.pop() {
                            pairs.push((o, i));
                        }
                    }
                    _ => {}
                }
            }
            pairs.sort_unstable();
            pairs
        });
        let idx = pairs.binary_search_by_key(&open, |&(o, _)| o).ok()?;
        Some(pairs[idx].1)
    }

    fn try_superscript(&mut self, text_start: usize) -> bool {
        let before = char_before(self.input, self.pos);
        if self.pos == 0 || before.is_whitespace() || matches!(before, '[' | '(' | '{' | '^') {
            return false;
        }
        let input = self.input;
        let start = self.pos + 1;

        if self.bytes.get(start) == Some(&b'(') {
            if self.ctx.superscript_depth >= MAX_SUPERSCRIPT_NESTING {
                return false;
            }
            let Some(end) = self.closing_paren(start) else {
                return false;
            };
            let inner = &input[start + 1..end];
            if inner.trim().is_empty() {
                return false;
            }
            self.flush_text_range(text_start, self.pos);
            self.ctx.superscript_depth += 1;
            let children = parse_inlines(inner, &mut *self.ctx);
            self.ctx.superscript_depth -= 1;
            self.items.push(InlineItem::Superscript(children));
            self.pos = end + 1;
            return true;
        }

        let word_len: usize = input[start..]
            .chars()
            .take_while(|c| c.is_alphanumeric())
            .map(char::len_utf8)
            .sum();
        if word_len == 0 {
            return false;
        }
        self.flush_text_range(text_start, self.pos);
        self.items.push(InlineItem::Superscript(vec![Inline::Text(
            input[start..start + word_len].to_string(),
        )]));
        self.pos = start + word_len;
        true
    }

    fn try_smart(&mut self, text_start: usize) -> bool {
        match self.smart_punct_at() {
            Ok((punct, len)) => {
                self.flush_text_range(text_start, self.pos);
                self.items.push(InlineItem::Smart(punct));
                self.pos += len;
                true
            }
            Err(skip) => {
                // the rest of an unmatched dash or dot run is plain text
                self.pos += skip;
                false
            }
        }
    }

    /// The substitution starting at the cursor and its length, or the number
    /// of extra bytes to treat as plain text.
    fn smart_punct_at(&self) -> Result<(SmartPunct, usize), usize> {
        let rest = &self.bytes[self.pos..];
        let before = char_before(self.input, self.pos);
        let after = char_at(self.input, self.pos + 1);
        let opens = before.is_whitespace() || matches!(before, '(' | '[' | '{' | '-');

        match rest[0] {
            b'"' => {
                if opens && !after.is_whitespace() {
                    Ok((SmartPunct::LeftDoubleQuote, 1))
                } else if !before.is_whitespace() {
                    Ok((SmartPunct::RightDoubleQuote, 1))
                } else {
                    Err(0)
                }
            }
            b'\'' => {
                if before.is_alphanumeric() {
                    Ok((SmartPunct::RightSingleQuote, 1))
                } else if opens && !after.is_whitespace() {
                    Ok((SmartPunct::LeftSingleQuote, 1))
                } else if !before.is_whitespace() {
                    Ok((SmartPunct::RightSingleQuote, 1))
                } else {
                    Err(0)
                }
            }
            b'-' | b'.' => {
                let run = rest.iter().take_while(|&&b| b == rest[0]).count();
                match (rest[0], run) {
                    (b'-', 2) => Ok((SmartPunct::EnDash, 2)),
                    (b'-', 3) => Ok((SmartPunct::EmDash, 3)),
                    (b'.', 3) => Ok((SmartPunct::Ellipsis, 3)),
                    _ => Err(run - 1),
                }
            }
            b'(' => {
                let symbol = |s: &[u8]| rest.len() >= s.len() && rest[..s.len()].eq_ignore_ascii_case(s);
                if symbol(b"(c)") {
                    Ok((SmartPunct::Copyright, 3))
                } else if symbol(b"(r)") {
                    Ok((SmartPunct::Registered, 3))
                } else if symbol(b"(tm)") {
                    Ok((SmartPunct::Trademark, 4))
                } else {
                    Err(0)
                }
            }
            b'1' | b'3' => {
                let punct = match rest.get(..3) {
                    Some(b"1/2") => SmartPunct::OneHalf,
                    Some(b"1/4") => SmartPunct::OneQuarter,
                    Some(b"3/4") => SmartPunct::ThreeQuarters,
                    _ => return Err(0),
                };
                let next = char_at(self.input, self.pos + 3);
                let standalone = |c: char| !c.is_alphanumeric() && c != '/' && c != '.';
                if standalone(before) && standalone(next) {
                    Ok((punct, 3))
                } else {
                    Err(0)
                }
            }
            _ => Err(0),
        }
    }

    fn try_bare_url(&mut self, text_start: usize) -> bool {
        let bytes = self.bytes;
        let len = bytes.len();
        let colon_pos = self.pos;

        if colon_pos + 3 >= len || bytes[colon_pos + 1] != b'/' || bytes[colon_pos + 2] != b'/' {
            return false;
        }

        let Some(scheme_start) = ["https", "http", "ftp"].iter().find_map(|scheme| {
            let start = colon_pos.checked_sub(scheme.len())?;
            let is_scheme = bytes[start..colon_pos].eq_ignore_ascii_case(scheme.as_bytes());
            (start >= text_start && is_scheme).then_some(start)
        }) else {
            return false;
        };

        if scheme_start > 0 {
            let prev = bytes[scheme_start - 1];
            if prev.is_ascii_alphanumeric() || prev == b'_' {
                return false;
            }
        }

        let body_start = colon_pos + 3;
        let mut end = body_start;
        let mut paren_depth: i32 = 0;
        while end < len {
            let b = bytes[end];
            if b <= b' ' || b == b'<' {
                break;
            }
            if b == b'(' {
                paren_depth += 1;
            } else if b == b')' {
                if paren_depth <= 0 {
                    break;
                }
                paren_depth -= 1;
            }
            end += 1;
        }

        // trailing punctuation belongs to the sentence, not the URL
        while end > body_start {
            let last = bytes[end - 1];
            if !matches!(
                last,
                b'.' | b',' | b':' | b';' | b'!' | b'?' | b'"' | b'\'' | b')' | b']'
            ) {
                break;
            }
            if last == b')' {
                let url = &bytes[scheme_start..end];
                let opens = url.iter().filter(|&&b| b == b'(').count();
                let closes = url.iter().filter(|&&b| b == b')').count();
                if closes <= opens {
                    break;
                }
            }
            end -= 1;
        }

        if end <= body_start {
            return false;
        }

        self.flush_text_range(text_start, scheme_start);
        let url = self.input[scheme_start..end].to_string();
        self.items.push(InlineItem::Autolink {
            text: url.clone(),
            url,
        });
        self.pos = end;
        true
    }

    fn try_bare_email(&mut self, text_start: usize) -> bool {
        let bytes = self.bytes;
        let at_pos = self.pos;

        let mut local_start = at_pos;
        while local_start > text_start && is_email_local_byte(bytes[local_start - 1]) {
            local_start -= 1;
        }
        if local_start == at_pos {
            return false;
        }

        let domain_start = at_pos + 1;
        let end = domain_start
            + bytes[domain_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-' || **b == b'.')
                .count();
        // a trailing dot ends the sentence
        let end = if end > domain_start && bytes[end - 1] == b'.' {
            end - 1
        } else {
            end
        };
        if end == domain_start || bytes[end - 1] == b'-' {
            return false;
        }
        let domain = &self.input[domain_start..end];
        match domain.rfind('.') {
            Some(dot) if dot > 0 && dot + 1 < domain.len() => {}
            _ => return false,
        }

        self.flush_text_range(text_start, local_start);
        let address = &self.input[local_start..end];
        self.items.push(InlineItem::Autolink {
            url: format!("mailto:{address}"),
            text: address.to_string(),
        });
        self.pos = end;
        true
    }
}
