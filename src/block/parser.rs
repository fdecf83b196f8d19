use super::*;

impl<'a> BlockParser<'a> {
    #[inline(never)]
    pub(super) fn process_line(&mut self, mut line: Line<'a>) {
        let num_open = self.open.len();

        // fenced code directly under the document skips container matching
        if num_open == 2 && matches!(self.open[1].block_type, OpenBlockType::FencedCode(_)) {
            self.continue_fenced_code(1, &line);
            return;
        }

        // Phase 1: match continuation markers of the open containers
        let mut matched = 1;
        let mut all_matched = true;
        for i in 1..num_open {
            let required_indent = match &self.open[i].block_type {
                OpenBlockType::Document => {
                    matched = i + 1;
                    continue;
                }
                OpenBlockType::BlockQuote => {
                    let ns = line.peek();
                    if ns.col - line.col <= 3 && ns.byte == Some(b'>') {
                        line.skip_blockquote_marker();
                        matched = i + 1;
                        continue;
                    }
                    all_matched = false;
                    break;
                }
                OpenBlockType::ListItem {
                    content_col,
                    started_blank,
                } => {
                    let (content_col, started_blank) = (*content_col, *started_blank);
                    let ns = line.peek();
                    if ns.byte.is_none() {
                        // an item that opened on a blank line and got nothing
                        // else ends at the next blank line
                        if started_blank
                            && self.open[i].children.is_empty()
                            && self.open[i].content.is_empty()
                            && !self.has_open_leaf_after(i)
                        {
                            all_matched = false;
                            break;
                        }
                        line.skip_indent(content_col);
                        matched = i + 1;
                        continue;
                    }
                    if ns.col - line.col < content_col {
                        all_matched = false;
                        break;
                    }
                    content_col
                }
                OpenBlockType::Definition { content_col } => *content_col,
                OpenBlockType::FootnoteDef { .. } => FOOTNOTE_INDENT,
                _ => {
                    // leaves take their lines below
                    matched = i;
                    all_matched = false;
                    break;
                }
            };
            if line.is_blank() || line.indent() >= required_indent {
                line.skip_indent(required_indent);
                matched = i + 1;
            } else {
                all_matched = false;
                break;
            }
        }
        if all_matched {
            matched = num_open;
        }

        let tip_idx = num_open - 1;
        if self.open[tip_idx].block_type.is_leaf() && matched + 1 >= num_open {
            match &self.open[tip_idx].block_type {
                OpenBlockType::FencedCode(_) => {
                    self.continue_fenced_code(tip_idx, &line);
                    return;
                }
                OpenBlockType::IndentedCode => {
                    self.continue_indented_code(tip_idx, line);
                    return;
                }
                OpenBlockType::HtmlBlock { end_condition, .. } => {
                    let end_condition = *end_condition;
                    if end_condition == HtmlBlockEnd::BlankLine && line.is_blank() {
                        self.close_top_block();
                        return;
                    }
                    let rem = line.remainder();
                    let content = &mut self.open[tip_idx].content;
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(rem);
                    if html_block_ends(&end_condition, rem) {
                        self.close_top_block();
                    }
                    return;
                }
                OpenBlockType::Table(_) => {
                    self.continue_table(tip_idx, line);
                    return;
                }
                OpenBlockType::Paragraph => {
                    self.continue_paragraph(tip_idx, line);
                    return;
                }
                _ => {}
            }
        }

        // lazy continuation of a paragraph whose containers did not match
        if !all_matched && !line.is_blank() {
            let tip_idx = self.open.len() - 1;
            if matches!(self.open[tip_idx].block_type, OpenBlockType::Paragraph)
                && !self.starts_block_lazily(&mut line, matched)
            {
                line.advance_to_nonspace();
                let content = &mut self.open[tip_idx].content;
                content.push('\n');
                content.push_str(line.remainder());
                return;
            }
        }

        // Phase 2: close what did not match
        while self.open.len() > matched {
            self.close_top_block();
        }

        // Phase 3: open new containers and leaves
        self.open_new_blocks(line);
    }

    fn continue_fenced_code(&mut self, idx: usize, line: &Line<'a>) {
        let OpenBlockType::FencedCode(fence) = &self.open[idx].block_type else {
            return;
        };
        let (fence_char, fence_len, fence_indent) =
            (fence.fence_char, fence.fence_len, fence.fence_indent);
        if is_closing_fence(line.remainder(), fence_char, fence_len) {
            self.close_top_block();
            return;
        }
        let content = &mut self.open[idx].content;
        if fence_indent == 0 {
            content.push_str(&line.remainder_padded());
        } else {
            // strip up to the fence's own indentation
            let mut content_line = line.clone();
            content_line.skip_indent(fence_indent);
            content.push_str(&content_line.remainder_padded());
        }
        content.push('\n');
    }

    fn continue_indented_code(&mut self, idx: usize, mut line: Line<'a>) {
        let blank = line.is_blank();
        if !blank && line.indent() < 4 {
            self.close_top_block();
            self.open_new_blocks(line);
            return;
        }
        line.skip_indent(4);
        let rest = line.remainder_padded();
        let content = &mut self.open[idx].content;
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(&rest);
        if blank {
            self.mark_blank_on_list_items();
        }
    }

    fn continue_table(&mut self, idx: usize, mut line: Line<'a>) {
        if line.is_blank() {
            self.close_top_block();
            self.mark_blank_on_list_items();
            return;
        }
        let rest = line.rest_of_line();
        if !rest.contains('|') {
            self.close_top_block();
            self.open_new_blocks(line);
            return;
        }
        if let OpenBlockType::Table(table) = &mut self.open[idx].block_type {
            let row = parse_table_row(rest, table.alignments.len());
            table.rows.push(row);
        }
    }

    fn continue_paragraph(&mut self, tip_idx: usize, mut line: Line<'a>) {
        let ns = line.peek();
        let indent = ns.col - line.col;
        let Some(first) = ns.byte else {
            self.close_top_block();
            self.mark_blank_on_list_items();
            return;
        };
        let text: &'a str = line.text;
        let rest = &text[ns.pos..];

        // a single-line paragraph followed by a delimiter row is a table header
        if indent <= 3
            && !self.opts.disable_tables
            && let Some(alignments) = parse_table_separator(rest)
        {
            let header_src = &self.open[tip_idx].content;
            if !header_src.contains('\n')
                && header_src.contains('|')
                && split_table_row(header_src).len() == alignments.len()
            {
                let header = parse_table_row(header_src, alignments.len());
                self.open.pop();
                self.open
                    .push(OpenBlock::new(OpenBlockType::Table(Box::new(TableState {
                        alignments,
                        header,
                        rows: Vec::new(),
                    }))));
                return;
            }
        }

        // nothing that can interrupt a paragraph starts with any other byte
        if indent > 3
            || !matches!(
                first,
                b'=' | b'-'
                    | b'*'
                    | b'_'
                    | b'#'
                    | b'`'
                    | b'~'
                    | b'<'
                    | b'>'
                    | b'+'
                    | b'0'..=b'9'
                    | b':'
                    | b'['
            )
        {
            line.advance_to_nonspace();
            let content = &mut self.open[tip_idx].content;
            content.push('\n');
            content.push_str(line.remainder());
            return;
        }

        if let Some(level) = parse_setext_underline(rest) {
            let content = std::mem::take(&mut self.open[tip_idx].content);
            let remaining = self.extract_ref_defs(&content);
            self.open.pop();
            if remaining.is_empty() {
                // only reference definitions above; the underline stands alone
                self.open_new_blocks(line);
                return;
            }
            self.tip_mut().children.push(Block::Heading {
                level,
                content: remaining,
                anchor: None,
            });
            return;
        }

        if !self.opts.disable_definition_list && self.can_nest() && is_definition_marker(rest) {
            self.start_definition_list(line);
            return;
        }

        if self.opts.enable_markdown_extra_footnotes && parse_footnote_label(rest).is_some() {
            self.close_top_block();
            self.open_new_blocks(line);
            return;
        }

        if is_thematic_break(rest) {
            self.close_top_block();
            self.tip_mut().children.push(Block::ThematicBreak);
            return;
        }

        if let Some((level, content)) = parse_atx_heading(rest) {
            self.close_top_block();
            self.tip_mut().children.push(Block::Heading {
                level,
                content: content.to_string(),
                anchor: None,
            });
            return;
        }

        if self.opts.enable_fenced_code
            && let Some((fence_char, fence_len, info)) = parse_fence_start(rest)
        {
            self.close_top_block();
            self.open_fenced_code(fence_char, fence_len, indent, info);
            return;
        }

        if !self.opts.disable_html
            && let Some(end_condition) = parse_html_block_start(rest, true)
        {
            self.close_top_block();
            self.open_html_block(&line, end_condition, rest);
            return;
        }

        if first == b'>'
            || parse_list_marker(rest, self.alpha_lists()).is_some_and(|m| can_interrupt_paragraph(&m))
        {
            self.close_top_block();
            self.open_new_blocks(line);
            return;
        }

        line.advance_to_nonspace();
        let content = &mut self.open[tip_idx].content;
        content.push('\n');
        content.push_str(line.remainder());
    }

    /// Whether a line that failed container matching would open a block
    /// instead of lazily continuing the open paragraph.
    fn starts_block_lazily(&self, line: &mut Line<'a>, matched: usize) -> bool {
        if line.indent() > 3 {
            return false;
        }
        let rest = line.rest_of_line();
        let unmatched = &self.open[matched..];
        let in_unmatched = |pred: fn(&OpenBlockType) -> bool| {
            unmatched.iter().any(|b| pred(&b.block_type))
        };

        rest.starts_with('>')
            || is_thematic_break(rest)
            || parse_atx_heading(rest).is_some()
            || (self.opts.enable_fenced_code && parse_fence_start(rest).is_some())
            || (!self.opts.disable_html && parse_html_block_start(rest, true).is_some())
            || (self.opts.enable_markdown_extra_footnotes && parse_footnote_label(rest).is_some())
            || (!self.opts.disable_definition_list
                && is_definition_marker(rest)
                && in_unmatched(|t| matches!(t, OpenBlockType::Definition { .. })))
            || parse_list_marker(rest, self.alpha_lists()).is_some_and(|m| {
                can_interrupt_paragraph(&m)
                    || in_unmatched(|t| matches!(t, OpenBlockType::ListItem { .. }))
            })
    }

    #[inline]
    fn alpha_lists(&self) -> bool {
        !self.opts.disable_alphanumeric_lists
    }

    #[inline(never)]
    pub(super) fn open_new_blocks(&mut self, mut line: Line<'a>) {
        loop {
            let ns = line.peek();
            let indent = ns.col - line.col;
            let Some(first) = ns.byte else {
                self.note_blank_line();
                return;
            };
            let can_nest = self.can_nest();

            if indent <= 3 && first == b'>' && can_nest {
                line.skip_blockquote_marker();
                self.open.push(OpenBlock::new(OpenBlockType::BlockQuote));
                continue;
            }

            if indent > 3 {
                if !matches!(self.tip_mut().block_type, OpenBlockType::Paragraph) {
                    line.skip_indent(4);
                    let mut block = OpenBlock::new(OpenBlockType::IndentedCode);
                    block.content.push_str(&line.remainder_padded());
                    self.open.push(block);
                    return;
                }
            } else {
                let text: &'a str = line.text;
                let rest = &text[ns.pos..];

                if let Some((level, content)) = parse_atx_heading(rest) {
                    self.tip_mut().children.push(Block::Heading {
                        level,
                        content: content.to_string(),
                        anchor: None,
                    });
                    return;
                }

                if self.opts.enable_fenced_code
                    && let Some((fence_char, fence_len, info)) = parse_fence_start(rest)
                {
                    self.open_fenced_code(fence_char, fence_len, indent, info);
                    return;
                }

                if !self.opts.disable_html
                    && let Some(end_condition) = parse_html_block_start(rest, false)
                {
                    self.open_html_block(&line, end_condition, rest);
                    return;
                }

                if is_thematic_break(rest) {
                    self.tip_mut().children.push(Block::ThematicBreak);
                    return;
                }

                if self.opts.enable_markdown_extra_footnotes
                    && can_nest
                    && let Some((label, consumed)) = parse_footnote_label(rest)
                {
                    line.advance_to_nonspace();
                    line.advance_columns(consumed);
                    line.advance_to_nonspace();
                    self.open.push(OpenBlock::new(OpenBlockType::FootnoteDef {
                        label: label.to_string(),
                    }));
                    continue;
                }

                if !self.opts.disable_definition_list
                    && can_nest
                    && is_definition_marker(rest)
                    && matches!(
                        self.tip_mut().children.last(),
                        Some(Block::DefinitionList { .. })
                    )
                {
                    if self.start_definition(&mut line) {
                        return;
                    }
                    continue;
                }

                if can_nest && let Some(marker) = parse_list_marker(rest, self.alpha_lists()) {
                    line.advance_to_nonspace();
                    if self.start_list_item(&mut line, marker, indent) {
                        return;
                    }
                    continue;
                }
            }

            line.advance_to_nonspace();
            let mut block = OpenBlock::new(OpenBlockType::Paragraph);
            block.content.push_str(line.remainder());
            self.open.push(block);
            return;
        }
    }

    /// Records a blank line for list looseness.
    fn note_blank_line(&mut self) {
        let item = self
            .open
            .iter_mut()
            .skip(1)
            .rev()
            .find(|b| matches!(b.block_type, OpenBlockType::ListItem { .. }));
        if let Some(item) = item {
            item.had_blank_in_item = true;
            return;
        }
        let parent = self.tip_mut();
        if matches!(parent.children.last(), Some(Block::List { .. })) {
            parent.list_has_blank_between = true;
        }
    }

    fn open_fenced_code(&mut self, fence_char: u8, fence_len: usize, indent: usize, info: &str) {
        self.open
            .push(OpenBlock::new(OpenBlockType::FencedCode(Box::new(
                FencedCodeData {
                    fence_char,
                    fence_len,
                    fence_indent: indent,
                    info: resolve_escapes(info),
                },
            ))));
    }

    fn open_html_block(&mut self, line: &Line<'a>, end_condition: HtmlBlockEnd, rest: &str) {
        let mut block = OpenBlock::new(OpenBlockType::HtmlBlock {
            end_condition,
            style: is_style_block_start(rest),
        });
        block.content.push_str(line.remainder());
        self.open.push(block);
        if html_block_ends(&end_condition, line.remainder()) {
            self.close_top_block();
        }
    }

    /// Advances past a one-byte-or-longer marker and the spaces after it.
    /// Returns the columns of spacing that belong to the marker and whether
    /// the rest of the line is blank.
    fn consume_marker(line: &mut Line<'a>, marker_len: usize) -> (usize, bool) {
        line.advance_columns(marker_len);
        let ns = line.peek();
        let rest_blank = ns.byte.is_none();
        let spaces = ns.col - line.col;
        // five or more spaces means indented code inside the item
        let spaces_after = if rest_blank || spaces == 0 || spaces >= 5 {
            1
        } else {
            spaces
        };
        if !rest_blank {
            line.skip_indent(spaces_after);
        }
        (spaces_after, rest_blank)
    }

    /// Returns true if the rest of the line after the marker is blank.
    fn start_list_item(
        &mut self,
        line: &mut Line<'a>,
        marker: ListMarkerInfo,
        marker_indent: usize,
    ) -> bool {
        let (spaces_after, rest_blank) = Self::consume_marker(line, marker.marker_len);
        let mut item = OpenBlock::new(OpenBlockType::ListItem {
            content_col: marker_indent + marker.marker_len + spaces_after,
            started_blank: rest_blank,
        });
        item.list_kind = Some(marker.kind);
        item.list_start = marker.start_num;
        self.open.push(item);
        rest_blank
    }

    /// Turns the open paragraph into the terms of a new definition item and
    /// opens its first definition on `line`.
    fn start_definition_list(&mut self, mut line: Line<'a>) {
        let Some(para) = self.open.pop() else {
            return;
        };
        let terms: Vec<String> = para
            .content
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        let item = DefinitionItem {
            terms,
            definitions: Vec::new(),
        };
        let parent = self.tip_mut();
        if let Some(Block::DefinitionList { items }) = parent.children.last_mut() {
            items.push(item);
        } else {
            parent
                .children
                .push(Block::DefinitionList { items: vec![item] });
        }
        if !self.start_definition(&mut line) {
            self.open_new_blocks(line);
        }
    }

    /// Opens a definition on a `:` line. Returns true if nothing follows the
    /// marker.
    fn start_definition(&mut self, line: &mut Line<'a>) -> bool {
        let marker_indent = line.indent();
        line.advance_to_nonspace();
        let (spaces_after, rest_blank) = Self::consume_marker(line, 1);
        self.open.push(OpenBlock::new(OpenBlockType::Definition {
            content_col: marker_indent + 1 + spaces_after,
        }));
        rest_blank
    }

    pub(super) fn finalize_block(&mut self, block: OpenBlock) -> Option<RawBlock> {
        match block.block_type {
            OpenBlockType::Document => None,
            // nothing left once reference definitions were pulled out
            OpenBlockType::BlockQuote if block.children.is_empty() => None,
            OpenBlockType::BlockQuote => Some(Block::BlockQuote {
                children: block.children,
            }),
            OpenBlockType::ListItem { .. } => self.finalize_list_item(block),
            OpenBlockType::Definition { .. } => {
                let parent = self.tip_mut();
                if let Some(Block::DefinitionList { items }) = parent.children.last_mut()
                    && let Some(item) = items.last_mut()
                {
                    item.definitions.push(block.children);
                    return None;
                }
                Some(Block::DefinitionList {
                    items: vec![DefinitionItem {
                        terms: Vec::new(),
                        definitions: vec![block.children],
                    }],
                })
            }
            OpenBlockType::FootnoteDef { label } => {
                self.refs.define_footnote(&label, block.children);
                None
            }
            OpenBlockType::FencedCode(fence) => Some(Block::CodeBlock {
                info: fence.info,
                literal: block.content,
            }),
            OpenBlockType::IndentedCode => {
                let mut literal = block.content;
                // trailing blank lines are not part of the code
                while let Some(idx) = literal.rfind('\n')
                    && literal[idx + 1..].trim().is_empty()
                {
                    literal.truncate(idx);
                }
                literal.push('\n');
                Some(Block::CodeBlock {
                    info: String::new(),
                    literal,
                })
            }
            OpenBlockType::HtmlBlock { style: true, .. } => Some(Block::StyleBlock {
                literal: block.content,
            }),
            OpenBlockType::HtmlBlock { .. } => {
                if self.opts.allow_markdown_inside_html {
                    return self.expand_html_block(block.content);
                }
                Some(Block::HtmlBlock {
                    literal: block.content,
                })
            }
            OpenBlockType::Table(table) => {
                let TableState {
                    alignments,
                    header,
                    rows,
                } = *table;
                Some(Block::Table(Box::new(TableData {
                    alignments,
                    header,
                    rows,
                })))
            }
            OpenBlockType::Paragraph => {
                let remaining = self.extract_ref_defs_owned(block.content);
                if remaining.is_empty() {
                    return None;
                }
                Some(Block::Paragraph { content: remaining })
            }
        }
    }

    fn finalize_list_item(&mut self, block: OpenBlock) -> Option<RawBlock> {
        let kind = block.list_kind.unwrap_or(ListKind::Bullet(b'-'));
        let had_blank = block.had_blank_in_item;
        // a blank between two of the item's own children makes the list loose
        let blank_between_children = had_blank && block.children.len() >= 2;
        let item = Block::ListItem {
            children: block.children,
        };

        let parent = self.tip_mut();
        // a trailing blank belongs to the enclosing item
        if had_blank
            && !blank_between_children
            && matches!(parent.block_type, OpenBlockType::ListItem { .. })
        {
            parent.had_blank_in_item = true;
        }

        if let Some(Block::List {
            kind: list_kind,
            children: items,
            tight,
            ..
        }) = parent.children.last_mut()
            && *list_kind == kind
        {
            if parent.list_has_blank_between || blank_between_children {
                *tight = false;
            }
            items.push(item);
            if had_blank {
                parent.list_has_blank_between = true;
            }
            return None;
        }

        parent.list_has_blank_between = had_blank;
        Some(Block::List {
            kind,
            start: block.list_start,
            tight: !blank_between_children,
            children: vec![item],
        })
    }

    /// Splits `<tag>` / `</tag>` wrapper lines off an HTML block and parses
    /// what lies between them as markdown. Blocks of any other shape stay
    /// verbatim.
    fn expand_html_block(&mut self, literal: String) -> Option<RawBlock> {
        let lines: Vec<&str> = literal.lines().collect();
        let wraps_markdown = self.can_nest()
            && lines.len() >= 2
            && lone_open_tag(lines[0])
                .is_some_and(|tag| is_lone_close_tag(lines[lines.len() - 1], tag));
        if !wraps_markdown {
            return Some(Block::HtmlBlock { literal });
        }

        let body = lines[1..lines.len() - 1].join("\n");
        let depth = self.outer_depth + self.open.len();
        let mut inner = BlockParser::nested(&body, self.opts, depth);
        let blocks = inner.parse();
        self.refs.absorb(inner.refs);

        let open_tag = lines[0].to_string();
        let close_tag = lines[lines.len() - 1].to_string();
        let children = &mut self.tip_mut().children;
        children.push(Block::HtmlBlock { literal: open_tag });
        children.extend(blocks);
        children.push(Block::HtmlBlock { literal: close_tag });
        None
    }

    /// Moves every link reference definition that starts a line of
    /// `content` into the reference table and returns the remaining lines,
    /// trimmed.
    fn extract_ref_defs(&mut self, content: &str) -> String {
        let mut kept = String::with_capacity(content.len());
        let mut pos = 0;
        while pos < content.len() {
            let rest = &content[pos..];
            let line = rest.trim_start_matches([' ', '\t']);
            if line.starts_with('[')
                && let Some(def) = parse_link_ref_def(two_lines(line))
            {
                self.refs.define_link(&def.label, def.url, def.title);
                pos += rest.len() - line.len() + def.consumed;
                continue;
            }
            let line_end = rest.find('\n').map_or(rest.len(), |i| i + 1);
            kept.push_str(&rest[..line_end]);
            pos += line_end;
        }
        kept.trim().to_string()
    }

    fn extract_ref_defs_owned(&mut self, content: String) -> String {
        if content.contains('[') {
            return self.extract_ref_defs(&content);
        }
        let trimmed = content.trim();
        if trimmed.len() == content.len() {
            return content;
        }
        trimmed.to_string()
    }
}

/// `s` up to and including its second newline. A definition's title may
/// sit on the line after it, no further.
fn two_lines(s: &str) -> &str {
    let end = s.match_indices('\n').nth(1).map_or(s.len(), |(i, _)| i + 1);
    &s[..end]
}
