use super::*;

enum FrameKind {
    Root,
    Tag(u8),
    Link(usize),
}

struct Frame {
    kind: FrameKind,
    children: Inlines,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

/// Appends `inline`, merging adjacent text.
fn push_inline(children: &mut Inlines, inline: Inline) {
    match (children.last_mut(), inline) {
        (Some(Inline::Text(prev)), Inline::Text(t)) => prev.push_str(&t),
        (_, Inline::Text(t)) if t.is_empty() => {}
        (_, inline) => children.push(inline),
    }
}

fn push_text(children: &mut Inlines, s: &str) {
    if s.is_empty() {
        return;
    }
    match children.last_mut() {
        Some(Inline::Text(prev)) => prev.push_str(s),
        _ => children.push(Inline::Text(s.to_string())),
    }
}

/// Writes the delimiter characters of an emphasis frame that was not
/// opened.
fn push_delimiters(children: &mut Inlines, kind: u8, tag: u8) {
    let n = if tag == TAG_EM { 1 } else { 2 };
    let mut buf = [0u8; 4];
    for _ in 0..n {
        push_text(children, (kind as char).encode_utf8(&mut buf));
    }
}

fn top(stack: &mut [Frame]) -> &mut Inlines {
    let n = stack.len();
    &mut stack[n - 1].children
}

/// Pops the innermost frame, handing its children to the parent as-is.
fn flatten_top(stack: &mut Vec<Frame>) {
    if stack.len() <= 1 {
        return;
    }
    if let Some(frame) = stack.pop() {
        let parent = top(stack);
        for child in frame.children {
            push_inline(parent, child);
        }
    }
}

fn close_tag(stack: &mut Vec<Frame>, tag: u8) {
    if stack.len() <= 1 || !matches!(stack[stack.len() - 1].kind, FrameKind::Tag(t) if t == tag) {
        return;
    }
    let Some(frame) = stack.pop() else {
        return;
    };
    let node = match tag {
        TAG_STRONG => Inline::Strong(frame.children),
        TAG_DEL => Inline::Strikethrough(frame.children),
        _ => Inline::Emphasis(frame.children),
    };
    top(stack).push(node);
}

fn close_link(stack: &mut Vec<Frame>, links: &[LinkInfo]) {
    while stack.len() > 1 && !matches!(stack[stack.len() - 1].kind, FrameKind::Link(_)) {
        flatten_top(stack);
    }
    if stack.len() <= 1 {
        return;
    }
    let Some(Frame {
        kind: FrameKind::Link(idx),
        children,
    }) = stack.pop()
    else {
        return;
    };
    let Some(info) = links.get(idx) else {
        return;
    };
    let node = if info.is_image {
        let mut alt = String::new();
        push_plain_text(&mut alt, &children);
        Inline::Image {
            alt,
            url: info.url.clone(),
            title: info.title.clone(),
        }
    } else {
        Inline::Link {
            children,
            url: info.url.clone(),
            title: info.title.clone(),
        }
    };
    top(stack).push(node);
}

impl<'a, 'r> InlineScanner<'a, 'r> {
    /// Folds the flat item list into a nested inline tree.
    pub(super) fn into_inlines(self) -> Inlines {
        let InlineScanner {
            input, items, links, ..
        } = self;
        let mut stack = vec![Frame::new(FrameKind::Root)];
        // frames refused at the nesting limit, with the stack depth they
        // were refused at
        let mut refused: Vec<(FrameKind, usize)> = Vec::new();

        for item in items {
            match item {
                InlineItem::Text(start, end) => push_text(top(&mut stack), &input[start..end]),
                InlineItem::Literal(s) => push_text(top(&mut stack), s),
                InlineItem::Entity(start, end) => {
                    top(&mut stack).push(Inline::Entity(input[start..end].to_string()));
                }
                InlineItem::RawHtml(start, end) => {
                    top(&mut stack).push(Inline::RawHtml(input[start..end].to_string()));
                }
                InlineItem::Code(code) => top(&mut stack).push(Inline::Code(code)),
                InlineItem::Autolink { url, text } => {
                    top(&mut stack).push(Inline::Autolink { url, text });
                }
                InlineItem::LineBreak => top(&mut stack).push(Inline::LineBreak),
                InlineItem::SoftBreak => top(&mut stack).push(Inline::SoftBreak),
                InlineItem::Smart(p) => top(&mut stack).push(Inline::SmartPunct(p)),
                InlineItem::FootnoteRef { label, number } => {
                    top(&mut stack).push(Inline::FootnoteReference { label, number });
                }
                InlineItem::Superscript(children) => {
                    top(&mut stack).push(Inline::Superscript(children));
                }
                InlineItem::DelimRun {
                    kind,
                    count,
                    open_em,
                    close_em,
                    ..
                } => {
                    for &tag in close_em.as_slice() {
                        let depth = stack.len();
                        let was_refused = matches!(
                            refused.last(),
                            Some((FrameKind::Tag(t), d)) if *t == tag && *d == depth
                        );
                        if was_refused {
                            refused.pop();
                            push_delimiters(top(&mut stack), kind, tag);
                        } else {
                            close_tag(&mut stack, tag);
                            refused.retain(|&(_, d)| d <= stack.len());
                        }
                    }
                    for _ in 0..count {
                        let mut buf = [0u8; 4];
                        push_text(top(&mut stack), (kind as char).encode_utf8(&mut buf));
                    }
                    for &tag in open_em.as_slice().iter().rev() {
                        if stack.len() > MAX_INLINE_NESTING {
                            refused.push((FrameKind::Tag(tag), stack.len()));
                            push_delimiters(top(&mut stack), kind, tag);
                        } else {
                            stack.push(Frame::new(FrameKind::Tag(tag)));
                        }
                    }
                }
                InlineItem::BracketOpen { is_image } => {
                    push_text(top(&mut stack), if is_image { "![" } else { "[" });
                }
                InlineItem::LinkStart(idx) => {
                    let kind = FrameKind::Link(idx as usize);
                    if stack.len() > MAX_INLINE_NESTING {
                        refused.push((kind, stack.len()));
                    } else {
                        stack.push(Frame::new(kind));
                    }
                }
                InlineItem::LinkEnd => {
                    let depth = stack.len();
                    // a refused link leaves its text inline
                    if let Some(i) = refused
                        .iter()
                        .rposition(|(k, d)| matches!(k, FrameKind::Link(_)) && *d == depth)
                    {
                        refused.truncate(i);
                    } else {
                        close_link(&mut stack, &links);
                        refused.retain(|&(_, d)| d <= stack.len());
                    }
                }
            }
        }

        while stack.len() > 1 {
            flatten_top(&mut stack);
        }
        stack.pop().map(|root| root.children).unwrap_or_default()
    }
}
