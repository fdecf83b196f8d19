use mkd::{ParseOption, ParseOptions, to_html};
use pretty_assertions::assert_eq;

fn assert_html(md: &str, expected: &str) {
    assert_eq!(to_html(md, ParseOptions::default()), expected);
}

fn assert_html_with(md: &str, opts: ParseOptions, expected: &str) {
    assert_eq!(to_html(md, opts), expected);
}

#[test]
fn parses_headings_h1_to_h6() {
    assert_html(
        "# h1\n## h2\n### h3\n#### h4\n##### h5\n###### h6",
        "<h1>h1</h1>\n\n<h2>h2</h2>\n\n<h3>h3</h3>\n\n<h4>h4</h4>\n\n<h5>h5</h5>\n\n<h6>h6</h6>",
    );
}

#[test]
fn parses_setext_headings() {
    assert_html(
        "Heading one\n===========\n\nHeading two\n-----------",
        "<h1>Heading one</h1>\n\n<h2>Heading two</h2>",
    );
}

#[test]
fn parses_indented_heading() {
    assert_html("   ## heading", "<h2>heading</h2>");
}

#[test]
fn non_heading_without_space_after_hash() {
    assert_html("##heading", "<p>##heading</p>");
}

#[test]
fn paragraph_collapses_lines_until_block_boundary() {
    assert_html(
        "line one\nline two\n\n# h\nline three",
        "<p>line one\nline two</p>\n\n<h1>h</h1>\n\n<p>line three</p>",
    );
}

#[test]
fn parses_inline_styles() {
    assert_html(
        "this is **strong** and *em* and `code`",
        "<p>this is <strong>strong</strong> and <em>em</em> and <code>code</code></p>",
    );
}

#[test]
fn parses_underscore_variants() {
    assert_html(
        "__strong__ and _em_",
        "<p><strong>strong</strong> and <em>em</em></p>",
    );
}

#[test]
fn intraword_underscores_stay_literal() {
    assert_html("snake_case_name", "<p>snake_case_name</p>");
}

#[test]
fn parses_nested_inline_markup() {
    assert_html(
        "**outer *inner***",
        "<p><strong>outer <em>inner</em></strong></p>",
    );
}

#[test]
fn parses_links_and_inline_label_markup() {
    assert_html(
        "visit [**site**](https://example.com)",
        "<p>visit <a href=\"https://example.com\"><strong>site</strong></a></p>",
    );
}

#[test]
fn parses_reference_style_links_and_shortcuts() {
    assert_html(
        "[A ref][id]\n\n[Shortcut]\n\n[id]: https://example.com \"Ref\"\n[shortcut]: https://shortcut.test",
        "<p><a href=\"https://example.com\" title=\"Ref\">A ref</a></p>\n\n<p><a href=\"https://shortcut.test\">Shortcut</a></p>",
    );
}

#[test]
fn parses_reference_style_images() {
    assert_html(
        "![Logo][brand]\n\n[brand]: https://img.test/logo.png \"Logo title\"",
        "<p><img src=\"https://img.test/logo.png\" alt=\"Logo\" title=\"Logo title\" /></p>",
    );
}

#[test]
fn reference_definitions_inside_a_paragraph() {
    assert_html(
        "para\n[r]: /u\n\n[x][r]",
        "<p>para</p>\n\n<p><a href=\"/u\">x</a></p>",
    );
    assert_html("a\n[r]: /u\nb [r]", "<p>a\nb <a href=\"/u\">r</a></p>");
}

#[test]
fn link_url_is_html_escaped() {
    assert_html(
        "[x](https://example.com?a=1&b=2)",
        "<p><a href=\"https://example.com?a=1&amp;b=2\">x</a></p>",
    );
}

#[test]
fn unparsable_link_is_left_as_text() {
    assert_html("look [here](missing", "<p>look [here](missing</p>");
}

#[test]
fn parses_lists() {
    assert_html(
        "- one\n- two\n\n1. first\n2. second",
        "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n\n<ol>\n<li>first</li>\n<li>second</li>\n</ol>",
    );
}

#[test]
fn loose_list_wraps_items_in_paragraphs() {
    assert_html(
        "- one\n\n- two",
        "<ul>\n<li>\n<p>one</p>\n</li>\n<li>\n<p>two</p>\n</li>\n</ul>",
    );
}

#[test]
fn ordered_list_keeps_start_number() {
    assert_html("3. three\n4. four", "<ol start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>");
}

#[test]
fn parses_nested_lists() {
    assert_html(
        "- one\n  - two\n    - three",
        "<ul>\n<li>one\n<ul>\n<li>two\n<ul>\n<li>three</li>\n</ul>\n</li>\n</ul>\n</li>\n</ul>",
    );
}

#[test]
fn parses_mixed_nested_lists() {
    assert_html(
        "1. one\n  - two\n    1. three",
        "<ol>\n<li>one</li>\n</ol>\n\n<ul>\n<li>two\n<ol>\n<li>three</li>\n</ol>\n</li>\n</ul>",
    );
}

#[test]
fn parses_all_unordered_markers() {
    assert_html(
        "- one\n* two\n+ three",
        "<ul>\n<li>one</li>\n</ul>\n\n<ul>\n<li>two</li>\n</ul>\n\n<ul>\n<li>three</li>\n</ul>",
    );
}

#[test]
fn ordered_list_requires_digit_dot_space() {
    assert_html("1.one\n1. two", "<p>1.one</p>\n\n<ol>\n<li>two</li>\n</ol>");
}

#[test]
fn parses_alphabetic_lists() {
    assert_html(
        "a. one\nb. two",
        "<ol type=\"a\">\n<li>one</li>\n<li>two</li>\n</ol>",
    );
    assert_html(
        "C. three\nD. four",
        "<ol type=\"A\" start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>",
    );
}

#[test]
fn alphabetic_lists_disabled() {
    assert_html_with(
        "a. one\nb. two",
        ParseOption::DisableAlphanumericLists.into(),
        "<p>a. one\nb. two</p>",
    );
}

#[test]
fn parses_blockquotes() {
    assert_html(
        "> hello\n> **world**",
        "<blockquote>\n<p>hello\n<strong>world</strong></p>\n</blockquote>",
    );
}

#[test]
fn blockquote_marker_with_optional_space() {
    assert_html(">a\n> b", "<blockquote>\n<p>a\nb</p>\n</blockquote>");
}

#[test]
fn blockquote_lazy_continuation() {
    assert_html("> a\nb", "<blockquote>\n<p>a\nb</p>\n</blockquote>");
}

#[test]
fn quote_holding_only_a_definition_renders_nothing() {
    assert_html("> [r]: /q\n\n[q][r]", "<p><a href=\"/q\">q</a></p>");
}

#[test]
fn deeply_nested_emphasis_is_capped() {
    let md = "*a ".repeat(100) + "b" + &" a*".repeat(100);
    let html = to_html(&md, ParseOptions::default());
    assert_eq!(html.matches("<em>").count(), 32);
    assert_eq!(html.matches("</em>").count(), 32);
}

// ── Code ───────────────────────────────────────────────────────────

#[test]
fn parses_fenced_code_when_enabled() {
    assert_html_with(
        "```rs\nfn main() {}\n```",
        ParseOption::EnableFencedCode.into(),
        "<pre><code class=\"language-rs\">fn main() {}\n</code></pre>",
    );
}

#[test]
fn fenced_code_is_off_by_default() {
    let html = to_html("```rs\nfn main() {}\n```", ParseOptions::default());
    assert!(!html.contains("<pre>"), "{html}");
}

#[test]
fn fenced_code_without_language() {
    assert_html_with(
        "```\n<raw>\n```",
        ParseOption::EnableFencedCode.into(),
        "<pre><code>&lt;raw&gt;\n</code></pre>",
    );
}

#[test]
fn fenced_code_without_closing_fence_consumes_rest() {
    assert_html_with(
        "```txt\nline 1\nline 2",
        ParseOption::EnableFencedCode.into(),
        "<pre><code class=\"language-txt\">line 1\nline 2\n</code></pre>",
    );
}

#[test]
fn parses_indented_code_block() {
    assert_html(
        "    let x = 1;\n    let y = 2;\n\nend",
        "<pre><code>let x = 1;\nlet y = 2;\n</code></pre>\n\n<p>end</p>",
    );
}

#[test]
fn code_spans_keep_markup_literal() {
    assert_html("`*a* & <b>`", "<p><code>*a* &amp; &lt;b&gt;</code></p>");
}

// ── Links and images ───────────────────────────────────────────────

#[test]
fn parses_inline_images_with_title() {
    assert_html(
        "![alt text](https://img.test/logo.png \"Logo\")",
        "<p><img src=\"https://img.test/logo.png\" alt=\"alt text\" title=\"Logo\" /></p>",
    );
}

#[test]
fn parses_link_title_attribute() {
    assert_html(
        "[Example](https://example.com \"Homepage\")",
        "<p><a href=\"https://example.com\" title=\"Homepage\">Example</a></p>",
    );
}

#[test]
fn parses_basic_autolinks() {
    assert_html(
        "<https://example.com> <hello@example.com>",
        "<p><a href=\"https://example.com\">https://example.com</a> <a href=\"mailto:hello@example.com\">hello@example.com</a></p>",
    );
}

#[test]
fn images_disabled_stay_literal() {
    assert_html_with(
        "![a](/b.png) and [c](/d)",
        ParseOption::DisableImages.into(),
        "<p>![a](/b.png) and <a href=\"/d\">c</a></p>",
    );
}

#[test]
fn safe_links_drop_unknown_schemes() {
    assert_html_with(
        "[bad](javascript:alert) [good](https://ok.test)",
        ParseOption::CreateSafeLinks.into(),
        "<p>bad <a href=\"https://ok.test\">good</a></p>",
    );
}

// ── Escapes and HTML ───────────────────────────────────────────────

#[test]
fn backslash_escapes_inline_markers() {
    assert_html("\\*no em\\* and \\[x\\](y)", "<p>*no em* and [x](y)</p>");
}

#[test]
fn entities_pass_through() {
    assert_html("&copy; &#169; & x", "<p>&copy; &#169; &amp; x</p>");
}

#[test]
fn raw_html_is_not_escaped() {
    assert_html(
        "Use <kbd>Ctrl</kbd> and <em>HTML</em>",
        "<p>Use <kbd>Ctrl</kbd> and <em>HTML</em></p>",
    );
}

#[test]
fn raw_html_disabled_is_escaped() {
    assert_html_with(
        "Use <kbd>Ctrl</kbd>",
        ParseOption::DisableHtml.into(),
        "<p>Use &lt;kbd&gt;Ctrl&lt;/kbd&gt;</p>",
    );
}

#[test]
fn disabled_tags_keep_plain_quotes() {
    assert_html_with(
        "<a href=\"x\">y</a>",
        ParseOption::DisableLinks.into(),
        "<p>&lt;a href=&quot;x&quot;&gt;y&lt;/a&gt;</p>",
    );
    assert_html_with(
        "<span title=\"x\">y</span>",
        ParseOption::DisableHtml.into(),
        "<p>&lt;span title=&quot;x&quot;&gt;y&lt;/span&gt;</p>",
    );
}

#[test]
fn raw_html_block_is_passed_through() {
    assert_html(
        "<dl>\n<dt>Term</dt>\n<dd>Definition</dd>\n</dl>\n\ntext",
        "<dl>\n<dt>Term</dt>\n<dd>Definition</dd>\n</dl>\n\n<p>text</p>",
    );
}

#[test]
fn markdown_inside_html_blocks() {
    let md = "<div>\n*hi*\n</div>\n\ntext";
    assert_html(md, "<div>\n*hi*\n</div>\n\n<p>text</p>");
    assert_html_with(
        md,
        ParseOption::AllowMarkdownInsideHtml.into(),
        "<div>\n\n<p><em>hi</em></p>\n\n</div>\n\n<p>text</p>",
    );
}

#[test]
fn parses_windows_line_endings() {
    assert_html(
        "# h\r\n\r\n- x\r\n- y\r\n",
        "<h1>h</h1>\n\n<ul>\n<li>x</li>\n<li>y</li>\n</ul>",
    );
}

// ── Tables ─────────────────────────────────────────────────────────

#[test]
fn parses_table_with_alignment() {
    assert_html(
        "| Name | Score | Ratio |\n| :--- | ---: | :---: |\n| Alice | 10 | 1.2 |\n| Bob | 20 | 2.4 |",
        "<table>\n<thead>\n<tr>\n<th style=\"text-align: left\">Name</th>\n<th style=\"text-align: right\">Score</th>\n<th style=\"text-align: center\">Ratio</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td style=\"text-align: left\">Alice</td>\n<td style=\"text-align: right\">10</td>\n<td style=\"text-align: center\">1.2</td>\n</tr>\n<tr>\n<td style=\"text-align: left\">Bob</td>\n<td style=\"text-align: right\">20</td>\n<td style=\"text-align: center\">2.4</td>\n</tr>\n</tbody>\n</table>",
    );
}

#[test]
fn table_requires_separator_line() {
    assert_html("A | B\nx | y", "<p>A | B\nx | y</p>");
}

#[test]
fn table_cells_support_inline_markup() {
    assert_html(
        "| Col |\n| --- |\n| **bold** and [link](https://example.com) |",
        "<table>\n<thead>\n<tr>\n<th>Col</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td><strong>bold</strong> and <a href=\"https://example.com\">link</a></td>\n</tr>\n</tbody>\n</table>",
    );
}

#[test]
fn tables_disabled() {
    assert_html_with(
        "| A |\n| --- |\n| x |",
        ParseOption::DisableTables.into(),
        "<p>| A |\n| &mdash; |\n| x |</p>",
    );
}

#[test]
fn parses_horizontal_rules() {
    assert_html("***\n---\n___", "<hr />\n\n<hr />\n\n<hr />");
}

#[test]
fn two_trailing_spaces_make_a_hard_break() {
    assert_html("1  \n2", "<p>1<br />\n2</p>");
    assert_html("1\n2", "<p>1\n2</p>");
}

// ── Strikethrough ──────────────────────────────────────────────────

#[test]
fn parses_strikethrough() {
    assert_html("~~deleted~~", "<p><del>deleted</del></p>");
}

#[test]
fn strikethrough_with_inline() {
    assert_html(
        "~~**bold deleted**~~",
        "<p><del><strong>bold deleted</strong></del></p>",
    );
}

#[test]
fn strikethrough_disabled() {
    assert_html_with(
        "~~deleted~~",
        ParseOption::DisableStrikethrough.into(),
        "<p>~~deleted~~</p>",
    );
}

#[test]
fn single_tilde_is_literal() {
    assert_html("~text~", "<p>~text~</p>");
}

#[test]
fn backslash_escapes_extension_delimiters() {
    assert_html("\\~\\~no strike\\~\\~", "<p>~~no strike~~</p>");
}

// ── Smart typography ───────────────────────────────────────────────

#[test]
fn smart_quotes_dashes_and_ellipses() {
    assert_html(
        "\"Hello\" -- it's 1/2 done...",
        "<p>&ldquo;Hello&rdquo; &ndash; it&rsquo;s &frac12; done&hellip;</p>",
    );
}

#[test]
fn smart_symbols() {
    assert_html(
        "(c) 2024 Acme(tm) (R) --- 3/4",
        "<p>&copy; 2024 Acme&trade; &reg; &mdash; &frac34;</p>",
    );
}

#[test]
fn fractions_need_standalone_digits() {
    assert_html("11/2 and 1/25", "<p>11/2 and 1/25</p>");
}

#[test]
fn smart_formatting_disabled() {
    assert_html_with(
        "\"a\" -- b...",
        ParseOption::DisableSmartFormatting.into(),
        "<p>&quot;a&quot; -- b...</p>",
    );
}

// ── Superscript ────────────────────────────────────────────────────

#[test]
fn parses_superscript() {
    assert_html(
        "x^2 and e^(i pi)",
        "<p>x<sup>2</sup> and e<sup>i pi</sup></p>",
    );
}

#[test]
fn caret_after_space_is_literal() {
    assert_html("a ^b", "<p>a ^b</p>");
}

#[test]
fn superscript_disabled() {
    assert_html_with(
        "x^2",
        ParseOption::DisableSuperscript.into(),
        "<p>x^2</p>",
    );
}

#[test]
fn unbalanced_group_leaves_caret_literal() {
    assert_html("a^(b^(c)", "<p>a^(b<sup>c</sup></p>");
}

#[test]
fn nested_superscript_groups_are_capped() {
    assert_html(
        "x^(1^(2^(3^(4^(5)))))",
        "<p>x<sup>1<sup>2<sup>3<sup>4^(5)</sup></sup></sup></sup></p>",
    );
}

// ── Definition lists ───────────────────────────────────────────────

#[test]
fn parses_definition_lists() {
    assert_html(
        "Apple\n: A fruit.\n: A company.\n\nOrange\n: Another fruit.",
        "<dl>\n<dt>Apple</dt>\n<dd>A fruit.</dd>\n<dd>A company.</dd>\n<dt>Orange</dt>\n<dd>Another fruit.</dd>\n</dl>",
    );
}

#[test]
fn definition_lists_disabled() {
    assert_html_with(
        "Apple\n: A fruit.",
        ParseOption::DisableDefinitionList.into(),
        "<p>Apple\n: A fruit.</p>",
    );
}

// ── Footnotes ──────────────────────────────────────────────────────

#[test]
fn parses_footnotes_when_enabled() {
    assert_html_with(
        "Claim[^src].\n\n[^src]: Source",
        ParseOption::EnableMarkdownExtraFootnotes.into(),
        "<p>Claim<sup id=\"fnref:1\"><a href=\"#fn:1\" rel=\"footnote\">1</a></sup>.</p>\n\n\
         <div class=\"footnotes\">\n<hr/>\n<ol>\n<li id=\"fn:1\">\n\
         <p>Source<a href=\"#fnref:1\" rev=\"footnote\">&#8617;</a></p>\n</li>\n</ol>\n</div>",
    );
}

#[test]
fn footnotes_number_in_reference_order() {
    let html = to_html(
        "B[^b] A[^a] B again[^b]\n\n[^a]: first defined\n[^b]: second defined",
        ParseOption::EnableMarkdownExtraFootnotes.into(),
    );
    assert!(html.starts_with(
        "<p>B<sup id=\"fnref:1\"><a href=\"#fn:1\" rel=\"footnote\">1</a></sup> \
         A<sup id=\"fnref:2\"><a href=\"#fn:2\" rel=\"footnote\">2</a></sup> \
         B again<sup id=\"fnref:1\"><a href=\"#fn:1\" rel=\"footnote\">1</a></sup></p>"
    ));
    let first = html.find("second defined").unwrap();
    let second = html.find("first defined").unwrap();
    assert!(first < second);
}

#[test]
fn unreferenced_or_undefined_footnotes() {
    assert_html_with(
        "Plain[^missing]\n\n[^unused]: never cited",
        ParseOption::EnableMarkdownExtraFootnotes.into(),
        "<p>Plain[^missing]</p>",
    );
}

// ── Automatic links ────────────────────────────────────────────────

#[test]
fn bare_urls_need_the_option() {
    assert_html("see https://example.com", "<p>see https://example.com</p>");
    assert_html_with(
        "see https://example.com/path.",
        ParseOption::AutomaticallyCreateLinks.into(),
        "<p>see <a href=\"https://example.com/path\">https://example.com/path</a>.</p>",
    );
}

#[test]
fn bare_email_addresses() {
    assert_html_with(
        "mail first_last@example.com now",
        ParseOption::AutomaticallyCreateLinks.into(),
        "<p>mail <a href=\"mailto:first_last@example.com\">first_last@example.com</a> now</p>",
    );
}

#[test]
fn bare_url_not_in_code_span() {
    assert_html_with(
        "`https://example.com`",
        ParseOption::AutomaticallyCreateLinks.into(),
        "<p><code>https://example.com</code></p>",
    );
}

#[test]
fn bare_url_after_multibyte_character() {
    assert_html_with(
        "日http://x.y",
        ParseOption::AutomaticallyCreateLinks.into(),
        "<p>日<a href=\"http://x.y\">http://x.y</a></p>",
    );
}
