use mkd::{Block, CompileError, Inline, Output, ParseOption, ParseOptions, compile};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn toc_options() -> ParseOptions {
    ParseOption::GenerateTableOfContents.into()
}

#[test]
fn compiles_a_heading() {
    let doc = compile("# Hello, world!", ParseOptions::default()).unwrap();
    assert_eq!(doc.html(), "<h1>Hello, world!</h1>");
    assert_eq!(doc.css(), "");
    assert_eq!(doc.title(), None);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t\n  \n")]
fn whitespace_only_sources_fail(#[case] source: &str) {
    let err = compile(source, ParseOptions::default()).unwrap_err();
    assert_eq!(err, CompileError::Empty);
    assert_eq!(err.to_string(), "document has no compilable content");
}

#[test]
fn reads_the_metadata_header() {
    let doc = compile(
        "% Pride and Prejudice\n% Jane Austen\n% 28th January 1813\n\nIt is a truth universally acknowledged.",
        ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(doc.title(), Some("Pride and Prejudice"));
    assert_eq!(doc.author(), Some("Jane Austen"));
    assert_eq!(doc.date(), Some("28th January 1813"));
    assert_eq!(doc.html(), "<p>It is a truth universally acknowledged.</p>");
}

#[test]
fn incomplete_header_is_ordinary_text() {
    let doc = compile("% Title\nBody", ParseOptions::default()).unwrap();
    assert!(doc.metadata().is_empty());
    assert_eq!(doc.html(), "<p>% Title\nBody</p>");
}

#[test]
fn table_of_contents_links_heading_anchors() {
    let doc = compile("# Introduction", toc_options()).unwrap();
    assert_eq!(
        doc.html(),
        "<a name=\"Introduction\"></a>\n<h1>Introduction</h1>"
    );
    assert_eq!(
        doc.table_of_contents(),
        "<ul>\n <li><a href=\"#Introduction\">Introduction</a></li>\n</ul>\n"
    );
}

#[test]
fn table_of_contents_without_the_option_is_empty() {
    let doc = compile("# Introduction", ParseOptions::default()).unwrap();
    assert_eq!(doc.html(), "<h1>Introduction</h1>");
    assert_eq!(doc.table_of_contents(), "");
    assert_eq!(doc.output(Output::TableOfContents), "");
}

#[test]
fn repeated_headings_get_distinct_anchors() {
    let doc = compile("# Introduction\n\n# Introduction", toc_options()).unwrap();
    assert_eq!(
        doc.html(),
        "<a name=\"Introduction\"></a>\n<h1>Introduction</h1>\n\n\
         <a name=\"Introduction-1\"></a>\n<h1>Introduction</h1>"
    );
    assert_eq!(
        doc.table_of_contents(),
        "<ul>\n \
         <li><a href=\"#Introduction\">Introduction</a></li>\n \
         <li><a href=\"#Introduction-1\">Introduction</a></li>\n\
         </ul>\n"
    );
}

#[test]
fn table_of_contents_unwraps_links() {
    let doc = compile("## See [docs](/d)", toc_options()).unwrap();
    assert_eq!(
        doc.html(),
        "<a name=\"See-docs\"></a>\n<h2>See <a href=\"/d\">docs</a></h2>"
    );
    assert_eq!(
        doc.table_of_contents(),
        "<ul>\n <li><a href=\"#See-docs\">See docs</a></li>\n</ul>\n"
    );
}

#[test]
fn style_blocks_are_diverted_to_css() {
    let doc = compile(
        "<style>\np { color: red; }\n</style>\n\nHello",
        ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(doc.html(), "<p>Hello</p>");
    assert_eq!(doc.css(), "<style>\np { color: red; }\n</style>\n");
    assert_eq!(doc.output(Output::Css), doc.css());
}

#[test]
fn style_line_directly_before_a_heading() {
    let doc = compile(
        "<style> body { margin: 0; }</style>\n# Hello, world!",
        ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(doc.html(), "<h1>Hello, world!</h1>");
    assert_eq!(doc.css(), "<style> body { margin: 0; }</style>\n");
}

#[test]
fn style_only_document_has_empty_html() {
    let doc = compile("<style>a{}</style>", ParseOptions::default()).unwrap();
    assert_eq!(doc.html(), "");
    assert_eq!(doc.css(), "<style>a{}</style>\n");
}

#[test]
fn disabled_links_stay_literal() {
    let doc = compile("[x](/y)", ParseOption::DisableLinks.into()).unwrap();
    assert_eq!(doc.html(), "<p>[x](/y)</p>");
}

#[test]
fn cdata_wraps_raw_html_blocks() {
    let doc = compile("<div>\nx\n</div>", ParseOption::CData.into()).unwrap();
    assert_eq!(doc.html(), "<![CDATA[<div>\nx\n</div>]]>");
}

#[test]
fn compiling_twice_gives_identical_output() {
    let source = "% T\n% A\n% D\n\n# One\n\n<style>b{}</style>\n\nText with \"quotes\" and a[^n].\n\n[^n]: Note.";
    let opts = ParseOption::GenerateTableOfContents | ParseOption::EnableMarkdownExtraFootnotes;
    let first = compile(source, opts).unwrap();
    let second = compile(source, opts).unwrap();
    assert_eq!(first.html(), second.html());
    assert_eq!(first.css(), second.css());
    assert_eq!(first.table_of_contents(), second.table_of_contents());
    assert_eq!(first.metadata(), second.metadata());
}

#[test]
fn exposes_the_block_tree() {
    let doc = compile("# T\n\npara", ParseOptions::default()).unwrap();
    assert_eq!(
        doc.blocks(),
        &[
            Block::Heading {
                level: 1,
                content: vec![Inline::Text("T".into())],
                anchor: None,
            },
            Block::Paragraph {
                content: vec![Inline::Text("para".into())],
            },
        ]
    );
    assert_eq!(
        serde_json::to_value(doc.blocks()).unwrap(),
        json!([
            {
                "type": "Heading",
                "level": 1,
                "content": [{ "type": "Text", "value": "T" }],
                "anchor": null
            },
            {
                "type": "Paragraph",
                "content": [{ "type": "Text", "value": "para" }]
            }
        ])
    );
}

#[test]
fn reference_table_is_available_after_compiling() {
    let doc = compile(
        "[a][x]\n\n[x]: /target \"T\"",
        ParseOptions::default(),
    )
    .unwrap();
    let reference = doc.references().link("X").unwrap();
    assert_eq!(reference.url, "/target");
    assert_eq!(reference.title.as_deref(), Some("T"));
}

#[test]
fn options_deserialize_from_camel_case() {
    let opts: ParseOptions = serde_json::from_value(json!({
        "enableFencedCode": true,
        "allowMarkdownInsideHTML": true,
        "disableHTML": false
    }))
    .unwrap();
    assert_eq!(
        opts,
        ParseOption::EnableFencedCode | ParseOption::AllowMarkdownInsideHtml
    );
    let doc = compile("```\nx\n```", opts).unwrap();
    assert_eq!(doc.options(), opts);
    assert_eq!(doc.html(), "<pre><code>x\n</code></pre>");
}

#[test]
fn deeply_nested_quotes_compile() {
    let source = ">".repeat(10_000) + " x";
    let doc = compile(&source, ParseOptions::default()).unwrap();
    assert_eq!(doc.html().matches("<blockquote>").count(), 64);
    assert!(
        doc.html()
            .contains(&format!("<p>{} x</p>", "&gt;".repeat(10_000 - 64)))
    );
}

#[test]
fn deeply_nested_lists_compile() {
    let source: String = (0..1_000).map(|i| format!("{}- x\n", "  ".repeat(i))).collect();
    let doc = compile(&source, ParseOptions::default()).unwrap();
    assert_eq!(doc.html().matches("<ul>").count(), 64);
}
