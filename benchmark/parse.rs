use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mkd::{ParseOption, ParseOptions};
use std::fmt::Write;
use std::hint::black_box;

fn sections(n: usize) -> String {
    let mut s = String::new();
    for i in 1..=n {
        let level = "#".repeat(i % 3 + 1);
        let _ = write!(s, "{level} Section {i}\n\nBody text for section {i}.\n\n");
    }
    s
}

fn deep_list(depth: usize) -> String {
    let mut s = String::new();
    for i in 0..depth {
        let _ = writeln!(s, "{:indent$}- level {i}", "", indent = i * 2);
    }
    s
}

fn wide_table(rows: usize, cols: usize) -> String {
    let row = |cell: &dyn Fn(usize) -> String| {
        (0..cols).fold(String::from("|"), |mut line, c| {
            let _ = write!(line, " {} |", cell(c));
            line
        })
    };
    let mut s = row(&|c| format!("h{c}"));
    s.push('\n');
    s.push_str(&row(&|_| "---".to_string()));
    s.push('\n');
    for r in 0..rows {
        s.push_str(&row(&|c| format!("{r}.{c}")));
        s.push('\n');
    }
    s
}

fn inline_prose(paragraphs: usize) -> String {
    let mut s = String::new();
    for i in 0..paragraphs {
        let _ = write!(
            s,
            "A *light* and **heavy** line with `code`, ~~gone~~ text and \
             [a link](http://example.com/{i}). It's \"quoted\" -- e=mc^2...\n\n"
        );
    }
    s
}

fn fenced_blocks(n: usize) -> String {
    let mut s = String::new();
    for i in 0..n {
        let _ = write!(s, "~~~ c\nint f{i}(void) {{\n    return {i};\n}}\n~~~\n\n");
    }
    s
}

fn footnoted(n: usize) -> String {
    let mut body = String::new();
    let mut notes = String::new();
    for i in 0..n {
        let _ = write!(body, "Statement {i} needs a source.[^s{i}]\n\n");
        let _ = writeln!(notes, "[^s{i}]: Where statement {i} came from.");
    }
    body + &notes
}

fn definitions(n: usize) -> String {
    let mut s = String::from("% Glossary\n% Various\n% Today\n\n");
    for i in 0..n {
        let _ = write!(s, "Term {i}\n: What term {i} means (c) 2024.\n\n");
    }
    s
}

type CompileFn = fn(&str) -> String;

const COMPILERS: &[(&str, CompileFn)] = &[("mkd", with_mkd), ("pulldown_cmark", with_pulldown_cmark)];

fn options() -> ParseOptions {
    ParseOption::EnableFencedCode
        | ParseOption::EnableMarkdownExtraFootnotes
        | ParseOption::GenerateTableOfContents
}

fn with_mkd(input: &str) -> String {
    mkd::to_html(input, options())
}

fn with_pulldown_cmark(input: &str) -> String {
    let opts = pulldown_cmark::Options::ENABLE_STRIKETHROUGH
        | pulldown_cmark::Options::ENABLE_TABLES
        | pulldown_cmark::Options::ENABLE_FOOTNOTES
        | pulldown_cmark::Options::ENABLE_SMART_PUNCTUATION
        | pulldown_cmark::Options::ENABLE_DEFINITION_LIST;
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, pulldown_cmark::Parser::new_ext(input, opts));
    html
}

fn compare(c: &mut Criterion, group_name: &str, input: &str) {
    let mut group = c.benchmark_group(group_name);
    let size = format!("{} bytes", input.len());
    for &(name, compile) in COMPILERS {
        group.bench_with_input(BenchmarkId::new(name, &size), input, |b, input| {
            b.iter(|| compile(black_box(input)))
        });
    }
    group.finish();
}

fn by_size(c: &mut Criterion) {
    let prose = inline_prose(200);
    for size in [1_000, 10_000, 100_000] {
        let input: String = prose.chars().cycle().take(size).collect();
        compare(c, &format!("size/{size}"), &input);
    }
}

fn by_construct(c: &mut Criterion) {
    let inputs = [
        ("sections", sections(200)),
        ("deep_list", deep_list(50)),
        ("table", wide_table(100, 10)),
        ("fenced_code", fenced_blocks(100)),
        ("footnotes", footnoted(100)),
        ("definitions", definitions(100)),
        ("prose", inline_prose(200)),
    ];
    for (name, input) in &inputs {
        compare(c, &format!("construct/{name}"), input);
    }
}

criterion_group!(benches, by_size, by_construct);
criterion_main!(benches);
