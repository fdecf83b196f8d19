//! # mkd
//!
//! A Markdown-to-HTML compiler in the Discount dialect: metadata headers,
//! tables, definition lists, footnotes, smart typography, superscripts,
//! heading anchors with a table of contents, and `<style>` blocks diverted
//! to a separate CSS stream.
//!
//! ## Usage
//!
//! ```
//! use mkd::{ParseOption, ParseOptions, compile};
//!
//! let doc = compile("# Hello, world!", ParseOptions::default()).unwrap();
//! assert_eq!(doc.html(), "<h1>Hello, world!</h1>");
//!
//! let opts = ParseOptions::from(ParseOption::GenerateTableOfContents);
//! let doc = compile("# Introduction", opts).unwrap();
//! assert_eq!(doc.html(), "<a name=\"Introduction\"></a>\n<h1>Introduction</h1>");
//! assert_eq!(
//!     doc.table_of_contents(),
//!     "<ul>\n <li><a href=\"#Introduction\">Introduction</a></li>\n</ul>\n"
//! );
//! ```
//!
//! ## Options
//!
//! The default option set is empty: standard processing with every
//! extension that is on by default left on. Each flag in [`ParseOptions`]
//! turns one feature on or off:
//!
//! | Syntax | HTML | Option |
//! |---|---|---|
//! | `~~text~~` | `<del>` | `disable_strikethrough` |
//! | `x^2` | `<sup>` | `disable_superscript` |
//! | `\| table \|` | `<table>` | `disable_tables` |
//! | `term` / `: definition` | `<dl>` | `disable_definition_list` |
//! | `"quotes"`, `--`, `...` | `&ldquo;`, `&ndash;`, `&hellip;` | `disable_smart_formatting` |
//! | ```` ``` ```` fences | `<pre><code>` | `enable_fenced_code` |
//! | `[^note]` | footnotes | `enable_markdown_extra_footnotes` |
//! | bare URLs | `<a>` | `automatically_create_links` |

pub mod ast;
mod block;
mod document;
mod error;
mod html;
mod inline;
mod metadata;
mod options;
mod refs;
mod render;
mod toc;

pub use ast::{
    Block, DefinitionItem, Inline, Inlines, ListKind, SmartPunct, TableAlignment, TableData,
};
pub use document::{Document, Output, compile, to_html};
pub use error::CompileError;
pub use metadata::Metadata;
pub use options::{ParseOption, ParseOptions, UnknownOption};
pub use refs::{LinkReference, ReferenceTable};

#[inline(always)]
pub(crate) fn is_ascii_punctuation(b: u8) -> bool {
    matches!(b, b'!'..=b'/' | b':'..=b'@' | b'['..=b'`' | b'{'..=b'~')
}

#[inline(always)]
pub(crate) fn utf8_char_len(first: u8) -> usize {
    if first < 0x80 {
        1
    } else if first < 0xE0 {
        2
    } else if first < 0xF0 {
        3
    } else {
        4
    }
}
