use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flags controlling which Markdown constructs are recognized.
///
/// The default value enables nothing and restricts nothing: standard
/// processing with smart typography, superscript, strikethrough, tables,
/// definition lists and alphabetic lists all on, and fenced code, footnotes
/// and the table of contents off.
///
/// ```
/// use mkd::ParseOptions;
///
/// let opts = ParseOptions {
///     enable_fenced_code: true,
///     generate_table_of_contents: true,
///     ..Default::default()
/// };
/// assert!(!opts.disable_html);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Compile Markdown found between a block-level opening tag line and
    /// its closing tag line.
    #[serde(rename = "allowMarkdownInsideHTML")]
    pub allow_markdown_inside_html: bool,
    /// Turn bare `http://`, `https://`, `ftp://` URLs and email addresses
    /// into links.
    pub automatically_create_links: bool,
    /// Wrap raw HTML blocks and code bodies in `<![CDATA[ ... ]]>`.
    pub c_data: bool,
    /// Neutralize links and images whose URL uses a scheme outside a small
    /// allowlist.
    pub create_safe_links: bool,
    /// Treat `a.` / `A.` markers as text instead of list markers.
    pub disable_alphanumeric_lists: bool,
    /// Do not recognize `term` / `: definition` blocks.
    pub disable_definition_list: bool,
    /// Escape raw HTML blocks and inline tags instead of passing them through.
    #[serde(rename = "disableHTML")]
    pub disable_html: bool,
    /// Leave `![alt](url)` as literal text.
    pub disable_images: bool,
    /// Leave `[text](url)` and autolinks as literal text.
    pub disable_links: bool,
    /// Do not substitute typographic quotes, dashes and ellipses.
    pub disable_smart_formatting: bool,
    /// Leave `~~text~~` as literal text.
    pub disable_strikethrough: bool,
    /// Leave `x^y` as literal text.
    pub disable_superscript: bool,
    /// Do not recognize pipe tables.
    pub disable_tables: bool,
    /// Recognize ```` ``` ```` and `~~~` fenced code blocks.
    pub enable_fenced_code: bool,
    /// Recognize `[^label]` footnote references and definitions.
    pub enable_markdown_extra_footnotes: bool,
    /// Expand tabs to the next multiple-of-four column before compiling.
    pub expand_spaces_to_tabs: bool,
    /// Inject heading anchors and build a table of contents.
    pub generate_table_of_contents: bool,
}

/// A single named flag of [`ParseOptions`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseOption {
    AllowMarkdownInsideHtml,
    AutomaticallyCreateLinks,
    CData,
    CreateSafeLinks,
    DisableAlphanumericLists,
    DisableDefinitionList,
    DisableHtml,
    DisableImages,
    DisableLinks,
    DisableSmartFormatting,
    DisableStrikethrough,
    DisableSuperscript,
    DisableTables,
    EnableFencedCode,
    EnableMarkdownExtraFootnotes,
    ExpandSpacesToTabs,
    GenerateTableOfContents,
}

impl ParseOption {
    pub const ALL: [ParseOption; 17] = [
        ParseOption::AllowMarkdownInsideHtml,
        ParseOption::AutomaticallyCreateLinks,
        ParseOption::CData,
        ParseOption::CreateSafeLinks,
        ParseOption::DisableAlphanumericLists,
        ParseOption::DisableDefinitionList,
        ParseOption::DisableHtml,
        ParseOption::DisableImages,
        ParseOption::DisableLinks,
        ParseOption::DisableSmartFormatting,
        ParseOption::DisableStrikethrough,
        ParseOption::DisableSuperscript,
        ParseOption::DisableTables,
        ParseOption::EnableFencedCode,
        ParseOption::EnableMarkdownExtraFootnotes,
        ParseOption::ExpandSpacesToTabs,
        ParseOption::GenerateTableOfContents,
    ];

    /// The camelCase name used in serialized option sets.
    pub fn name(self) -> &'static str {
        match self {
            ParseOption::AllowMarkdownInsideHtml => "allowMarkdownInsideHTML",
            ParseOption::AutomaticallyCreateLinks => "automaticallyCreateLinks",
            ParseOption::CData => "cData",
            ParseOption::CreateSafeLinks => "createSafeLinks",
            ParseOption::DisableAlphanumericLists => "disableAlphanumericLists",
            ParseOption::DisableDefinitionList => "disableDefinitionList",
            ParseOption::DisableHtml => "disableHTML",
            ParseOption::DisableImages => "disableImages",
            ParseOption::DisableLinks => "disableLinks",
            ParseOption::DisableSmartFormatting => "disableSmartFormatting",
            ParseOption::DisableStrikethrough => "disableStrikethrough",
            ParseOption::DisableSuperscript => "disableSuperscript",
            ParseOption::DisableTables => "disableTables",
            ParseOption::EnableFencedCode => "enableFencedCode",
            ParseOption::EnableMarkdownExtraFootnotes => "enableMarkdownExtraFootnotes",
            ParseOption::ExpandSpacesToTabs => "expandSpacesToTabs",
            ParseOption::GenerateTableOfContents => "generateTableOfContents",
        }
    }
}

impl fmt::Display for ParseOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown parse option `{0}`")]
pub struct UnknownOption(pub String);

impl FromStr for ParseOption {
    type Err = UnknownOption;

    /// Accepts the camelCase name, the snake_case field name, or either
    /// spelled in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        ParseOption::ALL
            .into_iter()
            .find(|opt| opt.name().eq_ignore_ascii_case(&folded))
            .ok_or_else(|| UnknownOption(s.to_string()))
    }
}

impl ParseOptions {
    /// The empty option set.
    pub const fn none() -> Self {
        Self {
            allow_markdown_inside_html: false,
            automatically_create_links: false,
            c_data: false,
            create_safe_links: false,
            disable_alphanumeric_lists: false,
            disable_definition_list: false,
            disable_html: false,
            disable_images: false,
            disable_links: false,
            disable_smart_formatting: false,
            disable_strikethrough: false,
            disable_superscript: false,
            disable_tables: false,
            enable_fenced_code: false,
            enable_markdown_extra_footnotes: false,
            expand_spaces_to_tabs: false,
            generate_table_of_contents: false,
        }
    }

    fn flag_mut(&mut self, option: ParseOption) -> &mut bool {
        match option {
            ParseOption::AllowMarkdownInsideHtml => &mut self.allow_markdown_inside_html,
            ParseOption::AutomaticallyCreateLinks => &mut self.automatically_create_links,
            ParseOption::CData => &mut self.c_data,
            ParseOption::CreateSafeLinks => &mut self.create_safe_links,
            ParseOption::DisableAlphanumericLists => &mut self.disable_alphanumeric_lists,
            ParseOption::DisableDefinitionList => &mut self.disable_definition_list,
            ParseOption::DisableHtml => &mut self.disable_html,
            ParseOption::DisableImages => &mut self.disable_images,
            ParseOption::DisableLinks => &mut self.disable_links,
            ParseOption::DisableSmartFormatting => &mut self.disable_smart_formatting,
            ParseOption::DisableStrikethrough => &mut self.disable_strikethrough,
            ParseOption::DisableSuperscript => &mut self.disable_superscript,
            ParseOption::DisableTables => &mut self.disable_tables,
            ParseOption::EnableFencedCode => &mut self.enable_fenced_code,
            ParseOption::EnableMarkdownExtraFootnotes => &mut self.enable_markdown_extra_footnotes,
            ParseOption::ExpandSpacesToTabs => &mut self.expand_spaces_to_tabs,
            ParseOption::GenerateTableOfContents => &mut self.generate_table_of_contents,
        }
    }

    pub fn insert(&mut self, option: ParseOption) {
        *self.flag_mut(option) = true;
    }

    pub fn remove(&mut self, option: ParseOption) {
        *self.flag_mut(option) = false;
    }

    pub fn contains(&self, option: ParseOption) -> bool {
        let mut copy = *self;
        *copy.flag_mut(option)
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, option: ParseOption) -> Self {
        self.insert(option);
        self
    }

    /// Iterates over the flags that are set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = ParseOption> + '_ {
        ParseOption::ALL
            .into_iter()
            .filter(move |opt| self.contains(*opt))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }
}

impl From<ParseOption> for ParseOptions {
    fn from(option: ParseOption) -> Self {
        Self::none().with(option)
    }
}

impl FromIterator<ParseOption> for ParseOptions {
    fn from_iter<I: IntoIterator<Item = ParseOption>>(iter: I) -> Self {
        let mut opts = Self::none();
        for opt in iter {
            opts.insert(opt);
        }
        opts
    }
}

impl BitOr for ParseOptions {
    type Output = ParseOptions;

    fn bitor(self, rhs: ParseOptions) -> ParseOptions {
        let mut out = self;
        for opt in rhs.iter() {
            out.insert(opt);
        }
        out
    }
}

impl BitOr<ParseOption> for ParseOptions {
    type Output = ParseOptions;

    fn bitor(self, rhs: ParseOption) -> ParseOptions {
        self.with(rhs)
    }
}

impl BitOr for ParseOption {
    type Output = ParseOptions;

    fn bitor(self, rhs: ParseOption) -> ParseOptions {
        ParseOptions::from(self).with(rhs)
    }
}

/// Parses a comma and/or whitespace separated list of flag names.
/// The words `none` and the empty string yield the empty set.
impl FromStr for ParseOptions {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(|c: char| c == ',' || c == '|' || c.is_whitespace())
            .filter(|word| !word.is_empty() && !word.eq_ignore_ascii_case("none"))
            .map(str::parse::<ParseOption>)
            .collect()
    }
}

impl fmt::Display for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for opt in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            f.write_str(opt.name())?;
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}
