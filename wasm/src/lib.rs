use mkd::{Document, ParseOptions};
use wasm_bindgen::prelude::*;

/// A compiled Markdown document.
#[wasm_bindgen]
pub struct Markdown {
    doc: Document,
}

#[wasm_bindgen]
impl Markdown {
    /// `options` is a comma separated list of flag names such as
    /// `"enableFencedCode, generateTableOfContents"`.
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str, options: Option<String>) -> Result<Markdown, JsError> {
        let options = match options.as_deref() {
            Some(names) => names.parse::<ParseOptions>()?,
            None => ParseOptions::default(),
        };
        let doc = mkd::compile(source, options)?;
        Ok(Markdown { doc })
    }

    #[wasm_bindgen(getter)]
    pub fn html(&self) -> String {
        self.doc.html().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn css(&self) -> String {
        self.doc.css().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn title(&self) -> Option<String> {
        self.doc.title().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn author(&self) -> Option<String> {
        self.doc.author().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn date(&self) -> Option<String> {
        self.doc.date().map(str::to_string)
    }

    #[wasm_bindgen(getter, js_name = "tableOfContents")]
    pub fn table_of_contents(&self) -> String {
        self.doc.table_of_contents().to_string()
    }

    /// The block tree as JSON.
    pub fn ast(&self) -> String {
        serde_json::to_string(self.doc.blocks()).unwrap_or_default()
    }
}
