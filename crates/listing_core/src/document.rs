use std::cell::OnceCell;

use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A parsed listing page.
///
/// Owned by a single extraction call and dropped once the record is built.
pub struct Document {
    html: Html,
    text: OnceCell<String>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            text: OnceCell::new(),
        }
    }

    pub fn select<'a>(&'a self, selector: &'a Selector) -> Select<'a, 'a> {
        self.html.select(selector)
    }

    /// Text of the first matching element whose trimmed text is non-empty.
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.select(selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    }

    /// All text a reader would see, with whitespace collapsed to single spaces.
    ///
    /// Computed on first use and cached for the lifetime of the document.
    pub fn visible_text(&self) -> &str {
        self.text.get_or_init(|| self.collect_visible_text())
    }

    fn collect_visible_text(&self) -> String {
        let mut pieces = Vec::new();
        for node in self.html.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            if !hidden && !text.trim().is_empty() {
                pieces.push(&**text);
            }
        }
        collapse_whitespace(&pieces.join(" "))
    }

    /// Raw contents of every `application/ld+json` script, in document order.
    pub fn structured_data_blocks(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
            return Vec::new();
        };
        self.select(&selector)
            .map(|script| script.text().collect::<String>())
            .collect()
    }
}

/// Trimmed text of an element, whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_text_skips_scripts_and_styles() {
        let doc = Document::parse(
            r#"<html><head><style>.a { color: red }</style></head>
            <body><p>150   PS</p><script>var km = "999 km";</script><span>Diesel</span></body></html>"#,
        );
        assert_eq!(doc.visible_text(), "150 PS Diesel");
    }

    #[test]
    fn first_text_skips_empty_matches() {
        let doc = Document::parse("<h1> </h1><h1>\n Audi  A4 </h1>");
        let h1 = Selector::parse("h1").unwrap();
        assert_eq!(doc.first_text(&h1).as_deref(), Some("Audi A4"));
    }

    #[test]
    fn structured_blocks_are_returned_in_order() {
        let doc = Document::parse(
            r#"<script type="application/ld+json">{"a":1}</script>
            <script>ignored()</script>
            <script type="application/ld+json">{"b":2}</script>"#,
        );
        assert_eq!(doc.structured_data_blocks(), vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }
}
