use serde::{Deserialize, Serialize};

/// How the document was obtained, which decides the image strategy set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractionProfile {
    /// DOM rendered by a browser session: lazy-load, srcset and inline-style
    /// images are present.
    #[default]
    Rendered,
    /// Raw HTML from a plain fetch.
    Static,
}

/// What happens when no title strategy matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TitlePolicy {
    /// Substitute [`crate::UNKNOWN_MODEL`].
    #[default]
    Fallback,
    /// Fail the record with `MissingTitle`.
    Required,
}

/// Marketplace-specific knobs of the extractor.
///
/// Selector lists are tried in order. Every field has a default, so a
/// configuration file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub profile: ExtractionProfile,
    pub title_policy: TitlePolicy,
    /// Substring every rendered-profile image URL must contain.
    pub marketplace_token: String,
    pub title_selectors: Vec<String>,
    pub price_selectors: Vec<String>,
    /// List items holding a label element followed by a value.
    pub detail_item_selectors: Vec<String>,
    /// Gallery images for the static profile.
    pub static_image_selectors: Vec<String>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            profile: ExtractionProfile::default(),
            title_policy: TitlePolicy::default(),
            marketplace_token: "autoscout24".to_string(),
            title_selectors: strings(&[
                r#"[data-testid="ad-title"]"#,
                r#"h1[class*="title"], h1[class*="Title"]"#,
                "h1",
                r#"h2[class*="bold"]"#,
            ]),
            price_selectors: strings(&[
                r#"[class*="PriceInfo"]"#,
                r#"[data-testid="prime-price"]"#,
                r#"[class*="price"]"#,
                r#"[class*="Price"]"#,
            ]),
            detail_item_selectors: strings(&[
                r#"[data-testid*="technical"] li"#,
                r#"[class*="TechnicalData"] li"#,
            ]),
            static_image_selectors: strings(&[
                r#"[data-testid*="gallery"] img"#,
                r#"[class*="Gallery"] img"#,
                "picture img",
            ]),
        }
    }
}

impl ExtractorSettings {
    pub fn with_profile(mut self, profile: ExtractionProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_title_policy(mut self, policy: TitlePolicy) -> Self {
        self.title_policy = policy;
        self
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
