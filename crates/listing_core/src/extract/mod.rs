pub mod images;
pub mod price;
pub mod structured;
pub mod technical;
pub mod title;

use chrono::{DateTime, Utc};
use listing_logging::{listing_debug, listing_trace};
use scraper::Selector;
use url::Url;

use crate::assemble::{assemble, ListingDraft};
use crate::document::Document;
use crate::error::{ExtractionError, SettingsError};
use crate::record::VehicleRecord;
use crate::settings::{ExtractionProfile, ExtractorSettings, TitlePolicy};

/// One way of resolving a field. `None` defers to the next strategy.
pub type Strategy<T> = fn(&Document, &CompiledSelectors) -> Option<T>;

/// Runs `strategies` in order and returns the first resolved value.
pub(crate) fn first_resolved<T>(
    document: &Document,
    selectors: &CompiledSelectors,
    strategies: &[(&'static str, Strategy<T>)],
) -> Option<T> {
    strategies.iter().find_map(|(name, strategy)| {
        let value = strategy(document, selectors);
        if value.is_none() {
            listing_trace!("strategy {name} did not resolve");
        }
        value
    })
}

/// Selectors from [`ExtractorSettings`], parsed once.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub(crate) title: Vec<Selector>,
    pub(crate) price: Vec<Selector>,
    pub(crate) detail_items: Vec<Selector>,
    pub(crate) static_images: Vec<Selector>,
    pub(crate) marketplace_token: String,
}

impl CompiledSelectors {
    pub fn compile(settings: &ExtractorSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            title: compile_all("title", &settings.title_selectors)?,
            price: compile_all("price", &settings.price_selectors)?,
            detail_items: compile_all("detail item", &settings.detail_item_selectors)?,
            static_images: compile_all("static image", &settings.static_image_selectors)?,
            marketplace_token: settings.marketplace_token.clone(),
        })
    }
}

fn compile_all(field: &'static str, sources: &[String]) -> Result<Vec<Selector>, SettingsError> {
    sources
        .iter()
        .map(|source| {
            Selector::parse(source).map_err(|err| SettingsError::InvalidSelector {
                field,
                selector: source.clone(),
                message: err.to_string(),
            })
        })
        .collect()
}

/// Accepts absolute `http`/`https` URLs only.
pub fn validate_url(raw: &str) -> Result<Url, ExtractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::InvalidInput("url is empty".into()));
    }
    let url = Url::parse(trimmed)
        .map_err(|err| ExtractionError::InvalidInput(format!("{trimmed}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractionError::InvalidInput(format!(
            "{trimmed}: unsupported scheme {other}"
        ))),
    }
}

/// Turns a listing page into a validated [`VehicleRecord`].
///
/// Scalar fields short-circuit on the first strategy that resolves; the
/// structured-data block only fills what is still missing afterwards; images
/// accumulate across strategies.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    selectors: CompiledSelectors,
    profile: ExtractionProfile,
    title_policy: TitlePolicy,
}

impl ListingExtractor {
    pub fn new(settings: &ExtractorSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            selectors: CompiledSelectors::compile(settings)?,
            profile: settings.profile,
            title_policy: settings.title_policy,
        })
    }

    pub fn profile(&self) -> ExtractionProfile {
        self.profile
    }

    pub fn title_policy(&self) -> TitlePolicy {
        self.title_policy
    }

    pub fn extract_html(
        &self,
        url: &str,
        html: &str,
        extracted_at: DateTime<Utc>,
    ) -> Result<VehicleRecord, ExtractionError> {
        let page_url = validate_url(url)?;
        let document = Document::parse(html);
        self.extract_validated(&page_url, &document, extracted_at)
    }

    pub fn extract(
        &self,
        url: &str,
        document: &Document,
        extracted_at: DateTime<Utc>,
    ) -> Result<VehicleRecord, ExtractionError> {
        let page_url = validate_url(url)?;
        self.extract_validated(&page_url, document, extracted_at)
    }

    /// Field values before validation, for callers that want to inspect a page.
    pub fn draft(&self, page_url: &Url, document: &Document) -> ListingDraft {
        let mut draft = ListingDraft {
            title: title::extract(document, &self.selectors),
            price: price::extract(document, &self.selectors),
            ..ListingDraft::default()
        };

        let details = technical::extract(document, &self.selectors);
        draft.power = details.power;
        draft.mileage = details.mileage;
        draft.model_year = details.model_year;
        draft.fuel_type = details.fuel_type;

        let facts = structured::extract(document);
        facts.fill_gaps(&mut draft);

        draft.images = images::collect_images(document, &self.selectors, self.profile, page_url);
        draft
    }

    fn extract_validated(
        &self,
        page_url: &Url,
        document: &Document,
        extracted_at: DateTime<Utc>,
    ) -> Result<VehicleRecord, ExtractionError> {
        let draft = self.draft(page_url, document);
        listing_debug!(
            "draft for {page_url}: title={:?} price={:?} power={:?} mileage={:?} year={:?} fuel={:?} images={}",
            draft.title,
            draft.price,
            draft.power,
            draft.mileage,
            draft.model_year,
            draft.fuel_type,
            draft.images.len()
        );
        assemble(draft, page_url.as_str(), self.title_policy, extracted_at)
    }
}
