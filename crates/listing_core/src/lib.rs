//! Listing core: pure extraction of vehicle records from listing pages.
//!
//! Nothing in this crate performs IO. Callers hand over a loaded [`Document`]
//! (or raw HTML) and receive a validated [`VehicleRecord`] or an
//! [`ExtractionError`].
mod assemble;
mod document;
mod error;
mod extract;
mod record;
mod settings;

pub use assemble::{assemble, record_id, ListingDraft};
pub use document::Document;
pub use error::{BlockParseError, ErrorKind, ExtractionError, SettingsError};
pub use extract::images::{collect_images, rewrite_thumbnail};
pub use extract::structured::{parse_blocks, StructuredFacts};
pub use extract::technical::{kw_to_ps, TechnicalDetails};
pub use extract::{validate_url, CompiledSelectors, ListingExtractor, Strategy};
pub use record::{
    FuelType, VehicleRecord, KW_TO_PS, MAX_IMAGES, MAX_YEAR, MIN_YEAR, PLACEHOLDER_IMAGE,
    UNKNOWN_MODEL,
};
pub use settings::{ExtractionProfile, ExtractorSettings, TitlePolicy};
