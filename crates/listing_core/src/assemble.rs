use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::ExtractionError;
use crate::extract::images::dedupe_capped;
use crate::record::{FuelType, VehicleRecord, PLACEHOLDER_IMAGE, UNKNOWN_MODEL};
use crate::settings::TitlePolicy;

/// Field results gathered for one page, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingDraft {
    pub title: Option<String>,
    pub price: Option<u64>,
    pub power: Option<u32>,
    pub mileage: Option<u32>,
    pub model_year: Option<u32>,
    pub fuel_type: Option<FuelType>,
    pub images: Vec<String>,
}

/// Validates a draft and freezes it into a [`VehicleRecord`].
///
/// Checks run in order and the first failure is returned: a missing or zero
/// price, then an empty title once `policy` has had its say.
pub fn assemble(
    draft: ListingDraft,
    source_url: &str,
    policy: TitlePolicy,
    extracted_at: DateTime<Utc>,
) -> Result<VehicleRecord, ExtractionError> {
    let price = draft
        .price
        .filter(|price| *price > 0)
        .ok_or(ExtractionError::MissingPrice)?;

    let title = match (draft.title.filter(|t| !t.trim().is_empty()), policy) {
        (Some(title), _) => title,
        (None, TitlePolicy::Fallback) => UNKNOWN_MODEL.to_string(),
        (None, TitlePolicy::Required) => return Err(ExtractionError::MissingTitle),
    };

    let mut images = dedupe_capped(draft.images);
    if images.is_empty() {
        images.push(PLACEHOLDER_IMAGE.to_string());
    }

    Ok(VehicleRecord {
        id: record_id(source_url),
        source_url: source_url.to_string(),
        extracted_at,
        title,
        fuel_type: draft.fuel_type,
        power: draft.power.unwrap_or(0),
        mileage: draft.mileage.unwrap_or(0),
        model_year: draft.model_year.unwrap_or(0),
        price,
        images,
    })
}

/// Stable identifier of a listing: the first 8 bytes of SHA-256 over its URL.
pub fn record_id(source_url: &str) -> String {
    Sha256::digest(source_url.as_bytes())
        .iter()
        .take(8)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
