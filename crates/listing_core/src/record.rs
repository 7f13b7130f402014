use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when no strategy resolves a model name.
pub const UNKNOWN_MODEL: &str = "Unbekanntes Modell";

/// Upper bound on the number of images kept per record.
pub const MAX_IMAGES: usize = 10;

/// Horsepower per kilowatt.
pub const KW_TO_PS: f64 = 1.36;

/// Oldest model year accepted from free text.
pub const MIN_YEAR: u32 = 1990;

/// Newest model year accepted from free text.
pub const MAX_YEAR: u32 = 2025;

/// Grey "Kein Bild" card used when a listing exposes no usable image.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20width%3D%22400%22%20height%3D%22300%22%20viewBox%3D%220%200%20400%20300%22%3E%3Crect%20width%3D%22400%22%20height%3D%22300%22%20fill%3D%22%23e0e0e0%22%2F%3E%3Ctext%20x%3D%22200%22%20y%3D%22150%22%20font-family%3D%22Arial%2Csans-serif%22%20font-size%3D%2224%22%20fill%3D%22%23888888%22%20text-anchor%3D%22middle%22%20dominant-baseline%3D%22middle%22%3EKein%20Bild%3C%2Ftext%3E%3C%2Fsvg%3E";

/// Closed fuel vocabulary of a [`VehicleRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
    #[serde(rename = "LPG")]
    Lpg,
    #[serde(rename = "CNG")]
    Cng,
}

impl FuelType {
    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Lpg => "LPG",
            FuelType::Cng => "CNG",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated vehicle listing.
///
/// Numeric fields use `0` for "not found on the page" and an unresolved fuel
/// type serializes as an empty string. Records are only built by
/// [`crate::assemble`] and are read-only afterwards.
///
/// `Deserialize` is for reading back JSON that was written from assembled
/// records, such as a saved batch summary. It does not re-run validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub(crate) id: String,
    pub(crate) source_url: String,
    pub(crate) extracted_at: DateTime<Utc>,
    pub(crate) title: String,
    #[serde(with = "fuel_or_empty")]
    pub(crate) fuel_type: Option<FuelType>,
    pub(crate) power: u32,
    pub(crate) mileage: u32,
    pub(crate) model_year: u32,
    pub(crate) price: u64,
    pub(crate) images: Vec<String>,
}

impl VehicleRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn extracted_at(&self) -> DateTime<Utc> {
        self.extracted_at
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fuel_type(&self) -> Option<FuelType> {
        self.fuel_type
    }

    /// Horsepower, `0` when unknown.
    pub fn power(&self) -> u32 {
        self.power
    }

    /// Kilometres, `0` when unknown.
    pub fn mileage(&self) -> u32 {
        self.mileage
    }

    /// Model year, `0` when unknown.
    pub fn model_year(&self) -> u32 {
        self.model_year
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// True when the image list only holds [`PLACEHOLDER_IMAGE`].
    pub fn has_placeholder_image(&self) -> bool {
        self.images.len() == 1 && self.images[0] == PLACEHOLDER_IMAGE
    }
}

mod fuel_or_empty {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::FuelType;

    pub fn serialize<S: Serializer>(value: &Option<FuelType>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(value.map(FuelType::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<FuelType>, D::Error> {
        let raw = String::deserialize(de)?;
        match raw.as_str() {
            "" => Ok(None),
            "Gasoline" => Ok(Some(FuelType::Gasoline)),
            "Diesel" => Ok(Some(FuelType::Diesel)),
            "Electric" => Ok(Some(FuelType::Electric)),
            "Hybrid" => Ok(Some(FuelType::Hybrid)),
            "LPG" => Ok(Some(FuelType::Lpg)),
            "CNG" => Ok(Some(FuelType::Cng)),
            other => Err(D::Error::custom(format!("unknown fuel type `{other}`"))),
        }
    }
}
