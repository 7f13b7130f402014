use std::sync::LazyLock;

use listing_logging::listing_debug;
use regex::Regex;
use serde_json::{Map, Value};

use super::technical::detect_fuel;
use crate::assemble::ListingDraft;
use crate::document::Document;
use crate::error::BlockParseError;
use crate::record::FuelType;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

const VEHICLE_TYPES: &[&str] = &["Car", "Vehicle"];
const DATE_KEYS: &[&str] = &[
    "dateVehicleFirstRegistered",
    "productionDate",
    "vehicleModelDate",
    "modelDate",
];

/// Values published by the page's embedded `Car`/`Vehicle` metadata.
///
/// These are authoritative but only ever fill fields the selector and text
/// strategies left unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredFacts {
    pub title: Option<String>,
    pub model_year: Option<u32>,
    pub mileage: Option<u32>,
    pub fuel_type: Option<FuelType>,
    pub price: Option<u64>,
}

/// Parses every block independently; one bad block does not affect the others.
pub fn parse_blocks(raw: &[String]) -> Vec<Result<Value, BlockParseError>> {
    raw.iter()
        .enumerate()
        .map(|(index, text)| {
            serde_json::from_str(text.trim()).map_err(|source| BlockParseError { index, source })
        })
        .collect()
}

pub(crate) fn extract(document: &Document) -> StructuredFacts {
    StructuredFacts::from_blocks(&document.structured_data_blocks())
}

impl StructuredFacts {
    pub fn from_blocks(raw: &[String]) -> Self {
        let mut facts = Self::default();
        for parsed in parse_blocks(raw) {
            let value = match parsed {
                Ok(value) => value,
                Err(err) => {
                    listing_debug!("{err} ({:?}), skipped", err.kind());
                    continue;
                }
            };
            let mut nodes = Vec::new();
            collect_nodes(&value, &mut nodes);
            for node in nodes.into_iter().filter(|node| is_vehicle(node)) {
                facts.absorb(node);
            }
        }
        facts
    }

    /// Copies each known value into `draft` where the draft has none yet.
    pub fn fill_gaps(&self, draft: &mut ListingDraft) {
        if draft.title.is_none() {
            draft.title = self.title.clone();
        }
        draft.model_year = draft.model_year.or(self.model_year);
        draft.mileage = draft.mileage.or(self.mileage);
        draft.fuel_type = draft.fuel_type.or(self.fuel_type);
        draft.price = draft.price.or(self.price);
    }

    fn absorb(&mut self, node: &Map<String, Value>) {
        if self.title.is_none() {
            self.title = node
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
        }
        if self.model_year.is_none() {
            self.model_year = DATE_KEYS
                .iter()
                .find_map(|key| node.get(*key).and_then(year_of));
        }
        if self.mileage.is_none() {
            self.mileage = node.get("mileageFromOdometer").and_then(mileage_of);
        }
        if self.fuel_type.is_none() {
            self.fuel_type = node
                .get("fuelType")
                .and_then(Value::as_str)
                .and_then(detect_fuel);
        }
        if self.price.is_none() {
            self.price = node.get("offers").and_then(price_of);
        }
    }
}

fn collect_nodes<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_nodes(item, out)),
        Value::Object(map) => {
            out.push(map);
            if let Some(graph) = map.get("@graph") {
                collect_nodes(graph, out);
            }
        }
        _ => {}
    }
}

fn is_vehicle(node: &Map<String, Value>) -> bool {
    let matches = |ty: &str| {
        let local = ty.rsplit(&['/', ':'][..]).next().unwrap_or(ty);
        VEHICLE_TYPES.contains(&local)
    };
    match node.get("@type") {
        Some(Value::String(ty)) => matches(ty.as_str()),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

fn year_of(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|year| u32::try_from(year).ok()),
        Value::String(text) => YEAR_RE.find(text)?.as_str().parse().ok(),
        _ => None,
    }
}

fn mileage_of(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Object(quantity) => quantity.get("value")?,
        other => other,
    };
    match raw {
        Value::Number(n) => n.as_f64().map(|km| km.round() as u32),
        Value::String(text) => text
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .ok(),
        _ => None,
    }
}

fn price_of(offers: &Value) -> Option<u64> {
    match offers {
        Value::Array(items) => items.iter().find_map(price_of),
        Value::Object(offer) => amount_of(offer.get("price")?),
        _ => None,
    }
}

fn amount_of(value: &Value) -> Option<u64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (amount.is_finite() && amount >= 0.5).then(|| amount.round() as u64)
}
