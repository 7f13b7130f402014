use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::{first_resolved, CompiledSelectors, Strategy};
use crate::document::{element_text, Document};
use crate::record::{FuelType, KW_TO_PS, MAX_YEAR, MIN_YEAR};

static PS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*PS\b").unwrap());
static KW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*kW\b").unwrap());
// Skips "l/100 km" consumption figures and "km/h" speeds.
static MILEAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^/\d.,])(\d{1,3}(?:\.\d{3})+|\d+)\s*km(?:[^/\w]|$)").unwrap()
});
static REGISTRATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/(\d{4})\b").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());
static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\D*?(\d{1,3}(?:\.\d{3})+|\d+)").unwrap());

/// Ordered fuel vocabulary; the first entry present in a text wins.
static FUEL_VOCABULARY: LazyLock<Vec<(Regex, FuelType)>> = LazyLock::new(|| {
    [
        (r"(?i)\bhybrid\b", FuelType::Hybrid),
        (r"(?i)\b(?:elektro|electric)\b", FuelType::Electric),
        (r"(?i)\bdiesel\b", FuelType::Diesel),
        (r"(?i)\b(?:benzin|gasoline|petrol)\b", FuelType::Gasoline),
        (r"(?i)\b(?:autogas|lpg)\b", FuelType::Lpg),
        (r"(?i)\b(?:erdgas|cng)\b", FuelType::Cng),
    ]
    .into_iter()
    .map(|(pattern, fuel)| (Regex::new(pattern).unwrap(), fuel))
    .collect()
});

static DEFINITION_PARTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("dl dt, dl dd").unwrap());

const POWER: &[(&str, Strategy<u32>)] = &[
    ("power from detail list", power_from_details),
    ("power from page text", power_from_text),
];
const MILEAGE: &[(&str, Strategy<u32>)] = &[
    ("mileage from detail list", mileage_from_details),
    ("mileage from page text", mileage_from_text),
];
const MODEL_YEAR: &[(&str, Strategy<u32>)] = &[
    ("year from detail list", year_from_details),
    ("year from page text", year_from_text),
];
const FUEL: &[(&str, Strategy<FuelType>)] = &[
    ("fuel from detail list", fuel_from_details),
    ("fuel from page text", fuel_from_text),
];

/// Power, mileage, model year and fuel type of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TechnicalDetails {
    pub power: Option<u32>,
    pub mileage: Option<u32>,
    pub model_year: Option<u32>,
    pub fuel_type: Option<FuelType>,
}

pub(crate) fn extract(document: &Document, selectors: &CompiledSelectors) -> TechnicalDetails {
    TechnicalDetails {
        power: first_resolved(document, selectors, POWER),
        mileage: first_resolved(document, selectors, MILEAGE),
        model_year: first_resolved(document, selectors, MODEL_YEAR),
        fuel_type: first_resolved(document, selectors, FUEL),
    }
}

/// Converts kilowatts to horsepower, rounded to the nearest whole number.
pub fn kw_to_ps(kw: u32) -> u32 {
    (f64::from(kw) * KW_TO_PS).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailLabel {
    Mileage,
    Power,
    Year,
    Fuel,
    Transmission,
}

fn classify(label: &str) -> Option<DetailLabel> {
    let label = label.to_lowercase();
    // "laufleistung" contains "leistung", so mileage is checked first.
    if label.contains("kilometerstand") || label.contains("laufleistung") {
        Some(DetailLabel::Mileage)
    } else if label.contains("leistung") || label.contains("ps") {
        Some(DetailLabel::Power)
    } else if label.contains("erstzulassung") || label.contains("baujahr") {
        Some(DetailLabel::Year)
    } else if label.contains("kraftstoff") {
        Some(DetailLabel::Fuel)
    } else if label.contains("getriebe") {
        Some(DetailLabel::Transmission)
    } else {
        None
    }
}

/// Label/value pairs from definition lists and configured detail items.
fn detail_pairs(document: &Document, selectors: &CompiledSelectors) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    let mut label: Option<String> = None;
    for part in document.select(&DEFINITION_PARTS) {
        match part.value().name() {
            "dt" => label = Some(element_text(part)),
            _ => {
                if let Some(label) = label.take() {
                    pairs.push((label, element_text(part)));
                }
            }
        }
    }

    for selector in &selectors.detail_items {
        for item in document.select(selector) {
            let mut children = item.children().filter_map(ElementRef::wrap);
            let Some(label) = children.next().map(element_text) else {
                continue;
            };
            let value = children
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !label.is_empty() && !value.is_empty() {
                pairs.push((label, value));
            }
        }
    }

    pairs
}

fn detail_value(
    document: &Document,
    selectors: &CompiledSelectors,
    wanted: DetailLabel,
) -> Option<String> {
    detail_pairs(document, selectors)
        .into_iter()
        .find(|(label, _)| classify(label) == Some(wanted))
        .map(|(_, value)| value)
}

fn power_from_details(document: &Document, selectors: &CompiledSelectors) -> Option<u32> {
    let value = detail_value(document, selectors, DetailLabel::Power)?;
    power_in(&value).or_else(|| leading_number(&value).filter(|ps| *ps > 0))
}

fn mileage_from_details(document: &Document, selectors: &CompiledSelectors) -> Option<u32> {
    let value = detail_value(document, selectors, DetailLabel::Mileage)?;
    mileage_in(&value).or_else(|| leading_number(&value))
}

fn year_from_details(document: &Document, selectors: &CompiledSelectors) -> Option<u32> {
    let value = detail_value(document, selectors, DetailLabel::Year)?;
    year_in(&value)
}

/// Fuel rows are tried in order; rows such as "Kraftstoffverbrauch" carry no
/// vocabulary word and are passed over.
fn fuel_from_details(document: &Document, selectors: &CompiledSelectors) -> Option<FuelType> {
    let pairs = detail_pairs(document, selectors);
    let transmission = pairs
        .iter()
        .find(|(label, _)| classify(label) == Some(DetailLabel::Transmission))
        .map(|(_, value)| value.as_str());

    pairs
        .iter()
        .filter(|(label, _)| classify(label) == Some(DetailLabel::Fuel))
        .find_map(|(_, fuel)| match transmission {
            Some(transmission) => detect_fuel(&format!("{transmission} {fuel}")),
            None => detect_fuel(fuel),
        })
        .or_else(|| transmission.and_then(detect_fuel))
}

fn power_from_text(document: &Document, _: &CompiledSelectors) -> Option<u32> {
    power_in(document.visible_text())
}

fn mileage_from_text(document: &Document, _: &CompiledSelectors) -> Option<u32> {
    mileage_in(document.visible_text())
}

fn year_from_text(document: &Document, _: &CompiledSelectors) -> Option<u32> {
    year_in(document.visible_text())
}

fn fuel_from_text(document: &Document, _: &CompiledSelectors) -> Option<FuelType> {
    detect_fuel(document.visible_text())
}

/// A `N PS` figure, else a `N kW` figure converted to PS.
pub(crate) fn power_in(text: &str) -> Option<u32> {
    first_number(&PS_RE, text)
        .or_else(|| first_number(&KW_RE, text).map(kw_to_ps))
        .filter(|ps| *ps > 0)
}

/// A `N km` figure with `.` thousands separators removed.
pub(crate) fn mileage_in(text: &str) -> Option<u32> {
    MILEAGE_RE
        .captures_iter(text)
        .find_map(|caps| caps[1].replace('.', "").parse().ok())
}

/// First year token in `MIN_YEAR..=MAX_YEAR`, preferring `MM/YYYY` dates.
pub(crate) fn year_in(text: &str) -> Option<u32> {
    [&*REGISTRATION_RE, &*YEAR_RE].into_iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps[1].parse::<u32>().ok())
            .find(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
    })
}

/// First vocabulary fuel type mentioned in `text`.
pub(crate) fn detect_fuel(text: &str) -> Option<FuelType> {
    FUEL_VOCABULARY
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, fuel)| *fuel)
}

fn first_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures_iter(text)
        .find_map(|caps| caps[1].parse().ok())
}

/// The first number in `text`, `.` thousands separators removed.
fn leading_number(text: &str) -> Option<u32> {
    LEADING_NUMBER_RE
        .captures(text)
        .and_then(|caps| caps[1].replace('.', "").parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kw_conversion_rounds() {
        assert_eq!(kw_to_ps(147), 200);
        assert_eq!(kw_to_ps(110), 150);
        assert_eq!(power_in("Leistung 85 kW"), Some(116));
    }

    #[test]
    fn ps_figure_wins_over_kw() {
        assert_eq!(power_in("110 kW (150 PS)"), Some(150));
    }

    #[test]
    fn mileage_ignores_consumption_and_speed() {
        assert_eq!(mileage_in("5,6 l/100 km, Spitze 210 km/h, 123.456 km"), Some(123_456));
        assert_eq!(mileage_in("Spitze 210 km/h"), None);
        assert_eq!(mileage_in("8500km"), Some(8_500));
    }

    #[test]
    fn bare_detail_values_stop_at_the_first_number() {
        assert_eq!(leading_number("50.000 (1. Hand)"), Some(50_000));
        assert_eq!(leading_number("ca. 150"), Some(150));
        assert_eq!(leading_number("keine Angabe"), None);
    }

    #[test]
    fn years_outside_range_fall_through() {
        assert_eq!(year_in("Baujahr 1975"), None);
        assert_eq!(year_in("1975 restauriert, EZ 2019"), Some(2019));
        assert_eq!(year_in("Hubraum 1995 cm³, Erstzulassung 04/2017"), Some(2017));
    }

    #[test]
    fn labels_are_classified_by_keyword() {
        assert_eq!(classify("Laufleistung"), Some(DetailLabel::Mileage));
        assert_eq!(classify("Leistung"), Some(DetailLabel::Power));
        assert_eq!(classify("PS"), Some(DetailLabel::Power));
        assert_eq!(classify("Erstzulassung"), Some(DetailLabel::Year));
        assert_eq!(classify("Kraftstoffart"), Some(DetailLabel::Fuel));
        assert_eq!(classify("Getriebe"), Some(DetailLabel::Transmission));
        assert_eq!(classify("Farbe"), None);
    }

    #[test]
    fn fuel_vocabulary_order_is_fixed() {
        assert_eq!(detect_fuel("Hybrid (Benzin/Elektro)"), Some(FuelType::Hybrid));
        assert_eq!(detect_fuel("Automatik Diesel"), Some(FuelType::Diesel));
        assert_eq!(detect_fuel("Autogas (LPG)"), Some(FuelType::Lpg));
        assert_eq!(detect_fuel("Elektrische Fensterheber"), None);
    }
}
