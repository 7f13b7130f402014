use listing_logging::listing_trace;

use super::{first_resolved, CompiledSelectors, Strategy};
use crate::document::{element_text, Document};

const STRATEGIES: &[(&str, Strategy<u64>)] = &[("price selectors", from_selectors)];

pub(crate) fn extract(document: &Document, selectors: &CompiledSelectors) -> Option<u64> {
    first_resolved(document, selectors, STRATEGIES)
}

/// First strictly positive amount among the elements of the first selector
/// that yields one.
fn from_selectors(document: &Document, selectors: &CompiledSelectors) -> Option<u64> {
    selectors.price.iter().find_map(|selector| {
        document.select(selector).find_map(|element| {
            let text = element_text(element);
            let amount = parse_amount(&text);
            if amount.is_none() {
                listing_trace!("ignoring price candidate {text:?}");
            }
            amount
        })
    })
}

/// Keeps the digits of `text` and reads them as an amount; zero and
/// overflowing values are rejected.
pub(crate) fn parse_amount(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u64>().ok().filter(|amount| *amount > 0)
}

#[cfg(test)]
mod tests {
    use super::parse_amount;

    #[test]
    fn strips_currency_and_separators() {
        assert_eq!(parse_amount("€ 15.990,-"), Some(15_990));
        assert_eq!(parse_amount("19 500 EUR"), Some(19_500));
    }

    #[test]
    fn rejects_zero_and_empty() {
        assert_eq!(parse_amount("Preis auf Anfrage"), None);
        assert_eq!(parse_amount("0 €"), None);
        assert_eq!(parse_amount("99999999999999999999999"), None);
    }
}
