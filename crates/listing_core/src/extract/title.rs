use super::{first_resolved, CompiledSelectors, Strategy};
use crate::document::Document;

const STRATEGIES: &[(&str, Strategy<String>)] = &[("title selectors", from_selectors)];

/// Resolves the model name; `None` leaves the decision to the title policy.
pub(crate) fn extract(document: &Document, selectors: &CompiledSelectors) -> Option<String> {
    first_resolved(document, selectors, STRATEGIES)
}

fn from_selectors(document: &Document, selectors: &CompiledSelectors) -> Option<String> {
    selectors
        .title
        .iter()
        .find_map(|selector| document.first_text(selector))
}
