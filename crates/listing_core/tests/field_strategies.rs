use listing_core::{Document, ExtractorSettings, FuelType, ListingDraft, ListingExtractor};
use pretty_assertions::assert_eq;
use url::Url;

const PAGE_URL: &str = "https://www.autoscout24.de/angebote/vw-golf-abc123";

fn draft_of(html: &str) -> ListingDraft {
    let extractor = ListingExtractor::new(&ExtractorSettings::default()).unwrap();
    let url = Url::parse(PAGE_URL).unwrap();
    extractor.draft(&url, &Document::parse(html))
}

#[test]
fn title_prefers_ad_title_marker_over_headings() {
    let draft = draft_of(
        r#"<h1>Suchergebnisse</h1>
        <div data-testid="ad-title">  Volkswagen Golf
            VII 1.4 TSI </div>"#,
    );
    assert_eq!(draft.title.as_deref(), Some("Volkswagen Golf VII 1.4 TSI"));
}

#[test]
fn title_skips_empty_candidates_and_uses_first_heading() {
    let draft = draft_of(r#"<div data-testid="ad-title"> </div><h1>Skoda Octavia Combi</h1>"#);
    assert_eq!(draft.title.as_deref(), Some("Skoda Octavia Combi"));
}

#[test]
fn title_uses_bold_subheading_last() {
    let draft = draft_of(r#"<h2 class="text-bold">Mazda CX-5</h2>"#);
    assert_eq!(draft.title.as_deref(), Some("Mazda CX-5"));
}

#[test]
fn price_takes_first_positive_selector_match() {
    let draft = draft_of(
        r#"<div class="PriceInfo_wrapper">Preis auf Anfrage</div>
        <span data-testid="prime-price">€ 15.990,-</span>
        <div class="price-old">20.000 €</div>"#,
    );
    assert_eq!(draft.price, Some(15_990));
}

#[test]
fn price_stays_unresolved_without_digits() {
    let draft = draft_of(r#"<div class="price">VB</div><div class="Price">0 €</div>"#);
    assert_eq!(draft.price, None);
}

#[test]
fn definition_list_resolves_technical_details() {
    let draft = draft_of(
        r#"<dl>
            <dt>Kilometerstand</dt><dd>123.456 km</dd>
            <dt>Leistung</dt><dd>110 kW (150 PS)</dd>
            <dt>Erstzulassung</dt><dd>03/2018</dd>
            <dt>Getriebe</dt><dd>Automatik</dd>
            <dt>Kraftstoff</dt><dd>Diesel</dd>
        </dl>"#,
    );
    assert_eq!(draft.mileage, Some(123_456));
    assert_eq!(draft.power, Some(150));
    assert_eq!(draft.model_year, Some(2018));
    assert_eq!(draft.fuel_type, Some(FuelType::Diesel));
}

#[test]
fn detail_items_split_label_and_value() {
    let draft = draft_of(
        r#"<ul data-testid="technical-data">
            <li><span>Laufleistung</span><span>45.000 km</span></li>
            <li><span>Leistung</span><span>147 kW</span></li>
        </ul>"#,
    );
    assert_eq!(draft.mileage, Some(45_000));
    assert_eq!(draft.power, Some(200));
}

#[test]
fn page_text_fills_details_without_structure() {
    let draft = draft_of(
        r#"<div class="stage"><p>Gebraucht, 147 kW, 98.000 km, EZ 2016, Benzin</p></div>"#,
    );
    assert_eq!(draft.power, Some(200));
    assert_eq!(draft.mileage, Some(98_000));
    assert_eq!(draft.model_year, Some(2016));
    assert_eq!(draft.fuel_type, Some(FuelType::Gasoline));
}

#[test]
fn detail_list_wins_over_page_text() {
    let draft = draft_of(
        r#"<p>Vergleichbar: 300 PS</p>
        <dl><dt>Leistung</dt><dd>150 PS</dd></dl>"#,
    );
    assert_eq!(draft.power, Some(150));
}

#[test]
fn mileage_text_strips_thousands_separators() {
    let draft = draft_of("<p>Kilometerstand: 123.456 km</p>");
    assert_eq!(draft.mileage, Some(123_456));
}

#[test]
fn free_text_year_outside_range_is_rejected() {
    let draft = draft_of("<p>Oldtimer aus 1975, liebevoll gepflegt</p>");
    assert_eq!(draft.model_year, None);
}

#[test]
fn structured_year_is_not_range_checked() {
    let draft = draft_of(
        r#"<p>Oldtimer aus 1975</p>
        <script type="application/ld+json">
            {"@type": "Car", "productionDate": "1975-06-01"}
        </script>"#,
    );
    assert_eq!(draft.model_year, Some(1975));
}

#[test]
fn transmission_and_fuel_text_are_combined() {
    let draft = draft_of(
        r#"<dl><dt>Getriebe</dt><dd>Automatik</dd><dt>Kraftstoffart</dt><dd>Elektro</dd></dl>"#,
    );
    assert_eq!(draft.fuel_type, Some(FuelType::Electric));
}

#[test]
fn relative_images_on_the_marketplace_host_are_not_gallery_images() {
    let draft = draft_of(
        r#"<img src="/assets/dealer/banner-2024.jpg">
        <img src="https://prod.pictures.autoscout24.net/listing-images/g/m/1.jpg">"#,
    );
    assert_eq!(
        draft.images,
        vec!["https://prod.pictures.autoscout24.net/listing-images/g/l/1.jpg".to_string()]
    );
}

#[test]
fn consumption_row_does_not_hide_the_fuel_row() {
    let draft = draft_of(
        r#"<p>Kein Hybrid</p>
        <dl>
            <dt>Kraftstoffverbrauch</dt><dd>5,6 l/100 km</dd>
            <dt>Kraftstoff</dt><dd>Diesel</dd>
        </dl>"#,
    );
    assert_eq!(draft.fuel_type, Some(FuelType::Diesel));
}

#[test]
fn mileage_value_ignores_trailing_notes() {
    let draft = draft_of(
        r#"<dl><dt>Kilometerstand</dt><dd>50.000 km (1. Hand)</dd><dt>Leistung</dt><dd>ca. 150 (2 Schlüssel)</dd></dl>"#,
    );
    assert_eq!(draft.mileage, Some(50_000));
    assert_eq!(draft.power, Some(150));
}
