use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

use super::CompiledSelectors;
use crate::document::Document;
use crate::record::MAX_IMAGES;
use crate::settings::ExtractionProfile;

static IMAGES: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static SRCSET_SOURCES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[srcset], source[srcset]").unwrap());
static STYLED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[style*="background-image"]"#).unwrap());
static CSS_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).unwrap());

const LAZY_ATTRIBUTES: &[&str] = &["src", "data-src", "data-lazy-src"];
const STATIC_ATTRIBUTES: &[&str] = &["src", "data-src"];
const EXCLUDED_TOKENS: &[&str] = &["logo", "icon"];
const THUMBNAIL_SEGMENTS: &[&str] = &["/xs/", "/s/", "/m/"];
const LARGE_SEGMENT: &str = "/l/";
const VEHICLE_TOKEN: &str = "vehicle";

/// Gallery image URLs of a listing, deduplicated and capped at [`MAX_IMAGES`].
///
/// Unlike the scalar fields every strategy contributes; results are unioned in
/// strategy order. The list may be empty; the assembler owns the placeholder.
pub fn collect_images(
    document: &Document,
    selectors: &CompiledSelectors,
    profile: ExtractionProfile,
    page_url: &Url,
) -> Vec<String> {
    let candidates = match profile {
        ExtractionProfile::Rendered => {
            let filter = RenderedFilter {
                page_url,
                token: &selectors.marketplace_token,
            };
            let mut found = Vec::new();
            found.extend(lazy_sources(document).filter_map(|raw| filter.accept(raw)));
            found.extend(srcset_sources(document).filter_map(|raw| filter.accept(raw)));
            found.extend(background_sources(document).filter_map(|raw| filter.accept(&raw)));
            found
        }
        ExtractionProfile::Static => static_sources(document, selectors),
    };
    dedupe_capped(candidates)
}

/// Rewrites small-size path segments of a CDN URL to the large variant.
pub fn rewrite_thumbnail(url: &str) -> String {
    THUMBNAIL_SEGMENTS
        .iter()
        .fold(url.to_string(), |acc, segment| acc.replace(segment, LARGE_SEGMENT))
}

/// Keeps first occurrences, in order, up to [`MAX_IMAGES`].
pub(crate) fn dedupe_capped(urls: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .take(MAX_IMAGES)
        .collect()
}

struct RenderedFilter<'a> {
    page_url: &'a Url,
    token: &'a str,
}

impl RenderedFilter<'_> {
    /// The token and exclusion rules apply to the attribute value as
    /// written, so relative paths on the marketplace's own host never pass.
    fn accept(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if !raw.contains(self.token) || is_excluded(raw) {
            return None;
        }
        let resolved = self.page_url.join(raw).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }
        Some(rewrite_thumbnail(resolved.as_str()))
    }
}

fn is_excluded(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    EXCLUDED_TOKENS.iter().any(|token| lower.contains(token))
}

fn lazy_sources(document: &Document) -> impl Iterator<Item = &str> {
    document
        .select(&IMAGES)
        .flat_map(|img| attributes(img, LAZY_ATTRIBUTES))
}

fn srcset_sources(document: &Document) -> impl Iterator<Item = &str> {
    document
        .select(&SRCSET_SOURCES)
        .filter_map(|el| el.value().attr("srcset"))
        .flat_map(|srcset| srcset.split(','))
        .filter_map(|candidate| candidate.split_whitespace().next())
}

fn background_sources(document: &Document) -> impl Iterator<Item = String> + '_ {
    document
        .select(&STYLED)
        .filter_map(|el| el.value().attr("style"))
        .flat_map(|style| {
            CSS_URL_RE
                .captures_iter(style)
                .map(|caps| caps[1].to_string())
                .collect::<Vec<_>>()
        })
}

/// `src`/`data-src` of gallery images or of any image under a vehicle path.
/// Only absolute URLs are taken.
fn static_sources(document: &Document, selectors: &CompiledSelectors) -> Vec<String> {
    let gallery = selectors
        .static_images
        .iter()
        .flat_map(|selector| document.select(selector))
        .flat_map(|img| attributes(img, STATIC_ATTRIBUTES));
    let vehicle_paths = document
        .select(&IMAGES)
        .flat_map(|img| attributes(img, STATIC_ATTRIBUTES))
        .filter(|src| src.contains(VEHICLE_TOKEN));

    gallery
        .chain(vehicle_paths)
        .map(str::trim)
        .filter(|src| src.starts_with("http://") || src.starts_with("https://"))
        .filter(|src| !is_excluded(src))
        .map(str::to_string)
        .collect()
}

fn attributes<'a>(
    element: ElementRef<'a>,
    names: &'static [&'static str],
) -> impl Iterator<Item = &'a str> {
    names
        .iter()
        .filter_map(move |name| element.value().attr(name))
        .filter(|value| !value.trim().is_empty())
}
