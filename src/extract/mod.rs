//! Extraction of structured app records from detail pages
//!
//! Only the app identifier and the title heading are mandatory. Everything
//! else is probe-and-default: an absent marker leaves an empty string or an
//! empty list, never an error.

mod clean;
pub mod fields;
mod rating;

pub use clean::{clean_description, clean_inline, clean_text, clean_user};
pub use rating::{
    extract_rating_block, parse_rating_label, parse_star_text, strip_ratings_suffix, RatingSummary,
};

use fields::{apply_field_table, probe, rich_text, IDENTITY_FIELDS, LANGUAGES, OPTIONAL_FIELDS};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors produced while extracting a detail page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("missing {missing}; not an app detail page")]
    InvalidDocument { missing: &'static str },
}

/// The main record of one app
///
/// Every field except `app_id` and `app_name` is an empty string when the
/// page does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppRecord {
    pub app_id: String,
    pub app_name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub published_date: String,
    pub last_updated_date: String,
    pub version: String,
    pub size: String,
    pub seller: String,
    pub copyright: String,
    pub app_rating: String,
    pub compatibility: String,
    pub current_version_rating_value: String,
    pub current_version_rating_count: String,
    pub all_versions_rating_value: String,
    pub all_versions_rating_count: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    pub app_id: String,
    pub language_name: String,
}

/// A "Top In-App Purchases" entry; `order` is its 1-based display position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InAppPurchase {
    pub app_id: String,
    pub order: u32,
    pub title: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerReview {
    pub app_id: String,
    pub title: String,
    pub rating: String,
    pub user: String,
    pub content: String,
}

/// Everything extracted from one detail page, stored as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedApp {
    pub record: AppRecord,
    pub languages: Vec<LanguageEntry>,
    pub purchases: Vec<InAppPurchase>,
    pub reviews: Vec<CustomerReview>,
}

/// Extracts a [`ParsedApp`] from a detail-page document
///
/// # Errors
///
/// Returns [`ExtractError::InvalidDocument`] when the app identifier or the
/// app name is missing. No other absence is an error.
///
/// # Example
///
/// ```
/// use appstore_harvest::extract::extract;
///
/// let html = r#"<div id="title"><h1>Archery King</h1></div>
///     <div class="lockup product application" adam-id="1121971067"></div>"#;
/// let app = extract(html).unwrap();
/// assert_eq!(app.record.app_id, "1121971067");
/// assert_eq!(app.record.app_name, "Archery King");
/// assert!(app.reviews.is_empty());
/// ```
pub fn extract(html: &str) -> Result<ParsedApp, ExtractError> {
    let document = Html::parse_document(html);

    let mut record = AppRecord::default();
    apply_field_table(&document, IDENTITY_FIELDS, &mut record);

    if record.app_id.is_empty() {
        return Err(ExtractError::InvalidDocument { missing: "app identifier" });
    }
    if record.app_name.is_empty() {
        return Err(ExtractError::InvalidDocument { missing: "app name" });
    }

    apply_field_table(&document, OPTIONAL_FIELDS, &mut record);

    if let Some(current) = extract_rating_block(&document, "Current Version") {
        record.current_version_rating_value = current.value;
        record.current_version_rating_count = current.count;
    }
    if let Some(all) = extract_rating_block(&document, "All Versions") {
        record.all_versions_rating_value = all.value;
        record.all_versions_rating_count = all.count;
    }

    let app_id = record.app_id.clone();
    let parsed = ParsedApp {
        languages: extract_languages(&document, &app_id),
        purchases: extract_purchases(&document, &app_id),
        reviews: extract_reviews(&document, &app_id),
        record,
    };

    tracing::debug!(
        "Extracted app {} ({} languages, {} purchases, {} reviews)",
        parsed.record.app_id,
        parsed.languages.len(),
        parsed.purchases.len(),
        parsed.reviews.len()
    );

    Ok(parsed)
}

fn extract_languages(document: &Html, app_id: &str) -> Vec<LanguageEntry> {
    let Some(raw) = probe(document, &LANGUAGES) else {
        return Vec::new();
    };

    clean_inline(&raw)
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| LanguageEntry {
            app_id: app_id.to_string(),
            language_name: name.to_string(),
        })
        .collect()
}

fn extract_purchases(document: &Html, app_id: &str) -> Vec<InAppPurchase> {
    let Ok(item_selector) = Selector::parse("div.in-app-purchases ol li") else {
        return Vec::new();
    };

    (1..=u32::MAX)
        .zip(document.select(&item_selector))
        .map(|(order, item)| InAppPurchase {
            app_id: app_id.to_string(),
            order,
            title: child_text(&item, ".in-app-title").map(|t| clean_inline(&t)).unwrap_or_default(),
            price: child_text(&item, ".in-app-price").map(|t| clean_inline(&t)).unwrap_or_default(),
        })
        .collect()
}

fn extract_reviews(document: &Html, app_id: &str) -> Vec<CustomerReview> {
    let (Ok(review_selector), Ok(rating_selector)) = (
        Selector::parse("div.customer-review"),
        Selector::parse(".rating[aria-label]"),
    ) else {
        return Vec::new();
    };

    document
        .select(&review_selector)
        .map(|review| {
            let rating = review
                .select(&rating_selector)
                .next()
                .and_then(|el| el.value().attr("aria-label"))
                .and_then(parse_star_text)
                .unwrap_or_default();

            CustomerReview {
                app_id: app_id.to_string(),
                title: child_text(&review, ".customerReviewTitle")
                    .map(|t| clean_inline(&t))
                    .unwrap_or_default(),
                rating,
                user: child_text(&review, ".user-info")
                    .map(|t| clean_user(&t))
                    .unwrap_or_default(),
                content: child_element(&review, "p.content")
                    .map(|el| clean_description(&rich_text(&el)))
                    .unwrap_or_default(),
            }
        })
        .collect()
}

fn child_element<'a>(scope: &ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    scope.select(&selector).next()
}

fn child_text(scope: &ElementRef, selector: &str) -> Option<String> {
    child_element(scope, selector).map(|element| element.text().collect())
}
