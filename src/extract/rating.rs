//! Star-rating text parsing and rating block extraction
//!
//! The storefront renders ratings as accessible text such as
//! `"4 and a half stars, 736 Ratings"`. When a block carries a direct numeric
//! `ratingValue` that value wins; otherwise the star text is parsed.

use crate::extract::clean::clean_inline;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Value and review count of one rating block, empty when absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingSummary {
    pub value: String,
    pub count: String,
}

fn star_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d+)(\s+and\s+a\s+half)?\s+stars?\b")
            .unwrap_or_else(|e| unreachable!("star pattern is invalid: {e}"))
    })
}

/// Parses `"<N> star(s)"` or `"<N> and a half stars"` into `"N"` or `"N.5"`
///
/// # Examples
///
/// ```
/// use appstore_harvest::extract::parse_star_text;
///
/// assert_eq!(parse_star_text("4 and a half stars").as_deref(), Some("4.5"));
/// assert_eq!(parse_star_text("1 star").as_deref(), Some("1"));
/// assert_eq!(parse_star_text("no rating"), None);
/// ```
pub fn parse_star_text(text: &str) -> Option<String> {
    let captures = star_pattern().captures(text)?;
    let whole = captures.get(1)?.as_str();

    if captures.get(2).is_some() {
        Some(format!("{}.5", whole))
    } else {
        Some(whole.to_string())
    }
}

/// Strips a trailing `Ratings` suffix and thousands separators from a count
pub fn strip_ratings_suffix(text: &str) -> String {
    let text = clean_inline(text);
    let trimmed = text
        .strip_suffix("Ratings")
        .or_else(|| text.strip_suffix("Rating"))
        .unwrap_or(text.as_str());
    trimmed.trim().replace(',', "")
}

/// Parses a full accessible label: `"<stars>, <count> Ratings"`
///
/// # Examples
///
/// ```
/// use appstore_harvest::extract::parse_rating_label;
///
/// let summary = parse_rating_label("4 and a half stars, 736 Ratings");
/// assert_eq!(summary.value, "4.5");
/// assert_eq!(summary.count, "736");
/// ```
pub fn parse_rating_label(label: &str) -> RatingSummary {
    let (stars, count) = match label.split_once(',') {
        Some((stars, count)) => (stars, count),
        None => (label, ""),
    };

    RatingSummary {
        value: parse_star_text(stars).unwrap_or_default(),
        count: strip_ratings_suffix(count),
    }
}

/// Finds the rating block introduced by `label` (e.g. `"Current Version"`)
///
/// Returns None when the ratings container or the labeled block is missing.
pub fn extract_rating_block(document: &Html, label: &str) -> Option<RatingSummary> {
    let container_selector = Selector::parse("div.customer-ratings").ok()?;
    let container = document.select(&container_selector).next()?;

    let mut children = container.children().filter_map(ElementRef::wrap);
    children.find(|child| clean_inline(&child.text().collect::<String>()).starts_with(label))?;
    // an unrated version has no block; never borrow the next label's
    let block = children.next().filter(|child| has_class(child, "rating"))?;

    Some(summarize_block(&block))
}

fn summarize_block(block: &ElementRef) -> RatingSummary {
    let from_label = block
        .value()
        .attr("aria-label")
        .map(parse_rating_label)
        .unwrap_or_default();

    let value = direct_rating_value(block)
        .filter(|v| !v.is_empty())
        .unwrap_or(from_label.value);

    let count = first_text(block, ".rating-count")
        .map(|text| strip_ratings_suffix(&text))
        .filter(|c| !c.is_empty())
        .unwrap_or(from_label.count);

    RatingSummary { value, count }
}

/// A `ratingValue` item, read from its `content` attribute or its text
fn direct_rating_value(block: &ElementRef) -> Option<String> {
    let selector = Selector::parse("[itemprop=ratingValue]").ok()?;
    let element = block.select(&selector).next()?;

    let raw = match element.value().attr("content") {
        Some(content) => content.to_string(),
        None => element.text().collect(),
    };
    Some(clean_inline(&raw))
}

fn first_text(scope: &ElementRef, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    scope
        .select(&selector)
        .next()
        .map(|element| element.text().collect())
}

fn has_class(element: &ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
