//! Search results and app detail rendering

use crate::extract::ParsedApp;
use crate::storage::{AppSummary, QuarantinedLink};
use std::fmt::Write;

/// Renders `--search` hits, one app per line
pub fn format_search_results(term: &str, hits: &[AppSummary]) -> String {
    let mut out = String::new();

    if hits.is_empty() {
        let _ = writeln!(out, "No apps matching \"{}\"", term);
        return out;
    }

    let _ = writeln!(out, "{} apps matching \"{}\":", hits.len(), term);
    for hit in hits {
        let _ = write!(out, "  {:>12}  {}", hit.app_id, hit.app_name);
        if !hit.category.is_empty() || !hit.price.is_empty() {
            let _ = write!(out, " [{}", hit.category);
            if !hit.price.is_empty() {
                let _ = write!(out, ", {}", hit.price);
            }
            out.push(']');
        }
        out.push('\n');
    }

    out
}

/// Renders the `--show` view of one app
pub fn format_app_detail(app: &ParsedApp) -> String {
    let record = &app.record;
    let mut out = String::new();

    let _ = writeln!(out, "=== {} ({}) ===\n", record.app_name, record.app_id);

    let fields = [
        ("Category", &record.category),
        ("Price", &record.price),
        ("Seller", &record.seller),
        ("Version", &record.version),
        ("Size", &record.size),
        ("Published", &record.published_date),
        ("Updated", &record.last_updated_date),
        ("Rated", &record.app_rating),
        ("Compatibility", &record.compatibility),
        ("Copyright", &record.copyright),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            let _ = writeln!(out, "{:>14}: {}", label, value);
        }
    }

    let _ = writeln!(
        out,
        "{:>14}: {}",
        "Current rating",
        rating_line(&record.current_version_rating_value, &record.current_version_rating_count)
    );
    let _ = writeln!(
        out,
        "{:>14}: {}",
        "All versions",
        rating_line(&record.all_versions_rating_value, &record.all_versions_rating_count)
    );

    if !app.languages.is_empty() {
        let names: Vec<&str> = app.languages.iter().map(|l| l.language_name.as_str()).collect();
        let _ = writeln!(out, "{:>14}: {}", "Languages", names.join(", "));
    }

    if !record.description.is_empty() {
        let _ = writeln!(out, "\nDescription:");
        for line in record.description.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }

    if !app.purchases.is_empty() {
        let _ = writeln!(out, "\nTop In-App Purchases:");
        for purchase in &app.purchases {
            let _ = writeln!(out, "  {:>2}. {} ({})", purchase.order, purchase.title, purchase.price);
        }
    }

    if !app.reviews.is_empty() {
        let _ = writeln!(out, "\nCustomer Reviews ({}):", app.reviews.len());
        for review in &app.reviews {
            let _ = writeln!(out, "  [{}] {} by {}", review.rating, review.title, review.user);
            for line in review.content.lines() {
                let _ = writeln!(out, "      {}", line);
            }
        }
    }

    out
}

/// Renders the quarantined links listed by `--stats`
pub fn format_quarantined(links: &[QuarantinedLink]) -> String {
    let mut out = String::new();
    if links.is_empty() {
        return out;
    }

    let _ = writeln!(out, "\nQuarantined links ({}):", links.len());
    for link in links {
        let _ = writeln!(
            out,
            "  {} ({} attempts): {}",
            link.url,
            link.attempts,
            link.last_error.as_deref().unwrap_or("unknown error")
        );
    }
    out
}

fn rating_line(value: &str, count: &str) -> String {
    match (value.is_empty(), count.is_empty()) {
        (true, _) => "not rated".to_string(),
        (false, true) => value.to_string(),
        (false, false) => format!("{} ({} ratings)", value, count),
    }
}
