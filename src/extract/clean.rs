//! Text cleaning applied to every extracted value

const NBSP: char = '\u{a0}';

/// Trims and replaces non-breaking spaces
pub fn clean_text(raw: &str) -> String {
    raw.replace(NBSP, " ").trim().to_string()
}

/// Like `clean_text`, but also collapses every whitespace run to one space
pub fn clean_inline(raw: &str) -> String {
    collapse_whitespace(&raw.replace(NBSP, " "))
}

/// Cleans multi-line prose
///
/// Literal `<br/>` sequences become newlines, every line is trimmed and the
/// block loses leading and trailing blank lines.
pub fn clean_description(raw: &str) -> String {
    let text = raw
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n")
        .replace(NBSP, " ");

    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    lines.join("\n").trim().to_string()
}

/// Cleans a review byline such as `"  by   SomeUser  "`
pub fn clean_user(raw: &str) -> String {
    let collapsed = clean_inline(raw);
    match collapsed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("by ") => collapsed[3..].trim().to_string(),
        _ => collapsed,
    }
}

/// Removes a leading label like `"Size:"` from an already collapsed value
pub fn strip_label(value: &str, label: &str) -> String {
    let label = clean_inline(label);
    value
        .strip_prefix(label.as_str())
        .unwrap_or(value)
        .trim()
        .to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
