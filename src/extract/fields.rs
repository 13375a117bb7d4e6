//! Declarative field table for detail-page extraction
//!
//! Every optional field of an [`AppRecord`] is described by one [`FieldSpec`]:
//! which record slot it fills, how to locate the raw value, and how to clean
//! it. [`apply_field_table`] probes each entry in turn; a miss leaves the slot
//! at its empty default.

use crate::extract::clean::{clean_description, clean_inline, clean_text, strip_label};
use crate::extract::AppRecord;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements carrying the `"Label:"` prefix of a labeled value
const LABEL_SELECTOR: &str = ".label, .app-requirements";

/// Record slot filled by a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AppId,
    AppName,
    Description,
    Price,
    Category,
    PublishedDate,
    LastUpdatedDate,
    Version,
    Size,
    Seller,
    Copyright,
    AppRating,
    Compatibility,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AppId => "app_id",
            Self::AppName => "app_name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Category => "category",
            Self::PublishedDate => "published_date",
            Self::LastUpdatedDate => "last_updated_date",
            Self::Version => "version",
            Self::Size => "size",
            Self::Seller => "seller",
            Self::Copyright => "copyright",
            Self::AppRating => "app_rating",
            Self::Compatibility => "compatibility",
        }
    }

    fn slot<'a>(&self, record: &'a mut AppRecord) -> &'a mut String {
        match self {
            Self::AppId => &mut record.app_id,
            Self::AppName => &mut record.app_name,
            Self::Description => &mut record.description,
            Self::Price => &mut record.price,
            Self::Category => &mut record.category,
            Self::PublishedDate => &mut record.published_date,
            Self::LastUpdatedDate => &mut record.last_updated_date,
            Self::Version => &mut record.version,
            Self::Size => &mut record.size,
            Self::Seller => &mut record.seller,
            Self::Copyright => &mut record.copyright,
            Self::AppRating => &mut record.app_rating,
            Self::Compatibility => &mut record.compatibility,
        }
    }
}

/// How to find the raw value of a field
#[derive(Debug, Clone, Copy)]
pub enum Locator {
    /// Text of the first element matching the selector
    Text(&'static str),
    /// Attribute of the first element matching the selector
    Attr(&'static str, &'static str),
    /// Text of the first matching element, with `<br>` elements as newlines
    RichText(&'static str),
    /// First matching element whose label starts with the given text,
    /// with the label removed
    Labeled {
        item: &'static str,
        label: &'static str,
    },
}

/// One row of the extraction table
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub locator: Locator,
    pub post: fn(&str) -> String,
}

/// The two fields a detail page cannot be without
pub const IDENTITY_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        field: Field::AppId,
        locator: Locator::Attr("div.lockup.product[adam-id]", "adam-id"),
        post: clean_text,
    },
    FieldSpec {
        field: Field::AppName,
        locator: Locator::Text("div#title h1"),
        post: clean_inline,
    },
];

/// Probe-and-default fields
pub const OPTIONAL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        field: Field::Description,
        locator: Locator::RichText("div.product-review p[itemprop=description]"),
        post: clean_description,
    },
    FieldSpec {
        field: Field::Price,
        locator: Locator::Text("div.lockup .price"),
        post: clean_inline,
    },
    FieldSpec {
        field: Field::Category,
        locator: Locator::Text("div.lockup li.genre a"),
        post: clean_inline,
    },
    FieldSpec {
        field: Field::PublishedDate,
        locator: Locator::Attr("div.lockup [itemprop=datePublished]", "content"),
        post: clean_text,
    },
    FieldSpec {
        field: Field::LastUpdatedDate,
        locator: Locator::Labeled {
            item: "div.lockup li",
            label: "Updated",
        },
        post: clean_inline,
    },
    FieldSpec {
        field: Field::Version,
        locator: Locator::Labeled {
            item: "div.lockup li",
            label: "Version",
        },
        post: clean_inline,
    },
    FieldSpec {
        field: Field::Size,
        locator: Locator::Labeled {
            item: "div.lockup li",
            label: "Size",
        },
        post: clean_inline,
    },
    FieldSpec {
        field: Field::Seller,
        locator: Locator::Text("div.lockup [itemprop=author] [itemprop=name]"),
        post: clean_inline,
    },
    FieldSpec {
        field: Field::Copyright,
        locator: Locator::Text("div.lockup li.copyright"),
        post: clean_inline,
    },
    FieldSpec {
        field: Field::AppRating,
        locator: Locator::Text("div.lockup div.app-rating a"),
        post: clean_inline,
    },
    FieldSpec {
        field: Field::Compatibility,
        locator: Locator::Labeled {
            item: "div.lockup p",
            label: "Compatibility",
        },
        post: clean_inline,
    },
];

/// Languages are one labeled list item, split on commas
pub const LANGUAGES: Locator = Locator::Labeled {
    item: "div.lockup li.language",
    label: "Language",
};

/// Runs one table entry, returning the cleaned value if the marker is present
pub fn probe_field(document: &Html, spec: &FieldSpec) -> Option<String> {
    probe(document, &spec.locator).map(|raw| (spec.post)(&raw))
}

/// Fills every slot the table finds; misses keep their empty default
pub fn apply_field_table(document: &Html, specs: &[FieldSpec], record: &mut AppRecord) {
    for spec in specs {
        match probe_field(document, spec) {
            Some(value) => *spec.field.slot(record) = value,
            None => tracing::trace!("Field {} not present", spec.field.name()),
        }
    }
}

/// Finds the raw (uncleaned) value for a locator
pub fn probe(document: &Html, locator: &Locator) -> Option<String> {
    match *locator {
        Locator::Text(selector) => first_match(document, selector).map(|el| el.text().collect()),
        Locator::Attr(selector, attr) => {
            first_match(document, selector).and_then(|el| el.value().attr(attr).map(String::from))
        }
        Locator::RichText(selector) => first_match(document, selector).map(|el| rich_text(&el)),
        Locator::Labeled { item, label } => labeled_value(document, item, label),
    }
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Invalid selector '{}': {:?}", selector, e);
            return None;
        }
    };
    document.select(&selector).next()
}

fn labeled_value(document: &Html, item: &str, label: &str) -> Option<String> {
    let item_selector = Selector::parse(item).ok()?;
    let label_selector = Selector::parse(LABEL_SELECTOR).ok()?;

    document.select(&item_selector).find_map(|element| {
        let label_text: String = element.select(&label_selector).next()?.text().collect();
        let label_text = clean_inline(&label_text);
        if !label_text.starts_with(label) {
            return None;
        }

        let full = clean_inline(&element.text().collect::<String>());
        Some(strip_label(&full, &label_text))
    })
}

/// Text of an element where `<br>` elements become newlines
pub(crate) fn rich_text(element: &ElementRef) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}
