//! Page-content CSV → `pages-content.json` conversion.
//!
//! Each sheet row is one [`ContentItem`] on one page. Rows are grouped by
//! `page_id`, then by `content_type`, both in first-seen order, and each
//! content-type list is sorted by `order_position` (stable, so rows sharing a
//! position keep sheet order).
//!
//! Cell coercion:
//!
//! | column           | rule                                                  |
//! |------------------|-------------------------------------------------------|
//! | `is_active`      | blank → `true`, otherwise case-insensitive `"true"`   |
//! | `order_position` | all ASCII digits → that integer, otherwise `0`        |
//! | anything else    | kept as a string; empty strings are dropped          |
//!
//! `page_id` itself is the grouping key and does not appear on the item.

use crate::csv::{self, Record};
use crate::types::{ContentItem, PageContentDocument};

/// Columns with a typed slot on [`ContentItem`]; everything else goes to `extra`.
const KNOWN_COLUMNS: &[&str] = &[
    "page_id",
    "section_id",
    "content_type",
    "title",
    "subtitle",
    "description",
    "image_url",
    "image_alt",
    "order_position",
    "is_active",
];

/// Convert page-content CSV text into the grouped document.
pub fn transform_pages(csv_text: &str) -> PageContentDocument {
    let mut doc = PageContentDocument::default();

    for record in csv::records(csv_text) {
        let page_id = value(&record, "page_id");
        let content_type = value(&record, "content_type");
        if page_id.is_empty() || content_type.is_empty() {
            tracing::debug!(page_id, content_type, "skipping page row without ids");
            continue;
        }

        let item = item_from_record(&record);
        doc.0
            .entry(page_id.to_string())
            .or_default()
            .entry(content_type.to_string())
            .or_default()
            .push(item);
    }

    for page in doc.0.values_mut() {
        for items in page.values_mut() {
            items.sort_by_key(|item| item.order_position.unwrap_or(0));
        }
    }

    doc
}

/// Convert page-content CSV text straight to the published JSON text.
pub fn transform_pages_to_json(csv_text: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&transform_pages(csv_text))
}

/// Build one content item from a record, dropping empty string fields.
pub fn item_from_record(record: &Record) -> ContentItem {
    let text = |name: &str| non_empty(value(record, name));

    let extra = record
        .iter()
        .filter(|(k, v)| !KNOWN_COLUMNS.contains(&k.as_str()) && !k.is_empty() && !v.is_empty())
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();

    ContentItem {
        section_id: text("section_id"),
        content_type: text("content_type"),
        title: text("title"),
        subtitle: text("subtitle"),
        description: text("description"),
        image_url: text("image_url"),
        image_alt: text("image_alt"),
        order_position: Some(parse_order_position(value(record, "order_position"))),
        is_active: Some(parse_is_active(value(record, "is_active"))),
        extra,
    }
}

fn value<'a>(record: &'a Record, name: &str) -> &'a str {
    record.get(name).map(String::as_str).unwrap_or("")
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Blank means active; otherwise only a case-insensitive `true` is.
pub fn parse_is_active(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("true")
}

/// Whole non-negative integers only; `"-1"`, `"1.5"` and `"first"` are `0`.
pub fn parse_order_position(value: &str) -> i64 {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().unwrap_or(0)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    const HEADER: &str =
        "page_id,section_id,content_type,title,subtitle,description,image_url,image_alt,order_position,is_active";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    // =========================================================================
    // Coercion
    // =========================================================================

    #[test]
    fn is_active_blank_is_true() {
        assert!(parse_is_active(""));
        assert!(parse_is_active("TRUE"));
        assert!(parse_is_active("True"));
        assert!(!parse_is_active("false"));
        assert!(!parse_is_active("yes"));
    }

    #[test]
    fn order_position_requires_digits() {
        assert_eq!(parse_order_position("3"), 3);
        assert_eq!(parse_order_position("12"), 12);
        assert_eq!(parse_order_position(""), 0);
        assert_eq!(parse_order_position("-1"), 0);
        assert_eq!(parse_order_position("1.5"), 0);
        assert_eq!(parse_order_position("first"), 0);
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    #[test]
    fn rows_group_by_page_then_type() {
        let doc = transform_pages(&csv_with(&[
            "homepage,hero,hero_section,Atelier,,,,,1,",
            "made_to_measure,hero,hero_section,Bespoke,,,,,1,",
            "homepage,f1,feature,Silk,,,,,1,",
        ]));
        let pages: Vec<&str> = doc.pages().map(|(k, _)| k.as_str()).collect();
        assert_eq!(pages, vec!["homepage", "made_to_measure"]);

        let home = doc.page("homepage").unwrap();
        let types: Vec<&str> = home.keys().map(String::as_str).collect();
        assert_eq!(types, vec!["hero_section", "feature"]);
    }

    #[test]
    fn items_sorted_by_order_position_stably() {
        let doc = transform_pages(&csv_with(&[
            "homepage,a,feature,Third,,,,,3,",
            "homepage,b,feature,First,,,,,1,",
            "homepage,c,feature,Zero A,,,,,,",
            "homepage,d,feature,Zero B,,,,,x,",
        ]));
        let titles: Vec<&str> = doc.page("homepage").unwrap()["feature"]
            .iter()
            .map(|i| i.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["Zero A", "Zero B", "First", "Third"]);
    }

    #[test]
    fn rows_without_page_or_type_are_skipped() {
        let doc = transform_pages(&csv_with(&[
            ",hero,hero_section,Orphan,,,,,1,",
            "homepage,hero,,Untyped,,,,,1,",
        ]));
        assert!(doc.is_empty());
    }

    // =========================================================================
    // Item shape
    // =========================================================================

    #[test]
    fn empty_fields_are_removed() {
        let doc = transform_pages(&csv_with(&["homepage,hero,hero_section,Atelier,,,,,1,"]));
        let item = &doc.page("homepage").unwrap()["hero_section"][0];
        let json = serde_json::to_value(item).unwrap();
        assert!(json.get("subtitle").is_none());
        assert!(json.get("image_url").is_none());
        assert_eq!(json["order_position"], 1);
        assert_eq!(json["is_active"], true);
        assert!(json.get("page_id").is_none());
    }

    #[test]
    fn inactive_flag_survives_conversion() {
        let doc = transform_pages(&csv_with(&["homepage,f,feature,Hidden,,,,,1,FALSE"]));
        let item = &doc.page("homepage").unwrap()["feature"][0];
        assert_eq!(item.is_active, Some(false));
    }

    #[test]
    fn unknown_columns_are_carried_as_strings() {
        let doc = transform_pages(
            "page_id,content_type,title,button_text,is_active\nhomepage,hero_section,Atelier,Discover,",
        );
        let item = &doc.page("homepage").unwrap()["hero_section"][0];
        assert_eq!(item.extra["button_text"], "Discover");
        assert_eq!(item.order_position, Some(0));
    }

    #[test]
    fn fixture_pages_convert() {
        let doc = transform_pages(&fixture("pages-content.csv"));
        assert!(doc.page("homepage").is_some());
        assert!(doc.page("made_to_measure").is_some());
        let json = transform_pages_to_json(&fixture("pages-content.csv")).unwrap();
        assert!(json.starts_with("{\n  \"homepage\""));
    }
}
