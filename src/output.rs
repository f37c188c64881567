//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what the content *is* (category names, product names,
//! page ids) and shows keys, ids and remote paths as indented context lines.
//! The result reads as an inventory of what the site will show.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! Categories
//! 001 Couture e Cerimonia (2 products)
//!     Key: prive_ceremonial
//!     001 Aurora Gown
//!         Id: pc1
//!         Price: 2.800 € (2.400 € to 3.500 €)
//!
//! Converted 3 categories, 5 products
//! ```
//!
//! ## Convert Pages
//!
//! ```text
//! Pages
//! 001 homepage (9 items)
//!     hero_section: 1
//!     journey_step: 3 (1 inactive)
//! ```
//!
//! ## Sync
//!
//! ```text
//! Products (6 rows)
//!     assets/data/products.csv: updated
//!     assets/data/products.json: created
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use indexmap::IndexMap;

use crate::catalog::format_price;
use crate::populate::{Assignment, Target};
use crate::publish::PublishOutcome;
use crate::sync::{JsonOutcome, SetupOutcome, SyncReport, SyncTarget};
use crate::types::{CatalogDocument, PageContentDocument};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `001 Title (n unit)` with a naive plural.
fn entity_header(index: usize, title: &str, count: usize, unit: &str) -> String {
    format!(
        "{} {} ({} {}{})",
        format_index(index),
        title,
        count,
        unit,
        if count == 1 { "" } else { "s" }
    )
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

fn outcome_label(outcome: PublishOutcome) -> &'static str {
    match outcome {
        PublishOutcome::Created => "created",
        PublishOutcome::Updated => "updated",
    }
}

fn target_label(target: Target) -> &'static str {
    match target {
        Target::Text => "text",
        Target::Src => "src",
        Target::Alt => "alt",
        Target::BackgroundImage => "background-image",
    }
}

// ============================================================================
// Convert
// ============================================================================

/// Format the catalog produced by `convert`.
pub fn format_catalog_summary(doc: &CatalogDocument) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];

    for (i, (key, category)) in doc.categories.iter().enumerate() {
        lines.push(entity_header(
            i + 1,
            &category.name,
            category.products.len(),
            "product",
        ));
        lines.push(format!("{}Key: {}", indent(1), key));
        for (j, product) in category.products.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(j + 1), product.name));
            lines.push(format!("{}Id: {}", indent(2), product.id));
            let p = &product.prices;
            lines.push(format!(
                "{}Price: {} ({} to {})",
                indent(2),
                format_price(p.standard),
                format_price(p.minimum),
                format_price(p.maximum)
            ));
            if product.gallery.len() > 1 {
                lines.push(format!("{}Gallery: {} images", indent(2), product.gallery.len()));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Converted {} categories, {} products",
        doc.categories.len(),
        doc.product_count()
    ));
    lines
}

pub fn print_catalog_summary(doc: &CatalogDocument) {
    for line in format_catalog_summary(doc) {
        println!("{}", line);
    }
}

/// Format the page-content document produced by `convert-pages`.
///
/// Each page lists its content types in sheet order with an item count;
/// inactive items are counted but flagged.
pub fn format_pages_summary(doc: &PageContentDocument) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    let mut total = 0;

    for (i, (page_id, items)) in doc.pages().enumerate() {
        let count: usize = items.values().map(Vec::len).sum();
        total += count;
        lines.push(entity_header(i + 1, page_id, count, "item"));
        for (content_type, group) in items {
            let inactive = group.iter().filter(|item| !item.is_active()).count();
            if inactive > 0 {
                lines.push(format!(
                    "{}{}: {} ({} inactive)",
                    indent(1),
                    content_type,
                    group.len(),
                    inactive
                ));
            } else {
                lines.push(format!("{}{}: {}", indent(1), content_type, group.len()));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("Converted {} pages, {} items", doc.len(), total));
    lines
}

pub fn print_pages_summary(doc: &PageContentDocument) {
    for line in format_pages_summary(doc) {
        println!("{}", line);
    }
}

// ============================================================================
// Sync / Setup
// ============================================================================

/// Format a finished sync: one line per remote file.
pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let mut lines = vec![format!("{} ({} rows)", report.label, report.rows)];
    lines.push(format!(
        "{}{}: {}",
        indent(1),
        report.csv_path,
        outcome_label(report.csv)
    ));
    match &report.json {
        JsonOutcome::Published(outcome) => lines.push(format!(
            "{}{}: {}",
            indent(1),
            report.json_path,
            outcome_label(*outcome)
        )),
        JsonOutcome::Failed(reason) => {
            lines.push(format!(
                "{}{}: failed ({})",
                indent(1),
                report.json_path,
                truncate_desc(reason, 80)
            ));
            lines.push("Partial update: CSV is live, JSON is stale".to_string());
        }
    }
    lines
}

pub fn print_sync_report(report: &SyncReport) {
    for line in format_sync_report(report) {
        println!("{}", line);
    }
}

pub fn format_setup(target: &SyncTarget, outcome: SetupOutcome) -> Vec<String> {
    let line = match outcome {
        SetupOutcome::Imported { rows } => format!(
            "{}: imported {} rows from {} into sheet '{}'",
            target.label, rows, target.csv_path, target.sheet_name
        ),
        SetupOutcome::Seeded { rows } => format!(
            "{}: nothing published, seeded {} sample rows into sheet '{}'",
            target.label, rows, target.sheet_name
        ),
    };
    vec![line]
}

pub fn print_setup(target: &SyncTarget, outcome: SetupOutcome) {
    for line in format_setup(target, outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Preview
// ============================================================================

/// Format a population plan, grouped by selector in first-use order.
///
/// ```text
/// made_to_measure (5 assignments)
///     #hero-title, .hero-content h1, ...
///         text = "Made to Measure"
/// ```
pub fn format_plan(page_id: &str, assignments: &[Assignment]) -> Vec<String> {
    let mut grouped: IndexMap<&str, Vec<&Assignment>> = IndexMap::new();
    for a in assignments {
        grouped.entry(a.selector.as_str()).or_default().push(a);
    }

    let mut lines = vec![format!(
        "{} ({} assignment{})",
        page_id,
        assignments.len(),
        if assignments.len() == 1 { "" } else { "s" }
    )];
    for (selector, writes) in grouped {
        lines.push(format!("{}{}", indent(1), truncate_desc(selector, 72)));
        for a in writes {
            lines.push(format!(
                "{}{} = \"{}\"",
                indent(2),
                target_label(a.target),
                truncate_desc(&a.value, 60)
            ));
        }
    }
    lines
}

pub fn print_plan(page_id: &str, assignments: &[Assignment]) {
    for line in format_plan(page_id, assignments) {
        println!("{}", line);
    }
}
