//! Sheet-to-site synchronization.
//!
//! One implementation drives both published datasets. A [`SyncTarget`] names
//! the sheet, the two remote files it produces, and which converter turns the
//! CSV into JSON.
//!
//! ## Sync
//!
//! ```text
//! sheet ──rows──▶ CSV text ──publish──▶ <csv_path>
//!                    │
//!                    └──convert──▶ JSON ──publish──▶ <json_path>
//! ```
//!
//! 1. Missing sheet or empty sheet: fatal.
//! 2. CSV publish failure: fatal.
//! 3. JSON conversion or publish failure: the run still succeeds, reported
//!    as a partial update. The CSV is live and the JSON is stale until the
//!    next sync.
//!
//! Every outcome, fatal or not, is also sent through the [`Notifier`].
//!
//! ## Setup
//!
//! [`setup`] goes the other way: it downloads the published CSV into the
//! local sheet so editing starts from what the site shows. If there is no
//! published CSV (or it cannot be fetched), the sheet is seeded with sample
//! rows instead.

use thiserror::Error;

use crate::config::SyncConfig;
use crate::csv::{self, Row};
use crate::notify::{Level, Notifier};
use crate::publish::{ContentTransport, PublishError, PublishOutcome, Publisher};
use crate::sheet::{SheetError, SheetSource};
use crate::{catalog, pages};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),
    #[error("sheet '{0}' has no rows")]
    EmptySheet(String),
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Which converter a target's CSV goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Products,
    Pages,
}

/// A sheet and the pair of remote files generated from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    /// Human name used in logs and notifications (`"Products"`, `"Pages"`).
    pub label: String,
    pub sheet_name: String,
    pub csv_path: String,
    pub json_path: String,
    pub kind: TargetKind,
}

impl SyncTarget {
    pub fn products(config: &SyncConfig) -> Self {
        Self {
            label: "Products".to_string(),
            sheet_name: config.products.sheet_name.clone(),
            csv_path: config.products.csv_path.clone(),
            json_path: config.products.json_path.clone(),
            kind: TargetKind::Products,
        }
    }

    pub fn pages(config: &SyncConfig) -> Self {
        Self {
            label: "Pages".to_string(),
            sheet_name: config.pages.sheet_name.clone(),
            csv_path: config.pages.csv_path.clone(),
            json_path: config.pages.json_path.clone(),
            kind: TargetKind::Pages,
        }
    }

    /// Convert this target's CSV into its published JSON.
    pub fn convert(&self, csv_text: &str) -> Result<String, serde_json::Error> {
        match self.kind {
            TargetKind::Products => catalog::transform_to_json(csv_text),
            TargetKind::Pages => pages::transform_pages_to_json(csv_text),
        }
    }

    /// Starter rows written by [`setup`] when nothing is published yet.
    pub fn sample_rows(&self) -> Vec<Row> {
        let table: &[&[&str]] = match self.kind {
            TargetKind::Products => SAMPLE_PRODUCTS,
            TargetKind::Pages => SAMPLE_PAGES,
        };
        table
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }
}

const SAMPLE_PRODUCTS: &[&[&str]] = &[
    &[
        "id", "name", "category", "description", "image", "image_2", "image_3", "video_url",
        "prices_standard", "prices_minimum", "prices_maximum", "colors", "sizes", "fabric",
        "madeTo",
    ],
    &[
        "dress-001", "Elegant Evening Dress", "prive_ceremonial",
        "A stunning evening dress for special occasions", "assets/images/dress-001-1.jpg",
        "assets/images/dress-001-2.jpg", "", "", "1200", "1000", "1500", "Ivory, Black",
        "38, 40, 42", "Silk", "measure",
    ],
    &[
        "jacket-002", "Tailored Blazer", "collections",
        "A sophisticated blazer with Italian tailoring", "assets/images/jacket-002-1.jpg", "",
        "", "", "800", "700", "950", "Navy", "40, 42, 44", "Wool blend", "order",
    ],
];

const SAMPLE_PAGES: &[&[&str]] = &[
    &[
        "page_id", "section_id", "content_type", "title", "subtitle", "description",
        "image_url", "image_alt", "order_position", "is_active",
    ],
    &[
        "homepage", "hero", "hero_section", "Atelier", "Handcrafted Excellence",
        "Where tradition meets innovation in bespoke Italian fashion.",
        "assets/images/hero-home.jpg", "Atelier workroom", "1", "TRUE",
    ],
    &[
        "hand_embroidery", "hero", "hero_section", "Hand Embroidery", "Artistry in Every Thread",
        "Each stitch tells a story.", "assets/images/embroidery-hero.jpg", "", "1", "TRUE",
    ],
];

/// What happened to the JSON half of a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonOutcome {
    Published(PublishOutcome),
    Failed(String),
}

/// Result of a sync that got at least the CSV published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub label: String,
    /// Sheet rows exported, header included.
    pub rows: usize,
    pub csv_path: String,
    pub json_path: String,
    pub csv: PublishOutcome,
    pub json: JsonOutcome,
}

impl SyncReport {
    /// CSV published but JSON not.
    pub fn is_partial(&self) -> bool {
        matches!(self.json, JsonOutcome::Failed(_))
    }
}

/// Export a sheet, publish its CSV and JSON, and report the outcome.
pub fn sync<T: ContentTransport>(
    target: &SyncTarget,
    source: &dyn SheetSource,
    publisher: &Publisher<T>,
    notifier: &dyn Notifier,
) -> Result<SyncReport, SyncError> {
    let label = &target.label;
    tracing::info!(label, sheet = %target.sheet_name, "starting sync");

    match run_sync(target, source, publisher) {
        Ok(report) => {
            match &report.json {
                JsonOutcome::Published(_) => notifier.notify(
                    Level::Success,
                    &format!("{label} Updated"),
                    &format!(
                        "{label} data (CSV + JSON) has been successfully updated on the website."
                    ),
                ),
                JsonOutcome::Failed(reason) => notifier.notify(
                    Level::Warning,
                    "Partial Update",
                    &format!("{label} CSV updated, but JSON conversion failed: {reason}"),
                ),
            }
            Ok(report)
        }
        Err(e) => {
            tracing::error!(label, error = %e, "sync failed");
            notifier.notify(
                Level::Failure,
                &format!("{label} Sync Failed"),
                &format!("Error: {e}"),
            );
            Err(e)
        }
    }
}

fn run_sync<T: ContentTransport>(
    target: &SyncTarget,
    source: &dyn SheetSource,
    publisher: &Publisher<T>,
) -> Result<SyncReport, SyncError> {
    let rows = source.rows(&target.sheet_name)?;
    if rows.is_empty() {
        return Err(SyncError::EmptySheet(target.sheet_name.clone()));
    }

    let csv_text = csv::encode(&rows);
    let csv_outcome = publisher.publish(&target.csv_path, &csv_text)?;

    let json = match target.convert(&csv_text) {
        Ok(json_text) => match publisher.publish(&target.json_path, &json_text) {
            Ok(outcome) => JsonOutcome::Published(outcome),
            Err(e) => {
                tracing::warn!(path = %target.json_path, error = %e, "JSON publish failed");
                JsonOutcome::Failed(e.to_string())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "JSON conversion failed");
            JsonOutcome::Failed(e.to_string())
        }
    };

    Ok(SyncReport {
        label: target.label.clone(),
        rows: rows.len(),
        csv_path: target.csv_path.clone(),
        json_path: target.json_path.clone(),
        csv: csv_outcome,
        json,
    })
}

/// How [`setup`] filled the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Imported { rows: usize },
    Seeded { rows: usize },
}

/// Replace the local sheet with the published CSV, or sample rows if there
/// is none.
pub fn setup<T: ContentTransport>(
    target: &SyncTarget,
    sheet: &dyn SheetSource,
    publisher: &Publisher<T>,
) -> Result<SetupOutcome, SyncError> {
    let published = match publisher.fetch_file(&target.csv_path) {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(path = %target.csv_path, error = %e, "could not fetch published CSV");
            None
        }
    };

    let outcome = match published {
        Some(text) => {
            let rows = import_rows(&text);
            sheet.write_rows(&target.sheet_name, &rows)?;
            SetupOutcome::Imported { rows: rows.len() }
        }
        None => {
            tracing::info!(path = %target.csv_path, "nothing published, seeding sample data");
            let rows = target.sample_rows();
            sheet.write_rows(&target.sheet_name, &rows)?;
            SetupOutcome::Seeded { rows: rows.len() }
        }
    };
    tracing::info!(sheet = %target.sheet_name, ?outcome, "sheet set up");
    Ok(outcome)
}

/// Decode published CSV into sheet rows: blank rows dropped, every row
/// padded with empty cells to the widest row.
pub fn import_rows(text: &str) -> Vec<Row> {
    let mut rows: Vec<Row> = csv::decode(text)
        .into_iter()
        .filter(|row| !csv::is_blank_row(row))
        .collect();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, String::new());
    }
    rows
}
