//! # Atelier Sync
//!
//! Keeps a fashion atelier's static website in step with the spreadsheet its
//! staff edit. Two sheets drive the site: **Products** (the catalog) and
//! **Pages** (copy and imagery for each page). A sync exports a sheet as CSV,
//! converts it to the JSON the site reads, and commits both files to the
//! site's GitHub repository.
//!
//! # Architecture: Export, Convert, Publish
//!
//! ```text
//! 1. Export    sheet     →  CSV text           (spreadsheet → rows → csv codec)
//! 2. Convert   CSV text  →  JSON document      (catalog or page content)
//! 3. Publish   CSV+JSON  →  GitHub contents    (create or update by sha)
//! ```
//!
//! On the site side the flow runs in reverse: the loader fetches the
//! published JSON once per page view and the populator turns it into
//! element writes.
//!
//! ```text
//! pages-content.json ──load──▶ PageContentView ──plan──▶ [Assignment] ──apply──▶ Dom
//! ```
//!
//! Each conversion is a pure function from CSV text to a document, so the
//! pipeline is tested without a spreadsheet or a network. The two seams that
//! do touch the outside world, [`sheet::SheetSource`] and
//! [`publish::ContentTransport`], are traits with in-memory test doubles.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`csv`] | CSV codec matching the published files byte for byte |
//! | [`sheet`] | Spreadsheet adapter: workbook files or a directory of CSV sheets |
//! | [`catalog`] | Products CSV → category-grouped catalog JSON |
//! | [`pages`] | Pages CSV → page/content-type grouped JSON |
//! | [`publish`] | GitHub contents API publisher (create vs update by sha) |
//! | [`sync`] | Orchestrates export → publish → convert → publish, plus setup |
//! | [`notify`] | Success, partial and failure reports |
//! | [`loader`] | Fetches and memoizes published JSON; page-content accessors |
//! | [`populate`] | Page content → element assignments, and applying them |
//! | [`naming`] | URL path ↔ page id, data file locations, listing category |
//! | [`config`] | Layered `atelier.toml` loading and validation |
//! | [`types`] | The two published documents |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## CSV Is Published Verbatim
//!
//! The CSV file on the site is exactly what the export produced: minimal
//! quoting, `\n` row separators, no trailing newline. The decoder reads it
//! back with the same quote-toggle rule the site has always used, so
//! round-trips of existing data are stable even where that rule is lossy
//! (doubled quotes inside a quoted cell).
//!
//! ## Partial Updates Are Not Failures
//!
//! CSV goes out first. If JSON conversion or its publish fails afterwards,
//! the sync still succeeds and is reported as a partial update: the CSV is
//! the source of truth and the next sync regenerates the JSON.
//!
//! ## Whole-Document Overwrites
//!
//! Both JSON documents are rewritten in full on every sync. There are no
//! diffs or merges; the remote store's sha check is the only concurrency
//! guard, and a concurrent edit surfaces as a rejected write.

pub mod catalog;
pub mod config;
pub mod csv;
pub mod loader;
pub mod naming;
pub mod notify;
pub mod output;
pub mod pages;
pub mod populate;
pub mod publish;
pub mod sheet;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
