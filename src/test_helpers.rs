//! Shared test utilities for the atelier-sync test suite.
//!
//! Provides fixture loading, lookup helpers that panic with the available
//! keys on a miss, and bulk extractors over the published documents.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let doc = catalog::transform(&fixture("products.csv"));
//! let gown = find_product(&doc, "pc1");
//! assert_eq!(gown.prices.standard, 2800);
//!
//! assert_eq!(category_keys(&doc), vec!["prive_ceremonial", "collections", "kids"]);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::types::{CatalogDocument, Category, ContentItem, PageContentDocument, Product};

// =========================================================================
// Fixture setup
// =========================================================================

/// Path to a file under `fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// Read a fixture file to a string. Panics if missing.
pub fn fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("fixture '{}' unreadable: {e}", path.display()))
}

/// Copy the CSV fixtures into a temp directory laid out as a sheet directory
/// (`Products.csv`, `Pages.csv`).
///
/// Tests get an isolated copy they can overwrite without affecting other
/// tests or the source fixtures.
pub fn setup_sheet_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::copy(fixture_path("products.csv"), tmp.path().join("Products.csv")).unwrap();
    std::fs::copy(fixture_path("pages-content.csv"), tmp.path().join("Pages.csv")).unwrap();
    tmp
}

// =========================================================================
// Catalog lookups: panic with the available keys on a miss
// =========================================================================

/// Find a category by key. Panics if not found.
pub fn find_category<'a>(doc: &'a CatalogDocument, key: &str) -> &'a Category {
    doc.categories.get(key).unwrap_or_else(|| {
        let keys = category_keys(doc);
        panic!("category '{key}' not found. Available: {keys:?}")
    })
}

/// Find a product by id in any category. Panics if not found.
pub fn find_product<'a>(doc: &'a CatalogDocument, id: &str) -> &'a Product {
    doc.find_product(id).map(|m| m.product).unwrap_or_else(|| {
        let ids = product_ids(doc);
        panic!("product '{id}' not found. Available: {ids:?}")
    })
}

// =========================================================================
// Page-content lookups
// =========================================================================

/// Items of one content type on one page. Panics if either is missing.
pub fn find_items<'a>(
    doc: &'a PageContentDocument,
    page_id: &str,
    content_type: &str,
) -> &'a [ContentItem] {
    let page = doc.page(page_id).unwrap_or_else(|| {
        let pages: Vec<&str> = doc.pages().map(|(k, _)| k.as_str()).collect();
        panic!("page '{page_id}' not found. Available: {pages:?}")
    });
    page.get(content_type).unwrap_or_else(|| {
        let types: Vec<&str> = page.keys().map(String::as_str).collect();
        panic!("content type '{content_type}' not found on '{page_id}'. Available: {types:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All category keys in document order.
pub fn category_keys(doc: &CatalogDocument) -> Vec<&str> {
    doc.categories.keys().map(String::as_str).collect()
}

/// All product ids across categories, in document order.
pub fn product_ids(doc: &CatalogDocument) -> Vec<&str> {
    doc.categories
        .values()
        .flat_map(|c| c.products.iter().map(|p| p.id.as_str()))
        .collect()
}

/// Item titles in list order.
pub fn item_titles(items: &[ContentItem]) -> Vec<Option<&str>> {
    items.iter().map(|i| i.title.as_deref()).collect()
}
