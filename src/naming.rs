//! Centralized mapping between site URL paths, page ids and data files.
//!
//! Page ids use underscores (`made_to_measure`); URL paths use dashes
//! (`/pages/made-to-measure.html`). Pages live either at the site root
//! (the homepage) or one level down under `/pages/`, which decides how the
//! published JSON is reached.
//!
//! ## Page Ids
//!
//! | path contains          | page id                |
//! |------------------------|------------------------|
//! | `made-to-measure`      | `made_to_measure`      |
//! | `personalized-for-you` | `personalized_for_you` |
//! | `hand-embroidery`      | `hand_embroidery`      |
//! | `the-designer`         | `the_designer`         |
//! | `our-atelier`          | `our_atelier`          |
//! | `craftsmanship-values` | `craftsmanship_values` |
//! | anything else          | `homepage`             |
//!
//! ## Product Listing
//!
//! The products page picks its category from the `category` query
//! parameter (`/pages/products.html?category=kids`). A missing or empty value
//! selects `prive_ceremonial`.

/// Published catalog file name.
pub const PRODUCTS_JSON: &str = "products.json";

/// Published page-content file name.
pub const PAGES_JSON: &str = "pages-content.json";

/// Fallback page id.
pub const HOMEPAGE: &str = "homepage";

/// Category shown when the listing URL names none.
pub const DEFAULT_CATEGORY: &str = "prive_ceremonial";

/// Path fragments checked in order; the first match wins.
const PAGE_SLUGS: &[(&str, &str)] = &[
    ("made-to-measure", "made_to_measure"),
    ("personalized-for-you", "personalized_for_you"),
    ("hand-embroidery", "hand_embroidery"),
    ("the-designer", "the_designer"),
    ("our-atelier", "our_atelier"),
    ("craftsmanship-values", "craftsmanship_values"),
];

/// Page id for a URL path.
pub fn page_id_for_path(path: &str) -> &'static str {
    PAGE_SLUGS
        .iter()
        .find(|(slug, _)| path.contains(slug))
        .map(|(_, id)| *id)
        .unwrap_or(HOMEPAGE)
}

/// Relative URL of a data file as seen from the page at `page_path`.
///
/// - `/pages/made-to-measure.html` + `products.json` → `../assets/data/products.json`
/// - `/index.html` + `products.json` → `assets/data/products.json`
pub fn json_path_for(page_path: &str, filename: &str) -> String {
    if page_path.contains("/pages/") {
        format!("../assets/data/{filename}")
    } else {
        format!("assets/data/{filename}")
    }
}

/// Category key from a listing URL or a bare query string.
///
/// Accepts `/pages/products.html?category=kids`, `?category=kids` or
/// `category=kids`. The first non-empty `category` value wins.
pub fn category_from_query(url_or_query: &str) -> String {
    let query = match url_or_query.split_once('?') {
        Some((_, query)) => query,
        None if url_or_query.contains('=') => url_or_query,
        None => "",
    };
    let query = query.split('#').next().unwrap_or_default();

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == "category" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}
