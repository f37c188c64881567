//! Client-side loading of the published JSON documents.
//!
//! A [`ContentLoader`] fetches one document through a [`Fetcher`], appending
//! a `v=<millis>` query parameter so caches in front of the site never serve
//! a stale copy. The first successful load is memoized in the loader itself;
//! later calls return it without touching the network. A failed load (bad
//! status, transport error, unparsable JSON) is logged, returns `None`, and
//! leaves nothing cached, so the next call tries again.
//!
//! Accessors never fail: before a load, or after a failed one, they return
//! `None` or an empty list, and population becomes a no-op.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::catalog::ProductMatch;
use crate::types::{CatalogDocument, Category, ContentItem, PageContent, PageContentDocument};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Retrieves the raw text behind a (possibly relative) URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches over HTTP, resolving relative URLs against the site root.
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::new(),
            base: Url::parse(base_url)?,
        })
    }

    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        Ok(self.base.join(url)?)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let full = self.resolve(url)?;
        tracing::debug!(url = %full, "fetching content");
        let response = self.client.get(full).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }
}

/// Reads files below a local site root. The query string is ignored and
/// `..` segments cannot climb out of the root.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = url.split(['?', '#']).next().unwrap_or("");
        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            if let Component::Normal(part) = component {
                resolved.push(part);
            }
        }
        resolved
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Ok(std::fs::read_to_string(self.resolve(url))?)
    }
}

/// Append the cache-busting `v=<millis>` parameter to a URL.
pub fn cache_busted(url: &str, now: DateTime<Utc>) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}v={}", now.timestamp_millis())
}

/// Loads and memoizes one JSON document.
pub struct ContentLoader<T, F> {
    fetcher: F,
    url: String,
    cache: Option<T>,
}

impl<T: DeserializeOwned, F: Fetcher> ContentLoader<T, F> {
    pub fn new(fetcher: F, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            cache: None,
        }
    }

    /// The memoized document, fetching it on first use.
    pub fn load(&mut self) -> Option<&T> {
        if self.cache.is_none() {
            match self.fetch_fresh() {
                Ok(doc) => {
                    tracing::info!(url = %self.url, "content loaded");
                    self.cache = Some(doc);
                }
                Err(e) => {
                    tracing::error!(url = %self.url, error = %e, "failed to load content");
                    return None;
                }
            }
        }
        self.cache.as_ref()
    }

    fn fetch_fresh(&self) -> Result<T, FetchError> {
        let text = self.fetcher.fetch(&cache_busted(&self.url, Utc::now()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The memoized document without fetching.
    pub fn get(&self) -> Option<&T> {
        self.cache.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

impl<F: Fetcher> ContentLoader<CatalogDocument, F> {
    pub fn category(&self, key: &str) -> Option<&Category> {
        self.get()?.category(key)
    }

    pub fn find_product(&self, id: &str) -> Option<ProductMatch<'_>> {
        self.get()?.find_product(id)
    }

    /// Attach category banner images to the loaded catalog. A no-op before
    /// the catalog loads or when `pages` is empty.
    pub fn attach_category_heroes(&mut self, pages: &PageContentView<'_>) -> usize {
        self.cache
            .as_mut()
            .map_or(0, |doc| doc.attach_category_heroes(pages))
    }
}

impl<F: Fetcher> ContentLoader<PageContentDocument, F> {
    pub fn view(&self) -> PageContentView<'_> {
        PageContentView::new(self.get())
    }
}

// ============================================================================
// Page-content accessors
// ============================================================================

/// Read-only accessors over a possibly-absent page-content document.
///
/// Only [`page_content`](Self::page_content) and
/// [`content_by_type`](Self::content_by_type) return inactive items; every
/// other accessor skips items whose `is_active` is `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageContentView<'a> {
    doc: Option<&'a PageContentDocument>,
}

impl<'a> PageContentView<'a> {
    pub fn new(doc: Option<&'a PageContentDocument>) -> Self {
        Self { doc }
    }

    pub fn is_loaded(&self) -> bool {
        self.doc.is_some()
    }

    pub fn page_content(&self, page_id: &str) -> Option<&'a PageContent> {
        self.doc?.page(page_id)
    }

    /// All items of one type on one page, inactive ones included.
    pub fn content_by_type(&self, page_id: &str, content_type: &str) -> &'a [ContentItem] {
        self.page_content(page_id)
            .and_then(|page| page.get(content_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn active(&self, page_id: &str, content_type: &str) -> Vec<&'a ContentItem> {
        self.content_by_type(page_id, content_type)
            .iter()
            .filter(|item| item.is_active())
            .collect()
    }

    fn first_active(&self, page_id: &str, content_type: &str) -> Option<&'a ContentItem> {
        self.content_by_type(page_id, content_type)
            .iter()
            .find(|item| item.is_active())
    }

    pub fn hero_content(&self, page_id: &str) -> Option<&'a ContentItem> {
        self.first_active(page_id, "hero_section")
    }

    pub fn main_content(&self, page_id: &str) -> Option<&'a ContentItem> {
        self.first_active(page_id, "main_content")
    }

    pub fn heritage_content(&self, page_id: &str) -> Option<&'a ContentItem> {
        self.first_active(page_id, "heritage_content")
    }

    pub fn about_content(&self, page_id: &str) -> Option<&'a ContentItem> {
        self.first_active(page_id, "about_content")
    }

    pub fn process_content(&self, page_id: &str) -> Option<&'a ContentItem> {
        self.first_active(page_id, "process_content")
    }

    pub fn features(&self, page_id: &str) -> Vec<&'a ContentItem> {
        self.active(page_id, "feature")
    }

    pub fn journey_steps(&self, page_id: &str) -> Vec<&'a ContentItem> {
        self.active(page_id, "journey_step")
    }

    pub fn two_column_content(&self, page_id: &str) -> Vec<&'a ContentItem> {
        self.active(page_id, "two_column")
    }

    pub fn section_headers(&self, page_id: &str) -> Vec<&'a ContentItem> {
        self.active(page_id, "section_header")
    }

    pub fn process_steps(&self, page_id: &str) -> Vec<&'a ContentItem> {
        self.active(page_id, "process_step")
    }

    pub fn booking_options(&self, page_id: &str) -> Vec<&'a ContentItem> {
        self.active(page_id, "booking_option")
    }

    pub fn latest_pieces(&self, page_id: &str) -> Vec<&'a ContentItem> {
        self.active(page_id, "latest_piece")
    }

    pub fn techniques(&self, page_id: &str) -> Vec<&'a ContentItem> {
        self.active(page_id, "technique")
    }

    /// The active `section_content` item with this `section_id`.
    pub fn section_content(&self, page_id: &str, section_id: &str) -> Option<&'a ContentItem> {
        self.content_by_type(page_id, "section_content")
            .iter()
            .find(|item| item.is_active() && item.section_id.as_deref() == Some(section_id))
    }
}
