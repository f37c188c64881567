//! Shared document types published by the sync pipeline and read by the
//! client loader.
//!
//! Both documents are serialized as pretty-printed JSON and overwritten
//! wholesale on every publish. Map keys keep first-seen order, so the JSON
//! on disk lists categories and pages in the order they appear in the sheet.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The published product catalog: `{ "categories": { <key>: Category } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub categories: IndexMap<String, Category>,
}

/// A top-level grouping of products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
    pub products: Vec<Product>,
    /// Banner image from the category's `category_hero` page content. Never
    /// published; attached on the client after loading.
    #[serde(
        rename = "heroImage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hero_image: Option<String>,
    #[serde(
        rename = "heroImageAlt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hero_image_alt: Option<String>,
}

/// A catalog product derived from one CSV row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    #[serde(default)]
    pub image_2: String,
    #[serde(default)]
    pub image_3: String,
    #[serde(default)]
    pub video_url: String,
    /// Main image first, then `image_2` and `image_3` when non-blank.
    pub gallery: Vec<String>,
    pub prices: Prices,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric: Option<String>,
    #[serde(
        rename = "madeTo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub made_to: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prices {
    pub standard: i64,
    pub minimum: i64,
    pub maximum: i64,
}

/// Content items for one page, grouped by content type.
pub type PageContent = IndexMap<String, Vec<ContentItem>>;

/// The published page-content document: `{ <page_id>: { <content_type>: [ContentItem] } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageContentDocument(pub IndexMap<String, PageContent>);

impl PageContentDocument {
    pub fn page(&self, page_id: &str) -> Option<&PageContent> {
        self.0.get(page_id)
    }

    pub fn pages(&self) -> impl Iterator<Item = (&String, &PageContent)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One piece of page content.
///
/// Known columns get typed fields; anything else in the sheet is carried in
/// `extra` so new columns reach the site without a code change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentItem {
    /// Only an explicit `false` hides an item; a missing flag means active.
    pub fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}
