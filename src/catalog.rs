//! Product CSV → catalog JSON conversion.
//!
//! Takes the products sheet as exported by [`crate::csv::encode`] and groups
//! its rows into the [`CatalogDocument`] the site reads from `products.json`.
//!
//! ## Row Rules
//!
//! - The header row names the fields; every later non-blank line is one row.
//! - Rows with fewer fields than the header are skipped.
//! - Rows missing `id`, `name`, or `image` are skipped.
//! - Price columns are parsed leniently: a leading integer is taken, anything
//!   else becomes `0`. A bad price never rejects the row.
//!
//! ## Ordering
//!
//! Categories appear in the order they are first seen in the sheet; products
//! within a category keep row order.
//!
//! ## Category Heroes
//!
//! Banner images for the known categories live in the page content, under a
//! page id equal to the category key and the `category_hero` content type.
//! [`CatalogDocument::attach_category_heroes`] copies the first such item's
//! image onto the category, but only when that item is active.

use crate::csv::{self, Record};
use crate::loader::PageContentView;
use crate::types::{CatalogDocument, Category, Prices, Product};

/// Display name and description for a known category key.
struct CategoryInfo {
    key: &'static str,
    name: &'static str,
    description: &'static str,
}

const CATEGORY_INFO: &[CategoryInfo] = &[
    CategoryInfo {
        key: "prive_ceremonial",
        name: "Couture e Cerimonia",
        description: "Exquisite pieces for special occasions and refined experiences",
    },
    CategoryInfo {
        key: "collections",
        name: "Collections",
        description: "Curated seasonal collections showcasing contemporary Italian elegance",
    },
    CategoryInfo {
        key: "kids",
        name: "Kids",
        description: "Ricami e texture che raccontano un'eleganza autentica",
    },
];

/// Build an empty category bucket, falling back to the raw key as its name.
pub fn category_for_key(key: &str) -> Category {
    match CATEGORY_INFO.iter().find(|info| info.key == key) {
        Some(info) => Category {
            name: info.name.to_string(),
            description: info.description.to_string(),
            ..Default::default()
        },
        None => Category {
            name: key.to_string(),
            ..Default::default()
        },
    }
}

/// A product located in the catalog, with the category it was found under.
#[derive(Debug, Clone, Copy)]
pub struct ProductMatch<'a> {
    pub product: &'a Product,
    pub category_key: &'a str,
    pub category: &'a Category,
}

impl CatalogDocument {
    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.get(key)
    }

    /// First product with this id, searching categories in document order.
    pub fn find_product(&self, id: &str) -> Option<ProductMatch<'_>> {
        self.categories.iter().find_map(|(key, category)| {
            category
                .products
                .iter()
                .find(|p| p.id == id)
                .map(|product| ProductMatch {
                    product,
                    category_key: key.as_str(),
                    category,
                })
        })
    }

    /// Copy `category_hero` images from page content onto the known
    /// categories. Returns how many categories received one.
    pub fn attach_category_heroes(&mut self, pages: &PageContentView<'_>) -> usize {
        let mut attached = 0;
        for info in CATEGORY_INFO {
            let Some(category) = self.categories.get_mut(info.key) else {
                continue;
            };
            let Some(hero) = pages
                .content_by_type(info.key, "category_hero")
                .first()
                .filter(|item| item.is_active())
            else {
                continue;
            };
            category.hero_image = hero.image_url.clone();
            category.hero_image_alt = hero.image_alt.clone();
            attached += 1;
        }
        tracing::debug!(attached, "category heroes attached");
        attached
    }

    pub fn product_count(&self) -> usize {
        self.categories.values().map(|c| c.products.len()).sum()
    }
}

/// Convert product CSV text into a catalog document.
pub fn transform(csv_text: &str) -> CatalogDocument {
    let mut doc = CatalogDocument::default();

    for record in csv::records(csv_text) {
        let Some(product) = product_from_record(&record) else {
            tracing::debug!(id = field(&record, "id"), "skipping incomplete product row");
            continue;
        };
        let key = product.category.clone().unwrap_or_default();
        doc.categories
            .entry(key.clone())
            .or_insert_with(|| category_for_key(&key))
            .products
            .push(product);
    }

    doc
}

/// Convert product CSV text straight to the published JSON text.
pub fn transform_to_json(csv_text: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&transform(csv_text))
}

/// Build a product from one record, or `None` if `id`, `name`, or `image` is empty.
pub fn product_from_record(record: &Record) -> Option<Product> {
    let id = field(record, "id");
    let name = field(record, "name");
    let image = field(record, "image");
    if id.is_empty() || name.is_empty() || image.is_empty() {
        return None;
    }

    let image_2 = field(record, "image_2");
    let image_3 = field(record, "image_3");

    Some(Product {
        id: id.to_string(),
        name: name.to_string(),
        category: record.get("category").cloned(),
        description: record.get("description").cloned(),
        image: image.to_string(),
        image_2: image_2.to_string(),
        image_3: image_3.to_string(),
        video_url: field(record, "video_url").to_string(),
        gallery: build_gallery(image, image_2, image_3),
        prices: Prices {
            standard: parse_price(field(record, "prices_standard")),
            minimum: parse_price(field(record, "prices_minimum")),
            maximum: parse_price(field(record, "prices_maximum")),
        },
        colors: split_list(field(record, "colors")),
        sizes: split_list(field(record, "sizes")),
        fabric: record.get("fabric").cloned(),
        made_to: record.get("madeTo").cloned(),
    })
}

fn field<'a>(record: &'a Record, name: &str) -> &'a str {
    record.get(name).map(String::as_str).unwrap_or("")
}

/// Main image first, then any non-blank secondary images in column order.
pub fn build_gallery(image: &str, image_2: &str, image_3: &str) -> Vec<String> {
    let mut gallery = vec![image.to_string()];
    for extra in [image_2, image_3] {
        if !extra.trim().is_empty() {
            gallery.push(extra.to_string());
        }
    }
    gallery
}

/// Parse a leading integer the way a spreadsheet user expects: `"2800"`,
/// `" 2800 EUR"` and `"2800.50"` all give `2800`; `"N/A"` and `""` give `0`.
pub fn parse_price(value: &str) -> i64 {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}

/// Display a whole-euro price the way the Italian site shows it:
/// `.` groups thousands and a non-breaking space precedes the sign
/// (`2800` → `"2.800\u{a0}€"`).
pub fn format_price(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped}\u{a0}€")
}

/// Split a comma list into trimmed entries; an empty cell is an empty list.
pub fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(|s| s.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    const HEADER: &str = "id,name,category,description,image,image_2,image_3,video_url,prices_standard,prices_minimum,prices_maximum,colors,sizes,fabric,madeTo";

    // =========================================================================
    // Row filtering
    // =========================================================================

    #[test]
    fn row_with_empty_id_is_dropped() {
        let doc = transform("id,name,category,image\n,Dress,collections,img.jpg");
        assert!(doc.categories.is_empty());
    }

    #[test]
    fn row_missing_image_is_dropped() {
        let doc = transform("id,name,category,image\np1,Dress,collections,");
        assert_eq!(doc.product_count(), 0);
    }

    #[test]
    fn short_row_is_dropped() {
        let doc = transform("id,name,category,image\np1,Dress,collections");
        assert_eq!(doc.product_count(), 0);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let doc = transform("id,name,category,image\n\n  \np1,Dress,kids,a.jpg\n");
        assert_eq!(doc.product_count(), 1);
    }

    #[test]
    fn header_only_gives_empty_catalog() {
        let doc = transform(HEADER);
        assert!(doc.categories.is_empty());
    }

    // =========================================================================
    // Grouping and order
    // =========================================================================

    #[test]
    fn categories_follow_first_seen_order() {
        let doc = transform(
            "id,name,category,image\n\
             b1,One,B,1.jpg\n\
             a1,Two,A,2.jpg\n\
             b2,Three,B,3.jpg",
        );
        assert_eq!(category_keys(&doc), vec!["B", "A"]);
        let b = find_category(&doc, "B");
        let ids: Vec<&str> = b.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
    }

    #[test]
    fn known_category_gets_display_name() {
        let doc = transform("id,name,category,image\npc1,Gown,prive_ceremonial,a.jpg");
        let cat = find_category(&doc, "prive_ceremonial");
        assert_eq!(cat.name, "Couture e Cerimonia");
        assert!(cat.description.starts_with("Exquisite pieces"));
    }

    #[test]
    fn unknown_category_falls_back_to_key() {
        let doc = transform("id,name,category,image\nx1,Cape,outerwear,a.jpg");
        let cat = find_category(&doc, "outerwear");
        assert_eq!(cat.name, "outerwear");
        assert_eq!(cat.description, "");
    }

    #[test]
    fn missing_category_column_groups_under_empty_key() {
        let doc = transform("id,name,image\nx1,Cape,a.jpg");
        let product = find_product(&doc, "x1");
        assert_eq!(product.category, None);
        assert_eq!(category_keys(&doc), vec![""]);
    }

    // =========================================================================
    // Field mapping
    // =========================================================================

    #[test]
    fn non_numeric_price_defaults_to_zero() {
        let doc = transform(
            "id,name,category,image,prices_standard\npc1,Gown,collections,a.jpg,N/A",
        );
        assert_eq!(find_product(&doc, "pc1").prices.standard, 0);
    }

    #[test]
    fn missing_price_columns_default_to_zero() {
        let doc = transform("id,name,category,image\npc1,Gown,collections,a.jpg");
        assert_eq!(find_product(&doc, "pc1").prices, Prices::default());
    }

    #[test]
    fn gallery_skips_blank_middle_image() {
        let doc = transform(
            "id,name,category,image,image_2,image_3\npc1,Gown,collections,a.jpg,,c.jpg",
        );
        let product = find_product(&doc, "pc1");
        assert_eq!(product.gallery, vec!["a.jpg", "c.jpg"]);
        assert_eq!(product.image_2, "");
    }

    #[test]
    fn full_row_maps_every_field() {
        let csv = format!(
            "{HEADER}\npc1,Aurora Gown,prive_ceremonial,Silk gown,a.jpg,b.jpg,c.jpg,https://v.example/1,2800,2400,3500,\"Ivory, Champagne\",\"38, 40\",Silk,measure"
        );
        let doc = transform(&csv);
        let p = find_product(&doc, "pc1");
        assert_eq!(p.name, "Aurora Gown");
        assert_eq!(p.description.as_deref(), Some("Silk gown"));
        assert_eq!(p.gallery, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(p.video_url, "https://v.example/1");
        assert_eq!(
            p.prices,
            Prices {
                standard: 2800,
                minimum: 2400,
                maximum: 3500
            }
        );
        assert_eq!(p.colors, vec!["Ivory", "Champagne"]);
        assert_eq!(p.sizes, vec!["38", "40"]);
        assert_eq!(p.fabric.as_deref(), Some("Silk"));
        assert_eq!(p.made_to.as_deref(), Some("measure"));
    }

    #[test]
    fn end_to_end_scenario_drops_row_without_id() {
        let doc = transform(
            "id,name,category,image,prices_standard\n\
             pc1,Gown,prive_ceremonial,a.jpg,2800\n\
             ,Bad,collections,b.jpg,100",
        );
        assert_eq!(category_keys(&doc), vec!["prive_ceremonial"]);
        let products = &find_category(&doc, "prive_ceremonial").products;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "pc1");
        assert_eq!(products[0].name, "Gown");
        assert_eq!(products[0].prices.standard, 2800);
        assert_eq!(products[0].prices.minimum, 0);
    }

    #[test]
    fn fixture_catalog_has_expected_shape() {
        let doc = transform(&fixture("products.csv"));
        assert_eq!(
            category_keys(&doc),
            vec!["prive_ceremonial", "collections", "kids"]
        );
        // One fixture row has no image and must be dropped.
        assert_eq!(doc.product_count(), 5);
    }

    // =========================================================================
    // JSON output
    // =========================================================================

    #[test]
    fn json_is_pretty_printed_with_two_spaces() {
        let json = transform_to_json("id,name,category,image\npc1,Gown,kids,a.jpg").unwrap();
        assert!(json.starts_with("{\n  \"categories\": {\n    \"kids\""));
    }

    #[test]
    fn json_product_key_order_matches_site_expectations() {
        let json = transform_to_json("id,name,category,image\npc1,Gown,kids,a.jpg").unwrap();
        let id = json.find("\"id\"").unwrap();
        let gallery = json.find("\"gallery\"").unwrap();
        let prices = json.find("\"prices\"").unwrap();
        assert!(id < gallery && gallery < prices);
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn parse_price_variants() {
        assert_eq!(parse_price("2800"), 2800);
        assert_eq!(parse_price(" 2800 EUR"), 2800);
        assert_eq!(parse_price("2800.50"), 2800);
        assert_eq!(parse_price("-15"), -15);
        assert_eq!(parse_price("N/A"), 0);
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("-"), 0);
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    #[test]
    fn find_product_reports_its_category() {
        let doc = transform("id,name,category,image\nk1,Smock,kids,a.jpg\nc1,Coat,collections,b.jpg");
        let found = doc.find_product("c1").unwrap();
        assert_eq!(found.product.name, "Coat");
        assert_eq!(found.category_key, "collections");
        assert_eq!(found.category.name, "Collections");
        assert!(doc.find_product("missing").is_none());
        assert!(doc.category("kids").is_some());
    }

    // =========================================================================
    // Category heroes
    // =========================================================================

    const HEROES: &str = "page_id,section_id,content_type,image_url,image_alt,order_position,is_active
prive_ceremonial,hero,category_hero,assets/images/pc-hero.jpg,Couture hero,1,TRUE
collections,hero,category_hero,assets/images/co-old.jpg,,1,FALSE
collections,hero2,category_hero,assets/images/co-new.jpg,,2,TRUE
kids,hero,category_hero,assets/images/kids-1.jpg,First,1,TRUE
kids,hero2,category_hero,assets/images/kids-2.jpg,Second,2,TRUE";

    #[test]
    fn category_heroes_use_first_item_when_active() {
        let mut doc = transform(&fixture("products.csv"));
        let pages = crate::pages::transform_pages(HEROES);

        let attached = doc.attach_category_heroes(&PageContentView::new(Some(&pages)));
        assert_eq!(attached, 2);

        let couture = find_category(&doc, "prive_ceremonial");
        assert_eq!(couture.hero_image.as_deref(), Some("assets/images/pc-hero.jpg"));
        assert_eq!(couture.hero_image_alt.as_deref(), Some("Couture hero"));

        let kids = find_category(&doc, "kids");
        assert_eq!(kids.hero_image.as_deref(), Some("assets/images/kids-1.jpg"));

        // The first collections hero is inactive; later ones are not consulted.
        assert!(find_category(&doc, "collections").hero_image.is_none());
    }

    #[test]
    fn category_heroes_serialize_in_camel_case() {
        let mut doc = transform("id,name,category,image\nk1,Smock,kids,a.jpg");
        let pages = crate::pages::transform_pages(HEROES);
        doc.attach_category_heroes(&PageContentView::new(Some(&pages)));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["categories"]["kids"]["heroImage"], "assets/images/kids-1.jpg");
        assert_eq!(json["categories"]["kids"]["heroImageAlt"], "First");
    }

    #[test]
    fn published_catalog_has_no_hero_fields() {
        let json = transform_to_json("id,name,category,image\nk1,Smock,kids,a.jpg").unwrap();
        assert!(!json.contains("heroImage"));
    }

    #[test]
    fn prices_group_thousands_with_dots() {
        assert_eq!(format_price(2800), "2.800\u{a0}€");
        assert_eq!(format_price(1_234_567), "1.234.567\u{a0}€");
        assert_eq!(format_price(100_000), "100.000\u{a0}€");
    }

    #[test]
    fn small_zero_and_negative_prices() {
        assert_eq!(format_price(650), "650\u{a0}€");
        assert_eq!(format_price(0), "0\u{a0}€");
        assert_eq!(format_price(-1500), "-1.500\u{a0}€");
        assert_eq!(format_price(i64::MIN), "-9.223.372.036.854.775.808\u{a0}€");
    }

    #[test]
    fn split_list_trims_entries() {
        assert_eq!(split_list("Red , Blue,Green "), vec!["Red", "Blue", "Green"]);
        assert!(split_list("").is_empty());
    }
}
