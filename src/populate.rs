//! Page population: page content → element assignments.
//!
//! Population is split in two. [`plan`] is pure: it reads the page-content
//! document through a [`PageContentView`] and returns the list of
//! [`Assignment`]s that the page's markup should receive. [`apply`] writes
//! those assignments into anything implementing [`Dom`].
//!
//! ## Selectors
//!
//! A selector is a comma-separated list of alternatives, as in CSS. A [`Dom`]
//! writes to the first element (in document order) matching any
//! alternative, and silently skips assignments with no matching element.
//!
//! ## Page Rules
//!
//! Every page gets hero, main content, features, process steps and booking
//! options. On top of that:
//!
//! | page                                                       | extra sections          |
//! |------------------------------------------------------------|-------------------------|
//! | `personalized_for_you`, `craftsmanship_values`, `hand_embroidery` | `.pfy-*` second/third   |
//! | `made_to_measure`                                          | `.mtm-*` second/third   |
//! | `homepage`                                                 | two-column, section headers, latest pieces, journey |
//!
//! `hand_embroidery` shows its process as one block of text: the first
//! process step's description goes into `.single-process-text p`.
//!
//! Fields that are missing or empty produce no assignment, so re-running a
//! plan against the same document is idempotent.

use indexmap::IndexMap;

use crate::loader::PageContentView;
use crate::types::ContentItem;

/// Which property of an element an assignment writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Text,
    Src,
    Alt,
    BackgroundImage,
}

/// One write: put `value` into `target` of the element matching `selector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub selector: String,
    pub target: Target,
    pub value: String,
}

/// An element store that assignments can be applied to.
pub trait Dom {
    /// Write one property. Returns `false` when no element matches.
    fn set(&mut self, selector: &str, target: Target, value: &str) -> bool;
}

/// Apply assignments in order; returns how many found an element.
pub fn apply(assignments: &[Assignment], dom: &mut dyn Dom) -> usize {
    let mut applied = 0;
    for a in assignments {
        if dom.set(&a.selector, a.target, &a.value) {
            applied += 1;
        } else {
            tracing::trace!(selector = %a.selector, "no element for assignment");
        }
    }
    applied
}

// ============================================================================
// Selectors
// ============================================================================

const HERO_TITLE: &str = "#hero-title, .hero-content h1, .hero-logo h2, .pfy-hero-logo, .mtm-hero-title";
const HERO_SUBTITLE: &str =
    "#hero-subtitle, .hero-subtitle, .hero-tagline, .pfy-hero-subtitle, .mtm-hero-subtitle";
const HERO_DESCRIPTION: &str =
    "#hero-description, .hero-description, .hero-text, .pfy-hero-description, .mtm-hero-description";
const HERO_BACKGROUND: &str = ".hero-image, .pfy-hero-image, .mtm-hero-image";
const HERO_IMG: &str = "#hero-image, .hero-image img";

const MAIN_TITLE: &str = ".pfy-main-title, .mtm-main-title, .pfy-personalised-text h2, .mtm-service-content h3, .text-content h2";
const MAIN_DESCRIPTION: &str = ".pfy-main-description, .mtm-main-description, .pfy-personalised-text > p, .mtm-service-content > p, .text-content > p";
const MAIN_IMAGE: &str = ".pfy-image, .mtm-image, .content-image img";

const SINGLE_PROCESS_TEXT: &str = ".single-process-text p";

/// Homepage section headers: `section_id` → section container.
const SECTION_CONTAINERS: &[(&str, &str)] = &[
    ("couture_section", ".prive-section"),
    ("craftsmanship_section", ".craftsmanship-section"),
    ("journey_section", ".journey-section"),
    ("latest_pieces_section", ".latest-pieces"),
];

/// Every `parent child` combination, joined as one selector list.
fn descend(parents: &[String], children: &[&str]) -> String {
    parents
        .iter()
        .flat_map(|p| children.iter().map(move |c| format!("{p} {c}")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn nth(class: &str, n: usize) -> String {
    format!("{class}:nth-child({n})")
}

// ============================================================================
// Plan
// ============================================================================

/// Collects assignments, dropping empty values.
#[derive(Default)]
struct Plan {
    out: Vec<Assignment>,
}

impl Plan {
    fn set(&mut self, selector: impl Into<String>, target: Target, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.out.push(Assignment {
                selector: selector.into(),
                target,
                value: value.to_string(),
            });
        }
    }

    fn text(&mut self, selector: impl Into<String>, value: Option<&str>) {
        self.set(selector, Target::Text, value);
    }

    /// `src` and, when there is an image, `alt`.
    fn image(&mut self, selector: &str, item: &ContentItem) {
        if item.image_url.as_deref().is_some_and(|u| !u.is_empty()) {
            self.set(selector, Target::Src, item.image_url.as_deref());
            self.set(selector, Target::Alt, item.image_alt.as_deref());
        }
    }
}

/// Resolve every binding for `page_id` into assignments.
pub fn plan(page_id: &str, view: &PageContentView<'_>) -> Vec<Assignment> {
    let mut plan = Plan::default();

    hero(&mut plan, page_id, view);
    main_content(&mut plan, page_id, view);
    features(&mut plan, page_id, view);
    process_steps(&mut plan, page_id, view);
    booking_options(&mut plan, page_id, view);

    match page_id {
        "personalized_for_you" | "craftsmanship_values" | "hand_embroidery" => {
            extra_sections(&mut plan, page_id, view, "pfy");
        }
        "made_to_measure" => extra_sections(&mut plan, page_id, view, "mtm"),
        "homepage" => {
            homepage_sections(&mut plan, page_id, view);
            journey_steps(&mut plan, page_id, view);
        }
        _ => {}
    }

    tracing::debug!(page_id, assignments = plan.out.len(), "population planned");
    plan.out
}

fn hero(plan: &mut Plan, page_id: &str, view: &PageContentView<'_>) {
    let Some(hero) = view.hero_content(page_id) else {
        return;
    };
    plan.text(HERO_TITLE, hero.title.as_deref());
    plan.text(HERO_SUBTITLE, hero.subtitle.as_deref());
    plan.text(HERO_DESCRIPTION, hero.description.as_deref());
    if let Some(url) = hero.image_url.as_deref().filter(|u| !u.is_empty()) {
        let css = format!("url('{url}')");
        plan.set(HERO_BACKGROUND, Target::BackgroundImage, Some(css.as_str()));
    }
    plan.image(HERO_IMG, hero);
}

fn main_content(plan: &mut Plan, page_id: &str, view: &PageContentView<'_>) {
    let Some(main) = view.main_content(page_id) else {
        return;
    };
    plan.text(MAIN_TITLE, main.title.as_deref());
    plan.text(MAIN_DESCRIPTION, main.description.as_deref());
    plan.image(MAIN_IMAGE, main);
}

fn features(plan: &mut Plan, page_id: &str, view: &PageContentView<'_>) {
    for (i, feature) in view.features(page_id).into_iter().enumerate() {
        let parents = [nth(".pfy-feature", i + 1), nth(".mtm-feature", i + 1)];
        plan.text(descend(&parents, &["h3", "h4"]), feature.title.as_deref());
        plan.text(descend(&parents, &["p"]), feature.description.as_deref());
    }
}

fn process_steps(plan: &mut Plan, page_id: &str, view: &PageContentView<'_>) {
    let steps = view.process_steps(page_id);
    if page_id == "hand_embroidery" {
        if let Some(first) = steps.first() {
            plan.text(SINGLE_PROCESS_TEXT, first.description.as_deref());
        }
        return;
    }
    for (i, step) in steps.into_iter().enumerate() {
        // The MTM list starts with its section title, so steps are offset by one.
        let parents = [nth(".mtm-process-step", i + 2), nth(".pfy-process-step", i + 1)];
        plan.text(descend(&parents, &["h3", "h4"]), step.title.as_deref());
        plan.text(descend(&parents, &["p"]), step.description.as_deref());
    }
}

fn booking_options(plan: &mut Plan, page_id: &str, view: &PageContentView<'_>) {
    for (i, option) in view.booking_options(page_id).into_iter().enumerate() {
        let parents = [nth(".mtm-booking-card", i + 1), nth(".pfy-booking-option", i + 1)];
        plan.text(descend(&parents, &["h3"]), option.title.as_deref());
        plan.text(descend(&parents, &["p"]), option.description.as_deref());
    }
}

/// Second and third `section_content` blocks under a page-family prefix.
fn extra_sections(plan: &mut Plan, page_id: &str, view: &PageContentView<'_>, prefix: &str) {
    for (section_id, slot) in [("second_section", "second"), ("third_section", "third")] {
        let Some(section) = view.section_content(page_id, section_id) else {
            continue;
        };
        plan.text(format!(".{prefix}-{slot}-title"), section.title.as_deref());
        plan.text(
            format!(".{prefix}-{slot}-description"),
            section.description.as_deref(),
        );
        plan.image(&format!(".{prefix}-{slot}-image img"), section);
    }
}

fn homepage_sections(plan: &mut Plan, page_id: &str, view: &PageContentView<'_>) {
    for (i, column) in view.two_column_content(page_id).into_iter().enumerate() {
        plan.text(
            format!(".two-column .column:nth-child({}) .column-title", i + 1),
            column.title.as_deref(),
        );
    }

    for header in view.section_headers(page_id) {
        let container = SECTION_CONTAINERS
            .iter()
            .find(|(id, _)| header.section_id.as_deref() == Some(*id))
            .map(|(_, container)| *container);
        let Some(container) = container else {
            continue;
        };
        plan.text(format!("{container} .section-title"), header.title.as_deref());
        plan.text(format!("{container} p"), header.description.as_deref());
    }

    for (i, piece) in view.latest_pieces(page_id).into_iter().enumerate() {
        let item = nth(".pieces-grid .piece-item", i + 1);
        plan.text(format!("{item} .piece-info h4"), piece.title.as_deref());
        plan.text(format!("{item} .piece-info p"), piece.description.as_deref());
        plan.image(&format!("{item} img"), piece);
    }
}

fn journey_steps(plan: &mut Plan, page_id: &str, view: &PageContentView<'_>) {
    for (i, step) in view.journey_steps(page_id).into_iter().enumerate() {
        let el = nth(".journey-step", i + 1);
        plan.text(format!("{el} .journey-step-content h3"), step.title.as_deref());
        plan.text(format!("{el} .journey-step-content p"), step.description.as_deref());
        plan.image(&format!("{el} .journey-step-image img"), step);
    }
}

// ============================================================================
// In-memory element store
// ============================================================================

/// Properties of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: Option<String>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub background_image: Option<String>,
}

/// A flat element store keyed by exact selector, in document order.
///
/// Stands in for a browser document when previewing or testing a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementMap {
    elements: IndexMap<String, Element>,
}

impl ElementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element; registration order is document order.
    pub fn insert(&mut self, selector: &str) -> &mut Self {
        self.elements.entry(selector.to_string()).or_default();
        self
    }

    pub fn with(selectors: &[&str]) -> Self {
        let mut map = Self::new();
        for s in selectors {
            map.insert(s);
        }
        map
    }

    pub fn get(&self, selector: &str) -> Option<&Element> {
        self.elements.get(selector)
    }

    pub fn text(&self, selector: &str) -> Option<&str> {
        self.get(selector)?.text.as_deref()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Element)> {
        self.elements.iter()
    }
}

impl Dom for ElementMap {
    fn set(&mut self, selector: &str, target: Target, value: &str) -> bool {
        let alternatives: Vec<&str> = selector.split(',').map(str::trim).collect();
        let Some(element) = self
            .elements
            .iter_mut()
            .find(|(key, _)| alternatives.contains(&key.as_str()))
            .map(|(_, element)| element)
        else {
            return false;
        };

        let slot = match target {
            Target::Text => &mut element.text,
            Target::Src => &mut element.src,
            Target::Alt => &mut element.alt,
            Target::BackgroundImage => &mut element.background_image,
        };
        *slot = Some(value.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::transform_pages;
    use crate::test_helpers::*;
    use crate::types::PageContentDocument;

    fn fixture_doc() -> PageContentDocument {
        transform_pages(&fixture("pages-content.csv"))
    }

    fn assignments_for(page_id: &str, doc: &PageContentDocument) -> Vec<Assignment> {
        plan(page_id, &PageContentView::new(Some(doc)))
    }

    fn find<'a>(plan: &'a [Assignment], selector_part: &str, target: Target) -> &'a Assignment {
        plan.iter()
            .find(|a| a.target == target && a.selector.contains(selector_part))
            .unwrap_or_else(|| {
                let selectors: Vec<&str> = plan.iter().map(|a| a.selector.as_str()).collect();
                panic!("no {target:?} assignment for '{selector_part}'. Planned: {selectors:?}")
            })
    }

    // =========================================================================
    // plan
    // =========================================================================

    #[test]
    fn unloaded_view_plans_nothing() {
        assert!(plan("homepage", &PageContentView::new(None)).is_empty());
    }

    #[test]
    fn hero_binds_title_and_background() {
        let doc = fixture_doc();
        let plan = assignments_for("made_to_measure", &doc);
        assert_eq!(find(&plan, "#hero-title", Target::Text).value, "Made to Measure");
        assert_eq!(
            find(&plan, ".mtm-hero-image", Target::BackgroundImage).value,
            "url('assets/images/mtm-hero.jpg')"
        );
        // No alt text in the sheet, so no alt assignment.
        assert!(!plan.iter().any(|a| a.target == Target::Alt && a.selector == HERO_IMG));
    }

    #[test]
    fn missing_fields_produce_no_assignments() {
        let doc = fixture_doc();
        let plan = assignments_for("hand_embroidery", &doc);
        assert!(!plan.iter().any(|a| a.selector == HERO_SUBTITLE));
        assert!(!plan.iter().any(|a| a.target == Target::BackgroundImage));
    }

    #[test]
    fn mtm_process_steps_are_offset_by_one() {
        let doc = fixture_doc();
        let plan = assignments_for("made_to_measure", &doc);
        let first = find(&plan, ".mtm-process-step:nth-child(2) h3", Target::Text);
        assert_eq!(first.value, "Measure");
        assert!(first.selector.contains(".pfy-process-step:nth-child(1) h3"));
    }

    #[test]
    fn hand_embroidery_uses_single_process_text() {
        let doc = fixture_doc();
        let plan = assignments_for("hand_embroidery", &doc);
        let single = find(&plan, SINGLE_PROCESS_TEXT, Target::Text);
        assert_eq!(single.value, "Each motif takes weeks of handwork");
        assert!(!plan.iter().any(|a| a.selector.contains("process-step")));
    }

    #[test]
    fn mtm_page_gets_mtm_sections_only() {
        let doc = fixture_doc();
        let plan = assignments_for("made_to_measure", &doc);
        assert_eq!(find(&plan, ".mtm-second-title", Target::Text).value, "Fabrics");
        assert_eq!(
            find(&plan, ".mtm-second-image img", Target::Src).value,
            "assets/images/mtm-fabrics.jpg"
        );
        assert!(!plan.iter().any(|a| a.selector.starts_with(".pfy-second")));
    }

    #[test]
    fn pfy_sections_apply_to_craftsmanship_values() {
        let doc = transform_pages(
            "page_id,section_id,content_type,title\n\
             craftsmanship_values,third_section,section_content,Values",
        );
        let plan = assignments_for("craftsmanship_values", &doc);
        assert_eq!(find(&plan, ".pfy-third-title", Target::Text).value, "Values");
    }

    #[test]
    fn homepage_sections_only_on_homepage() {
        let doc = transform_pages(
            "page_id,section_id,content_type,title\n\
             made_to_measure,col,two_column,Left\n\
             homepage,col,two_column,Left",
        );
        assert!(assignments_for("made_to_measure", &doc).is_empty());
        let plan = assignments_for("homepage", &doc);
        assert_eq!(
            find(&plan, ".two-column .column:nth-child(1) .column-title", Target::Text).value,
            "Left"
        );
    }

    #[test]
    fn section_headers_map_to_containers() {
        let doc = fixture_doc();
        let plan = assignments_for("homepage", &doc);
        assert_eq!(
            find(&plan, ".prive-section .section-title", Target::Text).value,
            "Couture e Cerimonia"
        );
        assert_eq!(
            find(&plan, ".journey-section p", Target::Text).value,
            "From first sketch to final fitting"
        );
    }

    #[test]
    fn journey_steps_skip_inactive_and_follow_order() {
        let doc = fixture_doc();
        let plan = assignments_for("homepage", &doc);
        assert_eq!(
            find(&plan, ".journey-step:nth-child(1) .journey-step-content h3", Target::Text).value,
            "Consultation"
        );
        assert!(!plan.iter().any(|a| a.selector.contains(".journey-step:nth-child(3)")));
    }

    #[test]
    fn unknown_section_header_is_ignored() {
        let doc = transform_pages(
            "page_id,section_id,content_type,title\nhomepage,mystery,section_header,Hidden",
        );
        assert!(assignments_for("homepage", &doc).is_empty());
    }

    // =========================================================================
    // ElementMap / apply
    // =========================================================================

    #[test]
    fn first_registered_alternative_wins() {
        let mut dom = ElementMap::with(&[".text-content h2", ".mtm-main-title"]);
        assert!(dom.set(MAIN_TITLE, Target::Text, "Hello"));
        assert_eq!(dom.text(".text-content h2"), Some("Hello"));
        assert_eq!(dom.text(".mtm-main-title"), None);
    }

    #[test]
    fn missing_element_is_a_no_op() {
        let mut dom = ElementMap::with(&["#other"]);
        assert!(!dom.set("#hero-title", Target::Text, "x"));
        assert_eq!(dom.get("#other"), Some(&Element::default()));
    }

    #[test]
    fn apply_counts_matched_assignments() {
        let doc = fixture_doc();
        let plan = assignments_for("made_to_measure", &doc);
        let mut dom = ElementMap::with(&[".mtm-hero-title", ".mtm-hero-image", ".mtm-second-title"]);
        let applied = apply(&plan, &mut dom);
        assert_eq!(applied, 3);
        assert_eq!(dom.text(".mtm-hero-title"), Some("Made to Measure"));
        assert_eq!(
            dom.get(".mtm-hero-image").unwrap().background_image.as_deref(),
            Some("url('assets/images/mtm-hero.jpg')")
        );
    }

    #[test]
    fn reapplying_is_idempotent() {
        let doc = fixture_doc();
        let plan = assignments_for("homepage", &doc);
        let mut dom = ElementMap::with(&[
            "#hero-title",
            "#hero-image",
            ".prive-section .section-title",
            ".journey-step:nth-child(1) .journey-step-image img",
        ]);
        apply(&plan, &mut dom);
        let once = dom.clone();
        apply(&plan, &mut dom);
        assert_eq!(dom, once);
        assert_eq!(
            dom.get("#hero-image").unwrap().alt.as_deref(),
            Some("Atelier workroom")
        );
    }
}
