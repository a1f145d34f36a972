//! Shared engine for class-based HTML dialects.
//!
//! Both directions are parameterised by the dialect: parsing walks the
//! document and asks a `ClassDialect` what the class tokens mean, rendering
//! asks a `ClassVocabulary` which element and classes express a component.

use std::collections::{BTreeMap, BTreeSet};

use scraper::ElementRef;
use serde_json::{json, Map, Value};
use trellis_core::markup::{
    self, attributes_of, classes_of, create_element, detect_component_kind, escape_html,
    own_text, text_of, GridSpec, KindTable,
};
use trellis_core::style::{
    extract_spacing, merge_styles, parse_inline, spacing_step, to_inline, Spacing, SpacingProperty,
};
use trellis_core::{Component, StyleMap};

use crate::normalize::{self, HTML_ATTRIBUTES};
use crate::traits::{ParseReport, RenderContext, MAX_DEPTH};

/// How a class-based dialect reads its class vocabulary.
pub trait ClassDialect: Send + Sync {
    /// Framework identifier
    fn id(&self) -> &'static str;

    /// Ordered class -> kind table
    fn kind_table(&self) -> KindTable;

    /// Tokens used for kind detection.
    fn detection_classes(&self, classes: &BTreeSet<String>) -> BTreeSet<String> {
        classes.clone()
    }

    /// Grid information carried by the tokens.
    fn grid_info(&self, classes: &BTreeSet<String>) -> GridSpec;

    /// Read variant, size and alignment tokens into attributes.
    fn scan_tokens(&self, classes: &BTreeSet<String>, attributes: &mut Map<String, Value>);

    /// Styles implied by utility tokens.
    fn class_styles(&self, classes: &BTreeSet<String>) -> StyleMap;

    /// Utility tokens kept verbatim under `attributes.utilities`.
    fn utility_buckets(&self, _classes: &BTreeSet<String>) -> BTreeMap<String, Vec<String>> {
        BTreeMap::new()
    }

    /// Whether a token is regenerated by the converter and so should not be
    /// kept in `css_class`.
    fn is_vocabulary(&self, class: &str) -> bool;
}

/// Tag -> kind fallback used when no class matches.
pub static TAG_KINDS: &[(&str, &str)] = &[
    ("h1", "heading"),
    ("h2", "heading"),
    ("h3", "heading"),
    ("h4", "heading"),
    ("h5", "heading"),
    ("h6", "heading"),
    ("p", "text"),
    ("span", "text"),
    ("strong", "text"),
    ("em", "text"),
    ("b", "text"),
    ("small", "text"),
    ("a", "link"),
    ("img", "image"),
    ("picture", "image"),
    ("div", "container"),
    ("section", "container"),
    ("article", "container"),
    ("main", "container"),
    ("header", "container"),
    ("footer", "container"),
    ("aside", "sidebar"),
    ("figure", "container"),
    ("nav", "nav"),
    ("ul", "list"),
    ("ol", "list"),
    ("li", "list-item"),
    ("button", "button"),
    ("blockquote", "quote"),
    ("pre", "code"),
    ("code", "code"),
    ("hr", "divider"),
    ("table", "table"),
    ("form", "form"),
    ("input", "input"),
    ("textarea", "textarea"),
    ("select", "select"),
    ("label", "label"),
    ("video", "video"),
    ("audio", "audio"),
    ("iframe", "embed"),
    ("i", "icon"),
    ("details", "toggle"),
];

/// Tags that never become components and are not counted as dropped.
const IGNORED_TAGS: &[&str] = &[
    "br", "wbr", "script", "style", "meta", "link", "noscript", "template", "head", "title",
    "source", "track",
];

/// Tags whose text is read into `content`.
const TEXT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "a", "button", "li", "label", "blockquote",
    "figcaption", "strong", "em", "b", "small", "code", "pre", "summary", "textarea", "dt", "dd",
];

/// Inline formatting inside text tags. Its text is merged into the parent
/// instead of becoming a component.
const FORMATTING_TAGS: &[&str] = &[
    "span", "strong", "em", "b", "i", "u", "small", "code", "br", "mark", "sub", "sup", "abbr", "cite",
    "kbd", "s", "del", "ins", "time", "q",
];

/// Tags whose inner markup is kept as-is.
const RAW_TAGS: &[&str] = &["table", "select", "svg"];

fn tag_kind(element: &ElementRef<'_>) -> Option<&'static str> {
    let tag = element.value().name();
    if tag == "input" {
        return Some(match element.value().attr("type").unwrap_or("text") {
            "checkbox" => "checkbox",
            "radio" => "radio",
            "submit" | "button" => "button",
            "search" => "search",
            _ => "input",
        });
    }
    TAG_KINDS.iter().find(|(t, _)| *t == tag).map(|(_, k)| *k)
}

/// Parse a document with a class dialect.
pub fn parse_markup<D: ClassDialect + ?Sized>(dialect: &D, content: &str) -> ParseReport {
    let Some(document) = markup::parse_document(content) else {
        return ParseReport::empty();
    };

    let mut skipped = 0;
    let mut components = Vec::new();
    for element in document.root_elements() {
        components.extend(parse_node(dialect, &element, 0, &mut skipped));
    }

    ParseReport { components, skipped }
}

/// Parse one element. Unknown elements are dropped and their parsed
/// children lifted into the caller. Elements nested deeper than
/// `MAX_DEPTH` are dropped with their whole subtree.
fn parse_node<D: ClassDialect + ?Sized>(
    dialect: &D,
    element: &ElementRef<'_>,
    depth: usize,
    skipped: &mut usize,
) -> Vec<Component> {
    let tag = element.value().name();
    if IGNORED_TAGS.contains(&tag) {
        return Vec::new();
    }
    if depth >= MAX_DEPTH {
        let dropped = element.descendants().filter(|node| node.value().is_element()).count();
        tracing::debug!(framework = dialect.id(), dropped, "dropping markup nested too deeply");
        *skipped += dropped;
        return Vec::new();
    }

    let classes = classes_of(element);
    let detection = dialect.detection_classes(&classes);
    let kind = detect_component_kind(&detection, dialect.kind_table()).or_else(|| tag_kind(element));

    let children = if RAW_TAGS.contains(&tag) {
        Vec::new()
    } else {
        let text_tag = TEXT_TAGS.contains(&tag);
        element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| !(text_tag && FORMATTING_TAGS.contains(&child.value().name())))
            .flat_map(|child| parse_node(dialect, &child, depth + 1, skipped))
            .collect()
    };

    let Some(kind) = kind else {
        *skipped += 1;
        tracing::debug!(framework = dialect.id(), tag, "dropping unmapped element");
        return children;
    };

    let mut component = Component::new(kind, dialect.id())
        .with_attributes(element_attributes(dialect, element, &classes))
        .with_styles(element_styles(dialect, element, &classes))
        .with_original(tag, original_attributes(element))
        .with_children(children);

    if let Some(level) = normalize::heading_level(tag) {
        component = component.with_attribute("level", level);
    }
    if tag == "ol" {
        component = component.with_attribute("ordered", true);
    }

    component.content = element_content(element);

    vec![component]
}

fn element_content(element: &ElementRef<'_>) -> String {
    let tag = element.value().name();
    if RAW_TAGS.contains(&tag) {
        return element.inner_html().trim().to_string();
    }
    if !TEXT_TAGS.contains(&tag) {
        return String::new();
    }

    let has_blocks = element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| !FORMATTING_TAGS.contains(&child.value().name()));
    if has_blocks {
        own_text(element)
    } else {
        text_of(element)
    }
}

fn element_attributes<D: ClassDialect + ?Sized>(
    dialect: &D,
    element: &ElementRef<'_>,
    classes: &BTreeSet<String>,
) -> Map<String, Value> {
    let mut attributes = Map::new();

    for (name, value) in attributes_of(element) {
        if name == "class" || name == "style" {
            continue;
        }
        let key = normalize::rename(HTML_ATTRIBUTES, &name)
            .map(String::from)
            .unwrap_or_else(|| name.replace('-', "_"));
        attributes.insert(key, Value::String(value));
    }

    let grid = dialect.grid_info(classes);
    if !grid.is_empty() {
        attributes.insert("grid".into(), grid.to_value());
    }

    let buckets = dialect.utility_buckets(classes);
    if !buckets.is_empty() {
        attributes.insert("utilities".into(), json!(buckets));
    }

    dialect.scan_tokens(classes, &mut attributes);

    let leftover: Vec<&str> = classes
        .iter()
        .filter(|class| !consumes(dialect, class))
        .map(String::as_str)
        .collect();
    if !leftover.is_empty() {
        attributes.insert("css_class".into(), json!(leftover.join(" ")));
    }

    attributes
}

/// Whether the dialect turns this token into structure, attributes or
/// styles.
fn consumes<D: ClassDialect + ?Sized>(dialect: &D, class: &str) -> bool {
    let single: BTreeSet<String> = std::iter::once(class.to_string()).collect();
    dialect.is_vocabulary(class)
        || detect_component_kind(&dialect.detection_classes(&single), dialect.kind_table()).is_some()
        || !dialect.grid_info(&single).is_empty()
        || !dialect.utility_buckets(&single).is_empty()
        || !dialect.class_styles(&single).is_empty()
}

fn element_styles<D: ClassDialect + ?Sized>(
    dialect: &D,
    element: &ElementRef<'_>,
    classes: &BTreeSet<String>,
) -> StyleMap {
    let from_classes = dialect.class_styles(classes);
    let inline = element
        .value()
        .attr("style")
        .map(parse_inline)
        .unwrap_or_default();
    merge_styles(&from_classes, &inline)
}

fn original_attributes(element: &ElementRef<'_>) -> Map<String, Value> {
    attributes_of(element)
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// Parse the first element of a fragment.
pub fn parse_first_element<D: ClassDialect + ?Sized>(dialect: &D, raw: &str) -> Option<Component> {
    parse_markup(dialect, raw).components.into_iter().next()
}

/// An element chosen by a vocabulary for one component.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    /// Pre-rendered inner markup replacing content and children
    pub inner: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.classes
            .extend(class.split_whitespace().map(String::from));
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn inner(mut self, inner: String) -> Self {
        self.inner = Some(inner);
        self
    }
}

/// How a class-based dialect writes components.
pub trait ClassVocabulary: Send + Sync {
    /// Element for a component, or `None` when the dialect has no
    /// equivalent.
    fn element_for(&self, component: &Component, ctx: &mut RenderContext) -> Option<Element>;

    /// Tokens for on-scale spacing.
    fn spacing_tokens(&self, spacing: &Spacing, property: SpacingProperty) -> Vec<String>;

    /// Extra utility tokens for a component.
    fn utility_tokens(&self, _component: &Component) -> Vec<String> {
        Vec::new()
    }

    /// Substitute for a component the dialect cannot express.
    fn fallback(&self, component: &Component) -> Element {
        if component.children.is_empty() && !component.content.is_empty() {
            Element::new("p")
        } else {
            Element::new("div")
        }
    }
}

/// Render a forest with a class vocabulary.
pub fn render_html<V: ClassVocabulary + ?Sized>(
    vocabulary: &V,
    components: &[Component],
    ctx: &mut RenderContext,
) -> String {
    let mut parts = Vec::new();
    for component in components {
        if ctx.options().include_comments {
            if let Some(original) = &component.metadata().original_type {
                parts.push(format!(
                    "<!-- {} from {} -->",
                    original,
                    component.metadata().source_framework()
                ));
            }
        }
        parts.push(render_component(vocabulary, component, ctx));
    }

    let html = parts.join("");
    if ctx.options().pretty {
        markup::prettify(&html)
    } else {
        html
    }
}

/// Render children in order.
pub fn render_children<V: ClassVocabulary + ?Sized>(
    vocabulary: &V,
    components: &[Component],
    ctx: &mut RenderContext,
) -> String {
    components
        .iter()
        .map(|c| render_component(vocabulary, c, ctx))
        .collect()
}

/// Render one component and its subtree.
pub fn render_component<V: ClassVocabulary + ?Sized>(
    vocabulary: &V,
    component: &Component,
    ctx: &mut RenderContext,
) -> String {
    let (element, expressible) = match vocabulary.element_for(component, ctx) {
        Some(element) => (element, true),
        None => (vocabulary.fallback(component), false),
    };
    ctx.record(component, expressible, &element.tag);

    let Element {
        tag,
        mut classes,
        attrs,
        inner,
    } = element;

    classes.extend(vocabulary.utility_tokens(component));
    if let Some(extra) = component.attr_str("css_class") {
        classes.extend(extra.split_whitespace().map(String::from));
    }

    let styles = if ctx.options().utility_classes {
        let (tokens, remaining) = split_spacing(vocabulary, &component.styles);
        classes.extend(tokens);
        remaining
    } else {
        component.styles.clone()
    };

    let mut seen = BTreeSet::new();
    classes.retain(|c| seen.insert(c.clone()));

    let mut all_attrs: Vec<(String, String)> = Vec::new();
    if let Some(id) = component.attr_str("css_id") {
        all_attrs.push(("id".into(), id.to_string()));
    }
    if !classes.is_empty() {
        all_attrs.push(("class".into(), classes.join(" ")));
    }
    all_attrs.extend(attrs);
    all_attrs.extend(media_attributes(&tag, component, &all_attrs));
    if !styles.is_empty() {
        all_attrs.push(("style".into(), to_inline(&styles)));
    }

    let inner = inner.unwrap_or_else(|| {
        let mut body = escape_html(&component.content);
        body.push_str(&render_children(vocabulary, &component.children, ctx));
        body
    });

    create_element(&tag, &all_attrs, &inner)
}

/// Link, media and form attributes implied by the tag, unless the
/// vocabulary already set them.
fn media_attributes(
    tag: &str,
    component: &Component,
    existing: &[(String, String)],
) -> Vec<(String, String)> {
    let has = |name: &str| existing.iter().any(|(n, _)| n == name);
    let mut attrs = Vec::new();
    let mut push = |name: &str, value: Option<String>| {
        if let Some(value) = value {
            if !has(name) {
                attrs.push((name.to_string(), value));
            }
        }
    };

    match tag {
        "a" => {
            push("href", Some(component.attr_text("url").unwrap_or_else(|| "#".into())));
            push("target", link_target(component));
        }
        "img" => {
            push("src", component.attr_text("image_url").or_else(|| component.attr_text("url")));
            push("alt", Some(component.attr_text("alt_text").unwrap_or_default()));
        }
        "video" | "audio" | "iframe" => {
            push(
                "src",
                component
                    .attr_text("video_url")
                    .or_else(|| component.attr_text("url"))
                    .or_else(|| component.attr_text("image_url")),
            );
        }
        "input" | "textarea" | "select" => {
            push("name", component.attr_text("name"));
            push("placeholder", component.attr_text("placeholder"));
            push("value", component.attr_text("value"));
        }
        _ => {}
    }
    attrs
}

/// `_blank` for new-window links.
pub fn link_target(component: &Component) -> Option<String> {
    match component.attr("link_target")? {
        Value::Bool(true) => Some("_blank".into()),
        Value::String(s) if !s.is_empty() && s != "_self" => Some(s.clone()),
        _ => None,
    }
}

/// Move on-scale margin and padding into utility tokens. Off-scale sides
/// stay as literal longhand styles.
pub fn split_spacing<V: ClassVocabulary + ?Sized>(
    vocabulary: &V,
    styles: &StyleMap,
) -> (Vec<String>, StyleMap) {
    let mut remaining: StyleMap = styles
        .iter()
        .filter(|(k, _)| {
            !(k.as_str() == "margin"
                || k.as_str() == "padding"
                || k.starts_with("margin-")
                || k.starts_with("padding-"))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut tokens = Vec::new();
    for property in [SpacingProperty::Margin, SpacingProperty::Padding] {
        let spacing = extract_spacing(styles, property);
        let mut on_scale = Spacing::default();
        let slots = [
            &mut on_scale.top,
            &mut on_scale.right,
            &mut on_scale.bottom,
            &mut on_scale.left,
        ];
        for ((side, value), slot) in spacing.sides().into_iter().zip(slots) {
            let Some(value) = value else { continue };
            if spacing_step(value).is_some() {
                *slot = Some(value.to_string());
            } else {
                remaining.insert(format!("{}-{}", property.as_str(), side), value.to_string());
            }
        }
        tokens.extend(vocabulary.spacing_tokens(&on_scale, property));
    }

    (tokens, remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RenderOptions;
    use trellis_core::style::spacing_to_utility_classes;

    struct Plain;

    impl ClassDialect for Plain {
        fn id(&self) -> &'static str {
            "plain"
        }
        fn kind_table(&self) -> KindTable {
            &[("button", &["btn"])]
        }
        fn grid_info(&self, _classes: &BTreeSet<String>) -> GridSpec {
            GridSpec::default()
        }
        fn scan_tokens(&self, _classes: &BTreeSet<String>, _attributes: &mut Map<String, Value>) {}
        fn class_styles(&self, _classes: &BTreeSet<String>) -> StyleMap {
            StyleMap::new()
        }
        fn is_vocabulary(&self, _class: &str) -> bool {
            false
        }
    }

    impl ClassVocabulary for Plain {
        fn element_for(&self, component: &Component, _ctx: &mut RenderContext) -> Option<Element> {
            match component.kind().as_str() {
                "container" => Some(Element::new("div")),
                "text" => Some(Element::new("p")),
                "link" => Some(Element::new("a")),
                _ => None,
            }
        }
        fn spacing_tokens(&self, spacing: &Spacing, property: SpacingProperty) -> Vec<String> {
            spacing_to_utility_classes(spacing, property)
        }
    }

    #[test]
    fn falls_back_to_tag_kinds_and_reads_text() {
        let report = parse_markup(&Plain, r#"<section><h3>Title</h3><p>Hello <strong>there</strong></p></section>"#);
        assert_eq!(report.skipped, 0);
        let section = &report.components[0];
        assert!(section.is("container"));
        assert_eq!(section.content, "");
        assert_eq!(section.children.len(), 2);
        assert!(section.children[0].is("heading"));
        assert_eq!(section.children[0].attr("level"), Some(&json!(3)));
        assert_eq!(section.children[1].content, "Hello there");
        assert!(section.children[1].children.is_empty());
    }

    #[test]
    fn renames_html_attributes_and_keeps_unknown_classes() {
        let report = parse_markup(&Plain, r#"<a href="/x" id="main" class="btn fancy" target="_blank">Go</a>"#);
        let button = &report.components[0];
        assert!(button.is("button"));
        assert_eq!(button.attr_str("url"), Some("/x"));
        assert_eq!(button.attr_str("css_id"), Some("main"));
        assert_eq!(button.attr_str("link_target"), Some("_blank"));
        assert_eq!(button.attr_str("css_class"), Some("fancy"));
        assert_eq!(button.metadata().original_type.as_deref(), Some("a"));
    }

    #[test]
    fn unknown_elements_are_dropped_and_counted() {
        let report = parse_markup(&Plain, "<custom-widget><p>kept</p></custom-widget><br>");
        assert_eq!(report.skipped, 1);
        assert_eq!(report.components.len(), 1);
        assert_eq!(report.components[0].content, "kept");
    }

    #[test]
    fn links_and_images_inside_text_tags_become_children() {
        let report = parse_markup(
            &Plain,
            r#"<ul><li><a href="/about">About</a></li></ul><a href="/"><img src="logo.png" alt="Logo"></a>"#,
        );
        assert_eq!(report.skipped, 0);

        let item = &report.components[0].children[0];
        assert!(item.is("list-item"));
        assert_eq!(item.content, "");
        let link = &item.children[0];
        assert!(link.is("link"));
        assert_eq!(link.attr_str("url"), Some("/about"));
        assert_eq!(link.content, "About");

        let logo = &report.components[1];
        assert_eq!(logo.attr_str("url"), Some("/"));
        let image = &logo.children[0];
        assert!(image.is("image"));
        assert_eq!(image.attr_str("image_url"), Some("logo.png"));
        assert_eq!(image.attr_str("alt_text"), Some("Logo"));
    }

    #[test]
    fn deep_nesting_is_cut_off_and_counted() {
        let nesting = 10_000;
        let html = format!("{}x{}", "<div>".repeat(nesting), "</div>".repeat(nesting));
        let report = parse_markup(&Plain, &html);

        let mut levels = 0;
        let mut node = report.components.first();
        while let Some(component) = node {
            levels += 1;
            node = component.children.first();
        }
        assert_eq!(levels, MAX_DEPTH);
        assert_eq!(report.skipped, nesting - MAX_DEPTH);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_markup(&Plain, "").components.is_empty());
        assert!(parse_markup(&Plain, "  ").components.is_empty());
    }

    #[test]
    fn renders_with_fallback_and_spacing_policy() {
        let tree = vec![Component::new("container", "test")
            .with_style("margin-top", "16px")
            .with_style("margin-bottom", "13px")
            .with_child(Component::new("text", "test").with_content("a < b"))
            .with_child(Component::new("countdown", "test"))];

        let mut ctx = RenderContext::new("Plain", RenderOptions::default());
        let html = render_html(&Plain, &tree, &mut ctx);

        assert_eq!(
            html,
            r#"<div class="mt-3" style="margin-bottom: 13px"><p>a &lt; b</p><div></div></div>"#
        );
        let stats = ctx.into_stats();
        assert_eq!(stats.elements_processed, 3);
        assert_eq!(stats.warnings.len(), 1);
    }

    #[test]
    fn links_get_href_and_target() {
        let link = Component::new("link", "test")
            .with_attribute("url", "http://x")
            .with_attribute("link_target", true)
            .with_content("x");
        let mut ctx = RenderContext::new("Plain", RenderOptions::default());
        assert_eq!(
            render_html(&Plain, &[link], &mut ctx),
            r#"<a href="http://x" target="_blank">x</a>"#
        );
    }
}
