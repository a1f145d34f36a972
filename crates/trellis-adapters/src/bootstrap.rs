//! Bootstrap markup.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};
use trellis_core::markup::{
    extract_grid_info, extract_utility_classes, GridSpec, KindTable, BOOTSTRAP_KIND_TABLE,
};
use trellis_core::style::{spacing_to_utility_classes, Spacing, SpacingProperty, SPACING_SCALE_PX};
use trellis_core::{Component, StyleMap};

use crate::markup_class::{self, ClassDialect, ClassVocabulary, Element};
use crate::normalize;
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "bootstrap";

/// Theme colour names used as variants.
pub const VARIANTS: &[&str] = &[
    "primary", "secondary", "success", "danger", "warning", "info", "light", "dark", "link",
];

static VARIANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(btn|btn-outline|alert|bg|text-bg|list-group-item|table|progress-bar|border)-(primary|secondary|success|danger|warning|info|light|dark|link)$",
    )
    .expect("Invalid variant regex")
});

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:btn|form-control|form-select|pagination|table|modal|btn-group|input-group)-(sm|lg|xl)$")
        .expect("Invalid size regex")
});

static ALIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^text-(start|center|end|left|right|justify)$").expect("Invalid alignment regex")
});

static SPACING_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([mp])([tbsexy]?)-([0-5])$").expect("Invalid spacing token regex")
});

/// Structural modifier tokens that map to boolean attributes.
const FLAG_TOKENS: &[(&str, &str)] = &[
    ("disabled", "disabled"),
    ("active", "active"),
    ("list-group-numbered", "ordered"),
    ("table-striped", "striped"),
    ("table-bordered", "bordered"),
    ("table-hover", "hover"),
    ("progress-bar-striped", "striped"),
    ("progress-bar-animated", "animated"),
    ("alert-dismissible", "dismissible"),
    ("navbar-dark", "dark"),
];

/// Tokens that belong to a component's own scaffolding.
const SCAFFOLD_TOKENS: &[&str] = &[
    "fade",
    "show",
    "collapse",
    "slide",
    "navbar-expand-lg",
    "navbar-expand-md",
    "navbar-light",
    "blockquote",
];

fn spacing_styles(class: &str) -> StyleMap {
    let Some(caps) = SPACING_TOKEN_RE.captures(class) else {
        return StyleMap::new();
    };
    let property = if &caps[1] == "m" { "margin" } else { "padding" };
    let step: usize = caps[3].parse().unwrap_or(0);
    let value = match SPACING_SCALE_PX.get(step) {
        Some(px) if *px == 0.0 => "0".to_string(),
        Some(px) => format!("{}px", px),
        None => return StyleMap::new(),
    };
    let sides: &[&str] = match &caps[2] {
        "t" => &["top"],
        "b" => &["bottom"],
        "s" => &["left"],
        "e" => &["right"],
        "x" => &["left", "right"],
        "y" => &["top", "bottom"],
        _ => &["top", "right", "bottom", "left"],
    };
    sides
        .iter()
        .map(|side| (format!("{}-{}", property, side), value.clone()))
        .collect()
}

/// Parses Bootstrap markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct BootstrapParser;

impl BootstrapParser {
    pub fn new() -> Self {
        Self
    }
}

impl ClassDialect for BootstrapParser {
    fn id(&self) -> &'static str {
        ID
    }

    fn kind_table(&self) -> KindTable {
        BOOTSTRAP_KIND_TABLE
    }

    fn grid_info(&self, classes: &BTreeSet<String>) -> GridSpec {
        extract_grid_info(classes)
    }

    fn scan_tokens(&self, classes: &BTreeSet<String>, attributes: &mut Map<String, Value>) {
        for class in classes {
            if let Some(caps) = VARIANT_RE.captures(class) {
                if !attributes.contains_key("variant") || &caps[1] != "bg" {
                    attributes.insert("variant".into(), json!(&caps[2]));
                }
                if &caps[1] == "btn-outline" {
                    attributes.insert("outline".into(), json!(true));
                }
            } else if let Some(caps) = SIZE_RE.captures(class) {
                attributes.insert("size".into(), json!(&caps[1]));
            } else if let Some(caps) = ALIGN_RE.captures(class) {
                let alignment = match &caps[1] {
                    "start" => "left",
                    "end" => "right",
                    other => other,
                };
                attributes.insert("alignment".into(), json!(alignment));
            } else if let Some((_, flag)) = FLAG_TOKENS.iter().find(|(t, _)| *t == class.as_str()) {
                attributes.insert(flag.to_string(), json!(true));
            }
        }
    }

    fn class_styles(&self, classes: &BTreeSet<String>) -> StyleMap {
        classes.iter().flat_map(|c| spacing_styles(c)).collect()
    }

    fn utility_buckets(&self, classes: &BTreeSet<String>) -> BTreeMap<String, Vec<String>> {
        let kept: BTreeSet<String> = classes
            .iter()
            .filter(|c| !SPACING_TOKEN_RE.is_match(c) && !ALIGN_RE.is_match(c) && !VARIANT_RE.is_match(c))
            .cloned()
            .collect();
        extract_utility_classes(&kept)
    }

    fn is_vocabulary(&self, class: &str) -> bool {
        VARIANT_RE.is_match(class)
            || SIZE_RE.is_match(class)
            || ALIGN_RE.is_match(class)
            || FLAG_TOKENS.iter().any(|(t, _)| *t == class)
            || SCAFFOLD_TOKENS.contains(&class)
    }
}

impl Parser for BootstrapParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        markup_class::parse_markup(self, content)
    }

    fn has_signature(&self, content: &str) -> bool {
        static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"class\s*=\s*["'][^"']*\b(?:container(?:-fluid)?|row|col(?:-(?:sm|md|lg|xl|xxl))?(?:-\d{1,2})?|btn|navbar|card)\b"#)
                .expect("Invalid bootstrap signature regex")
        });
        SIGNATURE.is_match(content)
    }

    fn is_valid_content(&self, content: &str) -> bool {
        self.has_signature(content) || looks_like_markup(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "container", "row", "column", "heading", "text", "button", "button-group", "link",
            "image", "list", "list-item", "card", "alert", "badge", "navbar", "nav", "tabs",
            "accordion", "accordion-item", "modal", "carousel", "progress", "spinner", "breadcrumb",
            "pagination", "dropdown", "toast", "table", "form", "input", "textarea", "select",
            "checkbox", "radio", "label", "quote", "code", "divider", "video", "icon",
        ]
    }

    fn parse_element(&self, raw: &str) -> Option<Component> {
        markup_class::parse_first_element(self, raw)
    }
}

/// Generic markup check shared by the class-based dialects.
pub(crate) fn looks_like_markup(content: &str) -> bool {
    static TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[a-zA-Z][\w-]*[\s>/]").expect("Invalid tag regex"));
    !content.trim_start().starts_with("<!-- wp:") && TAG.is_match(content)
}

/// Renders Bootstrap markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct BootstrapConverter;

impl BootstrapConverter {
    pub fn new() -> Self {
        Self
    }

    fn variant(component: &Component, default: &str) -> String {
        component
            .attr_str("variant")
            .filter(|v| VARIANTS.contains(v))
            .unwrap_or(default)
            .to_string()
    }

    fn column_classes(component: &Component) -> Vec<String> {
        let spans = normalize::column_spans(component);
        if spans.is_empty() {
            return vec!["col".into()];
        }
        spans
            .into_iter()
            .map(|(bp, size)| {
                let size = if size == "equal" { String::new() } else { format!("-{}", size) };
                if bp == "xs" {
                    format!("col{}", size)
                } else {
                    format!("col-{}{}", bp, size)
                }
            })
            .collect()
    }

    fn grid_extras(component: &Component) -> Vec<String> {
        let Some(grid) = component.attr("grid") else {
            return Vec::new();
        };
        let grid = GridSpec::from_value(grid);
        let mut classes = Vec::new();
        for (prefix, part) in [("offset", &grid.offsets), ("order", &grid.order)] {
            for (bp, value) in part {
                if bp == "xs" {
                    classes.push(format!("{}-{}", prefix, value));
                } else {
                    classes.push(format!("{}-{}-{}", prefix, bp, value));
                }
            }
        }
        classes
    }

    fn tabs(&self, component: &Component, ctx: &mut RenderContext) -> Element {
        let mut nav = String::new();
        let mut panes = String::new();
        let base = component.attr_str("css_id").unwrap_or("tabs");

        for (index, tab) in component.children.iter().enumerate() {
            ctx.record(tab, true, "");
            let pane_id = format!("{}-{}", base, index + 1);
            let title = tab
                .attr_text("title")
                .unwrap_or_else(|| format!("Tab {}", index + 1));
            let active = if index == 0 { " active" } else { "" };
            nav.push_str(&format!(
                r##"<li class="nav-item"><button class="nav-link{}" data-bs-toggle="tab" data-bs-target="#{}" type="button">{}</button></li>"##,
                active,
                pane_id,
                trellis_core::markup::escape_html(&title)
            ));
            let mut body = trellis_core::markup::escape_html(&tab.content);
            body.push_str(&markup_class::render_children(self, &tab.children, ctx));
            panes.push_str(&format!(
                r#"<div class="tab-pane fade{}" id="{}">{}</div>"#,
                if index == 0 { " show active" } else { "" },
                pane_id,
                body
            ));
        }

        Element::new("div").inner(format!(
            r#"<ul class="nav nav-tabs">{}</ul><div class="tab-content">{}</div>"#,
            nav, panes
        ))
    }

    fn accordion_item(&self, item: &Component, ctx: &mut RenderContext) -> Element {
        let title = item.attr_text("title").unwrap_or_default();
        let mut body = trellis_core::markup::escape_html(&item.content);
        body.push_str(&markup_class::render_children(self, &item.children, ctx));
        Element::new("div").class("accordion-item").inner(format!(
            r#"<h2 class="accordion-header"><button class="accordion-button" type="button">{}</button></h2><div class="accordion-collapse collapse"><div class="accordion-body">{}</div></div>"#,
            trellis_core::markup::escape_html(&title),
            body
        ))
    }
}

impl ClassVocabulary for BootstrapConverter {
    fn element_for(&self, component: &Component, ctx: &mut RenderContext) -> Option<Element> {
        let element = match component.kind().as_str() {
            "section" => Element::new("section"),
            "container" => match component.attr("grid").map(GridSpec::from_value) {
                Some(GridSpec {
                    container: Some(kind),
                    ..
                }) => match kind.as_str() {
                    "fixed" => Element::new("div").class("container"),
                    other => Element::new("div").class(format!("container-{}", other)),
                },
                _ if component.metadata().source_framework() == ID => Element::new("div"),
                _ => Element::new("div").class("container"),
            },
            "row" => Element::new("div").class("row"),
            "column" => {
                let mut element = Element::new("div");
                element.classes = Self::column_classes(component);
                element.classes.extend(Self::grid_extras(component));
                element
            }
            "heading" => Element::new(format!("h{}", normalize::level_of(component))),
            "text" => Element::new("p"),
            "button" => {
                let tag = if component.attr_str("url").is_some() { "a" } else { "button" };
                let style = if component.attr_bool("outline") == Some(true) {
                    format!("btn-outline-{}", Self::variant(component, "primary"))
                } else {
                    format!("btn-{}", Self::variant(component, "primary"))
                };
                let mut element = Element::new(tag).class("btn").class(style);
                if let Some(size @ ("sm" | "lg")) = component.attr_str("size") {
                    element = element.class(format!("btn-{}", size));
                }
                if tag == "button" {
                    element = element.attr("type", "button");
                }
                element
            }
            "button-group" => Element::new("div").class("btn-group").attr("role", "group"),
            "link" => Element::new("a"),
            "image" => Element::new("img").class("img-fluid"),
            "list" => {
                if component.attr_bool("ordered") == Some(true) {
                    Element::new("ol")
                } else {
                    Element::new("ul")
                }
            }
            "list-item" => Element::new("li"),
            "quote" => Element::new("blockquote").class("blockquote"),
            "code" => Element::new("pre").inner(format!(
                "<code>{}</code>",
                trellis_core::markup::escape_html(&component.content)
            )),
            "html" => Element::new("div").inner(trellis_core::markup::sanitize(
                &component.content,
                trellis_core::markup::SanitizeContext::Html,
            )),
            "divider" => Element::new("hr"),
            "spacer" => {
                let height = component.attr_text("height").unwrap_or_else(|| "24px".into());
                Element::new("div").attr("style", format!("height: {}", height))
            }
            "card" => {
                let mut body = trellis_core::markup::escape_html(&component.content);
                if !body.is_empty() {
                    body = format!(r#"<p class="card-text">{}</p>"#, body);
                }
                let title = component
                    .attr_text("title")
                    .map(|t| {
                        format!(
                            r#"<h5 class="card-title">{}</h5>"#,
                            trellis_core::markup::escape_html(&t)
                        )
                    })
                    .unwrap_or_default();
                let children = markup_class::render_children(self, &component.children, ctx);
                let image = component
                    .attr_text("image_url")
                    .map(|src| {
                        format!(
                            r#"<img src="{}" class="card-img-top" alt="">"#,
                            trellis_core::markup::escape_attribute(&src)
                        )
                    })
                    .unwrap_or_default();
                let inner = if title.is_empty() && body.is_empty() {
                    format!("{}{}", image, children)
                } else {
                    format!(r#"{}<div class="card-body">{}{}{}</div>"#, image, title, body, children)
                };
                Element::new("div").class("card").inner(inner)
            }
            "alert" => Element::new("div")
                .class("alert")
                .class(format!("alert-{}", Self::variant(component, "primary")))
                .attr("role", "alert"),
            "badge" => Element::new("span")
                .class("badge")
                .class(format!("bg-{}", Self::variant(component, "secondary"))),
            "navbar" => Element::new("nav").class("navbar navbar-expand-lg"),
            "nav" | "menu" => Element::new("ul").class("nav"),
            "tabs" => return Some(self.tabs(component, ctx)),
            "tab" => Element::new("div").class("tab-pane"),
            "accordion" => Element::new("div").class("accordion"),
            "accordion-item" | "toggle" => return Some(self.accordion_item(component, ctx)),
            "modal" => Element::new("div").class("modal").attr("tabindex", "-1"),
            "carousel" => Element::new("div").class("carousel slide"),
            "dropdown" => Element::new("div").class("dropdown"),
            "toast" => Element::new("div").class("toast").attr("role", "alert"),
            "progress" => {
                let value = component
                    .attr_text("value")
                    .or_else(|| component.attr_text("percent"))
                    .unwrap_or_else(|| "0".into());
                let value = value.trim_end_matches('%').to_string();
                Element::new("div").class("progress").inner(format!(
                    r#"<div class="progress-bar bg-{}" role="progressbar" style="width: {}%">{}</div>"#,
                    Self::variant(component, "primary"),
                    trellis_core::markup::escape_attribute(&value),
                    trellis_core::markup::escape_html(&component.content)
                ))
            }
            "spinner" => Element::new("div").class("spinner-border").attr("role", "status"),
            "breadcrumb" => Element::new("ol").class("breadcrumb"),
            "pagination" => Element::new("ul").class("pagination"),
            "table" => Element::new("table").class("table").inner(trellis_core::markup::sanitize(
                &component.content,
                trellis_core::markup::SanitizeContext::Html,
            )),
            "form" => Element::new("form"),
            "input" | "search" => Element::new("input").class("form-control").attr(
                "type",
                component.attr_text("input_type").unwrap_or_else(|| {
                    if component.is("search") { "search".into() } else { "text".into() }
                }),
            ),
            "textarea" => Element::new("textarea").class("form-control"),
            "select" => Element::new("select").class("form-select").inner(trellis_core::markup::sanitize(
                &component.content,
                trellis_core::markup::SanitizeContext::Html,
            )),
            "checkbox" => Element::new("input").class("form-check-input").attr("type", "checkbox"),
            "radio" => Element::new("input").class("form-check-input").attr("type", "radio"),
            "label" => Element::new("label").class("form-label"),
            "video" | "embed" => {
                let src = component
                    .attr_text("video_url")
                    .or_else(|| component.attr_text("url"))
                    .unwrap_or_default();
                Element::new("div").class("ratio ratio-16x9").inner(format!(
                    r#"<iframe src="{}" allowfullscreen></iframe>"#,
                    trellis_core::markup::escape_attribute(&src)
                ))
            }
            "icon" => Element::new("i").class(component.attr_text("icon").unwrap_or_default()),
            _ => return None,
        };
        Some(element)
    }

    fn spacing_tokens(&self, spacing: &Spacing, property: SpacingProperty) -> Vec<String> {
        spacing_to_utility_classes(spacing, property)
    }

    fn utility_tokens(&self, component: &Component) -> Vec<String> {
        let mut tokens = Vec::new();
        if let Some(Value::Object(buckets)) = component.attr("utilities") {
            for classes in buckets.values() {
                if let Some(list) = classes.as_array() {
                    tokens.extend(list.iter().filter_map(|c| c.as_str().map(String::from)));
                }
            }
        }
        if let Some(alignment) = component.attr_str("alignment") {
            let token = match alignment {
                "left" => Some("text-start"),
                "center" => Some("text-center"),
                "right" => Some("text-end"),
                "justify" => Some("text-justify"),
                _ => None,
            };
            tokens.extend(token.map(String::from));
        }
        if component.attr_bool("disabled") == Some(true) {
            tokens.push("disabled".into());
        }
        tokens
    }
}

impl Converter for BootstrapConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        Ok(markup_class::render_html(self, components, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RenderOptions;

    const SCENARIO: &str = r#"<div class="container"><div class="row"><div class="col-md-6"><button class="btn btn-primary">Go</button></div></div></div>"#;

    #[test]
    fn parses_container_row_column_button() {
        let tree = BootstrapParser.parse(SCENARIO);
        assert_eq!(tree.len(), 1);

        let container = &tree[0];
        assert!(container.is("container"));
        let row = &container.children[0];
        assert!(row.is("row"));
        let column = &row.children[0];
        assert!(column.is("column"));
        assert_eq!(column.attributes["grid"]["breakpoints"]["md"], "6");
        let button = &column.children[0];
        assert!(button.is("button"));
        assert_eq!(button.attr_str("variant"), Some("primary"));
        assert_eq!(button.content, "Go");
        assert_eq!(button.attr("css_class"), None);
    }

    #[test]
    fn spacing_tokens_become_styles_and_utilities_are_bucketed() {
        let tree = BootstrapParser.parse(r#"<div class="card mt-3 px-2 d-flex text-center shadow-lg">x</div>"#);
        let card = &tree[0];
        assert!(card.is("card"));
        assert_eq!(card.styles.get("margin-top").map(String::as_str), Some("16px"));
        assert_eq!(card.styles.get("padding-left").map(String::as_str), Some("8px"));
        assert_eq!(card.attributes["utilities"]["display"], json!(["d-flex"]));
        assert_eq!(card.attr_str("alignment"), Some("center"));
        assert_eq!(card.attr_str("css_class"), Some("shadow-lg"));
    }

    #[test]
    fn reads_outline_and_size_variants() {
        let button = BootstrapParser
            .parse_element(r#"<a class="btn btn-outline-danger btn-lg" href="/buy">Buy</a>"#)
            .unwrap();
        assert_eq!(button.attr_str("variant"), Some("danger"));
        assert_eq!(button.attr_bool("outline"), Some(true));
        assert_eq!(button.attr_str("size"), Some("lg"));
        assert_eq!(button.attr_str("url"), Some("/buy"));
    }

    #[test]
    fn sniffs_bootstrap_content() {
        assert!(BootstrapParser.has_signature(SCENARIO));
        assert!(!BootstrapParser.has_signature("<p>plain</p>"));
        assert!(BootstrapParser.is_valid_content("<p>plain</p>"));
        assert!(!BootstrapParser.is_valid_content("[vc_row][/vc_row]"));
    }

    #[test]
    fn round_trips_the_scenario() {
        let tree = BootstrapParser.parse(SCENARIO);
        let mut ctx = RenderContext::new("Bootstrap", RenderOptions::default());
        let html = BootstrapConverter.render(&tree, &mut ctx).unwrap();
        assert_eq!(
            html,
            r#"<div class="container"><div class="row"><div class="col-md-6"><button class="btn btn-primary" type="button">Go</button></div></div></div>"#
        );
        assert_eq!(ctx.stats().elements_processed, 4);
        assert!(ctx.stats().warnings.is_empty());
    }

    #[test]
    fn renders_foreign_trees_with_scaffolding() {
        let tree = vec![Component::new("row", "wpbakery").with_child(
            Component::new("column", "wpbakery")
                .with_attribute("width", "33.33%")
                .with_style("padding-top", "17px")
                .with_child(
                    Component::new("heading", "wpbakery")
                        .with_attribute("level", 3)
                        .with_content("Hi"),
                )
                .with_child(Component::new("pricing-table", "wpbakery").with_content("$9")),
        )];

        let mut ctx = RenderContext::new("Bootstrap", RenderOptions::default());
        let html = BootstrapConverter.render(&tree, &mut ctx).unwrap();
        assert_eq!(
            html,
            r#"<div class="row"><div class="col-md-4" style="padding-top: 17px"><h3>Hi</h3><p>$9</p></div></div>"#
        );
        assert_eq!(
            ctx.stats().warnings,
            vec!["pricing-table has no Bootstrap equivalent; rendered as p".to_string()]
        );
    }

    #[test]
    fn renders_tabs_with_panes() {
        let tabs = Component::new("tabs", "divi")
            .with_child(Component::new("tab", "divi").with_attribute("title", "One").with_content("first"))
            .with_child(Component::new("tab", "divi").with_attribute("title", "Two").with_content("second"));
        let mut ctx = RenderContext::new("Bootstrap", RenderOptions::default());
        let html = BootstrapConverter.render(&[tabs], &mut ctx).unwrap();
        assert!(html.contains(r#"<ul class="nav nav-tabs">"#));
        assert!(html.contains(r##"data-bs-target="#tabs-2""##));
        assert!(html.contains(r#"<div class="tab-pane fade" id="tabs-2">second</div>"#));
        assert_eq!(ctx.stats().elements_processed, 3);
    }

    #[test]
    fn nav_links_keep_their_urls() {
        let tree = BootstrapParser.parse(
            r#"<ul class="nav"><li class="nav-item"><a class="nav-link" href="/about">About</a></li></ul>"#,
        );
        let nav = &tree[0];
        assert!(nav.is("nav"));
        let link = nav.find("link").unwrap();
        assert_eq!(link.attr_str("url"), Some("/about"));
        assert_eq!(link.content, "About");
    }

    #[test]
    fn linked_images_keep_the_image() {
        let report = BootstrapParser.parse_report(r#"<a href="/"><img class="img-fluid" src="logo.png" alt="Logo"></a>"#);
        assert_eq!(report.skipped, 0);
        let link = &report.components[0];
        assert!(link.is("link"));
        assert_eq!(link.attr_str("url"), Some("/"));
        let image = &link.children[0];
        assert!(image.is("image"));
        assert_eq!(image.attr_str("image_url"), Some("logo.png"));
    }

    #[test]
    fn raw_values_are_escaped_or_sanitized() {
        let card = Component::new("card", "test")
            .with_attribute("image_url", r#"x.png" onerror="alert(1)"#)
            .with_attribute("title", "T");
        let table = Component::new("table", "test")
            .with_content("<tr><td>1</td></tr><script>alert(1)</script>");
        let mut ctx = RenderContext::new("Bootstrap", RenderOptions::default());
        let html = BootstrapConverter.render(&[card, table], &mut ctx).unwrap();

        assert!(html.contains(r#"<img src="x.png&quot; onerror=&quot;alert(1)" class="card-img-top" alt="">"#));
        assert!(html.contains("<tr><td>1</td></tr>"));
        assert!(!html.contains("<script"));
    }
}
