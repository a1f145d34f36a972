//! Tailwind CSS markup.
//!
//! Tailwind has almost no component classes, so kinds come mostly from tags.
//! Grid spans, fractional widths, palette colours and spacing utilities are
//! read into the shared vocabulary; everything else stays in `css_class`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};
use trellis_core::markup::{escape_attribute, escape_html, sanitize, GridSpec, KindTable, SanitizeContext};
use trellis_core::style::{format_number, spacing_to_utility_classes, Spacing, SpacingProperty};
use trellis_core::{Component, StyleMap};

use crate::bootstrap::looks_like_markup;
use crate::markup_class::{self, ClassDialect, ClassVocabulary, Element};
use crate::normalize;
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "tailwind";

static TAILWIND_KIND_TABLE: KindTable = &[
    ("button", &["btn"]),
    ("container", &["container"]),
    ("row", &["grid-cols-12", "grid-cols-"]),
    ("column", &["col-span-full", "col-span-", "basis-"]),
    ("spinner", &["animate-spin"]),
    ("divider", &["divide-y", "divide-x"]),
];

/// Palette colour -> variant.
pub static PALETTE_VARIANTS: &[(&str, &str)] = &[
    ("blue", "primary"),
    ("indigo", "primary"),
    ("gray", "secondary"),
    ("slate", "secondary"),
    ("zinc", "secondary"),
    ("neutral", "secondary"),
    ("stone", "secondary"),
    ("green", "success"),
    ("emerald", "success"),
    ("red", "danger"),
    ("rose", "danger"),
    ("yellow", "warning"),
    ("amber", "warning"),
    ("orange", "warning"),
    ("cyan", "info"),
    ("sky", "info"),
    ("teal", "info"),
    ("white", "light"),
    ("black", "dark"),
];

/// Variant -> palette colour used when rendering.
fn palette_for(variant: &str) -> &'static str {
    match variant {
        "secondary" | "light" | "dark" => "gray",
        "success" => "green",
        "danger" => "red",
        "warning" => "yellow",
        "info" => "cyan",
        _ => "blue",
    }
}

/// Tailwind spacing steps emitted for the shared six-step scale.
const SCALE_STEPS: [&str; 6] = ["0", "1", "2", "4", "6", "12"];

static RESPONSIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(sm|md|lg|xl|2xl):)?(.+)$").expect("Invalid responsive prefix regex")
});

static COL_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(sm|md|lg|xl|2xl):)?col-span-(\d{1,2}|full)$").expect("Invalid col-span regex")
});

static FRACTION_WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(sm|md|lg|xl|2xl):)?w-(\d{1,2})/(\d{1,2})$").expect("Invalid fraction width regex")
});

static GRID_COLS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^grid-cols-(\d{1,2})$").expect("Invalid grid-cols regex"));

static BG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^bg-([a-z]+)(?:-(\d{2,3}))?$").expect("Invalid background regex")
});

static SPACING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([mp])([trblxy]?)-(\d+(?:\.5)?|px|auto)$").expect("Invalid spacing regex")
});

static ALIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^text-(left|center|right|justify|start|end)$").expect("Invalid alignment regex")
});

static FONT_WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^font-(thin|extralight|light|normal|medium|semibold|bold|extrabold|black)$")
        .expect("Invalid font weight regex")
});

fn font_weight(name: &str) -> &'static str {
    match name {
        "thin" => "100",
        "extralight" => "200",
        "light" => "300",
        "medium" => "500",
        "semibold" => "600",
        "bold" => "700",
        "extrabold" => "800",
        "black" => "900",
        _ => "400",
    }
}

fn breakpoint(prefix: Option<regex::Match<'_>>) -> String {
    match prefix.map(|m| m.as_str()) {
        None => "xs".into(),
        Some("2xl") => "xxl".into(),
        Some(other) => other.into(),
    }
}

fn spacing_styles(class: &str) -> StyleMap {
    let Some(caps) = SPACING_RE.captures(class) else {
        return StyleMap::new();
    };
    let property = if &caps[1] == "m" { "margin" } else { "padding" };
    let value = match &caps[3] {
        "auto" => "auto".to_string(),
        "px" => "1px".to_string(),
        "0" => "0".to_string(),
        n => match n.parse::<f64>() {
            Ok(n) => format!("{}px", format_number(n * 4.0)),
            Err(_) => return StyleMap::new(),
        },
    };
    let sides: &[&str] = match &caps[2] {
        "t" => &["top"],
        "r" => &["right"],
        "b" => &["bottom"],
        "l" => &["left"],
        "x" => &["left", "right"],
        "y" => &["top", "bottom"],
        _ => &["top", "right", "bottom", "left"],
    };
    sides
        .iter()
        .map(|side| (format!("{}-{}", property, side), value.clone()))
        .collect()
}

/// Parses Tailwind markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct TailwindParser;

impl TailwindParser {
    pub fn new() -> Self {
        Self
    }
}

impl ClassDialect for TailwindParser {
    fn id(&self) -> &'static str {
        ID
    }

    fn kind_table(&self) -> KindTable {
        TAILWIND_KIND_TABLE
    }

    /// Strips responsive prefixes. A background colour combined with padding
    /// and rounding reads as a button.
    fn detection_classes(&self, classes: &BTreeSet<String>) -> BTreeSet<String> {
        let mut base: BTreeSet<String> = classes
            .iter()
            .filter_map(|c| RESPONSIVE_RE.captures(c).map(|caps| caps[2].to_string()))
            .collect();

        let has_bg = base
            .iter()
            .any(|c| BG_RE.captures(c).is_some_and(|caps| caps.get(2).is_some()));
        let has_padding = base.iter().any(|c| c.starts_with("px-") || c.starts_with("py-"));
        let rounded = base.iter().any(|c| c.starts_with("rounded"));
        if has_bg && has_padding && rounded && !base.iter().any(|c| c.starts_with("col-span-")) {
            base.insert("btn".into());
        }
        base
    }

    fn grid_info(&self, classes: &BTreeSet<String>) -> GridSpec {
        let mut grid = GridSpec::default();
        for class in classes {
            if class == "container" {
                grid.container = Some("fixed".into());
            } else if GRID_COLS_RE.is_match(class) {
                grid.row = true;
            } else if let Some(caps) = COL_SPAN_RE.captures(class) {
                grid.column = true;
                let size = if &caps[2] == "full" { "12".to_string() } else { caps[2].to_string() };
                grid.breakpoints.insert(breakpoint(caps.get(1)), size);
            } else if let Some(caps) = FRACTION_WIDTH_RE.captures(class) {
                let (Ok(num), Ok(den)) = (caps[2].parse::<f64>(), caps[3].parse::<f64>()) else {
                    continue;
                };
                if den > 0.0 && caps.get(1).is_some() {
                    grid.column = true;
                    let span = normalize::percent_to_span(num / den * 100.0, 12);
                    grid.breakpoints.insert(breakpoint(caps.get(1)), span.to_string());
                }
            }
        }
        grid
    }

    fn scan_tokens(&self, classes: &BTreeSet<String>, attributes: &mut Map<String, Value>) {
        for class in classes {
            if let Some(caps) = BG_RE.captures(class) {
                if let Some((_, variant)) = PALETTE_VARIANTS.iter().find(|(p, _)| *p == &caps[1]) {
                    attributes.entry("variant").or_insert_with(|| json!(variant));
                }
            } else if let Some(caps) = ALIGN_RE.captures(class) {
                let alignment = match &caps[1] {
                    "start" => "left",
                    "end" => "right",
                    other => other,
                };
                attributes.insert("alignment".into(), json!(alignment));
            } else if let Some(caps) = FRACTION_WIDTH_RE.captures(class) {
                if caps.get(1).is_none() {
                    if let (Ok(num), Ok(den)) = (caps[2].parse::<f64>(), caps[3].parse::<f64>()) {
                        if den > 0.0 {
                            attributes.insert(
                                "width".into(),
                                json!(normalize::format_percent(num / den * 100.0)),
                            );
                        }
                    }
                }
            } else if let Some(caps) = GRID_COLS_RE.captures(class) {
                attributes.insert("columns".into(), json!(&caps[1]));
            }
        }
    }

    fn class_styles(&self, classes: &BTreeSet<String>) -> StyleMap {
        let mut styles: StyleMap = classes.iter().flat_map(|c| spacing_styles(c)).collect();
        for class in classes {
            if let Some(caps) = FONT_WEIGHT_RE.captures(class) {
                styles.insert("font-weight".into(), font_weight(&caps[1]).into());
            }
        }
        styles
    }

    fn is_vocabulary(&self, class: &str) -> bool {
        BG_RE
            .captures(class)
            .is_some_and(|caps| PALETTE_VARIANTS.iter().any(|(p, _)| *p == &caps[1]))
            || ALIGN_RE.is_match(class)
            || FRACTION_WIDTH_RE.is_match(class)
            || COL_SPAN_RE.is_match(class)
            || matches!(class, "grid" | "flex-wrap" | "mx-auto")
    }
}

impl Parser for TailwindParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        markup_class::parse_markup(self, content)
    }

    fn has_signature(&self, content: &str) -> bool {
        static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"class\s*=\s*["'](?:[^"']*\s)?(?:(?:sm|md|lg|xl|2xl|hover|focus):[a-z][^\s"']*|(?:col-span|grid-cols)-\d+|(?:bg|text)-[a-z]+-[1-9]00|flex|inline-flex|grid|items-center|justify-between)[\s"']"#)
                .expect("Invalid tailwind signature regex")
        });
        SIGNATURE.is_match(content)
    }

    fn is_valid_content(&self, content: &str) -> bool {
        self.has_signature(content) || looks_like_markup(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "container", "row", "column", "heading", "text", "button", "link", "image", "list",
            "list-item", "card", "alert", "badge", "navbar", "nav", "accordion", "accordion-item",
            "toggle", "progress", "spinner", "table", "form", "input", "textarea", "select",
            "checkbox", "label", "quote", "code", "divider", "video", "icon",
        ]
    }

    fn parse_element(&self, raw: &str) -> Option<Component> {
        markup_class::parse_first_element(self, raw)
    }
}

/// Renders Tailwind markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct TailwindConverter;

impl TailwindConverter {
    pub fn new() -> Self {
        Self
    }

    fn palette(component: &Component) -> &'static str {
        palette_for(component.attr_str("variant").unwrap_or("primary"))
    }

    fn column_classes(component: &Component) -> Vec<String> {
        let spans = normalize::column_spans(component);
        if spans.is_empty() {
            return vec!["col-span-12".into()];
        }
        spans
            .into_iter()
            .map(|(bp, size)| {
                let token = match size.as_str() {
                    "equal" | "auto" => "col-auto".to_string(),
                    n => format!("col-span-{}", n),
                };
                match bp.as_str() {
                    "xs" => token,
                    "xxl" => format!("2xl:{}", token),
                    other => format!("{}:{}", other, token),
                }
            })
            .collect()
    }

    fn button(component: &Component) -> Element {
        let palette = Self::palette(component);
        let tag = if component.attr_str("url").is_some() { "a" } else { "button" };
        let padding = match component.attr_str("size") {
            Some("sm") => "px-3 py-1 text-sm",
            Some("lg") => "px-6 py-3 text-lg",
            _ => "px-4 py-2",
        };
        let colors = if component.attr_bool("outline") == Some(true) {
            format!("border border-{p}-600 text-{p}-600", p = palette)
        } else if component.attr_str("variant") == Some("light") {
            "bg-gray-100 text-gray-900".to_string()
        } else {
            format!("bg-{}-600 text-white", palette)
        };
        let mut element = Element::new(tag)
            .class("inline-block rounded font-semibold")
            .class(padding)
            .class(colors);
        if tag == "button" {
            element = element.attr("type", "button");
        }
        element
    }
}

impl ClassVocabulary for TailwindConverter {
    fn element_for(&self, component: &Component, ctx: &mut RenderContext) -> Option<Element> {
        let element = match component.kind().as_str() {
            "section" => Element::new("section").class("py-12"),
            "container" => {
                let native = component.metadata().source_framework() == ID;
                let fixed = component
                    .attr("grid")
                    .map(GridSpec::from_value)
                    .is_some_and(|g| g.container.is_some());
                if native && !fixed {
                    Element::new("div")
                } else {
                    Element::new("div").class("container mx-auto px-4")
                }
            }
            "row" => Element::new("div").class("grid grid-cols-12 gap-4"),
            "column" => {
                let mut element = Element::new("div");
                element.classes = Self::column_classes(component);
                element
            }
            "heading" => {
                let level = normalize::level_of(component);
                let size = match level {
                    1 => "text-4xl",
                    2 => "text-3xl",
                    3 => "text-2xl",
                    4 => "text-xl",
                    5 => "text-lg",
                    _ => "text-base",
                };
                Element::new(format!("h{}", level)).class(size).class("font-bold")
            }
            "text" => Element::new("p"),
            "button" => Self::button(component),
            "link" => Element::new("a").class("text-blue-600 underline"),
            "image" => Element::new("img").class("max-w-full h-auto"),
            "list" => {
                if component.attr_bool("ordered") == Some(true) {
                    Element::new("ol").class("list-decimal pl-5")
                } else {
                    Element::new("ul").class("list-disc pl-5")
                }
            }
            "list-item" => Element::new("li"),
            "quote" => Element::new("blockquote").class("border-l-4 pl-4 italic"),
            "code" => Element::new("pre")
                .class("bg-gray-100 p-4 rounded")
                .inner(format!("<code>{}</code>", escape_html(&component.content))),
            "html" => Element::new("div").inner(sanitize(&component.content, SanitizeContext::Html)),
            "divider" => Element::new("hr").class("my-4 border-gray-200"),
            "spacer" => {
                let height = component.attr_text("height").unwrap_or_else(|| "24px".into());
                Element::new("div").attr("style", format!("height: {}", height))
            }
            "card" => {
                let title = component
                    .attr_text("title")
                    .map(|t| format!(r#"<h3 class="text-xl font-semibold mb-2">{}</h3>"#, escape_html(&t)))
                    .unwrap_or_default();
                let body = if component.content.is_empty() {
                    String::new()
                } else {
                    format!(r#"<p class="text-gray-700">{}</p>"#, escape_html(&component.content))
                };
                let children = markup_class::render_children(self, &component.children, ctx);
                Element::new("div")
                    .class("rounded-lg shadow p-6 bg-white")
                    .inner(format!("{}{}{}", title, body, children))
            }
            "alert" => {
                let p = Self::palette(component);
                Element::new("div")
                    .class(format!("p-4 rounded border bg-{p}-100 text-{p}-800 border-{p}-200", p = p))
                    .attr("role", "alert")
            }
            "badge" => {
                let p = Self::palette(component);
                Element::new("span").class(format!(
                    "inline-block px-2 py-1 text-xs font-semibold rounded bg-{p}-100 text-{p}-800",
                    p = p
                ))
            }
            "navbar" => Element::new("nav").class("flex items-center justify-between p-4"),
            "nav" | "menu" => Element::new("ul").class("flex gap-4"),
            "accordion" => Element::new("div").class("divide-y"),
            "accordion-item" | "toggle" => {
                let title = component.attr_text("title").unwrap_or_default();
                let mut body = escape_html(&component.content);
                body.push_str(&markup_class::render_children(self, &component.children, ctx));
                Element::new("details").class("p-4").inner(format!(
                    r#"<summary class="font-semibold cursor-pointer">{}</summary><div class="mt-2">{}</div>"#,
                    escape_html(&title),
                    body
                ))
            }
            "progress" => {
                let value = component
                    .attr_text("value")
                    .or_else(|| component.attr_text("percent"))
                    .unwrap_or_else(|| "0".into());
                Element::new("div").class("w-full bg-gray-200 rounded").inner(format!(
                    r#"<div class="bg-{}-600 h-2 rounded" style="width: {}%"></div>"#,
                    Self::palette(component),
                    escape_attribute(value.trim_end_matches('%'))
                ))
            }
            "spinner" => Element::new("div")
                .class("animate-spin rounded-full h-8 w-8 border-4 border-blue-600 border-t-transparent"),
            "table" => Element::new("table")
                .class("table-auto w-full")
                .inner(sanitize(&component.content, SanitizeContext::Html)),
            "form" => Element::new("form").class("space-y-4"),
            "input" | "search" => Element::new("input")
                .class("border rounded px-3 py-2 w-full")
                .attr(
                    "type",
                    component.attr_text("input_type").unwrap_or_else(|| {
                        if component.is("search") { "search".into() } else { "text".into() }
                    }),
                ),
            "textarea" => Element::new("textarea").class("border rounded px-3 py-2 w-full"),
            "select" => Element::new("select")
                .class("border rounded px-3 py-2")
                .inner(sanitize(&component.content, SanitizeContext::Html)),
            "checkbox" => Element::new("input").class("h-4 w-4").attr("type", "checkbox"),
            "label" => Element::new("label").class("block text-sm font-medium"),
            "video" | "embed" => Element::new("iframe")
                .class("w-full aspect-video")
                .attr("allowfullscreen", ""),
            "icon" => Element::new("i").class(component.attr_text("icon").unwrap_or_default()),
            _ => return None,
        };
        Some(element)
    }

    fn spacing_tokens(&self, spacing: &Spacing, property: SpacingProperty) -> Vec<String> {
        spacing_to_utility_classes(spacing, property)
            .into_iter()
            .filter_map(|token| {
                let (prefix, step) = token.split_once('-')?;
                let step: usize = step.parse().ok()?;
                let prefix = prefix.replace('s', "l").replace('e', "r");
                Some(format!("{}-{}", prefix, SCALE_STEPS.get(step)?))
            })
            .collect()
    }

    fn utility_tokens(&self, component: &Component) -> Vec<String> {
        let mut tokens = Vec::new();
        if let Some(alignment) = component.attr_str("alignment") {
            if matches!(alignment, "left" | "center" | "right" | "justify") {
                tokens.push(format!("text-{}", alignment));
            }
        }
        if !component.is("column") {
            if let Some(width) = component.attr("width").and_then(normalize::parse_percent) {
                let fraction = normalize::percent_to_fraction(width);
                if fraction == "1/1" {
                    tokens.push("w-full".into());
                } else {
                    tokens.push(format!("w-{}", fraction));
                }
            }
        }
        tokens
    }
}

impl Converter for TailwindConverter {
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

    const PAGE: &str = r#"<div class="container mx-auto"><div class="grid grid-cols-12 gap-4"><div class="col-span-12 md:col-span-6"><a href="/go" class="px-4 py-2 rounded bg-blue-600 text-white">Go</a></div><div class="w-1/2"><p class="text-center font-bold">Hi</p></div></div></div>"#;

    #[test]
    fn parses_grid_and_button_heuristics() {
        let tree = TailwindParser.parse(PAGE);
        let container = &tree[0];
        assert!(container.is("container"));
        assert_eq!(container.styles.get("margin-left").map(String::as_str), Some("auto"));

        let row = &container.children[0];
        assert!(row.is("row"));
        assert_eq!(row.attr_str("columns"), Some("12"));
        assert_eq!(row.attr_str("css_class"), Some("gap-4"));

        let column = &row.children[0];
        assert!(column.is("column"));
        assert_eq!(column.attributes["grid"]["breakpoints"]["md"], "6");
        assert_eq!(column.attributes["grid"]["breakpoints"]["xs"], "12");

        let button = &column.children[0];
        assert!(button.is("button"));
        assert_eq!(button.attr_str("variant"), Some("primary"));
        assert_eq!(button.attr_str("url"), Some("/go"));
        assert_eq!(button.styles.get("padding-left").map(String::as_str), Some("16px"));
        assert_eq!(button.content, "Go");

        let half = &row.children[1];
        assert!(half.is("container"));
        assert_eq!(half.attr_str("width"), Some("50%"));
        let text = &half.children[0];
        assert_eq!(text.attr_str("alignment"), Some("center"));
        assert_eq!(text.styles.get("font-weight").map(String::as_str), Some("700"));
    }

    #[test]
    fn responsive_width_fraction_marks_a_column() {
        let block = TailwindParser.parse_element(r#"<div class="md:w-1/3">x</div>"#).unwrap();
        assert!(block.is("container"));
        assert_eq!(block.attributes["grid"]["breakpoints"]["md"], "4");
    }

    #[test]
    fn sniffs_tailwind_content() {
        assert!(TailwindParser.has_signature(PAGE));
        assert!(!TailwindParser.has_signature(r#"<div class="container"><div class="row"></div></div>"#));
        assert!(TailwindParser.is_valid_content("<p>x</p>"));
    }

    #[test]
    fn renders_bootstrap_tree_with_tailwind_classes() {
        let tree = vec![Component::new("row", "bootstrap").with_child(
            Component::new("column", "bootstrap")
                .with_attribute("grid", json!({"column": true, "breakpoints": {"md": "6"}}))
                .with_child(
                    Component::new("button", "bootstrap")
                        .with_attribute("variant", "danger")
                        .with_style("margin-top", "16px")
                        .with_style("margin-bottom", "10px")
                        .with_content("Go"),
                ),
        )];

        let mut ctx = RenderContext::new("Tailwind CSS", RenderOptions::default());
        let html = TailwindConverter.render(&tree, &mut ctx).unwrap();
        assert_eq!(
            html,
            r#"<div class="grid grid-cols-12 gap-4"><div class="md:col-span-6"><button class="inline-block rounded font-semibold px-4 py-2 bg-red-600 text-white mt-4" type="button" style="margin-bottom: 10px">Go</button></div></div>"#
        );
        assert!(ctx.stats().warnings.is_empty());
    }

    #[test]
    fn modal_has_no_tailwind_equivalent() {
        let mut ctx = RenderContext::new("Tailwind CSS", RenderOptions::default());
        let html = TailwindConverter
            .render(&[Component::new("modal", "bootstrap").with_child(Component::new("text", "bootstrap").with_content("hi"))], &mut ctx)
            .unwrap();
        assert_eq!(html, "<div><p>hi</p></div>");
        assert_eq!(
            ctx.stats().warnings,
            vec!["modal has no Tailwind CSS equivalent; rendered as div".to_string()]
        );
    }

    #[test]
    fn spacing_tokens_use_the_tailwind_scale() {
        let spacing = Spacing {
            left: Some("16px".into()),
            right: Some("24px".into()),
            ..Default::default()
        };
        assert_eq!(
            TailwindConverter.spacing_tokens(&spacing, SpacingProperty::Padding),
            vec!["pl-4".to_string(), "pr-6".to_string()]
        );
    }

    #[test]
    fn menu_links_and_linked_images_survive() {
        let report = TailwindParser.parse_report(
            r#"<ul class="flex gap-4"><li><a href="/about" class="text-gray-700">About</a></li></ul><a href="/"><img src="logo.png" alt="Logo" class="h-8"></a>"#,
        );
        assert_eq!(report.skipped, 0);

        let item = &report.components[0].children[0];
        assert!(item.is("list-item"));
        let link = &item.children[0];
        assert!(link.is("link"));
        assert_eq!(link.attr_str("url"), Some("/about"));
        assert_eq!(link.content, "About");

        let logo = &report.components[1];
        assert!(logo.is("link"));
        let image = &logo.children[0];
        assert!(image.is("image"));
        assert_eq!(image.attr_str("image_url"), Some("logo.png"));
        assert_eq!(image.attr_str("alt_text"), Some("Logo"));
    }

    #[test]
    fn deep_markup_parses_without_overflow() {
        let nesting = 10_000;
        let html = format!("{}x{}", r#"<div class="p-4">"#.repeat(nesting), "</div>".repeat(nesting));
        let report = TailwindParser.parse_report(&html);
        assert_eq!(report.components.len(), 1);
        assert_eq!(report.skipped, nesting - crate::traits::MAX_DEPTH);
    }
}
