//! Oxygen Builder adapter.
//!
//! A document is a `children` tree under a `root` node. Each element keeps
//! its CSS-like settings in `options.original`, where a numeric value can
//! have a `<key>-unit` sibling, and its text in `options.ct_content`.

use serde_json::{json, Map, Value};
use trellis_core::markup::strip_tags;
use trellis_core::style::split_number_unit;
use trellis_core::{Component, StyleMap};

use crate::json::{self, Run};
use crate::normalize::{self, level_of, RenameTable};
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "oxygen";

static NAME_KINDS: RenameTable = &[
    ("ct_section", "section"),
    ("ct_div_block", "container"),
    ("ct_new_columns", "row"),
    ("ct_column", "column"),
    ("ct_headline", "heading"),
    ("ct_text_block", "text"),
    ("ct_rich_text", "text"),
    ("ct_span", "text"),
    ("ct_link_text", "link"),
    ("ct_link", "link"),
    ("ct_link_button", "button"),
    ("ct_image", "image"),
    ("ct_video", "video"),
    ("ct_fancy_icon", "icon"),
    ("ct_code_block", "code"),
    ("ct_shortcode", "embed"),
    ("ct_separator", "divider"),
    ("ct_inner_content", "container"),
    ("ct_nav_menu", "menu"),
    ("ct_widget", "sidebar"),
    ("oxy_tabs", "tabs"),
    ("oxy_tab", "tab"),
    ("oxy_tabs_contents", "container"),
    ("oxy_tab_content", "container"),
    ("oxy_toggle", "toggle"),
    ("oxy_progress_bar", "progress"),
    ("oxy_testimonial", "testimonial"),
    ("oxy_pricing_box", "pricing-table"),
    ("oxy_icon_box", "card"),
    ("oxy_map", "map"),
    ("oxy_social_icons", "social-icons"),
    ("oxy_gallery", "gallery"),
    ("oxy_slider", "carousel"),
    ("oxy_counter", "counter"),
    ("oxy_posts_grid", "post-list"),
    ("oxy_search_form", "search"),
    ("oxy_nav_menu", "menu"),
    ("oxy_login_form", "form"),
];

/// `options.original` keys that hold attributes rather than CSS.
static ORIGINAL_ATTRIBUTES: RenameTable = &[
    ("url", "url"),
    ("src", "image_url"),
    ("alt", "alt_text"),
    ("target", "link_target"),
    ("icon-id", "icon"),
    ("embed_src", "video_url"),
    ("image_type", "image_type"),
    ("progress_bar_progress", "value"),
    ("map_address", "address"),
];

const CSS_PREFIXES: &[&str] = &[
    "margin", "padding", "background", "color", "font", "text-", "line-height", "letter-spacing",
    "border", "width", "height", "min-", "max-", "display", "flex", "gap", "align-", "justify-",
    "opacity", "box-shadow", "position", "top", "left", "right", "bottom", "z-index", "overflow",
    "transform", "transition",
];

/// Length properties whose bare numbers are pixels.
const PX_PREFIXES: &[&str] = &[
    "margin", "padding", "font-size", "width", "height", "min-", "max-", "border-radius",
    "letter-spacing", "gap", "top", "left", "right", "bottom",
];

/// Kinds whose content is kept verbatim.
const RAW_KINDS: &[&str] = &["code", "embed", "html"];

fn is_css(key: &str) -> bool {
    CSS_PREFIXES.iter().any(|p| key.starts_with(p)) && !key.ends_with("-unit")
}

fn defaults_to_px(key: &str) -> bool {
    PX_PREFIXES.iter().any(|p| key.starts_with(p))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split `options.original` into attributes and styles.
fn read_original(kind: &str, original: &Map<String, Value>) -> (Map<String, Value>, StyleMap) {
    let mut attributes = Map::new();
    let mut styles = StyleMap::new();

    for (key, value) in original {
        let Some(text) = scalar_text(value) else {
            continue;
        };
        if key == "tag" {
            match normalize::heading_level(&text) {
                Some(level) if kind == "heading" => {
                    attributes.insert("level".into(), Value::from(level));
                }
                _ => {
                    attributes.insert("html_tag".into(), Value::String(text));
                }
            }
            continue;
        }
        if let Some(universal) = normalize::rename(ORIGINAL_ATTRIBUTES, key) {
            attributes.insert(universal.to_string(), normalize::normalize_value(universal, &text));
            continue;
        }
        if !is_css(key) {
            continue;
        }

        let unit = original.get(&format!("{}-unit", key)).and_then(Value::as_str);
        let css = match unit {
            Some(unit) if unit != "auto" => json::with_unit(&text, unit),
            _ if defaults_to_px(key) => json::with_unit(&text, "px"),
            _ => text,
        };
        if kind == "column" && key == "width" {
            attributes.insert("width".into(), Value::String(css));
        } else {
            styles.insert(key.clone(), css);
        }
    }
    (attributes, styles)
}

struct TreeReader {
    skipped: usize,
}

impl TreeReader {
    fn children(&mut self, node: &Value) -> Vec<Component> {
        match node.get("children") {
            Some(Value::Array(items)) => items.iter().flat_map(|item| self.element(item)).collect(),
            _ => Vec::new(),
        }
    }

    fn element(&mut self, node: &Value) -> Vec<Component> {
        let children = self.children(node);
        let name = node.get("name").and_then(Value::as_str).unwrap_or_default();
        let Some(kind) = normalize::rename(NAME_KINDS, name) else {
            tracing::debug!(name, "dropping unmapped oxygen element");
            self.skipped += 1;
            return children;
        };

        let options = json::object_of(node.get("options"));
        let original = json::object_of(options.get("original"));
        let (attributes, styles) = read_original(kind, &original);
        let mut component = Component::new(kind, ID).with_attributes(attributes).with_styles(styles);

        if let Some(Value::Array(classes)) = options.get("classes") {
            let names: Vec<&str> = classes.iter().filter_map(Value::as_str).collect();
            if !names.is_empty() {
                component = component.with_attribute("css_class", names.join(" "));
            }
        }
        if let Some(Value::String(text)) = options.get("ct_content") {
            component.content = if RAW_KINDS.contains(&kind) {
                text.clone()
            } else {
                strip_tags(text)
            };
        }
        if let Some(code) = options.get("code-php").or_else(|| options.get("full_shortcode")).and_then(Value::as_str) {
            if component.content.is_empty() {
                component.content = code.to_string();
            }
        }

        component.children = children;
        vec![component.with_original(name, options)]
    }
}

/// Parse an Oxygen document.
pub fn parse_oxygen(content: &str) -> ParseReport {
    let Some(document) = json::read_document(content) else {
        return ParseReport::empty();
    };
    let root = json::unwrap_document(&document, &["content", "ct_builder_json"]);
    let mut reader = TreeReader { skipped: 0 };
    let components = match root {
        Value::Array(items) => items.iter().flat_map(|item| reader.element(item)).collect(),
        Value::Object(_) if root.get("name").and_then(Value::as_str) == Some("root") => reader.children(root),
        Value::Object(_) if root.get("name").is_some() => reader.element(root),
        Value::Object(_) => reader.children(root),
        _ => Vec::new(),
    };
    ParseReport {
        components,
        skipped: reader.skipped,
    }
}

/// Write styles into `original` as value/unit pairs.
fn write_styles(styles: &StyleMap, original: &mut Map<String, Value>) {
    for (property, value) in styles {
        match split_number_unit(value) {
            Some((_, unit)) if !unit.is_empty() => {
                let number = value.trim().trim_end_matches(unit).trim().to_string();
                original.insert(property.clone(), Value::String(number));
                original.insert(format!("{}-unit", property), Value::String(unit.to_string()));
            }
            _ => {
                original.insert(property.clone(), Value::String(value.clone()));
            }
        }
    }
}

struct Writer<'c> {
    ctx: &'c mut RenderContext,
    next_id: u64,
}

impl Writer<'_> {
    fn node(&mut self, name: &str, parent: u64, depth: u64, build: impl FnOnce(&mut Self, u64) -> (Map<String, Value>, Vec<Value>)) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        let (mut options, children) = build(self, id);
        let short = name.trim_start_matches("ct_").trim_start_matches("oxy_").replace('_', "-");
        options.insert("ct_id".into(), Value::from(id));
        options.insert("ct_parent".into(), Value::from(parent));
        options.insert("selector".into(), Value::String(format!("{}-{}", short, id)));
        options.insert("nicename".into(), Value::String(format!("{} (#{})", short, id)));
        json!({
            "id": id,
            "name": name,
            "options": options,
            "depth": depth,
            "children": children,
        })
    }

    fn top_level(&mut self, components: &[Component]) -> Vec<Value> {
        let mut out = Vec::new();
        for run in json::runs(components, |c| matches!(c.kind().as_str(), "section" | "container" | "row")) {
            match run {
                Run::Node(component) => out.push(self.element(component, 0, 1)),
                Run::Stray(items) => out.push(self.node("ct_section", 0, 1, |w, id| {
                    let children = items.iter().map(|c| w.element(c, id, 2)).collect();
                    (Map::new(), children)
                })),
            }
        }
        out
    }

    fn row(&mut self, row: &Component, parent: u64, depth: u64) -> Value {
        self.ctx.record(row, true, "ct_new_columns");
        self.node("ct_new_columns", parent, depth, |w, id| {
            let options = w.options(row, "row");
            let runs = json::runs(&row.children, |c| c.is("column"));
            let share = 100.0 / runs.len().max(1) as f64;
            let children = runs
                .into_iter()
                .map(|run| match run {
                    Run::Node(column) => {
                        w.ctx.record(column, true, "ct_column");
                        let percent = normalize::column_percent(column).unwrap_or(share);
                        w.column(Some(column), &column.children.iter().collect::<Vec<_>>(), percent, id, depth + 1)
                    }
                    Run::Stray(items) => w.column(None, &items, share, id, depth + 1),
                })
                .collect();
            (options, children)
        })
    }

    fn column(&mut self, source: Option<&Component>, items: &[&Component], percent: f64, parent: u64, depth: u64) -> Value {
        self.node("ct_column", parent, depth, |w, id| {
            let mut options = source.map(|c| w.options(c, "column")).unwrap_or_default();
            let original = options
                .entry("original")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(original) = original {
                original.insert("width".into(), Value::String(normalize::format_percent(percent).trim_end_matches('%').to_string()));
                original.insert("width-unit".into(), json!("%"));
            }
            let children = items.iter().map(|c| w.element(c, id, depth + 1)).collect();
            (options, children)
        })
    }

    fn element(&mut self, component: &Component, parent: u64, depth: u64) -> Value {
        let kind = component.kind().as_str();
        if kind == "row" {
            return self.row(component, parent, depth);
        }
        let name = match normalize::rename_back(NAME_KINDS, kind) {
            Some(name) => {
                self.ctx.record(component, true, name);
                name
            }
            None => {
                let fallback = if component.children.is_empty() && !normalize::is_container_kind(kind) {
                    "ct_text_block"
                } else {
                    "ct_div_block"
                };
                self.ctx.record(component, false, fallback);
                fallback
            }
        };
        self.node(name, parent, depth, |w, id| {
            let options = w.options(component, kind);
            let children = component.children.iter().map(|c| w.element(c, id, depth + 1)).collect();
            (options, children)
        })
    }

    fn options(&self, component: &Component, kind: &str) -> Map<String, Value> {
        let mut original = Map::new();
        for (key, value) in normalize::scalar_attributes(&component.attributes) {
            match key.as_str() {
                "level" => {
                    original.insert("tag".into(), Value::String(format!("h{}", level_of(component))));
                }
                "html_tag" => {
                    original.insert("tag".into(), Value::String(value));
                }
                "css_class" | "width" => {}
                "link_target" => {
                    let target = match component.attr_bool("link_target") {
                        Some(true) => "_blank".to_string(),
                        Some(false) => "_self".to_string(),
                        None => value,
                    };
                    original.insert("target".into(), Value::String(target));
                }
                _ => {
                    if let Some(native) = normalize::rename_back(ORIGINAL_ATTRIBUTES, &key) {
                        original.insert(native.into(), Value::String(value));
                    }
                }
            }
        }
        if kind != "column" {
            if let Some(width) = component.attr_text("width") {
                original.insert("width".into(), Value::String(width));
            }
        }
        write_styles(&component.styles, &mut original);

        let mut options = Map::new();
        if !original.is_empty() {
            options.insert("original".into(), Value::Object(original));
        }
        if !component.content.is_empty() {
            options.insert("ct_content".into(), Value::String(component.content.clone()));
        }
        if let Some(classes) = component.attr_text("css_class") {
            let list: Vec<Value> = classes.split_whitespace().map(|c| Value::String(c.to_string())).collect();
            options.insert("classes".into(), Value::Array(list));
        }
        options
    }
}

/// Render components as an Oxygen document.
pub fn render_oxygen(components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
    let pretty = ctx.options().pretty;
    let mut writer = Writer { ctx, next_id: 0 };
    let children = writer.top_level(components);
    let document = json!({
        "id": 0,
        "name": "root",
        "depth": 0,
        "children": children,
    });
    json::serialize(&document, pretty)
}

/// Parses Oxygen JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxygenParser;

impl Parser for OxygenParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        parse_oxygen(content)
    }

    fn has_signature(&self, content: &str) -> bool {
        json::looks_like_json(content) && (content.contains("\"ct_section\"") || content.contains("\"ct_id\""))
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "section", "container", "row", "column", "heading", "text", "link", "button", "image", "video",
            "icon", "code", "embed", "divider", "menu", "sidebar", "tabs", "tab", "toggle", "progress",
            "testimonial", "pricing-table", "card", "map", "social-icons", "gallery", "carousel", "counter",
            "post-list", "search", "form",
        ]
    }
}

/// Renders Oxygen JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxygenConverter;

impl Converter for OxygenConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        render_oxygen(components, ctx)
    }
}
