//! Bricks Builder adapter.
//!
//! Documents are a flat `content` list where each element names its
//! `parent` and lists its `children` ids. Rows are containers with
//! `_direction: row`; columns are blocks with a `_width`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};
use trellis_core::markup::{escape_html, strip_tags};
use trellis_core::style::{extract_spacing, parse_inline, to_inline, SpacingProperty};
use trellis_core::{tree, Component, StyleMap};

use crate::json::{self, Assembled, FlatNode, IdGenerator, Run};
use crate::normalize::{self, format_percent, level_of, RenameTable};
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "bricks";

static NAME_KINDS: RenameTable = &[
    ("section", "section"),
    ("container", "container"),
    ("block", "container"),
    ("div", "container"),
    ("heading", "heading"),
    ("text-basic", "text"),
    ("text", "text"),
    ("button", "button"),
    ("text-link", "link"),
    ("image", "image"),
    ("video", "video"),
    ("audio", "audio"),
    ("icon", "icon"),
    ("icon-box", "card"),
    ("divider", "divider"),
    ("list", "list"),
    ("accordion", "accordion"),
    ("accordion-nested", "accordion"),
    ("tabs", "tabs"),
    ("tabs-nested", "tabs"),
    ("code", "code"),
    ("shortcode", "embed"),
    ("map", "map"),
    ("counter", "counter"),
    ("progress-bar", "progress"),
    ("social-icons", "social-icons"),
    ("form", "form"),
    ("nav-menu", "menu"),
    ("nav-nested", "menu"),
    ("posts", "post-list"),
    ("image-gallery", "gallery"),
    ("slider", "carousel"),
    ("carousel", "carousel"),
    ("testimonials", "testimonial"),
    ("pricing-tables", "pricing-table"),
    ("alert", "alert"),
    ("countdown", "countdown"),
    ("search", "search"),
    ("team-members", "team-member"),
    ("sidebar", "sidebar"),
    ("rating", "rating"),
];

static SETTING_RENAMES: RenameTable = &[
    ("_cssClasses", "css_class"),
    ("_cssId", "css_id"),
    ("style", "variant"),
    ("size", "size"),
    ("altText", "alt_text"),
    ("videoType", "provider"),
    ("fileUrl", "video_url"),
    ("countTo", "value"),
    ("percentage", "value"),
    ("type", "alert_type"),
    ("address", "address"),
    ("title", "title"),
    ("caption", "caption"),
];

/// `_typography` fields, which share CSS property names.
const TYPOGRAPHY: &[&str] = &[
    "font-size", "font-weight", "font-family", "line-height", "letter-spacing", "text-align",
    "text-transform", "font-style", "color",
];

static SIZE_SETTINGS: RenameTable = &[
    ("_width", "width"),
    ("_widthMax", "max-width"),
    ("_widthMin", "min-width"),
    ("_height", "height"),
    ("_minHeight", "min-height"),
    ("_gap", "gap"),
];

/// Repeaters: `(element, setting, child kind)`.
static REPEATERS: &[(&str, &str, &str)] = &[
    ("accordion", "accordions", "accordion-item"),
    ("tabs", "tabs", "tab"),
    ("list", "items", "list-item"),
    ("social-icons", "icons", "social-link"),
];

/// Kinds whose content is kept verbatim.
const RAW_KINDS: &[&str] = &["code", "embed"];

static CUSTOM_CSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)%root%\s*\{(.*?)\}").expect("Invalid bricks custom css regex"));

fn repeater(name: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    REPEATERS.iter().find(|r| r.0 == name)
}

/// Color from `{"hex": "#fff"}`, `{"raw": "var(--x)"}` or a plain string.
fn color_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(_) => ["hex", "rgb", "raw"]
            .iter()
            .find_map(|key| tree::get_str(value, key).filter(|s| !s.is_empty()))
            .map(String::from),
        _ => None,
    }
}

fn read_styles(settings: &Value) -> StyleMap {
    let mut styles = StyleMap::new();
    if let Some(padding) = settings.get("_padding") {
        styles.extend(json::dimensions_to_styles(padding, SpacingProperty::Padding));
    }
    if let Some(margin) = settings.get("_margin") {
        styles.extend(json::dimensions_to_styles(margin, SpacingProperty::Margin));
    }
    if let Some(Value::Object(typography)) = settings.get("_typography") {
        for (key, value) in typography {
            if !TYPOGRAPHY.contains(&key.as_str()) {
                continue;
            }
            let css = if key == "color" {
                color_of(value)
            } else {
                json::size_to_css(value, if key == "font-size" { "px" } else { "" })
            };
            if let Some(css) = css {
                styles.insert(key.clone(), css);
            }
        }
    }
    if let Some(color) = tree::get(settings, "_background.color").and_then(color_of) {
        styles.insert("background-color".into(), color);
    }
    for (key, property) in SIZE_SETTINGS {
        if let Some(css) = settings.get(*key).and_then(|v| json::size_to_css(v, "px")) {
            styles.insert(property.to_string(), css);
        }
    }
    if let Some(css) = settings.get("_cssCustom").and_then(Value::as_str) {
        for caps in CUSTOM_CSS_RE.captures_iter(css) {
            styles.extend(parse_inline(&caps[1]));
        }
    }
    styles
}

fn read_attributes(name: &str, settings: &Value) -> Map<String, Value> {
    let mut attributes = Map::new();
    let Value::Object(map) = settings else {
        return attributes;
    };
    for (key, value) in map {
        match key.as_str() {
            "link" => {
                if let Some(url) = json::text_setting(value.get("url")) {
                    attributes.insert("url".into(), Value::String(url));
                }
                if value.get("newTab").and_then(Value::as_bool) == Some(true) {
                    attributes.insert("link_target".into(), Value::String("_blank".into()));
                }
            }
            "image" => {
                if let Some(url) = json::text_setting(value.get("url")) {
                    attributes.insert("image_url".into(), Value::String(url));
                }
            }
            "icon" => {
                if let Some(icon) = json::text_setting(value.get("icon")) {
                    attributes.insert("icon".into(), Value::String(icon));
                }
            }
            "ytId" => {
                if let Some(id) = value.as_str().filter(|s| !s.is_empty()) {
                    attributes.insert(
                        "video_url".into(),
                        Value::String(format!("https://www.youtube.com/watch?v={}", id)),
                    );
                }
            }
            "tag" => {
                if let Some(tag) = value.as_str() {
                    match normalize::heading_level(tag) {
                        Some(level) if name == "heading" => {
                            attributes.insert("level".into(), Value::from(level));
                        }
                        _ => {
                            attributes.insert("html_tag".into(), Value::String(tag.to_string()));
                        }
                    }
                }
            }
            "_direction" if name != "container" => {
                if let Some(direction) = value.as_str() {
                    attributes.insert("direction".into(), Value::String(direction.to_string()));
                }
            }
            _ => {
                let Some(universal) = normalize::rename(SETTING_RENAMES, key) else {
                    continue;
                };
                let value = match value {
                    Value::String(s) if s.is_empty() => continue,
                    Value::String(s) => normalize::normalize_value(universal, s),
                    Value::Number(_) | Value::Bool(_) => value.clone(),
                    _ => continue,
                };
                attributes.insert(universal.to_string(), value);
            }
        }
    }
    attributes
}

fn repeater_item(item: &Value, kind: &str) -> Component {
    let mut component = Component::new(kind, ID);
    if let Some(title) = json::text_setting(item.get("title")) {
        component = if kind == "list-item" {
            component.with_content(title)
        } else {
            component.with_attribute("title", title)
        };
    }
    if let Some(content) = json::text_setting(item.get("content")) {
        component = component.with_content(content);
    }
    if let Some(url) = item.get("link").and_then(|l| json::text_setting(l.get("url"))) {
        component = component.with_attribute("url", url);
    }
    if let Some(icon) = item.get("icon").and_then(|i| json::text_setting(i.get("icon"))) {
        component = component.with_attribute("icon", icon);
    }
    component.with_original(kind, json::object_of(Some(item)))
}

/// Build a component from one element, or skip it.
fn convert(node: &FlatNode<'_>) -> Assembled {
    let element = node.data;
    let name = element.get("name").and_then(Value::as_str).unwrap_or_default();
    let settings = element.get("settings").cloned().unwrap_or(Value::Object(Map::new()));
    let Some(mut kind) = normalize::rename(NAME_KINDS, name) else {
        tracing::debug!(name, "dropping unmapped bricks element");
        return Assembled::Skip;
    };
    if name == "container" && tree::get_str(&settings, "_direction") == Some("row") {
        kind = "row";
    } else if name == "block" && tree::has(&settings, "_width") {
        kind = "column";
    }

    let mut attributes = read_attributes(name, &settings);
    let mut styles = read_styles(&settings);
    if kind == "column" {
        if let Some(width) = styles.remove("width") {
            attributes.insert("width".into(), Value::String(width));
        }
    }

    let mut component = Component::new(kind, ID).with_attributes(attributes).with_styles(styles);
    let text = ["text", "code", "content"]
        .iter()
        .find_map(|key| settings.get(*key).and_then(Value::as_str));
    if let Some(text) = text {
        component.content = if RAW_KINDS.contains(&kind) {
            text.to_string()
        } else {
            strip_tags(text)
        };
    }

    if let Some((_, key, child_kind)) = repeater(name) {
        if let Some(Value::Array(items)) = settings.get(*key) {
            component.children = items.iter().map(|item| repeater_item(item, child_kind)).collect();
        }
    }

    Assembled::Component(component.with_original(name, json::object_of(Some(&settings))))
}

/// Parse a Bricks document.
pub fn parse_bricks(content: &str) -> ParseReport {
    let Some(document) = json::read_document(content) else {
        return ParseReport::empty();
    };
    let Value::Array(elements) = json::unwrap_document(&document, &["content", "elements"]) else {
        return ParseReport::empty();
    };

    let mut positions: HashMap<String, usize> = HashMap::new();
    for element in elements {
        if let Some(Value::Array(children)) = element.get("children") {
            for (position, child) in children.iter().enumerate() {
                if let Some(id) = json::id_string(child) {
                    positions.insert(id, position);
                }
            }
        }
    }

    let nodes: Vec<FlatNode<'_>> = elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let id = element.get("id").and_then(json::id_string)?;
            let parent = element.get("parent").and_then(json::id_string).filter(|p| p != "0");
            let order = positions.get(&id).copied().unwrap_or(index) as f64;
            Some(FlatNode {
                id,
                parent,
                order,
                data: element,
            })
        })
        .collect();

    json::assemble(&nodes, convert)
}

struct Writer<'c> {
    ctx: &'c mut RenderContext,
    ids: IdGenerator,
    elements: Vec<Value>,
}

impl Writer<'_> {
    /// Append an element and its subtree in pre-order; returns its id.
    fn push(
        &mut self,
        name: &str,
        parent: &Value,
        settings: Map<String, Value>,
        children: impl FnOnce(&mut Self, &Value) -> Vec<Value>,
    ) -> Value {
        let id = Value::String(self.ids.next_alnum(6));
        let index = self.elements.len();
        self.elements.push(Value::Null);
        let child_ids = children(self, &id);
        self.elements[index] = json!({
            "id": id,
            "name": name,
            "parent": parent,
            "children": child_ids,
            "settings": settings,
        });
        id
    }

    fn top_level(&mut self, components: &[Component]) {
        let root = Value::from(0);
        for run in json::runs(components, |c| c.is("section")) {
            match run {
                Run::Node(section) => {
                    self.element(section, &root);
                }
                Run::Stray(items) => {
                    self.push("section", &root, Map::new(), |w, section| {
                        vec![w.push("container", section, Map::new(), |w, container| {
                            items.iter().map(|c| w.element(c, container)).collect()
                        })]
                    });
                }
            }
        }
    }

    fn row(&mut self, row: &Component, parent: &Value) -> Value {
        self.ctx.record(row, true, "container");
        let mut settings = self.settings(row, "container");
        settings.insert("_direction".into(), json!("row"));
        self.push("container", parent, settings, |w, id| {
            let runs = json::runs(&row.children, |c| c.is("column"));
            let share = 100.0 / runs.len().max(1) as f64;
            runs.into_iter()
                .map(|run| match run {
                    Run::Node(column) => w.element(column, id),
                    Run::Stray(items) => {
                        let mut settings = Map::new();
                        settings.insert("_width".into(), Value::String(format_percent(share)));
                        w.push("block", id, settings, |w, block| {
                            items.iter().map(|c| w.element(c, block)).collect()
                        })
                    }
                })
                .collect()
        })
    }

    fn element(&mut self, component: &Component, parent: &Value) -> Value {
        let kind = component.kind().as_str();
        let name = match kind {
            "row" => return self.row(component, parent),
            "column" => {
                self.ctx.record(component, true, "block");
                "block"
            }
            _ => match normalize::rename_back(NAME_KINDS, kind) {
                Some(name) => {
                    self.ctx.record(component, true, name);
                    name
                }
                None => {
                    let fallback = if component.children.is_empty() && !normalize::is_container_kind(kind) {
                        "text-basic"
                    } else {
                        "div"
                    };
                    self.ctx.record(component, false, fallback);
                    fallback
                }
            },
        };

        let mut settings = self.settings(component, name);
        if kind == "column" {
            let percent = normalize::column_percent(component).unwrap_or(100.0);
            settings.insert("_width".into(), Value::String(format_percent(percent)));
        }

        let repeated = repeater(name);
        if let Some((_, key, _)) = repeated {
            let items: Vec<Value> = component.children.iter().map(|c| self.repeater_entry(c)).collect();
            settings.insert(key.to_string(), Value::Array(items));
        }

        self.push(name, parent, settings, |w, id| {
            if repeated.is_some() {
                return Vec::new();
            }
            component.children.iter().map(|c| w.element(c, id)).collect()
        })
    }

    fn repeater_entry(&mut self, child: &Component) -> Value {
        self.ctx.record(child, true, "item");
        let mut entry = Map::new();
        entry.insert("id".into(), Value::String(self.ids.next_alnum(6)));
        if child.is("list-item") {
            entry.insert("title".into(), Value::String(child.content.clone()));
        } else {
            if let Some(title) = child.attr_text("title") {
                entry.insert("title".into(), Value::String(title));
            }
            if !child.content.is_empty() {
                entry.insert("content".into(), Value::String(child.content.clone()));
            }
        }
        if let Some(url) = child.attr_text("url") {
            entry.insert("link".into(), json!({ "type": "external", "url": url }));
        }
        if let Some(icon) = child.attr_text("icon") {
            entry.insert("icon".into(), json!({ "library": "fontawesomeSolid", "icon": icon }));
        }
        Value::Object(entry)
    }

    fn settings(&self, component: &Component, name: &str) -> Map<String, Value> {
        let mut settings = Map::new();
        let new_tab = component.attr_str("link_target") == Some("_blank") || component.attr_bool("link_target") == Some(true);
        for (key, value) in normalize::scalar_attributes(&component.attributes) {
            match key.as_str() {
                "width" | "link_target" => {}
                "url" => {
                    let mut link = json!({ "type": "external", "url": value });
                    if new_tab {
                        tree::set(&mut link, "newTab", Value::Bool(true));
                    }
                    settings.insert("link".into(), link);
                }
                "image_url" => {
                    settings.insert("image".into(), json!({ "url": value, "external": true }));
                }
                "icon" => {
                    settings.insert("icon".into(), json!({ "library": "fontawesomeSolid", "icon": value }));
                }
                "level" => {
                    settings.insert("tag".into(), Value::String(format!("h{}", level_of(component))));
                }
                "html_tag" => {
                    settings.insert("tag".into(), Value::String(value));
                }
                "direction" => {
                    settings.insert("_direction".into(), Value::String(value));
                }
                _ => {
                    let native = normalize::rename_back(SETTING_RENAMES, &key).unwrap_or(key.as_str());
                    if let Some(original) = component.attr(&key) {
                        settings.insert(native.to_string(), original.clone());
                    }
                }
            }
        }

        if !component.content.is_empty() {
            let key = match name {
                "code" | "shortcode" => "code",
                _ => "text",
            };
            let text = if name == "text" && !component.content.contains('<') {
                format!("<p>{}</p>", escape_html(&component.content))
            } else {
                component.content.clone()
            };
            settings.insert(key.into(), Value::String(text));
        }

        write_styles(&component.styles, &mut settings);
        settings
    }
}

/// Write styles into Bricks style settings. Styles without a setting go
/// to `_cssCustom`.
fn write_styles(styles: &StyleMap, settings: &mut Map<String, Value>) {
    let mut rest = styles.clone();
    for (property, key) in [(SpacingProperty::Padding, "_padding"), (SpacingProperty::Margin, "_margin")] {
        let spacing = extract_spacing(&rest, property);
        if spacing.is_empty() {
            continue;
        }
        let sides: Map<String, Value> = spacing
            .sides()
            .into_iter()
            .filter_map(|(side, value)| value.map(|v| (side.to_string(), Value::String(v.to_string()))))
            .collect();
        settings.insert(key.into(), Value::Object(sides));
        let name = property.as_str();
        rest.retain(|k, _| k != name && !k.starts_with(&format!("{}-", name)));
    }

    let mut typography = Map::new();
    let mut leftover = StyleMap::new();
    for (property, value) in rest {
        if property == "color" {
            typography.insert(property, json!({ "hex": value }));
        } else if TYPOGRAPHY.contains(&property.as_str()) {
            typography.insert(property, Value::String(value));
        } else if property == "background-color" {
            settings.insert("_background".into(), json!({ "color": { "hex": value } }));
        } else if let Some(key) = normalize::rename_back(SIZE_SETTINGS, &property) {
            settings.insert(key.into(), Value::String(value));
        } else {
            leftover.insert(property, value);
        }
    }
    if !typography.is_empty() {
        settings.insert("_typography".into(), Value::Object(typography));
    }
    if !leftover.is_empty() {
        settings.insert("_cssCustom".into(), Value::String(format!("%root% {{ {}; }}", to_inline(&leftover))));
    }
}

/// Render components as a Bricks clipboard document.
pub fn render_bricks(components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
    let pretty = ctx.options().pretty;
    let mut writer = Writer {
        ctx,
        ids: IdGenerator::new(ID),
        elements: Vec::new(),
    };
    writer.top_level(components);
    let document = json!({
        "content": writer.elements,
        "source": "bricksCopiedElements",
        "version": "1.9",
    });
    json::serialize(&document, pretty)
}

/// Parses Bricks JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct BricksParser;

impl Parser for BricksParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        parse_bricks(content)
    }

    fn has_signature(&self, content: &str) -> bool {
        json::looks_like_json(content)
            && (content.contains("bricksCopiedElements")
                || (content.contains("\"parent\"") && content.contains("\"name\"") && content.contains("\"settings\"")))
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "section", "container", "row", "column", "heading", "text", "button", "link", "image", "video",
            "audio", "icon", "card", "divider", "list", "list-item", "accordion", "accordion-item", "tabs",
            "tab", "code", "embed", "map", "counter", "progress", "social-icons", "social-link", "form",
            "menu", "post-list", "gallery", "carousel", "testimonial", "pricing-table", "alert", "countdown",
            "search", "team-member", "sidebar", "rating",
        ]
    }
}

/// Renders Bricks JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct BricksConverter;

impl Converter for BricksConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        render_bricks(components, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::traits::RenderOptions;

    const PAGE: &str = r##"{
        "source": "bricksCopiedElements",
        "content": [
            {"id": "sec001", "name": "section", "parent": 0, "children": ["row001"], "settings": {}},
            {"id": "row001", "name": "container", "parent": "sec001", "children": ["col002", "col001"],
             "settings": {"_direction": "row", "_padding": {"top": "17", "bottom": "17"}}},
            {"id": "col001", "name": "block", "parent": "row001", "children": ["btn001", "zzz001"],
             "settings": {"_width": "50%"}},
            {"id": "col002", "name": "block", "parent": "row001", "children": ["hd0001"],
             "settings": {"_width": "50%"}},
            {"id": "hd0001", "name": "heading", "parent": "col002", "children": [],
             "settings": {"text": "Hello", "tag": "h3", "_typography": {"font-size": "32", "color": {"hex": "#333333"}}}},
            {"id": "btn001", "name": "button", "parent": "col001", "children": [],
             "settings": {"text": "Buy", "style": "primary", "link": {"type": "external", "url": "https://x.test", "newTab": true}}},
            {"id": "zzz001", "name": "acme-widget", "parent": "col001", "children": [], "settings": {}}
        ]
    }"##;

    #[test]
    fn parses_flat_list_in_child_order() {
        let report = BricksParser.parse_report(PAGE);
        assert_eq!(report.skipped, 1);

        let section = &report.components[0];
        assert!(section.is("section"));
        let row = &section.children[0];
        assert!(row.is("row"));
        assert_eq!(row.styles.get("padding-top").map(String::as_str), Some("17px"));

        let first = &row.children[0];
        assert!(first.is("column"));
        assert_eq!(first.attr_str("width"), Some("50%"));
        let heading = &first.children[0];
        assert_eq!(heading.content, "Hello");
        assert_eq!(heading.attr("level"), Some(&Value::from(3)));
        assert_eq!(heading.styles.get("font-size").map(String::as_str), Some("32px"));
        assert_eq!(heading.styles.get("color").map(String::as_str), Some("#333333"));

        let button = &row.children[1].children[0];
        assert_eq!(button.content, "Buy");
        assert_eq!(button.attr_str("variant"), Some("primary"));
        assert_eq!(button.attr_str("url"), Some("https://x.test"));
        assert_eq!(button.attr_str("link_target"), Some("_blank"));
        assert_eq!(row.children[1].children.len(), 1);
    }

    #[test]
    fn survives_parent_cycles() {
        let content = r#"[
            {"id": "a", "name": "section", "parent": 0, "settings": {}},
            {"id": "b", "name": "heading", "parent": "c", "settings": {"text": "x"}},
            {"id": "c", "name": "heading", "parent": "b", "settings": {"text": "y"}}
        ]"#;
        let report = BricksParser.parse_report(content);
        assert_eq!(report.components.len(), 1);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn renders_flat_list_with_scaffolding() {
        let tree = vec![Component::new("row", "test")
            .with_child(Component::new("column", "test").with_attribute("width", "33.33%"))
            .with_child(Component::new("text", "test").with_content("Loose"))];
        let mut ctx = RenderContext::new("Bricks Builder", RenderOptions::default());
        let output = BricksConverter.render(&tree, &mut ctx).unwrap();
        let doc: Value = serde_json::from_str(&output).unwrap();
        let elements = doc["content"].as_array().unwrap();

        assert_eq!(elements[0]["name"], "section");
        assert_eq!(elements[0]["parent"], 0);
        assert_eq!(elements[1]["name"], "container");
        assert_eq!(elements[2]["name"], "container");
        assert_eq!(elements[2]["settings"]["_direction"], "row");
        assert_eq!(elements[3]["name"], "block");
        assert_eq!(elements[3]["settings"]["_width"], "33.33%");
        assert_eq!(elements[4]["name"], "block");
        assert_eq!(elements[5]["name"], "text-basic");
        assert_eq!(elements[5]["parent"], elements[4]["id"]);
        assert_eq!(elements[2]["children"], json!([elements[3]["id"], elements[4]["id"]]));
        assert!(ctx.stats().warnings.is_empty());
    }

    #[test]
    fn round_trips_through_bricks() {
        let tree = BricksParser.parse(PAGE);
        let mut ctx = RenderContext::new("Bricks Builder", RenderOptions::default());
        let output = BricksConverter.render(&tree, &mut ctx).unwrap();
        let reparsed = BricksParser.parse(&output);

        let row = &reparsed[0].children[0];
        assert!(row.is("row"));
        assert_eq!(row.children.len(), 2);
        assert_eq!(row.children[0].children[0].content, "Hello");
        assert_eq!(row.children[1].children[0].attr_str("link_target"), Some("_blank"));
    }

    #[test]
    fn keeps_unmapped_styles_as_custom_css() {
        let tree = vec![Component::new("section", "test").with_style("text-shadow", "none")];
        let mut ctx = RenderContext::new("Bricks Builder", RenderOptions::default());
        let output = BricksConverter.render(&tree, &mut ctx).unwrap();
        let reparsed = BricksParser.parse(&output);
        assert_eq!(reparsed[0].styles.get("text-shadow").map(String::as_str), Some("none"));
    }
}
