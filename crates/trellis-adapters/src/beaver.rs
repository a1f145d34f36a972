//! Beaver Builder adapter.
//!
//! Layout data is a flat map of nodes keyed by id. Each node has a `type`,
//! a `parent` and a `position`. Rows hold column groups, which hold
//! columns, which hold modules. Column groups carry no meaning of their own
//! and are dropped on read.

use serde_json::{json, Map, Value};
use trellis_core::markup::{escape_html, strip_tags};
use trellis_core::style::{extract_spacing, format_number, split_number_unit, to_inline, SpacingProperty};
use trellis_core::{tree, Component, StyleMap};

use crate::json::{self, Assembled, FlatNode, IdGenerator, Run};
use crate::normalize::{self, level_of, RenameTable};
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "beaver";

/// `settings.type` of module nodes to component kind.
static MODULE_KINDS: RenameTable = &[
    ("heading", "heading"),
    ("rich-text", "text"),
    ("button", "button"),
    ("button-group", "button-group"),
    ("photo", "image"),
    ("video", "video"),
    ("audio", "audio"),
    ("icon", "icon"),
    ("icon-group", "social-icons"),
    ("separator", "divider"),
    ("html", "html"),
    ("tabs", "tabs"),
    ("accordion", "accordion"),
    ("callout", "call-to-action"),
    ("cta", "call-to-action"),
    ("numbers", "counter"),
    ("pricing-table", "pricing-table"),
    ("slideshow", "carousel"),
    ("content-slider", "carousel"),
    ("gallery", "gallery"),
    ("map", "map"),
    ("testimonials", "testimonial"),
    ("countdown", "countdown"),
    ("contact-form", "form"),
    ("subscribe-form", "form"),
    ("menu", "menu"),
    ("post-grid", "post-list"),
    ("sidebar", "sidebar"),
    ("search", "search"),
    ("social-buttons", "social-icons"),
    ("list", "list"),
    ("box", "container"),
];

/// Setting holding each module's text payload.
static CONTENT_SETTINGS: RenameTable = &[
    ("heading", "heading"),
    ("rich-text", "text"),
    ("button", "text"),
    ("html", "html"),
    ("callout", "text"),
    ("cta", "text"),
    ("numbers", "before_number_text"),
];

static SETTING_RENAMES: RenameTable = &[
    ("class", "css_class"),
    ("id", "css_id"),
    ("link", "url"),
    ("link_target", "link_target"),
    ("align", "alignment"),
    ("photo_url", "image_url"),
    ("photo_src", "image_url"),
    ("icon", "icon"),
    ("number", "value"),
    ("title", "title"),
    ("address", "address"),
    ("style", "variant"),
    ("width", "content_width"),
    ("tag", "html_tag"),
];

/// Plain style settings. Colors are stored without the leading `#`.
static STYLE_SETTINGS: RenameTable = &[
    ("text_color", "color"),
    ("color", "color"),
    ("bg_color", "background-color"),
    ("border_color", "border-color"),
    ("max_content_width", "max-width"),
    ("min_height", "min-height"),
];

const COLOR_PROPERTIES: &[&str] = &["color", "background-color", "border-color"];

/// Repeaters: `(module, setting, child kind, title field, content field)`.
static REPEATERS: &[(&str, &str, &str, &str, &str)] = &[
    ("tabs", "items", "tab", "label", "content"),
    ("accordion", "items", "accordion-item", "label", "content"),
    ("list", "list_items", "list-item", "heading", "content"),
];

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

fn repeater(module: &str) -> Option<&'static (&'static str, &'static str, &'static str, &'static str, &'static str)> {
    REPEATERS.iter().find(|r| r.0 == module)
}

fn is_hex(value: &str) -> bool {
    (3..=8).contains(&value.len()) && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn read_color(value: &str) -> String {
    if is_hex(value) {
        format!("#{}", value)
    } else {
        value.to_string()
    }
}

fn write_color(value: &str) -> String {
    match value.strip_prefix('#') {
        Some(hex) if is_hex(hex) => hex.to_string(),
        _ => value.to_string(),
    }
}

fn read_styles(settings: &Value) -> StyleMap {
    let mut styles = StyleMap::new();
    for property in ["margin", "padding"] {
        let unit = tree::get_str(settings, &format!("{}_unit", property)).unwrap_or("px");
        for side in SIDES {
            if let Some(value) = json::text_setting(settings.get(format!("{}_{}", property, side))) {
                styles.insert(format!("{}-{}", property, side), json::with_unit(&value, unit));
            }
        }
    }
    if let Value::Object(map) = settings {
        for (key, value) in map {
            let Some(property) = normalize::rename(STYLE_SETTINGS, key) else {
                continue;
            };
            let Some(text) = value.as_str().filter(|s| !s.is_empty()) else {
                continue;
            };
            let css = if COLOR_PROPERTIES.contains(&property) {
                read_color(text)
            } else {
                let unit = tree::get_str(settings, &format!("{}_unit", key)).unwrap_or("px");
                json::with_unit(text, unit)
            };
            styles.insert(property.to_string(), css);
        }
    }
    if let Some(Value::Object(typography)) = settings.get("typography") {
        for (key, value) in typography {
            let property = key.replace('_', "-");
            let css = match value {
                Value::Object(_) => {
                    let length = json::text_setting(value.get("length"));
                    let unit = value.get("unit").and_then(Value::as_str).unwrap_or("");
                    length.map(|l| json::with_unit(&l, unit))
                }
                Value::String(s) if !s.is_empty() && s != "default" => Some(s.clone()),
                _ => None,
            };
            if let Some(css) = css {
                styles.insert(property, css);
            }
        }
    }
    styles
}

fn read_attributes(module: &str, settings: &Value) -> Map<String, Value> {
    let mut attributes = Map::new();
    let Value::Object(map) = settings else {
        return attributes;
    };
    for (key, value) in map {
        let Some(text) = json::text_setting(Some(value)).filter(|_| !value.is_object()) else {
            continue;
        };
        if key == "tag" && module == "heading" {
            if let Some(level) = normalize::heading_level(&text) {
                attributes.insert("level".into(), Value::from(level));
                continue;
            }
        }
        if key == "video_embed" || key == "embed_code" {
            if text.starts_with("http") {
                attributes.insert("video_url".into(), Value::String(text));
            }
            continue;
        }
        if let Some(universal) = normalize::rename(SETTING_RENAMES, key) {
            attributes.insert(universal.to_string(), normalize::normalize_value(universal, &text));
        }
    }
    attributes
}

fn convert(node: &FlatNode<'_>) -> Assembled {
    let data = node.data;
    let settings = data.get("settings").cloned().unwrap_or(Value::Object(Map::new()));
    let node_type = data.get("type").and_then(Value::as_str).unwrap_or_default();

    let (kind, original_type) = match node_type {
        "row" => ("row", "row"),
        "column-group" => return Assembled::Transparent,
        "column" => ("column", "column"),
        "module" => {
            let module = tree::get_str(&settings, "type").unwrap_or_default();
            match normalize::rename(MODULE_KINDS, module) {
                Some(kind) => (kind, module),
                None => {
                    tracing::debug!(module, "dropping unmapped beaver module");
                    return Assembled::Skip;
                }
            }
        }
        other => {
            tracing::debug!(node_type = other, "dropping unmapped beaver node");
            return Assembled::Skip;
        }
    };

    let mut attributes = read_attributes(original_type, &settings);
    if kind == "column" {
        attributes.remove("content_width");
        if let Some(percent) = settings.get("size").and_then(normalize::parse_percent) {
            attributes.insert("width".into(), Value::String(normalize::format_percent(percent)));
        }
    }
    let mut component = Component::new(kind, ID)
        .with_attributes(attributes)
        .with_styles(read_styles(&settings));

    if let Some(key) = normalize::rename(CONTENT_SETTINGS, original_type) {
        if let Some(text) = tree::get_str(&settings, key) {
            component.content = if original_type == "html" {
                text.to_string()
            } else {
                strip_tags(text)
            };
        }
    }

    if let Some((_, key, child_kind, title_key, content_key)) = repeater(original_type) {
        if let Some(Value::Array(items)) = settings.get(*key) {
            for item in items {
                let mut child = Component::new(*child_kind, ID);
                if let Some(title) = json::text_setting(item.get(*title_key)) {
                    child = if *child_kind == "list-item" {
                        child.with_content(title)
                    } else {
                        child.with_attribute("title", title)
                    };
                }
                if let Some(content) = json::text_setting(item.get(*content_key)) {
                    child = if child.content.is_empty() {
                        child.with_content(content)
                    } else {
                        child.with_attribute("description", content)
                    };
                }
                component.children.push(child.with_original(*child_kind, json::object_of(Some(item))));
            }
        }
    }

    Assembled::Component(component.with_original(original_type, json::object_of(Some(&settings))))
}

/// Parse a Beaver Builder layout.
pub fn parse_beaver(content: &str) -> ParseReport {
    let Some(document) = json::read_document(content) else {
        return ParseReport::empty();
    };
    let root = json::unwrap_document(&document, &["nodes", "data"]);
    let entries: Vec<(Option<&String>, &Value)> = match root {
        Value::Object(map) => map.iter().map(|(k, v)| (Some(k), v)).collect(),
        Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
        _ => return ParseReport::empty(),
    };

    let nodes: Vec<FlatNode<'_>> = entries
        .into_iter()
        .filter(|(_, value)| value.is_object())
        .enumerate()
        .filter_map(|(index, (key, value))| {
            let id = value
                .get("node")
                .and_then(json::id_string)
                .or_else(|| key.cloned())?;
            let parent = value.get("parent").and_then(json::id_string);
            let order = value
                .get("position")
                .and_then(|p| p.as_f64().or_else(|| p.as_str().and_then(|s| s.parse().ok())))
                .unwrap_or(index as f64);
            Some(FlatNode {
                id,
                parent,
                order,
                data: value,
            })
        })
        .collect();

    json::assemble(&nodes, convert)
}

/// Write styles into Beaver settings. Styles without a setting are
/// written as inline CSS on the node's `custom_css` field.
fn write_styles(styles: &StyleMap, settings: &mut Map<String, Value>) {
    let mut rest = styles.clone();
    for property in [SpacingProperty::Margin, SpacingProperty::Padding] {
        let spacing = extract_spacing(&rest, property);
        if spacing.is_empty() {
            continue;
        }
        let name = property.as_str();
        let mut unit: Option<String> = None;
        let mut sides = Vec::new();
        let mut consistent = true;
        for (side, value) in spacing.sides() {
            let Some(value) = value else { continue };
            match split_number_unit(value) {
                Some((number, side_unit)) => {
                    let side_unit = if side_unit.is_empty() { "px" } else { side_unit };
                    if unit.as_deref().is_some_and(|u| u != side_unit) && number != 0.0 {
                        consistent = false;
                    }
                    unit.get_or_insert_with(|| side_unit.to_string());
                    sides.push((side, format_number(number)));
                }
                None => consistent = false,
            }
        }
        if !consistent {
            continue;
        }
        for (side, number) in sides {
            settings.insert(format!("{}_{}", name, side), Value::String(number));
        }
        settings.insert(format!("{}_unit", name), Value::String(unit.unwrap_or_else(|| "px".into())));
        rest.retain(|k, _| k != name && !k.starts_with(&format!("{}-", name)));
    }

    let mut leftover = StyleMap::new();
    for (property, value) in rest {
        match normalize::rename_back(STYLE_SETTINGS, &property) {
            Some(key) if COLOR_PROPERTIES.contains(&property.as_str()) => {
                let key = if key == "color" { "text_color" } else { key };
                settings.insert(key.into(), Value::String(write_color(&value)));
            }
            Some(key) => {
                settings.insert(key.into(), Value::String(value));
            }
            None => {
                leftover.insert(property, value);
            }
        }
    }
    if !leftover.is_empty() {
        settings.insert("custom_css".into(), Value::String(format!("{};", to_inline(&leftover))));
    }
}

struct Writer<'c> {
    ctx: &'c mut RenderContext,
    ids: IdGenerator,
    nodes: Map<String, Value>,
}

impl Writer<'_> {
    fn push(&mut self, node_type: &str, parent: Option<&str>, position: usize, settings: Map<String, Value>) -> String {
        let id = self.ids.next_hex(13);
        self.nodes.insert(
            id.clone(),
            json!({
                "node": id,
                "type": node_type,
                "parent": parent,
                "position": position,
                "settings": settings,
            }),
        );
        id
    }

    fn top_level(&mut self, components: &[Component], position: &mut usize) {
        for run in json::runs(components, |c| matches!(c.kind().as_str(), "row" | "section" | "container")) {
            match run {
                Run::Node(row) if row.is("row") => {
                    self.row(row, None, *position);
                    *position += 1;
                }
                Run::Node(wrapper) => {
                    self.ctx.record(wrapper, true, "row");
                    let nested = wrapper
                        .children
                        .iter()
                        .any(|c| matches!(c.kind().as_str(), "row" | "section" | "container"));
                    if nested {
                        self.top_level(&wrapper.children, position);
                    } else {
                        let settings = self.settings(wrapper, None);
                        let row = self.push("row", None, *position, settings);
                        let items: Vec<&Component> = wrapper.children.iter().collect();
                        self.single_column_group(&row, 0, &items, false);
                        *position += 1;
                    }
                }
                Run::Stray(items) => {
                    let row = self.push("row", None, *position, Map::new());
                    self.single_column_group(&row, 0, &items, false);
                    *position += 1;
                }
            }
        }
    }

    fn single_column_group(&mut self, parent: &str, position: usize, items: &[&Component], nested: bool) {
        let group = self.push("column-group", Some(parent), position, Map::new());
        let column = self.push("column", Some(&group), 0, size_settings(100.0));
        self.modules(&column, items, nested);
    }

    fn row(&mut self, row: &Component, parent: Option<&str>, position: usize) {
        self.ctx.record(row, true, "row");
        let id = match parent {
            None => {
                let settings = self.settings(row, None);
                self.push("row", None, position, settings)
            }
            Some(parent) => parent.to_string(),
        };
        let group = self.push("column-group", Some(&id), if parent.is_some() { position } else { 0 }, Map::new());

        let runs = json::runs(&row.children, |c| c.is("column"));
        let share = 100.0 / runs.len().max(1) as f64;
        for (index, run) in runs.into_iter().enumerate() {
            match run {
                Run::Node(column) => {
                    self.ctx.record(column, true, "column");
                    let mut settings = self.settings(column, None);
                    settings.extend(size_settings(normalize::column_percent(column).unwrap_or(share)));
                    let id = self.push("column", Some(&group), index, settings);
                    let items: Vec<&Component> = column.children.iter().collect();
                    self.modules(&id, &items, parent.is_some());
                }
                Run::Stray(items) => {
                    let id = self.push("column", Some(&group), index, size_settings(share));
                    self.modules(&id, &items, parent.is_some());
                }
            }
        }
    }

    /// Modules of a column. A row inside a top-level column becomes a nested
    /// column group; deeper layout is flattened.
    fn modules(&mut self, column: &str, items: &[&Component], nested: bool) {
        let mut position = 0;
        let mut queue: Vec<&Component> = items.to_vec();
        queue.reverse();
        while let Some(item) = queue.pop() {
            match item.kind().as_str() {
                "row" if !nested => {
                    self.row(item, Some(column), position);
                    position += 1;
                }
                "row" | "column" | "section" | "container" => {
                    self.ctx.record(item, true, "");
                    queue.extend(item.children.iter().rev());
                }
                _ => {
                    let rest = self.module(item, column, position);
                    position += 1;
                    queue.extend(rest.into_iter().rev());
                }
            }
        }
    }

    fn module<'a>(&mut self, component: &'a Component, column: &str, position: usize) -> Vec<&'a Component> {
        let kind = component.kind().as_str();
        let (module, expressible) = match normalize::rename_back(MODULE_KINDS, kind) {
            Some(module) => (module, true),
            None => ("rich-text", false),
        };
        self.ctx.record(component, expressible, "rich-text");

        let mut settings = self.settings(component, Some(module));
        settings.insert("type".into(), json!(module));

        let mut rest = Vec::new();
        match repeater(module) {
            Some((_, key, _, title_key, content_key)) => {
                let items: Vec<Value> = component
                    .children
                    .iter()
                    .map(|child| {
                        self.ctx.record(child, true, "item");
                        let mut item = Map::new();
                        if child.is("list-item") {
                            item.insert(title_key.to_string(), Value::String(child.content.clone()));
                        } else {
                            item.insert(title_key.to_string(), Value::String(child.attr_text("title").unwrap_or_default()));
                            item.insert(content_key.to_string(), Value::String(child.content.clone()));
                        }
                        Value::Object(item)
                    })
                    .collect();
                settings.insert(key.to_string(), Value::Array(items));
            }
            None => rest.extend(component.children.iter()),
        }

        self.push("module", Some(column), position, settings);
        rest
    }

    fn settings(&self, component: &Component, module: Option<&str>) -> Map<String, Value> {
        let mut settings = Map::new();
        for (key, value) in normalize::scalar_attributes(&component.attributes) {
            match key.as_str() {
                "width" => {}
                "level" => {
                    settings.insert("tag".into(), Value::String(format!("h{}", level_of(component))));
                }
                "link_target" => {
                    let target = match component.attr_bool("link_target") {
                        Some(true) => "_blank".to_string(),
                        Some(false) => "_self".to_string(),
                        None => value,
                    };
                    settings.insert("link_target".into(), Value::String(target));
                }
                "image_url" => {
                    settings.insert("photo_source".into(), json!("url"));
                    settings.insert("photo_url".into(), Value::String(value));
                }
                "video_url" => {
                    settings.insert("video_type".into(), json!("embed"));
                    settings.insert("embed_code".into(), Value::String(value));
                }
                _ => {
                    if let Some(native) = normalize::rename_back(SETTING_RENAMES, &key) {
                        settings.insert(native.into(), Value::String(value));
                    }
                }
            }
        }

        if !component.content.is_empty() {
            let key = module.and_then(|m| normalize::rename(CONTENT_SETTINGS, m)).unwrap_or("text");
            let text = if key == "text" && module == Some("rich-text") && !component.content.contains('<') {
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

fn size_settings(percent: f64) -> Map<String, Value> {
    let mut settings = Map::new();
    let size = format_number(percent);
    let value = size.parse::<f64>().map(Value::from).unwrap_or(Value::String(size));
    settings.insert("size".into(), value);
    settings
}

/// Render components as a Beaver Builder node map.
pub fn render_beaver(components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
    let pretty = ctx.options().pretty;
    let mut writer = Writer {
        ctx,
        ids: IdGenerator::new(ID),
        nodes: Map::new(),
    };
    let mut position = 0;
    writer.top_level(components, &mut position);
    json::serialize(&Value::Object(writer.nodes), pretty)
}

/// Parses Beaver Builder JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct BeaverParser;

impl Parser for BeaverParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        parse_beaver(content)
    }

    fn has_signature(&self, content: &str) -> bool {
        json::looks_like_json(content)
            && content.contains("\"node\"")
            && (content.contains("\"column-group\"") || content.contains("\"module\""))
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "row", "column", "heading", "text", "button", "button-group", "image", "video", "audio", "icon",
            "social-icons", "divider", "html", "tabs", "tab", "accordion", "accordion-item", "call-to-action",
            "counter", "pricing-table", "carousel", "gallery", "map", "testimonial", "countdown", "form",
            "menu", "post-list", "sidebar", "search", "list", "list-item", "container",
        ]
    }
}

/// Renders Beaver Builder JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct BeaverConverter;

impl Converter for BeaverConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        render_beaver(components, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::traits::RenderOptions;

    const LAYOUT: &str = r##"{
        "r1": {"node": "r1", "type": "row", "parent": null, "position": 0,
               "settings": {"width": "full", "bg_color": "f5f5f5", "padding_top": "40", "padding_unit": "px"}},
        "g1": {"node": "g1", "type": "column-group", "parent": "r1", "position": 0, "settings": {}},
        "c2": {"node": "c2", "type": "column", "parent": "g1", "position": 1, "settings": {"size": 66.67}},
        "c1": {"node": "c1", "type": "column", "parent": "g1", "position": 0, "settings": {"size": 33.33}},
        "m1": {"node": "m1", "type": "module", "parent": "c1", "position": 0,
               "settings": {"type": "heading", "heading": "Hello", "tag": "h2", "color": "333333"}},
        "m2": {"node": "m2", "type": "module", "parent": "c2", "position": 1,
               "settings": {"type": "button", "text": "Go", "link": "https://x.test", "link_target": "_blank"}},
        "m3": {"node": "m3", "type": "module", "parent": "c2", "position": 0,
               "settings": {"type": "rich-text", "text": "<p>Intro</p>"}},
        "m4": {"node": "m4", "type": "module", "parent": "c2", "position": 2,
               "settings": {"type": "acme-slider"}}
    }"##;

    #[test]
    fn attaches_columns_to_rows_through_groups() {
        let report = BeaverParser.parse_report(LAYOUT);
        assert_eq!(report.skipped, 1);

        let row = &report.components[0];
        assert!(row.is("row"));
        assert_eq!(row.attr_str("content_width"), Some("full"));
        assert_eq!(row.styles.get("background-color").map(String::as_str), Some("#f5f5f5"));
        assert_eq!(row.styles.get("padding-top").map(String::as_str), Some("40px"));
        assert_eq!(row.children.len(), 2);

        let first = &row.children[0];
        assert!(first.is("column"));
        assert_eq!(first.attr_str("width"), Some("33.33%"));
        let heading = &first.children[0];
        assert_eq!(heading.content, "Hello");
        assert_eq!(heading.attr("level"), Some(&Value::from(2)));
        assert_eq!(heading.styles.get("color").map(String::as_str), Some("#333333"));

        let second = &row.children[1];
        assert_eq!(second.attr_str("width"), Some("66.67%"));
        assert_eq!(second.children[0].content, "Intro");
        let button = &second.children[1];
        assert_eq!(button.attr_str("url"), Some("https://x.test"));
        assert_eq!(button.attr_str("link_target"), Some("_blank"));
        assert_eq!(second.children.len(), 2);
    }

    #[test]
    fn empty_layout_yields_nothing() {
        assert!(BeaverParser.parse("{}").is_empty());
        assert!(BeaverParser.parse("").is_empty());
    }

    #[test]
    fn renders_row_group_column_module_chain() {
        let tree = vec![Component::new("button", "test").with_content("Go").with_attribute("url", "http://x")];
        let mut ctx = RenderContext::new("Beaver Builder", RenderOptions::default());
        let output = BeaverConverter.render(&tree, &mut ctx).unwrap();
        let nodes: Map<String, Value> = serde_json::from_str(&output).unwrap();

        let of_type = |t: &str| nodes.values().filter(|n| n["type"] == t).cloned().collect::<Vec<_>>();
        let rows = of_type("row");
        let groups = of_type("column-group");
        let columns = of_type("column");
        let modules = of_type("module");
        assert_eq!((rows.len(), groups.len(), columns.len(), modules.len()), (1, 1, 1, 1));
        assert_eq!(groups[0]["parent"], rows[0]["node"]);
        assert_eq!(columns[0]["parent"], groups[0]["node"]);
        assert_eq!(columns[0]["settings"]["size"], 100.0);
        assert_eq!(modules[0]["parent"], columns[0]["node"]);
        assert_eq!(modules[0]["settings"]["type"], "button");
        assert_eq!(modules[0]["settings"]["link"], "http://x");
        assert_eq!(modules[0]["settings"]["text"], "Go");
        assert_eq!(rows[0]["parent"], Value::Null);
    }

    #[test]
    fn round_trips_layout() {
        let tree = BeaverParser.parse(LAYOUT);
        let mut ctx = RenderContext::new("Beaver Builder", RenderOptions::default());
        let output = BeaverConverter.render(&tree, &mut ctx).unwrap();
        let reparsed = BeaverParser.parse(&output);

        let row = &reparsed[0];
        assert_eq!(row.children.len(), 2);
        assert_eq!(row.children[1].attr_str("width"), Some("66.67%"));
        assert_eq!(row.children[0].children[0].styles.get("color").map(String::as_str), Some("#333333"));
        assert_eq!(row.children[1].children[0].content, "Intro");
        assert_eq!(row.styles.get("padding-top").map(String::as_str), Some("40px"));
        assert!(ctx.stats().warnings.is_empty());
    }

    #[test]
    fn unknown_modules_fall_back_to_rich_text() {
        let tree = vec![Component::new("marquee", "test").with_content("Loop")];
        let mut ctx = RenderContext::new("Beaver Builder", RenderOptions::default());
        let output = BeaverConverter.render(&tree, &mut ctx).unwrap();
        assert!(output.contains("<p>Loop</p>"));
        assert_eq!(
            ctx.stats().warnings,
            vec!["marquee has no Beaver Builder equivalent; rendered as rich-text".to_string()]
        );
    }
}
