//! Elementor adapter.
//!
//! Documents are nested `elements` arrays of sections, columns, containers
//! and widgets. Rendering produces a template export
//! (`{"content": [...], "version": "0.4"}`) using the classic
//! section/column layout.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};
use trellis_core::markup::{escape_html, strip_tags};
use trellis_core::style::{parse_inline, to_inline, SpacingProperty};
use trellis_core::{Component, StyleMap};

use crate::json::{self, IdGenerator, Run};
use crate::normalize::{self, format_percent, level_of, parse_percent, RenameTable};
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "elementor";

/// `widgetType` to component kind.
static WIDGET_KINDS: RenameTable = &[
    ("heading", "heading"),
    ("text-editor", "text"),
    ("button", "button"),
    ("image", "image"),
    ("video", "video"),
    ("audio", "audio"),
    ("icon", "icon"),
    ("icon-box", "card"),
    ("image-box", "card"),
    ("divider", "divider"),
    ("spacer", "spacer"),
    ("google_maps", "map"),
    ("tabs", "tabs"),
    ("accordion", "accordion"),
    ("toggle", "toggle"),
    ("alert", "alert"),
    ("counter", "counter"),
    ("progress", "progress"),
    ("testimonial", "testimonial"),
    ("html", "html"),
    ("shortcode", "embed"),
    ("code-highlight", "code"),
    ("icon-list", "list"),
    ("social-icons", "social-icons"),
    ("image-gallery", "gallery"),
    ("image-carousel", "carousel"),
    ("star-rating", "rating"),
    ("blockquote", "quote"),
    ("form", "form"),
    ("nav-menu", "menu"),
    ("posts", "post-list"),
    ("call-to-action", "call-to-action"),
    ("price-table", "pricing-table"),
    ("countdown", "countdown"),
    ("search-form", "search"),
    ("sidebar", "sidebar"),
    ("menu-anchor", "anchor"),
];

/// Setting holding each widget's text payload.
static CONTENT_SETTINGS: RenameTable = &[
    ("heading", "title"),
    ("text-editor", "editor"),
    ("button", "text"),
    ("html", "html"),
    ("shortcode", "shortcode"),
    ("code-highlight", "code"),
    ("alert", "alert_description"),
    ("blockquote", "blockquote_content"),
    ("testimonial", "testimonial_content"),
    ("call-to-action", "description"),
    ("icon-box", "description_text"),
    ("image-box", "description_text"),
    ("progress", "title"),
    ("counter", "title"),
    ("star-rating", "title"),
    ("countdown", "title"),
];

/// Widgets whose content is kept verbatim.
const RAW_CONTENT: &[&str] = &["html", "shortcode", "code-highlight"];

static SETTING_RENAMES: RenameTable = &[
    ("_css_classes", "css_class"),
    ("css_classes", "css_class"),
    ("_element_id", "css_id"),
    ("align", "alignment"),
    ("button_type", "variant"),
    ("alert_type", "variant"),
    ("size", "size"),
    ("title_text", "title"),
    ("alert_title", "title"),
    ("testimonial_name", "author"),
    ("ending_number", "value"),
    ("starting_number", "start"),
    ("rating", "value"),
    ("youtube_url", "video_url"),
    ("vimeo_url", "video_url"),
    ("video_type", "provider"),
    ("address", "address"),
    ("caption", "caption"),
    ("html_tag", "html_tag"),
    ("layout", "layout"),
    ("content_width", "content_width"),
    ("flex_direction", "direction"),
    ("gap", "gap"),
    ("view", "view"),
    ("shape", "shape"),
];

/// Plain (non-size) style settings. Several keys read to the same property;
/// the writer picks one per widget.
static STYLE_SETTINGS: RenameTable = &[
    ("title_color", "color"),
    ("text_color", "color"),
    ("button_text_color", "color"),
    ("primary_color", "color"),
    ("background_color", "background-color"),
    ("_background_color", "background-color"),
    ("border_color", "border-color"),
    ("_border_color", "border-color"),
    ("border_border", "border-style"),
    ("_border_border", "border-style"),
];

/// Size-valued style settings (`{"unit": "px", "size": 10}`).
static SIZE_SETTINGS: RenameTable = &[
    ("width", "width"),
    ("min_height", "min-height"),
    ("_element_custom_width", "width"),
];

static DIMENSION_SETTINGS: &[(&str, SpacingProperty)] = &[
    ("margin", SpacingProperty::Margin),
    ("_margin", SpacingProperty::Margin),
    ("padding", SpacingProperty::Padding),
    ("_padding", SpacingProperty::Padding),
];

/// Repeater settings that hold a widget's children: `(widget, setting,
/// child kind, title field, content field)`.
static REPEATERS: &[(&str, &str, &str, &str, &str)] = &[
    ("tabs", "tabs", "tab", "tab_title", "tab_content"),
    ("accordion", "tabs", "accordion-item", "tab_title", "tab_content"),
    ("toggle", "tabs", "accordion-item", "tab_title", "tab_content"),
    ("icon-list", "icon_list", "list-item", "", "text"),
    ("social-icons", "social_icon_list", "social-link", "", ""),
    ("image-gallery", "gallery", "image", "", ""),
    ("image-carousel", "carousel", "image", "", ""),
];

const RESPONSIVE_SUFFIXES: &[&str] = &["_tablet", "_mobile", "_laptop", "_widescreen"];

static CUSTOM_CSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)selector\s*\{(.*?)\}").expect("Invalid elementor custom css regex"));

fn repeater(widget_type: &str) -> Option<&'static (&'static str, &'static str, &'static str, &'static str, &'static str)> {
    REPEATERS.iter().find(|r| r.0 == widget_type)
}

fn is_responsive(key: &str) -> bool {
    RESPONSIVE_SUFFIXES.iter().any(|s| key.ends_with(s))
}

/// Styles carried by an element's settings.
fn read_styles(settings: &Map<String, Value>) -> StyleMap {
    let mut styles = StyleMap::new();
    for (key, property) in DIMENSION_SETTINGS {
        if let Some(value) = settings.get(*key) {
            styles.extend(json::dimensions_to_styles(value, *property));
        }
    }
    for (key, value) in settings {
        if is_responsive(key) {
            continue;
        }
        if let Some(property) = normalize::rename(STYLE_SETTINGS, key) {
            if let Some(text) = value.as_str().filter(|s| !s.is_empty()) {
                styles.insert(property.to_string(), text.to_string());
            }
        } else if let Some(property) = normalize::rename(SIZE_SETTINGS, key) {
            if let Some(css) = json::size_to_css(value, "px") {
                styles.insert(property.to_string(), css);
            }
        } else if let Some(name) = key.strip_prefix("typography_").filter(|n| *n != "typography") {
            let css = match value {
                Value::Object(_) => json::size_to_css(value, "px"),
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                _ => None,
            };
            if let Some(css) = css {
                styles.insert(name.replace('_', "-"), css);
            }
        }
    }
    if let Some(css) = settings.get("custom_css").and_then(Value::as_str) {
        for caps in CUSTOM_CSS_RE.captures_iter(css) {
            styles.extend(parse_inline(&caps[1]));
        }
    }
    styles
}

/// Universal attributes carried by an element's settings.
fn read_attributes(widget_type: &str, settings: &Map<String, Value>) -> Map<String, Value> {
    let mut attributes = Map::new();
    for (key, value) in settings {
        if is_responsive(key) {
            continue;
        }
        match key.as_str() {
            "link" => {
                if let Some(url) = json::text_setting(value.get("url")) {
                    attributes.insert("url".into(), Value::String(url));
                }
                let external = match value.get("is_external") {
                    Some(Value::Bool(b)) => *b,
                    Some(Value::String(s)) => normalize::coerce_bool(s).unwrap_or(false),
                    _ => false,
                };
                if external {
                    attributes.insert("link_target".into(), Value::String("_blank".into()));
                }
            }
            "image" => {
                if let Some(url) = json::text_setting(value.get("url")) {
                    attributes.insert("image_url".into(), Value::String(url));
                }
            }
            "selected_icon" => {
                if let Some(icon) = json::text_setting(value.get("value")) {
                    attributes.insert("icon".into(), Value::String(icon));
                }
            }
            "header_size" => {
                if let Some(level) = value.as_str().and_then(normalize::heading_level) {
                    attributes.insert("level".into(), Value::from(level));
                }
            }
            "space" if widget_type == "spacer" => {
                if let Some(height) = json::size_to_css(value, "px") {
                    attributes.insert("height".into(), Value::String(height));
                }
            }
            "percent" if widget_type == "progress" => {
                if let Some(size) = value.get("size").filter(|s| !s.is_null()) {
                    attributes.insert("value".into(), size.clone());
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

/// One repeater entry as a child component.
fn repeater_item(item: &Value, kind: &str, title_key: &str, content_key: &str) -> Component {
    let mut component = Component::new(kind, ID);
    if !title_key.is_empty() {
        if let Some(title) = json::text_setting(item.get(title_key)) {
            component = component.with_attribute("title", title);
        }
    }
    if !content_key.is_empty() {
        if let Some(content) = json::text_setting(item.get(content_key)) {
            component = component.with_content(content);
        }
    }
    for key in ["link", "selected_icon", "social_icon"] {
        if let Some(Value::Object(_)) = item.get(key) {
            let field = if key == "link" { "url" } else { "value" };
            let attribute = if key == "link" { "url" } else { "icon" };
            if let Some(text) = json::text_setting(item.get(key).and_then(|v| v.get(field))) {
                component = component.with_attribute(attribute, text);
            }
        }
    }
    if kind == "image" {
        if let Some(url) = json::text_setting(item.get("url")) {
            component = component.with_attribute("image_url", url);
        }
    }
    component.with_original(kind, json::object_of(Some(item)))
}

struct ElementReader {
    skipped: usize,
}

impl ElementReader {
    fn elements(&mut self, value: Option<&Value>) -> Vec<Component> {
        match value {
            Some(Value::Array(items)) => items.iter().flat_map(|item| self.element(item)).collect(),
            _ => Vec::new(),
        }
    }

    fn element(&mut self, value: &Value) -> Vec<Component> {
        let children = self.elements(value.get("elements"));
        let settings = json::object_of(value.get("settings"));
        let el_type = value.get("elType").and_then(Value::as_str).unwrap_or_default();

        let (kind, original_type) = match el_type {
            "section" => ("row", "section"),
            "container" => ("container", "container"),
            "column" => ("column", "column"),
            "widget" => {
                let widget_type = value.get("widgetType").and_then(Value::as_str).unwrap_or_default();
                match normalize::rename(WIDGET_KINDS, widget_type) {
                    Some(kind) => (kind, widget_type),
                    None => {
                        tracing::debug!(widget = widget_type, "dropping unmapped elementor widget");
                        self.skipped += 1;
                        return children;
                    }
                }
            }
            other => {
                tracing::debug!(el_type = other, "dropping unmapped elementor element");
                self.skipped += 1;
                return children;
            }
        };

        let mut component = Component::new(kind, ID)
            .with_attributes(read_attributes(original_type, &settings))
            .with_styles(read_styles(&settings));

        if kind == "column" {
            let width = settings
                .get("_inline_size")
                .and_then(parse_percent)
                .or_else(|| settings.get("_column_size").and_then(parse_percent));
            if let Some(percent) = width {
                component = component.with_attribute("width", format_percent(percent));
            }
        }

        if let Some(key) = normalize::rename(CONTENT_SETTINGS, original_type) {
            if let Some(Value::String(text)) = settings.get(key) {
                component.content = if RAW_CONTENT.contains(&original_type) {
                    text.clone()
                } else {
                    strip_tags(text)
                };
            }
        }

        if let Some((_, key, child_kind, title_key, content_key)) = repeater(original_type) {
            if let Some(Value::Array(items)) = settings.get(*key) {
                component
                    .children
                    .extend(items.iter().map(|item| repeater_item(item, child_kind, title_key, content_key)));
            }
        }

        component.children.extend(children);
        vec![component.with_original(original_type, settings)]
    }
}

/// Parse an Elementor document.
pub fn parse_elementor(content: &str) -> ParseReport {
    let Some(document) = json::read_document(content) else {
        return ParseReport::empty();
    };
    let root = json::unwrap_document(&document, &["content", "elements"]);
    let mut reader = ElementReader { skipped: 0 };
    let components = match root {
        Value::Array(_) => reader.elements(Some(root)),
        Value::Object(_) if root.get("elType").is_some() => reader.element(root),
        _ => Vec::new(),
    };
    ParseReport {
        components,
        skipped: reader.skipped,
    }
}

/// Where an element sits, which decides the style setting names.
#[derive(Debug, Clone, Copy)]
enum Placement<'w> {
    Layout,
    Widget(&'w str),
}

/// Style settings for an element. Styles without a native setting are
/// written to `custom_css`.
fn style_settings(styles: &StyleMap, placement: Placement<'_>, settings: &mut Map<String, Value>) {
    let mut rest = styles.clone();
    for property in [SpacingProperty::Margin, SpacingProperty::Padding] {
        if let Some(dimensions) = json::styles_to_dimensions(&rest, property) {
            let name = property.as_str();
            let key = match placement {
                Placement::Widget(_) => format!("_{}", name),
                Placement::Layout => name.to_string(),
            };
            settings.insert(key, dimensions);
            rest.retain(|k, _| k != name && !k.starts_with(&format!("{}-", name)));
        }
    }

    let mut leftover = StyleMap::new();
    for (property, value) in rest {
        match property.as_str() {
            "color" => {
                let key = match placement {
                    Placement::Widget("heading") => "title_color",
                    Placement::Widget("button") => "button_text_color",
                    _ => "text_color",
                };
                settings.insert(key.into(), Value::String(value));
            }
            "background-color" => match placement {
                Placement::Widget("button") => {
                    settings.insert("background_color".into(), Value::String(value));
                }
                Placement::Widget(_) => {
                    settings.insert("_background_background".into(), json!("classic"));
                    settings.insert("_background_color".into(), Value::String(value));
                }
                Placement::Layout => {
                    settings.insert("background_background".into(), json!("classic"));
                    settings.insert("background_color".into(), Value::String(value));
                }
            },
            "font-size" | "line-height" | "letter-spacing" => {
                settings.insert("typography_typography".into(), json!("custom"));
                settings.insert(
                    format!("typography_{}", property.replace('-', "_")),
                    json::css_to_size(&value),
                );
            }
            "font-weight" | "font-family" | "text-transform" | "font-style" => {
                settings.insert("typography_typography".into(), json!("custom"));
                settings.insert(format!("typography_{}", property.replace('-', "_")), Value::String(value));
            }
            "border-color" | "border-style" => {
                let prefix = if matches!(placement, Placement::Widget(_)) { "_" } else { "" };
                let suffix = if property == "border-color" { "border_color" } else { "border_border" };
                settings.insert(format!("{}{}", prefix, suffix), Value::String(value));
            }
            "min-height" if matches!(placement, Placement::Layout) => {
                settings.insert("min_height".into(), json::css_to_size(&value));
            }
            _ => {
                leftover.insert(property, value);
            }
        }
    }
    if !leftover.is_empty() {
        settings.insert("custom_css".into(), Value::String(format!("selector {{ {}; }}", to_inline(&leftover))));
    }
}

struct Writer<'c> {
    ctx: &'c mut RenderContext,
    ids: IdGenerator,
}

impl Writer<'_> {
    fn node(&mut self, el_type: &str, widget_type: Option<&str>, settings: Map<String, Value>, elements: Vec<Value>, inner: bool) -> Value {
        let mut node = Map::new();
        node.insert("id".into(), Value::String(self.ids.next_hex(7)));
        node.insert("elType".into(), json!(el_type));
        node.insert("isInner".into(), Value::Bool(inner));
        node.insert("settings".into(), Value::Object(settings));
        node.insert("elements".into(), Value::Array(elements));
        if let Some(widget_type) = widget_type {
            node.insert("widgetType".into(), json!(widget_type));
        }
        Value::Object(node)
    }

    fn layout_settings(&self, component: &Component) -> Map<String, Value> {
        let mut settings = Map::new();
        self.attribute_settings(component, "", &mut settings);
        style_settings(&component.styles, Placement::Layout, &mut settings);
        settings
    }

    fn top_level(&mut self, components: &[Component]) -> Vec<Value> {
        let mut out = Vec::new();
        for run in json::runs(components, |c| matches!(c.kind().as_str(), "row" | "section" | "container")) {
            match run {
                Run::Node(row) if row.is("row") => out.push(self.section(row, false)),
                Run::Node(wrapper) => out.extend(self.wrapper(wrapper)),
                Run::Stray(items) => {
                    let column = self.synthetic_column(&items, 100.0, false);
                    out.push(self.node("section", None, Map::new(), vec![column], false));
                }
            }
        }
        out
    }

    /// A section or container at top level: its own section unless it
    /// holds nested layout, in which case it is transparent.
    fn wrapper(&mut self, component: &Component) -> Vec<Value> {
        self.ctx.record(component, true, "section");
        let nested = component
            .children
            .iter()
            .any(|c| matches!(c.kind().as_str(), "row" | "section" | "container"));
        if nested {
            return self.top_level(&component.children);
        }
        let items: Vec<&Component> = component.children.iter().collect();
        let column = self.synthetic_column(&items, 100.0, false);
        let settings = self.layout_settings(component);
        vec![self.node("section", None, settings, vec![column], false)]
    }

    fn section(&mut self, row: &Component, inner: bool) -> Value {
        self.ctx.record(row, true, "section");
        let settings = self.layout_settings(row);
        let runs = json::runs(&row.children, |c| c.is("column"));
        let share = 100.0 / runs.len().max(1) as f64;

        let columns: Vec<Value> = runs
            .into_iter()
            .map(|run| match run {
                Run::Node(column) => self.column(column, share, inner),
                Run::Stray(items) => self.synthetic_column(&items, share, inner),
            })
            .collect();
        self.node("section", None, settings, columns, inner)
    }

    fn column_settings(percent: f64, settings: &mut Map<String, Value>) {
        let rounded = percent.round();
        settings.insert("_column_size".into(), Value::from(rounded as i64));
        if (percent - rounded).abs() > f64::EPSILON {
            settings.insert(
                "_inline_size".into(),
                serde_json::Number::from_f64(percent).map(Value::Number).unwrap_or(Value::Null),
            );
        }
    }

    fn column(&mut self, column: &Component, share: f64, inner: bool) -> Value {
        self.ctx.record(column, true, "column");
        let mut settings = self.layout_settings(column);
        settings.remove("width");
        Self::column_settings(normalize::column_percent(column).unwrap_or(share), &mut settings);
        let items: Vec<&Component> = column.children.iter().collect();
        let elements = self.column_items(&items, inner);
        self.node("column", None, settings, elements, inner)
    }

    fn synthetic_column(&mut self, items: &[&Component], percent: f64, inner: bool) -> Value {
        let mut settings = Map::new();
        Self::column_settings(percent, &mut settings);
        let elements = self.column_items(items, inner);
        self.node("column", None, settings, elements, inner)
    }

    fn column_items(&mut self, items: &[&Component], inner: bool) -> Vec<Value> {
        let mut out = Vec::new();
        for item in items {
            match item.kind().as_str() {
                "row" if !inner => out.push(self.section(item, true)),
                "row" | "column" | "section" | "container" => {
                    self.ctx.record(item, true, "");
                    let children: Vec<&Component> = item.children.iter().collect();
                    out.extend(self.column_items(&children, inner));
                }
                _ => {
                    let (widget, rest) = self.widget(item);
                    out.push(widget);
                    out.extend(self.column_items(&rest, inner));
                }
            }
        }
        out
    }

    /// Render one widget. Children the widget cannot hold are returned to be
    /// written after it.
    fn widget<'a>(&mut self, component: &'a Component) -> (Value, Vec<&'a Component>) {
        let (widget_type, expressible) = match normalize::rename_back(WIDGET_KINDS, component.kind().as_str()) {
            Some(widget_type) => (widget_type, true),
            None => ("text-editor", false),
        };
        self.ctx.record(component, expressible, "text-editor");

        let mut settings = Map::new();
        self.attribute_settings(component, widget_type, &mut settings);
        if !component.content.is_empty() {
            let key = normalize::rename(CONTENT_SETTINGS, widget_type).unwrap_or("editor");
            let content = if key == "editor" && !component.content.contains('<') {
                format!("<p>{}</p>", escape_html(&component.content))
            } else {
                component.content.clone()
            };
            settings.insert(key.into(), Value::String(content));
        }
        style_settings(&component.styles, Placement::Widget(widget_type), &mut settings);

        let mut rest = Vec::new();
        match repeater(widget_type) {
            Some((_, key, _, title_key, content_key)) => {
                let items: Vec<Value> = component
                    .children
                    .iter()
                    .map(|child| self.repeater_entry(child, title_key, content_key))
                    .collect();
                settings.insert(key.to_string(), Value::Array(items));
            }
            None => rest.extend(component.children.iter()),
        }

        (self.node("widget", Some(widget_type), settings, Vec::new(), false), rest)
    }

    fn repeater_entry(&mut self, child: &Component, title_key: &str, content_key: &str) -> Value {
        self.ctx.record(child, true, "item");
        let mut entry = Map::new();
        entry.insert("_id".into(), Value::String(self.ids.next_hex(7)));
        if !title_key.is_empty() {
            let title = child.attr_text("title").unwrap_or_default();
            entry.insert(title_key.into(), Value::String(title));
        }
        if !content_key.is_empty() {
            let mut text = vec![child.content.clone()];
            for grandchild in &child.children {
                grandchild.walk(&mut |node, _| {
                    if !node.content.is_empty() {
                        text.push(node.content.clone());
                    }
                });
                let expressible = matches!(grandchild.kind().as_str(), "text" | "heading" | "html");
                self.ctx.record(grandchild, expressible, "text");
            }
            let joined: Vec<String> = text.into_iter().filter(|t| !t.is_empty()).collect();
            entry.insert(content_key.into(), Value::String(joined.join("\n")));
        }
        if let Some(url) = child.attr_text("url") {
            entry.insert("link".into(), json!({ "url": url, "is_external": "", "nofollow": "" }));
        }
        if let Some(icon) = child.attr_text("icon") {
            let key = if child.is("social-link") { "social_icon" } else { "selected_icon" };
            entry.insert(key.into(), json!({ "value": icon, "library": "fa-solid" }));
        }
        if let Some(url) = child.attr_text("image_url") {
            entry.insert("url".into(), Value::String(url));
            entry.insert("id".into(), json!(""));
        }
        Value::Object(entry)
    }

    fn attribute_settings(&self, component: &Component, widget_type: &str, settings: &mut Map<String, Value>) {
        let external = component.attr_str("link_target") == Some("_blank") || component.attr_bool("link_target") == Some(true);
        for (key, value) in normalize::scalar_attributes(&component.attributes) {
            match key.as_str() {
                "width" | "link_target" => {}
                "url" => {
                    settings.insert(
                        "link".into(),
                        json!({ "url": value, "is_external": if external { "on" } else { "" }, "nofollow": "" }),
                    );
                }
                "image_url" => {
                    settings.insert("image".into(), json!({ "url": value, "id": "" }));
                }
                "icon" => {
                    settings.insert("selected_icon".into(), json!({ "value": value, "library": "fa-solid" }));
                }
                "level" => {
                    settings.insert("header_size".into(), Value::String(format!("h{}", level_of(component))));
                }
                "height" if widget_type == "spacer" => {
                    settings.insert("space".into(), json::css_to_size(&value));
                }
                "value" if widget_type == "progress" => {
                    let size = value.parse::<f64>().map(Value::from).unwrap_or(Value::String(value));
                    settings.insert("percent".into(), json!({ "unit": "%", "size": size }));
                }
                "value" if widget_type == "star-rating" => {
                    settings.insert("rating".into(), Value::String(value));
                }
                "value" => {
                    settings.insert("ending_number".into(), Value::String(value));
                }
                "title" if widget_type == "alert" => {
                    settings.insert("alert_title".into(), Value::String(value));
                }
                "title" if widget_type == "icon-box" || widget_type == "image-box" => {
                    settings.insert("title_text".into(), Value::String(value));
                }
                "variant" if widget_type == "alert" => {
                    settings.insert("alert_type".into(), Value::String(value));
                }
                _ => {
                    let native = normalize::rename_back(SETTING_RENAMES, &key).unwrap_or(key.as_str());
                    if let Some(original) = component.attr(&key) {
                        settings.insert(native.to_string(), original.clone());
                    }
                }
            }
        }
    }
}

/// Render components as an Elementor template export.
pub fn render_elementor(components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
    let pretty = ctx.options().pretty;
    let mut writer = Writer {
        ctx,
        ids: IdGenerator::new(ID),
    };
    let content = writer.top_level(components);
    let document = json!({
        "version": "0.4",
        "title": "",
        "type": "page",
        "content": content,
    });
    json::serialize(&document, pretty)
}

/// Parses Elementor JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElementorParser;

impl Parser for ElementorParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        parse_elementor(content)
    }

    fn has_signature(&self, content: &str) -> bool {
        json::looks_like_json(content) && content.contains("\"elType\"")
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "row", "container", "column", "heading", "text", "button", "image", "video", "audio", "icon",
            "card", "divider", "spacer", "map", "tabs", "tab", "accordion", "accordion-item", "toggle",
            "alert", "counter", "progress", "testimonial", "html", "embed", "code", "list", "list-item",
            "social-icons", "social-link", "gallery", "carousel", "rating", "quote", "form", "menu",
            "post-list", "call-to-action", "pricing-table", "countdown", "search", "sidebar", "anchor",
        ]
    }
}

/// Renders Elementor JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElementorConverter;

impl Converter for ElementorConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        render_elementor(components, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::traits::RenderOptions;

    const PAGE: &str = r##"{
        "version": "0.4",
        "content": [{
            "id": "a1b2c3d",
            "elType": "section",
            "isInner": false,
            "settings": {"padding": {"unit": "px", "top": "40", "right": "0", "bottom": "40", "left": "0", "isLinked": false}},
            "elements": [{
                "id": "b2c3d4e",
                "elType": "column",
                "settings": {"_column_size": 50, "_inline_size": null},
                "elements": [
                    {"id": "c3d4e5f", "elType": "widget", "widgetType": "heading",
                     "settings": {"title": "Welcome", "header_size": "h1", "align": "center", "title_color": "#222222",
                                  "typography_typography": "custom", "typography_font_size": {"unit": "px", "size": 48}},
                     "elements": []},
                    {"id": "d4e5f6a", "elType": "widget", "widgetType": "button",
                     "settings": {"text": "Sign up", "link": {"url": "https://example.com", "is_external": "on", "nofollow": ""},
                                  "button_type": "success"},
                     "elements": []},
                    {"id": "e5f6a7b", "elType": "widget", "widgetType": "acme-slider", "settings": {}, "elements": []}
                ]
            }, {
                "id": "f6a7b8c",
                "elType": "column",
                "settings": {"_column_size": 50},
                "elements": [
                    {"id": "a7b8c9d", "elType": "widget", "widgetType": "tabs",
                     "settings": {"tabs": [{"_id": "t1", "tab_title": "One", "tab_content": "<p>First</p>"},
                                           {"_id": "t2", "tab_title": "Two", "tab_content": "Second"}]},
                     "elements": []}
                ]
            }]
        }]
    }"##;

    #[test]
    fn parses_sections_columns_and_widgets() {
        let report = ElementorParser.parse_report(PAGE);
        assert_eq!(report.skipped, 1);

        let row = &report.components[0];
        assert!(row.is("row"));
        assert_eq!(row.styles.get("padding-top").map(String::as_str), Some("40px"));
        assert_eq!(row.metadata().original_type.as_deref(), Some("section"));

        let column = &row.children[0];
        assert_eq!(column.attr_str("width"), Some("50%"));

        let heading = &column.children[0];
        assert!(heading.is("heading"));
        assert_eq!(heading.content, "Welcome");
        assert_eq!(heading.attr("level"), Some(&Value::from(1)));
        assert_eq!(heading.attr_str("alignment"), Some("center"));
        assert_eq!(heading.styles.get("color").map(String::as_str), Some("#222222"));
        assert_eq!(heading.styles.get("font-size").map(String::as_str), Some("48px"));
        assert!(heading.metadata().original_attributes.contains_key("header_size"));

        let button = &column.children[1];
        assert_eq!(button.content, "Sign up");
        assert_eq!(button.attr_str("url"), Some("https://example.com"));
        assert_eq!(button.attr_str("link_target"), Some("_blank"));
        assert_eq!(button.attr_str("variant"), Some("success"));
        assert_eq!(column.children.len(), 2);

        let tabs = &row.children[1].children[0];
        assert!(tabs.is("tabs"));
        assert_eq!(tabs.children.len(), 2);
        assert!(tabs.children[0].is("tab"));
        assert_eq!(tabs.children[0].attr_str("title"), Some("One"));
        assert_eq!(tabs.children[0].content, "First");
    }

    #[test]
    fn empty_and_malformed_input_yield_nothing() {
        assert!(ElementorParser.parse("").is_empty());
        assert!(ElementorParser.parse("{not json").is_empty());
        assert!(ElementorParser.parse("[]").is_empty());
    }

    #[test]
    fn deep_documents_are_rejected_without_overflow() {
        let nesting = 10_000;
        let content = format!(
            "{}[]{}",
            r#"[{"elType":"section","elements":"#.repeat(nesting),
            "}]".repeat(nesting),
        );
        let report = ElementorParser.parse_report(&content);
        assert!(report.components.is_empty());
    }

    #[test]
    fn detects_signature() {
        assert!(ElementorParser.has_signature(PAGE));
        assert!(!ElementorParser.has_signature("[vc_row][/vc_row]"));
    }

    fn render(components: &[Component]) -> (Value, RenderContext) {
        let mut ctx = RenderContext::new("Elementor", RenderOptions::default());
        let output = ElementorConverter.render(components, &mut ctx).unwrap();
        (serde_json::from_str(&output).unwrap(), ctx)
    }

    #[test]
    fn wraps_stray_widgets_in_section_and_column() {
        let button = Component::new("button", "test")
            .with_content("Go")
            .with_attribute("url", "http://x")
            .with_attribute("variant", "primary");
        let (doc, ctx) = render(&[button]);

        let section = &doc["content"][0];
        assert_eq!(section["elType"], "section");
        let column = &section["elements"][0];
        assert_eq!(column["elType"], "column");
        assert_eq!(column["settings"]["_column_size"], 100);
        let widget = &column["elements"][0];
        assert_eq!(widget["widgetType"], "button");
        assert_eq!(widget["settings"]["text"], "Go");
        assert_eq!(widget["settings"]["link"]["url"], "http://x");
        assert_eq!(widget["settings"]["button_type"], "primary");
        assert_eq!(widget["id"].as_str().map(str::len), Some(7));
        assert_eq!(ctx.stats().elements_processed, 1);
    }

    #[test]
    fn keeps_off_scale_spacing_as_dimensions() {
        let text = Component::new("text", "test")
            .with_content("Hi")
            .with_style("padding-top", "17px")
            .with_style("text-shadow", "none");
        let (doc, ctx) = render(&[text]);
        let widget = &doc["content"][0]["elements"][0]["elements"][0];
        assert_eq!(widget["widgetType"], "text-editor");
        assert_eq!(widget["settings"]["editor"], "<p>Hi</p>");
        assert_eq!(widget["settings"]["_padding"]["top"], "17");
        assert_eq!(widget["settings"]["custom_css"], "selector { text-shadow: none; }");
        assert!(ctx.stats().warnings.is_empty());
    }

    #[test]
    fn unknown_kinds_fall_back_to_text_editor() {
        let slider = Component::new("slider-thing", "test").with_content("Slides");
        let (doc, ctx) = render(&[slider]);
        let widget = &doc["content"][0]["elements"][0]["elements"][0];
        assert_eq!(widget["widgetType"], "text-editor");
        assert_eq!(widget["settings"]["editor"], "<p>Slides</p>");
        assert_eq!(
            ctx.stats().warnings,
            vec!["slider-thing has no Elementor equivalent; rendered as text-editor".to_string()]
        );
    }

    #[test]
    fn round_trips_layout_and_repeaters() {
        let tree = ElementorParser.parse(PAGE);
        let mut ctx = RenderContext::new("Elementor", RenderOptions { pretty: true, ..Default::default() });
        let output = ElementorConverter.render(&tree, &mut ctx).unwrap();
        assert!(output.contains("\n  "));

        let reparsed = ElementorParser.parse(&output);
        let row = &reparsed[0];
        assert!(row.is("row"));
        assert_eq!(row.children.len(), 2);
        assert_eq!(row.children[0].attr_str("width"), Some("50%"));
        assert_eq!(row.children[0].children[0].content, "Welcome");
        assert_eq!(row.children[0].children[0].styles.get("font-size").map(String::as_str), Some("48px"));
        let tabs = &row.children[1].children[0];
        assert_eq!(tabs.children[1].attr_str("title"), Some("Two"));
        assert_eq!(tabs.children[1].content, "Second");
    }

    #[test]
    fn nests_inner_sections_once() {
        let inner = Component::new("row", "test").with_child(
            Component::new("column", "test").with_child(
                Component::new("row", "test")
                    .with_child(Component::new("column", "test").with_child(Component::new("text", "test").with_content("deep"))),
            ),
        );
        let outer = Component::new("row", "test").with_child(Component::new("column", "test").with_child(inner));
        let (doc, _) = render(&[outer]);
        let inner_section = &doc["content"][0]["elements"][0]["elements"][0];
        assert_eq!(inner_section["elType"], "section");
        assert_eq!(inner_section["isInner"], true);
        let widget = &inner_section["elements"][0]["elements"][0];
        assert_eq!(widget["widgetType"], "text-editor");
        assert_eq!(widget["settings"]["editor"], "<p>deep</p>");
    }
}
