//! WordPress block-comment markup.
//!
//! Blocks are delimited by `<!-- wp:name {json} -->` / `<!-- /wp:name -->`
//! comments (or a single `<!-- wp:name {json} /-->`), with the rendered HTML
//! between them. Attributes live in the JSON; text lives in the HTML.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use serde_json::{Map, Value};
use trellis_core::markup::{self, escape_attribute, escape_html, parse_document, strip_tags};
use trellis_core::style::{extract_spacing, parse_inline, to_inline, SpacingProperty};
use trellis_core::tree::{self, KeyCase};
use trellis_core::{Component, StyleMap};

use crate::normalize::{self, RenameTable};
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext, MAX_DEPTH};

pub const ID: &str = "gutenberg";

/// Block name (without the `core/` namespace) -> kind. The first block
/// listed for a kind is used when rendering.
static BLOCK_KINDS: RenameTable = &[
    ("paragraph", "text"),
    ("heading", "heading"),
    ("list", "list"),
    ("list-item", "list-item"),
    ("quote", "quote"),
    ("pullquote", "quote"),
    ("image", "image"),
    ("gallery", "gallery"),
    ("video", "video"),
    ("audio", "audio"),
    ("file", "file"),
    ("buttons", "button-group"),
    ("button", "button"),
    ("columns", "row"),
    ("column", "column"),
    ("group", "container"),
    ("cover", "section"),
    ("media-text", "container"),
    ("separator", "divider"),
    ("spacer", "spacer"),
    ("code", "code"),
    ("preformatted", "code"),
    ("verse", "text"),
    ("html", "html"),
    ("shortcode", "html"),
    ("freeform", "html"),
    ("table", "table"),
    ("embed", "embed"),
    ("details", "toggle"),
    ("social-links", "social-icons"),
    ("social-link", "social-link"),
    ("navigation", "nav"),
    ("search", "search"),
    ("latest-posts", "post-list"),
    ("query", "post-list"),
    ("post-title", "post-title"),
    ("site-title", "heading"),
    ("site-logo", "image"),
];

/// Block attribute (snake case) -> universal attribute.
static ATTRIBUTE_RENAMES: RenameTable = &[
    ("text_align", "alignment"),
    ("class_name", "css_class"),
    ("anchor", "css_id"),
    ("link_target", "link_target"),
    ("background_color", "background_color"),
    ("text_color", "text_color"),
    ("font_size", "font_size"),
    ("button_text", "button_text"),
    ("tag_name", "tag_name"),
];

/// Paths inside the block `style` object and the CSS properties they set.
static STYLE_PATHS: RenameTable = &[
    ("spacing.padding.top", "padding-top"),
    ("spacing.padding.right", "padding-right"),
    ("spacing.padding.bottom", "padding-bottom"),
    ("spacing.padding.left", "padding-left"),
    ("spacing.margin.top", "margin-top"),
    ("spacing.margin.right", "margin-right"),
    ("spacing.margin.bottom", "margin-bottom"),
    ("spacing.margin.left", "margin-left"),
    ("spacing.block_gap", "gap"),
    ("color.background", "background-color"),
    ("color.text", "color"),
    ("color.gradient", "background"),
    ("typography.font_size", "font-size"),
    ("typography.line_height", "line-height"),
    ("typography.font_weight", "font-weight"),
    ("typography.font_style", "font-style"),
    ("typography.letter_spacing", "letter-spacing"),
    ("typography.text_transform", "text-transform"),
    ("border.radius", "border-radius"),
    ("border.width", "border-width"),
    ("border.color", "border-color"),
    ("border.style", "border-style"),
    ("dimensions.min_height", "min-height"),
];

/// Blocks whose inner HTML is their text.
const TEXT_BLOCKS: &[&str] = &[
    "paragraph", "heading", "list-item", "button", "quote", "pullquote", "code", "preformatted",
    "verse", "details",
];

/// Blocks whose inner HTML is kept verbatim.
const RAW_BLOCKS: &[&str] = &["html", "shortcode", "freeform", "table"];

/// Blocks serialised without inner HTML.
const VOID_BLOCKS: &[&str] = &[
    "search", "navigation", "latest-posts", "query", "post-title", "site-title", "site-logo",
    "social-link",
];

/// Attributes carried by the HTML rather than the block comment.
const HTML_ATTRIBUTES: &[&str] = &[
    "url", "image_url", "alt_text", "link_target", "video_url", "audio_url", "grid", "utilities",
    "title",
];

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s+(/)?wp:([a-z][a-z0-9_-]*(?:/[a-z][a-z0-9_-]*)?)\s+(?:(\{.*?\})\s+)?(/)?-->")
        .expect("Invalid block comment regex")
});

/// `var:preset|spacing|50` -> `var(--wp--preset--spacing--50)`.
pub fn preset_to_css(value: &str) -> String {
    match value.strip_prefix("var:") {
        Some(preset) => format!("var(--wp--{})", preset.replace('|', "--")),
        None => value.to_string(),
    }
}

/// Inverse of `preset_to_css`.
pub fn css_to_preset(value: &str) -> String {
    match value
        .strip_prefix("var(--wp--")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(preset) => format!("var:{}", preset.replace("--", "|")),
        None => value.to_string(),
    }
}

/// CSS declarations from a block `style` object.
pub fn style_object_to_css(style: &Value) -> StyleMap {
    let snake = tree::transform_keys(style, KeyCase::Snake);
    let mut styles = StyleMap::new();
    for (path, value) in tree::flatten(&snake) {
        let text = match &value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        match normalize::rename(STYLE_PATHS, &path) {
            Some(property) => {
                styles.insert(property.to_string(), preset_to_css(&text));
            }
            None => tracing::debug!(path = %path, "ignoring unmapped block style"),
        }
    }
    styles
}

/// Split styles into a block `style` object and leftover inline CSS.
pub fn css_to_style_object(styles: &StyleMap) -> (Value, StyleMap) {
    let mut expanded = StyleMap::new();
    for property in [SpacingProperty::Margin, SpacingProperty::Padding] {
        if styles.contains_key(property.as_str()) {
            expanded.extend(extract_spacing(styles, property).to_longhands(property));
        }
    }
    for (property, value) in styles {
        if property != "margin" && property != "padding" {
            expanded.insert(property.clone(), value.clone());
        }
    }

    let mut object = Value::Object(Map::new());
    let mut leftover = StyleMap::new();
    for (property, value) in expanded {
        match normalize::rename_back(STYLE_PATHS, &property) {
            Some(path) => tree::set(&mut object, path, Value::String(css_to_preset(&value))),
            None => {
                leftover.insert(property, value);
            }
        }
    }
    (tree::transform_keys(&object, KeyCase::Camel), leftover)
}

fn short_name(name: &str) -> &str {
    name.strip_prefix("core/").unwrap_or(name)
}

struct Frame {
    name: String,
    attrs: Value,
    html: String,
    children: Vec<Component>,
}

struct BlockParser {
    stack: Vec<Frame>,
    roots: Vec<Component>,
    skipped: usize,
    /// Open blocks past the depth limit, dropped until their close.
    overflow: usize,
}

impl BlockParser {
    fn attach(&mut self, components: Vec<Component>) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.extend(components),
            None => self.roots.extend(components),
        }
    }

    fn finish(&mut self, frame: Frame) {
        let Frame {
            name,
            attrs,
            html,
            children,
        } = frame;
        match block_component(&name, &attrs, &html, children) {
            Ok(component) => self.attach(vec![component]),
            Err(children) => {
                self.skipped += 1;
                tracing::debug!(block = %name, "dropping unmapped block");
                self.attach(children);
            }
        }
    }
}

/// Parse block markup into components.
pub fn parse_blocks(content: &str) -> ParseReport {
    if content.trim().is_empty() {
        return ParseReport::empty();
    }

    let mut parser = BlockParser {
        stack: Vec::new(),
        roots: Vec::new(),
        skipped: 0,
        overflow: 0,
    };
    let mut pos = 0;

    for caps in BLOCK_RE.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if let Some(top) = parser.stack.last_mut() {
            top.html.push_str(&content[pos..whole.start()]);
        }
        pos = whole.end();

        let name = name.as_str().to_string();
        let void = caps.get(4).is_some();
        if caps.get(1).is_some() {
            if parser.overflow > 0 {
                parser.overflow -= 1;
                continue;
            }
            let Some(depth) = parser.stack.iter().rposition(|f| f.name == name) else {
                continue;
            };
            while parser.stack.len() > depth {
                if let Some(frame) = parser.stack.pop() {
                    parser.finish(frame);
                }
            }
            continue;
        }

        if parser.overflow > 0 || parser.stack.len() >= MAX_DEPTH {
            tracing::debug!(block = %name, "dropping block nested too deeply");
            parser.skipped += 1;
            if !void {
                parser.overflow += 1;
            }
            continue;
        }

        let attrs = match caps.get(3) {
            Some(json) => serde_json::from_str(json.as_str()).unwrap_or_else(|e| {
                tracing::debug!(block = %name, error = %e, "invalid block attributes");
                Value::Null
            }),
            None => Value::Null,
        };
        let frame = Frame {
            name,
            attrs,
            html: String::new(),
            children: Vec::new(),
        };
        if void {
            parser.finish(frame);
        } else {
            parser.stack.push(frame);
        }
    }

    if let Some(top) = parser.stack.last_mut() {
        top.html.push_str(&content[pos..]);
    }
    while let Some(frame) = parser.stack.pop() {
        parser.finish(frame);
    }

    ParseReport {
        components: parser.roots,
        skipped: parser.skipped,
    }
}

fn first_descendant<'a>(root: &ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    if root.value().name() == tag {
        return Some(*root);
    }
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

/// Build a component for one block. Unmapped blocks hand back their
/// children for lifting.
fn block_component(
    name: &str,
    attrs: &Value,
    html: &str,
    children: Vec<Component>,
) -> Result<Component, Vec<Component>> {
    let short = short_name(name);
    let Some(mut kind) = normalize::rename(BLOCK_KINDS, short) else {
        return Err(children);
    };

    let mut attributes = Map::new();
    let mut styles = StyleMap::new();
    if let Value::Object(map) = tree::transform_keys(attrs, KeyCase::Snake) {
        for (key, value) in map {
            if key == "style" {
                styles.extend(style_object_to_css(&value));
                continue;
            }
            let universal = normalize::rename(ATTRIBUTE_RENAMES, &key).unwrap_or(key.as_str());
            attributes.insert(universal.to_string(), value);
        }
    }

    if short == "group" && attributes.get("tag_name").and_then(Value::as_str) == Some("section") {
        kind = "section";
        attributes.remove("tag_name");
    }

    let document = parse_document(html);
    let roots: Vec<ElementRef<'_>> = document.as_ref().map(|d| d.root_elements()).unwrap_or_default();
    let root = roots.first();

    if let Some(style) = root.and_then(|r| r.value().attr("style")) {
        for (property, value) in parse_inline(style) {
            styles.entry(property).or_insert(value);
        }
        if short == "column" {
            styles.remove("flex-basis");
        }
    }

    let mut component = Component::new(kind, ID);
    let original = match attrs {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    if RAW_BLOCKS.contains(&short) {
        component.content = html.trim().to_string();
    } else if TEXT_BLOCKS.contains(&short) && children.is_empty() {
        component.content = match (short, root) {
            ("details", Some(root)) => {
                if let Some(summary) = first_descendant(root, "summary") {
                    attributes.insert("title".into(), Value::String(markup::text_of(&summary)));
                }
                root.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() != "summary")
                    .map(|e| markup::text_of(&e))
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string()
            }
            _ => strip_tags(html),
        };
    } else if short == "details" {
        if let Some(summary) = root.and_then(|r| first_descendant(r, "summary")) {
            attributes.insert("title".into(), Value::String(markup::text_of(&summary)));
        }
    }

    match kind {
        "heading" => {
            let level = attributes
                .get("level")
                .and_then(Value::as_u64)
                .or_else(|| root.and_then(|r| normalize::heading_level(r.value().name())))
                .unwrap_or(2);
            attributes.insert("level".into(), Value::from(level));
        }
        "button" => {
            if let Some(anchor) = root.and_then(|r| first_descendant(r, "a")) {
                if let Some(href) = anchor.value().attr("href") {
                    attributes.insert("url".into(), Value::String(href.to_string()));
                }
                if let Some(target) = anchor.value().attr("target") {
                    attributes.insert("link_target".into(), Value::String(target.to_string()));
                }
            }
        }
        "image" => {
            if let Some(url) = attributes.remove("url") {
                attributes.insert("image_url".into(), url);
            }
            if let Some(root) = root {
                if let Some(img) = first_descendant(root, "img") {
                    if let Some(src) = img.value().attr("src") {
                        attributes.insert("image_url".into(), Value::String(src.to_string()));
                    }
                    if let Some(alt) = img.value().attr("alt").filter(|a| !a.is_empty()) {
                        attributes.insert("alt_text".into(), Value::String(alt.to_string()));
                    }
                }
                if let Some(href) = first_descendant(root, "a").and_then(|a| a.value().attr("href").map(String::from)) {
                    attributes.insert("url".into(), Value::String(href));
                }
            }
        }
        "video" | "audio" => {
            let tag = if kind == "video" { "video" } else { "audio" };
            if let Some(src) = root
                .and_then(|r| first_descendant(r, tag))
                .and_then(|m| m.value().attr("src").map(String::from))
            {
                attributes.insert(format!("{}_url", tag), Value::String(src));
            }
        }
        "list" => {
            if let Some(root) = root {
                if root.value().name() == "ol" {
                    attributes.insert("ordered".into(), Value::Bool(true));
                }
            }
        }
        _ => {}
    }

    let mut children = children;
    if kind == "list" && children.is_empty() {
        if let Some(root) = root {
            children = root
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == "li")
                .map(|li| Component::new("list-item", ID).with_content(markup::text_of(&li)))
                .collect();
        }
    }

    component.attributes = attributes;
    component.styles = styles;
    component.children = children;
    Ok(component.with_original(name, original))
}

/// Parses block markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct GutenbergParser;

impl Parser for GutenbergParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        parse_blocks(content)
    }

    fn has_signature(&self, content: &str) -> bool {
        static SIGNATURE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"<!--\s+wp:[a-z]").expect("Invalid block signature regex"));
        SIGNATURE.is_match(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "text", "heading", "list", "list-item", "quote", "image", "gallery", "video", "audio",
            "file", "button-group", "button", "row", "column", "container", "section", "divider",
            "spacer", "code", "html", "table", "embed", "toggle", "social-icons", "social-link",
            "nav", "search", "post-list", "post-title",
        ]
    }
}

/// Renders block markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct GutenbergConverter;

/// Block used to render a kind, with whether the kind is expressible.
fn block_for(component: &Component) -> (&'static str, bool) {
    match component.kind().as_str() {
        "section" => ("group", true),
        "accordion-item" => ("details", true),
        kind => match normalize::rename_back(BLOCK_KINDS, kind) {
            Some(block) => (block, true),
            None if !component.children.is_empty() || normalize::is_container_kind(kind) => ("group", false),
            None => ("paragraph", false),
        },
    }
}

fn block_attributes(component: &Component, block: &str, leftover: &mut StyleMap) -> Map<String, Value> {
    let mut attrs = Map::new();

    for (key, value) in &component.attributes {
        if HTML_ATTRIBUTES.contains(&key.as_str()) || !(value.is_string() || value.is_boolean() || value.is_number()) {
            continue;
        }
        if key == "level" && block != "heading" {
            continue;
        }
        let name = normalize::rename_back(ATTRIBUTE_RENAMES, key).unwrap_or(key.as_str());
        attrs.insert(tree::convert_key(name, KeyCase::Camel), value.clone());
    }

    match block {
        "heading" => {
            let level = normalize::level_of(component);
            if level == 2 {
                attrs.remove("level");
            } else {
                attrs.insert("level".into(), Value::from(level));
            }
        }
        "group" if component.is("section") => {
            attrs.insert("tagName".into(), Value::String("section".into()));
        }
        "column" => {
            attrs.remove("width");
            if let Some(percent) = normalize::column_percent(component) {
                attrs.insert("width".into(), Value::String(normalize::format_percent(percent)));
            }
        }
        "embed" | "social-link" => {
            if let Some(url) = component.attr_str("url") {
                attrs.insert("url".into(), Value::String(url.to_string()));
            }
        }
        _ => {}
    }

    let (style, rest) = css_to_style_object(&component.styles);
    if style.as_object().is_some_and(|o| !o.is_empty()) {
        attrs.insert("style".into(), style);
    }
    leftover.extend(rest);
    attrs
}

fn opening_comment(block: &str, attrs: &Map<String, Value>, void: bool) -> Result<String, ConvertError> {
    let close = if void { " /" } else { "" };
    if attrs.is_empty() {
        Ok(format!("<!-- wp:{}{} -->", block, close))
    } else {
        let json = serde_json::to_string(attrs)?;
        Ok(format!("<!-- wp:{} {}{} -->", block, json, close))
    }
}

fn class_attr(base: &str, component: &Component) -> String {
    let mut classes: Vec<String> = Vec::new();
    if !base.is_empty() {
        classes.push(base.to_string());
    }
    if let Some(align) = component.attr_str("alignment") {
        classes.push(format!("has-text-align-{}", align));
    }
    if let Some(extra) = component.attr_str("css_class") {
        classes.push(extra.to_string());
    }
    if classes.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, escape_attribute(&classes.join(" ")))
    }
}

fn style_attr(styles: &StyleMap) -> String {
    if styles.is_empty() {
        String::new()
    } else {
        format!(r#" style="{}""#, escape_attribute(&to_inline(styles)))
    }
}

impl GutenbergConverter {
    fn render_blocks(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        let separator = if ctx.options().pretty { "\n\n" } else { "\n" };
        let mut blocks = Vec::new();
        let mut stray_buttons: Vec<&Component> = Vec::new();

        for component in components {
            if component.is("button") {
                stray_buttons.push(component);
                continue;
            }
            if !stray_buttons.is_empty() {
                blocks.push(self.button_group(&std::mem::take(&mut stray_buttons), ctx)?);
            }
            if ctx.options().include_comments {
                if let Some(original) = &component.metadata().original_type {
                    blocks.push(format!(
                        "<!-- {} from {} -->",
                        original,
                        component.metadata().source_framework()
                    ));
                }
            }
            blocks.push(self.render_block(component, ctx)?);
        }
        if !stray_buttons.is_empty() {
            blocks.push(self.button_group(&stray_buttons, ctx)?);
        }

        Ok(blocks.join(separator))
    }

    /// Buttons must sit inside a `buttons` block.
    fn button_group(&self, buttons: &[&Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        let inner = buttons
            .iter()
            .map(|b| self.render_block(b, ctx))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n");
        Ok(format!(
            "<!-- wp:buttons -->\n<div class=\"wp-block-buttons\">{}</div>\n<!-- /wp:buttons -->",
            inner
        ))
    }

    fn render_block(&self, component: &Component, ctx: &mut RenderContext) -> Result<String, ConvertError> {
        let (block, expressible) = block_for(component);
        ctx.record(component, expressible, block);

        let mut leftover = StyleMap::new();
        let attrs = block_attributes(component, block, &mut leftover);

        if VOID_BLOCKS.contains(&block) {
            return opening_comment(block, &attrs, true);
        }

        let inner = if block == "buttons" {
            self.render_children(&component.children, ctx, "\n")?
        } else {
            self.render_blocks(&component.children, ctx)?
        };
        let text = escape_html(&component.content);
        let style = style_attr(&leftover);

        let html = match block {
            "paragraph" => format!("<p{}{}>{}</p>", class_attr("", component), style, text),
            "heading" => {
                let level = normalize::level_of(component);
                format!(
                    "<h{}{}{}>{}</h{}>",
                    level,
                    class_attr("wp-block-heading", component),
                    style,
                    text,
                    level
                )
            }
            "list" => {
                let tag = if component.attr_bool("ordered") == Some(true) { "ol" } else { "ul" };
                format!("<{}{}{}>{}</{}>", tag, class_attr("wp-block-list", component), style, inner, tag)
            }
            "list-item" => format!("<li>{}{}</li>", text, inner),
            "quote" => {
                let body = if inner.is_empty() { format!("<p>{}</p>", text) } else { inner };
                format!("<blockquote{}{}>{}</blockquote>", class_attr("wp-block-quote", component), style, body)
            }
            "code" => format!("<pre{}{}><code>{}</code></pre>", class_attr("wp-block-code", component), style, text),
            "html" => component.content.clone(),
            "table" => format!("<figure{}>{}</figure>", class_attr("wp-block-table", component), component.content),
            "image" => {
                let src = component.attr_str("image_url").unwrap_or_default();
                let alt = component.attr_str("alt_text").unwrap_or_default();
                let img = format!(r#"<img src="{}" alt="{}"/>"#, escape_attribute(src), escape_attribute(alt));
                let img = match component.attr_str("url") {
                    Some(href) => format!(r#"<a href="{}">{}</a>"#, escape_attribute(href), img),
                    None => img,
                };
                format!("<figure{}{}>{}</figure>", class_attr("wp-block-image", component), style, img)
            }
            "video" | "audio" => {
                let src = component.attr_str(&format!("{}_url", block)).unwrap_or_default();
                format!(
                    r#"<figure{}><{} controls src="{}"></{}></figure>"#,
                    class_attr(&format!("wp-block-{}", block), component),
                    block,
                    escape_attribute(src),
                    block
                )
            }
            "file" => {
                let href = component.attr_str("url").unwrap_or_default();
                format!(
                    r#"<div class="wp-block-file"><a href="{}">{}</a></div>"#,
                    escape_attribute(href),
                    text
                )
            }
            "buttons" => format!("<div{}{}>{}</div>", class_attr("wp-block-buttons", component), style, inner),
            "button" => {
                let href = component.attr_str("url").unwrap_or_default();
                let target = match component.attr("link_target") {
                    Some(Value::Bool(true)) => r#" target="_blank""#.to_string(),
                    Some(Value::String(t)) if !t.is_empty() => format!(r#" target="{}""#, escape_attribute(t)),
                    _ => String::new(),
                };
                format!(
                    r#"<div{}><a class="wp-block-button__link wp-element-button" href="{}"{}{}>{}</a></div>"#,
                    class_attr("wp-block-button", component),
                    escape_attribute(href),
                    target,
                    style,
                    text
                )
            }
            "column" => {
                let mut styles = leftover.clone();
                if let Some(percent) = normalize::column_percent(component) {
                    styles.insert("flex-basis".into(), normalize::format_percent(percent));
                }
                format!("<div{}{}>{}</div>", class_attr("wp-block-column", component), style_attr(&styles), inner)
            }
            "columns" => format!("<div{}{}>{}</div>", class_attr("wp-block-columns", component), style, inner),
            "separator" => format!(
                "<hr{}/>",
                class_attr("wp-block-separator has-alpha-channel-opacity", component)
            ),
            "spacer" => {
                let height = component
                    .attr_str("height")
                    .map(String::from)
                    .or_else(|| component.styles.get("height").cloned())
                    .unwrap_or_else(|| "100px".into());
                format!(
                    r#"<div style="height:{}" aria-hidden="true" class="wp-block-spacer"></div>"#,
                    escape_attribute(&height)
                )
            }
            "embed" => format!(
                "<figure{}><div class=\"wp-block-embed__wrapper\">\n{}\n</div></figure>",
                class_attr("wp-block-embed", component),
                escape_html(component.attr_str("url").unwrap_or_default())
            ),
            "details" => {
                let summary = component.attr_str("title").unwrap_or_default();
                let body = if inner.is_empty() { format!("<p>{}</p>", text) } else { inner };
                format!(
                    "<details{}{}><summary>{}</summary>{}</details>",
                    class_attr("wp-block-details", component),
                    style,
                    escape_html(summary),
                    body
                )
            }
            "social-links" => format!("<ul{}>{}</ul>", class_attr("wp-block-social-links", component), inner),
            "gallery" => format!(
                "<figure{}>{}</figure>",
                class_attr("wp-block-gallery has-nested-images columns-default is-cropped", component),
                inner
            ),
            _ => {
                let body = if !component.content.is_empty() && !inner.is_empty() {
                    format!("<!-- wp:paragraph -->\n<p>{}</p>\n<!-- /wp:paragraph -->\n{}", text, inner)
                } else if !component.content.is_empty() {
                    format!("<!-- wp:paragraph -->\n<p>{}</p>\n<!-- /wp:paragraph -->", text)
                } else {
                    inner
                };
                format!("<div{}{}>{}</div>", class_attr("wp-block-group", component), style, body)
            }
        };

        Ok(format!(
            "{}\n{}\n<!-- /wp:{} -->",
            opening_comment(block, &attrs, false)?,
            html,
            block
        ))
    }

    fn render_children(
        &self,
        children: &[Component],
        ctx: &mut RenderContext,
        separator: &str,
    ) -> Result<String, ConvertError> {
        Ok(children
            .iter()
            .map(|c| self.render_block(c, ctx))
            .collect::<Result<Vec<_>, _>>()?
            .join(separator))
    }
}

impl Converter for GutenbergConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        self.render_blocks(components, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RenderOptions;

    const POST: &str = r#"<!-- wp:columns -->
<div class="wp-block-columns"><!-- wp:column {"width":"33.33%"} -->
<div class="wp-block-column" style="flex-basis:33.33%"><!-- wp:heading {"level":3,"textAlign":"center"} -->
<h3 class="wp-block-heading has-text-align-center">Hello <em>there</em></h3>
<!-- /wp:heading --></div>
<!-- /wp:column -->

<!-- wp:column -->
<div class="wp-block-column"><!-- wp:paragraph {"style":{"spacing":{"padding":{"top":"var:preset|spacing|50","left":"17px"}}}} -->
<p>Body</p>
<!-- /wp:paragraph -->

<!-- wp:buttons -->
<div class="wp-block-buttons"><!-- wp:button -->
<div class="wp-block-button"><a class="wp-block-button__link wp-element-button" href="https://x.test">Go</a></div>
<!-- /wp:button --></div>
<!-- /wp:buttons -->

<!-- wp:acme/testimonial-slider /-->

<!-- wp:separator /--></div>
<!-- /wp:column --></div>
<!-- /wp:columns -->"#;

    #[test]
    fn parses_nested_blocks() {
        let report = GutenbergParser.parse_report(POST);
        assert_eq!(report.skipped, 1);

        let row = &report.components[0];
        assert!(row.is("row"));
        assert_eq!(row.children.len(), 2);

        let first = &row.children[0];
        assert_eq!(first.attr_str("width"), Some("33.33%"));
        let heading = &first.children[0];
        assert_eq!(heading.content, "Hello there");
        assert_eq!(heading.attr("level"), Some(&Value::from(3)));
        assert_eq!(heading.attr_str("alignment"), Some("center"));

        let second = &row.children[1];
        let paragraph = &second.children[0];
        assert_eq!(paragraph.content, "Body");
        assert_eq!(
            paragraph.styles.get("padding-top").map(String::as_str),
            Some("var(--wp--preset--spacing--50)")
        );
        assert_eq!(paragraph.styles.get("padding-left").map(String::as_str), Some("17px"));

        let buttons = &second.children[1];
        assert!(buttons.is("button-group"));
        assert_eq!(buttons.children[0].attr_str("url"), Some("https://x.test"));
        assert_eq!(buttons.children[0].content, "Go");

        assert!(second.children[2].is("divider"));
    }

    #[test]
    fn reads_classic_list_items_and_images() {
        let tree = GutenbergParser.parse(
            r#"<!-- wp:list {"ordered":true} --><ol><li>One</li><li>Two</li></ol><!-- /wp:list --><!-- wp:image {"id":4} --><figure class="wp-block-image"><img src="/a.png" alt="A"/></figure><!-- /wp:image -->"#,
        );
        assert_eq!(tree[0].attr_bool("ordered"), Some(true));
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[1].content, "Two");
        assert_eq!(tree[1].attr_str("image_url"), Some("/a.png"));
        assert_eq!(tree[1].attr_str("alt_text"), Some("A"));
    }

    #[test]
    fn unclosed_blocks_are_closed_at_end() {
        let tree = GutenbergParser.parse("<!-- wp:group --><div><!-- wp:paragraph --><p>x</p>");
        assert!(tree[0].is("container"));
        assert_eq!(tree[0].children[0].content, "x");
    }

    #[test]
    fn deep_nesting_is_cut_off_and_counted() {
        let nesting = 10_000;
        let content = format!(
            "{}<!-- wp:paragraph --><p>x</p><!-- /wp:paragraph -->{}",
            "<!-- wp:group --><div>".repeat(nesting),
            "</div><!-- /wp:group -->".repeat(nesting),
        );
        let report = GutenbergParser.parse_report(&content);

        let mut levels = 0;
        let mut node = report.components.first();
        while let Some(component) = node {
            levels += 1;
            node = component.children.first();
        }
        assert_eq!(levels, MAX_DEPTH);
        assert_eq!(report.skipped, nesting + 1 - MAX_DEPTH);
    }

    #[test]
    fn preset_values_round_trip() {
        assert_eq!(preset_to_css("var:preset|color|primary"), "var(--wp--preset--color--primary)");
        assert_eq!(css_to_preset("var(--wp--preset--color--primary)"), "var:preset|color|primary");
        assert_eq!(css_to_preset("12px"), "12px");
    }

    #[test]
    fn renders_blocks_and_reparses() {
        let tree = vec![Component::new("row", "bootstrap").with_child(
            Component::new("column", "bootstrap")
                .with_attribute("width", "50%")
                .with_child(
                    Component::new("heading", "bootstrap")
                        .with_attribute("level", 3)
                        .with_content("Hi"),
                )
                .with_child(
                    Component::new("button", "bootstrap")
                        .with_attribute("url", "http://x")
                        .with_content("Go"),
                ),
        )];
        let mut ctx = RenderContext::new("WordPress Blocks", RenderOptions::default());
        let out = GutenbergConverter.render(&tree, &mut ctx).unwrap();

        assert!(out.starts_with("<!-- wp:columns -->"));
        assert!(out.contains(r#"<!-- wp:column {"width":"50%"} -->"#));
        assert!(out.contains(r#"<!-- wp:heading {"level":3} -->"#));
        assert!(out.contains("<!-- wp:buttons -->"));
        assert!(ctx.stats().warnings.is_empty());

        let back = GutenbergParser.parse(&out);
        let column = &back[0].children[0];
        assert_eq!(column.attr_str("width"), Some("50%"));
        assert_eq!(column.children[0].content, "Hi");
        assert!(column.children[1].is("button-group"));
        assert_eq!(column.children[1].children[0].attr_str("url"), Some("http://x"));
    }

    #[test]
    fn off_scale_styles_stay_in_style_object() {
        let tree = vec![Component::new("text", "bootstrap")
            .with_style("padding-top", "17px")
            .with_style("text-shadow", "none")
            .with_content("Hi")];
        let mut ctx = RenderContext::new("WordPress Blocks", RenderOptions::default());
        let out = GutenbergConverter.render(&tree, &mut ctx).unwrap();
        assert!(out.contains(r#"{"style":{"spacing":{"padding":{"top":"17px"}}}}"#));
        assert!(out.contains(r#"<p style="text-shadow: none">Hi</p>"#));

        let back = GutenbergParser.parse(&out);
        assert_eq!(back[0].styles.get("padding-top").map(String::as_str), Some("17px"));
        assert_eq!(back[0].styles.get("text-shadow").map(String::as_str), Some("none"));
    }

    #[test]
    fn unsupported_kinds_fall_back_to_group() {
        let tree = vec![Component::new("tabs", "bootstrap")
            .with_child(Component::new("text", "bootstrap").with_content("a"))];
        let mut ctx = RenderContext::new("WordPress Blocks", RenderOptions::default());
        let out = GutenbergConverter.render(&tree, &mut ctx).unwrap();
        assert!(out.starts_with("<!-- wp:group -->"));
        assert_eq!(
            ctx.stats().warnings,
            vec!["tabs has no WordPress Blocks equivalent; rendered as group".to_string()]
        );
    }
}
