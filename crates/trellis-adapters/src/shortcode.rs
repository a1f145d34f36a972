//! Shared engine for bracket-tag macro dialects.
//!
//! `[tag key="value"]body[/tag]` trees are read into the universal tree and
//! written back out. Each dialect supplies its tag and parameter tables
//! through `ShortcodeDialect`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use trellis_core::markup::strip_tags;
use trellis_core::{Component, StyleMap};

use crate::normalize::{self, RenameTable, COMMON_PARAMS};
use crate::traits::{ParseReport, RenderContext, MAX_DEPTH};

/// `(parent tag, child tag, child kind)` entries for macros whose bodies
/// hold a fixed kind of child.
pub type ChildTable = &'static [(&'static str, &'static str, &'static str)];

/// One parsed macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub tag: String,
    pub params: Vec<(String, String)>,
    /// `None` for self-closing and void macros
    pub body: Option<String>,
}

impl Macro {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A run of macro source: either a macro or the text between macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Macro(Macro),
    Text(String),
}

static OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([a-zA-Z_][\w-]*)((?:\s[^\[\]]*?)?)\s*(/)?\]").expect("Invalid macro open regex")
});

static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"']+))"#)
        .expect("Invalid macro param regex")
});

/// Replace quote look-alikes that editors substitute into macro params.
pub fn normalize_quotes(text: &str) -> Cow<'_, str> {
    const LOOKALIKES: &[&str] = &["&quot;", "&#8221;", "&#8243;", "&#8220;", "″", "“", "”"];
    if !LOOKALIKES.iter().any(|q| text.contains(q)) {
        return Cow::Borrowed(text);
    }
    let mut out = text.to_string();
    for quote in LOOKALIKES {
        out = out.replace(quote, "\"");
    }
    Cow::Owned(out)
}

/// Parse a macro parameter list.
pub fn parse_params(raw: &str) -> Vec<(String, String)> {
    PARAM_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            Some((name, value))
        })
        .collect()
}

/// Find the `[/tag]` balancing an already-opened `[tag]`, counting nested
/// macros of the same name. Returns (body end, close end).
fn find_matching_close(source: &str, tag: &str, start: usize) -> Option<(usize, usize)> {
    let open_pattern = format!("[{}", tag);
    let close_tag = format!("[/{}]", tag);

    let mut depth = 1;
    let mut pos = start;
    let mut next_close = pos + source[pos..].find(&close_tag)?;

    loop {
        match source[pos..next_close].find(&open_pattern) {
            Some(o) => {
                let tag_start = pos + o;
                let after_name = &source[tag_start + open_pattern.len()..];
                let is_same_tag = after_name
                    .chars()
                    .next()
                    .is_some_and(|c| c == ']' || c == '/' || c.is_whitespace());
                let self_closing = after_name
                    .find(']')
                    .is_some_and(|end| after_name[..end].trim_end().ends_with('/'));
                if is_same_tag && !self_closing {
                    depth += 1;
                }
                pos = tag_start + open_pattern.len();
            }
            None => {
                depth -= 1;
                if depth == 0 {
                    return Some((next_close, next_close + close_tag.len()));
                }
                pos = next_close + close_tag.len();
                next_close = pos + source[pos..].find(&close_tag)?;
            }
        }
    }
}

/// Split macro source into macros and text runs. Macros without a
/// matching close are void.
pub fn parse_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(caps) = OPEN_RE.captures_at(source, pos) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        if whole.start() > pos {
            segments.push(Segment::Text(source[pos..whole.start()].to_string()));
        }

        let tag = tag.as_str().to_string();
        let params = parse_params(caps.get(2).map(|m| m.as_str()).unwrap_or(""));

        let body = if caps.get(3).is_some() {
            pos = whole.end();
            None
        } else {
            match find_matching_close(source, &tag, whole.end()) {
                Some((body_end, close_end)) => {
                    let body = source[whole.end()..body_end].to_string();
                    pos = close_end;
                    Some(body)
                }
                None => {
                    pos = whole.end();
                    None
                }
            }
        };

        segments.push(Segment::Macro(Macro { tag, params, body }));
    }

    if pos < source.len() {
        segments.push(Segment::Text(source[pos..].to_string()));
    }

    segments
}

/// Whether the content holds at least one macro from the generic table.
pub fn has_generic_macros(content: &str) -> bool {
    OPEN_RE.captures_iter(content).any(|caps| {
        caps.get(1)
            .is_some_and(|tag| normalize::rename(GENERIC_TAG_KINDS, tag.as_str()).is_some())
    })
}

/// Generic tags registered by many themes, understood by every macro
/// dialect.
pub static GENERIC_TAG_KINDS: RenameTable = &[
    ("section", "section"),
    ("container", "container"),
    ("row", "row"),
    ("column", "column"),
    ("col", "column"),
    ("button", "button"),
    ("btn", "button"),
    ("heading", "heading"),
    ("title", "heading"),
    ("text", "text"),
    ("paragraph", "text"),
    ("image", "image"),
    ("img", "image"),
    ("video", "video"),
    ("audio", "audio"),
    ("gallery", "gallery"),
    ("slider", "carousel"),
    ("carousel", "carousel"),
    ("tabs", "tabs"),
    ("tab", "tab"),
    ("accordion", "accordion"),
    ("accordion_item", "accordion-item"),
    ("toggle", "toggle"),
    ("alert", "alert"),
    ("notice", "alert"),
    ("icon", "icon"),
    ("divider", "divider"),
    ("separator", "divider"),
    ("spacer", "spacer"),
    ("map", "map"),
    ("counter", "counter"),
    ("progress", "progress"),
    ("progress_bar", "progress"),
    ("testimonial", "testimonial"),
    ("pricing_table", "pricing-table"),
    ("cta", "call-to-action"),
    ("countdown", "countdown"),
    ("social_icons", "social-icons"),
    ("team_member", "team-member"),
    ("code", "code"),
    ("html", "html"),
    ("form", "form"),
    ("contact_form", "form"),
    ("quote", "quote"),
    ("blockquote", "quote"),
    ("list", "list"),
    ("list_item", "list-item"),
    ("table", "table"),
    ("embed", "embed"),
    ("card", "card"),
    ("badge", "badge"),
    ("search", "search"),
    ("modal", "modal"),
    ("menu", "menu"),
];

/// Tables and hooks describing one macro dialect, used in both directions.
pub trait ShortcodeDialect: Send + Sync {
    /// Framework identifier
    fn id(&self) -> &'static str;

    /// Section tags, preferred first
    fn section_tags(&self) -> &'static [&'static str];

    /// Row tags: the outer row first, then inner rows
    fn row_tags(&self) -> &'static [&'static str];

    /// Column tags: the outer column first, then inner columns
    fn column_tags(&self) -> &'static [&'static str];

    /// Module tag -> kind; the first tag listed for a kind is used when
    /// rendering
    fn tag_kinds(&self) -> RenameTable;

    /// Dialect parameter renames, layered over `COMMON_PARAMS`
    fn param_renames(&self) -> RenameTable {
        &[]
    }

    fn child_tags(&self) -> ChildTable {
        &[]
    }

    /// `(tag, param)`: modules that keep their text in a parameter
    fn content_params(&self) -> RenameTable {
        &[]
    }

    /// Expand a parameter that needs dialect-specific decoding. Returns
    /// false to fall through to the generic rename.
    fn expand_param(&self, _key: &str, _value: &str, _attributes: &mut Map<String, Value>) -> bool {
        false
    }

    /// Styles carried by dialect parameters.
    fn extract_styles(&self, _params: &[(String, String)]) -> StyleMap {
        StyleMap::new()
    }

    /// Parameter holding a column's fractional width.
    fn column_width_key(&self) -> &'static str {
        "width"
    }

    /// Fraction token for a column width.
    fn format_fraction(&self, percent: f64) -> String {
        normalize::percent_to_fraction(percent).to_string()
    }

    /// Whether rows must sit inside a section.
    fn requires_section(&self) -> bool {
        false
    }

    /// Module used for kinds the dialect cannot express.
    fn fallback_tag(&self) -> &'static str;

    fn format_bool(&self, value: bool) -> &'static str {
        if value {
            "yes"
        } else {
            "no"
        }
    }

    /// Adjust the rendered parameters of one macro.
    fn collapse_params(&self, _tag: &str, _component: &Component, _params: &mut Vec<(String, String)>) {}

    /// Parameters expressing a style map.
    fn style_params(&self, _styles: &StyleMap) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Whether content-less modules are still written with a closing tag.
    fn always_close(&self) -> bool {
        true
    }
}

/// Fraction, `_`-fraction or percentage width as a percentage string.
pub fn width_to_percent(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains('/') || raw.contains('_') {
        normalize::fraction_to_percent(raw)
    } else if raw.ends_with('%') {
        raw.to_string()
    } else {
        match raw.parse::<f64>() {
            Ok(n) => normalize::format_percent(n),
            Err(_) => "100%".to_string(),
        }
    }
}

fn lookup_kind<D: ShortcodeDialect + ?Sized>(dialect: &D, tag: &str) -> Option<&'static str> {
    normalize::rename(dialect.tag_kinds(), tag).or_else(|| normalize::rename(GENERIC_TAG_KINDS, tag))
}

struct ParseState<'d, D: ?Sized> {
    dialect: &'d D,
    depth: usize,
    skipped: usize,
}

/// Parse macro source with a dialect.
pub fn parse_shortcodes<D: ShortcodeDialect + ?Sized>(dialect: &D, content: &str) -> ParseReport {
    if content.trim().is_empty() {
        return ParseReport::empty();
    }

    let source = normalize_quotes(content);
    let mut state = ParseState {
        dialect,
        depth: 0,
        skipped: 0,
    };
    let components = state.parse_body_macros(&parse_segments(&source));

    ParseReport {
        components,
        skipped: state.skipped,
    }
}

/// Parse the first macro of a fragment.
pub fn parse_first_macro<D: ShortcodeDialect + ?Sized>(dialect: &D, raw: &str) -> Option<Component> {
    let source = normalize_quotes(raw);
    let mut state = ParseState {
        dialect,
        depth: 0,
        skipped: 0,
    };
    parse_segments(&source).into_iter().find_map(|segment| match segment {
        Segment::Macro(m) => state.parse_macro(&m).into_iter().next(),
        Segment::Text(_) => None,
    })
}

impl<D: ShortcodeDialect + ?Sized> ParseState<'_, D> {
    fn parse_body_macros(&mut self, segments: &[Segment]) -> Vec<Component> {
        segments
            .iter()
            .flat_map(|segment| match segment {
                Segment::Macro(m) => self.parse_macro(m),
                Segment::Text(_) => Vec::new(),
            })
            .collect()
    }

    /// Parse one macro. Unknown macros are dropped and the macros in their
    /// bodies lifted into the caller. Macros nested deeper than `MAX_DEPTH`
    /// are dropped along with everything inside them.
    fn parse_macro(&mut self, m: &Macro) -> Vec<Component> {
        let dialect = self.dialect;
        let tag = m.tag.as_str();

        if self.depth >= MAX_DEPTH {
            let dropped = 1 + m.body.as_deref().map_or(0, count_macros);
            tracing::debug!(framework = dialect.id(), dropped, "dropping macros nested too deeply");
            self.skipped += dropped;
            return Vec::new();
        }

        let kind = if dialect.section_tags().contains(&tag) {
            "section"
        } else if dialect.row_tags().contains(&tag) {
            "row"
        } else if dialect.column_tags().contains(&tag) {
            "column"
        } else if let Some(kind) = lookup_kind(dialect, tag) {
            kind
        } else {
            self.skipped += 1;
            tracing::debug!(framework = dialect.id(), tag, "dropping unmapped macro");
            return match m.body.as_deref() {
                Some(body) => self.nested(|state| state.parse_body_macros(&parse_segments(body))),
                None => Vec::new(),
            };
        };

        vec![self.build(m, kind)]
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }

    fn build(&mut self, m: &Macro, kind: &str) -> Component {
        let dialect = self.dialect;
        let tag = m.tag.as_str();

        let mut attributes = self.normalize_params(&m.params);
        if kind == "column" {
            let key = dialect.column_width_key();
            attributes.remove(self.universal_name(key).as_str());
            if let Some(raw) = m.param(key) {
                attributes.insert("width".into(), Value::String(width_to_percent(raw)));
            }
        }

        let mut component = Component::new(kind, dialect.id())
            .with_styles(dialect.extract_styles(&m.params))
            .with_original(tag, raw_params(&m.params));

        if let Some(body) = m.body.as_deref().filter(|b| !b.trim().is_empty()) {
            let segments = parse_segments(body);
            if segments.iter().any(|s| matches!(s, Segment::Macro(_))) {
                let text: String = segments
                    .iter()
                    .filter_map(|s| match s {
                        Segment::Text(t) => Some(t.as_str()),
                        Segment::Macro(_) => None,
                    })
                    .collect();
                component.content = body_text(kind, &text);
                component.children = self.nested(|state| state.parse_children(tag, &segments));
            } else {
                component.content = body_text(kind, body);
            }
        }

        if component.content.is_empty() {
            let content_param = normalize::rename(dialect.content_params(), tag);
            let key = content_param
                .map(|param| self.universal_name(param))
                .unwrap_or_else(|| "text".to_string());
            if let Some(Value::String(text)) = attributes.get(&key) {
                component.content = body_text(kind, text);
                attributes.remove(&key);
            }
        }

        let media_key = match kind {
            "image" => Some("image_url"),
            "video" => Some("video_url"),
            _ => None,
        };
        if let Some(key) = media_key {
            let is_url = component.content.starts_with("http") || component.content.starts_with('/');
            if is_url && !attributes.contains_key(key) {
                attributes.insert(key.into(), Value::String(std::mem::take(&mut component.content)));
            }
        }

        component.attributes = attributes;
        component
    }

    fn parse_children(&mut self, parent_tag: &str, segments: &[Segment]) -> Vec<Component> {
        let child_spec = self
            .dialect
            .child_tags()
            .iter()
            .find(|(parent, _, _)| *parent == parent_tag)
            .map(|(_, child, kind)| (*child, *kind));

        let Some((child_tag, child_kind)) = child_spec else {
            return self.parse_body_macros(segments);
        };

        segments
            .iter()
            .flat_map(|segment| match segment {
                Segment::Macro(m) if m.tag == child_tag && self.depth < MAX_DEPTH => {
                    vec![self.build(m, child_kind)]
                }
                Segment::Macro(m) => self.parse_macro(m),
                Segment::Text(_) => Vec::new(),
            })
            .collect()
    }

    fn universal_name(&self, key: &str) -> String {
        normalize::rename(self.dialect.param_renames(), key)
            .or_else(|| normalize::rename(COMMON_PARAMS, key))
            .unwrap_or(key)
            .to_string()
    }

    fn normalize_params(&self, params: &[(String, String)]) -> Map<String, Value> {
        let mut attributes = Map::new();
        for (key, value) in params {
            if self.dialect.expand_param(key, value, &mut attributes) {
                continue;
            }
            let value = &unescape_brackets(value);
            let name = self.universal_name(key);
            let value = if name == "width" && (value.contains('/') || value.contains('_')) {
                Value::String(width_to_percent(value))
            } else {
                normalize::normalize_value(&name, value)
            };
            attributes.insert(name, value);
        }
        attributes
    }
}

fn raw_params(params: &[(String, String)]) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Body text of a leaf macro. Raw kinds keep their markup.
fn body_text(kind: &str, body: &str) -> String {
    if matches!(kind, "html" | "code" | "table") {
        unescape_brackets(body.trim())
    } else {
        strip_tags(body)
    }
}

/// Number of opening macros in a source run.
fn count_macros(source: &str) -> usize {
    OPEN_RE.find_iter(source).count()
}

/// Escape text written into a macro body so it cannot open a macro.
fn escape_brackets(text: &str) -> String {
    text.replace('[', "&#91;").replace(']', "&#93;")
}

fn unescape_brackets(text: &str) -> String {
    text.replace("&#91;", "[").replace("&#93;", "]")
}

/// Escape a parameter value for a double-quoted macro parameter.
pub fn escape_param(value: &str) -> String {
    value
        .replace('"', "&quot;")
        .replace('[', "&#91;")
        .replace(']', "&#93;")
}

fn write_macro(tag: &str, params: &[(String, String)], body: Option<String>) -> String {
    let mut out = format!("[{}", tag);
    for (key, value) in params {
        out.push_str(&format!(r#" {}="{}""#, key, escape_param(value)));
    }
    out.push(']');
    if let Some(body) = body {
        out.push_str(&body);
        out.push_str(&format!("[/{}]", tag));
    }
    out
}

/// Writes the universal tree as macros.
struct Renderer<'d, 'c, D: ?Sized> {
    dialect: &'d D,
    ctx: &'c mut RenderContext,
}

/// Render a forest with a macro dialect, adding the section/row/column
/// scaffolding the dialect requires.
pub fn render_shortcodes<D: ShortcodeDialect + ?Sized>(
    dialect: &D,
    components: &[Component],
    ctx: &mut RenderContext,
) -> String {
    let pretty = ctx.options().pretty;
    let mut renderer = Renderer { dialect, ctx };

    let mut blocks = Vec::new();
    let mut pending: Vec<&Component> = Vec::new();

    for component in components {
        match component.kind().as_str() {
            "section" | "container" => {
                renderer.flush_top(&mut pending, &mut blocks);
                blocks.push(renderer.section(component));
            }
            "row" => {
                renderer.flush_top(&mut pending, &mut blocks);
                let row = renderer.row(component, 0);
                blocks.push(renderer.wrap_section(row));
            }
            _ => pending.push(component),
        }
    }
    renderer.flush_top(&mut pending, &mut blocks);

    blocks.join(if pretty { "\n" } else { "" })
}

impl<D: ShortcodeDialect + ?Sized> Renderer<'_, '_, D> {
    fn joiner(&self) -> &'static str {
        if self.ctx.options().pretty {
            "\n"
        } else {
            ""
        }
    }

    fn block_body(&self, inner: &str) -> String {
        if self.ctx.options().pretty && !inner.is_empty() {
            let indented: Vec<String> = inner.lines().map(|l| format!("  {}", l)).collect();
            format!("\n{}\n", indented.join("\n"))
        } else {
            inner.to_string()
        }
    }

    fn flush_top(&mut self, pending: &mut Vec<&Component>, blocks: &mut Vec<String>) {
        if pending.is_empty() {
            return;
        }
        let items: Vec<&Component> = std::mem::take(pending);
        let column = self.synthetic_column(&items, 0);
        let row = self.synthetic_row(vec![column], 0);
        blocks.push(self.wrap_section(row));
    }

    fn wrap_section(&self, row: String) -> String {
        match self.dialect.section_tags().first() {
            Some(tag) if self.dialect.requires_section() => {
                write_macro(tag, &[], Some(self.block_body(&row)))
            }
            _ => row,
        }
    }

    fn section(&mut self, component: &Component) -> String {
        let Some(tag) = self.dialect.section_tags().first().copied() else {
            self.ctx.record(component, true, "");
            return self.rows_of(&component.children, 0);
        };
        self.ctx.record(component, true, tag);
        let params = self.params(component, tag);
        let inner = self.rows_of(&component.children, 0);
        write_macro(tag, &params, Some(self.block_body(&inner)))
    }

    /// Rows for a list of children, wrapping stray content in scaffolding.
    fn rows_of(&mut self, children: &[Component], depth: usize) -> String {
        let mut rows = Vec::new();
        let mut pending: Vec<&Component> = Vec::new();

        for child in children {
            if child.is("row") {
                if !pending.is_empty() {
                    let items = std::mem::take(&mut pending);
                    let column = self.synthetic_column(&items, depth);
                    rows.push(self.synthetic_row(vec![column], depth));
                }
                rows.push(self.row(child, depth));
            } else if matches!(child.kind().as_str(), "section" | "container") {
                if !pending.is_empty() {
                    let items = std::mem::take(&mut pending);
                    let column = self.synthetic_column(&items, depth);
                    rows.push(self.synthetic_row(vec![column], depth));
                }
                self.ctx.record(child, true, "");
                let nested = self.rows_of(&child.children, depth);
                rows.push(nested);
            } else {
                pending.push(child);
            }
        }
        if !pending.is_empty() {
            let column = self.synthetic_column(&pending, depth);
            rows.push(self.synthetic_row(vec![column], depth));
        }

        rows.join(self.joiner())
    }

    fn row_tag(&self, depth: usize) -> &'static str {
        let tags = self.dialect.row_tags();
        tags.get(depth.min(tags.len().saturating_sub(1)))
            .copied()
            .unwrap_or("row")
    }

    fn column_tag(&self, depth: usize) -> &'static str {
        let tags = self.dialect.column_tags();
        tags.get(depth.min(tags.len().saturating_sub(1)))
            .copied()
            .unwrap_or("column")
    }

    fn synthetic_row(&mut self, columns: Vec<String>, depth: usize) -> String {
        let tag = self.row_tag(depth);
        let inner = columns.join(self.joiner());
        write_macro(tag, &[], Some(self.block_body(&inner)))
    }

    fn synthetic_column(&mut self, items: &[&Component], depth: usize) -> String {
        let tag = self.column_tag(depth);
        let params = vec![self.width_param(100.0)];
        let inner = self.column_items(items.iter().copied(), depth);
        write_macro(tag, &params, Some(self.block_body(&inner)))
    }

    fn width_param(&self, percent: f64) -> (String, String) {
        (
            self.dialect.column_width_key().to_string(),
            self.dialect.format_fraction(percent),
        )
    }

    fn row(&mut self, component: &Component, depth: usize) -> String {
        let tag = self.row_tag(depth);
        self.ctx.record(component, true, tag);
        let params = self.params(component, tag);

        let mut columns = Vec::new();
        let mut pending: Vec<&Component> = Vec::new();
        for child in &component.children {
            if child.is("column") {
                if !pending.is_empty() {
                    let items = std::mem::take(&mut pending);
                    columns.push(self.synthetic_column(&items, depth));
                }
                columns.push(self.column(child, depth));
            } else {
                pending.push(child);
            }
        }
        if !pending.is_empty() {
            columns.push(self.synthetic_column(&pending, depth));
        }

        let inner = columns.join(self.joiner());
        write_macro(tag, &params, Some(self.block_body(&inner)))
    }

    fn column(&mut self, component: &Component, depth: usize) -> String {
        let tag = self.column_tag(depth);
        self.ctx.record(component, true, tag);

        let key = self.dialect.column_width_key();
        let mut params: Vec<(String, String)> = self
            .params(component, tag)
            .into_iter()
            .filter(|(k, _)| k != "width" && k != key)
            .collect();
        let percent = normalize::column_percent(component).unwrap_or(100.0);
        params.insert(0, self.width_param(percent));

        let inner = self.column_items(component.children.iter(), depth);
        write_macro(tag, &params, Some(self.block_body(&inner)))
    }

    fn column_items<'a>(&mut self, items: impl Iterator<Item = &'a Component>, depth: usize) -> String {
        let mut parts = Vec::new();
        for item in items {
            match item.kind().as_str() {
                "row" if depth + 1 < self.dialect.row_tags().len() => {
                    parts.push(self.row(item, depth + 1));
                }
                "row" | "column" | "section" | "container" => {
                    self.ctx.record(item, true, "");
                    let flattened = self.flatten_layout(item);
                    parts.push(self.column_items(flattened.into_iter(), depth));
                }
                _ => parts.push(self.module(item)),
            }
        }
        parts.join(self.joiner())
    }

    fn module(&mut self, component: &Component) -> String {
        let dialect = self.dialect;
        let native = normalize::rename_back(dialect.tag_kinds(), component.kind().as_str());
        let tag = match native {
            Some(tag) => {
                self.ctx.record(component, true, tag);
                tag
            }
            None => {
                let fallback = dialect.fallback_tag();
                self.ctx.record(component, false, fallback);
                fallback
            }
        };

        let mut params = self.params(component, tag);
        let content_param = normalize::rename(dialect.content_params(), tag);
        if let Some(param) = content_param {
            if !component.content.is_empty() {
                params.retain(|(k, _)| k != param);
                params.push((param.to_string(), component.content.clone()));
            }
        }

        let child_tag = dialect
            .child_tags()
            .iter()
            .find(|(parent, _, _)| *parent == tag)
            .map(|(_, child, kind)| (*child, *kind));

        let children: Vec<String> = component
            .children
            .iter()
            .map(|child| match child_tag {
                Some((child_tag, kind)) if child.is(kind) => self.grouped_child(child, child_tag),
                _ => self.module(child),
            })
            .collect();

        let mut body = if content_param.is_some() {
            String::new()
        } else {
            escape_brackets(&component.content)
        };
        let children = children.join(self.joiner());
        if !children.is_empty() {
            body = format!("{}{}", body, self.block_body(&children));
        }

        if body.is_empty() && !dialect.always_close() {
            write_macro(tag, &params, None)
        } else {
            write_macro(tag, &params, Some(body))
        }
    }

    fn grouped_child(&mut self, component: &Component, tag: &'static str) -> String {
        self.ctx.record(component, true, tag);
        let params = self.params(component, tag);
        let children: Vec<String> = component.children.iter().map(|c| self.module(c)).collect();
        let mut body = escape_brackets(&component.content);
        let children = children.join(self.joiner());
        if !children.is_empty() {
            body.push_str(&self.block_body(&children));
        }
        write_macro(tag, &params, Some(body))
    }

    /// Modules inside layout nodes, in order, for flattening layout that is
    /// nested deeper than the dialect allows. Flattened layout nodes still
    /// count as processed.
    fn flatten_layout<'a>(&mut self, component: &'a Component) -> Vec<&'a Component> {
        let mut out = Vec::new();
        for child in &component.children {
            if matches!(child.kind().as_str(), "row" | "column" | "section" | "container") {
                self.ctx.record(child, true, "");
                out.extend(self.flatten_layout(child));
            } else {
                out.push(child);
            }
        }
        out
    }

    /// Dialect parameters for a component's attributes and styles.
    fn params(&self, component: &Component, tag: &str) -> Vec<(String, String)> {
        let dialect = self.dialect;
        let mut params: Vec<(String, String)> = Vec::new();

        for (key, value) in &component.attributes {
            let text = match value {
                Value::String(s) if !s.is_empty() => s.clone(),
                Value::Bool(b) if key == "link_target" => {
                    if *b { "_blank" } else { "_self" }.to_string()
                }
                Value::Bool(b) => dialect.format_bool(*b).to_string(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            let name = normalize::rename_back(dialect.param_renames(), key)
                .or_else(|| normalize::rename_back(COMMON_PARAMS, key))
                .unwrap_or(key.as_str());
            if !params.iter().any(|(k, _)| k == name) {
                params.push((name.to_string(), text));
            }
        }

        params.extend(dialect.style_params(&component.styles));
        dialect.collapse_params(tag, component, &mut params);
        params
    }
}
