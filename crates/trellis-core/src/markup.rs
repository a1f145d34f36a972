//! Tolerant HTML helpers.
//!
//! Parsing goes through html5ever (via `scraper`), which never fails on
//! malformed markup; problems are collected as parse errors instead.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};
use serde_json::{json, Map, Value};

/// A parsed HTML fragment or document.
pub struct Document {
    html: Html,
    full: bool,
}

impl Document {
    /// Top-level elements: the children of `<body>` for full documents, the
    /// fragment's own top-level elements otherwise.
    pub fn root_elements(&self) -> Vec<ElementRef<'_>> {
        let root = self.html.root_element();
        let container = if self.full {
            root.children()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "body")
                .unwrap_or(root)
        } else {
            root
        };
        container.children().filter_map(ElementRef::wrap).collect()
    }

    /// Parse errors reported while building the tree.
    pub fn errors(&self) -> Vec<String> {
        self.html.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

/// Parse HTML-like text. `None` only for empty input.
pub fn parse_document(text: &str) -> Option<Document> {
    if text.trim().is_empty() {
        return None;
    }

    let lower = text.trim_start().to_lowercase();
    let full = lower.starts_with("<!doctype") || lower.starts_with("<html");

    let html = if full {
        Html::parse_document(text)
    } else {
        Html::parse_fragment(text)
    };

    Some(Document { html, full })
}

/// Whitespace-collapsed text content of an element.
pub fn text_of(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Direct text children only, ignoring nested elements.
pub fn own_text(element: &ElementRef<'_>) -> String {
    let raw: String = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(text.to_string()),
            _ => None,
        })
        .collect();
    collapse_whitespace(&raw)
}

/// Inner HTML of an element.
pub fn inner_html(element: &ElementRef<'_>) -> String {
    element.inner_html()
}

/// Attributes of an element in source order.
pub fn attributes_of(element: &ElementRef<'_>) -> Vec<(String, String)> {
    element
        .value()
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Class tokens of a parsed element.
pub fn classes_of(element: &ElementRef<'_>) -> BTreeSet<String> {
    element.value().classes().map(|c| c.to_string()).collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*<[a-zA-Z][\w:-]*)([^>]*?)(\s*/?>)").expect("Invalid open tag regex")
});

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("Invalid class attribute regex")
});

/// Class tokens of the first tag in an element's text. Text without a tag is
/// treated as a bare class list.
pub fn extract_classes(element_text: &str) -> BTreeSet<String> {
    let Some(open) = OPEN_TAG_RE.captures(element_text) else {
        if element_text.contains('<') {
            return BTreeSet::new();
        }
        return element_text.split_whitespace().map(String::from).collect();
    };

    let attrs = open.get(2).map(|m| m.as_str()).unwrap_or("");
    let padded = format!(" {}", attrs);
    CLASS_ATTR_RE
        .captures(&padded)
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str().split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

/// Rewrite the class attribute of the first tag. Returns the input unchanged
/// when the edit does nothing.
fn edit_classes(element_text: &str, edit: impl FnOnce(&mut Vec<String>)) -> String {
    let Some(open) = OPEN_TAG_RE.captures(element_text) else {
        return element_text.to_string();
    };
    let (Some(whole), Some(head), Some(close)) = (open.get(0), open.get(1), open.get(3)) else {
        return element_text.to_string();
    };
    let attrs = open.get(2).map(|m| m.as_str()).unwrap_or("");

    let existing = CLASS_ATTR_RE.captures(attrs);
    let mut tokens: Vec<String> = existing
        .as_ref()
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str().split_whitespace().map(String::from).collect())
        .unwrap_or_default();
    let before = tokens.clone();

    edit(&mut tokens);
    if tokens == before {
        return element_text.to_string();
    }

    let class_attr = if tokens.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, tokens.join(" "))
    };

    let new_attrs = match existing.as_ref().and_then(|c| c.get(0)) {
        Some(m) => format!("{}{}{}", &attrs[..m.start()], class_attr, &attrs[m.end()..]),
        None => format!("{}{}", attrs, class_attr),
    };

    format!(
        "{}{}{}{}",
        head.as_str(),
        new_attrs,
        close.as_str(),
        &element_text[whole.end()..]
    )
}

/// Add a class to the first tag. Idempotent.
pub fn add_class(element_text: &str, class: &str) -> String {
    edit_classes(element_text, |tokens| {
        if !class.is_empty() && !tokens.iter().any(|t| t == class) {
            tokens.push(class.to_string());
        }
    })
}

/// Remove a class from the first tag. Idempotent.
pub fn remove_class(element_text: &str, class: &str) -> String {
    edit_classes(element_text, |tokens| tokens.retain(|t| t != class))
}

/// Ordered `(kind, patterns)` table. A pattern ending in `-` matches as a
/// prefix; any other pattern must match a whole token.
pub type KindTable = &'static [(&'static str, &'static [&'static str])];

/// Bootstrap-style class vocabulary.
pub static BOOTSTRAP_KIND_TABLE: KindTable = &[
    ("button-group", &["btn-group", "btn-group-vertical"]),
    ("button", &["btn"]),
    ("container", &["container", "container-fluid", "container-"]),
    ("row", &["row"]),
    ("column", &["col", "col-"]),
    ("navbar", &["navbar"]),
    ("tabs", &["nav-tabs", "nav-pills"]),
    ("nav", &["nav"]),
    ("card", &["card"]),
    ("alert", &["alert"]),
    ("badge", &["badge"]),
    ("modal", &["modal"]),
    ("accordion-item", &["accordion-item"]),
    ("accordion", &["accordion"]),
    ("carousel", &["carousel"]),
    ("list-item", &["list-group-item"]),
    ("list", &["list-group"]),
    ("progress", &["progress"]),
    ("spinner", &["spinner-border", "spinner-grow"]),
    ("breadcrumb", &["breadcrumb"]),
    ("pagination", &["pagination"]),
    ("dropdown", &["dropdown", "dropup", "dropstart", "dropend"]),
    ("toast", &["toast"]),
    ("table", &["table"]),
    ("input", &["form-control"]),
    ("select", &["form-select"]),
    ("checkbox", &["form-check-input"]),
    ("label", &["form-label", "form-check-label"]),
    ("image", &["img-fluid", "img-thumbnail"]),
    ("quote", &["blockquote"]),
];

/// Match class tokens against an ordered table. All exact patterns are
/// tried before any prefix pattern; within a pass the first entry wins.
pub fn detect_component_kind(classes: &BTreeSet<String>, table: KindTable) -> Option<&'static str> {
    for (kind, patterns) in table {
        if patterns
            .iter()
            .filter(|p| !p.ends_with('-'))
            .any(|p| classes.contains(*p))
        {
            return Some(*kind);
        }
    }

    for (kind, patterns) in table {
        if patterns
            .iter()
            .filter(|p| p.ends_with('-'))
            .any(|p| classes.iter().any(|c| c.starts_with(*p)))
        {
            return Some(*kind);
        }
    }

    None
}

/// Grid information carried by layout classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridSpec {
    /// "fixed", "fluid" or a breakpoint name
    pub container: Option<String>,
    pub row: bool,
    pub column: bool,
    /// breakpoint -> column size ("6", "auto", "equal")
    pub breakpoints: BTreeMap<String, String>,
    pub offsets: BTreeMap<String, String>,
    pub order: BTreeMap<String, String>,
}

impl GridSpec {
    pub fn is_empty(&self) -> bool {
        *self == GridSpec::default()
    }

    /// JSON form stored under `attributes.grid`. Empty parts are omitted.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(container) = &self.container {
            map.insert("container".into(), json!(container));
        }
        if self.row {
            map.insert("row".into(), json!(true));
        }
        if self.column {
            map.insert("column".into(), json!(true));
        }
        for (key, part) in [
            ("breakpoints", &self.breakpoints),
            ("offsets", &self.offsets),
            ("order", &self.order),
        ] {
            if !part.is_empty() {
                map.insert(key.into(), json!(part));
            }
        }
        Value::Object(map)
    }

    /// Read back a grid stored with `to_value`. Missing parts stay empty.
    pub fn from_value(value: &Value) -> Self {
        let strings = |key: &str| -> BTreeMap<String, String> {
            value
                .get(key)
                .and_then(Value::as_object)
                .map(|m| {
                    m.iter()
                        .filter_map(|(k, v)| {
                            let text = match v {
                                Value::String(s) => s.clone(),
                                Value::Number(n) => n.to_string(),
                                _ => return None,
                            };
                            Some((k.clone(), text))
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        Self {
            container: value.get("container").and_then(Value::as_str).map(String::from),
            row: value.get("row").and_then(Value::as_bool).unwrap_or(false),
            column: value.get("column").and_then(Value::as_bool).unwrap_or(false),
            breakpoints: strings("breakpoints"),
            offsets: strings("offsets"),
            order: strings("order"),
        }
    }
}

/// Breakpoint names in ascending width order.
pub const BREAKPOINTS: [&str; 6] = ["xs", "sm", "md", "lg", "xl", "xxl"];

static COL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^col(?:-(sm|md|lg|xl|xxl))?(?:-(\d{1,2}|auto))?$").expect("Invalid column regex")
});

static OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^offset(?:-(sm|md|lg|xl|xxl))?-(\d{1,2})$").expect("Invalid offset regex")
});

static ORDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^order(?:-(sm|md|lg|xl|xxl))?-(\d|first|last)$").expect("Invalid order regex")
});

/// Collect container, row, column, offset and order tokens.
pub fn extract_grid_info(classes: &BTreeSet<String>) -> GridSpec {
    let mut grid = GridSpec::default();

    for class in classes {
        if class == "container" {
            grid.container = Some("fixed".into());
        } else if let Some(rest) = class.strip_prefix("container-") {
            grid.container = Some(rest.to_string());
        } else if class == "row" {
            grid.row = true;
        } else if let Some(caps) = COL_RE.captures(class) {
            grid.column = true;
            let breakpoint = caps.get(1).map(|m| m.as_str()).unwrap_or("xs");
            let size = caps.get(2).map(|m| m.as_str()).unwrap_or("equal");
            grid.breakpoints.insert(breakpoint.to_string(), size.to_string());
        } else if let Some(caps) = OFFSET_RE.captures(class) {
            let breakpoint = caps.get(1).map(|m| m.as_str()).unwrap_or("xs");
            if let Some(size) = caps.get(2) {
                grid.offsets.insert(breakpoint.to_string(), size.as_str().to_string());
            }
        } else if let Some(caps) = ORDER_RE.captures(class) {
            let breakpoint = caps.get(1).map(|m| m.as_str()).unwrap_or("xs");
            if let Some(order) = caps.get(2) {
                grid.order.insert(breakpoint.to_string(), order.as_str().to_string());
            }
        }
    }

    grid
}

static UTILITY_FAMILIES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "display",
            r"^d-(?:(?:sm|md|lg|xl|xxl)-)?(?:none|inline|inline-block|block|grid|inline-grid|table|table-row|table-cell|flex|inline-flex)$",
        ),
        (
            "flex",
            r"^(?:flex-(?:(?:sm|md|lg|xl|xxl)-)?(?:row|column|row-reverse|column-reverse|wrap|nowrap|wrap-reverse|fill|grow-[01]|shrink-[01])|(?:justify-content|align-items|align-self|align-content)-(?:(?:sm|md|lg|xl|xxl)-)?\w+|gap-\d|row-gap-\d|column-gap-\d)$",
        ),
        (
            "spacing",
            r"^[mp][trblxyse]?-(?:(?:sm|md|lg|xl|xxl)-)?(?:\d|auto|n\d)$",
        ),
        (
            "sizing",
            r"^(?:w|h|mw|mh|vw|vh|min-vw|min-vh)-(?:\d+|auto)$",
        ),
        (
            "text",
            r"^(?:text-(?:(?:sm|md|lg|xl|xxl)-)?(?:start|end|center|left|right|justify|wrap|nowrap|truncate|lowercase|uppercase|capitalize|break)|text-decoration-\w+|fw-\w+|fst-\w+|fs-\d|lh-\w+|font-monospace|lead|small)$",
        ),
        (
            "color",
            r"^(?:(?:text|bg|link)-(?:primary|secondary|success|danger|warning|info|light|dark|white|black|muted|body|transparent)(?:-emphasis|-subtle)?|bg-gradient|(?:bg|text)-opacity-\d+)$",
        ),
        (
            "border",
            r"^(?:border(?:-(?:top|end|bottom|start|0|1|2|3|4|5|primary|secondary|success|danger|warning|info|light|dark|white))?|rounded(?:-\w+)?)$",
        ),
        (
            "visibility",
            r"^(?:visible|invisible|visually-hidden(?:-focusable)?)$",
        ),
        (
            "position",
            r"^(?:position-(?:static|relative|absolute|fixed|sticky)|(?:top|bottom|start|end)-(?:0|50|100)|translate-middle(?:-[xy])?|fixed-top|fixed-bottom|sticky-top|sticky-bottom)$",
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("Invalid utility regex")))
    .collect()
});

/// Bucket utility tokens by family. Empty families are omitted.
pub fn extract_utility_classes(classes: &BTreeSet<String>) -> BTreeMap<String, Vec<String>> {
    let mut buckets: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for class in classes {
        if let Some((family, _)) = UTILITY_FAMILIES.iter().find(|(_, re)| re.is_match(class)) {
            buckets.entry(family.to_string()).or_default().push(class.clone());
        }
    }

    buckets
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Synthesize an element. `content` is inserted as-is; attribute values are
/// escaped. An attribute with an empty value is written as a bare name.
pub fn create_element(tag: &str, attrs: &[(String, String)], content: &str) -> String {
    let mut out = format!("<{}", tag);
    for (name, value) in attrs {
        if value.is_empty() {
            out.push_str(&format!(" {}", name));
        } else {
            out.push_str(&format!(r#" {}="{}""#, name, escape_attribute(value)));
        }
    }
    out.push('>');

    if !is_void_tag(tag) {
        out.push_str(content);
        out.push_str(&format!("</{}>", tag));
    }
    out
}

/// Escape HTML special characters including single quotes.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape for use inside a double-quoted attribute value.
pub fn escape_attribute(s: &str) -> String {
    escape_html(s)
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}

/// Where sanitized text is going to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeContext {
    /// Markup: dangerous elements, handlers and script URLs are removed
    Html,
    /// Attribute value
    Attribute,
    /// Plain text
    Text,
    /// URL attribute value
    Url,
}

static DANGEROUS_BLOCK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "iframe", "object", "embed"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("Invalid dangerous block regex")
        })
        .collect()
});

static DANGEROUS_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:script|style|iframe|object|embed)\b[^>]*>")
        .expect("Invalid dangerous tag regex")
});

static EVENT_HANDLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("Invalid event handler regex")
});

static SCRIPT_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(href|src|action)\s*=\s*(["']?)\s*(?:javascript|vbscript):[^"'>\s]*"#)
        .expect("Invalid script url regex")
});

/// Make text safe for the given context.
pub fn sanitize(text: &str, context: SanitizeContext) -> String {
    match context {
        SanitizeContext::Html => {
            let mut out = text.to_string();
            for re in DANGEROUS_BLOCK_RES.iter() {
                out = re.replace_all(&out, "").into_owned();
            }
            out = DANGEROUS_TAG_RE.replace_all(&out, "").into_owned();
            out = EVENT_HANDLER_RE.replace_all(&out, "").into_owned();
            SCRIPT_URL_RE.replace_all(&out, "$1=$2#").into_owned()
        }
        SanitizeContext::Attribute => escape_attribute(text),
        SanitizeContext::Text => escape_html(text),
        SanitizeContext::Url => {
            let lower = text.trim().to_lowercase();
            if lower.starts_with("javascript:")
                || lower.starts_with("vbscript:")
                || lower.starts_with("data:text/html")
            {
                "#".to_string()
            } else {
                escape_attribute(text.trim())
            }
        }
    }
}

/// Text content with all markup removed and entities decoded.
pub fn strip_tags(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return text.trim().to_string();
    }
    let html = Html::parse_fragment(text);
    let raw: String = html.root_element().text().collect();
    raw.trim().to_string()
}

static HTML_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid html comment regex"));

static INTER_TAG_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("Invalid inter-tag whitespace regex"));

static WS_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("Invalid whitespace regex"));

/// Remove comments and whitespace between tags.
pub fn minify(html: &str) -> String {
    let out = HTML_COMMENT_RE.replace_all(html, "");
    let out = INTER_TAG_WS_RE.replace_all(&out, "><");
    let out = WS_RUN_RE.replace_all(&out, " ");
    out.trim().to_string()
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<[^>]+>|[^<]+").expect("Invalid html token regex")
});

static TAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</?([a-zA-Z][\w:-]*)").expect("Invalid tag name regex"));

fn tag_name(token: &str) -> Option<&str> {
    TAG_NAME_RE
        .captures(token)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// One element per line with two-space indentation. Elements holding only
/// text stay on one line.
pub fn prettify(html: &str) -> String {
    let tokens: Vec<&str> = TOKEN_RE
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|t| !t.trim().is_empty())
        .collect();

    let mut lines: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].trim();
        let indent = "  ".repeat(depth);

        if token.starts_with("<!--") || token.starts_with("<!") {
            lines.push(format!("{}{}", indent, token));
        } else if token.starts_with("</") {
            depth = depth.saturating_sub(1);
            lines.push(format!("{}{}", "  ".repeat(depth), token));
        } else if token.starts_with('<') {
            let name = tag_name(token).unwrap_or("");
            let self_closing = token.ends_with("/>") || is_void_tag(&name.to_lowercase());
            if self_closing {
                lines.push(format!("{}{}", indent, token));
            } else {
                let closing = format!("</{}>", name);
                let next = tokens.get(i + 1).map(|t| t.trim());
                let after = tokens.get(i + 2).map(|t| t.trim());
                if next == Some(closing.as_str()) {
                    lines.push(format!("{}{}{}", indent, token, closing));
                    i += 2;
                    continue;
                }
                if let (Some(text), Some(close)) = (next, after) {
                    if !text.starts_with('<') && close == closing {
                        lines.push(format!("{}{}{}{}", indent, token, text, closing));
                        i += 3;
                        continue;
                    }
                }
                lines.push(format!("{}{}", indent, token));
                depth += 1;
            }
        } else {
            lines.push(format!("{}{}", indent, collapse_whitespace(token)));
        }
        i += 1;
    }

    lines.join("\n")
}

/// Parse errors for the given markup. Empty input yields one error.
pub fn validation_errors(text: &str) -> Vec<String> {
    match parse_document(text) {
        Some(doc) => doc.errors(),
        None => vec!["empty document".to_string()],
    }
}

/// True when parsing recorded no errors.
pub fn is_valid(text: &str) -> bool {
    validation_errors(text).is_empty()
}
