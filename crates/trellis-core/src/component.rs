//! The universal component tree.
//!
//! Every parser produces a `Vec<Component>` and every converter consumes one.
//! Children are owned by value, so a tree can never share a node between two
//! parents or contain a cycle.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::style::StyleMap;

/// Normalized semantic kind of a component (e.g. "button", "row").
///
/// The vocabulary is open: dialects may introduce kinds that have no entry in
/// the category table, and those still round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentType(String);

impl ComponentType {
    /// Kind assigned to elements no table recognizes.
    pub const UNKNOWN: &'static str = "unknown";

    /// Create a kind from any string.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// The `unknown` kind.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    /// Category derived from the static lookup table.
    pub fn category(&self) -> Category {
        Category::of(&self.0)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentType {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for ComponentType {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

impl PartialEq<str> for ComponentType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ComponentType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Coarse grouping of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Layout,
    Content,
    Interactive,
    Navigation,
    Feedback,
    Form,
    Data,
    Media,
    Social,
    Blog,
    Ecommerce,
    General,
}

impl Category {
    /// Look up the category for a kind. `General` when the kind is not listed.
    pub fn of(kind: &str) -> Self {
        match kind {
            "section" | "container" | "row" | "column" | "spacer" | "divider" => Self::Layout,

            "heading" | "text" | "list" | "list-item" | "quote" | "code" | "html" | "icon"
            | "card" => Self::Content,

            "button" | "button-group" | "link" | "accordion" | "accordion-item" | "tabs"
            | "tab" | "toggle" | "modal" | "dropdown" | "call-to-action" => Self::Interactive,

            "navbar" | "nav" | "menu" | "breadcrumb" | "pagination" | "anchor" | "sidebar" => {
                Self::Navigation
            }

            "alert" | "badge" | "progress" | "spinner" | "toast" | "tooltip" | "countdown" => {
                Self::Feedback
            }

            "form" | "input" | "textarea" | "select" | "checkbox" | "radio" | "label"
            | "search" | "subscribe" => Self::Form,

            "table" | "counter" | "chart" | "pricing-table" | "rating" | "timeline" => Self::Data,

            "image" | "video" | "audio" | "gallery" | "carousel" | "map" | "embed" => Self::Media,

            "social-icons" | "social-link" | "share" | "testimonial" | "team-member" => {
                Self::Social
            }

            "post-list" | "post-title" | "post-content" | "post-meta" | "comments" | "author" => {
                Self::Blog
            }

            "product" | "product-grid" | "cart" | "add-to-cart" | "price" | "checkout" => {
                Self::Ecommerce
            }

            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Content => "content",
            Self::Interactive => "interactive",
            Self::Navigation => "navigation",
            Self::Feedback => "feedback",
            Self::Form => "form",
            Self::Data => "data",
            Self::Media => "media",
            Self::Social => "social",
            Self::Blog => "blog",
            Self::Ecommerce => "ecommerce",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a component came from. Only used for debugging and lossless
/// round-tripping, never for semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default)]
    source_framework: String,

    /// Dialect-specific tag or element type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_type: Option<String>,

    /// Raw attributes as they appeared in the source
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub original_attributes: Map<String, Value>,
}

impl Provenance {
    pub fn source_framework(&self) -> &str {
        &self.source_framework
    }
}

/// A node of the universal tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ComponentRepr")]
pub struct Component {
    #[serde(rename = "type")]
    kind: ComponentType,

    category: Category,

    /// Normalized semantic attributes (url, variant, grid, ...)
    pub attributes: Map<String, Value>,

    /// CSS property/value pairs
    pub styles: StyleMap,

    /// Literal text payload; empty for structural nodes
    pub content: String,

    metadata: Provenance,

    /// Child components, owned exclusively by this node
    pub children: Vec<Component>,
}

/// Serialized form; `category` is ignored on input and re-derived.
#[derive(Deserialize)]
struct ComponentRepr {
    #[serde(rename = "type")]
    kind: ComponentType,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    styles: StyleMap,
    #[serde(default)]
    content: String,
    #[serde(default)]
    metadata: Provenance,
    #[serde(default)]
    children: Vec<Component>,
}

impl From<ComponentRepr> for Component {
    fn from(repr: ComponentRepr) -> Self {
        let category = repr.kind.category();
        Self {
            kind: repr.kind,
            category,
            attributes: repr.attributes,
            styles: repr.styles,
            content: repr.content,
            metadata: repr.metadata,
            children: repr.children,
        }
    }
}

impl Component {
    /// Create an empty component of the given kind.
    pub fn new(kind: impl Into<ComponentType>, source_framework: &str) -> Self {
        let kind = kind.into();
        let category = kind.category();
        Self {
            kind,
            category,
            attributes: Map::new(),
            styles: StyleMap::new(),
            content: String::new(),
            metadata: Provenance {
                source_framework: source_framework.to_string(),
                ..Default::default()
            },
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> &ComponentType {
        &self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn metadata(&self) -> &Provenance {
        &self.metadata
    }

    /// Whether this component is of the given kind.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(property.into(), value.into());
        self
    }

    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.styles.extend(styles);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_child(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<Component>) -> Self {
        self.children.extend(children);
        self
    }

    /// Record the dialect-specific name and raw attributes.
    pub fn with_original(
        mut self,
        original_type: impl Into<String>,
        original_attributes: Map<String, Value>,
    ) -> Self {
        self.metadata.original_type = Some(original_type.into());
        self.metadata.original_attributes = original_attributes;
        self
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String attribute, ignoring empty strings.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Attribute rendered as text: strings as-is, numbers and booleans
    /// formatted.
    pub fn attr_text(&self, key: &str) -> Option<String> {
        match self.attributes.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Boolean attribute. Accepts real booleans and "true"/"false" strings.
    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Component::count).sum::<usize>()
    }

    /// Depth-first pre-order visit of this subtree.
    pub fn walk<F: FnMut(&Component, usize)>(&self, visit: &mut F) {
        self.walk_at(0, visit);
    }

    fn walk_at<F: FnMut(&Component, usize)>(&self, depth: usize, visit: &mut F) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }

    /// First descendant (or self) of the given kind.
    pub fn find(&self, kind: &str) -> Option<&Component> {
        if self.is(kind) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(kind))
    }
}

/// Total node count across a forest.
pub fn count_nodes(components: &[Component]) -> usize {
    components.iter().map(Component::count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_derived_from_type() {
        assert_eq!(Component::new("button", "test").category(), Category::Interactive);
        assert_eq!(Component::new("row", "test").category(), Category::Layout);
        assert_eq!(Component::new("product", "test").category(), Category::Ecommerce);
        assert_eq!(Component::new("sparkle", "test").category(), Category::General);
    }

    #[test]
    fn category_derivation_is_idempotent() {
        for kind in ["heading", "accordion", "gallery", "unknown", "post-list"] {
            let first = Category::of(kind);
            let second = Category::of(kind);
            assert_eq!(first, second);
            assert_eq!(ComponentType::new(kind).category(), first);
        }
    }

    #[test]
    fn builds_tree_bottom_up() {
        let button = Component::new("button", "bootstrap")
            .with_attribute("variant", "primary")
            .with_content("Go");
        let column = Component::new("column", "bootstrap").with_child(button);
        let row = Component::new("row", "bootstrap").with_children(vec![column]);

        assert_eq!(row.count(), 3);
        let found = row.find("button").unwrap();
        assert_eq!(found.attr_str("variant"), Some("primary"));
        assert_eq!(found.metadata().source_framework(), "bootstrap");
    }

    #[test]
    fn walk_visits_depth_first() {
        let tree = Component::new("row", "t")
            .with_child(Component::new("column", "t").with_child(Component::new("text", "t")))
            .with_child(Component::new("column", "t"));

        let mut seen = Vec::new();
        tree.walk(&mut |c, depth| seen.push((c.kind().to_string(), depth)));

        assert_eq!(
            seen,
            vec![
                ("row".to_string(), 0),
                ("column".to_string(), 1),
                ("text".to_string(), 2),
                ("column".to_string(), 1),
            ]
        );
    }

    #[test]
    fn json_round_trip_rederives_category() {
        let tree = Component::new("row", "divi")
            .with_style("margin-top", "10px")
            .with_child(Component::new("heading", "divi").with_content("Hi"))
            .with_original("et_pb_row", Map::new());

        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains(r#""type":"row""#));
        assert!(json.contains(r#""category":"layout""#));

        let back: Component = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);

        let tampered: Component =
            serde_json::from_str(r#"{"type":"button","category":"media"}"#).unwrap();
        assert_eq!(tampered.category(), Category::Interactive);
    }

    #[test]
    fn attr_bool_accepts_strings() {
        let c = Component::new("toggle", "t")
            .with_attribute("open", "true")
            .with_attribute("closed", false);
        assert_eq!(c.attr_bool("open"), Some(true));
        assert_eq!(c.attr_bool("closed"), Some(false));
        assert_eq!(c.attr_bool("missing"), None);
    }
}
