//! Helpers shared by the JSON element-tree dialects.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value};
use trellis_core::markup::strip_tags;
use trellis_core::style::{extract_spacing, format_number, split_number_unit, Spacing, SpacingProperty};
use trellis_core::{Component, StyleMap};

use crate::traits::{ConvertError, ParseReport, MAX_DEPTH};

/// Parse a JSON document. `None` for empty or malformed input.
pub fn read_document(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "content is not valid JSON");
            None
        }
    }
}

/// Whether the content starts like a JSON document.
pub fn looks_like_json(content: &str) -> bool {
    matches!(content.trim_start().chars().next(), Some('{') | Some('['))
}

/// Descend through wrapper objects (`{"content": ...}`) until none of the
/// wrapper keys apply.
pub fn unwrap_document<'a>(document: &'a Value, keys: &[&str]) -> &'a Value {
    let mut current = document;
    while let Value::Object(map) = current {
        match keys.iter().find_map(|key| map.get(*key)) {
            Some(inner) if inner.is_array() || inner.is_object() => current = inner,
            _ => break,
        }
    }
    current
}

/// Identifier stored as a string or a number.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Object fields of a value, or an empty map.
pub fn object_of(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// Plain text of a string setting that may hold markup.
pub fn text_setting(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(strip_tags(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// CSS size from `{"unit": "px", "size": 10}`, `"10px"` or `10`. Bare
/// numbers take `default_unit`.
pub fn size_to_css(value: &Value, default_unit: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            let size = map.get("size")?;
            let unit = map.get("unit").and_then(Value::as_str).unwrap_or(default_unit);
            let number = match size {
                Value::Number(n) => n.to_string(),
                Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                _ => return None,
            };
            Some(with_unit(&number, unit))
        }
        Value::Number(n) => Some(format!("{}{}", n, default_unit)),
        Value::String(s) if !s.trim().is_empty() => Some(with_unit(s.trim(), default_unit)),
        _ => None,
    }
}

/// Append a unit to a bare number; values that carry their own unit pass
/// through.
pub fn with_unit(value: &str, unit: &str) -> String {
    if value.parse::<f64>().is_ok() {
        format!("{}{}", value, unit)
    } else {
        value.to_string()
    }
}

/// Split `17px` into `("17", "px")`.
pub fn split_css_size(value: &str) -> Option<(String, String)> {
    let (number, unit) = split_number_unit(value)?;
    Some((format_number(number), unit.to_string()))
}

/// `{"size": 17, "unit": "px"}` for a CSS size.
pub fn css_to_size(value: &str) -> Value {
    match split_css_size(value) {
        Some((number, unit)) => {
            let size = match (number.parse::<i64>(), number.parse::<f64>()) {
                (Ok(int), _) => Value::from(int),
                (_, Ok(float)) => Value::from(float),
                _ => Value::String(number),
            };
            let unit = if unit.is_empty() { "px".to_string() } else { unit };
            json!({ "unit": unit, "size": size })
        }
        None => json!({ "unit": "px", "size": value }),
    }
}

/// Longhand styles from a four-sided dimensions object
/// (`{"unit": "px", "top": "10", ...}`).
pub fn dimensions_to_styles(value: &Value, property: SpacingProperty) -> StyleMap {
    let Value::Object(map) = value else {
        return StyleMap::new();
    };
    let unit = map.get("unit").and_then(Value::as_str).unwrap_or("px");
    let side = |name: &str| -> Option<String> {
        match map.get(name)? {
            Value::String(s) if !s.trim().is_empty() => Some(with_unit(s.trim(), unit)),
            Value::Number(n) => Some(with_unit(&n.to_string(), unit)),
            _ => None,
        }
    };
    Spacing {
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
        left: side("left"),
    }
    .to_longhands(property)
}

/// Four-sided dimensions object for a style map. `None` when no side is
/// set or the sides use different units.
pub fn styles_to_dimensions(styles: &StyleMap, property: SpacingProperty) -> Option<Value> {
    let spacing = extract_spacing(styles, property);
    if spacing.is_empty() {
        return None;
    }

    let mut unit: Option<String> = None;
    let mut sides = Map::new();
    for (side, value) in spacing.sides() {
        let number = match value {
            Some(v) => {
                let (number, side_unit) = split_css_size(v)?;
                let side_unit = if side_unit.is_empty() { "px".to_string() } else { side_unit };
                match &unit {
                    Some(u) if *u != side_unit && number != "0" => return None,
                    Some(_) => {}
                    None => unit = Some(side_unit),
                }
                number
            }
            None => String::new(),
        };
        sides.insert(side.to_string(), Value::String(number));
    }

    let first = sides.get("top").cloned();
    let linked = sides.values().all(|v| Some(v) == first.as_ref());
    sides.insert("unit".into(), Value::String(unit.unwrap_or_else(|| "px".into())));
    sides.insert("isLinked".into(), Value::Bool(linked));
    Some(Value::Object(sides))
}

/// One node of a flat parent-pointer list.
#[derive(Debug, Clone)]
pub struct FlatNode<'a> {
    pub id: String,
    pub parent: Option<String>,
    pub order: f64,
    pub data: &'a Value,
}

/// What a flat node becomes in the tree.
pub enum Assembled {
    Component(Component),
    /// No node of its own; its children attach to its parent
    Transparent,
    /// Unmapped; dropped and counted, children lifted
    Skip,
}

/// Build a tree from a flat parent-pointer list. Children are ordered by
/// `order`, then by their position in the list. Nodes caught in parent
/// cycles, or nested deeper than [`MAX_DEPTH`], are dropped and counted
/// as skipped.
pub fn assemble<'a, F>(nodes: &[FlatNode<'a>], mut convert: F) -> ParseReport
where
    F: FnMut(&FlatNode<'a>) -> Assembled,
{
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (index, node) in nodes.iter().enumerate() {
        match node.parent.as_deref() {
            Some(parent) if ids.contains(parent) && parent != node.id => {
                children.entry(parent).or_default().push(index);
            }
            _ => roots.push(index),
        }
    }
    let by_order = |list: &mut Vec<usize>| {
        list.sort_by(|a, b| nodes[*a].order.total_cmp(&nodes[*b].order).then(a.cmp(b)));
    };
    by_order(&mut roots);
    for list in children.values_mut() {
        by_order(list);
    }

    struct Walk<'n, 'a, F> {
        nodes: &'n [FlatNode<'a>],
        children: &'n HashMap<&'n str, Vec<usize>>,
        convert: F,
        visited: HashSet<usize>,
        skipped: usize,
    }

    impl<'a, F: FnMut(&FlatNode<'a>) -> Assembled> Walk<'_, 'a, F> {
        fn visit(&mut self, index: usize, depth: usize) -> Vec<Component> {
            if depth >= MAX_DEPTH || !self.visited.insert(index) {
                return Vec::new();
            }
            let nodes = self.nodes;
            let node = &nodes[index];
            let kids: Vec<Component> = self
                .children
                .get(node.id.as_str())
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .flat_map(|child| self.visit(child, depth + 1))
                .collect();

            match (self.convert)(node) {
                Assembled::Component(mut component) => {
                    component.children.extend(kids);
                    vec![component]
                }
                Assembled::Transparent => kids,
                Assembled::Skip => {
                    self.skipped += 1;
                    kids
                }
            }
        }
    }

    let mut walk = Walk {
        nodes,
        children: &children,
        convert: &mut convert,
        visited: HashSet::new(),
        skipped: 0,
    };
    let components: Vec<Component> = roots.into_iter().flat_map(|root| walk.visit(root, 0)).collect();

    let unreachable = nodes.len() - walk.visited.len();
    if unreachable > 0 {
        tracing::debug!(count = unreachable, "dropping nodes caught in parent cycles or nested too deeply");
    }

    ParseReport {
        components,
        skipped: walk.skipped + unreachable,
    }
}

/// Deterministic element-id source for rendered documents.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    state: u64,
    counter: u64,
}

impl IdGenerator {
    pub fn new(seed: &str) -> Self {
        let state = seed
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| (acc ^ b as u64).wrapping_mul(0x0100_0000_01b3));
        Self { state, counter: 0 }
    }

    fn advance(&mut self) -> u64 {
        self.counter += 1;
        // splitmix64
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Lowercase hex id of `width` characters.
    pub fn next_hex(&mut self, width: usize) -> String {
        let mut out = String::new();
        while out.len() < width {
            out.push_str(&format!("{:016x}", self.advance()));
        }
        out.truncate(width);
        out
    }

    /// Lowercase alphanumeric id of `width` characters.
    pub fn next_alnum(&mut self, width: usize) -> String {
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let mut value = self.advance();
        (0..width)
            .map(|_| {
                let c = ALPHABET[(value % ALPHABET.len() as u64) as usize] as char;
                value /= ALPHABET.len() as u64;
                c
            })
            .collect()
    }

    /// Sequential number, starting at 1.
    pub fn next_number(&mut self) -> u64 {
        self.advance();
        self.counter
    }
}

/// Serialize a rendered document.
pub fn serialize(value: &Value, pretty: bool) -> Result<String, ConvertError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

/// A top-level or row-level run: a node the dialect accepts at that level,
/// or consecutive stray nodes that need wrapping.
#[derive(Debug)]
pub enum Run<'a> {
    Node(&'a Component),
    Stray(Vec<&'a Component>),
}

/// Split components into runs, keeping nodes for which `accepted` holds.
pub fn runs<'a>(components: &'a [Component], accepted: impl Fn(&Component) -> bool) -> Vec<Run<'a>> {
    let mut out = Vec::new();
    let mut stray = Vec::new();
    for component in components {
        if accepted(component) {
            if !stray.is_empty() {
                out.push(Run::Stray(std::mem::take(&mut stray)));
            }
            out.push(Run::Node(component));
        } else {
            stray.push(component);
        }
    }
    if !stray.is_empty() {
        out.push(Run::Stray(stray));
    }
    out
}

/// Whether a node is a layout wrapper rather than content.
pub fn is_layout(component: &Component) -> bool {
    matches!(component.kind().as_str(), "section" | "container" | "row" | "column")
}

/// Settings object from attribute and style pairs, skipping empty values.
pub fn settings_from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .filter(|(_, v)| !matches!(v, Value::Null) && v.as_str() != Some(""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_wrapper_objects() {
        let doc = json!({"content": {"elements": [1, 2]}});
        assert_eq!(unwrap_document(&doc, &["content", "elements"]), &json!([1, 2]));
        let bare = json!([1]);
        assert_eq!(unwrap_document(&bare, &["content"]), &json!([1]));
    }

    #[test]
    fn reads_sizes() {
        assert_eq!(size_to_css(&json!({"unit": "em", "size": 1.5}), "px").as_deref(), Some("1.5em"));
        assert_eq!(size_to_css(&json!(12), "px").as_deref(), Some("12px"));
        assert_eq!(size_to_css(&json!("20%"), "px").as_deref(), Some("20%"));
        assert_eq!(size_to_css(&json!({"unit": "px", "size": ""}), "px"), None);
    }

    #[test]
    fn dimensions_round_trip() {
        let styles = dimensions_to_styles(
            &json!({"unit": "px", "top": "17", "right": "", "bottom": "4", "left": "", "isLinked": false}),
            SpacingProperty::Padding,
        );
        assert_eq!(styles.get("padding-top").map(String::as_str), Some("17px"));
        assert_eq!(styles.get("padding-bottom").map(String::as_str), Some("4px"));
        assert!(!styles.contains_key("padding-left"));

        let back = styles_to_dimensions(&styles, SpacingProperty::Padding).unwrap();
        assert_eq!(back["top"], json!("17"));
        assert_eq!(back["left"], json!(""));
        assert_eq!(back["unit"], json!("px"));
    }

    #[test]
    fn mixed_units_do_not_fit_dimensions() {
        let styles: StyleMap = [
            ("margin-top".to_string(), "1em".to_string()),
            ("margin-bottom".to_string(), "4px".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(styles_to_dimensions(&styles, SpacingProperty::Margin), None);
    }

    #[test]
    fn assembles_flat_lists_and_breaks_cycles() {
        let data = json!(null);
        let node = |id: &str, parent: Option<&str>, order: f64| FlatNode {
            id: id.into(),
            parent: parent.map(String::from),
            order,
            data: &data,
        };
        let nodes = vec![
            node("b", Some("a"), 2.0),
            node("a", None, 0.0),
            node("c", Some("a"), 1.0),
            node("x", Some("y"), 0.0),
            node("y", Some("x"), 0.0),
        ];
        let report = assemble(&nodes, |n| Assembled::Component(Component::new(n.id.as_str(), "test")));
        assert_eq!(report.components.len(), 1);
        let root = &report.components[0];
        assert!(root.is("a"));
        assert!(root.children[0].is("c"));
        assert!(root.children[1].is("b"));
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn transparent_nodes_lift_children() {
        let data = json!(null);
        let nodes = vec![
            FlatNode { id: "row".into(), parent: None, order: 0.0, data: &data },
            FlatNode { id: "group".into(), parent: Some("row".into()), order: 0.0, data: &data },
            FlatNode { id: "col".into(), parent: Some("group".into()), order: 0.0, data: &data },
        ];
        let report = assemble(&nodes, |n| match n.id.as_str() {
            "group" => Assembled::Transparent,
            id => Assembled::Component(Component::new(id, "test")),
        });
        assert!(report.components[0].children[0].is("col"));
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn deep_parent_chains_are_cut_off() {
        let data = json!(null);
        let nesting = 10_000;
        let nodes: Vec<FlatNode> = (0..nesting)
            .map(|i| FlatNode {
                id: format!("n{}", i),
                parent: (i > 0).then(|| format!("n{}", i - 1)),
                order: 0.0,
                data: &data,
            })
            .collect();
        let report = assemble(&nodes, |_| Assembled::Component(Component::new("container", "test")));

        let mut levels = 0;
        let mut node = report.components.first();
        while let Some(component) = node {
            levels += 1;
            node = component.children.first();
        }
        assert_eq!(levels, MAX_DEPTH);
        assert_eq!(report.skipped, nesting - MAX_DEPTH);
    }

    #[test]
    fn ids_are_deterministic() {
        let mut a = IdGenerator::new("seed");
        let mut b = IdGenerator::new("seed");
        assert_eq!(a.next_hex(7), b.next_hex(7));
        assert_eq!(a.next_hex(7).len(), 7);
        assert_eq!(a.next_alnum(6).len(), 6);
        assert_ne!(a.next_hex(7), b.next_hex(7));
    }
}
