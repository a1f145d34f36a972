//! Dot-path utilities over nested JSON values.
//!
//! Used by the JSON element-tree dialects, whose settings live several
//! objects deep (`settings.link.url`, `style.spacing.padding.top`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::style::{capitalize, split_words};

/// Look up a value by dot-separated path. Numeric segments index arrays.
pub fn get<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(data);
    }
    path.split('.').try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// String at a path, ignoring empty strings.
pub fn get_str<'a>(data: &'a Value, path: &str) -> Option<&'a str> {
    match get(data, path)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

pub fn has(data: &Value, path: &str) -> bool {
    get(data, path).is_some()
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut().expect("value was just made an object")
}

/// Set a value by path, creating (or replacing with) objects along the way.
pub fn set(data: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        *data = value;
        return;
    }

    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = data;
    for segment in parents {
        current = ensure_object(current)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert(last.to_string(), value);
}

/// Remove the value at a path, returning it.
pub fn remove(data: &mut Value, path: &str) -> Option<Value> {
    let (parent_path, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (parent, last),
        None => ("", path),
    };

    let mut parent = data;
    if !parent_path.is_empty() {
        for segment in parent_path.split('.') {
            parent = parent.as_object_mut()?.get_mut(segment)?;
        }
    }
    parent.as_object_mut()?.remove(last)
}

/// Flatten nested objects into `a.b.c` keys. Arrays and scalars are leaves.
pub fn flatten(data: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    if let Value::Object(map) = data {
        flatten_into(map, "", &mut out);
    }
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(inner, &path, out),
            _ => {
                out.insert(path, value.clone());
            }
        }
    }
}

/// Inverse of `flatten`.
pub fn unflatten(flat: &Map<String, Value>) -> Value {
    let mut root = Value::Object(Map::new());
    for (path, value) in flat {
        set(&mut root, path, value.clone());
    }
    root
}

/// Recursive merge: nested objects merge, everything else is replaced by
/// `overlay`.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (key, value) in b {
                let next = match merged.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

/// One key's difference between two values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffEntry {
    Removed(Value),
    Added(Value),
    Changed { old: Value, new: Value },
    Nested(BTreeMap<String, DiffEntry>),
}

/// Structural diff of two objects. Keys with no difference are omitted.
/// Non-object inputs that differ produce a single entry under the empty key.
pub fn diff(a: &Value, b: &Value) -> BTreeMap<String, DiffEntry> {
    let mut out = BTreeMap::new();

    let (Value::Object(left), Value::Object(right)) = (a, b) else {
        if a != b {
            out.insert(
                String::new(),
                DiffEntry::Changed {
                    old: a.clone(),
                    new: b.clone(),
                },
            );
        }
        return out;
    };

    for (key, old) in left {
        match right.get(key) {
            None => {
                out.insert(key.clone(), DiffEntry::Removed(old.clone()));
            }
            Some(new) if old.is_object() && new.is_object() => {
                let nested = diff(old, new);
                if !nested.is_empty() {
                    out.insert(key.clone(), DiffEntry::Nested(nested));
                }
            }
            Some(new) if old != new => {
                out.insert(
                    key.clone(),
                    DiffEntry::Changed {
                        old: old.clone(),
                        new: new.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }

    for (key, new) in right {
        if !left.contains_key(key) {
            out.insert(key.clone(), DiffEntry::Added(new.clone()));
        }
    }

    out
}

/// Key naming convention for `transform_keys`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCase {
    Camel,
    Snake,
    Kebab,
}

/// Rename a single key into the given case.
pub fn convert_key(key: &str, case: KeyCase) -> String {
    let words = split_words(key);
    match case {
        KeyCase::Snake => words.join("_"),
        KeyCase::Kebab => words.join("-"),
        KeyCase::Camel => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
            .collect(),
    }
}

/// Rewrite every object key, recursively, into the given case.
pub fn transform_keys(value: &Value, case: KeyCase) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (convert_key(k, case), transform_keys(v, case)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| transform_keys(v, case)).collect()),
        other => other.clone(),
    }
}

/// JSON value kinds a schema can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Null => Self::Null,
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Number => value.is_number(),
            kind => *kind == Self::of(value),
        }
    }
}

/// Checks for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(default)]
    pub required: bool,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,

    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
}

/// Field path -> rule. Fields not listed are permitted.
pub type Schema = BTreeMap<String, FieldRule>;

/// A single schema check that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("Missing required field: {0}")]
    Missing(String),

    #[error("Field {field} should be {expected:?}, found {found:?}")]
    WrongType {
        field: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Field {field} has value {value} outside the allowed set")]
    NotAllowed { field: String, value: Value },
}

/// Check `required`, `type` and `enum` for every declared field.
pub fn validate(data: &Value, schema: &Schema) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    for (field, rule) in schema {
        let Some(value) = get(data, field) else {
            if rule.required {
                violations.push(SchemaViolation::Missing(field.clone()));
            }
            continue;
        };

        if let Some(kind) = rule.kind {
            if !kind.matches(value) {
                violations.push(SchemaViolation::WrongType {
                    field: field.clone(),
                    expected: kind,
                    found: ValueKind::of(value),
                });
                continue;
            }
        }

        if let Some(allowed) = &rule.allowed {
            if !allowed.contains(value) {
                violations.push(SchemaViolation::NotAllowed {
                    field: field.clone(),
                    value: value.clone(),
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gets_by_path() {
        let data = json!({"settings": {"link": {"url": "http://x"}, "items": [{"title": "A"}]}});
        assert_eq!(get(&data, "settings.link.url"), Some(&json!("http://x")));
        assert_eq!(get_str(&data, "settings.items.0.title"), Some("A"));
        assert_eq!(get(&data, "settings.missing.url"), None);
        assert!(has(&data, "settings.link"));
        assert!(!has(&data, "settings.link.target"));
    }

    #[test]
    fn set_creates_intermediate_levels() {
        let mut data = json!({});
        set(&mut data, "style.spacing.padding.top", json!("10px"));
        assert_eq!(data, json!({"style": {"spacing": {"padding": {"top": "10px"}}}}));

        set(&mut data, "style.spacing", json!(1));
        assert_eq!(data, json!({"style": {"spacing": 1}}));
    }

    #[test]
    fn get_does_not_create_levels() {
        let data = json!({"a": {}});
        assert!(get(&data, "a.b.c").is_none());
        assert_eq!(data, json!({"a": {}}));
    }

    #[test]
    fn removes_by_path() {
        let mut data = json!({"a": {"b": 1, "c": 2}});
        assert_eq!(remove(&mut data, "a.b"), Some(json!(1)));
        assert_eq!(remove(&mut data, "a.zzz"), None);
        assert_eq!(data, json!({"a": {"c": 2}}));
    }

    #[test]
    fn flatten_and_unflatten_are_inverse() {
        let data = json!({"a": {"b": {"c": 1}, "d": [1, 2]}, "e": "x", "f": {}});
        let flat = flatten(&data);
        assert_eq!(flat.get("a.b.c"), Some(&json!(1)));
        assert_eq!(flat.get("a.d"), Some(&json!([1, 2])));
        assert_eq!(unflatten(&flat), data);
    }

    #[test]
    fn merges_recursively() {
        let base = json!({"a": {"x": 1, "y": 2}, "b": 1});
        let overlay = json!({"a": {"y": 3}, "b": {"z": 1}});
        assert_eq!(merge(&base, &overlay), json!({"a": {"x": 1, "y": 3}, "b": {"z": 1}}));
    }

    #[test]
    fn diffs_nested_objects() {
        let a = json!({"same": 1, "gone": true, "changed": "a", "nested": {"x": 1, "y": 1}});
        let b = json!({"same": 1, "new": false, "changed": "b", "nested": {"x": 1, "y": 2}});

        let d = diff(&a, &b);
        assert_eq!(d.len(), 4);
        assert_eq!(d["gone"], DiffEntry::Removed(json!(true)));
        assert_eq!(d["new"], DiffEntry::Added(json!(false)));
        assert_eq!(
            d["changed"],
            DiffEntry::Changed {
                old: json!("a"),
                new: json!("b")
            }
        );
        let DiffEntry::Nested(inner) = &d["nested"] else {
            panic!("expected nested diff");
        };
        assert_eq!(inner.len(), 1);
        assert!(!d.contains_key("same"));
    }

    #[test]
    fn transforms_keys() {
        let data = json!({"textAlign": "center", "style": {"fontSize": "1rem"}, "items": [{"linkTarget": "_blank"}]});
        let snake = transform_keys(&data, KeyCase::Snake);
        assert_eq!(
            snake,
            json!({"text_align": "center", "style": {"font_size": "1rem"}, "items": [{"link_target": "_blank"}]})
        );
        assert_eq!(transform_keys(&snake, KeyCase::Camel), data);
        assert_eq!(convert_key("font_size", KeyCase::Kebab), "font-size");
    }

    #[test]
    fn validates_against_schema() {
        let schema: Schema = serde_json::from_value(json!({
            "elType": {"required": true, "type": "string", "enum": ["section", "column", "widget"]},
            "settings": {"type": "object"},
            "id": {"required": true}
        }))
        .unwrap();

        let ok = json!({"id": "a1", "elType": "widget", "extra": 1});
        assert!(validate(&ok, &schema).is_empty());

        let bad = json!({"elType": "spaceship", "settings": []});
        let violations = validate(&bad, &schema);
        assert_eq!(violations.len(), 3);
        assert!(violations.contains(&SchemaViolation::Missing("id".into())));
        assert!(violations
            .iter()
            .any(|v| matches!(v, SchemaViolation::NotAllowed { field, .. } if field == "elType")));
        assert!(violations
            .iter()
            .any(|v| matches!(v, SchemaViolation::WrongType { field, .. } if field == "settings")));
    }
}
