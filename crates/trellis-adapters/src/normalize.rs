//! Vocabulary shared by all dialects: rename tables, boolean coercion and
//! column-width arithmetic.

use serde_json::{Map, Value};
use trellis_core::markup::{GridSpec, BREAKPOINTS};
use trellis_core::style::format_number;
use trellis_core::Component;

/// A `(dialect name, universal name)` rename table.
pub type RenameTable = &'static [(&'static str, &'static str)];

/// HTML attribute names and their universal equivalents.
pub static HTML_ATTRIBUTES: RenameTable = &[
    ("href", "url"),
    ("src", "image_url"),
    ("id", "css_id"),
    ("alt", "alt_text"),
    ("target", "link_target"),
    ("title", "title"),
    ("rel", "rel"),
    ("placeholder", "placeholder"),
    ("name", "name"),
    ("value", "value"),
    ("type", "input_type"),
    ("role", "role"),
    ("aria-label", "label"),
];

/// Parameter names understood by every macro dialect.
pub static COMMON_PARAMS: RenameTable = &[
    ("link", "url"),
    ("url", "url"),
    ("href", "url"),
    ("button_url", "url"),
    ("link_url", "url"),
    ("el_class", "css_class"),
    ("class", "css_class"),
    ("css_class", "css_class"),
    ("module_class", "css_class"),
    ("el_id", "css_id"),
    ("id", "css_id"),
    ("css_id", "css_id"),
    ("module_id", "css_id"),
    ("color", "variant"),
    ("button_color", "variant"),
    ("target", "link_target"),
    ("link_target", "link_target"),
    ("url_new_window", "link_target"),
    ("title", "title"),
    ("text", "text"),
    ("button_text", "text"),
    ("image", "image_url"),
    ("img", "image_url"),
    ("src", "image_url"),
    ("image_url", "image_url"),
    ("alt", "alt_text"),
    ("align", "alignment"),
    ("alignment", "alignment"),
    ("text_align", "alignment"),
    ("text_orientation", "alignment"),
    ("size", "size"),
    ("font_size", "font_size"),
    ("icon", "icon"),
    ("font_icon", "icon"),
    ("width", "width"),
    ("height", "height"),
    ("bg_color", "background_color"),
    ("background_color", "background_color"),
    ("text_color", "text_color"),
    ("font_color", "text_color"),
    ("border_radius", "border_radius"),
    ("css_animation", "animation"),
    ("animation", "animation"),
    ("video", "video_url"),
    ("video_url", "video_url"),
    ("src_webm", "video_url"),
    ("address", "address"),
];

/// Parameters whose values are numbers or sizes and must never be read as
/// booleans.
const NUMERIC_PARAMS: &[&str] = &[
    "width",
    "height",
    "size",
    "font_size",
    "columns",
    "count",
    "number",
    "value",
    "level",
    "percent",
    "duration",
    "border_radius",
    "css_id",
    "title",
    "text",
];

/// Look up a name in a rename table.
pub fn rename(table: RenameTable, name: &str) -> Option<&'static str> {
    table.iter().find(|(from, _)| *from == name).map(|(_, to)| *to)
}

/// Reverse lookup: the first dialect name mapped to `universal`.
pub fn rename_back(table: RenameTable, universal: &str) -> Option<&'static str> {
    table.iter().find(|(_, to)| *to == universal).map(|(from, _)| *from)
}

/// Coerce string booleans. `None` for anything else.
pub fn coerce_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Some(true),
        "no" | "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Normalize a raw parameter value: string booleans become booleans except
/// for numeric parameters.
pub fn normalize_value(key: &str, raw: &str) -> Value {
    if !NUMERIC_PARAMS.contains(&key) {
        if let Some(flag) = coerce_bool(raw) {
            return Value::Bool(flag);
        }
    }
    Value::String(raw.to_string())
}

/// Fractions and their percentages.
pub static FRACTION_WIDTHS: &[(&str, &str)] = &[
    ("1/1", "100%"),
    ("1/2", "50%"),
    ("1/3", "33.33%"),
    ("2/3", "66.66%"),
    ("1/4", "25%"),
    ("3/4", "75%"),
    ("1/5", "20%"),
    ("2/5", "40%"),
    ("3/5", "60%"),
    ("4/5", "80%"),
    ("1/6", "16.66%"),
    ("5/6", "83.33%"),
    ("1/12", "8.33%"),
    ("5/12", "41.66%"),
    ("7/12", "58.33%"),
    ("11/12", "91.66%"),
];

/// Percentage for a fraction token. `_` is accepted as the separator.
/// Unlisted fractions are full width.
pub fn fraction_to_percent(fraction: &str) -> String {
    let normalized = fraction.trim().replace('_', "/");
    FRACTION_WIDTHS
        .iter()
        .find(|(f, _)| *f == normalized)
        .map(|(_, p)| p.to_string())
        .unwrap_or_else(|| "100%".to_string())
}

/// Closest listed fraction for a percentage.
pub fn percent_to_fraction(percent: f64) -> &'static str {
    FRACTION_WIDTHS
        .iter()
        .filter_map(|(f, p)| {
            let value: f64 = p.trim_end_matches('%').parse().ok()?;
            Some((*f, (value - percent).abs()))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(f, _)| f)
        .unwrap_or("1/1")
}

/// Parse "50%", "50" or a JSON number as a percentage.
pub fn parse_percent(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.contains('/') || s.contains('_') {
                return parse_percent(&Value::String(fraction_to_percent(s)));
            }
            s.trim_end_matches('%').trim().parse().ok()
        }
        _ => None,
    }
}

pub fn format_percent(percent: f64) -> String {
    format!("{}%", format_number(percent))
}

/// Span on a grid of `columns` for a percentage, clamped to 1..=columns.
pub fn percent_to_span(percent: f64, columns: u32) -> u32 {
    let span = (percent / 100.0 * columns as f64).round() as i64;
    span.clamp(1, columns as i64) as u32
}

pub fn span_to_percent(span: f64, columns: f64) -> f64 {
    if columns <= 0.0 {
        return 100.0;
    }
    (span / columns * 100.0 * 100.0).round() / 100.0
}

/// Width of a column component as a percentage, from `width` or, failing
/// that, the widest-breakpoint-first grid spans (md preferred).
pub fn column_percent(component: &Component) -> Option<f64> {
    if let Some(percent) = component.attr("width").and_then(parse_percent) {
        return Some(percent);
    }

    let grid = GridSpec::from_value(component.attr("grid")?);
    for breakpoint in ["md", "lg", "sm", "xl", "xxl", "xs"] {
        if let Some(size) = grid.breakpoints.get(breakpoint) {
            if let Ok(span) = size.parse::<f64>() {
                return Some(span_to_percent(span, 12.0));
            }
        }
    }
    None
}

/// Grid spans per breakpoint for a column, deriving an `md` span from
/// `width` when the component carries no grid.
pub fn column_spans(component: &Component) -> Vec<(String, String)> {
    if let Some(grid) = component.attr("grid") {
        let grid = GridSpec::from_value(grid);
        let spans: Vec<(String, String)> = BREAKPOINTS
            .iter()
            .filter_map(|bp| grid.breakpoints.get(*bp).map(|s| (bp.to_string(), s.clone())))
            .collect();
        if !spans.is_empty() {
            return spans;
        }
    }

    match component.attr("width").and_then(parse_percent) {
        Some(percent) => vec![("md".into(), percent_to_span(percent, 12).to_string())],
        None => Vec::new(),
    }
}

/// Heading level from a tag name such as `h3`.
pub fn heading_level(tag: &str) -> Option<u64> {
    let digits = tag.trim().to_lowercase();
    let level: u64 = digits.strip_prefix('h')?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Heading level of a component, defaulting to 2.
pub fn level_of(component: &Component) -> u64 {
    match component.attr("level") {
        Some(Value::Number(n)) => n.as_u64().filter(|l| (1..=6).contains(l)).unwrap_or(2),
        Some(Value::String(s)) => s
            .parse()
            .ok()
            .or_else(|| heading_level(s))
            .filter(|l| (1..=6).contains(l))
            .unwrap_or(2),
        _ => 2,
    }
}

/// Attributes rendered as plain strings, skipping structured values.
pub fn scalar_attributes(attributes: &Map<String, Value>) -> Vec<(String, String)> {
    attributes
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}

/// Kinds that hold other components rather than text.
pub const CONTAINER_KINDS: &[&str] = &[
    "section",
    "container",
    "row",
    "column",
    "card",
    "form",
    "tabs",
    "tab",
    "accordion",
    "accordion-item",
    "toggle",
    "modal",
    "carousel",
    "gallery",
    "button-group",
    "list",
    "navbar",
    "nav",
    "menu",
    "sidebar",
    "social-icons",
    "pricing-table",
    "call-to-action",
];

pub fn is_container_kind(kind: &str) -> bool {
    CONTAINER_KINDS.contains(&kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_string_booleans() {
        assert_eq!(coerce_bool("yes"), Some(true));
        assert_eq!(coerce_bool("0"), Some(false));
        assert_eq!(coerce_bool("OFF"), Some(false));
        assert_eq!(coerce_bool("primary"), None);

        assert_eq!(normalize_value("full_width", "yes"), json!(true));
        assert_eq!(normalize_value("width", "1"), json!("1"));
    }

    #[test]
    fn converts_fractions() {
        assert_eq!(fraction_to_percent("1/2"), "50%");
        assert_eq!(fraction_to_percent("1_3"), "33.33%");
        assert_eq!(fraction_to_percent("7/9"), "100%");
        assert_eq!(percent_to_fraction(50.0), "1/2");
        assert_eq!(percent_to_fraction(33.0), "1/3");
        assert_eq!(percent_to_fraction(100.0), "1/1");
    }

    #[test]
    fn converts_spans() {
        assert_eq!(percent_to_span(50.0, 12), 6);
        assert_eq!(percent_to_span(33.33, 12), 4);
        assert_eq!(percent_to_span(0.0, 12), 1);
        assert_eq!(span_to_percent(6.0, 12.0), 50.0);
        assert_eq!(span_to_percent(4.0, 12.0), 33.33);
    }

    #[test]
    fn reads_column_width_from_width_or_grid() {
        let by_width = Component::new("column", "test").with_attribute("width", "25%");
        assert_eq!(column_percent(&by_width), Some(25.0));

        let by_grid = Component::new("column", "test")
            .with_attribute("grid", json!({"column": true, "breakpoints": {"xs": "12", "md": "6"}}));
        assert_eq!(column_percent(&by_grid), Some(50.0));
        assert_eq!(
            column_spans(&by_grid),
            vec![("xs".to_string(), "12".to_string()), ("md".to_string(), "6".to_string())]
        );

        assert_eq!(
            column_spans(&by_width),
            vec![("md".to_string(), "3".to_string())]
        );
        assert_eq!(column_percent(&Component::new("column", "test")), None);
    }

    #[test]
    fn reads_heading_levels() {
        assert_eq!(heading_level("h3"), Some(3));
        assert_eq!(heading_level("h9"), None);
        let heading = Component::new("heading", "test").with_attribute("level", 4);
        assert_eq!(level_of(&heading), 4);
        assert_eq!(level_of(&Component::new("heading", "test")), 2);
    }

    #[test]
    fn rename_tables_work_both_ways() {
        assert_eq!(rename(COMMON_PARAMS, "el_class"), Some("css_class"));
        assert_eq!(rename_back(COMMON_PARAMS, "url"), Some("link"));
        assert_eq!(rename(HTML_ATTRIBUTES, "href"), Some("url"));
        assert!(COMMON_PARAMS.len() >= 30);
    }
}
