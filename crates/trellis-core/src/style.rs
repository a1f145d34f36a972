//! CSS-like property parsing and normalization.
//!
//! Operates on plain `property -> value` maps. Nothing here validates CSS;
//! unrecognized input is passed through or dropped, never rejected.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// CSS property/value pairs keyed by kebab-case property name.
pub type StyleMap = BTreeMap<String, String>;

/// Parse a `prop: value; prop: value` declaration list.
pub fn parse_inline(text: &str) -> StyleMap {
    let mut styles = StyleMap::new();

    for declaration in text.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_lowercase();
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        styles.insert(property, value.to_string());
    }

    styles
}

/// Serialize a style map back into an inline declaration list.
/// Empty values are dropped.
pub fn to_inline(styles: &StyleMap) -> String {
    styles
        .iter()
        .filter(|(property, value)| !property.is_empty() && !value.trim().is_empty())
        .map(|(property, value)| format!("{}: {}", property, value.trim()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Property naming conventions used by the different dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyCase {
    /// `font-size`
    Kebab,
    /// `fontSize`
    Camel,
    /// `_font_size`
    Underscore,
}

/// Convert a property name between naming conventions.
pub fn convert_property_case(name: &str, target: PropertyCase) -> String {
    let vendor = name.starts_with('-') || name.starts_with(|c: char| c.is_ascii_uppercase());
    let words = split_words(name);
    if words.is_empty() {
        return String::new();
    }

    match target {
        PropertyCase::Kebab => {
            let joined = words.join("-");
            if vendor {
                format!("-{}", joined)
            } else {
                joined
            }
        }
        PropertyCase::Camel => {
            let mut out = String::new();
            for (i, word) in words.iter().enumerate() {
                if i == 0 && !vendor {
                    out.push_str(word);
                } else {
                    out.push_str(&capitalize(word));
                }
            }
            out
        }
        PropertyCase::Underscore => format!("_{}", words.join("_")),
    }
}

/// Split an identifier on `-`, `_` and camel-case humps into lowercase words.
pub(crate) fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in name.chars() {
        if c == '-' || c == '_' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_ascii_uppercase() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c.to_ascii_lowercase());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Target notation for `normalize_color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Hex,
    Rgb,
}

static NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("orange", "#ffa500"),
    ("purple", "#800080"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("silver", "#c0c0c0"),
    ("maroon", "#800000"),
    ("navy", "#000080"),
    ("teal", "#008080"),
    ("olive", "#808000"),
    ("lime", "#00ff00"),
    ("aqua", "#00ffff"),
    ("cyan", "#00ffff"),
    ("fuchsia", "#ff00ff"),
    ("magenta", "#ff00ff"),
    ("pink", "#ffc0cb"),
    ("brown", "#a52a2a"),
    ("gold", "#ffd700"),
    ("indigo", "#4b0082"),
    ("violet", "#ee82ee"),
    ("coral", "#ff7f50"),
    ("salmon", "#fa8072"),
    ("crimson", "#dc143c"),
    ("beige", "#f5f5dc"),
    ("tomato", "#ff6347"),
];

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*[,\s]\s*(\d{1,3})\s*[,\s]\s*(\d{1,3})\s*(?:[,/]\s*([\d.]+%?)\s*)?\)$")
        .expect("Invalid rgb regex")
});

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("Invalid hex regex")
});

/// Normalize a color value: named colors become hex, then the value is
/// converted to the requested notation. Unrecognized values pass through.
pub fn normalize_color(value: &str, target: ColorFormat) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_lowercase();

    let resolved = NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, hex)| hex.to_string())
        .unwrap_or_else(|| trimmed.to_string());

    match target {
        ColorFormat::Hex => rgb_to_hex(&resolved).unwrap_or(resolved),
        ColorFormat::Rgb => hex_to_rgb(&resolved).unwrap_or(resolved),
    }
}

fn rgb_to_hex(value: &str) -> Option<String> {
    let lower = value.to_lowercase();
    let caps = RGB_RE.captures(&lower)?;
    let channel = |i: usize| -> Option<u8> {
        caps.get(i)?
            .as_str()
            .parse::<u16>()
            .ok()
            .map(|v| v.min(255) as u8)
    };
    let (r, g, b) = (channel(1)?, channel(2)?, channel(3)?);

    let alpha = caps.get(4).and_then(|m| {
        let raw = m.as_str();
        match raw.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok().map(|p| p / 100.0),
            None => raw.parse::<f64>().ok(),
        }
    });

    match alpha {
        Some(a) if a < 1.0 => {
            let a = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
            Some(format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a))
        }
        _ => Some(format!("#{:02x}{:02x}{:02x}", r, g, b)),
    }
}

fn hex_to_rgb(value: &str) -> Option<String> {
    if !HEX_RE.is_match(value) {
        return None;
    }
    let digits = &value[1..];
    let expanded: String = if digits.len() <= 4 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let (r, g, b) = (byte(0)?, byte(2)?, byte(4)?);

    if expanded.len() == 8 {
        let a = byte(6)? as f64 / 255.0;
        Some(format!("rgba({}, {}, {}, {})", r, g, b, format_number(a)))
    } else {
        Some(format!("rgb({}, {}, {})", r, g, b))
    }
}

/// Length units understood by `convert_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssUnit {
    Px,
    Pt,
    In,
    Cm,
    Mm,
    Em,
    Rem,
}

impl CssUnit {
    pub const ALL: [CssUnit; 7] = [
        CssUnit::Px,
        CssUnit::Pt,
        CssUnit::In,
        CssUnit::Cm,
        CssUnit::Mm,
        CssUnit::Em,
        CssUnit::Rem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CssUnit::Px => "px",
            CssUnit::Pt => "pt",
            CssUnit::In => "in",
            CssUnit::Cm => "cm",
            CssUnit::Mm => "mm",
            CssUnit::Em => "em",
            CssUnit::Rem => "rem",
        }
    }

    /// Size of one unit in pixels.
    fn px_ratio(&self, base_font_size: f64) -> f64 {
        match self {
            CssUnit::Px => 1.0,
            CssUnit::Pt => 1.3333,
            CssUnit::In => 96.0,
            CssUnit::Cm => 37.795,
            CssUnit::Mm => 3.7795,
            CssUnit::Em | CssUnit::Rem => base_font_size,
        }
    }
}

impl fmt::Display for CssUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CssUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "px" | "" => Ok(CssUnit::Px),
            "pt" => Ok(CssUnit::Pt),
            "in" => Ok(CssUnit::In),
            "cm" => Ok(CssUnit::Cm),
            "mm" => Ok(CssUnit::Mm),
            "em" => Ok(CssUnit::Em),
            "rem" => Ok(CssUnit::Rem),
            other => Err(format!("unsupported unit: {}", other)),
        }
    }
}

static NUMBER_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?(?:\d+\.?\d*|\.\d+))\s*([a-zA-Z%]*)\s*$").expect("Invalid number regex")
});

/// Split `"12.5px"` into `(12.5, "px")`.
pub fn split_number_unit(value: &str) -> Option<(f64, &str)> {
    let caps = NUMBER_UNIT_RE.captures(value)?;
    let number = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((number, unit))
}

/// Round to 2 decimals and drop trailing zeros.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Convert a length between absolute and font-relative units.
///
/// A zero in any unit becomes `"0"`. Values that don't parse as a number are
/// returned unchanged.
pub fn convert_unit(value: &str, from: CssUnit, to: CssUnit, base_font_size: f64) -> String {
    let Some((number, _)) = split_number_unit(value) else {
        return value.to_string();
    };
    if number == 0.0 {
        return "0".to_string();
    }

    let px = number * from.px_ratio(base_font_size);
    let converted = px / to.px_ratio(base_font_size);
    let formatted = format_number(converted);
    if formatted == "0" {
        return formatted;
    }
    format!("{}{}", formatted, to)
}

/// Length in pixels for a value carrying its own unit.
pub fn to_pixels(value: &str, base_font_size: f64) -> Option<f64> {
    let (number, unit) = split_number_unit(value)?;
    let unit = unit.parse::<CssUnit>().ok()?;
    Some(number * unit.px_ratio(base_font_size))
}

/// `margin` or `padding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingProperty {
    Margin,
    Padding,
}

impl SpacingProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpacingProperty::Margin => "margin",
            SpacingProperty::Padding => "padding",
        }
    }
}

/// Four-sided spacing values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spacing {
    pub top: Option<String>,
    pub right: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
}

impl Spacing {
    /// Same value on every side.
    pub fn uniform(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            top: Some(value.clone()),
            right: Some(value.clone()),
            bottom: Some(value.clone()),
            left: Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }

    /// Sides in CSS order: top, right, bottom, left.
    pub fn sides(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("top", self.top.as_deref()),
            ("right", self.right.as_deref()),
            ("bottom", self.bottom.as_deref()),
            ("left", self.left.as_deref()),
        ]
    }

    /// Collapse to the shortest 1-4 value shorthand. Needs all four sides.
    pub fn to_shorthand(&self) -> Option<String> {
        let (t, r, b, l) = (
            self.top.as_deref()?,
            self.right.as_deref()?,
            self.bottom.as_deref()?,
            self.left.as_deref()?,
        );
        let value = if t == b && r == l && t == r {
            t.to_string()
        } else if t == b && r == l {
            format!("{} {}", t, r)
        } else if r == l {
            format!("{} {} {}", t, r, b)
        } else {
            format!("{} {} {} {}", t, r, b, l)
        };
        Some(value)
    }

    /// Expand into `margin-top`-style longhand declarations.
    pub fn to_longhands(&self, property: SpacingProperty) -> StyleMap {
        self.sides()
            .into_iter()
            .filter_map(|(side, value)| {
                value.map(|v| (format!("{}-{}", property.as_str(), side), v.to_string()))
            })
            .collect()
    }
}

/// Expand `margin`/`padding` shorthand, then apply longhand overrides.
pub fn extract_spacing(styles: &StyleMap, property: SpacingProperty) -> Spacing {
    let name = property.as_str();
    let mut spacing = Spacing::default();

    if let Some(shorthand) = styles.get(name) {
        let parts: Vec<&str> = shorthand.split_whitespace().collect();
        let (t, r, b, l) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l, ..] => (*t, *r, *b, *l),
            [] => ("", "", "", ""),
        };
        if !t.is_empty() {
            spacing = Spacing {
                top: Some(t.to_string()),
                right: Some(r.to_string()),
                bottom: Some(b.to_string()),
                left: Some(l.to_string()),
            };
        }
    }

    for (side, slot) in [
        ("top", &mut spacing.top),
        ("right", &mut spacing.right),
        ("bottom", &mut spacing.bottom),
        ("left", &mut spacing.left),
    ] {
        if let Some(value) = styles.get(&format!("{}-{}", name, side)) {
            *slot = Some(value.trim().to_string());
        }
    }

    spacing
}

/// Pixel steps of the utility spacing scale.
pub const SPACING_SCALE_PX: [f64; 6] = [0.0, 4.0, 8.0, 16.0, 24.0, 48.0];

/// Scale step for a literal spacing value, if it lands exactly on the scale.
pub fn spacing_step(value: &str) -> Option<usize> {
    let value = value.trim();
    if value == "0" {
        return Some(0);
    }
    let px = to_pixels(value, 16.0)?;
    SPACING_SCALE_PX
        .iter()
        .position(|step| (step - px).abs() < 0.01)
}

/// Map spacing onto utility tokens (`m-3`, `py-2`, `ms-1`...). Values off
/// the scale are dropped.
pub fn spacing_to_utility_classes(spacing: &Spacing, property: SpacingProperty) -> Vec<String> {
    let prefix = match property {
        SpacingProperty::Margin => "m",
        SpacingProperty::Padding => "p",
    };
    let step = |v: &Option<String>| v.as_deref().and_then(spacing_step);
    let (t, r, b, l) = (
        step(&spacing.top),
        step(&spacing.right),
        step(&spacing.bottom),
        step(&spacing.left),
    );

    let mut classes = Vec::new();

    if let (Some(t), Some(r), Some(b), Some(l)) = (t, r, b, l) {
        if t == r && r == b && b == l {
            classes.push(format!("{}-{}", prefix, t));
            return classes;
        }
    }

    match (t, b) {
        (Some(t), Some(b)) if t == b => classes.push(format!("{}y-{}", prefix, t)),
        _ => {
            if let Some(t) = t {
                classes.push(format!("{}t-{}", prefix, t));
            }
            if let Some(b) = b {
                classes.push(format!("{}b-{}", prefix, b));
            }
        }
    }

    match (l, r) {
        (Some(l), Some(r)) if l == r => classes.push(format!("{}x-{}", prefix, l)),
        _ => {
            if let Some(l) = l {
                classes.push(format!("{}s-{}", prefix, l));
            }
            if let Some(r) = r {
                classes.push(format!("{}e-{}", prefix, r));
            }
        }
    }

    classes
}

/// Typography-related declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Typography {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
    pub line_height: Option<String>,
    pub letter_spacing: Option<String>,
    pub text_align: Option<String>,
    pub text_transform: Option<String>,
    pub text_decoration: Option<String>,
    pub color: Option<String>,
}

impl Typography {
    pub fn is_empty(&self) -> bool {
        *self == Typography::default()
    }
}

pub fn extract_typography(styles: &StyleMap) -> Typography {
    let get = |name: &str| styles.get(name).map(|v| v.trim().to_string());
    Typography {
        font_family: get("font-family"),
        font_size: get("font-size"),
        font_weight: get("font-weight"),
        font_style: get("font-style"),
        line_height: get("line-height"),
        letter_spacing: get("letter-spacing"),
        text_align: get("text-align"),
        text_transform: get("text-transform"),
        text_decoration: get("text-decoration"),
        color: get("color"),
    }
}

/// Border-related declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Border {
    pub width: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
    pub radius: Option<String>,
}

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// Extract border fields, parsing the `border` shorthand token by token.
pub fn extract_border(styles: &StyleMap) -> Border {
    let mut border = Border::default();

    if let Some(shorthand) = styles.get("border") {
        for token in shorthand.split_whitespace() {
            let lower = token.to_lowercase();
            if token.starts_with(|c: char| c.is_ascii_digit() || c == '.')
                || matches!(lower.as_str(), "thin" | "medium" | "thick")
            {
                border.width = Some(token.to_string());
            } else if BORDER_STYLES.contains(&lower.as_str()) {
                border.style = Some(lower);
            } else {
                border.color = Some(token.to_string());
            }
        }
    }

    if let Some(v) = styles.get("border-width") {
        border.width = Some(v.trim().to_string());
    }
    if let Some(v) = styles.get("border-style") {
        border.style = Some(v.trim().to_string());
    }
    if let Some(v) = styles.get("border-color") {
        border.color = Some(v.trim().to_string());
    }
    if let Some(v) = styles.get("border-radius") {
        border.radius = Some(v.trim().to_string());
    }

    border
}

static VENDOR_PREFIXES: &[(&str, &[&str])] = &[
    ("transform", &["-webkit-", "-ms-"]),
    ("transition", &["-webkit-"]),
    ("animation", &["-webkit-"]),
    ("user-select", &["-webkit-", "-moz-", "-ms-"]),
    ("appearance", &["-webkit-", "-moz-"]),
    ("box-shadow", &["-webkit-"]),
    ("box-sizing", &["-webkit-", "-moz-"]),
    ("backdrop-filter", &["-webkit-"]),
    ("background-clip", &["-webkit-"]),
    ("filter", &["-webkit-"]),
    ("flex", &["-webkit-", "-ms-"]),
];

/// Add vendor-prefixed copies of properties that historically needed them.
/// Existing prefixed declarations are left alone.
pub fn add_vendor_prefixes(styles: &StyleMap) -> StyleMap {
    let mut out = styles.clone();
    for (property, prefixes) in VENDOR_PREFIXES {
        if let Some(value) = styles.get(*property) {
            for prefix in *prefixes {
                out.entry(format!("{}{}", prefix, property))
                    .or_insert_with(|| value.clone());
            }
        }
    }
    out
}

static CSS_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid css comment regex"));

static CSS_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([{}:;,>])\s*").expect("Invalid css punctuation regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Whitespace and comment stripping.
pub fn minify(css: &str) -> String {
    let css = CSS_COMMENT_RE.replace_all(css, "");
    let css = WHITESPACE_RE.replace_all(&css, " ");
    let css = CSS_PUNCT_RE.replace_all(&css, "$1");
    css.replace(";}", "}").trim().to_string()
}

/// One declaration per line, two-space indentation.
pub fn prettify(css: &str) -> String {
    let compact = minify(css);
    let mut out = String::new();
    let mut depth = 0usize;
    let mut line = String::new();

    let flush = |out: &mut String, line: &mut String, depth: usize| {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push_str(&"  ".repeat(depth));
            out.push_str(trimmed);
            out.push('\n');
        }
        line.clear();
    };

    for c in compact.chars() {
        match c {
            '{' => {
                line.push_str(" {");
                flush(&mut out, &mut line, depth);
                depth += 1;
            }
            ';' => {
                line.push(';');
                flush(&mut out, &mut line, depth);
            }
            '}' => {
                if !line.trim().is_empty() {
                    line.push(';');
                }
                flush(&mut out, &mut line, depth);
                depth = depth.saturating_sub(1);
                line.push('}');
                flush(&mut out, &mut line, depth);
            }
            ':' if depth > 0 => line.push_str(": "),
            _ => line.push(c),
        }
    }
    flush(&mut out, &mut line, depth);

    out.trim_end().to_string()
}

/// Shallow merge; `overrides` wins.
pub fn merge_styles(base: &StyleMap, overrides: &StyleMap) -> StyleMap {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

static ATTRIBUTE_SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("Invalid attribute selector regex"));
static PSEUDO_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"::[\w-]+|:(?:before|after|first-line|first-letter)\b")
        .expect("Invalid pseudo-element regex")
});
static PSEUDO_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[\w-]+(?:\([^)]*\))?").expect("Invalid pseudo-class regex"));
static ID_SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[\w-]+").expect("Invalid id selector regex"));
static CLASS_SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[\w-]+").expect("Invalid class selector regex"));
static ELEMENT_SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z][\w-]*").expect("Invalid element selector regex"));

/// Heuristic selector specificity:
/// `100 * ids + 10 * (classes + attributes + pseudo-classes) + elements + pseudo-elements`.
pub fn calculate_specificity(selector: &str) -> u32 {
    let mut rest = selector.to_string();
    let mut take = |re: &Regex| -> u32 {
        let count = re.find_iter(&rest).count() as u32;
        let replaced = re.replace_all(&rest, " ").into_owned();
        rest = replaced;
        count
    };

    let attributes = take(&ATTRIBUTE_SELECTOR_RE);
    let pseudo_elements = take(&PSEUDO_ELEMENT_RE);
    let pseudo_classes = take(&PSEUDO_CLASS_RE);
    let ids = take(&ID_SELECTOR_RE);
    let classes = take(&CLASS_SELECTOR_RE);
    let elements = take(&ELEMENT_SELECTOR_RE);

    100 * ids + 10 * (classes + attributes + pseudo_classes) + elements + pseudo_elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(pairs: &[(&str, &str)]) -> StyleMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_inline_styles() {
        let styles = parse_inline("color: red; margin-top:10px ;; background: url(http://x/y.png)");
        assert_eq!(styles.get("color").unwrap(), "red");
        assert_eq!(styles.get("margin-top").unwrap(), "10px");
        assert_eq!(styles.get("background").unwrap(), "url(http://x/y.png)");
        assert_eq!(styles.len(), 3);
    }

    #[test]
    fn to_inline_drops_empty_values() {
        let styles = map(&[("color", "red"), ("margin", " ")]);
        assert_eq!(to_inline(&styles), "color: red");
    }

    #[test]
    fn converts_property_case() {
        assert_eq!(convert_property_case("font-size", PropertyCase::Camel), "fontSize");
        assert_eq!(convert_property_case("fontSize", PropertyCase::Kebab), "font-size");
        assert_eq!(
            convert_property_case("background-color", PropertyCase::Underscore),
            "_background_color"
        );
        assert_eq!(convert_property_case("_margin_top", PropertyCase::Kebab), "margin-top");
        assert_eq!(
            convert_property_case("-webkit-transform", PropertyCase::Camel),
            "WebkitTransform"
        );
        assert_eq!(
            convert_property_case("WebkitTransform", PropertyCase::Kebab),
            "-webkit-transform"
        );
    }

    #[test]
    fn normalizes_colors() {
        assert_eq!(normalize_color("Red", ColorFormat::Hex), "#ff0000");
        assert_eq!(normalize_color("rgb(0, 128, 255)", ColorFormat::Hex), "#0080ff");
        assert_eq!(normalize_color("rgba(0,0,0,0.5)", ColorFormat::Hex), "#00000080");
        assert_eq!(normalize_color("#abc", ColorFormat::Hex), "#abc");
        assert_eq!(normalize_color("#ff0000", ColorFormat::Rgb), "rgb(255, 0, 0)");
        assert_eq!(normalize_color("white", ColorFormat::Rgb), "rgb(255, 255, 255)");
        assert_eq!(normalize_color("var(--brand)", ColorFormat::Hex), "var(--brand)");
    }

    #[test]
    fn converts_units() {
        assert_eq!(convert_unit("16px", CssUnit::Px, CssUnit::Rem, 16.0), "1rem");
        assert_eq!(convert_unit("1in", CssUnit::In, CssUnit::Px, 16.0), "96px");
        assert_eq!(convert_unit("12pt", CssUnit::Pt, CssUnit::Px, 16.0), "16px");
        assert_eq!(convert_unit("1.5em", CssUnit::Em, CssUnit::Px, 20.0), "30px");
        assert_eq!(convert_unit("0cm", CssUnit::Cm, CssUnit::Px, 16.0), "0");
        assert_eq!(convert_unit("auto", CssUnit::Px, CssUnit::Rem, 16.0), "auto");
    }

    #[test]
    fn expands_spacing_shorthand() {
        let spacing = extract_spacing(&map(&[("margin", "1px 2px 3px 4px")]), SpacingProperty::Margin);
        assert_eq!(
            spacing,
            Spacing {
                top: Some("1px".into()),
                right: Some("2px".into()),
                bottom: Some("3px".into()),
                left: Some("4px".into()),
            }
        );

        let uniform = extract_spacing(&map(&[("margin", "5px")]), SpacingProperty::Margin);
        assert_eq!(uniform, Spacing::uniform("5px"));

        let three = extract_spacing(&map(&[("padding", "1px 2px 3px")]), SpacingProperty::Padding);
        assert_eq!(three.left.as_deref(), Some("2px"));
        assert_eq!(three.bottom.as_deref(), Some("3px"));
    }

    #[test]
    fn longhands_override_shorthand() {
        let styles = map(&[("padding", "8px"), ("padding-left", "24px")]);
        let spacing = extract_spacing(&styles, SpacingProperty::Padding);
        assert_eq!(spacing.top.as_deref(), Some("8px"));
        assert_eq!(spacing.left.as_deref(), Some("24px"));
    }

    #[test]
    fn collapses_spacing_shorthand() {
        assert_eq!(Spacing::uniform("4px").to_shorthand().as_deref(), Some("4px"));
        let spacing = extract_spacing(&map(&[("margin", "1px 2px")]), SpacingProperty::Margin);
        assert_eq!(spacing.to_shorthand().as_deref(), Some("1px 2px"));
        let partial = Spacing {
            top: Some("1px".into()),
            ..Default::default()
        };
        assert_eq!(partial.to_shorthand(), None);
    }

    #[test]
    fn maps_spacing_to_utility_classes() {
        assert_eq!(
            spacing_to_utility_classes(&Spacing::uniform("16px"), SpacingProperty::Margin),
            vec!["m-3"]
        );

        let mixed = extract_spacing(&map(&[("padding", "8px 24px")]), SpacingProperty::Padding);
        assert_eq!(
            spacing_to_utility_classes(&mixed, SpacingProperty::Padding),
            vec!["py-2", "px-4"]
        );

        let off_scale = Spacing {
            top: Some("13px".into()),
            left: Some("4px".into()),
            ..Default::default()
        };
        assert_eq!(
            spacing_to_utility_classes(&off_scale, SpacingProperty::Margin),
            vec!["ms-1"]
        );
    }

    #[test]
    fn extracts_border_shorthand_in_any_order() {
        let border = extract_border(&map(&[("border", "solid #333 2px"), ("border-radius", "4px")]));
        assert_eq!(border.width.as_deref(), Some("2px"));
        assert_eq!(border.style.as_deref(), Some("solid"));
        assert_eq!(border.color.as_deref(), Some("#333"));
        assert_eq!(border.radius.as_deref(), Some("4px"));
    }

    #[test]
    fn extracts_typography() {
        let t = extract_typography(&map(&[("font-size", "18px"), ("text-align", "center")]));
        assert_eq!(t.font_size.as_deref(), Some("18px"));
        assert_eq!(t.text_align.as_deref(), Some("center"));
        assert!(t.color.is_none());
        assert!(extract_typography(&StyleMap::new()).is_empty());
    }

    #[test]
    fn adds_vendor_prefixes() {
        let styles = add_vendor_prefixes(&map(&[("transform", "scale(2)"), ("color", "red")]));
        assert_eq!(styles.get("-webkit-transform").unwrap(), "scale(2)");
        assert_eq!(styles.get("-ms-transform").unwrap(), "scale(2)");
        assert!(!styles.contains_key("-webkit-color"));
    }

    #[test]
    fn minifies_and_prettifies() {
        let css = "/* c */ .a  {  color : red ;  margin: 0 ; }\n\n.b{color:blue}";
        assert_eq!(minify(css), ".a{color:red;margin:0}.b{color:blue}");

        let pretty = prettify(".a{color:red;margin:0}");
        assert_eq!(pretty, ".a {\n  color: red;\n  margin: 0;\n}");
    }

    #[test]
    fn merges_styles_right_biased() {
        let merged = merge_styles(&map(&[("color", "red"), ("margin", "0")]), &map(&[("color", "blue")]));
        assert_eq!(merged.get("color").unwrap(), "blue");
        assert_eq!(merged.get("margin").unwrap(), "0");
    }

    #[test]
    fn calculates_specificity() {
        assert_eq!(calculate_specificity("#nav .item a:hover"), 121);
        assert_eq!(calculate_specificity("ul li::before"), 3);
        assert_eq!(calculate_specificity("div[data-x='1'].card"), 21);
        assert_eq!(calculate_specificity("*"), 0);
    }

    proptest! {
        #[test]
        fn inline_round_trip(entries in prop::collection::btree_map("[a-z][a-z-]{0,10}", "[a-z0-9#]{1,8}", 0..8)) {
            let styles: StyleMap = entries;
            prop_assert_eq!(parse_inline(&to_inline(&styles)), styles);
        }

        #[test]
        fn unit_identity(value in 0.01f64..10000.0, unit_index in 0usize..7) {
            let unit = CssUnit::ALL[unit_index];
            let input = format!("{}{}", format_number(value), unit);
            let expected = if format_number(value) == "0" { "0".to_string() } else { input.clone() };
            prop_assert_eq!(convert_unit(&input, unit, unit, 16.0), expected);
        }
    }
}
