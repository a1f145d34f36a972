//! Divi Builder shortcodes.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use trellis_core::style::{extract_spacing, Spacing, SpacingProperty};
use trellis_core::{Component, StyleMap};

use crate::normalize::{self, RenameTable};
use crate::shortcode::{self, ChildTable, ShortcodeDialect};
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "divi";

static TAG_KINDS: RenameTable = &[
    ("et_pb_text", "text"),
    ("et_pb_heading", "heading"),
    ("et_pb_button", "button"),
    ("et_pb_image", "image"),
    ("et_pb_video", "video"),
    ("et_pb_audio", "audio"),
    ("et_pb_gallery", "gallery"),
    ("et_pb_slider", "carousel"),
    ("et_pb_slide", "container"),
    ("et_pb_blurb", "card"),
    ("et_pb_cta", "call-to-action"),
    ("et_pb_tabs", "tabs"),
    ("et_pb_tab", "tab"),
    ("et_pb_accordion", "accordion"),
    ("et_pb_accordion_item", "accordion-item"),
    ("et_pb_toggle", "toggle"),
    ("et_pb_divider", "divider"),
    ("et_pb_icon", "icon"),
    ("et_pb_counters", "container"),
    ("et_pb_counter", "progress"),
    ("et_pb_number_counter", "counter"),
    ("et_pb_circle_counter", "counter"),
    ("et_pb_countdown_timer", "countdown"),
    ("et_pb_contact_form", "form"),
    ("et_pb_contact_field", "input"),
    ("et_pb_signup", "subscribe"),
    ("et_pb_login", "form"),
    ("et_pb_map", "map"),
    ("et_pb_social_media_follow", "social-icons"),
    ("et_pb_social_media_follow_network", "social-link"),
    ("et_pb_testimonial", "testimonial"),
    ("et_pb_team_member", "team-member"),
    ("et_pb_pricing_tables", "pricing-table"),
    ("et_pb_pricing_table", "card"),
    ("et_pb_code", "code"),
    ("et_pb_blog", "post-list"),
    ("et_pb_post_title", "post-title"),
    ("et_pb_comments", "comments"),
    ("et_pb_sidebar", "sidebar"),
    ("et_pb_search", "search"),
    ("et_pb_menu", "menu"),
];

static CHILD_TAGS: ChildTable = &[
    ("et_pb_tabs", "et_pb_tab", "tab"),
    ("et_pb_accordion", "et_pb_accordion_item", "accordion-item"),
    ("et_pb_slider", "et_pb_slide", "container"),
    ("et_pb_counters", "et_pb_counter", "progress"),
    ("et_pb_contact_form", "et_pb_contact_field", "input"),
    ("et_pb_social_media_follow", "et_pb_social_media_follow_network", "social-link"),
    ("et_pb_pricing_tables", "et_pb_pricing_table", "card"),
];

static PARAM_RENAMES: RenameTable = &[
    ("admin_label", "label"),
    ("button_alignment", "alignment"),
    ("field_title", "label"),
    ("field_type", "input_type"),
    ("percent", "value"),
    ("number", "value"),
    ("social_network", "network"),
];

static CONTENT_PARAMS: RenameTable = &[
    ("et_pb_button", "button_text"),
    ("et_pb_heading", "title"),
];

/// Style properties stored as dedicated module settings.
static STYLE_PARAMS: RenameTable = &[
    ("max_width", "max-width"),
    ("min_height", "min-height"),
    ("text_font_size", "font-size"),
    ("text_text_color", "color"),
    ("text_line_height", "line-height"),
    ("border_radii", "border-radius"),
];

const CUSTOM_CSS: &str = "custom_css_main_element";

static HEADER_LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^h[1-6]$").expect("Invalid header level regex"));

/// Styles from a `t|r|b|l|linked|linked` spacing setting.
fn spacing_styles(raw: &str, property: SpacingProperty) -> StyleMap {
    let parts: Vec<&str> = raw.split('|').collect();
    let side = |i: usize| {
        parts
            .get(i)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && *v != "auto" && *v != "true" && *v != "false")
            .map(String::from)
    };
    Spacing {
        top: side(0),
        right: side(1),
        bottom: side(2),
        left: side(3),
    }
    .to_longhands(property)
}

fn spacing_setting(spacing: &Spacing) -> String {
    let sides: Vec<&str> = spacing.sides().iter().map(|(_, v)| v.unwrap_or("")).collect();
    format!("{}|false|false", sides.join("|"))
}

/// Styles from `custom_css_main_element`, whose declarations are separated
/// by `||`.
fn custom_css_styles(raw: &str) -> StyleMap {
    trellis_core::style::parse_inline(&raw.replace("||", ";"))
}

/// Divi dialect tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct Divi;

impl ShortcodeDialect for Divi {
    fn id(&self) -> &'static str {
        ID
    }

    fn section_tags(&self) -> &'static [&'static str] {
        &["et_pb_section", "et_pb_fullwidth_section"]
    }

    fn row_tags(&self) -> &'static [&'static str] {
        &["et_pb_row", "et_pb_row_inner"]
    }

    fn column_tags(&self) -> &'static [&'static str] {
        &["et_pb_column", "et_pb_column_inner"]
    }

    fn tag_kinds(&self) -> RenameTable {
        TAG_KINDS
    }

    fn param_renames(&self) -> RenameTable {
        PARAM_RENAMES
    }

    fn child_tags(&self) -> ChildTable {
        CHILD_TAGS
    }

    fn content_params(&self) -> RenameTable {
        CONTENT_PARAMS
    }

    fn expand_param(&self, key: &str, value: &str, attributes: &mut Map<String, Value>) -> bool {
        match key {
            "header_level" | "title_level" if HEADER_LEVEL_RE.is_match(value) => {
                if let Some(level) = normalize::heading_level(value) {
                    attributes.insert("level".into(), Value::from(level));
                }
                true
            }
            "custom_margin" | "custom_padding" | CUSTOM_CSS => true,
            _ => normalize::rename(STYLE_PARAMS, key).is_some(),
        }
    }

    fn extract_styles(&self, params: &[(String, String)]) -> StyleMap {
        let mut styles = StyleMap::new();
        for (key, value) in params {
            match key.as_str() {
                "custom_margin" => styles.extend(spacing_styles(value, SpacingProperty::Margin)),
                "custom_padding" => styles.extend(spacing_styles(value, SpacingProperty::Padding)),
                CUSTOM_CSS => styles.extend(custom_css_styles(value)),
                other => {
                    if let Some(property) = normalize::rename(STYLE_PARAMS, other) {
                        if !value.is_empty() {
                            styles.insert(property.into(), value.clone());
                        }
                    }
                }
            }
        }
        styles
    }

    fn column_width_key(&self) -> &'static str {
        "type"
    }

    fn format_fraction(&self, percent: f64) -> String {
        normalize::percent_to_fraction(percent).replace('/', "_")
    }

    fn requires_section(&self) -> bool {
        true
    }

    fn fallback_tag(&self) -> &'static str {
        "et_pb_text"
    }

    fn format_bool(&self, value: bool) -> &'static str {
        if value {
            "on"
        } else {
            "off"
        }
    }

    fn collapse_params(&self, tag: &str, component: &Component, params: &mut Vec<(String, String)>) {
        if let Some(pos) = params.iter().position(|(k, _)| k == "target") {
            let (_, target) = params.remove(pos);
            let new_window = target == "_blank" || target == "on";
            params.push(("url_new_window".into(), self.format_bool(new_window).into()));
        }

        if tag == "et_pb_button" {
            if let Some((key, _)) = params.iter_mut().find(|(k, _)| k == "link") {
                *key = "button_url".into();
            }
        }

        if component.attr("level").is_some() {
            params.retain(|(k, _)| k != "level");
            params.push(("header_level".into(), format!("h{}", normalize::level_of(component))));
        }
    }

    fn style_params(&self, styles: &StyleMap) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut leftover = StyleMap::new();

        for (property, value) in styles {
            if property.starts_with("margin") || property.starts_with("padding") {
                continue;
            }
            match normalize::rename_back(STYLE_PARAMS, property) {
                Some(key) => params.push((key.to_string(), value.clone())),
                None => {
                    leftover.insert(property.clone(), value.clone());
                }
            }
        }

        for (property, key) in [
            (SpacingProperty::Margin, "custom_margin"),
            (SpacingProperty::Padding, "custom_padding"),
        ] {
            let spacing = extract_spacing(styles, property);
            if !spacing.is_empty() {
                params.push((key.into(), spacing_setting(&spacing)));
            }
        }

        if !leftover.is_empty() {
            let declarations: Vec<String> =
                leftover.iter().map(|(k, v)| format!("{}: {};", k, v)).collect();
            params.push((CUSTOM_CSS.into(), declarations.join("||")));
        }
        params
    }
}

/// Parses Divi shortcodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiviParser;

impl Parser for DiviParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        shortcode::parse_shortcodes(&Divi, content)
    }

    fn has_signature(&self, content: &str) -> bool {
        static SIGNATURE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\[et_pb_[a-z_]+[\s\]/]").expect("Invalid divi signature regex"));
        SIGNATURE.is_match(content)
    }

    fn is_valid_content(&self, content: &str) -> bool {
        self.has_signature(content) || shortcode::has_generic_macros(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "section", "row", "column", "text", "heading", "button", "image", "video", "audio",
            "gallery", "carousel", "container", "card", "call-to-action", "tabs", "tab",
            "accordion", "accordion-item", "toggle", "divider", "icon", "progress", "counter",
            "countdown", "form", "input", "subscribe", "map", "social-icons", "social-link",
            "testimonial", "team-member", "pricing-table", "code", "post-list", "post-title",
            "comments", "sidebar", "search", "menu",
        ]
    }

    fn parse_element(&self, raw: &str) -> Option<Component> {
        shortcode::parse_first_macro(&Divi, raw)
    }
}

/// Renders Divi shortcodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiviConverter;

impl Converter for DiviConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        Ok(shortcode::render_shortcodes(&Divi, components, ctx))
    }
}
