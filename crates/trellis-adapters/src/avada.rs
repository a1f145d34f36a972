//! Avada Fusion Builder shortcodes.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use trellis_core::style::{extract_spacing, SpacingProperty};
use trellis_core::{Component, StyleMap};

use crate::normalize::{self, RenameTable};
use crate::shortcode::{self, ChildTable, ShortcodeDialect};
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "avada";

static TAG_KINDS: RenameTable = &[
    ("fusion_text", "text"),
    ("fusion_title", "heading"),
    ("fusion_button", "button"),
    ("fusion_imageframe", "image"),
    ("fusion_image", "image"),
    ("fusion_video", "video"),
    ("fusion_youtube", "video"),
    ("fusion_vimeo", "video"),
    ("fusion_audio", "audio"),
    ("fusion_gallery", "gallery"),
    ("fusion_images", "carousel"),
    ("fusion_slider", "carousel"),
    ("fusion_slide", "container"),
    ("fusion_tabs", "tabs"),
    ("fusion_tab", "tab"),
    ("fusion_accordion", "accordion"),
    ("fusion_toggle", "accordion-item"),
    ("fusion_alert", "alert"),
    ("fusion_separator", "divider"),
    ("fusion_fontawesome", "icon"),
    ("fusion_counters_box", "container"),
    ("fusion_counter_box", "counter"),
    ("fusion_counters_circle", "container"),
    ("fusion_counter_circle", "counter"),
    ("fusion_progress", "progress"),
    ("fusion_map", "map"),
    ("fusion_code", "code"),
    ("fusion_social_links", "social-icons"),
    ("fusion_testimonials", "container"),
    ("fusion_testimonial", "testimonial"),
    ("fusion_pricing_table", "pricing-table"),
    ("fusion_content_boxes", "container"),
    ("fusion_content_box", "card"),
    ("fusion_flip_boxes", "container"),
    ("fusion_flip_box", "card"),
    ("fusion_countdown", "countdown"),
    ("fusion_menu", "menu"),
    ("fusion_blog", "post-list"),
    ("fusion_post_cards", "post-list"),
    ("fusion_person", "team-member"),
    ("fusion_modal", "modal"),
    ("fusion_tagline_box", "call-to-action"),
    ("fusion_checklist", "list"),
    ("fusion_li_item", "list-item"),
    ("fusion_table", "table"),
    ("fusion_form", "form"),
    ("fusion_search", "search"),
    ("fusion_widget_area", "sidebar"),
    ("fusion_breadcrumbs", "breadcrumb"),
    ("fusion_chart", "chart"),
    ("fusion_tooltip", "tooltip"),
    ("fusion_woo_product_grid", "product-grid"),
];

static CHILD_TAGS: ChildTable = &[
    ("fusion_tabs", "fusion_tab", "tab"),
    ("fusion_accordion", "fusion_toggle", "accordion-item"),
    ("fusion_images", "fusion_image", "image"),
    ("fusion_slider", "fusion_slide", "container"),
    ("fusion_counters_box", "fusion_counter_box", "counter"),
    ("fusion_counters_circle", "fusion_counter_circle", "counter"),
    ("fusion_testimonials", "fusion_testimonial", "testimonial"),
    ("fusion_content_boxes", "fusion_content_box", "card"),
    ("fusion_flip_boxes", "fusion_flip_box", "card"),
    ("fusion_checklist", "fusion_li_item", "list-item"),
];

static PARAM_RENAMES: RenameTable = &[
    ("content_align", "alignment"),
    ("percentage", "value"),
    ("value", "value"),
    ("button_gradient_top_color", "background_color"),
    ("accent_color", "text_color"),
    ("stretch", "full_width"),
];

/// Alert types and the variants they stand for.
static ALERT_TYPES: RenameTable = &[
    ("general", "info"),
    ("error", "danger"),
    ("success", "success"),
    ("notice", "warning"),
    ("blank", "light"),
];

/// Spacing and typography settings stored as one parameter per property.
static STYLE_PARAMS: RenameTable = &[
    ("margin_top", "margin-top"),
    ("margin_right", "margin-right"),
    ("margin_bottom", "margin-bottom"),
    ("margin_left", "margin-left"),
    ("padding_top", "padding-top"),
    ("padding_right", "padding-right"),
    ("padding_bottom", "padding-bottom"),
    ("padding_left", "padding-left"),
    ("line_height", "line-height"),
    ("letter_spacing", "letter-spacing"),
    ("text_transform", "text-transform"),
    ("font_weight", "font-weight"),
    ("max_width", "max-width"),
    ("min_height", "min-height"),
    ("border_size", "border-width"),
    ("border_color", "border-color"),
    ("border_style", "border-style"),
];

fn style_param_name(property: &str) -> String {
    normalize::rename_back(STYLE_PARAMS, property)
        .map(String::from)
        .unwrap_or_else(|| property.replace('-', "_"))
}

/// Avada dialect tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct Avada;

impl ShortcodeDialect for Avada {
    fn id(&self) -> &'static str {
        ID
    }

    fn section_tags(&self) -> &'static [&'static str] {
        &["fusion_builder_container"]
    }

    fn row_tags(&self) -> &'static [&'static str] {
        &["fusion_builder_row", "fusion_builder_row_inner"]
    }

    fn column_tags(&self) -> &'static [&'static str] {
        &["fusion_builder_column", "fusion_builder_column_inner"]
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

    fn expand_param(&self, key: &str, value: &str, attributes: &mut Map<String, Value>) -> bool {
        match key {
            "size" if value.len() == 1 => match value.parse::<u64>() {
                Ok(level) if (1..=6).contains(&level) => {
                    attributes.insert("level".into(), Value::from(level));
                    true
                }
                _ => false,
            },
            "type" => match normalize::rename(ALERT_TYPES, value) {
                Some(variant) => {
                    attributes.insert("variant".into(), Value::String(variant.into()));
                    true
                }
                None => false,
            },
            _ => normalize::rename(STYLE_PARAMS, key).is_some(),
        }
    }

    fn extract_styles(&self, params: &[(String, String)]) -> StyleMap {
        params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .filter_map(|(key, value)| {
                normalize::rename(STYLE_PARAMS, key).map(|property| (property.to_string(), value.clone()))
            })
            .collect()
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
        "fusion_text"
    }

    fn collapse_params(&self, tag: &str, component: &Component, params: &mut Vec<(String, String)>) {
        if tag == "fusion_title" {
            params.retain(|(k, _)| k != "level" && k != "size");
            params.push(("size".into(), normalize::level_of(component).to_string()));
        }

        if tag == "fusion_alert" {
            if let Some(pos) = params.iter().position(|(k, _)| k == "color") {
                let (_, variant) = params.remove(pos);
                let kind = normalize::rename_back(ALERT_TYPES, &variant).unwrap_or("general");
                params.push(("type".into(), kind.into()));
            }
        }
    }

    fn style_params(&self, styles: &StyleMap) -> Vec<(String, String)> {
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

        expanded
            .into_iter()
            .map(|(property, value)| (style_param_name(&property), value))
            .collect()
    }
}

/// Parses Avada shortcodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AvadaParser;

impl Parser for AvadaParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        shortcode::parse_shortcodes(&Avada, content)
    }

    fn has_signature(&self, content: &str) -> bool {
        static SIGNATURE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\[fusion_[a-z_]+[\s\]/]").expect("Invalid avada signature regex"));
        SIGNATURE.is_match(content)
    }

    fn is_valid_content(&self, content: &str) -> bool {
        self.has_signature(content) || shortcode::has_generic_macros(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "section", "row", "column", "text", "heading", "button", "image", "video", "audio",
            "gallery", "carousel", "container", "tabs", "tab", "accordion", "accordion-item",
            "alert", "divider", "icon", "counter", "progress", "map", "code", "social-icons",
            "testimonial", "pricing-table", "card", "countdown", "menu", "post-list",
            "team-member", "modal", "call-to-action", "list", "list-item", "table", "form",
            "search", "sidebar", "breadcrumb", "chart", "tooltip", "product-grid",
        ]
    }

    fn parse_element(&self, raw: &str) -> Option<Component> {
        shortcode::parse_first_macro(&Avada, raw)
    }
}

/// Renders Avada shortcodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AvadaConverter;

impl Converter for AvadaConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        Ok(shortcode::render_shortcodes(&Avada, components, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RenderOptions;

    #[test]
    fn parses_container_layout() {
        let content = r#"[fusion_builder_container hundred_percent="no"][fusion_builder_row][fusion_builder_column type="1_3" margin_top="12px"][fusion_title size="3" content_align="center"]About[/fusion_title][fusion_alert type="error"]Careful[/fusion_alert][/fusion_builder_column][fusion_builder_column type="2_3"][fusion_imageframe]https://img.test/a.png[/fusion_imageframe][fusion_unknown_widget][/fusion_builder_column][/fusion_builder_row][/fusion_builder_container]"#;
        let report = AvadaParser.parse_report(content);
        assert_eq!(report.skipped, 1);

        let container = &report.components[0];
        assert!(container.is("section"));
        assert_eq!(container.attr_bool("hundred_percent"), Some(false));

        let first = &container.children[0].children[0];
        assert_eq!(first.attr_str("width"), Some("33.33%"));
        assert_eq!(first.styles.get("margin-top").map(String::as_str), Some("12px"));
        assert_eq!(first.attr("margin_top"), None);

        let title = &first.children[0];
        assert!(title.is("heading"));
        assert_eq!(title.attr("level"), Some(&Value::from(3)));
        assert_eq!(title.attr_str("alignment"), Some("center"));
        assert_eq!(title.content, "About");

        let alert = &first.children[1];
        assert_eq!(alert.attr_str("variant"), Some("danger"));

        let image = &container.children[0].children[1].children[0];
        assert_eq!(image.attr_str("image_url"), Some("https://img.test/a.png"));
    }

    #[test]
    fn renders_heading_level_and_spacing() {
        let tree = vec![Component::new("heading", "bootstrap")
            .with_attribute("level", 4)
            .with_style("margin-bottom", "13px")
            .with_content("Title")];
        let mut ctx = RenderContext::new("Avada Fusion", RenderOptions::default());
        let out = AvadaConverter.render(&tree, &mut ctx).unwrap();
        assert_eq!(
            out,
            r#"[fusion_builder_container][fusion_builder_row][fusion_builder_column type="1_1"][fusion_title margin_bottom="13px" size="4"]Title[/fusion_title][/fusion_builder_column][/fusion_builder_row][/fusion_builder_container]"#
        );

        let back = AvadaParser.parse(&out);
        let heading = &back[0].children[0].children[0].children[0];
        assert_eq!(heading.attr("level"), Some(&Value::from(4)));
        assert_eq!(heading.styles.get("margin-bottom").map(String::as_str), Some("13px"));
    }

    #[test]
    fn expands_margin_shorthand_into_settings() {
        let styles: StyleMap = [("margin".to_string(), "5px 10px".to_string())].into_iter().collect();
        let params = Avada.style_params(&styles);
        assert!(params.contains(&("margin_top".to_string(), "5px".to_string())));
        assert!(params.contains(&("margin_left".to_string(), "10px".to_string())));
    }

    #[test]
    fn unmappable_kinds_fall_back_to_text() {
        let tree = vec![Component::new("pagination", "bootstrap").with_content("1 2 3")];
        let mut ctx = RenderContext::new("Avada Fusion", RenderOptions::default());
        let out = AvadaConverter.render(&tree, &mut ctx).unwrap();
        assert!(out.contains("[fusion_text]1 2 3[/fusion_text]"));
        assert_eq!(
            ctx.stats().warnings,
            vec!["pagination has no Avada Fusion equivalent; rendered as fusion_text".to_string()]
        );
    }
}
