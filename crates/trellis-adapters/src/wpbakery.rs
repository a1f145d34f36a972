//! WPBakery Page Builder shortcodes.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use trellis_core::style::{parse_inline, to_inline};
use trellis_core::{Component, StyleMap};

use crate::normalize::{self, RenameTable};
use crate::shortcode::{self, ChildTable, ShortcodeDialect};
use crate::traits::{ConvertError, Converter, ParseReport, Parser, RenderContext};

pub const ID: &str = "wpbakery";

static TAG_KINDS: RenameTable = &[
    ("vc_column_text", "text"),
    ("vc_wp_text", "text"),
    ("vc_custom_heading", "heading"),
    ("vc_btn", "button"),
    ("vc_button", "button"),
    ("vc_button2", "button"),
    ("vc_single_image", "image"),
    ("vc_gallery", "gallery"),
    ("vc_media_grid", "gallery"),
    ("vc_flickr", "gallery"),
    ("vc_images_carousel", "carousel"),
    ("vc_tta_pageable", "carousel"),
    ("vc_video", "video"),
    ("vc_tta_tabs", "tabs"),
    ("vc_tta_tour", "tabs"),
    ("vc_tabs", "tabs"),
    ("vc_tour", "tabs"),
    ("vc_tta_section", "tab"),
    ("vc_tab", "tab"),
    ("vc_tta_accordion", "accordion"),
    ("vc_accordion", "accordion"),
    ("vc_accordion_tab", "accordion-item"),
    ("vc_toggle", "toggle"),
    ("vc_message", "alert"),
    ("vc_icon", "icon"),
    ("vc_separator", "divider"),
    ("vc_text_separator", "divider"),
    ("vc_zigzag", "divider"),
    ("vc_empty_space", "spacer"),
    ("vc_gmaps", "map"),
    ("vc_progress_bar", "progress"),
    ("vc_pie", "chart"),
    ("vc_round_chart", "chart"),
    ("vc_line_chart", "chart"),
    ("vc_cta", "call-to-action"),
    ("vc_hoverbox", "card"),
    ("vc_raw_html", "html"),
    ("vc_widget_sidebar", "sidebar"),
    ("vc_basic_grid", "post-list"),
    ("vc_masonry_grid", "post-list"),
    ("vc_wp_recentposts", "post-list"),
    ("vc_wp_search", "search"),
    ("vc_wp_custommenu", "menu"),
    ("vc_facebook", "social-link"),
    ("vc_tweetmeme", "social-link"),
    ("vc_pinterest", "social-link"),
    ("contact-form-7", "form"),
];

static CHILD_TAGS: ChildTable = &[
    ("vc_tta_tabs", "vc_tta_section", "tab"),
    ("vc_tta_tour", "vc_tta_section", "tab"),
    ("vc_tta_accordion", "vc_tta_section", "accordion-item"),
    ("vc_tta_pageable", "vc_tta_section", "container"),
    ("vc_tabs", "vc_tab", "tab"),
    ("vc_tour", "vc_tab", "tab"),
    ("vc_accordion", "vc_accordion_tab", "accordion-item"),
];

static PARAM_RENAMES: RenameTable = &[
    ("message_box_color", "variant"),
    ("img_size", "image_size"),
    ("onclick", "link_action"),
    ("gap", "gap"),
    ("full_width", "full_width"),
    ("add_icon", "show_icon"),
];

static CONTENT_PARAMS: RenameTable = &[
    ("vc_btn", "title"),
    ("vc_button", "title"),
    ("vc_custom_heading", "text"),
    ("vc_text_separator", "title"),
    ("vc_cta", "h2"),
];

/// Button colour names and the variants they stand for.
static BUTTON_COLORS: RenameTable = &[
    ("blue", "primary"),
    ("grey", "secondary"),
    ("green", "success"),
    ("juicy-pink", "danger"),
    ("orange", "warning"),
    ("sky", "info"),
    ("white", "light"),
    ("black", "dark"),
];

/// Tags whose `link` parameter uses the `url:..|title:..|target:..` form.
const VC_LINK_TAGS: &[&str] = &["vc_btn", "vc_cta", "vc_custom_heading", "vc_icon", "vc_hoverbox"];

static CUSTOM_CSS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.vc_custom_\d+\s*\{([^}]*)\}").expect("Invalid vc custom css regex")
});

/// Split a `key:value|key:value` parameter, URL-decoding the values.
pub fn decode_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split('|')
        .filter_map(|pair| {
            let (key, value) = pair.split_once(':')?;
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((key.trim().to_string(), value))
        })
        .collect()
}

fn encode_pairs(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}:{}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("|")
}

/// Styles from a `css=".vc_custom_N{...}"` design-options parameter.
pub fn parse_custom_css(raw: &str) -> StyleMap {
    let Some(body) = CUSTOM_CSS_RE.captures(raw).and_then(|c| c.get(1)) else {
        return StyleMap::new();
    };
    parse_inline(&body.as_str().replace("!important", ""))
        .into_iter()
        .map(|(k, v)| (k, v.trim().to_string()))
        .collect()
}

/// Design-options class name derived from the declarations it carries.
fn custom_css_class(declarations: &str) -> String {
    let hash = declarations
        .bytes()
        .fold(1_469_598_103_934_665_603_u64, |acc, b| (acc ^ b as u64).wrapping_mul(1_099_511_628_211));
    format!("vc_custom_{}", hash % 10_000_000_000_000)
}

/// WPBakery dialect tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct WpBakery;

impl ShortcodeDialect for WpBakery {
    fn id(&self) -> &'static str {
        ID
    }

    fn section_tags(&self) -> &'static [&'static str] {
        &["vc_section"]
    }

    fn row_tags(&self) -> &'static [&'static str] {
        &["vc_row", "vc_row_inner"]
    }

    fn column_tags(&self) -> &'static [&'static str] {
        &["vc_column", "vc_column_inner"]
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
            "link" if value.contains("url:") => {
                for (name, decoded) in decode_pairs(value) {
                    if decoded.is_empty() {
                        continue;
                    }
                    let universal = match name.as_str() {
                        "url" => "url",
                        "title" => "link_title",
                        "target" => "link_target",
                        "rel" => "rel",
                        _ => continue,
                    };
                    attributes.insert(universal.into(), Value::String(decoded.trim().to_string()));
                }
                true
            }
            "color" => match normalize::rename(BUTTON_COLORS, value) {
                Some(variant) => {
                    attributes.insert("variant".into(), Value::String(variant.into()));
                    true
                }
                None => false,
            },
            "font_container" => {
                for (name, decoded) in decode_pairs(value) {
                    match name.as_str() {
                        "tag" => {
                            if let Some(level) = normalize::heading_level(&decoded) {
                                attributes.insert("level".into(), Value::from(level));
                            }
                        }
                        "text_align" => {
                            attributes.insert("alignment".into(), Value::String(decoded));
                        }
                        _ => {}
                    }
                }
                true
            }
            "css" => true,
            _ => false,
        }
    }

    fn extract_styles(&self, params: &[(String, String)]) -> StyleMap {
        let mut styles = StyleMap::new();
        for (key, value) in params {
            match key.as_str() {
                "css" => styles.extend(parse_custom_css(value)),
                "font_container" => {
                    for (name, decoded) in decode_pairs(value) {
                        match name.as_str() {
                            "font_size" => {
                                let size = if decoded.chars().all(|c| c.is_ascii_digit()) {
                                    format!("{}px", decoded)
                                } else {
                                    decoded
                                };
                                styles.insert("font-size".into(), size);
                            }
                            "color" => {
                                styles.insert("color".into(), decoded);
                            }
                            "line_height" => {
                                styles.insert("line-height".into(), decoded);
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        styles
    }

    fn fallback_tag(&self) -> &'static str {
        "vc_column_text"
    }

    fn collapse_params(&self, tag: &str, component: &Component, params: &mut Vec<(String, String)>) {
        if let Some((_, color)) = params.iter_mut().find(|(k, _)| k == "color") {
            if let Some(native) = normalize::rename_back(BUTTON_COLORS, color) {
                *color = native.to_string();
            }
        }

        if tag == "vc_custom_heading" {
            let level = normalize::level_of(component);
            params.retain(|(k, _)| k != "level" && k != "align");
            let mut pairs = vec![("tag", format!("h{}", level))];
            if let Some(alignment) = component.attr_str("alignment") {
                pairs.push(("text_align", alignment.to_string()));
            }
            params.push(("font_container".into(), encode_pairs(&pairs)));
        }

        if VC_LINK_TAGS.contains(&tag) {
            let url = component.attr_str("url").unwrap_or_default();
            if !url.is_empty() && !url.starts_with("url:") {
                let mut pairs = vec![("url", url.to_string())];
                pairs.push(("title", component.attr_str("link_title").unwrap_or_default().to_string()));
                pairs.push(("target", component.attr_str("link_target").unwrap_or_default().to_string()));
                params.retain(|(k, _)| !matches!(k.as_str(), "link" | "target" | "link_title"));
                params.push(("link".into(), encode_pairs(&pairs)));
            }
        }
    }

    fn style_params(&self, styles: &StyleMap) -> Vec<(String, String)> {
        if styles.is_empty() {
            return Vec::new();
        }
        let declarations: String = styles
            .iter()
            .map(|(k, v)| format!("{}: {} !important;", k, v))
            .collect();
        let class = custom_css_class(&to_inline(styles));
        vec![("css".into(), format!(".{}{{{}}}", class, declarations))]
    }

    fn always_close(&self) -> bool {
        false
    }
}

/// Parses WPBakery shortcodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct WpBakeryParser;

impl Parser for WpBakeryParser {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn parse_report(&self, content: &str) -> ParseReport {
        shortcode::parse_shortcodes(&WpBakery, content)
    }

    fn has_signature(&self, content: &str) -> bool {
        static SIGNATURE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\[vc_[a-z_]+[\s\]/]").expect("Invalid wpbakery signature regex"));
        SIGNATURE.is_match(content)
    }

    fn is_valid_content(&self, content: &str) -> bool {
        self.has_signature(content) || shortcode::has_generic_macros(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[
            "section", "row", "column", "text", "heading", "button", "image", "gallery", "carousel",
            "video", "tabs", "tab", "accordion", "accordion-item", "toggle", "alert", "icon",
            "divider", "spacer", "map", "progress", "chart", "call-to-action", "card", "html",
            "sidebar", "post-list", "search", "menu", "social-link", "form",
        ]
    }

    fn parse_element(&self, raw: &str) -> Option<Component> {
        shortcode::parse_first_macro(&WpBakery, raw)
    }
}

/// Renders WPBakery shortcodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct WpBakeryConverter;

impl Converter for WpBakeryConverter {
    fn framework_id(&self) -> &'static str {
        ID
    }

    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError> {
        crate::traits::ensure_depth(components)?;
        Ok(shortcode::render_shortcodes(&WpBakery, components, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RenderOptions;

    #[test]
    fn parses_generic_nesting_scenario() {
        let tree = WpBakeryParser.parse(
            r#"[row][column width="1/2"][button link="http://x" color="primary"]Go[/button][/column][/row]"#,
        );
        let button = &tree[0].children[0].children[0];
        assert!(tree[0].is("row"));
        assert_eq!(tree[0].children[0].attr_str("width"), Some("50%"));
        assert_eq!(button.attr_str("url"), Some("http://x"));
        assert_eq!(button.attr_str("variant"), Some("primary"));
        assert_eq!(button.content, "Go");
    }

    #[test]
    fn parses_native_layout() {
        let content = r#"[vc_row full_width="stretch_row"][vc_column width="1/3"][vc_custom_heading text="Hello" font_container="tag:h3|text_align:center|font_size:32|color:%23333333"][vc_btn title="Buy" color="green" link="url:https%3A%2F%2Fshop.test|title:Shop|target:_blank"][/vc_column][vc_column width="2/3" css=".vc_custom_1600000000000{margin-top: 10px !important;padding-left: 17px !important;}"][vc_column_text]<p>Body copy</p>[/vc_column_text][/vc_column][/vc_row]"#;
        let report = WpBakeryParser.parse_report(content);
        assert_eq!(report.skipped, 0);

        let row = &report.components[0];
        assert_eq!(row.attr_str("full_width"), Some("stretch_row"));

        let first = &row.children[0];
        assert_eq!(first.attr_str("width"), Some("33.33%"));
        let heading = &first.children[0];
        assert!(heading.is("heading"));
        assert_eq!(heading.content, "Hello");
        assert_eq!(heading.attr("level"), Some(&Value::from(3)));
        assert_eq!(heading.attr_str("alignment"), Some("center"));
        assert_eq!(heading.styles.get("font-size").map(String::as_str), Some("32px"));
        assert_eq!(heading.styles.get("color").map(String::as_str), Some("#333333"));

        let button = &first.children[1];
        assert_eq!(button.content, "Buy");
        assert_eq!(button.attr_str("variant"), Some("success"));
        assert_eq!(button.attr_str("url"), Some("https://shop.test"));
        assert_eq!(button.attr_str("link_target"), Some("_blank"));

        let second = &row.children[1];
        assert_eq!(second.styles.get("padding-left").map(String::as_str), Some("17px"));
        assert_eq!(second.children[0].content, "Body copy");
        assert_eq!(second.metadata().original_type.as_deref(), Some("vc_column"));
    }

    #[test]
    fn unknown_wrapper_keeps_inner_modules() {
        let content = r#"[vc_row][vc_column][my_custom_wrapper][vc_column_text]Inner text[/vc_column_text][vc_single_image image="12"][/my_custom_wrapper][/vc_column][/vc_row]"#;
        let report = WpBakeryParser.parse_report(content);
        assert_eq!(report.skipped, 1);

        let column = &report.components[0].children[0];
        assert_eq!(column.children.len(), 2);
        assert!(column.children[0].is("text"));
        assert!(column.children[0].content.contains("Inner text"));
        assert!(column.children[1].is("image"));
    }

    #[test]
    fn groups_tta_sections() {
        let content = r#"[vc_tta_accordion][vc_tta_section title="Q1"][vc_column_text]A1[/vc_column_text][/vc_tta_section][vc_tta_section title="Q2"][/vc_tta_section][/vc_tta_accordion]"#;
        let tree = WpBakeryParser.parse(content);
        let accordion = &tree[0];
        assert!(accordion.is("accordion"));
        assert_eq!(accordion.children.len(), 2);
        assert!(accordion.children[0].is("accordion-item"));
        assert_eq!(accordion.children[0].attr_str("title"), Some("Q1"));
        assert_eq!(accordion.children[0].children[0].content, "A1");
    }

    #[test]
    fn sniffs_content() {
        assert!(WpBakeryParser.has_signature("[vc_row][/vc_row]"));
        assert!(!WpBakeryParser.has_signature("[et_pb_section][/et_pb_section]"));
        assert!(!WpBakeryParser.has_signature("[row][/row]"));
        assert!(WpBakeryParser.is_valid_content("[row][/row]"));
    }

    #[test]
    fn renders_button_with_vc_link_and_colors() {
        let tree = vec![Component::new("button", "bootstrap")
            .with_attribute("url", "http://x")
            .with_attribute("variant", "primary")
            .with_content("Go")];
        let mut ctx = RenderContext::new("WPBakery", RenderOptions::default());
        let out = WpBakeryConverter.render(&tree, &mut ctx).unwrap();
        assert_eq!(
            out,
            r#"[vc_row][vc_column width="1/1"][vc_btn color="blue" link="url:http%3A%2F%2Fx|title:|target:" title="Go"][/vc_column][/vc_row]"#
        );

        let back = WpBakeryParser.parse(&out);
        let button = &back[0].children[0].children[0];
        assert_eq!(button.attr_str("url"), Some("http://x"));
        assert_eq!(button.attr_str("variant"), Some("primary"));
        assert_eq!(button.content, "Go");
    }

    #[test]
    fn keeps_off_scale_spacing_in_design_options() {
        let tree = vec![Component::new("text", "bootstrap")
            .with_style("padding-top", "17px")
            .with_content("Hi")];
        let mut ctx = RenderContext::new("WPBakery", RenderOptions::default());
        let out = WpBakeryConverter.render(&tree, &mut ctx).unwrap();
        assert!(out.contains("padding-top: 17px !important;"));
        assert!(ctx.stats().warnings.is_empty());

        let back = WpBakeryParser.parse(&out);
        let text = &back[0].children[0].children[0];
        assert_eq!(text.styles.get("padding-top").map(String::as_str), Some("17px"));
    }
}
