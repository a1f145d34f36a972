//! End-to-end translation scenarios.

use pretty_assertions::assert_eq;
use trellis::{
    AdapterRegistry, BatchConfig, CancelToken, Component, TranslateError, TranslateOptions, TranslationPhase, Translator,
    TranslatorConfig, CANCELLED_ERROR,
};
use trellis_adapters::{ConvertError, Converter, ParseReport, Parser, RenderContext};

const BOOTSTRAP: &str = r#"<div class="container"><div class="row"><div class="col-md-6"><button class="btn btn-primary">Go</button></div></div></div>"#;
const MACROS: &str = r#"[row][column width="1/2"][button link="http://x" color="primary"]Go[/button][/column][/row]"#;

const ALL_TARGETS: [&str; 10] = [
    "avada", "beaver", "bootstrap", "bricks", "divi", "elementor", "gutenberg", "oxygen", "tailwind", "wpbakery",
];

fn button_of(tree: &[Component]) -> Option<&Component> {
    tree.iter().find_map(|c| c.find("button"))
}

#[test]
fn markup_scenario_parses_to_a_single_container() {
    let tree = Translator::new().parse("bootstrap", BOOTSTRAP).unwrap();
    assert_eq!(tree.len(), 1);

    let container = &tree[0];
    assert!(container.is("container"));
    assert!(container.find("row").is_some());

    let column = container.find("column").unwrap();
    assert_eq!(column.attributes["grid"]["breakpoints"]["md"], "6");

    let button = container.find("button").unwrap();
    assert_eq!(button.attr_str("variant"), Some("primary"));
    assert_eq!(button.content, "Go");
}

#[test]
fn macro_scenario_parses_row_column_button() {
    let tree = Translator::new().parse("wpbakery", MACROS).unwrap();

    let row = &tree[0];
    assert!(row.is("row"));
    let column = &row.children[0];
    assert!(column.is("column"));
    assert_eq!(column.attr_str("width"), Some("50%"));
    let button = &column.children[0];
    assert!(button.is("button"));
    assert_eq!(button.attr_str("url"), Some("http://x"));
    assert_eq!(button.attr_str("variant"), Some("primary"));
    assert_eq!(button.content, "Go");
}

#[test]
fn empty_input_parses_to_nothing_for_every_dialect() {
    let translator = Translator::new();
    for id in ALL_TARGETS {
        assert!(translator.parse(id, "").unwrap().is_empty(), "{} produced components", id);
    }
}

#[test]
fn cross_dialect_round_trip_keeps_the_layout_chain() {
    let translator = Translator::new();
    let options = TranslateOptions::default();

    let macros = translator.translate("bootstrap", "wpbakery", BOOTSTRAP, &options).unwrap();
    let back = translator
        .translate("wpbakery", "bootstrap", &macros.result, &options)
        .unwrap();

    let tree = translator.parse("bootstrap", &back.result).unwrap();
    let row = tree.iter().find_map(|c| c.find("row")).unwrap();
    let column = row.find("column").unwrap();
    assert_eq!(column.attributes["grid"]["breakpoints"]["md"], "6");
    let button = column.find("button").unwrap();
    assert_eq!(button.attr_str("variant"), Some("primary"));
    assert_eq!(button.content, "Go");
}

#[test]
fn every_target_renders_the_scenario() {
    let translator = Translator::new();
    let outcomes = translator.batch_translate("bootstrap", &ALL_TARGETS, BOOTSTRAP).unwrap();
    assert_eq!(outcomes.len(), ALL_TARGETS.len());

    for (target, outcome) in &outcomes {
        assert!(outcome.success, "{} failed: {:?}", target, outcome.error);
        let result = outcome.result.as_deref().unwrap();
        assert!(!result.is_empty());
        assert!(outcome.stats.as_ref().unwrap().elements_processed >= 3);
    }

    // Structured dialects keep the button as a native element.
    for target in ["avada", "beaver", "bricks", "divi", "elementor", "gutenberg", "oxygen", "wpbakery"] {
        let rendered = outcomes[target].result.as_deref().unwrap();
        let tree = translator.parse(target, rendered).unwrap();
        let button = button_of(&tree).unwrap_or_else(|| panic!("{} lost the button", target));
        assert_eq!(button.content, "Go", "{}", target);
    }
}

#[test]
fn detection_feeds_translation() {
    let translator = Translator::new();
    let elementor = translator
        .translate("bootstrap", "elementor", BOOTSTRAP, &TranslateOptions::default())
        .unwrap();

    assert_eq!(translator.detect_framework(&elementor.result).as_deref(), Some("elementor"));
    assert!(translator.is_valid_content("elementor", &elementor.result));
    assert_eq!(translator.detect_framework(MACROS), None);
}

#[test]
fn tree_survives_json_save_and_reload() {
    let translator = Translator::new();
    let tree = translator.parse("bootstrap", BOOTSTRAP).unwrap();

    let saved = serde_json::to_string(&tree).unwrap();
    let reloaded: Vec<Component> = serde_json::from_str(&saved).unwrap();
    assert_eq!(reloaded, tree);

    let value = serde_json::to_value(&tree[0]).unwrap();
    assert_eq!(value["type"], "container");
    assert_eq!(value["category"], "layout");
    assert_eq!(value["metadata"]["source_framework"], "bootstrap");

    let options = TranslateOptions::default();
    let direct = translator.translate("bootstrap", "divi", BOOTSTRAP, &options).unwrap();
    let rerendered = translator.render("divi", &reloaded, &options).unwrap();
    assert_eq!(rerendered.result, direct.result);
}

#[test]
fn lists_ten_frameworks() {
    let frameworks = Translator::new().list_supported_frameworks();
    assert_eq!(frameworks.keys().map(String::as_str).collect::<Vec<_>>(), ALL_TARGETS.to_vec());
    assert_eq!(frameworks["tailwind"].name, "Tailwind CSS");
    assert_eq!(frameworks["beaver"].file_extension, "json");
    assert!(frameworks["wpbakery"].supported_types.iter().any(|t| t == "button"));
}

#[test]
fn unexpressible_kinds_warn_instead_of_disappearing() {
    let tree = vec![Component::new("countdown", "test").with_content("Soon")];
    let translation = Translator::new()
        .render("bootstrap", &tree, &TranslateOptions::default())
        .unwrap();

    assert!(translation.result.contains("Soon"));
    assert_eq!(translation.stats.elements_translated, 1);
    assert_eq!(translation.warnings.len(), 1);
    assert!(translation.warnings[0].starts_with("countdown has no Bootstrap equivalent"));
}

#[test]
fn dropped_source_elements_are_counted() {
    let translation = Translator::new()
        .translate(
            "wpbakery",
            "bootstrap",
            "[vc_row][vc_column][mystery_widget]x[/mystery_widget][vc_column_text]kept[/vc_column_text][/vc_column][/vc_row]",
            &TranslateOptions::default(),
        )
        .unwrap();

    assert_eq!(translation.stats.elements_skipped, 1);
    assert!(translation.result.contains("kept"));
}

struct BrokenParser;

impl Parser for BrokenParser {
    fn framework_id(&self) -> &'static str {
        "broken"
    }

    fn parse_report(&self, _content: &str) -> ParseReport {
        ParseReport::empty()
    }

    fn has_signature(&self, _content: &str) -> bool {
        false
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[]
    }
}

struct BrokenConverter;

impl Converter for BrokenConverter {
    fn framework_id(&self) -> &'static str {
        "broken"
    }

    fn render(&self, _components: &[Component], _ctx: &mut RenderContext) -> Result<String, ConvertError> {
        Err(ConvertError::Unsupported("nothing renders here".into()))
    }
}

fn translator_with_broken_target() -> Translator {
    let mut registry = AdapterRegistry::builtin();
    registry.register("Broken", "txt", BrokenParser, BrokenConverter);
    Translator::with_registry(registry)
}

#[test]
fn batch_isolates_a_failing_target() {
    let outcomes = translator_with_broken_target()
        .batch_translate("bootstrap", &["elementor", "broken", "divi"], BOOTSTRAP)
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes.values().filter(|o| !o.success).count(), 1);

    let broken = &outcomes["broken"];
    assert!(!broken.success);
    assert!(broken.result.is_none());
    assert!(broken.error.as_deref().unwrap().contains("nothing renders here"));

    for target in ["elementor", "divi"] {
        let outcome = &outcomes[target];
        assert!(outcome.success);
        assert!(outcome.error.is_none());
        assert!(!outcome.result.as_deref().unwrap().is_empty());
    }

    let json = serde_json::to_value(&outcomes).unwrap();
    assert_eq!(json["broken"]["success"], false);
    assert!(json["broken"].get("result").is_none());
    assert_eq!(json["divi"]["success"], true);
}

#[test]
fn single_translation_reports_conversion_phase() {
    let err = translator_with_broken_target()
        .translate("bootstrap", "broken", BOOTSTRAP, &TranslateOptions::default())
        .unwrap_err();

    assert!(matches!(err, TranslateError::Conversion { ref target, .. } if target == "broken"));
    assert_eq!(err.phase(), TranslationPhase::Converting);
}

#[test]
fn batch_with_unknown_source_fails_fast() {
    let err = Translator::new()
        .batch_translate("wix", &["bootstrap"], BOOTSTRAP)
        .unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedFramework { .. }));
}

#[test]
fn cancelled_batch_keeps_an_entry_per_target() {
    let cancel = CancelToken::new();
    let translator = Translator::new();

    let done = translator
        .batch_translate_with_cancel("bootstrap", &["tailwind"], BOOTSTRAP, &cancel)
        .unwrap();
    assert!(done["tailwind"].success);

    cancel.cancel();
    let outcomes = translator
        .batch_translate_with_cancel("bootstrap", &["tailwind", "elementor", "oxygen"], BOOTSTRAP, &cancel)
        .unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes
        .values()
        .all(|o| !o.success && o.error.as_deref() == Some(CANCELLED_ERROR)));
}

struct NamedParser(&'static str);

impl Parser for NamedParser {
    fn framework_id(&self) -> &'static str {
        self.0
    }

    fn parse_report(&self, _content: &str) -> ParseReport {
        ParseReport::empty()
    }

    fn has_signature(&self, _content: &str) -> bool {
        false
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Renders nothing and cancels the batch it runs in.
struct CancellingConverter(CancelToken);

impl Converter for CancellingConverter {
    fn framework_id(&self) -> &'static str {
        "canceller"
    }

    fn render(&self, _components: &[Component], _ctx: &mut RenderContext) -> Result<String, ConvertError> {
        self.0.cancel();
        Ok(String::new())
    }
}

#[test]
fn cancelling_mid_batch_stops_the_remaining_targets() {
    let cancel = CancelToken::new();
    let mut registry = AdapterRegistry::builtin();
    registry.register("Canceller", "txt", NamedParser("canceller"), CancellingConverter(cancel.clone()));
    let translator = Translator::with_registry(registry).with_config(TranslatorConfig {
        batch: BatchConfig { parallel: false },
        ..TranslatorConfig::default()
    });

    let outcomes = translator
        .batch_translate_with_cancel("bootstrap", &["tailwind", "canceller", "elementor", "oxygen"], BOOTSTRAP, &cancel)
        .unwrap();

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes["tailwind"].success);
    assert!(!outcomes["tailwind"].result.as_deref().unwrap().is_empty());
    assert!(outcomes["canceller"].success);
    for target in ["elementor", "oxygen"] {
        assert!(!outcomes[target].success);
        assert_eq!(outcomes[target].error.as_deref(), Some(CANCELLED_ERROR));
    }
}
