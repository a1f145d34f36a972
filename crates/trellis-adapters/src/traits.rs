//! Trait definitions for framework parsers and converters.

use serde::{Deserialize, Serialize};
use trellis_core::{Component, TranslationStats};

/// Components parsed from one document plus the number of elements that
/// were dropped because their kind could not be mapped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub components: Vec<Component>,
    pub skipped: usize,
}

impl ParseReport {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Reads one dialect into the universal tree.
///
/// Parsing is lossy but never fails: malformed input yields whatever could be
/// recovered, and empty input yields an empty sequence.
pub trait Parser: Send + Sync {
    /// Framework identifier (e.g., "bootstrap", "elementor")
    fn framework_id(&self) -> &'static str;

    /// Parse a document, reporting dropped elements.
    fn parse_report(&self, content: &str) -> ParseReport;

    /// Parse a document.
    fn parse(&self, content: &str) -> Vec<Component> {
        self.parse_report(content).components
    }

    /// Strict sniff: true only when a dialect-specific signature is present.
    fn has_signature(&self, content: &str) -> bool;

    /// Permissive sniff used before committing to a parser. Falls back to
    /// accepting generic content the parser can still read.
    fn is_valid_content(&self, content: &str) -> bool {
        self.has_signature(content)
    }

    /// Element kinds this parser can produce.
    fn supported_types(&self) -> &'static [&'static str];

    /// Parse a single element outside full-document context.
    fn parse_element(&self, raw: &str) -> Option<Component> {
        self.parse(raw).into_iter().next()
    }
}

/// Options that shape converter output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Indent markup and pretty-print JSON
    pub pretty: bool,

    /// Root font size in pixels for em/rem conversions
    pub base_font_size: f64,

    /// Emit on-scale spacing as utility classes (class-based dialects)
    pub utility_classes: bool,

    /// Emit provenance comments where the dialect allows comments
    pub include_comments: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            base_font_size: 16.0,
            utility_classes: true,
            include_comments: false,
        }
    }
}

/// Mutable state threaded through one conversion.
#[derive(Debug, Clone)]
pub struct RenderContext {
    framework_name: String,
    options: RenderOptions,
    stats: TranslationStats,
}

impl RenderContext {
    /// Create a context for rendering into the named framework.
    pub fn new(framework_name: impl Into<String>, options: RenderOptions) -> Self {
        Self {
            framework_name: framework_name.into(),
            options,
            stats: TranslationStats::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn framework_name(&self) -> &str {
        &self.framework_name
    }

    /// Count one visited node. A node the target cannot express is still
    /// rendered (as `fallback`) and produces a warning.
    pub fn record(&mut self, component: &Component, expressible: bool, fallback: &str) {
        self.stats.elements_processed += 1;
        self.stats.elements_translated += 1;
        if !expressible {
            let message = format!(
                "{} has no {} equivalent; rendered as {}",
                component.kind(),
                self.framework_name,
                fallback
            );
            tracing::debug!("{}", message);
            self.stats.warn(message);
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.stats.warn(message);
    }

    pub fn stats(&self) -> &TranslationStats {
        &self.stats
    }

    pub fn into_stats(self) -> TranslationStats {
        self.stats
    }
}

/// Errors that can occur during conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Deepest tree a converter will render.
pub const MAX_DEPTH: usize = 256;

/// Reject trees deeper than `MAX_DEPTH`.
pub fn ensure_depth(components: &[Component]) -> Result<(), ConvertError> {
    fn depth(component: &Component) -> usize {
        1 + component.children.iter().map(depth).max().unwrap_or(0)
    }

    let deepest = components.iter().map(depth).max().unwrap_or(0);
    if deepest > MAX_DEPTH {
        return Err(ConvertError::InvalidTree(format!(
            "tree depth {} exceeds maximum of {}",
            deepest, MAX_DEPTH
        )));
    }
    Ok(())
}

/// Writes the universal tree out as one dialect.
pub trait Converter: Send + Sync {
    /// Framework identifier (e.g., "bootstrap", "elementor")
    fn framework_id(&self) -> &'static str;

    /// Render a forest of components.
    fn render(&self, components: &[Component], ctx: &mut RenderContext) -> Result<String, ConvertError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_and_warns_for_substitutions() {
        let mut ctx = RenderContext::new("Bootstrap", RenderOptions::default());
        ctx.record(&Component::new("button", "test"), true, "");
        ctx.record(&Component::new("countdown", "test"), false, "div");

        let stats = ctx.into_stats();
        assert_eq!(stats.elements_processed, 2);
        assert_eq!(stats.elements_translated, 2);
        assert_eq!(
            stats.warnings,
            vec!["countdown has no Bootstrap equivalent; rendered as div".to_string()]
        );
    }

    #[test]
    fn rejects_overly_deep_trees() {
        let mut node = Component::new("container", "test");
        for _ in 0..MAX_DEPTH {
            node = Component::new("container", "test").with_child(node);
        }
        assert!(matches!(
            ensure_depth(&[node]),
            Err(ConvertError::InvalidTree(_))
        ));
        assert!(ensure_depth(&[Component::new("row", "test")]).is_ok());
    }

    #[test]
    fn render_options_deserialize_with_defaults() {
        let options: RenderOptions = serde_json::from_str(r#"{"pretty": true}"#).unwrap();
        assert!(options.pretty);
        assert_eq!(options.base_font_size, 16.0);
        assert!(options.utility_classes);
    }
}
