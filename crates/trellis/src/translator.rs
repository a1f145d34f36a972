//! Translation orchestrator.
//!
//! Drives one document through parse and convert, selecting the parser and
//! converter by framework id from an [`AdapterRegistry`]. Batch mode parses
//! once and converts for every target on the rayon pool.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use trellis_adapters::{Adapter, AdapterRegistry, ConvertError, FrameworkInfo, Parser, RenderContext};
use trellis_core::{Component, TranslationStats};

use crate::config::TranslatorConfig;
use crate::TranslateOptions;

/// Warning attached when non-empty input yields no components.
pub const NO_ELEMENTS_WARNING: &str = "no translatable elements found";

/// Error recorded for batch targets that never started.
pub const CANCELLED_ERROR: &str = "translation cancelled";

/// Signature sniffing order, most specific first.
const DETECTION_ORDER: [&str; 10] = [
    "elementor",
    "oxygen",
    "bricks",
    "beaver",
    "wpbakery",
    "divi",
    "avada",
    "gutenberg",
    "tailwind",
    "bootstrap",
];

/// Where a single translation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationPhase {
    Idle,
    Validating,
    Parsing,
    Converting,
    Done,
    Failed,
}

impl TranslationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationPhase::Idle => "idle",
            TranslationPhase::Validating => "validating",
            TranslationPhase::Parsing => "parsing",
            TranslationPhase::Converting => "converting",
            TranslationPhase::Done => "done",
            TranslationPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for TranslationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a translation a framework id was given for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkRole {
    Source,
    Target,
}

impl fmt::Display for FrameworkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameworkRole::Source => f.write_str("source"),
            FrameworkRole::Target => f.write_str("target"),
        }
    }
}

/// Errors that can occur during translation.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Unsupported {role} framework: {id}")]
    UnsupportedFramework { role: FrameworkRole, id: String },

    #[error("Conversion to {target} failed while {phase}: {source}")]
    Conversion {
        target: String,
        phase: TranslationPhase,
        source: ConvertError,
    },
}

impl TranslateError {
    /// Phase the translation was in when it failed.
    pub fn phase(&self) -> TranslationPhase {
        match self {
            TranslateError::UnsupportedFramework { .. } => TranslationPhase::Validating,
            TranslateError::Conversion { phase, .. } => *phase,
        }
    }
}

/// Output of a single translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub result: String,
    pub stats: TranslationStats,
    pub warnings: Vec<String>,
}

impl Translation {
    fn new(result: String, stats: TranslationStats) -> Self {
        let warnings = stats.warnings.clone();
        Self {
            result,
            stats,
            warnings,
        }
    }
}

/// Per-target slot of a batch translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<TranslationStats>,
}

impl BatchOutcome {
    fn succeeded(translation: Translation) -> Self {
        Self {
            success: true,
            result: Some(translation.result),
            error: None,
            stats: Some(translation.stats),
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            stats: None,
        }
    }
}

/// Cooperative cancellation flag shared with a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Logs phase transitions for one call.
struct Progress<'a> {
    source: &'a str,
    target: &'a str,
    phase: TranslationPhase,
}

impl<'a> Progress<'a> {
    fn new(source: &'a str, target: &'a str) -> Self {
        Self {
            source,
            target,
            phase: TranslationPhase::Idle,
        }
    }

    fn advance(&mut self, next: TranslationPhase) {
        tracing::debug!(
            source = self.source,
            target = self.target,
            from = %self.phase,
            to = %next,
            "translation phase"
        );
        self.phase = next;
    }

    fn fail(&mut self, err: TranslateError) -> TranslateError {
        tracing::debug!(
            source = self.source,
            target = self.target,
            phase = %self.phase,
            error = %err,
            "translation failed"
        );
        self.phase = TranslationPhase::Failed;
        err
    }
}

/// Translates documents between registered frameworks.
#[derive(Debug, Clone)]
pub struct Translator {
    registry: Arc<AdapterRegistry>,
    config: TranslatorConfig,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    /// A translator over every built-in framework.
    pub fn new() -> Self {
        Self::with_registry(AdapterRegistry::builtin())
    }

    /// A translator over a custom set of frameworks.
    pub fn with_registry(registry: AdapterRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            config: TranslatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TranslatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Translate `content` from the `source` dialect into `target`.
    pub fn translate(
        &self,
        source: &str,
        target: &str,
        content: &str,
        options: &TranslateOptions,
    ) -> Result<Translation, TranslateError> {
        let mut progress = Progress::new(source, target);

        progress.advance(TranslationPhase::Validating);
        let parser = self.source_parser(source).map_err(|e| progress.fail(e))?;
        let adapter = self.target_adapter(target).map_err(|e| progress.fail(e))?;

        progress.advance(TranslationPhase::Parsing);
        let (components, stats) = parse_with_stats(parser, source, content);

        progress.advance(TranslationPhase::Converting);
        let translation = convert(adapter, target, &components, stats, options).map_err(|e| progress.fail(e))?;

        progress.advance(TranslationPhase::Done);
        Ok(translation)
    }

    /// Translate into every target, parsing the source once.
    ///
    /// A failing target is recorded in its own slot and does not affect the
    /// others. Only an unsupported source fails the whole batch.
    pub fn batch_translate(
        &self,
        source: &str,
        targets: &[&str],
        content: &str,
    ) -> Result<BTreeMap<String, BatchOutcome>, TranslateError> {
        self.batch_translate_with_cancel(source, targets, content, &CancelToken::new())
    }

    /// Batch translation that stops starting new targets once `cancel` fires.
    /// Targets that already finished keep their results.
    pub fn batch_translate_with_cancel(
        &self,
        source: &str,
        targets: &[&str],
        content: &str,
        cancel: &CancelToken,
    ) -> Result<BTreeMap<String, BatchOutcome>, TranslateError> {
        let parser = self.source_parser(source)?;
        let (components, stats) = parse_with_stats(parser, source, content);
        let options = &self.config.render;

        let run = |target: &&str| -> (String, BatchOutcome) {
            let target = *target;
            if cancel.is_cancelled() {
                return (target.to_string(), BatchOutcome::failed(CANCELLED_ERROR));
            }

            let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut progress = Progress::new(source, target);
                progress.advance(TranslationPhase::Validating);
                let adapter = self.target_adapter(target).map_err(|e| progress.fail(e))?;
                progress.advance(TranslationPhase::Converting);
                let translation =
                    convert(adapter, target, &components, stats.clone(), options).map_err(|e| progress.fail(e))?;
                progress.advance(TranslationPhase::Done);
                Ok::<_, TranslateError>(translation)
            }));

            let outcome = match attempt {
                Ok(Ok(translation)) => BatchOutcome::succeeded(translation),
                Ok(Err(err)) => {
                    tracing::warn!(source, target, error = %err, "batch target failed");
                    BatchOutcome::failed(err.to_string())
                }
                Err(payload) => {
                    let message = format!("Converter for {} panicked: {}", target, panic_message(&*payload));
                    tracing::warn!(source, target, "{}", message);
                    BatchOutcome::failed(message)
                }
            };
            (target.to_string(), outcome)
        };

        let outcomes: BTreeMap<String, BatchOutcome> = if self.config.batch.parallel {
            targets.par_iter().map(&run).collect()
        } else {
            targets.iter().map(&run).collect()
        };

        let failed = outcomes.values().filter(|o| !o.success).count();
        tracing::info!(
            source,
            targets = outcomes.len(),
            failed,
            cancelled = cancel.is_cancelled(),
            "batch translation complete"
        );
        Ok(outcomes)
    }

    /// Parse a document into the universal tree without converting it.
    pub fn parse(&self, source: &str, content: &str) -> Result<Vec<Component>, TranslateError> {
        Ok(self.source_parser(source)?.parse(content))
    }

    /// Render a previously parsed (or reloaded) tree into `target`.
    pub fn render(
        &self,
        target: &str,
        components: &[Component],
        options: &TranslateOptions,
    ) -> Result<Translation, TranslateError> {
        let mut progress = Progress::new("tree", target);
        progress.advance(TranslationPhase::Validating);
        let adapter = self.target_adapter(target).map_err(|e| progress.fail(e))?;
        progress.advance(TranslationPhase::Converting);
        let translation =
            convert(adapter, target, components, TranslationStats::new(), options).map_err(|e| progress.fail(e))?;
        progress.advance(TranslationPhase::Done);
        Ok(translation)
    }

    /// Every registered framework keyed by id.
    pub fn list_supported_frameworks(&self) -> BTreeMap<String, FrameworkInfo> {
        self.registry.frameworks()
    }

    /// Permissive sniff for one framework. Unknown ids are never valid.
    pub fn is_valid_content(&self, framework_id: &str, content: &str) -> bool {
        self.registry
            .parser(framework_id)
            .map(|parser| parser.is_valid_content(content))
            .unwrap_or(false)
    }

    /// Guess the dialect of `content` from dialect-specific signatures.
    pub fn detect_framework(&self, content: &str) -> Option<String> {
        if content.trim().is_empty() {
            return None;
        }

        let mut candidates: Vec<&str> = DETECTION_ORDER.to_vec();
        candidates.extend(self.registry.ids().filter(|id| !DETECTION_ORDER.contains(id)));

        let detected = candidates
            .into_iter()
            .find(|id| {
                self.registry
                    .parser(id)
                    .map(|parser| parser.has_signature(content))
                    .unwrap_or(false)
            })
            .map(str::to_string);

        tracing::debug!(framework = ?detected, "detected framework");
        detected
    }

    fn source_parser(&self, id: &str) -> Result<&dyn Parser, TranslateError> {
        self.registry
            .parser(id)
            .map_err(|_| TranslateError::UnsupportedFramework {
                role: FrameworkRole::Source,
                id: id.to_string(),
            })
    }

    fn target_adapter(&self, id: &str) -> Result<&Adapter, TranslateError> {
        self.registry.get(id).map_err(|_| TranslateError::UnsupportedFramework {
            role: FrameworkRole::Target,
            id: id.to_string(),
        })
    }
}

/// Parse and seed the stats with what the parser dropped.
fn parse_with_stats(parser: &dyn Parser, source: &str, content: &str) -> (Vec<Component>, TranslationStats) {
    let report = parser.parse_report(content);
    let mut stats = TranslationStats::new();
    stats.elements_skipped = report.skipped;

    if report.skipped > 0 {
        tracing::debug!(source, skipped = report.skipped, "dropped unmappable elements");
    }
    if report.components.is_empty() && !content.trim().is_empty() {
        stats.warn(NO_ELEMENTS_WARNING);
    }
    (report.components, stats)
}

fn convert(
    adapter: &Adapter,
    target: &str,
    components: &[Component],
    mut stats: TranslationStats,
    options: &TranslateOptions,
) -> Result<Translation, TranslateError> {
    let mut ctx = RenderContext::new(adapter.name, options.clone());
    let result = adapter
        .converter
        .render(components, &mut ctx)
        .map_err(|source| TranslateError::Conversion {
            target: target.to_string(),
            phase: TranslationPhase::Converting,
            source,
        })?;
    stats.merge(ctx.stats());
    Ok(Translation::new(result, stats))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
