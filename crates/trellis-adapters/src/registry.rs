//! Framework registry for looking up parsers and converters by id.
//!
//! Holds one parser/converter pair per framework along with the display
//! name and file extension used when reporting supported frameworks.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::traits::{Converter, Parser};
use crate::{avada, beaver, bootstrap, bricks, divi, elementor, gutenberg, oxygen, tailwind, wpbakery};

/// Public description of a registered framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameworkInfo {
    /// Human-readable name
    pub name: String,

    /// Extension for files in this dialect
    pub file_extension: String,

    /// Element kinds the parser can produce
    pub supported_types: Vec<String>,
}

/// A registered framework.
#[derive(Clone)]
pub struct Adapter {
    pub name: &'static str,
    pub file_extension: &'static str,
    pub parser: Arc<dyn Parser>,
    pub converter: Arc<dyn Converter>,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("id", &self.parser.framework_id())
            .field("name", &self.name)
            .field("file_extension", &self.file_extension)
            .finish()
    }
}

/// A registry of frameworks keyed by id.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Adapter>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in framework.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("Bootstrap", "html", bootstrap::BootstrapParser, bootstrap::BootstrapConverter);
        registry.register("Tailwind CSS", "html", tailwind::TailwindParser, tailwind::TailwindConverter);
        registry.register("WordPress Blocks", "html", gutenberg::GutenbergParser, gutenberg::GutenbergConverter);
        registry.register("WPBakery", "txt", wpbakery::WpBakeryParser, wpbakery::WpBakeryConverter);
        registry.register("Divi Builder", "txt", divi::DiviParser, divi::DiviConverter);
        registry.register("Avada Fusion", "txt", avada::AvadaParser, avada::AvadaConverter);
        registry.register("Elementor", "json", elementor::ElementorParser, elementor::ElementorConverter);
        registry.register("Oxygen Builder", "json", oxygen::OxygenParser, oxygen::OxygenConverter);
        registry.register("Bricks Builder", "json", bricks::BricksParser, bricks::BricksConverter);
        registry.register("Beaver Builder", "json", beaver::BeaverParser, beaver::BeaverConverter);
        registry
    }

    /// Register a parser/converter pair. The parser's framework id is the
    /// key; a later registration replaces an earlier one.
    pub fn register<P, C>(&mut self, name: &'static str, file_extension: &'static str, parser: P, converter: C)
    where
        P: Parser + 'static,
        C: Converter + 'static,
    {
        let id = parser.framework_id().to_string();
        tracing::debug!(framework = %id, "registering framework");
        self.adapters.insert(
            id,
            Adapter {
                name,
                file_extension,
                parser: Arc::new(parser),
                converter: Arc::new(converter),
            },
        );
    }

    /// Look up a framework.
    pub fn get(&self, id: &str) -> Result<&Adapter, RegistryError> {
        self.adapters
            .get(id)
            .ok_or_else(|| RegistryError::UnsupportedFramework(id.to_string()))
    }

    pub fn parser(&self, id: &str) -> Result<&dyn Parser, RegistryError> {
        self.get(id).map(|a| a.parser.as_ref())
    }

    pub fn converter(&self, id: &str) -> Result<&dyn Converter, RegistryError> {
        self.get(id).map(|a| a.converter.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.adapters.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Description of one framework.
    pub fn info(&self, id: &str) -> Result<FrameworkInfo, RegistryError> {
        let adapter = self.get(id)?;
        Ok(FrameworkInfo {
            name: adapter.name.to_string(),
            file_extension: adapter.file_extension.to_string(),
            supported_types: adapter
                .parser
                .supported_types()
                .iter()
                .map(|t| t.to_string())
                .collect(),
        })
    }

    /// Descriptions of every framework, keyed by id.
    pub fn frameworks(&self) -> BTreeMap<String, FrameworkInfo> {
        self.adapters
            .keys()
            .filter_map(|id| Some((id.clone(), self.info(id).ok()?)))
            .collect()
    }
}

/// Errors that can occur with the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unsupported framework: {0}")]
    UnsupportedFramework(String),
}
