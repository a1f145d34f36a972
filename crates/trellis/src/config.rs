//! Translator configuration (trellis.toml).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trellis_adapters::RenderOptions;

/// Configuration file structure.
///
/// ```toml
/// [render]
/// pretty = true
/// base_font_size = 18.0
///
/// [batch]
/// parallel = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Defaults for calls that take no explicit options (batch mode)
    #[serde(default)]
    pub render: RenderOptions,

    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Fan target conversions out over the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

fn default_parallel() -> bool {
    true
}

impl TranslatorConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file that must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded translator config");
        Ok(config)
    }

    /// Load configuration if the file exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load_optional(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        Ok(Self::default())
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_sections_are_missing() {
        let config = TranslatorConfig::from_toml("").unwrap();
        assert_eq!(config, TranslatorConfig::default());
        assert!(config.batch.parallel);
        assert_eq!(config.render.base_font_size, 16.0);
    }

    #[test]
    fn reads_render_and_batch_sections() {
        let config = TranslatorConfig::from_toml(
            "[render]\npretty = true\nbase_font_size = 18.0\n\n[batch]\nparallel = false\n",
        )
        .unwrap();

        assert!(config.render.pretty);
        assert_eq!(config.render.base_font_size, 18.0);
        assert!(config.render.utility_classes);
        assert!(!config.batch.parallel);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TranslatorConfig::load_optional(&dir.path().join("trellis.toml")).unwrap();
        assert_eq!(config, TranslatorConfig::default());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\ninclude_comments = true").unwrap();

        let config = TranslatorConfig::load_optional(file.path()).unwrap();
        assert!(config.render.include_comments);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render\npretty = ").unwrap();

        let err = TranslatorConfig::load_optional(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_requires_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TranslatorConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
