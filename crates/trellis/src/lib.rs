//! Translate page-builder layouts between framework dialects.
//!
//! Every dialect is parsed into one universal component tree, which can be
//! rendered back out in any registered dialect.
//!
//! ```no_run
//! use trellis::{TranslateOptions, Translator};
//!
//! let translator = Translator::new();
//! let translation = translator
//!     .translate("bootstrap", "elementor", "<div class=\"container\"></div>", &TranslateOptions::default())
//!     .unwrap();
//! println!("{}", translation.result);
//! ```

pub mod config;
pub mod translator;

pub use config::{BatchConfig, ConfigError, TranslatorConfig};
pub use translator::{
    BatchOutcome, CancelToken, FrameworkRole, TranslateError, Translation, TranslationPhase, Translator,
    CANCELLED_ERROR, NO_ELEMENTS_WARNING,
};
pub use trellis_adapters::{AdapterRegistry, FrameworkInfo, RenderOptions as TranslateOptions};
pub use trellis_core::{Category, Component, ComponentType, TranslationStats};
