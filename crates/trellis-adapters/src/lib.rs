//! Framework adapters for translating page-builder markup.
//!
//! Each dialect has a parser into the universal component tree and a
//! converter back out of it. Dialects of the same family share an engine:
//! class-based HTML (`markup_class`), bracket macros (`shortcode`) and JSON
//! element trees (`json`).

pub mod avada;
pub mod beaver;
pub mod bootstrap;
pub mod bricks;
pub mod divi;
pub mod elementor;
pub mod gutenberg;
pub mod json;
pub mod markup_class;
pub mod normalize;
pub mod oxygen;
pub mod registry;
pub mod shortcode;
pub mod tailwind;
pub mod traits;
pub mod wpbakery;

pub use avada::{AvadaConverter, AvadaParser};
pub use beaver::{BeaverConverter, BeaverParser};
pub use bootstrap::{BootstrapConverter, BootstrapParser};
pub use bricks::{BricksConverter, BricksParser};
pub use divi::{DiviConverter, DiviParser};
pub use elementor::{ElementorConverter, ElementorParser};
pub use gutenberg::{GutenbergConverter, GutenbergParser};
pub use oxygen::{OxygenConverter, OxygenParser};
pub use registry::{Adapter, AdapterRegistry, FrameworkInfo, RegistryError};
pub use tailwind::{TailwindConverter, TailwindParser};
pub use traits::{ensure_depth, ConvertError, Converter, ParseReport, Parser, RenderContext, RenderOptions, MAX_DEPTH};
pub use wpbakery::{WpBakeryConverter, WpBakeryParser};
