//! Universal component tree and the helpers shared by every dialect.
//!
//! This crate defines the framework-neutral `Component` tree that all page
//! builder dialects are parsed into and rendered from, plus helpers for
//! markup, inline styles, and nested JSON data.

pub mod component;
pub mod markup;
pub mod stats;
pub mod style;
pub mod tree;

pub use component::{count_nodes, Category, Component, ComponentType, Provenance};
pub use stats::TranslationStats;
pub use style::StyleMap;
