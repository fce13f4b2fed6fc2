//! cascade-emit: output generation from a resolved build model.
//!
//! Two backends, both pure text producers over [`cascade_core::BuildModel`]:
//! [`css::emit_css`] writes the stylesheet (custom properties, theme
//! blocks, `@property` rules, component classes, media/container queries,
//! keyframes) and [`catalog::emit_catalog`] writes the JSON token catalog.
//! Every sequence is sorted before emission so output is byte-identical
//! across runs for a fixed input.

pub mod catalog;
pub mod css;

pub use catalog::emit_catalog;
pub use css::emit_css;
