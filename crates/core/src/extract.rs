//! Extractors: pure reads over a resolved (or pre-resolved) dictionary
//! that project tokens into the records the emitter consumes.
//!
//! Every extractor that produces a sequence sorts it deterministically;
//! output must be byte-identical across runs for a fixed input.

pub mod components;
pub mod keyframes;
pub mod metadata;
pub mod property;
pub mod responsive;

pub use components::{
    extract_components, extract_container_overrides, ComponentDef, ContainerOverride, VariantDef,
};
pub use keyframes::{extract_keyframes, KeyframeDef};
pub use metadata::{extract_metadata, TokenMetadata};
pub use property::{extract_property_tokens, PropertyToken};
pub use responsive::{breakpoints, extract_responsive, Breakpoint, ResponsiveToken};

use crate::resolve::{to_css_string, Resolver};
use serde_json::Value;

/// CSS custom-property name for a token path: `size.field-xs` becomes
/// `--size-field-xs`.
pub fn css_var_name(path: &str) -> String {
    format!("--{}", path.replace('.', "-"))
}

/// Resolve a raw payload value to its CSS text. Extraction runs after
/// validation, so failures here fall back to the raw text rather than
/// aborting the build.
pub(crate) fn resolve_text(resolver: &mut Resolver, path: &str, value: &Value) -> String {
    match resolver.resolve_value(path, value) {
        Ok(v) => to_css_string(&v),
        Err(_) => to_css_string(value),
    }
}
