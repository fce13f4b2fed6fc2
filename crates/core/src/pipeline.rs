//! The build orchestrator: load, normalize, resolve themes, validate,
//! extract. Produces the [`BuildModel`] the emitter consumes.

use crate::constraint::Constraint;
use crate::dictionary::{diff, Dictionary};
use crate::error::{BuildError, Diagnostic, Severity};
use crate::extract::{
    breakpoints, extract_components, extract_container_overrides, extract_keyframes,
    extract_metadata, extract_property_tokens, extract_responsive, Breakpoint, ComponentDef,
    ContainerOverride, KeyframeDef, PropertyToken, ResponsiveToken, TokenMetadata,
};
use crate::flatten::flatten;
use crate::loader::load_directory;
use crate::resolve::Resolver;
use crate::scale::expand_scales;
use crate::schema::{validate_layers, validate_schema};
use crate::theme::resolve_theme_inheritance;
use crate::typecheck::validate_types;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Build configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Under strict mode warnings are fatal too.
    pub strict: bool,
}

/// One resolved theme: the fully-merged dictionary, its resolved table,
/// and the subtree that actually differs from base (what the emitter
/// writes into the theme block).
#[derive(Debug, Clone)]
pub struct ThemeModel {
    pub dictionary: Dictionary,
    pub resolved: BTreeMap<String, Value>,
    pub changed: Map<String, Value>,
}

/// Everything the emitter needs, plus the accumulated diagnostics.
#[derive(Debug)]
pub struct BuildModel {
    pub base: Dictionary,
    pub resolved: BTreeMap<String, Value>,
    pub themes: BTreeMap<String, ThemeModel>,
    pub breakpoints: Vec<Breakpoint>,
    pub components: Vec<ComponentDef>,
    pub container_overrides: Vec<ContainerOverride>,
    pub keyframes: Vec<KeyframeDef>,
    pub responsive: Vec<ResponsiveToken>,
    pub properties: Vec<PropertyToken>,
    pub metadata: Vec<TokenMetadata>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildModel {
    /// True when any diagnostic is fatal under the given options.
    pub fn has_errors(&self, options: BuildOptions) -> bool {
        self.diagnostics.iter().any(|d| {
            d.severity == Severity::Error || (options.strict && d.severity == Severity::Warning)
        })
    }
}

/// Run the full pipeline over a source directory.
pub fn build(dir: &Path, _options: BuildOptions) -> Result<BuildModel, BuildError> {
    let mut loaded = load_directory(dir)?;
    let mut diagnostics = std::mem::take(&mut loaded.warnings);

    expand_scales(&mut loaded.base)?;
    let themes = resolve_theme_inheritance(&loaded.base, &loaded.themes)?;

    diagnostics.extend(validate_dictionary(&loaded.base));
    for (name, theme_dict) in &themes {
        for mut diag in validate_dictionary(theme_dict) {
            diag.message = format!("theme '{}': {}", name, diag.message);
            diagnostics.push(diag);
        }
    }

    let base = loaded.base;
    let flat = flatten(&base);
    let mut resolver = Resolver::new(&flat);
    let resolved = resolve_lenient(&mut resolver, &flat);

    let mut theme_models = BTreeMap::new();
    for (name, dict) in themes {
        let theme_flat = flatten(&dict);
        let mut theme_resolver = Resolver::new(&theme_flat);
        let theme_resolved = resolve_lenient(&mut theme_resolver, &theme_flat);
        let changed = diff(&dict.root, &base.root);
        theme_models.insert(
            name,
            ThemeModel {
                dictionary: dict,
                resolved: theme_resolved,
                changed,
            },
        );
    }

    let mut resolver = Resolver::new(&flat);
    let model = BuildModel {
        breakpoints: breakpoints(&base),
        components: extract_components(&base, &mut resolver),
        container_overrides: extract_container_overrides(&base, &mut resolver),
        keyframes: extract_keyframes(&base, &mut resolver),
        responsive: extract_responsive(&base, &mut resolver),
        properties: extract_property_tokens(&base, &mut resolver),
        metadata: extract_metadata(&base, &mut resolver),
        base,
        resolved,
        themes: theme_models,
        diagnostics,
    };
    Ok(model)
}

/// Resolve every path, keeping the raw value where resolution fails;
/// the failures were already reported by [`validate_dictionary`].
fn resolve_lenient(
    resolver: &mut Resolver,
    flat: &BTreeMap<String, Value>,
) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for (path, raw) in flat {
        let value = resolver.resolve_path(path).unwrap_or_else(|_| raw.clone());
        out.insert(path.clone(), value);
    }
    out
}

/// The accumulating validator: shape, references and expressions, types,
/// constraints, layer policy. Collects every discoverable diagnostic.
pub fn validate_dictionary(dict: &Dictionary) -> Vec<Diagnostic> {
    let mut out = validate_schema(dict);

    // Reference and expression resolution
    let flat = flatten(dict);
    let mut resolver = Resolver::new(&flat);
    for path in flat.keys() {
        if let Err(err) = resolver.resolve_path(path) {
            out.push(
                Diagnostic::error(err.kind(), path, err.to_string())
                    .with_file(dict.source_file(path)),
            );
        }
    }

    out.extend(validate_types(dict));

    // Constraints, checked against the resolved value when available
    let mut resolver = Resolver::new(&flat);
    dict.walk_tokens(|path, token| {
        let constraint = match Constraint::from_token(token, path) {
            Ok(Some(c)) => c,
            Ok(None) => return,
            Err(err) => {
                out.push(
                    Diagnostic::error(err.kind(), path, err.to_string())
                        .with_file(dict.source_file(path)),
                );
                return;
            }
        };
        let value = match resolver.resolve_path(path) {
            Ok(v) => v,
            // Already reported above
            Err(_) => return,
        };
        if let Err(err) = constraint.check(&value, path) {
            out.push(
                Diagnostic::error(err.kind(), path, err.to_string())
                    .with_file(dict.source_file(path)),
            );
        }
    });

    out.extend(validate_layers(dict));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(v: Value) -> Dictionary {
        Dictionary::from_root(v.as_object().unwrap().clone())
    }

    #[test]
    fn validator_accumulates_across_stages() {
        let d = dict(json!({
            "color": {
                "$type": "color",
                "bad": {"$value": "nope"},
                "stray": 42
            },
            "a": {"$value": "{b}"},
            "b": {"$value": "{a}"},
            "n": {"$value": 10, "$min": 1, "$max": 5}
        }));
        let diags = validate_dictionary(&d);
        let paths: Vec<&str> = diags.iter().map(|d| d.path.as_str()).collect();
        assert!(paths.contains(&"color.stray"), "shape: {:?}", paths);
        assert!(paths.contains(&"color.bad"), "type: {:?}", paths);
        assert!(paths.contains(&"a"), "cycle: {:?}", paths);
        assert!(paths.contains(&"n"), "constraint: {:?}", paths);
    }

    #[test]
    fn clean_dictionary_produces_no_diagnostics() {
        let d = dict(json!({
            "color": {
                "$type": "color",
                "primary": {"$value": "#3b82f6"},
                "accent": {"$value": "{color.primary}"}
            }
        }));
        assert_eq!(validate_dictionary(&d), vec![]);
    }
}
