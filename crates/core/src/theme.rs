//! Theme inheritance: per-theme merge over a base dictionary with
//! `$extends` chains, cycle detection, and the diff law used by the
//! emitter (`inherit(base, diff(theme, base))` resolves identically to
//! `inherit(base, theme)`).

use crate::dictionary::Dictionary;
use crate::error::{BuildError, Diagnostic};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Deep-copy `base`, merge `theme` over it, and strip the inheritance
/// bookkeeping keys (`$extends`, `$schema`) from the result.
pub fn inherit(base: &Dictionary, theme: &Dictionary) -> Dictionary {
    let mut out = base.deep_copy();
    let mut warnings: Vec<Diagnostic> = Vec::new();
    out.merge_from(&theme.root, &mut warnings);
    for (path, file) in &theme.source_files {
        out.source_files.insert(path.clone(), file.clone());
    }
    out.root.remove("$extends");
    out.root.remove("$schema");
    out
}

/// Resolve every theme against the base, following `$extends` chains.
/// Returns theme name -> fully-merged dictionary.
pub fn resolve_theme_inheritance(
    base: &Dictionary,
    themes: &BTreeMap<String, Dictionary>,
) -> Result<BTreeMap<String, Dictionary>, BuildError> {
    let mut resolved: BTreeMap<String, Dictionary> = BTreeMap::new();
    let mut resolving: HashSet<String> = HashSet::new();
    for name in themes.keys() {
        resolve_one(name, base, themes, &mut resolved, &mut resolving)?;
    }
    Ok(resolved)
}

fn resolve_one(
    name: &str,
    base: &Dictionary,
    themes: &BTreeMap<String, Dictionary>,
    resolved: &mut BTreeMap<String, Dictionary>,
    resolving: &mut HashSet<String>,
) -> Result<(), BuildError> {
    if resolved.contains_key(name) {
        return Ok(());
    }
    if !resolving.insert(name.to_string()) {
        return Err(BuildError::Theme {
            theme: name.to_string(),
            message: "circular $extends inheritance".to_string(),
        });
    }
    let theme = themes.get(name).ok_or_else(|| BuildError::Theme {
        theme: name.to_string(),
        message: "theme not found".to_string(),
    })?;

    let parent_dict = match theme.root.get("$extends") {
        None => base.deep_copy(),
        Some(Value::String(parent)) => {
            if !themes.contains_key(parent.as_str()) {
                return Err(BuildError::Theme {
                    theme: name.to_string(),
                    message: format!("extends unknown theme '{}'", parent),
                });
            }
            resolve_one(parent, base, themes, resolved, resolving)?;
            // resolve_one guarantees presence on Ok
            resolved
                .get(parent.as_str())
                .cloned()
                .ok_or_else(|| BuildError::Theme {
                    theme: name.to_string(),
                    message: format!("parent '{}' failed to resolve", parent),
                })?
        }
        Some(other) => {
            return Err(BuildError::Theme {
                theme: name.to_string(),
                message: format!(
                    "$extends must be a string, found {}",
                    crate::dictionary::shape_name(other)
                ),
            });
        }
    };

    let merged = inherit(&parent_dict, theme);
    resolving.remove(name);
    resolved.insert(name.to_string(), merged);
    Ok(())
}
