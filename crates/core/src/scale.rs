//! Scale expansion: rewrites `$scale`-bearing tokens into a family of
//! sibling tokens before resolution.
//!
//! A token `size.field` with `$scale: {xs: 0.6, md: 1.0}` gains siblings
//! `size.field-xs = "calc({size.field} * 0.6)"` and
//! `size.field-md = "{size.field}"` (factor 1.0 is a plain reference),
//! and loses its `$scale` key. Running the expander twice is therefore
//! equivalent to running it once.

use crate::dictionary::{join_path, Dictionary};
use crate::dimension::Dimension;
use crate::error::BuildError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The default factor set for component sizing scales.
pub fn standard_scale() -> BTreeMap<String, f64> {
    [("xs", 0.6), ("sm", 0.8), ("md", 1.0), ("lg", 1.2), ("xl", 1.4)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// A modular scale tuned for type ramps.
pub fn typography_scale() -> BTreeMap<String, f64> {
    [
        ("xs", 0.64),
        ("sm", 0.8),
        ("md", 1.0),
        ("lg", 1.25),
        ("xl", 1.563),
        ("2xl", 1.953),
        ("3xl", 2.441),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Expand every `$scale` annotation in the dictionary, in place.
pub fn expand_scales(dict: &mut Dictionary) -> Result<(), BuildError> {
    let mut new_sources = Vec::new();
    expand_group(&mut dict.root, "", &dict.source_files, &mut new_sources)?;
    for (path, file) in new_sources {
        dict.source_files.insert(path, file);
    }
    Ok(())
}

fn expand_group(
    group: &mut Map<String, Value>,
    prefix: &str,
    source_files: &BTreeMap<String, String>,
    new_sources: &mut Vec<(String, String)>,
) -> Result<(), BuildError> {
    // Two passes: collect sibling inserts first, then descend. The map
    // cannot be mutated while iterating it.
    let mut inserts: Vec<(String, Value)> = Vec::new();
    let mut scaled_keys: Vec<String> = Vec::new();

    for (key, child) in group.iter() {
        if key.starts_with('$') {
            continue;
        }
        let obj = match child.as_object() {
            Some(o) => o,
            None => continue,
        };
        if !obj.contains_key("$value") {
            continue;
        }
        let scale_val = match obj.get("$scale") {
            Some(v) => v,
            None => continue,
        };
        let base_path = join_path(prefix, key);
        let factors = parse_scale_map(scale_val, &base_path)?;
        let token_type = obj.get("$type").cloned();
        let base_file = source_files.get(&base_path).cloned();

        for (scale_name, factor) in &factors {
            let sibling_key = format!("{}-{}", key, scale_name);
            let value = if *factor == 1.0 {
                format!("{{{}}}", base_path)
            } else {
                format!(
                    "calc({{{}}} * {})",
                    base_path,
                    Dimension::format_value(*factor)
                )
            };
            let mut sibling = Map::new();
            sibling.insert("$value".to_string(), Value::String(value));
            if let Some(t) = &token_type {
                sibling.insert("$type".to_string(), t.clone());
            }
            sibling.insert(
                "$description".to_string(),
                Value::String(format!("{} step of the {} scale", scale_name, base_path)),
            );
            if let Some(file) = &base_file {
                new_sources.push((join_path(prefix, &sibling_key), file.clone()));
            }
            inserts.push((sibling_key, Value::Object(sibling)));
        }
        scaled_keys.push(key.clone());
    }

    for (key, value) in inserts {
        group.insert(key, value);
    }
    for key in scaled_keys {
        if let Some(Value::Object(obj)) = group.get_mut(&key) {
            obj.remove("$scale");
        }
    }

    for (key, child) in group.iter_mut() {
        if key.starts_with('$') {
            continue;
        }
        if let Value::Object(obj) = child {
            if !obj.contains_key("$value") {
                let path = join_path(prefix, key);
                expand_group(obj, &path, source_files, new_sources)?;
            }
        }
    }
    Ok(())
}

fn parse_scale_map(value: &Value, path: &str) -> Result<BTreeMap<String, f64>, BuildError> {
    let obj = value.as_object().ok_or_else(|| BuildError::Scale {
        path: path.to_string(),
        message: format!("$scale must be an object, found {}", type_of(value)),
    })?;
    let mut out = BTreeMap::new();
    for (name, factor) in obj {
        let f = factor.as_f64().ok_or_else(|| BuildError::Scale {
            path: path.to_string(),
            message: format!("scale factor '{}' must be a number", name),
        })?;
        out.insert(name.clone(), f);
    }
    Ok(out)
}

fn type_of(v: &Value) -> &'static str {
    match v {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}
