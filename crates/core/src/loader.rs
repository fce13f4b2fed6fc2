//! Source-tree loader: walks a directory of token JSON files and
//! assembles the base dictionary, the theme dictionaries, and the
//! per-path source-file index.
//!
//! Token files are any `.json` or `.tokens.json` file. Files under a
//! `themes/` directory are themes keyed by file stem; all other files
//! deep-merge into the base dictionary in sorted path order.

use crate::dictionary::Dictionary;
use crate::error::{BuildError, Diagnostic};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of loading a source directory.
#[derive(Debug, Default)]
pub struct LoadedSource {
    pub base: Dictionary,
    pub themes: BTreeMap<String, Dictionary>,
    /// Merge-collision warnings produced while assembling the base tree.
    pub warnings: Vec<Diagnostic>,
}

/// Load every token file under `dir`.
pub fn load_directory(dir: &Path) -> Result<LoadedSource, BuildError> {
    let mut files = Vec::new();
    collect_token_files(dir, &mut files)?;
    files.sort();

    let mut out = LoadedSource::default();
    for file in files {
        let rel = file
            .strip_prefix(dir)
            .unwrap_or(&file)
            .to_string_lossy()
            .replace('\\', "/");
        let tree = read_token_file(&file, &rel)?;
        if let Some(theme_name) = theme_name_for(&rel) {
            let tree = unwrap_theme_root(tree, &theme_name);
            let mut theme = out
                .themes
                .remove(&theme_name)
                .unwrap_or_default();
            let mut theme_warnings = Vec::new();
            theme.merge_from(&tree, &mut theme_warnings);
            index_sources(&mut theme, &tree, &rel);
            out.themes.insert(theme_name, theme);
        } else {
            out.base.merge_from(&tree, &mut out.warnings);
            index_sources(&mut out.base, &tree, &rel);
        }
    }
    Ok(out)
}

fn collect_token_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), BuildError> {
    let entries = fs::read_dir(dir).map_err(|e| BuildError::Io {
        file: dir.to_string_lossy().to_string(),
        message: e.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::Io {
            file: dir.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_token_files(&path, out)?;
        } else if is_token_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_token_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn read_token_file(path: &Path, rel: &str) -> Result<Map<String, Value>, BuildError> {
    let text = fs::read_to_string(path).map_err(|e| BuildError::Io {
        file: rel.to_string(),
        message: e.to_string(),
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| BuildError::Json {
        file: rel.to_string(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(BuildError::Json {
            file: rel.to_string(),
            message: format!("expected a top-level object, found {}", shape(&other)),
        }),
    }
}

fn shape(v: &Value) -> &'static str {
    match v {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

/// A file is a theme iff some path component is `themes`. The theme name
/// is the file stem with a trailing `.tokens` stripped.
fn theme_name_for(rel: &str) -> Option<String> {
    let mut parts: Vec<&str> = rel.split('/').collect();
    let file = parts.pop()?;
    if !parts.iter().any(|p| *p == "themes") {
        return None;
    }
    let stem = file.strip_suffix(".json").unwrap_or(file);
    let stem = stem.strip_suffix(".tokens").unwrap_or(stem);
    Some(stem.to_string())
}

/// Theme files may wrap their content in a single top-level key equal to
/// the theme name; unwrap it. A single root key that does not match the
/// stem is treated as content and left alone.
fn unwrap_theme_root(mut tree: Map<String, Value>, theme_name: &str) -> Map<String, Value> {
    if tree.len() == 1 {
        if let Some(Value::Object(inner)) = tree.get(theme_name) {
            return inner.clone();
        }
    }
    // Also strip a "$schema" companion around the wrapper
    if tree.len() == 2 && tree.contains_key("$schema") {
        if let Some(Value::Object(inner)) = tree.get(theme_name) {
            let mut out = inner.clone();
            if let Some(schema) = tree.remove("$schema") {
                out.insert("$schema".to_string(), schema);
            }
            return out;
        }
    }
    tree
}

/// Record `rel` as the source file for every token path in `tree`.
fn index_sources(dict: &mut Dictionary, tree: &Map<String, Value>, rel: &str) {
    let scratch = Dictionary::from_root(tree.clone());
    let mut paths = Vec::new();
    scratch.walk_tokens(|path, _| paths.push(path.to_string()));
    for path in paths {
        dict.source_files.insert(path, rel.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, rel: &str, v: &Value) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(v).unwrap()).unwrap();
    }

    #[test]
    fn loads_and_merges_base_files() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "colors.json",
            &json!({"color": {"primary": {"$value": "#3b82f6"}}}),
        );
        write(
            tmp.path(),
            "spacing.tokens.json",
            &json!({"spacing": {"base": {"$value": "1rem"}}}),
        );
        let loaded = load_directory(tmp.path()).unwrap();
        assert!(loaded.base.get("color.primary").is_some());
        assert!(loaded.base.get("spacing.base").is_some());
        assert_eq!(
            loaded.base.source_file("color.primary"),
            Some("colors.json")
        );
        assert_eq!(
            loaded.base.source_file("spacing.base"),
            Some("spacing.tokens.json")
        );
    }

    #[test]
    fn theme_files_are_split_out_and_unwrapped() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "base.json",
            &json!({"spacing": {"base": {"$value": "1rem"}}}),
        );
        write(
            tmp.path(),
            "themes/compact.json",
            &json!({"compact": {"spacing": {"base": {"$value": "0.5rem"}}}}),
        );
        // Wrapper key differing from the stem stays as content
        write(
            tmp.path(),
            "themes/dark.tokens.json",
            &json!({"color": {"bg": {"$value": "#000"}}}),
        );
        let loaded = load_directory(tmp.path()).unwrap();
        assert!(loaded.base.get("spacing.base").is_some());
        let compact = loaded.themes.get("compact").unwrap();
        assert!(compact.get("spacing.base").is_some());
        let dark = loaded.themes.get("dark").unwrap();
        assert!(dark.get("color.bg").is_some());
    }

    #[test]
    fn malformed_json_fails_fast_naming_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("bad.json"), "{ not json").unwrap();
        let err = load_directory(tmp.path()).unwrap_err();
        match err {
            BuildError::Json { file, .. } => assert_eq!(file, "bad.json"),
            other => panic!("expected Json error, got {:?}", other),
        }
    }
}
