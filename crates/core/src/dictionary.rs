//! The Dictionary: a heterogeneous token tree plus a per-path source index.
//!
//! The tree is `serde_json::Value`. A node is a *token* iff it is an object
//! holding the key `$value`; any other object is a *group*. Identity of a
//! token is its dotted path from the root, `.`-joined over non-`$` keys.

use crate::error::{Diagnostic, DiagnosticKind};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A token dictionary: the root group and the loader's source-file index.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    pub root: Map<String, Value>,
    /// Dotted token path -> relative source file, recorded at load time.
    pub source_files: BTreeMap<String, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    pub fn from_root(root: Map<String, Value>) -> Self {
        Dictionary {
            root,
            source_files: BTreeMap::new(),
        }
    }

    /// Recursive clone of the whole tree and index.
    pub fn deep_copy(&self) -> Dictionary {
        self.clone()
    }

    pub fn source_file(&self, path: &str) -> Option<&str> {
        self.source_files.get(path).map(String::as_str)
    }

    /// Deep-merge `src` over this dictionary. Collisions where either side
    /// is a token (or the shapes disagree) overwrite rather than recurse;
    /// each such overwrite that changes the node's shape is reported as a
    /// warning naming the path and the pre/post types.
    pub fn merge_from(&mut self, src: &Map<String, Value>, warnings: &mut Vec<Diagnostic>) {
        merge_maps(&mut self.root, src, "", warnings);
    }

    /// Subtree lookup by dotted path, descending through groups only.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut cur = self.root.get(first)?;
        for seg in segments {
            cur = cur.as_object()?.get(seg)?;
        }
        Some(cur)
    }

    /// Visit every token in the tree in sorted path order. The callback
    /// receives the dotted path and the token object.
    pub fn walk_tokens<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&str, &'a Map<String, Value>),
    {
        walk_tokens_inner(&self.root, "", &mut f);
    }
}

fn walk_tokens_inner<'a, F>(group: &'a Map<String, Value>, prefix: &str, f: &mut F)
where
    F: FnMut(&str, &'a Map<String, Value>),
{
    for (key, child) in group {
        if key.starts_with('$') {
            continue;
        }
        if let Value::Object(obj) = child {
            let path = join_path(prefix, key);
            if is_token(child) {
                f(&path, obj);
            } else {
                walk_tokens_inner(obj, &path, f);
            }
        }
    }
}

/// A node is a token iff it is an object containing `$value`.
pub fn is_token(node: &Value) -> bool {
    matches!(node, Value::Object(obj) if obj.contains_key("$value"))
}

pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Human-readable shape name for merge warnings.
pub fn shape_name(v: &Value) -> &'static str {
    match v {
        Value::Object(_) if is_token(v) => "token",
        Value::Object(_) => "group",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

fn merge_maps(
    dst: &mut Map<String, Value>,
    src: &Map<String, Value>,
    prefix: &str,
    warnings: &mut Vec<Diagnostic>,
) {
    for (key, src_val) in src {
        match dst.get_mut(key) {
            None => {
                dst.insert(key.clone(), src_val.clone());
            }
            Some(dst_val) => {
                let both_groups = matches!(dst_val, Value::Object(_))
                    && matches!(src_val, Value::Object(_))
                    && !is_token(dst_val)
                    && !is_token(src_val);
                if both_groups {
                    let path = join_path(prefix, key);
                    if let (Value::Object(d), Value::Object(s)) = (dst_val, src_val) {
                        merge_maps(d, s, &path, warnings);
                    }
                } else {
                    // A token on either side always overwrites whole;
                    // recursing into a token would silently corrupt it.
                    let pre = shape_name(dst_val);
                    let post = shape_name(src_val);
                    if pre != post {
                        warnings.push(Diagnostic::warning(
                            DiagnosticKind::Shape,
                            join_path(prefix, key),
                            format!("merge overwrote {} with {}", pre, post),
                        ));
                    }
                    *dst_val = src_val.clone();
                }
            }
        }
    }
}

/// `diff(theme, base)`: the subtree of `theme` whose entries are absent
/// from `base` or differ from it. Groups are compared recursively; an
/// empty group difference is dropped.
pub fn diff(theme: &Map<String, Value>, base: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, theme_val) in theme {
        match base.get(key) {
            None => {
                out.insert(key.clone(), theme_val.clone());
            }
            Some(base_val) => {
                let both_groups = matches!(theme_val, Value::Object(_))
                    && matches!(base_val, Value::Object(_))
                    && !is_token(theme_val)
                    && !is_token(base_val);
                if both_groups {
                    if let (Value::Object(t), Value::Object(b)) = (theme_val, base_val) {
                        let sub = diff(t, b);
                        if !sub.is_empty() {
                            out.insert(key.clone(), Value::Object(sub));
                        }
                    }
                } else if theme_val != base_val {
                    out.insert(key.clone(), theme_val.clone());
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn token_detection_is_a_value_probe() {
        assert!(is_token(&json!({"$value": "1rem"})));
        assert!(!is_token(&json!({"size": {"$value": "1rem"}})));
        assert!(!is_token(&json!("1rem")));
    }

    #[test]
    fn walk_skips_dollar_keys_and_visits_tokens() {
        let dict = Dictionary::from_root(map(json!({
            "$schema": "ignored",
            "color": {
                "$type": "color",
                "primary": {"$value": "#fff"},
                "nested": {"deep": {"$value": "#000"}}
            }
        })));
        let mut seen = Vec::new();
        dict.walk_tokens(|path, _| seen.push(path.to_string()));
        assert_eq!(seen, vec!["color.nested.deep", "color.primary"]);
    }

    #[test]
    fn merge_recurses_into_groups() {
        let mut dict = Dictionary::from_root(map(json!({
            "color": {"primary": {"$value": "#fff"}}
        })));
        let src = map(json!({
            "color": {"accent": {"$value": "#00f"}}
        }));
        let mut warnings = Vec::new();
        dict.merge_from(&src, &mut warnings);
        assert!(warnings.is_empty());
        assert!(dict.get("color.primary").is_some());
        assert!(dict.get("color.accent").is_some());
    }

    #[test]
    fn merge_overwrites_tokens_whole() {
        let mut dict = Dictionary::from_root(map(json!({
            "size": {"field": {"$value": "1rem", "$type": "dimension"}}
        })));
        let src = map(json!({
            "size": {"field": {"$value": "2rem"}}
        }));
        let mut warnings = Vec::new();
        dict.merge_from(&src, &mut warnings);
        // Whole-token overwrite: the $type from the old token must not leak
        let field = dict.get("size.field").unwrap().as_object().unwrap();
        assert_eq!(field.get("$value"), Some(&json!("2rem")));
        assert!(!field.contains_key("$type"));
    }

    #[test]
    fn merge_warns_on_shape_change() {
        let mut dict = Dictionary::from_root(map(json!({
            "spacing": {"base": {"$value": "1rem"}}
        })));
        let src = map(json!({"spacing": "4px"}));
        let mut warnings = Vec::new();
        dict.merge_from(&src, &mut warnings);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "spacing");
        assert!(warnings[0].message.contains("group"));
        assert!(warnings[0].message.contains("string"));
    }

    #[test]
    fn diff_keeps_only_changed_entries() {
        let base = map(json!({
            "spacing": {"base": {"$value": "1rem"}, "wide": {"$value": "2rem"}}
        }));
        let theme = map(json!({
            "spacing": {"base": {"$value": "0.5rem"}, "wide": {"$value": "2rem"}}
        }));
        let d = diff(&theme, &base);
        let spacing = d.get("spacing").unwrap().as_object().unwrap();
        assert!(spacing.contains_key("base"));
        assert!(!spacing.contains_key("wide"));
    }

    #[test]
    fn diff_of_identical_trees_is_empty() {
        let base = map(json!({"a": {"b": {"$value": 1}}}));
        assert!(diff(&base, &base).is_empty());
    }
}
