//! Token metadata extraction for the JSON catalog.

use crate::dictionary::{join_path, Dictionary};
use crate::resolve::Resolver;
use serde::Serialize;
use serde_json::{Map, Value};

/// Catalog record for one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenMetadata {
    pub path: String,
    /// Resolved value (raw value when resolution fails).
    pub value: Value,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub usage: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avoid: Option<String>,
    /// `true`, or a deprecation reason string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Value>,
    pub customizable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

/// Extract a catalog record for every token, sorted by path, with
/// `$type` inherited from ancestor groups.
pub fn extract_metadata(dict: &Dictionary, resolver: &mut Resolver) -> Vec<TokenMetadata> {
    let mut out = Vec::new();
    collect(&dict.root, "", None, dict, resolver, &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

fn collect(
    group: &Map<String, Value>,
    prefix: &str,
    inherited_type: Option<&str>,
    dict: &Dictionary,
    resolver: &mut Resolver,
    out: &mut Vec<TokenMetadata>,
) {
    let own_type = group.get("$type").and_then(Value::as_str);
    let effective = own_type.or(inherited_type);

    if let Some(raw) = group.get("$value") {
        let value = resolver
            .resolve_value(prefix, raw)
            .unwrap_or_else(|_| raw.clone());
        let usage = match group.get("$usage") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        };
        let deprecated = match group.get("$deprecated") {
            Some(Value::Bool(false)) | None => None,
            Some(v @ Value::Bool(true)) | Some(v @ Value::String(_)) => Some(v.clone()),
            Some(_) => None,
        };
        out.push(TokenMetadata {
            path: prefix.to_string(),
            value,
            token_type: effective.map(str::to_owned),
            description: group
                .get("$description")
                .and_then(Value::as_str)
                .map(str::to_owned),
            usage,
            avoid: group.get("$avoid").and_then(Value::as_str).map(str::to_owned),
            deprecated,
            customizable: group
                .get("$customizable")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            source_file: dict.source_file(prefix).map(str::to_owned),
        });
        return;
    }

    for (key, child) in group {
        if key.starts_with('$') || (prefix.is_empty() && key == "keyframes") {
            continue;
        }
        if let Value::Object(obj) = child {
            collect(obj, &join_path(prefix, key), effective, dict, resolver, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use serde_json::json;

    #[test]
    fn records_annotations_and_inherited_type() {
        let mut d = Dictionary::from_root(
            json!({
                "color": {
                    "$type": "color",
                    "primary": {
                        "$value": "#3b82f6",
                        "$description": "Brand primary",
                        "$usage": ["buttons", "links"],
                        "$avoid": "large fills",
                        "$customizable": true
                    },
                    "legacy": {"$value": "#00f", "$deprecated": "use color.primary"}
                }
            })
            .as_object()
            .unwrap()
            .clone(),
        );
        d.source_files
            .insert("color.primary".to_string(), "colors.json".to_string());
        let flat = flatten(&d);
        let mut r = Resolver::new(&flat);
        let meta = extract_metadata(&d, &mut r);
        assert_eq!(meta.len(), 2);
        let legacy = &meta[0];
        assert_eq!(legacy.path, "color.legacy");
        assert_eq!(legacy.deprecated, Some(json!("use color.primary")));
        let primary = &meta[1];
        assert_eq!(primary.token_type.as_deref(), Some("color"));
        assert_eq!(primary.usage, vec!["buttons", "links"]);
        assert!(primary.customizable);
        assert_eq!(primary.source_file.as_deref(), Some("colors.json"));
    }

    #[test]
    fn values_come_out_resolved() {
        let d = Dictionary::from_root(
            json!({
                "a": {"$value": "1rem"},
                "b": {"$value": "{a}"}
            })
            .as_object()
            .unwrap()
            .clone(),
        );
        let flat = flatten(&d);
        let mut r = Resolver::new(&flat);
        let meta = extract_metadata(&d, &mut r);
        let b = meta.iter().find(|m| m.path == "b").unwrap();
        assert_eq!(b.value, json!("1rem"));
    }
}
