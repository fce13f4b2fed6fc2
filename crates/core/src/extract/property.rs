//! Typed `@property` extraction: tokens annotated with `$property`
//! become registered custom-property declarations.

use crate::dictionary::Dictionary;
use crate::extract::{css_var_name, resolve_text};
use crate::resolve::Resolver;
use serde::Serialize;
use serde_json::{Map, Value};

/// A CSS `@property` declaration derived from a token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyToken {
    pub path: String,
    pub var_name: String,
    /// `@property` syntax string, e.g. `<color>`.
    pub syntax: String,
    pub inherits: bool,
    pub initial_value: String,
    #[serde(rename = "type")]
    pub token_type: String,
}

/// `$type` -> `@property` syntax. Types outside the map produce no
/// declaration.
fn syntax_for(token_type: &str) -> Option<&'static str> {
    match token_type {
        "color" => Some("<color>"),
        "dimension" => Some("<length>"),
        "number" => Some("<number>"),
        "duration" => Some("<time>"),
        "effect" => Some("<integer>"),
        _ => None,
    }
}

/// Extract every `$property` token, sorted by path. `$property` is either
/// boolean `true` or `{"inherits": bool}`; inheritance defaults to false.
pub fn extract_property_tokens(dict: &Dictionary, resolver: &mut Resolver) -> Vec<PropertyToken> {
    let mut out = Vec::new();
    collect(&dict.root, "", None, resolver, &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

fn collect(
    group: &Map<String, Value>,
    prefix: &str,
    inherited_type: Option<&str>,
    resolver: &mut Resolver,
    out: &mut Vec<PropertyToken>,
) {
    let own_type = group.get("$type").and_then(Value::as_str);
    let effective = own_type.or(inherited_type);

    if let Some(value) = group.get("$value") {
        let inherits = match group.get("$property") {
            Some(Value::Bool(true)) => false,
            Some(Value::Object(opts)) => opts
                .get("inherits")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            _ => return,
        };
        let token_type = match effective {
            Some(t) => t,
            None => return,
        };
        let syntax = match syntax_for(token_type) {
            Some(s) => s,
            None => return,
        };
        out.push(PropertyToken {
            path: prefix.to_string(),
            var_name: css_var_name(prefix),
            syntax: syntax.to_string(),
            inherits,
            initial_value: resolve_text(resolver, prefix, value),
            token_type: token_type.to_string(),
        });
        return;
    }

    for (key, child) in group {
        if key.starts_with('$') {
            continue;
        }
        if let Value::Object(obj) = child {
            let path = crate::dictionary::join_path(prefix, key);
            collect(obj, &path, effective, resolver, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use serde_json::json;

    fn dict(v: Value) -> Dictionary {
        Dictionary::from_root(v.as_object().unwrap().clone())
    }

    #[test]
    fn maps_types_to_property_syntax() {
        let d = dict(json!({
            "color": {
                "$type": "color",
                "primary": {"$value": "#3b82f6", "$property": true}
            },
            "size": {
                "$type": "dimension",
                "gap": {"$value": "1rem", "$property": {"inherits": true}}
            },
            "font": {
                "stack": {
                    "$type": "fontFamily",
                    "$value": ["Inter", "sans-serif"],
                    "$property": true
                }
            }
        }));
        let flat = flatten(&d);
        let mut r = Resolver::new(&flat);
        let props = extract_property_tokens(&d, &mut r);
        // fontFamily has no syntax mapping and is skipped
        assert_eq!(props.len(), 2);
        let color = props.iter().find(|p| p.path == "color.primary").unwrap();
        assert_eq!(color.var_name, "--color-primary");
        assert_eq!(color.syntax, "<color>");
        assert!(!color.inherits);
        assert_eq!(color.initial_value, "#3b82f6");
        let gap = props.iter().find(|p| p.path == "size.gap").unwrap();
        assert_eq!(gap.syntax, "<length>");
        assert!(gap.inherits);
    }

    #[test]
    fn initial_value_arrays_join_with_commas() {
        let d = dict(json!({
            "z": {
                "$type": "number",
                "layers": {"$value": [1, 2, 3], "$property": true}
            }
        }));
        let flat = flatten(&d);
        let mut r = Resolver::new(&flat);
        let props = extract_property_tokens(&d, &mut r);
        assert_eq!(props[0].initial_value, "1, 2, 3");
    }

    #[test]
    fn tokens_without_property_are_skipped() {
        let d = dict(json!({
            "color": {"$type": "color", "x": {"$value": "#fff"}}
        }));
        let flat = flatten(&d);
        let mut r = Resolver::new(&flat);
        assert!(extract_property_tokens(&d, &mut r).is_empty());
    }
}
