//! Structural shape checks and the brand/semantic/component layer policy.

use crate::dictionary::{join_path, Dictionary};
use crate::error::{Diagnostic, DiagnosticKind};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The three reference layers, outermost first. A token may only
/// reference tokens at its own layer or further out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Brand,
    Semantic,
    Component,
}

impl Layer {
    pub fn parse(s: &str) -> Option<Layer> {
        match s {
            "brand" => Some(Layer::Brand),
            "semantic" => Some(Layer::Semantic),
            "component" => Some(Layer::Component),
            _ => None,
        }
    }

    pub fn order(&self) -> u8 {
        match self {
            Layer::Brand => 0,
            Layer::Semantic => 1,
            Layer::Component => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Brand => "brand",
            Layer::Semantic => "semantic",
            Layer::Component => "component",
        }
    }
}

/// Shape walk: every non-`$` child at group position must itself be a
/// map. Component subtrees and the root `keyframes` block carry plain
/// CSS property scalars by design and are exempt from the walk.
pub fn validate_schema(dict: &Dictionary) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for (key, child) in &dict.root {
        if key.starts_with('$') || key == "keyframes" {
            continue;
        }
        check_node(key, child, &mut out);
    }
    out
}

fn check_node(path: &str, node: &Value, out: &mut Vec<Diagnostic>) {
    let obj = match node {
        Value::Object(obj) => obj,
        other => {
            out.push(Diagnostic::error(
                DiagnosticKind::Shape,
                path,
                format!(
                    "group child must be an object, found {}",
                    crate::dictionary::shape_name(other)
                ),
            ));
            return;
        }
    };
    if obj.contains_key("$value") {
        return;
    }
    if obj.get("$type").and_then(Value::as_str) == Some("component") {
        return;
    }
    for (key, child) in obj {
        if key.starts_with('$') {
            continue;
        }
        check_node(&join_path(path, key), child, out);
    }
}

/// Collect `$layer` bindings for every token, with group inheritance.
/// Unknown layer strings are recorded verbatim; the policy only binds
/// the known three.
pub fn collect_layer_bindings(dict: &Dictionary) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    collect_group(&dict.root, "", None, &mut out);
    out
}

fn collect_group(
    group: &Map<String, Value>,
    prefix: &str,
    inherited: Option<&str>,
    out: &mut BTreeMap<String, String>,
) {
    let own = group.get("$layer").and_then(Value::as_str);
    let effective = own.or(inherited);
    if group.contains_key("$value") {
        if let Some(layer) = effective {
            out.insert(prefix.to_string(), layer.to_string());
        }
        return;
    }
    for (key, child) in group {
        if key.starts_with('$') {
            continue;
        }
        if let Value::Object(obj) = child {
            collect_group(obj, &join_path(prefix, key), effective, out);
        }
    }
}

/// Enforce the reference rule: a token at layer F may reference a token
/// at layer T iff order(F) >= order(T). Tokens without a layer, and
/// unknown layer strings, are permissive.
pub fn validate_layers(dict: &Dictionary) -> Vec<Diagnostic> {
    let bindings = collect_layer_bindings(dict);
    let mut out = Vec::new();
    dict.walk_tokens(|path, token| {
        let from_layer = match bindings.get(path).and_then(|s| Layer::parse(s)) {
            Some(l) => l,
            None => return,
        };
        let value = match token.get("$value") {
            Some(v) => v,
            None => return,
        };
        let mut refs = Vec::new();
        collect_references(value, &mut refs);
        for target in refs {
            let to_layer = match bindings.get(&target).and_then(|s| Layer::parse(s)) {
                Some(l) => l,
                None => continue,
            };
            if from_layer.order() < to_layer.order() {
                out.push(
                    Diagnostic::error(
                        DiagnosticKind::Layer,
                        path,
                        format!(
                            "{} token '{}' may not reference {} token '{}'",
                            from_layer.as_str(),
                            path,
                            to_layer.as_str(),
                            target
                        ),
                    )
                    .with_file(dict.source_file(path)),
                );
            }
        }
    });
    out
}

/// Gather every `{path}` reference inside a raw value, recursing through
/// arrays and composite objects.
fn collect_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            let mut rest = s.as_str();
            while let Some(open) = rest.find('{') {
                let after = &rest[open + 1..];
                match after.find('}') {
                    Some(close) => {
                        out.push(after[..close].to_string());
                        rest = &after[close + 1..];
                    }
                    None => break,
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        Value::Object(obj) => {
            for child in obj.values() {
                collect_references(child, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(v: Value) -> Dictionary {
        Dictionary::from_root(v.as_object().unwrap().clone())
    }

    #[test]
    fn scalar_at_group_position_is_a_shape_error() {
        let d = dict(json!({
            "color": {"primary": {"$value": "#fff"}, "stray": "oops", "list": [1, 2]}
        }));
        let diags = validate_schema(&d);
        let paths: Vec<&str> = diags.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["color.list", "color.stray"]);
    }

    #[test]
    fn components_and_keyframes_are_exempt() {
        let d = dict(json!({
            "button": {
                "$type": "component",
                "padding": "0.5rem 1rem",
                "variants": {"primary": {"background": "#00f"}}
            },
            "keyframes": {"spin": {"from": {"transform": "rotate(0deg)"}}}
        }));
        assert_eq!(validate_schema(&d), vec![]);
    }

    #[test]
    fn layer_bindings_inherit_from_groups() {
        let d = dict(json!({
            "brand": {"$layer": "brand", "blue": {"$value": "#00f"}},
            "semantic": {
                "$layer": "semantic",
                "primary": {"$value": "{brand.blue}"},
                "override": {"$layer": "component", "x": {"$value": 1}}
            }
        }));
        let b = collect_layer_bindings(&d);
        assert_eq!(b.get("brand.blue").map(String::as_str), Some("brand"));
        assert_eq!(b.get("semantic.primary").map(String::as_str), Some("semantic"));
        assert_eq!(
            b.get("semantic.override.x").map(String::as_str),
            Some("component")
        );
    }

    #[test]
    fn inward_references_are_allowed() {
        let d = dict(json!({
            "brand": {"$layer": "brand", "blue": {"$value": "#00f"}},
            "semantic": {"$layer": "semantic", "primary": {"$value": "{brand.blue}"}},
            "button": {"$layer": "component", "bg": {"$value": "{semantic.primary}"}}
        }));
        assert_eq!(validate_layers(&d), vec![]);
    }

    #[test]
    fn outward_reference_is_a_violation() {
        let d = dict(json!({
            "brand": {"$layer": "brand", "color": {"$value": "{semantic.primary}"}},
            "semantic": {"$layer": "semantic", "primary": {"$value": "#00f"}}
        }));
        let diags = validate_layers(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "brand.color");
        assert!(diags[0].message.contains("brand"));
        assert!(diags[0].message.contains("semantic.primary"));
    }

    #[test]
    fn unlayered_and_unknown_layers_are_permissive() {
        let d = dict(json!({
            "free": {"x": {"$value": "{button.bg}"}},
            "weird": {"$layer": "galactic", "y": {"$value": "{button.bg}"}},
            "button": {"$layer": "component", "bg": {"$value": "#00f"}}
        }));
        assert_eq!(validate_layers(&d), vec![]);
    }
}
