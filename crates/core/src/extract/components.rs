//! Component extraction: subtrees with `$type = "component"` become
//! [`ComponentDef`] records, decoded by partitioning each map in one
//! pass ($-metadata, `&`/`:` state keys, CSS-like property keys).

use crate::dictionary::{join_path, Dictionary};
use crate::extract::resolve_text;
use crate::resolve::Resolver;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A variant (or size) of a component: an optional class override, plain
/// CSS-like properties, and per-state property sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub states: BTreeMap<String, BTreeMap<String, String>>,
}

/// A component definition extracted from the dictionary.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDef {
    /// Dotted path of the component subtree.
    pub name: String,
    /// CSS class selector; `$class` or derived from the last path segment.
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,
    /// Base CSS properties applied on the component class itself.
    pub base: BTreeMap<String, String>,
    /// States declared directly on the component (`&:hover`, `:focus`, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub states: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, VariantDef>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sizes: BTreeMap<String, VariantDef>,
}

/// One `$container` override: extra properties under a container query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerOverride {
    pub component: String,
    pub class: String,
    pub query: String,
    pub properties: BTreeMap<String, String>,
}

/// Extract every component, sorted by component name. The walk does not
/// descend into a component; nested components must be siblings under
/// another group.
pub fn extract_components(dict: &Dictionary, resolver: &mut Resolver) -> Vec<ComponentDef> {
    let mut out = Vec::new();
    walk(&dict.root, "", resolver, &mut out);
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

fn walk(
    group: &Map<String, Value>,
    prefix: &str,
    resolver: &mut Resolver,
    out: &mut Vec<ComponentDef>,
) {
    for (key, child) in group {
        if key.starts_with('$') {
            continue;
        }
        let obj = match child.as_object() {
            Some(o) => o,
            None => continue,
        };
        let path = join_path(prefix, key);
        if obj.get("$type").and_then(Value::as_str) == Some("component") {
            out.push(decode_component(&path, key, obj, resolver));
        } else if !obj.contains_key("$value") {
            walk(obj, &path, resolver, out);
        }
    }
}

fn decode_component(
    path: &str,
    key: &str,
    obj: &Map<String, Value>,
    resolver: &mut Resolver,
) -> ComponentDef {
    let mut def = ComponentDef {
        name: path.to_string(),
        class: format!(".{}", key),
        description: None,
        requires: Vec::new(),
        contains: Vec::new(),
        base: BTreeMap::new(),
        states: BTreeMap::new(),
        variants: BTreeMap::new(),
        sizes: BTreeMap::new(),
    };
    for (k, v) in obj {
        match k.as_str() {
            "$type" | "$container" => {}
            "$class" => {
                if let Some(s) = v.as_str() {
                    def.class = s.to_string();
                }
            }
            "$description" => def.description = v.as_str().map(str::to_owned),
            "$requires" => def.requires = string_list(v),
            "$contains" => def.contains = string_list(v),
            "variants" => def.variants = decode_variant_map(path, v, resolver),
            "sizes" => def.sizes = decode_variant_map(path, v, resolver),
            "states" => {
                if let Some(states) = v.as_object() {
                    for (state, payload) in states {
                        if let Some(props) = payload.as_object() {
                            def.states
                                .insert(state.clone(), decode_props(path, props, resolver));
                        }
                    }
                }
            }
            _ if k.starts_with('&') || k.starts_with(':') => {
                if let Some(props) = v.as_object() {
                    def.states
                        .insert(k.clone(), decode_props(path, props, resolver));
                }
            }
            _ if k.starts_with('$') => {}
            _ => {
                if !v.is_object() {
                    def.base.insert(k.clone(), resolve_text(resolver, path, v));
                }
            }
        }
    }
    def
}

fn decode_variant_map(
    path: &str,
    v: &Value,
    resolver: &mut Resolver,
) -> BTreeMap<String, VariantDef> {
    let mut out = BTreeMap::new();
    if let Some(map) = v.as_object() {
        for (name, payload) in map {
            if let Some(obj) = payload.as_object() {
                out.insert(name.clone(), decode_variant(path, obj, resolver));
            }
        }
    }
    out
}

/// One-pass partition of a variant payload: `$class`, state keys, plain
/// properties.
fn decode_variant(path: &str, obj: &Map<String, Value>, resolver: &mut Resolver) -> VariantDef {
    let mut def = VariantDef::default();
    for (k, v) in obj {
        if k == "$class" {
            def.class = v.as_str().map(str::to_owned);
        } else if k.starts_with('&') || k.starts_with(':') {
            if let Some(props) = v.as_object() {
                def.states
                    .insert(k.clone(), decode_props(path, props, resolver));
            }
        } else if !k.starts_with('$') && !v.is_object() {
            def.properties
                .insert(k.clone(), resolve_text(resolver, path, v));
        }
    }
    def
}

fn decode_props(
    path: &str,
    props: &Map<String, Value>,
    resolver: &mut Resolver,
) -> BTreeMap<String, String> {
    props
        .iter()
        .filter(|(k, v)| !k.starts_with('$') && !v.is_object())
        .map(|(k, v)| (k.clone(), resolve_text(resolver, path, v)))
        .collect()
}

fn string_list(v: &Value) -> Vec<String> {
    match v {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

/// Extract `$container` overrides for every component, sorted by
/// component name then query text.
pub fn extract_container_overrides(
    dict: &Dictionary,
    resolver: &mut Resolver,
) -> Vec<ContainerOverride> {
    let mut out = Vec::new();
    walk_containers(&dict.root, "", resolver, &mut out);
    out.sort_by(|a, b| {
        a.component
            .cmp(&b.component)
            .then_with(|| a.query.cmp(&b.query))
    });
    out
}

fn walk_containers(
    group: &Map<String, Value>,
    prefix: &str,
    resolver: &mut Resolver,
    out: &mut Vec<ContainerOverride>,
) {
    for (key, child) in group {
        if key.starts_with('$') {
            continue;
        }
        let obj = match child.as_object() {
            Some(o) => o,
            None => continue,
        };
        let path = join_path(prefix, key);
        if obj.get("$type").and_then(Value::as_str) == Some("component") {
            let class = obj
                .get("$class")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| format!(".{}", key));
            if let Some(Value::Object(queries)) = obj.get("$container") {
                for (query, payload) in queries {
                    if let Some(props) = payload.as_object() {
                        out.push(ContainerOverride {
                            component: path.clone(),
                            class: class.clone(),
                            query: query.clone(),
                            properties: decode_props(&path, props, resolver),
                        });
                    }
                }
            }
        } else if !obj.contains_key("$value") {
            walk_containers(obj, &path, resolver, out);
        }
    }
}
