//! Flattening: project the token tree onto a dotted-path -> raw `$value`
//! table, the resolver's input shape.

use crate::dictionary::{is_token, join_path, Dictionary};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flatten a dictionary to `path -> raw $value`. Malformed children at
/// group position (scalars, arrays) are skipped, not fatal; the schema
/// validator reports those separately.
pub fn flatten(dict: &Dictionary) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    flatten_group(&dict.root, "", &mut out);
    out
}

fn flatten_group(group: &Map<String, Value>, prefix: &str, out: &mut BTreeMap<String, Value>) {
    for (key, child) in group {
        if key.starts_with('$') {
            continue;
        }
        let obj = match child.as_object() {
            Some(o) => o,
            None => continue,
        };
        let path = join_path(prefix, key);
        if is_token(child) {
            if let Some(v) = obj.get("$value") {
                out.insert(path, v.clone());
            }
        } else {
            flatten_group(obj, &path, out);
        }
    }
}
