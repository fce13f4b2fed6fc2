//! Keyframe extraction from the root `keyframes` block.

use crate::dictionary::Dictionary;
use crate::extract::resolve_text;
use crate::resolve::Resolver;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One `@keyframes` animation: frame selectors with their property maps,
/// ordered by percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyframeDef {
    pub name: String,
    /// (frame selector, properties), sorted by numeric percentage with
    /// `from` at 0 and `to` at 100.
    pub frames: Vec<(String, BTreeMap<String, String>)>,
}

/// Extract every animation under the root `keyframes` key, sorted by name.
pub fn extract_keyframes(dict: &Dictionary, resolver: &mut Resolver) -> Vec<KeyframeDef> {
    let mut out = Vec::new();
    let keyframes = match dict.root.get("keyframes").and_then(Value::as_object) {
        Some(k) => k,
        None => return out,
    };
    for (name, frames_val) in keyframes {
        let frames_obj = match frames_val.as_object() {
            Some(f) => f,
            None => continue,
        };
        let mut frames: Vec<(String, BTreeMap<String, String>)> = Vec::new();
        for (selector, props_val) in frames_obj {
            let props_obj = match props_val.as_object() {
                Some(p) => p,
                None => continue,
            };
            let props = props_obj
                .iter()
                .filter(|(k, v)| !k.starts_with('$') && !v.is_object())
                .map(|(k, v)| {
                    (
                        k.clone(),
                        resolve_text(resolver, &format!("keyframes.{}", name), v),
                    )
                })
                .collect();
            frames.push((selector.clone(), props));
        }
        frames.sort_by(|a, b| {
            frame_percent(&a.0)
                .partial_cmp(&frame_percent(&b.0))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        out.push(KeyframeDef {
            name: name.clone(),
            frames,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Sort key for a frame selector: `from` is 0, `to` is 100, otherwise the
/// first percentage in the selector.
fn frame_percent(selector: &str) -> f64 {
    let first = selector.split(',').next().unwrap_or(selector).trim();
    match first {
        "from" => 0.0,
        "to" => 100.0,
        other => other
            .strip_suffix('%')
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(f64::MAX),
    }
}
