//! Responsive token extraction: tokens with `$responsive` overrides keyed
//! by breakpoint name, resolved against the dictionary's `$breakpoints`.

use crate::dictionary::Dictionary;
use crate::dimension::Dimension;
use crate::extract::resolve_text;
use crate::resolve::Resolver;
use serde::Serialize;
use serde_json::Value;

/// A named minimum-width breakpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakpoint {
    pub name: String,
    /// Formatted width, e.g. `768px`.
    pub width: String,
    /// Width in pixels, the primary sort key.
    pub px: f64,
}

/// A token with per-breakpoint value overrides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsiveToken {
    pub path: String,
    pub base_value: String,
    /// (breakpoint, value), ascending by breakpoint pixels.
    pub overrides: Vec<(Breakpoint, String)>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

const DEFAULT_BREAKPOINTS: [(&str, &str); 4] = [
    ("sm", "640px"),
    ("md", "768px"),
    ("lg", "1024px"),
    ("xl", "1280px"),
];

/// The dictionary's breakpoints (root `$breakpoints`, falling back to the
/// defaults), ascending by pixel width with ties broken by name.
pub fn breakpoints(dict: &Dictionary) -> Vec<Breakpoint> {
    let mut out = Vec::new();
    match dict.root.get("$breakpoints").and_then(Value::as_object) {
        Some(map) => {
            for (name, width) in map {
                if let Some(w) = width.as_str() {
                    if let Ok(dim) = Dimension::parse(w) {
                        out.push(Breakpoint {
                            name: name.clone(),
                            width: dim.to_string(),
                            px: dim.value,
                        });
                    }
                }
            }
        }
        None => {
            for (name, width) in DEFAULT_BREAKPOINTS {
                let dim = Dimension::parse(width).unwrap_or(Dimension::new(
                    0.0,
                    crate::dimension::Unit::Px,
                ));
                out.push(Breakpoint {
                    name: name.to_string(),
                    width: width.to_string(),
                    px: dim.value,
                });
            }
        }
    }
    out.sort_by(|a, b| {
        a.px.partial_cmp(&b.px)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    out
}

/// Extract every `$responsive` token, sorted by path. Override entries
/// follow breakpoint order; names with no matching breakpoint are
/// dropped.
pub fn extract_responsive(dict: &Dictionary, resolver: &mut Resolver) -> Vec<ResponsiveToken> {
    let bps = breakpoints(dict);
    let mut out = Vec::new();
    dict.walk_tokens(|path, token| {
        let responsive = match token.get("$responsive").and_then(Value::as_object) {
            Some(r) => r,
            None => return,
        };
        let base_value = token
            .get("$value")
            .map(|v| resolve_text(resolver, path, v))
            .unwrap_or_default();
        let mut overrides = Vec::new();
        for bp in &bps {
            if let Some(v) = responsive.get(&bp.name) {
                overrides.push((bp.clone(), resolve_text(resolver, path, v)));
            }
        }
        out.push(ResponsiveToken {
            path: path.to_string(),
            base_value,
            overrides,
            token_type: token.get("$type").and_then(Value::as_str).map(str::to_owned),
            source_file: dict.source_file(path).map(str::to_owned),
        });
    });
    out
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
    fn default_breakpoints_ascend_by_pixels() {
        let d = Dictionary::new();
        let bps = breakpoints(&d);
        let names: Vec<&str> = bps.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["sm", "md", "lg", "xl"]);
        assert_eq!(bps[1].width, "768px");
    }

    #[test]
    fn custom_breakpoints_override_defaults() {
        let d = dict(json!({
            "$breakpoints": {"wide": "1600px", "narrow": "480px"}
        }));
        let bps = breakpoints(&d);
        let names: Vec<&str> = bps.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["narrow", "wide"]);
    }

    #[test]
    fn responsive_overrides_follow_breakpoint_order() {
        let d = dict(json!({
            "layout": {
                "gutter": {
                    "$value": "1rem",
                    "$type": "dimension",
                    "$responsive": {"lg": "3rem", "sm": "2rem", "bogus": "9rem"}
                }
            }
        }));
        let flat = flatten(&d);
        let mut r = Resolver::new(&flat);
        let tokens = extract_responsive(&d, &mut r);
        assert_eq!(tokens.len(), 1);
        let t = &tokens[0];
        assert_eq!(t.base_value, "1rem");
        let entries: Vec<(&str, &str)> = t
            .overrides
            .iter()
            .map(|(bp, v)| (bp.name.as_str(), v.as_str()))
            .collect();
        // Unknown breakpoint names are dropped
        assert_eq!(entries, vec![("sm", "2rem"), ("lg", "3rem")]);
    }

    #[test]
    fn override_values_resolve_references() {
        let d = dict(json!({
            "spacing": {"wide": {"$value": "4rem"}},
            "layout": {
                "gap": {"$value": "1rem", "$responsive": {"md": "{spacing.wide}"}}
            }
        }));
        let flat = flatten(&d);
        let mut r = Resolver::new(&flat);
        let tokens = extract_responsive(&d, &mut r);
        let gap = tokens.iter().find(|t| t.path == "layout.gap").unwrap();
        assert_eq!(gap.overrides[0].1, "4rem");
    }
}
