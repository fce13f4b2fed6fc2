//! Per-`$type` format validation.
//!
//! `$type` propagates inward: a token without its own `$type` takes the
//! nearest ancestor group's. Unknown types pass without a per-type check.

use crate::color::Color;
use crate::dictionary::{join_path, Dictionary};
use crate::dimension::Dimension;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::resolve::is_expression;
use serde_json::{Map, Value};

/// Validate every token's raw `$value` against its effective `$type`.
/// Accumulates diagnostics; never stops early.
pub fn validate_types(dict: &Dictionary) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    check_group(&dict.root, "", None, dict, &mut out);
    out
}

fn check_group(
    group: &Map<String, Value>,
    prefix: &str,
    inherited: Option<&str>,
    dict: &Dictionary,
    out: &mut Vec<Diagnostic>,
) {
    let own_type = group.get("$type").and_then(Value::as_str);
    let effective = own_type.or(inherited);

    if let Some(value) = group.get("$value") {
        if let Some(ty) = effective {
            if let Some(message) = check_value(ty, value) {
                out.push(
                    Diagnostic::error(DiagnosticKind::Type, prefix, message)
                        .with_file(dict.source_file(prefix)),
                );
            }
        }
        return;
    }

    for (key, child) in group {
        if key.starts_with('$') {
            continue;
        }
        if let Value::Object(obj) = child {
            let path = join_path(prefix, key);
            check_group(obj, &path, effective, dict, out);
        }
    }
}

fn is_reference(s: &str) -> bool {
    s.contains('{')
}

/// Check one raw value against a declared type. Returns a message on
/// failure, None when the value is fine or the type is unknown.
fn check_value(ty: &str, value: &Value) -> Option<String> {
    match ty {
        "color" => {
            let s = match value {
                Value::String(s) => s,
                other => {
                    return Some(format!(
                        "color token value must be a string, found {}",
                        crate::resolve::to_css_string(other)
                    ))
                }
            };
            if is_reference(s) || is_expression(s) {
                return None;
            }
            if !Color::is_color(s) {
                return Some(format!("'{}' is not a valid color", s));
            }
            None
        }
        "dimension" => match value {
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Number(n) => Some(format!(
                "dimension token value must be a dimension string (only numeric zero is allowed bare), found {}",
                n
            )),
            Value::String(s) => {
                if is_reference(s) || s.starts_with("calc(") || s.starts_with("scale(") {
                    return None;
                }
                if !Dimension::is_dimension(s) {
                    return Some(format!("'{}' is not a valid dimension", s));
                }
                None
            }
            other => Some(format!(
                "dimension token value must be a string, found {}",
                crate::resolve::to_css_string(other)
            )),
        },
        "number" => match value {
            Value::Number(_) => None,
            Value::String(s) => {
                if is_reference(s) || s.trim().parse::<f64>().is_ok() {
                    None
                } else {
                    Some(format!("'{}' is not numeric", s))
                }
            }
            other => Some(format!(
                "number token value must be numeric, found {}",
                crate::resolve::to_css_string(other)
            )),
        },
        "fontFamily" => match value {
            Value::String(s) if !s.is_empty() => None,
            Value::String(_) => Some("fontFamily must not be empty".to_string()),
            Value::Array(items) => {
                if items.is_empty() {
                    return Some("fontFamily list must not be empty".to_string());
                }
                for item in items {
                    match item {
                        Value::String(s) if !s.is_empty() => {}
                        _ => {
                            return Some(
                                "fontFamily list entries must be non-empty strings".to_string(),
                            )
                        }
                    }
                }
                None
            }
            _ => Some("fontFamily must be a string or a list of strings".to_string()),
        },
        "effect" => match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) if f == 0.0 || f == 1.0 => None,
                _ => Some(format!("effect value must be 0 or 1, found {}", n)),
            },
            Value::String(s) => {
                if is_reference(s) || s == "0" || s == "1" {
                    None
                } else {
                    Some(format!("effect value must be 0 or 1, found '{}'", s))
                }
            }
            other => Some(format!(
                "effect value must be 0 or 1, found {}",
                crate::resolve::to_css_string(other)
            )),
        },
        // Unknown types are permitted without a per-type check
        _ => None,
    }
}
