//! `$min`/`$max` constraint parsing and checking.

use crate::dimension::Dimension;
use crate::error::BuildError;
use serde_json::{Map, Value};

/// A parsed bounds constraint: numeric, or dimensional on one unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
    },
    Dimensional {
        min: Option<Dimension>,
        max: Option<Dimension>,
    },
}

impl Constraint {
    /// Derive the constraint from a token's `$min`/`$max` keys, if any.
    ///
    /// Numeric bounds yield a number constraint; strings parsing as
    /// dimensions yield a dimension constraint (both bounds must share a
    /// unit); unitless dimension strings degrade to number bounds.
    /// Inverted bounds or mixed units fail at parse time.
    pub fn from_token(token: &Map<String, Value>, path: &str) -> Result<Option<Constraint>, BuildError> {
        let min_raw = token.get("$min");
        let max_raw = token.get("$max");
        if min_raw.is_none() && max_raw.is_none() {
            return Ok(None);
        }
        let min = min_raw.map(|v| parse_bound(v, path, "$min")).transpose()?;
        let max = max_raw.map(|v| parse_bound(v, path, "$max")).transpose()?;

        let constraint = match (min, max) {
            (Some(Bound::Number(a)), Some(Bound::Number(b))) => {
                if a > b {
                    return Err(inverted(path, a.to_string(), b.to_string()));
                }
                Constraint::Numeric {
                    min: Some(a),
                    max: Some(b),
                }
            }
            (Some(Bound::Dimension(a)), Some(Bound::Dimension(b))) => {
                if a.unit != b.unit {
                    return Err(BuildError::Constraint {
                        path: path.to_string(),
                        message: format!(
                            "$min and $max must share a unit; got '{}' and '{}'",
                            a, b
                        ),
                    });
                }
                if a.value > b.value {
                    return Err(inverted(path, a.to_string(), b.to_string()));
                }
                Constraint::Dimensional {
                    min: Some(a),
                    max: Some(b),
                }
            }
            (Some(Bound::Number(a)), Some(Bound::Dimension(b)))
            | (Some(Bound::Dimension(b)), Some(Bound::Number(a))) => {
                return Err(BuildError::Constraint {
                    path: path.to_string(),
                    message: format!(
                        "$min and $max must agree in kind; got '{}' and '{}'",
                        a, b
                    ),
                });
            }
            (Some(Bound::Number(a)), None) => Constraint::Numeric {
                min: Some(a),
                max: None,
            },
            (None, Some(Bound::Number(b))) => Constraint::Numeric {
                min: None,
                max: Some(b),
            },
            (Some(Bound::Dimension(a)), None) => Constraint::Dimensional {
                min: Some(a),
                max: None,
            },
            (None, Some(Bound::Dimension(b))) => Constraint::Dimensional {
                min: None,
                max: Some(b),
            },
            (None, None) => return Ok(None),
        };
        Ok(Some(constraint))
    }

    /// Check a resolved value against the bounds. Values still carrying a
    /// `{reference}` are skipped.
    pub fn check(&self, value: &Value, path: &str) -> Result<(), BuildError> {
        if let Value::String(s) = value {
            if s.contains('{') {
                return Ok(());
            }
        }
        match self {
            Constraint::Numeric { min, max } => {
                let n = coerce_number(value).ok_or_else(|| BuildError::Constraint {
                    path: path.to_string(),
                    message: format!(
                        "value '{}' is not numeric but the token declares numeric bounds",
                        crate::resolve::to_css_string(value)
                    ),
                })?;
                if let Some(lo) = min {
                    if n < *lo {
                        return Err(out_of_bounds(path, &n.to_string(), ">=", &lo.to_string()));
                    }
                }
                if let Some(hi) = max {
                    if n > *hi {
                        return Err(out_of_bounds(path, &n.to_string(), "<=", &hi.to_string()));
                    }
                }
                Ok(())
            }
            Constraint::Dimensional { min, max } => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => crate::resolve::to_css_string(other),
                };
                let dim = Dimension::parse(&text).map_err(|_| BuildError::Constraint {
                    path: path.to_string(),
                    message: format!("value '{}' is not a dimension", text),
                })?;
                let bound_unit = min.map(|d| d.unit).or(max.map(|d| d.unit));
                if let Some(unit) = bound_unit {
                    if dim.unit != unit {
                        return Err(BuildError::Constraint {
                            path: path.to_string(),
                            message: format!(
                                "value '{}' does not match the bound unit '{}'",
                                dim,
                                unit.as_str()
                            ),
                        });
                    }
                }
                if let Some(lo) = min {
                    if dim.value < lo.value {
                        return Err(out_of_bounds(path, &dim.to_string(), ">=", &lo.to_string()));
                    }
                }
                if let Some(hi) = max {
                    if dim.value > hi.value {
                        return Err(out_of_bounds(path, &dim.to_string(), "<=", &hi.to_string()));
                    }
                }
                Ok(())
            }
        }
    }
}

enum Bound {
    Number(f64),
    Dimension(Dimension),
}

fn parse_bound(v: &Value, path: &str, field: &str) -> Result<Bound, BuildError> {
    match v {
        Value::Number(n) => n.as_f64().map(Bound::Number).ok_or_else(|| BuildError::Constraint {
            path: path.to_string(),
            message: format!("{} is not a finite number", field),
        }),
        Value::String(s) => {
            let dim = Dimension::parse(s).map_err(|_| BuildError::Constraint {
                path: path.to_string(),
                message: format!("{} '{}' is neither a number nor a dimension", field, s),
            })?;
            if dim.unit == crate::dimension::Unit::None {
                Ok(Bound::Number(dim.value))
            } else {
                Ok(Bound::Dimension(dim))
            }
        }
        other => Err(BuildError::Constraint {
            path: path.to_string(),
            message: format!(
                "{} must be a number or dimension string, found {}",
                field,
                match other {
                    Value::Object(_) => "object",
                    Value::Array(_) => "array",
                    Value::Bool(_) => "boolean",
                    Value::Null => "null",
                    _ => "value",
                }
            ),
        }),
    }
}

fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn inverted(path: &str, min: String, max: String) -> BuildError {
    BuildError::Constraint {
        path: path.to_string(),
        message: format!("$min {} exceeds $max {}", min, max),
    }
}

fn out_of_bounds(path: &str, value: &str, cmp: &str, bound: &str) -> BuildError {
    BuildError::Constraint {
        path: path.to_string(),
        message: format!("value {} violates bound {} {}", value, cmp, bound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn absent_bounds_mean_no_constraint() {
        let t = token(json!({"$value": 3}));
        assert_eq!(Constraint::from_token(&t, "x").unwrap(), None);
    }

    #[test]
    fn numeric_bounds_check_numbers_and_numeric_strings() {
        let t = token(json!({"$value": 3, "$min": 1, "$max": 5}));
        let c = Constraint::from_token(&t, "x").unwrap().unwrap();
        assert!(c.check(&json!(3), "x").is_ok());
        assert!(c.check(&json!("4.5"), "x").is_ok());
        assert!(c.check(&json!(0), "x").is_err());
        assert!(c.check(&json!(6), "x").is_err());
    }

    #[test]
    fn dimension_bounds_require_matching_unit() {
        let t = token(json!({"$value": "2rem", "$min": "1rem", "$max": "4rem"}));
        let c = Constraint::from_token(&t, "x").unwrap().unwrap();
        assert!(c.check(&json!("2rem"), "x").is_ok());
        assert!(c.check(&json!("0.5rem"), "x").is_err());
        assert!(c.check(&json!("32px"), "x").is_err());
    }

    #[test]
    fn unitless_string_bounds_degrade_to_numeric() {
        let t = token(json!({"$value": "3", "$min": "1", "$max": "5"}));
        let c = Constraint::from_token(&t, "x").unwrap().unwrap();
        assert!(matches!(c, Constraint::Numeric { .. }));
    }

    #[test]
    fn inverted_or_mixed_bounds_fail_at_parse() {
        let t = token(json!({"$value": 1, "$min": 5, "$max": 1}));
        assert!(Constraint::from_token(&t, "x").is_err());
        let t = token(json!({"$value": 1, "$min": "1rem", "$max": "5px"}));
        assert!(Constraint::from_token(&t, "x").is_err());
        let t = token(json!({"$value": 1, "$min": 1, "$max": "5px"}));
        assert!(Constraint::from_token(&t, "x").is_err());
    }

    #[test]
    fn unresolved_references_are_skipped() {
        let t = token(json!({"$value": 1, "$min": 1, "$max": 5}));
        let c = Constraint::from_token(&t, "x").unwrap().unwrap();
        assert!(c.check(&json!("{some.ref}"), "x").is_ok());
    }
}
