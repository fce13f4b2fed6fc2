//! Reference and expression resolution over a flattened dictionary.
//!
//! `ResolveValue` classifies every raw `$value`:
//!
//! - non-strings pass through unchanged
//! - expressions (`calc(`, `contrast(`, `darken(`, `lighten(`, `scale(`,
//!   `shade(`) are evaluated after their reference arguments resolve
//! - a *pure* reference `{path}` yields the referenced value with its
//!   type preserved
//! - a string containing `{path}` segments is interpolated textually
//! - plain strings pass through unchanged
//!
//! The resolver memoizes per dictionary pass and keeps a resolution stack
//! per top-level call for cycle detection; a cycle is reported with the
//! full chain, never broken silently.

use crate::color::Color;
use crate::dimension::{Dimension, Unit};
use crate::error::BuildError;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Expression heads, the closed set.
const EXPRESSION_HEADS: [&str; 6] = ["calc", "contrast", "darken", "lighten", "scale", "shade"];

/// True when the string is one of the recognized expression forms.
pub fn is_expression(s: &str) -> bool {
    EXPRESSION_HEADS
        .iter()
        .any(|h| s.starts_with(h) && s[h.len()..].starts_with('('))
}

/// True when the string is exactly one `{path}` reference.
pub fn is_pure_reference(s: &str) -> bool {
    s.len() > 2
        && s.starts_with('{')
        && s.ends_with('}')
        && !s[1..s.len() - 1].contains('{')
        && !s[1..s.len() - 1].contains('}')
}

/// Textual form of a resolved value, as it appears in CSS output and in
/// interpolated strings. Arrays join with commas; composite objects keep
/// their compact JSON form.
pub fn to_css_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) => Dimension::format_value(f),
            None => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(to_css_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(v).unwrap_or_default(),
        Value::Null => String::new(),
    }
}

/// Cycle-detecting, memoizing resolver over one flattened dictionary.
pub struct Resolver<'a> {
    flat: &'a BTreeMap<String, Value>,
    cache: HashMap<String, Value>,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(flat: &'a BTreeMap<String, Value>) -> Self {
        Resolver {
            flat,
            cache: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Resolve every path, producing the resolved table. Stops at the
    /// first failure; the accumulating validator drives per-path
    /// resolution itself via [`Resolver::resolve_path`].
    pub fn resolve_table(&mut self) -> Result<BTreeMap<String, Value>, BuildError> {
        let mut out = BTreeMap::new();
        for path in self.flat.keys() {
            out.insert(path.clone(), self.resolve_path(path)?);
        }
        Ok(out)
    }

    /// Resolve one dotted path to its final value.
    pub fn resolve_path(&mut self, path: &str) -> Result<Value, BuildError> {
        if let Some(v) = self.cache.get(path) {
            return Ok(v.clone());
        }
        if self.stack.iter().any(|p| p == path) {
            let mut chain = self.stack.clone();
            chain.push(path.to_string());
            return Err(BuildError::CircularReference {
                chain: chain.join(" -> "),
            });
        }
        let raw = self
            .flat
            .get(path)
            .cloned()
            .ok_or_else(|| BuildError::MissingReference {
                path: path.to_string(),
            })?;
        self.stack.push(path.to_string());
        let result = self.resolve_value(path, &raw);
        // The stack is popped on every exit, including the error path
        self.stack.pop();
        let value = result?;
        self.cache.insert(path.to_string(), value.clone());
        Ok(value)
    }

    /// Resolve a raw value in the context of `path`.
    pub fn resolve_value(&mut self, path: &str, raw: &Value) -> Result<Value, BuildError> {
        let s = match raw {
            Value::String(s) => s,
            other => return Ok(other.clone()),
        };
        if is_expression(s) {
            return self.eval_expression(path, s);
        }
        if s.contains('{') {
            if is_pure_reference(s) {
                return self.resolve_path(&s[1..s.len() - 1]);
            }
            return Ok(Value::String(self.interpolate(s)?));
        }
        Ok(raw.clone())
    }

    /// Replace every `{path}` in the string with the textual form of the
    /// referenced value.
    fn interpolate(&mut self, s: &str) -> Result<String, BuildError> {
        let mut out = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| BuildError::Expression {
                path: s.to_string(),
                message: "unterminated reference".to_string(),
            })?;
            let target = &after[..close];
            let resolved = self.resolve_path(target)?;
            out.push_str(&to_css_string(&resolved));
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    // ── Expression evaluation ────────────────────────────────────────

    fn eval_expression(&mut self, path: &str, s: &str) -> Result<Value, BuildError> {
        let open = s.find('(').unwrap_or(s.len());
        let head = &s[..open];
        if !s.ends_with(')') {
            return Err(BuildError::Expression {
                path: path.to_string(),
                message: format!("malformed expression '{}'", s),
            });
        }
        let inner = &s[open + 1..s.len() - 1];
        match head {
            "calc" => self.eval_calc(path, inner),
            "contrast" => {
                let color = self.resolve_color_arg(path, inner.trim())?;
                Ok(Value::String(color.content_color().format()))
            }
            "darken" | "lighten" => {
                let (color_arg, amount_arg) = split_two_args(path, head, inner)?;
                let color = self.resolve_color_arg(path, &color_arg)?;
                let amount = parse_percent(path, &amount_arg)?;
                let result = if head == "darken" {
                    color.darken(amount)
                } else {
                    color.lighten(amount)
                };
                Ok(Value::String(result.format()))
            }
            "scale" => {
                let (dim_arg, factor_arg) = split_two_args(path, head, inner)?;
                let dim = self.resolve_dimension_arg(path, &dim_arg)?;
                let factor: f64 = factor_arg.parse().map_err(|_| BuildError::Expression {
                    path: path.to_string(),
                    message: format!("scale factor '{}' is not a number", factor_arg),
                })?;
                Ok(dimension_value(dim.multiply(factor)))
            }
            "shade" => {
                let (color_arg, level_arg) = split_two_args(path, head, inner)?;
                let color = self.resolve_color_arg(path, &color_arg)?;
                let level: u32 = level_arg.parse().map_err(|_| BuildError::Expression {
                    path: path.to_string(),
                    message: format!("shade level '{}' is not a non-negative integer", level_arg),
                })?;
                Ok(Value::String(shade(&color, level).format()))
            }
            other => Err(BuildError::UnknownExpression {
                expr: format!("{}(...)", other),
            }),
        }
    }

    /// Resolve an expression argument to a parsed color: either a `{ref}`
    /// or a color literal.
    fn resolve_color_arg(&mut self, path: &str, arg: &str) -> Result<Color, BuildError> {
        let text = self.resolve_arg_text(path, arg)?;
        Color::parse(&text)
    }

    fn resolve_dimension_arg(&mut self, path: &str, arg: &str) -> Result<Dimension, BuildError> {
        let text = self.resolve_arg_text(path, arg)?;
        Dimension::parse(&text)
    }

    fn resolve_arg_text(&mut self, path: &str, arg: &str) -> Result<String, BuildError> {
        let arg = arg.trim();
        if is_pure_reference(arg) {
            let v = self.resolve_path(&arg[1..arg.len() - 1])?;
            Ok(to_css_string(&v))
        } else if arg.contains('{') {
            self.interpolate(arg)
        } else {
            let _ = path;
            Ok(arg.to_string())
        }
    }

    // ── calc ─────────────────────────────────────────────────────────

    /// Evaluate `calc(expr)`: substitute references textually, then run
    /// the small split-on-operator arithmetic parser.
    fn eval_calc(&mut self, path: &str, inner: &str) -> Result<Value, BuildError> {
        let substituted = self.interpolate(inner)?;
        let dim = eval_arith(path, &substituted)?;
        Ok(dimension_value(dim))
    }
}

/// Render a dimension result: united values stay strings, unitless
/// results become JSON numbers.
fn dimension_value(dim: Dimension) -> Value {
    let rounded = (dim.value * 10_000.0).round() / 10_000.0;
    if dim.unit == Unit::None {
        match serde_json::Number::from_f64(rounded) {
            Some(n) => Value::Number(n),
            None => Value::String(dim.to_string()),
        }
    } else {
        Value::String(Dimension::new(rounded, dim.unit).to_string())
    }
}

/// Fixed monotone darkening schedule for `shade({color}, level)`:
/// level 0 is the color unchanged, each level darkens by 8% more,
/// saturating at 90%.
fn shade(color: &Color, level: u32) -> Color {
    if level == 0 {
        return *color;
    }
    let amount = (0.08 * level as f64).min(0.9);
    color.darken(amount)
}

fn split_two_args(path: &str, head: &str, inner: &str) -> Result<(String, String), BuildError> {
    let comma = top_level_comma(inner).ok_or_else(|| BuildError::Expression {
        path: path.to_string(),
        message: format!("{}() takes two arguments", head),
    })?;
    Ok((
        inner[..comma].trim().to_string(),
        inner[comma + 1..].trim().to_string(),
    ))
}

fn top_level_comma(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_percent(path: &str, arg: &str) -> Result<f64, BuildError> {
    let digits = arg.strip_suffix('%').ok_or_else(|| BuildError::Expression {
        path: path.to_string(),
        message: format!("expected a percent literal, found '{}'", arg),
    })?;
    let n: f64 = digits.trim().parse().map_err(|_| BuildError::Expression {
        path: path.to_string(),
        message: format!("invalid percent literal '{}'", arg),
    })?;
    Ok(n / 100.0)
}

// ── Arithmetic parser ────────────────────────────────────────────────
//
// Deliberately small: split the expression at the rightmost top-level
// `*` or `/` first, then at `+`/`-`. `-` is binary only when the
// preceding non-space character is not `*`, `/`, or `(`. No further
// grammar; the expression set is closed.

fn eval_arith(path: &str, expr: &str) -> Result<Dimension, BuildError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(BuildError::Expression {
            path: path.to_string(),
            message: "empty calc() expression".to_string(),
        });
    }

    if let Some((idx, op)) = rightmost_operator(expr, &['*', '/']) {
        let left = eval_arith(path, &expr[..idx])?;
        let right = eval_arith(path, &expr[idx + 1..])?;
        return apply_scalar_op(path, left, op, right);
    }
    if let Some((idx, op)) = rightmost_additive(expr) {
        let left = eval_arith(path, &expr[..idx])?;
        let right = eval_arith(path, &expr[idx + 1..])?;
        return if op == '+' {
            left.add(&right)
        } else {
            left.subtract(&right)
        };
    }
    if expr.starts_with('(') && expr.ends_with(')') && matching_outer_parens(expr) {
        return eval_arith(path, &expr[1..expr.len() - 1]);
    }
    if let Some(open) = expr.find('(') {
        let name = expr[..open].trim();
        if !name.is_empty() {
            return Err(BuildError::UnknownExpression {
                expr: format!("{}(...)", name),
            });
        }
    }
    Dimension::parse(expr).map_err(|_| BuildError::Expression {
        path: path.to_string(),
        message: format!("'{}' is not a number or dimension", expr.trim()),
    })
}

/// Rightmost occurrence of any of `ops` at paren depth zero.
fn rightmost_operator(expr: &str, ops: &[char]) -> Option<(usize, char)> {
    let mut depth = 0i32;
    let mut found = None;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && ops.contains(&c) => found = Some((i, c)),
            _ => {}
        }
    }
    found
}

/// Rightmost top-level `+` or binary `-`.
fn rightmost_additive(expr: &str) -> Option<(usize, char)> {
    let bytes = expr.as_bytes();
    let mut depth = 0i32;
    let mut found = None;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '+' if depth == 0 => found = Some((i, '+')),
            '-' if depth == 0 => {
                // Unary minus follows an operator, an open paren, or
                // starts the expression
                let prev = bytes[..i]
                    .iter()
                    .rev()
                    .find(|b| !b.is_ascii_whitespace())
                    .copied();
                match prev {
                    None | Some(b'*') | Some(b'/') | Some(b'(') | Some(b'+') | Some(b'-') => {}
                    _ => found = Some((i, '-')),
                }
            }
            _ => {}
        }
    }
    found
}

fn matching_outer_parens(expr: &str) -> bool {
    let mut depth = 0i32;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != expr.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn apply_scalar_op(
    path: &str,
    left: Dimension,
    op: char,
    right: Dimension,
) -> Result<Dimension, BuildError> {
    let err = |message: String| BuildError::Expression {
        path: path.to_string(),
        message,
    };
    match op {
        '*' => match (left.unit, right.unit) {
            (Unit::None, _) => Ok(right.multiply(left.value)),
            (_, Unit::None) => Ok(left.multiply(right.value)),
            _ => Err(err(format!(
                "cannot multiply '{}' by '{}': one operand must be a scalar",
                left, right
            ))),
        },
        '/' => match (left.unit, right.unit) {
            (_, Unit::None) => {
                if right.value == 0.0 {
                    Err(err("division by zero".to_string()))
                } else {
                    Ok(left.multiply(1.0 / right.value))
                }
            }
            (Unit::None, _) => {
                if right.value == 0.0 {
                    Err(err("division by zero".to_string()))
                } else {
                    Ok(Dimension::new(left.value / right.value, right.unit))
                }
            }
            _ => Err(err(format!(
                "cannot divide '{}' by '{}': the divisor must be a scalar",
                left, right
            ))),
        },
        _ => Err(err(format!("unknown operator '{}'", op))),
    }
}
