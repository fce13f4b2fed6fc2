//! Dimension values: a float magnitude plus a CSS unit from a closed set.

use crate::error::BuildError;
use std::fmt;

/// Recognized CSS units, plus `None` for unitless numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Px,
    Cm,
    Mm,
    In,
    Pt,
    Pc,
    Em,
    Rem,
    Ex,
    Ch,
    Vw,
    Vh,
    Vmin,
    Vmax,
    Percent,
    S,
    Ms,
    Deg,
    Rad,
    Turn,
    None,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::In => "in",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
            Unit::Em => "em",
            Unit::Rem => "rem",
            Unit::Ex => "ex",
            Unit::Ch => "ch",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Vmin => "vmin",
            Unit::Vmax => "vmax",
            Unit::Percent => "%",
            Unit::S => "s",
            Unit::Ms => "ms",
            Unit::Deg => "deg",
            Unit::Rad => "rad",
            Unit::Turn => "turn",
            Unit::None => "",
        }
    }

    fn from_suffix(s: &str) -> Option<Unit> {
        match s {
            "px" => Some(Unit::Px),
            "cm" => Some(Unit::Cm),
            "mm" => Some(Unit::Mm),
            "in" => Some(Unit::In),
            "pt" => Some(Unit::Pt),
            "pc" => Some(Unit::Pc),
            "em" => Some(Unit::Em),
            "rem" => Some(Unit::Rem),
            "ex" => Some(Unit::Ex),
            "ch" => Some(Unit::Ch),
            "vw" => Some(Unit::Vw),
            "vh" => Some(Unit::Vh),
            "vmin" => Some(Unit::Vmin),
            "vmax" => Some(Unit::Vmax),
            "%" => Some(Unit::Percent),
            "s" => Some(Unit::S),
            "ms" => Some(Unit::Ms),
            "deg" => Some(Unit::Deg),
            "rad" => Some(Unit::Rad),
            "turn" => Some(Unit::Turn),
            "" => Some(Unit::None),
            _ => None,
        }
    }
}

/// An immutable dimension value: magnitude plus unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: Unit,
}

impl Dimension {
    pub fn new(value: f64, unit: Unit) -> Self {
        Dimension { value, unit }
    }

    /// Parse the grammar `-? digits (. digits)? unit?`.
    pub fn parse(input: &str) -> Result<Dimension, BuildError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(BuildError::Dimension {
                input: input.to_string(),
                message: "empty string".to_string(),
            });
        }
        let bytes = s.as_bytes();
        let mut i = 0;
        if bytes[0] == b'-' {
            i = 1;
        }
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return Err(BuildError::Dimension {
                input: input.to_string(),
                message: "expected a digit".to_string(),
            });
        }
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
            let frac_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i == frac_start {
                return Err(BuildError::Dimension {
                    input: input.to_string(),
                    message: "expected a digit after '.'".to_string(),
                });
            }
        }
        let value: f64 = s[..i].parse().map_err(|_| BuildError::Dimension {
            input: input.to_string(),
            message: "invalid number".to_string(),
        })?;
        let unit = Unit::from_suffix(&s[i..]).ok_or_else(|| BuildError::Dimension {
            input: input.to_string(),
            message: format!("unrecognized unit '{}'", &s[i..]),
        })?;
        Ok(Dimension { value, unit })
    }

    /// True when the string parses as a dimension.
    pub fn is_dimension(input: &str) -> bool {
        Dimension::parse(input).is_ok()
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    pub fn add(&self, other: &Dimension) -> Result<Dimension, BuildError> {
        self.require_same_unit(other, "add")?;
        Ok(Dimension::new(self.value + other.value, self.pick_unit(other)))
    }

    pub fn subtract(&self, other: &Dimension) -> Result<Dimension, BuildError> {
        self.require_same_unit(other, "subtract")?;
        Ok(Dimension::new(self.value - other.value, self.pick_unit(other)))
    }

    pub fn multiply(&self, scalar: f64) -> Dimension {
        Dimension::new(self.value * scalar, self.unit)
    }

    pub fn divide(&self, scalar: f64) -> Result<Dimension, BuildError> {
        if scalar == 0.0 {
            return Err(BuildError::Dimension {
                input: self.to_string(),
                message: "division by zero".to_string(),
            });
        }
        Ok(Dimension::new(self.value / scalar, self.unit))
    }

    /// Unitless zero is compatible with anything; otherwise units must match.
    fn require_same_unit(&self, other: &Dimension, op: &str) -> Result<(), BuildError> {
        let compatible = self.unit == other.unit
            || (self.unit == Unit::None && self.is_zero())
            || (other.unit == Unit::None && other.is_zero());
        if !compatible {
            return Err(BuildError::Dimension {
                input: format!("{} {} {}", self, op, other),
                message: format!(
                    "cannot {} '{}' and '{}': unit mismatch",
                    op,
                    self.unit.as_str(),
                    other.unit.as_str()
                ),
            });
        }
        Ok(())
    }

    fn pick_unit(&self, other: &Dimension) -> Unit {
        if self.unit == Unit::None {
            other.unit
        } else {
            self.unit
        }
    }

    /// Format the magnitude: rounded to four decimal places, integer
    /// literal when integral, trailing zeros trimmed otherwise.
    pub fn format_value(value: f64) -> String {
        let rounded = (value * 10_000.0).round() / 10_000.0;
        if rounded == rounded.trunc() && rounded.abs() < 1e15 {
            format!("{}", rounded as i64)
        } else {
            let mut s = format!("{:.4}", rounded);
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
            s
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            Dimension::format_value(self.value),
            self.unit.as_str()
        )
    }
}
