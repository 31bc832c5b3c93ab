//! Runtime value model: scalars, anchors and relational values.
//!
//! A `Relational` value caches its offsets from each referenced anchor (and
//! the qualifier each offset satisfies) at the moment it is declared (spec
//! §3 "Lifecycle" / §4.3) — later rebinding of the anchor does not change an
//! already-created relational value's cached offsets, only new ones created
//! after the rebind.

use crate::error::GiantError;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
            Scalar::Bool(_) => "boolean",
        }
    }

    /// Apply a binary arithmetic operator following spec §4.3: both operands
    /// numeric, result stays integer unless either operand is a float or the
    /// operator is division (division always promotes to float).
    pub fn apply_binary(op: crate::ast::BinOp, lhs: &Scalar, rhs: &Scalar, line: usize) -> Result<Scalar, GiantError> {
        use crate::ast::BinOp;

        let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
            return Err(GiantError::type_error(
                line,
                format!(
                    "cannot apply arithmetic to a {} and a {}",
                    lhs.type_name(),
                    rhs.type_name()
                ),
            ));
        };

        if matches!(op, BinOp::Div) {
            if b == 0.0 {
                return Err(GiantError::arithmetic(line, "division by zero"));
            }
            return Ok(Scalar::Float(a / b));
        }

        let both_int = matches!((lhs, rhs), (Scalar::Int(_), Scalar::Int(_)));
        if both_int {
            let (i, j) = match (lhs, rhs) {
                (Scalar::Int(i), Scalar::Int(j)) => (*i, *j),
                _ => unreachable!(),
            };
            let result = match op {
                BinOp::Add => i + j,
                BinOp::Sub => i - j,
                BinOp::Mul => i * j,
                BinOp::Div => unreachable!(),
            };
            Ok(Scalar::Int(result))
        } else {
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => unreachable!(),
            };
            Ok(Scalar::Float(result))
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{}", format_float(*v)),
            Scalar::Str(s) => write!(f, "{s}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Rust's default `{}` formatting for `f64` drops a whole number's trailing
/// `.0` (`7.0` -> `"7"`); GIANT always shows at least one decimal digit.
fn format_float(v: f64) -> String {
    let precise = format!("{v:.10}");
    let trimmed = precise.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Over,
    Under,
    Near,
}

impl Qualifier {
    pub fn from_str(s: &str) -> Option<Qualifier> {
        match s {
            "over" => Some(Qualifier::Over),
            "under" => Some(Qualifier::Under),
            "near" => Some(Qualifier::Near),
            _ => None,
        }
    }
}

impl std::fmt::Display for Qualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Qualifier::Over => "over",
            Qualifier::Under => "under",
            Qualifier::Near => "near",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub name: String,
    pub value: Scalar,
    pub metadata: Vec<(String, Scalar)>,
}

impl Anchor {
    pub fn value_f64(&self, line: usize) -> Result<f64, GiantError> {
        self.value
            .as_f64()
            .ok_or_else(|| GiantError::type_error(line, format!("anchor '{}' is not numeric", self.name)))
    }

    /// `tolerance` metadata, defaulting to zero when absent.
    pub fn tolerance(&self) -> f64 {
        self.metadata
            .iter()
            .find(|(k, _)| k == "tolerance")
            .and_then(|(_, v)| v.as_f64())
            .unwrap_or(0.0)
    }

    pub fn metadata_get(&self, key: &str) -> Option<&Scalar> {
        self.metadata.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl std::fmt::Display for Anchor {
    /// `<name> = <value> [unit=<u>] [tolerance=±<t>] …` (spec §4.3), one
    /// bracketed segment per metadata entry in declaration order.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.value)?;
        for (key, value) in &self.metadata {
            if key == "tolerance" {
                write!(f, " [tolerance=\u{b1}{value}]")?;
            } else {
                write!(f, " [{key}={value}]")?;
            }
        }
        Ok(())
    }
}

/// A single cached `(offset, qualifier)` pair against one of a relational
/// value's referenced anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalOffset {
    pub anchor_name: String,
    pub offset: Scalar,
    pub qualifier: Qualifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relational {
    pub value: Scalar,
    pub offsets: Vec<RelationalOffset>,
    pub metadata: Vec<(String, Scalar)>,
}

impl std::fmt::Display for Relational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)?;
        if !self.offsets.is_empty() {
            let parts: Vec<String> = self
                .offsets
                .iter()
                .map(|o| format!("{} {} {}", o.offset, o.qualifier, o.anchor_name))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

/// `|value - anchor_value|` (spec §3): the offset's numeric kind stays
/// integer only when both the relational value and the anchor are
/// integers; any float involved promotes it.
pub fn compute_offset(value: &Scalar, anchor_value: &Scalar) -> Option<Scalar> {
    match (value, anchor_value) {
        (Scalar::Int(v), Scalar::Int(a)) => Some(Scalar::Int((v - a).abs())),
        _ => {
            let v = value.as_f64()?;
            let a = anchor_value.as_f64()?;
            Some(Scalar::Float((v - a).abs()))
        }
    }
}

/// Which qualifier a numeric value satisfies relative to an anchor, given
/// the anchor's tolerance. Shared by relational-offset caching and `when`
/// dispatch (spec §4.3: a `when` subject not referenced by the relational
/// value still resolves its qualifier this same way, directly against the
/// named anchor).
pub fn qualifier_of(value_f64: f64, anchor: &Anchor) -> Qualifier {
    let anchor_f64 = anchor.value.as_f64().unwrap_or(0.0);
    let diff = value_f64 - anchor_f64;
    if diff.abs() <= anchor.tolerance() {
        Qualifier::Near
    } else if diff > 0.0 {
        Qualifier::Over
    } else {
        Qualifier::Under
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Scalar(Scalar),
    Anchor(Anchor),
    Relational(Relational),
}

impl Binding {
    pub fn type_name(&self) -> &'static str {
        match self {
            Binding::Scalar(s) => s.type_name(),
            Binding::Anchor(_) => "anchor",
            Binding::Relational(_) => "relational",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_display_keeps_one_decimal_digit() {
        assert_eq!(format_float(7.0), "7.0");
        assert_eq!(format_float(7.5), "7.5");
        assert_eq!(format_float(7.25), "7.25");
    }

    #[test]
    fn division_always_promotes_to_float() {
        let r = Scalar::apply_binary(crate::ast::BinOp::Div, &Scalar::Int(4), &Scalar::Int(2), 1).unwrap();
        assert_eq!(r, Scalar::Float(2.0));
    }

    #[test]
    fn division_by_zero_is_arithmetic_error() {
        let err = Scalar::apply_binary(crate::ast::BinOp::Div, &Scalar::Int(1), &Scalar::Int(0), 1).unwrap_err();
        assert!(matches!(err, GiantError::Arithmetic { .. }));
    }

    #[test]
    fn integer_arithmetic_stays_integer() {
        let r = Scalar::apply_binary(crate::ast::BinOp::Add, &Scalar::Int(2), &Scalar::Int(3), 1).unwrap();
        assert_eq!(r, Scalar::Int(5));
    }

    #[test]
    fn offset_is_absolute_regardless_of_which_side_the_value_falls_on() {
        assert_eq!(compute_offset(&Scalar::Int(15), &Scalar::Int(20)), Some(Scalar::Int(5)));
        assert_eq!(compute_offset(&Scalar::Int(15), &Scalar::Int(10)), Some(Scalar::Int(5)));
    }

    #[test]
    fn qualifier_within_tolerance_is_near() {
        let anchor = Anchor {
            name: "limit".into(),
            value: Scalar::Float(100.0),
            metadata: vec![("tolerance".into(), Scalar::Float(2.0))],
        };
        assert_eq!(qualifier_of(101.0, &anchor), Qualifier::Near);
        assert_eq!(qualifier_of(105.0, &anchor), Qualifier::Over);
        assert_eq!(qualifier_of(90.0, &anchor), Qualifier::Under);
    }
}
