//! Numeric literals assembled one token at a time.
//!
//! A literal keeps the digits exactly as entered so that an interactive
//! user sees `0.` after typing `.` and can keep appending digits. Tokens
//! drive a small state machine:
//!
//! | token       | effect                                           |
//! |-------------|--------------------------------------------------|
//! | digits      | append to the fraction if a point was entered, else to the integer part |
//! | `.`         | enter the fraction part (idempotent)             |
//! | `+-`        | flip the sign                                    |
use std::fmt;

use crate::{
    error::{EvalError, EvalErrorKind},
    operators::ContextEvaluable,
    tree::{NodeId, Tree},
    types::{Type, Value},
};

/// Token toggling the sign of a literal.
pub const SIGN_TOKEN: &str = "+-";
/// Token starting the fraction part of a literal.
pub const POINT_TOKEN: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumberLiteral {
    sign: Sign,
    integer: String,
    fraction: String,
    decimal: bool,
}

impl NumberLiteral {
    /// Parse a literal in entry form: an optional sign, digits and at most
    /// one decimal point. Digits may be missing on either side of the point
    /// (`"-"`, `"0."` and `".5"` are all valid states).
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let (sign, rest) = match raw.as_bytes()[0] {
            b'-' => (Sign::Minus, &raw[1..]),
            b'+' => (Sign::Plus, &raw[1..]),
            _ => (Sign::Plus, raw),
        };
        let (integer, fraction, decimal) = match rest.split_once('.') {
            Some((integer, fraction)) => (integer, fraction, true),
            None => (rest, "", false),
        };
        if !is_digits(integer) || !is_digits(fraction) {
            return None;
        }

        Some(Self {
            sign,
            integer: integer.to_string(),
            fraction: fraction.to_string(),
            decimal,
        })
    }

    /// Literal for a finite number, `None` for infinities and NaN.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Self::parse(&value.to_string())
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn has_decimal_point(&self) -> bool {
        self.decimal
    }

    pub fn negate(&mut self) {
        self.sign = match self.sign {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        };
    }

    pub fn enter_fraction(&mut self) {
        self.decimal = true;
    }

    /// Append decimal digits to the part currently being entered. Rejects
    /// anything that is not a digit, leaving the literal untouched.
    pub fn push_digits(&mut self, digits: &str) -> bool {
        if !is_digits(digits) {
            return false;
        }
        if self.decimal {
            self.fraction.push_str(digits);
        } else {
            self.integer.push_str(digits);
        }
        true
    }

    /// Apply one entry token (`+-`, `.` or digits, possibly mixed with a
    /// single point such as `"5.25"`).
    pub fn apply(&mut self, token: &str) -> bool {
        match token {
            SIGN_TOKEN => self.negate(),
            POINT_TOKEN => self.enter_fraction(),
            _ => {
                if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit() || c == '.') {
                    return false;
                }
                for part in token.split_inclusive('.') {
                    let digits = part.strip_suffix('.').unwrap_or(part);
                    self.push_digits(digits);
                    if part.ends_with('.') {
                        self.enter_fraction();
                    }
                }
            }
        }
        true
    }

    /// Normalised text, e.g. `-1.25`, `0` or `0.0`.
    pub fn canonical(&self) -> String {
        let mut result = String::new();
        if self.sign == Sign::Minus {
            result.push('-');
        }
        result.push_str(if self.integer.is_empty() { "0" } else { &self.integer });
        if self.decimal {
            result.push('.');
            result.push_str(if self.fraction.is_empty() { "0" } else { &self.fraction });
        }
        result
    }

    /// The literal as entered, e.g. `-` or `0.`.
    pub fn entry(&self) -> String {
        if self.sign == Sign::Plus && self.integer.is_empty() && !self.decimal {
            return "0".to_string();
        }
        let mut result = String::new();
        if self.sign == Sign::Minus {
            result.push('-');
        }
        result.push_str(&self.integer);
        if self.decimal {
            result.push('.');
            result.push_str(&self.fraction);
        }
        result
    }

    pub fn value(&self) -> Result<f64, EvalErrorKind> {
        let text = self.canonical();
        text.parse::<f64>()
            .map_err(|_| EvalErrorKind::ValueError(format!("`{}` is not a number", text)))
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entry())
    }
}

impl ContextEvaluable for NumberLiteral {
    fn identifier(&self) -> &str {
        "#number"
    }

    fn customize(&mut self, args: &[String]) -> bool {
        match args {
            [arg] if arg == SIGN_TOKEN || arg == POINT_TOKEN => true,
            [arg] => match Self::parse(arg) {
                Some(literal) => {
                    *self = literal;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn evaluate(&self, _tree: &mut Tree, _node: NodeId) -> Result<Value, EvalError> {
        Ok(Value::Number(self.value()?))
    }

    fn evaluate_type(&self, _tree: &Tree, _node: NodeId) -> Option<Type> {
        Some(Type::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_and_canonical_forms() {
        let literal = NumberLiteral::parse("0.").unwrap();
        assert_eq!(literal.entry(), "0.");
        assert_eq!(literal.canonical(), "0.0");

        let literal = NumberLiteral::parse("-").unwrap();
        assert_eq!(literal.entry(), "-");
        assert_eq!(literal.canonical(), "-0");
        assert_eq!(literal.value(), Ok(-0.0));
    }

    #[test]
    fn rejects_malformed_literals() {
        for raw in ["", "1.2.3", "1e5", "inf", "NaN", "--1", "1-"] {
            assert!(NumberLiteral::parse(raw).is_none(), "{raw} should be rejected");
        }
    }

    #[test]
    fn apply_mixed_token() {
        let mut literal = NumberLiteral::parse("1").unwrap();
        assert!(literal.apply("5.25"));
        assert_eq!(literal.canonical(), "15.25");
        assert!(!literal.apply("-3"));
        assert_eq!(literal.canonical(), "15.25");
    }
}
