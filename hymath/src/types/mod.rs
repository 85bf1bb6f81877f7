//! Runtime values and their types
//!
//! The engine knows three kinds of values: numbers, identifiers (string
//! atoms) and homogeneous lists. [`Type`] mirrors them and adds numbered
//! generic placeholders used by overload signatures in
//! [`FunctionContainer`](crate::functions::FunctionContainer).
//!
//! Equality on [`Type`] is structural and strict: `list` (an untyped, empty
//! list) is *not* equal to `list(number)`. The looser matching used while
//! binding generics lives in the function registry, not here.
use std::fmt;

use strum::{EnumIs, EnumTryAs};

use crate::error::EvalErrorKind;

pub mod convert;

/// Identifier of a generic placeholder inside one overload signature.
pub type GenericId = u8;

/// Static type of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum Type {
    /// A 64-bit floating point number.
    Number,

    /// A string atom, e.g. the bound name of an iteration.
    Identifier,

    /// A list whose elements all share the inner type.
    ///
    /// The element type is `None` only for lists that are known to be empty.
    List(Option<Box<Type>>),

    /// Placeholder bound per call during overload resolution.
    Generic(GenericId),
}

impl Type {
    /// The type of an empty list.
    pub const UNTYPED_LIST: Type = Type::List(None);

    /// Build `list(element)`.
    pub fn list_of(element: Type) -> Self {
        Type::List(Some(Box::new(element)))
    }

    /// Element type for list types, `None` for every other type and for the
    /// untyped list.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(Some(element)) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Number => write!(f, "number"),
            Type::Identifier => write!(f, "identifier"),
            Type::List(None) => write!(f, "list"),
            Type::List(Some(element)) => write!(f, "list({})", element),
            Type::Generic(id) => write!(f, "T{}", id),
        }
    }
}

/// A homogeneous list of values.
///
/// The element type is fixed by the first element; pushing a value of any
/// other type is rejected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct List {
    values: Vec<Value>,
    element_type: Option<Type>,
}

impl List {
    /// Create an empty, untyped list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from `values`, checking that all of them share one type.
    pub fn from_values(values: Vec<Value>) -> Result<Self, EvalErrorKind> {
        let mut list = Self::new();
        for value in values {
            list.push(value)?;
        }
        Ok(list)
    }

    /// Append `value`, fixing the element type on the first push.
    pub fn push(&mut self, value: Value) -> Result<(), EvalErrorKind> {
        let ty = value.ty();
        match &self.element_type {
            Some(expected) if *expected != ty => {
                return Err(EvalErrorKind::UnexpectedType {
                    expected: expected.clone(),
                    found: Some(ty),
                });
            }
            Some(_) => {}
            None => self.element_type = Some(ty),
        }
        self.values.push(value);
        Ok(())
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn element_type(&self) -> Option<&Type> {
        self.element_type.as_ref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// The list type of this value, `list` when still empty.
    pub fn ty(&self) -> Type {
        Type::List(self.element_type.clone().map(Box::new))
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// A runtime value produced by evaluating a node.
#[derive(Debug, Clone, PartialEq, EnumIs, EnumTryAs)]
pub enum Value {
    Number(f64),
    Identifier(String),
    List(List),
}

impl Value {
    /// Type of this value. Lists report their element type, `list` if empty.
    pub fn ty(&self) -> Type {
        match self {
            Value::Number(_) => Type::Number,
            Value::Identifier(_) => Type::Identifier,
            Value::List(list) => list.ty(),
        }
    }

    pub fn as_number(&self) -> Result<f64, EvalErrorKind> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(EvalErrorKind::UnexpectedType {
                expected: Type::Number,
                found: Some(other.ty()),
            }),
        }
    }

    pub fn as_identifier(&self) -> Result<&str, EvalErrorKind> {
        match self {
            Value::Identifier(name) => Ok(name),
            other => Err(EvalErrorKind::UnexpectedType {
                expected: Type::Identifier,
                found: Some(other.ty()),
            }),
        }
    }

    pub fn as_list(&self) -> Result<&List, EvalErrorKind> {
        match self {
            Value::List(list) => Ok(list),
            other => Err(EvalErrorKind::UnexpectedType {
                expected: Type::UNTYPED_LIST,
                found: Some(other.ty()),
            }),
        }
    }

    /// Interpret a number as an exact integer.
    ///
    /// Fails with a value error for fractional, infinite or out of range
    /// numbers.
    pub fn as_int(&self) -> Result<i64, EvalErrorKind> {
        exact_int(self.as_number()?)
    }
}

/// Convert `n` to an `i64` if it has no fractional part.
pub fn exact_int(n: f64) -> Result<i64, EvalErrorKind> {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Ok(n as i64)
    } else {
        Err(EvalErrorKind::ValueError(format!(
            "{} is not an integral number",
            n
        )))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Identifier(name) => write!(f, "\"{}\"", name),
            Value::List(list) => {
                write!(f, "[")?;
                for (idx, value) in list.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}
