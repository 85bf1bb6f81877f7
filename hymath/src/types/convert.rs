//! Conversions between plain Rust values and engine values.
//!
//! [`TypeConvertible`] lets overloads be declared from ordinary closures: the
//! argument types determine the call signature and every argument is cast
//! before the closure runs. See
//! [`FunctionContainerBuilder::overload2`](crate::functions::FunctionContainerBuilder::overload2).
use crate::{
    error::EvalErrorKind,
    types::{GenericId, List, Type, Value},
};

/// A Rust type with a fixed engine [`Type`].
pub trait TypeConvertible: Sized {
    /// The engine type this Rust type stands for. May contain generics.
    fn math_type() -> Type;

    /// Cast an engine value into this type.
    fn from_value(value: Value) -> Result<Self, EvalErrorKind>;

    /// Convert back into an engine value.
    fn into_value(self) -> Result<Value, EvalErrorKind>;
}

impl TypeConvertible for f64 {
    fn math_type() -> Type {
        Type::Number
    }

    fn from_value(value: Value) -> Result<Self, EvalErrorKind> {
        value.as_number()
    }

    fn into_value(self) -> Result<Value, EvalErrorKind> {
        Ok(Value::Number(self))
    }
}

impl TypeConvertible for String {
    fn math_type() -> Type {
        Type::Identifier
    }

    fn from_value(value: Value) -> Result<Self, EvalErrorKind> {
        match value {
            Value::Identifier(name) => Ok(name),
            other => Err(EvalErrorKind::UnexpectedType {
                expected: Type::Identifier,
                found: Some(other.ty()),
            }),
        }
    }

    fn into_value(self) -> Result<Value, EvalErrorKind> {
        Ok(Value::Identifier(self))
    }
}

/// Any list, whatever its element type.
impl TypeConvertible for List {
    fn math_type() -> Type {
        Type::UNTYPED_LIST
    }

    fn from_value(value: Value) -> Result<Self, EvalErrorKind> {
        match value {
            Value::List(list) => Ok(list),
            other => Err(EvalErrorKind::UnexpectedType {
                expected: Type::UNTYPED_LIST,
                found: Some(other.ty()),
            }),
        }
    }

    fn into_value(self) -> Result<Value, EvalErrorKind> {
        Ok(Value::List(self))
    }
}

impl<T: TypeConvertible> TypeConvertible for Vec<T> {
    fn math_type() -> Type {
        Type::list_of(T::math_type())
    }

    fn from_value(value: Value) -> Result<Self, EvalErrorKind> {
        match value {
            Value::List(list) => list.into_iter().map(T::from_value).collect(),
            other => Err(EvalErrorKind::UnexpectedType {
                expected: Self::math_type(),
                found: Some(other.ty()),
            }),
        }
    }

    fn into_value(self) -> Result<Value, EvalErrorKind> {
        let values = self
            .into_iter()
            .map(T::into_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(List::from_values(values)?))
    }
}

/// A value standing for the generic placeholder `ID`.
///
/// ```
/// use hymath::types::{Type, convert::{Generic, TypeConvertible}};
/// assert_eq!(<Generic<0>>::math_type(), Type::Generic(0));
/// assert_eq!(<Vec<Generic<1>>>::math_type(), Type::list_of(Type::Generic(1)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Generic<const ID: GenericId>(pub Value);

impl<const ID: GenericId> TypeConvertible for Generic<ID> {
    fn math_type() -> Type {
        Type::Generic(ID)
    }

    fn from_value(value: Value) -> Result<Self, EvalErrorKind> {
        Ok(Generic(value))
    }

    fn into_value(self) -> Result<Value, EvalErrorKind> {
        Ok(self.0)
    }
}
