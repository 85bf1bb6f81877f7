//! Overload registry with ad-hoc generics
//!
//! Role
//! - Hold every overload of one operator kind (e.g. all the ways `+` can be
//!   applied) and pick the one matching a call.
//! - Compute the concrete return type of a call from argument types alone, so
//!   nodes can cache their type without evaluating anything.
//!
//! Signatures may use [`Type::Generic`] placeholders. A placeholder binds to
//! the concrete type found at its first occurrence and every later occurrence
//! in the same signature must agree with that binding. The untyped list
//! `list` matches any list type, in either direction.
//!
//! Resolution first looks for an overload whose signature equals the
//! argument types, then scans the overloads in declaration order and takes the
//! first that fits. There is no "most specific" ranking.
//!
//! ```
//! use hymath::functions::FunctionContainer;
//! use hymath::types::{Type, Value};
//!
//! let add = FunctionContainer::builder()
//!     .overload2(|a: f64, b: f64| a + b)
//!     .build();
//!
//! assert_eq!(add.evaluate_type(&[Some(Type::Number), Some(Type::Number)]), Some(Type::Number));
//! assert_eq!(add.evaluate(vec![Value::Number(1.0), Value::Number(2.0)]), Ok(Value::Number(3.0)));
//! ```
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use log::debug;

use crate::{
    error::{EvalError, EvalErrorKind},
    tree::{NodeId, Tree},
    types::{GenericId, Type, Value, convert::TypeConvertible},
};

/// Computes the result of one overload from already type-checked arguments.
pub type Delegate = Arc<dyn Fn(&[Value]) -> Result<Value, EvalErrorKind> + Send + Sync>;

/// One entry of a [`FunctionContainer`].
#[derive(Clone)]
pub struct Overload {
    pub signature: Vec<Type>,
    pub return_type: Type,
    delegate: Delegate,
}

impl Overload {
    pub fn delegate(&self) -> &Delegate {
        &self.delegate
    }
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, ty) in self.signature.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

/// Outcome of a successful [`FunctionContainer::resolve`].
#[derive(Clone)]
pub struct Resolved {
    /// Declared return type with every bound generic substituted. `None` if
    /// the return type mentions a generic the arguments never bound.
    pub return_type: Option<Type>,
    pub delegate: Delegate,
}

/// The overloads of one operator kind.
///
/// Built once through [`FunctionContainer::builder`] and shared between all
/// instances of the operator, usually behind an [`Arc`].
#[derive(Clone, Default)]
pub struct FunctionContainer {
    overloads: Vec<Overload>,
    exact: HashMap<Vec<Type>, usize>,
}

impl fmt::Debug for FunctionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.overloads.iter()).finish()
    }
}

impl FunctionContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> FunctionContainerBuilder {
        FunctionContainerBuilder {
            container: Self::new(),
        }
    }

    /// Register an overload. Registering a signature a second time replaces
    /// the earlier overload in place.
    pub fn add_overload(&mut self, signature: Vec<Type>, return_type: Type, delegate: Delegate) {
        let overload = Overload {
            signature,
            return_type,
            delegate,
        };
        match self.exact.get(&overload.signature) {
            Some(&idx) => self.overloads[idx] = overload,
            None => {
                self.exact
                    .insert(overload.signature.clone(), self.overloads.len());
                self.overloads.push(overload);
            }
        }
    }

    pub fn overloads(&self) -> &[Overload] {
        &self.overloads
    }

    pub fn len(&self) -> usize {
        self.overloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// Find the overload accepting `arguments`.
    pub fn resolve(&self, arguments: &[Type]) -> Option<Resolved> {
        if let Some(&idx) = self.exact.get(arguments) {
            let overload = &self.overloads[idx];
            return Some(Resolved {
                return_type: substitute(&overload.return_type, &BTreeMap::new()),
                delegate: overload.delegate.clone(),
            });
        }

        self.overloads.iter().find_map(|overload| {
            let bindings = signature_fits(&overload.signature, arguments)?;
            Some(Resolved {
                return_type: substitute(&overload.return_type, &bindings),
                delegate: overload.delegate.clone(),
            })
        })
    }

    /// Call the overload matching the types of `values`.
    pub fn evaluate(&self, values: Vec<Value>) -> Result<Value, EvalErrorKind> {
        let signature: Vec<Type> = values.iter().map(Value::ty).collect();
        match self.resolve(&signature) {
            Some(resolved) => (resolved.delegate)(&values),
            None => {
                debug!("No overload accepts ({:?}) among {:?}", signature, self);
                Err(EvalErrorKind::NoMatchingFunction { signature })
            }
        }
    }

    /// Evaluate every node of `arguments`, then call the matching overload.
    pub fn evaluate_nodes(&self, tree: &mut Tree, arguments: &[NodeId]) -> Result<Value, EvalError> {
        let values = arguments
            .iter()
            .map(|&node| tree.evaluate(node))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.evaluate(values)?)
    }

    /// Return type of a call with the given argument types, `None` as soon as
    /// one of them is unknown or no overload fits.
    pub fn evaluate_type(&self, arguments: &[Option<Type>]) -> Option<Type> {
        let signature = arguments.iter().cloned().collect::<Option<Vec<_>>>()?;
        self.resolve(&signature)?.return_type
    }

    /// Same as [`evaluate_type`](Self::evaluate_type) using the cached types
    /// of `arguments`.
    pub fn evaluate_type_nodes(&self, tree: &Tree, arguments: &[NodeId]) -> Option<Type> {
        let types: Vec<Option<Type>> = arguments
            .iter()
            .map(|&node| tree.return_type(node).cloned())
            .collect();
        self.evaluate_type(&types)
    }
}

fn signature_fits(
    signature: &[Type],
    arguments: &[Type],
) -> Option<BTreeMap<GenericId, Type>> {
    if signature.len() != arguments.len() {
        return None;
    }
    let mut bindings = BTreeMap::new();
    signature
        .iter()
        .zip(arguments)
        .all(|(param, concrete)| type_matches(param, concrete, &mut bindings))
        .then_some(bindings)
}

fn type_matches(param: &Type, concrete: &Type, bindings: &mut BTreeMap<GenericId, Type>) -> bool {
    match (param, concrete) {
        (a, b) if a == b => true,
        (Type::Generic(id), concrete) => match bindings.get(id) {
            Some(bound) => match unify(bound, concrete) {
                Some(refined) => {
                    bindings.insert(*id, refined);
                    true
                }
                None => false,
            },
            None => {
                bindings.insert(*id, concrete.clone());
                true
            }
        },
        (Type::List(_), Type::List(None)) | (Type::List(None), Type::List(_)) => true,
        (Type::List(Some(a)), Type::List(Some(b))) => type_matches(a, b, bindings),
        _ => false,
    }
}

/// Merge two bindings of one generic. An untyped list is refined by a typed
/// one; anything else has to be equal.
fn unify(bound: &Type, concrete: &Type) -> Option<Type> {
    match (bound, concrete) {
        (a, b) if a == b => Some(a.clone()),
        (Type::List(None), Type::List(_)) => Some(concrete.clone()),
        (Type::List(_), Type::List(None)) => Some(bound.clone()),
        (Type::List(Some(a)), Type::List(Some(b))) => unify(a, b).map(Type::list_of),
        _ => None,
    }
}

fn substitute(ty: &Type, bindings: &BTreeMap<GenericId, Type>) -> Option<Type> {
    match ty {
        Type::Generic(id) => bindings.get(id).cloned(),
        // An unbound element type leaves an untyped list.
        Type::List(Some(element)) => Some(Type::List(substitute(element, bindings).map(Box::new))),
        other => Some(other.clone()),
    }
}

fn arg<T: TypeConvertible>(args: &[Value], idx: usize) -> Result<T, EvalErrorKind> {
    let value = args.get(idx).cloned().ok_or(EvalErrorKind::MissingArgument)?;
    T::from_value(value)
}

/// Incremental construction of a [`FunctionContainer`].
pub struct FunctionContainerBuilder {
    container: FunctionContainer,
}

impl FunctionContainerBuilder {
    /// Register an overload with an explicit signature.
    pub fn overload<F>(mut self, signature: Vec<Type>, return_type: Type, delegate: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalErrorKind> + Send + Sync + 'static,
    {
        self.container
            .add_overload(signature, return_type, Arc::new(delegate));
        self
    }

    pub fn overload1<A, R, F>(self, f: F) -> Self
    where
        A: TypeConvertible,
        R: TypeConvertible,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.try_overload1(move |a: A| Ok(f(a)))
    }

    pub fn try_overload1<A, R, F>(self, f: F) -> Self
    where
        A: TypeConvertible,
        R: TypeConvertible,
        F: Fn(A) -> Result<R, EvalErrorKind> + Send + Sync + 'static,
    {
        self.overload(vec![A::math_type()], R::math_type(), move |args| {
            f(arg(args, 0)?)?.into_value()
        })
    }

    /// Register a two-argument closure, deriving the signature from its
    /// parameter types.
    pub fn overload2<A, B, R, F>(self, f: F) -> Self
    where
        A: TypeConvertible,
        B: TypeConvertible,
        R: TypeConvertible,
        F: Fn(A, B) -> R + Send + Sync + 'static,
    {
        self.try_overload2(move |a: A, b: B| Ok(f(a, b)))
    }

    pub fn try_overload2<A, B, R, F>(self, f: F) -> Self
    where
        A: TypeConvertible,
        B: TypeConvertible,
        R: TypeConvertible,
        F: Fn(A, B) -> Result<R, EvalErrorKind> + Send + Sync + 'static,
    {
        self.overload(
            vec![A::math_type(), B::math_type()],
            R::math_type(),
            move |args| f(arg(args, 0)?, arg(args, 1)?)?.into_value(),
        )
    }

    pub fn overload3<A, B, C, R, F>(self, f: F) -> Self
    where
        A: TypeConvertible,
        B: TypeConvertible,
        C: TypeConvertible,
        R: TypeConvertible,
        F: Fn(A, B, C) -> R + Send + Sync + 'static,
    {
        self.try_overload3(move |a: A, b: B, c: C| Ok(f(a, b, c)))
    }

    pub fn try_overload3<A, B, C, R, F>(self, f: F) -> Self
    where
        A: TypeConvertible,
        B: TypeConvertible,
        C: TypeConvertible,
        R: TypeConvertible,
        F: Fn(A, B, C) -> Result<R, EvalErrorKind> + Send + Sync + 'static,
    {
        self.overload(
            vec![A::math_type(), B::math_type(), C::math_type()],
            R::math_type(),
            move |args| f(arg(args, 0)?, arg(args, 1)?, arg(args, 2)?)?.into_value(),
        )
    }

    pub fn build(self) -> FunctionContainer {
        self.container
    }

    /// Finish and wrap the registry for sharing between operator instances.
    pub fn shared(self) -> Arc<FunctionContainer> {
        Arc::new(self.container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untyped_list_refines_generic_binding() {
        let mut bindings = BTreeMap::new();
        assert!(type_matches(&Type::Generic(0), &Type::UNTYPED_LIST, &mut bindings));
        assert!(type_matches(
            &Type::Generic(0),
            &Type::list_of(Type::Number),
            &mut bindings
        ));
        assert_eq!(bindings.get(&0), Some(&Type::list_of(Type::Number)));
        assert!(!type_matches(&Type::Generic(0), &Type::Number, &mut bindings));
    }

    #[test]
    fn unbound_list_element_substitutes_to_untyped_list() {
        let bindings = BTreeMap::new();
        assert_eq!(
            substitute(&Type::list_of(Type::Generic(3)), &bindings),
            Some(Type::UNTYPED_LIST)
        );
        assert_eq!(substitute(&Type::Generic(3), &bindings), None);
    }
}
