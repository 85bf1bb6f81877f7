//! Built-in operator catalog.
//!
//! [`all`] lists the prototypes a [`TreeParser`](crate::parser::TreeParser)
//! needs for ordinary arithmetic work. Each group is also available on its
//! own so a front-end can assemble a smaller registry.
use std::{f64::consts, sync::Arc};

use crate::{
    error::EvalErrorKind,
    functions::FunctionContainer,
    operators::{Constant, Function, Infix, Iterate, NumberLiteral, Operator, PrefixFunction},
    types::{List, Value, convert::Generic},
};

/// Every operator of the catalog.
pub fn all() -> Vec<Operator> {
    let mut operators = builtins();
    operators.extend(basic_arithmetic());
    operators.extend(advanced_arithmetic());
    operators.extend(constants());
    operators.extend(trigonometry());
    operators.extend(list_manipulation());
    operators.push(
        Function::new("exp", 1, FunctionContainer::builder().overload1(f64::exp).shared()).into(),
    );
    operators.push(Iterate::new("sum", Value::Number(0.0), add_functions()).into());
    operators
}

/// Operators the editor itself relies on.
pub fn builtins() -> Vec<Operator> {
    vec![
        Operator::empty(),
        Operator::expression(),
        Operator::Number(NumberLiteral::default()),
        Operator::list(),
        Operator::variable(""),
        Operator::identifier_literal(""),
    ]
}

/// Number addition and list concatenation.
pub fn add_functions() -> Arc<FunctionContainer> {
    FunctionContainer::builder()
        .overload2(|a: f64, b: f64| a + b)
        .overload2(|a: Vec<Generic<0>>, b: Vec<Generic<0>>| {
            a.into_iter().chain(b).collect::<Vec<_>>()
        })
        .shared()
}

pub fn subtract_functions() -> Arc<FunctionContainer> {
    FunctionContainer::builder()
        .overload2(|a: f64, b: f64| a - b)
        .shared()
}

pub fn multiply_functions() -> Arc<FunctionContainer> {
    FunctionContainer::builder()
        .overload2(|a: f64, b: f64| a * b)
        .shared()
}

pub fn basic_arithmetic() -> Vec<Operator> {
    vec![
        Infix::new("+", 10, add_functions()).into(),
        Infix::new("-", 11, subtract_functions()).into(),
        Infix::new("*", 40, multiply_functions()).into(),
        PrefixFunction::new(
            "/",
            1,
            FunctionContainer::builder()
                .overload2(|dividend: f64, divisor: f64| dividend / divisor)
                .shared(),
        )
        .into(),
        Function::new(
            "(",
            1,
            FunctionContainer::builder()
                .overload1(|inner: Generic<0>| inner)
                .shared(),
        )
        .into(),
    ]
}

pub fn advanced_arithmetic() -> Vec<Operator> {
    vec![
        PrefixFunction::new(
            "^",
            1,
            FunctionContainer::builder()
                .overload2(f64::powf)
                .shared(),
        )
        .into(),
    ]
}

pub fn constants() -> Vec<Operator> {
    vec![
        Constant::new("pi", "π", Value::Number(consts::PI)).into(),
        Constant::new("e", "e", Value::Number(consts::E)).into(),
    ]
}

pub fn trigonometry() -> Vec<Operator> {
    let functions: [(&str, fn(f64) -> f64); 3] =
        [("sin", f64::sin), ("cos", f64::cos), ("tan", f64::tan)];
    functions
        .into_iter()
        .map(|(name, f)| {
            Operator::from(Function::new(
                name,
                1,
                FunctionContainer::builder().overload1(f).shared(),
            ))
        })
        .collect()
}

pub fn list_manipulation() -> Vec<Operator> {
    vec![
        PrefixFunction::new(
            "at",
            1,
            FunctionContainer::builder()
                .try_overload2(|list: Vec<Generic<0>>, index: f64| {
                    let index = Value::Number(index).as_int()?;
                    usize::try_from(index)
                        .ok()
                        .and_then(|index| list.get(index).cloned())
                        .ok_or_else(|| {
                            EvalErrorKind::ValueError(format!(
                                "index {} out of bounds for a list of length {}",
                                index,
                                list.len()
                            ))
                        })
                })
                .shared(),
        )
        .into(),
        Function::new(
            "repeat",
            2,
            FunctionContainer::builder()
                .try_overload2(|element: Generic<0>, times: f64| {
                    let times = Value::Number(times).as_int()?;
                    let times = usize::try_from(times).map_err(|_| {
                        EvalErrorKind::ValueError(format!("cannot repeat {} times", times))
                    })?;
                    Ok(vec![element; times])
                })
                .shared(),
        )
        .into(),
        Function::new(
            "len",
            1,
            FunctionContainer::builder()
                .overload1(|list: List| list.len() as f64)
                .shared(),
        )
        .into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::ContextEvaluable;

    #[test]
    fn identifiers_are_unique() {
        let operators = all();
        let mut names: Vec<&str> = operators.iter().map(|op| op.identifier()).collect();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn add_concatenates_lists() {
        let one = List::from_values(vec![Value::Number(1.0)]).unwrap();
        let two = List::from_values(vec![Value::Number(2.0)]).unwrap();
        let joined = add_functions()
            .evaluate(vec![Value::List(one), Value::List(two)])
            .unwrap();
        assert_eq!(joined.to_string(), "[1, 2]");
    }
}
