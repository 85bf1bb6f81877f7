use hymath::{
    catalog,
    error::EvalErrorKind,
    functions::FunctionContainer,
    types::{List, Type, Value, convert::Generic},
};

fn numbers(values: &[f64]) -> Value {
    Value::List(List::from_values(values.iter().copied().map(Value::Number).collect()).unwrap())
}

#[test]
fn generic_parameters_must_agree() {
    let pick = FunctionContainer::builder()
        .overload2(|a: Generic<0>, _b: Generic<0>| a)
        .build();

    assert_eq!(
        pick.evaluate_type(&[Some(Type::Number), Some(Type::Number)]),
        Some(Type::Number)
    );
    assert_eq!(
        pick.evaluate_type(&[Some(Type::Number), Some(Type::Identifier)]),
        None
    );
    assert_eq!(pick.evaluate_type(&[Some(Type::Number), None]), None);
}

#[test]
fn untyped_list_unifies_with_typed_list() {
    let add = catalog::add_functions();
    let numbers_list = Type::list_of(Type::Number);

    assert_eq!(
        add.evaluate_type(&[Some(numbers_list.clone()), Some(Type::UNTYPED_LIST)]),
        Some(numbers_list.clone())
    );
    assert_eq!(
        add.evaluate_type(&[Some(Type::UNTYPED_LIST), Some(numbers_list.clone())]),
        Some(numbers_list)
    );
    assert_eq!(
        add.evaluate_type(&[Some(Type::UNTYPED_LIST), Some(Type::UNTYPED_LIST)]),
        Some(Type::UNTYPED_LIST)
    );
}

#[test]
fn first_declared_overload_wins() {
    let container = FunctionContainer::builder()
        .overload1(|_: Generic<0>| "generic".to_string())
        .overload1(|_: f64| "number".to_string())
        .build();

    assert_eq!(
        container.evaluate(vec![Value::Identifier("a".into())]),
        Ok(Value::Identifier("generic".into()))
    );
    // The exact signature is found before scanning.
    assert_eq!(
        container.evaluate(vec![Value::Number(1.0)]),
        Ok(Value::Identifier("number".into()))
    );
}

#[test]
fn no_matching_function_reports_the_signature() {
    let add = catalog::add_functions();
    let error = add
        .evaluate(vec![Value::Number(1.0), Value::Identifier("x".into())])
        .unwrap_err();
    assert_eq!(
        error,
        EvalErrorKind::NoMatchingFunction {
            signature: vec![Type::Number, Type::Identifier]
        }
    );
}

#[test]
fn list_concatenation_keeps_element_type() {
    let add = catalog::add_functions();
    let joined = add
        .evaluate(vec![numbers(&[1.0, 2.0]), numbers(&[3.0])])
        .unwrap();
    assert_eq!(joined, numbers(&[1.0, 2.0, 3.0]));
    assert_eq!(joined.ty(), Type::list_of(Type::Number));
}

#[test]
fn typed_list_rejects_foreign_elements() {
    let mut list = List::new();
    list.push(Value::Number(1.0)).unwrap();
    let error = list.push(Value::Identifier("a".into())).unwrap_err();
    assert!(error.is_unexpected_type());
    assert_eq!(list.len(), 1);
}

#[test]
fn duplicate_signature_replaces_the_overload() {
    let container = FunctionContainer::builder()
        .overload1(|x: f64| x + 1.0)
        .overload1(|x: f64| x + 2.0)
        .build();
    assert_eq!(container.len(), 1);
    assert_eq!(container.evaluate(vec![Value::Number(1.0)]), Ok(Value::Number(3.0)));
}

#[test]
fn shared_generic_binds_list_arguments_to_one_type() {
    let concat = FunctionContainer::builder()
        .overload(
            vec![Type::Generic(0), Type::Generic(0)],
            Type::Generic(0),
            |args: &[Value]| Ok(args[0].clone()),
        )
        .build();
    let numbers_list = Type::list_of(Type::Number);
    let identifiers_list = Type::list_of(Type::Identifier);

    assert_eq!(
        concat.evaluate_type(&[Some(numbers_list.clone()), Some(numbers_list.clone())]),
        Some(numbers_list.clone())
    );
    assert_eq!(
        concat.evaluate_type(&[Some(numbers_list.clone()), Some(identifiers_list.clone())]),
        None
    );

    let words = Value::List(List::from_values(vec![Value::Identifier("a".into())]).unwrap());
    assert_eq!(
        concat.evaluate(vec![numbers(&[1.0]), words]),
        Err(EvalErrorKind::NoMatchingFunction {
            signature: vec![numbers_list, identifiers_list]
        })
    );
}
