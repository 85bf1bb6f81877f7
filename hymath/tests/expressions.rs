use hymath::{
    catalog,
    display::render,
    error::{EditErrorKind, PersistError},
    parser::TreeParser,
    types::{List, Value},
};

fn evaluate(text: &str) -> Value {
    let mut parser = TreeParser::new(catalog::all());
    parser
        .parse_expression(text)
        .unwrap_or_else(|error| panic!("`{text}` rejected: {error}"));
    parser
        .evaluate()
        .unwrap_or_else(|error| panic!("`{text}` failed: {error}"))
}

fn numbers(values: &[f64]) -> Value {
    Value::List(List::from_values(values.iter().copied().map(Value::Number).collect()).unwrap())
}

#[test]
fn arithmetic_follows_priorities() {
    assert_eq!(evaluate("1 + 2 * 3"), Value::Number(7.0));
    assert_eq!(evaluate("2 * 3 + 4"), Value::Number(10.0));
    assert_eq!(evaluate("10 - 2 - 3"), Value::Number(5.0));
    assert_eq!(evaluate("(1 + 2) * 3"), Value::Number(9.0));
    assert_eq!(evaluate("2 ^ 10"), Value::Number(1024.0));
}

#[test]
fn leading_minus_starts_a_negative_literal() {
    assert_eq!(evaluate("-3 + 5"), Value::Number(2.0));
    assert_eq!(evaluate("2 * -.5"), Value::Number(-1.0));
}

#[test]
fn names_resolve_to_calls_constants_and_variables() {
    assert_eq!(evaluate("sin(0)"), Value::Number(0.0));
    assert_eq!(evaluate("exp(0) + cos(0)"), Value::Number(2.0));
    assert_eq!(evaluate("pi"), Value::Number(std::f64::consts::PI));

    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("radius * 2").unwrap();
    let root = parser.root();
    parser
        .tree_mut()
        .variables(root)
        .set("radius", Value::Number(1.5));
    assert_eq!(parser.evaluate(), Ok(Value::Number(3.0)));
}

#[test]
fn list_operations() {
    assert_eq!(evaluate("[1, 2] + [3]"), numbers(&[1.0, 2.0, 3.0]));
    assert_eq!(evaluate("len([4, 5, 6])"), Value::Number(3.0));
    assert_eq!(evaluate("[5, 6, 7] at 1"), Value::Number(6.0));
    assert_eq!(evaluate("repeat(2, 3)"), numbers(&[2.0, 2.0, 2.0]));
}

#[test]
fn out_of_range_index_is_a_value_error() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("[1] at 3").unwrap();
    assert!(parser.evaluate().unwrap_err().kind.is_value_error());
}

#[test]
fn nested_calls_close_one_level_at_a_time() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("sin(cos(0) - 1) + 2").unwrap();
    assert_eq!(render(parser.tree(), None), "sin(cos(0) - 1) + 2");
    assert_eq!(parser.evaluate(), Ok(Value::Number(2.0)));
}

#[test]
fn syntax_errors_carry_a_span() {
    let mut parser = TreeParser::new(catalog::all());
    let error = parser.parse_expression("1 + $").unwrap_err();
    match error.kind {
        EditErrorKind::SyntaxError { span, .. } => assert_eq!(span, Some(4..5)),
        other => panic!("expected a syntax error, found {other:?}"),
    }

    let mut parser = TreeParser::new(catalog::all());
    let error = parser.parse_expression("1 )").unwrap_err();
    assert!(error.kind.is_syntax_error());

    let mut parser = TreeParser::new(catalog::all());
    let error = parser.parse_expression("sin(1, 2)").unwrap_err();
    assert!(error.kind.is_syntax_error());

    let mut parser = TreeParser::new(catalog::all());
    let error = parser.parse_expression("unknown(1)").unwrap_err();
    assert!(error.kind.is_unknown_token());
}

#[test]
fn documents_restore_tree_and_cursor() {
    let mut parser = TreeParser::new(catalog::all());
    parser
        .parse_expression("sum(\"i\", 1, 3, i * 2) + [1] at 0")
        .unwrap();
    let expected = render(parser.tree(), parser.cursor());

    for pretty in [false, true] {
        let document = parser.save(pretty).unwrap();
        let mut restored = TreeParser::new(catalog::all());
        restored.load(&document).unwrap();

        assert_eq!(render(restored.tree(), restored.cursor()), expected);
        assert_eq!(restored.evaluate(), Ok(Value::Number(13.0)));
    }
}

#[test]
fn documents_keep_partial_literals() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_command("#number:1;+;#number:+-").unwrap();
    let document = parser.save(false).unwrap();

    let mut restored = TreeParser::new(catalog::all());
    restored.load(&document).unwrap();
    assert_eq!(render(restored.tree(), restored.cursor()), "1 + ‹-›");
    restored.parse_token("#number", ["4"]).unwrap();
    assert_eq!(restored.evaluate(), Ok(Value::Number(-3.0)));
}

#[test]
fn loading_rejects_unknown_operators_and_keeps_the_tree() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("1 + 1").unwrap();

    let error = parser
        .load(r##"{"identifier":"#expression","body":{"identifier":"frobnicate"}}"##)
        .unwrap_err();
    assert!(matches!(error, PersistError::UnknownOperator { ref identifier } if identifier == "frobnicate"));
    assert_eq!(parser.evaluate(), Ok(Value::Number(2.0)));

    assert!(parser.load("not json").unwrap_err().is_json());
}
