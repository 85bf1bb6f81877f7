use hymath::{
    catalog,
    error::EvalErrorKind,
    operators::Operator,
    parser::TreeParser,
    tree::{NodeId, Tree},
    types::{List, Type, Value},
};

fn single_variable_tree(name: &str) -> (Tree, NodeId) {
    let mut tree = Tree::new();
    let root = tree.root();
    let variable = tree.insert(Operator::variable(name));
    let placeholder = tree.children(root)[0];
    tree.replace(root, placeholder, variable);
    (tree, variable)
}

#[test]
fn inner_declaration_shadows_outer_one() {
    let (mut tree, variable) = single_variable_tree("x");
    let root = tree.root();

    tree.variables(root).set("x", Value::Number(1.0));
    assert_eq!(tree.evaluate_root(), Ok(Value::Number(1.0)));

    tree.variables(variable).set("x", Value::Number(5.0));
    assert_eq!(tree.evaluate_root(), Ok(Value::Number(5.0)));
    assert_eq!(tree.variables(root).get("x"), Some(Value::Number(1.0)));
    assert_eq!(tree.variables(variable).list_declared(), vec!["x".to_string()]);

    tree.variables(variable).delete("x");
    assert_eq!(tree.evaluate_root(), Ok(Value::Number(1.0)));
}

#[test]
fn missing_variable_names_the_variable_and_origin() {
    let (mut tree, variable) = single_variable_tree("y");
    let error = tree.evaluate_root().unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::MissingVariable {
            name: "y".to_string()
        }
    );
    assert_eq!(error.origin, Some(variable));
}

#[test]
fn declaration_types_the_subtree_without_values() {
    let (mut tree, variable) = single_variable_tree("x");
    let root = tree.root();
    assert_eq!(tree.return_type(root), None);

    tree.variables(root).declare("x", Some(Type::Number));
    assert_eq!(tree.return_type(variable), Some(&Type::Number));
    assert_eq!(tree.return_type(root), Some(&Type::Number));

    tree.variables(root).declare("x", Some(Type::Identifier));
    assert_eq!(tree.return_type(root), Some(&Type::Identifier));

    tree.variables(root).clear();
    assert_eq!(tree.return_type(root), None);
}

#[test]
fn redeclaring_with_a_new_type_retypes_operators() {
    let mut parser = TreeParser::new(catalog::all());
    let root = parser.root();
    parser
        .tree_mut()
        .variables(root)
        .declare("x", Some(Type::Number));
    parser.parse_expression("x + 1").unwrap();
    assert_eq!(parser.tree().return_type(root), Some(&Type::Number));

    parser
        .tree_mut()
        .variables(root)
        .declare("x", Some(Type::Identifier));
    assert_eq!(parser.tree().return_type(root), None);

    parser
        .tree_mut()
        .variables(root)
        .set("x", Value::Number(2.0));
    assert_eq!(parser.tree().return_type(root), Some(&Type::Number));
    assert_eq!(parser.evaluate(), Ok(Value::Number(3.0)));
}

#[test]
fn values_can_be_dropped_while_keeping_declarations() {
    let (mut tree, _) = single_variable_tree("x");
    let root = tree.root();
    tree.variables(root).set("x", Value::Number(4.0));
    tree.variables(root).clear_values();

    assert!(tree.variables(root).is_declared("x"));
    assert_eq!(tree.variables(root).get_type("x"), Some(Type::Number));
    assert!(tree.evaluate_root().unwrap_err().kind.is_missing_variable());
}

#[test]
fn export_and_import_round_trip_assigned_values() {
    let mut tree = Tree::new();
    let root = tree.root();
    tree.variables(root).set("a", Value::Number(1.0));
    tree.variables(root).set("b", Value::Identifier("z".into()));
    tree.variables(root).declare("c", Some(Type::Number));

    let exported = tree.variables(root).export();
    assert_eq!(exported.len(), 2);

    let mut other = Tree::new();
    let other_root = other.root();
    other.variables(other_root).import(exported);
    assert_eq!(other.variables(other_root).get("a"), Some(Value::Number(1.0)));
    assert_eq!(
        other.variables(other_root).list_declared(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[test]
fn sum_over_a_range_binds_the_loop_variable() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("sum(\"i\", 1, 4, i)").unwrap();
    assert_eq!(parser.evaluate(), Ok(Value::Number(10.0)));

    let iterate = parser.tree().children(parser.root())[0];
    assert_eq!(parser.tree().return_type(iterate), Some(&Type::Number));
    assert_eq!(parser.tree().children(iterate).len(), 4);

    // The loop variable does not leak a value after the fold.
    let expression = parser.tree().children(iterate)[3];
    assert_eq!(parser.tree().get_variable(expression, "i"), None);
    assert_eq!(parser.tree().variable_type(expression, "i"), Some(Type::Number));
}

#[test]
fn sum_over_a_list_hides_the_end_slot() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("sum(\"x\", [1, 2, 5], x * x)").unwrap();

    let iterate = parser.tree().children(parser.root())[0];
    match parser.tree().op(iterate) {
        Some(Operator::Iterate(op)) => assert!(!op.has_end()),
        other => panic!("expected an iteration, found {other:?}"),
    }
    assert_eq!(parser.tree().children(iterate).len(), 3);
    assert_eq!(parser.evaluate(), Ok(Value::Number(30.0)));
}

#[test]
fn empty_range_yields_the_initial_value() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("sum(\"i\", 3, 1, i)").unwrap();
    assert_eq!(parser.evaluate(), Ok(Value::Number(0.0)));
}

#[test]
fn fractional_bounds_are_value_errors() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("sum(\"i\", 1.5, 3, i)").unwrap();
    let error = parser.evaluate().unwrap_err();
    assert!(error.kind.is_value_error());
}

#[test]
fn declared_list_type_hides_the_end_slot() {
    let mut parser = TreeParser::new(catalog::all());
    parser.parse_expression("sum(\"i\", xs, 3, i)").unwrap();
    let root = parser.root();
    let iterate = parser.tree().children(root)[0];
    assert_eq!(parser.tree().children(iterate).len(), 4);

    parser
        .tree_mut()
        .variables(root)
        .declare("xs", Some(Type::list_of(Type::Number)));
    assert_eq!(parser.tree().children(iterate).len(), 3);

    parser.tree_mut().variables(root).set("xs", Value::Number(1.0));
    assert_eq!(parser.tree().children(iterate).len(), 4);
    assert_eq!(parser.evaluate(), Ok(Value::Number(6.0)));

    let list = List::from_values(vec![Value::Number(2.0), Value::Number(3.0)]).unwrap();
    parser.tree_mut().variables(root).set("xs", Value::List(list));
    assert_eq!(parser.tree().children(iterate).len(), 3);
    assert_eq!(parser.evaluate(), Ok(Value::Number(5.0)));
}
