use hymath::{
    catalog,
    display::render,
    error::EditErrorKind,
    operators::{ContextEvaluable, Operator},
    parser::TreeParser,
    tree::NodeId,
    types::Value,
};

fn parser() -> TreeParser {
    TreeParser::new(catalog::all())
}

fn top(parser: &TreeParser) -> NodeId {
    parser.tree().children(parser.root())[0]
}

fn identifier(parser: &TreeParser, id: NodeId) -> String {
    parser
        .tree()
        .op(id)
        .map(|op| op.identifier().to_string())
        .expect("node present")
}

#[test]
fn same_priority_chain_is_flattened() {
    let mut parser = parser();
    parser
        .parse_command("#number:1;+;#number:2;+;#number:3")
        .expect("tokens accepted");

    let sum = top(&parser);
    assert_eq!(identifier(&parser, sum), "+");
    assert_eq!(parser.tree().children(sum).len(), 3);
    assert_eq!(parser.evaluate(), Ok(Value::Number(6.0)));
}

#[test]
fn tighter_operator_nests_under_looser_one() {
    let mut parser = parser();
    parser.parse_command("#number:1;+;#number:2;*;#number:3").unwrap();

    let sum = top(&parser);
    assert_eq!(identifier(&parser, sum), "+");
    let operands = parser.tree().children(sum);
    assert_eq!(operands.len(), 2);
    assert_eq!(identifier(&parser, operands[1]), "*");
    assert_eq!(parser.evaluate(), Ok(Value::Number(7.0)));
}

#[test]
fn looser_operator_climbs_over_tighter_one() {
    let mut parser = parser();
    parser.parse_command("#number:2;*;#number:3;+;#number:4").unwrap();

    let sum = top(&parser);
    assert_eq!(identifier(&parser, sum), "+");
    assert_eq!(identifier(&parser, parser.tree().children(sum)[0]), "*");
    assert_eq!(parser.evaluate(), Ok(Value::Number(10.0)));
}

#[test]
fn numeric_literal_is_assembled_token_by_token() {
    let mut parser = parser();
    parser
        .parse_command("#number:1;#number:.;#number:+-;#number:2;#number:5")
        .unwrap();

    let literal = match parser.tree().op(top(&parser)) {
        Some(Operator::Number(literal)) => literal.clone(),
        other => panic!("expected a number, found {other:?}"),
    };
    assert_eq!(literal.canonical(), "-1.25");
    assert_eq!(parser.evaluate(), Ok(Value::Number(-1.25)));

    parser.erase();
    parser.parse_token("#number", ["."]).unwrap();
    let literal = match parser.tree().op(top(&parser)) {
        Some(Operator::Number(literal)) => literal.clone(),
        other => panic!("expected a number, found {other:?}"),
    };
    assert_eq!(literal.entry(), "0.");
    assert_eq!(parser.evaluate(), Ok(Value::Number(0.0)));
}

#[test]
fn prefix_operator_wraps_the_cursor() {
    let mut parser = parser();
    parser.parse_command("#number:6;/;#number:4").unwrap();

    let divide = top(&parser);
    assert_eq!(identifier(&parser, divide), "/");
    assert_eq!(parser.tree().children(divide).len(), 2);
    assert_eq!(parser.evaluate(), Ok(Value::Number(1.5)));
}

#[test]
fn advancing_past_a_rest_list_grows_then_shrinks_it() {
    let mut parser = parser();
    parser.parse_expression("[1").unwrap();
    let list = top(&parser);

    parser.parse_token("->", Vec::<String>::new()).unwrap();
    assert_eq!(parser.tree().children(list).len(), 2);
    assert!(parser.tree().is_empty_node(parser.cursor().unwrap()));

    parser.parse_token("->", Vec::<String>::new()).unwrap();
    assert_eq!(parser.tree().children(list).len(), 1);
    assert_eq!(parser.cursor(), Some(list));
}

#[test]
fn retreating_and_advancing_keeps_the_rest_list() {
    let mut parser = parser();
    parser.parse_expression("[1, 2").unwrap();
    let list = top(&parser);
    let entries = parser.tree().children(list);
    assert_eq!(entries.len(), 2);

    for step in ["<-", "<-", "->", "->"] {
        parser.parse_token(step, Vec::<String>::new()).unwrap();
        assert_eq!(parser.tree().children(list), entries);
    }
    assert_eq!(parser.cursor(), Some(entries[1]));
    assert_eq!(render(parser.tree(), None), "[1, 2]");
}

#[test]
fn retreating_from_an_empty_operand_collapses_the_operator() {
    let mut parser = parser();
    parser.parse_expression("1 +").unwrap();
    assert_eq!(identifier(&parser, top(&parser)), "+");

    parser.parse_token("<-", Vec::<String>::new()).unwrap();
    let number = top(&parser);
    assert_eq!(identifier(&parser, number), "#number");
    assert_eq!(parser.cursor(), Some(number));
    assert_eq!(parser.evaluate(), Ok(Value::Number(1.0)));
}

#[test]
fn advancing_visits_every_argument_of_a_call() {
    let mut parser = parser();
    parser.parse_token("repeat", Vec::<String>::new()).unwrap();
    let call = top(&parser);
    let arguments = parser.tree().children(call);
    assert_eq!(parser.cursor(), Some(arguments[0]));

    parser.parse_command("#number:7;->").unwrap();
    assert_eq!(parser.cursor(), Some(arguments[1]));
    parser.parse_command("#number:2;->").unwrap();
    assert_eq!(parser.cursor(), Some(call));
    assert_eq!(render(parser.tree(), None), "repeat(7, 2)");
}

#[test]
fn erase_clears_then_removes_rest_entries() {
    let mut parser = parser();
    parser.parse_expression("[1, 2").unwrap();
    let list = top(&parser);

    parser.erase();
    let cursor = parser.cursor().unwrap();
    assert!(parser.tree().is_empty_node(cursor));
    assert_eq!(parser.tree().children(list).len(), 2);

    parser.parse_token("erase", Vec::<String>::new()).unwrap();
    let remaining = parser.tree().children(list);
    assert_eq!(remaining.len(), 1);
    assert_eq!(parser.cursor(), Some(remaining[0]));
}

#[test]
fn erasing_a_rest_entry_drops_trailing_placeholders() {
    let mut parser = parser();
    parser.parse_expression("[1, 2,").unwrap();
    let list = top(&parser);
    assert_eq!(parser.tree().children(list).len(), 3);

    let second = parser.tree().children(list)[1];
    assert!(parser.set_cursor(second));
    parser.erase();

    let children = parser.tree().children(list);
    assert_eq!(children.len(), 2);
    assert_eq!(parser.cursor(), Some(children[1]));
    assert_eq!(render(parser.tree(), None), "[1, [---]]");
}

#[test]
fn rejected_tokens_report_editor_state() {
    let mut parser = parser();

    let error = parser.parse_token("nope", Vec::<String>::new()).unwrap_err();
    assert!(error.kind.is_unknown_token());
    assert_eq!(error.root, parser.root());
    assert_eq!(error.cursor, parser.cursor());

    let error = parser.parse_token("/", Vec::<String>::new()).unwrap_err();
    assert_eq!(error.kind, EditErrorKind::UnexpectedHead);

    let error = parser.parse_token("#variable", Vec::<String>::new()).unwrap_err();
    assert!(error.kind.is_customization_failed());

    parser.parse_token("#number", ["1"]).unwrap();
    let error = parser.parse_token("#variable", ["x"]).unwrap_err();
    assert_eq!(error.kind, EditErrorKind::UnexpectedHead);
}

#[test]
fn batch_stops_at_first_rejected_token() {
    let mut parser = parser();
    let error = parser
        .parse_command("#number:1;+;bogus;#number:2")
        .unwrap_err();
    assert!(error.kind.is_unknown_token());
    assert_eq!(render(parser.tree(), parser.cursor()), "1 + ‹[---]›");
}

#[test]
fn unreachable_nodes_are_released_after_each_token() {
    let mut parser = parser();
    parser.parse_command("#number:1;+;#number:2").unwrap();
    // root, `+` and both literals
    assert_eq!(parser.tree().len(), 4);

    parser.clear();
    assert_eq!(parser.tree().len(), 2);
    assert!(parser.tree().is_empty_node(parser.cursor().unwrap()));
}

#[test]
fn custom_navigation_and_aliases() {
    let mut parser = parser();
    parser.add_named("plus", catalog::all().into_iter().find(|op| op.identifier() == "+").unwrap());
    parser.parse_command("#number:1;plus;#number:2").unwrap();
    assert_eq!(parser.evaluate(), Ok(Value::Number(3.0)));
    assert!(parser.operators().contains_key("plus"));
}
