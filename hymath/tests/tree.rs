use hymath::{operators::Operator, tree::Tree};

fn number(raw: &str) -> Operator {
    Operator::number(raw).expect("valid literal")
}

#[test]
fn repeated_child_occupies_a_single_slot() {
    let mut tree = Tree::with_root(Operator::list());
    let list = tree.root();
    let a = tree.insert(number("1"));
    let b = tree.insert(number("2"));

    tree.set_children(list, vec![a, a, b, a]);
    assert_eq!(tree.children(list), vec![a, b]);
    assert_eq!(tree.parent(a), Some(list));

    let c = tree.insert(number("3"));
    tree.replace(list, a, c);
    assert_eq!(tree.children(list), vec![c, b]);
    assert_eq!(tree.parent(a), None);
    assert_eq!(
        tree.evaluate_root().map(|value| value.to_string()),
        Ok("[3, 2]".to_string())
    );
}

#[test]
fn set_children_pads_fixed_slots_and_keeps_rest_order() {
    let mut tree = Tree::new();
    let root = tree.root();
    let list = tree.insert(Operator::list());
    let placeholder = tree.children(root)[0];
    tree.replace(root, placeholder, list);

    let entries: Vec<_> = ["1", "2", "3"]
        .into_iter()
        .map(|raw| tree.insert(number(raw)))
        .collect();
    tree.set_children(list, entries.clone());
    tree.set_children(list, entries[..2].to_vec());
    assert_eq!(tree.children(list), entries[..2].to_vec());
    assert_eq!(tree.parent(entries[2]), None);

    tree.set_children(root, vec![]);
    let slot = tree.children(root)[0];
    assert!(tree.is_empty_node(slot));
    assert!(tree.evaluate_root().unwrap_err().kind.is_missing_argument());
}
