use crate::{
    error::EvalError,
    operators::ContextEvaluable,
    tree::{NodeId, Tree, shape::SlotLayout},
    types::{List, Type, Value},
};

/// List literal `[a, b, ...]` with one rest slot per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOp;

impl ContextEvaluable for ListOp {
    fn identifier(&self) -> &str {
        "#list"
    }

    fn layout(&self) -> SlotLayout {
        SlotLayout::rest()
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError> {
        let mut list = List::new();
        for entry in tree.children(node) {
            let value = tree.evaluate(entry)?;
            list.push(value)?;
        }
        Ok(Value::List(list))
    }

    /// `list` while empty, `list(t)` if every entry has the known type `t`.
    fn evaluate_type(&self, tree: &Tree, node: NodeId) -> Option<Type> {
        let entries = tree.children(node);
        let Some(&first) = entries.first() else {
            return Some(Type::UNTYPED_LIST);
        };
        let first = tree.return_type(first)?;
        entries[1..]
            .iter()
            .all(|&entry| tree.return_type(entry) == Some(first))
            .then(|| Type::list_of(first.clone()))
    }
}
