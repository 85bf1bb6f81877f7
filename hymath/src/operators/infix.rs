use std::sync::Arc;

use crate::{
    error::{EvalError, EvalErrorKind},
    functions::FunctionContainer,
    operators::ContextEvaluable,
    tree::{NodeId, Tree, shape::SlotLayout},
    types::{Type, Value},
};

/// Associative n-ary operator such as `+`.
///
/// Operands live in the rest list and are folded left to right through the
/// overloads of the operator. Chains of the same operator at the same
/// priority are kept flat by the editor, so `1 + 2 + 3` is a single node with
/// three operands.
#[derive(Debug, Clone)]
pub struct Infix {
    identifier: String,
    priority: u32,
    functions: Arc<FunctionContainer>,
}

impl Infix {
    pub fn new(identifier: impl Into<String>, priority: u32, functions: Arc<FunctionContainer>) -> Self {
        Self {
            identifier: identifier.into(),
            priority,
            functions,
        }
    }

    pub fn functions(&self) -> &FunctionContainer {
        &self.functions
    }
}

impl ContextEvaluable for Infix {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn layout(&self) -> SlotLayout {
        SlotLayout::rest()
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError> {
        let parts = tree.children(node);
        let (&first, rest) = parts.split_first().ok_or(EvalErrorKind::MissingArgument)?;

        let mut total = tree.evaluate(first)?;
        for &part in rest {
            let value = tree.evaluate(part)?;
            total = self.functions.evaluate(vec![total, value])?;
        }
        Ok(total)
    }

    fn evaluate_type(&self, tree: &Tree, node: NodeId) -> Option<Type> {
        let parts = tree.children(node);
        let (&first, rest) = parts.split_first()?;

        let mut total = tree.return_type(first)?.clone();
        for &part in rest {
            let ty = tree.return_type(part)?.clone();
            total = self.functions.evaluate_type(&[Some(total), Some(ty)])?;
        }
        Some(total)
    }

    fn priority(&self) -> Option<u32> {
        Some(self.priority)
    }
}
