//! Sigma-style reduction `sum(name, start, end, expression)`.
//!
//! The operator stores four slots: the bound variable name, the start of the
//! iteration domain, its inclusive end and the expression evaluated for every
//! element. When `start` is a list the domain is its elements and the end
//! slot is hidden, turning the call into `sum(name, list, expression)`. The
//! switch happens whenever a child changes, based on the cached type of
//! `start`.
//!
//! The bound name is declared in the scope of the expression node, so the
//! expression subtree is typed against the element type before anything is
//! evaluated.
use std::sync::Arc;

use log::trace;
use smallvec::SmallVec;

use crate::{
    error::{EvalError, EvalErrorKind},
    functions::FunctionContainer,
    operators::ContextEvaluable,
    tree::{
        NodeId, Tree,
        shape::{ArgumentShape, SlotLayout, SlotRef},
    },
    types::{Type, Value, exact_int},
};

const NAME: usize = 0;
const START: usize = 1;
const END: usize = 2;
const EXPRESSION: usize = 3;

#[derive(Debug, Clone)]
pub struct Iterate {
    identifier: String,
    initial: Value,
    functions: Arc<FunctionContainer>,
    has_end: bool,
    /// Node and name of the current loop variable declaration.
    bound: Option<(NodeId, String)>,
}

impl Iterate {
    /// `initial` is the result over an empty domain, `functions` folds the
    /// per-element results.
    pub fn new(identifier: impl Into<String>, initial: Value, functions: Arc<FunctionContainer>) -> Self {
        Self {
            identifier: identifier.into(),
            initial,
            functions,
            has_end: true,
            bound: None,
        }
    }

    pub fn initial(&self) -> &Value {
        &self.initial
    }

    /// Whether the inclusive end slot is currently visible.
    pub fn has_end(&self) -> bool {
        self.has_end
    }

    fn argument(tree: &Tree, node: NodeId, idx: usize) -> Result<NodeId, EvalError> {
        tree.slot(node, SlotRef::Fixed(idx))
            .ok_or_else(|| EvalErrorKind::MissingArgument.into())
    }

    fn domain(
        &self,
        tree: &mut Tree,
        node: NodeId,
    ) -> Result<Box<dyn Iterator<Item = Value>>, EvalError> {
        let start = Self::argument(tree, node, START)?;
        match tree.evaluate(start)? {
            Value::Number(lower) => {
                let lower = exact_int(lower)?;
                let end = Self::argument(tree, node, END)?;
                let upper = tree.evaluate(end)?.as_int()?;
                Ok(Box::new(
                    (lower..=upper).map(|item| Value::Number(item as f64)),
                ))
            }
            Value::List(list) => Ok(Box::new(list.into_iter())),
            other => Err(EvalErrorKind::UnexpectedType {
                expected: Type::Number,
                found: Some(other.ty()),
            }
            .into()),
        }
    }

    fn fold(
        &self,
        tree: &mut Tree,
        expression: NodeId,
        name: &str,
        mut items: Box<dyn Iterator<Item = Value>>,
    ) -> Result<Value, EvalError> {
        let Some(first) = items.next() else {
            return Ok(self.initial.clone());
        };

        tree.variables(expression).set(name, first);
        let mut total = tree.evaluate(expression)?;
        for item in items {
            tree.variables(expression).set(name, item);
            let value = tree.evaluate(expression)?;
            total = self.functions.evaluate(vec![total, value])?;
        }
        Ok(total)
    }
}

impl ContextEvaluable for Iterate {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn layout(&self) -> SlotLayout {
        SlotLayout::fixed(4)
    }

    fn shape(&self) -> ArgumentShape {
        let fixed: SmallVec<usize, 4> = if self.has_end {
            [NAME, START, END, EXPRESSION].into_iter().collect()
        } else {
            [NAME, START, EXPRESSION].into_iter().collect()
        };
        ArgumentShape {
            prefix: false,
            fixed,
            rest: false,
        }
    }

    fn reset_arguments(&mut self) {
        self.has_end = true;
        self.bound = None;
    }

    fn children_changed(&mut self, tree: &mut Tree, node: NodeId) {
        let Some(expression) = tree.slot(node, SlotRef::Fixed(EXPRESSION)) else {
            return;
        };

        // The declaration stays behind when the expression slot is replaced.
        if let Some((previous, name)) = self.bound.take() {
            if previous != expression && tree.contains(previous) {
                tree.variables(previous).delete(&name);
            }
        }
        tree.variables(expression).clear();

        let Some(name_node) = tree.slot(node, SlotRef::Fixed(NAME)) else {
            return;
        };
        let name = match tree.evaluate(name_node) {
            Ok(Value::Identifier(name)) => name,
            _ => return,
        };

        let element = match tree.slot(node, SlotRef::Fixed(START)).and_then(|start| tree.return_type(start)) {
            Some(Type::List(element)) => {
                self.has_end = false;
                element.as_deref().cloned()
            }
            _ => {
                self.has_end = true;
                Some(Type::Number)
            }
        };
        trace!(
            "Iteration `{}` binds `{}` as {:?}, end slot {}",
            self.identifier,
            name,
            element,
            if self.has_end { "visible" } else { "hidden" }
        );

        tree.variables(expression).declare(&name, element);
        self.bound = Some((expression, name));
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError> {
        let name_node = Self::argument(tree, node, NAME)?;
        let name = tree.evaluate(name_node)?.as_identifier()?.to_string();
        let expression = Self::argument(tree, node, EXPRESSION)?;
        let items = self.domain(tree, node)?;

        let declared = tree.local_binding_type(expression, &name);

        // Assigning the loop variable must not re-enter this node's hook.
        let was_changing = tree.set_changing(node, true);
        let result = self.fold(tree, expression, &name, items);
        tree.variables(expression).delete_value(&name);
        tree.set_changing(node, was_changing);

        if tree.local_binding_type(expression, &name) != declared {
            tree.children_changed(node);
        }
        result
    }

    fn evaluate_type(&self, tree: &Tree, node: NodeId) -> Option<Type> {
        let expression = tree.slot(node, SlotRef::Fixed(EXPRESSION))?;
        let ty = tree.return_type(expression)?.clone();
        self.functions
            .evaluate_type(&[Some(ty.clone()), Some(ty)])
    }
}
