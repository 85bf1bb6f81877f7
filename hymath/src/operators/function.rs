use std::sync::Arc;

use crate::{
    error::EvalError,
    functions::FunctionContainer,
    operators::ContextEvaluable,
    tree::{NodeId, Tree, shape::SlotLayout},
    types::{Type, Value},
};

/// Call `name(a, b, ...)` with a fixed number of arguments.
#[derive(Debug, Clone)]
pub struct Function {
    identifier: String,
    arity: usize,
    functions: Arc<FunctionContainer>,
}

impl Function {
    pub fn new(identifier: impl Into<String>, arity: usize, functions: Arc<FunctionContainer>) -> Self {
        Self {
            identifier: identifier.into(),
            arity,
            functions,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn functions(&self) -> &FunctionContainer {
        &self.functions
    }
}

impl ContextEvaluable for Function {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn layout(&self) -> SlotLayout {
        SlotLayout::fixed(self.arity)
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError> {
        let arguments = tree.children(node);
        self.functions.evaluate_nodes(tree, &arguments)
    }

    fn evaluate_type(&self, tree: &Tree, node: NodeId) -> Option<Type> {
        self.functions
            .evaluate_type_nodes(tree, &tree.children(node))
    }
}

/// Call whose first argument is written in front of it, e.g. `a / b` where
/// `a` is the prefix argument and `b` the single remaining one.
///
/// The editor wraps the node under the cursor into the prefix slot when the
/// operator is inserted.
#[derive(Debug, Clone)]
pub struct PrefixFunction {
    identifier: String,
    arity: usize,
    functions: Arc<FunctionContainer>,
}

impl PrefixFunction {
    /// `arity` counts the arguments after the prefix one.
    pub fn new(identifier: impl Into<String>, arity: usize, functions: Arc<FunctionContainer>) -> Self {
        Self {
            identifier: identifier.into(),
            arity,
            functions,
        }
    }

    pub fn functions(&self) -> &FunctionContainer {
        &self.functions
    }
}

impl ContextEvaluable for PrefixFunction {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn layout(&self) -> SlotLayout {
        SlotLayout::prefixed(self.arity)
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError> {
        let arguments = tree.children(node);
        self.functions.evaluate_nodes(tree, &arguments)
    }

    fn evaluate_type(&self, tree: &Tree, node: NodeId) -> Option<Type> {
        self.functions
            .evaluate_type_nodes(tree, &tree.children(node))
    }
}
