use crate::{
    error::{EvalError, EvalErrorKind},
    operators::ContextEvaluable,
    tree::{NodeId, Tree, shape::SlotLayout},
    types::{Type, Value},
};

/// Placeholder occupying every slot that holds nothing yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Empty;

impl ContextEvaluable for Empty {
    fn identifier(&self) -> &str {
        "#empty"
    }

    fn evaluate(&self, _tree: &mut Tree, _node: NodeId) -> Result<Value, EvalError> {
        Err(EvalErrorKind::MissingArgument.into())
    }
}

/// Root wrapper holding the whole expression in its single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expression;

impl Expression {
    fn child(tree: &Tree, node: NodeId) -> Option<NodeId> {
        tree.children(node).first().copied()
    }
}

impl ContextEvaluable for Expression {
    fn identifier(&self) -> &str {
        "#expression"
    }

    fn layout(&self) -> SlotLayout {
        SlotLayout::fixed(1)
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError> {
        let child = Self::child(tree, node).ok_or(EvalErrorKind::MissingArgument)?;
        tree.evaluate(child)
    }

    fn evaluate_type(&self, tree: &Tree, node: NodeId) -> Option<Type> {
        tree.return_type(Self::child(tree, node)?).cloned()
    }
}

/// A string atom, written `"name"` in expressions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentifierLiteral {
    pub name: String,
}

impl IdentifierLiteral {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ContextEvaluable for IdentifierLiteral {
    fn identifier(&self) -> &str {
        "#identifier"
    }

    fn customize(&mut self, args: &[String]) -> bool {
        match args {
            [name] => {
                self.name = name.clone();
                true
            }
            _ => false,
        }
    }

    fn evaluate(&self, _tree: &mut Tree, _node: NodeId) -> Result<Value, EvalError> {
        Ok(Value::Identifier(self.name.clone()))
    }

    fn evaluate_type(&self, _tree: &Tree, _node: NodeId) -> Option<Type> {
        Some(Type::Identifier)
    }
}

/// Reference to a variable, resolved through the scope chain of its node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableRef {
    pub name: String,
}

impl VariableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ContextEvaluable for VariableRef {
    fn identifier(&self) -> &str {
        "#variable"
    }

    fn customize(&mut self, args: &[String]) -> bool {
        match args.first() {
            Some(name) if !name.is_empty() => {
                self.name = name.clone();
                true
            }
            _ => false,
        }
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError> {
        tree.get_variable(node, &self.name).ok_or_else(|| {
            EvalErrorKind::MissingVariable {
                name: self.name.clone(),
            }
            .into()
        })
    }

    fn evaluate_type(&self, tree: &Tree, node: NodeId) -> Option<Type> {
        tree.variable_type(node, &self.name)
    }
}

/// A named constant such as `pi`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    identifier: String,
    pub display_name: String,
    pub value: Value,
}

impl Constant {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>, value: Value) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            value,
        }
    }
}

impl ContextEvaluable for Constant {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn evaluate(&self, _tree: &mut Tree, _node: NodeId) -> Result<Value, EvalError> {
        Ok(self.value.clone())
    }

    fn evaluate_type(&self, _tree: &Tree, _node: NodeId) -> Option<Type> {
        Some(self.value.ty())
    }
}
