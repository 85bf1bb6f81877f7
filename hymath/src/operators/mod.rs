//! Operator kinds and their shared contract
//!
//! Role
//! - Define [`ContextEvaluable`], the behaviour every node payload provides:
//!   evaluation, type inference, customisation from token arguments and the
//!   two change hooks driving incremental re-typing.
//! - Close the set of payload kinds in [`Operator`], a plain enum dispatching
//!   the contract to the kind-specific structs.
//!
//! Payloads never own their children. Argument nodes live in the slots of
//! the owning [`Node`](crate::tree::Node) and are reached through the
//! [`Tree`] handed to every hook, addressed by the payload's [`SlotLayout`].
use strum::{EnumDiscriminants, EnumIs, EnumTryAs};

use crate::{
    error::EvalError,
    tree::{
        NodeId, Tree,
        shape::{ArgumentShape, SlotLayout},
    },
    types::{Type, Value},
};

pub mod basic;
pub mod function;
pub mod infix;
pub mod iterate;
pub mod list;
pub mod number;

pub use basic::{Constant, Empty, Expression, IdentifierLiteral, VariableRef};
pub use function::{Function, PrefixFunction};
pub use infix::Infix;
pub use iterate::Iterate;
pub use list::ListOp;
pub use number::NumberLiteral;

/// Behaviour shared by every operator kind.
///
/// Hooks receive the tree and the id of the node carrying the operator. They
/// run on a copy of the payload which is written back once the hook returns.
pub trait ContextEvaluable {
    /// Stable name, used as registry key by the editor and by documents.
    fn identifier(&self) -> &str;

    /// Slots stored by nodes of this kind.
    fn layout(&self) -> SlotLayout {
        SlotLayout::NONE
    }

    /// Slots currently visible as children. Defaults to every stored slot.
    fn shape(&self) -> ArgumentShape {
        self.layout().full_shape()
    }

    /// Forget any state derived from previous arguments.
    fn reset_arguments(&mut self) {}

    /// Parameterise a freshly reset copy from token arguments. Returns
    /// `false` if the arguments are rejected.
    fn customize(&mut self, _args: &[String]) -> bool {
        true
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError>;

    /// Type of the value [`evaluate`](Self::evaluate) would produce, computed
    /// from cached child types and visible declarations only. `None` if it
    /// cannot be known without evaluating.
    fn evaluate_type(&self, _tree: &Tree, _node: NodeId) -> Option<Type> {
        None
    }

    /// A child was replaced or changed its type.
    fn children_changed(&mut self, _tree: &mut Tree, _node: NodeId) {}

    /// Variable declarations visible to the node changed.
    fn context_changed(&mut self, _tree: &mut Tree, _node: NodeId) {}

    /// Precedence for associative, flattening operators.
    fn priority(&self) -> Option<u32> {
        None
    }
}

/// Payload of a tree node.
#[derive(Debug, Clone, EnumIs, EnumTryAs, EnumDiscriminants)]
#[strum_discriminants(name(OperatorKind), derive(Hash, PartialOrd, Ord))]
pub enum Operator {
    Empty(Empty),
    Expression(Expression),
    Number(NumberLiteral),
    Identifier(IdentifierLiteral),
    Variable(VariableRef),
    List(ListOp),
    Constant(Constant),
    Infix(Infix),
    PrefixFunction(PrefixFunction),
    Function(Function),
    Iterate(Iterate),
}

macro_rules! dispatch {
    ($self:expr, $op:ident => $body:expr) => {
        match $self {
            Operator::Empty($op) => $body,
            Operator::Expression($op) => $body,
            Operator::Number($op) => $body,
            Operator::Identifier($op) => $body,
            Operator::Variable($op) => $body,
            Operator::List($op) => $body,
            Operator::Constant($op) => $body,
            Operator::Infix($op) => $body,
            Operator::PrefixFunction($op) => $body,
            Operator::Function($op) => $body,
            Operator::Iterate($op) => $body,
        }
    };
}

impl ContextEvaluable for Operator {
    fn identifier(&self) -> &str {
        dispatch!(self, op => op.identifier())
    }

    fn layout(&self) -> SlotLayout {
        dispatch!(self, op => op.layout())
    }

    fn shape(&self) -> ArgumentShape {
        dispatch!(self, op => op.shape())
    }

    fn reset_arguments(&mut self) {
        dispatch!(self, op => op.reset_arguments())
    }

    fn customize(&mut self, args: &[String]) -> bool {
        dispatch!(self, op => op.customize(args))
    }

    fn evaluate(&self, tree: &mut Tree, node: NodeId) -> Result<Value, EvalError> {
        dispatch!(self, op => op.evaluate(tree, node))
    }

    fn evaluate_type(&self, tree: &Tree, node: NodeId) -> Option<Type> {
        dispatch!(self, op => op.evaluate_type(tree, node))
    }

    fn children_changed(&mut self, tree: &mut Tree, node: NodeId) {
        dispatch!(self, op => op.children_changed(tree, node))
    }

    fn context_changed(&mut self, tree: &mut Tree, node: NodeId) {
        dispatch!(self, op => op.context_changed(tree, node))
    }

    fn priority(&self) -> Option<u32> {
        dispatch!(self, op => op.priority())
    }
}

impl Operator {
    pub fn empty() -> Self {
        Operator::Empty(Empty)
    }

    pub fn expression() -> Self {
        Operator::Expression(Expression)
    }

    pub fn list() -> Self {
        Operator::List(ListOp)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Operator::Variable(VariableRef::new(name))
    }

    pub fn identifier_literal(name: impl Into<String>) -> Self {
        Operator::Identifier(IdentifierLiteral::new(name))
    }

    /// Numeric literal in entry form, e.g. `"-1.25"` or `"0."`. Returns
    /// `None` for anything else.
    pub fn number(raw: &str) -> Option<Self> {
        NumberLiteral::parse(raw).map(Operator::Number)
    }

    /// Whether `other` may be merged into this node instead of nesting a new
    /// node: both are the same associative operator at the same priority.
    pub fn merges_with(&self, other: &Operator) -> bool {
        match (self, other) {
            (Operator::Infix(a), Operator::Infix(b)) => {
                a.identifier() == b.identifier() && a.priority() == b.priority()
            }
            _ => false,
        }
    }
}

impl From<Infix> for Operator {
    fn from(value: Infix) -> Self {
        Operator::Infix(value)
    }
}

impl From<Function> for Operator {
    fn from(value: Function) -> Self {
        Operator::Function(value)
    }
}

impl From<PrefixFunction> for Operator {
    fn from(value: PrefixFunction) -> Self {
        Operator::PrefixFunction(value)
    }
}

impl From<Constant> for Operator {
    fn from(value: Constant) -> Self {
        Operator::Constant(value)
    }
}

impl From<Iterate> for Operator {
    fn from(value: Iterate) -> Self {
        Operator::Iterate(value)
    }
}
