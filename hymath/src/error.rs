use std::ops::Range;

use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

use crate::{parser::Token, tree::NodeId, types::Type};

fn fmt_found(found: &Option<Type>) -> String {
    match found {
        Some(ty) => format!("`{}`", ty),
        None => "a value of unknown type".to_string(),
    }
}

fn fmt_signature(signature: &[Type]) -> String {
    signature
        .iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure raised while evaluating a node.
#[derive(Debug, Clone, PartialEq, EnumIs, EnumTryAs, Error)]
pub enum EvalErrorKind {
    /// A variable is referenced but no enclosing scope holds a value for it.
    #[error(
        "The variable `{name}` has no value in any enclosing scope. Declare and assign it before evaluating."
    )]
    MissingVariable { name: String },

    /// A value of the wrong type reached an operator.
    #[error("Expected a value of type `{expected}`, found {}.", fmt_found(.found))]
    UnexpectedType {
        expected: Type,
        found: Option<Type>,
    },

    /// A value has the right type but is unusable, e.g. a fractional loop bound.
    #[error("Invalid value: {0}.")]
    ValueError(String),

    /// An empty placeholder was evaluated.
    #[error("An argument is missing. Fill every empty placeholder before evaluating.")]
    MissingArgument,

    /// No overload accepts the argument types.
    #[error("No overload accepts arguments of types ({}).", fmt_signature(.signature))]
    NoMatchingFunction { signature: Vec<Type> },

    /// A delegate failed for a reason outside the categories above.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// An [`EvalErrorKind`] together with the node it was raised on.
///
/// The origin is attached by the innermost node whose evaluation failed;
/// ancestors the error travels through never overwrite it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub origin: Option<NodeId>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        Self { kind, origin: None }
    }

    /// Attach `origin` unless an origin is already set.
    pub fn with_origin(mut self, origin: NodeId) -> Self {
        if self.origin.is_none() {
            self.origin = Some(origin);
        }
        self
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Failure raised while applying a token to the editor.
#[derive(Debug, Clone, PartialEq, EnumIs, EnumTryAs, Error)]
pub enum EditErrorKind {
    /// The token names neither a navigation command nor a registered operator.
    #[error("The token `{0}` is neither a navigation command nor a registered operator.")]
    UnknownToken(Token),

    /// The editor has no cursor to apply the token to.
    #[error("The editor has no current insertion point.")]
    NoHead,

    /// The token cannot be applied at the current insertion point.
    #[error(
        "The token cannot be applied at the current insertion point. Operators need an empty slot, prefix operators need a non-empty operand and the root cannot be replaced."
    )]
    UnexpectedHead,

    /// The operator refused the token arguments.
    #[error("The operator `{operator}` rejected the token arguments {args:?}.")]
    CustomizationFailed { args: Vec<String>, operator: String },

    /// The textual front-end could not make sense of its input.
    #[error("Syntax error: {reason}.")]
    SyntaxError {
        reason: String,
        span: Option<Range<usize>>,
    },
}

/// An [`EditErrorKind`] together with the editor state at the time the token
/// was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct EditError {
    pub kind: EditErrorKind,
    pub root: NodeId,
    pub cursor: Option<NodeId>,
}

/// Failure raised while saving or loading a document.
#[derive(Debug, EnumIs, Error)]
pub enum PersistError {
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document references an operator that is not registered in the editor.
    #[error(
        "The document references the operator `{identifier}` which is not registered in the editor."
    )]
    UnknownOperator { identifier: String },

    /// The body stored for a node does not fit its operator.
    #[error("The body stored for an operator `{identifier}` node is malformed.")]
    MalformedBody { identifier: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
