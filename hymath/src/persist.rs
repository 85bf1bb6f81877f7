//! JSON documents for editor state
//!
//! Role
//! - Encode the tree of a [`TreeParser`] as nested node records, marking the
//!   node under the cursor.
//! - Rebuild a tree from such a document, instantiating every node from the
//!   parser's operator registry.
//!
//! One node is written as `{ "identifier": ..., "body": ..., "current": true }`
//! where `body` and `current` are optional. The body depends on the operator:
//! the entry text of a number, the name of a variable or identifier literal,
//! the single child of the expression wrapper as an object, and the stored
//! arguments of every other operator with slots as an array. Operators without
//! instance data (placeholders, constants) have no body.
//!
//! ```
//! use hymath::{catalog, parser::TreeParser, types::Value};
//!
//! let mut parser = TreeParser::new(catalog::all());
//! parser.parse_expression("2 * (3 + 4)").unwrap();
//! let document = parser.save(false).unwrap();
//!
//! let mut restored = TreeParser::new(catalog::all());
//! restored.load(&document).unwrap();
//! assert_eq!(restored.evaluate(), Ok(Value::Number(14.0)));
//! ```
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::PersistError,
    operators::{ContextEvaluable, Operator},
    parser::TreeParser,
    tree::{NodeId, Tree},
};

/// Serialized form of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyRecord>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub current: bool,
}

/// Instance data of one node, see the module documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyRecord {
    Text(String),
    Child(Box<NodeRecord>),
    Arguments(Vec<NodeRecord>),
}

impl NodeRecord {
    /// Record of the subtree rooted at `id`.
    pub fn capture(tree: &Tree, id: NodeId, cursor: Option<NodeId>) -> Option<Self> {
        let op = tree.op(id)?;
        let body = match op {
            Operator::Empty(_) | Operator::Constant(_) => None,
            Operator::Number(literal) => Some(BodyRecord::Text(literal.entry())),
            Operator::Variable(variable) => Some(BodyRecord::Text(variable.name.clone())),
            Operator::Identifier(literal) => Some(BodyRecord::Text(literal.name.clone())),
            Operator::Expression(_) => {
                let child = tree.storage_children(id).first().copied()?;
                Some(BodyRecord::Child(Box::new(Self::capture(tree, child, cursor)?)))
            }
            Operator::List(_)
            | Operator::Infix(_)
            | Operator::PrefixFunction(_)
            | Operator::Function(_)
            | Operator::Iterate(_) => Some(BodyRecord::Arguments(
                tree.storage_children(id)
                    .into_iter()
                    .map(|child| Self::capture(tree, child, cursor))
                    .collect::<Option<Vec<_>>>()?,
            )),
        };

        Some(Self {
            identifier: op.identifier().to_string(),
            body,
            current: cursor == Some(id),
        })
    }
}

impl TreeParser {
    /// Serialize the tree and cursor position to JSON.
    pub fn save(&self, pretty: bool) -> Result<String, PersistError> {
        let tree = self.tree();
        let record = NodeRecord::capture(tree, tree.root(), self.cursor()).ok_or_else(|| {
            PersistError::MalformedBody {
                identifier: "#expression".to_string(),
            }
        })?;
        let json = if pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        Ok(json)
    }

    /// Replace the tree with the one described by `data`. The cursor moves to
    /// the node marked as current, or to the first child of the root.
    ///
    /// On failure the current tree is left untouched.
    pub fn load(&mut self, data: &str) -> Result<(), PersistError> {
        let record: NodeRecord = serde_json::from_str(data)?;

        let mut current = None;
        let root = match self.instantiate(&record, &mut current) {
            Ok(root) => root,
            Err(error) => {
                self.tree_mut().collect_garbage();
                return Err(error);
            }
        };
        debug!("Loaded document rooted at `{}`", record.identifier);

        self.assign_root(root);
        let cursor = current.or_else(|| self.tree().children(root).first().copied());
        if let Some(cursor) = cursor {
            self.set_cursor(cursor);
        }
        Ok(())
    }

    fn instantiate(
        &mut self,
        record: &NodeRecord,
        current: &mut Option<NodeId>,
    ) -> Result<NodeId, PersistError> {
        let malformed = || PersistError::MalformedBody {
            identifier: record.identifier.clone(),
        };
        let mut op = self
            .operators()
            .get(&record.identifier)
            .cloned()
            .ok_or_else(|| PersistError::UnknownOperator {
                identifier: record.identifier.clone(),
            })?;
        op.reset_arguments();

        let children = match &record.body {
            None => Vec::new(),
            Some(BodyRecord::Text(text)) => {
                if !op.customize(std::slice::from_ref(text)) {
                    return Err(malformed());
                }
                Vec::new()
            }
            Some(BodyRecord::Child(child)) => vec![self.instantiate(child, current)?],
            Some(BodyRecord::Arguments(arguments)) => arguments
                .iter()
                .map(|argument| self.instantiate(argument, current))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let layout = op.layout();
        let capacity = usize::from(layout.prefix) + layout.fixed;
        if children.len() > capacity && !layout.rest {
            return Err(malformed());
        }

        let tree = self.tree_mut();
        let id = tree.insert(op);
        if !children.is_empty() {
            tree.set_storage_children(id, children);
        }
        if record.current {
            *current = Some(id);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_variants_round_trip_through_json() {
        let record = NodeRecord {
            identifier: "#expression".into(),
            body: Some(BodyRecord::Child(Box::new(NodeRecord {
                identifier: "+".into(),
                body: Some(BodyRecord::Arguments(vec![
                    NodeRecord {
                        identifier: "#number".into(),
                        body: Some(BodyRecord::Text("1.5".into())),
                        current: false,
                    },
                    NodeRecord {
                        identifier: "#empty".into(),
                        body: None,
                        current: true,
                    },
                ])),
                current: false,
            }))),
            current: false,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r##"{"identifier":"#empty","current":true}"##));
        assert!(!json.contains(r#""current":false"#));
        let decoded: NodeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }
}
