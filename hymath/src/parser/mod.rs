//! Cursor-driven structural editor
//!
//! Role
//! - Keep one mutable [`Tree`] and a cursor marking the current insertion
//!   point.
//! - Apply one [`Token`] at a time: an operator name, a numeric literal
//!   fragment or a navigation command.
//!
//! Insertion rules, by operator kind:
//! - numeric literals are assembled in place (see
//!   [`NumberLiteral`](crate::operators::NumberLiteral));
//! - associative operators climb from the cursor while the enclosing operator
//!   binds at least as tight, then either extend an operator of the same kind
//!   or wrap the reached node. Call boundaries stop the climb;
//! - prefix operators wrap the node under the cursor into their prefix slot;
//! - every other operator fills the empty placeholder under the cursor.
//!
//! After an insertion the cursor moves to the first empty placeholder of the
//! new node. Navigation grows rest lists lazily when moving past their end
//! and removes placeholders again when moving away without filling them.
use std::collections::BTreeMap;

use log::debug;

use crate::{
    error::{EditError, EditErrorKind, EvalError},
    operators::{
        ContextEvaluable, NumberLiteral, Operator,
        number::{POINT_TOKEN, SIGN_TOKEN},
    },
    tree::{NodeId, Tree, shape::SlotRef},
    types::Value,
};

mod expression;
pub mod scanner;
mod token;

pub use token::{NavigationTokens, Token};

/// Where a navigation step starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// The cursor itself.
    Here,
    /// Entering the node from its parent.
    Parent,
    /// Leaving the given child of the node.
    Child(NodeId),
}

/// Structural editor over one expression tree.
#[derive(Debug, Clone)]
pub struct TreeParser {
    tree: Tree,
    cursor: Option<NodeId>,
    operators: BTreeMap<String, Operator>,
    navigation: NavigationTokens,
}

impl Default for TreeParser {
    fn default() -> Self {
        Self::with_operators(BTreeMap::new())
    }
}

impl TreeParser {
    /// Editor knowing `operators`, registered under their identifier. The
    /// first operator of a given identifier wins.
    pub fn new(operators: impl IntoIterator<Item = Operator>) -> Self {
        let mut registry = BTreeMap::new();
        for op in operators {
            registry
                .entry(op.identifier().to_string())
                .or_insert(op);
        }
        Self::with_operators(registry)
    }

    pub fn with_operators(operators: BTreeMap<String, Operator>) -> Self {
        let tree = Tree::new();
        let cursor = tree.children(tree.root()).first().copied();
        Self {
            tree,
            cursor,
            operators,
            navigation: NavigationTokens::default(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Direct access to the tree, e.g. to declare variables.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Move the cursor to `node`. Fails if `node` is not part of the tree.
    pub fn set_cursor(&mut self, node: NodeId) -> bool {
        if self.tree.is_reachable(node) {
            self.cursor = Some(node);
            true
        } else {
            false
        }
    }

    pub fn operators(&self) -> &BTreeMap<String, Operator> {
        &self.operators
    }

    pub fn navigation(&self) -> &NavigationTokens {
        &self.navigation
    }

    pub fn set_navigation(&mut self, navigation: NavigationTokens) {
        self.navigation = navigation;
    }

    /// Register `op` under its identifier, replacing any previous entry.
    pub fn add(&mut self, op: Operator) {
        let name = op.identifier().to_string();
        self.add_named(name, op);
    }

    /// Register `op` under an alias.
    pub fn add_named(&mut self, name: impl Into<String>, op: Operator) {
        self.operators.insert(name.into(), op);
    }

    /// Register every entry of `operators`, replacing existing names.
    pub fn extend(&mut self, operators: impl IntoIterator<Item = (String, Operator)>) {
        self.operators.extend(operators);
    }

    /// Start over with an empty expression. Declarations made on the old root
    /// are lost.
    pub fn clear(&mut self) {
        let root = self.tree.insert(Operator::expression());
        self.tree.set_root(root);
        self.cursor = self.tree.children(root).first().copied();
        self.tree.collect_garbage();
    }

    /// Clear the node under the cursor, or drop it if it already is an empty
    /// rest entry.
    pub fn erase(&mut self) {
        if let Some(cursor) = self.cursor {
            self.cursor = Some(self.clear_node(cursor));
        }
    }

    /// Make `node` the root and put the cursor on it.
    pub fn assign_root(&mut self, node: NodeId) {
        if !self.tree.contains(node) {
            return;
        }
        self.tree.set_root(node);
        self.cursor = Some(node);
        self.tree.collect_garbage();
    }

    pub fn evaluate(&mut self) -> Result<Value, EvalError> {
        self.tree.evaluate_root()
    }

    pub fn parse_token<I, S>(&mut self, name: &str, args: I) -> Result<(), EditError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.process_token(&Token::with_args(name, args))
    }

    /// Apply a `;`-separated batch of `name:arg` tokens, stopping at the
    /// first rejected one.
    pub fn parse_command(&mut self, command: &str) -> Result<(), EditError> {
        for token in Token::parse_batch(command) {
            self.process_token(&token)?;
        }
        Ok(())
    }

    /// Apply one token.
    pub fn process_token(&mut self, token: &Token) -> Result<(), EditError> {
        debug!("Processing token `{}`", token);
        let result = match self.process_navigation(token) {
            Ok(true) => Ok(()),
            Ok(false) => self.process_operator(token),
            Err(kind) => Err(kind),
        };
        self.collect_garbage();

        result.map_err(|kind| {
            debug!("Rejected token `{}`: {}", token, kind);
            self.error(kind)
        })
    }

    pub(crate) fn error(&self, kind: EditErrorKind) -> EditError {
        EditError {
            kind,
            root: self.tree.root(),
            cursor: self.cursor,
        }
    }

    fn collect_garbage(&mut self) {
        self.tree.collect_garbage();
        if self.cursor.is_some_and(|cursor| !self.tree.contains(cursor)) {
            self.cursor = Some(self.tree.root());
        }
    }

    fn process_navigation(&mut self, token: &Token) -> Result<bool, EditErrorKind> {
        let cursor = self.cursor.ok_or(EditErrorKind::NoHead)?;

        if *token == self.navigation.advance {
            self.cursor = Some(self.next_child(cursor, Origin::Here));
        } else if *token == self.navigation.retreat {
            self.cursor = Some(self.prev_child(cursor, Origin::Here));
        } else if *token == self.navigation.erase {
            self.erase();
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    fn process_operator(&mut self, token: &Token) -> Result<(), EditErrorKind> {
        let prototype = self
            .operators
            .get(&token.name)
            .ok_or_else(|| EditErrorKind::UnknownToken(token.clone()))?;
        let cursor = self.cursor.ok_or(EditErrorKind::NoHead)?;
        if cursor == self.tree.root() {
            return Err(EditErrorKind::UnexpectedHead);
        }

        let mut op = prototype.clone();
        op.reset_arguments();
        if !op.customize(&token.args) {
            return Err(EditErrorKind::CustomizationFailed {
                args: token.args.clone(),
                operator: op.identifier().to_string(),
            });
        }

        if op.is_number() {
            return self.process_number(token, cursor);
        }
        if let Some(priority) = op.priority() {
            return self.process_priority(op, priority, cursor);
        }

        let is_empty = self.tree.is_empty_node(cursor);
        if op.shape().prefix {
            if is_empty {
                return Err(EditErrorKind::UnexpectedHead);
            }
            let node = self.tree.insert(op);
            self.tree.replace_self(cursor, node);
            if let Some(prefix) = self.tree.slot(node, SlotRef::Prefix) {
                self.tree.replace(node, prefix, cursor);
            }
            self.cursor = Some(self.head(node));
        } else {
            if !is_empty {
                return Err(EditErrorKind::UnexpectedHead);
            }
            let node = self.tree.insert(op);
            self.tree.replace_self(cursor, node);
            self.cursor = Some(self.head(node));
        }
        Ok(())
    }

    fn process_number(&mut self, token: &Token, cursor: NodeId) -> Result<(), EditErrorKind> {
        let unknown = || EditErrorKind::UnknownToken(token.clone());
        let [arg] = token.args.as_slice() else {
            return Err(unknown());
        };

        match self.tree.op(cursor) {
            Some(Operator::Empty(_)) => {
                let seed = match arg.as_str() {
                    SIGN_TOKEN => "-",
                    POINT_TOKEN => "0.",
                    literal => literal,
                };
                let literal = NumberLiteral::parse(seed).ok_or_else(unknown)?;
                let node = self.tree.insert(Operator::Number(literal));
                self.tree.replace_self(cursor, node);
                self.cursor = Some(node);
            }
            Some(Operator::Number(literal)) => {
                let mut literal = literal.clone();
                if !literal.apply(arg) {
                    return Err(unknown());
                }
                self.tree.set_op(cursor, Operator::Number(literal));
            }
            _ => return Err(unknown()),
        }
        Ok(())
    }

    fn process_priority(
        &mut self,
        op: Operator,
        priority: u32,
        cursor: NodeId,
    ) -> Result<(), EditErrorKind> {
        let mut current = cursor;
        while let Some(parent) = self.tree.parent(current) {
            match self.tree.priority(parent) {
                Some(parent_priority) if parent_priority >= priority => current = parent,
                _ => break,
            }
        }

        let target = if self
            .tree
            .op(current)
            .is_some_and(|existing| existing.merges_with(&op))
        {
            self.tree.push_rest(current);
            current
        } else {
            if self.tree.parent(current).is_none() {
                return Err(EditErrorKind::UnexpectedHead);
            }
            let node = self.tree.insert(op);
            self.tree.replace_self(current, node);
            let empty = self.tree.insert_empty();
            self.tree.set_children(node, vec![current, empty]);
            node
        };

        self.cursor = self.tree.children(target).last().copied();
        Ok(())
    }

    /// Next insertion point inside a freshly inserted `node`: its first empty
    /// descendant outside the prefix slot, a new rest entry, or the node
    /// itself.
    fn head(&mut self, node: NodeId) -> NodeId {
        let prefix = if self.tree.has_prefix(node) {
            self.tree.slot(node, SlotRef::Prefix)
        } else {
            None
        };
        let found = self
            .tree
            .children(node)
            .into_iter()
            .filter(|&child| Some(child) != prefix)
            .find_map(|child| self.first_empty(child));
        if let Some(empty) = found {
            return empty;
        }
        self.tree.push_rest(node).unwrap_or(node)
    }

    fn first_empty(&self, node: NodeId) -> Option<NodeId> {
        if self.tree.is_empty_node(node) {
            return Some(node);
        }
        self.tree
            .children(node)
            .into_iter()
            .find_map(|child| self.first_empty(child))
    }

    fn append_rest(&mut self, node: NodeId) -> NodeId {
        self.tree.push_rest(node).unwrap_or(node)
    }

    /// Remove the empty rest entry `node` from its parent. Returns the node
    /// now at its position, or the parent if it was the last entry. A
    /// priority operator left with a single operand is replaced by it.
    fn delete_empty_node(&mut self, node: NodeId) -> NodeId {
        let Some(parent) = self.tree.parent(node) else {
            return node;
        };
        if !self.tree.rest_children(parent).contains(&node) || !self.tree.is_empty_node(node) {
            return node;
        }
        let Some(idx) = self.tree.child_index(parent, node) else {
            return node;
        };

        let mut children = self.tree.children(parent);
        children.remove(idx);

        if self.tree.priority(parent).is_some()
            && children.len() == 1
            && self.tree.parent(parent).is_some()
        {
            let survivor = children[0];
            self.tree.replace_self(parent, survivor);
            return survivor;
        }

        self.tree.set_children(parent, children);
        self.tree
            .children(parent)
            .get(idx)
            .copied()
            .unwrap_or(parent)
    }

    /// Replace `node` with an empty placeholder and return the new cursor.
    ///
    /// An empty rest entry is removed instead and the cursor moves to its
    /// previous sibling. Clearing a rest entry drops the empty entries that
    /// trail the last non-empty one.
    fn clear_node(&mut self, node: NodeId) -> NodeId {
        let Some(parent) = self.tree.parent(node) else {
            return node;
        };
        let children = self.tree.children(parent);
        let Some(idx) = children.iter().position(|&child| child == node) else {
            return node;
        };

        if self.tree.is_empty_node(node) {
            let previous = idx.checked_sub(1).map(|prev| children[prev]);
            let next = self.delete_empty_node(node);
            return match previous {
                Some(previous) if next != node && self.tree.is_reachable(previous) => previous,
                _ => next,
            };
        }

        let empty = self.tree.insert_empty();
        let rest = self.tree.rest_children(parent).to_vec();
        let mut new_children: Vec<NodeId> = children
            .iter()
            .map(|&child| if child == node { empty } else { child })
            .collect();
        if rest.contains(&node) {
            if let Some(last) = rest.iter().rposition(|&child| !self.tree.is_empty_node(child)) {
                let trailing = rest.len() - last - 1;
                new_children.truncate(new_children.len() - trailing);
            }
        }
        self.tree.set_children(parent, new_children);
        empty
    }

    fn next_child(&mut self, node: NodeId, origin: Origin) -> NodeId {
        let children = self.tree.children(node);
        match origin {
            Origin::Here => match self.tree.parent(node) {
                Some(parent) => self.next_child(parent, Origin::Child(node)),
                None => self.next_child(node, Origin::Parent),
            },
            Origin::Parent => {
                if let Some(&first) = children.first() {
                    return self.next_child(first, Origin::Parent);
                }
                self.append_rest(node)
            }
            Origin::Child(child) => {
                let Some(idx) = children.iter().position(|&c| c == child) else {
                    return node;
                };
                if let Some(&next) = children.get(idx + 1) {
                    return self.next_child(next, Origin::Parent);
                }
                if !self.tree.has_rest(node) {
                    return node;
                }
                if self.tree.is_empty_node(child) {
                    return self.delete_empty_node(child);
                }
                self.append_rest(node)
            }
        }
    }

    fn prev_child(&mut self, node: NodeId, origin: Origin) -> NodeId {
        let children = self.tree.children(node);
        match origin {
            Origin::Here => {
                if self.tree.has_rest(node) && self.tree.priority(node).is_none() {
                    return self.append_rest(node);
                }
                if let Some(&last) = children.last() {
                    return self.prev_child(last, Origin::Parent);
                }
                match self.tree.parent(node) {
                    Some(parent) => self.prev_child(parent, Origin::Child(node)),
                    None => node,
                }
            }
            Origin::Parent => node,
            Origin::Child(child) => {
                let Some(idx) = children.iter().position(|&c| c == child) else {
                    return node;
                };

                if self.tree.rest_children(node).last() == Some(&child)
                    && self.tree.is_empty_node(child)
                {
                    let next = self.delete_empty_node(child);
                    if next != node {
                        return next;
                    }
                }

                if idx > 0 {
                    return self.prev_child(children[idx - 1], Origin::Parent);
                }
                match self.tree.parent(node) {
                    Some(parent) => self.prev_child(parent, Origin::Child(node)),
                    None => node,
                }
            }
        }
    }
}
