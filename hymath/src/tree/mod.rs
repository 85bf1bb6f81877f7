//! Mutable expression tree
//!
//! Role
//! - Own every node of an expression in one arena addressed by [`NodeId`].
//!   Parents own their children through argument slots; children point back
//!   through a plain parent id.
//! - Keep every node's cached return type consistent with its subtree and
//!   with the variables visible to it.
//!
//! Consistency is maintained by two notifications:
//! - *children changed* runs upward: a node whose slot was reassigned, or
//!   whose child changed type, runs its operator hook, re-computes its own
//!   type and, if that changed, notifies its parent in turn;
//! - *context changed* runs downward: after a declaration changes, every
//!   node below the scope owner re-computes its type, bottom-up.
//!
//! A per-node flag stops a node from re-entering its own *children changed*
//! while it is already being recomputed.
//!
//! All structural mutation goes through [`Tree::replace`],
//! [`Tree::set_children`] and their relatives so the notifications are never
//! bypassed. Nodes that drop out of the tree stay in the arena until
//! [`Tree::collect_garbage`] is called.
use log::trace;
use slotmap::{SecondaryMap, SlotMap};

use crate::{
    error::{EvalError, EvalErrorKind},
    operators::{ContextEvaluable, Operator},
    types::{Type, Value},
};

pub mod shape;
pub mod variables;

use shape::{ArgumentShape, SlotRef, Slots};
use variables::{Binding, Scope, VariableContainer};

slotmap::new_key_type! {
    /// Stable identity of a node inside a [`Tree`].
    pub struct NodeId;
}

/// One vertex of the tree.
#[derive(Debug, Clone)]
pub struct Node {
    op: Operator,
    parent: Option<NodeId>,
    slots: Slots,
    return_type: Option<Type>,
    scope: Scope,
    changing: bool,
}

impl Node {
    pub fn op(&self) -> &Operator {
        &self.op
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn return_type(&self) -> Option<&Type> {
        self.return_type.as_ref()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Children visible through the operator's current shape.
    pub fn children(&self) -> Vec<NodeId> {
        self.slots.visible(&self.op.shape())
    }
}

/// Arena of nodes with a distinguished root.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding an expression wrapper around one empty placeholder.
    pub fn new() -> Self {
        Self::with_root(Operator::expression())
    }

    /// A tree whose root carries `op`, with empty placeholders in its slots.
    pub fn with_root(op: Operator) -> Self {
        let mut tree = Tree {
            nodes: SlotMap::with_key(),
            root: NodeId::default(),
        };
        tree.root = tree.insert(op);
        tree
    }

    /// Create a detached node carrying `op`. Every prefix and fixed slot is
    /// filled with a fresh empty placeholder, the rest list starts empty.
    pub fn insert(&mut self, op: Operator) -> NodeId {
        let layout = op.layout();
        let mut slots = Slots::default();
        if layout.prefix {
            slots.prefix = Some(self.insert_empty());
        }
        for _ in 0..layout.fixed {
            let empty = self.insert_empty();
            slots.fixed.push(empty);
        }

        let children: Vec<NodeId> = slots.all().collect();
        let id = self.nodes.insert(Node {
            op,
            parent: None,
            slots,
            return_type: None,
            scope: Scope::default(),
            changing: false,
        });
        for child in children {
            self.nodes[child].parent = Some(id);
        }

        let ty = self.nodes[id].op.evaluate_type(self, id);
        self.nodes[id].return_type = ty;
        id
    }

    pub fn insert_empty(&mut self) -> NodeId {
        self.insert(Operator::empty())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn op(&self, id: NodeId) -> Option<&Operator> {
        self.nodes.get(id).map(|node| &node.op)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Cached type of the value `id` evaluates to.
    pub fn return_type(&self, id: NodeId) -> Option<&Type> {
        self.nodes.get(id)?.return_type.as_ref()
    }

    pub fn scope(&self, id: NodeId) -> Option<&Scope> {
        self.nodes.get(id).map(|node| &node.scope)
    }

    /// Visible children in order: prefix, fixed slots, rest list.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(Node::children)
            .unwrap_or_default()
    }

    /// Every stored child, slots hidden by the current shape included.
    pub fn storage_children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.slots.all().collect())
            .unwrap_or_default()
    }

    /// The node stored in `slot`, whether visible or not.
    pub fn slot(&self, id: NodeId, slot: SlotRef) -> Option<NodeId> {
        self.nodes.get(id)?.slots.get(slot)
    }

    /// The visible rest list of `id`.
    pub fn rest_children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id) {
            Some(node) if node.op.shape().rest => node.slots.rest.as_slice(),
            _ => &[],
        }
    }

    /// Position of `child` among the visible children of `parent`.
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    pub fn is_empty_node(&self, id: NodeId) -> bool {
        self.op(id).is_some_and(Operator::is_empty)
    }

    pub fn has_rest(&self, id: NodeId) -> bool {
        self.op(id).is_some_and(|op| op.shape().rest)
    }

    pub fn has_prefix(&self, id: NodeId) -> bool {
        self.op(id).is_some_and(|op| op.shape().prefix)
    }

    pub fn priority(&self, id: NodeId) -> Option<u32> {
        self.op(id)?.priority()
    }

    /// Walk from `id` to the root, `id` excluded.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// Whether `id` is connected to the root.
    pub fn is_reachable(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|node| node == self.root)
    }

    /// Nearest binding of `name` visible from `id`.
    pub fn lookup(&self, id: NodeId, name: &str) -> Option<&Binding> {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.nodes.get(id)) {
            if let Some(binding) = node.scope.get(name) {
                return Some(binding);
            }
            current = node.parent;
        }
        None
    }

    /// Value of the nearest declaration of `name` visible from `id`.
    pub fn get_variable(&self, id: NodeId, name: &str) -> Option<Value> {
        self.lookup(id, name)?.value.clone()
    }

    /// Declared type of the nearest declaration of `name` visible from `id`.
    pub fn variable_type(&self, id: NodeId, name: &str) -> Option<Type> {
        self.lookup(id, name)?.ty.clone()
    }

    /// Declared type of `name` in the scope of `id` only. The outer `None`
    /// means "not declared here".
    pub fn local_binding_type(&self, id: NodeId, name: &str) -> Option<Option<Type>> {
        self.scope(id)?.get(name).map(|binding| binding.ty.clone())
    }

    /// Mutable access to the variables declared on `id`.
    pub fn variables(&mut self, id: NodeId) -> VariableContainer<'_> {
        VariableContainer::new(self, id)
    }

    /// Evaluate `id`. Errors carry the innermost failing node as origin.
    pub fn evaluate(&mut self, id: NodeId) -> Result<Value, EvalError> {
        let Some(node) = self.nodes.get(id) else {
            return Err(EvalErrorKind::Unknown(format!("{:?} is not part of the tree", id)).into());
        };
        let op = node.op.clone();
        op.evaluate(self, id).map_err(|err| err.with_origin(id))
    }

    pub fn evaluate_root(&mut self) -> Result<Value, EvalError> {
        self.evaluate(self.root)
    }

    /// Put `new` into the slot of `parent` currently holding `old`.
    ///
    /// `new` is first detached from any previous parent. Does nothing if
    /// `old` is not a child of `parent` or if `new` is `parent` or one of its
    /// ancestors.
    pub fn replace(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if old == new || !self.contains(new) || self.parent(old) != Some(parent) {
            return;
        }
        if new == parent || self.ancestors(parent).any(|node| node == new) {
            return;
        }
        let Some(slot) = self.nodes[parent].slots.position(old) else {
            return;
        };

        self.detach(new, Some(old));
        self.nodes[new].parent = Some(parent);
        self.context_changed(new);

        self.nodes[parent].slots.set(slot, new);
        self.nodes[old].parent = None;
        self.children_changed(parent);
    }

    /// Ask the parent of `old` to replace it with `new`.
    pub fn replace_self(&mut self, old: NodeId, new: NodeId) {
        if let Some(parent) = self.parent(old) {
            self.replace(parent, old, new);
        }
    }

    /// Map `children` positionally onto the visible slots of `id`.
    ///
    /// Missing prefix and fixed slots are filled with fresh placeholders,
    /// the rest list receives whatever remains. Previous children that are
    /// not part of `children` are detached.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let shape = node.op.shape();
        self.assign_children(id, children, &shape);
    }

    /// Like [`set_children`](Self::set_children) but addressing every stored
    /// slot, including slots hidden by the current shape.
    pub fn set_storage_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let shape = node.op.layout().full_shape();
        self.assign_children(id, children, &shape);
    }

    fn assign_children(&mut self, id: NodeId, children: Vec<NodeId>, shape: &ArgumentShape) {
        // A node occupies one slot at most; later repeats are dropped.
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            if self.nodes.contains_key(child)
                && child != id
                && !kept.contains(&child)
                && !self.ancestors(id).any(|node| node == child)
            {
                kept.push(child);
            }
        }
        let children = kept;
        for &child in &children {
            if self.parent(child).is_some_and(|parent| parent != id) {
                self.detach(child, None);
            }
        }

        let before = self.nodes[id].slots.visible(shape);
        let mut slots = self.nodes[id].slots.clone();
        let mut incoming = children.into_iter();
        if shape.prefix {
            slots.prefix = Some(match incoming.next() {
                Some(child) => child,
                None => self.insert_empty(),
            });
        }
        for &idx in shape.fixed.iter() {
            let child = match incoming.next() {
                Some(child) => child,
                None => self.insert_empty(),
            };
            if let Some(target) = slots.fixed.get_mut(idx) {
                *target = child;
            }
        }
        if shape.rest {
            slots.rest = incoming.collect();
        }

        let after = slots.visible(shape);
        for old in &before {
            if !after.contains(old) && self.parent(*old) == Some(id) {
                self.nodes[*old].parent = None;
            }
        }
        self.nodes[id].slots = slots;

        for &child in &after {
            self.nodes[child].parent = Some(id);
        }
        for &child in &after {
            if !before.contains(&child) {
                self.context_changed(child);
            }
        }
        self.children_changed(id);
    }

    /// Append a fresh placeholder to the rest list of `id`. Returns `None` if
    /// the node has no visible rest list.
    pub fn push_rest(&mut self, id: NodeId) -> Option<NodeId> {
        if !self.has_rest(id) {
            return None;
        }
        let empty = self.insert_empty();
        self.nodes[empty].parent = Some(id);
        self.nodes[id].slots.rest.push(empty);
        self.children_changed(id);
        Some(empty)
    }

    /// Swap the payload of `id` for `op` in place. Only payloads with the same
    /// slot layout are accepted, so the stored children stay valid.
    pub fn set_op(&mut self, id: NodeId, op: Operator) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if node.op.layout() != op.layout() {
            return false;
        }
        node.op = op;
        self.children_changed(id);
        true
    }

    /// Take `id` out of its parent's slot. A prefix or fixed slot receives a
    /// fresh placeholder, a rest entry is removed. The parent is notified
    /// unless it is `quiet`.
    fn detach(&mut self, id: NodeId, quiet: Option<NodeId>) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[id].parent = None;
        let Some(slot) = self.nodes.get(parent).and_then(|node| node.slots.position(id)) else {
            return;
        };

        match slot {
            SlotRef::Rest(idx) => {
                self.nodes[parent].slots.rest.remove(idx);
            }
            slot => {
                let empty = self.insert_empty();
                self.nodes[empty].parent = Some(parent);
                self.nodes[parent].slots.set(slot, empty);
            }
        }
        if quiet != Some(parent) {
            self.children_changed(parent);
        }
    }

    /// Make `id` the root of the tree. The previous root and everything only
    /// reachable through it become garbage.
    pub fn set_root(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        self.detach(id, None);
        self.root = id;
        self.context_changed(id);
    }

    /// Drop every node not reachable from the root. Returns the number of
    /// released nodes.
    pub fn collect_garbage(&mut self) -> usize {
        let mut marked: SecondaryMap<NodeId, ()> = SecondaryMap::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if marked.insert(id, ()).is_none() {
                stack.extend(node.slots.all());
            }
        }

        let before = self.nodes.len();
        self.nodes.retain(|id, _| marked.contains_key(id));
        let released = before - self.nodes.len();
        if released > 0 {
            trace!("Released {} unreachable nodes, {} remain", released, self.nodes.len());
        }
        released
    }

    pub(crate) fn set_changing(&mut self, id: NodeId, changing: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => std::mem::replace(&mut node.changing, changing),
            None => false,
        }
    }

    /// Re-compute the type of `id` and notify its parent if it changed.
    pub(crate) fn update_return_type(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let ty = node.op.evaluate_type(self, id);
        let node = &mut self.nodes[id];
        if node.return_type != ty {
            trace!(
                "Type of {:?} ({}) changed from {:?} to {:?}",
                id,
                node.op.identifier(),
                node.return_type,
                ty
            );
            node.return_type = ty;
            if let Some(parent) = node.parent {
                self.children_changed(parent);
            }
        }
    }

    /// A slot of `id` was reassigned or a child changed its type.
    pub(crate) fn children_changed(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.changing {
            return;
        }
        node.changing = true;
        let before = node.children();
        let mut op = node.op.clone();

        op.children_changed(self, id);

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.op = op;
        node.changing = false;
        let after = node.children();

        for child in after {
            if !before.contains(&child) {
                self.context_changed(child);
            }
        }
        self.update_return_type(id);
    }

    /// Declarations visible to `id` changed.
    pub(crate) fn context_changed(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.context_changed(child);
        }

        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let mut op = node.op.clone();
        op.context_changed(self, id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.op = op;
        }
        self.update_return_type(id);
    }
}
