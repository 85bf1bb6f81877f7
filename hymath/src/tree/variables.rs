//! Per-node variable scopes
//!
//! Every node owns a [`Scope`] chained to the scopes of its ancestors. A name
//! resolves to its nearest declaration; a declaration in a descendant hides,
//! but never touches, a declaration of the same name further up.
//!
//! A binding separates the declared type from the current value. Changing
//! the set of declarations or a declared type notifies the owning node, which
//! re-types its whole subtree and propagates any resulting type change back
//! up. Assigning a value of the already declared type is silent, so loops
//! can rebind a variable without re-typing anything.
use std::collections::BTreeMap;

use log::trace;

use crate::{
    tree::{NodeId, Tree},
    types::{Type, Value},
};

/// Declared type and current value of one variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Binding {
    pub ty: Option<Type>,
    pub value: Option<Value>,
}

impl Binding {
    fn declared(ty: Option<Type>) -> Self {
        Self { ty, value: None }
    }

    fn assigned(value: Value) -> Self {
        Self {
            ty: Some(value.ty()),
            value: Some(value),
        }
    }
}

/// The variables declared directly on one node.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: BTreeMap<String, Binding>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(name, binding)| (name.as_str(), binding))
    }
}

/// Mutable view on the scope of one node.
///
/// Obtained through [`Tree::variables`]. Reads walk outward through the
/// scopes of the ancestors, writes only ever touch the owner's scope.
pub struct VariableContainer<'t> {
    tree: &'t mut Tree,
    owner: NodeId,
}

impl<'t> VariableContainer<'t> {
    pub(crate) fn new(tree: &'t mut Tree, owner: NodeId) -> Self {
        Self { tree, owner }
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    fn scope_mut(&mut self) -> Option<&mut Scope> {
        self.tree.nodes.get_mut(self.owner).map(|node| &mut node.scope)
    }

    fn store(&mut self, name: &str, binding: Binding) {
        let owner = self.owner;
        let Some(node) = self.tree.nodes.get_mut(owner) else {
            return;
        };
        match node.scope.bindings.get_mut(name) {
            Some(existing) if existing.ty == binding.ty => {
                if binding.value.is_some() {
                    *existing = binding;
                }
            }
            _ => {
                trace!("Declaring `{}` as {:?} on {:?}", name, binding.ty, owner);
                node.scope.bindings.insert(name.to_string(), binding);
                self.tree.context_changed(owner);
            }
        }
    }

    /// Declare `name` with an optional type. A held value survives only if
    /// the declared type is unchanged.
    pub fn declare(&mut self, name: &str, ty: Option<Type>) {
        self.store(name, Binding::declared(ty));
    }

    /// Assign `value`, declaring `name` with the value's type first.
    pub fn set(&mut self, name: &str, value: Value) {
        self.store(name, Binding::assigned(value));
    }

    /// Value of the nearest declaration of `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.tree.get_variable(self.owner, name)
    }

    /// Declared type of the nearest declaration of `name`.
    pub fn get_type(&self, name: &str) -> Option<Type> {
        self.tree.variable_type(self.owner, name)
    }

    /// Whether `name` is declared in this very scope.
    pub fn is_declared(&self, name: &str) -> bool {
        self.tree
            .scope(self.owner)
            .is_some_and(|scope| scope.contains(name))
    }

    /// Remove the declaration of `name` from this scope.
    pub fn delete(&mut self, name: &str) {
        let removed = self
            .scope_mut()
            .and_then(|scope| scope.bindings.remove(name))
            .is_some();
        if removed {
            self.tree.context_changed(self.owner);
        }
    }

    /// Drop the value of `name` but keep its declaration.
    pub fn delete_value(&mut self, name: &str) {
        if let Some(binding) = self
            .scope_mut()
            .and_then(|scope| scope.bindings.get_mut(name))
        {
            binding.value = None;
        }
    }

    /// Remove every declaration of this scope.
    pub fn clear(&mut self) {
        if let Some(scope) = self.scope_mut() {
            scope.bindings.clear();
            self.tree.context_changed(self.owner);
        }
    }

    /// Drop every value of this scope, keeping the declarations.
    pub fn clear_values(&mut self) {
        if let Some(scope) = self.scope_mut() {
            for binding in scope.bindings.values_mut() {
                binding.value = None;
            }
        }
    }

    /// Names visible from this scope, nearest scope first. Shadowed names
    /// appear once.
    pub fn list_declared(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut current = Some(self.owner);
        while let Some(id) = current {
            let Some(node) = self.tree.nodes.get(id) else {
                break;
            };
            for name in node.scope.bindings.keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            current = node.parent;
        }
        names
    }

    /// Values assigned in this very scope.
    pub fn export(&self) -> BTreeMap<String, Value> {
        self.tree
            .scope(self.owner)
            .map(|scope| {
                scope
                    .bindings
                    .iter()
                    .filter_map(|(name, binding)| Some((name.clone(), binding.value.clone()?)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Assign every value of `values` in this scope.
    pub fn import(&mut self, values: BTreeMap<String, Value>) {
        for (name, value) in values {
            self.set(&name, value);
        }
    }
}
