//! Argument slots of a node.
//!
//! Every operator kind stores its arguments in up to three places: an
//! optional *prefix* slot (the left operand of operators such as `/`), a
//! number of *fixed* slots and an optional unbounded *rest* list.
//! [`SlotLayout`] describes what a node stores, [`ArgumentShape`] which of the
//! stored slots are currently visible as children. The two only differ for
//! operators whose arity depends on their arguments, e.g. an iteration that
//! hides its upper bound when iterating over a list.
use smallvec::SmallVec;

use crate::tree::NodeId;

/// Storage layout of an operator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotLayout {
    pub prefix: bool,
    pub fixed: usize,
    pub rest: bool,
}

impl SlotLayout {
    pub const NONE: SlotLayout = SlotLayout {
        prefix: false,
        fixed: 0,
        rest: false,
    };

    /// Layout with `fixed` ordinary slots.
    pub const fn fixed(fixed: usize) -> Self {
        Self {
            prefix: false,
            fixed,
            rest: false,
        }
    }

    /// Layout with a prefix slot followed by `fixed` ordinary slots.
    pub const fn prefixed(fixed: usize) -> Self {
        Self {
            prefix: true,
            fixed,
            rest: false,
        }
    }

    /// Layout with only a rest list.
    pub const fn rest() -> Self {
        Self {
            prefix: false,
            fixed: 0,
            rest: true,
        }
    }

    /// The shape exposing every stored slot.
    pub fn full_shape(&self) -> ArgumentShape {
        ArgumentShape {
            prefix: self.prefix,
            fixed: (0..self.fixed).collect(),
            rest: self.rest,
        }
    }
}

/// Visible argument slots of a node.
///
/// Children are always ordered prefix, then the listed fixed slots in order,
/// then the rest list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentShape {
    pub prefix: bool,
    /// Indices into the stored fixed slots, in child order.
    pub fixed: SmallVec<usize, 4>,
    pub rest: bool,
}

/// Address of one argument slot inside a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRef {
    Prefix,
    Fixed(usize),
    Rest(usize),
}

/// The slot contents of one node.
#[derive(Debug, Clone, Default)]
pub struct Slots {
    pub prefix: Option<NodeId>,
    pub fixed: SmallVec<NodeId, 4>,
    pub rest: Vec<NodeId>,
}

impl Slots {
    pub fn get(&self, slot: SlotRef) -> Option<NodeId> {
        match slot {
            SlotRef::Prefix => self.prefix,
            SlotRef::Fixed(idx) => self.fixed.get(idx).copied(),
            SlotRef::Rest(idx) => self.rest.get(idx).copied(),
        }
    }

    /// Overwrite an existing slot. Returns the node previously held.
    pub fn set(&mut self, slot: SlotRef, node: NodeId) -> Option<NodeId> {
        let target = match slot {
            SlotRef::Prefix => self.prefix.as_mut(),
            SlotRef::Fixed(idx) => self.fixed.get_mut(idx),
            SlotRef::Rest(idx) => self.rest.get_mut(idx),
        }?;
        Some(std::mem::replace(target, node))
    }

    /// Find the slot currently holding `node`.
    pub fn position(&self, node: NodeId) -> Option<SlotRef> {
        if self.prefix == Some(node) {
            return Some(SlotRef::Prefix);
        }
        if let Some(idx) = self.fixed.iter().position(|&n| n == node) {
            return Some(SlotRef::Fixed(idx));
        }
        self.rest
            .iter()
            .position(|&n| n == node)
            .map(SlotRef::Rest)
    }

    /// Every stored node, hidden ones included, in child order.
    pub fn all(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.prefix
            .iter()
            .chain(self.fixed.iter())
            .chain(self.rest.iter())
            .copied()
    }

    /// The nodes visible through `shape`, in child order.
    pub fn visible(&self, shape: &ArgumentShape) -> Vec<NodeId> {
        let mut children = Vec::with_capacity(shape.fixed.len() + self.rest.len() + 1);
        if shape.prefix {
            children.extend(self.prefix);
        }
        children.extend(shape.fixed.iter().filter_map(|&idx| self.fixed.get(idx)));
        if shape.rest {
            children.extend(self.rest.iter().copied());
        }
        children
    }
}
