//! Node model for Glint.
//!
//! Every widget instance, and every addressable region inside one (a
//! dropdown's trigger and panel, for example), is a node in a [`NodeTree`].
//! The tree provides:
//! - Stable identifiers via arena-based storage
//! - Parent-child relationships used for signal bubbling and containment tests
//! - A lifecycle state per node (unattached, attached, detached)
//!
//! The tree stores structure only. Property values and render output belong
//! to the widget that owns the node.

use std::fmt;

use slotmap::{new_key_type, SlotMap};

use crate::error::{NodeError, NodeResult};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a node in a [`NodeTree`].
    ///
    /// `NodeId`s remain valid until the node is destroyed; a destroyed id is
    /// never reused for a different node.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the id to a raw u64 value, e.g. for a `data-node` attribute.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// The lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Created but never connected to a document.
    #[default]
    Unattached,
    /// Connected; eligible for interactions and listeners.
    Attached,
    /// Was connected, then removed. May be attached again.
    Detached,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unattached => "unattached",
            Self::Attached => "attached",
            Self::Detached => "detached",
        };
        f.write_str(s)
    }
}

struct NodeData {
    tag: &'static str,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    lifecycle: Lifecycle,
}

/// Arena-backed storage of node structure and lifecycle.
pub struct NodeTree {
    nodes: SlotMap<NodeId, NodeData>,
}

impl NodeTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Register a new root node with the given tag.
    pub fn register(&mut self, tag: &'static str) -> NodeId {
        let id = self.nodes.insert(NodeData {
            tag,
            parent: None,
            children: Vec::new(),
            lifecycle: Lifecycle::Unattached,
        });
        tracing::trace!(target: targets::NODE, ?id, tag, "registered node");
        id
    }

    /// Remove a node and all of its descendants.
    pub fn destroy(&mut self, id: NodeId) -> NodeResult<Vec<NodeId>> {
        let removed = self.depth_first_preorder(id)?;

        if let Some(parent_id) = self.nodes.get(id).and_then(|d| d.parent) {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.retain(|&child| child != id);
            }
        }
        for &node in &removed {
            self.nodes.remove(node);
        }
        tracing::trace!(target: targets::NODE, ?id, count = removed.len(), "destroyed subtree");
        Ok(removed)
    }

    /// Check whether a node exists.
    pub fn exists(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn data(&self, id: NodeId) -> NodeResult<&NodeData> {
        self.nodes.get(id).ok_or(NodeError::InvalidNodeId(id))
    }

    /// Set the parent of a node. `None` makes it a root.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> NodeResult<()> {
        self.data(id)?;
        if let Some(parent_id) = new_parent {
            self.data(parent_id)?;
            if self.contains(id, parent_id) {
                return Err(NodeError::CircularParentage);
            }
        }

        if let Some(old_parent) = self.nodes.get(id).and_then(|d| d.parent) {
            if let Some(parent) = self.nodes.get_mut(old_parent) {
                parent.children.retain(|&child| child != id);
            }
        }
        if let Some(data) = self.nodes.get_mut(id) {
            data.parent = new_parent;
        }
        if let Some(parent_id) = new_parent {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.push(id);
            }
        }
        Ok(())
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> NodeResult<Option<NodeId>> {
        self.data(id).map(|d| d.parent)
    }

    /// Get the children of a node.
    pub fn children(&self, id: NodeId) -> NodeResult<&[NodeId]> {
        self.data(id).map(|d| d.children.as_slice())
    }

    /// Get the tag of a node.
    pub fn tag(&self, id: NodeId) -> NodeResult<&'static str> {
        self.data(id).map(|d| d.tag)
    }

    /// Get the lifecycle state of a node.
    pub fn lifecycle(&self, id: NodeId) -> NodeResult<Lifecycle> {
        self.data(id).map(|d| d.lifecycle)
    }

    /// Whether the node is currently attached.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|d| d.lifecycle == Lifecycle::Attached)
    }

    /// Get all ancestors of a node from immediate parent to root.
    pub fn ancestors(&self, id: NodeId) -> NodeResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = self.data(id)?.parent;
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Whether `node` is `root` or lies inside the subtree rooted at `root`.
    ///
    /// Unknown ids are never contained.
    pub fn contains(&self, root: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(current_id) = current {
            if current_id == root {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Depth-first pre-order traversal: the node, then each child subtree.
    pub fn depth_first_preorder(&self, id: NodeId) -> NodeResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let data = self.data(current)?;
            result.push(current);
            stack.extend(data.children.iter().rev().copied());
        }
        Ok(result)
    }

    /// Mark a node and its subtree attached.
    ///
    /// Returns the nodes whose lifecycle actually changed.
    pub fn attach(&mut self, id: NodeId) -> NodeResult<Vec<NodeId>> {
        self.set_lifecycle(id, Lifecycle::Attached)
    }

    /// Mark a node and its subtree detached.
    ///
    /// Returns the nodes whose lifecycle actually changed. Nodes that were
    /// never attached stay unattached.
    pub fn detach(&mut self, id: NodeId) -> NodeResult<Vec<NodeId>> {
        self.set_lifecycle(id, Lifecycle::Detached)
    }

    fn set_lifecycle(&mut self, id: NodeId, state: Lifecycle) -> NodeResult<Vec<NodeId>> {
        let subtree = self.depth_first_preorder(id)?;
        let mut changed = Vec::new();
        for node in subtree {
            if let Some(data) = self.nodes.get_mut(node) {
                let next = match (data.lifecycle, state) {
                    (Lifecycle::Unattached, Lifecycle::Detached) => continue,
                    (current, next) if current == next => continue,
                    (_, next) => next,
                };
                data.lifecycle = next;
                changed.push(node);
            }
        }
        tracing::debug!(target: targets::NODE, ?id, %state, changed = changed.len(), "lifecycle transition");
        Ok(changed)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of all nodes without a parent.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, d)| d.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}
