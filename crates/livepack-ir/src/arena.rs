//! The arena that owns every `Node`.
//!
//! One arena per `Serializer` run (per §5, no shared mutable state across
//! instances). Nodes are appended only; in-place edits go through
//! `NodeArena::replace`, which is how edge resolution overwrites a
//! `RecordRef`/`CircularPlaceholder` hole once its target is known.

use crate::node::{Node, NodeId};

#[derive(Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Overwrite the node at `id` in place. Used to patch a `RecordRef` or
    /// `CircularPlaceholder` hole once its target identifier/injector is
    /// known, without needing to rewrite every node that referenced `id`.
    pub fn replace(&mut self, id: NodeId, node: Node) {
        self.nodes[id.index()] = node;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn alloc_then_replace_preserves_id() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(Node::CircularPlaceholder);
        arena.replace(id, Node::Ident("a".into()));
        assert!(matches!(arena.get(id), Node::Ident(name) if name == "a"));
    }
}
