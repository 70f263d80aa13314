//! Generation-checked node storage

use super::node::Node;
use crate::value_objects::NodeId;
use slab::Slab;
use std::sync::Arc;

/// Slots of live nodes. Slots are reused, generations are not, so a stale
/// [`NodeId`] never resolves to a newer node.
pub(crate) struct NodeArena<K, T> {
    slots: Slab<Arc<Node<K, T>>>,
    next_generation: u64,
}

impl<K, T> NodeArena<K, T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
            next_generation: 1,
        }
    }

    /// Allocate a handle, build the node for it and store it
    pub(crate) fn insert_with<F>(&mut self, build: F) -> Arc<Node<K, T>>
    where
        F: FnOnce(NodeId) -> Node<K, T>,
    {
        let entry = self.slots.vacant_entry();
        let id = NodeId::new(entry.key(), self.next_generation);
        self.next_generation += 1;

        let node = Arc::new(build(id));
        entry.insert(Arc::clone(&node));
        node
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<Arc<Node<K, T>>> {
        self.slots
            .get(id.index())
            .filter(|node| node.id() == id)
            .cloned()
    }

    /// Remove the node if `id` still refers to it
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Arc<Node<K, T>>> {
        let current = self.slots.get(id.index())?;
        if current.id() != id {
            return None;
        }
        self.slots.try_remove(id.index())
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|node| node.id() == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn ids(&self) -> Vec<NodeId> {
        self.slots.iter().map(|(_, node)| node.id()).collect()
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Arc<Node<K, T>>> {
        self.slots.iter().map(|(_, node)| node)
    }

    /// Take every node out of the arena
    pub(crate) fn drain(&mut self) -> Vec<Arc<Node<K, T>>> {
        self.slots.drain().collect()
    }
}
