//! Scene graph value objects
//!
//! Value objects are immutable identifiers compared by value. Node handles are
//! generation-checked so that a handle to a deleted node is detectably stale
//! instead of silently aliasing a newer node in the same slot.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::hash::Hash;
use uuid::Uuid;

/// Bounds required of parameter keys
pub trait ParameterKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<K> ParameterKey for K where K: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Bounds required of node type tags
pub trait NodeKind: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> NodeKind for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Opaque handle to a node owned by a [`SceneGraph`](crate::SceneGraph)
///
/// `index` locates the arena slot, `generation` is unique for the lifetime of
/// the graph, so a handle never refers to two different nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: usize,
    generation: u64,
}

impl NodeId {
    /// Create a handle from raw parts
    pub fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    /// Arena slot of the node
    pub fn index(&self) -> usize {
        self.index
    }

    /// Generation stamp of the node
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Identity of a scene graph instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphId(Uuid);

impl GraphId {
    /// Create a new random graph ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which registry a callback was registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackKind {
    /// Fired after a node is created
    Create,
    /// Fired before a node is destroyed
    Delete,
    /// Fired after a parameter value changed
    ParameterChange,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackKind::Create => write!(f, "create"),
            CallbackKind::Delete => write!(f, "delete"),
            CallbackKind::ParameterChange => write!(f, "parameter_change"),
        }
    }
}

/// Token returned by callback registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId {
    kind: CallbackKind,
    serial: u64,
}

impl CallbackId {
    pub(crate) fn new(kind: CallbackKind, serial: u64) -> Self {
        Self { kind, serial }
    }

    /// Registry this callback belongs to
    pub fn kind(&self) -> CallbackKind {
        self.kind
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_identity() {
        let a = NodeId::new(0, 1);
        let b = NodeId::new(0, 2);

        // Same slot, different generation: different nodes
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
        assert_eq!(a.to_string(), "0v1");
    }

    #[test]
    fn test_node_id_serde() {
        let id = NodeId::new(4, 42);
        let json = serde_json::to_string(&id).unwrap();
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_graph_ids_are_unique() {
        assert_ne!(GraphId::new(), GraphId::new());
    }

    #[test]
    fn test_callback_id_display() {
        let id = CallbackId::new(CallbackKind::ParameterChange, 3);
        assert_eq!(id.kind(), CallbackKind::ParameterChange);
        assert_eq!(id.to_string(), "parameter_change#3");
    }
}
