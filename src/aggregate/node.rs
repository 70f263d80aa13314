//! Scene graph nodes
//!
//! A node owns a fixed set of named parameters chosen by the factory at
//! creation. Values may be replaced or edited in place, keys never change.
//! Clients reach a node through a [`NodeRef`], which routes every write back
//! to the owning graph so that observers are notified.

use super::SceneGraph;
use crate::errors::{Result, SceneGraphError};
use crate::factory::ParameterSet;
use crate::parameter::Parameter;
use crate::value_objects::{NodeId, NodeKind, ParameterKey};
use parking_lot::{RwLock, RwLockReadGuard};
use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeState {
    Live,
    Deleted,
}

/// Node storage shared between the arena and outstanding [`NodeRef`]s
pub(crate) struct Node<K, T> {
    id: NodeId,
    node_type: T,
    // Keys are fixed at creation; each value has its own lock so writers to
    // different parameters do not contend.
    parameters: HashMap<K, RwLock<Parameter>>,
    state: RwLock<NodeState>,
}

impl<K, T> Node<K, T> {
    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn node_type(&self) -> &T {
        &self.node_type
    }

    /// Mark the node deleted. Waits for in-flight reads and writes.
    pub(crate) fn retire(&self) {
        *self.state.write() = NodeState::Deleted;
    }

    pub(crate) fn is_live(&self) -> bool {
        *self.state.read_recursive() == NodeState::Live
    }

    /// Shared liveness guard held across a parameter access
    fn live(&self) -> Result<RwLockReadGuard<'_, NodeState>> {
        let state = self.state.read_recursive();
        match *state {
            NodeState::Live => Ok(state),
            NodeState::Deleted => Err(SceneGraphError::InvalidHandle(self.id)),
        }
    }

    /// Liveness check that holds nothing afterwards
    fn ensure_live(&self) -> Result<()> {
        self.live().map(drop)
    }
}

impl<K, T> Node<K, T>
where
    K: ParameterKey,
{
    pub(crate) fn new(
        id: NodeId,
        node_type: T,
        parameters: ParameterSet<K>,
        lock_types: bool,
    ) -> Self {
        let parameters = parameters
            .into_iter()
            .map(|(key, mut param)| {
                if lock_types {
                    param.set_type_lock(true);
                }
                (key, RwLock::new(param))
            })
            .collect();

        Self {
            id,
            node_type,
            parameters,
            state: RwLock::new(NodeState::Live),
        }
    }

    fn slot<Q>(&self, key: &Q) -> Result<(&K, &RwLock<Parameter>)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.parameters
            .get_key_value(key)
            .ok_or_else(|| SceneGraphError::parameter_not_found(&key))
    }
}

/// Retires a node when dropped, including on unwind out of a delete callback
pub(crate) struct Retirement<'a, K, T>(pub(crate) &'a Node<K, T>);

impl<K, T> Drop for Retirement<'_, K, T> {
    fn drop(&mut self) {
        self.0.retire();
    }
}

/// Access to a node of a [`SceneGraph`]
///
/// A `NodeRef` stays usable only while its node is live. Once the node has
/// been deleted every parameter operation fails with
/// [`SceneGraphError::InvalidHandle`].
pub struct NodeRef<'g, K, T> {
    graph: &'g SceneGraph<K, T>,
    node: Arc<Node<K, T>>,
}

impl<'g, K, T> NodeRef<'g, K, T> {
    pub(crate) fn new(graph: &'g SceneGraph<K, T>, node: Arc<Node<K, T>>) -> Self {
        Self { graph, node }
    }

    pub(crate) fn node(&self) -> &Node<K, T> {
        &self.node
    }

    /// Handle of this node
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Node type tag, fixed at creation
    pub fn node_type(&self) -> &T {
        self.node.node_type()
    }

    /// Graph that owns this node
    pub fn graph(&self) -> &'g SceneGraph<K, T> {
        self.graph
    }

    /// Whether the node has not been deleted
    pub fn is_live(&self) -> bool {
        self.node.is_live()
    }
}

impl<'g, K, T> NodeRef<'g, K, T>
where
    K: ParameterKey,
    T: NodeKind,
{
    /// Names of all parameters of this node
    pub fn parameter_names(&self) -> Vec<K> {
        self.node.parameters.keys().cloned().collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.node.parameters.len()
    }

    pub fn contains_parameter<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.node.parameters.contains_key(key)
    }

    /// Name of the type currently held by a parameter
    pub fn parameter_type_name<Q>(&self, key: &Q) -> Result<&'static str>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let _live = self.node.live()?;
        let (_, slot) = self.node.slot(key)?;
        let type_name = slot.read_recursive().type_name();
        Ok(type_name)
    }

    /// Replace the value of an existing parameter
    ///
    /// Fails with [`SceneGraphError::ParameterNotFound`] if the node has no
    /// such parameter; parameters are never added after creation. Fires the
    /// parameter change callbacks once on success.
    pub fn set_value<Q, V>(&self, key: &Q, value: V) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
        V: Any + Clone + Send + Sync,
    {
        let changed = {
            let _live = self.node.live()?;
            let (stored_key, slot) = self.node.slot(key)?;
            slot.write().set(value)?;
            stored_key
        };
        self.graph.fire_parameter_changed(self, changed);
        Ok(())
    }

    /// Copy a whole [`Parameter`] into an existing parameter
    pub fn set_parameter<Q>(&self, key: &Q, value: &Parameter) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let changed = {
            let _live = self.node.live()?;
            let (stored_key, slot) = self.node.slot(key)?;
            slot.write().assign(value)?;
            stored_key
        };
        self.graph.fire_parameter_changed(self, changed);
        Ok(())
    }

    /// Edit a parameter in place through `modifier`
    ///
    /// Useful for large values such as lists, where replacing the whole value
    /// would be wasteful. The parameter is write-locked while `modifier` runs,
    /// so `modifier` must not access the same parameter, directly or through
    /// the callbacks it triggers. It may delete this node; the call then
    /// fails with [`SceneGraphError::InvalidHandle`] and fires nothing.
    /// Fires the parameter change callbacks once on success.
    pub fn modify_value<V, Q, R, F>(&self, key: &Q, modifier: F) -> Result<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
        V: Any,
        F: FnOnce(&mut V) -> R,
    {
        // The state guard is never held across the modifier
        self.node.ensure_live()?;
        let (changed, slot) = self.node.slot(key)?;
        let result = slot.write().modify(modifier)?;

        self.node.ensure_live()?;
        self.graph.fire_parameter_changed(self, changed);
        Ok(result)
    }

    /// Copy of a parameter's value as `V`
    pub fn get_value<V, Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
        V: Any + Clone,
    {
        self.with_value(key, |value: &V| value.clone())
    }

    /// Borrow a parameter's value as `V` for the duration of `reader`
    ///
    /// `reader` may call back into the graph, including deleting this node.
    pub fn with_value<V, Q, R, F>(&self, key: &Q, reader: F) -> Result<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
        V: Any,
        F: FnOnce(&V) -> R,
    {
        self.node.ensure_live()?;
        let (_, slot) = self.node.slot(key)?;
        let param = slot.read_recursive();
        param.get::<V>().map(reader)
    }

    /// Copy of a whole parameter, including its type lock
    pub fn parameter<Q>(&self, key: &Q) -> Result<Parameter>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let _live = self.node.live()?;
        let (_, slot) = self.node.slot(key)?;
        let param = slot.read_recursive().clone();
        Ok(param)
    }
}

impl<K, T> Clone for NodeRef<'_, K, T> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            node: Arc::clone(&self.node),
        }
    }
}

impl<K, T: Debug> Debug for NodeRef<'_, K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.node.id())
            .field("node_type", &self.node.node_type())
            .field("live", &self.node.is_live())
            .finish()
    }
}

impl<K, T: Debug> fmt::Display for NodeRef<'_, K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node {} (type {:?}, {} parameters)",
            self.node.id(),
            self.node.node_type(),
            self.node.parameters.len()
        )
    }
}
