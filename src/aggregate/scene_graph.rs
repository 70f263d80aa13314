//! Scene Graph Aggregate
//!
//! The scene graph workflow is based on callbacks:
//! - the creator implements [`ParameterFactory`] to describe which parameters
//!   each node type has, and hands it to the graph;
//! - clients create nodes, set their parameters and delete them;
//! - observers register callbacks and react to those changes.
//!
//! All operations take `&self`; share a graph between threads with `Arc`.

use super::arena::NodeArena;
use super::node::{Node, NodeRef, Retirement};
use crate::config::SceneGraphConfig;
use crate::errors::{Result, SceneGraphError};
use crate::factory::ParameterFactory;
use crate::handlers::{
    CallbackRegistry, OnNodeCreateCallback, OnNodeDeleteCallback, OnNodeParameterChangeCallback,
};
use crate::projections::GraphSummary;
use crate::value_objects::{CallbackId, CallbackKind, GraphId, NodeId, NodeKind, ParameterKey};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, trace, warn};

/// A set of typed nodes plus the observers watching them
pub struct SceneGraph<K, T> {
    id: GraphId,
    config: SceneGraphConfig,
    factory: Box<dyn ParameterFactory<K, T>>,
    nodes: RwLock<NodeArena<K, T>>,
    on_create: CallbackRegistry<T, OnNodeCreateCallback<K, T>>,
    on_delete: CallbackRegistry<T, OnNodeDeleteCallback<K, T>>,
    on_change: CallbackRegistry<T, OnNodeParameterChangeCallback<K, T>>,
}

/// Scene graph keyed by parameter name with numeric node types
pub type DefaultSceneGraph = SceneGraph<String, u32>;

/// Create a [`DefaultSceneGraph`] owning `factory`
pub fn create_default_scene_graph<F>(factory: F) -> DefaultSceneGraph
where
    F: ParameterFactory<String, u32> + 'static,
{
    SceneGraph::new(factory)
}

impl<K, T> SceneGraph<K, T>
where
    K: ParameterKey,
    T: NodeKind,
{
    /// Create a scene graph with a given parameter factory
    pub fn new<F>(factory: F) -> Self
    where
        F: ParameterFactory<K, T> + 'static,
    {
        Self::with_config(factory, SceneGraphConfig::default())
    }

    pub fn with_config<F>(factory: F, config: SceneGraphConfig) -> Self
    where
        F: ParameterFactory<K, T> + 'static,
    {
        let id = GraphId::new();
        debug!(graph_id = %id, ?config, "Scene graph created");

        Self {
            id,
            nodes: RwLock::new(NodeArena::with_capacity(config.initial_capacity)),
            config,
            factory: Box::new(factory),
            on_create: CallbackRegistry::new(CallbackKind::Create),
            on_delete: CallbackRegistry::new(CallbackKind::Delete),
            on_change: CallbackRegistry::new(CallbackKind::ParameterChange),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn config(&self) -> &SceneGraphConfig {
        &self.config
    }

    /// Create a node of a specified type
    ///
    /// The factory is asked for the node's parameters, the node is stored and
    /// the matching create callbacks are fired before the handle is returned.
    pub fn create_node(&self, node_type: T) -> Result<NodeId> {
        let parameters = self.factory.parameter_set(&node_type).inspect_err(|e| {
            warn!(graph_id = %self.id, ?node_type, error = %e, "Parameter factory failed");
        })?;

        let lock_types = self.config.lock_parameter_types;
        let node = self
            .nodes
            .write()
            .insert_with(|id| Node::new(id, node_type, parameters, lock_types));
        let node_id = node.id();
        debug!(graph_id = %self.id, %node_id, node_type = ?node.node_type(), "Node created");

        self.fire_node_created(&NodeRef::new(self, node));
        Ok(node_id)
    }

    /// Delete a node
    ///
    /// Fails with [`SceneGraphError::InvalidHandle`] if the handle does not
    /// refer to a live node of this graph, which includes deleting the same
    /// node twice. Delete callbacks run before the node is retired and can
    /// still read its parameters.
    pub fn delete_node(&self, node_id: NodeId) -> Result<()> {
        let removed = self.nodes.write().remove(node_id);
        let Some(node) = removed else {
            warn!(graph_id = %self.id, %node_id, "There is no such node to delete");
            return Err(SceneGraphError::InvalidHandle(node_id));
        };

        let node = NodeRef::new(self, node);
        let _retirement = Retirement(node.node());
        self.fire_node_deleted(&node);
        debug!(graph_id = %self.id, %node_id, node_type = ?node.node_type(), "Node deleted");
        Ok(())
    }

    /// Access a live node
    pub fn node(&self, node_id: NodeId) -> Result<NodeRef<'_, K, T>> {
        let node = self.nodes.read().get(node_id);
        node.map(|node| NodeRef::new(self, node))
            .ok_or(SceneGraphError::InvalidHandle(node_id))
    }

    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.read().contains(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    /// Handles of all live nodes, in slot order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.read().ids()
    }

    /// Handles of all live nodes of one type
    pub fn nodes_of_type(&self, node_type: &T) -> Vec<NodeId> {
        self.nodes
            .read()
            .nodes()
            .filter(|node| node.node_type() == node_type)
            .map(|node| node.id())
            .collect()
    }

    /// Register callback for a node creation
    ///
    /// An empty `filter` listens to every node type.
    pub fn register_on_node_create_callback<F, I>(&self, callback: F, filter: I) -> CallbackId
    where
        F: Fn(&NodeRef<'_, K, T>) + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        let filter: HashSet<T> = filter.into_iter().collect();
        let id = self.on_create.register(Box::new(callback), filter);
        debug!(graph_id = %self.id, callback_id = %id, "Callback registered");
        id
    }

    /// Register callback for a node deletion
    pub fn register_on_node_delete_callback<F, I>(&self, callback: F, filter: I) -> CallbackId
    where
        F: Fn(&NodeRef<'_, K, T>) + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        let filter: HashSet<T> = filter.into_iter().collect();
        let id = self.on_delete.register(Box::new(callback), filter);
        debug!(graph_id = %self.id, callback_id = %id, "Callback registered");
        id
    }

    /// Register parameter change callback
    pub fn register_on_node_parameter_change_callback<F, I>(
        &self,
        callback: F,
        filter: I,
    ) -> CallbackId
    where
        F: Fn(&NodeRef<'_, K, T>, &K) + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        let filter: HashSet<T> = filter.into_iter().collect();
        let id = self.on_change.register(Box::new(callback), filter);
        debug!(graph_id = %self.id, callback_id = %id, "Callback registered");
        id
    }

    /// Remove a previously registered callback
    ///
    /// Dispatches already in flight may still invoke it once.
    pub fn unregister_callback(&self, callback_id: CallbackId) -> bool {
        let removed = match callback_id.kind() {
            CallbackKind::Create => self.on_create.unregister(callback_id),
            CallbackKind::Delete => self.on_delete.unregister(callback_id),
            CallbackKind::ParameterChange => self.on_change.unregister(callback_id),
        };
        debug!(graph_id = %self.id, %callback_id, removed, "Callback unregistered");
        removed
    }

    /// Snapshot of node and callback counts
    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary::new(self.id);
        for node in self.nodes.read().nodes() {
            summary.record_node(format!("{:?}", node.node_type()));
        }
        summary.create_callbacks = self.on_create.len();
        summary.delete_callbacks = self.on_delete.len();
        summary.parameter_change_callbacks = self.on_change.len();
        summary
    }

    fn fire_node_created(&self, node: &NodeRef<'_, K, T>) {
        let callbacks = self.on_create.matching(node.node_type());
        trace!(
            graph_id = %self.id,
            node_id = %node.id(),
            callbacks = callbacks.len(),
            "Firing node create"
        );
        for entry in callbacks {
            (entry.callback())(node);
        }
    }

    fn fire_node_deleted(&self, node: &NodeRef<'_, K, T>) {
        let callbacks = self.on_delete.matching(node.node_type());
        trace!(
            graph_id = %self.id,
            node_id = %node.id(),
            callbacks = callbacks.len(),
            "Firing node delete"
        );
        for entry in callbacks {
            (entry.callback())(node);
        }
    }

    pub(crate) fn fire_parameter_changed(&self, node: &NodeRef<'_, K, T>, key: &K) {
        let callbacks = self.on_change.matching(node.node_type());
        trace!(
            graph_id = %self.id,
            node_id = %node.id(),
            parameter = ?key,
            callbacks = callbacks.len(),
            "Firing parameter change"
        );
        for entry in callbacks {
            (entry.callback())(node, key);
        }
    }
}

impl<K, T> Drop for SceneGraph<K, T> {
    fn drop(&mut self) {
        let remaining = self.nodes.get_mut().drain();
        if !remaining.is_empty() {
            debug!(graph_id = %self.id, count = remaining.len(), "Retiring remaining nodes");
        }
        for node in remaining {
            node.retire();
        }
    }
}

impl<K, T> fmt::Display for SceneGraph<K, T>
where
    K: ParameterKey,
    T: NodeKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl<K, T> fmt::Debug for SceneGraph<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("nodes", &self.nodes.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{FnParameterFactory, ParameterSet};
    use crate::parameter::Parameter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn graph() -> DefaultSceneGraph {
        create_default_scene_graph(FnParameterFactory::new(|_: &u32| {
            let mut params = ParameterSet::new();
            params.insert("type".to_string(), Parameter::new(5i32));
            params.insert("float_value".to_string(), Parameter::new(3.8f32));
            Ok(params)
        }))
    }

    #[test]
    fn test_create_and_delete() {
        let graph = graph();
        let id = graph.create_node(0).unwrap();

        assert_eq!(*graph.node(id).unwrap().node_type(), 0);
        assert!(graph.contains_node(id));
        assert_eq!(graph.node_count(), 1);

        graph.delete_node(id).unwrap();
        assert_eq!(
            graph.delete_node(id),
            Err(SceneGraphError::InvalidHandle(id))
        );
        assert!(graph.node(id).is_err());
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_stale_node_ref_is_rejected() {
        let graph = graph();
        let id = graph.create_node(0).unwrap();
        let node = graph.node(id).unwrap();

        graph.delete_node(id).unwrap();

        assert!(!node.is_live());
        assert_eq!(
            node.set_value("type", 1i32),
            Err(SceneGraphError::InvalidHandle(id))
        );
        assert!(node.get_value::<i32, _>("type").is_err());
    }

    #[test]
    fn test_delete_callback_reads_final_state() {
        let graph = graph();
        let seen = Arc::new(AtomicUsize::new(0));
        let c_seen = seen.clone();
        graph.register_on_node_delete_callback(
            move |node| {
                let value: i32 = node.get_value("type").unwrap();
                c_seen.store(value as usize, Ordering::SeqCst);
            },
            [],
        );

        let id = graph.create_node(0).unwrap();
        graph.node(id).unwrap().set_value("type", 77i32).unwrap();
        graph.delete_node(id).unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 77);
    }

    #[test]
    fn test_callback_can_reenter_graph() {
        let graph = graph();
        let companion = graph.create_node(9).unwrap();

        // Deleting a type-1 node takes its companion with it
        graph.register_on_node_delete_callback(
            move |node| {
                let _ = node.graph().delete_node(companion);
            },
            [1],
        );

        let id = graph.create_node(1).unwrap();
        graph.delete_node(id).unwrap();

        assert!(!graph.contains_node(companion));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_modifier_can_delete_its_node() {
        let graph = graph();
        let changes = Arc::new(AtomicUsize::new(0));
        let c_changes = changes.clone();
        graph.register_on_node_parameter_change_callback(
            move |_, _| {
                c_changes.fetch_add(1, Ordering::SeqCst);
            },
            [],
        );
        let id = graph.create_node(0).unwrap();
        let node = graph.node(id).unwrap();

        let result = node.modify_value("type", |v: &mut i32| {
            *v += 1;
            node.graph().delete_node(id)
        });

        assert_eq!(result, Err(SceneGraphError::InvalidHandle(id)));
        assert!(!node.is_live());
        assert!(!graph.contains_node(id));
        assert_eq!(changes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reader_can_delete_its_node() {
        let graph = graph();
        let id = graph.create_node(0).unwrap();
        let node = graph.node(id).unwrap();

        let result = node.with_value("float_value", |_: &f32| node.graph().delete_node(id));

        assert_eq!(result, Ok(Ok(())));
        assert!(!node.is_live());
        assert_eq!(
            node.get_value::<f32, _>("float_value"),
            Err(SceneGraphError::InvalidHandle(id))
        );
    }

    #[test]
    fn test_unregister_stops_dispatch() {
        let graph = graph();
        let count = Arc::new(AtomicUsize::new(0));
        let c_count = count.clone();
        let id = graph.register_on_node_create_callback(
            move |_| {
                c_count.fetch_add(1, Ordering::SeqCst);
            },
            [],
        );

        graph.create_node(0).unwrap();
        assert!(graph.unregister_callback(id));
        graph.create_node(0).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!graph.unregister_callback(id));
    }

    #[test]
    fn test_lock_parameter_types() {
        let graph = SceneGraph::with_config(
            FnParameterFactory::new(|_: &u32| {
                let mut params = ParameterSet::new();
                params.insert("type".to_string(), Parameter::new(5i32));
                Ok(params)
            }),
            SceneGraphConfig::new().with_lock_parameter_types(true),
        );
        let node = graph.node(graph.create_node(0).unwrap()).unwrap();

        assert!(node.set_value("type", 6i32).is_ok());
        assert!(matches!(
            node.set_value("type", 6.0f32),
            Err(SceneGraphError::TypeMismatch { .. })
        ));
        assert_eq!(node.get_value::<i32, _>("type").unwrap(), 6);
    }

    #[test]
    fn test_nodes_of_type_and_summary() {
        let graph = graph();
        let a = graph.create_node(1).unwrap();
        graph.create_node(2).unwrap();
        let c = graph.create_node(1).unwrap();

        let mut ones = graph.nodes_of_type(&1);
        ones.sort();
        assert_eq!(ones, vec![a, c]);

        let summary = graph.summary();
        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.nodes_by_type["1"], 2);
        assert_eq!(summary.graph_id, graph.id());
    }

    #[test]
    fn test_drop_fires_no_delete_callbacks() {
        let graph = graph();
        let deleted = Arc::new(AtomicUsize::new(0));
        let c_deleted = deleted.clone();
        graph.register_on_node_delete_callback(
            move |_| {
                c_deleted.fetch_add(1, Ordering::SeqCst);
            },
            [],
        );

        for node_type in 0..4 {
            graph.create_node(node_type).unwrap();
        }
        drop(graph);

        assert_eq!(deleted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_factory_failure_propagates() {
        let graph: DefaultSceneGraph = SceneGraph::new(FnParameterFactory::new(|t: &u32| {
            Err(SceneGraphError::Factory(format!("unknown node type {t}")))
        }));

        assert_eq!(
            graph.create_node(4),
            Err(SceneGraphError::Factory("unknown node type 4".to_string()))
        );
        assert_eq!(graph.node_count(), 0);
    }
}
