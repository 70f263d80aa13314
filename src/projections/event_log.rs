//! Event log projection
//!
//! An observer that records every event it is notified of, in dispatch order.

use crate::aggregate::SceneGraph;
use crate::events::SceneGraphEvent;
use crate::value_objects::{CallbackId, NodeKind, ParameterKey};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records the create, delete and parameter change events of a graph
pub struct EventLog<K, T> {
    events: Arc<Mutex<Vec<SceneGraphEvent<K, T>>>>,
    callbacks: Vec<CallbackId>,
}

impl<K, T> EventLog<K, T>
where
    K: ParameterKey,
    T: NodeKind,
{
    /// Register on all three callback registries of `graph`
    ///
    /// `filter` restricts the node types recorded; empty records every type.
    pub fn attach<I>(graph: &SceneGraph<K, T>, filter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let filter: Vec<T> = filter.into_iter().collect();
        let events = Arc::new(Mutex::new(Vec::new()));

        let c_events = Arc::clone(&events);
        let on_create = graph.register_on_node_create_callback(
            move |node| {
                c_events.lock().push(SceneGraphEvent::NodeCreated {
                    graph_id: node.graph().id(),
                    node_id: node.id(),
                    node_type: node.node_type().clone(),
                    occurred_at: Utc::now(),
                });
            },
            filter.clone(),
        );

        let c_events = Arc::clone(&events);
        let on_delete = graph.register_on_node_delete_callback(
            move |node| {
                c_events.lock().push(SceneGraphEvent::NodeDeleted {
                    graph_id: node.graph().id(),
                    node_id: node.id(),
                    node_type: node.node_type().clone(),
                    occurred_at: Utc::now(),
                });
            },
            filter.clone(),
        );

        let c_events = Arc::clone(&events);
        let on_change = graph.register_on_node_parameter_change_callback(
            move |node, key: &K| {
                c_events.lock().push(SceneGraphEvent::ParameterChanged {
                    graph_id: node.graph().id(),
                    node_id: node.id(),
                    node_type: node.node_type().clone(),
                    parameter: key.clone(),
                    occurred_at: Utc::now(),
                });
            },
            filter,
        );

        Self {
            events,
            callbacks: vec![on_create, on_delete, on_change],
        }
    }

    /// Unregister from `graph`; returns how many callbacks were removed
    pub fn detach(&self, graph: &SceneGraph<K, T>) -> usize {
        self.callbacks
            .iter()
            .filter(|id| graph.unregister_callback(**id))
            .count()
    }
}

impl<K: Clone, T: Clone> EventLog<K, T> {
    /// Copy of the recorded events
    pub fn events(&self) -> Vec<SceneGraphEvent<K, T>> {
        self.events.lock().clone()
    }
}

impl<K, T> EventLog<K, T> {
    /// Take the recorded events, leaving the log empty
    pub fn drain(&self) -> Vec<SceneGraphEvent<K, T>> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::TemplateParameterFactory;
    use crate::parameter::Parameter;

    fn graph() -> SceneGraph<&'static str, u32> {
        SceneGraph::new(
            TemplateParameterFactory::new().with_fallback([("visible", Parameter::new(true))]),
        )
    }

    #[test]
    fn test_records_in_dispatch_order() {
        let graph = graph();
        let log = EventLog::attach(&graph, []);

        let id = graph.create_node(0).unwrap();
        graph.node(id).unwrap().set_value("visible", false).unwrap();
        graph.delete_node(id).unwrap();

        let kinds: Vec<&str> = log.events().iter().map(|e| e.event_type()).collect();
        assert_eq!(kinds, vec!["node_created", "parameter_changed", "node_deleted"]);
        assert!(log.events().iter().all(|e| e.node_id() == id));
    }

    #[test]
    fn test_filter_and_drain() {
        let graph = graph();
        let log = EventLog::attach(&graph, [1]);

        graph.create_node(0).unwrap();
        graph.create_node(1).unwrap();

        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(*drained[0].node_type(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_detach() {
        let graph = graph();
        let log = EventLog::attach(&graph, []);

        assert_eq!(log.detach(&graph), 3);
        graph.create_node(0).unwrap();
        assert_eq!(log.len(), 0);
        assert_eq!(graph.summary().callback_count(), 0);
    }
}
