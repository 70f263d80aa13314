//! Scene graph events
//!
//! Records of what observers were told. The graph itself dispatches callbacks
//! directly; these types let an observer keep or forward what it saw.

use crate::value_objects::{GraphId, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something that happened to a node of a scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneGraphEvent<K, T> {
    /// A node was created
    NodeCreated {
        graph_id: GraphId,
        node_id: NodeId,
        node_type: T,
        occurred_at: DateTime<Utc>,
    },
    /// A node is being deleted
    NodeDeleted {
        graph_id: GraphId,
        node_id: NodeId,
        node_type: T,
        occurred_at: DateTime<Utc>,
    },
    /// A parameter of a node was set or modified
    ParameterChanged {
        graph_id: GraphId,
        node_id: NodeId,
        node_type: T,
        parameter: K,
        occurred_at: DateTime<Utc>,
    },
}

impl<K, T> SceneGraphEvent<K, T> {
    pub fn graph_id(&self) -> GraphId {
        match self {
            Self::NodeCreated { graph_id, .. }
            | Self::NodeDeleted { graph_id, .. }
            | Self::ParameterChanged { graph_id, .. } => *graph_id,
        }
    }

    pub fn node_id(&self) -> NodeId {
        match self {
            Self::NodeCreated { node_id, .. }
            | Self::NodeDeleted { node_id, .. }
            | Self::ParameterChanged { node_id, .. } => *node_id,
        }
    }

    pub fn node_type(&self) -> &T {
        match self {
            Self::NodeCreated { node_type, .. }
            | Self::NodeDeleted { node_type, .. }
            | Self::ParameterChanged { node_type, .. } => node_type,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::NodeCreated { occurred_at, .. }
            | Self::NodeDeleted { occurred_at, .. }
            | Self::ParameterChanged { occurred_at, .. } => *occurred_at,
        }
    }

    /// Stable name of the event kind
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NodeCreated { .. } => "node_created",
            Self::NodeDeleted { .. } => "node_deleted",
            Self::ParameterChanged { .. } => "parameter_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let graph_id = GraphId::new();
        let event: SceneGraphEvent<String, u32> = SceneGraphEvent::ParameterChanged {
            graph_id,
            node_id: NodeId::new(2, 9),
            node_type: 4,
            parameter: "type".to_string(),
            occurred_at: Utc::now(),
        };

        assert_eq!(event.graph_id(), graph_id);
        assert_eq!(event.node_id(), NodeId::new(2, 9));
        assert_eq!(*event.node_type(), 4);
        assert_eq!(event.event_type(), "parameter_changed");
    }

    #[test]
    fn test_tagged_serialization() {
        let event: SceneGraphEvent<String, u32> = SceneGraphEvent::NodeCreated {
            graph_id: GraphId::new(),
            node_id: NodeId::new(0, 1),
            node_type: 0,
            occurred_at: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "node_created");
        assert_eq!(json["node_type"], 0);

        let back: SceneGraphEvent<String, u32> = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
