//! Graph summary projection
//!
//! Point-in-time counts of nodes and registered callbacks.

use crate::value_objects::GraphId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Summary information about a scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Unique identifier of the graph
    pub graph_id: GraphId,
    /// Current number of live nodes
    pub node_count: usize,
    /// Live nodes per node type, keyed by the type's debug rendering
    pub nodes_by_type: BTreeMap<String, usize>,
    /// Registered create callbacks
    pub create_callbacks: usize,
    /// Registered delete callbacks
    pub delete_callbacks: usize,
    /// Registered parameter change callbacks
    pub parameter_change_callbacks: usize,
    /// When the summary was taken
    pub taken_at: DateTime<Utc>,
}

impl GraphSummary {
    pub fn new(graph_id: GraphId) -> Self {
        Self {
            graph_id,
            node_count: 0,
            nodes_by_type: BTreeMap::new(),
            create_callbacks: 0,
            delete_callbacks: 0,
            parameter_change_callbacks: 0,
            taken_at: Utc::now(),
        }
    }

    pub(crate) fn record_node(&mut self, node_type: String) {
        self.node_count += 1;
        *self.nodes_by_type.entry(node_type).or_insert(0) += 1;
    }

    /// Total number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.create_callbacks + self.delete_callbacks + self.parameter_change_callbacks
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene graph {}: {} nodes", self.graph_id, self.node_count)?;
        if !self.nodes_by_type.is_empty() {
            let per_type: Vec<String> = self
                .nodes_by_type
                .iter()
                .map(|(node_type, count)| format!("{node_type}={count}"))
                .collect();
            write!(f, " [{}]", per_type.join(", "))?;
        }
        write!(
            f,
            ", callbacks create={} delete={} change={}",
            self.create_callbacks, self.delete_callbacks, self.parameter_change_callbacks
        )
    }
}
