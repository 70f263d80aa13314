//! Scene graph configuration

use serde::{Deserialize, Serialize};

/// Arena slots reserved up front
pub const DEFAULT_INITIAL_CAPACITY: usize = 128;

/// Tunables applied when a [`SceneGraph`](crate::SceneGraph) is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneGraphConfig {
    /// Lock the type of every factory-produced parameter at node creation
    pub lock_parameter_types: bool,
    /// Number of node slots to preallocate
    pub initial_capacity: usize,
}

impl Default for SceneGraphConfig {
    fn default() -> Self {
        Self {
            lock_parameter_types: false,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl SceneGraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lock_parameter_types(mut self, lock: bool) -> Self {
        self.lock_parameter_types = lock;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
