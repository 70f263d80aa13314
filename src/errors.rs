//! Scene graph errors
//!
//! All error conditions are local and recoverable: the graph stays usable after
//! any of them is returned.

use crate::value_objects::NodeId;

/// Errors that can occur in scene graph operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneGraphError {
    /// The node has no parameter under the requested key
    #[error("Requested parameter not found: {0}")]
    ParameterNotFound(String),

    /// The requested type does not match the held one, or a locked
    /// parameter was assigned a value of a different type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type requested by the caller
        expected: &'static str,
        /// Type currently held by the parameter
        found: &'static str,
    },

    /// The handle does not refer to a live node of this graph
    #[error("There is no such node: {0}")]
    InvalidHandle(NodeId),

    /// The parameter factory could not produce a parameter set
    #[error("Parameter factory failed: {0}")]
    Factory(String),
}

impl SceneGraphError {
    pub(crate) fn parameter_not_found(key: &impl std::fmt::Debug) -> Self {
        Self::ParameterNotFound(format!("{key:?}"))
    }
}

/// Result type for scene graph operations
pub type Result<T> = std::result::Result<T, SceneGraphError>;
