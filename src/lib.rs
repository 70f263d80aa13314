//! Scene graph domain for the Composable Information Machine
//!
//! A scene graph holds nodes of several kinds, each carrying named parameters
//! of arbitrary type. Which parameters a node has is decided by a pluggable
//! [`ParameterFactory`]; observers registered on the graph are notified when
//! nodes are created, deleted, or have a parameter changed.
//!
//! ```
//! use cim_scene_graph::{create_default_scene_graph, Parameter, TemplateParameterFactory};
//!
//! let factory = TemplateParameterFactory::new().with_fallback([
//!     ("type".to_string(), Parameter::new(5i32)),
//!     ("float_value".to_string(), Parameter::new(3.8f32)),
//! ]);
//! let graph = create_default_scene_graph(factory);
//!
//! let id = graph.create_node(0).unwrap();
//! let node = graph.node(id).unwrap();
//! node.set_value("type", 10i32).unwrap();
//! assert_eq!(node.get_value::<i32, _>("type").unwrap(), 10);
//!
//! graph.delete_node(id).unwrap();
//! assert!(graph.delete_node(id).is_err());
//! ```

pub mod aggregate;
pub mod config;
pub mod errors;
pub mod events;
pub mod factory;
pub mod handlers;
pub mod parameter;
pub mod projections;
pub mod value_objects;

// Re-export main types
pub use aggregate::{create_default_scene_graph, DefaultSceneGraph, NodeRef, SceneGraph};
pub use config::SceneGraphConfig;
pub use errors::{Result, SceneGraphError};
pub use events::SceneGraphEvent;
pub use factory::{FnParameterFactory, ParameterFactory, ParameterSet, TemplateParameterFactory};
pub use handlers::{
    CallbackRegistry, FilteredCallback, OnNodeCreateCallback, OnNodeDeleteCallback,
    OnNodeParameterChangeCallback,
};
pub use parameter::Parameter;
pub use projections::{EventLog, GraphSummary};
pub use value_objects::{CallbackId, CallbackKind, GraphId, NodeId, NodeKind, ParameterKey};
