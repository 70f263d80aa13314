//! Scene graph aggregate
//!
//! The [`SceneGraph`] owns every node it creates; nodes are reached through
//! generation-checked [`NodeId`](crate::NodeId) handles.

mod arena;
mod node;
mod scene_graph;

pub use node::NodeRef;
pub use scene_graph::{create_default_scene_graph, DefaultSceneGraph, SceneGraph};
