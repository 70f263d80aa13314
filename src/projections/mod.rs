//! Scene graph projections
//!
//! Read-side views built from a graph's state or from the events it fires.

pub mod event_log;
pub mod graph_summary;

pub use event_log::EventLog;
pub use graph_summary::GraphSummary;
