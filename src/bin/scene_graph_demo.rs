//! Scene graph walkthrough
//!
//! Builds a small scene, wires observers, mutates and deletes nodes, then
//! prints what the observers saw and the final graph summary as JSON.
//! Set `RUST_LOG=cim_scene_graph=trace` to watch the dispatch.

use anyhow::Context;
use cim_scene_graph::{
    create_default_scene_graph, EventLog, Parameter, SceneGraphError, TemplateParameterFactory,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const MESH: u32 = 0;
const LIGHT: u32 = 1;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let factory = TemplateParameterFactory::new()
        .with_template(
            MESH,
            [
                ("type".to_string(), Parameter::new(5i32)),
                ("float_value".to_string(), Parameter::new(3.8f32)),
                ("indices".to_string(), Parameter::new(Vec::<u32>::new())),
            ],
        )
        .with_template(
            LIGHT,
            [
                ("intensity".to_string(), Parameter::new(1.0f32)),
                ("color".to_string(), Parameter::new([1.0f32, 1.0, 1.0])),
            ],
        );
    let graph = create_default_scene_graph(factory);
    let log = EventLog::attach(&graph, []);

    let light_changes = Arc::new(AtomicUsize::new(0));
    let c_light_changes = Arc::clone(&light_changes);
    graph.register_on_node_parameter_change_callback(
        move |node, key| {
            c_light_changes.fetch_add(1, Ordering::Relaxed);
            info!(node_id = %node.id(), parameter = %key, "Light changed");
        },
        [LIGHT],
    );

    let mesh_id = graph.create_node(MESH).context("creating mesh")?;
    let light_id = graph.create_node(LIGHT).context("creating light")?;

    let mesh = graph.node(mesh_id)?;
    mesh.set_value("type", 10i32)?;
    mesh.modify_value("indices", |indices: &mut Vec<u32>| {
        indices.extend([0, 1, 2, 2, 3, 0]);
    })?;
    info!(
        node = %mesh,
        indices = mesh.with_value("indices", |indices: &Vec<u32>| indices.len())?,
        "Mesh updated"
    );

    let light = graph.node(light_id)?;
    light.set_value("intensity", 0.25f32)?;
    if let Err(SceneGraphError::ParameterNotFound(key)) = light.set_value("radius", 2.0f32) {
        info!(%key, "Lights have no radius");
    }

    graph.delete_node(mesh_id)?;
    if let Err(e) = graph.delete_node(mesh_id) {
        info!(error = %e, "Second delete rejected");
    }

    println!("Observed {} events:", log.len());
    for event in log.events() {
        println!("  {} {} (type {})", event.event_type(), event.node_id(), event.node_type());
    }
    println!("Light parameter changes: {}", light_changes.load(Ordering::Relaxed));
    println!("{graph}");
    println!("{}", serde_json::to_string_pretty(&graph.summary())?);

    Ok(())
}
