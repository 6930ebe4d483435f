//! Layout-Node Materialization, Straightening, Joint Routing, and
//! Verticalization
//!
//! Components D through G of the layout pipeline, consuming the
//! loop-classified, layered [`crate::graph::Graph`] built by
//! [`crate::graph::Graph::build`] and producing the geometry an external
//! renderer draws.

mod joints;
mod materializer;
mod node;
mod straightener;
mod verticalizer;

pub use node::{LayoutGraph, LayoutNode, NodeFlags, NodeId, NodeKind};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::Graph;

/// Runs components D, E, F, and G in order over a loop-classified, layered
/// graph, producing the final geometry.
pub fn run(graph: &Graph, config: &LayoutConfig) -> Result<LayoutGraph, LayoutError> {
    log::debug!("materializing layout nodes for {} blocks", graph.records.len());
    let materialized = materializer::materialize(graph)?;
    let mut layout = materialized.graph;

    log::debug!(
        "straightening {} nodes across {} layers",
        layout.nodes.len(),
        layout.nodes_by_layer.len()
    );
    straightener::straighten(graph, &mut layout, &materialized.block_node, config);

    log::debug!("routing joints");
    joints::route(&mut layout, config);

    log::debug!("assigning y-coordinates");
    verticalizer::verticalize(&mut layout, config);

    Ok(layout)
}
