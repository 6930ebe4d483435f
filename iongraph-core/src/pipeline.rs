//! Complete Layout Pipeline
//!
//! Orchestrates the full layout of one optimization pass from raw blocks to
//! renderer-ready geometry.
//!
//! # Pipeline Stages
//! 1. **Graph Preparation**: build adjacency, locate loop headers and their backedges.
//! 2. **Loop Classification**: assign every block its innermost loop id.
//! 3. **Layering**: assign every block an integer layer.
//! 4. **Materialization**: create block and dummy layout nodes.
//! 5. **Straightening**: assign x-coordinates.
//! 6. **Joint Routing**: resolve horizontal edge segments into tracks.
//! 7. **Verticalization**: assign y-coordinates and the final bounding box.

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::Graph;
use crate::layout::{self, LayoutGraph};
use crate::model::Pass;

/// Geometry for both intermediate representations of one pass.
#[derive(Debug, Clone)]
pub struct PassLayout {
    pub mir: LayoutGraph,
    pub lir: LayoutGraph,
}

/// Statistics collected while laying out a pass, surfaced for diagnostics
/// and for the CLI's summary output.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PipelineStats {
    pub mir_blocks: usize,
    pub lir_blocks: usize,
    pub mir_layers: usize,
    pub lir_layers: usize,
    pub mir_dummy_nodes: usize,
    pub lir_dummy_nodes: usize,
}

/// Layout pipeline orchestrator.
pub struct LayoutPipeline;

impl LayoutPipeline {
    /// Lays out both the `mir` and `lir` block lists of one pass.
    ///
    /// # Errors
    /// Returns the first malformed-IR condition found in either block list;
    /// per the error handling design, no partial geometry is returned
    /// alongside an error.
    pub fn run(pass: &Pass, config: &LayoutConfig) -> Result<(PassLayout, PipelineStats), LayoutError> {
        log::info!("laying out pass: {} mir blocks, {} lir blocks", pass.mir.blocks.len(), pass.lir.blocks.len());

        let mir = Self::run_one("mir", pass.mir.blocks.clone(), config)?;
        let lir = Self::run_one("lir", pass.lir.blocks.clone(), config)?;

        let stats = PipelineStats {
            mir_blocks: pass.mir.blocks.len(),
            lir_blocks: pass.lir.blocks.len(),
            mir_layers: mir.nodes_by_layer.len(),
            lir_layers: lir.nodes_by_layer.len(),
            mir_dummy_nodes: mir.nodes.iter().filter(|n| n.is_dummy()).count(),
            lir_dummy_nodes: lir.nodes.iter().filter(|n| n.is_dummy()).count(),
        };

        log::info!(
            "layout complete: mir {} layers / {} dummies, lir {} layers / {} dummies",
            stats.mir_layers, stats.mir_dummy_nodes, stats.lir_layers, stats.lir_dummy_nodes
        );

        Ok((PassLayout { mir, lir }, stats))
    }

    fn run_one(
        which: &str,
        blocks: Vec<crate::model::Block>,
        config: &LayoutConfig,
    ) -> Result<LayoutGraph, LayoutError> {
        log::debug!("[{which}] stage: graph preparation, loop classification, layering");
        let graph = Graph::build(blocks)?;

        log::debug!("[{which}] stage: materialize / straighten / route / verticalize");
        layout::run(&graph, config)
    }
}
