//! iongraph-core
//!
//! Layout engine for visualizing the control-flow graph a JIT backend emits
//! per optimization pass. Given one pass's basic blocks, this crate
//! classifies loops, assigns layers, materializes dummy nodes for edges
//! that cross layers and for backedge return columns, straightens x
//! coordinates, routes horizontal joints into tracks, and assigns final y
//! coordinates — everything an external renderer needs to draw the graph,
//! and nothing about how it is drawn.

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod model;
pub mod pipeline;

pub use config::LayoutConfig;
pub use error::LayoutError;
pub use graph::Graph;
pub use layout::LayoutGraph;
pub use model::{Block, BlockAttributes, BlockId, Pass};
pub use pipeline::{LayoutPipeline, PassLayout, PipelineStats};
