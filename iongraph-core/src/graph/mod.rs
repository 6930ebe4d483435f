//! Graph Preparation, Loop Classification, and Layering
//!
//! Components A, B, and C of the layout pipeline: turn the flat block list
//! into an indexed graph, classify every block into its innermost loop, and
//! assign every block an integer layer. Components D onward (materializing
//! layout nodes, straightening, routing, verticalizing) live in
//! [`crate::layout`] and consume the result of this module through
//! [`Graph::into_parts`].

mod layerer;
mod loop_classifier;
mod prepare;

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::model::{Block, BlockId};

/// Dense index of a block within one [`Graph`]. Stable for the lifetime of
/// the graph; never reused after construction.
pub type BlockIndex = u32;

/// Identifies a loop header: either a real block carrying the
/// `loopheader` attribute, or the synthetic header attached to a CFG root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopHeaderId {
    Real(BlockIndex),
    Synthetic(BlockIndex),
}

/// A loop header's bookkeeping, built during loop classification (§4.B) and
/// filled in during layering (§4.C).
#[derive(Debug, Clone)]
pub struct LoopHeaderRecord {
    pub id: LoopHeaderId,
    /// Enclosing loop header. `None` only for a synthetic root header.
    pub parent_loop: Option<LoopHeaderId>,
    /// Layers spanned by this loop; 0 until the layerer visits the header.
    pub loop_height: i64,
    /// Header's own layer; mirrors the header block's `layer` field for a
    /// real header, and is always 0 for a synthetic one (the root's layer).
    pub layer: i64,
    /// Predecessor carrying the `backedge` attribute. `Some` only for real
    /// headers (populated in §4.A after checking there is exactly one).
    backedge: Option<BlockIndex>,
    /// Successors whose `loop_depth` drops below this loop's, collected
    /// during layering (§4.C) for deferred post-loop layering.
    pub outgoing_edges: Vec<(BlockIndex, BlockIndex)>,
}

impl LoopHeaderRecord {
    /// The loop's unique backedge predecessor.
    ///
    /// # Panics
    /// Panics if called on a synthetic root header — reading a synthetic
    /// header's backedge is a programmer error per the layout engine's
    /// contract, not a recoverable condition.
    pub fn backedge(&self) -> BlockIndex {
        self.backedge
            .expect("backedge() called on a synthetic loop header")
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.id, LoopHeaderId::Synthetic(_))
    }
}

/// Per-block bookkeeping threaded through components A-C.
#[derive(Debug, Clone)]
pub struct BlockRecord {
    pub block: Block,
    pub preds: SmallVec<[BlockIndex; 4]>,
    pub succs: SmallVec<[BlockIndex; 4]>,
    /// -1 until assigned by the layerer.
    pub layer: i64,
    pub loop_id: LoopHeaderId,
    /// Rank in a single preorder DFS over successor edges (skipping
    /// recursion past backedges), computed alongside loop classification.
    /// Used by the materializer to give every layer a stable, structurally
    /// derived left-to-right order — renumbering block ids must not change
    /// relative positions, and this rank depends only on graph shape.
    pub preorder_rank: u32,
}

impl BlockRecord {
    pub fn is_backedge(&self) -> bool {
        self.block.attributes.contains(crate::model::BlockAttributes::BACKEDGE)
    }

    pub fn is_loop_header(&self) -> bool {
        self.block.attributes.contains(crate::model::BlockAttributes::LOOP_HEADER)
    }
}

/// An indexed, loop-classified, layered control-flow graph for one pass.
///
/// Built by [`Graph::build`], which runs components A (preparation), B
/// (loop classification), and C (layering) in order. Everything downstream
/// consumes the public fields by reference; there are no raw pointers
/// anywhere in this structure, only indices into `records` and ids into
/// `headers`, per the "no ownership cycles" design note.
#[derive(Debug)]
pub struct Graph {
    pub records: Vec<BlockRecord>,
    pub index_of: HashMap<BlockId, BlockIndex>,
    pub roots: Vec<BlockIndex>,
    pub headers: HashMap<LoopHeaderId, LoopHeaderRecord>,
}

impl Graph {
    /// Runs components A, B, and C over `blocks`, producing a fully
    /// layered graph or failing with the first malformed-IR condition
    /// found.
    pub fn build(blocks: Vec<Block>) -> Result<Graph, crate::error::LayoutError> {
        let mut graph = prepare::prepare(blocks)?;
        loop_classifier::classify(&mut graph)?;
        layerer::assign_layers(&mut graph)?;
        Ok(graph)
    }

    pub fn header(&self, id: LoopHeaderId) -> &LoopHeaderRecord {
        self.headers
            .get(&id)
            .expect("loop header id must always resolve within its own graph")
    }

    pub fn header_mut(&mut self, id: LoopHeaderId) -> &mut LoopHeaderRecord {
        self.headers
            .get_mut(&id)
            .expect("loop header id must always resolve within its own graph")
    }

    /// Blocks within the same [`Graph`] whose `loop_id` descends from (or
    /// equals) `ancestor`, i.e. `b.loop_id` is `ancestor` or an inner loop
    /// of it. Used by invariant checks and by the straightener's
    /// push-into-loop pass.
    pub fn loop_contains(&self, ancestor: LoopHeaderId, mut loop_id: LoopHeaderId) -> bool {
        loop {
            if loop_id == ancestor {
                return true;
            }
            match self.headers.get(&loop_id).and_then(|h| h.parent_loop) {
                Some(parent) => loop_id = parent,
                None => return false,
            }
        }
    }
}
