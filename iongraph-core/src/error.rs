//! Error Handling
//!
//! This module provides the error type for layout construction using `thiserror`.
//! Every variant corresponds to a malformed-IR condition detected while preparing
//! the graph, classifying loops, or assigning layers; geometric degeneracies
//! encountered later in the pipeline are not fatal (see `layout::straighten` and
//! `layout::joints`) and are logged instead of raised here.

use thiserror::Error;

use crate::model::BlockId;

/// Layout construction error.
///
/// Surfaced to the caller (and, ultimately, the renderer, which displays a
/// failure placeholder) whenever a pass's block list violates one of the
/// structural invariants the layout engine depends on. No partial geometry
/// is ever returned alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A successor/predecessor id list referenced a block id that does not
    /// appear in the pass's block list.
    #[error("block {referenced} is referenced by block {from} but is not present in the pass")]
    UnknownBlockId { from: BlockId, referenced: BlockId },

    /// A true loop header did not have exactly one predecessor carrying the
    /// `backedge` attribute.
    #[error("loop header {header} has {found} backedge predecessors, expected exactly 1")]
    BadBackedgeCount { header: BlockId, found: usize },

    /// A block carrying the `backedge` attribute did not have exactly one
    /// successor (it must point only at its loop header).
    #[error("backedge block {block} has {found} successors, expected exactly 1")]
    BadBackedgeSuccessorCount { block: BlockId, found: usize },

    /// A true loop header was entered at a traversal depth that disagreed
    /// with its IR-supplied `loop_depth`.
    #[error(
        "loop header {header} has loop_depth {declared} but was reached at nesting depth {observed}"
    )]
    LoopDepthMismatch {
        header: BlockId,
        declared: u32,
        observed: usize,
    },

    /// A block id appeared more than once in a pass's block list.
    #[error("block id {id} appears more than once in the pass")]
    DuplicateBlockId { id: BlockId },
}
