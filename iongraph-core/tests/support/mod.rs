//! Shared fixtures for building small hand-written CFGs in tests.

use iongraph_core::model::{Block, BlockAttributes, BlockId, Size};

pub const DEFAULT_SIZE: Size = Size {
    width: 100.0,
    height: 40.0,
};

/// Builds one [`Block`] with the given id, attributes, and adjacency. Sizes
/// are fixed so straightening math in tests is easy to hand-check.
pub fn block(
    id: BlockId,
    attributes: BlockAttributes,
    loop_depth: u32,
    predecessors: &[BlockId],
    successors: &[BlockId],
) -> Block {
    Block {
        id,
        number: id,
        attributes,
        loop_depth,
        predecessors: predecessors.to_vec(),
        successors: successors.to_vec(),
        size: DEFAULT_SIZE,
        instructions: serde_json::Value::Null,
    }
}

pub fn plain(id: BlockId, loop_depth: u32, predecessors: &[BlockId], successors: &[BlockId]) -> Block {
    block(id, BlockAttributes::empty(), loop_depth, predecessors, successors)
}

pub fn header(id: BlockId, loop_depth: u32, predecessors: &[BlockId], successors: &[BlockId]) -> Block {
    block(id, BlockAttributes::LOOP_HEADER, loop_depth, predecessors, successors)
}

pub fn backedge(id: BlockId, loop_depth: u32, predecessors: &[BlockId], successors: &[BlockId]) -> Block {
    block(id, BlockAttributes::BACKEDGE, loop_depth, predecessors, successors)
}
