//! Component A: Graph Preparation
//!
//! Builds the indexed adjacency from the raw id lists, locates each true
//! loop header's unique backedge predecessor, and determines the CFG's
//! roots. Every root is given a synthetic loop header (`parentLoop = None`,
//! `loopHeight = 0`, `outgoingEdges = []`) so downstream components can
//! assume every block is inside some loop context.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::error::LayoutError;
use crate::model::{Block, BlockAttributes};

use super::{BlockRecord, Graph, LoopHeaderId, LoopHeaderRecord};

pub fn prepare(blocks: Vec<Block>) -> Result<Graph, LayoutError> {
    let mut index_of = HashMap::with_capacity(blocks.len());
    for block in &blocks {
        if index_of.insert(block.id, index_of.len() as u32).is_some() {
            return Err(LayoutError::DuplicateBlockId { id: block.id });
        }
    }

    let resolve = |from: &Block, id: u32| -> Result<u32, LayoutError> {
        index_of
            .get(&id)
            .copied()
            .ok_or(LayoutError::UnknownBlockId {
                from: from.id,
                referenced: id,
            })
    };

    let mut records = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let mut preds: SmallVec<[u32; 4]> = SmallVec::with_capacity(block.predecessors.len());
        for &p in &block.predecessors {
            preds.push(resolve(block, p)?);
        }
        let mut succs: SmallVec<[u32; 4]> = SmallVec::with_capacity(block.successors.len());
        for &s in &block.successors {
            succs.push(resolve(block, s)?);
        }
        if block.attributes.contains(BlockAttributes::BACKEDGE) && succs.len() != 1 {
            return Err(LayoutError::BadBackedgeSuccessorCount {
                block: block.id,
                found: succs.len(),
            });
        }
        records.push(BlockRecord {
            block: block.clone(),
            preds,
            succs,
            layer: -1,
            // Placeholder; overwritten by the loop classifier (component B)
            // before anything reads it.
            loop_id: LoopHeaderId::Synthetic(0),
            preorder_rank: 0,
        });
    }

    // A block with no predecessors is obviously a root. A block whose only
    // predecessor is its own loop's backedge is also a root: the backedge
    // is a cycle edge, not real incoming control flow, so a loop header
    // that begins its function has no *forward* predecessor even though
    // `preds` is non-empty. Scenario S3 in the testable-properties suite
    // exercises exactly this shape (a loop header with no entry besides its
    // own backedge).
    let roots: Vec<u32> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.preds.iter().all(|&p| records[p as usize].is_backedge()))
        .map(|(i, _)| i as u32)
        .collect();

    let mut headers = HashMap::new();
    for &root in &roots {
        headers.insert(
            LoopHeaderId::Synthetic(root),
            LoopHeaderRecord {
                id: LoopHeaderId::Synthetic(root),
                parent_loop: None,
                loop_height: 0,
                layer: 0,
                backedge: None,
                outgoing_edges: Vec::new(),
            },
        );
    }

    for (idx, record) in records.iter().enumerate() {
        if !record.is_loop_header() {
            continue;
        }
        let idx = idx as u32;
        let mut backedges = record
            .preds
            .iter()
            .copied()
            .filter(|&p| records[p as usize].is_backedge())
            .collect::<SmallVec<[u32; 2]>>();
        if backedges.len() != 1 {
            return Err(LayoutError::BadBackedgeCount {
                header: record.block.id,
                found: backedges.len(),
            });
        }
        let backedge = backedges.pop().unwrap();
        headers.insert(
            LoopHeaderId::Real(idx),
            LoopHeaderRecord {
                id: LoopHeaderId::Real(idx),
                parent_loop: None, // filled in by the loop classifier (component B)
                loop_height: 0,
                layer: -1,
                backedge: Some(backedge),
                outgoing_edges: Vec::new(),
            },
        );
    }

    Ok(Graph {
        records,
        index_of,
        roots,
        headers,
    })
}
