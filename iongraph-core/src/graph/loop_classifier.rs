//! Component B: Loop Classifier
//!
//! Depth-first traversal from each root, assigning every block a `loop_id`
//! (the header of its innermost enclosing loop) and filling in each real
//! header's `parent_loop`. Recursion is replaced by an explicit work stack
//! per the resource-model note in the distilled spec: block counts from
//! real compiled functions can exceed a safe native stack depth, the same
//! reason this author's own `detect_loops` keeps an explicit
//! visited/in-stack bitset instead of letting the call stack track it.
//!
//! The same traversal also assigns `preorder_rank`, a structurally derived
//! discovery order later used by the materializer to give every layer a
//! stable left-to-right order without depending on block ids.

use bitvec::prelude::*;

use crate::error::LayoutError;

use super::{BlockIndex, Graph, LoopHeaderId};

struct Frame {
    block: BlockIndex,
    next_succ: usize,
    pushed_header: bool,
}

pub fn classify(graph: &mut Graph) -> Result<(), LayoutError> {
    let n = graph.records.len();
    let mut visited: BitVec<u32> = bitvec![u32, Lsb0; 0; n.max(1)];
    let mut rank_counter: u32 = 0;
    let roots = graph.roots.clone();

    for root in roots {
        if visited[root as usize] {
            continue;
        }
        let synth_id = LoopHeaderId::Synthetic(root);
        let mut loop_stack: Vec<LoopHeaderId> = vec![synth_id];

        let pushed = visit_enter(graph, root, &mut loop_stack, &mut visited, &mut rank_counter)?;
        let mut work = vec![Frame {
            block: root,
            next_succ: 0,
            pushed_header: pushed,
        }];

        while !work.is_empty() {
            let top = work.len() - 1;
            let idx = work[top].block;

            if graph.records[idx as usize].is_backedge() {
                if work[top].pushed_header {
                    loop_stack.pop();
                }
                work.pop();
                continue;
            }

            let next_succ = work[top].next_succ;
            let succs_len = graph.records[idx as usize].succs.len();
            if next_succ < succs_len {
                let succ = graph.records[idx as usize].succs[next_succ];
                work[top].next_succ += 1;
                if visited[succ as usize] {
                    continue;
                }
                let pushed_succ =
                    visit_enter(graph, succ, &mut loop_stack, &mut visited, &mut rank_counter)?;
                work.push(Frame {
                    block: succ,
                    next_succ: 0,
                    pushed_header: pushed_succ,
                });
            } else {
                if work[top].pushed_header {
                    loop_stack.pop();
                }
                work.pop();
            }
        }
    }

    Ok(())
}

/// Visits `idx` for the first time: truncates the loop stack if the block's
/// `loop_depth` dropped since the last visit, pushes a new header frame if
/// `idx` is a true loop header, and assigns `idx.loop_id`. Returns whether
/// this visit pushed a header frame (so the caller knows to pop it when
/// backtracking).
fn visit_enter(
    graph: &mut Graph,
    idx: BlockIndex,
    loop_stack: &mut Vec<LoopHeaderId>,
    visited: &mut BitVec<u32>,
    rank_counter: &mut u32,
) -> Result<bool, LayoutError> {
    visited.set(idx as usize, true);
    graph.records[idx as usize].preorder_rank = *rank_counter;
    *rank_counter += 1;

    let depth = graph.records[idx as usize].block.loop_depth as usize;
    if loop_stack.len() > depth + 1 {
        loop_stack.truncate(depth + 1);
    }

    let mut pushed = false;
    if graph.records[idx as usize].is_loop_header() {
        if loop_stack.len() != depth {
            return Err(LayoutError::LoopDepthMismatch {
                header: graph.records[idx as usize].block.id,
                declared: depth as u32,
                observed: loop_stack.len(),
            });
        }
        let parent = *loop_stack.last().unwrap();
        let hid = LoopHeaderId::Real(idx);
        graph.header_mut(hid).parent_loop = Some(parent);
        loop_stack.push(hid);
        pushed = true;
    }

    graph.records[idx as usize].loop_id = *loop_stack.last().unwrap();
    Ok(pushed)
}
