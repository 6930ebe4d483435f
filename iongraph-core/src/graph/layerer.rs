//! Component C: Layerer
//!
//! Assigns every block an integer `layer` (its distance from its loop's
//! entry, measured in the loop-nesting-aware sense described below) and
//! fills in each loop header's `loop_height` and `outgoing_edges`.
//!
//! A successor that drops to a shallower loop depth than its predecessor
//! cannot be layered immediately: the loop it is leaving has not finished
//! growing yet, so layering that edge now would understate the loop's
//! final height. Such edges are deferred onto the loop header's
//! `outgoing_edges` and only processed once the entire loop body has been
//! walked, using the loop's final height as the jump-off layer. This is
//! exactly a post-order dependency, so the traversal below is a three-phase
//! explicit state machine (`Enter`, `NormalSucc`, `Deferred`) rather than a
//! plain work stack, replacing what would otherwise be two mutually
//! recursive functions.

use std::collections::HashMap;

use crate::error::LayoutError;

use super::{BlockIndex, Graph, LoopHeaderId};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Assign this block's own layer, then walk its in-loop successors
    /// (those whose loop depth does not decrease). Pushed again whenever a
    /// later path bumps a block's layer, re-propagating it forward.
    Enter,
    /// In-loop successors have all been queued; now collect and hold the
    /// loop-exiting successors until the loop finishes.
    NormalSucc,
    /// This block was a loop header and its whole body has been walked;
    /// now lay out the deferred exits collected on `outgoing_edges`.
    Deferred,
}

struct Frame {
    block: BlockIndex,
    phase: Phase,
    next_succ: usize,
    /// Populated only once `phase` becomes `Deferred`: the exits collected
    /// for this header while its body was walked.
    deferred_exits: Vec<(BlockIndex, BlockIndex)>,
}

pub fn assign_layers(graph: &mut Graph) -> Result<(), LayoutError> {
    let n = graph.records.len();
    let mut visited = vec![false; n];
    // Deferred exits, keyed by the loop header that owns them, accumulated
    // until that header's body has been fully walked.
    let mut pending: HashMap<LoopHeaderId, Vec<(BlockIndex, BlockIndex)>> = HashMap::new();

    let roots = graph.roots.clone();
    for root in roots {
        if visited[root as usize] {
            continue;
        }
        visited[root as usize] = true;
        graph.records[root as usize].layer = 0;

        let mut work = vec![Frame {
            block: root,
            phase: Phase::Enter,
            next_succ: 0,
            deferred_exits: Vec::new(),
        }];

        while let Some(top) = work.len().checked_sub(1) {
            let idx = work[top].block;
            let phase = work[top].phase;

            match phase {
                Phase::Enter => {
                    let next_succ = work[top].next_succ;
                    let succs_len = graph.records[idx as usize].succs.len();
                    let own_loop = graph.records[idx as usize].loop_id;
                    let own_depth = graph.records[idx as usize].block.loop_depth;

                    if next_succ < succs_len {
                        let succ = graph.records[idx as usize].succs[next_succ];
                        work[top].next_succ += 1;

                        if graph.records[succ as usize].is_backedge() {
                            // A backedge block's layer is always its loop
                            // header's layer (invariant 3): it never gets a
                            // layer of its own and never gets walked
                            // forward, since its only successor is the
                            // header it already descends from.
                            if !visited[succ as usize] {
                                visited[succ as usize] = true;
                                let header_idx = graph.records[succ as usize].succs[0];
                                graph.records[succ as usize].layer =
                                    graph.records[header_idx as usize].layer;
                            }
                            continue;
                        }

                        let succ_depth = graph.records[succ as usize].block.loop_depth;
                        let candidate_layer = graph.records[idx as usize].layer + 1;

                        if succ_depth < own_depth {
                            pending.entry(own_loop).or_default().push((idx, succ));
                            continue;
                        }

                        // Re-walk whenever this bumps the successor's layer,
                        // not just on first visit, so a later longer path
                        // propagates forward into descendants already laid
                        // out against the old, smaller value.
                        if graph.records[succ as usize].layer < candidate_layer {
                            visited[succ as usize] = true;
                            graph.records[succ as usize].layer = candidate_layer;
                            work.push(Frame {
                                block: succ,
                                phase: Phase::Enter,
                                next_succ: 0,
                                deferred_exits: Vec::new(),
                            });
                        }
                    } else {
                        work[top].phase = Phase::NormalSucc;
                    }
                }

                Phase::NormalSucc => {
                    if graph.records[idx as usize].is_loop_header() {
                        let hid = LoopHeaderId::Real(idx);
                        let header_layer = graph.records[idx as usize].layer;
                        let height = graph
                            .records
                            .iter()
                            .filter(|r| r.layer >= 0 && graph.loop_contains(hid, r.loop_id))
                            .map(|r| r.layer - header_layer + 1)
                            .max()
                            .unwrap_or(1);
                        {
                            let header = graph.header_mut(hid);
                            header.layer = header_layer;
                            header.loop_height = height;
                        }
                        let exits = pending.remove(&hid).unwrap_or_default();
                        graph.header_mut(hid).outgoing_edges = exits.clone();
                        work[top].deferred_exits = exits;
                        work[top].phase = Phase::Deferred;
                        work[top].next_succ = 0;
                    } else {
                        work.pop();
                    }
                }

                Phase::Deferred => {
                    let next_succ = work[top].next_succ;
                    if next_succ < work[top].deferred_exits.len() {
                        work[top].next_succ += 1;
                        let (_, succ) = work[top].deferred_exits[next_succ];
                        let hid = LoopHeaderId::Real(idx);
                        let header = graph.header(hid);
                        let jump_off = header.layer + header.loop_height;

                        // Same re-walk rule as the in-loop successor case
                        // above: a deferred exit can itself bump a block
                        // that was already laid out via some other path.
                        if graph.records[succ as usize].layer < jump_off {
                            visited[succ as usize] = true;
                            graph.records[succ as usize].layer = jump_off;
                            work.push(Frame {
                                block: succ,
                                phase: Phase::Enter,
                                next_succ: 0,
                                deferred_exits: Vec::new(),
                            });
                        }
                    } else {
                        work.pop();
                    }
                }
            }
        }
    }

    Ok(())
}
