//! Component D: Layout-Node Materializer
//!
//! Walks layers in ascending order, turning each block into a `BlockNode`
//! and inserting `DummyNode`s for two kinds of edges that cannot be drawn
//! as a single straight segment: edges spanning more than one layer
//! (forward dummies, coalesced by final destination so parallel long edges
//! share a column) and loop backedges (a vertical column of dummies running
//! alongside a loop's body, carrying the return arrow up to the block that
//! actually owns the `backedge` attribute).
//!
//! Left-to-right order within a layer is: forward dummies first (they tend
//! to run along a layer's edges, which is also why E's straightening runs
//! treat leftmost/rightmost dummy runs specially), then block nodes in
//! `preorder_rank` order, with each active loop's backedge dummy spliced in
//! immediately after the rightmost block it currently owns on that layer —
//! innermost loop closest to the anchor, outer loops further right.

use std::collections::HashMap;

use crate::error::LayoutError;
use crate::graph::{BlockIndex, Graph, LoopHeaderId};
use crate::model::Size;

use super::node::{LayoutNode, NodeFlags, NodeId, NodeKind};
use super::LayoutGraph;

struct ActiveEdge {
    src_node: NodeId,
    src_port: usize,
    dst_block: BlockIndex,
}

/// Materialized layout nodes plus the block → node mapping downstream
/// components need to look up a loop header's or a predecessor's node.
pub struct Materialized {
    pub graph: LayoutGraph,
    pub block_node: Vec<Option<NodeId>>,
}

pub fn materialize(graph: &Graph) -> Result<Materialized, LayoutError> {
    let n = graph.records.len();
    let max_layer = graph
        .records
        .iter()
        .map(|r| r.layer)
        .max()
        .unwrap_or(0)
        .max(0) as usize;

    let mut blocks_by_layer: Vec<Vec<BlockIndex>> = vec![Vec::new(); max_layer + 1];
    for (idx, rec) in graph.records.iter().enumerate() {
        blocks_by_layer[rec.layer as usize].push(idx as u32);
    }
    for layer in &mut blocks_by_layer {
        layer.sort_by_key(|&idx| graph.records[idx as usize].preorder_rank);
    }

    let mut nodes: Vec<LayoutNode> = Vec::new();
    let mut nodes_by_layer: Vec<Vec<NodeId>> = Vec::with_capacity(max_layer + 1);
    let mut block_node: Vec<Option<NodeId>> = vec![None; n];
    // Keyed by the backedge block's index (one per loop): the most
    // recently created dummy in that loop's return column.
    let mut latest_backedge_dummy: HashMap<BlockIndex, NodeId> = HashMap::new();
    let mut active_edges: Vec<ActiveEdge> = Vec::new();

    for layer in 0..=max_layer {
        let blocks_this_layer = std::mem::take(&mut blocks_by_layer[layer]);
        let mut layer_order: Vec<NodeId> = Vec::new();

        // Step 1: terminate edges whose destination lands on this layer.
        let mut still_active = Vec::with_capacity(active_edges.len());
        let mut terminating_by_dst: HashMap<BlockIndex, Vec<ActiveEdge>> = HashMap::new();
        for edge in active_edges.drain(..) {
            if graph.records[edge.dst_block as usize].layer as usize == layer {
                terminating_by_dst.entry(edge.dst_block).or_default().push(edge);
            } else {
                still_active.push(edge);
            }
        }

        // Step 2: forward dummies, coalesced by final destination.
        let mut continuing_by_dst: HashMap<BlockIndex, Vec<ActiveEdge>> = HashMap::new();
        for edge in still_active {
            continuing_by_dst.entry(edge.dst_block).or_default().push(edge);
        }
        let mut next_active_edges = Vec::new();
        for (dst_block, edges) in continuing_by_dst {
            let dummy_id = push_node(
                &mut nodes,
                NodeKind::Dummy,
                layer,
                Some(dst_block),
            );
            layer_order.push(dummy_id);
            for edge in edges {
                wire(&mut nodes, edge.src_node, edge.src_port, dummy_id);
            }
            next_active_edges.push(ActiveEdge {
                src_node: dummy_id,
                src_port: 0,
                dst_block,
            });
        }

        // Step 3: find, for every loop active on this layer, the rightmost
        // non-backedge block it owns — the anchor a backedge dummy will be
        // spliced in after, once block nodes exist.
        let mut anchor_block_of_loop: HashMap<LoopHeaderId, BlockIndex> = HashMap::new();
        for &b in &blocks_this_layer {
            if graph.records[b as usize].is_backedge() {
                continue;
            }
            let mut cur = graph.records[b as usize].loop_id;
            loop {
                match cur {
                    LoopHeaderId::Synthetic(_) => break,
                    LoopHeaderId::Real(_) => {
                        anchor_block_of_loop.insert(cur, b);
                        cur = graph
                            .header(cur)
                            .parent_loop
                            .expect("a real loop header always has a parent_loop after classification");
                    }
                }
            }
        }

        // Step 4: block nodes, wired to whatever terminated into them.
        let mut position_of_block: HashMap<BlockIndex, usize> = HashMap::new();
        for &b in &blocks_this_layer {
            let size = graph.records[b as usize].block.size;
            let node_id = push_node(&mut nodes, NodeKind::Block(b), layer, None);
            layer_order.push(node_id);
            position_of_block.insert(b, layer_order.len() - 1);
            block_node[b as usize] = Some(node_id);
            nodes[node_id as usize].size = size;

            if let Some(edges) = terminating_by_dst.remove(&b) {
                for edge in edges {
                    wire(&mut nodes, edge.src_node, edge.src_port, node_id);
                }
            }
        }

        // Step 5: splice in one backedge dummy per active loop, anchored
        // immediately after the loop's rightmost owned block this layer.
        // Process rightmost anchors first so an insertion never disturbs a
        // position we still need to use; within one anchor, outermost
        // loops are inserted first so the innermost ends up closest.
        let mut by_anchor: HashMap<usize, Vec<LoopHeaderId>> = HashMap::new();
        for (&loop_id, &anchor_block) in &anchor_block_of_loop {
            let pos = position_of_block[&anchor_block];
            by_anchor.entry(pos).or_default().push(loop_id);
        }
        let mut anchor_positions: Vec<usize> = by_anchor.keys().copied().collect();
        anchor_positions.sort_unstable_by(|a, b| b.cmp(a));

        for pos in anchor_positions {
            let mut loops = by_anchor.remove(&pos).unwrap();
            loops.sort_by_key(|&id| loop_nesting_depth(graph, id));
            let mut insert_at = pos + 1;
            for loop_id in loops {
                let backedge_idx = graph.header(loop_id).backedge();
                let dummy_id = push_node(&mut nodes, NodeKind::Dummy, layer, Some(backedge_idx));

                match latest_backedge_dummy.get(&backedge_idx) {
                    Some(&prev) => {
                        wire(&mut nodes, dummy_id, 0, prev);
                    }
                    None => {
                        let backedge_node = block_node[backedge_idx as usize].expect(
                            "the backedge block shares its header's layer, so its node already exists",
                        );
                        wire(&mut nodes, dummy_id, 0, backedge_node);
                        nodes[dummy_id as usize].flags.insert(NodeFlags::IMMINENT_BACKEDGE_DUMMY);
                    }
                }
                latest_backedge_dummy.insert(backedge_idx, dummy_id);
                layer_order.insert(insert_at, dummy_id);
                insert_at += 1;
            }
        }

        // Step 6: emit edges out of this layer's blocks.
        for &b in &blocks_this_layer {
            let src_node = block_node[b as usize].unwrap();
            if graph.records[b as usize].is_backedge() {
                let header_idx = graph.records[b as usize].succs[0];
                let header_node = block_node[header_idx as usize]
                    .expect("a loop header is visited strictly before its backedge block");
                wire(&mut nodes, src_node, 0, header_node);
                continue;
            }
            for (port, &succ) in graph.records[b as usize].succs.clone().iter().enumerate() {
                if graph.records[succ as usize].is_backedge() {
                    let dummy_id = *latest_backedge_dummy
                        .get(&succ)
                        .expect("step 5 extends this loop's column before step 6 wires into it");
                    wire(&mut nodes, src_node, port, dummy_id);
                } else {
                    next_active_edges.push(ActiveEdge {
                        src_node,
                        src_port: port,
                        dst_block: succ,
                    });
                }
            }
        }

        active_edges = next_active_edges;
        nodes_by_layer.push(layer_order);
    }

    prune_orphan_backedge_dummies(graph, &mut nodes, &mut nodes_by_layer);
    flag_leftmost_rightmost_runs(&nodes_by_layer, &mut nodes);
    let (nodes, nodes_by_layer, block_node) = compact(nodes, nodes_by_layer, block_node);

    Ok(Materialized {
        graph: LayoutGraph {
            nodes,
            nodes_by_layer,
            layer_heights: Vec::new(),
            track_heights: Vec::new(),
            width: 0.0,
            height: 0.0,
        },
        block_node,
    })
}

fn push_node(
    nodes: &mut Vec<LayoutNode>,
    kind: NodeKind,
    layer: usize,
    dst_block: Option<BlockIndex>,
) -> NodeId {
    let id = nodes.len() as NodeId;
    nodes.push(LayoutNode {
        id,
        kind,
        layer,
        pos: Default::default(),
        size: Size::ZERO,
        dst_block,
        src_nodes: Vec::new(),
        dst_nodes: Vec::new(),
        joint_offsets: Vec::new(),
        flags: NodeFlags::empty(),
    });
    id
}

/// Records that `src`'s outgoing port `port` targets `dst`, growing
/// `src.dst_nodes`/`joint_offsets` as needed since ports are filled
/// out-of-order (terminations happen before a block's own emit step).
fn wire(nodes: &mut [LayoutNode], src: NodeId, port: usize, dst: NodeId) {
    let src_node = &mut nodes[src as usize];
    if src_node.dst_nodes.len() <= port {
        src_node.dst_nodes.resize(port + 1, NodeId::MAX);
        src_node.joint_offsets.resize(port + 1, 0.0);
    }
    src_node.dst_nodes[port] = dst;
    nodes[dst as usize].src_nodes.push(src);
}

fn loop_nesting_depth(graph: &Graph, id: LoopHeaderId) -> usize {
    let mut depth = 0;
    let mut cur = id;
    while let LoopHeaderId::Real(_) = cur {
        depth += 1;
        cur = graph
            .header(cur)
            .parent_loop
            .expect("a real loop header always has a parent_loop after classification");
    }
    depth
}

fn is_backedge_dummy(graph: &Graph, node: &LayoutNode) -> bool {
    node.is_dummy()
        && node
            .dst_block
            .is_some_and(|b| graph.records[b as usize].is_backedge())
}

fn prune_orphan_backedge_dummies(
    graph: &Graph,
    nodes: &mut [LayoutNode],
    nodes_by_layer: &mut [Vec<NodeId>],
) {
    let mut removed = vec![false; nodes.len()];
    let candidates: Vec<NodeId> = (0..nodes.len() as NodeId)
        .filter(|&id| is_backedge_dummy(graph, &nodes[id as usize]) && nodes[id as usize].src_nodes.is_empty())
        .collect();

    for start in candidates {
        let mut cur = start;
        loop {
            if removed[cur as usize] {
                break;
            }
            removed[cur as usize] = true;
            let dst = nodes[cur as usize].dst_nodes[0];
            let pos = nodes[dst as usize]
                .src_nodes
                .iter()
                .position(|&s| s == cur)
                .expect("dst_nodes/src_nodes wiring is always mutual");
            nodes[dst as usize].src_nodes.remove(pos);

            if nodes[dst as usize].is_dummy() && nodes[dst as usize].src_nodes.is_empty() {
                cur = dst;
            } else {
                break;
            }
        }
    }

    for id in 0..nodes.len() {
        if removed[id] {
            nodes[id].dst_nodes.clear();
        }
    }
    for layer in nodes_by_layer.iter_mut() {
        layer.retain(|&id| !removed[id as usize]);
    }
}

fn flag_leftmost_rightmost_runs(nodes_by_layer: &[Vec<NodeId>], nodes: &mut [LayoutNode]) {
    for layer in nodes_by_layer {
        let mut i = 0;
        while i < layer.len() && nodes[layer[i] as usize].is_dummy() {
            nodes[layer[i] as usize].flags.insert(NodeFlags::LEFTMOST_DUMMY);
            i += 1;
        }
        let mut j = layer.len();
        while j > 0 && nodes[layer[j - 1] as usize].is_dummy() {
            nodes[layer[j - 1] as usize].flags.insert(NodeFlags::RIGHTMOST_DUMMY);
            j -= 1;
        }
    }
}

/// Renumbers `NodeId`s densely after orphan pruning may have left gaps.
fn compact(
    nodes: Vec<LayoutNode>,
    nodes_by_layer: Vec<Vec<NodeId>>,
    block_node: Vec<Option<NodeId>>,
) -> (Vec<LayoutNode>, Vec<Vec<NodeId>>, Vec<Option<NodeId>>) {
    let mut keep = vec![false; nodes.len()];
    for layer in &nodes_by_layer {
        for &id in layer {
            keep[id as usize] = true;
        }
    }
    let mut remap = vec![NodeId::MAX; nodes.len()];
    let mut next = 0u32;
    for (old, &k) in keep.iter().enumerate() {
        if k {
            remap[old] = next;
            next += 1;
        }
    }

    let mut new_nodes = Vec::with_capacity(next as usize);
    for (old, node) in nodes.into_iter().enumerate() {
        if !keep[old] {
            continue;
        }
        let mut node = node;
        node.id = remap[old];
        node.src_nodes.retain(|s| keep[*s as usize]);
        for s in node.src_nodes.iter_mut() {
            *s = remap[*s as usize];
        }
        for d in node.dst_nodes.iter_mut() {
            if *d != NodeId::MAX {
                *d = remap[*d as usize];
            }
        }
        new_nodes.push(node);
    }

    let new_nodes_by_layer: Vec<Vec<NodeId>> = nodes_by_layer
        .into_iter()
        .map(|layer| layer.into_iter().map(|id| remap[id as usize]).collect())
        .collect();

    let new_block_node: Vec<Option<NodeId>> = block_node
        .into_iter()
        .map(|maybe_id| maybe_id.map(|id| remap[id as usize]))
        .collect();

    (new_nodes, new_nodes_by_layer, new_block_node)
}
