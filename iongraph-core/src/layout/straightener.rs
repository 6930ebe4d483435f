//! Component E: X-Straightener
//!
//! A fixed, ordered pipeline of local passes, each one only ever moving a
//! node's `pos.x` to the right. None of them minimize edge crossings or
//! search for a globally optimal arrangement — by design, per the
//! engine's non-goals, the point is predictable output under small input
//! changes, not the tightest possible drawing. Because every pass is
//! monotone (rightward-only) the pipeline always converges; the iteration
//! counts on [`LayoutConfig`] are tuning knobs, not correctness
//! parameters.

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::graph::{BlockIndex, Graph, LoopHeaderId};

use super::node::{LayoutNode, NodeFlags, NodeId, NodeKind};
use super::LayoutGraph;

pub fn straighten(
    graph: &Graph,
    layout: &mut LayoutGraph,
    block_node: &[Option<NodeId>],
    config: &LayoutConfig,
) {
    for _ in 0..config.layout_iterations {
        straighten_children(graph, layout, config);
        push_into_loops(graph, layout, block_node);
        straighten_dummy_runs(graph, layout, block_node, config);
    }
    straighten_dummy_runs(graph, layout, block_node, config);

    for i in 0..config.nearly_straight_iterations {
        straighten_nearly_straight(layout, config, i % 2 == 0);
    }

    straighten_conservative(graph, layout, config);
    straighten_dummy_runs(graph, layout, block_node, config);
    suck_in_leftmost_dummies(layout, block_node, config);
}

fn required_gap(graph: &Graph, prev: &LayoutNode, next: &LayoutNode, config: &LayoutConfig) -> f64 {
    let mut gap = config.block_gap;
    if prev.is_dummy() && !next.is_dummy() {
        gap += config.port_start;
    }
    if let NodeKind::Block(idx) = prev.kind {
        if graph.records[idx as usize].is_backedge() {
            gap += config.backedge_arrow_pushout + config.block_gap + config.port_start;
        }
    }
    gap
}

fn push_neighbors(graph: &Graph, layout: &mut LayoutGraph, layer: usize, config: &LayoutConfig) {
    let ids = layout.nodes_by_layer[layer].clone();
    for pair in ids.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let gap = required_gap(graph, layout.node(a), layout.node(b), config);
        let required = layout.node(a).right() + gap;
        if layout.node(b).pos.x < required {
            layout.node_mut(b).pos.x = required;
        }
    }
}

fn position_index(nodes_by_layer: &[Vec<NodeId>]) -> HashMap<NodeId, usize> {
    let mut m = HashMap::new();
    for layer in nodes_by_layer {
        for (i, &id) in layer.iter().enumerate() {
            m.insert(id, i);
        }
    }
    m
}

fn straighten_children(graph: &Graph, layout: &mut LayoutGraph, config: &LayoutConfig) {
    let index = position_index(&layout.nodes_by_layer);
    for layer in 0..layout.nodes_by_layer.len() {
        push_neighbors(graph, layout, layer, config);

        let ids = layout.nodes_by_layer[layer].clone();
        let mut highest_shifted = None::<usize>;
        for &parent_id in &ids {
            let dst_nodes = layout.node(parent_id).dst_nodes.clone();
            for (p, &child_id) in dst_nodes.iter().enumerate() {
                if child_id == NodeId::MAX {
                    continue;
                }
                let child = layout.node(child_id);
                if child.src_nodes.first() != Some(&parent_id) {
                    continue;
                }
                let child_index = index[&child_id];
                if let Some(h) = highest_shifted {
                    if child_index <= h {
                        continue;
                    }
                }
                let parent_port_x = layout.node(parent_id).port_x(p, config.port_start, config.port_spacing);
                let desired = parent_port_x - config.port_start;
                if desired > layout.node(child_id).pos.x {
                    layout.node_mut(child_id).pos.x = desired;
                    highest_shifted = Some(child_index);
                }
            }
        }
    }
}

fn push_into_loops(graph: &Graph, layout: &mut LayoutGraph, block_node: &[Option<NodeId>]) {
    for (idx, rec) in graph.records.iter().enumerate() {
        let Some(node_id) = block_node[idx] else { continue };
        let mut min_x = f64::NEG_INFINITY;
        let mut cur = rec.loop_id;
        loop {
            match cur {
                LoopHeaderId::Synthetic(_) => break,
                LoopHeaderId::Real(h) => {
                    if let Some(header_node) = block_node[h as usize] {
                        min_x = min_x.max(layout.node(header_node).pos.x);
                    }
                    cur = graph
                        .header(cur)
                        .parent_loop
                        .expect("a real loop header always has a parent_loop after classification");
                }
            }
        }
        if layout.node(node_id).pos.x < min_x {
            layout.node_mut(node_id).pos.x = min_x;
        }
    }
}

fn straighten_dummy_runs(
    graph: &Graph,
    layout: &mut LayoutGraph,
    block_node: &[Option<NodeId>],
    config: &LayoutConfig,
) {
    let mut groups: HashMap<BlockIndex, Vec<NodeId>> = HashMap::new();
    for node in &layout.nodes {
        if node.is_dummy() {
            groups.entry(node.dst_block.unwrap()).or_default().push(node.id);
        }
    }

    for (dst_block, column) in groups {
        let leads_to_backedge = graph.records[dst_block as usize].is_backedge();
        let current_max = column
            .iter()
            .map(|&id| layout.node(id).pos.x)
            .fold(f64::NEG_INFINITY, f64::max);

        let desired = if leads_to_backedge {
            let backedge_node = block_node[dst_block as usize]
                .expect("the backedge block is materialized on its header's layer");
            let b = layout.node(backedge_node);
            b.right() + config.backedge_arrow_pushout
        } else {
            current_max
        };

        let x = desired.max(current_max);
        for &id in &column {
            layout.node_mut(id).pos.x = x;
        }
    }

    for layer in 0..layout.nodes_by_layer.len() {
        push_neighbors(graph, layout, layer, config);
    }
}

fn straighten_nearly_straight(layout: &mut LayoutGraph, config: &LayoutConfig, downward: bool) {
    let n_layers = layout.nodes_by_layer.len();
    let order: Vec<usize> = if downward {
        (0..n_layers).collect()
    } else {
        (0..n_layers).rev().collect()
    };

    for &layer in &order {
        let ids = layout.nodes_by_layer[layer].clone();
        for &id in &ids {
            if !layout.node(id).is_dummy() {
                continue;
            }
            let dst_nodes = layout.node(id).dst_nodes.clone();
            for (p, &dst) in dst_nodes.iter().enumerate() {
                if dst == NodeId::MAX {
                    continue;
                }
                let src_port_x = layout.node(id).port_x(p, config.port_start, config.port_spacing);
                let dst_ref_x = layout.node(dst).pos.x + config.port_start;
                if (dst_ref_x - src_port_x).abs() > config.nearly_straight {
                    continue;
                }
                let target = src_port_x.max(dst_ref_x);
                if src_port_x < target {
                    let delta = target - src_port_x;
                    layout.node_mut(id).pos.x += delta;
                } else if dst_ref_x < target {
                    let delta = target - dst_ref_x;
                    layout.node_mut(dst).pos.x += delta;
                }
            }
        }
    }
}

fn straighten_conservative(graph: &Graph, layout: &mut LayoutGraph, config: &LayoutConfig) {
    for layer in 0..layout.nodes_by_layer.len() {
        let ids = layout.nodes_by_layer[layer].clone();
        for pos in (0..ids.len()).rev() {
            let id = ids[pos];
            if let NodeKind::Block(idx) = layout.node(id).kind {
                if graph.records[idx as usize].is_backedge() {
                    continue;
                }
            } else {
                continue;
            }

            let mut candidates: Vec<f64> = Vec::new();
            let node = layout.node(id);
            let node_x = node.pos.x;

            for &src in &node.src_nodes.clone() {
                if let Some(p) = layout.node(src).dst_nodes.iter().position(|&d| d == id) {
                    let target = layout.node(src).port_x(p, config.port_start, config.port_spacing)
                        - config.port_start;
                    let delta = target - node_x;
                    if delta > 0.0 {
                        candidates.push(delta);
                    }
                }
            }
            let dst_nodes = layout.node(id).dst_nodes.clone();
            for (p, &dst) in dst_nodes.iter().enumerate() {
                if dst == NodeId::MAX {
                    continue;
                }
                let dst_ref_x = layout.node(dst).pos.x + config.port_start;
                let target = dst_ref_x - config.port_start - (p as f64) * config.port_spacing;
                let delta = target - node_x;
                if delta > 0.0 {
                    candidates.push(delta);
                }
            }

            let max_allowed = match ids[pos + 1..].iter().find(|&&n| !layout.node(n).flags.contains(NodeFlags::RIGHTMOST_DUMMY)) {
                Some(&next_id) => {
                    let gap = required_gap(graph, layout.node(id), layout.node(next_id), config);
                    layout.node(next_id).pos.x - gap - layout.node(id).size.width
                }
                None => f64::INFINITY,
            };

            candidates.sort_by(f64::total_cmp);
            if let Some(&delta) = candidates.iter().find(|&&d| node_x + d <= max_allowed) {
                layout.node_mut(id).pos.x += delta;
            }
        }
    }
}

fn suck_in_leftmost_dummies(layout: &mut LayoutGraph, block_node: &[Option<NodeId>], config: &LayoutConfig) {
    let mut safe_pos: HashMap<BlockIndex, f64> = HashMap::new();

    for layer in 0..layout.nodes_by_layer.len() {
        let ids = layout.nodes_by_layer[layer].clone();
        let run_len = ids
            .iter()
            .take_while(|&&id| layout.node(id).flags.contains(NodeFlags::LEFTMOST_DUMMY))
            .count();

        let mut right_bound = if run_len < ids.len() {
            Some(layout.node(ids[run_len]).pos.x)
        } else {
            None
        };

        for &id in ids[..run_len].iter().rev() {
            let node = layout.node(id);
            let mut safe = right_bound.map(|rb| rb - config.block_gap).unwrap_or(f64::INFINITY);

            for &src in &node.src_nodes.clone() {
                if let Some(p) = layout.node(src).dst_nodes.iter().position(|&d| d == id) {
                    let src_port_x = layout.node(src).port_x(p, config.port_start, config.port_spacing);
                    safe = safe.min(src_port_x - config.port_start);
                }
            }
            if let Some(dst_block) = node.dst_block {
                if let Some(dst_node_id) = block_node[dst_block as usize] {
                    safe = safe.min(layout.node(dst_node_id).pos.x);
                }
            }

            right_bound = Some(safe);
            if let Some(dst_block) = node.dst_block {
                let entry = safe_pos.entry(dst_block).or_insert(f64::INFINITY);
                *entry = entry.min(safe);
            }
        }
    }

    for node in &mut layout.nodes {
        if node.is_dummy() && node.flags.contains(NodeFlags::LEFTMOST_DUMMY) {
            if let Some(dst_block) = node.dst_block {
                if let Some(&s) = safe_pos.get(&dst_block) {
                    node.pos.x = s;
                }
            }
        }
    }
}
