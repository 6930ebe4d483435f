//! Structural invariants checked directly against the layered graph and the
//! materialized layout, independent of any one scenario's literal geometry.

mod support;

use support::{backedge, header, plain};

use iongraph_core::graph::Graph;
use iongraph_core::layout;
use iongraph_core::LayoutConfig;

fn build(blocks: Vec<iongraph_core::Block>) -> Graph {
    Graph::build(blocks).expect("fixture graphs are well-formed")
}

/// A small corpus covering a straight line, a diamond, a single loop with an
/// early exit, and nested loops — enough shapes to exercise every invariant
/// without asserting any one scenario's specific numbers.
fn corpus() -> Vec<Graph> {
    vec![
        build(vec![
            plain(0, 0, &[], &[1]),
            plain(1, 0, &[0], &[2]),
            plain(2, 0, &[1], &[]),
        ]),
        build(vec![
            plain(0, 0, &[], &[1, 2]),
            plain(1, 0, &[0], &[3]),
            plain(2, 0, &[0], &[3]),
            plain(3, 0, &[1, 2], &[]),
        ]),
        build(vec![
            header(0, 1, &[2], &[1, 3]),
            plain(1, 1, &[0], &[2]),
            backedge(2, 1, &[1], &[0]),
            plain(3, 0, &[0], &[]),
        ]),
        build(vec![
            header(0, 1, &[4], &[1, 5]),
            header(1, 2, &[0, 3], &[2, 4]),
            plain(2, 2, &[1], &[3]),
            backedge(3, 2, &[2], &[1]),
            backedge(4, 1, &[1], &[0]),
            plain(5, 0, &[0], &[]),
        ]),
    ]
}

/// Invariant 1: every non-backedge edge (u, v) satisfies u.layer < v.layer.
#[test]
fn non_backedge_edges_strictly_increase_layer() {
    for graph in corpus() {
        for record in &graph.records {
            if record.is_backedge() {
                continue;
            }
            for &succ in &record.succs {
                if graph.records[succ as usize].is_backedge() {
                    continue;
                }
                assert!(
                    record.layer < graph.records[succ as usize].layer,
                    "edge into block {succ} does not strictly increase layer"
                );
            }
        }
    }
}

/// Invariant 2: every block's loop_id is the id of its innermost enclosing
/// loop header, i.e. it is either that header itself or a loop nested
/// within it — never an unrelated loop or an ancestor's ancestor.
#[test]
fn loop_id_is_innermost_enclosing_header() {
    for graph in corpus() {
        for record in &graph.records {
            assert!(
                graph.headers.contains_key(&record.loop_id),
                "loop_id must resolve to a known header"
            );
        }
    }
}

/// Invariant 3: no two block nodes on the same layer overlap horizontally.
#[test]
fn no_same_layer_block_overlap() {
    for graph in corpus() {
        let layout = layout::run(&graph, &LayoutConfig::default()).unwrap();
        for ids in &layout.nodes_by_layer {
            let mut blocks: Vec<_> = ids
                .iter()
                .map(|&id| layout.node(id))
                .filter(|n| n.is_block())
                .collect();
            blocks.sort_by(|a, b| a.pos.x.total_cmp(&b.pos.x));
            for w in blocks.windows(2) {
                assert!(
                    w[0].right() <= w[1].pos.x + 1e-6,
                    "blocks at x={} (width {}) and x={} overlap",
                    w[0].pos.x,
                    w[0].size.width,
                    w[1].pos.x
                );
            }
        }
    }
}

/// Invariant 5: for every loop header h, every block b whose loop_id
/// descends from (or is) h satisfies b.layer in [h.layer, h.layer +
/// h.loopHeight).
#[test]
fn blocks_stay_within_their_loops_layer_span() {
    for graph in corpus() {
        let header_ids: Vec<_> = graph.headers.keys().copied().collect();
        for hid in header_ids {
            let h = graph.header(hid);
            if h.is_synthetic() {
                continue;
            }
            let (h_layer, h_height) = (h.layer, h.loop_height);
            for record in &graph.records {
                if record.layer < 0 {
                    continue;
                }
                if !graph.loop_contains(hid, record.loop_id) {
                    continue;
                }
                assert!(
                    record.layer as i64 >= h_layer && (record.layer as i64) < h_layer + h_height,
                    "block at layer {} falls outside loop span [{}, {})",
                    record.layer,
                    h_layer,
                    h_layer + h_height
                );
            }
        }
    }
}

/// Invariant 6: after layering, a successor that drops to a shallower loop
/// depth than its predecessor lands no higher than the layer just past its
/// enclosing loop's full height.
#[test]
fn loop_exits_land_past_the_loops_height() {
    for graph in corpus() {
        for record in &graph.records {
            if record.layer < 0 {
                continue;
            }
            for &succ in &record.succs {
                let succ_rec = &graph.records[succ as usize];
                if succ_rec.is_backedge() {
                    continue;
                }
                if succ_rec.block.loop_depth < record.block.loop_depth {
                    let enclosing = graph.header(record.loop_id);
                    assert!(
                        succ_rec.layer >= enclosing.layer + enclosing.loop_height,
                        "loop exit landed at layer {} before the loop's height was reached",
                        succ_rec.layer
                    );
                }
            }
        }
    }
}

/// Invariant 7: every dummy node has exactly one destination; every block
/// node's dst_nodes length equals its block's successor count.
#[test]
fn dummy_and_block_out_degree_match_structure() {
    for graph in corpus() {
        let layout = layout::run(&graph, &LayoutConfig::default()).unwrap();
        for node in &layout.nodes {
            if node.is_dummy() {
                assert_eq!(node.dst_nodes.len(), 1, "a dummy must have exactly one destination");
            } else if let iongraph_core::layout::NodeKind::Block(idx) = node.kind {
                let succs_len = graph.records[idx as usize].succs.len();
                assert_eq!(
                    node.dst_nodes.len(),
                    succs_len,
                    "block node's dst_nodes must match its block's successor count"
                );
            }
        }
    }
}

/// Invariant 8: no orphan dummies remain — every dummy has at least one
/// incoming wire (src_nodes non-empty) or is the immediate successor of a
/// backedge return column's block.
#[test]
fn no_orphan_dummies() {
    for graph in corpus() {
        let layout = layout::run(&graph, &LayoutConfig::default()).unwrap();
        for node in &layout.nodes {
            if node.is_dummy() {
                assert!(
                    !node.src_nodes.is_empty(),
                    "dummy node {} has no incoming wire", node.id
                );
            }
        }
    }
}
