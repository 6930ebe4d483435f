//! The straightening pipeline is built entirely out of local passes that
//! only ever move a node to the right (see `layout::straighten`'s module
//! doc), so running the whole engine twice over the same graph must
//! produce exactly the same geometry — there is nothing in the pipeline
//! that depends on wall-clock time, randomness, or iteration count beyond
//! what `LayoutConfig` already fixes.

mod support;

use support::{backedge, header, plain};

use iongraph_core::graph::Graph;
use iongraph_core::layout::{self, LayoutGraph};
use iongraph_core::LayoutConfig;

fn assert_same_geometry(a: &LayoutGraph, b: &LayoutGraph) {
    assert_eq!(a.nodes.len(), b.nodes.len());
    for (na, nb) in a.nodes.iter().zip(&b.nodes) {
        assert_eq!(na.kind, nb.kind, "node {} kind changed between runs", na.id);
        assert_eq!(na.layer, nb.layer, "node {} layer changed between runs", na.id);
        assert_eq!(na.pos.x, nb.pos.x, "node {} x changed between runs", na.id);
        assert_eq!(na.pos.y, nb.pos.y, "node {} y changed between runs", na.id);
    }
    assert_eq!(a.track_heights, b.track_heights);
    assert_eq!(a.layer_heights, b.layer_heights);
    assert_eq!(a.width, b.width);
    assert_eq!(a.height, b.height);
}

#[test]
fn diamond_layout_is_deterministic_across_runs() {
    let graph = Graph::build(vec![
        plain(0, 0, &[], &[1, 2]),
        plain(1, 0, &[0], &[3]),
        plain(2, 0, &[0], &[3]),
        plain(3, 0, &[1, 2], &[]),
    ])
    .unwrap();
    let config = LayoutConfig::default();

    let first = layout::run(&graph, &config).unwrap();
    let second = layout::run(&graph, &config).unwrap();
    assert_same_geometry(&first, &second);
}

#[test]
fn loop_layout_is_deterministic_across_runs() {
    let graph = Graph::build(vec![
        header(0, 1, &[2], &[1, 3]),
        plain(1, 1, &[0], &[2]),
        backedge(2, 1, &[1], &[0]),
        plain(3, 0, &[0], &[]),
    ])
    .unwrap();
    let config = LayoutConfig::default();

    let first = layout::run(&graph, &config).unwrap();
    let second = layout::run(&graph, &config).unwrap();
    assert_same_geometry(&first, &second);
}

#[test]
fn nested_loop_layout_is_deterministic_across_runs() {
    let graph = Graph::build(vec![
        header(0, 1, &[4], &[1, 5]),
        header(1, 2, &[0, 3], &[2, 4]),
        plain(2, 2, &[1], &[3]),
        backedge(3, 2, &[2], &[1]),
        backedge(4, 1, &[1], &[0]),
        plain(5, 0, &[0], &[]),
    ])
    .unwrap();
    let config = LayoutConfig::default();

    let first = layout::run(&graph, &config).unwrap();
    let second = layout::run(&graph, &config).unwrap();
    assert_same_geometry(&first, &second);
}
