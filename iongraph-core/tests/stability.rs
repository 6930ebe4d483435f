//! The layered structure a pass gets must depend only on its graph shape,
//! never on the order its blocks happen to be listed in, or on unrelated
//! components coexisting in the same pass.

mod support;

use std::collections::HashMap;

use support::{backedge, header, plain};

use iongraph_core::graph::Graph;
use iongraph_core::model::BlockId;

fn layers_by_id(graph: &Graph) -> HashMap<BlockId, i64> {
    graph
        .index_of
        .iter()
        .map(|(&id, &idx)| (id, graph.records[idx as usize].layer))
        .collect()
}

fn loop_height_of_header(graph: &Graph, header_id: BlockId) -> i64 {
    let idx = graph.index_of[&header_id];
    graph.header(iongraph_core::graph::LoopHeaderId::Real(idx)).loop_height
}

#[test]
fn block_order_does_not_affect_layering() {
    // Same diamond, same ids and edges, listed back to front.
    let forward = vec![
        plain(0, 0, &[], &[1, 2]),
        plain(1, 0, &[0], &[3]),
        plain(2, 0, &[0], &[3]),
        plain(3, 0, &[1, 2], &[]),
    ];
    let reversed = vec![
        plain(3, 0, &[1, 2], &[]),
        plain(2, 0, &[0], &[3]),
        plain(1, 0, &[0], &[3]),
        plain(0, 0, &[], &[1, 2]),
    ];

    let a = Graph::build(forward).unwrap();
    let b = Graph::build(reversed).unwrap();

    assert_eq!(layers_by_id(&a), layers_by_id(&b));
}

#[test]
fn block_order_does_not_affect_loop_height() {
    let forward = vec![
        header(0, 1, &[2], &[1, 3]),
        plain(1, 1, &[0], &[2]),
        backedge(2, 1, &[1], &[0]),
        plain(3, 0, &[0], &[]),
    ];
    let shuffled = vec![
        plain(3, 0, &[0], &[]),
        backedge(2, 1, &[1], &[0]),
        header(0, 1, &[2], &[1, 3]),
        plain(1, 1, &[0], &[2]),
    ];

    let a = Graph::build(forward).unwrap();
    let b = Graph::build(shuffled).unwrap();

    assert_eq!(layers_by_id(&a), layers_by_id(&b));
    assert_eq!(loop_height_of_header(&a, 0), loop_height_of_header(&b, 0));
}

#[test]
fn disconnected_extra_root_does_not_perturb_existing_component() {
    let without_extra = vec![
        plain(0, 0, &[], &[1, 2]),
        plain(1, 0, &[0], &[3]),
        plain(2, 0, &[0], &[3]),
        plain(3, 0, &[1, 2], &[]),
    ];
    let mut with_extra = without_extra.clone();
    with_extra.push(plain(100, 0, &[], &[101]));
    with_extra.push(plain(101, 0, &[100], &[]));

    let a = Graph::build(without_extra).unwrap();
    let b = Graph::build(with_extra).unwrap();

    let a_layers = layers_by_id(&a);
    let b_layers = layers_by_id(&b);
    for (id, layer) in a_layers {
        assert_eq!(b_layers[&id], layer, "block {id}'s layer changed when an unrelated root was added");
    }
    assert_eq!(b.roots.len(), 2, "the extra component contributes its own root");
}
