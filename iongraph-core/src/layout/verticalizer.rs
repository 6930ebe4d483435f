//! Component G: Verticalizer
//!
//! The last stage: once every layer's node heights and track counts are
//! known, walks layers top-down assigning `pos.y`, then pads the whole
//! drawing by `CONTENT_PADDING` on every side to get the renderer's
//! bounding box.

use crate::config::LayoutConfig;

use super::LayoutGraph;

pub fn verticalize(layout: &mut LayoutGraph, config: &LayoutConfig) {
    let n_layers = layout.nodes_by_layer.len();
    layout.layer_heights = vec![0.0; n_layers];

    let mut y = 0.0_f64;
    for layer in 0..n_layers {
        let ids = layout.nodes_by_layer[layer].clone();
        let max_height = ids
            .iter()
            .map(|&id| layout.node(id).size.height)
            .fold(0.0_f64, f64::max);
        layout.layer_heights[layer] = max_height;

        for &id in &ids {
            layout.node_mut(id).pos.y = y;
        }

        let track = layout.track_heights.get(layer).copied().unwrap_or(0.0);
        y += max_height + config.track_padding + track + config.track_padding;
    }

    let min_x = layout
        .nodes
        .iter()
        .map(|n| n.pos.x)
        .fold(f64::INFINITY, f64::min)
        .min(0.0);
    let shift_x = config.content_padding - min_x;
    for node in &mut layout.nodes {
        node.pos.x += shift_x;
        node.pos.y += config.content_padding;
    }

    let max_right = layout
        .nodes
        .iter()
        .map(|n| n.right())
        .fold(0.0_f64, f64::max);
    let max_bottom = layout
        .nodes
        .iter()
        .map(|n| n.pos.y + n.size.height)
        .fold(0.0_f64, f64::max);

    layout.width = max_right + config.content_padding;
    layout.height = max_bottom + config.content_padding;
}
