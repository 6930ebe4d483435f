//! Component F: Joint Router
//!
//! A two-bend edge has a horizontal middle segment — its *joint* — running
//! between the source's layer and the destination's layer. When several
//! joints would otherwise stack at the same height, this assigns each one
//! to a parallel horizontal track so they don't overlap, working
//! independently layer by layer (every edge spans exactly one layer once
//! the materializer has inserted dummies, so "per layer" and "per source
//! node's layer" coincide).

use crate::config::LayoutConfig;

use super::node::NodeId;
use super::LayoutGraph;

#[derive(Clone, Copy)]
struct Joint {
    src: NodeId,
    port: usize,
    dst: NodeId,
    x1: f64,
    x2: f64,
}

fn overlaps(a: &Joint, b: &Joint) -> bool {
    let (a_lo, a_hi) = (a.x1.min(a.x2), a.x1.max(a.x2));
    let (b_lo, b_hi) = (b.x1.min(b.x2), b.x1.max(b.x2));
    a_lo <= b_hi && b_lo <= a_hi
}

pub fn route(layout: &mut LayoutGraph, config: &LayoutConfig) {
    let n_layers = layout.nodes_by_layer.len();
    layout.track_heights = vec![0.0; n_layers];

    for layer in 0..n_layers {
        let ids = layout.nodes_by_layer[layer].clone();
        let mut joints = Vec::new();

        for &src_id in &ids {
            let src_layer = layout.node(src_id).layer;
            let dst_nodes = layout.node(src_id).dst_nodes.clone();
            for (port, &dst_id) in dst_nodes.iter().enumerate() {
                if dst_id == NodeId::MAX {
                    continue;
                }
                let dst = layout.node(dst_id);
                if dst.layer == src_layer {
                    // A backedge block's direct edge into its header: no
                    // vertical span, rendered as a plain return arrow, not
                    // a two-bend edge with a joint.
                    continue;
                }
                let x1 = layout
                    .node(src_id)
                    .port_x(port, config.port_start, config.port_spacing);
                let x2 = dst.pos.x + config.port_start;
                if (x2 - x1).abs() >= 2.0 * config.arrow_radius {
                    joints.push(Joint {
                        src: src_id,
                        port,
                        dst: dst_id,
                        x1,
                        x2,
                    });
                }
            }
        }

        joints.sort_by(|a, b| a.x1.total_cmp(&b.x1));

        let mut rightward: Vec<Vec<Joint>> = Vec::new();
        let mut leftward: Vec<Vec<Joint>> = Vec::new();

        for j in joints {
            let tracks = if j.x2 >= j.x1 { &mut rightward } else { &mut leftward };

            if let Some(track) = tracks.iter_mut().find(|t| t.iter().any(|o| o.dst == j.dst)) {
                track.push(j);
                continue;
            }

            let mut placed = false;
            for track in tracks.iter_mut().rev() {
                if !track.iter().any(|o| overlaps(o, &j)) {
                    track.push(j);
                    placed = true;
                    break;
                }
            }
            if !placed {
                tracks.push(vec![j]);
            }
        }

        let r = rightward.len();
        let l = leftward.len();
        let total = r + l;
        layout.track_heights[layer] = total.saturating_sub(1) as f64 * config.joint_spacing;

        let mut ordered_tracks: Vec<&Vec<Joint>> = Vec::with_capacity(total);
        ordered_tracks.extend(rightward.iter().rev());
        ordered_tracks.extend(leftward.iter());

        for (i, track) in ordered_tracks.iter().enumerate() {
            let offset = (i as f64 - (total as f64 - 1.0) / 2.0) * config.joint_spacing;
            for j in track.iter() {
                let node = layout.node_mut(j.src);
                if node.joint_offsets.len() <= j.port {
                    node.joint_offsets.resize(j.port + 1, 0.0);
                }
                node.joint_offsets[j.port] = offset;
            }
        }
    }
}
