//! Layout node types shared by components D through G.

use serde::Serialize;

use crate::graph::BlockIndex;
use crate::model::{Point, Size};

/// Identifies a [`LayoutNode`] within one [`LayoutGraph`]. Stable once
/// assigned by the materializer, except that orphan pruning and the final
/// compaction pass may renumber nodes — callers should not persist a
/// `NodeId` across those steps.
pub type NodeId = u32;

/// What a [`LayoutNode`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Wraps one basic block; `size` equals the block's own size.
    Block(BlockIndex),
    /// Zero-size stand-in for a segment of an edge crossing a layer
    /// boundary, or for a backedge return column. `dst_block` on the
    /// owning [`LayoutNode`] names the edge's real destination.
    Dummy,
}

/// Bitset of per-node flags, mirroring [`crate::model::BlockAttributes`]'s
/// representation: the flag set is small and fixed, so a `u8` newtype reads
/// better than pulling in a bitflags dependency for three bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u8);

impl NodeFlags {
    /// One of a contiguous run of dummies at the left end of its layer.
    pub const LEFTMOST_DUMMY: NodeFlags = NodeFlags(1 << 0);
    /// One of a contiguous run of dummies at the right end of its layer.
    pub const RIGHTMOST_DUMMY: NodeFlags = NodeFlags(1 << 1);
    /// First dummy in a backedge return column, wired directly to the
    /// backedge block's own node rather than to a prior dummy.
    pub const IMMINENT_BACKEDGE_DUMMY: NodeFlags = NodeFlags(1 << 2);

    pub const fn empty() -> Self {
        NodeFlags(0)
    }

    pub const fn contains(self, flag: NodeFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn insert(&mut self, flag: NodeFlags) {
        self.0 |= flag.0;
    }

    pub fn remove(&mut self, flag: NodeFlags) {
        self.0 &= !flag.0;
    }
}

impl Serialize for NodeFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut names: Vec<&'static str> = Vec::with_capacity(3);
        if self.contains(Self::LEFTMOST_DUMMY) {
            names.push("leftmostDummy");
        }
        if self.contains(Self::RIGHTMOST_DUMMY) {
            names.push("rightmostDummy");
        }
        if self.contains(Self::IMMINENT_BACKEDGE_DUMMY) {
            names.push("imminentBackedgeDummy");
        }
        names.serialize(serializer)
    }
}

/// One node of the materialized layout: either a block or a dummy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub layer: usize,
    pub pos: Point,
    pub size: Size,
    /// Final destination block of the edge this dummy stands in for.
    /// `None` for block nodes.
    pub dst_block: Option<BlockIndex>,
    pub src_nodes: Vec<NodeId>,
    /// Ordered by source port index; `dst_nodes.len()` equals the owning
    /// block's successor count for a [`NodeKind::Block`], and is exactly 1
    /// for a [`NodeKind::Dummy`].
    pub dst_nodes: Vec<NodeId>,
    /// One entry per `dst_nodes` slot, filled in by the joint router.
    pub joint_offsets: Vec<f64>,
    pub flags: NodeFlags,
}

impl LayoutNode {
    pub fn is_dummy(&self) -> bool {
        matches!(self.kind, NodeKind::Dummy)
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, NodeKind::Block(_))
    }

    pub fn right(&self) -> f64 {
        self.pos.x + self.size.width
    }

    /// X position of outgoing port `p`, per the glossary's port formula.
    pub fn port_x(&self, p: usize, port_start: f64, port_spacing: f64) -> f64 {
        self.pos.x + port_start + (p as f64) * port_spacing
    }
}

/// The fully materialized, straightened, routed, and verticalized output
/// of one pass's layout: everything an external renderer needs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub nodes_by_layer: Vec<Vec<NodeId>>,
    pub layer_heights: Vec<f64>,
    pub track_heights: Vec<f64>,
    pub width: f64,
    pub height: f64,
}

impl LayoutGraph {
    pub fn node(&self, id: NodeId) -> &LayoutNode {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        &mut self.nodes[id as usize]
    }
}
