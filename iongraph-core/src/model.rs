//! Input Data Model
//!
//! Defines the shape of a single optimization pass as the JIT backend emits
//! it: a flat list of basic blocks per intermediate representation (`mir`,
//! `lir`), with predecessor/successor id lists whose order is semantically
//! meaningful (branch 0 vs. branch 1) and must be preserved end to end.
//!
//! The layout engine never inspects `instructions`; it is carried through
//! opaquely so an external renderer can display it.

use serde::{Deserialize, Serialize};

/// Stable identifier for a basic block, unique within one pass's block list.
pub type BlockId = u32;

/// Width/height of a block, measured by the caller after rendering the
/// block's text. The engine never computes this itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };
}

/// A 2-D position, in the same units as `Size`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Attribute set on a block.
///
/// # Memory layout
/// Backed by a single `u8` rather than a `HashSet<String>` or `Vec<String>`:
/// there are only three attributes the engine recognizes, and every one of
/// them is tested on the hot path of every component from the loop
/// classifier onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockAttributes(u8);

impl BlockAttributes {
    /// Block is the entry point of a loop (targeted by a backedge).
    pub const LOOP_HEADER: BlockAttributes = BlockAttributes(1 << 0);
    /// Block is the IR-synthesized predecessor that carries the edge back
    /// to its loop header.
    pub const BACKEDGE: BlockAttributes = BlockAttributes(1 << 1);
    /// Informational only; the engine never inspects it.
    pub const SPLIT_EDGE: BlockAttributes = BlockAttributes(1 << 2);

    pub const fn empty() -> Self {
        BlockAttributes(0)
    }

    pub const fn contains(self, flag: BlockAttributes) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn insert(&mut self, flag: BlockAttributes) {
        self.0 |= flag.0;
    }
}

impl std::ops::BitOr for BlockAttributes {
    type Output = BlockAttributes;
    fn bitor(self, rhs: BlockAttributes) -> BlockAttributes {
        BlockAttributes(self.0 | rhs.0)
    }
}

impl Serialize for BlockAttributes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut names: Vec<&'static str> = Vec::with_capacity(3);
        if self.contains(Self::LOOP_HEADER) {
            names.push("loopheader");
        }
        if self.contains(Self::BACKEDGE) {
            names.push("backedge");
        }
        if self.contains(Self::SPLIT_EDGE) {
            names.push("splitedge");
        }
        names.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BlockAttributes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names: Vec<String> = Vec::deserialize(deserializer)?;
        let mut attrs = BlockAttributes::empty();
        for name in names {
            match name.as_str() {
                "loopheader" => attrs.insert(Self::LOOP_HEADER),
                "backedge" => attrs.insert(Self::BACKEDGE),
                "splitedge" => attrs.insert(Self::SPLIT_EDGE),
                // Unrecognized attributes are tolerated: the IR may carry
                // markers future passes of this engine don't act on yet.
                _ => {}
            }
        }
        Ok(attrs)
    }
}

/// One basic block as emitted by the JIT backend for a single pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    /// Display-only block number (distinct from `id`, which is the stable
    /// identifier the engine keys everything on).
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub attributes: BlockAttributes,
    pub loop_depth: u32,
    /// Order is semantically meaningful (branch 0 vs. branch 1) and is
    /// preserved verbatim through every component.
    pub predecessors: Vec<BlockId>,
    pub successors: Vec<BlockId>,
    pub size: Size,
    /// Opaque payload handed to the renderer; never inspected here.
    #[serde(default)]
    pub instructions: serde_json::Value,
}

/// One IR's block list within a pass (either `mir` or `lir`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockList {
    pub blocks: Vec<Block>,
}

/// A single optimization pass, carrying both intermediate representations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pass {
    pub mir: BlockList,
    pub lir: BlockList,
}
