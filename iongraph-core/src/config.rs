//! Layout Tunables
//!
//! Every magic number the straightening and routing passes depend on lives
//! here instead of as scattered free constants, so a caller can override them
//! (tests in particular want small round numbers) while `Default` reproduces
//! the values the reference tool ships with.

/// Tunable layout parameters.
///
/// Constructed once per layout run and threaded through the pipeline by
/// reference; never mutated mid-run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Outer margin around the whole laid-out pass.
    pub content_padding: f64,
    /// Minimum horizontal gap between same-layer neighbors.
    pub block_gap: f64,
    /// X offset of port 0 from a block's left edge.
    pub port_start: f64,
    /// Stride between successive ports.
    pub port_spacing: f64,
    /// Corner radius used by the two-bend edge renderer; also the threshold
    /// below which a joint collapses into a single bezier curve.
    pub arrow_radius: f64,
    /// Vertical padding added above and below a layer's joint tracks.
    pub track_padding: f64,
    /// Vertical gap between adjacent joint tracks.
    pub joint_spacing: f64,
    /// Horizontal distance from a backedge block to its return column.
    pub backedge_arrow_pushout: f64,
    /// Y offset of the loop-entry arrow into the header (renderer hint, not
    /// used by the geometry passes themselves, carried through for
    /// completeness of the external interface).
    pub header_arrow_pushdown: f64,
    /// Horizontal offset threshold below which two endpoints are considered
    /// "nearly straight" and snapped together.
    pub nearly_straight: f64,
    /// Repetitions of the push/straighten/pull-into-loop/straighten-dummy-runs
    /// group in the straightening pipeline.
    pub layout_iterations: u32,
    /// Repetitions of the alternating up/down nearly-straight pass.
    pub nearly_straight_iterations: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            content_padding: 20.0,
            block_gap: 44.0,
            port_start: 16.0,
            port_spacing: 60.0,
            arrow_radius: 12.0,
            track_padding: 36.0,
            joint_spacing: 16.0,
            backedge_arrow_pushout: 32.0,
            header_arrow_pushdown: 16.0,
            nearly_straight: 30.0,
            layout_iterations: 2,
            nearly_straight_iterations: 4,
        }
    }
}
