//! Shared numeric constants for the markup crate.

// ── Geometry ────────────────────────────────────────────────────

/// Radius of the numbered order marker, in display pixels.
pub const MARKER_RADIUS_PX: f64 = 10.0;

/// Shortest visible arrow shaft, in display pixels.
pub const MIN_ARROW_LENGTH_PX: f64 = 5.0;

/// Below this display-space extent on both axes an arrow collapses to a dot.
pub const DEGENERATE_ARROW_PX: f64 = 1.0;

/// Arrow shaft thickness bounds, in display pixels.
pub const ARROW_THICKNESS_MIN_PX: f64 = 2.0;
pub const ARROW_THICKNESS_MAX_PX: f64 = 4.0;

/// Shaft length (display px) gained per extra pixel of thickness.
pub const ARROW_THICKNESS_STEP_PX: f64 = 100.0;

/// Arrowhead length as a multiple of shaft thickness.
pub const ARROW_HEAD_RATIO: f64 = 3.0;

/// Radius of the dot drawn for a zero-length arrow, in display pixels.
pub const DOT_RADIUS_PX: f64 = 3.0;

// ── Editing ─────────────────────────────────────────────────────

/// Minimum width/height of a resized box, in natural pixels.
pub const MIN_BOX_SIZE_PX: f64 = 10.0;

/// Screen-space hit slop in pixels for handles and thin shapes.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Keyboard nudge step in natural pixels (shift multiplies by 10).
pub const NUDGE_STEP_PX: f64 = 1.0;

// ── Tools ───────────────────────────────────────────────────────

/// Brush size bounds for the pen tool.
pub const BRUSH_SIZE_MIN: f64 = 1.0;
pub const BRUSH_SIZE_MAX: f64 = 64.0;

/// Default brush size for a fresh tool state.
pub const DEFAULT_BRUSH_SIZE: f64 = 4.0;

/// Default annotation color.
pub const DEFAULT_COLOR: &str = "#E53935";

// ── Indicators ──────────────────────────────────────────────────

/// Lifetime of the saved/error indicator, in milliseconds.
pub const INDICATOR_MS: f64 = 2000.0;

/// Lifetime of the click-to-scroll highlight, in milliseconds.
pub const HIGHLIGHT_MS: f64 = 1500.0;
