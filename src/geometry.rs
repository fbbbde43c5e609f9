//! Shape geometry: display-space renderables for each drawing tool.
//!
//! Every function here is pure. Input rectangles are in natural space and are
//! mapped through [`DisplayMetrics`]; output is in display pixels. Degenerate
//! input never fails: a zero-length arrow becomes a [`Renderable::Dot`].

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::consts::{
    ARROW_HEAD_RATIO, ARROW_THICKNESS_MAX_PX, ARROW_THICKNESS_MIN_PX, ARROW_THICKNESS_STEP_PX, DEGENERATE_ARROW_PX,
    DOT_RADIUS_PX, MIN_ARROW_LENGTH_PX,
};
use crate::transform::{DisplayMetrics, Point, Rect};

/// Closed set of shapes the overlay knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    /// Ellipse inscribed in the rectangle bound.
    Circle,
    /// Start at `(x, y)`, signed delta in `(width, height)`.
    Arrow,
    /// Position-only; content determines size.
    Text,
    /// Freehand stroke, drawn by the host from its opaque payload inside these bounds.
    Pen,
}

impl ShapeKind {
    /// Compute the renderable for `rect` under `metrics`.
    ///
    /// `marker_radius` is the display-space radius of the order marker that
    /// sits at an arrow's start.
    #[must_use]
    pub fn geometry(self, rect: Rect, metrics: &DisplayMetrics, marker_radius: f64) -> Renderable {
        match self {
            Self::Rect => Renderable::Box { bounds: metrics.rect_to_display(rect), corner_radius_pct: 0.0 },
            Self::Circle => Renderable::Box { bounds: metrics.rect_to_display(rect), corner_radius_pct: 50.0 },
            Self::Arrow => {
                let start = metrics.point_to_display(rect.origin());
                arrow_geometry(
                    start,
                    metrics.dist_to_display(rect.width),
                    metrics.dist_to_display(rect.height),
                    marker_radius,
                )
            }
            Self::Text => Renderable::Text { anchor: metrics.point_to_display(rect.origin()) },
            Self::Pen => Renderable::Path { bounds: metrics.rect_to_display(rect) },
        }
    }
}

/// Display-space shaft of a non-degenerate arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    /// Arrow origin; the order marker is centered here.
    pub start: Point,
    /// Direction in radians, `atan2(dy, dx)`.
    pub angle: f64,
    /// Full start-to-end length.
    pub length: f64,
    /// Visible shaft length after subtracting the marker radius.
    pub display_length: f64,
    /// Where the visible shaft begins (start pushed out by the marker radius).
    pub shaft_start: Point,
    /// End of the visible shaft; the arrowhead points here.
    pub tip: Point,
    /// Shaft thickness.
    pub thickness: f64,
    /// Arrowhead length along the shaft.
    pub head_length: f64,
}

/// A shape ready to draw, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Renderable {
    /// Rectangle (`corner_radius_pct == 0`) or inscribed ellipse (`50`).
    Box { bounds: Rect, corner_radius_pct: f64 },
    Arrow(ArrowGeometry),
    /// Stand-in for an arrow too short to have a direction.
    Dot { center: Point, radius: f64 },
    Text { anchor: Point },
    Path { bounds: Rect },
}

impl Renderable {
    /// Where the order badge sits: the start for arrows, the top-left corner otherwise.
    #[must_use]
    pub fn anchor(&self) -> Point {
        match self {
            Self::Box { bounds, .. } | Self::Path { bounds } => bounds.origin(),
            Self::Arrow(arrow) => arrow.start,
            Self::Dot { center, .. } => *center,
            Self::Text { anchor } => *anchor,
        }
    }

    /// Point the tooltip should stay near.
    ///
    /// For arrows this is the tip, so the tooltip does not cover the marker.
    #[must_use]
    pub fn far_end(&self) -> Point {
        match self {
            Self::Box { bounds, .. } | Self::Path { bounds } => Point::new(bounds.x, bounds.bottom()),
            Self::Arrow(arrow) => arrow.tip,
            Self::Dot { center, .. } => *center,
            Self::Text { anchor } => *anchor,
        }
    }

    #[must_use]
    pub fn is_arrow(&self) -> bool {
        matches!(self, Self::Arrow(_))
    }
}

/// Arrow geometry from a display-space start and delta.
///
/// Returns [`Renderable::Dot`] when `|dx| < 1` and `|dy| < 1`.
#[must_use]
pub fn arrow_geometry(start: Point, dx: f64, dy: f64, marker_radius: f64) -> Renderable {
    if dx.abs() < DEGENERATE_ARROW_PX && dy.abs() < DEGENERATE_ARROW_PX {
        return Renderable::Dot { center: start, radius: DOT_RADIUS_PX };
    }

    let angle = dy.atan2(dx);
    let length = dx.hypot(dy);
    let display_length = (length - marker_radius).max(MIN_ARROW_LENGTH_PX);
    let (sin, cos) = angle.sin_cos();
    let shaft_start = Point::new(start.x + marker_radius * cos, start.y + marker_radius * sin);
    let tip = Point::new(shaft_start.x + display_length * cos, shaft_start.y + display_length * sin);
    let thickness = arrow_thickness(length);

    Renderable::Arrow(ArrowGeometry {
        start,
        angle,
        length,
        display_length,
        shaft_start,
        tip,
        thickness,
        head_length: thickness * ARROW_HEAD_RATIO,
    })
}

/// Shaft thickness for an arrow of `length` display pixels, clamped to `[2, 4]`.
#[must_use]
pub fn arrow_thickness(length: f64) -> f64 {
    (ARROW_THICKNESS_MIN_PX + length / ARROW_THICKNESS_STEP_PX).clamp(ARROW_THICKNESS_MIN_PX, ARROW_THICKNESS_MAX_PX)
}
