//! Coordinate transform between natural image space and display space.
//!
//! Natural space is the pixel grid of the original asset. Display space is
//! the pixel grid of the rendering viewport. The mapping is a uniform scale
//! followed by an offset, with no rotation. [`DisplayMetrics`] can only be
//! constructed with a positive, finite scale, so holding one is proof that the
//! surface is renderable.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

/// A point in either natural or display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width/height pair, used for natural image dimensions and container sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle `{x, y, width, height}`.
///
/// Arrows reuse this shape with `width`/`height` holding a signed delta, so
/// nothing here assumes non-negative extents except [`Rect::from_corners`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Smallest rectangle containing every point, or `None` for an empty slice.
    #[must_use]
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y })
    }

    #[must_use]
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Whether `p` lies inside the rectangle, grown by `slop` on every side.
    #[must_use]
    pub fn contains(self, p: Point, slop: f64) -> bool {
        let (left, right) = (self.x.min(self.right()), self.x.max(self.right()));
        let (top, bottom) = (self.y.min(self.bottom()), self.y.max(self.bottom()));
        p.x >= left - slop && p.x <= right + slop && p.y >= top - slop && p.y <= bottom + slop
    }

    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..self }
    }
}

/// Scale + offset converting natural coordinates into display coordinates.
///
/// `display = natural * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl DisplayMetrics {
    /// Build metrics from raw parts. Returns `None` unless `scale > 0` and
    /// every component is finite.
    #[must_use]
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Option<Self> {
        if !(scale.is_finite() && scale > 0.0 && offset_x.is_finite() && offset_y.is_finite()) {
            return None;
        }
        Some(Self { scale, offset_x, offset_y })
    }

    /// Derive metrics from the rendered image box (display space) and the
    /// image's natural dimensions.
    ///
    /// The scale is the ratio of rendered width to natural width; the offset is
    /// the rendered box's origin within the viewport.
    #[must_use]
    pub fn from_rendered(natural: Size, rendered: Rect) -> Option<Self> {
        if !natural.is_positive() {
            return None;
        }
        Self::new(rendered.width / natural.width, rendered.x, rendered.y)
    }

    /// Fit `natural` inside `container` preserving aspect ratio, centered
    /// (letterboxed) on the short axis.
    #[must_use]
    pub fn contain(natural: Size, container: Size) -> Option<Self> {
        if !natural.is_positive() || !container.is_positive() {
            return None;
        }
        let scale = (container.width / natural.width).min(container.height / natural.height);
        let offset_x = (container.width - natural.width * scale) * 0.5;
        let offset_y = (container.height - natural.height * scale) * 0.5;
        Self::new(scale, offset_x, offset_y)
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    /// Convert a natural-space point to display space.
    #[must_use]
    pub fn point_to_display(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset_x, p.y * self.scale + self.offset_y)
    }

    /// Convert a display-space point to natural space.
    #[must_use]
    pub fn point_to_natural(&self, p: Point) -> Point {
        Point::new((p.x - self.offset_x) / self.scale, (p.y - self.offset_y) / self.scale)
    }

    /// Convert a display-space distance to natural-space distance.
    #[must_use]
    pub fn dist_to_natural(&self, d: f64) -> f64 {
        d / self.scale
    }

    /// Convert a natural-space distance to display-space distance.
    #[must_use]
    pub fn dist_to_display(&self, d: f64) -> f64 {
        d * self.scale
    }

    /// Convert a natural-space rectangle to display space.
    #[must_use]
    pub fn rect_to_display(&self, r: Rect) -> Rect {
        let origin = self.point_to_display(r.origin());
        Rect::new(origin.x, origin.y, r.width * self.scale, r.height * self.scale)
    }

    /// Convert a display-space rectangle back to natural space.
    #[must_use]
    pub fn rect_to_natural(&self, r: Rect) -> Rect {
        let origin = self.point_to_natural(r.origin());
        Rect::new(origin.x, origin.y, r.width / self.scale, r.height / self.scale)
    }
}

/// `toDisplay(rect, metrics)`.
#[must_use]
pub fn to_display(rect: Rect, metrics: &DisplayMetrics) -> Rect {
    metrics.rect_to_display(rect)
}

/// `toNatural(point, metrics)`.
#[must_use]
pub fn to_natural(point: Point, metrics: &DisplayMetrics) -> Point {
    metrics.point_to_natural(point)
}

/// Shared layout state: the asset's natural size and the current metrics.
///
/// Recomputed whenever the natural dimensions become known or the container
/// resizes. Consumers only read it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Layout {
    natural: Option<Size>,
    metrics: Option<DisplayMetrics>,
}

impl Layout {
    /// Record the natural dimensions and rendered box, recomputing metrics.
    ///
    /// An invalid combination leaves the layout non-renderable.
    pub fn update(&mut self, natural: Size, rendered: Rect) {
        self.natural = natural.is_positive().then_some(natural);
        self.metrics = DisplayMetrics::from_rendered(natural, rendered);
    }

    /// Forget everything, e.g. when the asset changes.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn natural(&self) -> Option<Size> {
        self.natural
    }

    /// Metrics, present only when the layout is renderable.
    #[must_use]
    pub fn metrics(&self) -> Option<&DisplayMetrics> {
        self.natural.and(self.metrics.as_ref())
    }

    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.metrics().is_some()
    }
}
