//! Hit-testing in display space: shape bodies and the eight resize handles.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::EntityId;
use crate::geometry::Renderable;
use crate::transform::{Point, Rect};

/// Compass direction of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl Direction {
    /// Corners first, so a corner wins over an overlapping edge handle on tiny boxes.
    pub const ALL: [Direction; 8] = [
        Direction::Nw,
        Direction::Ne,
        Direction::Se,
        Direction::Sw,
        Direction::N,
        Direction::E,
        Direction::S,
        Direction::W,
    ];

    /// `-1` moves the west edge, `1` the east edge, `0` neither.
    #[must_use]
    pub fn horizontal(self) -> i8 {
        match self {
            Self::W | Self::Nw | Self::Sw => -1,
            Self::E | Self::Ne | Self::Se => 1,
            Self::N | Self::S => 0,
        }
    }

    /// `-1` moves the north edge, `1` the south edge, `0` neither.
    #[must_use]
    pub fn vertical(self) -> i8 {
        match self {
            Self::N | Self::Nw | Self::Ne => -1,
            Self::S | Self::Sw | Self::Se => 1,
            Self::E | Self::W => 0,
        }
    }

    /// Where this handle sits on `bounds`.
    #[must_use]
    pub fn handle_point(self, bounds: Rect) -> Point {
        let x = match self.horizontal() {
            -1 => bounds.x,
            0 => bounds.x + bounds.width * 0.5,
            _ => bounds.right(),
        };
        let y = match self.vertical() {
            -1 => bounds.y,
            0 => bounds.y + bounds.height * 0.5,
            _ => bounds.bottom(),
        };
        Point::new(x, y)
    }

    /// CSS cursor shown while hovering this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// Which part of an editable box was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(Direction),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: EntityId,
    pub part: HitPart,
}

/// Test a display-space point against an editable box: handles first, then body.
#[must_use]
pub fn hit_box(pt: Point, bounds: Rect) -> Option<HitPart> {
    for dir in Direction::ALL {
        if dir.handle_point(bounds).distance(pt) <= HANDLE_RADIUS_PX {
            return Some(HitPart::Handle(dir));
        }
    }
    bounds.contains(pt, 0.0).then_some(HitPart::Body)
}

/// Topmost editable box under `pt`. Later entries are drawn above earlier ones.
#[must_use]
pub fn hit_boxes(pt: Point, boxes: &[(EntityId, Rect)]) -> Option<Hit> {
    boxes
        .iter()
        .rev()
        .find_map(|(id, bounds)| hit_box(pt, *bounds).map(|part| Hit { id: *id, part }))
}

/// Whether `pt` touches the drawn shape, with `slop` pixels of tolerance.
#[must_use]
pub fn shape_contains(shape: &Renderable, pt: Point, slop: f64) -> bool {
    match shape {
        Renderable::Box { bounds, corner_radius_pct } if *corner_radius_pct >= 50.0 => {
            ellipse_contains(*bounds, pt, slop)
        }
        Renderable::Box { bounds, .. } | Renderable::Path { bounds } => bounds.contains(pt, slop),
        Renderable::Arrow(arrow) => {
            distance_to_segment(pt, arrow.start, arrow.tip) <= arrow.thickness * 0.5 + slop
        }
        Renderable::Dot { center, radius } => center.distance(pt) <= radius + slop,
        Renderable::Text { anchor } => anchor.distance(pt) <= slop * 2.0,
    }
}

/// Topmost shape under `pt`. Later entries are drawn above earlier ones.
#[must_use]
pub fn hit_shapes<'a, I>(pt: Point, shapes: I) -> Option<EntityId>
where
    I: DoubleEndedIterator<Item = (EntityId, &'a Renderable)>,
{
    shapes
        .rev()
        .find(|(_, shape)| shape_contains(shape, pt, HANDLE_RADIUS_PX * 0.5))
        .map(|(id, _)| id)
}

fn ellipse_contains(bounds: Rect, pt: Point, slop: f64) -> bool {
    let rx = bounds.width.abs() * 0.5 + slop;
    let ry = bounds.height.abs() * 0.5 + slop;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = bounds.center();
    let nx = (pt.x - c.x) / rx;
    let ny = (pt.y - c.y) / ry;
    nx * nx + ny * ny <= 1.0
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
