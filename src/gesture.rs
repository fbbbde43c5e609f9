//! Annotation creation gesture: pointer-down, moves, pointer-up.
//!
//! The gesture works in natural space; the engine converts pointer positions
//! through the inverse transform before calling in. The start point lives on
//! [`ToolState`] so that a tool switch drops an in-progress gesture.
//! Nothing is persisted until release, when the candidate becomes an
//! [`Annotation`] (or a search crop) for the host to hand to the bridge.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use serde_json::json;
use tracing::debug;

use crate::doc::{Annotation, AnnotationTool};
use crate::tool::{Tool, ToolState};
use crate::transform::{Point, Rect};

/// Live preview of an in-progress gesture, in natural space.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Rect, circle, or text box being dragged out.
    Shape { tool: AnnotationTool, rect: Rect },
    /// Arrow from `start` by `(dx, dy)`.
    Vector { start: Point, dx: f64, dy: f64 },
    /// Freehand stroke so far.
    Stroke { points: Vec<Point> },
    /// Search crop region.
    Crop { rect: Rect },
}

/// What a completed gesture produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// A new annotation, not yet persisted.
    Annotation(Annotation),
    /// A natural-space crop to search with.
    SearchRegion(Rect),
}

/// Per-surface creation gesture tracker.
#[derive(Debug, Default)]
pub struct CreationGesture {
    current: Option<Point>,
    path: Vec<Point>,
}

impl CreationGesture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gesture at `at` if the active tool draws. Returns whether it started.
    pub fn pointer_down(&mut self, tools: &mut ToolState, at: Point) -> bool {
        if !tools.tool().captures_gesture() {
            return false;
        }
        tools.begin_gesture(at);
        self.current = Some(at);
        self.path.clear();
        if tools.tool() == Tool::Pen {
            self.path.push(at);
        }
        true
    }

    /// Track the pointer and return the updated preview, if a gesture is active.
    pub fn pointer_move(&mut self, tools: &ToolState, at: Point) -> Option<Preview> {
        tools.start_pos()?;
        self.current = Some(at);
        if tools.tool() == Tool::Pen {
            self.path.push(at);
        }
        self.preview(tools)
    }

    /// Current preview without advancing the gesture.
    #[must_use]
    pub fn preview(&self, tools: &ToolState) -> Option<Preview> {
        let start = tools.start_pos()?;
        let end = self.current.unwrap_or(start);
        match tools.tool() {
            Tool::Arrow => Some(Preview::Vector { start, dx: end.x - start.x, dy: end.y - start.y }),
            Tool::Pen => Some(Preview::Stroke { points: self.path.clone() }),
            Tool::Search => Some(Preview::Crop { rect: Rect::from_corners(start, end) }),
            tool => tool
                .annotation_tool()
                .map(|kind| Preview::Shape { tool: kind, rect: Rect::from_corners(start, end) }),
        }
    }

    /// Finish the gesture at `at`.
    ///
    /// A click without drag still yields a zero-size rect. A pen stroke with
    /// fewer than two points is discarded.
    pub fn pointer_up(&mut self, tools: &mut ToolState, at: Point) -> Option<GestureOutcome> {
        tools.start_pos()?;
        self.current = Some(at);
        if tools.tool() == Tool::Pen && self.path.last() != Some(&at) {
            self.path.push(at);
        }
        let preview = self.preview(tools);
        let brush_size = tools.brush_size();
        let color = tools.color().to_owned();
        tools.end_gesture();
        let path = std::mem::take(&mut self.path);
        self.current = None;

        let outcome = match preview? {
            Preview::Shape { tool, rect } => {
                GestureOutcome::Annotation(Annotation::new(tool, Some(rect), Some(color)))
            }
            Preview::Vector { start, dx, dy } => GestureOutcome::Annotation(Annotation::new(
                AnnotationTool::Arrow,
                Some(Rect::new(start.x, start.y, dx, dy)),
                Some(color),
            )),
            Preview::Stroke { .. } => {
                if path.len() < 2 {
                    debug!("discarding single-point stroke");
                    return None;
                }
                let rect = Rect::bounding(&path)?;
                let points: Vec<[f64; 2]> = path.iter().map(|p| [p.x, p.y]).collect();
                let mut annotation = Annotation::new(AnnotationTool::Pen, Some(rect), Some(color));
                annotation.payload = Some(json!({ "points": points, "brush_size": brush_size }));
                GestureOutcome::Annotation(annotation)
            }
            Preview::Crop { rect } => GestureOutcome::SearchRegion(rect),
        };

        if let GestureOutcome::Annotation(a) = &outcome {
            debug!(annotation_id = %a.id, tool = ?a.tool, "creation gesture finalized");
        }
        Some(outcome)
    }

    /// Abandon any in-progress gesture.
    pub fn reset(&mut self, tools: &mut ToolState) {
        tools.end_gesture();
        self.current = None;
        self.path.clear();
    }

    #[must_use]
    pub fn is_active(&self, tools: &ToolState) -> bool {
        tools.start_pos().is_some()
    }
}
