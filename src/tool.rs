//! Tool state machine: active tool, color, brush size, and modifier modes.
//!
//! `ToolState` decides which gesture the pointer stream feeds. The three
//! modes (search crop, freehand drawing, color sampling) are mutually
//! exclusive, so they are stored as a single [`Mode`] and exposed through the
//! boolean accessors callers expect.

#[cfg(test)]
#[path = "tool_test.rs"]
mod tool_test;

use tracing::debug;

use crate::consts::{BRUSH_SIZE_MAX, BRUSH_SIZE_MIN, DEFAULT_BRUSH_SIZE, DEFAULT_COLOR};
use crate::doc::AnnotationTool;
use crate::transform::Point;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Navigation and selection (default).
    #[default]
    Cursor,
    Rect,
    Circle,
    Arrow,
    Text,
    /// Freehand stroke.
    Pen,
    /// Drag a crop region to search with.
    Search,
    /// Sample a color from the screen.
    ColorPicker,
}

impl Tool {
    /// Tools whose drag produces a single-rect annotation.
    #[must_use]
    pub fn is_shape(self) -> bool {
        matches!(self, Self::Rect | Self::Circle | Self::Arrow | Self::Text)
    }

    /// Tools that consume the creation gesture (shapes, pen, search crop).
    #[must_use]
    pub fn captures_gesture(self) -> bool {
        self.is_shape() || matches!(self, Self::Pen | Self::Search)
    }

    /// The annotation tool recorded on marks made with this tool.
    #[must_use]
    pub fn annotation_tool(self) -> Option<AnnotationTool> {
        match self {
            Self::Rect => Some(AnnotationTool::Rect),
            Self::Circle => Some(AnnotationTool::Circle),
            Self::Arrow => Some(AnnotationTool::Arrow),
            Self::Text => Some(AnnotationTool::Text),
            Self::Pen => Some(AnnotationTool::Pen),
            Self::Cursor | Self::Search | Self::ColorPicker => None,
        }
    }
}

/// Mutually exclusive modifier mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    None,
    Search,
    Drawing,
    ColorPicker,
}

/// Host capability for sampling a color under the pointer.
pub trait ColorSampler {
    /// Whether sampling is supported in this environment.
    fn is_available(&self) -> bool;
}

/// A sampler for environments with no sampling support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSampler;

impl ColorSampler for NoSampler {
    fn is_available(&self) -> bool {
        false
    }
}

/// Outcome of [`ToolState::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChange {
    /// The tool is now active.
    Selected,
    /// Color picker is active; the host should start sampling.
    SamplingRequested,
    /// Sampling is unsupported; the tool fell back to `Cursor`.
    SamplingUnavailable,
}

/// Persistent drawing-tool state.
#[derive(Debug, Clone)]
pub struct ToolState {
    current_tool: Tool,
    current_color: String,
    brush_size: f64,
    mode: Mode,
    /// Natural-space start of an in-progress creation gesture.
    start_pos: Option<Point>,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            current_tool: Tool::Cursor,
            current_color: DEFAULT_COLOR.to_owned(),
            brush_size: DEFAULT_BRUSH_SIZE,
            mode: Mode::None,
            start_pos: None,
        }
    }
}

impl ToolState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools.
    ///
    /// Any in-progress gesture is dropped unless `tool` is already current.
    /// Search, pen, and color picker each set their own mode; every other
    /// tool clears the mode.
    pub fn select(&mut self, tool: Tool, sampler: &dyn ColorSampler) -> ToolChange {
        if tool != self.current_tool {
            self.start_pos = None;
        }

        if tool == Tool::ColorPicker && !sampler.is_available() {
            debug!("color sampling unavailable; reverting to cursor");
            self.current_tool = Tool::Cursor;
            self.mode = Mode::None;
            return ToolChange::SamplingUnavailable;
        }

        self.current_tool = tool;
        self.mode = match tool {
            Tool::Search => Mode::Search,
            Tool::Pen => Mode::Drawing,
            Tool::ColorPicker => Mode::ColorPicker,
            _ => Mode::None,
        };
        debug!(?tool, mode = ?self.mode, "tool selected");

        if tool == Tool::ColorPicker {
            ToolChange::SamplingRequested
        } else {
            ToolChange::Selected
        }
    }

    /// Finish a color sample. A sampled color becomes current; either way the
    /// tool returns to `Cursor`.
    pub fn finish_sampling(&mut self, color: Option<String>) {
        if let Some(color) = color {
            self.current_color = color;
        }
        self.current_tool = Tool::Cursor;
        self.mode = Mode::None;
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.current_tool
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.current_color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.current_color = color.into();
    }

    #[must_use]
    pub fn brush_size(&self) -> f64 {
        self.brush_size
    }

    /// Set the pen brush size, clamped to the supported range.
    pub fn set_brush_size(&mut self, size: f64) {
        if size.is_finite() {
            self.brush_size = size.clamp(BRUSH_SIZE_MIN, BRUSH_SIZE_MAX);
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn is_search_mode(&self) -> bool {
        self.mode == Mode::Search
    }

    #[must_use]
    pub fn is_drawing_mode(&self) -> bool {
        self.mode == Mode::Drawing
    }

    #[must_use]
    pub fn is_color_picker_mode(&self) -> bool {
        self.mode == Mode::ColorPicker
    }

    #[must_use]
    pub fn start_pos(&self) -> Option<Point> {
        self.start_pos
    }

    pub(crate) fn begin_gesture(&mut self, at: Point) {
        self.start_pos = Some(at);
    }

    pub(crate) fn end_gesture(&mut self) -> Option<Point> {
        self.start_pos.take()
    }
}
