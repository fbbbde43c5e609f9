//! Input model: modifier keys, mouse buttons, keys, and the pointer state machine.
//!
//! `PointerState` is the gesture the engine is tracking between pointer-down
//! and pointer-up. Creation gestures keep their own geometry in
//! [`crate::gesture`]; drags keep theirs in the edit-session manager's
//! pointer capture. This enum only records which of the two owns the stream.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::EntityId;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key, named as the host reports it (e.g. `"Escape"`, `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }

    /// Unit nudge direction for arrow keys, `None` for anything else.
    #[must_use]
    pub fn arrow_delta(&self) -> Option<(f64, f64)> {
        match self.0.as_str() {
            "ArrowLeft" => Some((-1.0, 0.0)),
            "ArrowRight" => Some((1.0, 0.0)),
            "ArrowUp" => Some((0.0, -1.0)),
            "ArrowDown" => Some((0.0, 1.0)),
            _ => None,
        }
    }
}

/// Which gesture currently owns the pointer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A creation gesture (shape, stroke, or search crop) is being dragged out.
    Creating,
    /// An editing box is being moved or resized.
    Dragging {
        /// Finding holding the pointer capture.
        id: EntityId,
    },
}
