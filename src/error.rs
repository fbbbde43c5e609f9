//! Error types.
//!
//! Geometry and tool-state problems are never errors; they degrade to a safe
//! visual state. Only edit-session rejections, persistence failures, and
//! configuration problems are represented here.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::doc::EntityId;

/// Stable machine-readable code for an error, for hosts that map errors to UI.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Why the edit-session manager refused a transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("editing is disabled")]
    EditingDisabled,
    #[error("entity {0} has no area to edit")]
    NoArea(EntityId),
    #[error("entity {0} has a save in flight")]
    SaveInFlight(EntityId),
    #[error("entity {0} has no open edit session")]
    NoSession(EntityId),
    #[error("pointer is captured by entity {0}")]
    PointerCaptured(EntityId),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EditingDisabled => "E_EDITING_DISABLED",
            Self::NoArea(_) => "E_NO_AREA",
            Self::SaveInFlight(_) => "E_SAVE_IN_FLIGHT",
            Self::NoSession(_) => "E_NO_SESSION",
            Self::PointerCaptured(_) => "E_POINTER_CAPTURED",
        }
    }
}

/// A rejected persistence call, as reported by the host's bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("not found: {0}")]
    NotFound(EntityId),
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ErrorCode for PersistError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "E_PERSIST_REJECTED",
            Self::NotFound(_) => "E_PERSIST_NOT_FOUND",
            Self::Transport(_) => "E_PERSIST_TRANSPORT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Invalid surface configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be positive, got {value}")]
    NotPositive { key: &'static str, value: f64 },
    #[error("{key} is not a boolean: {raw}")]
    InvalidBool { key: &'static str, raw: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotPositive { .. } => "E_CONFIG_NOT_POSITIVE",
            Self::InvalidBool { .. } => "E_CONFIG_INVALID_BOOL",
        }
    }
}
