//! Document model: annotations, findings, and the in-memory annotation store.
//!
//! `Annotation` is a mark on a specific frame/version of an asset, authored by
//! a user or by the AI. `Finding` is an AI observation that may carry an
//! `area`; findings arrive as a read-only feed and are only written back
//! through the finding bridge. `DocStore` holds annotations in creation order,
//! which is also the order the overlay renders them in.
//!
//! The store is never mutated by the renderer. It changes only when the host
//! loads a snapshot or confirms a create/update/delete.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::ShapeKind;
use crate::transform::Rect;

/// Unique identifier for an annotation or finding.
pub type EntityId = Uuid;

/// The tool an annotation was authored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationTool {
    Rect,
    Circle,
    Arrow,
    Text,
    Pen,
    /// Text-only comment thread.
    Comment,
    /// AI-authored rectangle.
    AiAnnotation,
    /// AI-authored comment with no shape.
    AiComment,
}

impl AnnotationTool {
    /// Render strategy for this tool, or `None` for pure comment threads.
    #[must_use]
    pub fn shape(self) -> Option<ShapeKind> {
        match self {
            Self::Rect | Self::AiAnnotation => Some(ShapeKind::Rect),
            Self::Circle => Some(ShapeKind::Circle),
            Self::Arrow => Some(ShapeKind::Arrow),
            Self::Text => Some(ShapeKind::Text),
            Self::Pen => Some(ShapeKind::Pen),
            Self::Comment | Self::AiComment => None,
        }
    }
}

/// An annotation as stored and exchanged with the annotation bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Client-generated at creation time.
    pub id: EntityId,
    pub tool: AnnotationTool,
    /// Natural-space bounds; for arrows `width`/`height` are the signed delta.
    #[serde(default)]
    pub rect: Option<Rect>,
    /// Required for any shape tool; an uncolored shape is not rendered.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// 1-based display index, assigned at render time.
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub solved: bool,
    /// Playback window in seconds.
    #[serde(default)]
    pub start_at: Option<f64>,
    #[serde(default)]
    pub end_at: Option<f64>,
    /// Parent annotation when this is a threaded reply.
    #[serde(default)]
    pub to: Option<EntityId>,
    /// Raw storage reference, resolved by the host into a displayable URL.
    #[serde(default)]
    pub attachment_image_url: Option<String>,
    /// Opaque tool-specific data (pen stroke points).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Annotation {
    /// A fresh, unsolved annotation with a new id.
    #[must_use]
    pub fn new(tool: AnnotationTool, rect: Option<Rect>, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            rect,
            color,
            text: None,
            order: 0,
            solved: false,
            start_at: None,
            end_at: None,
            to: None,
            attachment_image_url: None,
            payload: None,
        }
    }

    /// A text reply threaded under `parent`.
    #[must_use]
    pub fn reply(parent: EntityId, text: String) -> Self {
        Self { to: Some(parent), text: Some(text), ..Self::new(AnnotationTool::Comment, None, None) }
    }

    #[must_use]
    pub fn is_reply(&self) -> bool {
        self.to.is_some()
    }

    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: &AnnotationPatch) {
        if let Some(text) = &patch.text {
            self.text = Some(text.clone());
        }
        if let Some(rect) = patch.rect {
            self.rect = Some(rect);
        }
    }
}

/// Sparse update for an annotation. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
}

impl AnnotationPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.rect.is_none()
    }
}

/// An AI finding from the findings feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: EntityId,
    /// Natural-space bounding box, when the finding is localized.
    #[serde(default)]
    pub area: Option<Rect>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// In-memory store of annotations, kept in creation order.
#[derive(Debug, Default)]
pub struct DocStore {
    annotations: Vec<Annotation>,
    index: HashMap<EntityId, usize>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a fetched list, preserving its order.
    pub fn load_snapshot(&mut self, annotations: Vec<Annotation>) {
        self.annotations.clear();
        self.index.clear();
        for annotation in annotations {
            self.insert(annotation);
        }
    }

    /// Insert or replace an annotation. A replaced annotation keeps its position.
    pub fn insert(&mut self, annotation: Annotation) {
        if let Some(&i) = self.index.get(&annotation.id) {
            self.annotations[i] = annotation;
        } else {
            self.index.insert(annotation.id, self.annotations.len());
            self.annotations.push(annotation);
        }
    }

    /// Remove an annotation and its replies, returning the annotation if present.
    pub fn remove(&mut self, id: &EntityId) -> Option<Annotation> {
        let i = *self.index.get(id)?;
        let removed = self.annotations.remove(i);
        self.annotations.retain(|a| a.to != Some(*id));
        self.reindex();
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&Annotation> {
        self.index.get(id).map(|&i| &self.annotations[i])
    }

    /// Apply a patch. Returns false if the annotation doesn't exist.
    pub fn apply_patch(&mut self, id: &EntityId, patch: &AnnotationPatch) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        self.annotations[i].apply(patch);
        true
    }

    /// All annotations in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Annotations that are not replies, in creation order.
    pub fn top_level(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| !a.is_reply())
    }

    /// Replies threaded under `id`, in creation order.
    #[must_use]
    pub fn replies(&self, id: &EntityId) -> Vec<&Annotation> {
        self.annotations.iter().filter(|a| a.to == Some(*id)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    fn reindex(&mut self) {
        self.index = self.annotations.iter().enumerate().map(|(i, a)| (a.id, i)).collect();
    }
}
