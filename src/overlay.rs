//! Overlay renderer: turns annotations and findings into draw-ready items.
//!
//! ARCHITECTURE
//! ============
//! The renderer reads a [`Scene`] (layout, documents, session state, and the
//! caller's visibility preferences) and produces a flat list of
//! [`OverlayItem`]s in paint order. It never mutates anything it reads. The
//! host draws the items with whatever toolkit it uses and forwards pointer
//! events back to the engine.
//!
//! Paint order is idle entities, then hovered ones, then entities with an
//! active edit session, each group keeping document order.
//!
//! Annotations are drawn as the user last asked for them: a drawn annotation
//! the bridge has not confirmed (or rejected) still renders, and a rejected
//! text change still shows its requested text, each carrying its write
//! status. Order badges run 1..n over annotations and continue over findings.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use std::borrow::Cow;
use std::collections::HashMap;

use crate::doc::{Annotation, DocStore, EntityId, Finding};
use crate::geometry::{Renderable, ShapeKind};
use crate::session::{EditSessionManager, EditStatus, Indicator};
use crate::transform::{DisplayMetrics, Layout, Point};
use crate::writes::{AnnotationWrites, Write};

/// Caller-owned inputs that gate visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayInputs {
    /// "Show solved marks" preference.
    pub show_solved: bool,
    /// Playback position in seconds, for video/audio assets.
    pub current_time: Option<f64>,
}

/// Whether an annotation passes the solved and playback-window filters.
#[must_use]
pub fn is_visible(annotation: &Annotation, inputs: &OverlayInputs) -> bool {
    if annotation.solved && !inputs.show_solved {
        return false;
    }
    let Some(t) = inputs.current_time else {
        return true;
    };
    let after_start = annotation.start_at.is_none_or(|start| t >= start);
    let before_end = annotation.end_at.is_none_or(|end| t <= end);
    after_start && before_end
}

/// Paint layer; later layers draw above earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Idle,
    Hovered,
    Editing,
}

/// Which document an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Annotation,
    Finding,
}

/// Numbered order marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Badge {
    pub order: u32,
    pub center: Point,
    pub radius: f64,
}

/// Which side of its anchor a tooltip opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Below,
    Above,
}

/// Floating tooltip for a hovered or focused entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub anchor: Point,
    pub placement: Placement,
    pub text: Option<String>,
    /// Resolved attachment URL; absent until the host resolves it.
    pub thumbnail_url: Option<String>,
}

/// One draw-ready overlay entity.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    pub id: EntityId,
    pub kind: EntityKind,
    pub shape: Renderable,
    pub color: Option<String>,
    pub badge: Option<Badge>,
    pub tooltip: Option<Tooltip>,
    pub layer: Layer,
    /// Transient click-to-scroll highlight.
    pub highlighted: bool,
    pub status: EditStatus,
    pub indicator: Option<Indicator>,
    /// Draw the eight resize handles.
    pub show_handles: bool,
}

/// Hover, focus, and highlight state for one surface.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    hovered: Option<EntityId>,
    focused: Option<EntityId>,
    highlight: Option<(EntityId, f64)>,
}

impl Interaction {
    /// Set the hovered entity. Returns whether it changed.
    pub fn hover(&mut self, id: Option<EntityId>) -> bool {
        let changed = self.hovered != id;
        self.hovered = id;
        changed
    }

    /// Set the keyboard-focused entity. Returns whether it changed.
    pub fn focus(&mut self, id: Option<EntityId>) -> bool {
        let changed = self.focused != id;
        self.focused = id;
        changed
    }

    /// Highlight `id` until `expires_ms`.
    pub fn highlight(&mut self, id: EntityId, expires_ms: f64) {
        self.highlight = Some((id, expires_ms));
    }

    /// Drop an expired highlight. Returns whether it changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        match self.highlight {
            Some((_, expires)) if now_ms >= expires => {
                self.highlight = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    #[must_use]
    pub fn focused(&self) -> Option<EntityId> {
        self.focused
    }

    #[must_use]
    pub fn is_highlighted(&self, id: &EntityId) -> bool {
        self.highlight.is_some_and(|(h, _)| h == *id)
    }

    fn shows_tooltip(&self, id: &EntityId) -> bool {
        self.hovered.as_ref() == Some(id) || self.focused.as_ref() == Some(id)
    }

    /// Forget references to entities that no longer exist.
    pub fn forget(&mut self, id: &EntityId) {
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
        if self.highlight.is_some_and(|(h, _)| h == *id) {
            self.highlight = None;
        }
    }
}

/// Storage-path to displayable-URL map for attachment thumbnails.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailCache {
    urls: HashMap<String, String>,
}

impl ThumbnailCache {
    pub fn insert(&mut self, storage_path: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(storage_path.into(), url.into());
    }

    #[must_use]
    pub fn get(&self, storage_path: &str) -> Option<&str> {
        self.urls.get(storage_path).map(String::as_str)
    }

    /// Storage paths referenced by `doc` that are not resolved yet.
    #[must_use]
    pub fn missing(&self, doc: &DocStore) -> Vec<String> {
        let mut paths: Vec<String> = doc
            .iter()
            .filter_map(|a| a.attachment_image_url.as_deref())
            .filter(|p| !self.urls.contains_key(*p))
            .map(str::to_owned)
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}

/// Everything the renderer reads.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub layout: &'a Layout,
    pub doc: &'a DocStore,
    pub findings: &'a [Finding],
    pub sessions: &'a EditSessionManager,
    pub writes: &'a AnnotationWrites,
    pub interaction: &'a Interaction,
    pub thumbnails: &'a ThumbnailCache,
    pub inputs: OverlayInputs,
    pub marker_radius: f64,
}

/// Render the scene in paint order. Empty while the layout is not renderable.
#[must_use]
pub fn render(scene: &Scene<'_>) -> Vec<OverlayItem> {
    let Some(metrics) = scene.layout.metrics() else {
        return Vec::new();
    };
    let mut items = render_annotations(scene, metrics);
    let first_finding_order = items.len() + 1;
    items.extend(render_findings(scene, metrics, first_finding_order));
    items.sort_by_key(|item| item.layer);
    items
}

/// Visible, renderable, top-level annotations with 1-based orders assigned
/// in render order. Unconfirmed creates follow the stored annotations.
fn render_annotations(scene: &Scene<'_>, metrics: &DisplayMetrics) -> Vec<OverlayItem> {
    let stored = scene.doc.top_level().map(|a| local_view(a, scene.writes));
    let unconfirmed = scene
        .writes
        .unconfirmed_creates()
        .into_iter()
        .filter(|a| !a.is_reply() && scene.doc.get(&a.id).is_none())
        .map(Cow::Borrowed);

    let mut items = Vec::new();
    for annotation in stored.chain(unconfirmed) {
        let annotation: &Annotation = &annotation;
        if !is_visible(annotation, &scene.inputs) {
            continue;
        }
        let Some(shape) = annotation_shape(annotation, metrics, scene.marker_radius) else {
            continue;
        };
        let order = u32::try_from(items.len() + 1).unwrap_or(u32::MAX);
        let id = annotation.id;
        let tooltip = if scene.interaction.shows_tooltip(&id) {
            let thumbnail_url = annotation
                .attachment_image_url
                .as_deref()
                .and_then(|p| scene.thumbnails.get(p))
                .map(str::to_owned);
            tooltip_for(&shape, annotation.text.clone(), thumbnail_url)
        } else {
            None
        };
        items.push(OverlayItem {
            id,
            kind: EntityKind::Annotation,
            badge: Some(Badge { order, center: shape.anchor(), radius: scene.marker_radius }),
            shape,
            color: annotation.color.clone(),
            tooltip,
            layer: if scene.interaction.hovered() == Some(id) { Layer::Hovered } else { Layer::Idle },
            highlighted: scene.interaction.is_highlighted(&id),
            status: scene.writes.status(&id),
            indicator: scene.writes.indicator(&id),
            show_handles: false,
        });
    }
    items
}

/// Localized findings, drawn from their in-progress rect while edited.
fn render_findings(scene: &Scene<'_>, metrics: &DisplayMetrics, first_order: usize) -> Vec<OverlayItem> {
    let mut items = Vec::new();
    for finding in scene.findings {
        let id = finding.id;
        let Some(area) = scene.sessions.display_rect(&id).or(finding.area) else {
            continue;
        };
        let shape = ShapeKind::Rect.geometry(area, metrics, scene.marker_radius);
        let status = scene.sessions.status(&id);
        let layer = match status {
            EditStatus::Editing | EditStatus::Dirty | EditStatus::Saving => Layer::Editing,
            EditStatus::Idle | EditStatus::Error if scene.interaction.hovered() == Some(id) => Layer::Hovered,
            EditStatus::Idle | EditStatus::Error => Layer::Idle,
        };
        let order = u32::try_from(first_order + items.len()).unwrap_or(u32::MAX);
        let tooltip = if scene.interaction.shows_tooltip(&id) && !status.is_open() {
            tooltip_for(&shape, finding_text(finding), None)
        } else {
            None
        };
        items.push(OverlayItem {
            id,
            kind: EntityKind::Finding,
            badge: Some(Badge { order, center: shape.anchor(), radius: scene.marker_radius }),
            shape,
            color: finding.color.clone(),
            tooltip,
            layer,
            highlighted: scene.interaction.is_highlighted(&id),
            status,
            indicator: scene.sessions.indicator(&id),
            show_handles: status.is_open(),
        });
    }
    items
}

/// The annotation with a retained, unconfirmed update applied.
fn local_view<'a>(annotation: &'a Annotation, writes: &AnnotationWrites) -> Cow<'a, Annotation> {
    match writes.retained(&annotation.id) {
        Some(Write::Update(patch)) => {
            let mut local = annotation.clone();
            local.apply(patch);
            Cow::Owned(local)
        }
        _ => Cow::Borrowed(annotation),
    }
}

/// Shape for an annotation, or `None` when it lacks a tool shape, rect, or color.
fn annotation_shape(annotation: &Annotation, metrics: &DisplayMetrics, marker_radius: f64) -> Option<Renderable> {
    let kind = annotation.tool.shape()?;
    let rect = annotation.rect?;
    annotation.color.as_ref()?;
    Some(kind.geometry(rect, metrics, marker_radius))
}

/// Tooltip near the shape; for arrows it follows the tip and opens away from the start.
fn tooltip_for(shape: &Renderable, text: Option<String>, thumbnail_url: Option<String>) -> Option<Tooltip> {
    let text = text.filter(|t| !t.trim().is_empty());
    if text.is_none() && thumbnail_url.is_none() {
        return None;
    }
    let placement = match shape {
        Renderable::Arrow(arrow) if arrow.tip.y < arrow.start.y => Placement::Above,
        _ => Placement::Below,
    };
    Some(Tooltip { anchor: shape.far_end(), placement, text, thumbnail_url })
}

fn finding_text(finding: &Finding) -> Option<String> {
    match (&finding.title, &finding.description) {
        (Some(title), Some(desc)) => Some(format!("{title}\n{desc}")),
        (Some(one), None) | (None, Some(one)) => Some(one.clone()),
        (None, None) => None,
    }
}
