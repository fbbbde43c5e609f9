//! Surface engine: routes host pointer and key events into tool, gesture, and
//! edit-session state, and tells the host what to do next.
//!
//! Every handler returns a list of [`Action`]s. Persistence actions carry
//! everything the host needs to call the bridge (or to hand to
//! [`crate::persistence::Bridge`]); the outcome comes back through
//! [`EngineCore::apply_settled`] or the individual `on_*` callbacks. The
//! annotation store only changes when the host confirms a write; until then
//! [`AnnotationWrites`] tracks the write so the overlay can show it, and a
//! rejected write stays retained until it is retried or discarded.
//!
//! Pointer positions are display-space pixels in the same coordinate frame as
//! the rendered image rect handed to [`EngineCore::set_layout`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;

use tracing::debug;

use crate::config::SurfaceConfig;
use crate::consts::NUDGE_STEP_PX;
use crate::doc::{Annotation, AnnotationPatch, DocStore, EntityId, Finding};
use crate::error::{PersistError, SessionError};
use crate::gesture::{CreationGesture, GestureOutcome, Preview};
use crate::hit::{self, HitPart};
use crate::input::{Button, Key, Modifiers, PointerState};
use crate::overlay::{self, Interaction, OverlayInputs, OverlayItem, Scene, ThumbnailCache};
use crate::persistence::Settled;
use crate::session::{DragKind, EditSessionManager};
use crate::tool::{ColorSampler, NoSampler, Tool, ToolChange, ToolState};
use crate::transform::{DisplayMetrics, Layout, Point, Rect, Size};
use crate::writes::{AnnotationWrites, Write};

const CURSOR_DEFAULT: &str = "default";
const CURSOR_MOVE: &str = "move";
const CURSOR_POINTER: &str = "pointer";

/// Instruction for the host produced by an engine handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Persist a newly drawn annotation.
    CreateAnnotation(Annotation),
    /// Persist a text/rect change to an annotation.
    UpdateAnnotation { id: EntityId, patch: AnnotationPatch },
    /// Delete an annotation.
    DeleteAnnotation { id: EntityId },
    /// Persist a finding's new bounding box.
    SaveArea { finding_id: EntityId, rect: Rect },
    /// Run a region search with this natural-space crop.
    SearchRegion(Rect),
    /// Start host color sampling; answer with [`EngineCore::on_color_sampled`].
    SampleColor,
    /// Scroll the matching list entry into view.
    ScrollIntoView { id: EntityId },
    /// Change the CSS cursor over the surface.
    SetCursor(String),
    /// Overlay state changed; call [`EngineCore::render`] again.
    RenderNeeded,
}

/// Core engine state for one rendering surface.
pub struct EngineCore {
    pub doc: DocStore,
    pub findings: Vec<Finding>,
    pub tools: ToolState,
    pub layout: Layout,
    pub sessions: EditSessionManager,
    pub interaction: Interaction,
    pub thumbnails: ThumbnailCache,
    pub config: SurfaceConfig,
    pub inputs: OverlayInputs,
    pub writes: AnnotationWrites,
    gesture: CreationGesture,
    pointer: PointerState,
    sampler: Box<dyn ColorSampler>,
    cursor: &'static str,
    now_ms: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            doc: DocStore::new(),
            findings: Vec::new(),
            tools: ToolState::new(),
            layout: Layout::default(),
            sessions: EditSessionManager::new(config.min_box_px, config.indicator_ms),
            interaction: Interaction::default(),
            thumbnails: ThumbnailCache::default(),
            inputs: OverlayInputs { show_solved: config.show_solved, current_time: None },
            writes: AnnotationWrites::new(config.indicator_ms),
            config,
            gesture: CreationGesture::new(),
            pointer: PointerState::Idle,
            sampler: Box::new(NoSampler),
            cursor: CURSOR_DEFAULT,
            now_ms: 0.0,
        }
    }

    /// Install the host's color-sampling capability.
    #[must_use]
    pub fn with_sampler(mut self, sampler: Box<dyn ColorSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    // --- Host feeds ---

    /// Replace the annotation store with a fetched list.
    pub fn load_annotations(&mut self, annotations: Vec<Annotation>) -> Vec<Action> {
        self.doc.load_snapshot(annotations);
        vec![Action::RenderNeeded]
    }

    /// Replace the findings feed. Settled sessions take the new area; those
    /// whose finding vanished or lost its area are dropped.
    pub fn set_findings(&mut self, findings: Vec<Finding>) -> Vec<Action> {
        let areas: HashMap<EntityId, Option<Rect>> = findings.iter().map(|f| (f.id, f.area)).collect();
        self.sessions.sync_feed(|id| areas.get(id).copied().flatten());
        self.findings = findings;
        vec![Action::RenderNeeded]
    }

    /// Natural image size and the rect it is rendered into, in display pixels.
    pub fn set_layout(&mut self, natural: Size, rendered: Rect) -> Vec<Action> {
        self.layout.update(natural, rendered);
        vec![Action::RenderNeeded]
    }

    /// Forget the layout, e.g. while a new asset loads.
    pub fn clear_layout(&mut self) -> Vec<Action> {
        self.layout.clear();
        self.abandon_pointer();
        vec![Action::RenderNeeded]
    }

    pub fn set_playback_time(&mut self, seconds: Option<f64>) -> Vec<Action> {
        self.inputs.current_time = seconds;
        vec![Action::RenderNeeded]
    }

    pub fn set_show_solved(&mut self, show: bool) -> Vec<Action> {
        self.inputs.show_solved = show;
        vec![Action::RenderNeeded]
    }

    /// Advance the host clock and expire transient indicators and highlights.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        self.advance_clock(now_ms);
        let sessions = self.sessions.tick(now_ms);
        let writes = self.writes.tick(now_ms);
        let highlight = self.interaction.tick(now_ms);
        if sessions || writes || highlight { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Tools ---

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let change = self.tools.select(tool, self.sampler.as_ref());
        if self.pointer == PointerState::Creating && !self.gesture.is_active(&self.tools) {
            self.gesture.reset(&mut self.tools);
            self.pointer = PointerState::Idle;
        }
        match change {
            ToolChange::SamplingRequested => vec![Action::SampleColor, Action::RenderNeeded],
            ToolChange::Selected | ToolChange::SamplingUnavailable => vec![Action::RenderNeeded],
        }
    }

    /// Answer to [`Action::SampleColor`]. `None` means the user dismissed the sampler.
    pub fn on_color_sampled(&mut self, color: Option<String>) -> Vec<Action> {
        self.tools.finish_sampling(color);
        vec![Action::RenderNeeded]
    }

    /// Live preview of the creation gesture, in natural space.
    #[must_use]
    pub fn preview(&self) -> Option<Preview> {
        self.gesture.preview(&self.tools)
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let Some(metrics) = self.layout.metrics().copied() else {
            return Vec::new();
        };

        if self.tools.tool().captures_gesture() {
            if self.gesture.pointer_down(&mut self.tools, metrics.point_to_natural(pt)) {
                self.pointer = PointerState::Creating;
                return vec![Action::RenderNeeded];
            }
            return Vec::new();
        }
        if self.tools.tool() != Tool::Cursor {
            return Vec::new();
        }

        let open_hit = hit::hit_boxes(pt, &self.open_boxes(&metrics));
        let mut actions = self.finish_sessions_except(open_hit.map(|h| h.id));

        if let Some(hit) = open_hit {
            let kind = match hit.part {
                HitPart::Body => DragKind::Move,
                HitPart::Handle(dir) => DragKind::Resize(dir),
            };
            match self.sessions.start_drag(hit.id, kind, pt) {
                Ok(()) => self.pointer = PointerState::Dragging { id: hit.id },
                Err(e) => debug!(finding_id = %hit.id, error = %e, "drag rejected"),
            }
            actions.push(Action::RenderNeeded);
            return actions;
        }

        let items = self.render();
        if let Some(id) = hit::hit_shapes(pt, items.iter().map(|i| (i.id, &i.shape))) {
            self.interaction.highlight(id, self.now_ms + self.config.highlight_ms);
            actions.push(Action::ScrollIntoView { id });
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_pointer_move(&mut self, pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let Some(metrics) = self.layout.metrics().copied() else {
            return Vec::new();
        };
        match self.pointer {
            PointerState::Creating => {
                if self.gesture.pointer_move(&self.tools, metrics.point_to_natural(pt)).is_some() {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            PointerState::Dragging { .. } => {
                if self.sessions.drag_to(pt, &metrics).is_some() {
                    vec![Action::RenderNeeded]
                } else {
                    self.pointer = PointerState::Idle;
                    Vec::new()
                }
            }
            PointerState::Idle => self.hover(pt, &metrics),
        }
    }

    /// Finish the active gesture. The host forwards pointer-up even when it
    /// happens outside the surface so a captured drag is always released.
    pub fn on_pointer_up(&mut self, pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.pointer) {
            PointerState::Creating => {
                let Some(metrics) = self.layout.metrics().copied() else {
                    self.gesture.reset(&mut self.tools);
                    return vec![Action::RenderNeeded];
                };
                let mut actions = Vec::new();
                match self.gesture.pointer_up(&mut self.tools, metrics.point_to_natural(pt)) {
                    Some(GestureOutcome::Annotation(annotation)) => {
                        match self.writes.begin(annotation.id, Write::Create(annotation.clone())) {
                            Ok(()) => actions.push(Action::CreateAnnotation(annotation)),
                            Err(e) => debug!(annotation_id = %annotation.id, error = %e, "create ignored"),
                        }
                    }
                    Some(GestureOutcome::SearchRegion(rect)) => actions.push(Action::SearchRegion(rect)),
                    None => {}
                }
                actions.push(Action::RenderNeeded);
                actions
            }
            PointerState::Dragging { .. } => {
                self.sessions.release_capture();
                vec![Action::RenderNeeded]
            }
            PointerState::Idle => Vec::new(),
        }
    }

    /// Double-click on a localized finding opens an edit session for it.
    pub fn on_double_click(&mut self, pt: Point) -> Vec<Action> {
        if self.tools.tool() != Tool::Cursor {
            return Vec::new();
        }
        let Some(metrics) = self.layout.metrics().copied() else {
            return Vec::new();
        };
        let boxes = self.finding_boxes(&metrics);
        let Some(hit) = hit::hit_boxes(pt, &boxes) else {
            return Vec::new();
        };
        match self.begin_edit(hit.id) {
            Ok(()) => vec![Action::RenderNeeded],
            Err(e) => {
                debug!(finding_id = %hit.id, error = %e, "edit session not started");
                Vec::new()
            }
        }
    }

    // --- Keyboard input ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if key.is("Escape") {
            return self.escape();
        }
        if key.is("Tab") {
            return self.cycle_focus(modifiers.shift);
        }
        let Some(id) = self.interaction.focused() else {
            return Vec::new();
        };
        if key.is("Enter") {
            if self.sessions.status(&id).is_open() {
                return self.commit(id);
            }
            return match self.begin_edit(id) {
                Ok(()) => vec![Action::RenderNeeded],
                Err(e) => {
                    debug!(finding_id = %id, error = %e, "edit session not started");
                    Vec::new()
                }
            };
        }
        if let Some((ux, uy)) = key.arrow_delta() {
            let step = if modifiers.shift { NUDGE_STEP_PX * 10.0 } else { NUDGE_STEP_PX };
            if self.sessions.nudge(id, ux * step, uy * step).is_ok() {
                return vec![Action::RenderNeeded];
            }
        }
        Vec::new()
    }

    // --- Edit sessions ---

    /// Open an edit session on a finding.
    ///
    /// # Errors
    ///
    /// See [`EditSessionManager::begin`]; also `NoArea` for an unknown finding.
    pub fn begin_edit(&mut self, finding_id: EntityId) -> Result<(), SessionError> {
        let area = self.findings.iter().find(|f| f.id == finding_id).and_then(|f| f.area);
        self.sessions.begin(finding_id, area, self.config.editing_enabled)
    }

    /// Explicitly commit one finding's edit.
    pub fn commit(&mut self, finding_id: EntityId) -> Vec<Action> {
        match self.sessions.finish(finding_id) {
            Ok(Some(rect)) => vec![Action::SaveArea { finding_id, rect }, Action::RenderNeeded],
            Ok(None) => vec![Action::RenderNeeded],
            Err(e) => {
                debug!(finding_id = %finding_id, error = %e, "commit ignored");
                Vec::new()
            }
        }
    }

    /// Answer to [`Action::SaveArea`].
    pub fn on_save_settled(&mut self, finding_id: EntityId, result: Result<(), PersistError>, now_ms: f64) -> Vec<Action> {
        self.advance_clock(now_ms);
        if self.sessions.settle(finding_id, result, now_ms).is_some() {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Annotations ---

    /// Request a text change; the store updates once the host confirms.
    pub fn edit_annotation_text(&mut self, id: EntityId, text: String) -> Vec<Action> {
        if self.doc.get(&id).is_none() {
            return Vec::new();
        }
        let patch = AnnotationPatch { text: Some(text), rect: None };
        self.submit(id, Write::Update(patch))
    }

    /// Request deletion; the store updates once the host confirms.
    pub fn delete_annotation(&mut self, id: EntityId) -> Vec<Action> {
        if self.doc.get(&id).is_none() {
            return Vec::new();
        }
        self.submit(id, Write::Delete)
    }

    /// Re-send a write the host rejected.
    pub fn retry_annotation(&mut self, id: EntityId) -> Vec<Action> {
        match self.writes.retry(id) {
            Some(write) => vec![write_action(id, write), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Drop a rejected write; the overlay falls back to the stored annotation.
    pub fn discard_annotation(&mut self, id: EntityId) -> Vec<Action> {
        match self.writes.discard(id) {
            Some(_) => vec![Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Answer to a successful [`Action::CreateAnnotation`].
    pub fn on_annotation_created(&mut self, local_id: EntityId, stored: Annotation, now_ms: f64) -> Vec<Action> {
        self.advance_clock(now_ms);
        self.writes.settle(local_id, Ok(()), now_ms);
        if stored.id != local_id {
            self.writes.forget(&local_id);
        }
        self.doc.insert(stored);
        vec![Action::RenderNeeded]
    }

    /// Answer to any rejected annotation write. The write is retained with
    /// an error status until [`Self::retry_annotation`] or
    /// [`Self::discard_annotation`].
    pub fn on_annotation_failed(&mut self, id: EntityId, error: &PersistError, now_ms: f64) -> Vec<Action> {
        self.advance_clock(now_ms);
        match self.writes.settle(id, Err(error.clone()), now_ms) {
            Some(_) => vec![Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    pub fn on_annotation_updated(&mut self, stored: Annotation, now_ms: f64) -> Vec<Action> {
        self.advance_clock(now_ms);
        self.writes.settle(stored.id, Ok(()), now_ms);
        self.doc.insert(stored);
        vec![Action::RenderNeeded]
    }

    pub fn on_annotation_deleted(&mut self, id: EntityId) -> Vec<Action> {
        self.writes.forget(&id);
        if self.doc.remove(&id).is_none() {
            return Vec::new();
        }
        self.interaction.forget(&id);
        vec![Action::RenderNeeded]
    }

    /// Route a settled persistence call to the matching callback.
    pub fn apply_settled(&mut self, settled: Settled, now_ms: f64) -> Vec<Action> {
        match settled {
            Settled::AnnotationCreated { local_id, result: Ok(stored) } => {
                self.on_annotation_created(local_id, stored, now_ms)
            }
            Settled::AnnotationUpdated { result: Ok(stored), .. } => self.on_annotation_updated(stored, now_ms),
            Settled::AnnotationDeleted { id, result: Ok(()) } => self.on_annotation_deleted(id),
            Settled::AnnotationCreated { local_id: id, result: Err(e) }
            | Settled::AnnotationUpdated { id, result: Err(e) }
            | Settled::AnnotationDeleted { id, result: Err(e) } => self.on_annotation_failed(id, &e, now_ms),
            Settled::AreaSaved { finding_id, result } => self.on_save_settled(finding_id, result, now_ms),
        }
    }

    /// Annotations handed to the bridge and not yet confirmed.
    #[must_use]
    pub fn pending_creates(&self) -> usize {
        self.writes.unconfirmed_creates().len()
    }

    // --- Render ---

    /// Draw-ready overlay items in paint order.
    #[must_use]
    pub fn render(&self) -> Vec<OverlayItem> {
        overlay::render(&Scene {
            layout: &self.layout,
            doc: &self.doc,
            findings: &self.findings,
            sessions: &self.sessions,
            writes: &self.writes,
            interaction: &self.interaction,
            thumbnails: &self.thumbnails,
            inputs: self.inputs,
            marker_radius: self.config.marker_radius_px,
        })
    }

    // --- Internals ---

    /// Host timestamps only move forward.
    fn advance_clock(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn submit(&mut self, id: EntityId, write: Write) -> Vec<Action> {
        match self.writes.begin(id, write.clone()) {
            Ok(()) => vec![write_action(id, write), Action::RenderNeeded],
            Err(e) => {
                debug!(annotation_id = %id, error = %e, "annotation write ignored");
                Vec::new()
            }
        }
    }

    /// Display-space boxes of localized findings, in feed order.
    fn finding_boxes(&self, metrics: &DisplayMetrics) -> Vec<(EntityId, Rect)> {
        self.findings
            .iter()
            .filter_map(|f| {
                let area = self.sessions.display_rect(&f.id).or(f.area)?;
                Some((f.id, metrics.rect_to_display(area)))
            })
            .collect()
    }

    /// Display-space boxes of findings with an open edit session.
    fn open_boxes(&self, metrics: &DisplayMetrics) -> Vec<(EntityId, Rect)> {
        self.finding_boxes(metrics)
            .into_iter()
            .filter(|(id, _)| self.sessions.status(id).is_open())
            .collect()
    }

    fn finish_sessions_except(&mut self, keep: Option<EntityId>) -> Vec<Action> {
        self.sessions
            .finish_all_except(keep)
            .into_iter()
            .map(|(finding_id, rect)| Action::SaveArea { finding_id, rect })
            .collect()
    }

    fn hover(&mut self, pt: Point, metrics: &DisplayMetrics) -> Vec<Action> {
        let mut actions = Vec::new();
        let (hovered, cursor) = match hit::hit_boxes(pt, &self.open_boxes(metrics)) {
            Some(hit) => {
                let cursor = match hit.part {
                    HitPart::Handle(dir) => dir.cursor(),
                    HitPart::Body => CURSOR_MOVE,
                };
                (Some(hit.id), cursor)
            }
            None => {
                let items = self.render();
                let id = hit::hit_shapes(pt, items.iter().map(|i| (i.id, &i.shape)));
                (id, if id.is_some() { CURSOR_POINTER } else { CURSOR_DEFAULT })
            }
        };
        if self.interaction.hover(hovered) {
            actions.push(Action::RenderNeeded);
        }
        if self.cursor != cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor.to_owned()));
        }
        actions
    }

    fn escape(&mut self) -> Vec<Action> {
        if self.tools.is_color_picker_mode() {
            self.tools.finish_sampling(None);
            return vec![Action::RenderNeeded];
        }
        if self.pointer == PointerState::Creating {
            self.abandon_pointer();
            return vec![Action::RenderNeeded];
        }
        self.abandon_pointer();
        if self.sessions.cancel_all().is_empty() { Vec::new() } else { vec![Action::RenderNeeded] }
    }

    fn abandon_pointer(&mut self) {
        match std::mem::take(&mut self.pointer) {
            PointerState::Creating => self.gesture.reset(&mut self.tools),
            PointerState::Dragging { .. } => {
                self.sessions.release_capture();
            }
            PointerState::Idle => {}
        }
    }

    /// Move keyboard focus through rendered entities in paint order.
    fn cycle_focus(&mut self, backwards: bool) -> Vec<Action> {
        let ids: Vec<EntityId> = self.render().iter().map(|i| i.id).collect();
        if ids.is_empty() {
            return Vec::new();
        }
        let current = self.interaction.focused().and_then(|id| ids.iter().position(|x| *x == id));
        let next = match (current, backwards) {
            (None, false) => 0,
            (None, true) => ids.len() - 1,
            (Some(i), false) => (i + 1) % ids.len(),
            (Some(i), true) => (i + ids.len() - 1) % ids.len(),
        };
        self.interaction.focus(Some(ids[next]));
        vec![Action::RenderNeeded]
    }
}

fn write_action(id: EntityId, write: Write) -> Action {
    match write {
        Write::Create(annotation) => Action::CreateAnnotation(annotation),
        Write::Update(patch) => Action::UpdateAnnotation { id, patch },
        Write::Delete => Action::DeleteAnnotation { id },
    }
}
