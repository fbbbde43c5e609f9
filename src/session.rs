//! Edit-session manager for finding bounding boxes.
//!
//! DESIGN
//! ======
//! Each entity id owns an independent state machine:
//!
//! ```text
//! idle -> editing -> dirty* -> saving -> idle
//!                                  \-> error -> idle
//! editing/dirty -> idle (cancel)
//! ```
//!
//! Sessions never lock each other: any number of entities may be editing,
//! dirty, or saving at once. Per entity, transitions are strictly
//! sequential: while a save is in flight the entity rejects a new session
//! and rejects cancel; the save result still applies when it settles.
//!
//! The pointer is the only shared resource. A drag (move or resize) captures
//! it exclusively until [`EditSessionManager::release_capture`].
//!
//! ERROR HANDLING
//! ==============
//! A failed save keeps the authoritative rect, retains the local edit on
//! screen, and flags the entity `Error` until the indicator expires. The
//! manager never retries; starting a new session on the entity resumes from
//! the retained edit.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::consts::{INDICATOR_MS, MIN_BOX_SIZE_PX};
use crate::doc::EntityId;
use crate::error::{PersistError, SessionError};
use crate::hit::Direction;
use crate::transform::{DisplayMetrics, Point, Rect};

/// Per-entity edit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditStatus {
    #[default]
    Idle,
    Editing,
    Dirty,
    Saving,
    Error,
}

impl EditStatus {
    /// Editing or dirty: the box accepts drags and can be finished or cancelled.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Editing | Self::Dirty)
    }
}

/// Transient feedback shown after a save settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Saved,
    Error,
}

/// What a drag does to the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    Resize(Direction),
}

#[derive(Debug, Clone)]
struct Session {
    status: EditStatus,
    /// Last persisted rect.
    authoritative: Rect,
    /// Local edit; retained after a failed save.
    in_progress: Option<Rect>,
    /// Indicator and its expiry, in host milliseconds.
    indicator: Option<(Indicator, f64)>,
}

#[derive(Debug, Clone, Copy)]
struct Capture {
    id: EntityId,
    kind: DragKind,
    start: Point,
    orig: Rect,
}

/// Owns every edit session on one rendering surface.
#[derive(Debug)]
pub struct EditSessionManager {
    sessions: HashMap<EntityId, Session>,
    capture: Option<Capture>,
    min_size: f64,
    indicator_ms: f64,
}

impl Default for EditSessionManager {
    fn default() -> Self {
        Self::new(MIN_BOX_SIZE_PX, INDICATOR_MS)
    }
}

impl EditSessionManager {
    #[must_use]
    pub fn new(min_size: f64, indicator_ms: f64) -> Self {
        Self { sessions: HashMap::new(), capture: None, min_size, indicator_ms }
    }

    // --- Transitions ---

    /// `idle -> editing`. `area` is the entity's current rect from the feed.
    ///
    /// Re-entering an open session is a no-op. A retained edit from a failed
    /// save resumes as `dirty`.
    ///
    /// # Errors
    ///
    /// Rejects when editing is disabled, the entity has no area, or a save
    /// for it is still in flight.
    pub fn begin(&mut self, id: EntityId, area: Option<Rect>, editing_enabled: bool) -> Result<(), SessionError> {
        if !editing_enabled {
            return Err(SessionError::EditingDisabled);
        }
        if let Some(session) = self.sessions.get_mut(&id) {
            match session.status {
                EditStatus::Saving => return Err(SessionError::SaveInFlight(id)),
                EditStatus::Editing | EditStatus::Dirty => return Ok(()),
                EditStatus::Idle | EditStatus::Error => {
                    if let (None, Some(area)) = (session.in_progress, area) {
                        session.authoritative = area;
                    }
                    session.indicator = None;
                    session.status = match session.in_progress {
                        Some(rect) if rect != session.authoritative => EditStatus::Dirty,
                        _ => EditStatus::Editing,
                    };
                    session.in_progress = Some(session.in_progress.unwrap_or(session.authoritative));
                    debug!(finding_id = %id, status = ?session.status, "edit session resumed");
                    return Ok(());
                }
            }
        }

        let area = area.ok_or(SessionError::NoArea(id))?;
        self.sessions.insert(
            id,
            Session { status: EditStatus::Editing, authoritative: area, in_progress: Some(area), indicator: None },
        );
        debug!(finding_id = %id, "edit session started");
        Ok(())
    }

    /// Capture the pointer for a move or resize drag starting at display point `at`.
    ///
    /// # Errors
    ///
    /// Rejects when the entity is not open for editing or another drag holds the pointer.
    pub fn start_drag(&mut self, id: EntityId, kind: DragKind, at: Point) -> Result<(), SessionError> {
        if let Some(capture) = self.capture {
            if capture.id != id {
                return Err(SessionError::PointerCaptured(capture.id));
            }
        }
        let session = self.open_session(id)?;
        let orig = session.in_progress.unwrap_or(session.authoritative);
        self.capture = Some(Capture { id, kind, start: at, orig });
        Ok(())
    }

    /// Apply the captured drag for the pointer at display point `at`.
    ///
    /// Returns the entity and its new in-progress rect, or `None` with no capture.
    pub fn drag_to(&mut self, at: Point, metrics: &DisplayMetrics) -> Option<(EntityId, Rect)> {
        let capture = self.capture?;
        let dx = metrics.dist_to_natural(at.x - capture.start.x);
        let dy = metrics.dist_to_natural(at.y - capture.start.y);
        let rect = match capture.kind {
            DragKind::Move => capture.orig.translated(dx, dy),
            DragKind::Resize(dir) => resize(capture.orig, dir, dx, dy, self.min_size),
        };
        let session = self.sessions.get_mut(&capture.id)?;
        if !session.status.is_open() {
            self.capture = None;
            return None;
        }
        if session.in_progress != Some(rect) {
            session.in_progress = Some(rect);
            session.status = EditStatus::Dirty;
        }
        Some((capture.id, rect))
    }

    /// Release the pointer, wherever the pointer-up happened.
    pub fn release_capture(&mut self) -> Option<EntityId> {
        self.capture.take().map(|c| c.id)
    }

    /// Move an open box by a natural-space offset (keyboard nudge).
    ///
    /// # Errors
    ///
    /// Rejects when the entity is not open for editing.
    pub fn nudge(&mut self, id: EntityId, dx: f64, dy: f64) -> Result<Rect, SessionError> {
        let session = self.open_session(id)?;
        let rect = session.in_progress.unwrap_or(session.authoritative).translated(dx, dy);
        session.in_progress = Some(rect);
        session.status = EditStatus::Dirty;
        Ok(rect)
    }

    /// Finish an open session.
    ///
    /// `dirty -> saving` returns the rect to hand to the finding bridge.
    /// `editing -> idle` (nothing changed) returns `None`.
    ///
    /// # Errors
    ///
    /// Rejects when a save is already in flight or no session is open.
    pub fn finish(&mut self, id: EntityId) -> Result<Option<Rect>, SessionError> {
        if self.capture.is_some_and(|c| c.id == id) {
            self.capture = None;
        }
        let session = self.sessions.get_mut(&id).ok_or(SessionError::NoSession(id))?;
        match session.status {
            EditStatus::Editing => {
                session.status = EditStatus::Idle;
                session.in_progress = None;
                debug!(finding_id = %id, "edit session closed without changes");
                Ok(None)
            }
            EditStatus::Dirty => {
                session.status = EditStatus::Saving;
                let rect = session.in_progress.unwrap_or(session.authoritative);
                info!(finding_id = %id, ?rect, "saving finding area");
                Ok(Some(rect))
            }
            EditStatus::Saving => Err(SessionError::SaveInFlight(id)),
            EditStatus::Idle | EditStatus::Error => Err(SessionError::NoSession(id)),
        }
    }

    /// Finish every open session except `keep` (click outside).
    ///
    /// Returns the saves to dispatch, ordered by entity id.
    pub fn finish_all_except(&mut self, keep: Option<EntityId>) -> Vec<(EntityId, Rect)> {
        let mut ids: Vec<EntityId> = self
            .sessions
            .iter()
            .filter(|(id, s)| s.status.is_open() && Some(**id) != keep)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| match self.finish(id) {
                Ok(Some(rect)) => Some((id, rect)),
                Ok(None) | Err(_) => None,
            })
            .collect()
    }

    /// `editing/dirty -> idle`, discarding the local edit.
    ///
    /// # Errors
    ///
    /// A save already sent cannot be cancelled; rejects with `SaveInFlight`.
    pub fn cancel(&mut self, id: EntityId) -> Result<(), SessionError> {
        let session = self.sessions.get_mut(&id).ok_or(SessionError::NoSession(id))?;
        match session.status {
            EditStatus::Editing | EditStatus::Dirty => {
                session.status = EditStatus::Idle;
                session.in_progress = None;
                if self.capture.is_some_and(|c| c.id == id) {
                    self.capture = None;
                }
                debug!(finding_id = %id, "edit session cancelled");
                Ok(())
            }
            EditStatus::Saving => Err(SessionError::SaveInFlight(id)),
            EditStatus::Idle | EditStatus::Error => Err(SessionError::NoSession(id)),
        }
    }

    /// Cancel every open session. Sessions with a save in flight are untouched.
    pub fn cancel_all(&mut self) -> Vec<EntityId> {
        let ids: Vec<EntityId> = self.sessions.iter().filter(|(_, s)| s.status.is_open()).map(|(id, _)| *id).collect();
        ids.into_iter().filter(|id| self.cancel(*id).is_ok()).collect()
    }

    /// Apply the bridge's answer for a save. `now_ms` starts the indicator timer.
    ///
    /// Results for entities that are not saving are ignored.
    pub fn settle(&mut self, id: EntityId, result: Result<(), PersistError>, now_ms: f64) -> Option<EditStatus> {
        let Some(session) = self.sessions.get_mut(&id) else {
            warn!(finding_id = %id, "save settled for unknown session");
            return None;
        };
        if session.status != EditStatus::Saving {
            warn!(finding_id = %id, status = ?session.status, "save settled outside saving state");
            return None;
        }
        let expires = now_ms + self.indicator_ms;
        match result {
            Ok(()) => {
                if let Some(rect) = session.in_progress.take() {
                    session.authoritative = rect;
                }
                session.status = EditStatus::Idle;
                session.indicator = Some((Indicator::Saved, expires));
                info!(finding_id = %id, "finding area saved");
            }
            Err(e) => {
                session.status = EditStatus::Error;
                session.indicator = Some((Indicator::Error, expires));
                warn!(finding_id = %id, error = %e, "finding area save failed");
            }
        }
        Some(session.status)
    }

    /// Expire indicators. `error` becomes `idle` when its indicator lapses.
    ///
    /// Returns whether anything visible changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let mut changed = false;
        for session in self.sessions.values_mut() {
            let Some((_, expires)) = session.indicator else {
                continue;
            };
            if now_ms < expires {
                continue;
            }
            session.indicator = None;
            if session.status == EditStatus::Error {
                session.status = EditStatus::Idle;
            }
            changed = true;
        }
        changed
    }

    /// Reconcile settled sessions with a new findings feed.
    ///
    /// An idle session with no retained edit takes its authoritative rect from
    /// the feed, or is dropped when the finding is gone or no longer localized.
    /// Sessions that are open, saving, or hold a retained edit are untouched.
    pub fn sync_feed(&mut self, area_of: impl Fn(&EntityId) -> Option<Rect>) {
        self.sessions.retain(|id, s| {
            if s.status != EditStatus::Idle || s.in_progress.is_some() {
                return true;
            }
            match area_of(id) {
                Some(area) => {
                    s.authoritative = area;
                    true
                }
                None => false,
            }
        });
    }

    // --- Queries ---

    #[must_use]
    pub fn status(&self, id: &EntityId) -> EditStatus {
        self.sessions.get(id).map_or(EditStatus::Idle, |s| s.status)
    }

    #[must_use]
    pub fn indicator(&self, id: &EntityId) -> Option<Indicator> {
        self.sessions.get(id).and_then(|s| s.indicator.map(|(i, _)| i))
    }

    /// Last persisted rect known to the manager.
    #[must_use]
    pub fn authoritative(&self, id: &EntityId) -> Option<Rect> {
        self.sessions.get(id).map(|s| s.authoritative)
    }

    #[must_use]
    pub fn in_progress(&self, id: &EntityId) -> Option<Rect> {
        self.sessions.get(id).and_then(|s| s.in_progress)
    }

    /// Rect to draw: the local edit if any, else the authoritative rect.
    #[must_use]
    pub fn display_rect(&self, id: &EntityId) -> Option<Rect> {
        self.sessions.get(id).map(|s| s.in_progress.unwrap_or(s.authoritative))
    }

    /// Ids of sessions in `editing` or `dirty`, sorted.
    #[must_use]
    pub fn open_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> =
            self.sessions.iter().filter(|(_, s)| s.status.is_open()).map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids
    }

    /// Entity holding the pointer, if a drag is in progress.
    #[must_use]
    pub fn captured(&self) -> Option<EntityId> {
        self.capture.map(|c| c.id)
    }

    fn open_session(&mut self, id: EntityId) -> Result<&mut Session, SessionError> {
        let session = self.sessions.get_mut(&id).ok_or(SessionError::NoSession(id))?;
        match session.status {
            EditStatus::Editing | EditStatus::Dirty => Ok(session),
            EditStatus::Saving => Err(SessionError::SaveInFlight(id)),
            EditStatus::Idle | EditStatus::Error => Err(SessionError::NoSession(id)),
        }
    }
}

/// Resize `orig` by dragging the handle at `dir` by `(dx, dy)` natural pixels.
///
/// Width and height never drop below `min`; when a moving edge would cross
/// that limit it stops against the opposite edge, so the box never inverts.
#[must_use]
pub fn resize(orig: Rect, dir: Direction, dx: f64, dy: f64, min: f64) -> Rect {
    let (x, width) = resize_axis(orig.x, orig.width, dir.horizontal(), dx, min);
    let (y, height) = resize_axis(orig.y, orig.height, dir.vertical(), dy, min);
    Rect::new(x, y, width, height)
}

fn resize_axis(start: f64, len: f64, edge: i8, delta: f64, min: f64) -> (f64, f64) {
    match edge {
        -1 => {
            let far = start + len;
            let near = (start + delta).min(far - min);
            (near, far - near)
        }
        1 => (start, (len + delta).max(min)),
        _ => (start, len.max(min)),
    }
}
