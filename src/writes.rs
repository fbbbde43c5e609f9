//! Per-annotation write tracking: create, update, and delete in flight.
//!
//! Annotation writes follow the same status model as finding edit sessions:
//!
//! ```text
//! saving -> idle (saved indicator)
//!        \-> error -> idle (indicator lapses, write retained)
//! ```
//!
//! A rejected write is never dropped. The requested annotation, patch, or
//! delete stays here so the overlay keeps showing the local edit until the
//! user retries or discards it. At most one write per annotation is in flight.

#[cfg(test)]
#[path = "writes_test.rs"]
mod writes_test;

use std::collections::HashMap;

use tracing::{info, warn};

use crate::consts::INDICATOR_MS;
use crate::doc::{Annotation, AnnotationPatch, EntityId};
use crate::error::{PersistError, SessionError};
use crate::session::{EditStatus, Indicator};

/// A write handed to the annotation bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Create(Annotation),
    Update(AnnotationPatch),
    Delete,
}

#[derive(Debug, Clone)]
struct Entry {
    /// `None` once the write has been confirmed.
    write: Option<Write>,
    status: EditStatus,
    indicator: Option<(Indicator, f64)>,
    /// Submission order, so unconfirmed creates render in drawing order.
    seq: u64,
}

/// Owns the write status of every annotation on one surface.
#[derive(Debug)]
pub struct AnnotationWrites {
    entries: HashMap<EntityId, Entry>,
    next_seq: u64,
    indicator_ms: f64,
}

impl Default for AnnotationWrites {
    fn default() -> Self {
        Self::new(INDICATOR_MS)
    }
}

impl AnnotationWrites {
    #[must_use]
    pub fn new(indicator_ms: f64) -> Self {
        Self { entries: HashMap::new(), next_seq: 0, indicator_ms }
    }

    /// Record `write` as in flight for `id`.
    ///
    /// # Errors
    ///
    /// Rejects with `SaveInFlight` while an earlier write for `id` is unsettled.
    pub fn begin(&mut self, id: EntityId, write: Write) -> Result<(), SessionError> {
        if self.status(&id) == EditStatus::Saving {
            return Err(SessionError::SaveInFlight(id));
        }
        let seq = match self.entries.get(&id) {
            Some(entry) => entry.seq,
            None => {
                self.next_seq += 1;
                self.next_seq
            }
        };
        self.entries.insert(id, Entry { write: Some(write), status: EditStatus::Saving, indicator: None, seq });
        Ok(())
    }

    /// Apply the bridge's answer. Results for writes not in flight are ignored.
    pub fn settle(&mut self, id: EntityId, result: Result<(), PersistError>, now_ms: f64) -> Option<EditStatus> {
        let entry = self.entries.get_mut(&id)?;
        if entry.status != EditStatus::Saving {
            warn!(annotation_id = %id, status = ?entry.status, "write settled outside saving state");
            return None;
        }
        let expires = now_ms + self.indicator_ms;
        match result {
            Ok(()) => {
                entry.write = None;
                entry.status = EditStatus::Idle;
                entry.indicator = Some((Indicator::Saved, expires));
                info!(annotation_id = %id, "annotation write confirmed");
            }
            Err(e) => {
                entry.status = EditStatus::Error;
                entry.indicator = Some((Indicator::Error, expires));
                warn!(annotation_id = %id, error = %e, "annotation write rejected");
            }
        }
        Some(entry.status)
    }

    /// Re-submit a retained write after a failure.
    pub fn retry(&mut self, id: EntityId) -> Option<Write> {
        let entry = self.entries.get_mut(&id)?;
        if entry.status == EditStatus::Saving {
            return None;
        }
        let write = entry.write.clone()?;
        entry.status = EditStatus::Saving;
        entry.indicator = None;
        Some(write)
    }

    /// Drop a retained write. A write in flight cannot be discarded.
    pub fn discard(&mut self, id: EntityId) -> Option<Write> {
        if self.status(&id) == EditStatus::Saving {
            return None;
        }
        self.entries.remove(&id).and_then(|e| e.write)
    }

    /// Forget everything about `id` (the annotation is gone).
    pub fn forget(&mut self, id: &EntityId) {
        self.entries.remove(id);
    }

    /// Expire indicators. Returns whether anything visible changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let mut changed = false;
        for entry in self.entries.values_mut() {
            let Some((_, expires)) = entry.indicator else {
                continue;
            };
            if now_ms < expires {
                continue;
            }
            entry.indicator = None;
            if entry.status == EditStatus::Error {
                entry.status = EditStatus::Idle;
            }
            changed = true;
        }
        self.entries.retain(|_, e| e.write.is_some() || e.indicator.is_some());
        changed
    }

    // --- Queries ---

    #[must_use]
    pub fn status(&self, id: &EntityId) -> EditStatus {
        self.entries.get(id).map_or(EditStatus::Idle, |e| e.status)
    }

    #[must_use]
    pub fn indicator(&self, id: &EntityId) -> Option<Indicator> {
        self.entries.get(id).and_then(|e| e.indicator.map(|(i, _)| i))
    }

    /// The unconfirmed write for `id`, if one is in flight or retained.
    #[must_use]
    pub fn retained(&self, id: &EntityId) -> Option<&Write> {
        self.entries.get(id).and_then(|e| e.write.as_ref())
    }

    /// Unconfirmed creates in submission order.
    #[must_use]
    pub fn unconfirmed_creates(&self) -> Vec<&Annotation> {
        let mut creates: Vec<(u64, &Annotation)> = self
            .entries
            .values()
            .filter_map(|e| match &e.write {
                Some(Write::Create(a)) => Some((e.seq, a)),
                _ => None,
            })
            .collect();
        creates.sort_by_key(|(seq, _)| *seq);
        creates.into_iter().map(|(_, a)| a).collect()
    }
}
