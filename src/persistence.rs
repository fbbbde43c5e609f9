//! Persistence bridge: the contracts the core commits through.
//!
//! DESIGN
//! ======
//! The host owns transport, auth, and retries. The core only emits
//! persistence [`Action`]s; [`Bridge::submit`] runs each one on the async
//! runtime and reports a [`Settled`] event on a channel the host drains on its
//! UI loop and feeds back into [`EngineCore::apply_settled`]. Saves for
//! different entities overlap freely. The engine guarantees at most one save
//! per entity is ever in flight.
//!
//! ERROR HANDLING
//! ==============
//! Bridge failures come back as `Err(PersistError)` inside the settled event.
//! Nothing here retries.
//!
//! [`EngineCore::apply_settled`]: crate::engine::EngineCore::apply_settled

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::doc::{Annotation, AnnotationPatch, EntityId};
use crate::engine::Action;
use crate::error::PersistError;
use crate::overlay::ThumbnailCache;
use crate::transform::Rect;

/// Annotation persistence owned by the host.
#[async_trait::async_trait]
pub trait AnnotationApi: Send + Sync {
    /// Persist a new annotation, returning the stored copy.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the host rejects or cannot reach storage.
    async fn create(&self, annotation: Annotation) -> Result<Annotation, PersistError>;

    /// Apply a text/rect patch, returning the stored copy.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the host rejects or cannot reach storage.
    async fn update(&self, id: EntityId, patch: AnnotationPatch) -> Result<Annotation, PersistError>;

    /// Delete an annotation.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the host rejects or cannot reach storage.
    async fn delete(&self, id: EntityId) -> Result<(), PersistError>;
}

/// Finding bounding-box persistence owned by the host.
#[async_trait::async_trait]
pub trait FindingApi: Send + Sync {
    /// Store a new area for a finding.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the host rejects or cannot reach storage.
    async fn save_area(&self, finding_id: EntityId, rect: Rect) -> Result<(), PersistError>;
}

/// Resolves a raw storage path into a displayable URL.
#[async_trait::async_trait]
pub trait AssetResolver: Send + Sync {
    /// `None` means the path cannot be resolved (yet).
    async fn resolve(&self, storage_path: &str) -> Option<String>;
}

/// Outcome of one persistence call, fed back into the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    AnnotationCreated { local_id: EntityId, result: Result<Annotation, PersistError> },
    AnnotationUpdated { id: EntityId, result: Result<Annotation, PersistError> },
    AnnotationDeleted { id: EntityId, result: Result<(), PersistError> },
    AreaSaved { finding_id: EntityId, result: Result<(), PersistError> },
}

/// Whether an action needs the bridge.
#[must_use]
pub fn is_persistence(action: &Action) -> bool {
    matches!(
        action,
        Action::CreateAnnotation(_)
            | Action::UpdateAnnotation { .. }
            | Action::DeleteAnnotation { .. }
            | Action::SaveArea { .. }
    )
}

/// Run one persistence action inline. Non-persistence actions yield `None`.
pub async fn dispatch(
    annotations: &dyn AnnotationApi,
    findings: &dyn FindingApi,
    action: Action,
) -> Option<Settled> {
    let settled = match action {
        Action::CreateAnnotation(annotation) => {
            let local_id = annotation.id;
            Settled::AnnotationCreated { local_id, result: annotations.create(annotation).await }
        }
        Action::UpdateAnnotation { id, patch } => {
            Settled::AnnotationUpdated { id, result: annotations.update(id, patch).await }
        }
        Action::DeleteAnnotation { id } => Settled::AnnotationDeleted { id, result: annotations.delete(id).await },
        Action::SaveArea { finding_id, rect } => {
            Settled::AreaSaved { finding_id, result: findings.save_area(finding_id, rect).await }
        }
        _ => return None,
    };
    Some(settled)
}

/// Spawns persistence calls and reports their outcomes on a channel.
#[derive(Clone)]
pub struct Bridge {
    annotations: Arc<dyn AnnotationApi>,
    findings: Arc<dyn FindingApi>,
    tx: mpsc::UnboundedSender<Settled>,
}

impl Bridge {
    /// Create a bridge and the receiver the host drains for settled events.
    #[must_use]
    pub fn new(
        annotations: Arc<dyn AnnotationApi>,
        findings: Arc<dyn FindingApi>,
    ) -> (Self, mpsc::UnboundedReceiver<Settled>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { annotations, findings, tx }, rx)
    }

    /// Spawn every persistence action in `actions`, returning the rest untouched.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, actions: Vec<Action>) -> Vec<Action> {
        let mut rest = Vec::new();
        for action in actions {
            if !is_persistence(&action) {
                rest.push(action);
                continue;
            }
            let annotations = Arc::clone(&self.annotations);
            let findings = Arc::clone(&self.findings);
            let tx = self.tx.clone();
            debug!(?action, "dispatching persistence action");
            tokio::spawn(async move {
                let Some(settled) = dispatch(annotations.as_ref(), findings.as_ref(), action).await else {
                    return;
                };
                if tx.send(settled).is_err() {
                    warn!("settled receiver dropped; persistence outcome lost");
                }
            });
        }
        rest
    }
}

/// Resolve every unresolved attachment in `paths` into `cache`.
///
/// Returns how many were resolved. Paths that fail to resolve stay missing
/// and their thumbnails stay hidden.
pub async fn resolve_thumbnails(resolver: &dyn AssetResolver, paths: Vec<String>, cache: &mut ThumbnailCache) -> usize {
    let mut resolved = 0;
    for path in paths {
        if cache.get(&path).is_some() {
            continue;
        }
        match resolver.resolve(&path).await {
            Some(url) => {
                cache.insert(path, url);
                resolved += 1;
            }
            None => debug!(storage_path = %path, "attachment not resolvable yet"),
        }
    }
    resolved
}
