//! Multi-turn edit session state machine.
//!
//! At most one session is active at a time. Each turn edits the
//! session's current image and advances it; finished sessions go to the
//! history store. All state sits behind one async mutex so a display
//! read or a shutdown persist can never race an in-flight turn.

use std::fs;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::client::{GenerationResult, ImageClient};
use crate::error::{Error, Result};
use crate::history::{EditSession, EditTurn, GenerationRecord, HistoryStore, SessionDraft};

/// Guarded facade over the image client, the active edit session and
/// the persisted history.
pub struct SessionManager {
    client: ImageClient,
    inner: Mutex<Inner>,
}

struct Inner {
    store: HistoryStore,
    active: Option<SessionDraft>,
}

impl SessionManager {
    pub fn new(client: ImageClient, store: HistoryStore) -> Self {
        Self {
            client,
            inner: Mutex::new(Inner {
                store,
                active: None,
            }),
        }
    }

    pub fn client(&self) -> &ImageClient {
        &self.client
    }

    /// Begin a session on a base image. Any session already active is
    /// finished first under the usual rule: persisted with its turns,
    /// or discarded when it has none.
    pub async fn start_session(&self, base_image: &Path) -> Result<()> {
        if !base_image.exists() {
            return Err(Error::InvalidRequest(format!(
                "base image does not exist: {}",
                base_image.display()
            )));
        }

        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;
        if let Some(outgoing) = inner.active.take() {
            finish(&mut inner.store, outgoing)?;
        }
        info!("starting edit session on {}", base_image.display());
        inner.active = Some(SessionDraft::new(base_image.to_path_buf()));
        Ok(())
    }

    /// Run one edit turn against the active session.
    ///
    /// The current image is read, sent with the instruction, and on
    /// success the resulting turn is appended and the current image
    /// advances. A failed call leaves the session exactly as it was.
    pub async fn apply_turn(&self, instruction: &str) -> Result<GenerationResult> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;
        let active = inner
            .active
            .as_mut()
            .ok_or_else(|| Error::InvalidRequest("no active edit session".to_string()))?;

        let input = fs::read(&active.current_image_path)?;
        let result = self.client.edit_with_image(instruction, &input, None).await?;

        active.append_turn(EditTurn::new(instruction, result.saved_path.clone()));
        info!(
            "turn {} applied, current image is now {}",
            active.turns.len(),
            result.saved_path.display()
        );

        if let Err(e) = inner.store.record_generation(instruction, &result.saved_path) {
            warn!("could not record the edit in history: {}", e);
        }
        Ok(result)
    }

    /// Finish the active session: persist it when it has at least one
    /// turn, discard it otherwise. Returns the assigned session id.
    pub async fn start_new_session(&self) -> Result<Option<u64>> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;
        match inner.active.take() {
            Some(outgoing) => finish(&mut inner.store, outgoing),
            None => Ok(None),
        }
    }

    /// Rehydrate the most recently saved session as the active one.
    /// Returns the resumed state, or `None` when nothing was saved.
    pub async fn resume_last(&self) -> Result<Option<SessionDraft>> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        let resumed = match inner.store.most_recent_session() {
            Some(session) => session.into_draft(),
            None => return Ok(None),
        };
        if let Some(outgoing) = inner.active.take() {
            finish(&mut inner.store, outgoing)?;
        }
        info!(
            "resumed edit session with {} turns, current image {}",
            resumed.turns.len(),
            resumed.current_image_path.display()
        );
        inner.active = Some(resumed.clone());
        Ok(Some(resumed))
    }

    /// Persist the active session on the way out. Best-effort: a
    /// failure is logged, never escalated, so shutdown always proceeds.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;
        if let Some(outgoing) = inner.active.take() {
            if let Err(e) = finish(&mut inner.store, outgoing) {
                error!("failed to persist edit session on shutdown: {}", e);
            }
        }
    }

    /// Snapshot of the active session, if any.
    pub async fn active_session(&self) -> Option<SessionDraft> {
        self.inner.lock().await.active.clone()
    }

    /// Saved sessions, oldest first.
    pub async fn session_history(&self) -> Vec<EditSession> {
        self.inner.lock().await.store.sessions().to_vec()
    }

    /// Newest-first generation records with refreshed `exists` flags.
    pub async fn generation_history(&self, limit: usize) -> Vec<GenerationRecord> {
        self.inner.lock().await.store.generation_history(limit)
    }

    /// Record a non-edit generation in the shared history.
    pub async fn record_generation(&self, instruction: &str, image_path: &Path) -> Result<()> {
        self.inner
            .lock()
            .await
            .store
            .record_generation(instruction, image_path)
    }

    /// Drop every saved session. The active one, if any, is untouched.
    pub async fn clear_saved_sessions(&self) -> Result<()> {
        self.inner.lock().await.store.clear_sessions()
    }

    /// Drop every generation record.
    pub async fn clear_generation_history(&self) -> Result<()> {
        self.inner.lock().await.store.clear_generations()
    }
}

fn finish(store: &mut HistoryStore, outgoing: SessionDraft) -> Result<Option<u64>> {
    if outgoing.has_turns() {
        Ok(Some(store.save_session(outgoing)?))
    } else {
        info!("discarding edit session with no turns");
        Ok(None)
    }
}
