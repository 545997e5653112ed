//! Bounded, persisted history of generations and edit sessions.
//!
//! Everything lives in one JSON file. Both collections are capped:
//! past the cap the oldest entry is evicted, insertion order, never by
//! access. Session ids come from a persisted counter so they keep
//! increasing across evictions and restarts.

mod models;

pub use models::{EditSession, EditTurn, GenerationRecord, HistoryFile, SessionDraft};

use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::HistoryConfig;
use crate::error::{truncate_chars, Result};

/// Characters of an instruction kept in a generation record.
const RECORD_INSTRUCTION_CHARS: usize = 100;

/// Owner of all persisted history state.
pub struct HistoryStore {
    path: PathBuf,
    max_edit_sessions: usize,
    max_generation_records: usize,
    file: HistoryFile,
}

impl HistoryStore {
    /// Load the store from disk. Never fails: a missing file starts an
    /// empty history, and a corrupt one is abandoned with a warning
    /// rather than blocking the application.
    pub fn load(config: &HistoryConfig) -> Self {
        let mut file = match fs::read_to_string(&config.path) {
            Ok(contents) => match serde_json::from_str::<HistoryFile>(&contents) {
                Ok(file) => file,
                Err(e) => {
                    warn!(
                        "history file {} is corrupt, starting empty: {}",
                        config.path.display(),
                        e
                    );
                    HistoryFile::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no history file at {}, starting empty", config.path.display());
                HistoryFile::default()
            }
            Err(e) => {
                warn!(
                    "cannot read history file {}, starting empty: {}",
                    config.path.display(),
                    e
                );
                HistoryFile::default()
            }
        };

        // Files written before the counter existed load with the
        // default; repair it so new ids stay above every stored one.
        let min_next = file
            .edit_sessions
            .iter()
            .map(|session| session.id + 1)
            .max()
            .unwrap_or(1);
        if file.next_session_id < min_next {
            file.next_session_id = min_next;
        }

        Self {
            path: config.path.clone(),
            max_edit_sessions: config.max_edit_sessions,
            max_generation_records: config.max_generation_records,
            file,
        }
    }

    /// Append a generation record and persist.
    pub fn record_generation(&mut self, instruction: &str, image_path: &Path) -> Result<()> {
        let record = GenerationRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            instruction: truncate_chars(instruction, RECORD_INSTRUCTION_CHARS),
            image_path: image_path.to_path_buf(),
            exists: true,
        };
        self.file.generations.push(record);
        while self.file.generations.len() > self.max_generation_records {
            self.file.generations.remove(0);
        }
        self.persist()
    }

    /// Newest-first generation records, with `exists` flags refreshed
    /// against the filesystem. Changed flags are written back to the
    /// history file; a failed write warns and the listing proceeds.
    pub fn generation_history(&mut self, limit: usize) -> Vec<GenerationRecord> {
        let mut changed = false;
        for record in &mut self.file.generations {
            let exists = record.image_path.exists();
            if record.exists != exists {
                record.exists = exists;
                changed = true;
            }
        }
        if changed {
            if let Err(e) = self.persist() {
                warn!("could not persist refreshed history flags: {}", e);
            }
        }
        self.file
            .generations
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Persist a finished session, assigning it the next id.
    pub fn save_session(&mut self, draft: SessionDraft) -> Result<u64> {
        let id = self.file.next_session_id;
        self.file.next_session_id += 1;

        let session = EditSession::from_draft(id, draft);
        info!("saving edit session {} ({} turns)", id, session.turns.len());
        self.file.edit_sessions.push(session);

        while self.file.edit_sessions.len() > self.max_edit_sessions {
            let evicted = self.file.edit_sessions.remove(0);
            debug!("evicted edit session {}", evicted.id);
        }

        self.persist()?;
        Ok(id)
    }

    /// Snapshot of the most recently saved session.
    pub fn most_recent_session(&self) -> Option<EditSession> {
        self.file.edit_sessions.last().cloned()
    }

    /// All saved sessions, oldest first.
    pub fn sessions(&self) -> &[EditSession] {
        &self.file.edit_sessions
    }

    /// Drop all saved sessions. The id counter is not reset, so later
    /// sessions keep getting fresh ids.
    pub fn clear_sessions(&mut self) -> Result<()> {
        self.file.edit_sessions.clear();
        self.persist()
    }

    /// Drop all generation records.
    pub fn clear_generations(&mut self) -> Result<()> {
        self.file.generations.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
