// Persisted history data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// One (instruction, resulting image) step. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditTurn {
    pub instruction: String,
    pub result_image_path: PathBuf,
    pub timestamp: DateTime<Utc>,
}

impl EditTurn {
    pub fn new(instruction: impl Into<String>, result_image_path: PathBuf) -> Self {
        Self {
            instruction: instruction.into(),
            result_image_path,
            timestamp: Utc::now(),
        }
    }
}

/// A live editing conversation, not yet assigned a store id.
///
/// `current_image_path` always names the image the next edit applies
/// to: the last turn's result, or the original when no turn exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    pub original_image_path: PathBuf,
    pub current_image_path: PathBuf,
    pub turns: Vec<EditTurn>,
    pub created_at: DateTime<Utc>,
}

impl SessionDraft {
    pub fn new(original_image_path: PathBuf) -> Self {
        Self {
            current_image_path: original_image_path.clone(),
            original_image_path,
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a completed turn and advance the current image.
    pub fn append_turn(&mut self, turn: EditTurn) {
        self.current_image_path = turn.result_image_path.clone();
        self.turns.push(turn);
    }

    pub fn has_turns(&self) -> bool {
        !self.turns.is_empty()
    }
}

/// A persisted editing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSession {
    /// Monotonic per store; survives evictions and restarts.
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub original_image_path: PathBuf,
    pub current_image_path: PathBuf,
    #[serde(default)]
    pub turns: Vec<EditTurn>,
}

impl EditSession {
    pub(crate) fn from_draft(id: u64, draft: SessionDraft) -> Self {
        Self {
            id,
            created_at: draft.created_at,
            original_image_path: draft.original_image_path,
            current_image_path: draft.current_image_path,
            turns: draft.turns,
        }
    }

    /// Turn a persisted session back into live state for continuation.
    pub fn into_draft(self) -> SessionDraft {
        SessionDraft {
            original_image_path: self.original_image_path,
            current_image_path: self.current_image_path,
            turns: self.turns,
            created_at: self.created_at,
        }
    }
}

/// One successful generation, for the flat history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// First 100 characters of the instruction; enough to recognize it
    /// in a listing.
    pub instruction: String,
    pub image_path: PathBuf,
    /// Whether the file was still on disk when last checked.
    pub exists: bool,
}

/// On-disk shape of the history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    #[serde(default)]
    pub generations: Vec<GenerationRecord>,
    #[serde(default)]
    pub edit_sessions: Vec<EditSession>,
    #[serde(default = "default_next_session_id")]
    pub next_session_id: u64,
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self {
            generations: Vec::new(),
            edit_sessions: Vec::new(),
            next_session_id: default_next_session_id(),
        }
    }
}

fn default_next_session_id() -> u64 {
    1
}
