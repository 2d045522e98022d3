use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::workflow::history::LetterHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the refinement chat log. Append-only, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Per-session workflow state, owned by the HTTP surface and passed into
/// the engine explicitly. Letter, history and chat log live and die with
/// the session; only the credit ledger outlives it.
#[derive(Debug)]
pub struct SessionContext {
    pub id: Uuid,
    /// Normalized (uppercase) access code this session was activated with.
    pub access_code: String,
    pub cover_letter: Option<String>,
    pub history: LetterHistory,
    pub messages: Vec<ChatMessage>,
}

impl SessionContext {
    pub fn new(access_code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            access_code,
            cover_letter: None,
            history: LetterHistory::default(),
            messages: Vec::new(),
        }
    }

    /// Installs a new current letter and records it in the history.
    pub fn set_letter(&mut self, text: &str) {
        self.cover_letter = Some(text.to_string());
        self.history.append_if_new(text);
    }

    /// Makes history version `index` the current letter again. The restored
    /// text is re-appended when it differs from the latest version.
    pub fn restore(&mut self, index: usize) -> Option<String> {
        let text = self.history.get(index)?.to_string();
        self.set_letter(&text);
        Some(text)
    }
}

/// Live sessions, keyed by id. Each session is serialized behind its own
/// mutex so one slow composer call never blocks other sessions.
pub type SessionMap = Arc<RwLock<HashMap<Uuid, Arc<Mutex<SessionContext>>>>>;
