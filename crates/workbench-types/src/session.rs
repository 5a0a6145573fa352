use serde::{Deserialize, Serialize};
use crate::message::Message;

/// The live conversation. Messages are append-only and chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub created_at: String,
}

impl Session {
    pub fn new(id: String) -> Self {
        Self {
            id,
            messages: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Session with a fresh random id
    pub fn fresh() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
