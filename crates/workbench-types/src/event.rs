use serde::{Deserialize, Serialize};

/// Events emitted by the chat session.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A fresh session replaced the previous one
    SessionCreated { session_id: String },

    /// A question was accepted and the request is about to go out
    TurnStart { question: String, knowledge_count: usize },

    /// A piece of the answer arrived
    Chunk { text: String },

    /// The answer finished streaming
    TurnComplete,

    /// The request failed; the pending answer was replaced
    TurnFailed { message: String },
}
