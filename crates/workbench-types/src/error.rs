use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkbenchError {
    #[error("Transport error: HTTP {status}")]
    Transport { status: u16 },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

impl WorkbenchError {
    /// Short name of the error kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            WorkbenchError::Transport { .. } => "transport",
            WorkbenchError::Protocol(_) => "protocol",
            WorkbenchError::Decode(_) => "decode",
            WorkbenchError::Network(_) => "network",
            WorkbenchError::Storage(_) => "storage",
            WorkbenchError::Serialization(_) => "serialization",
            WorkbenchError::Cancelled => "cancelled",
            WorkbenchError::Config(_) => "config",
            WorkbenchError::JsInterop(_) => "js",
            WorkbenchError::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for WorkbenchError {
    fn from(e: serde_json::Error) -> Self {
        WorkbenchError::Serialization(e.to_string())
    }
}
