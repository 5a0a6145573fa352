use serde::{Deserialize, Serialize};

/// Top-level workbench configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkbenchConfig {
    pub transport: TransportConfig,
    pub simulation: SimulationConfig,
    pub knowledge: KnowledgeConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub mode: TransportMode,
    /// Prefix for both endpoints; empty means same origin
    pub base_url: String,
    pub stream_path: String,
    pub knowledge_path: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Simulated,
            base_url: String::new(),
            stream_path: "/api/chat/stream".to_string(),
            knowledge_path: "/api/knowledge/list".to_string(),
        }
    }
}

impl TransportConfig {
    pub fn stream_url(&self) -> String {
        join_url(&self.base_url, &self.stream_path)
    }

    pub fn knowledge_url(&self) -> String {
        join_url(&self.base_url, &self.knowledge_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Real HTTP endpoint via browser fetch
    Fetch,
    /// In-process stand-in for the answering service
    Simulated,
}

impl TransportMode {
    pub fn all() -> &'static [TransportMode] {
        &[TransportMode::Fetch, TransportMode::Simulated]
    }

    pub fn label(&self) -> &str {
        match self {
            TransportMode::Fetch => "HTTP (fetch)",
            TransportMode::Simulated => "Simulated",
        }
    }
}

/// Behaviour of the simulated answering service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_delay_ms: u32,
    pub char_delay_ms: u32,
    /// Emit raw byte slices of this size instead of whole characters
    pub chunk_bytes: Option<usize>,
    pub failure: SimulatedFailure,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 300,
            char_delay_ms: 20,
            chunk_bytes: None,
            failure: SimulatedFailure::Never,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulatedFailure {
    Never,
    /// Respond with this non-success status and no body
    Status(u16),
    /// Break the stream after this many body pieces
    /// (characters, or `chunk_bytes` slices when set)
    AfterChunks(usize),
    /// Break the stream somewhere with this probability (0.0..=1.0)
    Random(f32),
}

impl SimulatedFailure {
    pub fn label(&self) -> &str {
        match self {
            SimulatedFailure::Never => "Never",
            SimulatedFailure::Status(_) => "HTTP status",
            SimulatedFailure::AfterChunks(_) => "After N chunks",
            SimulatedFailure::Random(_) => "Random",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    pub storage_key: String,
    /// How long a newly added item stays in `processing`
    pub processing_delay_ms: u32,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            storage_key: "ai-workbench-knowledge-list".to_string(),
            processing_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendType {
    /// Auto-detect best available backend
    Auto,
    Memory,
    IndexedDb,
}
