use serde::{Deserialize, Serialize};

/// Processing status of a knowledge item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeStatus {
    Processing,
    Ready,
}

impl KnowledgeStatus {
    pub fn label(&self) -> &str {
        match self {
            KnowledgeStatus::Processing => "Processing",
            KnowledgeStatus::Ready => "Ready",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeKind {
    Text,
}

/// An entry held by the knowledge source.
/// Field names match the persisted list format (`updatedAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: KnowledgeKind,
    pub status: KnowledgeStatus,
    pub updated_at: String,
}

impl KnowledgeItem {
    /// A freshly added text item, still processing
    pub fn new_text(title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            kind: KnowledgeKind::Text,
            status: KnowledgeStatus::Processing,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == KnowledgeStatus::Ready
    }

    pub fn to_ref(&self) -> KnowledgeRef {
        KnowledgeRef {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

/// Lightweight pointer into the knowledge source, sent with a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRef {
    pub id: String,
    pub title: String,
}

/// Body of one answering request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub question: String,
    pub knowledge: Vec<KnowledgeRef>,
}

impl RequestContext {
    pub fn new(question: impl Into<String>, knowledge: Vec<KnowledgeRef>) -> Self {
        Self {
            question: question.into(),
            knowledge,
        }
    }
}
