//! Client for the knowledge list endpoint.

use gloo_net::http::Request;
use serde::Deserialize;

use workbench_types::{
    Result, WorkbenchError,
    config::TransportConfig,
    knowledge::KnowledgeItem,
};

/// Envelope returned by `GET {knowledge_path}`
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeListResponse {
    pub code: i64,
    #[serde(default)]
    pub data: Vec<KnowledgeItem>,
}

impl KnowledgeListResponse {
    /// The items, or a protocol error for a non-zero code
    pub fn into_items(self) -> Result<Vec<KnowledgeItem>> {
        if self.code != 0 {
            return Err(WorkbenchError::Protocol(format!(
                "knowledge list returned code {}",
                self.code
            )));
        }
        Ok(self.data)
    }
}

pub async fn fetch_knowledge_list(config: &TransportConfig) -> Result<Vec<KnowledgeItem>> {
    let url = config.knowledge_url();
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| WorkbenchError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(WorkbenchError::Transport {
            status: response.status(),
        });
    }

    let envelope: KnowledgeListResponse = response
        .json()
        .await
        .map_err(|e| WorkbenchError::Serialization(e.to_string()))?;
    let items = envelope.into_items()?;
    log::info!("Fetched {} knowledge item(s) from {}", items.len(), url);
    Ok(items)
}
