//! In-process stand-in for the answering service.
//!
//! Echoes the question and the referenced titles back as a slow byte
//! stream, with optional injected failures, so the chat can be exercised
//! without a server.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use gloo_timers::future::TimeoutFuture;

use workbench_core::ports::{ByteStream, TransportPort, TransportResponse};
use workbench_types::{
    Result, WorkbenchError,
    config::{SimulatedFailure, SimulationConfig},
    knowledge::RequestContext,
};

const NO_KNOWLEDGE: &str = "(no knowledge selected)";

pub struct SimulatedTransport {
    config: SimulationConfig,
}

impl SimulatedTransport {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Index of the piece that fails instead of being sent, if any
    fn failure_point(&self, piece_count: usize) -> Option<usize> {
        match self.config.failure {
            SimulatedFailure::AfterChunks(n) => Some(n),
            SimulatedFailure::Random(p) if js_sys::Math::random() < f64::from(p) => {
                Some((js_sys::Math::random() * piece_count as f64) as usize)
            }
            _ => None,
        }
    }
}

#[async_trait(?Send)]
impl TransportPort for SimulatedTransport {
    async fn send(&self, context: &RequestContext) -> Result<TransportResponse> {
        pause(self.config.initial_delay_ms).await;

        if let SimulatedFailure::Status(status) = self.config.failure {
            log::debug!("Simulated transport answering HTTP {}", status);
            return Ok(TransportResponse::new(status, None));
        }

        let text = mock_answer(context);
        let pieces = split_pieces(&text, self.config.chunk_bytes);

        let mut items: Vec<Result<Vec<u8>>> = pieces.into_iter().map(Ok).collect();
        if let Some(n) = self.failure_point(items.len()).filter(|&n| n <= items.len()) {
            items.truncate(n);
            items.push(Err(WorkbenchError::Network(
                "simulated connection reset".to_string(),
            )));
        }

        let delay = self.config.char_delay_ms;
        let body: ByteStream = Box::pin(stream::iter(items).then(move |item| async move {
            pause(delay).await;
            item
        }));
        Ok(TransportResponse::new(200, Some(body)))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

async fn pause(ms: u32) {
    if ms > 0 {
        TimeoutFuture::new(ms).await;
    }
}

/// The mock service's answer for `context`.
pub fn mock_answer(context: &RequestContext) -> String {
    let refs = if context.knowledge.is_empty() {
        NO_KNOWLEDGE.to_string()
    } else {
        context
            .knowledge
            .iter()
            .map(|k| format!("《{}》", k.title))
            .collect::<Vec<_>>()
            .join("、")
    };
    format!(
        "[Mock Stream]\nQuestion: {}\nReferences: {}\n\nThis is simulated streaming output.",
        context.question, refs
    )
}

/// One piece per character, or fixed-size byte slices that may cut
/// through a character.
pub(crate) fn split_pieces(text: &str, chunk_bytes: Option<usize>) -> Vec<Vec<u8>> {
    match chunk_bytes {
        Some(size) if size > 0 => text.as_bytes().chunks(size).map(<[u8]>::to_vec).collect(),
        _ => text
            .chars()
            .map(|c| c.to_string().into_bytes())
            .collect(),
    }
}
