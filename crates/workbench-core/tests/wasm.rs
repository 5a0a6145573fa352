//! WASM-target tests for workbench-core.
//!
//! Runs the event bus, decoder and a full chat turn under
//! wasm32-unknown-unknown via `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use std::rc::Rc;
use async_trait::async_trait;

use workbench_core::chat::{ChatSession, FAILURE_MARKER};
use workbench_core::decoder::Utf8StreamDecoder;
use workbench_core::event_bus::EventBus;
use workbench_core::ports::*;
use workbench_core::stream::StreamConsumer;
use workbench_types::event::ChatEvent;
use workbench_types::knowledge::*;
use workbench_types::{Result, WorkbenchError};

struct FixedTransport {
    pieces: Vec<Result<Vec<u8>>>,
}

#[async_trait(?Send)]
impl TransportPort for FixedTransport {
    async fn send(&self, _context: &RequestContext) -> Result<TransportResponse> {
        let body = Box::pin(futures::stream::iter(self.pieces.clone())) as ByteStream;
        Ok(TransportResponse::new(200, Some(body)))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct NoKnowledge;

impl KnowledgeSource for NoKnowledge {
    fn list(&self) -> Vec<KnowledgeItem> {
        Vec::new()
    }
}

fn chat_with(pieces: Vec<Result<Vec<u8>>>) -> ChatSession {
    let transport = Rc::new(FixedTransport { pieces });
    let chat = ChatSession::new(StreamConsumer::new(transport), Rc::new(NoKnowledge), EventBus::new());
    chat.create_session();
    chat
}

#[wasm_bindgen_test]
fn event_bus_emit_and_drain() {
    let bus = EventBus::new();
    bus.emit(ChatEvent::TurnComplete);
    assert!(bus.has_pending());
    assert_eq!(bus.drain().len(), 1);
}

#[wasm_bindgen_test]
fn decoder_split_character() {
    let bytes = "界".as_bytes();
    let mut decoder = Utf8StreamDecoder::new();
    assert_eq!(decoder.decode(&bytes[..1]).unwrap(), "");
    assert_eq!(decoder.decode(&bytes[1..]).unwrap(), "界");
    decoder.finish().unwrap();
}

#[wasm_bindgen_test]
async fn chat_turn_streams_answer() {
    let chat = chat_with(vec![Ok(b"Hel".to_vec()), Ok(b"lo".to_vec())]);
    chat.ask("What is X?", &[]).await;
    let session = chat.session().unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[1].content, "Hello");
    assert!(!chat.is_thinking());
}

#[wasm_bindgen_test]
async fn chat_turn_failure_sets_marker() {
    let chat = chat_with(vec![
        Ok(b"Hel".to_vec()),
        Err(WorkbenchError::Network("reset".to_string())),
    ]);
    chat.ask("What is X?", &[]).await;
    let session = chat.session().unwrap();
    assert_eq!(session.messages[1].content, FAILURE_MARKER);
    assert!(chat.error_message().is_some());
}
