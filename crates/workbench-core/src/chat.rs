//! Chat session: owns the live conversation and runs the ask/retry protocol.
//!
//! Turn lifecycle:
//! 1. `ask` records the question, appends the user message and an empty
//!    assistant placeholder, and marks the session as thinking
//! 2. the returned future streams the answer into the placeholder
//! 3. on success the placeholder holds the full answer; on failure it is
//!    replaced by [`FAILURE_MARKER`] and the retry hint is shown
//!
//! Everything runs on one thread. The bookkeeping in step 1 happens before
//! `ask` returns, so a second `ask` issued before the first future is
//! polled already sees the session as thinking.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{self, AbortHandle, AbortRegistration, Abortable, LocalBoxFuture};
use futures::FutureExt;
use workbench_types::{
    Result, WorkbenchError,
    event::ChatEvent,
    knowledge::{KnowledgeRef, RequestContext},
    message::Message,
    session::Session,
};

use crate::event_bus::EventBus;
use crate::ports::KnowledgeSource;
use crate::stream::StreamConsumer;

/// Replaces the pending answer when its request fails, so a truncated
/// answer is never shown as if it were complete.
pub const FAILURE_MARKER: &str = "Sorry, the answer could not be generated.";

/// Shown alongside a failed turn.
pub const RETRY_HINT: &str = "The request failed. Please retry.";

/// Read model handed to the UI
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatSnapshot {
    pub session: Option<Session>,
    pub is_thinking: bool,
    pub error_message: Option<String>,
    pub last_question: Option<String>,
}

#[derive(Default)]
struct ChatState {
    session: Option<Session>,
    is_thinking: bool,
    error_message: Option<String>,
    last_question: Option<String>,
    /// Bumped whenever the live session is replaced
    generation: u64,
    in_flight: Option<AbortHandle>,
}

/// Shared chat session. Clones drive the same state.
#[derive(Clone)]
pub struct ChatSession {
    state: Rc<RefCell<ChatState>>,
    consumer: Rc<RefCell<StreamConsumer>>,
    knowledge: Rc<dyn KnowledgeSource>,
    event_bus: EventBus,
}

impl ChatSession {
    /// Starts without a live session; call [`create_session`](Self::create_session) first.
    pub fn new(
        consumer: StreamConsumer,
        knowledge: Rc<dyn KnowledgeSource>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChatState::default())),
            consumer: Rc::new(RefCell::new(consumer)),
            knowledge,
            event_bus,
        }
    }

    /// Replace the live session with an empty one and return its id.
    ///
    /// A turn still in flight is aborted; nothing it produces afterwards
    /// reaches the new session.
    pub fn create_session(&self) -> String {
        let session = Session::fresh();
        let session_id = session.id.clone();
        {
            let mut state = self.state.borrow_mut();
            if let Some(handle) = state.in_flight.take() {
                log::info!("Aborting in-flight turn of the replaced session");
                handle.abort();
            }
            state.generation += 1;
            state.session = Some(session);
            state.is_thinking = false;
            state.error_message = None;
        }
        log::info!("Session {} created", session_id);
        self.event_bus.emit(ChatEvent::SessionCreated {
            session_id: session_id.clone(),
        });
        session_id
    }

    /// Start a turn for `question`, referencing the selected knowledge items.
    ///
    /// Ignored (returns a completed future) when there is no live session or
    /// a turn is already in flight. Otherwise the session is updated before
    /// this returns and the future streams the answer; spawn it with
    /// `wasm_bindgen_futures::spawn_local` or await it. Dropping the future
    /// before it completes fails the turn as cancelled.
    pub fn ask(&self, question: &str, selected_ids: &[String]) -> LocalBoxFuture<'static, ()> {
        let (generation, registration, consumer) = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;

            if state.is_thinking {
                log::debug!("ask ignored: a request is already in flight");
                return future::ready(()).boxed_local();
            }
            let Some(session) = state.session.as_mut() else {
                log::debug!("ask ignored: no live session");
                return future::ready(()).boxed_local();
            };

            state.last_question = Some(question.to_string());
            state.error_message = None;
            session.messages.push(Message::user(question));
            session.messages.push(Message::assistant(""));
            state.is_thinking = true;

            let (handle, registration) = AbortHandle::new_pair();
            state.in_flight = Some(handle);

            (state.generation, registration, self.consumer.borrow().clone())
        };

        // The knowledge source may read this session, so no borrow is held here
        let context = RequestContext::new(question, self.resolve_knowledge(selected_ids));
        let turn = TurnGuard {
            chat: self.clone(),
            generation,
            finished: false,
        };

        log::info!(
            "Turn started via {} ({} chars, {} references)",
            consumer.transport_name(),
            context.question.chars().count(),
            context.knowledge.len()
        );
        self.event_bus.emit(ChatEvent::TurnStart {
            question: context.question.clone(),
            knowledge_count: context.knowledge.len(),
        });

        run_turn(turn, context, registration, consumer).boxed_local()
    }

    /// Ask the most recent question again as a new turn.
    /// Ignored without a previous question or while thinking.
    pub fn retry(&self, selected_ids: &[String]) -> LocalBoxFuture<'static, ()> {
        let question = {
            let state = self.state.borrow();
            if state.is_thinking {
                None
            } else {
                state.last_question.clone()
            }
        };
        match question {
            Some(question) => self.ask(&question, selected_ids),
            None => {
                log::debug!("retry ignored: nothing to retry or still thinking");
                future::ready(()).boxed_local()
            }
        }
    }

    /// Append `chunk` to the newest message if it is an assistant message.
    /// Returns whether anything was appended.
    pub fn append_to_last_assistant(&self, chunk: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(session) = state.session.as_mut() else {
            return false;
        };
        let Some(last) = session.messages.len().checked_sub(1) else {
            return false;
        };
        let message = &mut session.messages[last];
        if !message.is_assistant() {
            log::warn!("Dropping chunk: newest message is not an assistant message");
            return false;
        }
        message.content.push_str(chunk);
        true
    }

    /// Use `consumer` for turns started from now on
    pub fn set_consumer(&self, consumer: StreamConsumer) {
        log::info!("Chat transport set to {}", consumer.transport_name());
        *self.consumer.borrow_mut() = consumer;
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn is_thinking(&self) -> bool {
        self.state.borrow().is_thinking
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().error_message.clone()
    }

    pub fn last_question(&self) -> Option<String> {
        self.state.borrow().last_question.clone()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let state = self.state.borrow();
        ChatSnapshot {
            session: state.session.clone(),
            is_thinking: state.is_thinking,
            error_message: state.error_message.clone(),
            last_question: state.last_question.clone(),
        }
    }

    /// Selected ids that the knowledge source does not hold are dropped.
    fn resolve_knowledge(&self, selected_ids: &[String]) -> Vec<KnowledgeRef> {
        self.knowledge
            .list()
            .iter()
            .filter(|item| selected_ids.iter().any(|id| *id == item.id))
            .map(|item| item.to_ref())
            .collect()
    }

    fn deliver(&self, generation: u64, text: &str) {
        if self.state.borrow().generation != generation {
            return;
        }
        if self.append_to_last_assistant(text) {
            self.event_bus.emit(ChatEvent::Chunk {
                text: text.to_string(),
            });
        }
    }

    fn finish_turn(&self, generation: u64, result: Result<()>) {
        let event = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;

            if state.generation != generation {
                log::debug!("Discarding outcome of a turn from a replaced session");
                return;
            }
            state.in_flight = None;
            state.is_thinking = false;

            match result {
                Ok(()) => {
                    let answer_len = state
                        .session
                        .as_ref()
                        .and_then(|s| s.last_message())
                        .map(|m| m.content.len())
                        .unwrap_or(0);
                    log::info!("Turn complete ({} bytes)", answer_len);
                    ChatEvent::TurnComplete
                }
                Err(e) => {
                    log::warn!("Turn failed ({}): {}", e.kind(), e);
                    if let Some(last) = state
                        .session
                        .as_mut()
                        .and_then(|s| s.messages.last_mut())
                        .filter(|m| m.is_assistant())
                    {
                        last.content = FAILURE_MARKER.to_string();
                    }
                    state.error_message = Some(RETRY_HINT.to_string());
                    ChatEvent::TurnFailed {
                        message: RETRY_HINT.to_string(),
                    }
                }
            }
        };
        self.event_bus.emit(event);
    }
}

/// Settles a turn exactly once. Dropping the turn's future before it
/// finishes counts as a cancellation, so the session never stays thinking.
struct TurnGuard {
    chat: ChatSession,
    generation: u64,
    finished: bool,
}

impl TurnGuard {
    fn finish(mut self, result: Result<()>) {
        self.finished = true;
        self.chat.finish_turn(self.generation, result);
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if !self.finished {
            log::debug!("Turn dropped before it finished");
            self.chat.finish_turn(self.generation, Err(WorkbenchError::Cancelled));
        }
    }
}

async fn run_turn(
    turn: TurnGuard,
    context: RequestContext,
    registration: AbortRegistration,
    consumer: StreamConsumer,
) {
    let sink = turn.chat.clone();
    let generation = turn.generation;
    let streamed = Abortable::new(
        consumer.stream(&context, move |text| sink.deliver(generation, text)),
        registration,
    )
    .await;

    turn.finish(streamed.unwrap_or(Err(WorkbenchError::Cancelled)));
}
