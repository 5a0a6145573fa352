//! UI-level state that drives rendering.
//! Holds the latest chat snapshot and knowledge list plus everything the
//! panels edit locally (inputs, selection). Refreshed every frame after
//! draining the EventBus.

use std::collections::BTreeSet;

use workbench_core::chat::ChatSnapshot;
use workbench_types::event::ChatEvent;
use workbench_types::knowledge::KnowledgeItem;
use workbench_types::message::Message;

/// State visible to UI panels
pub struct UiState {
    /// Latest read of the chat session
    pub chat: ChatSnapshot,
    /// Latest read of the knowledge store
    pub knowledge: Vec<KnowledgeItem>,
    /// Ids ticked in the knowledge panel
    pub selected: BTreeSet<String>,
    /// Question input field
    pub input_text: String,
    /// Title field of the knowledge panel
    pub new_knowledge_title: String,
    /// Whether settings panel is open
    pub show_settings: bool,
    /// Status line text
    pub status_text: String,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            chat: ChatSnapshot::default(),
            knowledge: Vec::new(),
            selected: BTreeSet::new(),
            input_text: String::new(),
            new_knowledge_title: String::new(),
            show_settings: false,
            status_text: "Ready".to_string(),
        }
    }

    /// Process events from the EventBus and update the status line
    pub fn process_events(&mut self, events: Vec<ChatEvent>) {
        for event in events {
            match event {
                ChatEvent::SessionCreated { .. } => {
                    self.status_text = "New conversation".to_string();
                }
                ChatEvent::TurnStart { knowledge_count, .. } => {
                    self.status_text = match knowledge_count {
                        0 => "Thinking...".to_string(),
                        n => format!("Thinking... ({} reference(s))", n),
                    };
                }
                ChatEvent::Chunk { .. } => {}
                ChatEvent::TurnComplete => {
                    self.status_text = "Ready".to_string();
                }
                ChatEvent::TurnFailed { message } => {
                    self.status_text = format!("Error: {}", message);
                }
            }
        }
    }

    pub fn set_chat(&mut self, snapshot: ChatSnapshot) {
        self.chat = snapshot;
    }

    /// Replace the knowledge list; selections of items that are gone or
    /// no longer ready are dropped.
    pub fn set_knowledge(&mut self, items: Vec<KnowledgeItem>) {
        self.selected
            .retain(|id| items.iter().any(|item| &item.id == id && item.is_ready()));
        self.knowledge = items;
    }

    pub fn toggle_selected(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Selected ids in knowledge-list order
    pub fn selected_ids(&self) -> Vec<String> {
        self.knowledge
            .iter()
            .filter(|item| self.selected.contains(&item.id))
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn messages(&self) -> &[Message] {
        self.chat
            .session
            .as_ref()
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Trimmed question from the input field, clearing it; `None` if blank
    pub fn take_input(&mut self) -> Option<String> {
        let text = self.input_text.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.input_text.clear();
        Some(text)
    }

    pub fn is_busy(&self) -> bool {
        self.chat.is_thinking
    }

    pub fn can_retry(&self) -> bool {
        !self.is_busy() && self.chat.error_message.is_some() && self.chat.last_question.is_some()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
