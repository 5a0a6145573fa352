#[cfg(test)]
mod tests {
    use crate::state::*;
    use workbench_core::chat::ChatSnapshot;
    use workbench_types::event::ChatEvent;
    use workbench_types::knowledge::*;
    use workbench_types::message::Message;
    use workbench_types::session::Session;

    fn item(id: &str, status: KnowledgeStatus) -> KnowledgeItem {
        let mut item = KnowledgeItem::new_text(format!("Item {}", id));
        item.id = id.to_string();
        item.status = status;
        item
    }

    // ─── UiState Tests ───────────────────────────────────────

    #[test]
    fn test_ui_state_initial() {
        let state = UiState::new();
        assert_eq!(state.chat, ChatSnapshot::default());
        assert!(state.knowledge.is_empty());
        assert!(state.selected.is_empty());
        assert!(state.input_text.is_empty());
        assert!(!state.show_settings);
        assert_eq!(state.status_text, "Ready");
        assert!(!state.is_busy());
        assert!(state.messages().is_empty());
    }

    #[test]
    fn test_ui_state_turn_status_text() {
        let mut state = UiState::new();
        state.process_events(vec![ChatEvent::TurnStart {
            question: "q".to_string(),
            knowledge_count: 0,
        }]);
        assert_eq!(state.status_text, "Thinking...");

        state.process_events(vec![
            ChatEvent::Chunk { text: "Hel".to_string() },
            ChatEvent::TurnComplete,
        ]);
        assert_eq!(state.status_text, "Ready");
    }

    #[test]
    fn test_ui_state_turn_start_with_references() {
        let mut state = UiState::new();
        state.process_events(vec![ChatEvent::TurnStart {
            question: "q".to_string(),
            knowledge_count: 2,
        }]);
        assert!(state.status_text.contains("2 reference"));
    }

    #[test]
    fn test_ui_state_turn_failed() {
        let mut state = UiState::new();
        state.process_events(vec![ChatEvent::TurnFailed {
            message: "Transport error: HTTP 500".to_string(),
        }]);
        assert_eq!(state.status_text, "Error: Transport error: HTTP 500");
    }

    #[test]
    fn test_ui_state_session_created() {
        let mut state = UiState::new();
        state.process_events(vec![ChatEvent::SessionCreated { session_id: "s".to_string() }]);
        assert_eq!(state.status_text, "New conversation");
    }

    #[test]
    fn test_ui_state_busy_follows_snapshot() {
        let mut state = UiState::new();
        state.set_chat(ChatSnapshot { is_thinking: true, ..ChatSnapshot::default() });
        assert!(state.is_busy());
        assert!(!state.can_retry());
    }

    #[test]
    fn test_ui_state_can_retry() {
        let mut state = UiState::new();
        state.set_chat(ChatSnapshot {
            error_message: Some("failed".to_string()),
            last_question: Some("q".to_string()),
            ..ChatSnapshot::default()
        });
        assert!(state.can_retry());

        state.chat.last_question = None;
        assert!(!state.can_retry());
    }

    #[test]
    fn test_ui_state_messages_from_session() {
        let mut state = UiState::new();
        let mut session = Session::fresh();
        session.messages.push(Message::user("q"));
        session.messages.push(Message::assistant("a"));
        state.set_chat(ChatSnapshot { session: Some(session), ..ChatSnapshot::default() });
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].content, "a");
    }

    #[test]
    fn test_ui_state_take_input() {
        let mut state = UiState::new();
        state.input_text = "   ".to_string();
        assert_eq!(state.take_input(), None);
        assert_eq!(state.input_text, "   ");

        state.input_text = "  What is X? ".to_string();
        assert_eq!(state.take_input(), Some("What is X?".to_string()));
        assert!(state.input_text.is_empty());
    }

    #[test]
    fn test_ui_state_toggle_selected() {
        let mut state = UiState::new();
        state.toggle_selected("1");
        assert!(state.selected.contains("1"));
        state.toggle_selected("1");
        assert!(state.selected.is_empty());
    }

    #[test]
    fn test_ui_state_selected_ids_in_list_order() {
        let mut state = UiState::new();
        state.set_knowledge(vec![
            item("a", KnowledgeStatus::Ready),
            item("b", KnowledgeStatus::Ready),
            item("c", KnowledgeStatus::Ready),
        ]);
        state.toggle_selected("c");
        state.toggle_selected("a");
        assert_eq!(state.selected_ids(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_ui_state_set_knowledge_prunes_selection() {
        let mut state = UiState::new();
        state.set_knowledge(vec![
            item("a", KnowledgeStatus::Ready),
            item("b", KnowledgeStatus::Ready),
        ]);
        state.toggle_selected("a");
        state.toggle_selected("b");

        // "a" removed, "b" back to processing
        state.set_knowledge(vec![item("b", KnowledgeStatus::Processing)]);
        assert!(state.selected.is_empty());
        assert!(state.selected_ids().is_empty());
    }
}
