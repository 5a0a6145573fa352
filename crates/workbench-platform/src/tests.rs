#[cfg(test)]
mod tests {
    use crate::knowledge::KnowledgeStore;
    use crate::storage::MemoryStorage;
    use crate::transport::simulated::{mock_answer, split_pieces};
    use crate::transport::{KnowledgeListResponse, SimulatedTransport};
    use workbench_core::ports::{KnowledgeSource, StoragePort, TransportPort};
    use workbench_core::stream::StreamConsumer;
    use workbench_types::config::{SimulatedFailure, SimulationConfig};
    use workbench_types::knowledge::*;
    use workbench_types::WorkbenchError;

    use std::cell::Cell;
    use std::rc::Rc;
    use async_trait::async_trait;
    use futures::executor::block_on;

    const KEY: &str = "ai-workbench-knowledge-list";

    fn instant(failure: SimulatedFailure) -> SimulationConfig {
        SimulationConfig {
            initial_delay_ms: 0,
            char_delay_ms: 0,
            chunk_bytes: None,
            failure,
        }
    }

    fn context(question: &str, titles: &[&str]) -> RequestContext {
        RequestContext::new(
            question,
            titles
                .iter()
                .enumerate()
                .map(|(i, t)| KnowledgeRef { id: i.to_string(), title: t.to_string() })
                .collect(),
        )
    }

    fn collect(transport: SimulatedTransport, ctx: &RequestContext) -> (Vec<String>, Result<(), WorkbenchError>) {
        let consumer = StreamConsumer::new(Rc::new(transport));
        let mut chunks = Vec::new();
        let result = block_on(consumer.stream(ctx, |c| chunks.push(c.to_string())));
        (chunks, result)
    }

    // ─── MemoryStorage Tests ─────────────────────────────────

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        block_on(storage.set("k", b"v1")).unwrap();
        block_on(storage.set("k", b"v2")).unwrap();
        assert_eq!(block_on(storage.get("k")).unwrap(), Some(b"v2".to_vec()));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.backend_name(), "memory");
    }

    #[test]
    fn test_memory_storage_missing_key() {
        let storage = MemoryStorage::new();
        block_on(storage.set("workbench:a", b"1")).unwrap();
        assert!(block_on(storage.get("workbench:b")).unwrap().is_none());
        assert!(block_on(storage.get("")).unwrap().is_none());
    }

    // ─── KnowledgeStore Tests ────────────────────────────────

    fn store_with(storage: Rc<MemoryStorage>) -> KnowledgeStore {
        block_on(KnowledgeStore::load(storage, KEY))
    }

    fn persisted(storage: &MemoryStorage) -> Vec<KnowledgeItem> {
        let bytes = block_on(storage.get(KEY)).unwrap().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = store_with(Rc::new(MemoryStorage::new()));
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_load_malformed_data_is_empty() {
        let raws: [&[u8]; 3] = [b"not json", br#"{"id":"1"}"#, br#"[{"title":1}]"#];
        for raw in raws {
            let storage = Rc::new(MemoryStorage::new());
            block_on(storage.set(KEY, raw)).unwrap();
            assert!(store_with(storage).is_empty());
        }
    }

    #[test]
    fn test_load_existing_list() {
        let storage = Rc::new(MemoryStorage::new());
        let raw = br#"[{"id":"1","title":"Intro","type":"text","status":"ready","updatedAt":"2026-01-01T00:00:00Z"}]"#;
        block_on(storage.set(KEY, raw)).unwrap();

        let store = store_with(storage);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().title, "Intro");
        assert_eq!(store.ready().len(), 1);
    }

    #[test]
    fn test_add_prepends_processing_item_and_persists() {
        let storage = Rc::new(MemoryStorage::new());
        let store = store_with(storage.clone());

        let first = block_on(store.add("First")).unwrap().unwrap();
        let second = block_on(store.add("  Second  ")).unwrap().unwrap();

        let items = store.items();
        assert_eq!(items[0].id, second);
        assert_eq!(items[0].title, "Second");
        assert_eq!(items[1].id, first);
        assert_eq!(items[0].status, KnowledgeStatus::Processing);
        assert!(store.ready().is_empty());

        assert_eq!(persisted(&storage), items);
    }

    #[test]
    fn test_add_blank_title_is_ignored() {
        let storage = Rc::new(MemoryStorage::new());
        let store = store_with(storage.clone());
        assert_eq!(block_on(store.add("   ")).unwrap(), None);
        assert!(store.is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_mark_ready() {
        let storage = Rc::new(MemoryStorage::new());
        let store = store_with(storage.clone());
        let id = block_on(store.add("Guide")).unwrap().unwrap();

        assert!(block_on(store.mark_ready(&id)).unwrap());
        assert!(store.get(&id).unwrap().is_ready());
        assert_eq!(store.ready().len(), 1);
        assert!(persisted(&storage)[0].is_ready());

        assert!(!block_on(store.mark_ready("missing")).unwrap());
    }

    #[test]
    fn test_remove_then_mark_ready_is_noop() {
        let storage = Rc::new(MemoryStorage::new());
        let store = store_with(storage.clone());
        let id = block_on(store.add("Temp")).unwrap().unwrap();

        assert!(block_on(store.remove(&id)).unwrap());
        assert!(!block_on(store.remove(&id)).unwrap());
        assert!(!block_on(store.mark_ready(&id)).unwrap());
        assert!(store.is_empty());
        assert!(persisted(&storage).is_empty());
    }

    #[test]
    fn test_replace_all() {
        let storage = Rc::new(MemoryStorage::new());
        let store = store_with(storage.clone());
        block_on(store.add("Old")).unwrap();

        let mut fresh = KnowledgeItem::new_text("Remote");
        fresh.status = KnowledgeStatus::Ready;
        block_on(store.replace_all(vec![fresh.clone()])).unwrap();

        assert_eq!(store.items(), vec![fresh.clone()]);
        assert_eq!(persisted(&storage), vec![fresh]);
    }

    #[test]
    fn test_clones_share_items() {
        let store = KnowledgeStore::in_memory();
        let view = store.clone();
        block_on(store.add("Shared")).unwrap();
        assert_eq!(view.list().len(), 1);
    }

    /// Memory storage whose writes can be switched off
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: Cell<bool>,
    }

    #[async_trait(?Send)]
    impl StoragePort for FlakyStorage {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WorkbenchError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &[u8]) -> Result<(), WorkbenchError> {
            if self.fail_writes.get() {
                return Err(WorkbenchError::Storage("quota".to_string()));
            }
            self.inner.set(key, value).await
        }

        fn backend_name(&self) -> &str {
            "flaky"
        }
    }

    fn flaky_store() -> (Rc<FlakyStorage>, KnowledgeStore) {
        let storage = Rc::new(FlakyStorage::default());
        let store = block_on(KnowledgeStore::load(storage.clone(), KEY));
        (storage, store)
    }

    #[test]
    fn test_failed_add_leaves_list_unchanged() {
        let (storage, store) = flaky_store();
        let kept = block_on(store.add("Kept")).unwrap().unwrap();

        storage.fail_writes.set(true);
        let result = block_on(store.add("Intro"));
        assert_eq!(result, Err(WorkbenchError::Storage("quota".to_string())));
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].id, kept);

        // Storage and memory still agree after the failure
        storage.fail_writes.set(false);
        let reloaded = block_on(KnowledgeStore::load(storage, KEY));
        assert_eq!(reloaded.items(), store.items());
    }

    #[test]
    fn test_failed_mark_ready_keeps_processing() {
        let (storage, store) = flaky_store();
        let id = block_on(store.add("Guide")).unwrap().unwrap();
        let before = store.get(&id).unwrap();

        storage.fail_writes.set(true);
        assert!(block_on(store.mark_ready(&id)).is_err());
        assert_eq!(store.get(&id).unwrap(), before);
        assert!(store.ready().is_empty());
    }

    #[test]
    fn test_failed_remove_restores_position() {
        let (storage, store) = flaky_store();
        let first = block_on(store.add("First")).unwrap().unwrap();
        block_on(store.add("Second")).unwrap();
        block_on(store.add("Third")).unwrap();
        let before = store.items();

        storage.fail_writes.set(true);
        assert!(block_on(store.remove(&first)).is_err());
        assert_eq!(store.items(), before);
    }

    #[test]
    fn test_failed_replace_all_keeps_old_list() {
        let (storage, store) = flaky_store();
        block_on(store.add("Old")).unwrap();
        let before = store.items();

        storage.fail_writes.set(true);
        let fetched = vec![KnowledgeItem::new_text("Remote")];
        assert!(block_on(store.replace_all(fetched)).is_err());
        assert_eq!(store.items(), before);
    }

    // ─── Simulated Transport Tests ───────────────────────────

    #[test]
    fn test_mock_answer_with_references() {
        let text = mock_answer(&context("What is X?", &["Intro", "Guide"]));
        assert_eq!(
            text,
            "[Mock Stream]\nQuestion: What is X?\nReferences: 《Intro》、《Guide》\n\nThis is simulated streaming output."
        );
    }

    #[test]
    fn test_mock_answer_without_references() {
        let text = mock_answer(&context("Hi", &[]));
        assert!(text.contains("References: (no knowledge selected)"));
    }

    #[test]
    fn test_split_pieces() {
        let pieces = split_pieces("a界", None);
        assert_eq!(pieces, vec![b"a".to_vec(), "界".as_bytes().to_vec()]);

        // Byte slices cut through the 3-byte character
        let pieces = split_pieces("a界", Some(2));
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0], vec![b'a', 0xE7]);
    }

    #[test]
    fn test_simulated_streams_whole_answer() {
        let ctx = context("Q", &["Intro"]);
        let (chunks, result) = collect(SimulatedTransport::new(instant(SimulatedFailure::Never)), &ctx);
        result.unwrap();
        assert_eq!(chunks.concat(), mock_answer(&ctx));
        assert_eq!(chunks.len(), mock_answer(&ctx).chars().count());
    }

    #[test]
    fn test_simulated_byte_slices_reassemble() {
        let ctx = context("界面", &["知识"]);
        let mut config = instant(SimulatedFailure::Never);
        config.chunk_bytes = Some(1);
        let (chunks, result) = collect(SimulatedTransport::new(config), &ctx);
        result.unwrap();
        assert_eq!(chunks.concat(), mock_answer(&ctx));
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_simulated_status_failure() {
        let ctx = context("Q", &[]);
        let (chunks, result) = collect(SimulatedTransport::new(instant(SimulatedFailure::Status(503))), &ctx);
        assert!(chunks.is_empty());
        assert_eq!(result, Err(WorkbenchError::Transport { status: 503 }));
    }

    #[test]
    fn test_simulated_failure_after_chunks() {
        let ctx = context("Q", &[]);
        let (chunks, result) = collect(SimulatedTransport::new(instant(SimulatedFailure::AfterChunks(5))), &ctx);
        assert_eq!(chunks.concat(), "[Mock");
        assert!(matches!(result, Err(WorkbenchError::Network(_))));
    }

    #[test]
    fn test_simulated_failure_beyond_answer_never_fires() {
        let ctx = context("Q", &[]);
        let (chunks, result) = collect(
            SimulatedTransport::new(instant(SimulatedFailure::AfterChunks(100_000))),
            &ctx,
        );
        result.unwrap();
        assert_eq!(chunks.concat(), mock_answer(&ctx));
    }

    #[test]
    fn test_simulated_transport_name() {
        let transport = SimulatedTransport::new(SimulationConfig::default());
        assert_eq!(transport.name(), "simulated");
        assert_eq!(transport.config().char_delay_ms, 20);
    }

    // ─── Knowledge List API Tests ────────────────────────────

    #[test]
    fn test_knowledge_list_envelope() {
        let json = r#"{"code":0,"data":[{"id":"1","title":"Intro","type":"text","status":"ready","updatedAt":"2026-01-01T00:00:00Z"}]}"#;
        let envelope: KnowledgeListResponse = serde_json::from_str(json).unwrap();
        let items = envelope.into_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Intro");
    }

    #[test]
    fn test_knowledge_list_nonzero_code() {
        let envelope: KnowledgeListResponse = serde_json::from_str(r#"{"code":1}"#).unwrap();
        assert!(matches!(envelope.into_items(), Err(WorkbenchError::Protocol(_))));
    }
}
