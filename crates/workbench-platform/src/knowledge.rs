//! Knowledge store: the user's list of knowledge items.
//!
//! Newest items first. Every mutation writes the whole list back to
//! storage as a JSON array, so a reload sees exactly what was last shown.
//! The list is shared by clones; the chat session reads it through
//! [`KnowledgeSource`].

use std::cell::RefCell;
use std::rc::Rc;

use workbench_core::ports::{KnowledgeSource, StoragePort};
use workbench_types::{
    Result,
    knowledge::{KnowledgeItem, KnowledgeStatus},
};

#[derive(Clone)]
pub struct KnowledgeStore {
    items: Rc<RefCell<Vec<KnowledgeItem>>>,
    storage: Option<Rc<dyn StoragePort>>,
    storage_key: String,
}

impl KnowledgeStore {
    /// A store that never persists
    pub fn in_memory() -> Self {
        Self {
            items: Rc::new(RefCell::new(Vec::new())),
            storage: None,
            storage_key: String::new(),
        }
    }

    /// Restore the list saved under `storage_key`.
    ///
    /// Missing, unreadable or malformed data yields an empty list; the
    /// next mutation overwrites it.
    pub async fn load(storage: Rc<dyn StoragePort>, storage_key: &str) -> Self {
        let items = match storage.get(storage_key).await {
            Ok(Some(bytes)) => parse_persisted(&bytes),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Could not read knowledge list: {}", e);
                Vec::new()
            }
        };
        log::info!(
            "Loaded {} knowledge item(s) from {}",
            items.len(),
            storage.backend_name()
        );

        Self {
            items: Rc::new(RefCell::new(items)),
            storage: Some(storage),
            storage_key: storage_key.to_string(),
        }
    }

    pub fn items(&self) -> Vec<KnowledgeItem> {
        self.items.borrow().clone()
    }

    /// Items whose processing has finished
    pub fn ready(&self) -> Vec<KnowledgeItem> {
        self.items
            .borrow()
            .iter()
            .filter(|item| item.is_ready())
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<KnowledgeItem> {
        self.items.borrow().iter().find(|item| item.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Add a text item in `processing` at the top of the list.
    /// Returns its id; blank titles are rejected with `None`.
    ///
    /// Every mutation below is undone in memory when the write fails, so
    /// the list never shows a change that storage did not take.
    pub async fn add(&self, title: &str) -> Result<Option<String>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let item = KnowledgeItem::new_text(title);
        let id = item.id.clone();
        self.items.borrow_mut().insert(0, item);

        if let Err(e) = self.persist().await {
            self.items.borrow_mut().retain(|item| item.id != id);
            log::warn!("Knowledge item {} not added: {}", id, e);
            return Err(e);
        }
        log::debug!("Knowledge item added: {}", id);
        Ok(Some(id))
    }

    /// Flip an item to `ready`. Returns `false` when the id is unknown
    /// (for instance, removed while it was processing).
    pub async fn mark_ready(&self, id: &str) -> Result<bool> {
        let previous = {
            let mut items = self.items.borrow_mut();
            let Some(item) = items.iter_mut().find(|item| item.id == id) else {
                return Ok(false);
            };
            let previous = (item.status, item.updated_at.clone());
            item.status = KnowledgeStatus::Ready;
            item.updated_at = chrono::Utc::now().to_rfc3339();
            previous
        };

        if let Err(e) = self.persist().await {
            let (status, updated_at) = previous;
            if let Some(item) = self.items.borrow_mut().iter_mut().find(|item| item.id == id) {
                item.status = status;
                item.updated_at = updated_at;
            }
            return Err(e);
        }
        Ok(true)
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut items = self.items.borrow_mut();
            match items.iter().position(|item| item.id == id) {
                Some(index) => (index, items.remove(index)),
                None => return Ok(false),
            }
        };

        if let Err(e) = self.persist().await {
            let (index, item) = removed;
            let mut items = self.items.borrow_mut();
            let index = index.min(items.len());
            items.insert(index, item);
            return Err(e);
        }
        Ok(true)
    }

    /// Swap in a list fetched from the knowledge service
    pub async fn replace_all(&self, items: Vec<KnowledgeItem>) -> Result<()> {
        let previous = std::mem::replace(&mut *self.items.borrow_mut(), items);
        if let Err(e) = self.persist().await {
            *self.items.borrow_mut() = previous;
            return Err(e);
        }
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let bytes = serde_json::to_vec(&*self.items.borrow())?;
        storage.set(&self.storage_key, &bytes).await
    }
}

impl KnowledgeSource for KnowledgeStore {
    fn list(&self) -> Vec<KnowledgeItem> {
        self.items()
    }
}

fn parse_persisted(bytes: &[u8]) -> Vec<KnowledgeItem> {
    match serde_json::from_slice::<Vec<KnowledgeItem>>(bytes) {
        Ok(items) => items,
        Err(e) => {
            log::warn!("Discarding malformed knowledge list: {}", e);
            Vec::new()
        }
    }
}
