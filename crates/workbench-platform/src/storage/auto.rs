//! Backend selection from [`StorageConfig`].
//!
//! `Auto` prefers IndexedDB and falls back to memory; an explicit
//! `IndexedDb` choice that cannot be honoured is an error.

use std::rc::Rc;
use workbench_core::ports::StoragePort;
use workbench_types::{Result, config::{StorageBackendType, StorageConfig}};
use super::{IndexedDbStorage, MemoryStorage};

pub async fn open_storage(config: &StorageConfig) -> Result<Rc<dyn StoragePort>> {
    match config.backend {
        StorageBackendType::Memory => {
            log::info!("Storage backend: memory (configured)");
            Ok(Rc::new(MemoryStorage::new()))
        }
        StorageBackendType::IndexedDb => {
            let idb = IndexedDbStorage::open().await?;
            log::info!("Storage backend: IndexedDB (configured)");
            Ok(Rc::new(idb))
        }
        StorageBackendType::Auto => match IndexedDbStorage::open().await {
            Ok(idb) => {
                log::info!("Storage backend: IndexedDB");
                Ok(Rc::new(idb))
            }
            Err(e) => {
                log::warn!("IndexedDB unavailable ({}), falling back to memory", e);
                Ok(Rc::new(MemoryStorage::new()))
            }
        },
    }
}
