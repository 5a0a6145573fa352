//! IndexedDB storage backend.
//!
//! One object store of byte values keyed by string. Every request is
//! bridged to a `Promise` and awaited, so a resolved `set` means the
//! write has landed.

use async_trait::async_trait;
use js_sys::{Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{IdbDatabase, IdbObjectStore, IdbRequest, IdbTransactionMode};

use workbench_core::ports::StoragePort;
use workbench_types::{Result, WorkbenchError};

const DB_NAME: &str = "workbench";
const STORE_NAME: &str = "kv";
const DB_VERSION: u32 = 1;

pub struct IndexedDbStorage {
    db: IdbDatabase,
}

fn storage_err(e: JsValue) -> WorkbenchError {
    WorkbenchError::Storage(format!("{:?}", e))
}

impl IndexedDbStorage {
    /// Open the database, creating the object store on first use.
    pub async fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| WorkbenchError::Storage("No window object".to_string()))?;

        let factory = window
            .indexed_db()
            .map_err(storage_err)?
            .ok_or_else(|| WorkbenchError::Storage("IndexedDB not available".to_string()))?;

        let open_req = factory
            .open_with_u32(DB_NAME, DB_VERSION)
            .map_err(storage_err)?;

        let upgrading = open_req.clone();
        let on_upgrade = Closure::once(move |_event: web_sys::Event| {
            let db = upgrading
                .result()
                .ok()
                .and_then(|r| r.dyn_into::<IdbDatabase>().ok());
            match db {
                Some(db) if !db.object_store_names().contains(STORE_NAME) => {
                    if let Err(e) = db.create_object_store(STORE_NAME) {
                        log::error!("Failed to create object store: {:?}", e);
                    }
                }
                Some(_) => {}
                None => log::error!("IndexedDB upgrade without a database"),
            }
        });
        open_req.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));
        on_upgrade.forget();

        let db = await_request(&open_req)
            .await?
            .dyn_into::<IdbDatabase>()
            .map_err(storage_err)?;

        log::debug!("Opened IndexedDB '{}' v{}", DB_NAME, DB_VERSION);
        Ok(Self { db })
    }

    fn store(&self, mode: IdbTransactionMode) -> Result<IdbObjectStore> {
        self.db
            .transaction_with_str_and_mode(STORE_NAME, mode)
            .and_then(|tx| tx.object_store(STORE_NAME))
            .map_err(storage_err)
    }
}

#[async_trait(?Send)]
impl StoragePort for IndexedDbStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let req = self
            .store(IdbTransactionMode::Readonly)?
            .get(&JsValue::from_str(key))
            .map_err(storage_err)?;
        let value = await_request(&req).await?;

        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        if !value.is_instance_of::<Uint8Array>() {
            return Err(WorkbenchError::Storage(format!(
                "value under '{}' is not a byte array",
                key
            )));
        }
        Ok(Some(Uint8Array::new(&value).to_vec()))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let req = self
            .store(IdbTransactionMode::Readwrite)?
            .put_with_key(&Uint8Array::from(value), &JsValue::from_str(key))
            .map_err(storage_err)?;
        await_request(&req).await?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "indexeddb"
    }
}

/// Resolve with the request's result once it succeeds.
async fn await_request(req: &IdbRequest) -> Result<JsValue> {
    let target = req.clone();
    let promise = Promise::new(&mut move |resolve, reject| {
        let succeeded = target.clone();
        let on_success = Closure::once(move |_: web_sys::Event| {
            let result = succeeded.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        let on_error = Closure::once(move |_: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("IndexedDB request failed"));
        });
        target.set_onsuccess(Some(on_success.as_ref().unchecked_ref()));
        target.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_success.forget();
        on_error.forget();
    });
    JsFuture::from(promise).await.map_err(storage_err)
}
