//! IndexedDB-backed store
//!
//! Layout: database `webviewer-storage` (v1), object store `pdf-data` with out-of-line keys
//! `saved-pdf` (a PDF `Blob`) and `saved-xfdf` (a string). Every operation opens the
//! database, runs one transaction to completion and closes the handle again.

use js_sys::{Array, ArrayBuffer, Promise, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, DomException, Event, IdbDatabase, IdbRequest, IdbTransaction,
    IdbTransactionMode,
};

use super::{DocumentStore, SavedDocument};
use crate::consts::{CONTENT_KEY, CONTENT_TYPE, DB_NAME, DB_VERSION, OVERLAY_KEY, STORE_NAME};
use crate::error::StorageError;

type EventClosure = Closure<dyn FnMut(Event)>;

#[derive(Debug, Clone)]
pub struct IndexedDbStore {
    db_name: String,
    store_name: String,
}

impl Default for IndexedDbStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedDbStore {
    pub fn new() -> Self {
        Self::with_names(DB_NAME, STORE_NAME)
    }

    pub fn with_names(db_name: &str, store_name: &str) -> Self {
        Self {
            db_name: db_name.to_string(),
            store_name: store_name.to_string(),
        }
    }

    async fn open(&self) -> Result<IdbDatabase, StorageError> {
        let factory = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?
            .indexed_db()
            .map_err(|e| unavailable(&e))?
            .ok_or_else(|| StorageError::Unavailable("IndexedDB not supported".to_string()))?;

        let request = factory
            .open_with_u32(&self.db_name, DB_VERSION)
            .map_err(|e| unavailable(&e))?;

        let upgrade_request = request.clone();
        let store_name = self.store_name.clone();
        let on_upgrade = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::IdbVersionChangeEvent| {
            let Some(db) = upgrade_request
                .result()
                .ok()
                .and_then(|value| value.dyn_into::<IdbDatabase>().ok())
            else {
                log::error!("Upgrade fired without a database");
                return;
            };
            if !db.object_store_names().contains(&store_name) {
                if let Err(e) = db.create_object_store(&store_name) {
                    log::error!("Failed to create object store: {:?}", e);
                } else {
                    log::info!("Created object store '{}'", store_name);
                }
            }
        });
        request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));

        let opened = await_request(&request).await;
        request.set_onupgradeneeded(None);
        drop(on_upgrade);

        opened?
            .dyn_into::<IdbDatabase>()
            .map_err(|_| StorageError::Unavailable("open did not yield a database".to_string()))
    }

    fn transaction(
        &self,
        db: &IdbDatabase,
        mode: IdbTransactionMode,
    ) -> Result<IdbTransaction, StorageError> {
        db.transaction_with_str_and_mode(&self.store_name, mode)
            .map_err(|e| storage_error(e.dyn_ref::<DomException>(), &e))
    }

    async fn run_save(&self, db: &IdbDatabase, content: &[u8], overlay: &str) -> Result<(), StorageError> {
        let tx = self.transaction(db, IdbTransactionMode::Readwrite)?;
        let store = tx.object_store(&self.store_name).map_err(|e| unavailable(&e))?;

        let blob = content_blob(content)?;
        store
            .put_with_key(&blob, &JsValue::from_str(CONTENT_KEY))
            .map_err(|e| storage_error(e.dyn_ref::<DomException>(), &e))?;
        store
            .put_with_key(&JsValue::from_str(overlay), &JsValue::from_str(OVERLAY_KEY))
            .map_err(|e| storage_error(e.dyn_ref::<DomException>(), &e))?;

        await_transaction(&tx).await
    }

    async fn run_load(&self, db: &IdbDatabase) -> Result<Option<SavedDocument>, StorageError> {
        let tx = self.transaction(db, IdbTransactionMode::Readonly)?;
        let store = tx.object_store(&self.store_name).map_err(|e| unavailable(&e))?;

        let content_request = store
            .get(&JsValue::from_str(CONTENT_KEY))
            .map_err(|e| unavailable(&e))?;
        let overlay_request = store
            .get(&JsValue::from_str(OVERLAY_KEY))
            .map_err(|e| unavailable(&e))?;

        // Both gets belong to the same transaction; once it completes both results are set
        await_transaction(&tx).await?;
        let content = content_request.result().map_err(|e| unavailable(&e))?;
        let overlay = overlay_request.result().map_err(|e| unavailable(&e))?;

        let Some(content) = read_content(content).await? else {
            return Ok(None);
        };
        let overlay = if overlay.is_undefined() || overlay.is_null() {
            String::new()
        } else {
            overlay
                .as_string()
                .ok_or(StorageError::Malformed(OVERLAY_KEY))?
        };

        Ok(Some(SavedDocument { content, overlay }))
    }

    async fn run_clear(&self, db: &IdbDatabase) -> Result<(), StorageError> {
        let tx = self.transaction(db, IdbTransactionMode::Readwrite)?;
        let store = tx.object_store(&self.store_name).map_err(|e| unavailable(&e))?;
        store
            .clear()
            .map_err(|e| storage_error(e.dyn_ref::<DomException>(), &e))?;
        await_transaction(&tx).await
    }
}

impl DocumentStore for IndexedDbStore {
    async fn save(&self, content: &[u8], overlay: &str) -> Result<(), StorageError> {
        let db = self.open().await?;
        let result = self.run_save(&db, content, overlay).await;
        db.close();
        if result.is_ok() {
            log::info!("Stored document ({} bytes) and overlay ({} chars)", content.len(), overlay.len());
        }
        result
    }

    async fn load(&self) -> Result<Option<SavedDocument>, StorageError> {
        let db = self.open().await?;
        let result = self.run_load(&db).await;
        db.close();
        result
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let db = self.open().await?;
        let result = self.run_clear(&db).await;
        db.close();
        if result.is_ok() {
            log::info!("Cleared saved document");
        }
        result
    }
}

fn unavailable(err: &JsValue) -> StorageError {
    StorageError::Unavailable(format!("{:?}", err))
}

fn storage_error(exception: Option<&DomException>, fallback: &JsValue) -> StorageError {
    match exception {
        Some(ex) => StorageError::from_exception(&ex.name(), &ex.message()),
        None => unavailable(fallback),
    }
}

fn content_blob(content: &[u8]) -> Result<Blob, StorageError> {
    let parts = Array::of1(&Uint8Array::from(content));
    let options = BlobPropertyBag::new();
    options.set_type(CONTENT_TYPE);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(|e| unavailable(&e))
}

/// Accepts the shapes the content record has been written in: Blob, ArrayBuffer, Uint8Array
async fn read_content(value: JsValue) -> Result<Option<Vec<u8>>, StorageError> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    if let Some(blob) = value.dyn_ref::<Blob>() {
        let buffer = JsFuture::from(blob.array_buffer())
            .await
            .map_err(|e| unavailable(&e))?;
        return Ok(Some(Uint8Array::new(&buffer).to_vec()));
    }
    if let Some(bytes) = value.dyn_ref::<Uint8Array>() {
        return Ok(Some(bytes.to_vec()));
    }
    if let Some(buffer) = value.dyn_ref::<ArrayBuffer>() {
        return Ok(Some(Uint8Array::new(buffer).to_vec()));
    }
    Err(StorageError::Malformed(CONTENT_KEY))
}

/// Resolve once `request` fires success or error
async fn await_request(request: &IdbRequest) -> Result<JsValue, StorageError> {
    let mut handlers: Option<(EventClosure, EventClosure)> = None;
    let promise = Promise::new(&mut |resolve, reject| {
        let on_success: EventClosure = Closure::once(move |_event: Event| {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let on_error: EventClosure = Closure::once(move |_event: Event| {
            let _ = reject.call0(&JsValue::NULL);
        });
        request.set_onsuccess(Some(on_success.as_ref().unchecked_ref()));
        request.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        handlers = Some((on_success, on_error));
    });

    let outcome = JsFuture::from(promise).await;
    request.set_onsuccess(None);
    request.set_onerror(None);
    drop(handlers);

    match outcome {
        Ok(_) => request.result().map_err(|e| unavailable(&e)),
        Err(e) => {
            let exception = request.error().ok().flatten();
            Err(storage_error(exception.as_ref(), &e))
        }
    }
}

/// Resolve once `tx` completes; error or abort reject
async fn await_transaction(tx: &IdbTransaction) -> Result<(), StorageError> {
    let mut handlers: Option<(EventClosure, EventClosure, EventClosure)> = None;
    let promise = Promise::new(&mut |resolve, reject| {
        let on_complete: EventClosure = Closure::once(move |_event: Event| {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let reject_abort = reject.clone();
        let on_error: EventClosure = Closure::once(move |_event: Event| {
            let _ = reject.call0(&JsValue::NULL);
        });
        let on_abort: EventClosure = Closure::once(move |_event: Event| {
            let _ = reject_abort.call0(&JsValue::NULL);
        });
        tx.set_oncomplete(Some(on_complete.as_ref().unchecked_ref()));
        tx.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        tx.set_onabort(Some(on_abort.as_ref().unchecked_ref()));
        handlers = Some((on_complete, on_error, on_abort));
    });

    let outcome = JsFuture::from(promise).await;
    tx.set_oncomplete(None);
    tx.set_onerror(None);
    tx.set_onabort(None);
    drop(handlers);

    outcome.map(|_| ()).map_err(|e| storage_error(tx.error().as_ref(), &e))
}
