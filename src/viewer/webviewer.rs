//! Bridge to a WebViewer instance living in the page
//!
//! The instance is an opaque `JsValue`. Small inline JS shims reach into
//! `instance.Core.documentViewer`, `instance.Core.annotationManager` and `instance.UI`.

use js_sys::{Function, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{Listener, Subscription, Viewer, ViewerEvent};
use crate::consts::CONTENT_TYPE;
use crate::error::ViewerError;

#[wasm_bindgen(inline_js = "
    export function wv_create(element, path, licenseKey, language) {
        const options = { path, defaultLanguage: language };
        if (licenseKey) {
            options.licenseKey = licenseKey;
        }
        return window.WebViewer(options, element);
    }

    export function wv_has_document(instance) {
        return instance.Core.documentViewer.getDocument() != null;
    }

    export async function wv_document_bytes(instance) {
        const doc = instance.Core.documentViewer.getDocument();
        if (!doc) {
            return null;
        }
        const data = await doc.getFileData({});
        return new Uint8Array(data);
    }

    export async function wv_export_overlay(instance) {
        return await instance.Core.annotationManager.exportAnnotations();
    }

    export async function wv_import_overlay(instance, xfdf) {
        await instance.Core.annotationManager.importAnnotations(xfdf);
    }

    export function wv_load_document(instance, bytes, filename, contentType) {
        const blob = new Blob([bytes], { type: contentType });
        instance.UI.loadDocument(blob, { filename });
    }

    export function wv_close_document(instance) {
        return instance.Core.documentViewer.closeDocument();
    }

    export function wv_listen(instance, onLoaded, onUnloaded, onLoadError, onAnnotation) {
        const { documentViewer, annotationManager } = instance.Core;
        const annotationChanged = (_annotations, _action, info) => {
            onAnnotation(!!(info && info.imported));
        };
        documentViewer.addEventListener('documentLoaded', onLoaded);
        documentViewer.addEventListener('documentUnloaded', onUnloaded);
        instance.UI.addEventListener('loaderror', onLoadError);
        annotationManager.addEventListener('annotationChanged', annotationChanged);
        return () => {
            documentViewer.removeEventListener('documentLoaded', onLoaded);
            documentViewer.removeEventListener('documentUnloaded', onUnloaded);
            instance.UI.removeEventListener('loaderror', onLoadError);
            annotationManager.removeEventListener('annotationChanged', annotationChanged);
        };
    }

    export function wv_set_language(instance, language) {
        instance.UI.setLanguage(language);
    }
")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn wv_create(
        element: &web_sys::Element,
        path: &str,
        license_key: Option<String>,
        language: &str,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    fn wv_has_document(instance: &JsValue) -> Result<bool, JsValue>;

    #[wasm_bindgen(catch)]
    async fn wv_document_bytes(instance: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn wv_export_overlay(instance: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn wv_import_overlay(instance: &JsValue, xfdf: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    fn wv_load_document(
        instance: &JsValue,
        bytes: &Uint8Array,
        filename: &str,
        content_type: &str,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn wv_close_document(instance: &JsValue) -> Result<JsValue, JsValue>;

    fn wv_listen(
        instance: &JsValue,
        on_loaded: &Function,
        on_unloaded: &Function,
        on_load_failed: &Function,
        on_annotation: &Function,
    ) -> Function;

    #[wasm_bindgen(catch)]
    fn wv_set_language(instance: &JsValue, language: &str) -> Result<(), JsValue>;
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Handle to a WebViewer instance
#[derive(Clone)]
pub struct WebViewerBridge {
    instance: JsValue,
}

impl WebViewerBridge {
    /// Create a WebViewer inside `element`
    ///
    /// Requires the WebViewer script to have defined `window.WebViewer`.
    pub async fn create(
        element: &web_sys::Element,
        path: &str,
        license_key: Option<&str>,
        language: &str,
    ) -> Result<Self, ViewerError> {
        let instance = wv_create(element, path, license_key.map(str::to_string), language)
            .await
            .map_err(|e| ViewerError::Load(describe(&e)))?;
        log::info!("WebViewer instance ready");
        Ok(Self { instance })
    }

    pub fn close_document(&self) {
        if let Err(e) = wv_close_document(&self.instance) {
            log::warn!("closeDocument failed: {}", describe(&e));
        }
    }

    pub fn set_language(&self, language: &str) {
        if let Err(e) = wv_set_language(&self.instance, language) {
            log::warn!("setLanguage failed: {}", describe(&e));
        }
    }
}

impl Viewer for WebViewerBridge {
    fn has_document(&self) -> bool {
        wv_has_document(&self.instance).unwrap_or(false)
    }

    async fn document_bytes(&self) -> Result<Option<Vec<u8>>, ViewerError> {
        let value = wv_document_bytes(&self.instance)
            .await
            .map_err(|e| ViewerError::Serialization(describe(&e)))?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        let bytes: Uint8Array = value
            .dyn_into()
            .map_err(|_| ViewerError::Serialization("file data is not a byte array".to_string()))?;
        Ok(Some(bytes.to_vec()))
    }

    async fn export_overlay(&self) -> Result<String, ViewerError> {
        if !self.has_document() {
            return Err(ViewerError::NoDocumentLoaded);
        }
        let value = wv_export_overlay(&self.instance)
            .await
            .map_err(|e| ViewerError::Serialization(describe(&e)))?;
        value
            .as_string()
            .ok_or_else(|| ViewerError::Serialization("exported overlay is not a string".to_string()))
    }

    async fn import_overlay(&self, overlay: &str) -> Result<(), ViewerError> {
        wv_import_overlay(&self.instance, overlay)
            .await
            .map(|_| ())
            .map_err(|e| ViewerError::Serialization(describe(&e)))
    }

    async fn load_document(&self, bytes: Vec<u8>, filename: &str) -> Result<(), ViewerError> {
        let array = Uint8Array::from(bytes.as_slice());
        wv_load_document(&self.instance, &array, filename, CONTENT_TYPE)
            .map_err(|e| ViewerError::Load(describe(&e)))
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        let loaded = {
            let listener = listener.clone();
            Closure::<dyn FnMut()>::new(move || listener(ViewerEvent::DocumentLoaded))
        };
        let unloaded = {
            let listener = listener.clone();
            Closure::<dyn FnMut()>::new(move || listener(ViewerEvent::DocumentUnloaded))
        };
        let load_failed = {
            let listener = listener.clone();
            Closure::<dyn FnMut()>::new(move || listener(ViewerEvent::LoadFailed))
        };
        let annotation = Closure::<dyn FnMut(bool)>::new(move |imported: bool| {
            listener(ViewerEvent::AnnotationChanged { imported })
        });

        let remove = wv_listen(
            &self.instance,
            loaded.as_ref().unchecked_ref(),
            unloaded.as_ref().unchecked_ref(),
            load_failed.as_ref().unchecked_ref(),
            annotation.as_ref().unchecked_ref(),
        );

        Subscription::new(move || {
            if let Err(e) = remove.call0(&JsValue::NULL) {
                log::warn!("Failed to remove viewer listeners: {}", describe(&e));
            }
            drop((loaded, unloaded, load_failed, annotation));
        })
    }
}
