//! In-memory viewer
//!
//! Stands in for the browser viewer in native runs and tests. The "overlay" is an opaque
//! string that user edits replace wholesale; events are emitted synchronously.

use std::cell::{Cell, RefCell};

use super::{Listener, Listeners, Subscription, Viewer, ViewerEvent};
use crate::error::ViewerError;

#[derive(Debug, Clone)]
struct OpenDocument {
    bytes: Vec<u8>,
    filename: String,
    overlay: String,
}

#[derive(Default)]
pub struct HeadlessViewer {
    document: RefCell<Option<OpenDocument>>,
    listeners: Listeners,
    reject_imports: Cell<bool>,
    stall_loads: Cell<bool>,
    imports: Cell<usize>,
}

impl HeadlessViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document with an empty overlay, replacing any open one
    pub fn open(&self, bytes: impl Into<Vec<u8>>, filename: &str) {
        if self.has_document() {
            self.close();
        }
        *self.document.borrow_mut() = Some(OpenDocument {
            bytes: bytes.into(),
            filename: filename.to_string(),
            overlay: String::new(),
        });
        self.listeners.emit(ViewerEvent::DocumentLoaded);
    }

    pub fn close(&self) {
        let closed = self.document.borrow_mut().take();
        if closed.is_some() {
            self.listeners.emit(ViewerEvent::DocumentUnloaded);
        }
    }

    /// Simulate a user edit that leaves the overlay as `overlay`
    ///
    /// Returns false (and emits nothing) when no document is open.
    pub fn annotate(&self, overlay: impl Into<String>) -> bool {
        {
            let mut document = self.document.borrow_mut();
            let Some(doc) = document.as_mut() else {
                return false;
            };
            doc.overlay = overlay.into();
        }
        self.listeners
            .emit(ViewerEvent::AnnotationChanged { imported: false });
        true
    }

    /// Emit an arbitrary event without touching document state
    pub fn emit(&self, event: ViewerEvent) {
        self.listeners.emit(event);
    }

    /// Make subsequent imports fail with a serialization error
    pub fn set_reject_imports(&self, reject: bool) {
        self.reject_imports.set(reject);
    }

    /// Make `load_document` accept the bytes but never open them or signal
    ///
    /// Models a viewer stuck on a document it cannot finish loading.
    pub fn set_stall_loads(&self, stall: bool) {
        self.stall_loads.set(stall);
    }

    pub fn overlay(&self) -> Option<String> {
        self.document.borrow().as_ref().map(|doc| doc.overlay.clone())
    }

    pub fn filename(&self) -> Option<String> {
        self.document.borrow().as_ref().map(|doc| doc.filename.clone())
    }

    /// Number of successful overlay imports
    pub fn import_count(&self) -> usize {
        self.imports.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Viewer for HeadlessViewer {
    fn has_document(&self) -> bool {
        self.document.borrow().is_some()
    }

    async fn document_bytes(&self) -> Result<Option<Vec<u8>>, ViewerError> {
        Ok(self.document.borrow().as_ref().map(|doc| doc.bytes.clone()))
    }

    async fn export_overlay(&self) -> Result<String, ViewerError> {
        self.overlay().ok_or(ViewerError::NoDocumentLoaded)
    }

    async fn import_overlay(&self, overlay: &str) -> Result<(), ViewerError> {
        if self.reject_imports.get() {
            return Err(ViewerError::Serialization("malformed XFDF".to_string()));
        }
        {
            let mut document = self.document.borrow_mut();
            let doc = document.as_mut().ok_or(ViewerError::NoDocumentLoaded)?;
            doc.overlay = overlay.to_string();
        }
        self.imports.set(self.imports.get() + 1);
        self.listeners
            .emit(ViewerEvent::AnnotationChanged { imported: true });
        Ok(())
    }

    async fn load_document(&self, bytes: Vec<u8>, filename: &str) -> Result<(), ViewerError> {
        if bytes.is_empty() {
            return Err(ViewerError::Load("empty document".to_string()));
        }
        if self.stall_loads.get() {
            log::debug!("Holding {} ({} bytes) without loading", filename, bytes.len());
            return Ok(());
        }
        self.open(bytes, filename);
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.listeners.add(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::rc::Rc;

    fn record(viewer: &HeadlessViewer) -> (Rc<RefCell<Vec<ViewerEvent>>>, Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let sub = viewer.subscribe(Rc::new(move |event| sink.borrow_mut().push(event)));
        (events, sub)
    }

    #[test]
    fn test_open_edit_close_events() {
        let viewer = HeadlessViewer::new();
        let (events, _sub) = record(&viewer);

        viewer.open(b"%PDF-1.7".to_vec(), "a.pdf");
        assert!(viewer.annotate("<xfdf/>"));
        viewer.close();
        assert!(!viewer.annotate("ignored"));

        assert_eq!(
            *events.borrow(),
            vec![
                ViewerEvent::DocumentLoaded,
                ViewerEvent::AnnotationChanged { imported: false },
                ViewerEvent::DocumentUnloaded,
            ]
        );
    }

    #[test]
    fn test_reopen_unloads_previous() {
        let viewer = HeadlessViewer::new();
        viewer.open(b"one".to_vec(), "one.pdf");
        let (events, _sub) = record(&viewer);

        viewer.open(b"two".to_vec(), "two.pdf");
        assert_eq!(
            *events.borrow(),
            vec![ViewerEvent::DocumentUnloaded, ViewerEvent::DocumentLoaded]
        );
        assert_eq!(viewer.filename().as_deref(), Some("two.pdf"));
    }

    #[test]
    fn test_import_is_tagged() {
        let viewer = HeadlessViewer::new();
        viewer.open(b"doc".to_vec(), "doc.pdf");
        let (events, _sub) = record(&viewer);

        block_on(viewer.import_overlay("<xfdf>a</xfdf>")).unwrap();
        assert_eq!(
            *events.borrow(),
            vec![ViewerEvent::AnnotationChanged { imported: true }]
        );
        assert_eq!(viewer.overlay().as_deref(), Some("<xfdf>a</xfdf>"));
        assert_eq!(viewer.import_count(), 1);
    }

    #[test]
    fn test_export_without_document() {
        let viewer = HeadlessViewer::new();
        assert_eq!(
            block_on(viewer.export_overlay()),
            Err(ViewerError::NoDocumentLoaded)
        );
        assert_eq!(block_on(viewer.document_bytes()), Ok(None));
    }

    #[test]
    fn test_stalled_load_emits_nothing() {
        let viewer = HeadlessViewer::new();
        let (events, _sub) = record(&viewer);
        viewer.set_stall_loads(true);

        block_on(viewer.load_document(b"%PDF".to_vec(), "stuck.pdf")).unwrap();
        assert!(!viewer.has_document());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_rejected_import_keeps_overlay() {
        let viewer = HeadlessViewer::new();
        viewer.open(b"doc".to_vec(), "doc.pdf");
        viewer.annotate("kept");
        viewer.set_reject_imports(true);

        assert!(matches!(
            block_on(viewer.import_overlay("broken")),
            Err(ViewerError::Serialization(_))
        ));
        assert_eq!(viewer.overlay().as_deref(), Some("kept"));
        assert_eq!(viewer.import_count(), 0);
    }
}
