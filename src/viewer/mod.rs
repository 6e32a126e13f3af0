//! Viewer capability boundary
//!
//! The rendering/editing engine is external. The coordinator only needs to read the open
//! document's bytes, export and import the annotation overlay, load a document, and hear
//! about lifecycle changes. Listeners are registered through [`Viewer::subscribe`] and
//! removed when the returned [`Subscription`] is dropped.

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod webviewer;

pub use headless::HeadlessViewer;
#[cfg(target_arch = "wasm32")]
pub use webviewer::WebViewerBridge;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ViewerError;

/// Lifecycle notifications emitted by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    DocumentLoaded,
    DocumentUnloaded,
    /// The viewer gave up on a document passed to `load_document`
    LoadFailed,
    /// `imported` is true when the change came from an overlay import rather than a user edit
    AnnotationChanged { imported: bool },
}

pub type Listener = Rc<dyn Fn(ViewerEvent)>;

/// Operations the external viewer exposes
///
/// All async operations run on the UI thread; implementations may emit events
/// synchronously from inside them.
#[allow(async_fn_in_trait)]
pub trait Viewer {
    fn has_document(&self) -> bool;

    /// Raw bytes of the open document, `None` if nothing is loaded
    async fn document_bytes(&self) -> Result<Option<Vec<u8>>, ViewerError>;

    /// Serialized annotation overlay of the open document
    async fn export_overlay(&self) -> Result<String, ViewerError>;

    /// Apply a serialized overlay; emits `AnnotationChanged { imported: true }`
    async fn import_overlay(&self, overlay: &str) -> Result<(), ViewerError>;

    /// Open `bytes` as the current document; `DocumentLoaded` or `LoadFailed` follows
    async fn load_document(&self, bytes: Vec<u8>, filename: &str) -> Result<(), ViewerError>;

    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// Registration guard; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Listener registry for viewer implementations that dispatch events from Rust
#[derive(Default, Clone)]
pub struct Listeners {
    registry: Rc<RefCell<Registry>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Listener) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, listener));
            id
        };

        let registry = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Deliver `event` to every listener registered at the time of the call
    ///
    /// The registry is not borrowed while listeners run, so they may subscribe,
    /// unsubscribe or call back into the viewer.
    pub fn emit(&self, event: ViewerEvent) {
        let snapshot: Vec<Listener> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
