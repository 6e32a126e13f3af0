//! PDF Annotator - autosave and restore for a browser PDF annotation front end
//!
//! The viewer (rendering, annotation editing) is an external component. This crate
//! decides when the open document and its annotation overlay get written to browser
//! storage, and restores them on the next session.
//!
//! Core modules:
//! - `persistence`: Durable store for one saved document + overlay (IndexedDB on web)
//! - `autosave`: Debounced autosave coordinator and the startup restore sequence
//! - `viewer`: Viewer capability trait, events and subscriptions
//! - `platform`: Browser/native executor abstraction (spawning, timers)
//! - `settings`: Persisted autosave preference

pub mod autosave;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod viewer;

pub use autosave::{AutosaveConfig, AutosavePhase, AutosaveStatus, Coordinator, Notice, Notifier};
pub use error::{Error, StorageError, ViewerError};
pub use persistence::{DocumentStore, MemoryStore, SavedDocument};
pub use settings::Settings;
pub use viewer::{Subscription, Viewer, ViewerEvent};

/// Application configuration constants
pub mod consts {
    /// Quiet period after the last change before an autosave is written
    pub const DEBOUNCE_MS: u64 = 2000;

    /// File name given to the viewer when a saved document is restored
    pub const RESTORE_FILENAME: &str = "saved.pdf";

    /// How long restore waits for the viewer to finish loading the saved document
    pub const RESTORE_TIMEOUT_MS: u64 = 30_000;

    /// IndexedDB layout
    pub const DB_NAME: &str = "webviewer-storage";
    pub const DB_VERSION: u32 = 1;
    pub const STORE_NAME: &str = "pdf-data";
    pub const CONTENT_KEY: &str = "saved-pdf";
    pub const OVERLAY_KEY: &str = "saved-xfdf";

    /// MIME type of the stored document blob
    pub const CONTENT_TYPE: &str = "application/pdf";

    /// Viewer UI languages the shell switches between
    pub const DEFAULT_LANGUAGE: &str = "en";
    pub const ALT_LANGUAGE: &str = "ja";

    /// LocalStorage key for the autosave preference
    pub const AUTOSAVE_PREF_KEY: &str = "autoSave";
}
