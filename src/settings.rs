//! User preferences
//!
//! Persisted separately from the saved document in LocalStorage, so clearing saved data
//! never resets them.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::consts::{ALT_LANGUAGE, AUTOSAVE_PREF_KEY, DEFAULT_LANGUAGE};

/// User preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Autosave on document load and annotation edits (off by default)
    pub autosave: bool,
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = AUTOSAVE_PREF_KEY;

    /// Parse the stored value; the flag is kept as a bare JSON boolean
    pub fn from_stored(raw: &str) -> Option<Self> {
        serde_json::from_str::<bool>(raw.trim())
            .ok()
            .map(|autosave| Self { autosave })
    }

    pub fn to_stored(&self) -> String {
        serde_json::Value::Bool(self.autosave).to_string()
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_stored(&raw) {
                    log::info!("Loaded settings (autosave: {})", settings.autosave);
                    return settings;
                }
                log::warn!("Ignoring unreadable autosave preference {:?}", raw);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match storage.set_item(Self::STORAGE_KEY, &self.to_stored()) {
                Ok(()) => log::info!("Settings saved (autosave: {})", self.autosave),
                Err(e) => log::warn!("Failed to save settings: {:?}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// The viewer language after one press of the language button
pub fn next_language(current: &str) -> &'static str {
    if current == DEFAULT_LANGUAGE {
        ALT_LANGUAGE
    } else {
        DEFAULT_LANGUAGE
    }
}

/// Where the coordinator reads and writes preferences
pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings);
}

/// LocalStorage on the web, defaults natively
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSettings;

impl SettingsStore for LocalSettings {
    fn load(&self) -> Settings {
        Settings::load()
    }

    fn save(&self, settings: &Settings) {
        settings.save();
    }
}

/// Process-local preferences for native runs and tests
#[derive(Debug, Default)]
pub struct MemorySettings {
    current: Cell<Settings>,
    saves: Cell<usize>,
}

impl MemorySettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Cell::new(settings),
            saves: Cell::new(0),
        }
    }

    pub fn current(&self) -> Settings {
        self.current.get()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> Settings {
        self.current.get()
    }

    fn save(&self, settings: &Settings) {
        self.current.set(*settings);
        self.saves.set(self.saves.get() + 1);
    }
}
