//! Autosave state machine types

use serde::Serialize;

use crate::platform::ScheduledTask;

/// Where the coordinator is in its save cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum AutosavePhase {
    /// Nothing pending
    #[default]
    Idle,
    /// A change was seen; waiting for the quiet period to elapse
    Debouncing,
    /// Export + store in flight
    Writing,
}

/// Internal phase; owns the debounce timer so leaving `Debouncing` cancels it
pub(crate) enum Phase {
    Idle,
    Debouncing { epoch: u64, _timer: ScheduledTask },
    /// `rearm` records a qualifying change that arrived mid-write
    Writing { rearm: bool },
}

impl Phase {
    pub(crate) fn public(&self) -> AutosavePhase {
        match self {
            Phase::Idle => AutosavePhase::Idle,
            Phase::Debouncing { .. } => AutosavePhase::Debouncing,
            Phase::Writing { .. } => AutosavePhase::Writing,
        }
    }
}

/// Snapshot of everything the UI shows about persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct AutosaveStatus {
    pub autosave_enabled: bool,
    pub has_saved_data: bool,
    pub has_document: bool,
    pub phase: AutosavePhase,
}

impl AutosaveStatus {
    /// Drives the "Autosaving..." indicator; shown from the first pending change
    pub fn is_autosaving(&self) -> bool {
        self.phase != AutosavePhase::Idle
    }

    /// Manual save is offered only while autosave is off
    pub fn can_save_manually(&self) -> bool {
        !self.autosave_enabled && self.has_document
    }

    /// With autosave on the stored copy is managed automatically, so clearing is hidden
    pub fn can_clear_saved(&self) -> bool {
        !self.autosave_enabled && self.has_saved_data
    }
}

/// Result of one write attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// No document was open; nothing written
    NoDocument,
    /// The coordinator was torn down (or autosave switched off) while exporting
    Abandoned,
}

/// Result of the startup restore sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing was stored
    Empty,
    /// The stored document was loaded into the viewer
    Restored { overlay_imported: bool },
    /// Reading storage or loading the document failed
    Failed,
    /// Already started, or disposed before restore could finish
    Skipped,
}
