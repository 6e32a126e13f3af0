//! User-facing notices and the sink that receives them

use std::cell::RefCell;
use std::fmt;

use super::state::AutosaveStatus;
use crate::error::{Error, StorageError, ViewerError};

/// Something the user should be told about; never blocks the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Manual save finished
    Saved,
    /// Manual clear finished
    Cleared,
    /// Manual save with no document open
    NothingToSave,
    StorageFailed(StorageError),
    ExportFailed(ViewerError),
    RestoreFailed(String),
    /// Saved annotations could not be imported; the document itself is shown
    OverlayRejected(ViewerError),
}

impl Notice {
    pub(crate) fn from_error(error: &Error) -> Self {
        match error {
            Error::Storage(e) => Notice::StorageFailed(e.clone()),
            Error::Viewer(e) => Notice::ExportFailed(e.clone()),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Saved | Notice::Cleared | Notice::NothingToSave)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Saved => write!(f, "Saved"),
            Notice::Cleared => write!(f, "Saved data cleared"),
            Notice::NothingToSave => write!(f, "PDF is not loaded"),
            Notice::StorageFailed(e) => write!(f, "Could not save: {}", e),
            Notice::ExportFailed(e) => write!(f, "Could not export annotations: {}", e),
            Notice::RestoreFailed(reason) => write!(f, "Could not restore saved document: {}", reason),
            Notice::OverlayRejected(e) => write!(f, "Saved annotations could not be restored: {}", e),
        }
    }
}

/// Receives status changes and notices from the coordinator
pub trait Notifier {
    fn status_changed(&self, _status: &AutosaveStatus) {}
    fn notice(&self, _notice: &Notice) {}
}

/// Writes notices to the log and nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notice(&self, notice: &Notice) {
        if notice.is_error() {
            log::warn!("{}", notice);
        } else {
            log::info!("{}", notice);
        }
    }
}

/// Keeps every status and notice it receives
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    statuses: RefCell<Vec<AutosaveStatus>>,
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<AutosaveStatus> {
        self.statuses.borrow().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn last_status(&self) -> Option<AutosaveStatus> {
        self.statuses.borrow().last().copied()
    }
}

impl Notifier for RecordingNotifier {
    fn status_changed(&self, status: &AutosaveStatus) {
        self.statuses.borrow_mut().push(*status);
    }

    fn notice(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}
