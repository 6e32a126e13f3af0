//! Restore-on-startup
//!
//! Runs before the coordinator subscribes to viewer events, so the load and import it
//! triggers are never mistaken for user changes. The wait for the viewer ends on
//! `DocumentLoaded`, on `LoadFailed`, or after `restore_timeout`; autosave is armed
//! afterwards in every case.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;

use super::{Inner, Notice, RestoreOutcome};
use crate::persistence::DocumentStore;
use crate::viewer::{Viewer, ViewerEvent};

/// How the wait for the restored document ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadSignal {
    Loaded,
    Failed,
    TimedOut,
}

type SignalSlot = RefCell<Option<oneshot::Sender<LoadSignal>>>;

/// First signal wins; later ones are dropped
fn settle(slot: &SignalSlot, signal: LoadSignal) {
    let tx = slot.borrow_mut().take();
    if let Some(tx) = tx {
        let _ = tx.send(signal);
    }
}

impl<V: Viewer + 'static, S: DocumentStore + 'static> Inner<V, S> {
    pub(super) async fn restore(self: &Rc<Self>) -> RestoreOutcome {
        let saved = match self.store.load().await {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                log::info!("No saved document to restore");
                self.set_has_saved_data(false);
                return RestoreOutcome::Empty;
            }
            Err(e) => {
                log::error!("Failed to read saved document: {}", e);
                self.set_has_saved_data(false);
                self.notifier.notice(&Notice::StorageFailed(e));
                return RestoreOutcome::Failed;
            }
        };
        self.set_has_saved_data(true);
        if self.is_disposed() {
            return RestoreOutcome::Skipped;
        }

        // Listen before loading: the viewer may signal synchronously
        let (signal_tx, signal_rx) = oneshot::channel();
        let signal_tx = Rc::new(RefCell::new(Some(signal_tx)));
        let slot = signal_tx.clone();
        let listener = self.viewer.subscribe(Rc::new(move |event: ViewerEvent| match event {
            ViewerEvent::DocumentLoaded => settle(&slot, LoadSignal::Loaded),
            ViewerEvent::LoadFailed => settle(&slot, LoadSignal::Failed),
            _ => {}
        }));

        let size = saved.content.len();
        if let Err(e) = self
            .viewer
            .load_document(saved.content, &self.config.restore_filename)
            .await
        {
            log::error!("Failed to load saved document: {}", e);
            self.notifier.notice(&Notice::RestoreFailed(e.to_string()));
            return RestoreOutcome::Failed;
        }

        let slot = signal_tx.clone();
        let timeout = self.executor.schedule(
            self.config.restore_timeout,
            Box::new(move || settle(&slot, LoadSignal::TimedOut)),
        );
        let signal = signal_rx.await.unwrap_or(LoadSignal::Failed);
        drop(timeout);
        drop(listener);

        if self.is_disposed() {
            return RestoreOutcome::Skipped;
        }
        match signal {
            LoadSignal::Loaded => {}
            LoadSignal::Failed => {
                log::error!("Viewer could not open the saved document");
                self.notifier.notice(&Notice::RestoreFailed(
                    "the viewer could not open the saved document".to_string(),
                ));
                return RestoreOutcome::Failed;
            }
            LoadSignal::TimedOut => {
                log::error!(
                    "Saved document did not finish loading within {:?}",
                    self.config.restore_timeout
                );
                self.notifier.notice(&Notice::RestoreFailed(format!(
                    "the saved document did not finish loading within {} s",
                    self.config.restore_timeout.as_secs()
                )));
                return RestoreOutcome::Failed;
            }
        }
        log::info!("Restored saved document ({} bytes)", size);

        if saved.overlay.is_empty() {
            return RestoreOutcome::Restored {
                overlay_imported: false,
            };
        }

        match self.viewer.import_overlay(&saved.overlay).await {
            Ok(()) => {
                log::info!("Imported saved annotations");
                RestoreOutcome::Restored {
                    overlay_imported: true,
                }
            }
            Err(e) => {
                // The document stays open without its annotations
                log::warn!("Saved annotations rejected: {}", e);
                self.notifier.notice(&Notice::OverlayRejected(e));
                RestoreOutcome::Restored {
                    overlay_imported: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::{AutosavePhase, Coordinator, RecordingNotifier};
    use crate::consts::{DEBOUNCE_MS, RESTORE_TIMEOUT_MS};
    use crate::error::{StorageError, ViewerError};
    use crate::persistence::MemoryStore;
    use crate::platform::{Executor, ManualExecutor};
    use crate::settings::{MemorySettings, Settings};
    use crate::viewer::HeadlessViewer;
    use futures::FutureExt;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::time::Duration;

    fn setup(
        autosave: bool,
    ) -> (
        Rc<ManualExecutor>,
        Rc<HeadlessViewer>,
        Rc<MemoryStore>,
        Rc<RecordingNotifier>,
        Coordinator<HeadlessViewer, MemoryStore>,
    ) {
        let exec = Rc::new(ManualExecutor::new());
        let viewer = Rc::new(HeadlessViewer::new());
        let store = Rc::new(MemoryStore::new());
        let notices = Rc::new(RecordingNotifier::new());
        let coordinator = Coordinator::builder(viewer.clone(), store.clone(), exec.clone())
            .settings(Rc::new(MemorySettings::new(Settings { autosave })))
            .notifier(notices.clone())
            .build();
        (exec, viewer, store, notices, coordinator)
    }

    /// Start in the background so a restore that waits on the clock can be observed
    fn spawn_start(
        exec: &ManualExecutor,
        coordinator: &Coordinator<HeadlessViewer, MemoryStore>,
    ) -> Rc<Cell<Option<RestoreOutcome>>> {
        let outcome = Rc::new(Cell::new(None));
        let slot = outcome.clone();
        let start = coordinator.start();
        exec.spawn(async move { slot.set(Some(start.await)) }.boxed_local());
        exec.run_until_stalled();
        outcome
    }

    #[test]
    fn test_restore_loads_and_imports_once_without_saving() {
        let (exec, viewer, store, _notices, coordinator) = setup(true);
        block_on(store.save(b"%PDF saved", "<xfdf>saved</xfdf>")).unwrap();

        let outcome = exec.block_on(coordinator.start()).unwrap();
        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                overlay_imported: true
            }
        );
        assert_eq!(viewer.filename().as_deref(), Some("saved.pdf"));
        assert_eq!(viewer.overlay().as_deref(), Some("<xfdf>saved</xfdf>"));
        assert_eq!(viewer.import_count(), 1);
        assert!(coordinator.status().has_saved_data);

        // Only the seeding save; restore never schedules a write
        exec.advance(Duration::from_millis(DEBOUNCE_MS * 5));
        assert_eq!(store.save_count(), 1);
        assert_eq!(coordinator.status().phase, AutosavePhase::Idle);
    }

    #[test]
    fn test_restore_with_empty_overlay_skips_import() {
        let (exec, viewer, store, _notices, coordinator) = setup(false);
        block_on(store.save(b"%PDF", "")).unwrap();

        let outcome = exec.block_on(coordinator.start()).unwrap();
        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                overlay_imported: false
            }
        );
        assert!(viewer.has_document());
        assert_eq!(viewer.import_count(), 0);
    }

    #[test]
    fn test_rejected_overlay_keeps_document() {
        let (exec, viewer, store, notices, coordinator) = setup(false);
        block_on(store.save(b"%PDF", "<broken")).unwrap();
        viewer.set_reject_imports(true);

        let outcome = exec.block_on(coordinator.start()).unwrap();
        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                overlay_imported: false
            }
        );
        assert!(viewer.has_document());
        assert!(matches!(
            notices.notices().as_slice(),
            [Notice::OverlayRejected(ViewerError::Serialization(_))]
        ));
    }

    #[test]
    fn test_unreadable_store_is_reported() {
        let (exec, viewer, store, notices, coordinator) = setup(true);
        store.set_failure(Some(StorageError::Unavailable("blocked".to_string())));

        let outcome = exec.block_on(coordinator.start()).unwrap();
        assert_eq!(outcome, RestoreOutcome::Failed);
        assert!(!viewer.has_document());
        assert!(!coordinator.status().has_saved_data);
        assert_eq!(
            notices.notices(),
            vec![Notice::StorageFailed(StorageError::Unavailable(
                "blocked".to_string()
            ))]
        );
        // Autosave wiring is still armed after a failed restore
        assert_eq!(viewer.listener_count(), 1);
    }

    #[test]
    fn test_document_load_failure_is_reported() {
        let (exec, viewer, store, notices, coordinator) = setup(false);
        // The headless viewer refuses empty documents
        block_on(store.save(b"", "<xfdf/>")).unwrap();

        let outcome = exec.block_on(coordinator.start()).unwrap();
        assert_eq!(outcome, RestoreOutcome::Failed);
        assert!(!viewer.has_document());
        assert!(coordinator.status().has_saved_data);
        assert!(matches!(
            notices.notices().as_slice(),
            [Notice::RestoreFailed(_)]
        ));
    }

    #[test]
    fn test_stalled_load_times_out_and_arms_autosave() {
        let (exec, viewer, store, notices, coordinator) = setup(true);
        block_on(store.save(b"%PDF saved", "<xfdf>saved</xfdf>")).unwrap();
        viewer.set_stall_loads(true);

        let outcome = spawn_start(&exec, &coordinator);
        assert_eq!(outcome.get(), None);
        assert_eq!(exec.pending_timers(), 1);

        exec.advance(Duration::from_millis(RESTORE_TIMEOUT_MS));
        assert_eq!(outcome.get(), Some(RestoreOutcome::Failed));
        assert!(matches!(
            notices.notices().as_slice(),
            [Notice::RestoreFailed(_)]
        ));
        assert_eq!(viewer.listener_count(), 1);

        // Edits made after the failed restore are still autosaved
        viewer.open(b"%PDF user".to_vec(), "user.pdf");
        viewer.annotate("<xfdf>user edit</xfdf>");
        exec.advance(Duration::from_millis(DEBOUNCE_MS));
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.snapshot().unwrap().overlay, "<xfdf>user edit</xfdf>");
    }

    #[test]
    fn test_load_error_ends_restore() {
        let (exec, viewer, store, notices, coordinator) = setup(true);
        block_on(store.save(b"%PDF corrupt", "<xfdf/>")).unwrap();
        viewer.set_stall_loads(true);

        let outcome = spawn_start(&exec, &coordinator);
        viewer.emit(ViewerEvent::LoadFailed);
        exec.run_until_stalled();

        assert_eq!(outcome.get(), Some(RestoreOutcome::Failed));
        assert_eq!(exec.pending_timers(), 0);
        assert_eq!(viewer.listener_count(), 1);
        assert_eq!(viewer.import_count(), 0);
        assert!(coordinator.status().has_saved_data);
        assert!(matches!(
            notices.notices().as_slice(),
            [Notice::RestoreFailed(_)]
        ));
    }
}
