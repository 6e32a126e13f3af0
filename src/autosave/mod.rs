//! Autosave coordinator
//!
//! Listens to viewer lifecycle events and turns bursts of changes into one debounced
//! write of the open document and its overlay:
//!
//! ```text
//!   Idle --change--> Debouncing --quiet period--> Writing --done--> Idle
//!                     ^      |                      |
//!                     +change+        change seen mid-write: back to Debouncing
//! ```
//!
//! Qualifying changes are `DocumentLoaded` and user (non-imported) annotation edits
//! while a document is open. Unloading the document, switching autosave off or disposing
//! cancels the pending timer; a write already in flight runs to completion.
//!
//! State lives behind `Rc<RefCell<_>>` and is never borrowed across an `.await` or a call
//! into the viewer, since viewer calls may emit events straight back into the coordinator.

mod notice;
mod restore;
mod state;

pub use notice::{LogNotifier, Notice, Notifier, RecordingNotifier};
pub use state::{AutosavePhase, AutosaveStatus, RestoreOutcome, SaveOutcome};

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::consts::{DEBOUNCE_MS, RESTORE_FILENAME, RESTORE_TIMEOUT_MS};
use crate::error::{Result, ViewerError};
use crate::persistence::DocumentStore;
use crate::platform::Executor;
use crate::settings::{LocalSettings, Settings, SettingsStore};
use crate::viewer::{Listener, Subscription, Viewer, ViewerEvent};
use state::Phase;

/// Coordinator tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period after the last change before writing
    pub debounce: Duration,
    /// Name the restored document is opened under
    pub restore_filename: String,
    /// Restore gives up if the viewer has not finished loading by then
    pub restore_timeout: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEBOUNCE_MS),
            restore_filename: RESTORE_FILENAME.to_string(),
            restore_timeout: Duration::from_millis(RESTORE_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Autosave,
    Manual,
}

struct State {
    autosave: bool,
    has_saved_data: bool,
    phase: Phase,
    /// Bumped per scheduled timer; a firing with an older epoch is stale
    epoch: u64,
    started: bool,
    disposed: bool,
    subscription: Option<Subscription>,
}

pub(crate) struct Inner<V, S> {
    viewer: Rc<V>,
    store: Rc<S>,
    executor: Rc<dyn Executor>,
    settings: Rc<dyn SettingsStore>,
    notifier: Rc<dyn Notifier>,
    config: AutosaveConfig,
    state: RefCell<State>,
    last_status: Cell<Option<AutosaveStatus>>,
}

/// Handle to the autosave coordinator; clones share one instance
pub struct Coordinator<V, S> {
    inner: Rc<Inner<V, S>>,
}

impl<V, S> Clone for Coordinator<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct CoordinatorBuilder<V, S> {
    viewer: Rc<V>,
    store: Rc<S>,
    executor: Rc<dyn Executor>,
    settings: Rc<dyn SettingsStore>,
    notifier: Rc<dyn Notifier>,
    config: AutosaveConfig,
}

impl<V: Viewer + 'static, S: DocumentStore + 'static> CoordinatorBuilder<V, S> {
    pub fn settings(mut self, settings: Rc<dyn SettingsStore>) -> Self {
        self.settings = settings;
        self
    }

    pub fn notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(mut self, config: AutosaveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Coordinator<V, S> {
        Coordinator {
            inner: Rc::new(Inner {
                viewer: self.viewer,
                store: self.store,
                executor: self.executor,
                settings: self.settings,
                notifier: self.notifier,
                config: self.config,
                state: RefCell::new(State {
                    autosave: false,
                    has_saved_data: false,
                    phase: Phase::Idle,
                    epoch: 0,
                    started: false,
                    disposed: false,
                    subscription: None,
                }),
                last_status: Cell::new(None),
            }),
        }
    }
}

impl<V: Viewer + 'static, S: DocumentStore + 'static> Coordinator<V, S> {
    /// Defaults: LocalStorage settings, log-only notices, 2 s debounce
    pub fn builder(
        viewer: Rc<V>,
        store: Rc<S>,
        executor: Rc<dyn Executor>,
    ) -> CoordinatorBuilder<V, S> {
        CoordinatorBuilder {
            viewer,
            store,
            executor,
            settings: Rc::new(LocalSettings),
            notifier: Rc::new(LogNotifier),
            config: AutosaveConfig::default(),
        }
    }

    /// Restore the saved session (if any), then start listening for changes
    ///
    /// Runs once; later calls resolve to [`RestoreOutcome::Skipped`].
    pub fn start(&self) -> LocalBoxFuture<'static, RestoreOutcome> {
        let inner = self.inner.clone();
        async move { inner.start().await }.boxed_local()
    }

    /// Switch autosave on or off and persist the preference
    ///
    /// Switching off cancels any pending autosave and clears the saved document.
    pub fn set_autosave(&self, enabled: bool) -> LocalBoxFuture<'static, Result<()>> {
        let inner = self.inner.clone();
        async move { inner.set_autosave(enabled).await }.boxed_local()
    }

    /// Save the open document now, outside the debounce cycle
    pub fn save_now(&self) -> LocalBoxFuture<'static, Result<SaveOutcome>> {
        let inner = self.inner.clone();
        async move { inner.save_now().await }.boxed_local()
    }

    /// Delete the saved document
    pub fn clear_saved(&self) -> LocalBoxFuture<'static, Result<()>> {
        let inner = self.inner.clone();
        async move { inner.clear_saved().await }.boxed_local()
    }

    pub fn status(&self) -> AutosaveStatus {
        self.inner.status()
    }

    /// Unsubscribe from the viewer and cancel any pending autosave
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn viewer(&self) -> &Rc<V> {
        &self.inner.viewer
    }

    pub fn store(&self) -> &Rc<S> {
        &self.inner.store
    }
}

impl<V: Viewer + 'static, S: DocumentStore + 'static> Inner<V, S> {
    async fn start(self: &Rc<Self>) -> RestoreOutcome {
        {
            let mut state = self.state.borrow_mut();
            if state.started || state.disposed {
                return RestoreOutcome::Skipped;
            }
            state.started = true;
            state.autosave = self.settings.load().autosave;
        }
        self.publish();

        let outcome = self.restore().await;
        if self.is_disposed() {
            return outcome;
        }

        let weak = Rc::downgrade(self);
        let listener: Listener = Rc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event(event);
            }
        });
        let subscription = self.viewer.subscribe(listener);
        self.state.borrow_mut().subscription = Some(subscription);

        log::info!(
            "Autosave coordinator started (autosave {}, restore: {:?})",
            if self.state.borrow().autosave { "on" } else { "off" },
            outcome
        );
        self.publish();
        outcome
    }

    fn handle_event(self: &Rc<Self>, event: ViewerEvent) {
        match event {
            ViewerEvent::DocumentLoaded => {
                if self.autosave_armed() {
                    log::debug!("Document loaded; scheduling autosave");
                    self.trigger();
                }
            }
            ViewerEvent::DocumentUnloaded => self.cancel_pending("document unloaded"),
            ViewerEvent::LoadFailed => log::debug!("Viewer failed to load a document"),
            ViewerEvent::AnnotationChanged { imported: true } => {
                log::debug!("Ignoring annotation change from import");
            }
            ViewerEvent::AnnotationChanged { imported: false } => {
                if !self.autosave_armed() {
                    return self.publish();
                }
                if !self.viewer.has_document() {
                    log::debug!("Ignoring annotation change with no document loaded");
                    return self.publish();
                }
                self.trigger();
            }
        }
        self.publish();
    }

    fn autosave_armed(&self) -> bool {
        let state = self.state.borrow();
        state.autosave && !state.disposed
    }

    fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Enter (or restart) Debouncing; during Writing just remember the change
    fn trigger(self: &Rc<Self>) {
        let epoch = {
            let mut state = self.state.borrow_mut();
            if let Phase::Writing { rearm } = &mut state.phase {
                log::debug!("Change during write; saving again afterwards");
                *rearm = true;
                return;
            }
            state.epoch += 1;
            state.epoch
        };

        let weak = Rc::downgrade(self);
        let timer = self.executor.schedule(
            self.config.debounce,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.debounce_elapsed(epoch);
                }
            }),
        );

        let previous = std::mem::replace(
            &mut self.state.borrow_mut().phase,
            Phase::Debouncing {
                epoch,
                _timer: timer,
            },
        );
        if matches!(previous, Phase::Debouncing { .. }) {
            log::debug!("Debounce timer reset");
        }
    }

    fn debounce_elapsed(self: &Rc<Self>, epoch: u64) {
        let fired = {
            let mut state = self.state.borrow_mut();
            let current = match &state.phase {
                Phase::Debouncing { epoch: current, .. } => Some(*current),
                _ => None,
            };
            if current != Some(epoch) || !state.autosave || state.disposed {
                log::debug!("Stale debounce timer ignored");
                return;
            }
            std::mem::replace(&mut state.phase, Phase::Writing { rearm: false })
        };
        drop(fired);
        self.publish();

        let inner = self.clone();
        self.executor
            .spawn(async move { inner.autosave_write().await }.boxed_local());
    }

    async fn autosave_write(self: Rc<Self>) {
        match self.write_snapshot(WriteKind::Autosave).await {
            Ok(SaveOutcome::Saved) => log::info!("Autosaved document"),
            Ok(SaveOutcome::NoDocument) => log::debug!("Autosave skipped: no document loaded"),
            Ok(SaveOutcome::Abandoned) => log::debug!("Autosave abandoned"),
            Err(e) => {
                log::error!("Autosave failed: {}", e);
                self.notifier.notice(&Notice::from_error(&e));
            }
        }

        let rearm = {
            let mut state = self.state.borrow_mut();
            let rearm = matches!(state.phase, Phase::Writing { rearm: true })
                && state.autosave
                && !state.disposed;
            if matches!(state.phase, Phase::Writing { .. }) {
                state.phase = Phase::Idle;
            }
            rearm
        };
        if rearm {
            self.trigger();
        }
        self.publish();
    }

    /// Export the open document + overlay and store them
    ///
    /// Liveness is re-checked after the viewer calls; once the store write starts it is
    /// allowed to finish.
    async fn write_snapshot(&self, kind: WriteKind) -> Result<SaveOutcome> {
        let content = match self.viewer.document_bytes().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) | Err(ViewerError::NoDocumentLoaded) => return Ok(SaveOutcome::NoDocument),
            Err(e) => return Err(e.into()),
        };
        let overlay = match self.viewer.export_overlay().await {
            Ok(overlay) => overlay,
            Err(ViewerError::NoDocumentLoaded) => return Ok(SaveOutcome::NoDocument),
            Err(e) => return Err(e.into()),
        };

        {
            let state = self.state.borrow();
            let wanted = !state.disposed && (kind == WriteKind::Manual || state.autosave);
            if !wanted {
                return Ok(SaveOutcome::Abandoned);
            }
        }

        self.store.save(&content, &overlay).await?;
        self.state.borrow_mut().has_saved_data = true;
        Ok(SaveOutcome::Saved)
    }

    async fn save_now(self: Rc<Self>) -> Result<SaveOutcome> {
        let result = self.write_snapshot(WriteKind::Manual).await;
        match &result {
            Ok(SaveOutcome::Saved) => {
                log::info!("Saved document");
                self.notifier.notice(&Notice::Saved);
            }
            Ok(SaveOutcome::NoDocument) => self.notifier.notice(&Notice::NothingToSave),
            Ok(SaveOutcome::Abandoned) => {}
            Err(e) => {
                log::error!("Save failed: {}", e);
                self.notifier.notice(&Notice::from_error(e));
            }
        }
        self.publish();
        result
    }

    async fn clear_saved(self: Rc<Self>) -> Result<()> {
        match self.store.clear().await {
            Ok(()) => {
                self.state.borrow_mut().has_saved_data = false;
                log::info!("Saved data cleared");
                self.notifier.notice(&Notice::Cleared);
                self.publish();
                Ok(())
            }
            Err(e) => {
                log::error!("Clearing saved data failed: {}", e);
                self.notifier.notice(&Notice::StorageFailed(e.clone()));
                Err(e.into())
            }
        }
    }

    async fn set_autosave(self: Rc<Self>, enabled: bool) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.disposed || state.autosave == enabled {
                return Ok(());
            }
            state.autosave = enabled;
        }
        self.settings.save(&Settings { autosave: enabled });
        log::info!("Autosave {}", if enabled { "enabled" } else { "disabled" });

        if enabled {
            self.publish();
            return Ok(());
        }

        // Autosaved state belongs to the autosave feature; switching it off discards it
        self.cancel_pending("autosave disabled");
        self.publish();
        match self.store.clear().await {
            Ok(()) => {
                self.state.borrow_mut().has_saved_data = false;
                self.publish();
                Ok(())
            }
            Err(e) => {
                log::error!("Clearing autosaved data failed: {}", e);
                self.notifier.notice(&Notice::StorageFailed(e.clone()));
                Err(e.into())
            }
        }
    }

    fn cancel_pending(&self, reason: &str) {
        let previous = {
            let mut state = self.state.borrow_mut();
            if let Phase::Writing { rearm } = &mut state.phase {
                *rearm = false;
                return;
            }
            std::mem::replace(&mut state.phase, Phase::Idle)
        };
        if matches!(previous, Phase::Debouncing { .. }) {
            log::debug!("Pending autosave cancelled ({})", reason);
        }
    }

    fn dispose(&self) {
        let subscription = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.subscription.take()
        };
        self.cancel_pending("disposed");
        drop(subscription);
        log::info!("Autosave coordinator disposed");
    }

    fn set_has_saved_data(&self, value: bool) {
        self.state.borrow_mut().has_saved_data = value;
    }

    fn status(&self) -> AutosaveStatus {
        let has_document = self.viewer.has_document();
        let state = self.state.borrow();
        AutosaveStatus {
            autosave_enabled: state.autosave,
            has_saved_data: state.has_saved_data,
            has_document,
            phase: state.phase.public(),
        }
    }

    /// Tell the notifier about the current status if it changed
    fn publish(&self) {
        let status = self.status();
        if self.last_status.get() != Some(status) {
            self.last_status.set(Some(status));
            self.notifier.status_changed(&status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, StorageError};
    use crate::persistence::{MemoryStore, SavedDocument};
    use crate::platform::ManualExecutor;
    use crate::settings::MemorySettings;
    use crate::viewer::HeadlessViewer;

    const WINDOW: Duration = Duration::from_millis(DEBOUNCE_MS);

    struct Harness {
        exec: Rc<ManualExecutor>,
        viewer: Rc<HeadlessViewer>,
        store: Rc<MemoryStore>,
        settings: Rc<MemorySettings>,
        notices: Rc<RecordingNotifier>,
        coordinator: Coordinator<HeadlessViewer, MemoryStore>,
    }

    impl Harness {
        fn new(autosave: bool) -> Self {
            let exec = Rc::new(ManualExecutor::new());
            let viewer = Rc::new(HeadlessViewer::new());
            let store = Rc::new(MemoryStore::new());
            let settings = Rc::new(MemorySettings::new(Settings { autosave }));
            let notices = Rc::new(RecordingNotifier::new());
            let coordinator = Coordinator::builder(viewer.clone(), store.clone(), exec.clone())
                .settings(settings.clone())
                .notifier(notices.clone())
                .build();
            Self {
                exec,
                viewer,
                store,
                settings,
                notices,
                coordinator,
            }
        }

        fn started(autosave: bool) -> Self {
            let harness = Self::new(autosave);
            assert_eq!(harness.start(), RestoreOutcome::Empty);
            harness
        }

        fn start(&self) -> RestoreOutcome {
            self.exec
                .block_on(self.coordinator.start())
                .expect("start should not stall")
        }

        fn run<T: 'static>(&self, fut: LocalBoxFuture<'static, T>) -> T {
            self.exec.block_on(fut).expect("future should not stall")
        }

        fn phase(&self) -> AutosavePhase {
            self.coordinator.status().phase
        }
    }

    #[test]
    fn test_edit_then_quiet_period_writes_once() {
        let h = Harness::started(true);
        h.viewer.open(b"D1".to_vec(), "d1.pdf");
        assert_eq!(h.phase(), AutosavePhase::Debouncing);

        h.viewer.annotate("<xfdf>edited</xfdf>");
        h.exec.advance(WINDOW);

        assert_eq!(h.store.save_count(), 1);
        assert_eq!(
            h.store.snapshot(),
            Some(SavedDocument::new(b"D1".to_vec(), "<xfdf>edited</xfdf>"))
        );
        assert_eq!(h.phase(), AutosavePhase::Idle);
        assert!(h.coordinator.status().has_saved_data);
    }

    #[test]
    fn test_burst_resets_timer() {
        let h = Harness::started(true);
        h.viewer.open(b"doc".to_vec(), "doc.pdf");

        for i in 0..5 {
            h.exec.advance(WINDOW - Duration::from_millis(1));
            h.viewer.annotate(format!("edit {}", i));
        }
        assert_eq!(h.store.save_count(), 0);

        h.exec.advance(WINDOW);
        assert_eq!(h.store.save_count(), 1);
        assert_eq!(h.store.snapshot().unwrap().overlay, "edit 4");
        assert_eq!(h.exec.pending_timers(), 0);
    }

    #[test]
    fn test_imported_change_never_schedules() {
        let h = Harness::new(false);
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        h.start();
        h.run(h.coordinator.set_autosave(true));

        h.viewer
            .emit(ViewerEvent::AnnotationChanged { imported: true });
        assert_eq!(h.phase(), AutosavePhase::Idle);
        h.exec.advance(WINDOW * 3);
        assert_eq!(h.store.save_count(), 0);
    }

    #[test]
    fn test_enabling_autosave_does_not_save() {
        let h = Harness::started(false);
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        h.run(h.coordinator.set_autosave(true));

        assert_eq!(h.phase(), AutosavePhase::Idle);
        h.exec.advance(WINDOW * 2);
        assert_eq!(h.store.save_count(), 0);
        assert!(h.settings.current().autosave);
    }

    #[test]
    fn test_stray_change_without_document() {
        let h = Harness::started(true);
        h.viewer
            .emit(ViewerEvent::AnnotationChanged { imported: false });
        assert_eq!(h.phase(), AutosavePhase::Idle);
        h.exec.advance(WINDOW * 2);
        assert_eq!(h.store.save_count(), 0);
    }

    #[test]
    fn test_disable_while_debouncing_cancels_and_clears() {
        let h = Harness::started(true);
        futures::executor::block_on(h.store.save(b"old", "old")).unwrap();
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        assert_eq!(h.phase(), AutosavePhase::Debouncing);

        h.run(h.coordinator.set_autosave(false));
        assert_eq!(h.phase(), AutosavePhase::Idle);
        assert_eq!(h.exec.pending_timers(), 0);

        h.exec.advance(WINDOW * 2);
        assert_eq!(h.store.save_count(), 1);
        assert_eq!(h.store.snapshot(), None);
        assert!(!h.coordinator.status().has_saved_data);
        assert!(!h.settings.current().autosave);
    }

    #[test]
    fn test_unload_cancels_pending_write() {
        let h = Harness::started(true);
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        h.viewer.annotate("x");
        h.viewer.close();

        assert_eq!(h.phase(), AutosavePhase::Idle);
        h.exec.advance(WINDOW * 2);
        assert_eq!(h.store.save_count(), 0);
    }

    #[test]
    fn test_changes_ignored_while_autosave_off() {
        let h = Harness::started(false);
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        h.viewer.annotate("x");
        h.exec.advance(WINDOW * 2);
        assert_eq!(h.store.save_count(), 0);
        assert_eq!(h.phase(), AutosavePhase::Idle);
    }

    #[test]
    fn test_storage_failure_is_reported_and_swallowed() {
        let h = Harness::started(true);
        h.store.set_failure(Some(StorageError::QuotaExceeded));
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        h.exec.advance(WINDOW);

        assert_eq!(h.phase(), AutosavePhase::Idle);
        assert!(!h.coordinator.status().has_saved_data);
        assert_eq!(
            h.notices.notices(),
            vec![Notice::StorageFailed(StorageError::QuotaExceeded)]
        );

        // No retry is queued
        h.store.set_failure(None);
        h.exec.advance(WINDOW * 3);
        assert_eq!(h.store.save_count(), 0);
    }

    #[test]
    fn test_manual_save_and_clear() {
        let h = Harness::started(false);
        assert_eq!(h.run(h.coordinator.save_now()), Ok(SaveOutcome::NoDocument));

        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        h.viewer.annotate("notes");
        assert!(h.coordinator.status().can_save_manually());
        assert_eq!(h.run(h.coordinator.save_now()), Ok(SaveOutcome::Saved));
        assert_eq!(h.store.snapshot().unwrap().overlay, "notes");
        assert!(h.coordinator.status().can_clear_saved());

        h.run(h.coordinator.clear_saved()).unwrap();
        assert_eq!(h.store.snapshot(), None);
        assert!(!h.coordinator.status().has_saved_data);

        assert_eq!(
            h.notices.notices(),
            vec![Notice::NothingToSave, Notice::Saved, Notice::Cleared]
        );
    }

    #[test]
    fn test_manual_save_reports_storage_error() {
        let h = Harness::started(false);
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        h.store
            .set_failure(Some(StorageError::Unavailable("blocked".to_string())));

        let result = h.run(h.coordinator.save_now());
        assert_eq!(
            result,
            Err(Error::Storage(StorageError::Unavailable("blocked".to_string())))
        );
        assert!(h.notices.notices()[0].is_error());
    }

    #[test]
    fn test_dispose_unsubscribes_and_cancels() {
        let h = Harness::started(true);
        assert_eq!(h.viewer.listener_count(), 1);
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        assert_eq!(h.exec.pending_timers(), 1);

        h.coordinator.dispose();
        assert_eq!(h.viewer.listener_count(), 0);
        assert_eq!(h.exec.pending_timers(), 0);

        h.viewer.annotate("late edit");
        h.exec.advance(WINDOW * 2);
        assert_eq!(h.store.save_count(), 0);
        assert_eq!(h.start(), RestoreOutcome::Skipped);
    }

    #[test]
    fn test_dropping_last_handle_releases_viewer() {
        let h = Harness::started(true);
        assert_eq!(h.viewer.listener_count(), 1);
        let Harness {
            exec,
            viewer,
            coordinator,
            ..
        } = h;
        viewer.open(b"doc".to_vec(), "doc.pdf");
        drop(coordinator);
        assert_eq!(viewer.listener_count(), 0);
        assert_eq!(exec.pending_timers(), 0);
    }

    #[test]
    fn test_start_runs_once_and_reads_preference() {
        let h = Harness::new(true);
        assert_eq!(h.start(), RestoreOutcome::Empty);
        assert!(h.coordinator.status().autosave_enabled);
        assert_eq!(h.start(), RestoreOutcome::Skipped);
        assert_eq!(h.viewer.listener_count(), 1);
    }

    #[test]
    fn test_status_indicator_sequence() {
        let h = Harness::started(true);
        h.viewer.open(b"doc".to_vec(), "doc.pdf");
        h.exec.advance(WINDOW);

        let phases: Vec<AutosavePhase> = h
            .notices
            .statuses()
            .iter()
            .map(|status| status.phase)
            .collect();
        assert!(phases.ends_with(&[
            AutosavePhase::Debouncing,
            AutosavePhase::Writing,
            AutosavePhase::Idle
        ]));
        assert!(!h.notices.last_status().unwrap().is_autosaving());
    }
}
