//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Spawning local (non-`Send`) futures
//! - Delayed callbacks (debounce timers)
//!
//! Everything runs on one thread. On the web that is the UI thread driven by the
//! browser event loop; natively it is a [`ManualExecutor`] with a virtual clock.

pub mod manual;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use manual::ManualExecutor;
#[cfg(target_arch = "wasm32")]
pub use web::BrowserExecutor;

use std::time::Duration;

use futures::future::LocalBoxFuture;

/// Single-threaded task and timer source
pub trait Executor {
    /// Run a future to completion in the background
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    /// Call `callback` once after `delay`, unless the returned task is cancelled first
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> ScheduledTask;
}

/// Handle to a pending delayed callback
///
/// Dropping the handle cancels the callback. Cancelling after it already fired is a no-op.
#[must_use = "dropping a ScheduledTask cancels it"]
pub struct ScheduledTask {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl ScheduledTask {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A task with nothing to cancel (e.g. scheduling failed)
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}
