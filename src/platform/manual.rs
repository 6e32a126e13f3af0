//! Manually driven executor with a virtual clock
//!
//! Used by the native binary and by tests. Futures run on a `LocalPool`; timers fire only
//! when [`ManualExecutor::advance`] moves the clock past their deadline, so debounce
//! behavior is fully deterministic.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use super::{Executor, ScheduledTask};

type Callback = Box<dyn FnOnce()>;

#[derive(Default)]
struct Timers {
    now: Duration,
    next_id: u64,
    /// Keyed by (deadline, insertion id) so equal deadlines fire in scheduling order
    pending: BTreeMap<(Duration, u64), Callback>,
}

pub struct ManualExecutor {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    timers: Rc<RefCell<Timers>>,
}

impl Default for ManualExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualExecutor {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: RefCell::new(pool),
            spawner,
            timers: Rc::new(RefCell::new(Timers::default())),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.timers.borrow().now
    }

    /// Number of timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().pending.len()
    }

    /// Poll every spawned future until none can make progress
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Move the clock forward, firing due timers in deadline order
    ///
    /// Spawned work is drained after each timer so callbacks observe the effects of
    /// earlier ones.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        self.run_until_stalled();

        loop {
            let due = {
                let mut timers = self.timers.borrow_mut();
                let key = match timers.pending.keys().next() {
                    Some(&key) if key.0 <= target => key,
                    _ => break,
                };
                timers.now = key.0;
                timers.pending.remove(&key)
            };
            if let Some(callback) = due {
                callback();
            }
            self.run_until_stalled();
        }

        self.timers.borrow_mut().now = target;
        self.run_until_stalled();
    }

    /// Spawn `future` and drive the pool until it stalls
    ///
    /// Returns `None` if the future is still waiting (e.g. on a timer).
    pub fn block_on<T: 'static>(&self, future: impl Future<Output = T> + 'static) -> Option<T> {
        let slot = Rc::new(RefCell::new(None));
        let out = slot.clone();
        self.spawn(Box::pin(async move {
            let value = future.await;
            *out.borrow_mut() = Some(value);
        }));
        self.run_until_stalled();
        slot.borrow_mut().take()
    }
}

impl Executor for ManualExecutor {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(task) {
            log::error!("Failed to spawn task: {}", e);
        }
    }

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> ScheduledTask {
        let key = {
            let mut timers = self.timers.borrow_mut();
            let key = (timers.now + delay, timers.next_id);
            timers.next_id += 1;
            timers.pending.insert(key, callback);
            key
        };

        let timers = Rc::downgrade(&self.timers);
        ScheduledTask::new(move || {
            if let Some(timers) = timers.upgrade() {
                timers.borrow_mut().pending.remove(&key);
            }
        })
    }
}
