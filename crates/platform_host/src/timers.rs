//! Timer and local-task contracts used by debounced side effects.
//!
//! Everything here is single-threaded: callbacks and tasks are neither `Send` nor `Sync`, matching
//! the browser event loop the adapters run on.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
};

use futures::{
    executor::{LocalPool, LocalSpawner},
    task::LocalSpawnExt,
};

/// One-shot callback fired by [`TimerService::set_timeout`].
pub type TimerCallback = Box<dyn FnOnce()>;

/// Boxed local future handed to [`TimerService::spawn_local`].
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Opaque handle identifying a pending timeout.
pub struct TimerHandle(pub i64);

/// Host service for one-shot timers and fire-and-forget local tasks.
pub trait TimerService {
    /// Schedules `callback` to run once after `delay_ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot schedule timers.
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Result<TimerHandle, String>;

    /// Cancels a pending timeout. Unknown or already-fired handles are ignored.
    fn clear_timeout(&self, handle: TimerHandle);

    /// Runs `task` to completion on the local executor without awaiting it.
    fn spawn_local(&self, task: LocalTask);
}

#[derive(Debug, Clone, Copy, Default)]
/// Timer service for targets without an event loop. Scheduled work never runs.
pub struct NoopTimerService;

impl TimerService for NoopTimerService {
    fn set_timeout(&self, _delay_ms: u32, _callback: TimerCallback) -> Result<TimerHandle, String> {
        Ok(TimerHandle(0))
    }

    fn clear_timeout(&self, _handle: TimerHandle) {}

    fn spawn_local(&self, _task: LocalTask) {}
}

struct PendingTimer {
    handle: TimerHandle,
    due_ms: u64,
    callback: TimerCallback,
}

/// Deterministic timer service driven by a virtual clock.
///
/// Time only moves when [`ManualTimerService::advance`] is called. Timers fire in due order (ties
/// broken by scheduling order) and spawned tasks are polled until stalled after every fired timer.
pub struct ManualTimerService {
    now_ms: Cell<u64>,
    next_handle: Cell<i64>,
    timers: RefCell<Vec<PendingTimer>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl Default for ManualTimerService {
    fn default() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            now_ms: Cell::new(0),
            next_handle: Cell::new(1),
            timers: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
        }
    }
}

impl ManualTimerService {
    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    /// Number of timeouts scheduled but not yet fired or cleared.
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Moves the virtual clock forward, firing every timer that becomes due on the way.
    pub fn advance(&self, delta_ms: u64) {
        let target = self.now_ms.get().saturating_add(delta_ms);
        while let Some(timer) = self.pop_due(target) {
            self.now_ms.set(timer.due_ms.max(self.now_ms.get()));
            (timer.callback)();
            self.run_until_stalled();
        }
        self.now_ms.set(target);
        self.run_until_stalled();
    }

    /// Polls spawned tasks until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    fn pop_due(&self, target: u64) -> Option<PendingTimer> {
        let mut timers = self.timers.borrow_mut();
        let idx = timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= target)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.handle.0))
            .map(|(idx, _)| idx)?;
        Some(timers.remove(idx))
    }
}

impl TimerService for ManualTimerService {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Result<TimerHandle, String> {
        let handle = TimerHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.timers.borrow_mut().push(PendingTimer {
            handle,
            due_ms: self.now_ms.get().saturating_add(u64::from(delay_ms)),
            callback,
        });
        Ok(handle)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.timers.borrow_mut().retain(|timer| timer.handle != handle);
    }

    fn spawn_local(&self, task: LocalTask) {
        // Spawning only fails once the pool is dropped, which also drops `self`.
        let _ = self.spawner.spawn_local(task);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> TimerCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |label: &'static str| -> TimerCallback {
            let sink = sink.clone();
            Box::new(move || sink.borrow_mut().push(label))
        };
        (log, make)
    }

    #[test]
    fn timers_fire_in_due_order_once_due() {
        let timers = ManualTimerService::default();
        let (log, make) = recorder();

        timers.set_timeout(300, make("late")).expect("schedule");
        timers.set_timeout(100, make("early")).expect("schedule");
        timers.set_timeout(100, make("early-second")).expect("schedule");

        timers.advance(99);
        assert!(log.borrow().is_empty());
        assert_eq!(timers.pending_timers(), 3);

        timers.advance(1);
        assert_eq!(*log.borrow(), vec!["early", "early-second"]);

        timers.advance(500);
        assert_eq!(*log.borrow(), vec!["early", "early-second", "late"]);
        assert_eq!(timers.now_ms(), 600);
        assert_eq!(timers.pending_timers(), 0);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let timers = ManualTimerService::default();
        let (log, make) = recorder();

        let handle = timers.set_timeout(50, make("cleared")).expect("schedule");
        timers.set_timeout(60, make("kept")).expect("schedule");
        timers.clear_timeout(handle);
        timers.advance(100);

        assert_eq!(*log.borrow(), vec!["kept"]);
    }

    #[test]
    fn timer_scheduled_from_callback_uses_fire_time_as_base() {
        let timers = Rc::new(ManualTimerService::default());
        let fired_at = Rc::new(Cell::new(0));

        let inner_timers = timers.clone();
        let inner_fired = fired_at.clone();
        timers
            .set_timeout(
                100,
                Box::new(move || {
                    let clock = inner_timers.clone();
                    inner_timers
                        .set_timeout(50, Box::new(move || inner_fired.set(clock.now_ms())))
                        .expect("nested schedule");
                }),
            )
            .expect("schedule");

        timers.advance(1_000);
        assert_eq!(fired_at.get(), 150);
    }

    #[test]
    fn spawned_tasks_run_when_stalled_pool_is_polled() {
        let timers = ManualTimerService::default();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();

        timers.spawn_local(Box::pin(async move { flag.set(true) }));
        assert!(!done.get());
        timers.run_until_stalled();
        assert!(done.get());
    }

    #[test]
    fn noop_service_accepts_and_drops_work() {
        let timers = NoopTimerService;
        let handle = timers
            .set_timeout(10, Box::new(|| panic!("must not run")))
            .expect("schedule");
        timers.clear_timeout(handle);
        timers.spawn_local(Box::pin(async {}));
    }
}
