//! Keyed debouncing of deferred side effects.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use leptos::logging::warn;
use platform_host::{TimerHandle, TimerService};

/// Quiet period before a content edit recomposes the preview.
pub const PREVIEW_DEBOUNCE_MS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Independent debounce channels.
pub enum SyncKey {
    Preview,
    Persist,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    generation: u64,
    handle: TimerHandle,
}

#[derive(Default)]
struct DebounceSlots {
    pending: HashMap<SyncKey, Pending>,
    generation: u64,
}

/// Runs the last of a burst of scheduled actions per [`SyncKey`].
///
/// Scheduling a key cancels that key's pending timer. Work runs on the host timer service, so it
/// should capture weak handles and read live state when it fires.
#[derive(Clone)]
pub struct Debouncer {
    timers: Rc<dyn TimerService>,
    slots: Rc<RefCell<DebounceSlots>>,
}

impl Debouncer {
    pub fn new(timers: Rc<dyn TimerService>) -> Self {
        Self {
            timers,
            slots: Rc::new(RefCell::new(DebounceSlots::default())),
        }
    }

    /// Schedules `work` to run after `delay_ms`, replacing any pending work for `key`.
    pub fn schedule(&self, key: SyncKey, delay_ms: u32, work: impl FnOnce() + 'static) {
        self.cancel(key);

        let generation = {
            let mut slots = self.slots.borrow_mut();
            slots.generation += 1;
            slots.generation
        };
        let slots = Rc::downgrade(&self.slots);
        let callback = Box::new(move || {
            let Some(slots) = slots.upgrade() else {
                return;
            };
            {
                let mut slots = slots.borrow_mut();
                let current = slots.pending.get(&key).map(|pending| pending.generation);
                if current != Some(generation) {
                    return;
                }
                slots.pending.remove(&key);
            }
            work();
        });

        match self.timers.set_timeout(delay_ms, callback) {
            Ok(handle) => {
                self.slots
                    .borrow_mut()
                    .pending
                    .insert(key, Pending { generation, handle });
            }
            Err(err) => warn!("debounce {key:?} could not be scheduled: {err}"),
        }
    }

    /// Drops the pending work for `key`, if any.
    pub fn cancel(&self, key: SyncKey) {
        let pending = self.slots.borrow_mut().pending.remove(&key);
        if let Some(pending) = pending {
            self.timers.clear_timeout(pending.handle);
        }
    }

    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.slots.borrow_mut().pending.drain().collect();
        for (_, pending) in drained {
            self.timers.clear_timeout(pending.handle);
        }
    }

    pub fn is_pending(&self, key: SyncKey) -> bool {
        self.slots.borrow().pending.contains_key(&key)
    }
}
