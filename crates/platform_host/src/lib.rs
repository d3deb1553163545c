//! Typed host-service contracts shared by the Codepad core and its browser adapters.
//!
//! The core only talks to the host through these traits: a key-value [`PrefsStore`] for
//! persisted snapshots and settings, and a [`TimerService`] for debounce timers and local task
//! spawning. Concrete browser adapters live in `platform_host_web`; the in-memory, no-op and
//! manual-clock adapters here back native builds and tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;
pub mod time;
pub mod timers;

pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture,
};
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};
pub use timers::{
    LocalTask, ManualTimerService, NoopTimerService, TimerCallback, TimerHandle, TimerService,
};
