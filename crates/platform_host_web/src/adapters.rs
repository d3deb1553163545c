use platform_host::{
    LocalTask, NoopPrefsStore, NoopTimerService, PrefsStore, PrefsStoreFuture, TimerCallback,
    TimerHandle, TimerService,
};

use crate::{WebPrefsStore, WebTimerService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected host strategy for `platform_host_web` adapters.
pub enum HostStrategy {
    /// Browser-backed adapters (`localStorage`, `setTimeout`).
    Browser,
    /// No-op adapters for embedding hosts that provide neither storage nor an event loop.
    Stub,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "host-stub")]
    {
        HostStrategy::Stub
    }

    #[cfg(not(feature = "host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Stub => "stub",
    }
}

/// Adapter enum that erases the concrete key-value backend behind [`PrefsStore`].
#[derive(Debug, Clone, Copy)]
pub enum PrefsStoreAdapter {
    /// Browser `localStorage`.
    Browser(WebPrefsStore),
    /// No-op fallback.
    Stub(NoopPrefsStore),
}

impl PrefsStore for PrefsStoreAdapter {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        match self {
            Self::Browser(store) => store.load_pref(key),
            Self::Stub(store) => store.load_pref(key),
        }
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.save_pref(key, raw_json),
            Self::Stub(store) => store.save_pref(key, raw_json),
        }
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.delete_pref(key),
            Self::Stub(store) => store.delete_pref(key),
        }
    }
}

/// Adapter enum that erases the concrete timer backend behind [`TimerService`].
#[derive(Debug, Clone, Copy)]
pub enum TimerServiceAdapter {
    /// Browser `setTimeout` and `spawn_local`.
    Browser(WebTimerService),
    /// No-op fallback.
    Stub(NoopTimerService),
}

impl TimerService for TimerServiceAdapter {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Result<TimerHandle, String> {
        match self {
            Self::Browser(timers) => timers.set_timeout(delay_ms, callback),
            Self::Stub(timers) => timers.set_timeout(delay_ms, callback),
        }
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        match self {
            Self::Browser(timers) => timers.clear_timeout(handle),
            Self::Stub(timers) => timers.clear_timeout(handle),
        }
    }

    fn spawn_local(&self, task: LocalTask) {
        match self {
            Self::Browser(timers) => timers.spawn_local(task),
            Self::Stub(timers) => timers.spawn_local(task),
        }
    }
}

/// Builds the key-value store adapter for the compile-time selected host strategy.
pub fn prefs_store() -> PrefsStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => PrefsStoreAdapter::Browser(WebPrefsStore),
        HostStrategy::Stub => PrefsStoreAdapter::Stub(NoopPrefsStore),
    }
}

/// Builds the timer adapter for the compile-time selected host strategy.
pub fn timer_service() -> TimerServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => TimerServiceAdapter::Browser(WebTimerService),
        HostStrategy::Stub => TimerServiceAdapter::Stub(NoopTimerService),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_build_selects_browser_adapters() {
        #[cfg(not(feature = "host-stub"))]
        {
            assert_eq!(selected_host_strategy(), HostStrategy::Browser);
            assert_eq!(host_strategy_name(), "browser");
            assert!(matches!(prefs_store(), PrefsStoreAdapter::Browser(_)));
            assert!(matches!(timer_service(), TimerServiceAdapter::Browser(_)));
        }

        #[cfg(feature = "host-stub")]
        {
            assert_eq!(host_strategy_name(), "stub");
            assert!(matches!(prefs_store(), PrefsStoreAdapter::Stub(_)));
        }
    }
}
