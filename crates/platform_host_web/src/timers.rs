//! `window.setTimeout`-backed timer service.

use platform_host::{LocalTask, TimerCallback, TimerHandle, TimerService};

#[derive(Debug, Clone, Copy, Default)]
/// Browser timer service.
///
/// Timeouts go through `window.setTimeout`; local tasks through
/// `wasm_bindgen_futures::spawn_local`. Outside `wasm32` scheduling fails and tasks are dropped.
pub struct WebTimerService;

impl TimerService for WebTimerService {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Result<TimerHandle, String> {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{closure::Closure, JsCast};

            let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
            let js_callback = Closure::once_into_js(move || callback());
            let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    js_callback.unchecked_ref(),
                    delay,
                )
                .map(|id| TimerHandle(i64::from(id)))
                .map_err(|e| format!("setTimeout failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (delay_ms, callback);
            Err("timers are unavailable outside the browser".to_string())
        }
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        #[cfg(target_arch = "wasm32")]
        {
            if let (Some(window), Ok(id)) = (web_sys::window(), i32::try_from(handle.0)) {
                window.clear_timeout_with_handle(id);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let _ = handle;
    }

    fn spawn_local(&self, task: LocalTask) {
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);

        #[cfg(not(target_arch = "wasm32"))]
        drop(task);
    }
}
