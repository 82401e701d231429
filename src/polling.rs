use leptos::prelude::*;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Run `tick` once right away and then every `period_ms` until the owning
/// component is torn down.
pub fn use_interval<F>(period_ms: u32, tick: F)
where
    F: Fn() + 'static,
{
    let Some(window) = web_sys::window() else {
        warn!("No window, polling disabled");
        return;
    };

    let callback = Closure::wrap(Box::new(tick) as Box<dyn Fn()>);
    let cb_ref = callback.as_ref().unchecked_ref();

    // Initial fetch
    let _ = window.set_timeout_with_callback(cb_ref);

    match window.set_interval_with_callback_and_timeout_and_arguments_0(cb_ref, period_ms as i32) {
        Ok(interval_id) => {
            on_cleanup(move || {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(interval_id);
                }
            });
        }
        Err(e) => warn!("Failed to start {} ms poll: {:?}", period_ms, e),
    }
    callback.forget();
}
