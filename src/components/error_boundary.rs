//! The single top-level error boundary.
//!
//! Once anything below it fails to render, the children are dropped for good
//! and the fallback shows the first error verbatim. Reloading the page is the
//! only way back. Errors rendered into the view are caught by
//! [`AppErrorBoundary`]; panics go through [`install_panic_fallback`], which
//! draws the same fallback straight into the DOM.

use std::cell::RefCell;

use leptos::error::Errors;
use leptos::prelude::*;
use scanton_core::boundary::{panic_message, BoundaryView, ErrorBoundaryState, DEFAULT_FALLBACK_TITLE};
use tracing::error;
use wasm_bindgen::JsValue;

thread_local! {
    static PANIC_STATE: RefCell<ErrorBoundaryState> = RefCell::new(ErrorBoundaryState::default());
}

#[component]
pub fn AppErrorBoundary(
    /// Fallback heading; "Something went wrong" when omitted.
    #[prop(optional, into)]
    title: Option<String>,
    children: ChildrenFn,
) -> impl IntoView {
    let state = RwSignal::new(ErrorBoundaryState::new(title));

    let record = move |errors: ArcRwSignal<Errors>| {
        Effect::new(move |_| {
            let first = errors.with(|errs| errs.iter().next().map(|(_, e)| e.to_string()));
            if let Some(message) = first {
                if !state.with_untracked(|s| s.has_caught()) {
                    error!("Render failure caught at top level: {}", message);
                }
                state.update(|s| s.catch(message));
            }
        });
    };

    move || match state.with(|s| s.view()) {
        BoundaryView::Children => {
            let children = children.clone();
            view! { <ErrorBoundary fallback=record>{children()}</ErrorBoundary> }.into_any()
        }
        outcome => view! { <BoundaryFallback outcome /> }.into_any(),
    }
}

#[component]
fn BoundaryFallback(outcome: BoundaryView) -> impl IntoView {
    let (title, message) = match outcome {
        BoundaryView::Fallback { title, message } => (title, message),
        BoundaryView::Children => return ().into_any(),
    };
    let reload = move |_| {
        if let Some(window) = web_sys::window() {
            let _ = window.location().reload();
        }
    };

    view! {
        <div class="error-boundary">
            <h2 class="error-boundary-title">{title}</h2>
            <pre class="error-boundary-message">{message}</pre>
            <button class="btn btn-primary" on:click=reload>"Reload page"</button>
        </div>
    }
    .into_any()
}

/// Replace the page with the fallback whenever anything panics.
pub fn install_panic_fallback(title: Option<String>) {
    let _ = PANIC_STATE.try_with(|s| *s.borrow_mut() = ErrorBoundaryState::new(title));

    std::panic::set_hook(Box::new(|info| {
        let payload = info.payload();
        let location = info
            .location()
            .map(|l| format!(" at {}:{}", l.file(), l.line()))
            .unwrap_or_default();
        error!("Panic{}: {}", location, panic_message(payload));

        let view = PANIC_STATE
            .try_with(|s| s.try_borrow_mut().ok().map(|mut s| s.catch_panic(payload)))
            .ok()
            .flatten()
            .unwrap_or_else(|| BoundaryView::Fallback {
                title: DEFAULT_FALLBACK_TITLE.to_string(),
                message: panic_message(payload),
            });
        if let BoundaryView::Fallback { title, message } = view {
            if let Err(e) = render_panic_fallback(&title, &message) {
                web_sys::console::error_1(&e);
            }
        }
    }));
}

fn render_panic_fallback(title: &str, message: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let container = document.create_element("div")?;
    container.set_class_name("error-boundary");

    let heading = document.create_element("h2")?;
    heading.set_class_name("error-boundary-title");
    heading.set_text_content(Some(title));

    let pre = document.create_element("pre")?;
    pre.set_class_name("error-boundary-message");
    pre.set_text_content(Some(message));

    // The wasm module is unusable after a panic, so the reload stays in JS
    let button = document.create_element("button")?;
    button.set_class_name("btn btn-primary");
    button.set_text_content(Some("Reload page"));
    button.set_attribute("onclick", "window.location.reload()")?;

    container.append_child(&heading)?;
    container.append_child(&pre)?;
    container.append_child(&button)?;

    body.set_inner_html("");
    body.append_child(&container)?;
    Ok(())
}
