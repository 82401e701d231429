use leptos::prelude::*;
use scanton_core::config::DUCKDB_URL_OVERRIDE_KEY;
use scanton_core::ApiConfig;
use tracing::info;

use crate::api::use_api;
use crate::storage::browser_store;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let api = use_api();
    let (backend_url, set_backend_url) =
        signal(api.config.with_untracked(|c| c.duckdb_api_url.clone()));
    let (status, set_status) = signal::<Option<String>>(None);

    let save = move |_| {
        let value = backend_url.get_untracked();
        let next = match api.config.get_untracked().with_duckdb_override(Some(&value)) {
            Ok(next) => next,
            Err(e) => {
                set_status.set(Some(e.to_string()));
                return;
            }
        };
        if let Err(e) = browser_store().set(DUCKDB_URL_OVERRIDE_KEY, next.duckdb_api_url.as_str()) {
            set_status.set(Some(format!("Failed to save: {}", e)));
            return;
        }
        info!("Backend URL set to {}", next.duckdb_api_url);
        set_backend_url.set(next.duckdb_api_url.clone());
        api.config.set(next);
        api.cache.update_value(|c| c.clear());
        set_status.set(Some("Backend URL saved".to_string()));
    };

    let reset = move |_| {
        if let Err(e) = browser_store().remove(DUCKDB_URL_OVERRIDE_KEY) {
            set_status.set(Some(format!("Failed to reset: {}", e)));
            return;
        }
        let defaults = ApiConfig::from_build_env();
        info!("Backend URL reset to {}", defaults.duckdb_api_url);
        set_backend_url.set(defaults.duckdb_api_url.clone());
        api.config.set(defaults);
        api.cache.update_value(|c| c.clear());
        set_status.set(Some("Backend URL reset to default".to_string()));
    };

    view! {
        <div class="page settings-page">
            <h2>"Settings"</h2>

            <section class="settings-section">
                <h3>"Backends"</h3>
                <p class="section-description">
                    "The local backend serves governance, backfill, and market data. The override is kept in this browser only."
                </p>

                <div class="form-group">
                    <label for="backend-url">"Local backend URL"</label>
                    <div class="input-row">
                        <input
                            id="backend-url"
                            type="text"
                            placeholder="http://localhost:3001"
                            class="input"
                            prop:value=move || backend_url.get()
                            on:input=move |ev| {
                                set_backend_url.set(event_target_value(&ev));
                            }
                        />
                        <button class="btn btn-save" on:click=save>"Save"</button>
                        <button class="btn btn-secondary" on:click=reset>"Reset"</button>
                    </div>
                    <Show when=move || status.get().is_some()>
                        <span class="status-text">{move || status.get().unwrap_or_default()}</span>
                    </Show>
                </div>

                <div class="form-group">
                    <label>"Scan API"</label>
                    <p class="mono">{move || api.config.with(|c| c.scan_api_url.clone())}</p>
                    <label>"Market proxy"</label>
                    <p class="mono">{move || api.config.with(|c| c.market_api_url.clone())}</p>
                </div>
            </section>
        </div>
    }
}
