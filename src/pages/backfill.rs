use leptos::prelude::*;
use scanton_core::api::backfill::AcsSnapshot;
use scanton_core::cache::QueryKey;
use wasm_bindgen_futures::spawn_local;

use crate::api::use_api;
use crate::components::gap_recovery_panel::GapRecoveryPanel;
use crate::components::shard_progress_panel::{BackfillStatusPanel, ShardProgressPanel};

#[component]
fn AcsSnapshots() -> impl IntoView {
    let api = use_api();
    let snapshots = RwSignal::new(None::<Result<Vec<AcsSnapshot>, String>>);

    let load = move || {
        spawn_local(async move {
            let result = api
                .cached(QueryKey::from(["backfill", "acs-snapshots"]), |c| async move {
                    c.acs_snapshots().await
                })
                .await;
            snapshots.set(Some(result.map_err(|e| e.to_string())));
        });
    };

    Effect::new(move |_| load());

    view! {
        <section class="panel acs-panel">
            <div class="panel-header">
                <h3>"ACS Snapshots"</h3>
                <button class="btn btn-secondary" on:click=move |_| {
                    api.invalidate(&[QueryKey::from(["backfill", "acs-snapshots"])]);
                    load();
                }>"Refresh"</button>
            </div>
            {move || match snapshots.get() {
                None => view! { <p class="muted">"Loading..."</p> }.into_any(),
                Some(Err(e)) => view! { <p class="card card-error">{e}</p> }.into_any(),
                Some(Ok(list)) if list.is_empty() => view! { <p class="empty">"No snapshots yet."</p> }.into_any(),
                Some(Ok(list)) => view! {
                    <table class="data-table">
                        <thead><tr><th>"Record time"</th><th>"Migration"</th><th>"Contracts"</th><th>"Status"</th></tr></thead>
                        <tbody>
                            {list.into_iter().map(|s| view! {
                                <tr>
                                    <td>{s.record_time}</td>
                                    <td>{s.migration_id.map(|m| m.to_string()).unwrap_or_default()}</td>
                                    <td>{s.contract_count}</td>
                                    <td>{s.status}</td>
                                </tr>
                            }).collect::<Vec<_>>()}
                        </tbody>
                    </table>
                }.into_any(),
            }}
        </section>
    }
}

#[component]
pub fn BackfillPage() -> impl IntoView {
    view! {
        <div class="page backfill-page">
            <h2>"Backfill & Ingestion"</h2>
            <p class="page-description">"Live status of historical backfill, shard workers, and ledger gaps."</p>
            <BackfillStatusPanel />
            <ShardProgressPanel />
            <GapRecoveryPanel />
            <AcsSnapshots />
        </div>
    }
}
