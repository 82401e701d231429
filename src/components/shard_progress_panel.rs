use leptos::prelude::*;
use scanton_core::api::backfill::{BackfillStatus, EngineStatus, ShardProgress};
use scanton_core::shards::summarize;
use scanton_core::task::{intervals, PollState};
use wasm_bindgen_futures::spawn_local;

use crate::api::use_api;
use crate::components::status_badge::{Health, StatusBadge};
use crate::polling::use_interval;

#[component]
pub fn ShardProgressPanel() -> impl IntoView {
    let api = use_api();
    let shards = RwSignal::new(Vec::<ShardProgress>::new());
    let poll = RwSignal::new(PollState::default());

    use_interval(intervals::SHARD_PROGRESS_MS, move || {
        if !poll.try_update(|p| p.begin()).unwrap_or(false) {
            return;
        }
        spawn_local(async move {
            let result = match api.client() {
                Ok(client) => client.shard_progress().await,
                Err(e) => Err(e),
            };
            poll.update(|p| p.finish(&result));
            if let Ok(list) = result {
                shards.set(list);
            }
        });
    });

    view! {
        <section class="panel shard-panel">
            <h3>"Shard Progress"</h3>
            {move || {
                if poll.with(|p| p.is_unavailable()) {
                    let reason = poll.with(|p| p.last_error().unwrap_or_default().to_string());
                    return view! {
                        <div class="card card-error">
                            <p>"Unable to load shard progress."</p>
                            <p class="muted">{reason}</p>
                        </div>
                    }.into_any();
                }
                let list = shards.get();
                if list.is_empty() {
                    return view! { <p class="empty">"No shards reported."</p> }.into_any();
                }
                let summary = summarize(&list);
                view! {
                    <div class="shard-summary">
                        <div class="progress-bar">
                            <div class="progress-fill" style=format!("width: {:.1}%", summary.overall_percent)></div>
                        </div>
                        <p>
                            {format!(
                                "{:.1}% overall, {} of {} shards complete, {} running, {} failed",
                                summary.overall_percent,
                                summary.completed,
                                summary.total,
                                summary.running,
                                summary.failed
                            )}
                        </p>
                        {summary.longest_eta.map(|eta| view! { <p class="muted">{format!("Slowest shard ETA: {}", eta)}</p> })}
                    </div>
                    <div class="shard-list">
                        {list.into_iter().map(|s| {
                            let detail = match (&s.error, &s.eta) {
                                (Some(err), _) => err.clone(),
                                (None, Some(eta)) => format!("{:.1}%, ETA {}", s.progress_percent, eta),
                                (None, None) => format!("{:.1}%", s.progress_percent),
                            };
                            view! {
                                <StatusBadge label=format!("Shard {}", s.shard_index) status=Health::from(s.status) detail />
                            }
                        }).collect::<Vec<_>>()}
                    </div>
                }.into_any()
            }}
        </section>
    }
}

#[component]
pub fn BackfillStatusPanel() -> impl IntoView {
    let api = use_api();
    let status = RwSignal::new(None::<BackfillStatus>);
    let engine = RwSignal::new(None::<EngineStatus>);
    let status_poll = RwSignal::new(PollState::default());
    let engine_poll = RwSignal::new(PollState::default());

    use_interval(intervals::BACKFILL_STATUS_MS, move || {
        if !status_poll.try_update(|p| p.begin()).unwrap_or(false) {
            return;
        }
        spawn_local(async move {
            let result = match api.client() {
                Ok(client) => client.backfill_status().await,
                Err(e) => Err(e),
            };
            status_poll.update(|p| p.finish(&result));
            if let Ok(s) = result {
                status.set(Some(s));
            }
        });
    });

    use_interval(intervals::ENGINE_STATUS_MS, move || {
        if !engine_poll.try_update(|p| p.begin()).unwrap_or(false) {
            return;
        }
        spawn_local(async move {
            let result = match api.client() {
                Ok(client) => client.engine_status().await,
                Err(e) => Err(e),
            };
            engine_poll.update(|p| p.finish(&result));
            if let Ok(e) = result {
                engine.set(Some(e));
            }
        });
    });

    view! {
        <section class="panel backfill-status-panel">
            <h3>"Backfill Status"</h3>
            {move || {
                let (health, detail) = if engine_poll.with(|p| p.is_unavailable()) {
                    (Health::Bad, "unreachable".to_string())
                } else {
                    match engine.get() {
                        Some(e) if e.running => (
                            Health::Good,
                            format!("{}, queue {}", e.version.unwrap_or_default(), e.queue_depth),
                        ),
                        Some(_) => (Health::Bad, "stopped".to_string()),
                        None => (Health::Unknown, "checking...".to_string()),
                    }
                };
                view! { <StatusBadge label="Ingestion engine" status=health detail /> }
            }}
            {move || {
                if status_poll.with(|p| p.is_unavailable()) {
                    return view! { <p class="card card-error">"Unable to load backfill status."</p> }.into_any();
                }
                match status.get() {
                    None => view! { <p class="muted">"Loading..."</p> }.into_any(),
                    Some(s) => view! {
                        <div class="backfill-status">
                            <StatusBadge
                                label={s.phase.clone().unwrap_or_else(|| "Backfill".to_string())}
                                status={if s.running { Health::Busy } else { Health::Good }}
                                detail=format!("{:.1}%", s.progress_percent)
                            />
                            <p>{format!("{} of {} updates processed", s.processed_updates, s.total_updates)}</p>
                            {s.eta.map(|eta| view! { <p class="muted">{format!("ETA {}", eta)}</p> })}
                            {(s.errors > 0).then(|| view! { <p class="status-error">{format!("{} errors", s.errors)}</p> })}
                        </div>
                    }.into_any(),
                }
            }}
        </section>
    }
}
