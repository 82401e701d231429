//! Correction-learning review: generate proposals, decide on each, apply the
//! accepted batch as a new pattern version.

use chrono::Utc;
use leptos::prelude::*;
use scanton_core::types::{Decision, Priority, ProposedImprovement};
use scanton_core::workflow::ProposalBoard;
use wasm_bindgen_futures::spawn_local;

use crate::api::{now_ms, use_api};

fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "priority-high",
        Priority::Medium => "priority-medium",
        Priority::Low => "priority-low",
    }
}

#[component]
pub fn LearnFromCorrectionsPanel() -> impl IntoView {
    let api = use_api();
    let board = RwSignal::new(ProposalBoard::default());
    let busy = RwSignal::new(false);
    let notice = RwSignal::new(None::<String>);

    // Status and current patterns on mount. Each result is merged into the
    // live board so anything done in the meantime survives.
    Effect::new(move |_| {
        let Ok(client) = api.client() else { return };
        spawn_local(async move {
            match client.learning_status().await {
                Ok(status) => board.update(|b| b.set_status(&status)),
                Err(e) => notice.set(Some(format!("Learning status unavailable: {}", e))),
            }
            match client.learned_patterns().await {
                Ok(patterns) => board.update(|b| b.set_patterns(patterns)),
                Err(e) => notice.set(Some(format!("Patterns unavailable: {}", e))),
            }
        });
    });

    let generate = move |_| {
        let Ok(client) = api.client() else { return };
        busy.set(true);
        spawn_local(async move {
            match ProposalBoard::fetch_batch(&client, now_ms()).await {
                Ok(batch) if batch.is_empty() => {
                    board.update(|b| b.load_batch(batch));
                    notice.set(Some("No proposals: not enough corrections yet.".to_string()));
                }
                Ok(batch) => {
                    let n = batch.len();
                    board.update(|b| b.load_batch(batch));
                    notice.set(Some(format!("{} proposals ready for review", n)));
                }
                Err(e) => notice.set(Some(format!("Failed to generate proposals: {}", e))),
            }
            busy.set(false);
        });
    };

    let apply = move |_| {
        let Ok(client) = api.client() else { return };
        let ids = match board.with_untracked(|b| b.ids_to_apply()) {
            Ok(ids) => ids,
            Err(e) => {
                notice.set(Some(e.to_string()));
                return;
            }
        };
        busy.set(true);
        spawn_local(async move {
            match client.apply_proposals(&ids).await {
                Ok(result) => {
                    notice.set(Some(format!(
                        "Applied {} proposals as pattern version {}",
                        result.applied,
                        result.version.clone().unwrap_or_else(|| "unknown".to_string())
                    )));
                    board.update(|b| b.record_applied(result));
                    match client.learned_patterns().await {
                        Ok(patterns) => board.update(|b| b.set_patterns(patterns)),
                        Err(e) => notice.set(Some(format!("Applied, but reloading patterns failed: {}", e))),
                    }
                    api.invalidate_prefix(&["governance"]);
                }
                Err(e) => notice.set(Some(e.to_string())),
            }
            busy.set(false);
        });
    };

    let toggle_learning = move |_| {
        let Ok(client) = api.client() else { return };
        busy.set(true);
        spawn_local(async move {
            match client.toggle_learning_mode().await {
                Ok(status) => board.update(|b| { b.set_learning_mode(&status); }),
                Err(e) => notice.set(Some(format!("Failed to toggle learning mode: {}", e))),
            }
            busy.set(false);
        });
    };

    let decide = move |id: String, decision: Decision| {
        board.update(|b| {
            b.decide(&id, decision, Utc::now());
        });
    };

    view! {
        <section class="panel learning-panel">
            <div class="panel-header">
                <h3>"Learn From Corrections"</h3>
                <label class="toggle">
                    <input
                        type="checkbox"
                        prop:checked=move || board.with(|b| b.learning_mode.unwrap_or(false))
                        disabled=move || busy.get()
                        on:change=toggle_learning
                    />
                    " Learning mode"
                </label>
            </div>
            <p class="muted">
                {move || format!("{} corrections recorded", board.with(|b| b.corrections_count))}
            </p>

            <Show when=move || notice.get().is_some()>
                <p class="notice">{move || notice.get().unwrap_or_default()}</p>
            </Show>

            {move || board.with(|b| b.patterns.clone()).map(|p| view! {
                <div class="pattern-version">
                    <span>{format!("Patterns {}", p.version)}</span>
                    <span class="muted">
                        {format!(
                            " from {} corrections, {} keywords, {} entity mappings",
                            p.based_on_corrections,
                            p.keyword_count(),
                            p.patterns.entity_name_mappings.len()
                        )}
                    </span>
                </div>
            })}

            <div class="panel-actions">
                <button class="btn btn-primary" disabled=move || busy.get() on:click=generate>
                    "Generate Proposals"
                </button>
                <button
                    class="btn btn-secondary"
                    disabled=move || busy.get() || board.with(|b| b.proposals().is_empty())
                    on:click=move |_| { board.update(|b| { b.accept_all_high_priority(Utc::now()); }); }
                >
                    "Accept All High Priority"
                </button>
                <button
                    class="btn btn-secondary"
                    disabled=move || busy.get() || board.with(|b| b.proposals().is_empty())
                    on:click=move |_| { board.update(|b| { b.accept_all_general(Utc::now()); }); }
                >
                    "Accept All General"
                </button>
                <button
                    class="btn btn-primary"
                    disabled=move || busy.get() || board.with(|b| b.counts().accepted == 0)
                    on:click=apply
                >
                    {move || format!("Apply {} Accepted", board.with(|b| b.counts().accepted))}
                </button>
            </div>

            {move || {
                let counts = board.with(|b| b.counts());
                view! {
                    <p class="decision-counts">
                        {format!("{} accepted, {} rejected, {} pending", counts.accepted, counts.rejected, counts.pending)}
                    </p>
                }
            }}

            <div class="proposal-list">
                {move || {
                    let rows: Vec<(ProposedImprovement, Decision)> = board.with(|b| {
                        b.proposals().iter().map(|p| (p.clone(), b.decision(&p.id))).collect()
                    });
                    rows.into_iter().map(|(p, decision)| {
                        let accept_id = p.id.clone();
                        let reject_id = p.id.clone();
                        let reset_id = p.id.clone();
                        let scope = p.scope.map(|s| format!("{:?}", s).to_lowercase()).unwrap_or_default();
                        view! {
                            <div class={format!("proposal-card decision-{:?}", decision).to_lowercase()}>
                                <div class="proposal-head">
                                    <span class=format!("chip {}", priority_class(p.priority))>{format!("{:?}", p.priority)}</span>
                                    <span class="chip">{p.kind.clone()}</span>
                                    {(!scope.is_empty()).then(|| view! { <span class="chip">{scope}</span> })}
                                    {p.confidence.map(|c| view! { <span class="muted">{format!("{:.0}% confidence", c * 100.0)}</span> })}
                                </div>
                                <p class="proposal-description">{p.description.clone()}</p>
                                {(!p.reason.is_empty()).then(|| view! { <p class="muted">{p.reason.clone()}</p> })}
                                {p.keywords.clone().map(|k| view! { <p class="mono">{k.join(", ")}</p> })}
                                <div class="proposal-actions">
                                    <button class="btn btn-small" disabled=move || busy.get() on:click=move |_| decide(accept_id.clone(), Decision::Accept)>"Accept"</button>
                                    <button class="btn btn-small btn-dismiss" disabled=move || busy.get() on:click=move |_| decide(reject_id.clone(), Decision::Reject)>"Reject"</button>
                                    <button class="btn btn-small btn-secondary" disabled=move || busy.get() on:click=move |_| decide(reset_id.clone(), Decision::Pending)>"Undo"</button>
                                </div>
                            </div>
                        }
                    }).collect::<Vec<_>>()
                }}
            </div>
        </section>
    }
}
