//! Golden set management: browse, add, sample, clear, and evaluate.

use std::future::Future;

use chrono::Utc;
use leptos::prelude::*;
use scanton_core::pagination::Pagination;
use scanton_core::types::{GoldenCategory, GoldenItemDraft, GOVERNANCE_TYPES};
use scanton_core::workflow::GoldenSetState;
use scanton_core::ScantonClient;
use wasm_bindgen_futures::spawn_local;

use crate::api::{random_seed, use_api, ApiContext};
use crate::components::evaluation_history::EvaluationHistory;
use crate::components::pagination_controls::PaginationControls;

const PAGE_SIZE: usize = 10;
const ADDED_BY: &str = "dashboard";

/// Run one workflow step against a snapshot of the state and write the
/// snapshot back when it finishes. Every other writer to `state` checks
/// `busy`, so the snapshot is the only copy while a step runs.
fn run_step<F, Fut>(
    api: ApiContext,
    state: RwSignal<GoldenSetState>,
    busy: RwSignal<bool>,
    notice: RwSignal<Option<String>>,
    step: F,
) where
    F: FnOnce(ScantonClient, GoldenSetState) -> Fut + 'static,
    Fut: Future<Output = (GoldenSetState, Option<String>)> + 'static,
{
    if busy.get_untracked() {
        return;
    }
    let client = match api.client() {
        Ok(client) => client,
        Err(e) => {
            notice.set(Some(e.to_string()));
            return;
        }
    };
    busy.set(true);
    spawn_local(async move {
        let (next, message) = step(client, state.get_untracked()).await;
        state.set(next);
        notice.set(message);
        busy.set(false);
    });
}

#[component]
pub fn GoldenSetPanel() -> impl IntoView {
    let api = use_api();
    let state = RwSignal::new(GoldenSetState::default());
    let busy = RwSignal::new(false);
    let notice = RwSignal::new(None::<String>);
    let (page, set_page) = signal(1usize);

    // Add form
    let (new_id, set_new_id) = signal(String::new());
    let (new_subject, set_new_subject) = signal(String::new());
    let (new_type, set_new_type) = signal(GOVERNANCE_TYPES[0].to_string());
    let (new_category, set_new_category) = signal(GoldenCategory::Standard);
    let (new_notes, set_new_notes) = signal(String::new());
    let (sample_count, set_sample_count) = signal(String::from("10"));
    let (remove_reason, set_remove_reason) = signal(String::from("Removed from dashboard"));

    let refresh = move || {
        run_step(api, state, busy, notice, |client, mut s| async move {
            let failures = s.fetch_data(&client).await;
            let message = (failures > 0).then(|| format!("{} of 3 golden set requests failed", failures));
            (s, message)
        });
    };

    Effect::new(move |_| refresh());

    let add_item = move |_| {
        let draft = GoldenItemDraft {
            id: new_id.get().trim().to_string(),
            subject: new_subject.get().trim().to_string(),
            true_type: new_type.get(),
            category: new_category.get(),
            notes: Some(new_notes.get()).filter(|n| !n.trim().is_empty()),
            added_by: ADDED_BY.to_string(),
            ..Default::default()
        };
        run_step(api, state, busy, notice, move |client, mut s| async move {
            match s.add_item(&client, &draft).await {
                Ok(()) => {
                    set_new_id.set(String::new());
                    set_new_subject.set(String::new());
                    set_new_notes.set(String::new());
                    (s, Some(format!("Added {}", draft.id)))
                }
                Err(e) => (s, Some(e.to_string())),
            }
        });
    };

    let remove_item = move |id: String| {
        let reason = remove_reason.get_untracked();
        run_step(api, state, busy, notice, move |client, mut s| async move {
            let message = match s.remove_item(&client, &id, &reason).await {
                Ok(()) => format!("Removed {}", id),
                Err(e) => format!("Failed to remove {}: {}", id, e),
            };
            (s, Some(message))
        });
    };

    let sample = move |_| {
        let count = sample_count.get().trim().parse::<usize>().unwrap_or(10);
        let seed = random_seed();
        run_step(api, state, busy, notice, move |client, mut s| async move {
            let message = match s.sample_from_existing(&client, count, seed).await {
                Ok(staged) => format!("Staged {} candidates", staged),
                Err(e) => format!("Sampling failed: {}", e),
            };
            (s, Some(message))
        });
    };

    let add_sampled = move |_| {
        run_step(api, state, busy, notice, |client, mut s| async move {
            let outcome = s.add_sampled_items(&client, ADDED_BY).await;
            let message = format!(
                "Added {} of {} sampled items ({} failed)",
                outcome.succeeded,
                outcome.attempted(),
                outcome.failed
            );
            (s, Some(message))
        });
    };

    let clear_all = move |_| {
        let count = state.with_untracked(|s| s.items.len());
        let confirmed = web_sys::window()
            .and_then(|w| {
                w.confirm_with_message(&format!("Remove all {} golden set items?", count))
                    .ok()
            })
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        let reason = remove_reason.get_untracked();
        run_step(api, state, busy, notice, move |client, mut s| async move {
            let outcome = s.clear_golden_set(&client, &reason).await;
            let message = format!(
                "Removed {} of {} items ({} failed)",
                outcome.succeeded,
                outcome.attempted(),
                outcome.failed
            );
            (s, Some(message))
        });
        set_page.set(1);
    };

    let evaluate = move |_| {
        run_step(api, state, busy, notice, |client, mut s| async move {
            let message = match s.run_evaluation(&client, Utc::now()).await {
                Ok(result) => format!(
                    "{}: {:.1}% accuracy over {} items",
                    result.classifier_version,
                    result.accuracy * 100.0,
                    result.golden_set_size
                ),
                Err(e) => format!("Evaluation failed: {}", e),
            };
            (s, Some(message))
        });
    };

    let pagination = Signal::derive(move || {
        Pagination::new(state.with(|s| s.items.len()), PAGE_SIZE, page.get())
    });

    let toggle_candidate = move |index: usize| {
        if busy.get_untracked() {
            return;
        }
        state.update(|s| {
            if let Some(c) = s.staged.get_mut(index) {
                c.selected = !c.selected;
            }
        });
    };
    let set_candidate_type = move |index: usize, value: String| {
        if busy.get_untracked() {
            return;
        }
        state.update(|s| {
            if let Some(c) = s.staged.get_mut(index) {
                c.true_type = value;
            }
        });
    };

    view! {
        <section class="panel golden-set-panel">
            <div class="panel-header">
                <h3>"Golden Set"</h3>
                <div class="panel-actions">
                    <button class="btn btn-secondary" disabled=move || busy.get() on:click=move |_| refresh()>
                        "Refresh"
                    </button>
                    <button class="btn btn-primary" disabled=move || busy.get() on:click=evaluate>
                        "Run Evaluation"
                    </button>
                </div>
            </div>

            <Show when=move || notice.get().is_some()>
                <p class="notice">{move || notice.get().unwrap_or_default()}</p>
            </Show>

            {move || state.with(|s| s.summary.clone()).map(|summary| view! {
                <div class="summary-row">
                    <span class="summary-total">{format!("{} items", summary.total_items)}</span>
                    {summary.by_type.into_iter().map(|(kind, n)| view! {
                        <span class="chip">{format!("{}: {}", kind, n)}</span>
                    }).collect::<Vec<_>>()}
                </div>
            })}

            <div class="golden-items">
                {move || {
                    let p = pagination.get();
                    let items = state.with(|s| p.slice(&s.items).to_vec());
                    if items.is_empty() {
                        view! { <p class="empty">"No golden items yet."</p> }.into_any()
                    } else {
                        view! {
                            <table class="data-table">
                                <thead>
                                    <tr><th>"ID"</th><th>"Subject"</th><th>"True type"</th><th>"Category"</th><th></th></tr>
                                </thead>
                                <tbody>
                                    {items.into_iter().map(|item| {
                                        let id = item.id.clone();
                                        view! {
                                            <tr>
                                                <td class="mono">{item.id.clone()}</td>
                                                <td>{item.subject.clone()}</td>
                                                <td>{item.true_type.clone()}</td>
                                                <td>{item.category.as_str()}</td>
                                                <td>
                                                    <button
                                                        class="btn btn-small btn-dismiss"
                                                        disabled=move || busy.get()
                                                        on:click=move |_| remove_item(id.clone())
                                                    >
                                                        "Remove"
                                                    </button>
                                                </td>
                                            </tr>
                                        }
                                    }).collect::<Vec<_>>()}
                                </tbody>
                            </table>
                        }.into_any()
                    }
                }}
                <PaginationControls pagination on_page_change={Callback::new(move |p| set_page.set(p))} />
            </div>

            <div class="form-group">
                <label for="remove-reason">"Removal reason"</label>
                <input
                    id="remove-reason"
                    class="input"
                    prop:value=move || remove_reason.get()
                    on:input=move |ev| set_remove_reason.set(event_target_value(&ev))
                />
                <button class="btn btn-dismiss" disabled=move || busy.get() on:click=clear_all>
                    "Clear Golden Set"
                </button>
            </div>

            <h4>"Add item"</h4>
            <div class="form-grid">
                <input class="input" placeholder="Item id"
                    prop:value=move || new_id.get()
                    on:input=move |ev| set_new_id.set(event_target_value(&ev)) />
                <input class="input" placeholder="Subject"
                    prop:value=move || new_subject.get()
                    on:input=move |ev| set_new_subject.set(event_target_value(&ev)) />
                <select class="input" on:change=move |ev| set_new_type.set(event_target_value(&ev))>
                    {GOVERNANCE_TYPES.into_iter().map(|t| view! {
                        <option value=t selected=move || new_type.get() == t>{t}</option>
                    }).collect::<Vec<_>>()}
                </select>
                <select class="input" on:change=move |ev| {
                    if let Some(c) = GoldenCategory::parse(&event_target_value(&ev)) {
                        set_new_category.set(c);
                    }
                }>
                    {GoldenCategory::ALL.into_iter().map(|c| {
                        view! {
                            <option value=c.as_str() selected=move || new_category.get() == c>{c.as_str()}</option>
                        }
                    }).collect::<Vec<_>>()}
                </select>
                <input class="input" placeholder="Notes (optional)"
                    prop:value=move || new_notes.get()
                    on:input=move |ev| set_new_notes.set(event_target_value(&ev)) />
                <button class="btn btn-primary" disabled=move || busy.get() on:click=add_item>"Add"</button>
            </div>

            <h4>"Sample from existing items"</h4>
            <div class="input-row">
                <input class="input input-narrow" type="number" min="1"
                    prop:value=move || sample_count.get()
                    on:input=move |ev| set_sample_count.set(event_target_value(&ev)) />
                <button class="btn btn-secondary" disabled=move || busy.get() on:click=sample>"Sample"</button>
                <button
                    class="btn btn-primary"
                    disabled=move || busy.get() || !state.with(|s| s.staged.iter().any(|c| c.is_ready()))
                    on:click=add_sampled
                >
                    "Add Selected"
                </button>
            </div>
            <ul class="staged-list">
                {move || state.with(|s| s.staged.clone()).into_iter().enumerate().map(|(index, candidate)| {
                    view! {
                        <li class="staged-item">
                            <input
                                type="checkbox"
                                prop:checked=candidate.selected
                                disabled=move || busy.get()
                                on:change=move |_| toggle_candidate(index)
                            />
                            <span class="staged-subject">{candidate.item.subject.clone()}</span>
                            <span class="muted">{candidate.item.inferred_type.clone().unwrap_or_default()}</span>
                            <select class="input" disabled=move || busy.get() on:change=move |ev| set_candidate_type(index, event_target_value(&ev))>
                                <option value="" selected=candidate.true_type.is_empty()>"True type..."</option>
                                {GOVERNANCE_TYPES.into_iter().map(|t| view! {
                                    <option value=t selected=candidate.true_type == t>{t}</option>
                                }).collect::<Vec<_>>()}
                            </select>
                        </li>
                    }
                }).collect::<Vec<_>>()}
            </ul>

            <EvaluationHistory history=Signal::derive(move || state.with(|s| s.history.clone())) />
        </section>
    }
}
