//! Evaluation history, newest first, with per-run drill-down.

use leptos::prelude::*;
use scanton_core::types::{EvaluationResult, ItemChange};

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn delta_label(result: &EvaluationResult) -> (String, &'static str) {
    match result.delta() {
        Some(d) if d > 0.0 => (format!("+{:.1} pts", d * 100.0), "delta-up"),
        Some(d) if d < 0.0 => (format!("{:.1} pts", d * 100.0), "delta-down"),
        Some(_) => ("no change".to_string(), "delta-flat"),
        None => ("first run".to_string(), "delta-flat"),
    }
}

#[component]
fn ChangeList(#[prop(into)] title: String, changes: Vec<ItemChange>, class: &'static str) -> impl IntoView {
    if changes.is_empty() {
        return view! { <p class="muted">{format!("No {}.", title.to_lowercase())}</p> }.into_any();
    }
    view! {
        <div class=format!("change-list {}", class)>
            <h5>{format!("{} ({})", title, changes.len())}</h5>
            <ul>
                {changes.into_iter().map(|c| view! {
                    <li>
                        <span class="mono">{c.item_id}</span>
                        " "
                        <span>{c.subject}</span>
                        <span class="muted">
                            {format!(
                                " expected {}, was {}, now {}",
                                c.expected,
                                c.previous_prediction.unwrap_or_else(|| "n/a".to_string()),
                                c.current_prediction
                            )}
                        </span>
                    </li>
                }).collect::<Vec<_>>()}
            </ul>
        </div>
    }
    .into_any()
}

#[component]
pub fn EvaluationHistory(#[prop(into)] history: Signal<Vec<EvaluationResult>>) -> impl IntoView {
    let (selected, set_selected) = signal::<Option<String>>(None);

    view! {
        <div class="evaluation-history">
            <h4>"Evaluation History"</h4>
            {move || {
                let runs = history.get();
                if runs.is_empty() {
                    return view! { <p class="empty">"No evaluations yet."</p> }.into_any();
                }
                view! {
                    <div class="history-list">
                        {runs.into_iter().map(|run| {
                            let version = run.classifier_version.clone();
                            let is_open = {
                                let version = version.clone();
                                move || selected.get().as_deref() == Some(version.as_str())
                            };
                            let (delta, delta_class) = delta_label(&run);
                            let toggle = {
                                let version = version.clone();
                                move |_| set_selected.update(|s| {
                                    *s = if s.as_deref() == Some(version.as_str()) { None } else { Some(version.clone()) };
                                })
                            };
                            let detail = run.clone();
                            view! {
                                <div class="history-item">
                                    <div class="history-item-info" on:click=toggle>
                                        <span class="mono">{version.clone()}</span>
                                        <span class="history-date">{run.evaluated_at.clone()}</span>
                                        <span class="history-accuracy">{percent(run.accuracy)}</span>
                                        <span class=format!("history-delta {}", delta_class)>{delta}</span>
                                        <span class="muted">{format!("{} items", run.golden_set_size)}</span>
                                    </div>
                                    <Show when=is_open.clone()>
                                        <div class="history-detail">
                                            <div class="breakdown">
                                                {detail.by_type.clone().into_iter().map(|(kind, b)| view! {
                                                    <span class="chip">{format!("{}: {}/{} ({})", kind, b.correct, b.total, percent(b.accuracy))}</span>
                                                }).collect::<Vec<_>>()}
                                            </div>
                                            <ChangeList title="Regressions" changes=detail.regressions.clone() class="regressions" />
                                            <ChangeList title="Improvements" changes=detail.improvements.clone() class="improvements" />
                                        </div>
                                    </Show>
                                </div>
                            }
                        }).collect::<Vec<_>>()}
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}
