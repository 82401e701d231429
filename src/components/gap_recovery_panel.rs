//! Gap report, detection trigger, and streamed recovery with a Stop button.

use futures_util::future::AbortHandle;
use leptos::prelude::*;
use scanton_core::api::backfill::{GapReport, RecoveryRequest};
use scanton_core::stream::StreamEvent;
use scanton_core::task::{cancellable, intervals, PollState};
use scanton_core::workflow::{run_recovery, RecoveryLog, RecoveryPhase};
use wasm_bindgen_futures::spawn_local;

use crate::api::use_api;
use crate::polling::use_interval;

fn phase_label(phase: RecoveryPhase) -> &'static str {
    match phase {
        RecoveryPhase::Idle => "Idle",
        RecoveryPhase::Running => "Recovering...",
        RecoveryPhase::Completed => "Completed",
        RecoveryPhase::Failed => "Failed",
        RecoveryPhase::Stopped => "Stopped",
    }
}

#[component]
pub fn GapRecoveryPanel() -> impl IntoView {
    let api = use_api();
    let report = RwSignal::new(None::<GapReport>);
    let poll = RwSignal::new(PollState::default());
    let detecting = RwSignal::new(false);
    let notice = RwSignal::new(None::<String>);
    let log = RwSignal::new(RecoveryLog::default());
    let abort = StoredValue::new(None::<AbortHandle>);
    let (max_gaps, set_max_gaps) = signal(String::new());
    let (dry_run, set_dry_run) = signal(false);

    use_interval(intervals::GAP_REPORT_MS, move || {
        if !poll.try_update(|p| p.begin()).unwrap_or(false) {
            return;
        }
        spawn_local(async move {
            let result = match api.client() {
                Ok(client) => client.gap_report().await,
                Err(e) => Err(e),
            };
            poll.update(|p| p.finish(&result));
            if let Ok(r) = result {
                report.set(Some(r));
            }
        });
    });

    let detect = move |_| {
        let Ok(client) = api.client() else { return };
        detecting.set(true);
        spawn_local(async move {
            match client.detect_gaps().await {
                Ok(r) => {
                    notice.set(Some(format!("Detection found {} gaps", r.total_gaps)));
                    report.set(Some(r));
                }
                Err(e) => notice.set(Some(format!("Gap detection failed: {}", e))),
            }
            api.invalidate_prefix(&["backfill"]);
            detecting.set(false);
        });
    };

    let start = move |_| {
        if log.with_untracked(|l| l.is_running()) {
            return;
        }
        let client = match api.client() {
            Ok(client) => client,
            Err(e) => {
                log.update(|l| l.finish(&Err(e)));
                return;
            }
        };
        let request = RecoveryRequest {
            max_gaps: max_gaps.get_untracked().trim().parse().ok(),
            dry_run: dry_run.get_untracked(),
        };
        log.update(|l| l.start());

        spawn_local(async move {
            let (run, handle) = cancellable(async move {
                run_recovery(&client, &request, &mut |event: StreamEvent| log.update(|l| l.apply(event))).await
            });
            abort.set_value(Some(handle));
            let result = run.await;
            abort.set_value(None);
            log.update(|l| l.finish(&result));
        });
    };

    let stop = move |_| {
        abort.with_value(|handle| {
            if let Some(handle) = handle {
                handle.abort();
            }
        });
    };

    view! {
        <section class="panel gap-panel">
            <div class="panel-header">
                <h3>"Gaps"</h3>
                <button class="btn btn-secondary" disabled=move || detecting.get() on:click=detect>
                    {move || if detecting.get() { "Detecting..." } else { "Detect Gaps" }}
                </button>
            </div>

            <Show when=move || notice.get().is_some()>
                <p class="notice">{move || notice.get().unwrap_or_default()}</p>
            </Show>

            {move || {
                if poll.with(|p| p.is_unavailable()) {
                    return view! { <p class="card card-error">"Unable to load gap report."</p> }.into_any();
                }
                match report.get() {
                    None => view! { <p class="muted">"Loading..."</p> }.into_any(),
                    Some(r) if r.gaps.is_empty() => view! { <p class="empty">"No gaps detected."</p> }.into_any(),
                    Some(r) => view! {
                        <p>{format!("{} gaps, {:.0}s of missing history", r.total_gaps, r.total_missing_seconds)}</p>
                        <table class="data-table">
                            <thead><tr><th>"Synchronizer"</th><th>"From"</th><th>"To"</th><th>"Duration"</th></tr></thead>
                            <tbody>
                                {r.gaps.into_iter().map(|g| view! {
                                    <tr>
                                        <td class="mono">{g.synchronizer_id}</td>
                                        <td>{g.start_time}</td>
                                        <td>{g.end_time}</td>
                                        <td>{format!("{:.0}s", g.duration_seconds)}</td>
                                    </tr>
                                }).collect::<Vec<_>>()}
                            </tbody>
                        </table>
                    }.into_any(),
                }
            }}

            <h4>"Recovery"</h4>
            <div class="input-row">
                <input class="input input-narrow" type="number" min="1" placeholder="Max gaps"
                    prop:value=move || max_gaps.get()
                    on:input=move |ev| set_max_gaps.set(event_target_value(&ev)) />
                <label class="toggle">
                    <input type="checkbox"
                        prop:checked=move || dry_run.get()
                        on:change=move |ev| set_dry_run.set(event_target_checked(&ev)) />
                    " Dry run"
                </label>
                <button class="btn btn-primary" disabled=move || log.with(|l| l.is_running()) on:click=start>
                    "Recover Gaps"
                </button>
                <button class="btn btn-dismiss" disabled=move || !log.with(|l| l.is_running()) on:click=stop>
                    "Stop"
                </button>
            </div>

            <p class="recovery-phase">
                {move || {
                    let (phase, percent) = log.with(|l| (l.phase, l.percent()));
                    match percent {
                        Some(p) => format!("{} ({:.0}%)", phase_label(phase), p),
                        None => phase_label(phase).to_string(),
                    }
                }}
            </p>
            <Show when=move || log.with(|l| l.error.is_some())>
                <p class="status-error">{move || log.with(|l| l.error.clone().unwrap_or_default())}</p>
            </Show>
            <pre class="recovery-log">
                {move || log.with(|l| l.lines.iter().cloned().collect::<Vec<_>>().join("\n"))}
            </pre>
        </section>
    }
}
