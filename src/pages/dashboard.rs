use chrono::Utc;
use leptos::prelude::*;
use scanton_core::amount::format_compact;
use scanton_core::api::scan::DsoInfo;
use scanton_core::cache::QueryKey;
use scanton_core::issuance::{mint_per_round, next_stage, stage_for_elapsed, years_since_launch};
use scanton_core::pagination::Pagination;
use scanton_core::supply::{RoundTotals, SupplySnapshot};
use scanton_core::votes::{VoteOutcome, VoteStatus};
use wasm_bindgen_futures::spawn_local;

use crate::api::use_api;
use crate::components::pagination_controls::PaginationControls;

/// Rounds folded into the supply snapshot.
const SUPPLY_WINDOW_ROUNDS: u64 = 144;
const ROUND_MINUTES: f64 = 10.0;
const VOTE_LIMIT: u32 = 100;
const VOTES_PER_PAGE: usize = 10;

fn status_class(status: VoteStatus) -> &'static str {
    match status {
        VoteStatus::Accepted => "chip status-pass",
        VoteStatus::Rejected => "chip status-fail",
        VoteStatus::Expired => "chip status-unknown",
        VoteStatus::Unknown => "chip",
    }
}

#[component]
fn IssuanceCard() -> impl IntoView {
    let years = years_since_launch(Utc::now());
    let stage = stage_for_elapsed(years);
    let upcoming = next_stage(years);

    view! {
        <section class="panel issuance-panel">
            <h3>"Issuance"</h3>
            <p>
                <span class="summary-total">{stage.label}</span>
                <span class="muted">{format!(" {:.2} years since launch", years)}</span>
            </p>
            <p>{format!(
                "{} CC per year, about {} per round",
                format_compact(stage.annual_mint),
                format_compact(mint_per_round(stage, ROUND_MINUTES))
            )}</p>
            <div class="summary-row">
                <span class="chip">{format!("SVs {:.0}%", stage.sv_share * 100.0)}</span>
                <span class="chip">{format!("Validators {:.0}%", stage.validator_share * 100.0)}</span>
                <span class="chip">{format!("Apps {:.0}%", stage.app_share * 100.0)}</span>
            </div>
            {upcoming.map(|next| view! {
                <p class="muted">{format!(
                    "Next: {} in {:.2} years",
                    next.label,
                    next.starts_at_years - years
                )}</p>
            })}
        </section>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();
    let supply = RwSignal::new(None::<SupplySnapshot>);
    let dso = RwSignal::new(None::<DsoInfo>);
    let votes = RwSignal::new(Vec::<VoteOutcome>::new());
    let error = RwSignal::new(None::<String>);
    let (page, set_page) = signal(1usize);

    let load = move || {
        error.set(None);
        spawn_local(async move {
            let latest = api
                .cached(QueryKey::from(["scan", "latest-round"]), |c| async move {
                    c.latest_round().await
                })
                .await;
            match latest {
                Ok(latest) => {
                    let end = latest.round;
                    let start = end.saturating_sub(SUPPLY_WINDOW_ROUNDS - 1);
                    let key = QueryKey::new(["scan".to_string(), "round-totals".to_string(), start.to_string(), end.to_string()]);
                    match api
                        .cached::<Vec<RoundTotals>, _, _>(key, |c| async move {
                            c.round_totals(start, end).await
                        })
                        .await
                    {
                        Ok(rounds) => supply.set(SupplySnapshot::from_rounds(&rounds)),
                        Err(e) => error.set(Some(format!("Supply unavailable: {}", e))),
                    }
                }
                Err(e) => error.set(Some(format!("Latest round unavailable: {}", e))),
            }
        });

        spawn_local(async move {
            match api
                .cached(QueryKey::from(["scan", "dso"]), |c| async move { c.dso_info().await })
                .await
            {
                Ok(info) => dso.set(Some(info)),
                Err(e) => error.set(Some(format!("DSO info unavailable: {}", e))),
            }
        });

        spawn_local(async move {
            match api
                .cached(QueryKey::from(["scan", "vote-results"]), |c| async move {
                    c.vote_results(VOTE_LIMIT).await
                })
                .await
            {
                Ok(list) => {
                    votes.set(list);
                    set_page.set(1);
                }
                Err(e) => error.set(Some(format!("Vote results unavailable: {}", e))),
            }
        });
    };

    Effect::new(move |_| load());

    let refresh = move |_| {
        api.invalidate_prefix(&["scan"]);
        load();
    };

    let pagination = Signal::derive(move || {
        Pagination::new(votes.with(|v| v.len()), VOTES_PER_PAGE, page.get())
    });

    view! {
        <div class="page dashboard-page">
            <div class="page-header">
                <h2>"Network"</h2>
                <button class="btn btn-secondary" on:click=refresh>"Refresh"</button>
            </div>

            <Show when=move || error.get().is_some()>
                <p class="status-text status-error">{move || error.get().unwrap_or_default()}</p>
            </Show>

            <div class="card-grid">
                <section class="panel supply-panel">
                    <h3>"Supply"</h3>
                    {move || match supply.get() {
                        None => view! { <p class="muted">"Loading..."</p> }.into_any(),
                        Some(s) => view! {
                            <p class="summary-total">{format!("{} CC", format_compact(s.total_supply))}</p>
                            <p class="muted">{format!("Rounds {} to {}", s.first_round, s.last_round)}</p>
                            <div class="summary-row">
                                <span class="chip">{format!("Minted {}", format_compact(s.minted))}</span>
                                <span class="chip">{format!("Burned {}", format_compact(s.burned))}</span>
                                <span class="chip">{format!("Net {}", format_compact(s.net_change))}</span>
                                <span class="chip">{format!("Burn ratio {:.1}%", s.burn_ratio_percent())}</span>
                            </div>
                        }.into_any(),
                    }}
                </section>

                <IssuanceCard />

                <section class="panel dso-panel">
                    <h3>"Super Validators"</h3>
                    {move || dso.get().map(|d| view! {
                        <p class="summary-total">{d.sv_count()}</p>
                        <p class="muted">{format!("Voting threshold {}", d.voting_threshold)}</p>
                        <p class="mono">{d.dso_party_id}</p>
                    })}
                </section>
            </div>

            <section class="panel votes-panel">
                <h3>"Vote Results"</h3>
                {move || {
                    let p = pagination.get();
                    let rows = votes.with(|v| p.slice(v).to_vec());
                    if rows.is_empty() {
                        return view! { <p class="empty">"No vote results."</p> }.into_any();
                    }
                    view! {
                        <table class="data-table">
                            <thead>
                                <tr><th>"Action"</th><th>"Requester"</th><th>"Votes"</th><th>"Outcome"</th><th>"Completed"</th></tr>
                            </thead>
                            <tbody>
                                {rows.into_iter().map(|v| {
                                    let votes_label = format!("{} for, {} against, {} abstained", v.accepted, v.rejected, v.abstained);
                                    view! {
                                        <tr>
                                            <td>{v.action.clone()}</td>
                                            <td class="mono">{v.requester.clone()}</td>
                                            <td>{votes_label}</td>
                                            <td><span class={status_class(v.status)}>{format!("{:?}", v.status)}</span></td>
                                            <td>{v.completed_at.clone().unwrap_or_default()}</td>
                                        </tr>
                                    }
                                }).collect::<Vec<_>>()}
                            </tbody>
                        </table>
                    }.into_any()
                }}
                <PaginationControls pagination on_page_change={Callback::new(move |p| set_page.set(p))} />
            </section>
        </div>
    }
}
