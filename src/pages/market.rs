use leptos::prelude::*;
use scanton_core::amount::format_compact;
use scanton_core::api::market::{change_percent, Candle};
use scanton_core::cache::QueryKey;
use scanton_core::task::{intervals, PollState};
use wasm_bindgen_futures::spawn_local;

use crate::api::use_api;
use crate::components::price_alerts::PriceAlertsPanel;
use crate::polling::use_interval;

const INSTRUMENT: &str = "cc-usdt";
/// (interval, bars) pairs offered in the range picker.
const RANGES: [(&str, u32); 3] = [("15m", 96), ("1h", 48), ("1d", 30)];

#[component]
pub fn MarketPage() -> impl IntoView {
    let api = use_api();
    let candles = RwSignal::new(Vec::<Candle>::new());
    let poll = RwSignal::new(PollState::default());
    let (interval, set_range) = signal(RANGES[1].0.to_string());

    // A tick waits for the outstanding request; a range switch supersedes it
    let fetch = move |supersede: bool| {
        let generation = if supersede {
            poll.try_update(|p| p.restart())
        } else {
            poll.try_update(|p| p.begin().then(|| p.generation())).flatten()
        };
        let Some(generation) = generation else { return };
        let interval = interval.get_untracked();
        let limit = RANGES
            .iter()
            .find(|(i, _)| *i == interval)
            .map(|(_, n)| *n)
            .unwrap_or(RANGES[1].1);
        spawn_local(async move {
            let key = QueryKey::from(["market", "candles", INSTRUMENT, interval.as_str()]);
            let result = api
                .cached(key, |c| async move { c.candles(INSTRUMENT, &interval, limit).await })
                .await;
            let current = poll
                .try_update(|p| p.finish_if_current(generation, &result))
                .unwrap_or(false);
            if !current {
                return;
            }
            if let Ok(list) = result {
                candles.set(list);
            }
        });
    };

    // Ticks bypass the cache; switching ranges reuses it
    use_interval(intervals::PRICE_FEED_MS, move || {
        api.invalidate_prefix(&["market"]);
        fetch(false);
    });

    let latest = Signal::derive(move || candles.with(|c| c.last().map(|bar| bar.close)));

    view! {
        <div class="page market-page">
            <div class="page-header">
                <h2>"CC Market"</h2>
                <select class="input" on:change=move |ev| {
                    set_range.set(event_target_value(&ev));
                    fetch(true);
                }>
                    {RANGES.into_iter().map(|(i, _)| view! {
                        <option value=i selected=move || interval.get() == i>{i}</option>
                    }).collect::<Vec<_>>()}
                </select>
            </div>

            {move || {
                if poll.with(|p| p.is_unavailable()) {
                    let reason = poll.with(|p| p.last_error().unwrap_or_default().to_string());
                    return view! {
                        <div class="card card-error">
                            <p>"Price feed unavailable."</p>
                            <p class="muted">{reason}</p>
                        </div>
                    }.into_any();
                }
                let bars = candles.get();
                let Some(last) = bars.last().cloned() else {
                    return view! { <p class="muted">"Loading..."</p> }.into_any();
                };
                let change = change_percent(&bars);
                let high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
                let low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
                let volume: f64 = bars.iter().map(|b| b.volume).sum();
                view! {
                    <section class="panel price-panel">
                        <p class="summary-total">{format!("${:.4}", last.close)}</p>
                        {change.map(|c| view! {
                            <p class={if c >= 0.0 { "delta-up" } else { "delta-down" }}>
                                {format!("{:+.2}% over {} bars", c, bars.len())}
                            </p>
                        })}
                        <div class="summary-row">
                            <span class="chip">{format!("High {:.4}", high)}</span>
                            <span class="chip">{format!("Low {:.4}", low)}</span>
                            <span class="chip">{format!("Volume {}", format_compact(volume))}</span>
                        </div>
                    </section>
                }.into_any()
            }}

            <PriceAlertsPanel price=latest />
        </div>
    }
}
