use leptos::prelude::*;
use scanton_core::alerts::{AlertDirection, PriceAlerts};
use tracing::warn;

use crate::api::now_ms;
use crate::storage::browser_store;

fn persist(book: &PriceAlerts) -> Option<String> {
    book.save(&*browser_store()).err().map(|e| {
        warn!("Failed to save price alerts: {}", e);
        e.to_string()
    })
}

/// Local price alerts checked against the latest close shown on the page.
#[component]
pub fn PriceAlertsPanel(#[prop(into)] price: Signal<Option<f64>>) -> impl IntoView {
    let book = RwSignal::new(PriceAlerts::load(&*browser_store()));
    let notice = RwSignal::new(None::<String>);
    let (target, set_target) = signal(String::new());
    let (direction, set_direction) = signal(AlertDirection::Above);

    // Fire alerts whenever a new price arrives
    Effect::new(move |_| {
        let Some(latest) = price.get() else { return };
        let mut next = book.get_untracked();
        let fired = next.evaluate(latest, now_ms());
        if fired.is_empty() {
            return;
        }
        let message = fired
            .iter()
            .map(|a| format!("CC is {} {:.4}", a.direction.label(), a.target_price))
            .collect::<Vec<_>>()
            .join("; ");
        notice.set(Some(persist(&next).unwrap_or(format!("Alert: {}", message))));
        book.set(next);
    });

    let add = move |_| {
        let parsed = target.get_untracked().trim().parse::<f64>().unwrap_or(f64::NAN);
        let mut next = book.get_untracked();
        match next.add(parsed, direction.get_untracked(), now_ms()) {
            Ok(_) => {
                notice.set(persist(&next));
                book.set(next);
                set_target.set(String::new());
            }
            Err(e) => notice.set(Some(e.to_string())),
        }
    };

    let remove = move |id: String| {
        let mut next = book.get_untracked();
        if next.remove(&id) {
            notice.set(persist(&next));
            book.set(next);
        }
    };

    view! {
        <section class="panel alerts-panel">
            <h3>"Price Alerts"</h3>
            <div class="input-row">
                <input class="input input-narrow" type="number" step="any" min="0" placeholder="Target price"
                    prop:value=move || target.get()
                    on:input=move |ev| set_target.set(event_target_value(&ev)) />
                <select class="input" on:change=move |ev| {
                    let value = event_target_value(&ev);
                    set_direction.set(if value == "below" { AlertDirection::Below } else { AlertDirection::Above });
                }>
                    <option value="above" selected=move || direction.get() == AlertDirection::Above>"Above"</option>
                    <option value="below" selected=move || direction.get() == AlertDirection::Below>"Below"</option>
                </select>
                <button class="btn btn-primary" on:click=add>"Add Alert"</button>
            </div>

            <Show when=move || notice.get().is_some()>
                <p class="notice">{move || notice.get().unwrap_or_default()}</p>
            </Show>

            {move || {
                let alerts = book.with(|b| b.alerts().to_vec());
                if alerts.is_empty() {
                    return view! { <p class="empty">"No alerts set."</p> }.into_any();
                }
                view! {
                    <ul class="alert-list">
                        {alerts.into_iter().map(|a| {
                            let id = a.id.clone();
                            let state = if a.triggered { "triggered" } else { "active" };
                            view! {
                                <li class=format!("alert-item alert-{}", state)>
                                    <span>{format!("{} {:.4}", a.direction.label(), a.target_price)}</span>
                                    <span class="muted">{format!(" {}", state)}</span>
                                    <button class="btn btn-small btn-dismiss" on:click=move |_| remove(id.clone())>
                                        "Remove"
                                    </button>
                                </li>
                            }
                        }).collect::<Vec<_>>()}
                    </ul>
                }.into_any()
            }}
        </section>
    }
}
