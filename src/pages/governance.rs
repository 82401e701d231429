use leptos::prelude::*;
use scanton_core::lifecycle::{LifecycleStage, StageInference};
use wasm_bindgen_futures::spawn_local;

use crate::api::use_api;
use crate::components::golden_set_panel::GoldenSetPanel;
use crate::components::learn_from_corrections_panel::LearnFromCorrectionsPanel;

/// Paste an announcement and see which lifecycle stage the classifier picks.
#[component]
fn StageTester() -> impl IntoView {
    let api = use_api();
    let (text, set_text) = signal(String::new());
    let (checking, set_checking) = signal(false);
    let result = RwSignal::new(None::<Result<StageInference, String>>);

    let classify = move |_| {
        let client = match api.client() {
            Ok(client) => client,
            Err(e) => {
                result.set(Some(Err(e.to_string())));
                return;
            }
        };
        let input = text.get_untracked();
        set_checking.set(true);
        spawn_local(async move {
            result.set(Some(client.infer_stage(&input).await.map_err(|e| e.to_string())));
            set_checking.set(false);
        });
    };

    view! {
        <section class="panel stage-tester">
            <h3>"Stage Classifier"</h3>
            <p class="muted">
                {LifecycleStage::ALL.iter().map(|s| s.label()).collect::<Vec<_>>().join(", ")}
            </p>
            <textarea
                class="input"
                rows="4"
                placeholder="Subject or body text"
                prop:value=move || text.get()
                on:input=move |ev| set_text.set(event_target_value(&ev))
            ></textarea>
            <button class="btn btn-primary" disabled=move || checking.get() on:click=classify>
                {move || if checking.get() { "Classifying..." } else { "Classify" }}
            </button>
            {move || result.get().map(|r| match r {
                Ok(inference) => view! {
                    <p>
                        <span class="chip">{inference.stage.label()}</span>
                        <span class="muted">{format!(" {:.0}% confidence", inference.confidence * 100.0)}</span>
                        {inference.stage.is_terminal().then(|| view! { <span class="muted">" (final stage)"</span> })}
                    </p>
                }.into_any(),
                Err(e) => view! { <p class="status-text status-error">{e}</p> }.into_any(),
            })}
        </section>
    }
}

#[component]
pub fn GovernancePage() -> impl IntoView {
    view! {
        <div class="page governance-page">
            <h2>"Governance Classifier"</h2>
            <p class="page-description">
                "Curate the golden set, track evaluation accuracy, and review learned pattern changes."
            </p>
            <GoldenSetPanel />
            <LearnFromCorrectionsPanel />
            <StageTester />
        </div>
    }
}
