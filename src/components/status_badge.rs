use leptos::prelude::*;
use scanton_core::api::backfill::ShardStatus;

/// Traffic-light state for a monitored service or shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Good,
    Busy,
    Bad,
    Unknown,
}

impl From<ShardStatus> for Health {
    fn from(status: ShardStatus) -> Self {
        match status {
            ShardStatus::Completed => Health::Good,
            ShardStatus::Running | ShardStatus::Pending => Health::Busy,
            ShardStatus::Failed => Health::Bad,
            ShardStatus::Unknown => Health::Unknown,
        }
    }
}

#[component]
pub fn StatusBadge(
    /// The label text, e.g. "Ingestion engine"
    #[prop(into)]
    label: String,
    status: Health,
    /// Optional detail text, e.g. a version or ETA
    #[prop(optional, into)]
    detail: Option<String>,
) -> impl IntoView {
    let (icon, class) = match status {
        Health::Good => ("\u{2713}", "status-badge status-pass"),
        Health::Busy => ("\u{21bb}", "status-badge status-busy"),
        Health::Bad => ("\u{2717}", "status-badge status-fail"),
        Health::Unknown => ("?", "status-badge status-unknown"),
    };

    view! {
        <div class="status-item">
            <span class=class>{icon}</span>
            <span class="status-name">{label}</span>
            <span class="status-detail">{detail.unwrap_or_default()}</span>
        </div>
    }
}
