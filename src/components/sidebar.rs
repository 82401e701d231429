use leptos::prelude::*;

#[component]
pub fn Sidebar() -> impl IntoView {
    view! {
        <nav class="sidebar">
            <div class="sidebar-header">
                <h1 class="sidebar-title">"SCANTON"</h1>
                <p class="sidebar-subtitle">"Canton Network Analytics"</p>
            </div>
            <ul class="nav-list">
                <li class="nav-item">
                    <a href="/" class="nav-link">"Network"</a>
                </li>
                <li class="nav-item">
                    <a href="/governance" class="nav-link">"Governance"</a>
                </li>
                <li class="nav-item">
                    <a href="/backfill" class="nav-link">"Backfill"</a>
                </li>
                <li class="nav-item">
                    <a href="/market" class="nav-link">"Market"</a>
                </li>
                <li class="nav-item">
                    <a href="/settings" class="nav-link">"Settings"</a>
                </li>
            </ul>
        </nav>
    }
}
