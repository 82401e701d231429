use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::path;

use crate::api::ApiContext;
use crate::components::error_boundary::AppErrorBoundary;
use crate::components::sidebar::Sidebar;
use crate::pages::backfill::BackfillPage;
use crate::pages::dashboard::DashboardPage;
use crate::pages::governance::GovernancePage;
use crate::pages::market::MarketPage;
use crate::pages::settings::SettingsPage;

#[component]
pub fn App() -> impl IntoView {
    provide_context(ApiContext::from_environment());

    view! {
        <Router>
            <div class="app-layout">
                <Sidebar />
                <main class="content">
                    <AppErrorBoundary>
                        <Routes fallback=|| view! { <p>"Page not found"</p> }>
                            <Route path=path!("/") view=DashboardPage />
                            <Route path=path!("/governance") view=GovernancePage />
                            <Route path=path!("/backfill") view=BackfillPage />
                            <Route path=path!("/market") view=MarketPage />
                            <Route path=path!("/settings") view=SettingsPage />
                        </Routes>
                    </AppErrorBoundary>
                </main>
            </div>
        </Router>
    }
}
