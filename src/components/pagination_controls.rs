use leptos::prelude::*;
use scanton_core::pagination::Pagination;

/// Previous/Next pager. Clicking reports `current ± 1`; the owner decides
/// what to load.
#[component]
pub fn PaginationControls(
    #[prop(into)] pagination: Signal<Pagination>,
    on_page_change: Callback<usize>,
) -> impl IntoView {
    view! {
        <div class="pagination">
            <button
                class="btn btn-small btn-secondary"
                disabled=move || !pagination.get().has_previous()
                on:click=move |_| {
                    if let Some(page) = pagination.get().previous() {
                        on_page_change.run(page);
                    }
                }
            >
                "Previous"
            </button>
            <span class="pagination-label">
                {move || {
                    let p = pagination.get();
                    format!("Page {} of {} ({})", p.current_page, p.total_pages(), p.range_label())
                }}
            </span>
            <button
                class="btn btn-small btn-secondary"
                disabled=move || !pagination.get().has_next()
                on:click=move |_| {
                    if let Some(page) = pagination.get().next() {
                        on_page_change.run(page);
                    }
                }
            >
                "Next"
            </button>
        </div>
    }
}
