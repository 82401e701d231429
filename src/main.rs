mod api;
mod app;
mod components;
mod logging;
mod pages;
mod polling;
mod storage;

use app::App;
use components::error_boundary::install_panic_fallback;

fn main() {
    logging::init();
    install_panic_fallback(None);
    leptos::mount::mount_to_body(App);
}
