pub mod error_boundary;
pub mod evaluation_history;
pub mod gap_recovery_panel;
pub mod golden_set_panel;
pub mod learn_from_corrections_panel;
pub mod pagination_controls;
pub mod price_alerts;
pub mod shard_progress_panel;
pub mod sidebar;
pub mod status_badge;
