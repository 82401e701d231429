pub mod backfill;
pub mod dashboard;
pub mod governance;
pub mod market;
pub mod settings;
