// Library for tests and demos to access modules

pub mod aggregation_runner;
pub mod backfill;
pub mod config;
pub mod dashboard;
pub mod document_store;
pub mod error;
pub mod metrics;
pub mod models;
pub mod snapshot_store;
pub mod time_window;
