//! Core library for the Lifestyle on-device record store.
//!
//! Each module keeps one responsibility so the boundaries stay obvious:
//! - [`api`] exposes the versioned surface the embedding application calls.
//! - [`config`] resolves where the database lives and how it is pooled.
//! - [`db`] opens the SQLite pool and owns the table catalogue and migrations.
//! - [`errors`] keeps the central error catalogue with human friendly metadata.
//! - [`live`] turns table changes into push-updated snapshots.
//! - [`logging`] writes activity entries to the logs table.
//! - [`models`] holds the record shapes stored in each table.
//! - [`notifications`] creates, lists and deletes notification records.
//! - [`retention`] purges logs that outlived the retention setting.
//! - [`settings`] seeds and reads configuration values.
//! - [`store`] implements table-level reads, batched writes and change events.
//! - [`workers`] runs the one-shot startup jobs.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod live;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod retention;
pub mod settings;
pub mod store;
pub mod workers;

pub use api::v1::LocalDatabase;
pub use errors::{Result, StoreError};
