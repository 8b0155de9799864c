//! Entry points for the application embedding the record store.
//!
//! [`v1::LocalDatabase`] opens the SQLite file, runs the startup jobs on
//! request and hands out live views of logs, settings and notifications.

pub mod v1;
