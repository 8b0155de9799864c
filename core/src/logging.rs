use serde_json::Value;

use crate::errors::{Result, StoreError};
use crate::models::{LogEntry, LogLevel};
use crate::store::LocalStore;

/// Record an activity log row and mirror it to the `log` facade.
pub async fn log_event(
    store: &LocalStore,
    level: LogLevel,
    message: &str,
    details: Option<Value>,
) -> Result<LogEntry> {
    let entry = LogEntry::new(level, message, details)?;
    log::log!(target: "lifestyle::activity", log::Level::from(level), "{message}");
    store.put(entry.clone()).await?;
    Ok(entry)
}

/// Record a failure surfaced by the store, keeping its catalogue code.
pub async fn log_error(store: &LocalStore, context: &str, err: &StoreError) -> Result<LogEntry> {
    log_event(
        store,
        LogLevel::Error,
        context,
        Some(serde_json::json!({
            "code": err.code(),
            "explain": err.explain(),
            "error": err.to_string(),
        })),
    )
    .await
}
