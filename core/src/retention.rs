//! Time-based purge of the activity log.
//!
//! A sweep reads the retention setting, scans every log row, and deletes the
//! rows whose age is strictly greater than the retention threshold in one
//! batch. Rows whose `created_at` does not parse are never eligible.

use time::OffsetDateTime;

use crate::errors::Result;
use crate::models::{parse_timestamp, Duration, LogEntry};
use crate::settings;
use crate::store::LocalStore;

/// Whether a row stamped `created_at` has outlived `retention` at `now`.
/// Future timestamps have negative age and are kept.
pub fn is_expired(created_at: &str, now: OffsetDateTime, retention: Duration) -> bool {
    let Some(created) = parse_timestamp(created_at) else {
        return false;
    };
    let age_ms = (now - created).whole_milliseconds();
    age_ms > i128::from(retention.threshold_ms())
}

pub fn expired_ids(logs: &[LogEntry], now: OffsetDateTime, retention: Duration) -> Vec<String> {
    logs.iter()
        .filter(|entry| {
            let expired = is_expired(&entry.created_at, now, retention);
            if !expired && parse_timestamp(&entry.created_at).is_none() {
                log::debug!("keeping log {} with unparsable timestamp", entry.id);
            }
            expired
        })
        .map(|entry| entry.id.clone())
        .collect()
}

pub async fn sweep_expired_logs(store: &LocalStore) -> Result<usize> {
    sweep_expired_logs_at(store, OffsetDateTime::now_utc()).await
}

/// Delete every log older than the configured retention as of `now` and
/// return how many rows were removed.
pub async fn sweep_expired_logs_at(store: &LocalStore, now: OffsetDateTime) -> Result<usize> {
    let retention = match settings::retention_duration(store).await? {
        Some(d) if !d.is_forever() => d,
        _ => {
            log::debug!("log retention is unset or forever; nothing to purge");
            return Ok(0);
        }
    };

    let logs: Vec<LogEntry> = store.scan_all().await?;
    let expired = expired_ids(&logs, now, retention);
    if expired.is_empty() {
        return Ok(0);
    }

    let deleted = store.bulk_delete::<LogEntry>(expired).await?;
    log::info!("purged {deleted} log(s) older than {}", retention.label());
    Ok(deleted)
}
