pub mod duration;
pub mod log_entry;
pub mod notification;
pub mod setting;

pub use duration::Duration;
pub use log_entry::{LogEntry, LogLevel};
pub use notification::{Notification, NotificationParams};
pub use setting::{Setting, SettingId, SettingValue};

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::errors::Result;

/// Records stamped with a creation time.
pub trait Timestamped {
    fn created_at(&self) -> &str;
}

/// Render `at` as a fixed-width UTC stamp with millisecond precision, so
/// stored values also sort correctly as text.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    Ok(at.to_offset(UtcOffset::UTC).format(format)?)
}

/// Current UTC time in the format every new `created_at` is written in.
pub fn now_timestamp() -> Result<String> {
    format_timestamp(OffsetDateTime::now_utc())
}

/// Parse a stored `created_at`. Any RFC 3339 or ISO 8601 offset is accepted.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(raw, &Iso8601::DEFAULT))
        .ok()
}
