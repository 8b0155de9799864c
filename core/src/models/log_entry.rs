use rusqlite::types::{Type, Value};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::{now_timestamp, Timestamped};
use crate::db::schema::{Record, Table};
use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Activity log row. `created_at` is kept as the stored string so that a
/// malformed timestamp survives reads untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub created_at: String,
    pub level: LogLevel,
    pub message: String,
    pub details: Option<JsonValue>,
}

impl LogEntry {
    pub fn new(
        level: LogLevel,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            created_at: now_timestamp()?,
            level,
            message: message.into(),
            details,
        })
    }
}

impl Timestamped for LogEntry {
    fn created_at(&self) -> &str {
        &self.created_at
    }
}

impl Record for LogEntry {
    const TABLE: Table = Table::Logs;
    const COLUMNS: &'static [&'static str] = &["id", "created_at", "level", "message", "details"];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Result<Vec<Value>> {
        let details = match &self.details {
            Some(v) => Value::Text(serde_json::to_string(v)?),
            None => Value::Null,
        };
        Ok(vec![
            Value::Text(self.id.clone()),
            Value::Text(self.created_at.clone()),
            Value::Text(self.level.as_str().to_string()),
            Value::Text(self.message.clone()),
            details,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Option<Self>> {
        let level_raw: String = row.get(2)?;
        let level = LogLevel::parse(&level_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("unknown log level {level_raw}").into(),
            )
        })?;
        let details_raw: Option<String> = row.get(4)?;
        let details = details_raw
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
        Ok(Some(LogEntry {
            id: row.get(0)?,
            created_at: row.get(1)?,
            level,
            message: row.get(3)?,
            details,
        }))
    }
}
