use rusqlite::types::{Type, Value};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::Duration;
use crate::db::schema::{Record, Table};
use crate::errors::Result;

/// The only recognised setting keys. The string form is the stored primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingId {
    #[serde(rename = "Login Dialog")]
    LoginDialog,
    #[serde(rename = "User Email")]
    UserEmail,
    #[serde(rename = "Project URL")]
    ProjectUrl,
    #[serde(rename = "Project API Key")]
    ProjectApiKey,
    #[serde(rename = "Dark Mode")]
    DarkMode,
    #[serde(rename = "Console Logs")]
    ConsoleLogs,
    #[serde(rename = "Info Popups")]
    InfoPopups,
    #[serde(rename = "Log Retention Duration")]
    LogRetentionDuration,
}

impl SettingId {
    pub const ALL: [SettingId; 8] = [
        SettingId::LoginDialog,
        SettingId::UserEmail,
        SettingId::ProjectUrl,
        SettingId::ProjectApiKey,
        SettingId::DarkMode,
        SettingId::ConsoleLogs,
        SettingId::InfoPopups,
        SettingId::LogRetentionDuration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingId::LoginDialog => "Login Dialog",
            SettingId::UserEmail => "User Email",
            SettingId::ProjectUrl => "Project URL",
            SettingId::ProjectApiKey => "Project API Key",
            SettingId::DarkMode => "Dark Mode",
            SettingId::ConsoleLogs => "Console Logs",
            SettingId::InfoPopups => "Info Popups",
            SettingId::LogRetentionDuration => "Log Retention Duration",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == key)
    }
}

/// Stored setting value. Decoded on its own, a duration label is read as a
/// [`Duration`]; [`SettingValue::for_key`] settles the shape by setting key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Duration(Duration),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Only the retention key holds durations. Any other key keeps a label
    /// such as `"Forever"` as plain text.
    pub fn for_key(self, id: SettingId) -> Self {
        match (id, self) {
            (SettingId::LogRetentionDuration, SettingValue::Text(s)) => {
                match Duration::from_label(&s) {
                    Some(d) => SettingValue::Duration(d),
                    None => SettingValue::Text(s),
                }
            }
            (SettingId::LogRetentionDuration, value) => value,
            (_, SettingValue::Duration(d)) => SettingValue::Text(d.label().to_string()),
            (_, value) => value,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            SettingValue::Duration(d) => Some(*d),
            SettingValue::Text(s) => Duration::from_label(s),
            SettingValue::Bool(_) => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<Duration> for SettingValue {
    fn from(value: Duration) -> Self {
        SettingValue::Duration(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub id: SettingId,
    pub value: SettingValue,
}

impl Setting {
    pub fn new(id: SettingId, value: impl Into<SettingValue>) -> Self {
        Self {
            id,
            value: value.into().for_key(id),
        }
    }
}

impl Record for Setting {
    const TABLE: Table = Table::Settings;
    const COLUMNS: &'static [&'static str] = &["id", "value"];

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::Text(self.id.as_str().to_string()),
            Value::Text(serde_json::to_string(&self.value)?),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Option<Self>> {
        let key: String = row.get(0)?;
        let Some(id) = SettingId::parse(&key) else {
            return Ok(None);
        };
        let raw: String = row.get(1)?;
        let value: SettingValue = serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
        Ok(Some(Setting {
            id,
            value: value.for_key(id),
        }))
    }
}
