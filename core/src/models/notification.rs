use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{now_timestamp, Timestamped};
use crate::db::schema::{Record, Table};
use crate::errors::Result;

pub const DEFAULT_ICON: &str = "info";
pub const DEFAULT_COLOR: &str = "primary";

/// Caller supplied fields for a new notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationParams {
    pub app_title: String,
    pub heading: String,
    pub message: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub created_at: String,
    pub app_title: String,
    pub heading: String,
    pub message: String,
    pub icon: String,
    pub color: String,
}

impl Notification {
    pub fn new(params: NotificationParams) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            created_at: now_timestamp()?,
            app_title: params.app_title,
            heading: params.heading,
            message: params.message,
            icon: params
                .icon
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
            color: params
                .color
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        })
    }
}

impl Timestamped for Notification {
    fn created_at(&self) -> &str {
        &self.created_at
    }
}

impl Record for Notification {
    const TABLE: Table = Table::Notifications;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "app_title",
        "heading",
        "message",
        "icon",
        "color",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::Text(self.id.clone()),
            Value::Text(self.created_at.clone()),
            Value::Text(self.app_title.clone()),
            Value::Text(self.heading.clone()),
            Value::Text(self.message.clone()),
            Value::Text(self.icon.clone()),
            Value::Text(self.color.clone()),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Option<Self>> {
        Ok(Some(Notification {
            id: row.get(0)?,
            created_at: row.get(1)?,
            app_title: row.get(2)?,
            heading: row.get(3)?,
            message: row.get(4)?,
            icon: row.get(5)?,
            color: row.get(6)?,
        }))
    }
}
