//! Version 1 of the embedding API.
//!
//! Methods are thin wrappers over the store modules; they own no state
//! beyond the shared [`LocalStore`] and return plain records.

use serde::Serialize;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::db::schema::{self, Table};
use crate::db::{self, DbPool};
use crate::errors::Result;
use crate::live::LiveQuery;
use crate::models::{
    LogEntry, LogLevel, Notification, NotificationParams, Setting, SettingId, SettingValue,
};
use crate::store::{self as records, LocalStore};
use crate::{logging, notifications, retention, settings};

/// Handle the rest of the application holds on to.
#[derive(Clone)]
pub struct LocalDatabase {
    store: LocalStore,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaStatus {
    pub version: i64,
    pub tables: Vec<String>,
}

impl LocalDatabase {
    /// Open the database described by `config`, applying migrations.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let pool = db::init_db(config)?;
        Ok(Self::from_pool(pool, config.change_buffer))
    }

    pub fn from_pool(pool: DbPool, change_buffer: usize) -> Self {
        Self {
            store: LocalStore::new(pool, change_buffer),
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Seed every recognised setting that has no stored value.
    pub async fn initialize_settings(&self) -> Result<usize> {
        settings::initialize_settings(&self.store).await
    }

    /// Purge logs older than the configured retention.
    pub async fn sweep_expired_logs(&self) -> Result<usize> {
        retention::sweep_expired_logs(&self.store).await
    }

    /// Logs ordered by `created_at`, newest first, re-emitted on every change.
    pub fn live_logs(&self) -> LiveQuery<LogEntry> {
        LiveQuery::new(&self.store, Table::Logs, |conn| records::scan_newest_first(conn))
    }

    pub fn live_settings(&self) -> LiveQuery<Setting> {
        LiveQuery::new(&self.store, Table::Settings, |conn| records::scan_all(conn))
    }

    pub fn live_notifications(&self) -> LiveQuery<Notification> {
        LiveQuery::new(&self.store, Table::Notifications, |conn| {
            records::scan_newest_first(conn)
        })
    }

    pub async fn get_setting(&self, id: SettingId) -> Result<Option<Setting>> {
        settings::get_setting(&self.store, id).await
    }

    pub async fn set_setting(
        &self,
        id: SettingId,
        value: impl Into<SettingValue>,
    ) -> Result<Setting> {
        settings::set_setting(&self.store, id, value).await
    }

    pub async fn add_log(
        &self,
        level: LogLevel,
        message: &str,
        details: Option<Value>,
    ) -> Result<LogEntry> {
        logging::log_event(&self.store, level, message, details).await
    }

    pub async fn logs(&self) -> Result<Vec<LogEntry>> {
        self.store.scan_newest_first().await
    }

    /// Delete logs on explicit user request.
    pub async fn delete_logs(&self, ids: Vec<String>) -> Result<usize> {
        self.store.bulk_delete::<LogEntry>(ids).await
    }

    pub async fn add_notification(&self, params: NotificationParams) -> Result<Notification> {
        notifications::add_notification(&self.store, params).await
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        notifications::list_notifications(&self.store).await
    }

    pub async fn delete_notification(&self, id: &str) -> Result<bool> {
        notifications::delete_notification(&self.store, id).await
    }

    /// Inspect the SQLite catalog to confirm the database is reachable.
    pub async fn schema_status(&self) -> Result<SchemaStatus> {
        self.store
            .read(|conn| {
                Ok(SchemaStatus {
                    version: db::schema_version(conn)?,
                    tables: schema::table_names(conn)?,
                })
            })
            .await
    }
}
