//! Default settings and first-write-wins seeding.

use crate::errors::Result;
use crate::models::{Duration, Setting, SettingId, SettingValue};
use crate::store::{self, LocalStore};

/// A recognised key paired with the value it gets when nothing is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDefault {
    pub id: SettingId,
    pub value: SettingValue,
}

pub fn default_settings() -> Vec<SettingDefault> {
    SettingId::ALL
        .into_iter()
        .map(|id| SettingDefault {
            id,
            value: default_value(id),
        })
        .collect()
}

pub fn default_value(id: SettingId) -> SettingValue {
    match id {
        SettingId::LoginDialog => SettingValue::Bool(false),
        SettingId::UserEmail => SettingValue::Text(String::new()),
        SettingId::ProjectUrl => SettingValue::Text(String::new()),
        SettingId::ProjectApiKey => SettingValue::Text(String::new()),
        SettingId::DarkMode => SettingValue::Bool(true),
        SettingId::ConsoleLogs => SettingValue::Bool(false),
        SettingId::InfoPopups => SettingValue::Bool(false),
        SettingId::LogRetentionDuration => SettingValue::Duration(Duration::SixMonths),
    }
}

/// Make sure every recognised key has a stored row without touching rows that
/// already exist. Returns how many keys were seeded.
///
/// Existing rows are read first and carried into the batch unchanged; the
/// batch itself only inserts keys that are still absent at commit time, so a
/// value the user changes between the two phases is not reverted.
pub async fn initialize(store: &LocalStore, recognized: &[SettingDefault]) -> Result<usize> {
    let ids: Vec<SettingId> = recognized.iter().map(|d| d.id).collect();
    let existing = store
        .read(move |conn| {
            let mut found = Vec::new();
            for id in ids {
                if let Some(setting) = store::get_record::<Setting>(conn, id.as_str())? {
                    found.push(setting);
                }
            }
            Ok(found)
        })
        .await?;

    let batch: Vec<Setting> = recognized
        .iter()
        .map(|default| {
            existing
                .iter()
                .find(|s| s.id == default.id)
                .cloned()
                .unwrap_or_else(|| Setting::new(default.id, default.value.clone()))
        })
        .collect();

    let seeded = store.bulk_insert_missing(batch).await?;
    if seeded > 0 {
        log::info!("seeded {seeded} default setting(s)");
    } else {
        log::debug!("settings already initialised");
    }
    Ok(seeded)
}

pub async fn initialize_settings(store: &LocalStore) -> Result<usize> {
    initialize(store, &default_settings()).await
}

pub async fn get_setting(store: &LocalStore, id: SettingId) -> Result<Option<Setting>> {
    store.get(id.as_str()).await
}

pub async fn set_setting(
    store: &LocalStore,
    id: SettingId,
    value: impl Into<SettingValue>,
) -> Result<Setting> {
    let setting = Setting::new(id, value);
    store.put(setting.clone()).await?;
    Ok(setting)
}

/// The configured log retention, or `None` when unset or not a duration label.
pub async fn retention_duration(store: &LocalStore) -> Result<Option<Duration>> {
    let setting = get_setting(store, SettingId::LogRetentionDuration).await?;
    Ok(setting.and_then(|s| s.value.as_duration()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::db::init_db;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_db(&StoreConfig::with_workspace_dir(dir.path())).unwrap();
        (dir, LocalStore::new(pool, 16))
    }

    #[test]
    fn every_recognised_key_has_a_default() {
        let defaults = default_settings();
        assert_eq!(defaults.len(), SettingId::ALL.len());
        assert_eq!(
            default_value(SettingId::LogRetentionDuration).as_duration(),
            Some(Duration::SixMonths)
        );
    }

    #[tokio::test]
    async fn empty_store_gets_all_defaults() {
        let (_dir, store) = store();
        assert_eq!(initialize_settings(&store).await.unwrap(), SettingId::ALL.len());
        for default in default_settings() {
            let stored = get_setting(&store, default.id).await.unwrap().unwrap();
            assert_eq!(stored.value, default.value);
        }
    }

    #[tokio::test]
    async fn user_values_survive_reinitialisation() {
        let (_dir, store) = store();
        initialize_settings(&store).await.unwrap();
        set_setting(&store, SettingId::DarkMode, false).await.unwrap();
        set_setting(&store, SettingId::UserEmail, "me@example.com")
            .await
            .unwrap();

        assert_eq!(initialize_settings(&store).await.unwrap(), 0);
        let dark = get_setting(&store, SettingId::DarkMode).await.unwrap().unwrap();
        assert_eq!(dark.value, SettingValue::Bool(false));
        let email = get_setting(&store, SettingId::UserEmail).await.unwrap().unwrap();
        assert_eq!(email.value, SettingValue::Text("me@example.com".into()));
        assert_eq!(store.scan_all::<Setting>().await.unwrap().len(), SettingId::ALL.len());
    }

    #[tokio::test]
    async fn changed_defaults_do_not_override_stored_values() {
        let (_dir, store) = store();
        initialize_settings(&store).await.unwrap();
        let newer = vec![SettingDefault {
            id: SettingId::LogRetentionDuration,
            value: SettingValue::Duration(Duration::OneYear),
        }];
        assert_eq!(initialize(&store, &newer).await.unwrap(), 0);
        assert_eq!(
            retention_duration(&store).await.unwrap(),
            Some(Duration::SixMonths)
        );
    }

    #[tokio::test]
    async fn missing_keys_are_reseeded() {
        let (_dir, store) = store();
        initialize_settings(&store).await.unwrap();
        store
            .bulk_delete::<Setting>(vec![SettingId::InfoPopups.as_str().to_string()])
            .await
            .unwrap();
        assert_eq!(initialize_settings(&store).await.unwrap(), 1);
        assert!(get_setting(&store, SettingId::InfoPopups).await.unwrap().is_some());
    }
}
