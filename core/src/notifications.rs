//! Notification records. Only creation, listing and explicit deletion by id
//! are offered; no retention or dismissal policy is applied here.

use crate::errors::Result;
use crate::models::{Notification, NotificationParams};
use crate::store::LocalStore;

pub async fn add_notification(
    store: &LocalStore,
    params: NotificationParams,
) -> Result<Notification> {
    let notification = Notification::new(params)?;
    store.put(notification.clone()).await?;
    Ok(notification)
}

pub async fn list_notifications(store: &LocalStore) -> Result<Vec<Notification>> {
    store.scan_newest_first().await
}

pub async fn delete_notification(store: &LocalStore, id: &str) -> Result<bool> {
    let deleted = store
        .bulk_delete::<Notification>(vec![id.to_string()])
        .await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::db::init_db;

    #[tokio::test]
    async fn notifications_are_only_removed_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_db(&StoreConfig::with_workspace_dir(dir.path())).unwrap();
        let store = LocalStore::new(pool, 4);

        let n = add_notification(
            &store,
            NotificationParams {
                app_title: "Lifestyle".into(),
                heading: "Reminder".into(),
                message: "Drink water".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(list_notifications(&store).await.unwrap(), vec![n.clone()]);

        assert!(delete_notification(&store, &n.id).await.unwrap());
        assert!(!delete_notification(&store, &n.id).await.unwrap());
        assert!(list_notifications(&store).await.unwrap().is_empty());
    }
}
