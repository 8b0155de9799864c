//! Table-level record store over the SQLite pool.
//!
//! Synchronous helpers take a `&Connection` so they can run inside any
//! transaction; [`LocalStore`] wraps them in `spawn_blocking` and publishes a
//! [`TableChange`] on the table's broadcast channel after each commit. The
//! event is sent from the blocking task itself, so a caller that stops
//! waiting cannot leave a committed write unannounced.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tokio::sync::broadcast;
use tokio::task::spawn_blocking;

use crate::db::schema::{Record, Table};
use crate::db::DbPool;
use crate::errors::{Result, StoreError};
use crate::models::{parse_timestamp, Timestamped};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn sql(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Put,
    Delete,
}

/// Published after a batch touching `rows` rows of `table` has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    pub table: Table,
    pub kind: ChangeKind,
    pub rows: usize,
}

/// One broadcast channel per table.
struct ChangeFeed {
    senders: HashMap<Table, broadcast::Sender<TableChange>>,
}

impl ChangeFeed {
    fn new(capacity: usize) -> Self {
        let senders = Table::ALL
            .into_iter()
            .map(|table| (table, broadcast::channel(capacity.max(1)).0))
            .collect();
        Self { senders }
    }

    fn subscribe(&self, table: Table) -> broadcast::Receiver<TableChange> {
        self.senders[&table].subscribe()
    }

    fn publish(&self, change: TableChange) {
        // No receivers is the normal case outside live views.
        let _ = self.senders[&change.table].send(change);
    }
}

#[derive(Clone)]
pub struct LocalStore {
    pool: DbPool,
    feed: Arc<ChangeFeed>,
}

impl LocalStore {
    pub fn new(pool: DbPool, change_buffer: usize) -> Self {
        Self {
            pool,
            feed: Arc::new(ChangeFeed::new(change_buffer)),
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Run `f` on a pooled connection off the async runtime.
    pub async fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let pool = self.pool.clone();
        spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await?
    }

    /// Run `f` inside one transaction and announce the change once it commits.
    /// `f` returns the number of rows it touched; zero publishes nothing.
    async fn write<F>(&self, table: Table, kind: ChangeKind, f: F) -> Result<usize>
    where
        F: FnOnce(&Connection) -> Result<usize> + Send + 'static,
    {
        let pool = self.pool.clone();
        let feed = Arc::clone(&self.feed);
        spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            let rows = f(&tx)?;
            tx.commit()?;
            if rows > 0 {
                feed.publish(TableChange { table, kind, rows });
            }
            Ok::<_, StoreError>(rows)
        })
        .await?
    }

    pub fn watch(&self, table: Table) -> broadcast::Receiver<TableChange> {
        self.feed.subscribe(table)
    }

    pub async fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
        let id = id.to_string();
        self.read(move |conn| get_record::<T>(conn, &id)).await
    }

    pub async fn put<T: Record>(&self, record: T) -> Result<()> {
        log::debug!("put {} {}", T::TABLE.name(), record.id());
        self.write(T::TABLE, ChangeKind::Put, move |conn| {
            upsert_records(conn, std::slice::from_ref(&record))
        })
        .await?;
        Ok(())
    }

    pub async fn bulk_put<T: Record>(&self, records: Vec<T>) -> Result<usize> {
        self.write(T::TABLE, ChangeKind::Put, move |conn| {
            upsert_records(conn, &records)
        })
        .await
    }

    /// Insert only the records whose key is not yet stored.
    pub async fn bulk_insert_missing<T: Record>(&self, records: Vec<T>) -> Result<usize> {
        self.write(T::TABLE, ChangeKind::Put, move |conn| {
            insert_missing_records(conn, &records)
        })
        .await
    }

    pub async fn bulk_delete<T: Record>(&self, ids: Vec<String>) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.write(T::TABLE, ChangeKind::Delete, move |conn| {
            delete_records::<T>(conn, &ids)
        })
        .await
    }

    pub async fn scan_all<T: Record>(&self) -> Result<Vec<T>> {
        self.read(|conn| scan_all::<T>(conn)).await
    }

    pub async fn scan_ordered<T: Record>(
        &self,
        index: &'static str,
        direction: Direction,
    ) -> Result<Vec<T>> {
        self.read(move |conn| scan_ordered::<T>(conn, index, direction))
            .await
    }

    pub async fn scan_newest_first<T: Record + Timestamped>(&self) -> Result<Vec<T>> {
        self.read(|conn| scan_newest_first::<T>(conn)).await
    }
}

fn select_sql<T: Record>() -> String {
    format!("SELECT {} FROM {}", T::COLUMNS.join(", "), T::TABLE.name())
}

fn collect_rows<T: Record>(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> Result<Vec<T>> {
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    let mut records = Vec::new();
    for row in rows {
        if let Some(record) = row? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn get_record<T: Record>(conn: &Connection, id: &str) -> Result<Option<T>> {
    let spec = T::TABLE.spec();
    let sql = format!("{} WHERE {} = ?1", select_sql::<T>(), spec.primary_key);
    let record = conn
        .query_row(&sql, [id], |row| T::from_row(row))
        .optional()?;
    Ok(record.flatten())
}

pub fn scan_all<T: Record>(conn: &Connection) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(&select_sql::<T>())?;
    collect_rows(&mut stmt, [])
}

/// Scan ordered by a declared secondary index, ties broken by primary key in
/// the same direction.
pub fn scan_ordered<T: Record>(
    conn: &Connection,
    index: &'static str,
    direction: Direction,
) -> Result<Vec<T>> {
    let spec = T::TABLE.spec();
    if !T::TABLE.has_index(index) {
        return Err(StoreError::UnknownIndex {
            table: spec.name,
            field: index,
        });
    }
    let dir = direction.sql();
    let sql = format!(
        "{} ORDER BY {index} {dir}, {} {dir}",
        select_sql::<T>(),
        spec.primary_key
    );
    let mut stmt = conn.prepare(&sql)?;
    collect_rows(&mut stmt, [])
}

/// Every row ordered by the instant its `created_at` denotes, newest first.
/// Stamps written with another offset or precision still order correctly;
/// unparsable stamps go last. Equal instants keep the descending id order.
pub fn scan_newest_first<T: Record + Timestamped>(conn: &Connection) -> Result<Vec<T>> {
    let mut records = scan_ordered::<T>(conn, "created_at", Direction::Descending)?;
    records.sort_by_cached_key(|record| Reverse(parse_timestamp(record.created_at())));
    Ok(records)
}

fn insert_sql<T: Record>(on_conflict: &str) -> String {
    let placeholders = (1..=T::COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders}) ON CONFLICT({}) {on_conflict}",
        T::TABLE.name(),
        T::COLUMNS.join(", "),
        T::TABLE.spec().primary_key,
    )
}

pub fn upsert_records<T: Record>(conn: &Connection, records: &[T]) -> Result<usize> {
    let updates = T::COLUMNS[1..]
        .iter()
        .map(|col| format!("{col} = excluded.{col}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&insert_sql::<T>(&format!("DO UPDATE SET {updates}")))?;
    let mut touched = 0;
    for record in records {
        touched += stmt.execute(params_from_iter(record.values()?))?;
    }
    Ok(touched)
}

pub fn insert_missing_records<T: Record>(conn: &Connection, records: &[T]) -> Result<usize> {
    let mut stmt = conn.prepare(&insert_sql::<T>("DO NOTHING"))?;
    let mut inserted = 0;
    for record in records {
        inserted += stmt.execute(params_from_iter(record.values()?))?;
    }
    Ok(inserted)
}

pub fn delete_records<T: Record>(conn: &Connection, ids: &[String]) -> Result<usize> {
    let spec = T::TABLE.spec();
    let mut stmt = conn.prepare(&format!(
        "DELETE FROM {} WHERE {} = ?1",
        spec.name, spec.primary_key
    ))?;
    let mut deleted = 0;
    for id in ids {
        deleted += stmt.execute([id])?;
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::db::init_db;
    use crate::db::schema::apply_migrations;
    use crate::models::{LogEntry, LogLevel, Setting, SettingId};
    use futures_util::FutureExt;

    fn migrated() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    fn log_at(id: &str, created_at: &str) -> LogEntry {
        LogEntry {
            id: id.into(),
            created_at: created_at.into(),
            level: LogLevel::Info,
            message: format!("log {id}"),
            details: None,
        }
    }

    #[test]
    fn upsert_replaces_and_insert_missing_keeps() {
        let conn = migrated();
        upsert_records(&conn, &[Setting::new(SettingId::DarkMode, true)]).unwrap();
        upsert_records(&conn, &[Setting::new(SettingId::DarkMode, false)]).unwrap();
        let inserted =
            insert_missing_records(&conn, &[Setting::new(SettingId::DarkMode, true)]).unwrap();
        assert_eq!(inserted, 0);
        let stored: Setting = get_record(&conn, "Dark Mode").unwrap().unwrap();
        assert_eq!(stored.value.as_bool(), Some(false));
    }

    #[test]
    fn ordered_scan_is_newest_first() {
        let conn = migrated();
        upsert_records(
            &conn,
            &[
                log_at("a", "2024-01-01T00:00:00Z"),
                log_at("c", "2024-03-01T00:00:00Z"),
                log_at("b", "2024-02-01T00:00:00Z"),
            ],
        )
        .unwrap();
        let logs: Vec<LogEntry> =
            scan_ordered(&conn, "created_at", Direction::Descending).unwrap();
        let ids: Vec<_> = logs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn newest_first_orders_by_instant_not_text() {
        let conn = migrated();
        upsert_records(
            &conn,
            &[
                log_at("older", "2024-06-01T12:30:00+02:00"),
                log_at("newer", "2024-06-01T11:00:00Z"),
                log_at("s0", "2024-07-01T00:00:00Z"),
                log_at("s5", "2024-07-01T00:00:00.5Z"),
                log_at("s51", "2024-07-01T00:00:00.51Z"),
                log_at("junk", "not-a-date"),
            ],
        )
        .unwrap();
        let logs: Vec<LogEntry> = scan_newest_first(&conn).unwrap();
        let ids: Vec<_> = logs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["s51", "s5", "s0", "newer", "older", "junk"]);
    }

    #[test]
    fn ordered_scan_rejects_unindexed_field() {
        let conn = migrated();
        let err = scan_ordered::<Setting>(&conn, "created_at", Direction::Ascending).unwrap_err();
        assert!(matches!(err, StoreError::UnknownIndex { table: "settings", .. }));
    }

    #[test]
    fn delete_counts_only_existing_rows() {
        let conn = migrated();
        upsert_records(&conn, &[log_at("a", "2024-01-01T00:00:00Z")]).unwrap();
        let deleted =
            delete_records::<LogEntry>(&conn, &["a".to_string(), "missing".to_string()]).unwrap();
        assert_eq!(deleted, 1);
        assert!(scan_all::<LogEntry>(&conn).unwrap().is_empty());
    }

    #[test]
    fn retired_setting_keys_are_skipped_on_read() {
        let conn = migrated();
        conn.execute(
            "INSERT INTO settings (id, value) VALUES ('Legacy Theme', '\"blue\"')",
            [],
        )
        .unwrap();
        upsert_records(&conn, &[Setting::new(SettingId::InfoPopups, false)]).unwrap();
        let settings: Vec<Setting> = scan_all(&conn).unwrap();
        assert_eq!(settings.len(), 1);
        assert!(get_record::<Setting>(&conn, "Legacy Theme").unwrap().is_none());
    }

    #[tokio::test]
    async fn abandoned_write_still_announces_its_commit() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_db(&StoreConfig::with_workspace_dir(dir.path())).unwrap();
        let store = LocalStore::new(pool, 4);
        let mut changes = store.watch(Table::Logs);

        // Poll once so the blocking task starts, then drop the future.
        let _ = store.put(log_at("a", "2024-01-01T00:00:00Z")).now_or_never();

        let change = tokio::time::timeout(std::time::Duration::from_secs(5), changes.recv())
            .await
            .expect("change event")
            .unwrap();
        assert_eq!(change.table, Table::Logs);
        assert_eq!(change.kind, ChangeKind::Put);
        assert_eq!(store.scan_all::<LogEntry>().await.unwrap().len(), 1);
    }
}
