//! Table catalogue and the record shapes bound to each table.
//!
//! Every table the store knows about is declared here together with its
//! primary key and secondary indexes. The migration list lives alongside so
//! that the schema version is simply the number of known migrations.

use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use crate::errors::{Result, StoreError};

/// Ordered migration scripts. The store's `user_version` equals the number
/// of entries that have been applied.
pub const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_init.sql",
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../migrations/0001_init.sql"
    )),
)];

pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Settings,
    Logs,
    Notifications,
}

#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub indexes: &'static [&'static str],
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Settings, Table::Logs, Table::Notifications];

    pub fn spec(self) -> TableSpec {
        match self {
            Table::Settings => TableSpec {
                name: "settings",
                primary_key: "id",
                indexes: &[],
            },
            Table::Logs => TableSpec {
                name: "logs",
                primary_key: "id",
                indexes: &["created_at"],
            },
            Table::Notifications => TableSpec {
                name: "notifications",
                primary_key: "id",
                indexes: &["created_at"],
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn has_index(self, field: &str) -> bool {
        self.spec().indexes.contains(&field)
    }
}

/// A row type bound to exactly one table.
///
/// `COLUMNS` lists the stored columns with the primary key first; `values`
/// must return them in the same order.
pub trait Record: Sized + Send + 'static {
    const TABLE: Table;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn values(&self) -> Result<Vec<Value>>;

    /// Decode a row selected with `COLUMNS`. Rows that are well formed but
    /// outside the recognised shape (a retired setting key, say) decode to
    /// `None` and are left out of reads.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Option<Self>>;
}

/// Apply pending migrations, refusing to open a store written by a newer
/// schema.
pub fn apply_migrations(conn: &mut Connection) -> Result<i64> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::SchemaDowngrade {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    for (idx, &(name, sql)) in MIGRATIONS.iter().enumerate() {
        let version = idx as i64 + 1;
        if version <= current {
            continue;
        }
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .map_err(|source| StoreError::Migration { name, source })?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        log::info!("applied migration {name} (schema v{version})");
    }

    verify_tables(conn)?;
    Ok(SCHEMA_VERSION)
}

/// Names of the tables currently present in the store.
pub fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut names = Vec::new();
    for r in rows {
        names.push(r?);
    }
    Ok(names)
}

fn verify_tables(conn: &Connection) -> Result<()> {
    let present = table_names(conn)?;
    for table in Table::ALL {
        if !present.iter().any(|name| name == table.name()) {
            return Err(StoreError::MissingTable(table.name()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_create_every_declared_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), SCHEMA_VERSION);
        let names = table_names(&conn).unwrap();
        for table in Table::ALL {
            assert!(names.contains(&table.name().to_string()));
        }
    }

    #[test]
    fn reopening_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn newer_store_version_is_fatal() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
        let err = apply_migrations(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            StoreError::SchemaDowngrade { found, .. } if found == SCHEMA_VERSION + 1
        ));
        assert!(table_names(&conn).unwrap().is_empty());
    }

    #[test]
    fn only_timestamped_tables_are_indexed() {
        assert!(Table::Logs.has_index("created_at"));
        assert!(Table::Notifications.has_index("created_at"));
        assert!(!Table::Settings.has_index("created_at"));
    }
}
