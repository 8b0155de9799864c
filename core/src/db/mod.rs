pub mod schema;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::time::Duration;

use crate::config::StoreConfig;
use crate::errors::Result;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Open (or create) the database described by `config` and bring its schema
/// up to date.
pub fn init_db(config: &StoreConfig) -> Result<DbPool> {
    std::fs::create_dir_all(&config.workspace_dir)?;
    let db_path = config.db_path();
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
    let mgr = SqliteConnectionManager::file(&db_path)
        .with_init(move |conn| conn.busy_timeout(busy_timeout));
    let pool = Pool::builder().max_size(config.pool_size).build(mgr)?;
    {
        let mut conn = pool.get()?;
        let version = schema::apply_migrations(&mut conn)?;
        log::debug!("opened {} at schema v{version}", db_path.display());
    }
    Ok(pool)
}

pub fn schema_version(conn: &rusqlite::Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}
