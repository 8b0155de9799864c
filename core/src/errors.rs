use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database unavailable: {0}")] DbUnavailable(#[from] r2d2::Error),
    #[error("SQLite error: {0}")] Sqlite(#[from] rusqlite::Error),
    #[error("Failed to prepare workspace directory: {0}")] Workspace(#[from] std::io::Error),
    #[error("Record serialisation failed: {0}")] Serde(#[from] serde_json::Error),
    #[error("Timestamp formatting failed: {0}")] Timestamp(#[from] time::error::Format),
    #[error("Migration {name} failed: {source}")]
    Migration {
        name: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Store schema version {found} is newer than supported version {supported}")]
    SchemaDowngrade { found: i64, supported: i64 },
    #[error("Table {0} is missing after migration")] MissingTable(&'static str),
    #[error("Table {table} has no index on {field}")]
    UnknownIndex {
        table: &'static str,
        field: &'static str,
    },
    #[error("Background task failed: {0}")] Task(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DbUnavailable(_) => "DB-1001",
            Self::Sqlite(_) => "DB-1002",
            Self::Workspace(_) => "DB-1003",
            Self::Serde(_) => "REC-1001",
            Self::Timestamp(_) => "REC-1002",
            Self::Migration { .. } => "SCH-1001",
            Self::SchemaDowngrade { .. } => "SCH-1002",
            Self::MissingTable(_) => "SCH-1003",
            Self::UnknownIndex { .. } => "SCH-1004",
            Self::Task(_) => "GEN-1000",
        }
    }
    pub fn explain(&self) -> &'static str {
        match self {
            Self::DbUnavailable(_) => "The application could not access the SQLite database.",
            Self::Sqlite(_) => "The SQLite engine rejected a statement.",
            Self::Workspace(_) => "The data directory holding the database could not be created.",
            Self::Serde(_) => "A stored record could not be converted to or from JSON.",
            Self::Timestamp(_) => "The current time could not be rendered as RFC 3339.",
            Self::Migration { .. } => "A schema migration could not be applied.",
            Self::SchemaDowngrade { .. } => {
                "The database was written by a newer version of the application."
            }
            Self::MissingTable(_) => "A declared table was not created by the migrations.",
            Self::UnknownIndex { .. } => "Ordered retrieval requested on a field without an index.",
            Self::Task(_) => "A blocking database task panicked or was cancelled.",
        }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
