//! Store configuration: where the database lives and how it is pooled.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

pub const APP_TITLE: &str = "Lifestyle";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub workspace_dir: PathBuf,
    pub db_file_name: String,
    pub pool_size: u32,
    /// Change events buffered per table before slow live views start lagging.
    pub change_buffer: usize,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            workspace_dir: default_workspace_dir(),
            db_file_name: "lifestyle.db".to_string(),
            pool_size: 4,
            change_buffer: 64,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    pub fn with_workspace_dir(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.workspace_dir.join(&self.db_file_name)
    }
}

pub fn default_workspace_dir() -> PathBuf {
    if let Some(proj) = ProjectDirs::from("com", APP_TITLE, APP_TITLE) {
        proj.data_dir().to_path_buf()
    } else {
        std::env::temp_dir().join(APP_TITLE)
    }
}
