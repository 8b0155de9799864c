use std::path::PathBuf;

use anyhow::{Context, Result};
use lifestyle_core::config::StoreConfig;
use lifestyle_core::models::LogLevel;
use lifestyle_core::workers::run_startup;
use lifestyle_core::LocalDatabase;
use log::info;

fn store_config() -> StoreConfig {
    match std::env::var_os("LIFESTYLE_DATA_DIR") {
        Some(dir) => StoreConfig::with_workspace_dir(PathBuf::from(dir)),
        None => StoreConfig::default(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = store_config();
    info!("opening local database in {}", config.workspace_dir.display());
    let db = LocalDatabase::open(&config).context("failed to open local database")?;

    let report = run_startup(&db).await.context("startup jobs failed")?;
    db.add_log(
        LogLevel::Info,
        "Application started",
        Some(serde_json::json!({
            "settings_seeded": report.settings_seeded,
            "logs_purged": report.logs_purged,
        })),
    )
    .await
    .context("failed to record startup log")?;

    let mut live = db.live_settings();
    if let Some(snapshot) = live.next().await {
        for setting in snapshot.context("failed to read settings")? {
            println!("{:<24} {}", setting.id.as_str(), serde_json::to_string(&setting.value)?);
        }
    }
    Ok(())
}
