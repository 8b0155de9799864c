use serde::Serialize;

use crate::api::v1::LocalDatabase;
use crate::errors::StoreError;
use crate::logging;

/// Outcome of the startup jobs, reported back to the embedding application.
#[derive(Debug, Clone, Serialize)]
pub struct StartupReport {
    pub settings_seeded: usize,
    pub logs_purged: usize,
}

/// Seed settings, then purge expired logs. Runs once per application start.
///
/// A sweep failure is recorded in the activity log before it is returned;
/// initialization failures are returned untouched since the settings table
/// may be unusable.
pub async fn run_startup(db: &LocalDatabase) -> Result<StartupReport, StoreError> {
    let settings_seeded = db.initialize_settings().await?;
    let logs_purged = match db.sweep_expired_logs().await {
        Ok(count) => count,
        Err(err) => {
            if let Err(log_err) =
                logging::log_error(db.store(), "log retention sweep failed", &err).await
            {
                log::warn!("could not record sweep failure ({}): {log_err}", err.code());
            }
            return Err(err);
        }
    };
    log::info!(
        "startup complete: {settings_seeded} setting(s) seeded, {logs_purged} log(s) purged"
    );
    Ok(StartupReport {
        settings_seeded,
        logs_purged,
    })
}
