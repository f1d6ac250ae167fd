//! Pre-update configuration backups.

use crate::error::EngineError;
use crate::remote::RemoteConfiguration;
use crate::report::BackupInfo;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `config` as pretty JSON into `dir`, creating the directory if needed.
///
/// File name: `glossary_backup_<config_id>_<YYYYmmdd_HHMMSS>.json`.
pub fn write_backup(
    dir: &Path,
    config_id: &str,
    config: &RemoteConfiguration,
) -> Result<BackupInfo, EngineError> {
    let at = Utc::now();
    let path = backup_path(dir, config_id, at);
    let io_err = |source| EngineError::Backup {
        path: path.clone(),
        source,
    };

    let body = serde_json::to_vec_pretty(&config.as_value())
        .map_err(|e| io_err(std::io::Error::other(e)))?;
    std::fs::create_dir_all(dir).map_err(io_err)?;
    std::fs::write(&path, &body).map_err(io_err)?;

    info!(path = %path.display(), bytes = body.len(), "Wrote configuration backup");
    Ok(BackupInfo {
        path: path.display().to_string(),
        created: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        size: body.len() as u64,
    })
}

fn backup_path(dir: &Path, config_id: &str, at: DateTime<Utc>) -> PathBuf {
    let safe_id: String = config_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    dir.join(format!(
        "glossary_backup_{}_{}.json",
        safe_id,
        at.format("%Y%m%d_%H%M%S")
    ))
}
