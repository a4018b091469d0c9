use std::path::PathBuf;

use chrono::NaiveDate;
use log::info;
use tokio::process::Command;

use super::artifact_name;
use crate::{
    config::{BackupConfig, DbConfig},
    error::BackupError,
};

/// Where the container sees `BackupConfig::backup_dir`.
pub const CONTAINER_BACKUP_DIR: &str = "/backups";

/// Arguments for `docker`. The password travels in the environment, not in argv.
pub fn pg_dump_args(
    db: &DbConfig,
    cfg: &BackupConfig,
    artifact: &str,
) -> Result<Vec<String>, BackupError> {
    Ok(vec![
        "exec".to_string(),
        "-e".to_string(),
        "PGPASSWORD".to_string(),
        cfg.container.clone(),
        "pg_dump".to_string(),
        "-U".to_string(),
        db.user()?.to_string(),
        "-d".to_string(),
        db.name()?.to_string(),
        "-F".to_string(),
        "c".to_string(),
        "-f".to_string(),
        format!("{}/{}", CONTAINER_BACKUP_DIR, artifact),
    ])
}

/// Runs `pg_dump` (custom, compressed format) inside the database container
/// and returns the host path of the artifact.
pub async fn create_dump(
    db: &DbConfig,
    cfg: &BackupConfig,
    date: NaiveDate,
) -> Result<PathBuf, BackupError> {
    let artifact = artifact_name(date);
    let args = pg_dump_args(db, cfg, &artifact)?;
    tokio::fs::create_dir_all(&cfg.backup_dir).await?;

    let host_path = cfg.backup_dir.join(&artifact);
    info!("creating backup: {}", host_path.display());

    let output = Command::new("docker")
        .args(args)
        .env("PGPASSWORD", &db.password)
        .output()
        .await
        .map_err(|source| BackupError::Spawn {
            program: "docker".to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(BackupError::Dump {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    info!("backup created: {}", host_path.display());
    Ok(host_path)
}
