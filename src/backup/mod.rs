//! Database snapshots: dump through the database container, ship the
//! artifact to object storage, optionally prune old local artifacts.
//!
//! Nothing here shares state with the loader.

mod dump;
mod retention;
mod upload;

use std::path::PathBuf;

use chrono::NaiveDate;
use log::info;

pub use dump::{create_dump, pg_dump_args, CONTAINER_BACKUP_DIR};
pub use retention::cleanup_old_backups;
pub use upload::{upload, AwsCli, ObjectStore, UploadOutcome};

use crate::{
    config::{BackupConfig, DbConfig},
    error::BackupError,
};

pub const ARTIFACT_SUFFIX: &str = "_banking_db.backup";
pub const REMOTE_PREFIX: &str = "backups";

/// `<YYYYMMDD>_banking_db.backup`
pub fn artifact_name(date: NaiveDate) -> String {
    format!("{}{}", date.format("%Y%m%d"), ARTIFACT_SUFFIX)
}

pub fn remote_key(artifact: &str) -> String {
    format!("{}/{}", REMOTE_PREFIX, artifact)
}

#[derive(Debug)]
pub struct BackupReport {
    pub artifact: PathBuf,
    pub upload: UploadOutcome,
    pub pruned: Vec<PathBuf>,
}

/// Dump, upload, then prune when `prune` is set and a retention window is configured.
pub async fn run<S: ObjectStore>(
    db: &DbConfig,
    cfg: &BackupConfig,
    store: &S,
    today: NaiveDate,
    prune: bool,
) -> Result<BackupReport, BackupError> {
    let artifact = create_dump(db, cfg, today).await?;
    let upload = upload(store, cfg, &artifact).await?;

    let pruned = match (prune, cfg.retention_days) {
        (true, Some(days)) => cleanup_old_backups(&cfg.backup_dir, days, std::time::SystemTime::now())?,
        (true, None) => {
            log::warn!("--prune given without a retention window, keeping local backups");
            Vec::new()
        }
        (false, _) => Vec::new(),
    };

    info!("backup process completed: {}", artifact.display());
    Ok(BackupReport {
        artifact,
        upload,
        pruned,
    })
}
