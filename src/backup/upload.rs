use std::{future::Future, path::Path};

use log::{info, warn};
use tokio::process::Command;

use super::remote_key;
use crate::{config::BackupConfig, error::BackupError};

/// Remote object storage.
pub trait ObjectStore {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        file: &Path,
    ) -> impl Future<Output = Result<(), BackupError>> + Send;
}

/// Uploads with the `aws` command line tool under a named credential profile.
#[derive(Debug, Clone)]
pub struct AwsCli {
    pub profile: String,
}

impl AwsCli {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    pub fn args(&self, bucket: &str, key: &str, file: &Path) -> Vec<String> {
        vec![
            "s3".to_string(),
            "cp".to_string(),
            file.display().to_string(),
            format!("s3://{}/{}", bucket, key),
            "--profile".to_string(),
            self.profile.clone(),
        ]
    }
}

impl ObjectStore for AwsCli {
    async fn put(&self, bucket: &str, key: &str, file: &Path) -> Result<(), BackupError> {
        let output = Command::new("aws")
            .args(self.args(bucket, key, file))
            .output()
            .await
            .map_err(|source| BackupError::Spawn {
                program: "aws".to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(BackupError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { bucket: String, key: String },
    Skipped,
}

/// Ships `file` to `backups/<file name>`; skips with a warning when no bucket is configured.
pub async fn upload<S: ObjectStore>(
    store: &S,
    cfg: &BackupConfig,
    file: &Path,
) -> Result<UploadOutcome, BackupError> {
    let Some(bucket) = cfg.bucket.as_deref().filter(|b| !b.is_empty()) else {
        warn!("S3_BACKUP_BUCKET not set, skipping upload");
        return Ok(UploadOutcome::Skipped);
    };

    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let key = remote_key(&file_name);

    info!("uploading to s3://{}/{}", bucket, key);
    store.put(bucket, &key, file).await?;
    info!("uploaded successfully");

    Ok(UploadOutcome::Uploaded {
        bucket: bucket.to_string(),
        key,
    })
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Mutex};

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingStore {
        puts: Mutex<Vec<(String, String)>>,
    }

    impl ObjectStore for RecordingStore {
        async fn put(&self, bucket: &str, key: &str, _file: &Path) -> Result<(), BackupError> {
            self.puts
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string()));
            Ok(())
        }
    }

    fn config(bucket: Option<&str>) -> BackupConfig {
        BackupConfig {
            bucket: bucket.map(str::to_string),
            aws_profile: "banking-backup".to_string(),
            backup_dir: PathBuf::from("db_backups"),
            container: "banking_db".to_string(),
            retention_days: None,
        }
    }

    #[tokio::test]
    async fn uploads_under_backups_prefix() {
        let store = RecordingStore::default();
        let file = Path::new("db_backups/20240307_banking_db.backup");

        let outcome = upload(&store, &config(Some("bank-backups")), file)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            UploadOutcome::Uploaded {
                bucket: "bank-backups".to_string(),
                key: "backups/20240307_banking_db.backup".to_string(),
            }
        );
        assert_eq!(store.puts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_bucket_skips_without_error() {
        let store = RecordingStore::default();
        let file = Path::new("db_backups/20240307_banking_db.backup");

        for bucket in [None, Some("")] {
            let outcome = upload(&store, &config(bucket), file).await.unwrap();
            assert_eq!(outcome, UploadOutcome::Skipped);
        }
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[test]
    fn aws_cli_uses_profile() {
        let cli = AwsCli::new("banking-backup");
        let args = cli.args("bucket", "backups/a.backup", Path::new("/tmp/a.backup"));
        assert_eq!(
            args,
            [
                "s3",
                "cp",
                "/tmp/a.backup",
                "s3://bucket/backups/a.backup",
                "--profile",
                "banking-backup",
            ]
        );
    }
}
