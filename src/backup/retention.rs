use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use log::info;

use super::ARTIFACT_SUFFIX;
use crate::error::BackupError;

const SECONDS_PER_DAY: u64 = 86_400;

/// Deletes artifacts in `dir` last modified before `now - keep_days`.
/// Other files are left alone.
pub fn cleanup_old_backups(
    dir: &Path,
    keep_days: u32,
    now: SystemTime,
) -> Result<Vec<PathBuf>, BackupError> {
    let cutoff = now
        .checked_sub(Duration::from_secs(u64::from(keep_days) * SECONDS_PER_DAY))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut deleted = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().ends_with(ARTIFACT_SUFFIX) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() || metadata.modified()? >= cutoff {
            continue;
        }

        let path = entry.path();
        fs::remove_file(&path)?;
        info!("deleted old backup: {}", path.display());
        deleted.push(path);
    }

    deleted.sort();
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn touch(dir: &Path, name: &str, modified: SystemTime) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(modified).unwrap();
        path
    }

    #[test]
    fn only_old_artifacts_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let day = Duration::from_secs(SECONDS_PER_DAY);

        let old = touch(dir.path(), "20240101_banking_db.backup", now - day * 10);
        let fresh = touch(dir.path(), "20240108_banking_db.backup", now - day);
        let unrelated = touch(dir.path(), "notes.txt", now - day * 30);

        let deleted = cleanup_old_backups(dir.path(), 7, now).unwrap();

        assert_eq!(deleted, vec![old.clone()]);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn artifact_inside_window_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let kept = touch(
            dir.path(),
            "20240101_banking_db.backup",
            now - Duration::from_secs(3600),
        );

        assert!(cleanup_old_backups(dir.path(), 1, now).unwrap().is_empty());
        assert!(kept.exists());
    }
}
