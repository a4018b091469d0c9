use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use log::info;
use sqlx::{Pool, Postgres};

/// SQL files in `dir` named `NNN_<name>.sql`, ordered by their numeric prefix.
pub fn migration_files(dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
    let mut migration_files: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;

        if !entry.metadata()?.is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("sql") {
            continue;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("non utf-8 migration name: {}", path.display()))?;
        let migration_number: usize = file_name
            .get(..3)
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| anyhow!("migration {} has no numeric prefix", file_name))?;

        migration_files.push((migration_number, path));
    }

    migration_files.sort_by_key(|v| v.0);
    Ok(migration_files)
}

/// Runs every migration in order. The scripts are written to be re-runnable.
pub async fn migrate(p: &Pool<Postgres>, dir: &Path) -> Result<()> {
    let migration_files = migration_files(dir)?;

    info!("starting migration");
    for (_, path) in &migration_files {
        let content = fs::read_to_string(path)?;
        info!("migrating {}", path.display());
        sqlx::raw_sql(&content)
            .execute(p)
            .await
            .with_context(|| format!("applying {}", path.display()))?;
    }
    info!("migration end");

    Ok(())
}
