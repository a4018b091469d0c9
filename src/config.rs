//! Command line and environment configuration.
//!
//! Every setting can come from a flag or from the environment (optionally via
//! a `.env` file loaded by the binary). The parsed structs are passed into the
//! library explicitly.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgConnectOptions;

use crate::error::ConfigError;

#[derive(Debug, Parser)]
#[command(name = "bankfiles", version, about = "Load bank CSV extracts into Postgres and back the database up")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the transactions table
    Migrate {
        #[command(flatten)]
        db: DbConfig,
        #[arg(long, env = "MIGRATIONS_DIR", default_value = "migrations")]
        dir: PathBuf,
    },
    /// Load one or more bank extracts; the parent directory names the account
    Load(LoadArgs),
    /// Dump the database and upload the artifact
    Backup(BackupArgs),
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub db: DbConfig,
    /// Extract files; defaults to BANK_FILE
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
    #[arg(long, env = "BANK_FILE", hide_env_values = true)]
    pub bank_file: Option<PathBuf>,
    /// Print normalized records as JSON lines instead of storing them
    #[arg(long)]
    pub dry_run: bool,
}

impl LoadArgs {
    pub fn inputs(&self) -> Vec<PathBuf> {
        if !self.files.is_empty() {
            return self.files.clone();
        }
        self.bank_file.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Args)]
pub struct DbConfig {
    #[arg(long = "db-user", env = "POSTGRES_USER")]
    pub user: Option<String>,
    #[arg(long = "db-password", env = "POSTGRES_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,
    #[arg(long = "db-name", env = "POSTGRES_DB")]
    pub name: Option<String>,
    #[arg(long = "db-host", env = "POSTGRES_HOST", default_value = "localhost")]
    pub host: String,
    #[arg(long = "db-port", env = "POSTGRES_PORT", default_value_t = 5433)]
    pub port: u16,
}

// user and name are checked only by commands that reach the database
impl DbConfig {
    pub fn user(&self) -> Result<&str, ConfigError> {
        self.user.as_deref().ok_or(ConfigError {
            setting: "POSTGRES_USER",
        })
    }

    pub fn name(&self) -> Result<&str, ConfigError> {
        self.name.as_deref().ok_or(ConfigError {
            setting: "POSTGRES_DB",
        })
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(self.user()?)
            .password(&self.password)
            .database(self.name()?))
    }
}

#[derive(Debug, Clone, Args)]
pub struct BackupConfig {
    #[arg(long, env = "S3_BACKUP_BUCKET")]
    pub bucket: Option<String>,
    #[arg(long = "aws-profile", env = "AWS_BACKUP_PROFILE", default_value = "banking-backup")]
    pub aws_profile: String,
    /// Host directory the container's /backups is mounted on
    #[arg(long = "backup-dir", env = "BACKUP_DIR", default_value = "db_backups")]
    pub backup_dir: PathBuf,
    #[arg(long, env = "DB_CONTAINER", default_value = "banking_db")]
    pub container: String,
    /// Local artifacts older than this many days are removed with --prune
    #[arg(long = "retention-days", env = "BACKUP_RETENTION_DAYS")]
    pub retention_days: Option<u32>,
}

#[derive(Debug, Args)]
pub struct BackupArgs {
    #[command(flatten)]
    pub db: DbConfig,
    #[command(flatten)]
    pub backup: BackupConfig,
    /// Delete old local artifacts after the upload
    #[arg(long)]
    pub prune: bool,
}
