use std::path::PathBuf;

use thiserror::Error;

/// The account identifier has no known column mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported layout: no column mapping for account '{account_id}'")]
pub struct UnsupportedLayout {
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("account '{0}' is registered more than once")]
    DuplicateAccount(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing setting {setting}")]
pub struct ConfigError {
    pub setting: &'static str,
}

/// Failure to turn one raw row into a [`crate::models::Transaction`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("date '{value}' is not in MM/DD/YYYY form")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("amount '{value}' is not a decimal number")]
    AmountParse {
        value: String,
        #[source]
        source: bigdecimal::ParseBigDecimalError,
    },
    #[error("row has {len} columns, column {index} is required")]
    MissingColumn { index: usize, len: usize },
}

pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a whole batch. Nothing from the batch is persisted when one is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot derive an account id from path {}", .0.display())]
    MissingAccountId(PathBuf),
    #[error(transparent)]
    UnsupportedLayout(#[from] UnsupportedLayout),
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}: line {line}: cannot normalize row", path.display())]
    Row {
        path: PathBuf,
        line: u64,
        #[source]
        source: NormalizeError,
    },
    #[error("persistence fault, batch rolled back")]
    Persistence(#[source] StoreError),
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot start '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("pg_dump exited with {status}: {stderr}")]
    Dump { status: String, stderr: String },
    #[error("upload of {key} to bucket {bucket} failed: {reason}")]
    Upload {
        bucket: String,
        key: String,
        reason: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
