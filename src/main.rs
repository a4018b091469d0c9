use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bankfiles::{
    backup::{self, AwsCli, UploadOutcome},
    config::{BackupArgs, Cli, Command, DbConfig, LoadArgs},
    layout::LayoutRegistry,
    loader, migration,
    store::PgStore,
};
use clap::Parser;
use env_logger::Env;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("loading .env");
        }
    }
    env_logger::try_init_from_env(Env::default().default_filter_or("bankfiles=info"))?;

    match Cli::parse().command {
        Command::Migrate { db, dir } => {
            let pool = connect(&db).await?;
            migration::migrate(&pool, &dir).await
        }
        Command::Load(args) => load(args).await,
        Command::Backup(args) => run_backup(args).await,
    }
}

async fn connect(db: &DbConfig) -> Result<Pool<Postgres>> {
    PgPoolOptions::new()
        .max_connections(1)
        .connect_with(db.connect_options()?)
        .await
        .with_context(|| format!("connecting to postgres at {}:{}", db.host, db.port))
}

async fn load(args: LoadArgs) -> Result<()> {
    let files: Vec<PathBuf> = args.inputs();
    if files.is_empty() {
        bail!("no input file: pass FILE or set BANK_FILE");
    }

    let registry = LayoutRegistry::builtin().context("building layout table")?;
    if args.dry_run {
        let planned = loader::plan(&registry, &files).context("resolving layouts")?;
        for p in &planned {
            let batch = loader::read_planned(p).context("normalizing")?;
            for record in &batch.records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
        return Ok(());
    }

    let pool = connect(&args.db).await?;
    let mut store = PgStore::new(pool);
    loader::load_files(&mut store, &registry, &files)
        .await
        .context("loading extracts")?;

    log::info!("success, {} file(s) loaded", files.len());
    Ok(())
}

async fn run_backup(args: BackupArgs) -> Result<()> {
    let store = AwsCli::new(&args.backup.aws_profile);
    let today = chrono::Local::now().date_naive();

    let report = backup::run(&args.db, &args.backup, &store, today, args.prune)
        .await
        .context("backup failed")?;

    match report.upload {
        UploadOutcome::Uploaded { bucket, key } => {
            log::info!("artifact stored at s3://{}/{}", bucket, key)
        }
        UploadOutcome::Skipped => log::warn!(
            "artifact kept only locally at {}",
            report.artifact.display()
        ),
    }
    if !report.pruned.is_empty() {
        log::info!("{} old backup(s) removed", report.pruned.len());
    }
    Ok(())
}
