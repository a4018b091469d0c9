//! The account id is the name of the directory holding the file, e.g.
//! `statements/Chase9072/2024-01.csv` belongs to `Chase9072`.

use std::{
    io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    error::LoadError,
    layout::{ColumnLayout, LayoutKind, LayoutRegistry},
    models::Transaction,
    normalize::normalize,
    store::{InsertSummary, TransactionStore},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub path: PathBuf,
    pub account_id: String,
    pub kind: LayoutKind,
    pub records: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub account_id: String,
    pub kind: LayoutKind,
}

pub fn account_id_from_path(path: &Path) -> Result<String, LoadError> {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LoadError::MissingAccountId(path.to_path_buf()))
}

// every layout is resolved before the first write
pub fn plan<P: AsRef<Path>>(
    registry: &LayoutRegistry,
    paths: &[P],
) -> Result<Vec<PlannedFile>, LoadError> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let account_id = account_id_from_path(path)?;
            let kind = registry.kind(&account_id)?;
            Ok(PlannedFile {
                path: path.to_path_buf(),
                account_id,
                kind,
            })
        })
        .collect()
}

pub fn normalize_reader(
    account_id: &str,
    layout: &ColumnLayout,
    r: impl io::Read,
    path: &Path,
) -> Result<Vec<Transaction>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(r);

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let line = row.position().map_or(0, |p| p.line());
        let cells: Vec<&str> = row.iter().collect();

        let record = normalize(account_id, layout, &cells)
            .map_err(|source| LoadError::Row {
                path: path.to_path_buf(),
                line,
                source,
            })?;
        debug!("line {}: {:?}", line, record);
        records.push(record);
    }

    Ok(records)
}

pub fn read_planned(planned: &PlannedFile) -> Result<Batch, LoadError> {
    let file = csv_file(&planned.path)?;
    let records = normalize_reader(
        &planned.account_id,
        &planned.kind.columns(),
        file,
        &planned.path,
    )?;

    Ok(Batch {
        path: planned.path.clone(),
        account_id: planned.account_id.clone(),
        kind: planned.kind,
        records,
    })
}

pub fn read_batch(registry: &LayoutRegistry, path: &Path) -> Result<Batch, LoadError> {
    let mut planned = plan(registry, &[path])?;
    match planned.pop() {
        Some(p) => read_planned(&p),
        None => Err(LoadError::MissingAccountId(path.to_path_buf())),
    }
}

fn csv_file(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|err| LoadError::Read {
        path: path.to_path_buf(),
        source: csv::Error::from(err),
    })
}

pub async fn store_batch<S: TransactionStore>(
    store: &mut S,
    batch: &Batch,
) -> Result<InsertSummary, LoadError> {
    let summary = store
        .insert_batch(&batch.records)
        .await
        .map_err(LoadError::Persistence)?;

    info!(
        "{}: {} rows inserted, {} duplicates ignored",
        batch.path.display(),
        summary.inserted,
        summary.ignored
    );
    Ok(summary)
}

pub async fn load_file<S: TransactionStore>(
    store: &mut S,
    registry: &LayoutRegistry,
    path: &Path,
) -> Result<InsertSummary, LoadError> {
    let batch = read_batch(registry, path)?;
    info!(
        "{}: account {} ({:?}), {} rows",
        path.display(),
        batch.account_id,
        batch.kind,
        batch.records.len()
    );
    store_batch(store, &batch).await
}

/// Each file is its own unit of work. The run stops at the first failing
/// file; files stored before it stay stored.
pub async fn load_files<S: TransactionStore, P: AsRef<Path>>(
    store: &mut S,
    registry: &LayoutRegistry,
    paths: &[P],
) -> Result<Vec<(PathBuf, InsertSummary)>, LoadError> {
    let planned = plan(registry, paths)?;

    let mut out = Vec::with_capacity(planned.len());
    for p in &planned {
        info!("{}: account {} ({:?})", p.path.display(), p.account_id, p.kind);
        let batch = read_planned(p)?;
        let summary = store_batch(store, &batch).await?;
        out.push((p.path.clone(), summary));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::{error::NormalizeError, store::MemoryStore};

    #[test]
    fn account_id_is_parent_directory_name() {
        let path = Path::new("/data/statements/Chase9072/activity.csv");
        assert_eq!(account_id_from_path(path).unwrap(), "Chase9072");
    }

    #[test]
    fn bare_file_name_has_no_account_id() {
        let err = account_id_from_path(Path::new("activity.csv")).unwrap_err();
        assert!(matches!(err, LoadError::MissingAccountId(_)));
    }

    #[test]
    fn reader_skips_header_and_keeps_order() {
        let text = "Date,Description,Amount\n\
                    01/15/2024,Coffee Shop,-4.50\n\
                    01/16/2024,Deposit,100.00\n";
        let layout = LayoutKind::BasicActivity.columns();
        let records =
            normalize_reader("Chase9072", &layout, text.as_bytes(), Path::new("mem")).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description(), "Coffee Shop");
        assert_eq!(records[1].amount(), &BigDecimal::from_str("100.00").unwrap());
    }

    #[test]
    fn reader_reports_failing_line() {
        let text = "Date,Description,Amount\n\
                    01/15/2024,Coffee Shop,-4.50\n\
                    01/16/2024,Deposit,N/A\n";
        let layout = LayoutKind::BasicActivity.columns();
        let err = normalize_reader("Chase9072", &layout, text.as_bytes(), Path::new("mem"))
            .unwrap_err();

        assert!(
            matches!(
                err,
                LoadError::Row {
                    line: 3,
                    source: NormalizeError::AmountParse { .. },
                    ..
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn quoted_descriptions_keep_their_commas() {
        let text = "Transaction Date,Post Date,Description,Category,Type,Amount,Memo\n\
                    01/15/2024,01/16/2024,\"ACME, INC\",Shopping,Sale,-19.99,\n";
        let layout = LayoutKind::CardActivity.columns();
        let records =
            normalize_reader("Chase4659", &layout, text.as_bytes(), Path::new("mem")).unwrap();

        assert_eq!(records[0].description(), "ACME, INC");
        assert_eq!(records[0].category(), Some("Shopping"));
    }

    #[test]
    fn plan_rejects_unknown_account_among_known_ones() {
        let registry = LayoutRegistry::builtin().unwrap();
        let err = plan(
            &registry,
            &["in/Chase9072/a.csv", "in/UnknownBank/b.csv"],
        )
        .unwrap_err();

        assert!(
            matches!(err, LoadError::UnsupportedLayout(ref e) if e.account_id == "UnknownBank"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn persistence_fault_surfaces_as_load_error() {
        let mut store = MemoryStore::failing_at(0);
        let batch = Batch {
            path: PathBuf::from("mem"),
            account_id: "Chase9072".to_string(),
            kind: LayoutKind::BasicActivity,
            records: normalize_reader(
                "Chase9072",
                &LayoutKind::BasicActivity.columns(),
                "Date,Description,Amount\n01/15/2024,Coffee Shop,-4.50\n".as_bytes(),
                Path::new("mem"),
            )
            .unwrap(),
        };

        let err = store_batch(&mut store, &batch).await.unwrap_err();
        assert!(matches!(err, LoadError::Persistence(_)));
        assert!(store.is_empty());
    }
}
