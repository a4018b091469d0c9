use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::{error::NormalizeError, layout::ColumnLayout, models::Transaction};

pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Maps one raw row onto the canonical record using `layout`.
pub fn normalize<S: AsRef<str>>(
    account_id: &str,
    layout: &ColumnLayout,
    row: &[S],
) -> Result<Transaction, NormalizeError> {
    let txn_date = parse_date(cell(row, layout.txn_date)?)?;
    let post_date = match layout.post_date {
        Some(index) => parse_date(cell(row, index)?)?,
        None => txn_date,
    };
    let description = cell(row, layout.description)?;
    let category = match layout.category {
        Some(index) => Some(cell(row, index)?.to_string()),
        None => None,
    };
    let amount = parse_amount(cell(row, layout.amount)?)?;

    Ok(Transaction::new(
        account_id,
        txn_date,
        post_date,
        description,
        amount,
        category,
    ))
}

fn cell<S: AsRef<str>>(row: &[S], index: usize) -> Result<&str, NormalizeError> {
    row.get(index)
        .map(AsRef::as_ref)
        .ok_or(NormalizeError::MissingColumn {
            index,
            len: row.len(),
        })
}

pub fn parse_date(value: &str) -> Result<NaiveDate, NormalizeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
        NormalizeError::DateParse {
            value: value.to_string(),
            source,
        }
    })
}

/// Parses the textual amount straight into a decimal; no float is involved.
pub fn parse_amount(value: &str) -> Result<BigDecimal, NormalizeError> {
    BigDecimal::from_str(value.trim()).map_err(|source| NormalizeError::AmountParse {
        value: value.to_string(),
        source,
    })
}
