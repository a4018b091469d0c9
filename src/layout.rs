//! Column layouts of the supported bank extracts and the account → layout table.

use std::collections::HashMap;

use crate::error::{LayoutError, UnsupportedLayout};

/// Positional column mapping for one bank export format.
///
/// `post_date` and `category` are `None` when the export has no such column;
/// the normalizer then falls back to the transaction date and to no category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub txn_date: usize,
    pub post_date: Option<usize>,
    pub description: usize,
    pub category: Option<usize>,
    pub amount: usize,
}

impl ColumnLayout {
    /// Smallest number of cells a row must have for every mapped column to exist.
    pub fn min_columns(&self) -> usize {
        [
            Some(self.txn_date),
            self.post_date,
            Some(self.description),
            self.category,
            Some(self.amount),
        ]
        .into_iter()
        .flatten()
        .max()
        .map_or(0, |i| i + 1)
    }
}

/// Closed set of export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Transaction Date, Post Date, Description, Category, Type, Amount[, Memo]
    CardActivity,
    /// Date, Description, Amount
    BasicActivity,
}

impl LayoutKind {
    pub fn columns(&self) -> ColumnLayout {
        match self {
            LayoutKind::CardActivity => ColumnLayout {
                txn_date: 0,
                post_date: Some(1),
                description: 2,
                category: Some(3),
                amount: 5,
            },
            LayoutKind::BasicActivity => ColumnLayout {
                txn_date: 0,
                post_date: None,
                description: 1,
                category: None,
                amount: 2,
            },
        }
    }
}

/// Accounts with a known export format. Adding a bank account is one row here.
pub const KNOWN_ACCOUNTS: &[(&str, LayoutKind)] = &[
    ("Chase4659", LayoutKind::CardActivity),
    ("Chase6589", LayoutKind::CardActivity),
    ("Chase9072", LayoutKind::BasicActivity),
];

#[derive(Debug, Clone)]
pub struct LayoutRegistry {
    accounts: HashMap<String, LayoutKind>,
}

impl LayoutRegistry {
    /// Builds a registry, rejecting an account listed twice.
    pub fn new<'a>(
        entries: impl IntoIterator<Item = (&'a str, LayoutKind)>,
    ) -> Result<Self, LayoutError> {
        let mut accounts = HashMap::new();
        for (account_id, kind) in entries {
            if accounts.insert(account_id.to_string(), kind).is_some() {
                return Err(LayoutError::DuplicateAccount(account_id.to_string()));
            }
        }
        Ok(Self { accounts })
    }

    /// Registry over [`KNOWN_ACCOUNTS`].
    pub fn builtin() -> Result<Self, LayoutError> {
        Self::new(KNOWN_ACCOUNTS.iter().copied())
    }

    pub fn kind(&self, account_id: &str) -> Result<LayoutKind, UnsupportedLayout> {
        self.accounts
            .get(account_id)
            .copied()
            .ok_or_else(|| UnsupportedLayout {
                account_id: account_id.to_string(),
            })
    }

    pub fn resolve(&self, account_id: &str) -> Result<ColumnLayout, UnsupportedLayout> {
        self.kind(account_id).map(|k| k.columns())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Chase4659", LayoutKind::CardActivity)]
    #[case("Chase6589", LayoutKind::CardActivity)]
    #[case("Chase9072", LayoutKind::BasicActivity)]
    fn builtin_accounts_resolve(#[case] account: &str, #[case] kind: LayoutKind) {
        let registry = LayoutRegistry::builtin().unwrap();
        assert_eq!(registry.kind(account).unwrap(), kind);
        assert_eq!(registry.resolve(account).unwrap(), kind.columns());
    }

    #[rstest]
    #[case("UnknownBank")]
    #[case("chase9072")]
    #[case("")]
    fn unknown_account_is_unsupported(#[case] account: &str) {
        let registry = LayoutRegistry::builtin().unwrap();
        let err = registry.resolve(account).unwrap_err();
        assert_eq!(err.account_id, account);
    }

    #[test]
    fn duplicate_account_is_rejected() {
        let err = LayoutRegistry::new([
            ("Chase9072", LayoutKind::BasicActivity),
            ("Chase9072", LayoutKind::CardActivity),
        ])
        .unwrap_err();
        assert_eq!(err, LayoutError::DuplicateAccount("Chase9072".to_string()));
    }

    #[test]
    fn min_columns_covers_every_mapped_column() {
        assert_eq!(LayoutKind::CardActivity.columns().min_columns(), 6);
        assert_eq!(LayoutKind::BasicActivity.columns().min_columns(), 3);
    }

    #[test]
    fn basic_activity_has_no_post_date_or_category() {
        let columns = LayoutKind::BasicActivity.columns();
        assert_eq!(columns.post_date, None);
        assert_eq!(columns.category, None);
    }
}
