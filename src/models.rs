use std::fmt;

use bigdecimal::{num_traits::Zero, BigDecimal};
use chrono::NaiveDate;
use serde::Serialize;

/// Direction of a transaction, derived from the sign of its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TxnType {
    Income,
    Expense,
}

impl TxnType {
    /// Expense when the amount is strictly negative, Income otherwise (zero included).
    pub fn from_amount(amount: &BigDecimal) -> Self {
        if *amount < BigDecimal::zero() {
            TxnType::Expense
        } else {
            TxnType::Income
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Income => "Income",
            TxnType::Expense => "Expense",
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical transaction record, independent of the source layout.
///
/// Fields are read-only once built; `txn_type` is always computed from
/// `amount` by [`Transaction::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Transaction {
    account_id: String,
    txn_date: NaiveDate,
    post_date: NaiveDate,
    description: String,
    amount: BigDecimal,
    category: Option<String>,
    txn_type: TxnType,
    notes: Option<String>,
}

impl Transaction {
    pub fn new(
        account_id: impl Into<String>,
        txn_date: NaiveDate,
        post_date: NaiveDate,
        description: impl Into<String>,
        amount: BigDecimal,
        category: Option<String>,
    ) -> Self {
        let txn_type = TxnType::from_amount(&amount);
        Self {
            account_id: account_id.into(),
            txn_date,
            post_date,
            description: description.into(),
            amount,
            category,
            txn_type,
            notes: None,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn txn_date(&self) -> NaiveDate {
        self.txn_date
    }

    pub fn post_date(&self) -> NaiveDate {
        self.post_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn txn_type(&self) -> TxnType {
        self.txn_type
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
