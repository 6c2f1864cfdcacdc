//! Transaction domain model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Kind of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
}

impl TransactionKind {
    /// True for kinds that add to the balance
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }

    /// Balance after applying `amount` to `balance_before`, or None on overflow
    pub fn apply(&self, balance_before: i64, amount: i64) -> Option<i64> {
        if self.is_credit() {
            balance_before.checked_add(amount)
        } else {
            balance_before.checked_sub(amount)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::TransferIn => "transfer_in",
            TransactionKind::TransferOut => "transfer_out",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::TransferIn => "Transfer in",
            TransactionKind::TransferOut => "Transfer out",
        };
        f.write_str(label)
    }
}

/// Operations a session holder can apply to their own ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Deposit,
    Withdrawal,
}

impl From<OperationKind> for TransactionKind {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Deposit => TransactionKind::Deposit,
            OperationKind::Withdrawal => TransactionKind::Withdrawal,
        }
    }
}

/// A single immutable ledger entry
///
/// Field names match the persisted layout (`transactionReference`, `type`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "transactionReference")]
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Always positive, in minor units
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    /// Other account of a transfer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
}

impl Transaction {
    /// Build an entry, computing `balance_after` from the kind
    ///
    /// Returns None if the resulting balance does not fit in an i64.
    pub fn record(
        kind: TransactionKind,
        amount: i64,
        balance_before: i64,
        timestamp: DateTime<Utc>,
        reference: impl Into<String>,
    ) -> Option<Self> {
        let balance_after = kind.apply(balance_before, amount)?;
        Some(Self {
            timestamp,
            reference: reference.into(),
            kind,
            amount,
            balance_before,
            balance_after,
            counterparty: None,
        })
    }

    /// Attach the counterparty account of a transfer
    pub fn with_counterparty(mut self, account_number: impl Into<String>) -> Self {
        self.counterparty = Some(account_number.into());
        self
    }

    /// Check the entry's own arithmetic
    pub fn is_consistent(&self) -> bool {
        self.amount > 0 && self.kind.apply(self.balance_before, self.amount) == Some(self.balance_after)
    }
}

/// Reference string derived from the operation time
pub fn reference_for_millis(millis: i64) -> String {
    format!("TR{}", millis)
}

/// Parse a raw amount as a positive whole number of minor units
///
/// Only ASCII digits are accepted once surrounding whitespace is trimmed,
/// so signs, decimal points and exponents are all rejected.
pub fn parse_amount(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAmount);
    }
    match trimmed.parse::<i64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(Error::InvalidAmount),
    }
}
