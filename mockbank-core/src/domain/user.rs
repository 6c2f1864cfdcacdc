//! User domain model

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::transaction::Transaction;

/// Number of digits in an account number
pub const ACCOUNT_NUMBER_LEN: usize = 10;

/// Number of digits in a PIN
pub const PIN_LEN: usize = 4;

/// A registered account holder and their ledger
///
/// The balance is not stored. It is the last ledger entry's `balance_after`,
/// or the opening balance for an empty ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub account_number: String,
    pub account_name: String,
    /// Stored and compared as plaintext
    pub account_pin: String,
    #[serde(default)]
    pub opening_balance: i64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl User {
    pub fn new(
        account_number: impl Into<String>,
        account_name: impl Into<String>,
        account_pin: impl Into<String>,
        opening_balance: i64,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            account_name: account_name.into(),
            account_pin: account_pin.into(),
            opening_balance,
            transactions: Vec::new(),
        }
    }

    /// Current balance, derived from the ledger
    pub fn current_balance(&self) -> i64 {
        self.transactions
            .last()
            .map(|tx| tx.balance_after)
            .unwrap_or(self.opening_balance)
    }

    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    pub fn pin_matches(&self, pin: &str) -> bool {
        self.account_pin == pin
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Check the shape of a raw PIN (not whether it is correct)
pub fn validate_pin(pin: &str) -> Result<()> {
    if is_digits(pin, PIN_LEN) {
        Ok(())
    } else {
        Err(Error::InvalidPin)
    }
}

/// Check the shape of a raw account number
pub fn validate_account_number(account_number: &str) -> Result<()> {
    if is_digits(account_number, ACCOUNT_NUMBER_LEN) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Account number must be exactly {} digits",
            ACCOUNT_NUMBER_LEN
        )))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::TransactionKind;

    #[test]
    fn test_balance_of_empty_ledger_is_opening_balance() {
        let user = User::new("1234567890", "Ada", "1234", 1000);
        assert_eq!(user.current_balance(), 1000);
        assert!(user.last_transaction().is_none());
    }

    #[test]
    fn test_balance_follows_last_entry() {
        let mut user = User::new("1234567890", "Ada", "1234", 1000);
        let tx = Transaction::record(TransactionKind::Deposit, 500, 1000, Utc::now(), "TR1").unwrap();
        user.transactions.push(tx);
        assert_eq!(user.current_balance(), 1500);
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("0420").is_ok());
        for pin in ["", "123", "12345", "12a4", " 123"] {
            assert!(matches!(validate_pin(pin), Err(Error::InvalidPin)), "{:?}", pin);
        }
    }

    #[test]
    fn test_validate_account_number() {
        assert!(validate_account_number("0123456789").is_ok());
        assert!(validate_account_number("012345678").is_err());
        assert!(validate_account_number("01234567890").is_err());
        assert!(validate_account_number("01234x6789").is_err());
    }

    #[test]
    fn test_opening_balance_defaults_when_missing() {
        let json = r#"{"accountNumber":"0123456789","accountName":"Ada","accountPin":"1234"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.opening_balance, 0);
        assert!(user.transactions.is_empty());
    }
}
