//! Session domain model

use serde::{Deserialize, Serialize};

/// The currently authenticated account
///
/// Obtained from the session service and handed explicitly to ledger
/// operations; nothing reads it from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    account_number: String,
}

impl Session {
    pub fn new(account_number: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }
}
