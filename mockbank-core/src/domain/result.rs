//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// The first seven variants are the ledger taxonomy. Each one is terminal for
/// the attempt that produced it and none of them leave the store modified.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Amount must be a positive whole number")]
    InvalidAmount,

    #[error("PIN must be exactly 4 digits")]
    InvalidPin,

    #[error("Account not found: {0}")]
    UnknownAccount(String),

    #[error("Incorrect PIN")]
    AuthenticationFailed,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Account store is corrupt: {0}")]
    CorruptStore(String),

    #[error("Accounts were modified by another writer; reload and try again")]
    ConcurrentModification,

    #[error("Not logged in")]
    NoActiveSession,

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a corrupt store error
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptStore(msg.into())
    }

    /// Stable snake_case name of the error kind
    ///
    /// Safe to log: it never carries account numbers or amounts.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidAmount => "invalid_amount",
            Error::InvalidPin => "invalid_pin",
            Error::UnknownAccount(_) => "unknown_account",
            Error::AuthenticationFailed => "authentication_failed",
            Error::InsufficientFunds => "insufficient_funds",
            Error::CorruptStore(_) => "corrupt_store",
            Error::ConcurrentModification => "concurrent_modification",
            Error::NoActiveSession => "no_active_session",
            Error::DuplicateAccount(_) => "duplicate_account",
            Error::Validation(_) => "validation",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Other(_) => "other",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result envelope used for `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("kind".to_string(), serde_json::Value::from(e.kind()));
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}
