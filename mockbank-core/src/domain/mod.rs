//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod session;
mod transaction;
mod user;
pub mod result;

pub use session::Session;
pub use transaction::{parse_amount, reference_for_millis, OperationKind, Transaction, TransactionKind};
pub use user::{validate_account_number, validate_pin, User, ACCOUNT_NUMBER_LEN, PIN_LEN};
