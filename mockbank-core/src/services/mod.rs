//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account;
mod doctor;
mod ledger;
pub mod logging;
mod session;

pub use account::{AccountService, AccountSummary};
pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use ledger::LedgerService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use session::SessionService;
