//! Mockbank Core - ledger logic for a mock bank
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (User, Transaction, Session)
//! - **ports**: Trait definitions for external dependencies (UserStore)
//! - **services**: Business logic orchestration (ledger, accounts, sessions)
//! - **adapters**: Concrete implementations (JSON files, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::JsonFileStore;
use config::Config;
use ports::UserStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{OperationKind, Session, Transaction, TransactionKind, User};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for Mockbank operations
///
/// This is the primary entry point for all business logic. It holds
/// the store, configuration, and all services.
pub struct MockbankContext {
    pub config: Config,
    pub data_dir: Option<PathBuf>,
    pub store: Arc<dyn UserStore>,
    pub account_service: AccountService,
    pub session_service: SessionService,
    pub ledger_service: LedgerService,
    pub doctor_service: DoctorService,
}

impl MockbankContext {
    /// Create a context over the JSON file store in `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store = JsonFileStore::new(data_dir)
            .with_context(|| format!("Failed to open account store in {:?}", data_dir))?;

        let mut ctx = Self::with_store(config, Arc::new(store));
        ctx.data_dir = Some(data_dir.to_path_buf());
        Ok(ctx)
    }

    /// Create a context over any store
    pub fn with_store(config: Config, store: Arc<dyn UserStore>) -> Self {
        let account_service =
            AccountService::new(Arc::clone(&store), config.default_opening_balance);
        let session_service = SessionService::new(Arc::clone(&store));
        let ledger_service = LedgerService::new(Arc::clone(&store));
        let doctor_service = DoctorService::new(Arc::clone(&store));

        Self {
            config,
            data_dir: None,
            store,
            account_service,
            session_service,
            ledger_service,
            doctor_service,
        }
    }
}
