//! CLI command implementations

pub mod accounts;
pub mod balance;
pub mod config;
pub mod doctor;
pub mod history;
pub mod login;
pub mod logs;
pub mod operation;
pub mod register;
pub mod transfer;

use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use dialoguer::Password;
use serde::Serialize;

use mockbank_core::domain::result::Result as CoreResult;
use mockbank_core::{EntryPoint, LogEvent, LoggingService, MockbankContext, OperationResult};

/// Environment variable selecting the data directory
pub const DATA_DIR_ENV: &str = "MOCKBANK_DIR";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Log the outcome of a ledger operation by error kind only
pub fn log_outcome<T>(logger: &Option<LoggingService>, operation: &str, result: &CoreResult<T>) {
    if let Some(l) = logger {
        let _ = l.log_operation(operation, result.as_ref().err().map(|e| e.kind()));
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".mockbank"))
        .ok_or_else(|| anyhow!("Could not find home directory; set {}", DATA_DIR_ENV))
}

/// Open the mockbank context for the data directory
pub fn get_context() -> Result<MockbankContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    MockbankContext::new(&data_dir).context("Failed to initialize mockbank context")
}

/// Get the PIN from --pin or a hidden prompt
///
/// The PIN is passed on unvalidated; the ledger checks its shape.
pub fn read_pin(pin: Option<String>) -> Result<String> {
    if let Some(p) = pin {
        return Ok(p);
    }
    if atty::isnt(atty::Stream::Stdin) {
        bail!("PIN required: pass --pin when not running in a terminal");
    }
    Ok(Password::new().with_prompt("PIN").interact()?)
}

/// Get a new PIN from --pin, or prompt twice and compare
pub fn read_new_pin(pin: Option<String>) -> Result<String> {
    if let Some(p) = pin {
        return Ok(p);
    }
    if atty::isnt(atty::Stream::Stdin) {
        bail!("PIN required: pass --pin when not running in a terminal");
    }
    let p1 = Password::new().with_prompt("Choose a 4-digit PIN").interact()?;
    let p2 = Password::new().with_prompt("Confirm PIN").interact()?;
    if p1 != p2 {
        bail!("PINs do not match");
    }
    Ok(p1)
}

/// A failure whose output has already been printed
///
/// `main` exits non-zero without printing it again; the kind goes to the
/// event log.
#[derive(Debug)]
pub struct ReportedFailure {
    pub kind: &'static str,
}

impl fmt::Display for ReportedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ReportedFailure {}

/// Print a core result either as an `OperationResult` envelope or through
/// `render`. In JSON mode a failure is printed as the envelope and returned
/// as `ReportedFailure`; otherwise it propagates as is.
pub fn finish<T: Serialize>(
    json: bool,
    result: CoreResult<T>,
    render: impl FnOnce(&T),
) -> Result<()> {
    if json {
        let kind = result.as_ref().err().map(|e| e.kind());
        let envelope = OperationResult::from(result);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return match kind {
            Some(kind) => Err(ReportedFailure { kind }.into()),
            None => Ok(()),
        };
    }

    let data = result?;
    render(&data);
    Ok(())
}
