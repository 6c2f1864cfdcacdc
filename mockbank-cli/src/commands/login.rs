//! Login and logout commands

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use mockbank_core::services::AccountSummary;
use mockbank_core::LoggingService;

use super::{finish, get_context, log_outcome, read_pin};

pub fn run(
    logger: &Option<LoggingService>,
    account_number: &str,
    pin: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let pin = read_pin(pin)?;

    let result = ctx.session_service.login(account_number, &pin);
    log_outcome(logger, "login", &result);

    let result = result
        .and_then(|session| ctx.account_service.get(session.account_number()))
        .map(|user| AccountSummary::from(&user));

    finish(json, result, |account| {
        println!("{} Logged in as {}", "✓".green(), account.account_name.bold());
    })
}

pub fn run_logout(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx
        .session_service
        .logout()
        .map(|was_active| json!({ "was_active": was_active }));

    finish(json, result, |outcome| {
        if outcome["was_active"].as_bool().unwrap_or(false) {
            println!("{} Logged out", "✓".green());
        } else {
            println!("{}", "No active session".dimmed());
        }
    })
}
