//! Register command - open a new account

use anyhow::Result;
use colored::Colorize;

use mockbank_core::services::AccountSummary;
use mockbank_core::LoggingService;

use super::{finish, get_context, log_outcome, read_new_pin};
use crate::output::format_amount;

pub fn run(
    logger: &Option<LoggingService>,
    name: &str,
    pin: Option<String>,
    opening_balance: Option<i64>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let pin = read_new_pin(pin)?;

    let result = ctx.account_service.register(name, &pin, opening_balance);
    log_outcome(logger, "register", &result);

    finish(json, result.map(|user| AccountSummary::from(&user)), |account| {
        println!("{} Account opened", "✓".green());
        println!("  Account number: {}", account.account_number.bold());
        println!("  Name: {}", account.account_name);
        println!("  Balance: {}", format_amount(account.balance));
        println!();
        println!("{}", "Log in with 'mb login <account number>'".dimmed());
    })
}
