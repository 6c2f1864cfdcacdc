//! Transfer command - move funds to another account

use anyhow::Result;
use colored::Colorize;

use mockbank_core::domain::parse_amount;
use mockbank_core::LoggingService;

use super::{finish, get_context, log_outcome, read_pin};
use crate::output::format_amount;

pub fn run(
    logger: &Option<LoggingService>,
    to_account: &str,
    amount: &str,
    pin: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let result = match parse_amount(amount) {
        Ok(_) => {
            let pin = read_pin(pin)?;
            let session = ctx.session_service.current()?;
            ctx.ledger_service
                .transfer_as(session.as_ref(), to_account, amount, &pin)
        }
        Err(e) => Err(e),
    };
    log_outcome(logger, "transfer", &result);

    finish(json, result, |tx| {
        println!(
            "{} Sent {} to {}",
            "✓".green(),
            format_amount(tx.amount).bold(),
            to_account
        );
        println!("  Balance: {}", format_amount(tx.balance_after));
        println!("  Reference: {}", tx.reference.dimmed());
    })
}
