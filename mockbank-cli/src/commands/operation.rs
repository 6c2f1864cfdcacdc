//! Deposit and withdraw commands

use anyhow::Result;
use colored::Colorize;

use mockbank_core::domain::parse_amount;
use mockbank_core::{LoggingService, OperationKind};

use super::{finish, get_context, log_outcome, read_pin};
use crate::output::format_amount;

fn operation_name(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Deposit => "deposit",
        OperationKind::Withdrawal => "withdrawal",
    }
}

pub fn run(
    logger: &Option<LoggingService>,
    kind: OperationKind,
    amount: &str,
    pin: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let operation = operation_name(kind);

    // A bad amount is reported before the PIN prompt
    let result = match parse_amount(amount) {
        Ok(_) => {
            let pin = read_pin(pin)?;
            let session = ctx.session_service.current()?;
            ctx.ledger_service
                .apply_operation_as(session.as_ref(), kind, amount, &pin)
        }
        Err(e) => Err(e),
    };
    log_outcome(logger, operation, &result);

    finish(json, result, |tx| {
        let verb = match kind {
            OperationKind::Deposit => "Deposited",
            OperationKind::Withdrawal => "Withdrew",
        };
        println!("{} {} {}", "✓".green(), verb, format_amount(tx.amount).bold());
        println!("  Balance: {}", format_amount(tx.balance_after));
        println!("  Reference: {}", tx.reference.dimmed());
    })
}
