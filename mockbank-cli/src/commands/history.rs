//! History command - show the session account's transactions

use anyhow::Result;
use comfy_table::{Cell, Color};

use super::{finish, get_context};
use crate::output::{create_table, format_amount, format_timestamp, info};

pub fn run(limit: Option<usize>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.session_service.require_current().and_then(|session| {
        let mut history = ctx.ledger_service.history(&session)?;
        history.reverse();
        if let Some(limit) = limit {
            history.truncate(limit);
        }
        Ok(history)
    });

    finish(json, result, |history| {
        if history.is_empty() {
            info("No transactions yet.");
            return;
        }

        let mut table = create_table();
        table.set_header(vec!["Date", "Reference", "Type", "Amount", "Balance", "Counterparty"]);
        for tx in history {
            let amount = if tx.kind.is_credit() {
                Cell::new(format!("+{}", format_amount(tx.amount))).fg(Color::Green)
            } else {
                Cell::new(format!("-{}", format_amount(tx.amount))).fg(Color::Red)
            };
            table.add_row(vec![
                Cell::new(format_timestamp(&tx.timestamp)),
                Cell::new(&tx.reference),
                Cell::new(tx.kind.to_string()),
                amount,
                Cell::new(format_amount(tx.balance_after)),
                Cell::new(tx.counterparty.as_deref().unwrap_or("")),
            ]);
        }
        println!("{}", table);
    })
}
