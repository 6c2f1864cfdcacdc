//! Accounts command - list registered accounts

use anyhow::Result;

use super::{finish, get_context};
use crate::output::{create_table, format_amount, info};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let current = ctx.session_service.current()?;

    finish(json, ctx.account_service.list(), |accounts| {
        if accounts.is_empty() {
            info("No accounts yet. Use 'mb register' to open one.");
            return;
        }

        let mut table = create_table();
        table.set_header(vec!["", "Account", "Name", "Balance", "Transactions"]);
        for account in accounts {
            let marker = match &current {
                Some(session) if session.account_number() == account.account_number => "*",
                _ => "",
            };
            table.add_row(vec![
                marker.to_string(),
                account.account_number.clone(),
                account.account_name.clone(),
                format_amount(account.balance),
                account.transaction_count.to_string(),
            ]);
        }
        println!("{}", table);
    })
}
