//! Balance command - show the session account's balance

use anyhow::Result;
use colored::Colorize;

use mockbank_core::services::AccountSummary;

use super::{finish, get_context};
use crate::output::format_amount;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx
        .session_service
        .current_user()
        .map(|user| AccountSummary::from(&user));

    finish(json, result, |account| {
        println!("{} ({})", account.account_name.bold(), account.account_number);
        println!("  Balance: {}", format_amount(account.balance).green());
    })
}
