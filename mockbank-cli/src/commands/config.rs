//! Config command - show or change settings

use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::json;

use mockbank_core::config::{Config, OPENING_BALANCE_ENV};

use super::get_data_dir;
use crate::output::format_amount;

pub fn run(default_opening_balance: Option<i64>, json: bool) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let mut config = Config::load(&data_dir)?;

    if let Some(balance) = default_opening_balance {
        if balance < 0 {
            bail!("Default opening balance cannot be negative");
        }
        config.default_opening_balance = balance;
        config.save(&data_dir)?;
    }

    let overridden = std::env::var(OPENING_BALANCE_ENV).is_ok();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "default_opening_balance": config.default_opening_balance,
                "env_override": overridden,
            }))?
        );
        return Ok(());
    }

    if default_opening_balance.is_some() {
        println!("{} Settings saved", "✓".green());
    }
    println!(
        "Default opening balance: {}",
        format_amount(config.default_opening_balance).bold()
    );
    if overridden {
        println!(
            "{}",
            format!("{} is set and takes precedence over settings.json", OPENING_BALANCE_ENV)
                .dimmed()
        );
    }
    Ok(())
}
