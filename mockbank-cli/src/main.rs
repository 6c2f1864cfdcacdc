//! Mockbank CLI - a mock bank in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod output;

use commands::{
    accounts, balance, config, doctor, history, login, logs, operation, register, transfer,
    ReportedFailure,
};
use mockbank_core::{LogEvent, OperationKind};

/// Mockbank - deposits, withdrawals and transfers against a local ledger
#[derive(Parser)]
#[command(name = "mb", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a new account
    Register {
        /// Account holder name
        #[arg(long)]
        name: String,
        /// 4-digit PIN (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Opening balance in minor units (defaults to the configured value)
        #[arg(long)]
        opening_balance: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered accounts
    Accounts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in to an account
    Login {
        /// 10-digit account number
        account: String,
        /// 4-digit PIN (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// End the current session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current balance
    Balance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit funds into the current account
    Deposit {
        /// Amount in minor units
        amount: String,
        /// 4-digit PIN (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw funds from the current account
    Withdraw {
        /// Amount in minor units
        amount: String,
        /// 4-digit PIN (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transfer funds to another account
    Transfer {
        /// Recipient account number
        to: String,
        /// Amount in minor units
        amount: String,
        /// 4-digit PIN (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show transaction history, newest first
    History {
        /// Show at most N transactions
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run ledger integrity checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        /// Opening balance, in minor units, for accounts registered without one
        #[arg(long)]
        default_opening_balance: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Register { .. } => "register",
            Commands::Accounts { .. } => "accounts",
            Commands::Login { .. } => "login",
            Commands::Logout { .. } => "logout",
            Commands::Balance { .. } => "balance",
            Commands::Deposit { .. } => "deposit",
            Commands::Withdraw { .. } => "withdraw",
            Commands::Transfer { .. } => "transfer",
            Commands::History { .. } => "history",
            Commands::Doctor { .. } => "doctor",
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<ReportedFailure>().is_none() {
                eprintln!("{}", e.to_string().red());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let command = cli.command.name();
    // The logs command opens the log database itself
    let logger = match cli.command {
        Commands::Logs { .. } => None,
        _ => commands::get_logger(),
    };
    if let Some(l) = &logger {
        let _ = l.log_command(command);
    }

    let result = match cli.command {
        Commands::Register { name, pin, opening_balance, json } => {
            register::run(&logger, &name, pin, opening_balance, json)
        }
        Commands::Accounts { json } => accounts::run(json),
        Commands::Login { account, pin, json } => login::run(&logger, &account, pin, json),
        Commands::Logout { json } => login::run_logout(json),
        Commands::Balance { json } => balance::run(json),
        Commands::Deposit { amount, pin, json } => {
            operation::run(&logger, OperationKind::Deposit, &amount, pin, json)
        }
        Commands::Withdraw { amount, pin, json } => {
            operation::run(&logger, OperationKind::Withdrawal, &amount, pin, json)
        }
        Commands::Transfer { to, amount, pin, json } => {
            transfer::run(&logger, &to, &amount, pin, json)
        }
        Commands::History { limit, json } => history::run(limit, json),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Config { default_opening_balance, json } => {
            config::run(default_opening_balance, json)
        }
        Commands::Logs { command } => logs::run(command),
    };

    if let Err(e) = &result {
        commands::log_event(
            &logger,
            LogEvent::new("command_failed")
                .with_command(command)
                .with_error_kind(error_kind(e)),
        );
    }

    result
}

/// Stable error kind for the log, never the message (it may name an account)
fn error_kind(error: &anyhow::Error) -> &'static str {
    if let Some(reported) = error.downcast_ref::<ReportedFailure>() {
        return reported.kind;
    }
    error
        .downcast_ref::<mockbank_core::Error>()
        .map(|e| e.kind())
        .unwrap_or("cli")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        let reported = anyhow::Error::from(ReportedFailure {
            kind: "insufficient_funds",
        });
        assert_eq!(error_kind(&reported), "insufficient_funds");

        let core = anyhow::Error::from(mockbank_core::Error::NoActiveSession);
        assert_eq!(error_kind(&core), "no_active_session");

        assert_eq!(error_kind(&anyhow::anyhow!("PINs do not match")), "cli");
    }
}
