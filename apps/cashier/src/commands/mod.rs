//! # Cashier Commands
//!
//! Everything the `mesa-cashier` binary can do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (CLI definition + dispatch)
//! ├── bill.rs     ◄─── summary, quote, split, ticket
//! ├── tables.rs   ◄─── Occupied tables from a /mesas dump
//! └── config.rs   ◄─── Effective configuration
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  $ mesa-cashier quote --bill mesa4.json --table 4 --tip 15% --amount 50 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Cli::parse() ──► CashierConfig::load(--config) ──► dispatch()          │
//! │                                                         │               │
//! │                                                         ▼               │
//! │  bill::quote(&args, &config) -> Result<String, AppError>                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stdout: text or JSON            stderr: tracing output                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers return their output instead of printing it so they can be tested.

pub mod bill;
pub mod config;
pub mod tables;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::error::AppError;
use crate::state::CashierConfig;

#[derive(Debug, Parser)]
#[command(
    name = "mesa-cashier",
    version,
    about = "Settle restaurant cuentas from saved bill JSON"
)]
pub struct Cli {
    /// Path to cashier.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Subtotal, discount, tip, total, paid and remaining
    Summary(BillArgs),

    /// What paying now would do, and the request that would be posted
    Quote {
        #[command(flatten)]
        bill: BillArgs,

        /// Amount to charge; empty means the whole remaining
        #[arg(long)]
        amount: Option<String>,

        /// efectivo, tarjeta or transferencia
        #[arg(long, default_value = "efectivo")]
        method: String,
    },

    /// Divide the final total between diners
    Split {
        #[command(flatten)]
        bill: BillArgs,

        /// Number of people
        #[arg(long, allow_negative_numbers = true)]
        people: i64,
    },

    /// Print the receipt ticket
    Ticket(BillArgs),

    /// List tables with an open cuenta from a `GET /mesas` dump
    Tables {
        /// JSON file with the table list
        #[arg(long)]
        file: PathBuf,

        /// Include tables without an open cuenta
        #[arg(long)]
        all: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Arguments shared by every bill command.
#[derive(Debug, Clone, Args)]
pub struct BillArgs {
    /// Bill detail JSON (the body of `GET /cuentas/mesa/{id}`)
    #[arg(long)]
    pub bill: PathBuf,

    /// Table number
    #[arg(long, default_value_t = 1)]
    pub table: i64,

    /// Discount as an amount (`15.00`) or a percentage (`10%`)
    #[arg(long)]
    pub discount: Option<String>,

    /// Tip as an amount (`22.50`) or a percentage (`15%`)
    #[arg(long)]
    pub tip: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Runs one parsed command against a loaded configuration.
pub fn dispatch(cli: &Cli, config: &CashierConfig) -> Result<String, AppError> {
    debug!(command = ?cli.command, "Dispatching command");

    match &cli.command {
        Command::Summary(args) => bill::summary(args, config),
        Command::Quote {
            bill: args,
            amount,
            method,
        } => bill::quote(args, config, amount.as_deref(), method),
        Command::Split { bill: args, people } => bill::split(args, config, *people),
        Command::Ticket(args) => bill::ticket(args, config),
        Command::Tables { file, all } => tables::list(file, *all),
        Command::Config { save } => config::show(config, *save, cli.config.clone()),
    }
}
