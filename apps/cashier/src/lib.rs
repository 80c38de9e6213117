//! # Mesa Cashier Library
//!
//! The cashier side of Mesa POS: settles one table's cuenta at a time
//! against the cuentas REST API.
//!
//! ## Module Organization
//! ```text
//! mesa_cashier/
//! ├── lib.rs          ◄─── You are here (startup: logging, config, dispatch)
//! ├── gateway.rs      ◄─── BillGateway trait + FileGateway
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── CashierConfig (cashier.toml + MESA_* vars)
//! │   └── session.rs  ◄─── SettlementSession
//! ├── commands/
//! │   ├── mod.rs      ◄─── CLI definition
//! │   ├── bill.rs     ◄─── summary / quote / split / ticket
//! │   ├── tables.rs   ◄─── occupied tables
//! │   └── config.rs   ◄─── effective configuration
//! └── error.rs        ◄─── AppError for commands
//! ```
//!
//! All bill math lives in `mesa_core`; this crate only wires it to I/O.

pub mod commands;
pub mod error;
pub mod gateway;
pub mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::Cli;
use error::AppError;
use state::CashierConfig;

/// Loads the configuration and runs one command.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Command Startup                                   │
/// │                                                                         │
/// │  1. Load Config ──────────────────────────────────────────────────────► │
/// │     • defaults → cashier.toml (--config or platform dir) → MESA_*      │
/// │     • validated before anything else runs                               │
/// │                                                                         │
/// │  2. Dispatch ─────────────────────────────────────────────────────────► │
/// │     • one SettlementSession per bill command                            │
/// │     • output returned as a String for main to print                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run(cli: &Cli) -> Result<String, AppError> {
    let config = CashierConfig::load(cli.config.clone())?;
    info!(restaurant = %config.restaurant_name, "Cashier config loaded");

    commands::dispatch(cli, &config)
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays clean.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=mesa_cashier=trace` - Show trace for the cashier only
/// - Default: INFO
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
