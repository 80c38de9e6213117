//! # Mesa Cashier Entry Point
//!
//! ```text
//! $ mesa-cashier summary --bill mesa4.json --table 4 --tip 15%
//! $ mesa-cashier quote   --bill mesa4.json --table 4 --amount 50 --method tarjeta
//! $ mesa-cashier split   --bill mesa4.json --people 3
//! $ mesa-cashier ticket  --bill mesa4.json --table 4
//! $ mesa-cashier tables  --file mesas.json
//! $ mesa-cashier config
//! ```
//!
//! The actual setup is in lib.rs for better testability.

use std::process::ExitCode;

use clap::Parser;
use mesa_cashier::commands::Cli;

fn main() -> ExitCode {
    mesa_cashier::init_tracing();

    let cli = Cli::parse();
    match mesa_cashier::run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err.message);
            ExitCode::from(err.code.exit_code())
        }
    }
}
