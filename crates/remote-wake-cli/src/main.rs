//! remote-wake CLI - wake and monitor devices on the local network.
//!
//! Manages the device registry, sends Wake-on-LAN packets, reports online
//! status through the cached presence detector and scans the LAN for
//! candidate devices.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use commands::Context;
use error::{exit_codes, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(cli.data_dir, cli.json)?;

    match cli.command {
        Commands::Devices(args) => commands::run_devices(args, &ctx).await,
        Commands::Wake(args) => commands::run_wake(args, &ctx).await,
        Commands::Status(args) => commands::run_status(args, &ctx).await,
        Commands::Scan(args) => commands::run_scan(args, &ctx).await,
    }
}
