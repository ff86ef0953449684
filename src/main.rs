//! Ultimarc I-PAC Input Monitor
//!
//! Command-line diagnostics for I-PAC arcade controllers: renders every
//! incoming input event as a human-readable line, tapping the input stack
//! at the layer the chosen subcommand selects.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let timeout = Duration::from_millis(cli.timeout_ms);

    match cli.command {
        Commands::List => commands::utility::list(cli.vendor_id)?,
        Commands::Hid { product_id } => commands::monitor::hid(cli.vendor_id, product_id, timeout)?,
        Commands::Raw { include_keyboard } => {
            commands::monitor::raw(cli.vendor_id, include_keyboard, timeout)?
        }
        Commands::Term => commands::term::run()?,
        #[cfg(target_os = "linux")]
        Commands::Tap => commands::tap::run(timeout)?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };

    fmt().with_env_filter(filter).with_target(false).init();
}
