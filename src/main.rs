use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::{debug, warn};

use tfsetup::cli::Cli;
use tfsetup::commands::cmd_setup;
use tfsetup::interrupt::Interrupt;
use tfsetup::{SetupConfig, detect_platform};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = SetupConfig::new(cli.mode());
    if !config.color {
        colored::control::set_override(false);
    }
    debug!(mode = ?config.mode, "starting");

    let interrupt = Interrupt::new();
    if let Err(e) = interrupt.install_handler() {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let platform = match detect_platform() {
        Ok(platform) => platform,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            return ExitCode::FAILURE;
        }
    };

    match cmd_setup(&config, platform, &interrupt) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red(), e);
            ExitCode::FAILURE
        }
    }
}
