// src/lib.rs

pub mod cli;
pub mod config;
pub mod discover;
pub mod dispatch;
pub mod driver;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod watch;

use anyhow::Context;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::Settings;
use crate::dispatch::ProcessRunner;
use crate::driver::Driver;
use crate::errors::Result;
use crate::watch::NotifyRegistry;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings validation
/// - script discovery and watch registration
/// - the event dispatcher
/// - Ctrl-C handling
///
/// Returns immediately when no trigger scripts exist; otherwise blocks until
/// Ctrl-C. Running scripts are not waited for on interrupt.
pub async fn run(args: CliArgs) -> Result<()> {
    if args.version {
        println!("{}", cli::VERSION);
        return Ok(());
    }

    let settings = Settings::try_from(args)?;

    let registry = NotifyRegistry::new()?;
    let mut driver = Driver::new(registry, ProcessRunner::new());

    if !driver.start(&settings.script_name, &settings.root)? {
        println!("{}", no_scripts_message(&settings));
        driver.stop();
        return Ok(());
    }

    println!("Press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("listening for Ctrl-C")?;

    info!("interrupt received; exiting");
    Ok(())
}

fn no_scripts_message(settings: &Settings) -> String {
    format!(
        "No scripts named '{}' found in '{}' or its subfolders!",
        settings.script_name,
        settings.root.display()
    )
}
