//! Command-line entry point.
//!
//! A thin wrapper around the `safe_link_scanner` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Exit codes
//!
//! Exit status is 0 on success, 1 when the batch could not run, and 2 when
//! `--fail-on-suspicious` is set and at least one URL was flagged.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use safe_link_scanner::initialization::init_logger_with;
use safe_link_scanner::{run_batch, Config};

const EXIT_SUSPICIOUS: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // CHROME_PATH and SAFE_LINK_SUMMARIZER_CMD may live in a .env file, either
    // in the current directory or next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let fail_on_suspicious = config.fail_on_suspicious;
    match run_batch(config).await {
        Ok(report) => {
            if fail_on_suspicious && report.suspicious > 0 {
                process::exit(EXIT_SUSPICIOUS);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("safe_link_scanner error: {:#}", e);
            process::exit(1);
        }
    }
}
