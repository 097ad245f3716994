//! Config command handler.
//!
//! Contains the implementation of the `config` CLI command.

use std::path::Path;
use uniqflow::config::UniqflowConfig;
use uniqflow::observability::LoggingConfig;
use uniqflow::{KeyExpression, Result};

/// Config command.
pub fn cmd_config(config: &UniqflowConfig, explicit: Option<&Path>, show: bool) -> Result<()> {
    if !show {
        println!("Config file locations (first found wins):");
        if let Some(path) = explicit {
            println!("  - {} (from --config)", path.display());
        }
        for path in UniqflowConfig::default_paths() {
            let marker = if path.exists() { " (found)" } else { "" };
            println!("  - {}{marker}", path.display());
        }
        println!();
        println!("Use --show to display the effective configuration.");
        return Ok(());
    }

    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("Deduplication:");
    println!("  Unique Key: {}", config.dedup.unique_key);
    match KeyExpression::parse(&config.dedup.unique_key) {
        Ok(expression) => println!("  References: {}", expression.references().join(", ")),
        Err(e) => println!("  References: (invalid: {e})"),
    }
    println!("  Policy: {}", config.dedup.policy());
    match config.dedup.batch_limit() {
        Some(limit) => println!("  Bulk Size: {limit}"),
        None => println!("  Bulk Size: unbounded"),
    }
    println!();

    let logging = LoggingConfig::from_settings(Some(&config.logging), false);
    println!("Logging:");
    println!("  Format: {}", logging.format);
    println!("  Filter: {}", logging.filter);
    match &logging.file {
        Some(path) => println!("  File: {}", path.display()),
        None => println!("  File: (stderr)"),
    }
    println!();

    println!("As TOML:");
    println!("{}", config.to_toml()?);
    Ok(())
}
