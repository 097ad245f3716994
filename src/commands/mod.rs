//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `run.rs`: Deduplicate a record file
//! - `config.rs`: Configuration display command
//! - `check_key.rs`: Key expression evaluation

mod check_key;
mod config;
mod run;

// Re-export command functions
pub use check_key::cmd_check_key;
pub use config::cmd_config;
pub use run::{RunArgs, cmd_run};
