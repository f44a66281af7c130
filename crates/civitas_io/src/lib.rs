//! # Civitas IO
//!
//! Filesystem boundary for the Civitas simulation: configuration loading and
//! experiment exports.

/// Loading `config.toml` and experiment definitions
pub mod config;
/// Error types and result aliases for I/O operations
pub mod error;
/// Experiment exports and state dumps
pub mod export;

pub use config::{load_config, load_experiment};
pub use error::{IoError, Result};
pub use export::{write_json_file, write_run_csv, write_run_json};
