//! Headless runner for the Civitas government simulation.

pub mod app;

pub use app::{App, RunOptions, RunOutcome, ShutdownManager};
