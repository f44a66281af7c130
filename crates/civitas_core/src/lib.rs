//! # Civitas Core
//!
//! The simulation engine for Civitas, an agent-based model of a self-organizing
//! government.
//!
//! This crate contains the day clock and every phase it runs:
//! - External conditions that drift day by day
//! - Autonomous agent decisions, fetched from a pluggable decision source
//! - Meetings, collective goals, the legislature and constitutional review
//! - Experiment recording with snapshots, emergent-pattern detection and exports
//!
//! ## Architecture
//!
//! - **Single owner**: the [`engine::Engine`] owns the [`state::GovernmentState`]
//!   and mutates it in a fixed phase order
//! - **Fan-out / fan-in**: decision requests for one day run concurrently and
//!   are applied sequentially in population order
//! - **Deterministic simulation**: seeded RNG streams for reproducible runs
//!
//! ## Example
//!
//! ```no_run
//! use civitas_core::config::AppConfig;
//! use civitas_core::engine::Engine;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let mut engine = Engine::new(AppConfig::default())?;
//! let report = engine.advance_one_day().await;
//! assert_eq!(report.day, 1);
//! # Ok(())
//! # }
//! ```

/// Decision pipeline: who acts today and what their decisions change
pub mod agency;
/// External conditions random walk
pub mod conditions;
/// Configuration management for simulation parameters
pub mod config;
/// Constitutional compliance monitor
pub mod constitution;
/// Per-day context handed to every phase
pub mod context;
/// Decision source contract and decision parsing
pub mod decision;
/// The day clock
pub mod engine;
pub mod error;
/// Event fan-out to subscribers
pub mod events;
/// Agent creation and personality inheritance
pub mod genesis;
/// Collective goal tracking and rewards
pub mod goals;
pub mod legislature;
/// Meeting orchestration
pub mod meetings;
/// Performance metrics and structured logging
pub mod metrics;
/// Relationships and the relationship graph
pub mod population;
pub mod state;
/// Experiment recording and exports
pub mod telemetry;

pub use decision::{Decision, DecisionSource};
pub use engine::{DayReport, Engine, ProposalDraft};
pub use error::{DecisionError, EngineError, TelemetryError};
pub use state::GovernmentState;
