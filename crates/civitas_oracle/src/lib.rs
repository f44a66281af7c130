//! Decision sources for the Civitas engine.
//!
//! The engine only sees the [`civitas_core::DecisionSource`] trait; this crate
//! supplies a generative-model client and offline sources.

pub mod gemini;
pub mod prompt;
pub mod scripted;

pub use gemini::GeminiOracle;
pub use scripted::{ScriptedOracle, UnavailableOracle};
