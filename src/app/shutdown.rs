//! Stopping a headless run between days.
//!
//! The day in progress always completes; the experiment is still finalized
//! and exported afterwards.

use anyhow::Result;
use civitas_core::telemetry::ExperimentRun;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag. Clones observe the same request.
#[derive(Clone, Default)]
pub struct ShutdownManager {
    stop_requested: Arc<AtomicBool>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_shutdown(&self) {
        if !self.stop_requested.swap(true, Ordering::SeqCst) {
            tracing::info!("Stop requested; finishing the current day");
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Requests a stop on the first Ctrl-C.
    pub fn listen_for_ctrl_c(&self) {
        let handle = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.request_shutdown();
            }
        });
    }

    /// Ends the active experiment, writes the requested exports and saves the state.
    pub fn cleanup(&self, app: &mut crate::app::App) -> Result<Option<ExperimentRun>> {
        let run = app.finalize()?;
        tracing::debug!(
            recorded = run.is_some(),
            interrupted = self.is_shutdown_requested(),
            "Run finalized"
        );
        Ok(run)
    }
}
