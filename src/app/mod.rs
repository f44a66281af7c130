pub mod shutdown;
pub mod state;

pub use shutdown::ShutdownManager;
pub use state::{App, RunOptions, RunOutcome};

use anyhow::Result;
use tracing::info;

impl App {
    /// Advances up to `options.days` days, checking for shutdown between days.
    pub async fn run(&mut self, shutdown: &ShutdownManager) -> Result<RunOutcome> {
        if let Some(experiment) = self.options.experiment.clone() {
            let run_id = self.engine.start_experiment(experiment)?;
            info!(run_id = %run_id, "Recording experiment");
        }

        let mut days_run = 0;
        let mut interrupted = false;
        while days_run < self.options.days {
            if shutdown.is_shutdown_requested() {
                interrupted = true;
                break;
            }
            let report = self.engine.advance_one_day().await;
            days_run += 1;

            for pattern in &report.patterns {
                info!(day = report.day, "Emergent pattern: {}", pattern.description);
            }
            if let Some(run) = report.finished_run {
                info!(run_id = %run.run_id, day = report.day, "Experiment reached its duration");
                self.finished_run = Some(run);
            }
        }

        let state = self.engine.view();
        info!(
            days_run,
            day = state.day,
            agents = state.agents.len(),
            approval = state.public_approval,
            budget = state.total_budget,
            interrupted,
            "Run finished"
        );

        let run = shutdown.cleanup(self)?;
        Ok(RunOutcome {
            days_run,
            interrupted,
            run,
        })
    }
}
