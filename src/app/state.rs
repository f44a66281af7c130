use anyhow::Result;
use civitas_core::config::AppConfig;
use civitas_core::telemetry::{ExperimentConfig, ExperimentRun};
use civitas_core::{DecisionSource, Engine};
use std::path::PathBuf;
use std::sync::Arc;

/// What a headless run should do besides advancing days.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub days: u64,
    /// Started before the first day when set.
    pub experiment: Option<ExperimentConfig>,
    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    /// Final government state as JSON.
    pub save_state: Option<PathBuf>,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub days_run: u64,
    /// Shutdown was requested before all days ran.
    pub interrupted: bool,
    pub run: Option<ExperimentRun>,
}

pub struct App {
    pub engine: Engine,
    pub options: RunOptions,
    /// Run finished by the engine when its duration was reached.
    pub(crate) finished_run: Option<ExperimentRun>,
}

impl App {
    pub fn new(config: AppConfig, source: Option<Arc<dyn DecisionSource>>, options: RunOptions) -> Result<Self> {
        let mut engine = Engine::new(config)?;
        if let Some(source) = source {
            engine = engine.with_source(source);
        }
        Ok(Self {
            engine,
            options,
            finished_run: None,
        })
    }

    /// Ends the active experiment, if any, and writes every requested export.
    pub fn finalize(&mut self) -> Result<Option<ExperimentRun>> {
        let run = match self.engine.current_experiment() {
            Some(_) => Some(self.engine.end_experiment()?),
            None => self.finished_run.take(),
        };

        if let Some(run) = &run {
            if let Some(path) = &self.options.export_json {
                civitas_io::write_run_json(run, path)?;
            }
            if let Some(path) = &self.options.export_csv {
                civitas_io::write_run_csv(run, path)?;
            }
        }
        if let Some(path) = &self.options.save_state {
            civitas_io::write_json_file(self.engine.view(), path)?;
            tracing::info!(path = %path.display(), "Government state saved");
        }
        Ok(run)
    }
}
