//! Experiment recording: snapshots, event capture, emergent-pattern detection
//! and run summaries.
//!
//! At most one run records at a time. Completed runs move into the logger's
//! history and are never mutated again.

pub mod export;
pub mod patterns;
pub mod snapshot;

pub use patterns::{detect_emergent_patterns, EmergentPattern, PatternType};
pub use snapshot::{create_snapshot, AgentBudget, DataSnapshot};

use crate::context::RunModifiers;
use crate::error::TelemetryError;
use crate::state::GovernmentState;
use chrono::{DateTime, Utc};
use civitas_data::{Event, ExternalConditions, LawStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExperimentParameters {
    pub action_probability_multiplier: f64,
    /// When false, completed goals pay out nothing.
    pub goal_incentives: bool,
    /// Caps budget increases at the unallocated budget.
    pub budget_constraints: bool,
    /// Free-form parameters recorded with the run.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for ExperimentParameters {
    fn default() -> Self {
        Self {
            action_probability_multiplier: 1.0,
            goal_incentives: true,
            budget_constraints: false,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExperimentConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Auto-end after this many days; 0 keeps the run open until ended.
    pub duration_days: u64,
    /// Take a snapshot every N days.
    pub snapshot_interval: u64,
    /// Replaces the external conditions when the run starts.
    pub initial_conditions: Option<ExternalConditions>,
    pub parameters: ExperimentParameters,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            id: "experiment".to_string(),
            name: "Experiment".to_string(),
            description: String::new(),
            duration_days: 0,
            snapshot_interval: 1,
            initial_conditions: None,
            parameters: ExperimentParameters::default(),
        }
    }
}

impl ExperimentConfig {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.to_lowercase().replace(char::is_whitespace, "-"),
            name,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.snapshot_interval == 0 {
            return Err(TelemetryError::InvalidConfig(
                "snapshot_interval must be at least 1".into(),
            ));
        }
        let m = self.parameters.action_probability_multiplier;
        if !m.is_finite() || m < 0.0 {
            return Err(TelemetryError::InvalidConfig(format!(
                "action_probability_multiplier must be a non-negative number, got {m}"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn modifiers(&self) -> RunModifiers {
        RunModifiers {
            action_probability_multiplier: self.parameters.action_probability_multiplier,
            goal_incentives: self.parameters.goal_incentives,
            budget_constraints: self.parameters.budget_constraints,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExperimentSummary {
    pub total_days: u64,
    pub total_agents_created: i64,
    pub total_goals_completed: usize,
    pub total_meetings_held: usize,
    pub total_laws_enacted: usize,
    pub final_public_approval: f64,
    pub avg_effectiveness: f64,
    pub emergent_patterns: Vec<EmergentPattern>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExperimentRun {
    pub experiment_id: String,
    pub run_id: String,
    pub config: ExperimentConfig,
    pub config_fingerprint: String,
    pub start_day: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub snapshots: Vec<DataSnapshot>,
    pub events: Vec<Event>,
    pub summary: ExperimentSummary,
}

impl ExperimentRun {
    /// Days elapsed since the run started, as of `day`.
    #[must_use]
    pub fn elapsed_days(&self, day: u64) -> u64 {
        day.saturating_sub(self.start_day)
    }

    fn finalize(&mut self) {
        self.end_time = Some(Utc::now());
        let (Some(first), Some(last)) = (self.snapshots.first(), self.snapshots.last()) else {
            return;
        };
        self.summary.total_days = last.day;
        self.summary.total_agents_created = last.total_agents as i64 - first.total_agents as i64;
        self.summary.total_goals_completed = last.completed_goals;
        self.summary.total_meetings_held = last.total_meetings;
        self.summary.total_laws_enacted = last
            .laws_by_status
            .get(LawStatus::Enacted.as_str())
            .copied()
            .unwrap_or(0);
        self.summary.final_public_approval = last.public_approval;
        self.summary.avg_effectiveness = last.avg_effectiveness;
    }
}

/// Identity of a run being started.
#[derive(Debug, Clone)]
pub struct RunStamp {
    pub run_id: String,
    pub start_day: u64,
    pub config_fingerprint: String,
}

#[derive(Debug, Default)]
pub struct DataLogger {
    current: Option<ExperimentRun>,
    previous: Option<DataSnapshot>,
    history: Vec<ExperimentRun>,
}

impl DataLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_experiment(&mut self, config: ExperimentConfig, stamp: RunStamp) -> Result<&ExperimentRun, TelemetryError> {
        if let Some(run) = &self.current {
            return Err(TelemetryError::ExperimentAlreadyActive {
                run_id: run.run_id.clone(),
            });
        }
        config.validate()?;
        info!(experiment = %config.name, run_id = %stamp.run_id, start_day = stamp.start_day, "Experiment started");
        self.previous = None;
        Ok(&*self.current.insert(ExperimentRun {
            experiment_id: config.id.clone(),
            run_id: stamp.run_id,
            config,
            config_fingerprint: stamp.config_fingerprint,
            start_day: stamp.start_day,
            start_time: Utc::now(),
            end_time: None,
            snapshots: Vec::new(),
            events: Vec::new(),
            summary: ExperimentSummary::default(),
        }))
    }

    /// Whether the active run wants a snapshot on `day`.
    #[must_use]
    pub fn snapshot_due(&self, day: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|run| run.elapsed_days(day) % run.config.snapshot_interval.max(1) == 0)
    }

    /// Whether the active run has reached its configured duration on `day`.
    #[must_use]
    pub fn duration_reached(&self, day: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|run| run.config.duration_days > 0 && run.elapsed_days(day) >= run.config.duration_days)
    }

    /// Records a snapshot of `state` and returns the patterns it revealed. No-op without an active run.
    pub fn log_snapshot(&mut self, state: &GovernmentState) -> Vec<EmergentPattern> {
        let Some(run) = self.current.as_mut() else {
            return Vec::new();
        };
        let snapshot = create_snapshot(state, self.previous.as_ref());
        let patterns = match &self.previous {
            Some(prev) => detect_emergent_patterns(prev, &snapshot),
            None => Vec::new(),
        };
        for pattern in &patterns {
            info!(day = pattern.detected_at, pattern = ?pattern.pattern_type, "{}", pattern.description);
        }
        run.summary.emergent_patterns.extend(patterns.iter().cloned());
        run.snapshots.push(snapshot.clone());
        self.previous = Some(snapshot);
        patterns
    }

    /// Appends an event to the active run. No-op without one.
    pub fn log_event(&mut self, event: &Event) {
        if let Some(run) = self.current.as_mut() {
            run.events.push(event.clone());
        }
    }

    /// Finalizes the summary and moves the run into history.
    pub fn end_experiment(&mut self) -> Result<ExperimentRun, TelemetryError> {
        let mut run = self.current.take().ok_or(TelemetryError::NoActiveExperiment)?;
        run.finalize();
        self.previous = None;
        info!(
            run_id = %run.run_id,
            snapshots = run.snapshots.len(),
            events = run.events.len(),
            patterns = run.summary.emergent_patterns.len(),
            "Experiment ended"
        );
        self.history.push(run.clone());
        Ok(run)
    }

    #[must_use]
    pub fn current_run(&self) -> Option<&ExperimentRun> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn modifiers(&self) -> RunModifiers {
        self.current
            .as_ref()
            .map_or_else(RunModifiers::default, |run| run.config.modifiers())
    }

    #[must_use]
    pub fn history(&self) -> &[ExperimentRun] {
        &self.history
    }
}
