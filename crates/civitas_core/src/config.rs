//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every tunable of the daily pipeline lives here.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impl)
//! 2. `config.toml` file (overrides defaults)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [simulation]
//! seed = 42
//!
//! [agency]
//! base_action_rate = 0.02
//! senior_multiplier = 2.0
//!
//! [meetings]
//! exchanges = 5
//! max_participants = 4
//! ```

use civitas_data::GoalPriority;
use serde::{Deserialize, Serialize};

/// Clock-level settings.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every stochastic decision; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Size of the retained event window.
    pub event_retention: usize,
    pub monologue_capacity: usize,
    /// Log a metrics summary every N days.
    pub metrics_log_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            event_retention: 100,
            monologue_capacity: 50,
            metrics_log_interval: 30,
        }
    }
}

/// Per-agent action likelihood and the pressure bonuses added on top of it.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AgencyConfig {
    /// Multiplied by effectiveness to get the base daily action probability.
    pub base_action_rate: f64,
    pub unemployment_threshold: f64,
    pub unemployment_bonus: f64,
    pub inflation_threshold: f64,
    pub inflation_bonus: f64,
    pub environment_threshold: f64,
    pub environment_bonus: f64,
    pub technology_threshold: f64,
    pub technology_bonus: f64,
    pub instability_threshold: f64,
    pub instability_bonus: f64,
    pub discontent_threshold: f64,
    pub discontent_bonus: f64,
    /// Applied to executive and legislative agents.
    pub senior_multiplier: f64,
    /// Effectiveness gained by an agent whose decision was applied.
    pub action_effectiveness_bonus: f64,
    pub relationship_strength_min: f64,
    pub relationship_strength_max: f64,
    pub relationship_influence_spread: f64,
}

impl Default for AgencyConfig {
    fn default() -> Self {
        Self {
            base_action_rate: 0.02,
            unemployment_threshold: 6.0,
            unemployment_bonus: 0.02,
            inflation_threshold: 4.0,
            inflation_bonus: 0.015,
            environment_threshold: 0.6,
            environment_bonus: 0.01,
            technology_threshold: 0.9,
            technology_bonus: 0.01,
            instability_threshold: 0.4,
            instability_bonus: 0.02,
            discontent_threshold: 0.3,
            discontent_bonus: 0.015,
            senior_multiplier: 2.0,
            action_effectiveness_bonus: 0.05,
            relationship_strength_min: 0.3,
            relationship_strength_max: 0.8,
            relationship_influence_spread: 0.2,
        }
    }
}

/// Inheritance rules for agents spawned by other agents.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    pub mutation_rate: f64,
    /// Maximum magnitude of a single trait mutation.
    pub mutation_amount: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            mutation_amount: 0.1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MeetingConfig {
    pub exchanges: usize,
    /// Including the organizer.
    pub max_participants: usize,
    pub speaker_bonus: f64,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            exchanges: 5,
            max_participants: 4,
            speaker_bonus: 0.02,
        }
    }
}

/// Reward table for completed goals, split by priority.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PriorityTable {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl PriorityTable {
    #[must_use]
    pub fn get(&self, priority: GoalPriority) -> f64 {
        match priority {
            GoalPriority::Critical => self.critical,
            GoalPriority::High => self.high,
            GoalPriority::Medium => self.medium,
            GoalPriority::Low => self.low,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GoalConfig {
    /// Fraction of `|target|` within which a goal counts as reached.
    pub completion_tolerance: f64,
    /// Deadline given to goals proposed by agents, in days.
    pub deadline_horizon_days: u64,
    /// Progress below which a goal past its deadline fails.
    pub failure_progress: f64,
    /// Total dollars split across assigned agents.
    pub rewards: PriorityTable,
    pub approval_boosts: PriorityTable,
    pub effectiveness_reward: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            completion_tolerance: 0.05,
            deadline_horizon_days: 180,
            failure_progress: 0.5,
            rewards: PriorityTable {
                critical: 50_000_000_000.0,
                high: 25_000_000_000.0,
                medium: 10_000_000_000.0,
                low: 5_000_000_000.0,
            },
            approval_boosts: PriorityTable {
                critical: 0.05,
                high: 0.03,
                medium: 0.02,
                low: 0.01,
            },
            effectiveness_reward: 0.1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ConstitutionConfig {
    pub violation_probability: f64,
    pub effectiveness_threshold: f64,
}

impl Default for ConstitutionConfig {
    fn default() -> Self {
        Self {
            violation_probability: 0.01,
            effectiveness_threshold: 0.9,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LegislatureConfig {
    /// Daily chance a law moves to its next stage.
    pub advance_probability: f64,
    /// Ideology distance beyond which the executive may veto.
    pub veto_threshold: f64,
    /// Daily chance an under-review proposal gets decided.
    pub review_probability: f64,
    pub approval_probability: f64,
}

impl Default for LegislatureConfig {
    fn default() -> Self {
        Self {
            advance_probability: 0.3,
            veto_threshold: 0.6,
            review_probability: 0.3,
            approval_probability: 0.7,
        }
    }
}

/// Settings for the generative-model decision source.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable the API key is read from.
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.8,
            timeout_secs: 60,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub agency: AgencyConfig,
    pub evolution: EvolutionConfig,
    pub meetings: MeetingConfig,
    pub goals: GoalConfig,
    pub constitution: ConstitutionConfig,
    pub legislature: LegislatureConfig,
    pub oracle: OracleConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.simulation.event_retention > 0,
            "Event retention must be positive"
        );
        anyhow::ensure!(
            self.simulation.monologue_capacity > 0,
            "Monologue capacity must be positive"
        );

        anyhow::ensure!(
            self.agency.base_action_rate >= 0.0,
            "Base action rate must be non-negative"
        );
        anyhow::ensure!(
            self.agency.senior_multiplier >= 0.0,
            "Senior multiplier must be non-negative"
        );
        anyhow::ensure!(
            self.agency.relationship_strength_min <= self.agency.relationship_strength_max,
            "Relationship strength range is inverted"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.agency.relationship_strength_min)
                && (0.0..=1.0).contains(&self.agency.relationship_strength_max),
            "Relationship strength must be within [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.agency.relationship_influence_spread),
            "Relationship influence spread must be within [0.0, 1.0]"
        );

        anyhow::ensure!(
            (0.0..=1.0).contains(&self.evolution.mutation_rate),
            "Mutation rate must be within [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.evolution.mutation_amount >= 0.0,
            "Mutation amount must be non-negative"
        );

        anyhow::ensure!(self.meetings.exchanges > 0, "Meetings need at least one exchange");
        anyhow::ensure!(
            self.meetings.max_participants >= 1,
            "Meetings need room for the organizer"
        );

        anyhow::ensure!(
            self.goals.completion_tolerance >= 0.0,
            "Completion tolerance must be non-negative"
        );
        for (name, table) in [("rewards", &self.goals.rewards), ("approval boosts", &self.goals.approval_boosts)] {
            anyhow::ensure!(
                table.critical >= 0.0 && table.high >= 0.0 && table.medium >= 0.0 && table.low >= 0.0,
                "Goal {} must be non-negative",
                name
            );
        }

        for (name, p) in [
            ("Violation probability", self.constitution.violation_probability),
            ("Advance probability", self.legislature.advance_probability),
            ("Review probability", self.legislature.review_probability),
            ("Approval probability", self.legislature.approval_probability),
        ] {
            anyhow::ensure!((0.0..=1.0).contains(&p), "{} must be within [0.0, 1.0]", name);
        }

        anyhow::ensure!(!self.oracle.model.is_empty(), "Oracle model must be set");

        Ok(())
    }

    /// Parses and validates a `config.toml` document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Hash over the behavioral sections, recorded on experiment runs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.simulation.seed).as_bytes());
        hasher.update(format!("{:?}", self.agency).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.meetings).as_bytes());
        hasher.update(format!("{:?}", self.goals).as_bytes());
        hasher.update(format!("{:?}", self.constitution).as_bytes());
        hasher.update(format!("{:?}", self.legislature).as_bytes());
        hex::encode(hasher.finalize())
    }
}
