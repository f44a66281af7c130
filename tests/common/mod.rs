pub mod macros;

use async_trait::async_trait;
use civitas_core::config::AppConfig;
use civitas_core::{DecisionError, DecisionSource, Engine, GovernmentState};
use civitas_data::Agent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type StateMod = Box<dyn FnOnce(&mut GovernmentState)>;

/// Replies with the same decision to every agent and the same statement to every meeting prompt.
#[allow(dead_code)]
pub struct FixedSource {
    pub decision: String,
    pub statement: String,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FixedSource {
    pub fn new(decision: &str) -> Self {
        Self {
            decision: decision.to_string(),
            statement: "STATEMENT: Agreed, let us proceed.".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionSource for FixedSource {
    async fn decide(&self, _agent: &Agent, situation: &str) -> Result<String, DecisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if situation.contains("FORMAT: STATEMENT:") {
            Ok(self.statement.clone())
        } else {
            Ok(self.decision.clone())
        }
    }
}

#[allow(dead_code)]
pub struct EngineBuilder {
    config: AppConfig,
    source: Option<Arc<dyn DecisionSource>>,
    state_mods: Vec<StateMod>,
}

#[allow(dead_code)]
impl EngineBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.simulation.seed = Some(42);
        Self {
            config,
            source: None,
            state_mods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.simulation.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn DecisionSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Every agent acts every day.
    pub fn always_acting(self) -> Self {
        self.with_config(|c| c.agency.base_action_rate = 100.0)
    }

    pub fn with_state<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut GovernmentState) + 'static,
    {
        self.state_mods.push(Box::new(modifier));
        self
    }

    pub fn build(self) -> Engine {
        let mut engine = Engine::new(self.config).expect("valid config");
        if let Some(source) = self.source {
            engine = engine.with_source(source);
        }
        if !self.state_mods.is_empty() {
            let mut state = engine.state();
            for m in self.state_mods {
                m(&mut state);
            }
            engine = engine.with_state(state);
        }
        engine
    }
}

#[allow(dead_code)]
pub async fn run_days(engine: &mut Engine, days: u64) {
    for _ in 0..days {
        engine.advance_one_day().await;
    }
}
