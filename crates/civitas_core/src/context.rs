use crate::config::AppConfig;
use chrono::Utc;
use civitas_data::{AgentId, Event, EventType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// Seeded id stream, kept apart from the behavioral RNG so minting ids never
/// shifts the sequence of stochastic decisions.
#[derive(Debug, Clone)]
pub struct IdSource {
    rng: ChaCha8Rng,
    agent_seq: u64,
}

impl IdSource {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed ^ 0x1D5_1D5_1D5),
            agent_seq: 0,
        }
    }

    pub fn next_uuid(&mut self) -> Uuid {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }

    /// Child agent id derived from its parent, unique for the lifetime of the source.
    pub fn next_agent_id(&mut self, parent: &str) -> AgentId {
        self.agent_seq += 1;
        format!("{}-a{}", parent, self.agent_seq)
    }
}

/// Switches an active experiment run applies to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunModifiers {
    pub action_probability_multiplier: f64,
    pub goal_incentives: bool,
    pub budget_constraints: bool,
}

impl Default for RunModifiers {
    fn default() -> Self {
        Self {
            action_probability_multiplier: 1.0,
            goal_incentives: true,
            budget_constraints: false,
        }
    }
}

/// Everything a phase needs besides the state it mutates.
///
/// Events raised during a phase land in `outbox`; the engine publishes them
/// in order once the phase returns.
pub struct DayContext<'a, R: Rng> {
    pub config: &'a AppConfig,
    pub rng: &'a mut R,
    pub ids: &'a mut IdSource,
    pub outbox: &'a mut Vec<Event>,
    pub modifiers: RunModifiers,
    pub day: u64,
}

impl<R: Rng> DayContext<'_, R> {
    pub fn emit(
        &mut self,
        event_type: EventType,
        description: impl Into<String>,
        involved_agents: Vec<AgentId>,
        impact: f64,
        public: bool,
    ) {
        let impact = if impact.is_finite() { impact.clamp(-1.0, 1.0) } else { 0.0 };
        self.outbox.push(Event {
            id: self.ids.next_uuid(),
            event_type,
            description: description.into(),
            timestamp: Utc::now(),
            day: self.day,
            involved_agents,
            impact,
            public,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_reproducible_per_seed() {
        let mut a = IdSource::new(9);
        let mut b = IdSource::new(9);
        assert_eq!(a.next_uuid(), b.next_uuid());
        assert_ne!(a.next_uuid(), IdSource::new(10).next_uuid());
    }

    #[test]
    fn test_agent_ids_are_unique() {
        let mut ids = IdSource::new(1);
        let first = ids.next_agent_id("president");
        let second = ids.next_agent_id("president");
        assert_ne!(first, second);
        assert!(first.starts_with("president-"));
    }

    #[test]
    fn test_emit_clamps_impact() {
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ids = IdSource::new(0);
        let mut outbox = Vec::new();
        let mut ctx = DayContext {
            config: &config,
            rng: &mut rng,
            ids: &mut ids,
            outbox: &mut outbox,
            modifiers: RunModifiers::default(),
            day: 3,
        };
        ctx.emit(EventType::AgentAction, "x", vec![], 4.0, true);
        assert_eq!(outbox[0].impact, 1.0);
        assert_eq!(outbox[0].day, 3);
    }
}
