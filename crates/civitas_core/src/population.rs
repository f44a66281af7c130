//! Agent population upkeep and the read-only relationship graph view.

use crate::config::AgencyConfig;
use crate::context::DayContext;
use crate::state::GovernmentState;
use civitas_data::{Agent, AgentId, EventType, Relationship, RelationshipType};
use petgraph::graph::{DiGraph, NodeIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Relationship types a spontaneous partnership can take.
pub const PARTNERSHIP_TYPES: [RelationshipType; 3] = [
    RelationshipType::Collaborates,
    RelationshipType::Coordinates,
    RelationshipType::Coalition,
];

const PARTNERSHIP_KEYWORDS: [&str; 3] = ["coalition", "partner", "collaborate"];

/// Recomputes effectiveness from age, relationship count and a small random drift.
pub fn refresh_effectiveness<R: Rng>(agent: &mut Agent, rng: &mut R) {
    let age_bonus = (agent.age as f64 * 0.01).min(0.2);
    let relationship_bonus = agent.relationships.len() as f64 * 0.02;
    let drift = (rng.gen::<f64>() - 0.5) * 0.1;
    agent.adjust_effectiveness(age_bonus + relationship_bonus + drift);
}

/// End-of-day recompute over the whole population, agents created today included.
pub fn refresh_population<R: Rng>(state: &mut GovernmentState, rng: &mut R) {
    for agent in &mut state.agents {
        refresh_effectiveness(agent, rng);
    }
}

#[must_use]
pub fn mentions_partnership(action: &str) -> bool {
    let lower = action.to_lowercase();
    PARTNERSHIP_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Adds one edge from `agents[idx]` to a random peer it is not yet connected to.
///
/// Only the source's list grows; the peer gains no reverse edge.
pub fn form_random_relationship<R: Rng>(
    state: &mut GovernmentState,
    idx: usize,
    config: &AgencyConfig,
    ctx: &mut DayContext<'_, R>,
) -> Option<AgentId> {
    let source = state.agents.get(idx)?;
    let candidates: Vec<usize> = state
        .agents
        .iter()
        .enumerate()
        .filter(|(i, other)| *i != idx && !source.is_connected_to(&other.id))
        .map(|(i, _)| i)
        .collect();
    let &partner_idx = candidates.choose(ctx.rng)?;

    let kind = *PARTNERSHIP_TYPES.choose(ctx.rng)?;
    let strength = ctx
        .rng
        .gen_range(config.relationship_strength_min..=config.relationship_strength_max);
    let spread = config.relationship_influence_spread;
    let influence = ctx.rng.gen_range(-spread..=spread);

    let partner_id = state.agents[partner_idx].id.clone();
    let partner_name = state.agents[partner_idx].name.clone();
    let source = &mut state.agents[idx];
    source
        .relationships
        .push(Relationship::new(partner_id.clone(), kind, strength, influence));

    let description = format!(
        "{} formed {} relationship with {}",
        source.name,
        kind.as_str(),
        partner_name
    );
    let involved = vec![source.id.clone(), partner_id.clone()];
    ctx.emit(EventType::RelationshipFormed, description, involved, 0.1, true);
    Some(partner_id)
}

/// Directed view over the per-agent relationship lists. Dangling targets are skipped.
pub struct RelationshipGraph {
    pub graph: DiGraph<AgentId, RelationshipType>,
    index: HashMap<AgentId, NodeIndex>,
}

impl RelationshipGraph {
    #[must_use]
    pub fn build(agents: &[Agent]) -> Self {
        let mut graph = DiGraph::with_capacity(agents.len(), agents.len() * 2);
        let mut index = HashMap::with_capacity(agents.len());
        for agent in agents {
            let node = graph.add_node(agent.id.clone());
            index.insert(agent.id.clone(), node);
        }
        for agent in agents {
            let Some(&from) = index.get(&agent.id) else {
                continue;
            };
            for rel in &agent.relationships {
                if let Some(&to) = index.get(&rel.target_agent_id) {
                    graph.add_edge(from, to, rel.kind);
                }
            }
        }
        Self { graph, index }
    }

    /// Weakly connected groups of agents.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    #[must_use]
    pub fn out_degree(&self, id: &str) -> usize {
        self.index
            .get(id)
            .map(|&n| self.graph.neighbors(n).count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::context::{IdSource, RunModifiers};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_partnership_keywords() {
        assert!(mentions_partnership("Build a Coalition for reform"));
        assert!(mentions_partnership("We will collaborate"));
        assert!(!mentions_partnership("Cut spending"));
    }

    #[test]
    fn test_formed_relationship_is_one_directional() {
        let config = AppConfig::default();
        let mut ids = IdSource::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut state = GovernmentState::founding(100, &mut ids);
        let mut outbox = Vec::new();
        let idx = state.agent_index("chief-justice").unwrap();
        let mut ctx = DayContext {
            config: &config,
            rng: &mut rng,
            ids: &mut ids,
            outbox: &mut outbox,
            modifiers: RunModifiers::default(),
            day: 1,
        };

        let partner = form_random_relationship(&mut state, idx, &config.agency, &mut ctx).unwrap();
        let justice = &state.agents[idx];
        assert_eq!(justice.relationships.len(), 1);
        let rel = &justice.relationships[0];
        assert!(PARTNERSHIP_TYPES.contains(&rel.kind));
        assert!((0.3..=0.8).contains(&rel.strength));
        assert!((-0.2..=0.2).contains(&rel.influence));
        assert!(!state.agent(&partner).unwrap().is_connected_to("chief-justice"));
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].event_type, EventType::RelationshipFormed);
    }

    #[test]
    fn test_fully_connected_agent_forms_nothing() {
        let config = AppConfig::default();
        let mut ids = IdSource::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut state = GovernmentState::founding(100, &mut ids);
        state.agents.truncate(1);
        let mut outbox = Vec::new();
        let mut ctx = DayContext {
            config: &config,
            rng: &mut rng,
            ids: &mut ids,
            outbox: &mut outbox,
            modifiers: RunModifiers::default(),
            day: 1,
        };
        assert!(form_random_relationship(&mut state, 0, &config.agency, &mut ctx).is_none());
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_population_refresh_reaches_new_agents() {
        let mut ids = IdSource::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut state = GovernmentState::founding(100, &mut ids);
        let mut child = state.agents[0].clone();
        child.id = "president-a1".into();
        child.age = 30;
        child.relationships.clear();
        child.set_effectiveness(0.1);
        state.agents.push(child);

        refresh_population(&mut state, &mut rng);
        // Age bonus 0.2 minus at most 0.05 of drift.
        let child = state.agent("president-a1").unwrap();
        assert!(child.effectiveness >= 0.25, "got {}", child.effectiveness);
    }

    #[test]
    fn test_founding_graph_clusters() {
        let mut ids = IdSource::new(0);
        let state = GovernmentState::founding(100, &mut ids);
        let graph = RelationshipGraph::build(&state.agents);
        // president + 3 secretaries, vp + senate leader, and four isolated offices.
        assert_eq!(graph.cluster_count(), 6);
        assert_eq!(graph.out_degree("president"), 3);
    }
}
