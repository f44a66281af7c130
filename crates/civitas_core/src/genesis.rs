//! Agent construction: per-type baselines, personality inheritance and child synthesis.

use crate::config::EvolutionConfig;
use crate::context::IdSource;
use chrono::Utc;
use civitas_data::{
    Agent, AgentStatus, AgentType, LeadershipStyle, Personality, Position,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Vocabulary a child draws its extra specialization from.
pub const SPECIALIZATIONS: [&str; 10] = [
    "technology",
    "environment",
    "healthcare",
    "education",
    "transportation",
    "energy",
    "agriculture",
    "veterans",
    "housing",
    "immigration",
];

/// Starting budget line for a new agent of `agent_type`, in dollars.
#[must_use]
pub fn baseline_budget(agent_type: AgentType) -> f64 {
    match agent_type {
        AgentType::Executive => 15_000_000.0,
        AgentType::Legislative => 5_000_000.0,
        AgentType::Judicial => 8_000_000.0,
        AgentType::Department => 50_000_000_000.0,
        AgentType::Agency => 10_000_000_000.0,
        AgentType::Committee => 5_000_000.0,
        AgentType::Taskforce => 100_000_000.0,
        AgentType::Oversight => 50_000_000.0,
        AgentType::Emergency => 500_000_000.0,
        AgentType::Coalition => 0.0,
    }
}

#[must_use]
pub fn baseline_staff(agent_type: AgentType) -> u32 {
    match agent_type {
        AgentType::Executive => 500,
        AgentType::Legislative => 100,
        AgentType::Judicial => 200,
        AgentType::Department => 50_000,
        AgentType::Agency => 15_000,
        AgentType::Committee => 50,
        AgentType::Taskforce => 500,
        AgentType::Oversight => 200,
        AgentType::Emergency => 1_000,
        AgentType::Coalition => 0,
    }
}

#[must_use]
pub fn term_limit(agent_type: AgentType) -> Option<u32> {
    match agent_type {
        AgentType::Executive => Some(8),
        AgentType::Legislative => Some(12),
        _ => None,
    }
}

/// Classifies a free-text entity name. Anything unrecognized becomes an agency.
#[must_use]
pub fn infer_agent_type(name: &str) -> AgentType {
    let lower = name.to_lowercase();
    if lower.contains("department") {
        AgentType::Department
    } else if lower.contains("committee") {
        AgentType::Committee
    } else if lower.contains("task force") || lower.contains("taskforce") {
        AgentType::Taskforce
    } else if lower.contains("oversight") {
        AgentType::Oversight
    } else if lower.contains("emergency") {
        AgentType::Emergency
    } else {
        AgentType::Agency
    }
}

/// Builds an agent at the effectiveness floor with the per-type baselines.
#[must_use]
pub fn create_agent(
    id: impl Into<String>,
    name: impl Into<String>,
    agent_type: AgentType,
    personality: Personality,
    position: Position,
    can_create_agents: bool,
) -> Agent {
    let name = name.into();
    Agent {
        id: id.into(),
        role: name.clone(),
        name,
        agent_type,
        personality,
        position,
        relationships: Vec::new(),
        effectiveness: civitas_data::EFFECTIVENESS_FLOOR,
        age: 0,
        can_create_agents,
        can_expand_authority: matches!(agent_type, AgentType::Executive | AgentType::Department),
        status: AgentStatus::Active,
        budget: Some(baseline_budget(agent_type)),
        staff_count: Some(baseline_staff(agent_type)),
        created_by: None,
        created_at: Utc::now(),
        term_limit: term_limit(agent_type),
        current_term: Some(1),
        inner_monologue: VecDeque::new(),
    }
}

fn mutate_value<R: Rng>(value: f64, config: &EvolutionConfig, min: f64, max: f64, rng: &mut R) -> f64 {
    if rng.gen_bool(config.mutation_rate) {
        let change = rng.gen_range(-config.mutation_amount..=config.mutation_amount);
        (value + change).clamp(min, max)
    } else {
        value
    }
}

/// Child personality: every scalar independently mutated, style occasionally
/// re-rolled, and one fresh specialization appended.
pub fn inherit_personality<R: Rng>(parent: &Personality, config: &EvolutionConfig, rng: &mut R) -> Personality {
    let risk_tolerance = mutate_value(parent.risk_tolerance, config, 0.0, 1.0, rng);
    let innovation = mutate_value(parent.innovation, config, 0.0, 1.0, rng);
    let collaboration = mutate_value(parent.collaboration, config, 0.0, 1.0, rng);
    let leadership_style = if rng.gen_bool(config.mutation_rate) {
        *LeadershipStyle::HERITABLE
            .choose(rng)
            .unwrap_or(&parent.leadership_style)
    } else {
        parent.leadership_style
    };
    let mut specializations = parent.specializations.clone();
    if let Some(spec) = SPECIALIZATIONS.choose(rng) {
        specializations.push((*spec).to_string());
    }
    let ideology_lean = mutate_value(parent.ideology_lean, config, -1.0, 1.0, rng);
    let decision_speed = mutate_value(parent.decision_speed, config, 0.0, 1.0, rng);

    Personality {
        risk_tolerance,
        innovation,
        collaboration,
        decision_speed,
        ideology_lean,
        leadership_style,
        specializations,
    }
}

/// Synthesizes the entity a parent asked to create.
///
/// The child sits one level below its parent in the same branch; budget and
/// staff come from the type baselines, not from the parent.
pub fn spawn_child<R: Rng>(
    parent: &Agent,
    entity_name: &str,
    config: &EvolutionConfig,
    ids: &mut IdSource,
    rng: &mut R,
) -> Agent {
    let agent_type = infer_agent_type(entity_name);
    let personality = inherit_personality(&parent.personality, config, rng);
    let position = Position {
        branch: parent.position.branch,
        level: parent.position.level + 1,
    };
    let mut child = create_agent(
        ids.next_agent_id(&parent.id),
        entity_name.trim(),
        agent_type,
        personality,
        position,
        matches!(agent_type, AgentType::Department | AgentType::Agency),
    );
    child.created_by = Some(parent.id.clone());
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_data::Branch;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn parent() -> Agent {
        create_agent(
            "sec-treasury",
            "Secretary of Treasury",
            AgentType::Department,
            Personality {
                risk_tolerance: 0.2,
                innovation: 0.6,
                collaboration: 0.7,
                decision_speed: 0.5,
                ideology_lean: 0.1,
                leadership_style: LeadershipStyle::Analytical,
                specializations: vec!["economics".into()],
            },
            Position {
                branch: Branch::Executive,
                level: 2,
            },
            true,
        )
    }

    #[test]
    fn test_type_inference_keywords() {
        assert_eq!(infer_agent_type("Department of Space"), AgentType::Department);
        assert_eq!(infer_agent_type("AI Safety Committee"), AgentType::Committee);
        assert_eq!(infer_agent_type("Housing Task Force"), AgentType::Taskforce);
        assert_eq!(infer_agent_type("Grid Oversight Board"), AgentType::Oversight);
        assert_eq!(infer_agent_type("Emergency Water Office"), AgentType::Emergency);
        assert_eq!(infer_agent_type("Bureau of Weather"), AgentType::Agency);
    }

    #[test]
    fn test_child_inherits_branch_not_budget() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut ids = IdSource::new(42);
        let mut parent = parent();
        parent.budget = Some(1.0);
        let child = spawn_child(&parent, "Housing Task Force", &EvolutionConfig::default(), &mut ids, &mut rng);

        assert_eq!(child.agent_type, AgentType::Taskforce);
        assert_eq!(child.position.branch, Branch::Executive);
        assert_eq!(child.position.level, 3);
        assert_eq!(child.budget, Some(baseline_budget(AgentType::Taskforce)));
        assert_eq!(child.created_by.as_deref(), Some("sec-treasury"));
        assert!(!child.can_create_agents);
        assert_eq!(child.personality.specializations.len(), 2);
        assert_eq!(child.personality.specializations[0], "economics");
    }

    #[test]
    fn test_zero_mutation_rate_copies_scalars() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = EvolutionConfig {
            mutation_rate: 0.0,
            mutation_amount: 0.1,
        };
        let p = parent().personality;
        let child = inherit_personality(&p, &config, &mut rng);
        assert_eq!(child.risk_tolerance, p.risk_tolerance);
        assert_eq!(child.ideology_lean, p.ideology_lean);
        assert_eq!(child.leadership_style, p.leadership_style);
    }

    #[test]
    fn test_full_mutation_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = EvolutionConfig {
            mutation_rate: 1.0,
            mutation_amount: 0.1,
        };
        let mut p = parent().personality;
        for _ in 0..500 {
            p = inherit_personality(&p, &config, &mut rng);
            for v in [p.risk_tolerance, p.innovation, p.collaboration, p.decision_speed] {
                assert!((0.0..=1.0).contains(&v));
            }
            assert!((-1.0..=1.0).contains(&p.ideology_lean));
            assert!(LeadershipStyle::HERITABLE.contains(&p.leadership_style));
        }
    }
}
