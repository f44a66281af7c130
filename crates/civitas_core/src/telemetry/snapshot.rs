use crate::population::RelationshipGraph;
use crate::state::GovernmentState;
use chrono::{DateTime, Utc};
use civitas_data::{BudgetChange, GoalStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AgentBudget {
    pub agent_id: String,
    pub budget: f64,
}

/// One day's aggregate view of the government. Immutable once created.
///
/// Field order is the CSV column order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DataSnapshot {
    pub day: u64,
    pub timestamp: DateTime<Utc>,

    pub total_agents: usize,
    pub agents_by_type: BTreeMap<String, usize>,
    pub agents_by_branch: BTreeMap<String, usize>,
    pub avg_effectiveness: f64,
    pub effectiveness_distribution: Vec<f64>,
    pub avg_agent_age: f64,

    pub total_budget: f64,
    pub budget_by_agent: Vec<AgentBudget>,
    pub budget_changes: Vec<BudgetChange>,

    pub total_relationships: usize,
    pub relationships_by_type: BTreeMap<String, usize>,
    pub avg_relationships_per_agent: f64,
    pub network_density: f64,
    pub relationship_clusters: usize,

    pub active_goals: usize,
    pub completed_goals: usize,
    pub failed_goals: usize,
    pub avg_goal_progress: f64,
    pub goal_completions_this_day: i64,

    pub total_meetings: usize,
    pub meetings_this_day: i64,
    pub meetings_by_type: BTreeMap<String, usize>,
    pub avg_participants_per_meeting: f64,

    pub total_laws: usize,
    pub laws_this_day: i64,
    pub laws_by_category: BTreeMap<String, usize>,
    pub laws_by_status: BTreeMap<String, usize>,

    pub population: f64,
    pub gdp: f64,
    pub unemployment_rate: f64,
    pub inflation_rate: f64,
    pub technology_level: f64,
    pub global_stability: f64,
    pub domestic_sentiment: f64,
    pub environmental_challenges: f64,
    pub year: f64,

    pub public_approval: f64,
    pub crisis_level: f64,
    pub constitutional_violations: usize,
    pub unresolved_violations: usize,

    pub events_this_day: usize,
    pub events_by_type: BTreeMap<String, usize>,
    pub avg_event_impact: f64,

    /// Agents gained since the previous snapshot.
    pub agent_creation_rate: i64,
    /// Agent count times average relationships per agent.
    pub government_complexity: f64,
    /// Laws plus meetings added since the previous snapshot.
    pub policy_velocity: i64,
    pub collaboration_index: f64,
    pub innovation_rate: i64,
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

fn delta(now: usize, before: usize) -> i64 {
    now as i64 - before as i64
}

/// Aggregates `state`; day-over-day fields are measured against `prev` and are zero without it.
#[must_use]
pub fn create_snapshot(state: &GovernmentState, prev: Option<&DataSnapshot>) -> DataSnapshot {
    let agents = &state.agents;
    let n = agents.len();

    let total_relationships = state.total_relationships();
    let avg_relationships_per_agent = mean(total_relationships as f64, n);
    let max_edges = n.saturating_mul(n.saturating_sub(1));
    let network_density = if max_edges > 0 {
        total_relationships as f64 / max_edges as f64
    } else {
        0.0
    };

    let goals = &state.collective_goals;
    let count_goals = |status: GoalStatus| goals.iter().filter(|g| g.status == status).count();
    let completed_goals = count_goals(GoalStatus::Completed);

    let total_meetings = state.meetings.len();
    let total_laws = state.laws.len();
    let (goal_completions_this_day, meetings_this_day, laws_this_day, agent_creation_rate) = match prev {
        Some(p) => (
            delta(completed_goals, p.completed_goals),
            delta(total_meetings, p.total_meetings),
            delta(total_laws, p.total_laws),
            delta(n, p.total_agents),
        ),
        None => (0, 0, 0, 0),
    };

    let todays_events: Vec<_> = state.recent_events.iter().filter(|e| e.day == state.day).collect();
    let c = &state.external_conditions;

    DataSnapshot {
        day: state.day,
        timestamp: Utc::now(),

        total_agents: n,
        agents_by_type: tally(agents.iter().map(|a| a.agent_type.as_str())),
        agents_by_branch: tally(agents.iter().map(|a| a.position.branch.as_str())),
        avg_effectiveness: mean(agents.iter().map(|a| a.effectiveness).sum(), n),
        effectiveness_distribution: agents.iter().map(|a| a.effectiveness).collect(),
        avg_agent_age: mean(agents.iter().map(|a| a.age as f64).sum(), n),

        total_budget: state.total_budget,
        budget_by_agent: agents
            .iter()
            .map(|a| AgentBudget {
                agent_id: a.id.clone(),
                budget: a.budget.unwrap_or(0.0),
            })
            .collect(),
        budget_changes: state.budget_ledger.clone(),

        total_relationships,
        relationships_by_type: tally(
            agents
                .iter()
                .flat_map(|a| a.relationships.iter().map(|r| r.kind.as_str())),
        ),
        avg_relationships_per_agent,
        network_density,
        relationship_clusters: RelationshipGraph::build(agents).cluster_count(),

        active_goals: count_goals(GoalStatus::Active),
        completed_goals,
        failed_goals: count_goals(GoalStatus::Failed),
        avg_goal_progress: mean(goals.iter().map(|g| g.progress).sum(), goals.len()),
        goal_completions_this_day,

        total_meetings,
        meetings_this_day,
        meetings_by_type: tally(state.meetings.iter().map(|m| m.meeting_type.as_str())),
        avg_participants_per_meeting: mean(
            state.meetings.iter().map(|m| m.participants.len() as f64).sum(),
            total_meetings,
        ),

        total_laws,
        laws_this_day,
        laws_by_category: tally(state.laws.iter().map(|l| l.category.as_str())),
        laws_by_status: tally(state.laws.iter().map(|l| l.status.as_str())),

        population: c.population,
        gdp: c.gdp,
        unemployment_rate: c.unemployment_rate,
        inflation_rate: c.inflation_rate,
        technology_level: c.technology_level,
        global_stability: c.global_stability,
        domestic_sentiment: c.domestic_sentiment,
        environmental_challenges: c.environmental_challenges,
        year: c.year,

        public_approval: state.public_approval,
        crisis_level: state.crisis_level,
        constitutional_violations: state.constitutional_violations.len(),
        unresolved_violations: state.unresolved_violations(),

        events_this_day: todays_events.len(),
        events_by_type: tally(todays_events.iter().map(|e| e.event_type.as_str())),
        avg_event_impact: mean(todays_events.iter().map(|e| e.impact.abs()).sum(), todays_events.len()),

        agent_creation_rate,
        government_complexity: n as f64 * avg_relationships_per_agent,
        policy_velocity: laws_this_day + meetings_this_day,
        collaboration_index: avg_relationships_per_agent,
        innovation_rate: agent_creation_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::IdSource;

    #[test]
    fn test_founding_snapshot() {
        let mut ids = IdSource::new(0);
        let state = GovernmentState::founding(100, &mut ids);
        let snap = create_snapshot(&state, None);

        assert_eq!(snap.total_agents, 10);
        assert_eq!(snap.total_relationships, 7);
        assert!((snap.avg_relationships_per_agent - 0.7).abs() < 1e-12);
        assert!((snap.network_density - 7.0 / 90.0).abs() < 1e-12);
        assert_eq!(snap.agents_by_type.get("department"), Some(&3));
        assert_eq!(snap.agents_by_branch.get("independent"), Some(&2));
        assert_eq!(snap.active_goals, 1);
        assert_eq!(snap.agent_creation_rate, 0);
        assert_eq!(snap.relationship_clusters, 6);
        assert!((snap.government_complexity - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_deltas_against_previous() {
        let mut ids = IdSource::new(0);
        let mut state = GovernmentState::founding(100, &mut ids);
        let first = create_snapshot(&state, None);
        let extra = state.agents[0].clone();
        for n in 0..3 {
            let mut a = extra.clone();
            a.id = format!("clone-{n}");
            a.relationships.clear();
            state.agents.push(a);
        }
        state.day = 1;
        let second = create_snapshot(&state, Some(&first));
        assert_eq!(second.agent_creation_rate, 3);
        assert_eq!(second.innovation_rate, 3);
        assert_eq!(second.policy_velocity, 0);
    }
}
