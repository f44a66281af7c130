use crate::context::IdSource;
use crate::genesis::create_agent;
use civitas_data::{
    Agent, AgentType, BudgetChange, Branch, CollectiveGoal, ConstitutionalViolation, Event,
    ExternalConditions, GoalMetric, GoalPriority, GoalStatus, Law, LeadershipStyle, Meeting,
    Personality, Position, Proposal, Relationship, RelationshipType,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Capped, oldest-first window over the most recent events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
}

impl EventLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Event> {
        self.events.iter()
    }

    /// Newest first.
    pub fn recent(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().rev()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// The single mutable aggregate the engine owns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GovernmentState {
    pub agents: Vec<Agent>,
    pub day: u64,
    /// Dollars.
    pub total_budget: f64,
    pub crisis_level: f64,
    /// `[0, 1]`
    pub public_approval: f64,
    pub constitutional_violations: Vec<ConstitutionalViolation>,
    pub active_proposals: Vec<Proposal>,
    pub recent_events: EventLog,
    pub external_conditions: ExternalConditions,
    pub collective_goals: Vec<CollectiveGoal>,
    pub meetings: Vec<Meeting>,
    pub laws: Vec<Law>,
    /// Budget changes realized during the current day.
    pub budget_ledger: Vec<BudgetChange>,
    /// Sum of budget changes from enacted laws, carried on top of the GDP share.
    #[serde(default)]
    pub enacted_budget_offset: f64,
}

impl GovernmentState {
    /// An empty government with the founding macro conditions.
    #[must_use]
    pub fn empty(event_retention: usize) -> Self {
        Self {
            agents: Vec::new(),
            day: 0,
            total_budget: 4_500_000_000_000.0,
            crisis_level: 0.2,
            public_approval: 0.45,
            constitutional_violations: Vec::new(),
            active_proposals: Vec::new(),
            recent_events: EventLog::with_capacity(event_retention),
            external_conditions: ExternalConditions::default(),
            collective_goals: Vec::new(),
            meetings: Vec::new(),
            laws: Vec::new(),
            budget_ledger: Vec::new(),
            enacted_budget_offset: 0.0,
        }
    }

    /// The founding government: ten offices, their reporting lines and one critical goal.
    #[must_use]
    pub fn founding(event_retention: usize, ids: &mut IdSource) -> Self {
        let mut state = Self::empty(event_retention);
        state.agents = founding_agents();
        link_founding_relationships(&mut state.agents);
        state.collective_goals.push(CollectiveGoal {
            id: ids.next_uuid(),
            title: "Stabilize Economic Growth".to_string(),
            description:
                "Achieve sustainable GDP growth while keeping inflation and unemployment low"
                    .to_string(),
            target_metric: GoalMetric::GdpGrowthRate,
            target_value: 3.5,
            current_value: 2.5,
            priority: GoalPriority::Critical,
            assigned_agents: vec![
                "president".to_string(),
                "sec-treasury".to_string(),
                "fed-chair".to_string(),
            ],
            deadline_day: None,
            progress: 0.3,
            status: GoalStatus::Active,
        });
        state
    }

    #[must_use]
    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    #[must_use]
    pub fn agent_index(&self, id: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.id == id)
    }

    #[must_use]
    pub fn total_relationships(&self) -> usize {
        self.agents.iter().map(|a| a.relationships.len()).sum()
    }

    #[must_use]
    pub fn unresolved_violations(&self) -> usize {
        self.constitutional_violations
            .iter()
            .filter(|v| !v.resolved)
            .count()
    }
}

fn personality(
    risk_tolerance: f64,
    innovation: f64,
    collaboration: f64,
    leadership_style: LeadershipStyle,
    specializations: &[&str],
    ideology_lean: f64,
    decision_speed: f64,
) -> Personality {
    Personality {
        risk_tolerance,
        innovation,
        collaboration,
        decision_speed,
        ideology_lean,
        leadership_style,
        specializations: specializations.iter().map(|s| (*s).to_string()).collect(),
    }
}

fn founding_agents() -> Vec<Agent> {
    use AgentType as T;
    use LeadershipStyle as S;
    let at = |branch, level| Position { branch, level };
    vec![
        create_agent(
            "president",
            "President",
            T::Executive,
            personality(0.7, 0.6, 0.5, S::Authoritative, &["foreign-policy", "crisis-management"], 0.1, 0.8),
            at(Branch::Executive, 0),
            true,
        ),
        create_agent(
            "vp",
            "Vice President",
            T::Executive,
            personality(0.5, 0.7, 0.8, S::Collaborative, &["domestic-policy", "senate-relations"], 0.0, 0.6),
            at(Branch::Executive, 1),
            true,
        ),
        create_agent(
            "sec-state",
            "Secretary of State",
            T::Department,
            personality(0.4, 0.5, 0.8, S::Democratic, &["diplomacy", "international-relations"], 0.0, 0.5),
            at(Branch::Executive, 2),
            true,
        ),
        create_agent(
            "sec-defense",
            "Secretary of Defense",
            T::Department,
            personality(0.6, 0.4, 0.6, S::Authoritative, &["military", "security", "defense-tech"], 0.3, 0.9),
            at(Branch::Executive, 2),
            true,
        ),
        create_agent(
            "sec-treasury",
            "Secretary of Treasury",
            T::Department,
            personality(0.2, 0.6, 0.7, S::Analytical, &["economics", "finance", "monetary-policy"], 0.1, 0.5),
            at(Branch::Executive, 2),
            true,
        ),
        create_agent(
            "speaker",
            "Speaker of the House",
            T::Legislative,
            personality(0.5, 0.5, 0.8, S::Democratic, &["procedure", "coalition-building"], -0.3, 0.6),
            at(Branch::Legislative, 0),
            true,
        ),
        create_agent(
            "senate-leader",
            "Senate Majority Leader",
            T::Legislative,
            personality(0.4, 0.4, 0.9, S::Collaborative, &["legislation", "negotiation"], -0.1, 0.5),
            at(Branch::Legislative, 0),
            true,
        ),
        create_agent(
            "chief-justice",
            "Chief Justice",
            T::Judicial,
            personality(0.1, 0.3, 0.5, S::Deliberative, &["constitutional-law", "precedent"], 0.0, 0.2),
            at(Branch::Judicial, 0),
            true,
        ),
        create_agent(
            "fbi-director",
            "FBI Director",
            T::Agency,
            personality(0.4, 0.7, 0.6, S::Methodical, &["law-enforcement", "investigation", "intelligence"], 0.0, 0.7),
            at(Branch::Independent, 1),
            true,
        ),
        create_agent(
            "fed-chair",
            "Federal Reserve Chair",
            T::Agency,
            personality(0.2, 0.5, 0.4, S::Technocratic, &["monetary-policy", "economics", "banking"], 0.0, 0.3),
            at(Branch::Independent, 1),
            true,
        ),
    ]
}

fn link_founding_relationships(agents: &mut [Agent]) {
    let secretaries: Vec<String> = agents
        .iter()
        .filter(|a| a.id.starts_with("sec-"))
        .map(|a| a.id.clone())
        .collect();

    for agent in agents.iter_mut() {
        if agent.id == "president" {
            for sec in &secretaries {
                agent
                    .relationships
                    .push(Relationship::new(sec.clone(), RelationshipType::Oversees, 0.8, 0.9));
            }
        } else if secretaries.contains(&agent.id) {
            agent
                .relationships
                .push(Relationship::new("president", RelationshipType::ReportsTo, 0.8, -0.9));
        } else if agent.id == "vp" {
            agent.relationships.push(Relationship::new(
                "senate-leader",
                RelationshipType::Collaborates,
                0.6,
                0.3,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(n: u64) -> Event {
        Event {
            id: uuid::Uuid::nil(),
            event_type: civitas_data::EventType::AgentAction,
            description: n.to_string(),
            timestamp: chrono::Utc::now(),
            day: n,
            involved_agents: vec![],
            impact: 0.0,
            public: true,
        }
    }

    #[test]
    fn test_event_log_evicts_oldest() {
        let mut log = EventLog::with_capacity(100);
        for n in 0..100 {
            log.push(event(n));
        }
        assert_eq!(log.len(), 100);
        log.push(event(100));
        assert_eq!(log.len(), 100);
        assert_eq!(log.iter().next().map(|e| e.day), Some(1));
        assert_eq!(log.recent().next().map(|e| e.day), Some(100));
    }

    #[test]
    fn test_founding_government_is_consistent() {
        let mut ids = IdSource::new(0);
        let state = GovernmentState::founding(100, &mut ids);
        assert_eq!(state.agents.len(), 10);
        assert_eq!(state.day, 0);
        assert_eq!(state.collective_goals.len(), 1);

        for agent in &state.agents {
            assert!(agent.effectiveness >= 0.1);
            for rel in &agent.relationships {
                assert!(state.agent(&rel.target_agent_id).is_some(), "dangling edge");
            }
        }
        let president = state.agent("president").unwrap();
        assert_eq!(president.relationships.len(), 3);
        assert!(president.can_expand_authority);
        assert_eq!(state.agent("vp").unwrap().relationships.len(), 1);
    }
}
