use super::agent::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AgentCreated,
    AgentRemoved,
    RelationshipFormed,
    BudgetAllocated,
    CrisisResponse,
    ProposalSubmitted,
    ApprovalGiven,
    OversightAction,
    ConstitutionalReview,
    AgentAction,
    SimulationDay,
}

impl EventType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AgentCreated => "agent_created",
            EventType::AgentRemoved => "agent_removed",
            EventType::RelationshipFormed => "relationship_formed",
            EventType::BudgetAllocated => "budget_allocated",
            EventType::CrisisResponse => "crisis_response",
            EventType::ProposalSubmitted => "proposal_submitted",
            EventType::ApprovalGiven => "approval_given",
            EventType::OversightAction => "oversight_action",
            EventType::ConstitutionalReview => "constitutional_review",
            EventType::AgentAction => "agent_action",
            EventType::SimulationDay => "simulation_day",
        }
    }
}

/// State-change notification published on the event bus.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Simulated day the event was emitted on.
    pub day: u64,
    pub involved_agents: Vec<AgentId>,
    /// `[-1, 1]`
    pub impact: f64,
    pub public: bool,
}

/// One realized change to an agent's budget line during a day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BudgetChange {
    pub agent_id: AgentId,
    pub change: f64,
    pub reason: String,
}
