use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Stable, human-readable agent identifier (`"president"`, `"sec-treasury-a12"`).
pub type AgentId = String;

/// Lower bound every agent's effectiveness is clamped to.
pub const EFFECTIVENESS_FLOOR: f64 = 0.1;
/// Upper bound every agent's effectiveness is clamped to.
pub const EFFECTIVENESS_CEILING: f64 = 1.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Executive,
    Legislative,
    Judicial,
    Department,
    Agency,
    Committee,
    Taskforce,
    Oversight,
    Emergency,
    Coalition,
}

impl AgentType {
    pub const ALL: [AgentType; 10] = [
        AgentType::Executive,
        AgentType::Legislative,
        AgentType::Judicial,
        AgentType::Department,
        AgentType::Agency,
        AgentType::Committee,
        AgentType::Taskforce,
        AgentType::Oversight,
        AgentType::Emergency,
        AgentType::Coalition,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Executive => "executive",
            AgentType::Legislative => "legislative",
            AgentType::Judicial => "judicial",
            AgentType::Department => "department",
            AgentType::Agency => "agency",
            AgentType::Committee => "committee",
            AgentType::Taskforce => "taskforce",
            AgentType::Oversight => "oversight",
            AgentType::Emergency => "emergency",
            AgentType::Coalition => "coalition",
        }
    }

    /// Executive and legislative leadership act more often and may activate goals directly.
    #[must_use]
    pub fn is_senior(&self) -> bool {
        matches!(self, AgentType::Executive | AgentType::Legislative)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Executive,
    Legislative,
    Judicial,
    Independent,
}

impl Branch {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Executive => "executive",
            Branch::Legislative => "legislative",
            Branch::Judicial => "judicial",
            Branch::Independent => "independent",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadershipStyle {
    Authoritative,
    Democratic,
    Collaborative,
    Delegative,
    Analytical,
    Deliberative,
    Methodical,
    Technocratic,
}

impl LeadershipStyle {
    /// Styles a mutated child can be re-rolled into.
    pub const HERITABLE: [LeadershipStyle; 4] = [
        LeadershipStyle::Authoritative,
        LeadershipStyle::Democratic,
        LeadershipStyle::Collaborative,
        LeadershipStyle::Delegative,
    ];
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Personality {
    /// Willingness to take chances, `[0, 1]`.
    pub risk_tolerance: f64,
    /// Appetite for new ideas, `[0, 1]`.
    pub innovation: f64,
    /// Preference for working with others, `[0, 1]`.
    pub collaboration: f64,
    /// How quickly decisions are taken, `[0, 1]`.
    pub decision_speed: f64,
    /// `-1` progressive through `1` conservative.
    pub ideology_lean: f64,
    pub leadership_style: LeadershipStyle,
    pub specializations: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub branch: Branch,
    /// Hierarchy depth; founding leadership sits at 0.
    pub level: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    ReportsTo,
    Oversees,
    Collaborates,
    Coordinates,
    Conflicts,
    Coalition,
    Appointment,
    Confirmation,
}

impl RelationshipType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::ReportsTo => "reports_to",
            RelationshipType::Oversees => "oversees",
            RelationshipType::Collaborates => "collaborates",
            RelationshipType::Coordinates => "coordinates",
            RelationshipType::Conflicts => "conflicts",
            RelationshipType::Coalition => "coalition",
            RelationshipType::Appointment => "appointment",
            RelationshipType::Confirmation => "confirmation",
        }
    }
}

/// Directed edge owned by the source agent's relationship list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Relationship {
    pub target_agent_id: AgentId,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    /// `[0, 1]`
    pub strength: f64,
    /// `[-1, 1]`
    pub influence: f64,
    pub created: DateTime<Utc>,
}

impl Relationship {
    #[must_use]
    pub fn new(target: impl Into<AgentId>, kind: RelationshipType, strength: f64, influence: f64) -> Self {
        Self {
            target_agent_id: target.into(),
            kind,
            strength: strength.clamp(0.0, 1.0),
            influence: influence.clamp(-1.0, 1.0),
            created: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Inactive,
    Temporary,
    UnderReview,
    Emergency,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InnerMonologue {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub thought: String,
    pub action: String,
    pub reasoning: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    pub personality: Personality,
    pub position: Position,
    pub relationships: Vec<Relationship>,
    pub effectiveness: f64,
    /// Simulated days since creation.
    pub age: u64,
    pub can_create_agents: bool,
    pub can_expand_authority: bool,
    pub status: AgentStatus,
    pub budget: Option<f64>,
    pub staff_count: Option<u32>,
    pub created_by: Option<AgentId>,
    pub created_at: DateTime<Utc>,
    pub term_limit: Option<u32>,
    pub current_term: Option<u32>,
    /// Most recent first.
    pub inner_monologue: VecDeque<InnerMonologue>,
}

impl Agent {
    /// Adds `delta` to effectiveness, keeping it inside `[0.1, 1.0]`.
    pub fn adjust_effectiveness(&mut self, delta: f64) {
        self.set_effectiveness(self.effectiveness + delta);
    }

    pub fn set_effectiveness(&mut self, value: f64) {
        let value = if value.is_finite() { value } else { EFFECTIVENESS_FLOOR };
        self.effectiveness = value.clamp(EFFECTIVENESS_FLOOR, EFFECTIVENESS_CEILING);
    }

    /// Applies a budget change with a floor of zero and returns the change actually realized.
    ///
    /// Agents without a budget line are left untouched and realize nothing.
    pub fn adjust_budget(&mut self, delta: f64) -> f64 {
        match self.budget.as_mut() {
            Some(budget) if delta.is_finite() => {
                let before = *budget;
                *budget = (before + delta).max(0.0);
                *budget - before
            }
            _ => 0.0,
        }
    }

    /// Pushes a thought to the front of the monologue and drops the oldest beyond `cap`.
    pub fn record_thought(&mut self, entry: InnerMonologue, cap: usize) {
        self.inner_monologue.push_front(entry);
        self.inner_monologue.truncate(cap);
    }

    #[must_use]
    pub fn is_connected_to(&self, other: &str) -> bool {
        self.relationships.iter().any(|r| r.target_agent_id == other)
    }
}
