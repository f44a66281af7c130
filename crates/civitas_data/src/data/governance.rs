use super::agent::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Collective goals -------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl GoalPriority {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPriority::Critical => "critical",
            GoalPriority::High => "high",
            GoalPriority::Medium => "medium",
            GoalPriority::Low => "low",
        }
    }

    #[must_use]
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(GoalPriority::Critical),
            "high" => Some(GoalPriority::High),
            "medium" => Some(GoalPriority::Medium),
            "low" => Some(GoalPriority::Low),
            _ => None,
        }
    }
}

/// Named metric a collective goal is measured against.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GoalMetric {
    #[serde(rename = "GDP Growth Rate")]
    GdpGrowthRate,
    #[serde(rename = "Unemployment Rate")]
    UnemploymentRate,
    #[serde(rename = "Inflation Rate")]
    InflationRate,
    #[serde(rename = "Public Approval")]
    PublicApproval,
    #[serde(rename = "Technology Level")]
    TechnologyLevel,
    #[serde(rename = "Environmental Score")]
    EnvironmentalScore,
    #[serde(rename = "Global Stability")]
    GlobalStability,
}

impl GoalMetric {
    pub const ALL: [GoalMetric; 7] = [
        GoalMetric::GdpGrowthRate,
        GoalMetric::UnemploymentRate,
        GoalMetric::InflationRate,
        GoalMetric::PublicApproval,
        GoalMetric::TechnologyLevel,
        GoalMetric::EnvironmentalScore,
        GoalMetric::GlobalStability,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            GoalMetric::GdpGrowthRate => "GDP Growth Rate",
            GoalMetric::UnemploymentRate => "Unemployment Rate",
            GoalMetric::InflationRate => "Inflation Rate",
            GoalMetric::PublicApproval => "Public Approval",
            GoalMetric::TechnologyLevel => "Technology Level",
            GoalMetric::EnvironmentalScore => "Environmental Score",
            GoalMetric::GlobalStability => "Global Stability",
        }
    }

    /// Case-insensitive label lookup.
    #[must_use]
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(text))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Proposed,
    Active,
    Completed,
    Failed,
}

impl GoalStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, GoalStatus::Completed | GoalStatus::Failed)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CollectiveGoal {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub target_metric: GoalMetric,
    pub target_value: f64,
    pub current_value: f64,
    pub priority: GoalPriority,
    pub assigned_agents: Vec<AgentId>,
    /// Simulated day after which an under-achieving goal fails.
    pub deadline_day: Option<u64>,
    /// `[0, 1]`
    pub progress: f64,
    pub status: GoalStatus,
}

// --- Meetings ---------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingType {
    Hearing,
    Committee,
    Cabinet,
    Emergency,
    JointSession,
    /// Organizer meets the agents it already has relationships with.
    Bilateral,
}

impl MeetingType {
    pub const ALL: [MeetingType; 6] = [
        MeetingType::Hearing,
        MeetingType::Committee,
        MeetingType::Cabinet,
        MeetingType::Emergency,
        MeetingType::JointSession,
        MeetingType::Bilateral,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::Hearing => "hearing",
            MeetingType::Committee => "committee",
            MeetingType::Cabinet => "cabinet",
            MeetingType::Emergency => "emergency",
            MeetingType::JointSession => "joint-session",
            MeetingType::Bilateral => "bilateral",
        }
    }

    #[must_use]
    pub fn from_keyword(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(text))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub meeting_type: MeetingType,
    pub organizer: AgentId,
    pub participants: Vec<AgentId>,
    pub agenda: String,
    pub outcomes: Vec<String>,
    pub scheduled_day: u64,
    pub status: MeetingStatus,
    /// One `"Speaker: statement"` line per successful exchange.
    pub transcript: Vec<String>,
}

// --- Laws -------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LawCategory {
    Economic,
    Social,
    Environmental,
    Security,
    Technology,
    Healthcare,
    Education,
    Infrastructure,
    Other,
}

impl LawCategory {
    pub const ALL: [LawCategory; 9] = [
        LawCategory::Economic,
        LawCategory::Social,
        LawCategory::Environmental,
        LawCategory::Security,
        LawCategory::Technology,
        LawCategory::Healthcare,
        LawCategory::Education,
        LawCategory::Infrastructure,
        LawCategory::Other,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LawCategory::Economic => "economic",
            LawCategory::Social => "social",
            LawCategory::Environmental => "environmental",
            LawCategory::Security => "security",
            LawCategory::Technology => "technology",
            LawCategory::Healthcare => "healthcare",
            LawCategory::Education => "education",
            LawCategory::Infrastructure => "infrastructure",
            LawCategory::Other => "other",
        }
    }

    #[must_use]
    pub fn from_keyword(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(text))
    }
}

/// Legislative pipeline stage. Moves forward only; `Vetoed` and `Enacted` are terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum LawStatus {
    Drafted,
    Committee,
    FloorVote,
    Passed,
    Vetoed,
    Enacted,
}

impl LawStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LawStatus::Drafted => "drafted",
            LawStatus::Committee => "committee",
            LawStatus::FloorVote => "floor-vote",
            LawStatus::Passed => "passed",
            LawStatus::Vetoed => "vetoed",
            LawStatus::Enacted => "enacted",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, LawStatus::Vetoed | LawStatus::Enacted)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Yes,
    No,
    Abstain,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VoteRecord {
    pub agent_id: AgentId,
    pub vote: Vote,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LawImpact {
    pub budget_change: f64,
    pub affected_population: f64,
    pub implementation_cost: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Law {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: LawCategory,
    pub sponsor: AgentId,
    pub cosponsors: Vec<AgentId>,
    pub status: LawStatus,
    pub votes: Vec<VoteRecord>,
    pub drafted_day: u64,
    pub effective_day: Option<u64>,
    pub impact: LawImpact,
}

// --- Proposals --------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    NewAgency,
    BudgetChange,
    NewAuthority,
    Reorganization,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Proposed,
    UnderReview,
    Approved,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProposalImpact {
    pub budget_change: f64,
    pub agents_affected: Vec<AgentId>,
    pub new_positions: u32,
    /// `[0, 1]`
    pub constitutional_risk: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Proposal {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub proposed_by: AgentId,
    #[serde(rename = "type")]
    pub proposal_type: ProposalType,
    pub status: ProposalStatus,
    pub required_approvals: Vec<AgentId>,
    pub received_approvals: Vec<AgentId>,
    pub impact: ProposalImpact,
}

// --- Constitutional review --------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConstitutionalViolation {
    pub id: Uuid,
    pub description: String,
    pub severity: Severity,
    pub violating_agent_id: AgentId,
    pub detected_at: DateTime<Utc>,
    pub detected_day: u64,
    /// Only ever set through an explicit resolution call.
    pub resolved: bool,
}
