//! The decision-source boundary: the async contract, the structured decision
//! it is parsed into, and the situation text every request carries.
//!
//! A source replies with free text. Parsing first looks for a JSON object
//! matching [`Decision`]'s wire shape and falls back to the pipe-delimited
//! line format:
//!
//! ```text
//! ACTION: ... | REASONING: ... | CREATE: ... | MEETING: title & type | LAW: title & category | BUDGET_CHANGE: 2.5 | GOAL: title & priority & metric & target
//! ```
//!
//! Anything missing or unreadable falls back to a default; parsing never fails.

use crate::error::DecisionError;
use crate::state::GovernmentState;
use async_trait::async_trait;
use civitas_data::{
    Agent, GoalMetric, GoalPriority, LawCategory, MeetingType, BASELINE_GDP,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::LazyLock;

pub const DEFAULT_ACTION: &str = "Taking thoughtful action based on current situation";
pub const DEFAULT_REASONING: &str = "Acting according to role and personality";
pub const DEFAULT_GOAL_TARGET: f64 = 3.0;

/// External reasoning oracle consulted by agents and meeting speakers.
#[async_trait]
pub trait DecisionSource: Send + Sync {
    async fn decide(&self, agent: &Agent, situation: &str) -> Result<String, DecisionError>;

    fn name(&self) -> &str {
        "decision-source"
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeetingRequest {
    pub title: String,
    pub meeting_type: MeetingType,
    pub agenda: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LawRequest {
    pub title: String,
    pub category: LawCategory,
    pub description: String,
    /// Billions added to the total budget on enactment.
    pub budget_change: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GoalRequest {
    pub title: String,
    pub priority: GoalPriority,
    pub metric: GoalMetric,
    pub target_value: f64,
}

/// One agent's parsed reply. Every sub-request is optional and independent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: String,
    pub reasoning: String,
    pub create_entity: Option<String>,
    pub meeting: Option<MeetingRequest>,
    pub law: Option<LawRequest>,
    /// Billions of dollars, signed.
    pub budget_change: Option<f64>,
    pub goal: Option<GoalRequest>,
}

impl Default for Decision {
    fn default() -> Self {
        Self {
            action: DEFAULT_ACTION.to_string(),
            reasoning: DEFAULT_REASONING.to_string(),
            create_entity: None,
            meeting: None,
            law: None,
            budget_change: None,
            goal: None,
        }
    }
}

// Loose wire shapes: every field optional, enums as free text.

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireDecision {
    action: Option<String>,
    reasoning: Option<String>,
    #[serde(alias = "create")]
    create_entity: Option<String>,
    meeting: Option<WireMeeting>,
    law: Option<WireLaw>,
    budget_change: Option<f64>,
    goal: Option<WireGoal>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireMeeting {
    title: Option<String>,
    #[serde(alias = "type")]
    meeting_type: Option<String>,
    agenda: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireLaw {
    title: Option<String>,
    category: Option<String>,
    description: Option<String>,
    budget_change: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireGoal {
    title: Option<String>,
    priority: Option<String>,
    metric: Option<String>,
    target_value: Option<f64>,
}

const LINE_FIELDS: [&str; 7] = [
    "ACTION",
    "REASONING",
    "CREATE",
    "MEETING",
    "LAW",
    "BUDGET_CHANGE",
    "GOAL",
];

static FIELD_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    LINE_FIELDS
        .iter()
        .filter_map(|name| {
            Regex::new(&format!(r"{name}:\s*([^|]+)"))
                .ok()
                .map(|re| (*name, re))
        })
        .collect()
});

static NUMBER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?").ok());

fn first_number(text: &str) -> Option<(usize, f64)> {
    let m = NUMBER_RE.as_ref()?.find(text)?;
    m.as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| (m.start(), v))
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("none"))
}

fn title_of(text: &str) -> String {
    text.split('&').next().unwrap_or(text).trim().to_string()
}

/// First keyword of `candidates` that appears anywhere in `text`.
fn find_keyword<T: Copy>(text: &str, candidates: &[T], keyword: impl Fn(&T) -> &'static str) -> Option<T> {
    let lower = text.to_lowercase();
    candidates
        .iter()
        .find(|c| lower.contains(&keyword(c).to_lowercase()))
        .copied()
}

impl Decision {
    /// Parses a decision-source reply. Never fails.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::parse_json(text).unwrap_or_else(|| Self::parse_lines(text))
    }

    fn parse_json(text: &str) -> Option<Self> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end <= start {
            return None;
        }
        let wire: WireDecision = serde_json::from_str(&text[start..=end]).ok()?;
        let action = non_empty(wire.action).unwrap_or_else(|| DEFAULT_ACTION.to_string());

        let meeting = wire.meeting.and_then(|m| {
            let title = non_empty(m.title)?;
            Some(MeetingRequest {
                title,
                meeting_type: m
                    .meeting_type
                    .as_deref()
                    .and_then(MeetingType::from_keyword)
                    .unwrap_or(MeetingType::Committee),
                agenda: non_empty(m.agenda).unwrap_or_else(|| action.clone()),
            })
        });
        let law = wire.law.and_then(|l| {
            let title = non_empty(l.title)?;
            Some(LawRequest {
                title,
                category: l
                    .category
                    .as_deref()
                    .and_then(LawCategory::from_keyword)
                    .unwrap_or(LawCategory::Other),
                description: non_empty(l.description).unwrap_or_else(|| action.clone()),
                budget_change: l.budget_change.filter(|b| b.is_finite()).unwrap_or(0.0),
            })
        });
        let goal = wire.goal.and_then(|g| {
            let title = non_empty(g.title)?;
            Some(GoalRequest {
                title,
                priority: g
                    .priority
                    .as_deref()
                    .and_then(GoalPriority::from_keyword)
                    .unwrap_or(GoalPriority::Medium),
                metric: g
                    .metric
                    .as_deref()
                    .and_then(GoalMetric::from_label)
                    .unwrap_or(GoalMetric::GdpGrowthRate),
                target_value: g
                    .target_value
                    .filter(|v| v.is_finite())
                    .unwrap_or(DEFAULT_GOAL_TARGET),
            })
        });

        Some(Self {
            reasoning: non_empty(wire.reasoning).unwrap_or_else(|| DEFAULT_REASONING.to_string()),
            create_entity: non_empty(wire.create_entity),
            meeting,
            law,
            budget_change: wire.budget_change.filter(|b| b.is_finite()),
            goal,
            action,
        })
    }

    fn parse_lines(text: &str) -> Self {
        let field = |name: &str| -> Option<String> {
            FIELD_RES
                .iter()
                .find(|(n, _)| *n == name)
                .and_then(|(_, re)| re.captures(text))
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        };

        let action_raw = field("ACTION").map(|a| a.trim().to_string());
        let action = action_raw
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTION.to_string());
        let reasoning = field("REASONING")
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REASONING.to_string());

        let meeting = non_empty(field("MEETING")).map(|m| MeetingRequest {
            title: title_of(&m),
            meeting_type: find_keyword(&m, &MeetingType::ALL, MeetingType::as_str)
                .unwrap_or(MeetingType::Committee),
            agenda: action_raw.clone().unwrap_or_else(|| "Government business".to_string()),
        });

        let law = non_empty(field("LAW")).map(|l| LawRequest {
            title: title_of(&l),
            category: find_keyword(&l, &LawCategory::ALL, LawCategory::as_str)
                .unwrap_or(LawCategory::Other),
            description: action_raw.clone().unwrap_or_else(|| "Legislative action".to_string()),
            budget_change: 0.0,
        });

        let budget_change = non_empty(field("BUDGET_CHANGE"))
            .and_then(|b| first_number(&b))
            .filter(|(start, _)| *start == 0)
            .map(|(_, value)| value);

        let goal = non_empty(field("GOAL")).map(|g| {
            let qualifiers = g.split_once('&').map_or(g.as_str(), |(_, rest)| rest);
            GoalRequest {
                title: title_of(&g),
                priority: find_keyword(&g, &[GoalPriority::Critical, GoalPriority::High, GoalPriority::Medium, GoalPriority::Low], GoalPriority::as_str)
                    .unwrap_or(GoalPriority::Medium),
                metric: find_keyword(&g, &GoalMetric::ALL, GoalMetric::label)
                    .unwrap_or(GoalMetric::GdpGrowthRate),
                target_value: first_number(qualifiers)
                    .map_or(DEFAULT_GOAL_TARGET, |(_, value)| value),
            }
        });

        Self {
            action,
            reasoning,
            create_entity: non_empty(field("CREATE")),
            meeting,
            law,
            budget_change,
            goal,
        }
    }
}

/// Textual summary of the world from one agent's seat.
#[must_use]
pub fn situation_text(state: &GovernmentState, agent: &Agent) -> String {
    let c = &state.external_conditions;
    let mut text = String::with_capacity(1024);
    let _ = writeln!(text, "Current Year: {}", c.year.round());
    let _ = writeln!(text, "Population: {}M people", (c.population / 1e6).round());
    let _ = writeln!(
        text,
        "GDP: ${:.1}T ({:+.1}% from baseline)",
        c.gdp / 1e12,
        (c.gdp / BASELINE_GDP - 1.0) * 100.0
    );
    let _ = writeln!(text, "Unemployment: {:.1}%", c.unemployment_rate);
    let _ = writeln!(text, "Inflation: {:.1}%", c.inflation_rate);
    let _ = writeln!(text, "Technology Level: {}%", (c.technology_level * 100.0).round());
    let _ = writeln!(text, "Global Stability: {}%", (c.global_stability * 100.0).round());
    let _ = writeln!(text, "Domestic Sentiment: {}%", (c.domestic_sentiment * 100.0).round());
    let _ = writeln!(
        text,
        "Environmental Challenges: {}%",
        (c.environmental_challenges * 100.0).round()
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "Government Status:");
    let _ = writeln!(text, "- Day {} in office", state.day);
    let _ = writeln!(text, "- Public Approval: {}%", (state.public_approval * 100.0).round());
    let _ = writeln!(text, "- Your effectiveness: {}%", (agent.effectiveness * 100.0).round());
    let _ = writeln!(text, "- Your relationships: {}", agent.relationships.len());
    let _ = write!(text, "- Government budget: ${:.2}T", state.total_budget / 1e12);

    if !state.collective_goals.is_empty() {
        let _ = write!(text, "\n\nCOLLECTIVE GOALS:");
        for goal in &state.collective_goals {
            let _ = write!(
                text,
                "\n- {} ({}% complete, {} priority)\n  Target: {} = {}\n  Current: {:.2}",
                goal.title,
                (goal.progress * 100.0).round(),
                goal.priority.as_str(),
                goal.target_metric.label(),
                goal.target_value,
                goal.current_value
            );
        }
    }
    text
}
