//! Offline decision sources for headless runs and tests.

use async_trait::async_trait;
use civitas_core::{DecisionError, DecisionSource};
use civitas_data::Agent;
use std::sync::atomic::{AtomicUsize, Ordering};

const DEFAULT_DECISIONS: [&str; 6] = [
    r#"{"action":"Reviewing operational efficiency","reasoning":"Stable conditions favor consolidation"}"#,
    r#"{"action":"Coordinating with partner agencies","reasoning":"Shared problems need shared answers","meeting":{"title":"Interagency Coordination","type":"committee","agenda":"Align priorities"}}"#,
    "ACTION: Requesting additional resources | REASONING: Workload exceeds capacity | CREATE: none | MEETING: none | LAW: none | BUDGET_CHANGE: 1.5 | GOAL: none",
    r#"{"action":"Drafting targeted legislation","reasoning":"A systemic gap needs a statutory fix","law":{"title":"Workforce Modernization Act","category":"economic","description":"Retraining incentives","budget_change":2.0}}"#,
    "ACTION: Setting a shared target | REASONING: Progress needs a measurable objective | GOAL: Reduce Unemployment & high & Unemployment Rate & 4.0",
    r#"{"action":"Forming a task force","reasoning":"A time-limited problem needs a dedicated team","create_entity":"Supply Chain Task Force"}"#,
];

const MEETING_STATEMENTS: [&str; 3] = [
    "STATEMENT: I support moving forward if we keep costs contained.",
    "STATEMENT: We should set a clear timeline and assign owners.",
    "STATEMENT: Agreed. Let us adopt the plan and review progress in thirty days.",
];

/// Replays canned replies in order, wrapping around. Meeting prompts get canned statements.
pub struct ScriptedOracle {
    decisions: Vec<String>,
    next_decision: AtomicUsize,
    next_statement: AtomicUsize,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new(DEFAULT_DECISIONS.iter().map(|s| s.to_string()).collect())
    }
}

impl ScriptedOracle {
    #[must_use]
    pub fn new(decisions: Vec<String>) -> Self {
        Self {
            decisions,
            next_decision: AtomicUsize::new(0),
            next_statement: AtomicUsize::new(0),
        }
    }

    /// Replies served so far, meetings included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.next_decision.load(Ordering::SeqCst) + self.next_statement.load(Ordering::SeqCst)
    }
}

fn is_meeting_prompt(situation: &str) -> bool {
    situation.contains("FORMAT: STATEMENT:")
}

#[async_trait]
impl DecisionSource for ScriptedOracle {
    async fn decide(&self, _agent: &Agent, situation: &str) -> Result<String, DecisionError> {
        if is_meeting_prompt(situation) {
            let n = self.next_statement.fetch_add(1, Ordering::SeqCst);
            return Ok(MEETING_STATEMENTS[n % MEETING_STATEMENTS.len()].to_string());
        }
        if self.decisions.is_empty() {
            return Err(DecisionError::EmptyResponse);
        }
        let n = self.next_decision.fetch_add(1, Ordering::SeqCst);
        Ok(self.decisions[n % self.decisions.len()].clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Always unavailable, as when no credential is configured.
pub struct UnavailableOracle;

#[async_trait]
impl DecisionSource for UnavailableOracle {
    async fn decide(&self, _agent: &Agent, _situation: &str) -> Result<String, DecisionError> {
        Err(DecisionError::unavailable("no decision source configured"))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
