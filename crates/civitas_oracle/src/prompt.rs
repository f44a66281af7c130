//! Persona prompt wrapped around every situation sent to a generative model.

use civitas_data::Agent;
use std::fmt::Write as _;

const GUIDANCE: &str = "\
Based on the external conditions and your role, consider what realistic actions you might take. \
Government expansion should be driven by genuine need, not just activity.

When facing new challenges: create specialized departments or agencies only if existing ones cannot \
handle the issue, form task forces for time-limited problems, establish oversight for emerging risks, \
call hearings or meetings to coordinate, draft laws for systemic issues.
When conditions are stable: improve the efficiency of existing structures, build relationships and \
coalitions, develop long-term policies, hold committee meetings to review progress.
During economic stress: request budget increases or decreases for your operations, propose \
reallocations or efficiency measures, consolidate overlapping functions, draft responsive legislation.

Collective goals: completed goals pay budget rewards split among the assigned agents \
(critical $50B, high $25B, medium $10B, low $5B). Goals should target a metric such as GDP Growth \
Rate, Unemployment Rate, Inflation Rate, Public Approval, Technology Level, Environmental Score or \
Global Stability.

Think like a real government official: would a rational person in your position create something \
new, or work within existing structures?";

const DECISION_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{
  "action": "what you are doing",
  "reasoning": "your thinking",
  "create_entity": "brief 2-5 word title, or null",
  "meeting": {"title": "...", "type": "hearing|committee|cabinet|emergency|joint-session|bilateral", "agenda": "..."} or null,
  "law": {"title": "...", "category": "economic|social|environmental|security|technology|healthcare|education|infrastructure|other", "description": "...", "budget_change": billions or 0} or null,
  "budget_change": billions as a number (5.2 to increase, -3.1 to decrease) or null,
  "goal": {"title": "...", "priority": "critical|high|medium|low", "metric": "GDP Growth Rate", "target_value": 3.0} or null
}"#;

/// Persona, situation and, unless the situation names its own format, the decision schema.
#[must_use]
pub fn build_prompt(agent: &Agent, situation: &str) -> String {
    let p = &agent.personality;
    let mut text = String::with_capacity(4096);
    let _ = writeln!(
        text,
        "You are {}, a {} in the US government. You have complete autonomy to think, act, and respond as you see fit based on your personality and role.",
        agent.name,
        agent.agent_type.as_str()
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "YOUR PERSONALITY & NATURE:");
    let _ = writeln!(text, "- Risk Tolerance: {:.2}/1.0", p.risk_tolerance);
    let _ = writeln!(text, "- Innovation: {:.2}/1.0", p.innovation);
    let _ = writeln!(text, "- Collaboration: {:.2}/1.0", p.collaboration);
    let _ = writeln!(
        text,
        "- Leadership Style: {}",
        format!("{:?}", p.leadership_style).to_lowercase()
    );
    let _ = writeln!(text, "- Areas of Expertise: {}", p.specializations.join(", "));
    let _ = writeln!(
        text,
        "- Political Ideology: {:.2} (-1=progressive, +1=conservative)",
        p.ideology_lean
    );
    let _ = writeln!(text, "- Decision Speed: {:.2}/1.0", p.decision_speed);
    let _ = writeln!(text);
    let _ = writeln!(text, "CURRENT GOVERNMENT SITUATION:");
    let _ = writeln!(text, "{}", situation.trim_end());
    let _ = writeln!(text);

    if situation.contains("FORMAT:") {
        return text;
    }
    let _ = writeln!(text, "{GUIDANCE}");
    let _ = writeln!(text);
    let _ = write!(text, "{DECISION_FORMAT}");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_core::context::IdSource;
    use civitas_core::GovernmentState;

    #[test]
    fn test_decision_prompt_carries_schema() {
        let mut ids = IdSource::new(0);
        let state = GovernmentState::founding(10, &mut ids);
        let president = state.agent("president").unwrap();
        let prompt = build_prompt(president, "Unemployment is rising.");
        assert!(prompt.starts_with("You are President"));
        assert!(prompt.contains("Unemployment is rising."));
        assert!(prompt.contains("\"budget_change\""));
    }

    #[test]
    fn test_meeting_prompt_keeps_its_own_format() {
        let mut ids = IdSource::new(0);
        let state = GovernmentState::founding(10, &mut ids);
        let speaker = state.agent("speaker").unwrap();
        let prompt = build_prompt(speaker, "AGENDA: budget\nFORMAT: STATEMENT: [your contribution]");
        assert!(prompt.contains("FORMAT: STATEMENT:"));
        assert!(!prompt.contains("single JSON object"));
    }
}
