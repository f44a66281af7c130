use super::snapshot::DataSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const GROWTH_SPIKE_AGENTS: i64 = 5;
pub const COLLABORATION_SURGE_DELTA: f64 = 2.0;
pub const POLICY_CASCADE_VELOCITY: i64 = 10;
/// Days before an idle government counts as stagnant.
pub const STAGNATION_GRACE_DAYS: u64 = 10;
pub const INNOVATION_BURST_RATE: i64 = 3;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    GrowthSpike,
    CollaborationSurge,
    PolicyCascade,
    Stagnation,
    InnovationBurst,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmergentPattern {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub description: String,
    /// Simulated day of the snapshot that triggered it.
    pub detected_at: u64,
    pub metrics: serde_json::Value,
}

/// Compares consecutive snapshots. Rules are independent; several may fire at once.
#[must_use]
pub fn detect_emergent_patterns(prev: &DataSnapshot, current: &DataSnapshot) -> Vec<EmergentPattern> {
    let mut patterns = Vec::new();
    let mut fire = |pattern_type, description: String, metrics| {
        patterns.push(EmergentPattern {
            pattern_type,
            description,
            detected_at: current.day,
            metrics,
        });
    };

    if current.agent_creation_rate > GROWTH_SPIKE_AGENTS {
        fire(
            PatternType::GrowthSpike,
            format!(
                "Rapid government expansion: {} new agents created",
                current.agent_creation_rate
            ),
            json!({ "agent_creation_rate": current.agent_creation_rate }),
        );
    }

    let relationship_increase = current.avg_relationships_per_agent - prev.avg_relationships_per_agent;
    if relationship_increase > COLLABORATION_SURGE_DELTA {
        fire(
            PatternType::CollaborationSurge,
            format!(
                "Collaboration surge: avg relationships increased by {:.1}",
                relationship_increase
            ),
            json!({ "relationship_increase": relationship_increase }),
        );
    }

    if current.policy_velocity > POLICY_CASCADE_VELOCITY {
        fire(
            PatternType::PolicyCascade,
            format!(
                "Policy cascade: {} laws and {} meetings",
                current.laws_this_day, current.meetings_this_day
            ),
            json!({ "laws": current.laws_this_day, "meetings": current.meetings_this_day }),
        );
    }

    if current.policy_velocity == 0
        && current.agent_creation_rate == 0
        && current.day > STAGNATION_GRACE_DAYS
    {
        fire(
            PatternType::Stagnation,
            "Government stagnation: no new policies or agents".to_string(),
            json!({ "inactivity_days": 1 }),
        );
    }

    if current.innovation_rate > INNOVATION_BURST_RATE {
        fire(
            PatternType::InnovationBurst,
            format!("Innovation burst: {} new entities", current.innovation_rate),
            json!({ "innovation_rate": current.innovation_rate }),
        );
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(day: u64) -> DataSnapshot {
        DataSnapshot {
            day,
            policy_velocity: 1,
            ..DataSnapshot::default()
        }
    }

    #[test]
    fn test_creation_rate_alone_is_one_growth_spike() {
        let prev = snap(4);
        let current = DataSnapshot {
            agent_creation_rate: 6,
            ..snap(5)
        };
        let patterns = detect_emergent_patterns(&prev, &current);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern_type, PatternType::GrowthSpike);
        assert_eq!(patterns[0].detected_at, 5);
    }

    #[test]
    fn test_quiet_day_is_not_a_pattern() {
        assert!(detect_emergent_patterns(&snap(20), &snap(21)).is_empty());
    }

    #[test]
    fn test_stagnation_waits_out_the_grace_period() {
        let idle = |day| DataSnapshot {
            day,
            ..DataSnapshot::default()
        };
        assert!(detect_emergent_patterns(&idle(9), &idle(10)).is_empty());
        let patterns = detect_emergent_patterns(&idle(10), &idle(11));
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern_type, PatternType::Stagnation);
    }

    #[test]
    fn test_patterns_can_fire_together() {
        let prev = snap(30);
        let current = DataSnapshot {
            day: 31,
            agent_creation_rate: 7,
            innovation_rate: 7,
            avg_relationships_per_agent: 2.5,
            laws_this_day: 6,
            meetings_this_day: 6,
            policy_velocity: 12,
            ..DataSnapshot::default()
        };
        let types: Vec<PatternType> = detect_emergent_patterns(&prev, &current)
            .into_iter()
            .map(|p| p.pattern_type)
            .collect();
        assert_eq!(
            types,
            vec![
                PatternType::GrowthSpike,
                PatternType::CollaborationSurge,
                PatternType::PolicyCascade,
                PatternType::InnovationBurst,
            ]
        );
    }
}
