use crate::context::DayContext;
use crate::error::EngineError;
use crate::state::GovernmentState;
use chrono::Utc;
use civitas_data::{ConstitutionalViolation, EventType, Severity};
use rand::Rng;
use uuid::Uuid;

/// Flags possible authority overreach by highly effective agents that can expand their authority.
///
/// Returns the number of violations recorded. Nothing here ever resolves a violation.
pub fn check_compliance<R: Rng>(state: &mut GovernmentState, ctx: &mut DayContext<'_, R>) -> usize {
    let threshold = ctx.config.constitution.effectiveness_threshold;
    let probability = ctx.config.constitution.violation_probability;
    let mut recorded = 0;

    for agent in &state.agents {
        if !(agent.effectiveness > threshold && agent.can_expand_authority) {
            continue;
        }
        if !ctx.rng.gen_bool(probability) {
            continue;
        }
        let description = format!("Potential authority overreach by {}", agent.name);
        state.constitutional_violations.push(ConstitutionalViolation {
            id: ctx.ids.next_uuid(),
            description: description.clone(),
            severity: Severity::Medium,
            violating_agent_id: agent.id.clone(),
            detected_at: Utc::now(),
            detected_day: ctx.day,
            resolved: false,
        });
        ctx.emit(EventType::ConstitutionalReview, description, vec![agent.id.clone()], -0.2, true);
        recorded += 1;
    }
    recorded
}

/// Marks a violation resolved. Resolving twice is a no-op.
pub fn resolve_violation(state: &mut GovernmentState, id: Uuid) -> Result<(), EngineError> {
    let violation = state
        .constitutional_violations
        .iter_mut()
        .find(|v| v.id == id)
        .ok_or(EngineError::ViolationNotFound(id))?;
    violation.resolved = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::context::{IdSource, RunModifiers};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_only_eligible_agents_are_flagged() {
        let mut config = AppConfig::default();
        config.constitution.violation_probability = 1.0;
        let mut ids = IdSource::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut state = GovernmentState::founding(100, &mut ids);
        state.agent_mut("president").unwrap().set_effectiveness(0.95);
        // Cannot expand authority, so never flagged.
        state.agent_mut("speaker").unwrap().set_effectiveness(0.95);

        let mut outbox = Vec::new();
        let mut ctx = DayContext {
            config: &config,
            rng: &mut rng,
            ids: &mut ids,
            outbox: &mut outbox,
            modifiers: RunModifiers::default(),
            day: 4,
        };
        assert_eq!(check_compliance(&mut state, &mut ctx), 1);
        let violation = &state.constitutional_violations[0];
        assert_eq!(violation.violating_agent_id, "president");
        assert_eq!(violation.severity, Severity::Medium);
        assert!(!violation.resolved);
        assert_eq!(outbox[0].event_type, EventType::ConstitutionalReview);
    }

    #[test]
    fn test_violations_persist_until_resolved() {
        let mut config = AppConfig::default();
        config.constitution.violation_probability = 1.0;
        let mut ids = IdSource::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut state = GovernmentState::founding(100, &mut ids);
        state.agent_mut("sec-state").unwrap().set_effectiveness(1.0);

        let mut outbox = Vec::new();
        let mut ctx = DayContext {
            config: &config,
            rng: &mut rng,
            ids: &mut ids,
            outbox: &mut outbox,
            modifiers: RunModifiers::default(),
            day: 1,
        };
        check_compliance(&mut state, &mut ctx);
        check_compliance(&mut state, &mut ctx);
        assert_eq!(state.unresolved_violations(), 2);

        let id = state.constitutional_violations[0].id;
        resolve_violation(&mut state, id).unwrap();
        assert_eq!(state.unresolved_violations(), 1);
        assert_eq!(
            resolve_violation(&mut state, Uuid::nil()),
            Err(EngineError::ViolationNotFound(Uuid::nil()))
        );
    }
}
