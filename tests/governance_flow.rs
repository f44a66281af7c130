mod common;

use civitas_core::EngineError;
use civitas_data::{EventType, MeetingStatus};
use common::{run_days, EngineBuilder, FixedSource};
use std::sync::Arc;
use uuid::Uuid;

const MEETING_DECISION: &str = r#"{"action":"Convening a working session","reasoning":"Coordination","meeting":{"title":"Budget Sync","type":"bilateral","agenda":"Align spending"}}"#;
const PARTNERSHIP_DECISION: &str = r#"{"action":"Forming partnerships across departments","reasoning":"Shared goals"}"#;

#[tokio::test]
async fn test_meetings_are_held_the_day_they_are_called() {
    let source = Arc::new(FixedSource::new(MEETING_DECISION));
    let mut engine = EngineBuilder::new()
        .always_acting()
        .with_source(source.clone())
        .build();
    let report = engine.advance_one_day().await;

    let state = engine.view();
    assert_eq!(state.meetings.len(), report.agency.applied);
    assert_eq!(report.meetings_completed, state.meetings.len());
    assert_eq!(report.meetings_cancelled, 0);

    let exchanges = engine.config().meetings.exchanges;
    let max_participants = engine.config().meetings.max_participants;
    for meeting in &state.meetings {
        assert_eq!(meeting.status, MeetingStatus::Completed);
        assert_eq!(meeting.transcript.len(), exchanges);
        assert!(meeting.participants.len() <= max_participants);
        assert_eq!(meeting.participants[0], meeting.organizer);
        assert_eq!(meeting.outcomes.len(), 1);
        assert!(meeting.transcript.iter().all(|line| line.contains("Agreed, let us proceed.")));
    }
    // One decision per acting agent plus one statement per exchange.
    assert_eq!(source.calls(), report.agency.triggered + exchanges * state.meetings.len());
}

#[tokio::test]
async fn test_meetings_cancel_without_a_source() {
    let mut engine = EngineBuilder::new().always_acting().build();
    engine.advance_one_day().await;
    assert!(engine.view().meetings.is_empty());

    // Meetings already on the books cannot run without anyone to speak.
    let mut seeded = EngineBuilder::new()
        .always_acting()
        .with_source(Arc::new(FixedSource::new(MEETING_DECISION)))
        .build();
    seeded.advance_one_day().await;
    let mut state = seeded.state();
    for meeting in &mut state.meetings {
        meeting.status = MeetingStatus::Scheduled;
        meeting.transcript.clear();
    }
    let scheduled = state.meetings.len();
    assert!(scheduled > 0);
    let mut engine = EngineBuilder::new().with_state(move |s| *s = state).build();
    let report = engine.advance_one_day().await;
    assert_eq!(report.meetings_cancelled, scheduled);
    assert!(engine
        .view()
        .meetings
        .iter()
        .all(|m| m.status == MeetingStatus::Cancelled));
    assert_eq!(engine.metrics().counter(civitas_core::metrics::MEETINGS_CANCELLED), scheduled as u64);
}

#[tokio::test]
async fn test_relationship_count_tracks_formation_events() {
    let mut engine = EngineBuilder::new()
        .with_seed(11)
        .always_acting()
        .with_source(Arc::new(FixedSource::new(PARTNERSHIP_DECISION)))
        .build();
    let founding = engine.view().total_relationships();
    let mut rx = engine.subscribe();
    run_days(&mut engine, 5).await;

    let mut formed = 0;
    while let Ok(event) = rx.try_recv() {
        if event.event_type == EventType::RelationshipFormed {
            assert_eq!(event.involved_agents.len(), 2);
            formed += 1;
        }
    }
    assert!(formed > 0);
    assert_eq!(engine.view().total_relationships(), founding + formed);

    for agent in &engine.view().agents {
        let mut targets: Vec<&str> = agent.relationships.iter().map(|r| r.target_agent_id.as_str()).collect();
        let before = targets.len();
        targets.sort_unstable();
        targets.dedup();
        assert_eq!(targets.len(), before, "{} has a duplicate relationship", agent.id);
    }
    crate::assert_effectiveness_bounded!(engine.view());
}

#[tokio::test]
async fn test_budget_requests_keep_budgets_non_negative() {
    let mut engine = EngineBuilder::new()
        .always_acting()
        .with_source(Arc::new(FixedSource::new(
            "ACTION: Cutting spending | REASONING: Deficit | BUDGET_CHANGE: -500",
        )))
        .build();
    run_days(&mut engine, 3).await;
    crate::assert_budgets_non_negative!(engine.view());
    let vp = engine.view().agent("vp").expect("vice president exists");
    assert_eq!(vp.budget, Some(0.0));
}

#[tokio::test]
async fn test_violations_stay_open_until_resolved() {
    let mut engine = EngineBuilder::new()
        .with_config(|c| {
            c.constitution.violation_probability = 1.0;
            c.constitution.effectiveness_threshold = 0.5;
        })
        .with_state(|state| {
            for agent in &mut state.agents {
                agent.set_effectiveness(1.0);
            }
        })
        .build();
    let report = engine.advance_one_day().await;
    assert!(report.violations_recorded > 0);

    run_days(&mut engine, 3).await;
    let violations = engine.view().constitutional_violations.clone();
    assert!(violations.iter().all(|v| !v.resolved));
    assert_eq!(engine.view().unresolved_violations(), violations.len());

    engine.resolve_violation(violations[0].id).expect("violation exists");
    engine.resolve_violation(violations[0].id).expect("resolving twice is fine");
    assert_eq!(engine.view().unresolved_violations(), violations.len() - 1);

    let missing = Uuid::nil();
    assert!(matches!(
        engine.resolve_violation(missing),
        Err(EngineError::ViolationNotFound(id)) if id == missing
    ));
}
