//! The per-agent decision pipeline.
//!
//! Each day every agent draws once against its action probability. Triggered
//! agents consult the decision source concurrently; replies are then applied
//! one at a time in population order, so no two agents' mutations interleave.

use crate::config::AgencyConfig;
use crate::context::DayContext;
use crate::decision::{situation_text, Decision, DecisionSource};
use crate::genesis::spawn_child;
use crate::meetings::select_participants;
use crate::population::{form_random_relationship, mentions_partnership, refresh_effectiveness};
use crate::state::GovernmentState;
use chrono::Utc;
use civitas_data::{
    Agent, BudgetChange, CollectiveGoal, EventType, ExternalConditions, GoalStatus,
    InnerMonologue, Law, LawImpact, LawStatus, Meeting, MeetingStatus,
};
use futures::future::join_all;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

pub const DOLLARS_PER_BILLION: f64 = 1e9;

/// Daily chance that `agent` consults the decision source, before the run multiplier.
#[must_use]
pub fn action_probability(agent: &Agent, conditions: &ExternalConditions, config: &AgencyConfig) -> f64 {
    let mut p = agent.effectiveness * config.base_action_rate;
    if conditions.unemployment_rate > config.unemployment_threshold {
        p += config.unemployment_bonus;
    }
    if conditions.inflation_rate > config.inflation_threshold {
        p += config.inflation_bonus;
    }
    if conditions.environmental_challenges > config.environment_threshold {
        p += config.environment_bonus;
    }
    if conditions.technology_level > config.technology_threshold {
        p += config.technology_bonus;
    }
    if conditions.global_stability < config.instability_threshold {
        p += config.instability_bonus;
    }
    if conditions.domestic_sentiment < config.discontent_threshold {
        p += config.discontent_bonus;
    }
    if agent.agent_type.is_senior() {
        p *= config.senior_multiplier;
    }
    p
}

/// Tally of one day's decision phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AgencyReport {
    pub triggered: usize,
    pub applied: usize,
    pub failed: usize,
    pub agents_created: usize,
}

/// Runs the decision phase for every agent present at the start of the phase.
pub async fn run_agency_phase<R: Rng>(
    state: &mut GovernmentState,
    source: Option<&dyn DecisionSource>,
    ctx: &mut DayContext<'_, R>,
) -> AgencyReport {
    let roster = state.agents.len();
    let multiplier = ctx.modifiers.action_probability_multiplier;
    let agency = &ctx.config.agency;

    let mut triggered = Vec::new();
    for i in 0..roster {
        let p = action_probability(&state.agents[i], &state.external_conditions, agency) * multiplier;
        if ctx.rng.gen_bool(p.clamp(0.0, 1.0)) {
            triggered.push(i);
        }
    }
    let mut report = AgencyReport {
        triggered: triggered.len(),
        ..AgencyReport::default()
    };

    match source {
        Some(source) if !triggered.is_empty() => {
            let view: &GovernmentState = state;
            let situations: Vec<String> = triggered
                .par_iter()
                .map(|&i| situation_text(view, &view.agents[i]))
                .collect();
            let replies = join_all(
                triggered
                    .iter()
                    .zip(&situations)
                    .map(|(&i, situation)| source.decide(&view.agents[i], situation)),
            )
            .await;

            for (&i, reply) in triggered.iter().zip(replies) {
                match reply {
                    Ok(text) => {
                        let decision = Decision::parse(&text);
                        report.agents_created += apply_decision(state, i, &decision, ctx);
                        report.applied += 1;
                    }
                    Err(e) => {
                        report.failed += 1;
                        warn!(agent = %state.agents[i].id, error = %e, "Agent unable to decide");
                    }
                }
            }
        }
        None if !triggered.is_empty() => {
            debug!(count = triggered.len(), "No decision source; triggered agents take no action");
        }
        _ => {}
    }

    for agent in state.agents.iter_mut().take(roster) {
        agent.age += 1;
        refresh_effectiveness(agent, ctx.rng);
    }
    report
}

/// Applies one parsed decision for `state.agents[idx]`. Returns the number of agents created.
pub fn apply_decision<R: Rng>(
    state: &mut GovernmentState,
    idx: usize,
    decision: &Decision,
    ctx: &mut DayContext<'_, R>,
) -> usize {
    let config = ctx.config;
    let day = ctx.day;
    let thought = InnerMonologue {
        id: ctx.ids.next_uuid(),
        timestamp: Utc::now(),
        thought: decision.reasoning.clone(),
        action: decision.action.clone(),
        reasoning: decision.reasoning.clone(),
    };
    state.agents[idx].record_thought(thought, config.simulation.monologue_capacity);
    let agent_id = state.agents[idx].id.clone();
    let agent_name = state.agents[idx].name.clone();
    debug!(agent = %agent_id, action = %decision.action, "Applying decision");

    if let Some(request) = &decision.meeting {
        let participants = select_participants(
            &state.agents,
            &state.agents[idx],
            request.meeting_type,
            config.meetings.max_participants,
        );
        let meeting = Meeting {
            id: ctx.ids.next_uuid(),
            title: request.title.clone(),
            meeting_type: request.meeting_type,
            organizer: agent_id.clone(),
            participants: participants.clone(),
            agenda: request.agenda.clone(),
            outcomes: Vec::new(),
            scheduled_day: day,
            status: MeetingStatus::Scheduled,
            transcript: Vec::new(),
        };
        let description = format!(
            "{} scheduled {}: {}",
            agent_name,
            meeting.meeting_type.as_str(),
            meeting.title
        );
        state.meetings.push(meeting);
        ctx.emit(EventType::ProposalSubmitted, description, participants, 0.15, true);
    }

    if let Some(request) = &decision.law {
        let law = Law {
            id: ctx.ids.next_uuid(),
            title: request.title.clone(),
            description: request.description.clone(),
            category: request.category,
            sponsor: agent_id.clone(),
            cosponsors: Vec::new(),
            status: LawStatus::Drafted,
            votes: Vec::new(),
            drafted_day: day,
            effective_day: None,
            impact: LawImpact {
                budget_change: request.budget_change * DOLLARS_PER_BILLION,
                ..LawImpact::default()
            },
        };
        let description = format!("{} drafted law: {}", agent_name, law.title);
        state.laws.push(law);
        ctx.emit(EventType::ProposalSubmitted, description, vec![agent_id.clone()], 0.2, true);
    }

    if let Some(billions) = decision.budget_change {
        let mut delta = billions * DOLLARS_PER_BILLION;
        if ctx.modifiers.budget_constraints && delta > 0.0 {
            let allocated: f64 = state.agents.iter().filter_map(|a| a.budget).sum();
            delta = delta.min((state.total_budget - allocated).max(0.0));
        }
        let realized = state.agents[idx].adjust_budget(delta);
        if realized != 0.0 {
            state.budget_ledger.push(BudgetChange {
                agent_id: agent_id.clone(),
                change: realized,
                reason: decision.action.clone(),
            });
            let description = format!(
                "{} {} their budget by ${:.2}B",
                agent_name,
                if realized > 0.0 { "increased" } else { "decreased" },
                realized.abs() / DOLLARS_PER_BILLION
            );
            let impact = if state.total_budget > 0.0 {
                realized.abs() / state.total_budget
            } else {
                0.0
            };
            ctx.emit(EventType::BudgetAllocated, description, vec![agent_id.clone()], impact, true);
        }
    }

    if let Some(request) = &decision.goal {
        let status = if state.agents[idx].agent_type.is_senior() {
            GoalStatus::Active
        } else {
            GoalStatus::Proposed
        };
        let goal = CollectiveGoal {
            id: ctx.ids.next_uuid(),
            title: request.title.clone(),
            description: decision.action.clone(),
            target_metric: request.metric,
            target_value: request.target_value,
            current_value: 0.0,
            priority: request.priority,
            assigned_agents: vec![agent_id.clone()],
            deadline_day: Some(day + config.goals.deadline_horizon_days),
            progress: 0.0,
            status,
        };
        let description = format!(
            "{} proposed new {} priority goal: {}",
            agent_name,
            goal.priority.as_str(),
            goal.title
        );
        state.collective_goals.push(goal);
        ctx.emit(EventType::ProposalSubmitted, description, vec![agent_id.clone()], 0.3, true);
    }

    let mut created = 0;
    match decision.create_entity.as_deref() {
        Some(entity) => {
            let child = spawn_child(&state.agents[idx], entity, &config.evolution, ctx.ids, ctx.rng);
            let involved = vec![agent_id.clone(), child.id.clone()];
            debug!(parent = %agent_id, child = %child.id, "Agent created");
            state.agents.push(child);
            created = 1;
            let description = format!("{}: {}", agent_name, decision.action);
            ctx.emit(EventType::AgentCreated, description, involved, 0.2, true);
        }
        None => {
            let description = format!("{}: {}", agent_name, decision.action);
            ctx.emit(EventType::AgentAction, description, vec![agent_id.clone()], 0.1, true);
        }
    }

    if mentions_partnership(&decision.action) {
        form_random_relationship(state, idx, &config.agency, ctx);
    }

    state.agents[idx].adjust_effectiveness(config.agency.action_effectiveness_bonus);
    created
}
