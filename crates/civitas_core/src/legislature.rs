//! Deliberative pipelines: proposal review, review of proposed goals, and the
//! drafted → committee → floor-vote → passed → enacted path of laws.

use crate::config::LegislatureConfig;
use crate::context::DayContext;
use crate::state::GovernmentState;
use civitas_data::{
    Agent, AgentType, EventType, GoalStatus, LawStatus, ProposalStatus, Vote, VoteRecord,
};
use rand::Rng;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LegislatureReport {
    pub proposals_decided: usize,
    pub goals_reviewed: usize,
    pub laws_advanced: usize,
    pub laws_enacted: usize,
    pub laws_vetoed: usize,
}

/// Moves fresh proposals under review and decides some of those already there.
pub fn review_proposals<R: Rng>(state: &mut GovernmentState, ctx: &mut DayContext<'_, R>, report: &mut LegislatureReport) {
    let config = &ctx.config.legislature;
    let (review_p, approve_p) = (config.review_probability, config.approval_probability);

    for pi in 0..state.active_proposals.len() {
        let status = state.active_proposals[pi].status;
        match status {
            ProposalStatus::Proposed => {
                state.active_proposals[pi].status = ProposalStatus::UnderReview;
            }
            ProposalStatus::UnderReview if ctx.rng.gen_bool(review_p) => {
                let approved = ctx.rng.gen_bool(approve_p);
                let proposal = &mut state.active_proposals[pi];
                proposal.status = if approved {
                    ProposalStatus::Approved
                } else {
                    ProposalStatus::Rejected
                };
                report.proposals_decided += 1;
                let description = format!(
                    "Proposal {}: {}",
                    if approved { "approved" } else { "rejected" },
                    proposal.title
                );
                let involved = vec![proposal.proposed_by.clone()];
                let impact = if approved { 0.2 } else { -0.1 };
                ctx.emit(EventType::ApprovalGiven, description, involved, impact, true);
            }
            _ => {}
        }
    }
}

/// Goals proposed by junior agents are reviewed at the review rate. Approval
/// activates a goal; a rejected goal is withdrawn and only the event remains.
pub fn review_proposed_goals<R: Rng>(state: &mut GovernmentState, ctx: &mut DayContext<'_, R>, report: &mut LegislatureReport) {
    let config = &ctx.config.legislature;
    let (review_p, approve_p) = (config.review_probability, config.approval_probability);

    let mut withdrawn = Vec::new();
    for goal in state
        .collective_goals
        .iter_mut()
        .filter(|g| g.status == GoalStatus::Proposed)
    {
        if !ctx.rng.gen_bool(review_p) {
            continue;
        }
        let approved = ctx.rng.gen_bool(approve_p);
        report.goals_reviewed += 1;
        let involved = goal.assigned_agents.clone();
        if approved {
            goal.status = GoalStatus::Active;
            let description = format!("Goal activated: {}", goal.title);
            ctx.emit(EventType::ApprovalGiven, description, involved, 0.1, true);
        } else {
            withdrawn.push(goal.id);
            let description = format!("Goal rejected: {}", goal.title);
            ctx.emit(EventType::ApprovalGiven, description, involved, -0.1, true);
        }
    }
    if !withdrawn.is_empty() {
        state.collective_goals.retain(|g| !withdrawn.contains(&g.id));
    }
}

/// A voter's ballot: close ideology and a collaborative temperament lean yes.
fn cast_vote<R: Rng>(voter: &Agent, sponsor_ideology: f64, rng: &mut R) -> Vote {
    let distance = (voter.personality.ideology_lean - sponsor_ideology).abs() / 2.0;
    let support = (1.0 - distance) * 0.7 + voter.personality.collaboration * 0.3;
    let roll: f64 = rng.gen();
    if roll < support * 0.9 {
        Vote::Yes
    } else if roll < support * 0.9 + 0.1 {
        Vote::Abstain
    } else {
        Vote::No
    }
}

/// Top-level executive: lowest hierarchy level, ties broken by population order.
fn chief_executive(agents: &[Agent]) -> Option<&Agent> {
    agents
        .iter()
        .filter(|a| a.agent_type == AgentType::Executive)
        .min_by_key(|a| a.position.level)
}

/// Advances each non-terminal law at most one stage.
pub fn advance_laws<R: Rng>(state: &mut GovernmentState, ctx: &mut DayContext<'_, R>, report: &mut LegislatureReport) {
    let config: LegislatureConfig = ctx.config.legislature.clone();

    for li in 0..state.laws.len() {
        let status = state.laws[li].status;
        if status.is_terminal() || !ctx.rng.gen_bool(config.advance_probability) {
            continue;
        }
        let sponsor_ideology = state
            .agent(&state.laws[li].sponsor)
            .map_or(0.0, |a| a.personality.ideology_lean);

        let next = match status {
            LawStatus::Drafted => LawStatus::Committee,
            LawStatus::Committee => LawStatus::FloorVote,
            LawStatus::FloorVote => {
                let votes: Vec<VoteRecord> = state
                    .agents
                    .iter()
                    .filter(|a| matches!(a.agent_type, AgentType::Legislative | AgentType::Committee))
                    .map(|a| VoteRecord {
                        agent_id: a.id.clone(),
                        vote: cast_vote(a, sponsor_ideology, ctx.rng),
                    })
                    .collect();
                let yes = votes.iter().filter(|v| v.vote == Vote::Yes).count();
                let passed = yes * 2 > votes.len();
                state.laws[li].votes = votes;
                if passed {
                    LawStatus::Passed
                } else {
                    LawStatus::Vetoed
                }
            }
            LawStatus::Passed => {
                let vetoed = chief_executive(&state.agents).is_some_and(|exec| {
                    (exec.personality.ideology_lean - sponsor_ideology).abs() > config.veto_threshold
                }) && ctx.rng.gen_bool(0.5);
                if vetoed {
                    LawStatus::Vetoed
                } else {
                    LawStatus::Enacted
                }
            }
            LawStatus::Vetoed | LawStatus::Enacted => continue,
        };

        report.laws_advanced += 1;
        let law = &mut state.laws[li];
        law.status = next;
        debug!(law = %law.title, status = next.as_str(), "Law advanced");

        let (event_type, impact) = match next {
            LawStatus::Enacted => {
                law.effective_day = Some(ctx.day);
                report.laws_enacted += 1;
                (EventType::ApprovalGiven, 0.4)
            }
            LawStatus::Vetoed => {
                report.laws_vetoed += 1;
                (EventType::OversightAction, -0.2)
            }
            _ => (EventType::ProposalSubmitted, 0.1),
        };
        let description = format!("Law {}: {}", next.as_str(), law.title);
        let mut involved = vec![law.sponsor.clone()];
        involved.extend(law.cosponsors.iter().cloned());
        let budget_change = law.impact.budget_change;
        ctx.emit(event_type, description, involved, impact, true);

        if next == LawStatus::Enacted {
            state.enacted_budget_offset += budget_change;
            state.total_budget = (state.total_budget + budget_change).max(0.0);
        }
    }
}

/// The whole deliberative phase of a day.
pub fn deliberate<R: Rng>(state: &mut GovernmentState, ctx: &mut DayContext<'_, R>) -> LegislatureReport {
    let mut report = LegislatureReport::default();
    review_proposals(state, ctx, &mut report);
    review_proposed_goals(state, ctx, &mut report);
    advance_laws(state, ctx, &mut report);
    report
}
