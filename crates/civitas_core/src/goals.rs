//! Collective goal tracking: metric readings, progress, completion rewards and deadline failures.

use crate::context::DayContext;
use crate::state::GovernmentState;
use civitas_data::{BudgetChange, CollectiveGoal, EventType, GoalMetric, GoalStatus};
use rand::Rng;
use tracing::info;

/// Current reading of `metric`, in the units goals are written in.
#[must_use]
pub fn metric_value(state: &GovernmentState, metric: GoalMetric) -> f64 {
    let c = &state.external_conditions;
    match metric {
        GoalMetric::GdpGrowthRate => c.gdp_growth_percent(),
        GoalMetric::UnemploymentRate => c.unemployment_rate,
        GoalMetric::InflationRate => c.inflation_rate,
        GoalMetric::PublicApproval => state.public_approval * 100.0,
        GoalMetric::TechnologyLevel => c.technology_level * 100.0,
        GoalMetric::EnvironmentalScore => (1.0 - c.environmental_challenges) * 100.0,
        GoalMetric::GlobalStability => c.global_stability * 100.0,
    }
}

/// `1 - |target - current| / |target|`, clamped to `[0, 1]`.
#[must_use]
pub fn progress(target: f64, current: f64) -> f64 {
    if target == 0.0 {
        return if current == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - (target - current).abs() / target.abs()).clamp(0.0, 1.0)
}

#[must_use]
pub fn is_reached(target: f64, current: f64, tolerance: f64) -> bool {
    (current - target).abs() <= tolerance * target.abs()
}

/// Tally of one day's goal updates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GoalReport {
    pub completed: usize,
    pub failed: usize,
}

/// Updates every active goal. Terminal goals are never revisited.
pub fn update_goals<R: Rng>(state: &mut GovernmentState, ctx: &mut DayContext<'_, R>) -> GoalReport {
    let mut report = GoalReport::default();
    let tolerance = ctx.config.goals.completion_tolerance;
    let failure_progress = ctx.config.goals.failure_progress;

    for gi in 0..state.collective_goals.len() {
        if state.collective_goals[gi].status != GoalStatus::Active {
            continue;
        }
        let current = metric_value(state, state.collective_goals[gi].target_metric);
        let goal = &mut state.collective_goals[gi];
        goal.current_value = current;
        goal.progress = progress(goal.target_value, current);

        if is_reached(goal.target_value, current, tolerance) {
            goal.progress = 1.0;
            goal.status = GoalStatus::Completed;
            report.completed += 1;
            let goal = goal.clone();
            info!(goal = %goal.title, priority = goal.priority.as_str(), "Collective goal completed");
            reward_completion(state, &goal, ctx);
            continue;
        }

        if goal
            .deadline_day
            .is_some_and(|deadline| ctx.day > deadline && goal.progress < failure_progress)
        {
            goal.status = GoalStatus::Failed;
            report.failed += 1;
            let description = format!(
                "Collective goal failed: {} ({}% progress at deadline)",
                goal.title,
                (goal.progress * 100.0).round()
            );
            let involved = goal.assigned_agents.clone();
            ctx.emit(EventType::ProposalSubmitted, description, involved, -0.3, true);
        }
    }
    report
}

/// Splits the priority reward across assigned agents that carry a budget line,
/// bumps their effectiveness and lifts public approval.
pub fn reward_completion<R: Rng>(state: &mut GovernmentState, goal: &CollectiveGoal, ctx: &mut DayContext<'_, R>) {
    if !ctx.modifiers.goal_incentives {
        let description = format!("Collective goal achieved: {}", goal.title);
        ctx.emit(EventType::ProposalSubmitted, description, goal.assigned_agents.clone(), 0.5, true);
        return;
    }

    let goals = &ctx.config.goals;
    let total_reward = goals.rewards.get(goal.priority);
    let boost = goals.approval_boosts.get(goal.priority);
    let effectiveness_reward = goals.effectiveness_reward;

    let recipients: Vec<usize> = goal
        .assigned_agents
        .iter()
        .filter_map(|id| state.agent_index(id))
        .filter(|&i| state.agents[i].budget.is_some())
        .collect();

    if !recipients.is_empty() {
        let share = total_reward / recipients.len() as f64;
        for &i in &recipients {
            let agent = &mut state.agents[i];
            let realized = agent.adjust_budget(share);
            agent.adjust_effectiveness(effectiveness_reward);
            state.budget_ledger.push(BudgetChange {
                agent_id: agent.id.clone(),
                change: realized,
                reason: format!("Goal completion: {}", goal.title),
            });
            let description = format!(
                "{} received ${:.1}B for completing goal: {}",
                agent.name,
                realized / 1e9,
                goal.title
            );
            let involved = vec![agent.id.clone()];
            ctx.emit(EventType::BudgetAllocated, description, involved, 0.4, true);
        }
    }

    state.public_approval = (state.public_approval + boost).min(1.0);

    let description = format!(
        "Collective goal achieved: {}! ${:.0}B distributed to {} agents",
        goal.title,
        total_reward / 1e9,
        recipients.len()
    );
    ctx.emit(EventType::ProposalSubmitted, description, goal.assigned_agents.clone(), 0.5, true);
}
