//! Daily random walk of the macro conditions the government reacts to.

use crate::state::GovernmentState;
use civitas_data::ExternalConditions;
use rand::Rng;

/// Simulated years per day.
pub const YEAR_STEP: f64 = 0.01;
/// Share of GDP the government budget tracks.
pub const BUDGET_SHARE_OF_GDP: f64 = 0.18;

/// Next day's conditions. Total over every input; ranges are enforced by clamping.
pub fn evolve<R: Rng>(prev: &ExternalConditions, rng: &mut R) -> ExternalConditions {
    let mut next = prev.clone();

    next.year += YEAR_STEP;
    next.population *= 1.0 + 0.005 * YEAR_STEP;

    let gdp_growth = 0.025 + (rng.gen::<f64>() - 0.5) * 0.02;
    next.gdp *= 1.0 + gdp_growth * YEAR_STEP;

    let breakthrough = if rng.gen_bool(0.05) {
        rng.gen::<f64>() * 0.01
    } else {
        0.0
    };
    next.technology_level = (next.technology_level + 0.001 + breakthrough).min(1.0);

    next.unemployment_rate =
        (next.unemployment_rate + (rng.gen::<f64>() - 0.5) * 0.02).clamp(1.5, 15.0);
    next.inflation_rate = (next.inflation_rate + (rng.gen::<f64>() - 0.5) * 0.05).clamp(-2.0, 8.0);
    next.global_stability =
        (next.global_stability + (rng.gen::<f64>() - 0.5) * 0.01).clamp(0.1, 0.9);

    let economic_factor =
        (5.0 - next.unemployment_rate) / 10.0 + (3.0 - next.inflation_rate) / 20.0;
    next.domestic_sentiment =
        (0.8 * next.domestic_sentiment + 0.2 * economic_factor).clamp(0.1, 0.9);

    next.environmental_challenges =
        (next.environmental_challenges + rng.gen::<f64>() * 0.001).clamp(0.0, 1.0);

    next
}

/// Evolves the conditions in place and re-derives the budget and approval that track them.
///
/// The budget is the GDP share plus whatever enacted laws have added or cut.
pub fn advance<R: Rng>(state: &mut GovernmentState, rng: &mut R) {
    state.external_conditions = evolve(&state.external_conditions, rng);
    let c = &state.external_conditions;
    state.total_budget = (c.gdp * BUDGET_SHARE_OF_GDP + state.enacted_budget_offset).max(0.0);
    let approval_factor = (c.domestic_sentiment + c.global_stability) / 2.0;
    state.public_approval = (0.9 * state.public_approval + 0.1 * approval_factor).clamp(0.0, 1.0);
}
