/// Asserts that every agent's effectiveness lies within `[0.1, 1.0]`.
#[macro_export]
macro_rules! assert_effectiveness_bounded {
    ($state:expr) => {
        for agent in &$state.agents {
            assert!(
                (0.1..=1.0).contains(&agent.effectiveness),
                "Agent {} effectiveness {} out of bounds",
                agent.id,
                agent.effectiveness
            );
        }
    };
}

/// Asserts that no agent budget went negative.
#[macro_export]
macro_rules! assert_budgets_non_negative {
    ($state:expr) => {
        for agent in &$state.agents {
            if let Some(budget) = agent.budget {
                assert!(budget >= 0.0, "Agent {} budget {} is negative", agent.id, budget);
            }
        }
        assert!($state.total_budget >= 0.0, "Total budget is negative");
    };
}
