use serde::{Deserialize, Serialize};

/// GDP the economy is measured against for growth-rate goals, in dollars.
pub const BASELINE_GDP: f64 = 26_900_000_000_000.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Macro-level scalars the government reacts to.
pub struct ExternalConditions {
    pub population: f64,
    /// Dollars.
    pub gdp: f64,
    /// Percent, `[1.5, 15]`.
    pub unemployment_rate: f64,
    /// Percent, `[-2, 8]`.
    pub inflation_rate: f64,
    /// `[0, 1]`, never decreases.
    pub technology_level: f64,
    /// `[0.1, 0.9]`
    pub global_stability: f64,
    /// `[0.1, 0.9]`
    pub domestic_sentiment: f64,
    /// `[0, 1]`
    pub environmental_challenges: f64,
    /// Fractional calendar year.
    pub year: f64,
}

impl Default for ExternalConditions {
    fn default() -> Self {
        Self {
            population: 335_000_000.0,
            gdp: BASELINE_GDP,
            unemployment_rate: 3.8,
            inflation_rate: 2.1,
            technology_level: 0.85,
            global_stability: 0.65,
            domestic_sentiment: 0.50,
            environmental_challenges: 0.40,
            year: 2024.0,
        }
    }
}

impl ExternalConditions {
    /// Percent deviation of GDP from [`BASELINE_GDP`].
    #[must_use]
    pub fn gdp_growth_percent(&self) -> f64 {
        (self.gdp - BASELINE_GDP) / BASELINE_GDP * 100.0
    }
}
