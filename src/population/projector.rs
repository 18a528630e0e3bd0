//! Linear population growth from a reference year

use serde::{Deserialize, Serialize};

/// Baseline at-risk population of one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionPopulation {
    /// Population at `reference_year`
    pub base_population: f64,
    pub reference_year: i32,
    /// Simple (non-compounding) annual growth rate
    pub annual_growth_rate: f64,
}

impl RegionPopulation {
    pub fn new(base_population: f64, reference_year: i32, annual_growth_rate: f64) -> Self {
        Self { base_population, reference_year, annual_growth_rate }
    }

    /// Projected population in `target_year`
    pub fn at(&self, target_year: i32) -> f64 {
        project(self, target_year)
    }
}

/// `base · (1 + rate · (target_year - reference_year))`
///
/// Not clamped: far enough in the past a positive rate drives the result
/// below zero, and callers decide what to do with that.
pub fn project(pop: &RegionPopulation, target_year: i32) -> f64 {
    let years = f64::from(target_year) - f64::from(pop.reference_year);
    pop.base_population * (1.0 + pop.annual_growth_rate * years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_year_is_identity() {
        let pop = RegionPopulation::new(1_250_000.0, 2024, 0.0125);
        assert_eq!(project(&pop, 2024), 1_250_000.0);
    }

    #[test]
    fn test_forward_and_backward() {
        let pop = RegionPopulation::new(1_000_000.0, 2024, 0.01);
        assert_relative_eq!(project(&pop, 2034), 1_100_000.0, epsilon = 1e-6);
        assert_relative_eq!(pop.at(2014), 900_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_distant_past_goes_negative() {
        let pop = RegionPopulation::new(100.0, 2024, 0.5);
        assert!(project(&pop, 2020) < 0.0);
    }
}
