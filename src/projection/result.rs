//! Projection output structures

use serde::{Deserialize, Serialize};

use crate::impact::{DiagnosisSplit, InterventionImpact};

/// Unrounded intermediate values of one projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionBreakdown {
    pub country: String,
    pub disease: String,
    pub region: String,
    pub year: i32,

    // Populations
    pub population: f64,
    pub reference_population: f64,
    pub prevalence_pct: f64,
    pub susceptible: f64,
    pub reference_susceptible: f64,

    // Burden
    pub reference_burden: f64,
    pub burden: f64,
    pub burden_per_capita: f64,

    pub split: DiagnosisSplit,
    pub impact: InterventionImpact,
}

/// Flat, rounded result handed to presentation code
///
/// Counts and currency are rounded to whole units and clamped at zero;
/// percentages are rounded to two decimals. Exact halves round to the even
/// neighbour, so 2.5 becomes 2 and 3.5 becomes 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub population: i64,
    pub susceptible_population: i64,
    pub susceptible_diagnosed: i64,
    pub susceptible_undiagnosed: i64,
    pub economic_burden: i64,
    pub economic_burden_per_capita: i64,
    pub intervention_capacity: i64,
    pub pct_undiag_before: f64,
    pub pct_undiag_after: f64,
    pub economic_burden_after: i64,
    pub economic_burden_delta: i64,
}

fn whole(value: f64) -> i64 {
    value.max(0.0).round_ties_even() as i64
}

fn pct(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

impl From<&ProjectionBreakdown> for ResultRecord {
    fn from(b: &ProjectionBreakdown) -> Self {
        Self {
            population: whole(b.population),
            susceptible_population: whole(b.susceptible),
            susceptible_diagnosed: whole(b.split.diagnosed),
            susceptible_undiagnosed: whole(b.split.undiagnosed),
            economic_burden: whole(b.burden),
            economic_burden_per_capita: whole(b.burden_per_capita),
            intervention_capacity: whole(b.impact.capacity),
            pct_undiag_before: pct(b.impact.pct_before),
            pct_undiag_after: pct(b.impact.pct_after),
            economic_burden_after: whole(b.impact.burden_after),
            economic_burden_delta: whole(b.impact.burden_delta),
        }
    }
}

impl From<ProjectionBreakdown> for ResultRecord {
    fn from(b: ProjectionBreakdown) -> Self {
        Self::from(&b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown() -> ProjectionBreakdown {
        ProjectionBreakdown {
            country: "Indonesia".to_string(),
            disease: "Diabetes".to_string(),
            region: "Bali".to_string(),
            year: 2024,
            population: 1_526_700.4,
            reference_population: 24_000_000.0,
            prevalence_pct: 11.7,
            susceptible: 178_623.9,
            reference_susceptible: 2_808_000.0,
            reference_burden: 2.6e9,
            burden: 165_386_948.5,
            burden_per_capita: 3_192.66,
            split: DiagnosisSplit { diagnosed: 126_822.969, undiagnosed: 51_800.931 },
            impact: InterventionImpact {
                capacity: 110_400.0,
                pct_before: 28.999999999999996,
                pct_after: 0.0,
                burden_after: -0.0,
                burden_delta: 165_386_948.5,
            },
        }
    }

    #[test]
    fn test_rounding() {
        let record = ResultRecord::from(&breakdown());
        assert_eq!(record.population, 1_526_700);
        assert_eq!(record.susceptible_population, 178_624);
        assert_eq!(record.susceptible_undiagnosed, 51_801);
        assert_eq!(record.economic_burden, 165_386_948);
        assert_eq!(record.economic_burden_per_capita, 3_193);
        assert_eq!(record.pct_undiag_before, 29.0);
        assert_eq!(record.economic_burden_after, 0);
    }

    #[test]
    fn test_ties_round_to_even() {
        let mut b = breakdown();
        b.population = 2.5;
        b.susceptible = 3.5;
        b.burden = 1_000_000.5;
        b.impact.pct_before = 12.125;
        b.impact.pct_after = 0.375;
        let record = ResultRecord::from(&b);

        assert_eq!(record.population, 2);
        assert_eq!(record.susceptible_population, 4);
        assert_eq!(record.economic_burden, 1_000_000);
        assert_eq!(record.pct_undiag_before, 12.12);
        assert_eq!(record.pct_undiag_after, 0.38);
    }

    #[test]
    fn test_negative_counts_clamped() {
        let mut b = breakdown();
        b.population = -12.0;
        b.susceptible = -1.4;
        let record = ResultRecord::from(b);
        assert_eq!(record.population, 0);
        assert_eq!(record.susceptible_population, 0);
    }

    #[test]
    fn test_serializes_flat_field_names() {
        let json = serde_json::to_value(ResultRecord::from(&breakdown())).unwrap();
        for key in [
            "population",
            "susceptible_population",
            "susceptible_diagnosed",
            "susceptible_undiagnosed",
            "economic_burden",
            "economic_burden_per_capita",
            "intervention_capacity",
            "pct_undiag_before",
            "pct_undiag_after",
            "economic_burden_after",
            "economic_burden_delta",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json.as_object().unwrap().len(), 11);
    }
}
