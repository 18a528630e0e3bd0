//! Scalar model configuration: growth, capacity constants and per-disease
//! undiagnosed ratios

use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::impact::{check_ratio, InterventionConfig, DEFAULT_CAPACITY_NORMALIZATION};

/// Immutable configuration passed to the projection engine
///
/// Field aliases accept the legacy `parameters.json` key names
/// (`old_ratio`, `old_population_all`, `capacity_yearly`, `undiagnosed_ratio`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Simple annual population growth rate
    pub growth_rate: f64,

    /// People one provider can see in a year
    #[serde(alias = "capacity_yearly")]
    pub yearly_capacity_per_provider: f64,

    /// Capacity units consumed per newly diagnosed patient
    pub capacity_normalization: f64,

    /// Year the baseline populations refer to
    pub reference_year: i32,

    /// Default horizon for extended series
    pub horizon_year: i32,

    /// Fraction of a region's total population that is at risk
    #[serde(alias = "old_ratio")]
    pub population_share: f64,

    /// At-risk population of the whole country; defaults to the sum of
    /// region baselines
    #[serde(alias = "old_population_all")]
    pub reference_population: Option<f64>,

    /// Region name that selects the whole-country scope
    pub aggregate_region: String,

    /// Country the region tables belong to; requests without a country
    /// resolve to it
    pub home_country: String,

    /// Last year a request may ask for
    pub max_year: i32,

    /// Fraction of the susceptible population without a diagnosis, by disease
    #[serde(alias = "undiagnosed_ratio")]
    pub undiagnosed_ratios: BTreeMap<String, f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let undiagnosed_ratios = [
            ("Diabetes", 0.29),
            ("Hypertension", 0.63),
            ("Heart Problem", 0.7),
            ("Stroke", 0.82),
            ("Dementia", 0.3),
            ("Pregnancy", 0.3),
            ("Stunting", 0.3),
            ("Menopause", 0.3),
        ]
        .into_iter()
        .map(|(disease, ratio)| (disease.to_string(), ratio))
        .collect();

        Self {
            growth_rate: 0.01,
            yearly_capacity_per_provider: 110_400.0,
            capacity_normalization: DEFAULT_CAPACITY_NORMALIZATION,
            reference_year: 2024,
            horizon_year: 2034,
            population_share: 1.0,
            reference_population: None,
            aggregate_region: "All Regions".to_string(),
            home_country: "Indonesia".to_string(),
            max_year: 2100,
            undiagnosed_ratios,
        }
    }
}

impl ModelConfig {
    /// Load configuration from a JSON file
    pub fn from_json_path(path: &Path) -> std::result::Result<Self, Box<dyn Error>> {
        let file = File::open(path)?;
        let config: ModelConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> std::result::Result<Self, Box<dyn Error>> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject ratios outside [0, 1] and non-positive constants
    pub fn validate(&self) -> Result<()> {
        for ratio in self.undiagnosed_ratios.values() {
            check_ratio(*ratio)?;
        }
        if !(self.yearly_capacity_per_provider > 0.0) {
            return Err(ProjectionError::invalid_input(format!(
                "yearly_capacity_per_provider must be positive, got {}",
                self.yearly_capacity_per_provider
            )));
        }
        if !(self.capacity_normalization > 0.0) {
            return Err(ProjectionError::invalid_input(format!(
                "capacity_normalization must be positive, got {}",
                self.capacity_normalization
            )));
        }
        if !(0.0..=1.0).contains(&self.population_share) {
            return Err(ProjectionError::invalid_input(format!(
                "population_share {} outside [0, 1]",
                self.population_share
            )));
        }
        if self.horizon_year > self.max_year {
            return Err(ProjectionError::invalid_range(format!(
                "horizon_year {} is after max_year {}",
                self.horizon_year, self.max_year
            )));
        }
        if let Some(reference) = self.reference_population {
            if !(reference > 0.0) {
                return Err(ProjectionError::invalid_input(format!(
                    "reference_population must be positive, got {}",
                    reference
                )));
            }
        }
        Ok(())
    }

    /// Undiagnosed ratio for a disease, by exact key
    pub fn undiagnosed_ratio(&self, disease: &str) -> Option<f64> {
        self.undiagnosed_ratios.get(disease).copied()
    }

    /// Whether `region` names the whole-country scope
    pub fn is_aggregate(&self, region: &str) -> bool {
        region == self.aggregate_region
    }

    /// Intervention sizing combined with the configured capacity constants
    pub fn intervention(&self, clinics: u32, providers: u32, capacity_pct: f64) -> InterventionConfig {
        InterventionConfig {
            clinics,
            providers,
            capacity_pct,
            yearly_capacity_per_provider: self.yearly_capacity_per_provider,
            normalization: self.capacity_normalization,
        }
    }
}
