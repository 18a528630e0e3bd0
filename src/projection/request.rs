//! Projection request consumed by the engine

use serde::{Deserialize, Serialize};

/// Disease, region and year to project, plus intervention sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    /// Country whose tables to use; the configured home country when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub disease: String,
    pub region: String,
    pub year: i32,
    #[serde(default)]
    pub clinics: u32,
    /// Providers per clinic
    #[serde(default)]
    pub providers: u32,
    /// Share of provider capacity allocated to the disease, in percent
    #[serde(default)]
    pub capacity_pct: f64,
}

impl ProjectionRequest {
    /// Request with no intervention
    pub fn new(disease: impl Into<String>, region: impl Into<String>, year: i32) -> Self {
        Self {
            country: None,
            disease: disease.into(),
            region: region.into(),
            year,
            clinics: 0,
            providers: 0,
            capacity_pct: 0.0,
        }
    }

    /// Project against another country's tables
    pub fn in_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Set intervention sizing
    pub fn with_intervention(mut self, clinics: u32, providers: u32, capacity_pct: f64) -> Self {
        self.clinics = clinics;
        self.providers = providers;
        self.capacity_pct = capacity_pct;
        self
    }
}
