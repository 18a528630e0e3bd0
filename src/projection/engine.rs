//! Core projection engine: one request in, one result record out

use log::{debug, warn};

use crate::assumptions::{Assumptions, CountryTables, DataTables, ModelConfig};
use crate::error::{ProjectionError, Result};
use crate::impact::{self, per_capita_burden};
use crate::population::{allocate, project, RegionPopulation};
use crate::series::{extend, ExtendedSeries};
use super::request::ProjectionRequest;
use super::result::{ProjectionBreakdown, ResultRecord};

/// Population scope a request resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionScope<'a> {
    /// Whole country: reference population and unscaled burden
    Aggregate,
    /// One region: its own population and an allocated share of the burden
    Region(&'a RegionPopulation),
}

/// Projection engine over borrowed configuration and tables
///
/// Holds no mutable state, so one engine can serve any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionEngine<'a> {
    config: &'a ModelConfig,
    tables: &'a DataTables,
}

impl<'a> ProjectionEngine<'a> {
    /// Create a new projection engine with given configuration and tables
    pub fn new(config: &'a ModelConfig, tables: &'a DataTables) -> Self {
        Self { config, tables }
    }

    pub fn from_assumptions(assumptions: &'a Assumptions) -> Self {
        Self::new(&assumptions.config, &assumptions.tables)
    }

    pub fn config(&self) -> &'a ModelConfig {
        self.config
    }

    pub fn tables(&self) -> &'a DataTables {
        self.tables
    }

    /// Series horizon for a requested year: the configured horizon, pushed
    /// out when the request goes beyond it
    pub fn horizon_for(&self, year: i32) -> i32 {
        self.config.horizon_year.max(year)
    }

    /// Country a request targets, defaulting to the home country
    pub fn country_of<'r>(&self, request: &'r ProjectionRequest) -> &'r str
    where
        'a: 'r,
    {
        request.country.as_deref().unwrap_or_else(|| self.tables.home_country())
    }

    /// Tables of a country
    pub fn country(&self, country: &str) -> Result<&'a CountryTables> {
        self.tables
            .country(country)
            .ok_or_else(|| ProjectionError::not_found("country", country))
    }

    /// Resolve a region name to its scope within a country
    pub fn scope(&self, country: &str, region: &str) -> Result<RegionScope<'a>> {
        if self.config.is_aggregate(region) {
            return Ok(RegionScope::Aggregate);
        }
        self.country(country)?
            .region(region)
            .map(RegionScope::Region)
            .ok_or_else(|| ProjectionError::not_found("region", region))
    }

    /// Undiagnosed ratio for a disease: the country's own value, else the
    /// configured one
    pub fn undiagnosed_ratio(&self, country: &str, disease: &str) -> Result<f64> {
        self.country(country)?
            .undiagnosed_ratio(disease)
            .or_else(|| self.config.undiagnosed_ratio(disease))
            .ok_or_else(|| ProjectionError::not_found("undiagnosed ratio for disease", disease))
    }

    /// Extended burden series for a disease
    pub fn burden_series(&self, country: &str, disease: &str, horizon_year: i32) -> Result<ExtendedSeries> {
        let anchors = self
            .country(country)?
            .burden(disease)
            .ok_or_else(|| ProjectionError::not_found("disease", disease))?;
        extend(anchors, horizon_year)
    }

    /// Extended prevalence series (percent) for a disease
    pub fn prevalence_series(&self, country: &str, disease: &str, horizon_year: i32) -> Result<ExtendedSeries> {
        let anchors = self
            .country(country)?
            .prevalence(disease)
            .ok_or_else(|| ProjectionError::not_found("disease", disease))?;
        extend(anchors, horizon_year)
    }

    /// `(burden, prevalence)` series for a disease, as charted
    pub fn extend_for(
        &self,
        country: &str,
        disease: &str,
        horizon_year: i32,
    ) -> Result<(ExtendedSeries, ExtendedSeries)> {
        Ok((
            self.burden_series(country, disease, horizon_year)?,
            self.prevalence_series(country, disease, horizon_year)?,
        ))
    }

    /// Run a projection and return the rounded result record
    pub fn run(&self, request: &ProjectionRequest) -> Result<ResultRecord> {
        self.breakdown(request).map(ResultRecord::from)
    }

    /// Run a projection and return every intermediate value, unrounded
    pub fn breakdown(&self, request: &ProjectionRequest) -> Result<ProjectionBreakdown> {
        let ratio = self.check_request(request)?;
        let horizon = self.horizon_for(request.year);
        let (burden, prevalence) = self.extend_for(self.country_of(request), &request.disease, horizon)?;
        self.breakdown_with_series(request, ratio, &burden, &prevalence)
    }

    /// Validate sizing and year, and resolve the undiagnosed ratio, before
    /// any series work is done
    pub(crate) fn check_request(&self, request: &ProjectionRequest) -> Result<f64> {
        self.intervention(request).validate()?;
        if request.year > self.config.max_year {
            return Err(ProjectionError::invalid_range(format!(
                "year {} is after max_year {}",
                request.year, self.config.max_year
            )));
        }
        self.undiagnosed_ratio(self.country_of(request), &request.disease)
    }

    /// Projection against series that were already extended, e.g. from a
    /// cache, with the ratio returned by `check_request`
    pub(crate) fn breakdown_with_series(
        &self,
        request: &ProjectionRequest,
        ratio: f64,
        burden_series: &ExtendedSeries,
        prevalence_series: &ExtendedSeries,
    ) -> Result<ProjectionBreakdown> {
        let country_name = self.country_of(request);
        let country = self.country(country_name)?;
        let scope = self.scope(country_name, &request.region)?;
        let year = request.year;

        let reference_burden = burden_series.value_at(year)?;
        let prevalence_pct = prevalence_series.value_at(year)?;

        let reference_population = project(country.reference(), year);
        let reference_susceptible = reference_population * prevalence_pct / 100.0;

        let (population, susceptible, burden) = match scope {
            RegionScope::Aggregate => (reference_population, reference_susceptible, reference_burden),
            RegionScope::Region(pop) => {
                let population = project(pop, year);
                let susceptible = population * prevalence_pct / 100.0;
                let burden = allocate(reference_burden, susceptible, reference_susceptible)?;
                (population, susceptible, burden)
            }
        };

        if population < 0.0 {
            warn!(
                "Projected population for '{}' in {} is negative ({:.0}); growth rate too high for this distance from the reference year",
                request.region, year, population
            );
        }

        let split = impact::split(susceptible, ratio)?;
        let burden_per_capita = per_capita_burden(burden, split.undiagnosed);
        let impact = impact::apply(split.undiagnosed, burden, ratio, &self.intervention(request));

        debug!(
            "{} / {} / {} / {}: population {:.0}, susceptible {:.0}, burden {:.0}, capacity {:.0}, burden after {:.0}",
            country_name, request.disease, request.region, year, population, susceptible, burden, impact.capacity, impact.burden_after
        );

        Ok(ProjectionBreakdown {
            country: country_name.to_string(),
            disease: request.disease.clone(),
            region: request.region.clone(),
            year,
            population,
            reference_population,
            prevalence_pct,
            susceptible,
            reference_susceptible,
            reference_burden,
            burden,
            burden_per_capita,
            split,
            impact,
        })
    }

    fn intervention(&self, request: &ProjectionRequest) -> impact::InterventionConfig {
        self.config
            .intervention(request.clinics, request.providers, request.capacity_pct)
    }
}
