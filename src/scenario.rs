//! Scenario runner for efficient batch projections
//!
//! Pre-loads configuration and tables once, memoizes extended series per
//! `(metric, country, disease, horizon)`, and evaluates independent
//! requests in parallel.

use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::info;
use rayon::prelude::*;

use crate::assumptions::Assumptions;
use crate::error::Result;
use crate::projection::{ProjectionBreakdown, ProjectionEngine, ProjectionRequest, ResultRecord};
use crate::series::ExtendedSeries;

/// Which anchor table a series was extended from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Burden,
    Prevalence,
}

type SeriesKey = (Metric, String, String, i32);

/// Pre-loaded scenario runner for efficient batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// // Every region for one disease, evaluated in parallel
/// for (region, result) in runner.run_all_regions("Indonesia", "Diabetes", 2030, 100, 1, 20.0) {
///     println!("{}: {:?}", region, result?.economic_burden);
/// }
/// ```
#[derive(Debug)]
pub struct ScenarioRunner {
    /// Pre-loaded configuration and tables
    base_assumptions: Assumptions,

    /// Extended series shared across requests
    cache: Mutex<HashMap<SeriesKey, Arc<ExtendedSeries>>>,
}

impl ScenarioRunner {
    /// Create runner with the in-memory sample data set
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::sample())
    }

    /// Create runner by loading configuration and tables from data/
    pub fn from_csv() -> std::result::Result<Self, Box<dyn Error>> {
        Ok(Self::with_assumptions(Assumptions::from_csv()?))
    }

    /// Create runner from a specific data directory
    pub fn from_csv_path(path: &Path) -> std::result::Result<Self, Box<dyn Error>> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            base_assumptions: assumptions,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Engine borrowing the runner's assumptions
    pub fn engine(&self) -> ProjectionEngine<'_> {
        ProjectionEngine::from_assumptions(&self.base_assumptions)
    }

    /// Run a single projection, reusing cached series
    pub fn run(&self, request: &ProjectionRequest) -> Result<ResultRecord> {
        self.breakdown(request).map(ResultRecord::from)
    }

    /// Unrounded projection, reusing cached series
    pub fn breakdown(&self, request: &ProjectionRequest) -> Result<ProjectionBreakdown> {
        let engine = self.engine();
        let ratio = engine.check_request(request)?;

        let country = engine.country_of(request);
        let horizon = engine.horizon_for(request.year);
        let burden = self.series(Metric::Burden, country, &request.disease, horizon)?;
        let prevalence = self.series(Metric::Prevalence, country, &request.disease, horizon)?;

        engine.breakdown_with_series(request, ratio, &burden, &prevalence)
    }

    /// Run many independent requests in parallel; results keep input order
    pub fn run_batch(&self, requests: &[ProjectionRequest]) -> Vec<Result<ResultRecord>> {
        let start = Instant::now();
        let results: Vec<_> = requests.par_iter().map(|r| self.run(r)).collect();

        info!(
            "Ran {} projections ({} failed) in {:?}",
            results.len(),
            results.iter().filter(|r| r.is_err()).count(),
            start.elapsed()
        );
        results
    }

    /// Project one disease and year for a whole country and then every
    /// region of it, sorted by region name
    ///
    /// An unknown country yields a single `NotFound` entry for the
    /// whole-country scope.
    pub fn run_all_regions(
        &self,
        country: &str,
        disease: &str,
        year: i32,
        clinics: u32,
        providers: u32,
        capacity_pct: f64,
    ) -> Vec<(String, Result<ResultRecord>)> {
        let region_names: Vec<String> = self
            .base_assumptions
            .tables
            .country(country)
            .map(|tables| tables.region_names().map(str::to_string).collect())
            .unwrap_or_default();
        let regions: Vec<String> = std::iter::once(self.base_assumptions.config.aggregate_region.clone())
            .chain(region_names)
            .collect();

        let requests: Vec<ProjectionRequest> = regions
            .iter()
            .map(|region| {
                ProjectionRequest::new(disease, region.as_str(), year)
                    .in_country(country)
                    .with_intervention(clinics, providers, capacity_pct)
            })
            .collect();

        regions.into_iter().zip(self.run_batch(&requests)).collect()
    }

    /// Project one disease and year for every country, whole-country scope,
    /// sorted by country name
    pub fn run_all_countries(
        &self,
        disease: &str,
        year: i32,
        clinics: u32,
        providers: u32,
        capacity_pct: f64,
    ) -> Vec<(String, Result<ResultRecord>)> {
        let aggregate = self.base_assumptions.config.aggregate_region.as_str();
        let countries: Vec<String> = self.base_assumptions.tables.country_names().map(str::to_string).collect();

        let requests: Vec<ProjectionRequest> = countries
            .iter()
            .map(|country| {
                ProjectionRequest::new(disease, aggregate, year)
                    .in_country(country.as_str())
                    .with_intervention(clinics, providers, capacity_pct)
            })
            .collect();

        countries.into_iter().zip(self.run_batch(&requests)).collect()
    }

    /// Burden of a whole country summed over every disease, on the span all
    /// disease series share
    pub fn aggregate_burden_series(&self, country: &str, horizon_year: i32) -> Result<ExtendedSeries> {
        let series = self
            .engine()
            .country(country)?
            .diseases()
            .map(|disease| self.series(Metric::Burden, country, disease, horizon_year))
            .collect::<Result<Vec<_>>>()?;

        ExtendedSeries::sum(series.iter().map(|s| s.as_ref()))
    }

    /// Number of memoized series
    pub fn cached_series(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// Get reference to base assumptions for inspection
    pub fn assumptions(&self) -> &Assumptions {
        &self.base_assumptions
    }

    /// Get mutable reference to base assumptions for customization
    ///
    /// Drops every cached series, since they may no longer match.
    pub fn assumptions_mut(&mut self) -> &mut Assumptions {
        self.clear_cache();
        &mut self.base_assumptions
    }

    fn series(&self, metric: Metric, country: &str, disease: &str, horizon_year: i32) -> Result<Arc<ExtendedSeries>> {
        let key = (metric, country.to_string(), disease.to_string(), horizon_year);
        if let Some(series) = self.lock_cache().get(&key) {
            return Ok(Arc::clone(series));
        }

        let engine = self.engine();
        let series = Arc::new(match metric {
            Metric::Burden => engine.burden_series(country, disease, horizon_year)?,
            Metric::Prevalence => engine.prevalence_series(country, disease, horizon_year)?,
        });

        // Another thread may have raced us here; both values are identical
        self.lock_cache().entry(key).or_insert_with(|| Arc::clone(&series));
        Ok(series)
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<SeriesKey, Arc<ExtendedSeries>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
