//! Typed lookup tables for anchors and populations, per country
//!
//! Everything is validated once, when the tables are built, so lookups only
//! ever answer found / not found.

use std::collections::BTreeMap;

use log::info;

use crate::error::{ProjectionError, Result};
use crate::impact::check_ratio;
use crate::population::RegionPopulation;
use crate::series::AnchorSeries;
use super::config::ModelConfig;
use super::loader::{LoadedCountry, LoadedTables};

/// Anchor and population tables for one country
#[derive(Debug, Clone)]
pub struct CountryTables {
    burden: BTreeMap<String, AnchorSeries>,
    prevalence: BTreeMap<String, AnchorSeries>,
    regions: BTreeMap<String, RegionPopulation>,
    reference: RegionPopulation,
    undiagnosed_ratios: BTreeMap<String, f64>,
}

impl CountryTables {
    /// Build and validate tables
    ///
    /// `burden` is the whole-country undiagnosed burden per disease,
    /// `prevalence` is in percent, `reference` is the whole-country at-risk
    /// population.
    pub fn new(
        burden: BTreeMap<String, AnchorSeries>,
        prevalence: BTreeMap<String, AnchorSeries>,
        regions: BTreeMap<String, RegionPopulation>,
        reference: RegionPopulation,
    ) -> Result<Self> {
        for (metric, table) in [("burden", &burden), ("prevalence", &prevalence)] {
            for (disease, anchors) in table {
                AnchorSeries::new(anchors.year_start, anchors.value_start, anchors.year_end, anchors.value_end)?;
                if anchors.value_start < 0.0 || anchors.value_end < 0.0 {
                    return Err(ProjectionError::invalid_input(format!(
                        "{} anchors for '{}' must be non-negative",
                        metric, disease
                    )));
                }
            }
        }

        for (name, pop) in &regions {
            if !(pop.base_population >= 0.0) {
                return Err(ProjectionError::invalid_input(format!(
                    "region '{}' has negative population {}",
                    name, pop.base_population
                )));
            }
        }

        if !(reference.base_population > 0.0) {
            return Err(ProjectionError::invalid_input(format!(
                "reference population must be positive, got {}",
                reference.base_population
            )));
        }

        Ok(Self::from_parts(burden, prevalence, regions, reference))
    }

    /// Assemble tables without validation, for data known to be valid
    pub(super) fn from_parts(
        burden: BTreeMap<String, AnchorSeries>,
        prevalence: BTreeMap<String, AnchorSeries>,
        regions: BTreeMap<String, RegionPopulation>,
        reference: RegionPopulation,
    ) -> Self {
        Self { burden, prevalence, regions, reference, undiagnosed_ratios: BTreeMap::new() }
    }

    /// Per-disease undiagnosed ratios that take precedence over the
    /// configured ones for this country
    pub fn with_undiagnosed_ratios(mut self, ratios: BTreeMap<String, f64>) -> Result<Self> {
        for ratio in ratios.values() {
            check_ratio(*ratio)?;
        }
        self.undiagnosed_ratios = ratios;
        Ok(self)
    }

    pub(super) fn set_undiagnosed_ratios(&mut self, ratios: BTreeMap<String, f64>) {
        self.undiagnosed_ratios = ratios;
    }

    pub fn burden(&self, disease: &str) -> Option<&AnchorSeries> {
        self.burden.get(disease)
    }

    pub fn prevalence(&self, disease: &str) -> Option<&AnchorSeries> {
        self.prevalence.get(disease)
    }

    pub fn region(&self, name: &str) -> Option<&RegionPopulation> {
        self.regions.get(name)
    }

    pub fn reference(&self) -> &RegionPopulation {
        &self.reference
    }

    /// Country-specific undiagnosed ratio, if one was loaded
    pub fn undiagnosed_ratio(&self, disease: &str) -> Option<f64> {
        self.undiagnosed_ratios.get(disease).copied()
    }

    /// Diseases with both a burden and a prevalence series, sorted
    pub fn diseases(&self) -> impl Iterator<Item = &str> + '_ {
        self.burden
            .keys()
            .filter(|d| self.prevalence.contains_key(*d))
            .map(String::as_str)
    }

    /// Region names, sorted
    pub fn region_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.regions.keys().map(String::as_str)
    }
}

/// Tables for the home country (with regions) and any number of other
/// countries (whole-country scope only)
#[derive(Debug, Clone)]
pub struct DataTables {
    home_country: String,
    countries: BTreeMap<String, CountryTables>,
}

impl DataTables {
    /// Tables holding only the home country
    pub fn new(home_country: impl Into<String>, home: CountryTables) -> Self {
        let home_country = home_country.into();
        let mut countries = BTreeMap::new();
        countries.insert(home_country.clone(), home);
        Self { home_country, countries }
    }

    /// Add another country; its name must not be taken
    pub fn with_country(mut self, name: impl Into<String>, tables: CountryTables) -> Result<Self> {
        let name = name.into();
        if self.countries.contains_key(&name) {
            return Err(ProjectionError::invalid_input(format!("duplicate country '{}'", name)));
        }
        self.countries.insert(name, tables);
        Ok(self)
    }

    pub(super) fn insert_country(&mut self, name: impl Into<String>, tables: CountryTables) {
        self.countries.insert(name.into(), tables);
    }

    /// Build tables from loaded CSV rows
    ///
    /// Home-country region baselines come from the configured at-risk
    /// share, growth rate and reference year. Other countries carry their
    /// at-risk population directly.
    pub fn from_loaded(loaded: LoadedTables, config: &ModelConfig) -> Result<Self> {
        let regions: BTreeMap<String, RegionPopulation> = loaded
            .region_totals
            .into_iter()
            .map(|(name, total)| {
                let pop = RegionPopulation::new(
                    total * config.population_share,
                    config.reference_year,
                    config.growth_rate,
                );
                (name, pop)
            })
            .collect();

        let reference_base = config
            .reference_population
            .unwrap_or_else(|| regions.values().map(|p| p.base_population).sum());
        let reference = RegionPopulation::new(reference_base, config.reference_year, config.growth_rate);

        let home = CountryTables::new(loaded.burden, loaded.prevalence, regions, reference)?;
        let mut tables = Self::new(config.home_country.as_str(), home);

        for (name, country) in loaded.countries {
            let built = country_from_loaded(country, config)?;
            tables = tables.with_country(name, built)?;
        }

        let home = tables.home();
        info!(
            "Loaded tables: {} burden series, {} prevalence series, {} regions, reference population {:.0}, {} countries",
            home.burden.len(),
            home.prevalence.len(),
            home.regions.len(),
            reference_base,
            tables.countries.len()
        );
        Ok(tables)
    }

    pub fn home_country(&self) -> &str {
        &self.home_country
    }

    pub fn home(&self) -> &CountryTables {
        // The home entry is inserted on construction and never removed
        &self.countries[&self.home_country]
    }

    pub fn country(&self, name: &str) -> Option<&CountryTables> {
        self.countries.get(name)
    }

    /// Country names, sorted
    pub fn country_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.countries.keys().map(String::as_str)
    }
}

fn country_from_loaded(country: LoadedCountry, config: &ModelConfig) -> Result<CountryTables> {
    let reference = RegionPopulation::new(country.population, config.reference_year, config.growth_rate);
    CountryTables::new(country.burden, country.prevalence, BTreeMap::new(), reference)?
        .with_undiagnosed_ratios(country.undiagnosed_ratios)
}
