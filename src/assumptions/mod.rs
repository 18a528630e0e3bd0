//! Model configuration and lookup tables

mod config;
mod tables;
pub mod loader;

pub use config::ModelConfig;
pub use tables::{CountryTables, DataTables};
pub use loader::{LoadedCountry, LoadedTables};

use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

use crate::population::RegionPopulation;
use crate::series::AnchorSeries;

/// Container for configuration plus the tables it applies to
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub config: ModelConfig,
    pub tables: DataTables,
}

impl Assumptions {
    /// Small in-memory data set matching the files shipped in data/
    pub fn sample() -> Self {
        let config = ModelConfig { population_share: 0.35, ..ModelConfig::default() };

        let burden = anchor_table(&[
            ("Diabetes", 2014, 1.2e9, 2024, 2.6e9),
            ("Hypertension", 2014, 2.1e9, 2024, 3.9e9),
            ("Stroke", 2023, 0.95e9, 2024, 1.1e9),
        ]);
        let prevalence = anchor_table(&[
            ("Diabetes", 2014, 6.9, 2024, 11.7),
            ("Hypertension", 2014, 25.8, 2024, 30.8),
            ("Stroke", 2014, 1.2, 2024, 1.6),
        ]);

        let regions: BTreeMap<String, RegionPopulation> = [
            ("Bali", 4_362_000.0),
            ("Jakarta", 10_679_951.0),
            ("Papua", 4_303_707.0),
            ("West Java", 49_935_858.0),
        ]
        .into_iter()
        .map(|(name, total)| {
            let pop = RegionPopulation::new(total * config.population_share, config.reference_year, config.growth_rate);
            (name.to_string(), pop)
        })
        .collect();

        let reference_base: f64 = regions.values().map(|p| p.base_population).sum();
        let reference = RegionPopulation::new(reference_base, config.reference_year, config.growth_rate);
        let mut tables = DataTables::new(
            config.home_country.as_str(),
            CountryTables::from_parts(burden, prevalence, regions, reference),
        );

        let world = [
            ("Malaysia", 12_500_000.0, [
                ("Diabetes", 4.0e8, 5.2e8, 16.0, 18.3, 0.49),
                ("Hypertension", 3.1e8, 3.9e8, 30.0, 29.2, 0.38),
            ]),
            ("Thailand", 34_000_000.0, [
                ("Diabetes", 6.1e8, 7.0e8, 9.1, 9.7, 0.35),
                ("Hypertension", 5.4e8, 6.6e8, 24.7, 25.1, 0.45),
            ]),
        ];
        for (country, population, rows) in world {
            let burden = anchor_table(&rows.map(|(d, b0, b1, _, _, _)| (d, 2019, b0, 2024, b1)));
            let prevalence = anchor_table(&rows.map(|(d, _, _, p0, p1, _)| (d, 2019, p0, 2024, p1)));
            let ratios: BTreeMap<String, f64> = rows.iter().map(|r| (r.0.to_string(), r.5)).collect();
            let reference = RegionPopulation::new(population, config.reference_year, config.growth_rate);

            let mut built = CountryTables::from_parts(burden, prevalence, BTreeMap::new(), reference);
            built.set_undiagnosed_ratios(ratios);
            tables.insert_country(country, built);
        }

        Self { config, tables }
    }

    /// Load configuration and tables from the default location (data/)
    pub fn from_csv() -> Result<Self, Box<dyn Error>> {
        Self::from_csv_path(Path::new(loader::DEFAULT_DATA_PATH))
    }

    /// Load `parameters.json` and the CSV tables from a directory
    pub fn from_csv_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let config = ModelConfig::from_json_path(&path.join(loader::CONFIG_FILE))?;
        Self::from_csv_path_with_config(path, config)
    }

    /// Load the CSV tables from a directory, using an explicit configuration
    pub fn from_csv_path_with_config(path: &Path, config: ModelConfig) -> Result<Self, Box<dyn Error>> {
        let loaded = LoadedTables::load_from(path)?;
        let tables = DataTables::from_loaded(loaded, &config)?;
        Ok(Self { config, tables })
    }
}

fn anchor_table(rows: &[(&str, i32, f64, i32, f64)]) -> BTreeMap<String, AnchorSeries> {
    rows.iter()
        .map(|&(disease, y0, v0, y1, v1)| {
            let anchors = AnchorSeries { year_start: y0, value_start: v0, year_end: y1, value_end: v1 };
            (disease.to_string(), anchors)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_matches_shipped_data() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(loader::DEFAULT_DATA_PATH);
        let loaded = Assumptions::from_csv_path(&path).expect("sample data should load");
        let sample = Assumptions::sample();

        assert_eq!(loaded.config, sample.config);
        assert_eq!(
            loaded.tables.country_names().collect::<Vec<_>>(),
            sample.tables.country_names().collect::<Vec<_>>()
        );

        for country in sample.tables.country_names() {
            let (got, want) = (loaded.tables.country(country).unwrap(), sample.tables.country(country).unwrap());
            for disease in want.diseases() {
                assert_eq!(got.burden(disease), want.burden(disease));
                assert_eq!(got.prevalence(disease), want.prevalence(disease));
                assert_eq!(got.undiagnosed_ratio(disease), want.undiagnosed_ratio(disease));
            }
            assert_eq!(got.region_names().collect::<Vec<_>>(), want.region_names().collect::<Vec<_>>());
            assert!((got.reference().base_population - want.reference().base_population).abs() < 1e-6);
        }
    }
}
