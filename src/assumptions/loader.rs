//! CSV-based table loader
//!
//! Loads anchor tables, region populations and the optional per-country
//! tables from CSV files in data/

use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::series::AnchorSeries;

/// Default path to the data directory
pub const DEFAULT_DATA_PATH: &str = "data";

pub const PREVALENCE_FILE: &str = "prevalence.csv";
pub const BURDEN_FILE: &str = "economic_burden.csv";
pub const REGIONS_FILE: &str = "regions.csv";
pub const CONFIG_FILE: &str = "parameters.json";

pub const WORLD_BURDEN_FILE: &str = "world_economic_burden.csv";
pub const WORLD_PREVALENCE_FILE: &str = "world_prevalence.csv";
pub const WORLD_POPULATION_FILE: &str = "world_population.csv";

/// Load an anchor table from CSV
///
/// Header is `Disease,<year>,<year>[,...]`. Each row's earliest and latest
/// non-empty year columns become its anchors.
pub fn load_anchor_table(path: &Path) -> Result<BTreeMap<String, AnchorSeries>, Box<dyn Error>> {
    let file = File::open(path)?;
    load_anchor_table_from_reader(file)
}

/// Load an anchor table from any reader
pub fn load_anchor_table_from_reader<R: Read>(reader: R) -> Result<BTreeMap<String, AnchorSeries>, Box<dyn Error>> {
    let mut table = BTreeMap::new();
    for (keys, anchors) in read_anchor_rows(reader, 1)? {
        let disease = keys[0].clone();
        if table.insert(disease.clone(), anchors).is_some() {
            return Err(format!("Duplicate disease '{}'", disease).into());
        }
    }
    Ok(table)
}

/// Load a per-country anchor table from CSV
///
/// Header is `Country,Disease,<year>,<year>[,...]`; anchors are picked as in
/// [`load_anchor_table`].
pub fn load_country_anchor_table(path: &Path) -> Result<BTreeMap<String, BTreeMap<String, AnchorSeries>>, Box<dyn Error>> {
    let file = File::open(path)?;
    load_country_anchor_table_from_reader(file)
}

pub fn load_country_anchor_table_from_reader<R: Read>(
    reader: R,
) -> Result<BTreeMap<String, BTreeMap<String, AnchorSeries>>, Box<dyn Error>> {
    let mut table: BTreeMap<String, BTreeMap<String, AnchorSeries>> = BTreeMap::new();
    for (keys, anchors) in read_anchor_rows(reader, 2)? {
        let (country, disease) = (keys[0].clone(), keys[1].clone());
        if table.entry(country.clone()).or_default().insert(disease.clone(), anchors).is_some() {
            return Err(format!("Duplicate disease '{}' for country '{}'", disease, country).into());
        }
    }
    Ok(table)
}

/// Rows of an anchor table: the leading `key_columns` cells, then the
/// anchors taken from the year columns
fn read_anchor_rows<R: Read>(reader: R, key_columns: usize) -> Result<Vec<(Vec<String>, AnchorSeries)>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_reader(reader);

    let years: Vec<i32> = reader
        .headers()?
        .iter()
        .skip(key_columns)
        .map(|h| h.trim().parse::<i32>().map_err(|_| format!("Year column expected, got '{}'", h)))
        .collect::<Result<_, _>>()?;

    if years.len() < 2 {
        return Err(format!("Anchor table needs at least two year columns, got {}", years.len()).into());
    }

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let keys: Vec<String> = record.iter().take(key_columns).map(|k| k.trim().to_string()).collect();
        let label = keys.join(" / ");

        let mut observed: Vec<(i32, f64)> = Vec::new();
        for (year, cell) in years.iter().zip(record.iter().skip(key_columns)) {
            let cell = cell.trim();
            if !cell.is_empty() {
                observed.push((*year, cell.parse()?));
            }
        }
        observed.sort_by_key(|&(year, _)| year);

        let (first, last) = match (observed.first(), observed.last()) {
            (Some(first), Some(last)) if observed.len() >= 2 => (*first, *last),
            _ => return Err(format!("'{}' needs values in at least two years", label).into()),
        };

        rows.push((keys, AnchorSeries::new(first.0, first.1, last.0, last.1)?));
    }

    Ok(rows)
}

/// Raw CSV row of regions.csv
#[derive(Debug, Deserialize)]
struct RegionRow {
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Population")]
    population: f64,
}

/// Load total region populations from CSV
pub fn load_region_totals(path: &Path) -> Result<BTreeMap<String, f64>, Box<dyn Error>> {
    let file = File::open(path)?;
    load_region_totals_from_reader(file)
}

/// Load total region populations from any reader
pub fn load_region_totals_from_reader<R: Read>(reader: R) -> Result<BTreeMap<String, f64>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut totals = BTreeMap::new();

    for result in csv_reader.deserialize() {
        let row: RegionRow = result?;
        let name = row.region.trim().to_string();
        if totals.insert(name.clone(), row.population).is_some() {
            return Err(format!("Duplicate region '{}'", name).into());
        }
    }

    Ok(totals)
}

/// Raw CSV row of the per-country population file
#[derive(Debug, Deserialize)]
struct CountryRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Disease")]
    disease: String,
    #[serde(rename = "Population 40+")]
    population: f64,
    #[serde(rename = "% Undiagnosed Susceptible Population 40+")]
    undiagnosed_ratio: f64,
}

/// Raw tables of one country outside the home country
#[derive(Debug, Clone, Default)]
pub struct LoadedCountry {
    pub burden: BTreeMap<String, AnchorSeries>,
    pub prevalence: BTreeMap<String, AnchorSeries>,
    /// At-risk (40+) population in the reference year
    pub population: f64,
    pub undiagnosed_ratios: BTreeMap<String, f64>,
}

/// Load per-country tables from readers over the three world files
///
/// Every country named in an anchor table needs population rows, and all
/// rows of one country must agree on its population.
pub fn load_countries_from_readers<B: Read, P: Read, C: Read>(
    burden: B,
    prevalence: P,
    population: C,
) -> Result<BTreeMap<String, LoadedCountry>, Box<dyn Error>> {
    let mut countries: BTreeMap<String, LoadedCountry> = BTreeMap::new();

    let mut csv_reader = csv::Reader::from_reader(population);
    for result in csv_reader.deserialize() {
        let row: CountryRow = result?;
        let name = row.country.trim().to_string();
        let disease = row.disease.trim().to_string();

        let country = countries.entry(name.clone()).or_insert_with(|| LoadedCountry {
            population: row.population,
            ..LoadedCountry::default()
        });
        if country.population != row.population {
            return Err(format!(
                "Country '{}' has conflicting populations {} and {}",
                name, country.population, row.population
            )
            .into());
        }
        if country.undiagnosed_ratios.insert(disease.clone(), row.undiagnosed_ratio).is_some() {
            return Err(format!("Duplicate disease '{}' for country '{}'", disease, name).into());
        }
    }

    for (metric, table) in [
        ("burden", load_country_anchor_table_from_reader(burden)?),
        ("prevalence", load_country_anchor_table_from_reader(prevalence)?),
    ] {
        for (name, anchors) in table {
            let country = countries
                .get_mut(&name)
                .ok_or_else(|| format!("Country '{}' has {} anchors but no population rows", name, metric))?;
            match metric {
                "burden" => country.burden = anchors,
                _ => country.prevalence = anchors,
            }
        }
    }

    Ok(countries)
}

/// Load per-country tables from a directory, if it ships the world files
pub fn load_countries(path: &Path) -> Result<BTreeMap<String, LoadedCountry>, Box<dyn Error>> {
    let population_path = path.join(WORLD_POPULATION_FILE);
    if !population_path.exists() {
        return Ok(BTreeMap::new());
    }
    load_countries_from_readers(
        File::open(path.join(WORLD_BURDEN_FILE))?,
        File::open(path.join(WORLD_PREVALENCE_FILE))?,
        File::open(population_path)?,
    )
}

/// Raw tables as read from disk
#[derive(Debug, Clone, Default)]
pub struct LoadedTables {
    pub burden: BTreeMap<String, AnchorSeries>,
    pub prevalence: BTreeMap<String, AnchorSeries>,
    pub region_totals: BTreeMap<String, f64>,
    /// Countries other than the home country
    pub countries: BTreeMap<String, LoadedCountry>,
}

impl LoadedTables {
    /// Load all tables from the default path
    pub fn load_default() -> Result<Self, Box<dyn Error>> {
        Self::load_from(Path::new(DEFAULT_DATA_PATH))
    }

    /// Load all tables from a specific directory
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            burden: load_anchor_table(&path.join(BURDEN_FILE))?,
            prevalence: load_anchor_table(&path.join(PREVALENCE_FILE))?,
            region_totals: load_region_totals(&path.join(REGIONS_FILE))?,
            countries: load_countries(path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_table_uses_outer_years() {
        let csv = "Disease,2014,2019,2024\n\
                   Diabetes,6.9,8.5,11.7\n\
                   Stroke,,1.2,1.6\n";
        let table = load_anchor_table_from_reader(csv.as_bytes()).unwrap();

        let diabetes = table["Diabetes"];
        assert_eq!((diabetes.year_start, diabetes.value_start), (2014, 6.9));
        assert_eq!((diabetes.year_end, diabetes.value_end), (2024, 11.7));

        let stroke = table["Stroke"];
        assert_eq!(stroke.year_start, 2019);
        assert_eq!(stroke.value_end, 1.6);
    }

    #[test]
    fn test_anchor_table_rejects_bad_input() {
        assert!(load_anchor_table_from_reader("Disease,2024\nDiabetes,1.0\n".as_bytes()).is_err());
        assert!(load_anchor_table_from_reader("Disease,Year,2024\nDiabetes,1.0,2.0\n".as_bytes()).is_err());
        assert!(load_anchor_table_from_reader("Disease,2014,2024\nDiabetes,,2.0\n".as_bytes()).is_err());
        assert!(load_anchor_table_from_reader("Disease,2014,2024\nDiabetes,1.0,2.0\nDiabetes,1.0,3.0\n".as_bytes()).is_err());
    }

    #[test]
    fn test_region_totals() {
        let csv = "Region,Population\nBali,4362000\nPapua,4303707\n";
        let totals = load_region_totals_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Bali"], 4_362_000.0);

        let dup = "Region,Population\nBali,1\nBali,2\n";
        assert!(load_region_totals_from_reader(dup.as_bytes()).is_err());
    }

    #[test]
    fn test_load_default_tables() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_DATA_PATH);
        let loaded = LoadedTables::load_from(&path).expect("sample data should load");
        assert!(loaded.burden.contains_key("Diabetes"));
        assert!(loaded.prevalence.contains_key("Hypertension"));
        assert!(!loaded.region_totals.is_empty());
        assert!(loaded.countries.contains_key("Malaysia"));
    }

    const WORLD_BURDEN: &str = "Country,Disease,2019,2024\n\
                                Malaysia,Diabetes,400000000,520000000\n\
                                Thailand,Diabetes,610000000,700000000\n";
    const WORLD_PREVALENCE: &str = "Country,Disease,2019,2024\n\
                                    Malaysia,Diabetes,16.0,18.3\n\
                                    Thailand,Diabetes,9.1,9.7\n";
    const WORLD_POPULATION: &str = "Country,Disease,Population 40+,% Undiagnosed Susceptible Population 40+\n\
                                    Malaysia,Diabetes,12500000,0.49\n\
                                    Malaysia,Hypertension,12500000,0.38\n\
                                    Thailand,Diabetes,34000000,0.35\n";

    #[test]
    fn test_country_tables() {
        let countries = load_countries_from_readers(
            WORLD_BURDEN.as_bytes(),
            WORLD_PREVALENCE.as_bytes(),
            WORLD_POPULATION.as_bytes(),
        )
        .unwrap();

        assert_eq!(countries.len(), 2);
        let malaysia = &countries["Malaysia"];
        assert_eq!(malaysia.population, 12_500_000.0);
        assert_eq!(malaysia.undiagnosed_ratios["Hypertension"], 0.38);
        assert_eq!(malaysia.burden["Diabetes"].value_end, 520_000_000.0);
        assert_eq!(malaysia.prevalence["Diabetes"].year_start, 2019);
        assert_eq!(countries["Thailand"].prevalence["Diabetes"].value_end, 9.7);
    }

    #[test]
    fn test_country_tables_reject_inconsistent_rows() {
        let conflicting = "Country,Disease,Population 40+,% Undiagnosed Susceptible Population 40+\n\
                           Malaysia,Diabetes,12500000,0.49\n\
                           Malaysia,Stroke,9000000,0.5\n";
        assert!(load_countries_from_readers(WORLD_BURDEN.as_bytes(), WORLD_PREVALENCE.as_bytes(), conflicting.as_bytes()).is_err());

        // Thailand has anchors but no population rows
        let missing = "Country,Disease,Population 40+,% Undiagnosed Susceptible Population 40+\n\
                       Malaysia,Diabetes,12500000,0.49\n";
        assert!(load_countries_from_readers(WORLD_BURDEN.as_bytes(), WORLD_PREVALENCE.as_bytes(), missing.as_bytes()).is_err());

        let dup = "Country,Disease,2019,2024\nMalaysia,Diabetes,1,2\nMalaysia,Diabetes,1,3\n";
        assert!(load_country_anchor_table_from_reader(dup.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_world_files_mean_no_countries() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
        assert!(load_countries(&dir).unwrap().is_empty());
    }
}
