//! Run one disease and year across every region of a country, or across
//! every country
//!
//! Writes one CSV row per region (whole country first) or per country and
//! prints the all-disease burden series for the whole country.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use ncd_burden::assumptions::loader::DEFAULT_DATA_PATH;
use ncd_burden::ScenarioRunner;

#[derive(Parser)]
#[command(name = "run_regions")]
#[command(about = "Project one disease for every region and write a CSV", long_about = None)]
struct Args {
    /// Directory containing parameters.json and the CSV tables
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data_dir: PathBuf,

    /// Country whose regions to run; omit for the home country
    #[arg(long)]
    country: Option<String>,

    /// Compare every country at whole-country scope instead of regions
    #[arg(long)]
    all_countries: bool,

    #[arg(short, long)]
    disease: String,

    #[arg(short, long)]
    year: i32,

    #[arg(long, default_value_t = 0)]
    clinics: u32,

    #[arg(long, default_value_t = 0)]
    providers: u32,

    #[arg(long, default_value_t = 0.0)]
    capacity_pct: f64,

    /// Output CSV path
    #[arg(short, long, default_value = "region_projection_output.csv")]
    output: PathBuf,
}

const HEADER: [&str; 12] = [
    "Scope",
    "Population",
    "Susceptible",
    "Diagnosed",
    "Undiagnosed",
    "EconomicBurden",
    "BurdenPerCapita",
    "InterventionCapacity",
    "PctUndiagBefore",
    "PctUndiagAfter",
    "EconomicBurdenAfter",
    "EconomicBurdenDelta",
];

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading data from {}...", args.data_dir.display());
    let runner = ScenarioRunner::from_csv_path(&args.data_dir)
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("loading data from {}", args.data_dir.display()))?;
    println!("Loaded in {:?}", start.elapsed());

    println!("Running projections...");
    let proj_start = Instant::now();
    let country = args
        .country
        .clone()
        .unwrap_or_else(|| runner.assumptions().tables.home_country().to_string());
    let results = if args.all_countries {
        runner.run_all_countries(&args.disease, args.year, args.clinics, args.providers, args.capacity_pct)
    } else {
        runner.run_all_regions(&country, &args.disease, args.year, args.clinics, args.providers, args.capacity_pct)
    };
    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(HEADER)?;

    let mut failed = 0;
    for (scope, result) in &results {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                eprintln!("  {}: {}", scope, e);
                failed += 1;
                continue;
            }
        };
        writer.write_record([
            scope.clone(),
            record.population.to_string(),
            record.susceptible_population.to_string(),
            record.susceptible_diagnosed.to_string(),
            record.susceptible_undiagnosed.to_string(),
            record.economic_burden.to_string(),
            record.economic_burden_per_capita.to_string(),
            record.intervention_capacity.to_string(),
            format!("{:.2}", record.pct_undiag_before),
            format!("{:.2}", record.pct_undiag_after),
            record.economic_burden_after.to_string(),
            record.economic_burden_delta.to_string(),
        ])?;
    }
    writer.flush()?;
    println!("Output written to {} ({} rows, {} failed)", args.output.display(), results.len(), failed);

    let horizon = runner.engine().horizon_for(args.year);
    let total = runner.aggregate_burden_series(&country, horizon)?;
    println!("\nAll-disease burden, {}:", country);
    for (year, value) in total.iter() {
        println!("  {}: {:>20.0}", year, value);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
