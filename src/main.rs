//! NCD burden CLI
//!
//! Projects undiagnosed burden for one disease, region and year and prints
//! the result record alongside the extended burden and prevalence series.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use clap::Parser;

use ncd_burden::assumptions::loader::DEFAULT_DATA_PATH;
use ncd_burden::{Assumptions, ModelConfig, ProjectionEngine, ProjectionRequest};

#[derive(Parser)]
#[command(name = "ncd_burden")]
#[command(about = "Project undiagnosed NCD burden and intervention impact", long_about = None)]
struct Cli {
    /// Directory containing parameters.json and the CSV tables
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data_dir: PathBuf,

    /// Configuration file (defaults to <data-dir>/parameters.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disease name, as in the anchor tables
    #[arg(short, long)]
    disease: String,

    /// Country name; omit for the home country
    #[arg(long)]
    country: Option<String>,

    /// Region name; omit for the whole country
    #[arg(short, long)]
    region: Option<String>,

    /// Year to project (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Clinics added by the intervention
    #[arg(long, default_value_t = 0)]
    clinics: u32,

    /// Medical providers per clinic
    #[arg(long, default_value_t = 0)]
    providers: u32,

    /// Share of provider capacity allocated to the disease (%)
    #[arg(long, default_value_t = 0.0)]
    capacity_pct: f64,

    /// Print the result record as JSON only
    #[arg(long)]
    json: bool,
}

fn load(cli: &Cli) -> Result<Assumptions> {
    let loaded = match &cli.config {
        Some(path) => ModelConfig::from_json_path(path)
            .and_then(|config| Assumptions::from_csv_path_with_config(&cli.data_dir, config)),
        None => Assumptions::from_csv_path(&cli.data_dir),
    };
    loaded
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("loading data from {}", cli.data_dir.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let assumptions = load(&cli)?;
    let engine = ProjectionEngine::from_assumptions(&assumptions);

    let region = cli
        .region
        .clone()
        .unwrap_or_else(|| assumptions.config.aggregate_region.clone());
    let year = cli.year.unwrap_or_else(|| chrono::Local::now().year());

    let country = cli
        .country
        .clone()
        .unwrap_or_else(|| assumptions.tables.home_country().to_string());

    let request = ProjectionRequest::new(cli.disease.as_str(), region.as_str(), year)
        .in_country(country.as_str())
        .with_intervention(cli.clinics, cli.providers, cli.capacity_pct);
    let record = engine
        .run(&request)
        .with_context(|| format!("projecting {} / {} / {} / {}", country, request.disease, request.region, year))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("NCD Burden Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("===========================\n");
    println!("Country: {}", country);
    println!("Disease: {}", request.disease);
    println!("Region:  {}", request.region);
    println!("Year:    {}", year);
    println!();

    println!("  Population (at risk):          {:>16}", record.population);
    println!("  Susceptible population:        {:>16}", record.susceptible_population);
    println!("    Diagnosed:                   {:>16}", record.susceptible_diagnosed);
    println!("    Undiagnosed:                 {:>16}", record.susceptible_undiagnosed);
    println!("  Economic burden (undiagnosed): {:>16}", record.economic_burden);
    println!("  Burden per undiagnosed capita: {:>16}", record.economic_burden_per_capita);
    println!();
    println!(
        "Intervention: {} clinics x {} providers at {}%",
        cli.clinics, cli.providers, cli.capacity_pct
    );
    println!("  Capacity (people/year):        {:>16}", record.intervention_capacity);
    println!("  Undiagnosed % before:          {:>16.2}", record.pct_undiag_before);
    println!("  Undiagnosed % after:           {:>16.2}", record.pct_undiag_after);
    println!("  Economic burden after:         {:>16}", record.economic_burden_after);
    println!("  Economic burden reduction:     {:>16}", record.economic_burden_delta);

    let horizon = engine.horizon_for(year);
    let (burden, prevalence) = engine.extend_for(&country, &request.disease, horizon)?;

    println!("\nExtended series (whole country):");
    println!("{:>6} {:>20} {:>14}", "Year", "Burden", "Prevalence %");
    println!("{}", "-".repeat(42));
    for (series_year, value) in burden.iter() {
        let prevalence_pct = prevalence
            .get(series_year)
            .map(|p| format!("{:.3}", p))
            .unwrap_or_default();
        println!("{:>6} {:>20.0} {:>14}", series_year, value, prevalence_pct);
    }

    if let Ok(slope) = prevalence.trend() {
        println!("\nAverage prevalence change: {:+.3} percentage points per year", slope);
    }

    Ok(())
}
