//! NCD burden - projection engine for undiagnosed non-communicable disease burden
//!
//! This library provides:
//! - Quadratic-weighted extension of two-point burden and prevalence series
//! - Linear population projection and proportional burden allocation
//! - Diagnosed/undiagnosed splitting and capacity-constrained intervention impact
//! - Per-country tables: a home country with regions plus whole-country
//!   tables for any number of other countries
//! - Per-request projection engine and a cached, parallel scenario runner

pub mod error;
pub mod series;
pub mod population;
pub mod impact;
pub mod assumptions;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{ProjectionError, Result};
pub use assumptions::{Assumptions, CountryTables, DataTables, ModelConfig};
pub use series::{AnchorSeries, ExtendedSeries};
pub use population::RegionPopulation;
pub use impact::{InterventionConfig, InterventionImpact};
pub use projection::{ProjectionEngine, ProjectionRequest, ProjectionBreakdown, ResultRecord};
pub use scenario::ScenarioRunner;
