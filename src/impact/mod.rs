//! Diagnosis split and intervention impact

mod diagnosis;
mod intervention;

pub use diagnosis::{DiagnosisSplit, check_ratio, per_capita_burden, split};
pub use intervention::{
    InterventionConfig, InterventionImpact, apply, apply_capacity, DEFAULT_CAPACITY_NORMALIZATION,
};
