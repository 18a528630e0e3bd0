//! Proportional allocation of a reference-scope burden to a sub-population

use crate::error::{ProjectionError, Result};

/// Share of `reference_burden` attributable to `sub_susceptible` out of
/// `reference_susceptible`
pub fn allocate(reference_burden: f64, sub_susceptible: f64, reference_susceptible: f64) -> Result<f64> {
    if reference_susceptible == 0.0 {
        return Err(ProjectionError::DivisionByZero {
            context: format!(
                "allocating burden {} with a zero reference susceptible population",
                reference_burden
            ),
        });
    }
    Ok(reference_burden * (sub_susceptible / reference_susceptible))
}
