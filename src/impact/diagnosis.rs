//! Diagnosed/undiagnosed split of a susceptible population

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Susceptible population partitioned by diagnosis status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisSplit {
    pub diagnosed: f64,
    pub undiagnosed: f64,
}

/// Check that an undiagnosed ratio lies in [0, 1]
pub fn check_ratio(ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(ProjectionError::InvalidRatio { ratio });
    }
    Ok(())
}

/// Split `susceptible` by the disease's undiagnosed ratio
pub fn split(susceptible: f64, undiagnosed_ratio: f64) -> Result<DiagnosisSplit> {
    check_ratio(undiagnosed_ratio)?;
    Ok(DiagnosisSplit {
        diagnosed: susceptible * (1.0 - undiagnosed_ratio),
        undiagnosed: susceptible * undiagnosed_ratio,
    })
}

/// Burden per undiagnosed person; zero when nobody is undiagnosed
pub fn per_capita_burden(burden: f64, undiagnosed: f64) -> f64 {
    if undiagnosed > 0.0 {
        burden / undiagnosed
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_split_sums_to_susceptible() {
        let s = split(10_000.0, 0.63).unwrap();
        assert_relative_eq!(s.undiagnosed, 6_300.0, epsilon = 1e-9);
        assert_relative_eq!(s.diagnosed, 3_700.0, epsilon = 1e-9);
        assert_relative_eq!(s.diagnosed + s.undiagnosed, 10_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ratio_bounds() {
        assert!(split(1.0, 0.0).is_ok());
        assert!(split(1.0, 1.0).is_ok());
        assert_eq!(split(1.0, 1.01).unwrap_err(), ProjectionError::InvalidRatio { ratio: 1.01 });
        assert!(matches!(split(1.0, -0.1), Err(ProjectionError::InvalidRatio { .. })));
        assert!(split(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_zero_undiagnosed_guard() {
        assert_eq!(per_capita_burden(500.0, 0.0), 0.0);
        assert_relative_eq!(per_capita_burden(500.0, 4.0), 125.0);
    }
}
