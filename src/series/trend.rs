//! Descriptive linear trend (least-squares slope) of a yearly series

use crate::error::{ProjectionError, Result};
use super::ExtendedSeries;

/// Ordinary least-squares slope of `value` against `year`, in value units
/// per year
pub fn linear_trend(points: &[(i32, f64)]) -> Result<f64> {
    if points.len() < 2 {
        return Err(ProjectionError::invalid_range(format!(
            "trend needs at least two points, got {}",
            points.len()
        )));
    }

    let count = points.len() as f64;
    let x_mean = points.iter().map(|&(x, _)| x as f64).sum::<f64>() / count;
    let y_mean = points.iter().map(|&(_, y)| y).sum::<f64>() / count;

    let (covariance, variance) = points.iter().fold((0.0, 0.0), |(cov, var), &(x, y)| {
        let dx = x as f64 - x_mean;
        (cov + dx * (y - y_mean), var + dx * dx)
    });

    if variance == 0.0 {
        return Err(ProjectionError::invalid_range("trend points share a single year"));
    }

    Ok(covariance / variance)
}

impl ExtendedSeries {
    /// Least-squares slope over the whole series
    pub fn trend(&self) -> Result<f64> {
        let points: Vec<(i32, f64)> = self.iter().collect();
        linear_trend(&points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_line() {
        let points = [(2019, 3.0), (2020, 5.0), (2024, 13.0)];
        assert_relative_eq!(linear_trend(&points).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_noisy_prevalence() {
        // 10%, 9%, 15% over 2019/2021/2024
        let points = [(2019, 0.10), (2021, 0.09), (2024, 0.15)];
        let slope = linear_trend(&points).unwrap();
        assert_relative_eq!(slope, 1.23 / 114.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(linear_trend(&[(2020, 1.0)]).is_err());
        assert!(linear_trend(&[(2020, 1.0), (2020, 2.0)]).is_err());
    }

    #[test]
    fn test_series_trend() {
        let series = ExtendedSeries::from_values(2030, vec![1.0, 1.5, 2.0, 2.5]);
        assert_relative_eq!(series.trend().unwrap(), 0.5, epsilon = 1e-12);
    }
}
