//! Quadratic-weighted interpolation between two anchor observations,
//! followed by constant-increment extrapolation out to a horizon year.
//!
//! Interior years approach the second anchor at an accelerating pace: year
//! `k` after the first anchor has covered the cumulative share
//! `Σ_{i<k} w_i` of the anchor-to-anchor delta, with `w_i ∝ (i+1)^2`.
//! Beyond the second anchor the size of the last weighted step is repeated
//! once per year.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Longest series, in years, that [`extend`] will materialize
pub const MAX_SERIES_YEARS: i64 = 10_000;

/// Two known (year, value) observations for one disease metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSeries {
    pub year_start: i32,
    pub value_start: f64,
    pub year_end: i32,
    pub value_end: f64,
}

impl AnchorSeries {
    /// Create an anchor pair, rejecting non-increasing years
    pub fn new(year_start: i32, value_start: f64, year_end: i32, value_end: f64) -> Result<Self> {
        let anchors = Self { year_start, value_start, year_end, value_end };
        anchors.check_years()?;
        Ok(anchors)
    }

    /// Number of strictly intermediate years between the anchors
    pub fn intermediate_years(&self) -> usize {
        (i64::from(self.year_end) - i64::from(self.year_start) - 1).max(0) as usize
    }

    /// Total change from the first anchor to the second
    pub fn delta(&self) -> f64 {
        self.value_end - self.value_start
    }

    fn check_years(&self) -> Result<()> {
        if self.year_end <= self.year_start {
            return Err(ProjectionError::invalid_range(format!(
                "anchor years must increase, got {} then {}",
                self.year_start, self.year_end
            )));
        }
        Ok(())
    }
}

/// Contiguous yearly series starting at `start_year`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedSeries {
    start_year: i32,
    values: Vec<f64>,
}

impl ExtendedSeries {
    /// Build a series from a start year and one value per consecutive year
    pub fn from_values(start_year: i32, values: Vec<f64>) -> Self {
        Self { start_year, values }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Last covered year (inclusive)
    pub fn end_year(&self) -> i32 {
        self.start_year + self.values.len() as i32 - 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for a year, if the series covers it
    pub fn get(&self, year: i32) -> Option<f64> {
        if year < self.start_year {
            return None;
        }
        self.values.get((year - self.start_year) as usize).copied()
    }

    /// Value for a year, failing with `InvalidRange` when it is not covered
    pub fn value_at(&self, year: i32) -> Result<f64> {
        self.get(year).ok_or_else(|| {
            ProjectionError::invalid_range(format!(
                "year {} outside series {}..={}",
                year,
                self.start_year,
                self.end_year()
            ))
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(year, value)` pairs in ascending year order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.start_year + i as i32, v))
    }

    /// Element-wise sum over the span every series covers
    pub fn sum<'a, I>(series: I) -> Result<ExtendedSeries>
    where
        I: IntoIterator<Item = &'a ExtendedSeries>,
    {
        let series: Vec<&ExtendedSeries> = series.into_iter().collect();
        let start = series.iter().map(|s| s.start_year).max();
        let end = series.iter().map(|s| s.end_year()).min();

        let (start, end) = match (start, end) {
            (Some(start), Some(end)) if start <= end => (start, end),
            _ => return Err(ProjectionError::invalid_range("series have no common span")),
        };

        let values: Vec<f64> = (start..=end)
            .map(|year| series.iter().filter_map(|s| s.get(year)).sum::<f64>())
            .collect();

        Ok(ExtendedSeries::from_values(start, values))
    }
}

/// Quadratic weights `(i+1)^2` for `i = 0..=n`, normalized to sum to one
pub fn quadratic_weights(n: usize) -> Vec<f64> {
    let raw: Vec<f64> = (1..=n + 1).map(|i| (i * i) as f64).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Per-year increment applied beyond the second anchor: the last weighted
/// step `w_n · delta`. With adjacent anchor years this is the whole delta.
pub fn final_increment(anchors: &AnchorSeries) -> f64 {
    // w_n = (n+1)^2 / Σ_{i=1}^{n+1} i^2 = 6(n+1) / ((n+2)(2n+3))
    let n = anchors.intermediate_years() as f64;
    6.0 * (n + 1.0) / ((n + 2.0) * (2.0 * n + 3.0)) * anchors.delta()
}

/// Extend an anchor pair into a yearly series covering
/// `year_start..=horizon_year`
pub fn extend(anchors: &AnchorSeries, horizon_year: i32) -> Result<ExtendedSeries> {
    anchors.check_years()?;
    if horizon_year < anchors.year_end {
        return Err(ProjectionError::invalid_range(format!(
            "horizon {} precedes anchor end {}",
            horizon_year, anchors.year_end
        )));
    }
    let span = i64::from(horizon_year) - i64::from(anchors.year_start) + 1;
    if span > MAX_SERIES_YEARS {
        return Err(ProjectionError::invalid_range(format!(
            "series {}..={} spans {} years, more than {}",
            anchors.year_start, horizon_year, span, MAX_SERIES_YEARS
        )));
    }

    let n = anchors.intermediate_years();
    let weights = quadratic_weights(n);
    let delta = anchors.delta();
    let extrapolated_years = (horizon_year - anchors.year_end) as usize;

    let mut values = Vec::with_capacity(n + 2 + extrapolated_years);
    values.push(anchors.value_start);

    let mut cumulative = 0.0;
    for w in &weights[..n] {
        cumulative += w;
        values.push(anchors.value_start + delta * cumulative);
    }

    // Endpoint is pinned, not recomputed from the weights
    values.push(anchors.value_end);

    let increment = weights[n] * delta;
    if n == 0 && extrapolated_years > 0 {
        debug!(
            "adjacent anchors {}/{}: extrapolating the full delta {} per year",
            anchors.year_start, anchors.year_end, increment
        );
    }
    for j in 1..=extrapolated_years {
        values.push(anchors.value_end + j as f64 * increment);
    }

    debug!(
        "extended {}..={} to {} ({} interior, {} extrapolated)",
        anchors.year_start, anchors.year_end, horizon_year, n, extrapolated_years
    );

    Ok(ExtendedSeries::from_values(anchors.year_start, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn anchors(y0: i32, v0: f64, y1: i32, v1: f64) -> AnchorSeries {
        AnchorSeries::new(y0, v0, y1, v1).unwrap()
    }

    #[test]
    fn test_weights_sum_to_one() {
        for n in [0, 1, 2, 5, 9, 30] {
            let weights = quadratic_weights(n);
            assert_eq!(weights.len(), n + 1);
            assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert!(weights.windows(2).all(|w| w[1] > w[0]));
        }
    }

    #[test]
    fn test_endpoints_exact() {
        for (y0, v0, y1, v1) in [
            (2014, 100.0, 2024, 200.0),
            (2019, 0.123, 2021, 0.101),
            (2000, 7.0, 2001, 3.5),
            (1990, 1.0e9, 2020, 2.7e9),
        ] {
            let series = extend(&anchors(y0, v0, y1, v1), y1 + 5).unwrap();
            assert_eq!(series.get(y0), Some(v0));
            assert_eq!(series.get(y1), Some(v1));
        }
    }

    #[test]
    fn test_adjacent_anchors_extrapolate_full_delta() {
        let series = extend(&anchors(2023, 100.0, 2024, 110.0), 2026).unwrap();

        let pairs: Vec<(i32, f64)> = series.iter().collect();
        assert_eq!(
            pairs,
            vec![(2023, 100.0), (2024, 110.0), (2025, 120.0), (2026, 130.0)]
        );
        assert_relative_eq!(final_increment(&anchors(2023, 100.0, 2024, 110.0)), 10.0);
    }

    #[test]
    fn test_decade_interpolation() {
        let a = anchors(2014, 100.0, 2024, 200.0);
        let series = extend(&a, 2024).unwrap();

        // 9 interior years, 10 weights over Σ j^2 for j = 1..=10
        let weights = quadratic_weights(9);
        assert_relative_eq!(weights[0], 1.0 / 385.0, epsilon = 1e-15);

        assert_eq!(series.len(), 11);
        assert_eq!(series.get(2024), Some(200.0));
        assert_relative_eq!(series.get(2015).unwrap(), 100.0 + 100.0 * weights[0], epsilon = 1e-12);
        assert_relative_eq!(
            series.get(2023).unwrap(),
            100.0 + 100.0 * weights[..9].iter().sum::<f64>(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_extrapolation_uses_last_weighted_step() {
        let a = anchors(2014, 100.0, 2024, 200.0);
        let series = extend(&a, 2027).unwrap();

        let step = 100.0 * 100.0 / 385.0;
        assert_relative_eq!(final_increment(&a), step, epsilon = 1e-12);
        assert_relative_eq!(series.get(2025).unwrap(), 200.0 + step, epsilon = 1e-12);
        assert_relative_eq!(series.get(2027).unwrap(), 200.0 + 3.0 * step, epsilon = 1e-12);
        assert_eq!(series.end_year(), 2027);
    }

    #[test]
    fn test_interpolation_monotonic_when_increasing() {
        let series = extend(&anchors(2000, 5.0, 2017, 9.0), 2030).unwrap();
        assert!(series.values().windows(2).all(|w| w[1] >= w[0]));

        // Steps accelerate towards the second anchor
        let steps: Vec<f64> = series.values()[..18].windows(2).map(|w| w[1] - w[0]).collect();
        assert!(steps[1] > steps[0]);
    }

    #[test]
    fn test_decreasing_anchors_extrapolate_downwards() {
        let series = extend(&anchors(2020, 10.0, 2022, 4.0), 2024).unwrap();
        assert!(series.values().windows(2).all(|w| w[1] <= w[0]));
        assert!(series.get(2024).unwrap() < 4.0);
    }

    #[test]
    fn test_horizon_before_anchor_end_rejected() {
        let err = extend(&anchors(2014, 1.0, 2024, 2.0), 2023).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidRange { .. }));
    }

    #[test]
    fn test_non_increasing_anchor_years_rejected() {
        assert!(matches!(
            AnchorSeries::new(2024, 1.0, 2024, 2.0),
            Err(ProjectionError::InvalidRange { .. })
        ));

        // Constructed without validation, still caught by extend
        let raw = AnchorSeries { year_start: 2024, value_start: 1.0, year_end: 2020, value_end: 2.0 };
        assert!(matches!(extend(&raw, 2030), Err(ProjectionError::InvalidRange { .. })));
    }

    #[test]
    fn test_oversized_horizon_rejected_without_allocating() {
        let a = anchors(2014, 1.0, 2024, 2.0);
        let err = extend(&a, i32::MAX).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidRange { .. }));
        assert!(extend(&a, 2014 + MAX_SERIES_YEARS as i32 - 1).is_ok());

        // Closed-form increment needs no weight vector
        let wide = AnchorSeries::new(i32::MIN, 0.0, i32::MAX, 1.0).unwrap();
        assert!(final_increment(&wide) > 0.0);
        assert!(extend(&wide, i32::MAX).is_err());
    }

    #[test]
    fn test_value_at_outside_series() {
        let series = extend(&anchors(2014, 1.0, 2024, 2.0), 2030).unwrap();
        assert!(series.value_at(2013).is_err());
        assert!(series.value_at(2031).is_err());
        assert!(series.value_at(2030).is_ok());
    }

    #[test]
    fn test_sum_over_common_span() {
        let a = ExtendedSeries::from_values(2020, vec![1.0, 2.0, 3.0, 4.0]);
        let b = ExtendedSeries::from_values(2021, vec![10.0, 20.0, 30.0, 40.0]);

        let total = ExtendedSeries::sum([&a, &b]).unwrap();
        assert_eq!(total.start_year(), 2021);
        assert_eq!(total.end_year(), 2023);
        assert_eq!(total.values(), &[12.0, 23.0, 34.0]);

        let disjoint = ExtendedSeries::from_values(2030, vec![1.0]);
        assert!(ExtendedSeries::sum([&a, &disjoint]).is_err());
        assert!(ExtendedSeries::sum(std::iter::empty::<&ExtendedSeries>()).is_err());
    }
}
