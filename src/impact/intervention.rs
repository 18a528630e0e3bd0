//! Capacity-constrained reduction of the undiagnosed population and its
//! economic burden

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Average number of capacity units one newly diagnosed patient consumes
pub const DEFAULT_CAPACITY_NORMALIZATION: f64 = 20.0;

/// Added screening/treatment capacity for one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionConfig {
    pub clinics: u32,
    /// Providers per clinic
    pub providers: u32,
    /// Share of provider capacity allocated to the disease, in percent
    pub capacity_pct: f64,
    pub yearly_capacity_per_provider: f64,
    pub normalization: f64,
}

impl InterventionConfig {
    /// Check the domain of every field
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.capacity_pct) {
            return Err(ProjectionError::invalid_input(format!(
                "capacity_pct {} outside [0, 100]",
                self.capacity_pct
            )));
        }
        if !(self.yearly_capacity_per_provider > 0.0) {
            return Err(ProjectionError::invalid_input(format!(
                "yearly_capacity_per_provider must be positive, got {}",
                self.yearly_capacity_per_provider
            )));
        }
        if !(self.normalization > 0.0) {
            return Err(ProjectionError::invalid_input(format!(
                "capacity normalization must be positive, got {}",
                self.normalization
            )));
        }
        Ok(())
    }

    /// People newly diagnosed per year
    pub fn capacity(&self) -> f64 {
        self.yearly_capacity_per_provider
            * self.clinics as f64
            * self.providers as f64
            * (self.capacity_pct / 100.0)
            / self.normalization
    }
}

/// Before/after metrics of an intervention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionImpact {
    pub capacity: f64,
    pub pct_before: f64,
    pub pct_after: f64,
    pub burden_after: f64,
    pub burden_delta: f64,
}

impl InterventionImpact {
    /// Change in undiagnosed percentage points (never positive)
    pub fn pct_point_change(&self) -> f64 {
        self.pct_after - self.pct_before
    }

    /// Relative change of the burden in percent; zero for a zero burden
    pub fn burden_change_pct(&self) -> f64 {
        let before = self.burden_after + self.burden_delta;
        if before == 0.0 {
            0.0
        } else {
            -self.burden_delta / before * 100.0
        }
    }
}

/// Apply an intervention against the undiagnosed population
pub fn apply(
    undiagnosed: f64,
    burden_before: f64,
    undiagnosed_ratio: f64,
    config: &InterventionConfig,
) -> InterventionImpact {
    apply_capacity(undiagnosed, burden_before, undiagnosed_ratio, config.capacity())
}

/// Same as [`apply`] with the yearly capacity already computed
pub fn apply_capacity(
    undiagnosed: f64,
    burden_before: f64,
    undiagnosed_ratio: f64,
    capacity: f64,
) -> InterventionImpact {
    let pct_before = undiagnosed_ratio * 100.0;

    // An empty undiagnosed pool zeroes both after-metrics rather than
    // leaving them unchanged
    let (pct_after, burden_after) = if undiagnosed > 0.0 {
        let remaining = 1.0 - capacity / undiagnosed;
        ((pct_before * remaining).max(0.0), (burden_before * remaining).max(0.0))
    } else {
        (0.0, 0.0)
    };

    InterventionImpact {
        capacity,
        pct_before,
        pct_after,
        burden_after,
        burden_delta: burden_before - burden_after,
    }
}
