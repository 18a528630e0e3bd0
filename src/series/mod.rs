//! Yearly series built from two anchor observations

mod extender;
mod trend;

pub use extender::{AnchorSeries, ExtendedSeries, extend, final_increment, quadratic_weights, MAX_SERIES_YEARS};
pub use trend::linear_trend;
