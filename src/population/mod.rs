//! Population growth and burden allocation across region scopes

mod projector;
mod allocator;

pub use projector::{RegionPopulation, project};
pub use allocator::allocate;
