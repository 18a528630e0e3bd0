//! Projection engine composing series, population, diagnosis and
//! intervention components per request

mod engine;
mod request;
mod result;

pub use engine::{ProjectionEngine, RegionScope};
pub use request::ProjectionRequest;
pub use result::{ProjectionBreakdown, ResultRecord};
