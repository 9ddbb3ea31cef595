pub mod agent;
pub mod itinerary;
pub mod location_info;
pub mod ranking;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{Itinerary, LocationCandidate, RankedLocation, ScoredLocation};
pub use crate::domain::ports::{ChatModel, Embedder, LocationIndex};
pub use crate::utils::error::Result;
