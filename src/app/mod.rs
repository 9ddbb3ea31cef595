pub mod assistant;

pub use assistant::{build_agent, start_agent, TravelAssistant};
