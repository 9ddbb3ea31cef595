pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{build_agent, start_agent, TravelAssistant};
pub use config::{Credentials, TomlConfig};
pub use core::agent::AgentExecutor;
pub use domain::preferences::Preferences;
pub use domain::session::{Session, SessionStore};
pub use utils::error::{Result, TravelError};
