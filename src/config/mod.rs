pub mod credentials;
pub mod toml_config;

pub use credentials::Credentials;
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "pr-travel-guide")]
#[command(about = "The Hitchhiker's Guide to Puerto Rico: a travel-planning chat assistant")]
pub struct CliConfig {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Pinecone index holding the location knowledge base
    #[arg(long)]
    pub index_name: Option<String>,

    /// Number of candidates retrieved per search
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Upper bound for itinerary length in days
    #[arg(long)]
    pub max_days: Option<u32>,

    /// Model calls allowed per user turn
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Resume a conversation under this session id (UUID)
    #[arg(long)]
    pub session: Option<uuid::Uuid>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the file configuration (or defaults) and applies the flags on top.
    pub fn resolve(&self) -> crate::utils::error::Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(index_name) = &self.index_name {
            config.pinecone.index_name = index_name.clone();
        }
        if let Some(top_k) = self.top_k {
            config.pinecone.top_k = top_k;
        }
        if let Some(max_days) = self.max_days {
            config.itinerary.max_days = max_days;
        }
        if let Some(max_steps) = self.max_steps {
            config.agent.max_steps = max_steps;
        }

        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = CliConfig::parse_from([
            "pr-travel-guide",
            "--index-name",
            "pr-dev",
            "--top-k",
            "7",
            "--max-steps",
            "2",
        ]);

        let config = cli.resolve().unwrap();

        assert_eq!(config.pinecone.index_name, "pr-dev");
        assert_eq!(config.pinecone.top_k, 7);
        assert_eq!(config.agent.max_steps, 2);
        assert_eq!(config.itinerary.max_days, 30);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = CliConfig::parse_from(["pr-travel-guide", "--config", "/nonexistent/guide.toml"]);
        assert!(cli.resolve().is_err());
    }
}
