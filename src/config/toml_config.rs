use crate::adapters::openai::{
    OpenAiSettings, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_URL,
};
use crate::adapters::pinecone::{PineconeSettings, DEFAULT_CONTROL_URL, DEFAULT_INDEX_NAME};
use crate::adapters::weather::DEFAULT_WEATHER_URL;
use crate::core::agent::DEFAULT_MAX_STEPS;
use crate::core::itinerary::DEFAULT_MAX_DAYS;
use crate::core::ranking::DEFAULT_TOP_K;
use crate::utils::error::{Result, TravelError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub openai: OpenAiConfig,
    pub pinecone: PineconeConfig,
    pub weather: WeatherConfig,
    pub agent: AgentConfig,
    pub itinerary: ItineraryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    pub control_url: String,
    pub index_name: String,
    pub namespace: Option<String>,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_steps: usize,
    /// Applies to every outbound request. Unset keeps the HTTP client default.
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryConfig {
    pub max_days: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: 0.0,
        }
    }
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            control_url: DEFAULT_CONTROL_URL.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            namespace: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            request_timeout_seconds: None,
        }
    }
}

impl Default for ItineraryConfig {
    fn default() -> Self {
        Self {
            max_days: DEFAULT_MAX_DAYS,
        }
    }
}

impl TomlConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TravelError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TravelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value (e.g. `${PINECONE_INDEX}`).
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TravelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.agent.request_timeout_seconds.map(Duration::from_secs)
    }

    pub fn openai_settings(&self) -> OpenAiSettings {
        OpenAiSettings {
            base_url: self.openai.base_url.clone(),
            chat_model: self.openai.chat_model.clone(),
            embedding_model: self.openai.embedding_model.clone(),
            temperature: self.openai.temperature,
            timeout: self.request_timeout(),
        }
    }

    pub fn pinecone_settings(&self) -> PineconeSettings {
        PineconeSettings {
            control_url: self.pinecone.control_url.clone(),
            index_name: self.pinecone.index_name.clone(),
            namespace: self.pinecone.namespace.clone(),
            timeout: self.request_timeout(),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("openai.base_url", &self.openai.base_url)?;
        validation::validate_url("pinecone.control_url", &self.pinecone.control_url)?;
        validation::validate_url("weather.base_url", &self.weather.base_url)?;
        validation::validate_non_empty_string("openai.chat_model", &self.openai.chat_model)?;
        validation::validate_non_empty_string(
            "openai.embedding_model",
            &self.openai.embedding_model,
        )?;
        validation::validate_non_empty_string("pinecone.index_name", &self.pinecone.index_name)?;
        validation::validate_range("openai.temperature", self.openai.temperature, 0.0, 2.0)?;
        validation::validate_positive_number("pinecone.top_k", self.pinecone.top_k, 1)?;
        validation::validate_positive_number("agent.max_steps", self.agent.max_steps, 1)?;
        validation::validate_positive_number(
            "itinerary.max_days",
            self.itinerary.max_days as usize,
            1,
        )?;
        if let Some(timeout) = self.agent.request_timeout_seconds {
            validation::validate_range("agent.request_timeout_seconds", timeout, 1, 600)?;
        }
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
