use crate::adapters::{OpenAiClient, PineconeIndex, WeatherClient};
use crate::config::{Credentials, TomlConfig};
use crate::core::agent::AgentExecutor;
use crate::core::itinerary::ItineraryBuilder;
use crate::core::tools::{ToolRegistry, TravelServices};
use crate::domain::session::Session;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

/// Wires the hosted services into an agent. The index is connected exactly
/// once here; a missing index aborts startup.
pub async fn build_agent(config: &TomlConfig, credentials: Credentials) -> Result<AgentExecutor> {
    config.validate()?;

    let openai = Arc::new(OpenAiClient::new(
        credentials.openai_api_key,
        config.openai_settings(),
    )?);

    let index = PineconeIndex::connect(
        &config.pinecone_settings(),
        credentials.pinecone_api_key,
        openai.clone(),
    )
    .await?;
    tracing::info!("Vector index ready at {}", index.host());

    let weather = WeatherClient::new(
        &config.weather.base_url,
        credentials.openweather_api_key,
        config.request_timeout(),
    )?;

    let tools = ToolRegistry::travel(TravelServices {
        index: Arc::new(index),
        weather: Arc::new(weather),
        itinerary: ItineraryBuilder::new(config.pinecone.top_k, config.itinerary.max_days),
        top_k: config.pinecone.top_k,
    });
    tracing::info!("Registered {} tools", tools.len());

    Ok(AgentExecutor::new(openai, tools).with_max_steps(config.agent.max_steps))
}

/// Startup order for the binary: credentials are read through `lookup`
/// first, so a missing key stops startup before any request is sent.
pub async fn start_agent<F>(config: &TomlConfig, lookup: F) -> Result<AgentExecutor>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::from_lookup(lookup)?;
    build_agent(config, credentials).await
}

/// An agent bound to one traveller's session.
pub struct TravelAssistant {
    agent: AgentExecutor,
    session: Session,
}

impl TravelAssistant {
    pub fn new(agent: AgentExecutor, session: Session) -> Self {
        Self { agent, session }
    }

    pub async fn connect(config: &TomlConfig, credentials: Credentials) -> Result<Self> {
        let agent = build_agent(config, credentials).await?;
        Ok(Self::new(agent, Session::new()))
    }

    pub async fn start<F>(config: &TomlConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let agent = start_agent(config, lookup).await?;
        Ok(Self::new(agent, Session::new()))
    }

    pub async fn ask(&mut self, input: &str) -> Result<String> {
        self.agent.run_turn(&mut self.session, input).await
    }

    /// Same as `ask`, forwarding reply tokens to `token_tx` as they arrive.
    pub async fn ask_streaming(&mut self, input: &str, token_tx: Sender<String>) -> Result<String> {
        self.agent
            .run_turn_streaming(&mut self.session, input, token_tx)
            .await
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
