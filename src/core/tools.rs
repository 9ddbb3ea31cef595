use crate::adapters::weather::WeatherClient;
use crate::core::itinerary::{ItineraryBuilder, DEFAULT_DAYS, INVALID_DAYS};
use crate::core::location_info::find_info_on_location;
use crate::core::ranking::{rank_locations, resolve_query};
use crate::core::LocationIndex;
use crate::domain::chat::ToolSpec;
use crate::domain::preferences::Preferences;
use crate::utils::error::{Result, TravelError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const ASK_TRAVEL_DATES: &str = "What are your travel dates? I’ll remember them for later.";
pub const ASK_INTERESTS: &str = "What are your travel interests? (e.g., hiking, history, beaches)";
pub const INDEX_UNAVAILABLE: &str = "Sorry, I couldn't search the location index right now.";
pub const NO_RANKED_LOCATIONS: &str = "I couldn't find any locations matching that request.";

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, preferences: &mut Preferences, input: Value) -> Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Tools in registration order; names are unique.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(Box::new(tool));
    }

    /// Registry with every travel-planning tool wired to `services`.
    pub fn travel(services: TravelServices) -> Self {
        let services = Arc::new(services);
        let mut registry = Self::default();
        registry.register(ItineraryPlannerTool(services.clone()));
        registry.register(WeatherForecastTool(services.clone()));
        registry.register(RankLocationsTool(services.clone()));
        registry.register(LocationInfoTool(services));
        registry.register(AskTravelDatesTool);
        registry.register(AskInterestsTool);
        registry.register(LockLocationTool);
        registry.register(SetTravelDatesTool);
        registry.register(SetInterestsTool);
        registry.register(UpdatePreferencesTool);
        registry
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub async fn execute(
        &self,
        name: &str,
        preferences: &mut Preferences,
        raw_arguments: &str,
    ) -> Result<String> {
        let tool = self.get(name).ok_or_else(|| TravelError::UnknownTool {
            name: name.to_string(),
        })?;

        let input = if raw_arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(raw_arguments).map_err(|e| TravelError::InvalidToolArguments {
                tool: name.to_string(),
                reason: e.to_string(),
            })?
        };

        tracing::info!("Running tool {}", name);
        tool.execute(preferences, input).await
    }

    /// Like `execute`, but every failure is turned into text the model can
    /// read and react to.
    pub async fn dispatch(
        &self,
        name: &str,
        preferences: &mut Preferences,
        raw_arguments: &str,
    ) -> String {
        match self.execute(name, preferences, raw_arguments).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                e.to_string()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Remote collaborators shared by the tools. Built once at startup.
pub struct TravelServices {
    pub index: Arc<dyn LocationIndex>,
    pub weather: Arc<WeatherClient>,
    pub itinerary: ItineraryBuilder,
    pub top_k: usize,
}

fn parse_args<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| TravelError::InvalidToolArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn index_unavailable(e: TravelError) -> String {
    tracing::warn!("Location index failed: {}", e);
    INDEX_UNAVAILABLE.to_string()
}

#[derive(Debug, Deserialize)]
struct LocationArgs {
    location: String,
}

#[derive(Debug, Default, Deserialize)]
struct ItineraryArgs {
    #[serde(default)]
    days: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RankArgs {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatesArgs {
    dates: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InterestList {
    Many(Vec<String>),
    One(String),
}

#[derive(Debug, Deserialize)]
struct InterestsArgs {
    interests: InterestList,
}

#[derive(Debug, Deserialize)]
struct PreferenceArgs {
    key: String,
    value: String,
}

/// Day count as the model sent it: a number, a numeric string or nothing.
/// `None` means the value cannot be a trip length.
fn parse_days(value: Option<&Value>) -> Option<u32> {
    match value {
        None | Some(Value::Null) => Some(DEFAULT_DAYS),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(d) => u32::try_from(d).ok(),
            None => n.as_f64().and_then(whole_days),
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse::<f64>().ok().and_then(whole_days))
        }
        Some(_) => None,
    }
}

fn whole_days(value: f64) -> Option<u32> {
    if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

struct ItineraryPlannerTool(Arc<TravelServices>);

#[async_trait]
impl Tool for ItineraryPlannerTool {
    fn name(&self) -> &'static str {
        "itinerary_planner"
    }

    fn description(&self) -> &'static str {
        "Generates a travel itinerary using ranked RAG retrieval based on user interests and travel dates."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days": {"type": "integer", "minimum": 1, "description": "Number of days in the trip (default 5)"}
            }
        })
    }

    async fn execute(&self, preferences: &mut Preferences, input: Value) -> Result<String> {
        let args: ItineraryArgs = parse_args(self.name(), input)?;
        let Some(days) = parse_days(args.days.as_ref()) else {
            return Ok(INVALID_DAYS.to_string());
        };

        match self.0.itinerary.plan(self.0.index.as_ref(), preferences, days).await {
            Ok(outcome) => Ok(outcome.to_string()),
            Err(e) => Ok(index_unavailable(e)),
        }
    }
}

struct WeatherForecastTool(Arc<TravelServices>);

#[async_trait]
impl Tool for WeatherForecastTool {
    fn name(&self) -> &'static str {
        "find_weather_forecast"
    }

    fn description(&self) -> &'static str {
        "Get the weather forecast for a specific location."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "Town or place in Puerto Rico"}
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, preferences: &mut Preferences, input: Value) -> Result<String> {
        let args: LocationArgs = parse_args(self.name(), input)?;
        Ok(self
            .0
            .weather
            .current_conditions(&args.location, preferences.travel_dates())
            .await)
    }
}

struct RankLocationsTool(Arc<TravelServices>);

#[async_trait]
impl Tool for RankLocationsTool {
    fn name(&self) -> &'static str {
        "rank_appropriate_locations"
    }

    fn description(&self) -> &'static str {
        "Find the best locations based on user preferences."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "What the user is looking for; omit to use stored interests"}
            }
        })
    }

    async fn execute(&self, preferences: &mut Preferences, input: Value) -> Result<String> {
        let args: RankArgs = parse_args(self.name(), input)?;
        let Some(query) = resolve_query(args.query.as_deref(), preferences.interests()) else {
            return Ok(ASK_INTERESTS.to_string());
        };

        match rank_locations(self.0.index.as_ref(), &query, self.0.top_k).await {
            Ok(ranked) if ranked.is_empty() => Ok(NO_RANKED_LOCATIONS.to_string()),
            Ok(ranked) => Ok(serde_json::to_string(&ranked)?),
            Err(e) => Ok(index_unavailable(e)),
        }
    }
}

struct LocationInfoTool(Arc<TravelServices>);

#[async_trait]
impl Tool for LocationInfoTool {
    fn name(&self) -> &'static str {
        "find_info_on_location"
    }

    fn description(&self) -> &'static str {
        "Retrieve details about a specific location."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "Name or description of the place"}
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, _preferences: &mut Preferences, input: Value) -> Result<String> {
        let args: LocationArgs = parse_args(self.name(), input)?;
        match find_info_on_location(self.0.index.as_ref(), &args.location).await {
            Ok(info) => Ok(info),
            Err(e) => Ok(index_unavailable(e)),
        }
    }
}

struct AskTravelDatesTool;

#[async_trait]
impl Tool for AskTravelDatesTool {
    fn name(&self) -> &'static str {
        "ask_travel_dates"
    }

    fn description(&self) -> &'static str {
        "Ask user for travel dates."
    }

    async fn execute(&self, _preferences: &mut Preferences, _input: Value) -> Result<String> {
        Ok(ASK_TRAVEL_DATES.to_string())
    }
}

struct AskInterestsTool;

#[async_trait]
impl Tool for AskInterestsTool {
    fn name(&self) -> &'static str {
        "ask_interests"
    }

    fn description(&self) -> &'static str {
        "Ask user for travel interests."
    }

    async fn execute(&self, _preferences: &mut Preferences, _input: Value) -> Result<String> {
        Ok(ASK_INTERESTS.to_string())
    }
}

struct LockLocationTool;

#[async_trait]
impl Tool for LockLocationTool {
    fn name(&self) -> &'static str {
        "lock_location"
    }

    fn description(&self) -> &'static str {
        "Lock a location in the itinerary."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "Place the user confirmed"}
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, preferences: &mut Preferences, input: Value) -> Result<String> {
        let args: LocationArgs = parse_args(self.name(), input)?;
        let location = args.location.trim();
        if location.is_empty() {
            return Err(TravelError::InvalidToolArguments {
                tool: self.name().to_string(),
                reason: "location cannot be empty".to_string(),
            });
        }
        preferences.lock_location(location);
        Ok(format!("{} has been locked in your itinerary.", location))
    }
}

struct SetTravelDatesTool;

#[async_trait]
impl Tool for SetTravelDatesTool {
    fn name(&self) -> &'static str {
        "set_travel_dates"
    }

    fn description(&self) -> &'static str {
        "Store the travel dates the user provided."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dates": {"type": "string", "description": "Travel dates as the user stated them"}
            },
            "required": ["dates"]
        })
    }

    async fn execute(&self, preferences: &mut Preferences, input: Value) -> Result<String> {
        let args: DatesArgs = parse_args(self.name(), input)?;
        preferences.update("travel_dates", &args.dates)?;
        Ok(format!(
            "Got it! Your travel dates are set to {}.",
            args.dates.trim()
        ))
    }
}

struct SetInterestsTool;

#[async_trait]
impl Tool for SetInterestsTool {
    fn name(&self) -> &'static str {
        "set_interests"
    }

    fn description(&self) -> &'static str {
        "Store the travel interests the user provided."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "interests": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["interests"]
        })
    }

    async fn execute(&self, preferences: &mut Preferences, input: Value) -> Result<String> {
        let args: InterestsArgs = parse_args(self.name(), input)?;
        let given: Vec<String> = match args.interests {
            InterestList::Many(items) => items,
            InterestList::One(text) => text.split(',').map(str::to_string).collect(),
        }
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

        if given.is_empty() {
            return Ok(ASK_INTERESTS.to_string());
        }
        for interest in &given {
            preferences.add_interest(interest);
        }
        Ok(format!("Added {} to your interests.", given.join(", ")))
    }
}

struct UpdatePreferencesTool;

#[async_trait]
impl Tool for UpdatePreferencesTool {
    fn name(&self) -> &'static str {
        "update_preferences"
    }

    fn description(&self) -> &'static str {
        "Update one travel preference: travel_dates, interests or locked_locations."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": {"type": "string", "enum": ["travel_dates", "interests", "locked_locations"]},
                "value": {"type": "string"}
            },
            "required": ["key", "value"]
        })
    }

    async fn execute(&self, preferences: &mut Preferences, input: Value) -> Result<String> {
        let args: PreferenceArgs = parse_args(self.name(), input)?;
        preferences.update(&args.key, &args.value)
    }
}
