use crate::adapters::http::{build_client, ensure_success, join_url};
use crate::domain::model::format_number;
use crate::utils::error::Result;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org";
pub const REGION_SUFFIX: &str = "PR,US";

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    weather: Vec<WeatherEntry>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct WeatherEntry {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub description: String,
    pub temperature_c: f64,
    pub humidity: f64,
}

/// OpenWeatherMap current-weather client. Locations are always qualified
/// with the Puerto Rico suffix.
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: SecretString, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    pub async fn fetch(&self, location: &str) -> Result<CurrentConditions> {
        let qualified = format!("{},{}", location.trim(), REGION_SUFFIX);
        let url = join_url(&self.base_url, "data/2.5/weather");
        tracing::debug!("Fetching weather for {}", qualified);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", qualified.as_str()),
                ("appid", self.api_key.expose_secret()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let response = ensure_success("weather", response).await?;
        // the request URL carries the API key, keep it out of error messages
        let body: WeatherResponse = response.json().await.map_err(reqwest::Error::without_url)?;

        let description = body
            .weather
            .into_iter()
            .next()
            .map(|entry| entry.description)
            .unwrap_or_else(|| "unknown conditions".to_string());

        Ok(CurrentConditions {
            description,
            temperature_c: body.main.temp,
            humidity: body.main.humidity,
        })
    }

    /// Formatted conditions for the traveller. Failures become a plain
    /// message; this never returns an error.
    pub async fn current_conditions(&self, location: &str, travel_dates: Option<&str>) -> String {
        match self.fetch(location).await {
            Ok(conditions) => format!(
                "Weather in {} on {}: {}, {}°C, Humidity: {}%",
                location,
                travel_dates.unwrap_or("your trip"),
                conditions.description,
                format_number(conditions.temperature_c),
                conditions.humidity
            ),
            Err(e) => {
                tracing::warn!("Weather lookup for {} failed: {}", location, e);
                format!("Could not fetch weather for {}.", location)
            }
        }
    }
}
