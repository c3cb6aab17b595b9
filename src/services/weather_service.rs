use reqwest::Client;
use serde_json::Value;
use std::env;
use std::error::Error;
use std::fmt;

const DEFAULT_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug)]
pub enum WeatherError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            WeatherError::HttpError(err) => write!(f, "HTTP error: {}", err),
            WeatherError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for WeatherError {}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::HttpError(err)
    }
}

#[derive(Clone)]
pub struct WeatherService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherService {
    pub fn new() -> Result<Self, WeatherError> {
        let api_key = env::var("WEATHER_API_KEY")
            .map_err(|_| WeatherError::EnvironmentError("WEATHER_API_KEY not set".to_string()))?;
        let base_url =
            env::var("WEATHER_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }

    /// Current conditions + short forecast blob for a city, passed through
    /// verbatim into the destination-info document.
    pub async fn get_forecast(&self, city: &str) -> Result<Value, WeatherError> {
        let response = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&[("q", city), ("units", "metric"), ("appid", &self.api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::ResponseError(format!(
                "Weather API returned error status: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
