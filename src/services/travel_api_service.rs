use redis::aio::ConnectionManager;
use reqwest::Client;
use serde_json::Value;
use std::env;
use std::error::Error;
use std::fmt;

use crate::db::redis::{cache_get, cache_set, SEARCH_CACHE_TTL_SECS};

const DEFAULT_API_BASE: &str = "https://api.travelaggregator.example.com/v2";

#[derive(Debug)]
pub enum TravelApiError {
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for TravelApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelApiError::HttpError(err) => write!(f, "HTTP error: {}", err),
            TravelApiError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for TravelApiError {}

impl From<reqwest::Error> for TravelApiError {
    fn from(err: reqwest::Error) -> Self {
        TravelApiError::HttpError(err)
    }
}

/// The one client for the train/bus/hotel aggregator and its station
/// autosuggest. Every search is fronted by the Redis cache with a fixed
/// TTL, keyed on the request parameters.
#[derive(Clone)]
pub struct TravelApiService {
    client: Client,
    base_url: String,
    api_key: String,
    cache: ConnectionManager,
}

impl TravelApiService {
    pub fn new(cache: ConnectionManager) -> Self {
        let base_url =
            env::var("TRAVEL_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let api_key = env::var("TRAVEL_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            eprintln!("TRAVEL_API_KEY not set; aggregator calls will be unauthenticated");
        }

        Self {
            client: Client::new(),
            base_url,
            api_key,
            cache,
        }
    }

    pub async fn search_trains(
        &self,
        from: &str,
        to: &str,
        date: &str,
        coupon: Option<&str>,
    ) -> Result<Vec<Value>, TravelApiError> {
        let key = train_search_key(from, to, date, coupon);
        let path = format!("trains/search?from={}&to={}&date={}", from, to, date);
        self.cached_list(&key, &path, "trains").await
    }

    pub async fn search_buses(
        &self,
        from: &str,
        to: &str,
        date: &str,
    ) -> Result<Vec<Value>, TravelApiError> {
        let key = format!("bus_search:{}:{}:{}", from, to, date);
        let path = format!("buses/search?from={}&to={}&date={}", from, to, date);
        self.cached_list(&key, &path, "buses").await
    }

    pub async fn search_hotels(
        &self,
        city: &str,
        checkin: &str,
        checkout: &str,
    ) -> Result<Vec<Value>, TravelApiError> {
        let key = format!("hotel_search:{}:{}:{}", city, checkin, checkout);
        let path = format!(
            "hotels/search?city={}&checkin={}&checkout={}",
            city, checkin, checkout
        );
        self.cached_list(&key, &path, "hotels").await
    }

    pub async fn suggest_stations(&self, query: &str) -> Result<Vec<Value>, TravelApiError> {
        let key = format!("station_suggest:{}", query.to_lowercase());
        let path = format!("stations/suggest?q={}", query);
        self.cached_list(&key, &path, "stations").await
    }

    /// Cache-or-fetch for endpoints returning `{"<field>": [...]}`.
    async fn cached_list(
        &self,
        cache_key: &str,
        path: &str,
        field: &str,
    ) -> Result<Vec<Value>, TravelApiError> {
        if let Some(cached) = cache_get(&self.cache, cache_key).await {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&cached) {
                println!("Cache hit: {}", cache_key);
                return Ok(items);
            }
        }

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TravelApiError::ResponseError(format!(
                "Aggregator returned error status: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let items = body
            .get(field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        if let Ok(serialized) = serde_json::to_string(&items) {
            cache_set(&self.cache, cache_key, &serialized, SEARCH_CACHE_TTL_SECS).await;
        }

        Ok(items)
    }
}

/// Colon-delimited cache key embedding the search parameters.
pub fn train_search_key(from: &str, to: &str, date: &str, coupon: Option<&str>) -> String {
    format!(
        "train_search:{}:{}:{}:{}",
        from,
        to,
        date,
        coupon.unwrap_or("none")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_key_embeds_all_parameters() {
        assert_eq!(
            train_search_key("NDLS", "BCT", "2026-09-14", Some("FESTIVE")),
            "train_search:NDLS:BCT:2026-09-14:FESTIVE"
        );
        assert_eq!(
            train_search_key("NDLS", "BCT", "2026-09-14", None),
            "train_search:NDLS:BCT:2026-09-14:none"
        );
    }
}
