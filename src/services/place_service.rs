use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::error::Error;
use std::fmt;

use crate::models::trip::TouristPlace;

#[derive(Debug)]
pub enum PlaceScrapeError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for PlaceScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceScrapeError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            PlaceScrapeError::HttpError(err) => write!(f, "HTTP error: {}", err),
            PlaceScrapeError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for PlaceScrapeError {}

impl From<reqwest::Error> for PlaceScrapeError {
    fn from(err: reqwest::Error) -> Self {
        PlaceScrapeError::HttpError(err)
    }
}

/// Client for the externally-hosted scraping webhook. We do not scrape
/// anything ourselves; the webhook returns candidate places for a
/// destination and we reshape them.
#[derive(Clone)]
pub struct PlaceScraper {
    client: Client,
    webhook_url: String,
}

impl PlaceScraper {
    pub fn new() -> Result<Self, PlaceScrapeError> {
        let webhook_url = env::var("PLACE_SCRAPER_WEBHOOK_URL").map_err(|_| {
            PlaceScrapeError::EnvironmentError("PLACE_SCRAPER_WEBHOOK_URL not set".to_string())
        })?;

        Ok(Self {
            client: Client::new(),
            webhook_url,
        })
    }

    pub async fn fetch_places(
        &self,
        trip_id: ObjectId,
        destination: &str,
    ) -> Result<Vec<TouristPlace>, PlaceScrapeError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "destination": destination }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlaceScrapeError::ResponseError(format!(
                "Scraper webhook returned error status: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let raw = body
            .get("places")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(raw
            .iter()
            .filter_map(|record| parse_place(trip_id, record))
            .collect())
    }
}

fn parse_place(trip_id: ObjectId, record: &Value) -> Option<TouristPlace> {
    Some(TouristPlace {
        id: None,
        trip_id: Some(trip_id),
        name: record.get("name")?.as_str()?.to_string(),
        description: record
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        category: record
            .get("category")
            .and_then(Value::as_str)
            .map(String::from),
        latitude: record.get("latitude").and_then(Value::as_f64)?,
        longitude: record.get("longitude").and_then(Value::as_f64)?,
        image_url: record
            .get("image_url")
            .and_then(Value::as_str)
            .map(String::from),
        created_at: Some(Utc::now()),
    })
}

/// Keep only the incoming places whose (latitude, longitude) pair is not
/// already present for the trip. Duplicates within the incoming batch are
/// collapsed too, first occurrence wins.
pub fn dedup_places(existing: &[TouristPlace], incoming: Vec<TouristPlace>) -> Vec<TouristPlace> {
    let mut seen: Vec<(f64, f64)> = existing
        .iter()
        .map(|p| (p.latitude, p.longitude))
        .collect();

    let mut fresh = Vec::new();
    for place in incoming {
        let coords = (place.latitude, place.longitude);
        if seen.contains(&coords) {
            continue;
        }
        seen.push(coords);
        fresh.push(place);
    }
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, lat: f64, lon: f64) -> TouristPlace {
        TouristPlace {
            id: None,
            trip_id: None,
            name: name.to_string(),
            description: None,
            category: None,
            latitude: lat,
            longitude: lon,
            image_url: None,
            created_at: None,
        }
    }

    #[test]
    fn identical_coordinates_do_not_create_a_second_row() {
        let existing = vec![place("City Palace", 24.5760, 73.6835)];
        let incoming = vec![
            place("City Palace (re-scraped)", 24.5760, 73.6835),
            place("Lake Pichola", 24.5714, 73.6798),
        ];
        let fresh = dedup_places(&existing, incoming);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "Lake Pichola");
    }

    #[test]
    fn duplicates_within_a_batch_collapse() {
        let incoming = vec![
            place("a", 1.0, 2.0),
            place("b", 1.0, 2.0),
            place("c", 3.0, 4.0),
        ];
        let fresh = dedup_places(&[], incoming);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].name, "a");
    }
}
