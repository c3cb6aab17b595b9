use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HotelPreferences {
    pub star_rating: Option<u32>,
    pub max_price_per_night: Option<f64>,
    pub locality: Option<String>,
}

/// A user-owned trip. Deleting a trip deletes every child document
/// (itinerary days, tourist places, travel options, payments).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Trip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
    pub destination: String,
    pub origin: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
    pub travel_mode: Option<String>, // train | bus | flight | car
    pub activity_tags: Option<Vec<String>>,
    pub hotel_preferences: Option<HotelPreferences>,
    /// LLM/weather/image enrichment blob, written by the worker.
    pub destination_info: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Trip {
    pub fn length_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Candidate point of interest for a trip, deduplicated by the
/// (latitude, longitude) pair on re-fetch.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TouristPlace {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: Option<ObjectId>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Raw and user-selected route options for a trip. At most one document
/// per trip; writes are upserts keyed on `trip_id`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TravelOptions {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: ObjectId,
    pub options: Value,
    pub selected: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: ObjectId,
    pub user_id: ObjectId,
    pub payment_intent_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
