use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One itinerary entry per day of a trip. Generated once by the worker;
/// not recomputed unless the itinerary is deleted.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryDay {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: Option<ObjectId>,
    pub day_number: u32,
    pub date: NaiveDate,
    pub summary: Option<String>,
    pub places: Vec<ItineraryPlace>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryPlace {
    pub name: String,
    pub description: Option<String>,
    pub best_time: Option<String>,
    pub approx_cost: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
