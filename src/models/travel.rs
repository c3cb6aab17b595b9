use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parsed availability for one class of one train.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AvailabilityStatus {
    /// Raw status string as returned by the aggregator, e.g. "AVAILABLE-0042"
    /// or "RLWL/12".
    pub raw: String,
    pub bookable: bool,
    pub seats: Option<u32>,
}

/// Uniform internal shape for one train option. Fares and availability are
/// keyed by class code (SL, 3A, 2A, 1A, CC).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrainOption {
    pub train_number: String,
    pub train_name: String,
    pub departure_time: String,
    pub arrival_time: String,
    /// "HH:MM"
    pub duration: String,
    pub fares: HashMap<String, f64>,
    pub availability: HashMap<String, AvailabilityStatus>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BusOption {
    pub operator: String,
    pub bus_type: String,
    pub departure_time: String,
    pub arrival_time: String,
    /// e.g. "8h 30m"
    pub duration: String,
    pub fare: f64,
    pub seats_available: u32,
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HotelOption {
    pub name: String,
    pub locality: String,
    pub star_rating: u32,
    pub price_per_night: f64,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
}

/// Per-class fare reduction. Classes with zero samples never get an entry.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FareStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LocalityStats {
    pub locality: String,
    pub average_price: f64,
    pub count: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StationSuggestion {
    pub code: String,
    pub name: String,
    pub city: Option<String>,
}
