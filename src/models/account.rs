use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default)]
    pub password: String, // Always hashed
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
    pub customer_id: Option<String>,
    // Security related fields
    pub last_signin: Option<DateTime<Utc>>,
    pub failed_signins: Option<i32>,
    // We always want these fields, but have them optional so we can set them in the code
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
pub struct UserSession {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Travel preferences, one document per user. Defaults are inserted at
/// signup so a GET never comes back empty.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UserPreferences {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub preferred_travel_mode: Option<String>,
    pub preferred_train_class: Option<String>,
    pub seat_preference: Option<String>,
    pub meal_preference: Option<String>,
    pub hotel_star_min: Option<u32>,
    pub budget_per_day: Option<f64>,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPreferences {
    pub fn defaults_for(user_id: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            preferred_travel_mode: Some("train".to_string()),
            preferred_train_class: Some("3A".to_string()),
            seat_preference: None,
            meal_preference: None,
            hotel_star_min: Some(3),
            budget_per_day: None,
            language: Some("en".to_string()),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub dark_mode: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Settings {
    pub fn defaults_for(user_id: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            currency: Some("INR".to_string()),
            language: Some("en".to_string()),
            notifications_enabled: Some(true),
            dark_mode: Some(false),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}
