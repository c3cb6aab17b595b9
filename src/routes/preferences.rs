use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::account::UserPreferences;
use crate::models::response::ApiResponse;

#[derive(Deserialize)]
pub struct PreferencesUpdate {
    pub preferred_travel_mode: Option<String>,
    pub preferred_train_class: Option<String>,
    pub seat_preference: Option<String>,
    pub meal_preference: Option<String>,
    pub hotel_star_min: Option<u32>,
    pub budget_per_day: Option<f64>,
    pub language: Option<String>,
}

/*
    GET /api/account/preferences
*/
pub async fn get_preferences(
    data: web::Data<Arc<Client>>,
    user: AuthenticatedUser,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(ApiResponse::error("Invalid user ID", 400)),
    };

    let collection = data
        .database("Account")
        .collection::<UserPreferences>("Preferences");

    match collection.find_one(doc! { "user_id": user_id }).await {
        Ok(Some(prefs)) => HttpResponse::Ok().json(ApiResponse::ok(prefs, "Preferences")),
        // Older accounts may predate the defaults-at-signup behavior.
        Ok(None) => HttpResponse::Ok().json(ApiResponse::ok(
            UserPreferences::defaults_for(user_id),
            "Preferences",
        )),
        Err(err) => {
            eprintln!("Failed to load preferences: {}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to load preferences", 500))
        }
    }
}

/*
    PUT /api/account/preferences
*/
pub async fn update_preferences(
    data: web::Data<Arc<Client>>,
    user: AuthenticatedUser,
    payload: web::Json<PreferencesUpdate>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(ApiResponse::error("Invalid user ID", 400)),
    };

    let mut set = Document::new();
    if let Some(mode) = &payload.preferred_travel_mode {
        set.insert("preferred_travel_mode", mode);
    }
    if let Some(class) = &payload.preferred_train_class {
        set.insert("preferred_train_class", class);
    }
    if let Some(seat) = &payload.seat_preference {
        set.insert("seat_preference", seat);
    }
    if let Some(meal) = &payload.meal_preference {
        set.insert("meal_preference", meal);
    }
    if let Some(star) = payload.hotel_star_min {
        set.insert("hotel_star_min", star as i32);
    }
    if let Some(budget) = payload.budget_per_day {
        set.insert("budget_per_day", budget);
    }
    if let Some(lang) = &payload.language {
        set.insert("language", lang);
    }
    if set.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("No fields to update", 400));
    }
    set.insert("updated_at", Utc::now().to_rfc3339());

    let collection = data
        .database("Account")
        .collection::<UserPreferences>("Preferences");

    match collection
        .update_one(doc! { "user_id": user_id }, doc! { "$set": set })
        .upsert(true)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::ok(json!(null), "Preferences updated")),
        Err(err) => {
            eprintln!("Failed to update preferences: {}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to update preferences", 500))
        }
    }
}
