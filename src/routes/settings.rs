use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::account::Settings;
use crate::models::response::ApiResponse;

#[derive(Deserialize)]
pub struct SettingsUpdate {
    pub currency: Option<String>,
    pub language: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub dark_mode: Option<bool>,
}

/*
    GET /api/account/settings
*/
pub async fn get_settings(data: web::Data<Arc<Client>>, user: AuthenticatedUser) -> impl Responder {
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(ApiResponse::error("Invalid user ID", 400)),
    };

    let collection = data.database("Account").collection::<Settings>("Settings");

    match collection.find_one(doc! { "user_id": user_id }).await {
        Ok(Some(settings)) => HttpResponse::Ok().json(ApiResponse::ok(settings, "Settings")),
        Ok(None) => {
            HttpResponse::Ok().json(ApiResponse::ok(Settings::defaults_for(user_id), "Settings"))
        }
        Err(err) => {
            eprintln!("Failed to load settings: {}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to load settings", 500))
        }
    }
}

/*
    PUT /api/account/settings
*/
pub async fn update_settings(
    data: web::Data<Arc<Client>>,
    user: AuthenticatedUser,
    payload: web::Json<SettingsUpdate>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(ApiResponse::error("Invalid user ID", 400)),
    };

    let mut set = Document::new();
    if let Some(currency) = &payload.currency {
        set.insert("currency", currency);
    }
    if let Some(lang) = &payload.language {
        set.insert("language", lang);
    }
    if let Some(notifications) = payload.notifications_enabled {
        set.insert("notifications_enabled", notifications);
    }
    if let Some(dark) = payload.dark_mode {
        set.insert("dark_mode", dark);
    }
    if set.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("No fields to update", 400));
    }
    set.insert("updated_at", Utc::now().to_rfc3339());

    let collection = data.database("Account").collection::<Settings>("Settings");

    match collection
        .update_one(doc! { "user_id": user_id }, doc! { "$set": set })
        .upsert(true)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::ok(json!(null), "Settings updated")),
        Err(err) => {
            eprintln!("Failed to update settings: {}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to update settings", 500))
        }
    }
}
