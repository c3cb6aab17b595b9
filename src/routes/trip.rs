use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use redis::aio::ConnectionManager;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::jobs::{enqueue, enqueue_trip_pipeline, TripJob};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::response::ApiResponse;
use crate::models::trip::{HotelPreferences, Trip};

#[derive(Debug, Deserialize)]
pub struct TripInput {
    pub destination: String,
    pub origin: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
    pub travel_mode: Option<String>,
    pub activity_tags: Option<Vec<String>>,
    pub hotel_preferences: Option<HotelPreferences>,
}

#[derive(Debug, Deserialize)]
pub struct TripUpdate {
    pub destination: Option<String>,
    pub budget: Option<f64>,
    pub travel_mode: Option<String>,
    pub activity_tags: Option<Vec<String>>,
    pub hotel_preferences: Option<HotelPreferences>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn trips(client: &Client) -> mongodb::Collection<Trip> {
    client.database("Trips").collection("Trips")
}

/*
    POST /api/trips
*/
pub async fn create_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    redis: web::Data<ConnectionManager>,
    input: web::Json<TripInput>,
) -> impl Responder {
    let input = input.into_inner();

    if input.destination.trim().is_empty() || input.origin.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("destination and origin are required", 400));
    }
    if input.end_date < input.start_date {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("end_date must not be before start_date", 400));
    }

    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().json(ApiResponse::error("Invalid user id", 400))
        }
    };

    let now = Utc::now();
    let trip = Trip {
        id: None,
        user_id: Some(user_id),
        destination: input.destination,
        origin: input.origin,
        start_date: input.start_date,
        end_date: input.end_date,
        budget: input.budget,
        travel_mode: input.travel_mode,
        activity_tags: input.activity_tags,
        hotel_preferences: input.hotel_preferences,
        destination_info: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match trips(&data).insert_one(&trip).await {
        Ok(result) => {
            let trip_id = result
                .inserted_id
                .as_object_id()
                .map(|id| id.to_hex())
                .unwrap_or_default();

            // Kick off the background pipeline once the row is committed.
            enqueue_trip_pipeline(redis.get_ref(), &trip_id).await;

            HttpResponse::Ok().json(ApiResponse::ok(
                json!({ "trip_id": trip_id }),
                "Trip created; enrichment is running in the background",
            ))
        }
        Err(err) => {
            eprintln!("Failed to create trip: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to create trip", 500))
        }
    }
}

/*
    GET /api/trips
*/
pub async fn get_trips(user: AuthenticatedUser, data: web::Data<Arc<Client>>) -> impl Responder {
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().json(ApiResponse::error("Invalid user id", 400))
        }
    };

    match trips(&data).find(doc! { "user_id": user_id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Trip>>().await {
            Ok(results) => HttpResponse::Ok().json(ApiResponse::ok(results, "Trips retrieved")),
            Err(err) => {
                eprintln!("Failed to collect trips: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(ApiResponse::error("Failed to retrieve trips", 500))
            }
        },
        Err(err) => {
            eprintln!("Failed to find trips: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to retrieve trips", 500))
        }
    }
}

/*
    GET /api/trips/{id}
*/
pub async fn get_trip(
    user: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let (trip_id, user_id) = match parse_ids(&path.into_inner(), &user.user_id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match trips(&data)
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(trip)) => HttpResponse::Ok().json(ApiResponse::ok(trip, "Trip retrieved")),
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::error("Trip not found", 404)),
        Err(err) => {
            eprintln!("Failed to retrieve trip: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to retrieve trip", 500))
        }
    }
}

/*
    PUT /api/trips/{id}
*/
pub async fn update_trip(
    user: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    redis: web::Data<ConnectionManager>,
    input: web::Json<TripUpdate>,
) -> impl Responder {
    let (trip_id, user_id) = match parse_ids(&path.into_inner(), &user.user_id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };
    let input = input.into_inner();
    let refresh_places = needs_place_refresh(&input);

    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return HttpResponse::BadRequest()
                .json(ApiResponse::error("end_date must not be before start_date", 400));
        }
    }

    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
    if let Some(destination) = input.destination {
        set.insert("destination", destination);
    }
    if let Some(budget) = input.budget {
        set.insert("budget", budget);
    }
    if let Some(mode) = input.travel_mode {
        set.insert("travel_mode", mode);
    }
    if let Some(tags) = input.activity_tags {
        set.insert("activity_tags", tags);
    }
    if let Some(prefs) = input.hotel_preferences {
        match mongodb::bson::to_bson(&prefs) {
            Ok(bson) => {
                set.insert("hotel_preferences", bson);
            }
            Err(err) => {
                eprintln!("Failed to serialize hotel preferences: {:?}", err);
                return HttpResponse::BadRequest()
                    .json(ApiResponse::error("Invalid hotel preferences", 400));
            }
        }
    }
    if let Some(start) = input.start_date {
        set.insert("start_date", start.to_string());
    }
    if let Some(end) = input.end_date {
        set.insert("end_date", end.to_string());
    }

    match trips(&data)
        .update_one(doc! { "_id": trip_id, "user_id": user_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().json(ApiResponse::error("Trip not found", 404))
        }
        Ok(_) => {
            if refresh_places {
                // The stored places belong to the old destination; the scrape
                // task dedups against them by coordinates.
                enqueue(
                    redis.get_ref(),
                    &TripJob::ProcessTouristPlaces { trip_id: trip_id.to_hex() },
                )
                .await;
            }
            HttpResponse::Ok().json(ApiResponse::ok(
                json!({ "trip_id": trip_id.to_hex() }),
                "Trip updated",
            ))
        }
        Err(err) => {
            eprintln!("Failed to update trip: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to update trip", 500))
        }
    }
}

/*
    DELETE /api/trips/{id}

    Cascades to every child collection before removing the trip itself.
*/
pub async fn delete_trip(
    user: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let (trip_id, user_id) = match parse_ids(&path.into_inner(), &user.user_id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    // Ownership check before touching children.
    match trips(&data)
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(ApiResponse::error("Trip not found", 404))
        }
        Err(err) => {
            eprintln!("Failed to check trip ownership: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to delete trip", 500));
        }
    }

    let db = data.database("Trips");
    let filter = doc! { "trip_id": trip_id };
    for child in ["Itineraries", "TouristPlaces", "TravelOptions", "Payments"] {
        if let Err(err) = db
            .collection::<mongodb::bson::Document>(child)
            .delete_many(filter.clone())
            .await
        {
            eprintln!("Failed to cascade delete {} for {}: {:?}", child, trip_id, err);
            return HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to delete trip", 500));
        }
    }

    match trips(&data).delete_one(doc! { "_id": trip_id }).await {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::ok(
            json!({ "trip_id": trip_id.to_hex() }),
            "Trip and all related data deleted",
        )),
        Err(err) => {
            eprintln!("Failed to delete trip: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to delete trip", 500))
        }
    }
}

fn parse_ids(trip_id: &str, user_id: &str) -> Result<(ObjectId, ObjectId), HttpResponse> {
    let trip_id = ObjectId::parse_str(trip_id)
        .map_err(|_| HttpResponse::BadRequest().json(ApiResponse::error("Invalid trip id", 400)))?;
    let user_id = ObjectId::parse_str(user_id)
        .map_err(|_| HttpResponse::BadRequest().json(ApiResponse::error("Invalid user id", 400)))?;
    Ok((trip_id, user_id))
}

/// A destination change invalidates the stored tourist places, so the
/// update handler re-enqueues the scrape job. Other field edits keep the
/// existing places.
fn needs_place_refresh(update: &TripUpdate) -> bool {
    update.destination.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> TripUpdate {
        TripUpdate {
            destination: None,
            budget: None,
            travel_mode: None,
            activity_tags: None,
            hotel_preferences: None,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn destination_change_triggers_place_refresh() {
        let mut input = update();
        input.destination = Some("Jaipur".to_string());
        assert!(needs_place_refresh(&input));
    }

    #[test]
    fn budget_only_update_keeps_existing_places() {
        let mut input = update();
        input.budget = Some(50_000.0);
        assert!(!needs_place_refresh(&input));
    }
}
