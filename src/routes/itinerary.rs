use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::ItineraryDay;
use crate::models::response::ApiResponse;
use crate::models::trip::Trip;
use crate::services::llm_service::LlmClient;
use crate::services::translation_service::{translate, MongoTranslationStore};

#[derive(Deserialize)]
pub struct ItineraryQuery {
    /// Target language; itineraries are generated in English.
    pub lang: Option<String>,
}

/*
    GET /api/trips/{id}/itinerary?lang=hi
*/
pub async fn get_itinerary(
    user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<ItineraryQuery>,
    data: web::Data<Arc<Client>>,
    llm: web::Data<LlmClient>,
) -> impl Responder {
    let client = data.into_inner();
    let trip_id = match owned_trip(&client, &path.into_inner(), &user.user_id).await {
        Ok(id) => id,
        Err(response) => return response,
    };

    let collection: mongodb::Collection<ItineraryDay> =
        client.database("Trips").collection("Itineraries");

    let cursor = collection
        .find(doc! { "trip_id": trip_id })
        .sort(doc! { "day_number": 1 })
        .await;

    let days = match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<ItineraryDay>>().await {
            Ok(days) => days,
            Err(err) => {
                eprintln!("Failed to collect itinerary days: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(ApiResponse::error("Failed to retrieve itinerary", 500));
            }
        },
        Err(err) => {
            eprintln!("Failed to query itinerary: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to retrieve itinerary", 500));
        }
    };

    if days.is_empty() {
        return HttpResponse::Ok().json(ApiResponse::ok(
            json!([]),
            "Itinerary has not been generated yet",
        ));
    }

    let payload = serde_json::to_value(&days).unwrap_or(json!([]));
    let target_lang = query.lang.as_deref().unwrap_or("en");
    // Translation fails open; worst case the caller gets English back.
    let store = MongoTranslationStore::new(client.as_ref().clone());
    let translated = translate(llm.get_ref(), &store, &payload, "en", target_lang).await;

    HttpResponse::Ok().json(ApiResponse::ok(translated, "Itinerary retrieved"))
}

/*
    DELETE /api/trips/{id}/itinerary

    Clears the generated days so the generation job can run again.
*/
pub async fn delete_itinerary(
    user: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let trip_id = match owned_trip(&client, &path.into_inner(), &user.user_id).await {
        Ok(id) => id,
        Err(response) => return response,
    };

    let collection: mongodb::Collection<ItineraryDay> =
        client.database("Trips").collection("Itineraries");

    match collection.delete_many(doc! { "trip_id": trip_id }).await {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::ok(
            json!({ "deleted": result.deleted_count }),
            "Itinerary deleted; it can now be regenerated",
        )),
        Err(err) => {
            eprintln!("Failed to delete itinerary: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to delete itinerary", 500))
        }
    }
}

/// Resolve the path id and confirm the trip belongs to the caller.
async fn owned_trip(
    client: &Arc<Client>,
    trip_id: &str,
    user_id: &str,
) -> Result<ObjectId, HttpResponse> {
    let trip_id = ObjectId::parse_str(trip_id)
        .map_err(|_| HttpResponse::BadRequest().json(ApiResponse::error("Invalid trip id", 400)))?;
    let user_id = ObjectId::parse_str(user_id)
        .map_err(|_| HttpResponse::BadRequest().json(ApiResponse::error("Invalid user id", 400)))?;

    let trips: mongodb::Collection<Trip> = client.database("Trips").collection("Trips");
    match trips
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(_)) => Ok(trip_id),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error("Trip not found", 404))),
        Err(err) => {
            eprintln!("Failed to check trip ownership: {:?}", err);
            Err(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to retrieve trip", 500)))
        }
    }
}
