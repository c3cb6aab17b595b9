use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::response::ApiResponse;
use crate::models::trip::{TravelOptions, Trip};

fn travel_options(client: &Client) -> mongodb::Collection<TravelOptions> {
    client.database("Trips").collection("TravelOptions")
}

/*
    GET /api/trips/{id}/travel-options
*/
pub async fn get_travel_options(
    user: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let trip_id = match owned_trip(&client, &path.into_inner(), &user.user_id).await {
        Ok(id) => id,
        Err(response) => return response,
    };

    match travel_options(&client)
        .find_one(doc! { "trip_id": trip_id })
        .await
    {
        Ok(Some(options)) => {
            HttpResponse::Ok().json(ApiResponse::ok(options, "Travel options retrieved"))
        }
        Ok(None) => HttpResponse::Ok().json(ApiResponse::ok(
            Value::Null,
            "Travel options have not been fetched yet",
        )),
        Err(err) => {
            eprintln!("Failed to retrieve travel options: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to retrieve travel options", 500))
        }
    }
}

/*
    PUT /api/trips/{id}/travel-options

    Stores the caller's selection alongside the raw options.
*/
pub async fn select_travel_option(
    user: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    input: web::Json<Value>,
) -> impl Responder {
    let client = data.into_inner();
    let trip_id = match owned_trip(&client, &path.into_inner(), &user.user_id).await {
        Ok(id) => id,
        Err(response) => return response,
    };

    let selected = match mongodb::bson::to_bson(&input.into_inner()) {
        Ok(bson) => bson,
        Err(err) => {
            eprintln!("Failed to serialize selection: {:?}", err);
            return HttpResponse::BadRequest().json(ApiResponse::error("Invalid selection", 400));
        }
    };

    match travel_options(&client)
        .update_one(
            doc! { "trip_id": trip_id },
            doc! { "$set": { "selected": selected, "updated_at": Utc::now().to_rfc3339() } },
        )
        .await
    {
        Ok(result) if result.matched_count == 0 => HttpResponse::NotFound().json(
            ApiResponse::error("No travel options exist for this trip yet", 404),
        ),
        Ok(_) => HttpResponse::Ok().json(ApiResponse::ok(
            json!({ "trip_id": trip_id.to_hex() }),
            "Selection stored",
        )),
        Err(err) => {
            eprintln!("Failed to store selection: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to store selection", 500))
        }
    }
}

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
