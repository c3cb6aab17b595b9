use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::jobs::TripJob;
use crate::models::itinerary::ItineraryDay;
use crate::models::trip::{TouristPlace, TravelOptions, Trip};
use crate::services::bus_normalizer;
use crate::services::destination_service::fetch_destination_info;
use crate::services::image_search_service::ImageSearchService;
use crate::services::itinerary_ai_service::generate_itinerary;
use crate::services::llm_service::LlmClient;
use crate::services::place_service::{dedup_places, PlaceScraper};
use crate::services::route_suggestion_service::suggest_route_legs;
use crate::services::train_normalizer;
use crate::services::travel_api_service::TravelApiService;
use crate::services::weather_service::WeatherService;

/// Everything a worker needs to run jobs. Optional services stay None when
/// their environment is missing; the corresponding enrichment is skipped.
pub struct WorkerContext {
    pub mongo: Arc<Client>,
    pub llm: LlmClient,
    pub weather: Option<WeatherService>,
    pub images: Option<ImageSearchService>,
    pub scraper: Option<PlaceScraper>,
    pub travel_api: TravelApiService,
}

impl WorkerContext {
    fn trips(&self) -> mongodb::Collection<Trip> {
        self.mongo.database("Trips").collection("Trips")
    }

    fn places(&self) -> mongodb::Collection<TouristPlace> {
        self.mongo.database("Trips").collection("TouristPlaces")
    }

    fn itineraries(&self) -> mongodb::Collection<ItineraryDay> {
        self.mongo.database("Trips").collection("Itineraries")
    }

    fn travel_options(&self) -> mongodb::Collection<TravelOptions> {
        self.mongo.database("Trips").collection("TravelOptions")
    }
}

/// Run one job to completion. Every failure path is logged and swallowed;
/// there is no retry, backoff or dead-letter handling.
pub async fn run_job(ctx: &WorkerContext, job: &TripJob) {
    println!("Running {} for trip {}", job.name(), job.trip_id());

    let trip_id = match ObjectId::parse_str(job.trip_id()) {
        Ok(id) => id,
        Err(_) => {
            eprintln!("Job {} carried an invalid trip id: {}", job.name(), job.trip_id());
            return;
        }
    };

    let trip = match ctx.trips().find_one(doc! { "_id": trip_id }).await {
        Ok(Some(trip)) => trip,
        Ok(None) => {
            eprintln!("Trip {} no longer exists, dropping {}", trip_id, job.name());
            return;
        }
        Err(e) => {
            eprintln!("Failed to load trip {}: {}", trip_id, e);
            return;
        }
    };

    match job {
        TripJob::FetchDestinationInfo { .. } => fetch_destination_info_task(ctx, &trip).await,
        TripJob::ProcessTouristPlaces { .. } => process_tourist_places_task(ctx, &trip).await,
        TripJob::GenerateItinerary { .. } => generate_itinerary_task(ctx, &trip).await,
        TripJob::FetchTravelOptions { .. } => fetch_travel_options_task(ctx, &trip).await,
    }

    println!("Finished {} for trip {}", job.name(), trip_id);
}

async fn fetch_destination_info_task(ctx: &WorkerContext, trip: &Trip) {
    let info = fetch_destination_info(
        &ctx.llm,
        ctx.weather.as_ref(),
        ctx.images.as_ref(),
        trip,
    )
    .await;

    let info_bson = match mongodb::bson::to_bson(&info) {
        Ok(bson) => bson,
        Err(e) => {
            eprintln!("Failed to convert destination info to BSON: {}", e);
            return;
        }
    };

    if let Err(e) = ctx
        .trips()
        .update_one(
            doc! { "_id": trip.id },
            doc! { "$set": { "destination_info": info_bson } },
        )
        .await
    {
        eprintln!("Failed to persist destination info for {:?}: {}", trip.id, e);
    }
}

async fn process_tourist_places_task(ctx: &WorkerContext, trip: &Trip) {
    let scraper = match &ctx.scraper {
        Some(scraper) => scraper,
        None => {
            eprintln!("Place scraper webhook not configured, skipping");
            return;
        }
    };
    let trip_id = match trip.id {
        Some(id) => id,
        None => return,
    };

    let incoming = match scraper.fetch_places(trip_id, &trip.destination).await {
        Ok(places) => places,
        Err(e) => {
            eprintln!("Place scrape failed for trip {}: {}", trip_id, e);
            return;
        }
    };

    let existing: Vec<TouristPlace> = match ctx.places().find(doc! { "trip_id": trip_id }).await {
        Ok(cursor) => cursor.try_collect().await.unwrap_or_default(),
        Err(e) => {
            eprintln!("Failed to load existing places for {}: {}", trip_id, e);
            return;
        }
    };

    // Re-fetches only ever add places the trip has not seen at these
    // coordinates before.
    let fresh = dedup_places(&existing, incoming);
    if fresh.is_empty() {
        println!("No new places for trip {}", trip_id);
        return;
    }

    match ctx.places().insert_many(&fresh).await {
        Ok(_) => println!("Stored {} new places for trip {}", fresh.len(), trip_id),
        Err(e) => eprintln!("Failed to store places for {}: {}", trip_id, e),
    }
}

async fn generate_itinerary_task(ctx: &WorkerContext, trip: &Trip) {
    let trip_id = match trip.id {
        Some(id) => id,
        None => return,
    };

    // One-time generation: an existing itinerary is kept until the user
    // deletes it.
    match ctx
        .itineraries()
        .count_documents(doc! { "trip_id": trip_id })
        .await
    {
        Ok(0) => {}
        Ok(_) => {
            println!("Trip {} already has an itinerary, skipping", trip_id);
            return;
        }
        Err(e) => {
            eprintln!("Failed to check itinerary for {}: {}", trip_id, e);
            return;
        }
    }

    let places: Vec<TouristPlace> = match ctx.places().find(doc! { "trip_id": trip_id }).await {
        Ok(cursor) => cursor.try_collect().await.unwrap_or_default(),
        Err(e) => {
            eprintln!("Failed to load places for {}: {}", trip_id, e);
            return;
        }
    };

    let days = match generate_itinerary(&ctx.llm, trip, &places).await {
        Ok(days) => days,
        Err(error_obj) => {
            eprintln!("Itinerary generation failed for {}: {}", trip_id, error_obj);
            return;
        }
    };

    // Delete-then-reinsert so a partial earlier write never mixes with a
    // fresh generation.
    if let Err(e) = ctx.itineraries().delete_many(doc! { "trip_id": trip_id }).await {
        eprintln!("Failed to clear itinerary for {}: {}", trip_id, e);
        return;
    }
    match ctx.itineraries().insert_many(&days).await {
        Ok(_) => println!("Stored {} itinerary days for trip {}", days.len(), trip_id),
        Err(e) => eprintln!("Failed to store itinerary for {}: {}", trip_id, e),
    }
}

async fn fetch_travel_options_task(ctx: &WorkerContext, trip: &Trip) {
    let trip_id = match trip.id {
        Some(id) => id,
        None => return,
    };

    let legs = match suggest_route_legs(&ctx.llm, trip).await {
        Ok(legs) => legs,
        Err(error_obj) => {
            eprintln!("Route suggestion failed for {}: {}", trip_id, error_obj);
            return;
        }
    };

    // Search the aggregator for the first leg; later legs keep only the
    // LLM's suggestion until the user searches them explicitly.
    let date = trip.start_date.format("%Y-%m-%d").to_string();
    let primary = match legs.first() {
        Some(leg) => leg,
        None => return,
    };
    let from_code = primary
        .get("from_code")
        .and_then(Value::as_str)
        .unwrap_or(&trip.origin);
    let to_code = primary
        .get("to_code")
        .and_then(Value::as_str)
        .unwrap_or(&trip.destination);

    let trains = match ctx.travel_api.search_trains(from_code, to_code, &date, None).await {
        Ok(raw) => train_normalizer::normalize_trains(&raw),
        Err(e) => {
            eprintln!("Train search failed for {}: {}", trip_id, e);
            Vec::new()
        }
    };
    let buses = match ctx.travel_api.search_buses(from_code, to_code, &date).await {
        Ok(raw) => bus_normalizer::normalize_buses(&raw),
        Err(e) => {
            eprintln!("Bus search failed for {}: {}", trip_id, e);
            Vec::new()
        }
    };

    let options = json!({
        "legs": legs,
        "trains": {
            "options": trains,
            "fare_stats": train_normalizer::get_average_class_fares(&trains),
            "fastest": train_normalizer::get_fastest_trains(&trains, 3),
        },
        "buses": {
            "options": buses,
            "fare_stats": bus_normalizer::get_fare_stats_by_type(&buses),
            "cheapest": bus_normalizer::get_cheapest_buses(&buses, 3),
        },
    });

    let now = chrono::Utc::now();
    let replacement = TravelOptions {
        id: None,
        trip_id,
        options,
        selected: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    // One document per trip.
    match ctx
        .travel_options()
        .replace_one(doc! { "trip_id": trip_id }, &replacement)
        .upsert(true)
        .await
    {
        Ok(_) => println!("Stored travel options for trip {}", trip_id),
        Err(e) => eprintln!("Failed to store travel options for {}: {}", trip_id, e),
    }
}
