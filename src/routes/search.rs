use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::response::ApiResponse;
use crate::models::travel::StationSuggestion;
use crate::services::bus_normalizer;
use crate::services::hotel_normalizer;
use crate::services::train_normalizer;
use crate::services::travel_api_service::TravelApiService;

const DEFAULT_RANKING_LIMIT: usize = 3;

#[derive(Deserialize)]
pub struct TrainSearchParams {
    pub from: String,
    pub to: String,
    pub date: String,
    pub coupon: Option<String>,
    /// Class code for the cheapest-N ranking, e.g. "3A".
    pub class: Option<String>,
}

#[derive(Deserialize)]
pub struct BusSearchParams {
    pub from: String,
    pub to: String,
    pub date: String,
    /// morning | afternoon | evening | night
    pub window: Option<String>,
}

#[derive(Deserialize)]
pub struct HotelSearchParams {
    pub city: String,
    pub checkin: String,
    pub checkout: String,
    pub max_price: Option<f64>,
    pub min_star: Option<u32>,
}

#[derive(Deserialize)]
pub struct StationSearchParams {
    pub q: String,
}

/*
    GET /api/search/trains
*/
pub async fn search_trains(
    api: web::Data<TravelApiService>,
    params: web::Query<TrainSearchParams>,
) -> impl Responder {
    if params.from.trim().is_empty() || params.to.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("from and to are required", 400));
    }

    let raw = match api
        .search_trains(&params.from, &params.to, &params.date, params.coupon.as_deref())
        .await
    {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("Train search failed: {}", err);
            return HttpResponse::Ok()
                .json(ApiResponse::error("Train search is currently unavailable", 502));
        }
    };

    let options = train_normalizer::normalize_trains(&raw);
    let bookable = train_normalizer::filter_bookable(&options);
    let mut payload = json!({
        "options": options,
        "bookable": bookable,
        "fare_stats": train_normalizer::get_average_class_fares(&options),
        "fastest": train_normalizer::get_fastest_trains(&options, DEFAULT_RANKING_LIMIT),
    });
    if let Some(class) = &params.class {
        payload["cheapest"] = json!(train_normalizer::get_cheapest_trains(
            &options,
            class,
            DEFAULT_RANKING_LIMIT
        ));
    }

    HttpResponse::Ok().json(ApiResponse::ok(payload, "Train search complete"))
}

/*
    GET /api/search/buses
*/
pub async fn search_buses(
    api: web::Data<TravelApiService>,
    params: web::Query<BusSearchParams>,
) -> impl Responder {
    if params.from.trim().is_empty() || params.to.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("from and to are required", 400));
    }

    let raw = match api.search_buses(&params.from, &params.to, &params.date).await {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("Bus search failed: {}", err);
            return HttpResponse::Ok()
                .json(ApiResponse::error("Bus search is currently unavailable", 502));
        }
    };

    let mut options = bus_normalizer::normalize_buses(&raw);
    if let Some(window) = &params.window {
        options = bus_normalizer::filter_by_departure_window(&options, window);
    }

    let payload = json!({
        "options": options,
        "fare_stats" : bus_normalizer::get_fare_stats_by_type(&options),
        "cheapest": bus_normalizer::get_cheapest_buses(&options, DEFAULT_RANKING_LIMIT),
        "fastest": bus_normalizer::get_fastest_buses(&options, DEFAULT_RANKING_LIMIT),
    });

    HttpResponse::Ok().json(ApiResponse::ok(payload, "Bus search complete"))
}

/*
    GET /api/search/hotels
*/
pub async fn search_hotels(
    api: web::Data<TravelApiService>,
    params: web::Query<HotelSearchParams>,
) -> impl Responder {
    if params.city.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("city is required", 400));
    }

    let raw = match api
        .search_hotels(&params.city, &params.checkin, &params.checkout)
        .await
    {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("Hotel search failed: {}", err);
            return HttpResponse::Ok()
                .json(ApiResponse::error("Hotel search is currently unavailable", 502));
        }
    };

    let all = hotel_normalizer::normalize_hotels(&raw);
    let filtered = hotel_normalizer::filter_hotels(&all, params.max_price, params.min_star);
    let payload = json!({
        "options": filtered,
        "localities": hotel_normalizer::group_by_locality(&filtered),
        "cheapest": hotel_normalizer::get_cheapest_hotels(&filtered, DEFAULT_RANKING_LIMIT),
    });

    HttpResponse::Ok().json(ApiResponse::ok(payload, "Hotel search complete"))
}

/*
    GET /api/search/stations?q=...
*/
pub async fn suggest_stations(
    api: web::Data<TravelApiService>,
    params: web::Query<StationSearchParams>,
) -> impl Responder {
    if params.q.trim().len() < 2 {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("q must be at least 2 characters", 400));
    }

    let raw = match api.suggest_stations(&params.q).await {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("Station suggest failed: {}", err);
            return HttpResponse::Ok().json(ApiResponse::error(
                "Station suggestions are currently unavailable",
                502,
            ));
        }
    };

    let suggestions: Vec<StationSuggestion> = raw
        .iter()
        .filter_map(|record| {
            Some(StationSuggestion {
                code: record.get("code")?.as_str()?.to_string(),
                name: record.get("name")?.as_str()?.to_string(),
                city: record.get("city").and_then(Value::as_str).map(String::from),
            })
        })
        .collect();

    HttpResponse::Ok().json(ApiResponse::ok(suggestions, "Station suggestions"))
}
