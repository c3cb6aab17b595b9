use serde_json::{json, Value};

use crate::models::trip::Trip;
use crate::services::image_search_service::ImageSearchService;
use crate::services::llm_service::{parse_llm_json, TextCompletion};
use crate::services::weather_service::WeatherService;

fn build_destination_prompt(trip: &Trip) -> String {
    format!(
        "You are a travel writer. Describe {destination} for a visitor travelling \
         {start} to {end}. Respond with ONLY a JSON object of the shape \
         {{\"summary\": \"...\", \"best_season\": \"...\", \"local_tips\": [\"...\"], \
         \"cuisine\": [\"...\"], \"languages\": [\"...\"]}}.",
        destination = trip.destination,
        start = trip.start_date,
        end = trip.end_date,
    )
}

/// Assemble the destination-info blob: LLM summary plus weather forecast
/// plus a handful of image URLs. Weather and images are best-effort; a
/// failed LLM parse puts the structured error object in the blob instead
/// of failing the job.
pub async fn fetch_destination_info<L: TextCompletion>(
    llm: &L,
    weather: Option<&WeatherService>,
    images: Option<&ImageSearchService>,
    trip: &Trip,
) -> Value {
    let summary = match llm.complete(&build_destination_prompt(trip)).await {
        Ok(reply) => match parse_llm_json(&reply) {
            Ok(parsed) => parsed,
            Err(error_obj) => error_obj,
        },
        Err(e) => {
            eprintln!("Destination LLM call failed: {}", e);
            json!({ "error": format!("LLM call failed: {}", e) })
        }
    };

    let forecast = match weather {
        Some(service) => match service.get_forecast(&trip.destination).await {
            Ok(forecast) => forecast,
            Err(e) => {
                eprintln!("Weather lookup failed for {}: {}", trip.destination, e);
                Value::Null
            }
        },
        None => Value::Null,
    };

    let image_urls = match images {
        Some(service) => match service.search_images(&trip.destination, 5).await {
            Ok(urls) => json!(urls),
            Err(e) => {
                eprintln!("Image search failed for {}: {}", trip.destination, e);
                json!([])
            }
        },
        None => json!([]),
    };

    json!({
        "summary": summary,
        "weather": forecast,
        "images": image_urls,
    })
}
