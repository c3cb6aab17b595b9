use chrono::{NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;

use crate::models::itinerary::{ItineraryDay, ItineraryPlace};
use crate::models::trip::{TouristPlace, Trip};
use crate::services::llm_service::{parse_llm_json, TextCompletion};

/// Day grouping is delegated to the LLM: we hand it the trip metadata and
/// the candidate places, and validate/parse whatever comes back. There is
/// no clustering algorithm on this side.
pub fn build_itinerary_prompt(trip: &Trip, places: &[TouristPlace]) -> String {
    let mut place_lines = String::new();
    for place in places {
        place_lines.push_str(&format!(
            "- {} ({}, {}): {}\n",
            place.name,
            place.latitude,
            place.longitude,
            place.description.as_deref().unwrap_or("no description")
        ));
    }

    let tags = trip
        .activity_tags
        .as_ref()
        .map(|t| t.join(", "))
        .unwrap_or_else(|| "general sightseeing".to_string());

    format!(
        "You are a travel planner. Create a day-by-day itinerary for a trip to {destination} \
         from {start} to {end} ({days} days). The traveller is interested in: {tags}. \
         Group the following places so that places near each other fall on the same day:\n\
         {places}\n\
         Respond with ONLY a JSON object of the shape \
         {{\"itinerary\": [{{\"day\": 1, \"date\": \"YYYY-MM-DD\", \"summary\": \"...\", \
         \"places\": [{{\"name\": \"...\", \"description\": \"...\", \"best_time\": \"...\", \
         \"approx_cost\": 0}}]}}]}}. \
         Use day numbers starting at 1 and dates within the trip range.",
        destination = trip.destination,
        start = trip.start_date,
        end = trip.end_date,
        days = trip.length_days(),
        tags = tags,
        places = place_lines,
    )
}

/// Call the LLM and parse its reply into day records. The `Err` value is
/// the structured parse-failure object (truncated raw text included) and
/// is stored/surfaced as-is, never raised.
pub async fn generate_itinerary<L: TextCompletion>(
    llm: &L,
    trip: &Trip,
    places: &[TouristPlace],
) -> Result<Vec<ItineraryDay>, Value> {
    let prompt = build_itinerary_prompt(trip, places);
    let reply = match llm.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("LLM call failed for itinerary generation: {}", e);
            return Err(serde_json::json!({
                "error": format!("LLM call failed: {}", e),
                "raw": Value::Null,
            }));
        }
    };

    let trip_id = trip.id;
    parse_itinerary_response(trip_id, &reply)
}

/// Pure parse step: one `ItineraryDay` per entry of the reply's
/// `itinerary` array. Entries missing a day number or date are skipped.
pub fn parse_itinerary_response(
    trip_id: Option<ObjectId>,
    reply: &str,
) -> Result<Vec<ItineraryDay>, Value> {
    let parsed = parse_llm_json(reply)?;

    let entries = match parsed.get("itinerary").and_then(Value::as_array) {
        Some(entries) => entries,
        None => {
            return Err(serde_json::json!({
                "error": "LLM reply had no itinerary array",
                "raw": crate::services::llm_service::truncate_raw(reply),
            }))
        }
    };

    let now = Utc::now();
    let days: Vec<ItineraryDay> = entries
        .iter()
        .filter_map(|entry| {
            let day_number = entry.get("day").and_then(Value::as_u64)? as u32;
            let date =
                NaiveDate::parse_from_str(entry.get("date")?.as_str()?, "%Y-%m-%d").ok()?;
            Some(ItineraryDay {
                id: None,
                trip_id,
                day_number,
                date,
                summary: entry
                    .get("summary")
                    .and_then(Value::as_str)
                    .map(String::from),
                places: entry
                    .get("places")
                    .and_then(Value::as_array)
                    .map(|places| places.iter().filter_map(parse_place).collect())
                    .unwrap_or_default(),
                created_at: Some(now),
            })
        })
        .collect();

    if days.is_empty() {
        return Err(serde_json::json!({
            "error": "LLM itinerary had no usable day entries",
            "raw": crate::services::llm_service::truncate_raw(reply),
        }));
    }

    Ok(days)
}

fn parse_place(value: &Value) -> Option<ItineraryPlace> {
    Some(ItineraryPlace {
        name: value.get("name")?.as_str()?.to_string(),
        description: value
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        best_time: value
            .get("best_time")
            .and_then(Value::as_str)
            .map(String::from),
        approx_cost: value.get("approx_cost").and_then(Value::as_f64),
        latitude: value.get("latitude").and_then(Value::as_f64),
        longitude: value.get("longitude").and_then(Value::as_f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_reply_yields_one_record_per_entry() {
        let reply = r#"{
            "itinerary": [
                {"day": 1, "date": "2026-10-02", "summary": "Old town",
                 "places": [{"name": "Fort", "description": "Historic fort",
                             "best_time": "morning", "approx_cost": 200}]},
                {"day": 2, "date": "2026-10-03", "summary": "Lakes",
                 "places": [{"name": "Lake Promenade"}]}
            ]
        }"#;
        let days = parse_itinerary_response(None, reply).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day_number, 1);
        assert_eq!(days[0].date.to_string(), "2026-10-02");
        assert_eq!(days[0].places[0].name, "Fort");
        assert_eq!(days[0].places[0].approx_cost, Some(200.0));
        assert_eq!(days[1].day_number, 2);
        assert_eq!(days[1].date.to_string(), "2026-10-03");
    }

    #[test]
    fn reply_wrapped_in_markdown_still_parses() {
        let reply = "Here you go:\n```json\n{\"itinerary\": [{\"day\": 1, \"date\": \"2026-10-02\", \"places\": []}]}\n```";
        let days = parse_itinerary_response(None, reply).unwrap();
        assert_eq!(days.len(), 1);
        assert!(days[0].places.is_empty());
    }

    #[test]
    fn garbage_reply_yields_error_object_with_raw_text() {
        let err = parse_itinerary_response(None, "I could not plan this trip.").unwrap_err();
        assert!(err["error"].as_str().unwrap().contains("not valid JSON"));
        assert_eq!(err["raw"], "I could not plan this trip.");
    }

    #[test]
    fn entries_without_date_are_skipped() {
        let reply = r#"{"itinerary": [
            {"day": 1, "places": []},
            {"day": 2, "date": "2026-10-03", "places": []}
        ]}"#;
        let days = parse_itinerary_response(None, reply).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day_number, 2);
    }
}
