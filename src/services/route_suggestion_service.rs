use serde_json::Value;

use crate::models::trip::Trip;
use crate::services::llm_service::{parse_llm_json, TextCompletion};

fn build_route_prompt(trip: &Trip) -> String {
    format!(
        "Plan how to travel from {origin} to {destination} on {date}, preferring \
         {mode}. Break the journey into legs where a direct connection is unlikely \
         (for example via a hub city). Respond with ONLY a JSON object of the shape \
         {{\"legs\": [{{\"from\": \"...\", \"to\": \"...\", \"from_code\": \"...\", \
         \"to_code\": \"...\", \"mode\": \"train|bus|flight\", \"note\": \"...\"}}]}}. \
         Use official station codes where they exist.",
        origin = trip.origin,
        destination = trip.destination,
        date = trip.start_date,
        mode = trip.travel_mode.as_deref().unwrap_or("train"),
    )
}

/// Ask the LLM to break the journey into legs. The reply goes through the
/// usual strict-parse / brace-recovery / structured-error protocol.
pub async fn suggest_route_legs<L: TextCompletion>(
    llm: &L,
    trip: &Trip,
) -> Result<Vec<Value>, Value> {
    let reply = match llm.complete(&build_route_prompt(trip)).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Route suggestion LLM call failed: {}", e);
            return Err(serde_json::json!({
                "error": format!("LLM call failed: {}", e),
                "raw": Value::Null,
            }));
        }
    };

    let parsed = parse_llm_json(&reply)?;
    match parsed.get("legs").and_then(Value::as_array) {
        Some(legs) if !legs.is_empty() => Ok(legs.clone()),
        _ => Err(serde_json::json!({
            "error": "LLM reply had no legs array",
            "raw": crate::services::llm_service::truncate_raw(&reply),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_service::LlmError;
    use chrono::NaiveDate;

    struct FixedLlm(String);

    impl TextCompletion for FixedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }

    fn trip() -> Trip {
        Trip {
            id: None,
            user_id: None,
            destination: "Udaipur".to_string(),
            origin: "Jaipur".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            budget: None,
            travel_mode: Some("train".to_string()),
            activity_tags: None,
            hotel_preferences: None,
            destination_info: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn legs_are_extracted_from_a_valid_reply() {
        let llm = FixedLlm(
            r#"{"legs": [{"from": "Jaipur", "to": "Udaipur", "from_code": "JP",
                "to_code": "UDZ", "mode": "train", "note": "direct"}]}"#
                .to_string(),
        );
        let legs = suggest_route_legs(&llm, &trip()).await.unwrap();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0]["to_code"], "UDZ");
    }

    #[tokio::test]
    async fn missing_legs_array_is_a_structured_error() {
        let llm = FixedLlm(r#"{"routes": []}"#.to_string());
        let err = suggest_route_legs(&llm, &trip()).await.unwrap_err();
        assert!(err["error"].as_str().unwrap().contains("no legs"));
    }
}
