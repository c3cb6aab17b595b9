use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::travel::{AvailabilityStatus, FareStats, TrainOption};

/// Class codes we track fares and availability for. Anything else in the
/// aggregator payload is discarded.
pub const TRAIN_CLASSES: [&str; 5] = ["SL", "3A", "2A", "1A", "CC"];

/// Project raw aggregator records onto the internal train shape, discarding
/// unused fields. Malformed numeric fields are skipped silently; a record
/// with no usable times at all is dropped.
pub fn normalize_trains(raw: &[Value]) -> Vec<TrainOption> {
    raw.iter().filter_map(normalize_train).collect()
}

fn normalize_train(record: &Value) -> Option<TrainOption> {
    let train_number = string_field(record, &["train_number", "trainNumber", "number"])?;
    let train_name =
        string_field(record, &["train_name", "trainName", "name"]).unwrap_or_default();
    let departure_time = string_field(record, &["departure_time", "departureTime", "from_std"])?;
    let arrival_time = string_field(record, &["arrival_time", "arrivalTime", "to_sta"])?;
    let duration = string_field(record, &["duration", "travel_time"]).unwrap_or_default();

    let mut fares = HashMap::new();
    let mut availability = HashMap::new();
    for class in TRAIN_CLASSES {
        if let Some(fare) = record
            .get("fares")
            .and_then(|f| f.get(class))
            .and_then(as_f64)
        {
            fares.insert(class.to_string(), fare);
        }
        if let Some(status) = record
            .get("availability")
            .and_then(|a| a.get(class))
            .and_then(Value::as_str)
        {
            availability.insert(class.to_string(), parse_availability(status));
        }
    }

    Some(TrainOption {
        train_number,
        train_name,
        departure_time,
        arrival_time,
        duration,
        fares,
        availability,
    })
}

fn string_field(record: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = record.get(key).and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// Numbers may arrive as JSON numbers or as numeric strings ("1,245" with
/// thousands separators included). Anything else is treated as absent.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

/// Decide bookable vs not from the aggregator's status vocabulary.
///
/// A status containing "AVAILABLE" is bookable unless it also carries a
/// waitlist marker ("WL", which covers "RLWL"/"GNWL" too) or is literally
/// "NOT AVAILABLE". Seat counts come from the numeric suffix in
/// "AVAILABLE-<N>"; a missing or malformed count is just absent.
pub fn parse_availability(status: &str) -> AvailabilityStatus {
    let upper = status.to_uppercase();
    let waitlisted = upper.contains("WL");
    let bookable =
        upper.contains("AVAILABLE") && !waitlisted && !upper.contains("NOT AVAILABLE");

    let seats = if bookable {
        Regex::new(r"AVAILABLE[-\s]*0*(\d+)")
            .ok()
            .and_then(|re| re.captures(&upper))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    } else {
        None
    };

    AvailabilityStatus {
        raw: status.to_string(),
        bookable,
        seats,
    }
}

/// Minutes in an "HH:MM" duration string. None for anything malformed.
pub fn duration_minutes(duration: &str) -> Option<u32> {
    let (hours, minutes) = duration.trim().split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    Some(hours * 60 + minutes)
}

/// Fastest `limit` trains by duration. Stable sort, so ties keep their
/// insertion order; unparseable durations sink to the end.
pub fn get_fastest_trains(data: &[TrainOption], limit: usize) -> Vec<TrainOption> {
    let mut sorted: Vec<TrainOption> = data.to_vec();
    sorted.sort_by_key(|t| duration_minutes(&t.duration).unwrap_or(u32::MAX));
    sorted.truncate(limit);
    sorted
}

/// Cheapest `limit` trains for a given class. Trains with no fare for that
/// class are excluded rather than treated as free.
pub fn get_cheapest_trains(data: &[TrainOption], class: &str, limit: usize) -> Vec<TrainOption> {
    let mut priced: Vec<TrainOption> = data
        .iter()
        .filter(|t| t.fares.contains_key(class))
        .cloned()
        .collect();
    priced.sort_by(|a, b| {
        let fa = a.fares.get(class).copied().unwrap_or(f64::MAX);
        let fb = b.fares.get(class).copied().unwrap_or(f64::MAX);
        fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
    });
    priced.truncate(limit);
    priced
}

/// Per-class mean/median/min/max/count across all options. Classes with
/// zero samples are omitted from the output mapping.
pub fn get_average_class_fares(data: &[TrainOption]) -> HashMap<String, FareStats> {
    let mut stats = HashMap::new();

    for class in TRAIN_CLASSES {
        let mut fares: Vec<f64> = data.iter().filter_map(|t| t.fares.get(class)).copied().collect();
        if fares.is_empty() {
            continue;
        }
        fares.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = fares.len();
        let sum: f64 = fares.iter().sum();
        let median = if count % 2 == 1 {
            fares[count / 2]
        } else {
            (fares[count / 2 - 1] + fares[count / 2]) / 2.0
        };

        stats.insert(
            class.to_string(),
            FareStats {
                mean: sum / count as f64,
                median,
                min: fares[0],
                max: fares[count - 1],
                count,
            },
        );
    }

    stats
}

/// Only the options where at least one class is actually bookable.
pub fn filter_bookable(data: &[TrainOption]) -> Vec<TrainOption> {
    data.iter()
        .filter(|t| t.availability.values().any(|a| a.bookable))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn train(number: &str, duration: &str, sl_fare: Option<f64>) -> TrainOption {
        let mut fares = HashMap::new();
        if let Some(f) = sl_fare {
            fares.insert("SL".to_string(), f);
        }
        TrainOption {
            train_number: number.to_string(),
            train_name: format!("Express {}", number),
            departure_time: "06:10".to_string(),
            arrival_time: "14:25".to_string(),
            duration: duration.to_string(),
            fares,
            availability: HashMap::new(),
        }
    }

    #[test]
    fn availability_with_seat_count_is_bookable() {
        let status = parse_availability("AVAILABLE-0042");
        assert!(status.bookable);
        assert_eq!(status.seats, Some(42));
    }

    #[test]
    fn waitlisted_statuses_are_not_bookable() {
        for raw in ["WL/15", "RLWL-3", "GNWL22/WL11"] {
            let status = parse_availability(raw);
            assert!(!status.bookable, "{} should not be bookable", raw);
            assert_eq!(status.seats, None);
        }
    }

    #[test]
    fn not_available_is_not_bookable_despite_substring() {
        let status = parse_availability("NOT AVAILABLE");
        assert!(!status.bookable);
    }

    #[test]
    fn available_without_count_has_no_seats() {
        let status = parse_availability("AVAILABLE");
        assert!(status.bookable);
        assert_eq!(status.seats, None);
    }

    #[test]
    fn fastest_trains_sorted_and_truncated() {
        let data = vec![
            train("1", "10:30", None),
            train("2", "08:15", None),
            train("3", "12:00", None),
            train("4", "08:15", None),
            train("5", "09:45", None),
        ];
        let fastest = get_fastest_trains(&data, 3);
        assert_eq!(fastest.len(), 3);
        assert_eq!(fastest[0].train_number, "2");
        // stable: the 08:15 tie keeps insertion order
        assert_eq!(fastest[1].train_number, "4");
        assert_eq!(fastest[2].train_number, "5");
    }

    #[test]
    fn malformed_duration_sinks_to_the_end() {
        let data = vec![train("1", "garbage", None), train("2", "02:00", None)];
        let fastest = get_fastest_trains(&data, 2);
        assert_eq!(fastest[0].train_number, "2");
    }

    #[test]
    fn average_fares_omit_empty_classes() {
        let data = vec![
            train("1", "10:00", Some(400.0)),
            train("2", "10:00", Some(600.0)),
            train("3", "10:00", None),
        ];
        let stats = get_average_class_fares(&data);
        let sl = stats.get("SL").expect("SL should be present");
        assert_eq!(sl.count, 2);
        assert_eq!(sl.mean, 500.0);
        assert_eq!(sl.median, 500.0);
        assert_eq!(sl.min, 400.0);
        assert_eq!(sl.max, 600.0);
        // no 1A/2A/3A/CC samples anywhere
        assert!(!stats.contains_key("1A"));
        assert!(!stats.contains_key("CC"));
    }

    #[test]
    fn median_of_odd_sample_is_middle_value() {
        let data = vec![
            train("1", "10:00", Some(100.0)),
            train("2", "10:00", Some(900.0)),
            train("3", "10:00", Some(300.0)),
        ];
        let stats = get_average_class_fares(&data);
        assert_eq!(stats["SL"].median, 300.0);
    }

    #[test]
    fn cheapest_excludes_trains_without_the_class() {
        let data = vec![
            train("1", "10:00", Some(750.0)),
            train("2", "10:00", None),
            train("3", "10:00", Some(250.0)),
        ];
        let cheapest = get_cheapest_trains(&data, "SL", 5);
        assert_eq!(cheapest.len(), 2);
        assert_eq!(cheapest[0].train_number, "3");
    }

    #[test]
    fn normalize_skips_malformed_fares_silently() {
        let raw = vec![json!({
            "train_number": "12951",
            "train_name": "Rajdhani",
            "departure_time": "16:25",
            "arrival_time": "08:15",
            "duration": "15:50",
            "fares": { "SL": "oops", "3A": "2,245", "2A": 3065 },
            "availability": { "3A": "AVAILABLE-12", "2A": "RLWL/4" }
        })];
        let options = normalize_trains(&raw);
        assert_eq!(options.len(), 1);
        let t = &options[0];
        assert!(!t.fares.contains_key("SL"));
        assert_eq!(t.fares["3A"], 2245.0);
        assert_eq!(t.fares["2A"], 3065.0);
        assert!(t.availability["3A"].bookable);
        assert_eq!(t.availability["3A"].seats, Some(12));
        assert!(!t.availability["2A"].bookable);
    }

    #[test]
    fn normalize_drops_records_without_times() {
        let raw = vec![json!({ "train_number": "123" })];
        assert!(normalize_trains(&raw).is_empty());
    }
}
