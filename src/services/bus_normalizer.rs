use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::travel::{BusOption, FareStats};

/// Project raw bus records onto the internal shape. Records without an
/// operator or fare are dropped; other malformed fields default.
pub fn normalize_buses(raw: &[Value]) -> Vec<BusOption> {
    raw.iter().filter_map(normalize_bus).collect()
}

fn normalize_bus(record: &Value) -> Option<BusOption> {
    let operator = record
        .get("operator")
        .or_else(|| record.get("travels"))
        .and_then(Value::as_str)?
        .to_string();
    let fare = number_field(record, &["fare", "price", "min_fare"])?;

    Some(BusOption {
        operator,
        bus_type: record
            .get("bus_type")
            .or_else(|| record.get("busType"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        departure_time: record
            .get("departure_time")
            .or_else(|| record.get("departureTime"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        arrival_time: record
            .get("arrival_time")
            .or_else(|| record.get("arrivalTime"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        duration: record
            .get("duration")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        fare,
        seats_available: record
            .get("seats_available")
            .or_else(|| record.get("availableSeats"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32,
        rating: record.get("rating").and_then(Value::as_f64),
    })
}

fn number_field(record: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match record.get(key) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => {
                if let Ok(parsed) = s.trim().replace(',', "").parse::<f64>() {
                    return Some(parsed);
                }
            }
            _ => {}
        }
    }
    None
}

/// Minutes in a "8h 30m" style duration. Either part may be missing.
pub fn bus_duration_minutes(duration: &str) -> Option<u32> {
    let re = Regex::new(r"(?:(\d+)\s*h)?\s*(?:(\d+)\s*m)?").ok()?;
    let caps = re.captures(duration.trim())?;
    let hours: u32 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let minutes: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    if hours == 0 && minutes == 0 {
        return None;
    }
    Some(hours * 60 + minutes)
}

pub fn get_cheapest_buses(data: &[BusOption], limit: usize) -> Vec<BusOption> {
    let mut sorted: Vec<BusOption> = data.to_vec();
    sorted.sort_by(|a, b| a.fare.partial_cmp(&b.fare).unwrap_or(std::cmp::Ordering::Equal));
    sorted.truncate(limit);
    sorted
}

pub fn get_fastest_buses(data: &[BusOption], limit: usize) -> Vec<BusOption> {
    let mut sorted: Vec<BusOption> = data.to_vec();
    sorted.sort_by_key(|b| bus_duration_minutes(&b.duration).unwrap_or(u32::MAX));
    sorted.truncate(limit);
    sorted
}

/// Keep only buses departing in the requested window. Departure times are
/// "HH:MM"; a time that does not parse fails the filter.
pub fn filter_by_departure_window(data: &[BusOption], window: &str) -> Vec<BusOption> {
    let (start, end) = match window {
        "morning" => (5, 12),
        "afternoon" => (12, 17),
        "evening" => (17, 21),
        "night" => (21, 29), // wraps past midnight to 05:00
        _ => return data.to_vec(),
    };

    data.iter()
        .filter(|bus| {
            let hour = match departure_hour(&bus.departure_time) {
                Some(h) => h,
                None => return false,
            };
            let h = if window == "night" && hour < 5 { hour + 24 } else { hour };
            h >= start && h < end
        })
        .cloned()
        .collect()
}

fn departure_hour(time: &str) -> Option<u32> {
    let (hour, _) = time.trim().split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    if hour < 24 {
        Some(hour)
    } else {
        None
    }
}

/// Fare reduction grouped by bus type; types with zero samples are omitted.
pub fn get_fare_stats_by_type(data: &[BusOption]) -> HashMap<String, FareStats> {
    let mut grouped: HashMap<String, Vec<f64>> = HashMap::new();
    for bus in data {
        grouped.entry(bus.bus_type.clone()).or_default().push(bus.fare);
    }

    let mut stats = HashMap::new();
    for (bus_type, mut fares) in grouped {
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
            bus_type,
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bus(operator: &str, departure: &str, duration: &str, fare: f64) -> BusOption {
        BusOption {
            operator: operator.to_string(),
            bus_type: "AC Sleeper".to_string(),
            departure_time: departure.to_string(),
            arrival_time: "05:30".to_string(),
            duration: duration.to_string(),
            fare,
            seats_available: 12,
            rating: Some(4.2),
        }
    }

    #[test]
    fn duration_parses_both_parts() {
        assert_eq!(bus_duration_minutes("8h 30m"), Some(510));
        assert_eq!(bus_duration_minutes("45m"), Some(45));
        assert_eq!(bus_duration_minutes("10h"), Some(600));
        assert_eq!(bus_duration_minutes("whenever"), None);
    }

    #[test]
    fn night_window_wraps_past_midnight() {
        let data = vec![
            bus("a", "22:15", "6h", 500.0),
            bus("b", "01:30", "6h", 500.0),
            bus("c", "09:00", "6h", 500.0),
        ];
        let night = filter_by_departure_window(&data, "night");
        assert_eq!(night.len(), 2);
        let morning = filter_by_departure_window(&data, "morning");
        assert_eq!(morning.len(), 1);
        assert_eq!(morning[0].operator, "c");
    }

    #[test]
    fn cheapest_is_sorted_ascending() {
        let data = vec![
            bus("a", "10:00", "6h", 800.0),
            bus("b", "10:00", "6h", 450.0),
            bus("c", "10:00", "6h", 600.0),
        ];
        let cheapest = get_cheapest_buses(&data, 2);
        assert_eq!(cheapest.len(), 2);
        assert_eq!(cheapest[0].operator, "b");
        assert_eq!(cheapest[1].operator, "c");
    }

    #[test]
    fn normalize_drops_records_without_fare() {
        let raw = vec![
            json!({ "operator": "Sharma Travels", "fare": "1,150", "duration": "9h 10m" }),
            json!({ "operator": "No Fare Lines" }),
        ];
        let buses = normalize_buses(&raw);
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].fare, 1150.0);
        assert_eq!(buses[0].seats_available, 0);
    }

    #[test]
    fn fare_stats_grouped_by_bus_type() {
        let mut a = bus("a", "10:00", "6h", 400.0);
        a.bus_type = "Seater".to_string();
        let b = bus("b", "10:00", "6h", 800.0);
        let c = bus("c", "10:00", "6h", 1000.0);
        let stats = get_fare_stats_by_type(&[a, b, c]);
        assert_eq!(stats["Seater"].count, 1);
        assert_eq!(stats["AC Sleeper"].mean, 900.0);
        assert!(!stats.contains_key("Volvo"));
    }
}
