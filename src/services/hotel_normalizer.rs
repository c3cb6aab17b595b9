use serde_json::Value;
use std::collections::HashMap;

use crate::models::travel::{HotelOption, LocalityStats};

/// Project raw hotel records onto the internal shape. Name and nightly
/// price are required; everything else defaults.
pub fn normalize_hotels(raw: &[Value]) -> Vec<HotelOption> {
    raw.iter().filter_map(normalize_hotel).collect()
}

fn normalize_hotel(record: &Value) -> Option<HotelOption> {
    let name = record
        .get("name")
        .or_else(|| record.get("hotel_name"))
        .and_then(Value::as_str)?
        .to_string();
    let price_per_night = match record
        .get("price_per_night")
        .or_else(|| record.get("price"))
        .or_else(|| record.get("rate"))
    {
        Some(Value::Number(n)) => n.as_f64()?,
        Some(Value::String(s)) => s.trim().replace(',', "").parse().ok()?,
        _ => return None,
    };

    Some(HotelOption {
        name,
        locality: record
            .get("locality")
            .or_else(|| record.get("area"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        star_rating: record
            .get("star_rating")
            .or_else(|| record.get("stars"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32,
        price_per_night,
        rating: record
            .get("rating")
            .or_else(|| record.get("user_rating"))
            .and_then(Value::as_f64),
        image_url: record
            .get("image_url")
            .or_else(|| record.get("image"))
            .and_then(Value::as_str)
            .map(String::from),
    })
}

/// Price-band and star filter. `None` bounds are open.
pub fn filter_hotels(
    data: &[HotelOption],
    max_price: Option<f64>,
    min_star: Option<u32>,
) -> Vec<HotelOption> {
    data.iter()
        .filter(|h| max_price.map_or(true, |p| h.price_per_night <= p))
        .filter(|h| min_star.map_or(true, |s| h.star_rating >= s))
        .cloned()
        .collect()
}

/// Average nightly price per locality, cheapest locality first. Localities
/// with zero samples never appear.
pub fn group_by_locality(data: &[HotelOption]) -> Vec<LocalityStats> {
    let mut grouped: HashMap<String, Vec<f64>> = HashMap::new();
    for hotel in data {
        grouped
            .entry(hotel.locality.clone())
            .or_default()
            .push(hotel.price_per_night);
    }

    let mut stats: Vec<LocalityStats> = grouped
        .into_iter()
        .filter(|(_, prices)| !prices.is_empty())
        .map(|(locality, prices)| LocalityStats {
            locality,
            average_price: prices.iter().sum::<f64>() / prices.len() as f64,
            count: prices.len(),
        })
        .collect();

    stats.sort_by(|a, b| {
        a.average_price
            .partial_cmp(&b.average_price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stats
}

pub fn get_cheapest_hotels(data: &[HotelOption], limit: usize) -> Vec<HotelOption> {
    let mut sorted: Vec<HotelOption> = data.to_vec();
    sorted.sort_by(|a, b| {
        a.price_per_night
            .partial_cmp(&b.price_per_night)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hotel(name: &str, locality: &str, stars: u32, price: f64) -> HotelOption {
        HotelOption {
            name: name.to_string(),
            locality: locality.to_string(),
            star_rating: stars,
            price_per_night: price,
            rating: None,
            image_url: None,
        }
    }

    #[test]
    fn filter_applies_price_and_star_bounds() {
        let data = vec![
            hotel("a", "center", 3, 2500.0),
            hotel("b", "center", 5, 9000.0),
            hotel("c", "suburb", 2, 1200.0),
        ];
        let filtered = filter_hotels(&data, Some(5000.0), Some(3));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "a");
    }

    #[test]
    fn locality_groups_sorted_cheapest_first() {
        let data = vec![
            hotel("a", "center", 3, 4000.0),
            hotel("b", "center", 4, 6000.0),
            hotel("c", "suburb", 3, 1500.0),
        ];
        let stats = group_by_locality(&data);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].locality, "suburb");
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[1].average_price, 5000.0);
    }

    #[test]
    fn normalize_accepts_alternate_keys() {
        let raw = vec![json!({
            "hotel_name": "The Grand",
            "area": "Civil Lines",
            "stars": 4,
            "rate": "3,499",
            "user_rating": 4.4
        })];
        let hotels = normalize_hotels(&raw);
        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].locality, "Civil Lines");
        assert_eq!(hotels[0].price_per_night, 3499.0);
    }

    #[test]
    fn normalize_drops_unpriced_records() {
        let raw = vec![json!({ "name": "Mystery Lodge" })];
        assert!(normalize_hotels(&raw).is_empty());
    }
}
