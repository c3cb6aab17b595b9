use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client,
};
use std::time::Duration;

/// TTL for aggregator search caches. Entries are never invalidated on
/// write; staleness within the window is an accepted tradeoff.
pub const SEARCH_CACHE_TTL_SECS: u64 = 600;

pub async fn create_redis_manager(redis_url: &str) -> ConnectionManager {
    println!("Connecting to Redis...");

    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(2)
        .set_connection_timeout(Duration::from_secs(5));

    let client = Client::open(redis_url).expect("REDIS_URL may be incorrect! Failed to parse.");
    client
        .get_connection_manager_with_config(config)
        .await
        .expect("Failed to connect to Redis")
}

/// Cache lookup. A miss and a Redis error look the same to the caller; the
/// cache is a pure optimization layer.
pub async fn cache_get(conn: &ConnectionManager, key: &str) -> Option<String> {
    let mut conn = conn.clone();
    match conn.get::<_, Option<String>>(key).await {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Redis GET failed for {}: {}", key, e);
            None
        }
    }
}

pub async fn cache_set(conn: &ConnectionManager, key: &str, value: &str, ttl_secs: u64) {
    let mut conn = conn.clone();
    if let Err(e) = conn.set_ex::<_, _, ()>(key, value, ttl_secs).await {
        eprintln!("Redis SETEX failed for {}: {}", key, e);
    }
}
