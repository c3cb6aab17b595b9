use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use redis::aio::ConnectionManager;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(
    client: web::Data<Arc<Client>>,
    redis: web::Data<ConnectionManager>,
) -> impl Responder {
    let mut services = HashMap::new();

    let mongo_status = match client
        .database("Trips")
        .run_command(doc! { "ping": 1 })
        .await
    {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: None,
        },
        Err(e) => ServiceStatus {
            status: "error".to_string(),
            details: Some(e.to_string()),
        },
    };
    services.insert("mongodb".to_string(), mongo_status);

    let mut conn = redis.get_ref().clone();
    let redis_status = match redis::cmd("PING").query_async::<String>(&mut conn).await {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: None,
        },
        Err(e) => ServiceStatus {
            status: "error".to_string(),
            details: Some(e.to_string()),
        },
    };
    services.insert("redis".to_string(), redis_status);

    let degraded = services.values().any(|s| s.status != "ok");
    let health = HealthStatus {
        status: if degraded { "degraded" } else { "ok" }.to_string(),
        services,
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    HttpResponse::Ok().json(health)
}
