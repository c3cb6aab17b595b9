use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::sync::Arc;

use tripforge_api::db;
use tripforge_api::middleware;
use tripforge_api::routes;
use tripforge_api::routes::payment::StripeConfig;
use tripforge_api::services::llm_service::LlmClient;
use tripforge_api::services::travel_api_service::TravelApiService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    println!("Got MongoDB URI, attempting connection...");
    let mongo_client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let redis_url = std::env::var("REDIS_URL").expect("REDIS_URL must be set");
    let redis_manager = db::redis::create_redis_manager(&redis_url).await;
    println!("Redis connection established");

    let stripe_secret = std::env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set");
    let stripe_client = Arc::new(stripe::Client::new(stripe_secret));
    let stripe_config = StripeConfig {
        webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
    };

    let llm_client = LlmClient::new().expect("LLM_API_KEY must be set");
    let travel_api = TravelApiService::new(redis_manager.clone());

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(mongo_client.clone()))
            .app_data(web::Data::new(redis_manager.clone()))
            .app_data(web::Data::new(stripe_client.clone()))
            .app_data(web::Data::new(stripe_config.clone()))
            .app_data(web::Data::new(llm_client.clone()))
            .app_data(web::Data::new(travel_api.clone()))
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    // Public routes
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::account::auth::signup))
                            .route("/signin", web::post().to(routes::account::auth::signin))
                            .route(
                                "/google",
                                web::get().to(routes::account::google_auth::google_auth_init),
                            )
                            .route(
                                "/google/callback",
                                web::get().to(routes::account::google_auth::google_auth_callback),
                            )
                            .service(
                                web::scope("").wrap(middleware::auth::AuthMiddleware).route(
                                    "/session",
                                    web::get().to(routes::account::auth::user_session),
                                ),
                            ),
                    )
                    .service(
                        web::scope("/search")
                            .route("/trains", web::get().to(routes::search::search_trains))
                            .route("/buses", web::get().to(routes::search::search_buses))
                            .route("/hotels", web::get().to(routes::search::search_hotels))
                            .route("/stations", web::get().to(routes::search::suggest_stations)),
                    )
                    .route(
                        "/payments/webhook",
                        web::post().to(routes::payment::handle_stripe_webhook),
                    )
                    // Protected routes
                    .service(
                        web::scope("/account")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(
                                "/preferences",
                                web::get().to(routes::preferences::get_preferences),
                            )
                            .route(
                                "/preferences",
                                web::put().to(routes::preferences::update_preferences),
                            )
                            .route("/settings", web::get().to(routes::settings::get_settings))
                            .route(
                                "/settings",
                                web::put().to(routes::settings::update_settings),
                            ),
                    )
                    .service(
                        web::scope("/trips")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route("", web::post().to(routes::trip::create_trip))
                            .route("", web::get().to(routes::trip::get_trips))
                            .route("/{id}", web::get().to(routes::trip::get_trip))
                            .route("/{id}", web::put().to(routes::trip::update_trip))
                            .route("/{id}", web::delete().to(routes::trip::delete_trip))
                            .route(
                                "/{id}/itinerary",
                                web::get().to(routes::itinerary::get_itinerary),
                            )
                            .route(
                                "/{id}/itinerary",
                                web::delete().to(routes::itinerary::delete_itinerary),
                            )
                            .route(
                                "/{id}/travel-options",
                                web::get().to(routes::travel_options::get_travel_options),
                            )
                            .route(
                                "/{id}/travel-options",
                                web::put().to(routes::travel_options::select_travel_option),
                            )
                            .route(
                                "/{id}/payment-session",
                                web::post().to(routes::payment::create_payment_session),
                            ),
                    )
                    .service(
                        web::scope("/payments")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route("/capture", web::post().to(routes::payment::capture_payment)),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
