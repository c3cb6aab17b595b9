use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpResponse, Responder};
use std::sync::Arc;

use tripforge_api::db::mongo::create_mongo_client;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = create_mongo_client(&mongo_uri).await;

        Self { client }
    }

    /// Mirrors the real route tree with stub handlers so route shape and
    /// auth behavior can be asserted without Mongo, Redis or Stripe running.
    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(signup))
                            .route("/signin", web::post().to(signin))
                            .route("/google", web::get().to(google_oauth))
                            .route("/session", web::get().to(unauthorized_handler)),
                    )
                    .service(
                        web::scope("/search")
                            .route("/trains", web::get().to(empty_search))
                            .route("/buses", web::get().to(empty_search))
                            .route("/hotels", web::get().to(empty_search))
                            .route("/stations", web::get().to(empty_search)),
                    )
                    .route("/payments/webhook", web::post().to(stripe_webhook))
                    .service(
                        web::scope("/account")
                            .route("/preferences", web::get().to(unauthorized_handler))
                            .route("/preferences", web::put().to(unauthorized_handler))
                            .route("/settings", web::get().to(unauthorized_handler))
                            .route("/settings", web::put().to(unauthorized_handler)),
                    )
                    .service(
                        web::scope("/trips")
                            .route("", web::post().to(unauthorized_handler))
                            .route("", web::get().to(unauthorized_handler))
                            .route("/{id}", web::get().to(unauthorized_handler))
                            .route("/{id}", web::put().to(unauthorized_handler))
                            .route("/{id}", web::delete().to(unauthorized_handler))
                            .route("/{id}/itinerary", web::get().to(unauthorized_handler))
                            .route("/{id}/itinerary", web::delete().to(unauthorized_handler))
                            .route("/{id}/travel-options", web::get().to(unauthorized_handler))
                            .route("/{id}/travel-options", web::put().to(unauthorized_handler))
                            .route(
                                "/{id}/payment-session",
                                web::post().to(unauthorized_handler),
                            ),
                    )
                    .service(
                        web::scope("/payments")
                            .route("/capture", web::post().to(unauthorized_handler)),
                    ),
            )
    }
}

// Stub handlers, response shapes match the real ones.

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

async fn empty_search() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": true,
        "data": { "options": [] },
        "message": "ok",
        "status_code": 200
    }))
}

async fn signin() -> impl Responder {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "status": false,
        "data": null,
        "message": "Invalid credentials",
        "status_code": 401
    }))
}

async fn signup() -> impl Responder {
    HttpResponse::BadRequest().json(serde_json::json!({
        "status": false,
        "data": null,
        "message": "Invalid email address",
        "status_code": 400
    }))
}

async fn google_oauth() -> impl Responder {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "https://accounts.google.com/o/oauth2/v2/auth"))
        .finish()
}

async fn stripe_webhook() -> impl Responder {
    HttpResponse::BadRequest().body("Missing stripe-signature header")
}

async fn unauthorized_handler() -> impl Responder {
    HttpResponse::Unauthorized().json(serde_json::json!({"error": "Unauthorized"}))
}

pub fn get_test_email() -> String {
    "test@example.com".to_string()
}

pub fn get_test_password() -> String {
    "testpassword123".to_string()
}
