use actix_web::{http::header, test, web, App, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};
use serial_test::serial;

use tripforge_api::middleware::auth::AuthMiddleware;
use tripforge_api::middleware::auth_context::AuthenticatedUser;
use tripforge_api::models::response::ApiResponse;
use tripforge_api::routes::account::auth::generate_token;

async fn whoami(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::ok(
        json!({ "email": user.email, "user_id": user.user_id }),
        "Session active",
    ))
}

macro_rules! guarded_app {
    () => {
        test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .route("/whoami", web::get().to(whoami)),
            ),
        )
        .await
    };
}

#[actix_rt::test]
#[serial]
async fn missing_authorization_header_gets_envelope_401() {
    std::env::set_var("JWT_SECRET", "test-secret");
    let app = guarded_app!();

    let req = test::TestRequest::get().uri("/api/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], false);
    assert_eq!(body["status_code"], 401);
    assert!(body["message"].is_string());
}

#[actix_rt::test]
#[serial]
async fn garbage_token_gets_envelope_401() {
    std::env::set_var("JWT_SECRET", "test-secret");
    let app = guarded_app!();

    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], false);
    assert_eq!(body["status_code"], 401);
}

#[actix_rt::test]
#[serial]
async fn valid_token_reaches_handler_with_identity() {
    std::env::set_var("JWT_SECRET", "test-secret");
    let app = guarded_app!();

    let user_id = ObjectId::new();
    let token = generate_token("rider@example.com", user_id).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], true);
    assert_eq!(body["data"]["email"], "rider@example.com");
    assert_eq!(body["data"]["user_id"], user_id.to_hex());
}

#[actix_rt::test]
#[serial]
async fn unset_secret_rejects_even_previously_valid_tokens() {
    std::env::set_var("JWT_SECRET", "default_secret");
    let token = generate_token("rider@example.com", ObjectId::new()).unwrap();
    std::env::remove_var("JWT_SECRET");

    let app = guarded_app!();
    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], false);

    std::env::set_var("JWT_SECRET", "test-secret");
}
