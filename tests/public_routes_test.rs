mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::{get_test_email, get_test_password, TestApp};

#[actix_rt::test]
#[serial]
async fn test_health_endpoint() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
#[serial]
async fn test_signup_rejects_invalid_email() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&json!({
            "email": "not-an-email",
            "password": get_test_password()
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], json!(false));
    assert_eq!(body["status_code"], json!(400));
}

#[actix_rt::test]
#[serial]
async fn test_signin_with_bad_credentials() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(&json!({
            "email": get_test_email(),
            "password": "wrong_password"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_google_auth_redirects() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/auth/google").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 302);

    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(location.contains("accounts.google.com"));
}

#[actix_rt::test]
#[serial]
async fn test_search_endpoints_return_envelope() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for uri in [
        "/api/search/trains?from=NDLS&to=BCT&date=2026-09-10",
        "/api/search/buses?from=Delhi&to=Jaipur&date=2026-09-10",
        "/api/search/hotels?city=Jaipur&checkin=2026-09-10&checkout=2026-09-12",
        "/api/search/stations?q=del",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200, "unexpected status for {}", uri);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["status"].is_boolean());
        assert!(body["status_code"].is_number());
    }
}

#[actix_rt::test]
#[serial]
async fn test_stripe_webhook_requires_signature() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/payments/webhook")
        .set_json(&json!({
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_test_123" } }
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}
