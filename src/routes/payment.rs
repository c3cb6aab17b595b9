use std::{str::FromStr, sync::Arc};

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use stripe::{CapturePaymentIntent, EventObject, EventType, Webhook};

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::response::ApiResponse;
use crate::models::trip::{Payment, Trip};

#[derive(Serialize, Deserialize)]
pub struct PaymentSessionInput {
    pub amount: i64,
    pub currency: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CapturePayment {
    pub payment_intent_id: String,
}

#[derive(Clone)]
pub struct StripeConfig {
    pub webhook_secret: String,
}

fn parse_currency(code: &str) -> Option<stripe::Currency> {
    match code.to_lowercase().as_str() {
        "inr" => Some(stripe::Currency::INR),
        "usd" => Some(stripe::Currency::USD),
        "eur" => Some(stripe::Currency::EUR),
        "gbp" => Some(stripe::Currency::GBP),
        _ => None,
    }
}

/*
    POST /api/trips/{id}/payment-session

    Creates a manual-capture payment intent for the trip and records it,
    so the frontend can confirm and we capture on the webhook.
*/
pub async fn create_payment_session(
    user: AuthenticatedUser,
    path: web::Path<String>,
    mongo: web::Data<Arc<mongodb::Client>>,
    stripe_client: web::Data<Arc<stripe::Client>>,
    input: web::Json<PaymentSessionInput>,
) -> impl Responder {
    println!("Creating payment session...");

    let trip_id_raw = path.into_inner();
    let input = input.into_inner();

    if input.amount <= 0 {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("amount must be positive", 400));
    }
    let currency_code = input.currency.unwrap_or_else(|| "inr".to_string());
    let currency = match parse_currency(&currency_code) {
        Some(c) => c,
        None => {
            return HttpResponse::BadRequest()
                .json(ApiResponse::error("Unsupported currency", 400))
        }
    };

    let (trip_id, user_id) = match (
        ObjectId::parse_str(&trip_id_raw),
        ObjectId::parse_str(&user.user_id),
    ) {
        (Ok(t), Ok(u)) => (t, u),
        _ => return HttpResponse::BadRequest().json(ApiResponse::error("Invalid ID", 400)),
    };

    // The trip must exist and belong to the caller.
    let trips = mongo.database("Trips").collection::<Trip>("Trips");
    match trips
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(ApiResponse::error("Trip not found", 404))
        }
        Err(err) => {
            eprintln!("Failed to load trip for payment: {}", err);
            return HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to load trip", 500));
        }
    }

    let mut create_intent = stripe::CreatePaymentIntent::new(input.amount, currency);
    // Manual, as we capture after confirmation
    create_intent.capture_method = Some(stripe::PaymentIntentCaptureMethod::Manual);
    create_intent.metadata = Some(
        [
            ("trip_id".to_string(), trip_id_raw.clone()),
            ("user_id".to_string(), user.user_id.clone()),
        ]
        .into_iter()
        .collect(),
    );

    let intent = match stripe::PaymentIntent::create(stripe_client.as_ref().as_ref(), create_intent)
        .await
    {
        Ok(intent) => intent,
        Err(e) => {
            println!("Error creating payment intent: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to create payment session", 500));
        }
    };

    let record = Payment {
        id: None,
        trip_id,
        user_id,
        payment_intent_id: intent.id.to_string(),
        amount: input.amount,
        currency: currency_code.to_lowercase(),
        status: "created".to_string(),
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    };

    let payments = mongo.database("Trips").collection::<Payment>("Payments");
    if let Err(err) = payments.insert_one(&record).await {
        eprintln!("Failed to record payment: {}", err);
    }

    HttpResponse::Ok().json(ApiResponse::ok(
        serde_json::json!({
            "payment_intent_id": intent.id.to_string(),
            "client_secret": intent.client_secret,
            "amount": input.amount,
            "currency": record.currency,
        }),
        "Payment session created",
    ))
}

/*
    POST /api/payments/capture
*/
pub async fn capture_payment(
    user: AuthenticatedUser,
    mongo: web::Data<Arc<mongodb::Client>>,
    stripe_client: web::Data<Arc<stripe::Client>>,
    input: web::Json<CapturePayment>,
) -> impl Responder {
    println!("Capturing payment...");

    let input = input.into_inner();
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(ApiResponse::error("Invalid user ID", 400)),
    };

    let payments = mongo.database("Trips").collection::<Payment>("Payments");
    match payments
        .find_one(doc! { "payment_intent_id": &input.payment_intent_id, "user_id": user_id })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(ApiResponse::error("Payment not found", 404))
        }
        Err(err) => {
            eprintln!("Failed to load payment: {}", err);
            return HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to load payment", 500));
        }
    }

    let intent_id = match stripe::PaymentIntentId::from_str(&input.payment_intent_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest()
                .json(ApiResponse::error("Invalid payment intent ID", 400))
        }
    };

    // Retrieve first to check the intent is capturable
    match stripe::PaymentIntent::retrieve(stripe_client.as_ref().as_ref(), &intent_id, &[]).await {
        Ok(intent) => {
            if intent.status != stripe::PaymentIntentStatus::RequiresCapture {
                return HttpResponse::BadRequest().json(ApiResponse::error(
                    &format!(
                        "Payment is not in a capturable state: {:?}",
                        intent.status
                    ),
                    400,
                ));
            }

            match stripe::PaymentIntent::capture(
                stripe_client.as_ref().as_ref(),
                &input.payment_intent_id,
                CapturePaymentIntent::default(),
            )
            .await
            {
                Ok(captured) => {
                    mark_payment_status(&payments, &input.payment_intent_id, "captured").await;
                    HttpResponse::Ok().json(ApiResponse::ok(
                        serde_json::json!({
                            "payment_intent_id": captured.id.to_string(),
                            "status": format!("{:?}", captured.status),
                        }),
                        "Payment captured",
                    ))
                }
                Err(e) => {
                    println!("Error capturing payment: {:?}", e);
                    HttpResponse::InternalServerError()
                        .json(ApiResponse::error("Failed to capture payment", 500))
                }
            }
        }
        Err(e) => {
            println!("Error retrieving payment intent: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to retrieve payment intent", 500))
        }
    }
}

async fn mark_payment_status(
    payments: &mongodb::Collection<Payment>,
    payment_intent_id: &str,
    status: &str,
) {
    let result = payments
        .update_one(
            doc! { "payment_intent_id": payment_intent_id },
            doc! { "$set": {
                "status": status,
                "updated_at": Utc::now().to_rfc3339(),
            }},
        )
        .await;
    if let Err(err) = result {
        eprintln!("Failed to update payment status: {}", err);
    }
}

/*
    POST /api/payments/webhook
*/
pub async fn handle_stripe_webhook(
    req: HttpRequest,
    payload: web::Bytes,
    mongo: web::Data<Arc<mongodb::Client>>,
    stripe_config: web::Data<StripeConfig>,
) -> impl Responder {
    let signature = match req.headers().get("stripe-signature") {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            return HttpResponse::BadRequest().body("Missing stripe-signature header");
        }
    };

    let payload_str = match String::from_utf8(payload.to_vec()) {
        Ok(s) => s,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid payload encoding");
        }
    };

    let event =
        match Webhook::construct_event(&payload_str, signature, &stripe_config.webhook_secret) {
            Ok(event) => event,
            Err(e) => {
                println!("Webhook error: {:?}", e);
                return HttpResponse::BadRequest().body(format!("Webhook error: {}", e));
            }
        };

    let payments = mongo.database("Trips").collection::<Payment>("Payments");

    match event.type_ {
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                mark_payment_status(&payments, payment_intent.id.as_str(), "succeeded").await;
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                println!("Payment failed: {}", payment_intent.id);
                mark_payment_status(&payments, payment_intent.id.as_str(), "failed").await;
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        _ => {
            println!("Unhandled event type: {:?}", event.type_);
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
    }
}
