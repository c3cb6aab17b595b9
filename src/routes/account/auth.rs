use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::WriteError;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::account::{Settings, User, UserPreferences, UserSession};
use crate::models::response::ApiResponse;

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SigninInput {
    pub email: String,
    pub password: String,
}

pub async fn signup(data: web::Data<Arc<Client>>, input: web::Json<SignupInput>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    if !is_valid_email(&input.email) {
        return HttpResponse::BadRequest().json(ApiResponse::error("Invalid email address", 400));
    }
    if input.password.len() < 8 {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("Password must be at least 8 characters", 400));
    }

    let curr_time = Utc::now();
    let input = input.into_inner();

    let user = User {
        id: None,
        email: input.email,
        password: bcrypt::hash(&input.password, bcrypt::DEFAULT_COST).unwrap_or("".to_string()),
        first_name: input.first_name,
        last_name: input.last_name,
        picture: None,
        customer_id: None,
        last_signin: None,
        failed_signins: Some(0),
        created_at: Some(curr_time),
        updated_at: Some(curr_time),
    };

    match collection.insert_one(&user).await {
        Ok(result) => {
            let user_id = match result.inserted_id.as_object_id() {
                Some(id) => id,
                None => {
                    return HttpResponse::InternalServerError()
                        .json(ApiResponse::error("Failed to create user", 500))
                }
            };

            insert_account_defaults(&client, user_id).await;

            match generate_token(&user.email, user_id) {
                Ok(token) => HttpResponse::Ok().json(ApiResponse::ok(
                    json!({ "auth_token": token, "user_id": user_id.to_string() }),
                    "Account created",
                )),
                Err(_) => HttpResponse::InternalServerError()
                    .json(ApiResponse::error("Token generation failed", 500)),
            }
        }
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(error_info) => match error_info {
                mongodb::error::WriteFailure::WriteError(WriteError { code, .. }) => {
                    if code == 11000 {
                        HttpResponse::Conflict().json(ApiResponse::error("User already exists", 409))
                    } else {
                        println!("Error code: {}", code);
                        HttpResponse::InternalServerError()
                            .json(ApiResponse::error("Failed to create user", 500))
                    }
                }
                _ => HttpResponse::InternalServerError()
                    .json(ApiResponse::error("Failed to create user", 500)),
            },
            _ => HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to create user", 500)),
        },
    }
}

/// Seeds preferences and settings for a fresh account. Failures are
/// logged but do not fail the signup, GET falls back to defaults anyway.
async fn insert_account_defaults(client: &Client, user_id: ObjectId) {
    let prefs: mongodb::Collection<UserPreferences> =
        client.database("Account").collection("Preferences");
    if let Err(err) = prefs.insert_one(UserPreferences::defaults_for(user_id)).await {
        eprintln!("Failed to seed preferences for {}: {}", user_id, err);
    }

    let settings: mongodb::Collection<Settings> =
        client.database("Account").collection("Settings");
    if let Err(err) = settings.insert_one(Settings::defaults_for(user_id)).await {
        eprintln!("Failed to seed settings for {}: {}", user_id, err);
    }
}

pub async fn signin(data: web::Data<Arc<Client>>, input: web::Json<SigninInput>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let input = input.into_inner();
    let email = input.email;

    let filter = doc! { "email": &email };

    match collection.find_one(filter).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
                let update = doc! {
                    "$set": {
                        "last_signin": Utc::now().to_rfc3339(),
                        "failed_signins": 0
                    }
                };

                match collection.update_one(doc! { "email": &email }, update).await {
                    Ok(_) => {
                        let user_id = match user.id {
                            Some(id) => id,
                            None => {
                                return HttpResponse::InternalServerError()
                                    .json(ApiResponse::error("Failed to sign in", 500))
                            }
                        };
                        match generate_token(&email, user_id) {
                            Ok(token) => HttpResponse::Ok().json(ApiResponse::ok(
                                json!({ "auth_token": token, "user_id": user_id.to_string() }),
                                "Signed in",
                            )),
                            Err(_) => HttpResponse::InternalServerError()
                                .json(ApiResponse::error("Token generation failed", 500)),
                        }
                    }
                    Err(err) => {
                        eprintln!("Failed to update document: {:?}", err);
                        HttpResponse::InternalServerError()
                            .json(ApiResponse::error("Failed to sign in", 500))
                    }
                }
            } else {
                let failed_signins = user.failed_signins.unwrap_or(0) + 1;
                let update = doc! {
                    "$set": { "failed_signins": failed_signins }
                };

                match collection.update_one(doc! { "email": &email }, update).await {
                    Ok(_) => HttpResponse::Unauthorized()
                        .json(ApiResponse::error("Invalid credentials", 401)),
                    Err(err) => {
                        eprintln!("Failed to update failed signins: {:?}", err);
                        HttpResponse::InternalServerError()
                            .json(ApiResponse::error("Failed to process signin", 500))
                    }
                }
            }
        }
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::error("User not found", 404)),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to process signin", 500))
        }
    }
}

pub async fn user_session(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(ApiResponse::error("Invalid user ID", 400)),
    };

    match collection.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => {
            let session = UserSession {
                id: user.id.unwrap_or_default(),
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                created_at: user.created_at,
            };
            HttpResponse::Ok().json(ApiResponse::ok(session, "Session"))
        }
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::error("User not found", 404)),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to fetch user", 500))
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    match re {
        Ok(re) => re.is_match(email),
        Err(_) => false,
    }
}

pub fn generate_token(
    email: &str,
    user_id: ObjectId,
) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        user_id: user_id.to_string(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("rides@example.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.co.in"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@domain.com"));
    }
}
