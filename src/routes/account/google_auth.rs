use actix_web::{http::header, web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::bson::doc;
use mongodb::Client;
use oauth2::AuthorizationCode;
use std::sync::Arc;

use crate::models::account::{Settings, User, UserPreferences};
use crate::models::google_auth::GoogleAuthCallbackParams;
use crate::routes::account::auth::generate_token;
use crate::services::google_auth_service::{
    create_google_oauth_client, exchange_code_for_token, get_google_auth_url, get_google_user_info,
};

// Initiate Google OAuth flow
pub async fn google_auth_init() -> impl Responder {
    let client = create_google_oauth_client();
    let (auth_url, _csrf_token) = get_google_auth_url(&client);

    // The CSRF token rides through the OAuth state parameter; a stricter
    // deployment would pin it to a session cookie as well.
    HttpResponse::Found()
        .insert_header((header::LOCATION, auth_url.to_string()))
        .finish()
}

// Handle Google OAuth callback
pub async fn google_auth_callback(
    data: web::Data<Arc<Client>>,
    query: web::Query<GoogleAuthCallbackParams>,
) -> impl Responder {
    if let Some(error) = &query.error {
        eprintln!("OAuth error received: {}", error);
        return HttpResponse::BadRequest().body(format!("OAuth error: {}", error));
    }

    let client = create_google_oauth_client();
    let code = AuthorizationCode::new(query.code.clone());

    let access_token = match exchange_code_for_token(&client, code).await {
        Ok(token) => token,
        Err(e) => {
            eprintln!("Failed to exchange code for token: {}", e);
            return HttpResponse::InternalServerError().body(format!("Token error: {}", e));
        }
    };

    let user_info = match get_google_user_info(&access_token).await {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Failed to get user info: {}", e);
            return HttpResponse::InternalServerError().body(format!("User info error: {}", e));
        }
    };

    let db_client = data.into_inner();
    let collection: mongodb::Collection<User> = db_client.database("Account").collection("Users");

    let filter = doc! { "email": &user_info.email };
    let now = Utc::now();

    match collection.find_one(filter.clone()).await {
        Ok(Some(existing_user)) => {
            let update = doc! {
                "$set": {
                    "last_signin": now.to_rfc3339(),
                    "failed_signins": 0
                }
            };

            if let Err(err) = collection.update_one(filter, update).await {
                eprintln!("Failed to update user sign-in info: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to update user");
            }

            let user_id = match existing_user.id {
                Some(id) => id,
                None => return HttpResponse::InternalServerError().body("User record is corrupt"),
            };

            match generate_token(&existing_user.email, user_id) {
                Ok(token) => redirect_with_token(&token),
                Err(_) => HttpResponse::InternalServerError().body("Failed to generate token"),
            }
        }
        Ok(None) => {
            let new_user = User {
                id: None,
                email: user_info.email,
                // No password for accounts created through Google
                password: bcrypt::hash("", bcrypt::DEFAULT_COST).unwrap_or("".to_string()),
                first_name: user_info.given_name,
                last_name: user_info.family_name,
                picture: user_info.picture,
                customer_id: None,
                last_signin: Some(now),
                failed_signins: Some(0),
                created_at: Some(now),
                updated_at: Some(now),
            };

            match collection.insert_one(&new_user).await {
                Ok(result) => {
                    let user_id = match result.inserted_id.as_object_id() {
                        Some(id) => id,
                        None => {
                            return HttpResponse::InternalServerError()
                                .body("Failed to create user")
                        }
                    };

                    seed_defaults(&db_client, user_id).await;

                    match generate_token(&new_user.email, user_id) {
                        Ok(token) => redirect_with_token(&token),
                        Err(_) => {
                            HttpResponse::InternalServerError().body("Failed to generate token")
                        }
                    }
                }
                Err(err) => {
                    eprintln!("Failed to create user: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to create user")
                }
            }
        }
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Database error")
        }
    }
}

fn redirect_with_token(token: &str) -> HttpResponse {
    let frontend_url =
        std::env::var("FRONTEND_URL").unwrap_or("http://localhost:3000".to_string());
    let redirect_url = format!("{}/?token={}", frontend_url, token);

    HttpResponse::Found()
        .insert_header((header::LOCATION, redirect_url))
        .finish()
}

async fn seed_defaults(client: &Client, user_id: mongodb::bson::oid::ObjectId) {
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
