use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client as ReqwestClient;
use std::env;
use std::fmt;
use url::Url;

use crate::models::google_auth::GoogleUserInfo;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug)]
pub enum GoogleAuthError {
    ExchangeFailed(String),
    UserInfoFailed(String),
}

impl fmt::Display for GoogleAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoogleAuthError::ExchangeFailed(msg) => write!(f, "code exchange failed: {}", msg),
            GoogleAuthError::UserInfoFailed(msg) => write!(f, "userinfo fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for GoogleAuthError {}

/// Build the OAuth client from the GOOGLE_* environment. Missing
/// configuration is a deployment error, so this panics at call time.
pub fn create_google_oauth_client() -> BasicClient {
    let client_id =
        env::var("GOOGLE_CLIENT_ID").expect("Missing GOOGLE_CLIENT_ID environment variable");
    let client_secret = env::var("GOOGLE_CLIENT_SECRET")
        .expect("Missing GOOGLE_CLIENT_SECRET environment variable");
    let redirect_url =
        env::var("GOOGLE_REDIRECT_URI").expect("Missing GOOGLE_REDIRECT_URI environment variable");

    BasicClient::new(
        ClientId::new(client_id),
        Some(ClientSecret::new(client_secret)),
        AuthUrl::new(GOOGLE_AUTH_URL.to_string()).expect("Invalid authorization endpoint URL"),
        Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string()).expect("Invalid token endpoint URL")),
    )
    .set_redirect_uri(RedirectUrl::new(redirect_url).expect("Invalid redirect URL"))
}

pub fn get_google_auth_url(client: &BasicClient) -> (Url, CsrfToken) {
    client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new("openid".to_string()))
        .add_scope(Scope::new("email".to_string()))
        .add_scope(Scope::new("profile".to_string()))
        .url()
}

pub async fn exchange_code_for_token(
    client: &BasicClient,
    code: AuthorizationCode,
) -> Result<String, GoogleAuthError> {
    let token = client
        .exchange_code(code)
        .request_async(async_http_client)
        .await
        .map_err(|e| GoogleAuthError::ExchangeFailed(e.to_string()))?;

    Ok(token.access_token().secret().clone())
}

pub async fn get_google_user_info(access_token: &str) -> Result<GoogleUserInfo, GoogleAuthError> {
    let response = ReqwestClient::new()
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| GoogleAuthError::UserInfoFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(GoogleAuthError::UserInfoFailed(format!(
            "Google API returned status {}",
            response.status()
        )));
    }

    response
        .json::<GoogleUserInfo>()
        .await
        .map_err(|e| GoogleAuthError::UserInfoFailed(e.to_string()))
}
