use std::fmt;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error, HttpMessage, HttpResponse, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::models::response::ApiResponse;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // email
    pub exp: usize,
    pub iat: usize,
    pub user_id: String,
}

/// Rejection raised by the auth layer. Renders as the standard envelope so
/// 401s look the same as every handler-produced error.
#[derive(Debug)]
pub struct AuthRejection(pub &'static str);

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl ResponseError for AuthRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(ApiResponse::error(self.0, 401))
    }
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, AuthRejection> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or(AuthRejection("Missing Authorization header"))?;
    let value = header
        .to_str()
        .map_err(|_| AuthRejection("Malformed Authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .ok_or(AuthRejection("Authorization header must carry a bearer token"))
}

fn decode_claims(token: &str) -> Result<Claims, AuthRejection> {
    // No fallback secret: an unset JWT_SECRET rejects every token rather
    // than verifying against a known constant.
    let secret = std::env::var("JWT_SECRET").map_err(|_| {
        eprintln!("JWT_SECRET is not set, rejecting token");
        AuthRejection("Token verification unavailable")
    })?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|err| {
            eprintln!("Rejected token: {:?}", err);
            AuthRejection("Invalid token")
        })
}

/// Guards a scope: valid bearer token required, decoded claims stashed in
/// the request extensions for `AuthenticatedUser` to pick up.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match bearer_token(&req).and_then(decode_claims) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(rejection) => Box::pin(ready(Err(rejection.into()))),
        }
    }
}
