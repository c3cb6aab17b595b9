use std::future::{ready, Ready};

use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};

use crate::middleware::auth::{AuthRejection, Claims};

/// Identity extractor for handlers behind `AuthMiddleware`. Missing claims
/// mean the route was registered outside the guarded scope; that is a
/// wiring bug, surfaced as a plain 401 envelope.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

impl From<&Claims> for AuthenticatedUser {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            email: claims.sub.clone(),
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<Claims>()
            .map(AuthenticatedUser::from)
            .ok_or_else(|| AuthRejection("Not authenticated").into());
        ready(user)
    }
}
