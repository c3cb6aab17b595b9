pub mod auth;
pub mod google_auth;
