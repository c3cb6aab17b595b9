pub mod account;
pub mod google_auth;
pub mod itinerary;
pub mod response;
pub mod travel;
pub mod trip;
