pub mod account;
pub mod health;
pub mod itinerary;
pub mod payment;
pub mod preferences;
pub mod search;
pub mod settings;
pub mod travel_options;
pub mod trip;
