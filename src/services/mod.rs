pub mod bus_normalizer;
pub mod destination_service;
pub mod google_auth_service;
pub mod hotel_normalizer;
pub mod image_search_service;
pub mod itinerary_ai_service;
pub mod llm_service;
pub mod place_service;
pub mod route_suggestion_service;
pub mod train_normalizer;
pub mod translation_service;
pub mod travel_api_service;
pub mod weather_service;
