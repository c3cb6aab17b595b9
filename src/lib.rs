pub mod db;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
