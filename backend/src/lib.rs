pub mod api_client;
pub mod config;
pub mod indicators;
pub mod models;
pub mod routes;
pub mod services;
pub mod signals;
pub mod state;
