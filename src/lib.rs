pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod features;
pub mod handlers;
pub mod query;
pub mod state;
pub mod tasks;
pub mod templates_structs;
