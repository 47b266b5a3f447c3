pub mod auth;
pub mod categories;
pub mod config;
pub mod engagement;
pub mod error;
pub mod telemetry;
