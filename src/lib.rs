pub mod clients;
pub mod config;
pub mod gateway;
pub mod models;
pub mod router;
pub mod status_api;
pub mod telemetry;
pub mod transport;
pub mod worker;
