//! Air-quality client for AQI
//!
//! Searches places and fetches current readings through the relay.

pub mod client;
pub mod error;
pub mod types;

pub use client::AirQualityClient;
pub use error::ClientError;
pub use types::*;
