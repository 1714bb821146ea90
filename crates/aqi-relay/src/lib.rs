//! CORS relay for AQI
//!
//! Forwards requests whose path embeds a destination URL to that destination,
//! attaching the API key so callers never hold it.

pub mod destination;
pub mod error;
pub mod forwarder;
pub mod server;

pub use error::RelayError;
pub use forwarder::{Forwarder, RelayRequest, RelayResponse};
pub use server::{bind, routes, serve};
