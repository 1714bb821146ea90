//! Search-and-select flow for AQI: debounced place search, explicit
//! selection, reading fetch and render-ready view state.

pub mod bridge;
pub mod debounce;
mod error_mapping;
pub mod filter;
pub mod models;
pub mod services;
pub mod view;

pub use models::{SearchEvent, SearchModel};
pub use services::ServiceError;
pub use view::SearchView;
