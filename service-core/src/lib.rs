//! service-core: Shared infrastructure for the billing services.
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod observability;

pub use axum;
pub use serde;
pub use serde_json;
pub use tracing;
