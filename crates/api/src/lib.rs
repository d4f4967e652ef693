//! HTTP API layer for cidadao-ativo.
//!
//! - **Endpoints**: accounts, service requests, officials, reference data, uploads
//! - **Extractors**: authentication and envelope-aware JSON/path/query parsing
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
