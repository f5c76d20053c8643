//! HTTP API surface
//!
//! Thin axum layer over the controllers and the store. Every failure
//! maps to a retryable response; nothing here can take the process down.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
