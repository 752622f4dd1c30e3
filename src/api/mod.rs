//! HTTP API for uploading documents and asking questions about them

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

#[cfg(test)]
mod api_tests;

pub use handlers::AppState;
pub use routes::api_routes;
pub use server::build_app;
pub use server::serve_api;
