//! Stateless HTTP surface for the pdfsmith transform engine.
//!
//! Every endpoint is a single request/response transformation: multipart
//! file bytes in, transformed bytes out. Nothing is persisted and no state
//! is shared between requests.

pub mod error;
pub mod handlers;
pub mod models;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Whole files are buffered in memory on both sides, so cap request bodies
/// well above typical document sizes.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Build the service router.
pub fn app() -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Transform endpoints
        .route("/api/pdf/upload", post(handlers::upload))
        .route("/api/pdf/combine", post(handlers::combine))
        .route("/api/pdf/add-watermark", post(handlers::add_watermark))
        .route("/api/pdf/convert", post(handlers::convert))
        // Add middleware
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
