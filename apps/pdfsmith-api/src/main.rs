//! pdfsmith API server - stateless PDF transforms over HTTP
//!
//! Provides REST endpoints for:
//! - Upload acknowledgement
//! - Combining multiple PDFs into one
//! - Watermarking every page
//! - Converting to DOCX or a PNG archive

use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pdfsmith_api=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let app = pdfsmith_api::app();

    // Parse bind address
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting pdfsmith API on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
