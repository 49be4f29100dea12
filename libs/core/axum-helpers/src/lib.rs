//! # Axum Helpers
//!
//! Shared building blocks for the workspace's Axum services.
//!
//! ## Modules
//!
//! - **[`server`]**: Router assembly, health/readiness, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS)
//! - **[`errors`]**: Structured JSON error responses with error codes
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//! use std::time::Duration;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = ServerConfig::default();
//!     let router = create_router::<ApiDoc>(Router::new(), health_router(app_info!()), &config)?;
//!     create_production_app(router, &config, Duration::from_secs(30), async {}).await
//! }
//! ```

pub mod errors;
pub mod http;
pub mod server;

// Re-export server types
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, serve_until_shutdown, shutdown_signal,
};

// Re-export HTTP middleware
pub use http::create_cors_layer;

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};
