use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::errors::{AppError, ErrorCode};
use crate::http::create_cors_layer;
use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::get,
};
use core_config::server::ServerConfig;
use std::any::Any;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, warn};
use utoipa::OpenApi;

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - API routes nested under `/api`
/// - `probes` (health/readiness) merged at the root
/// - OpenAPI document at `/api-docs/openapi.json` and the Scalar UI at `/scalar`
/// - Request tracing, panic recovery and CORS
/// - JSON 404/405 fallbacks
///
/// # Errors
/// Returns `InvalidInput` if a configured CORS origin is not a valid header value.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum_helpers::server::{create_router, health_router};
/// use core_config::{app_info, server::ServerConfig};
///
/// let api_routes = Router::new().nest("/v1/products", products_router);
/// let router = create_router::<ApiDoc>(api_routes, health_router(app_info!()), &ServerConfig::default())?;
/// ```
pub fn create_router<T>(
    apis: Router,
    probes: Router,
    server_config: &ServerConfig,
) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_scalar::{Scalar, Servable as ScalarServable};

    let cors_layer = create_cors_layer(&server_config.cors_allowed_origins)?;

    let router = Router::new()
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .route("/api-docs/openapi.json", get(|| async { Json(T::openapi()) }))
        .nest("/api", apis)
        .merge(probes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer);

    Ok(router)
}

/// Turn a handler panic into a JSON 500 so the connection survives.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(panic = %detail, "Request handler panicked");
    AppError::InternalServerError(ErrorCode::InternalError.default_message().to_string())
        .into_response()
}

/// Production-ready server with coordinated shutdown and cleanup.
///
/// Binds `server_config.address()`, serves until SIGINT/SIGTERM, lets in-flight
/// requests finish, then runs `cleanup` bounded by `shutdown_timeout`.
///
/// # Example
/// ```ignore
/// use std::time::Duration;
/// use axum_helpers::server::create_production_app;
///
/// let cleanup = async move {
///     if let Err(e) = database::postgres::close(db).await {
///         tracing::error!("Failed to close database: {}", e);
///     }
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(server_config.address()).await?;
    serve_until_shutdown(listener, router, ShutdownCoordinator::new(), shutdown_timeout, cleanup)
        .await
}

/// Serve on an already bound listener until `coordinator` signals shutdown.
pub async fn serve_until_shutdown<F>(
    listener: TcpListener,
    router: Router,
    coordinator: ShutdownCoordinator,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Server starting on {}", listener.local_addr()?);

    let signal = coordinator.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { signal.wait_for_signal().await })
        .await
        .inspect_err(|e| {
            error!("Server encountered an error: {:?}", e);
        });

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}
