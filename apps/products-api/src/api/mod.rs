//! API routes module

pub mod health;
pub mod products;

use axum::{routing::get, Router};
use axum_helpers::server::{create_router, health_router};

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by `create_router`.
pub fn routes(state: &AppState) -> Router {
    Router::new().merge(products::router("/v1/products", state))
}

/// `/ready` with a live database check
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// Full application router: API, probes, docs and middleware
pub fn app(state: &AppState) -> std::io::Result<Router> {
    let probes = health_router(state.config.app).merge(ready_router(state.clone()));
    create_router::<ApiDoc>(routes(state), probes, &state.config.server)
}
