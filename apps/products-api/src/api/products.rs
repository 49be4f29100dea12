//! Products API routes

use axum::Router;
use domain_products::{handlers, PgProductRepository, ProductService};

use crate::state::AppState;

/// Products routes mounted at `prefix`
pub fn router(prefix: &str, state: &AppState) -> Router {
    let repository = PgProductRepository::new(state.db.clone());
    let service = ProductService::new(repository);
    handlers::nest_at(prefix, service)
}
