//! HTTP handlers for the Products API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError,
    errors::responses::{
        BadRequestDecodeResponse, BadRequestIdResponse, InternalServerErrorResponse,
        NotFoundResponse, ValidationErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductError;
use crate::extract::{ProductId, ProductJson};
use crate::models::{FieldError, Product, ProductInput, validate};
use crate::service::ProductOperations;

const LIST_FAILED: &str = "Failed to list the products";
const CREATE_FAILED: &str = "Failed to create product";
const GET_FAILED: &str = "Failed to get product";
const UPDATE_FAILED: &str = "Failed to update product";
const DELETE_FAILED: &str = "Failed to delete product";

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, ProductInput, FieldError),
        responses(
            BadRequestIdResponse,
            BadRequestDecodeResponse,
            ValidationErrorResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router.
///
/// Update is reachable through both `PUT` and `POST` on `/{id}`.
pub fn router<S: ProductOperations + 'static>(service: S) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products::<S>).post(create_product::<S>))
        .route(
            "/{id}",
            get(get_product::<S>)
                .put(update_product::<S>)
                .post(update_product::<S>)
                .delete(delete_product::<S>),
        )
        .with_state(shared_service)
}

/// Mount the products router under `prefix`.
///
/// `{prefix}/` carries an empty id, which the nested router cannot see, so
/// it is answered here with a missing id error for every product method.
pub fn nest_at<S: ProductOperations + 'static>(prefix: &str, service: S) -> Router {
    Router::new().nest(prefix, router(service)).route(
        &format!("{prefix}/"),
        get(missing_id).put(missing_id).post(missing_id).delete(missing_id),
    )
}

async fn missing_id() -> ProductError {
    ProductError::MissingId
}

fn check(input: &ProductInput) -> Result<(), ProductError> {
    let errors = validate(input);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ProductError::Validation(errors))
    }
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "Live products ordered by id", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<S: ProductOperations>(
    State(service): State<Arc<S>>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = service
        .get_all_products()
        .await
        .map_err(|e| e.into_app_error(LIST_FAILED))?;

    Ok(Json(products))
}

/// Create a product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestDecodeResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<S: ProductOperations>(
    State(service): State<Arc<S>>,
    ProductJson(input): ProductJson<ProductInput>,
) -> Result<impl IntoResponse, AppError> {
    check(&input)?;

    let product = service
        .create_product(input)
        .await
        .map_err(|e| e.into_app_error(CREATE_FAILED))?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<S: ProductOperations>(
    State(service): State<Arc<S>>,
    ProductId(id): ProductId,
) -> Result<Json<Product>, AppError> {
    let product = service
        .get_product_by_id(id)
        .await
        .map_err(|e| e.into_app_error(GET_FAILED))?;

    Ok(Json(product))
}

/// Update a product.
///
/// Empty strings and a zero price leave the stored value untouched; the
/// merged product must still pass validation.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<S: ProductOperations>(
    State(service): State<Arc<S>>,
    ProductId(id): ProductId,
    ProductJson(input): ProductJson<ProductInput>,
) -> Result<Json<Product>, AppError> {
    let mut product = service
        .get_product_by_id(id)
        .await
        .map_err(|e| e.into_app_error(GET_FAILED))?;

    product.apply_update(input);
    check(&ProductInput::from(&product))?;

    let updated = service
        .update_product(product)
        .await
        .map_err(|e| e.into_app_error(UPDATE_FAILED))?;

    Ok(Json(updated))
}

/// Soft-delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted, or already absent"),
        (status = 400, response = BadRequestIdResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<S: ProductOperations>(
    State(service): State<Arc<S>>,
    ProductId(id): ProductId,
) -> Result<StatusCode, AppError> {
    service
        .delete_product(id)
        .await
        .map_err(|e| e.into_app_error(DELETE_FAILED))?;

    Ok(StatusCode::NO_CONTENT)
}
