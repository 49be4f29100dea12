//! Request extractors that reject with [`ProductError`].

use axum::{
    extract::{FromRequest, FromRequestParts, Json, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ProductError;

/// Positive integer `{id}` path segment.
///
/// ```ignore
/// async fn show(ProductId(id): ProductId) -> String {
///     format!("Product {id}")
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub i64);

impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ProductError::MissingId)?;

        parse_product_id(&raw).map(ProductId)
    }
}

/// Parse a raw id segment. Surrounding whitespace is not tolerated.
pub fn parse_product_id(raw: &str) -> Result<i64, ProductError> {
    if raw.is_empty() {
        return Err(ProductError::MissingId);
    }

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ProductError::InvalidId(raw.to_string())),
    }
}

/// JSON body whose every decode failure becomes [`ProductError::Decode`].
pub struct ProductJson<T>(pub T);

impl<T, S> FromRequest<S> for ProductJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ProductError::Decode(rejection.body_text()))?;

        Ok(ProductJson(data))
    }
}
