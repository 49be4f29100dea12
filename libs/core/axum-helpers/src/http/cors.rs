use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

/// Creates the CORS layer for API services.
///
/// With an explicit allow-list only those origins are accepted. With an empty
/// list the request `Origin` is mirrored back, which behaves like `*` but stays
/// valid together with `Access-Control-Allow-Credentials`.
///
/// The layer allows:
/// - Methods: GET, POST, PUT, DELETE
/// - Headers: Origin, Content-Type, Accept, Authorization, Content-Length
/// - Credentials
/// - 1 hour max age
///
/// # Errors
/// Returns `InvalidInput` if an origin is not a valid header value.
pub fn create_cors_layer(allowed_origins: &[String]) -> io::Result<CorsLayer> {
    let allow_origin = if allowed_origins.is_empty() {
        info!("CORS configured to mirror any request origin");
        AllowOrigin::mirror_request()
    } else {
        let origins = allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
                )
            })?;

        info!("CORS configured with allowed origins: {}", allowed_origins.join(","));
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_LENGTH,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_cors_layer_with_allow_list() {
        let origins = vec!["http://localhost:3000".to_string()];
        assert!(create_cors_layer(&origins).is_ok());
    }

    #[test]
    fn test_create_cors_layer_mirrors_when_empty() {
        assert!(create_cors_layer(&[]).is_ok());
    }

    #[test]
    fn test_create_cors_layer_rejects_invalid_origin() {
        let origins = vec!["http://bad\norigin".to_string()];
        let err = create_cors_layer(&origins).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
