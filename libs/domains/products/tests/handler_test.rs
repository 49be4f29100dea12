//! Handler tests for the Products domain
//!
//! Drives the products router end to end over the in-memory repository:
//! - Request decoding and id parsing
//! - Status codes and JSON bodies
//! - Soft delete and partial update behaviour

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use domain_products::*;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

const CHARMANDER_DESCRIPTION: &str = "It has a preference for hot things. When it rains, steam is said to spout from the tip of its tail.";

fn app(repo: &InMemoryProductRepository) -> Router {
    handlers::router(ProductService::new(repo.clone()))
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn seed(repo: &InMemoryProductRepository, title: &str, price: Decimal) -> Product {
    repo.create(ProductInput {
        title: title.to_string(),
        description: CHARMANDER_DESCRIPTION.to_string(),
        price,
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_create_product_returns_201() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo)
        .oneshot(json_request(
            "POST",
            "/",
            json!({
                "title": "Charmander",
                "description": CHARMANDER_DESCRIPTION,
                "price": 1093.45
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let product: Product = json_body(response.into_body()).await;
    assert!(product.id > 0);
    assert_eq!(product.title, "Charmander");
    assert_eq!(product.price, Decimal::new(109345, 2));
    assert!(product.deleted_at.is_none());

    let stored = repo.get_by_id(product.id).await.unwrap();
    assert_eq!(stored, product);
}

#[tokio::test]
async fn test_create_assigns_fresh_ids() {
    let repo = InMemoryProductRepository::new();
    let body = json!({"title": "Charmander", "description": "Fire", "price": 1.5});

    let first: Product = json_body(
        app(&repo)
            .oneshot(json_request("POST", "/", body.clone()))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    let second: Product = json_body(
        app(&repo)
            .oneshot(json_request("POST", "/", body))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_create_missing_fields_is_422_not_400() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo)
        .oneshot(json_request("POST", "/", json!({"title": "Squirtle"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], 1001);
    assert_eq!(
        body["message"],
        "Key: 'Product.Description' Error:Field validation for 'Description' failed on the 'required' tag\n\
         Key: 'Product.Price' Error:Field validation for 'Price' failed on the 'required' tag"
    );
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_malformed_json_is_400() {
    let repo = InMemoryProductRepository::new();

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"title": "Charmander", "#))
        .unwrap();
    let response = app(&repo).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Failed to decode product data");
    assert_eq!(body["error"], "JSON_EXTRACTION");
}

#[tokio::test]
async fn test_create_wrong_type_is_400() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo)
        .oneshot(json_request(
            "POST",
            "/",
            json!({"title": "Charmander", "description": "Fire", "price": "cheap"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_without_content_type_is_400() {
    let repo = InMemoryProductRepository::new();

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::from(r#"{"title":"Charmander","description":"Fire","price":2}"#))
        .unwrap();
    let response = app(&repo).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_products_in_id_order() {
    let repo = InMemoryProductRepository::new();
    seed(&repo, "Bulbasaur", Decimal::new(9999, 2)).await;
    seed(&repo, "Charmander", Decimal::new(109345, 2)).await;

    let response = app(&repo).oneshot(empty_request("GET", "/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let products: Vec<Product> = json_body(response.into_body()).await;
    let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Bulbasaur", "Charmander"]);
}

#[tokio::test]
async fn test_list_empty_is_empty_array() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo).oneshot(empty_request("GET", "/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_get_unknown_product_is_404() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo).oneshot(empty_request("GET", "/999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_get_non_numeric_id_is_400() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo).oneshot(empty_request("GET", "/abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Invalid product ID");
}

#[tokio::test]
async fn test_delete_then_get_is_404() {
    let repo = InMemoryProductRepository::new();
    let product = seed(&repo, "Charmander", Decimal::new(109345, 2)).await;
    let uri = format!("/{}", product.id);

    let response = app(&repo).oneshot(empty_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());

    let response = app(&repo).oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app(&repo).oneshot(empty_request("GET", "/")).await.unwrap();
    let products: Vec<Product> = json_body(response.into_body()).await;
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let repo = InMemoryProductRepository::new();

    for _ in 0..2 {
        let response = app(&repo)
            .oneshot(empty_request("DELETE", "/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn test_partial_update_keeps_unsupplied_fields() {
    let repo = InMemoryProductRepository::new();
    let original = seed(&repo, "Charmander", Decimal::new(109345, 2)).await;

    let response = app(&repo)
        .oneshot(json_request(
            "PUT",
            &format!("/{}", original.id),
            json!({"price": 1200}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let updated: Product = json_body(response.into_body()).await;
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.title, "Charmander");
    assert_eq!(updated.description, CHARMANDER_DESCRIPTION);
    assert_eq!(updated.price, Decimal::new(1200, 0));
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);
}

#[tokio::test]
async fn test_update_via_post_route() {
    let repo = InMemoryProductRepository::new();
    let original = seed(&repo, "Charmander", Decimal::new(109345, 2)).await;

    let response = app(&repo)
        .oneshot(json_request(
            "POST",
            &format!("/{}", original.id),
            json!({"title": "Charmeleon"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated: Product = json_body(response.into_body()).await;
    assert_eq!(updated.title, "Charmeleon");
}

#[tokio::test]
async fn test_update_negative_price_is_422() {
    let repo = InMemoryProductRepository::new();
    let original = seed(&repo, "Charmander", Decimal::new(109345, 2)).await;

    let response = app(&repo)
        .oneshot(json_request(
            "PUT",
            &format!("/{}", original.id),
            json!({"price": -5}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(repo.get_by_id(original.id).await.unwrap(), original);
}

#[tokio::test]
async fn test_update_unknown_product_is_404() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo)
        .oneshot(json_request("PUT", "/41", json!({"title": "Mew"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_malformed_body_is_400() {
    let repo = InMemoryProductRepository::new();
    let original = seed(&repo, "Charmander", Decimal::new(109345, 2)).await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/{}", original.id))
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let response = app(&repo).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Failed to decode product data");
}

#[tokio::test]
async fn test_create_sub_cent_price_is_422() {
    for price in [0.001, 0.005] {
        let repo = InMemoryProductRepository::new();

        let response = app(&repo)
            .oneshot(json_request(
                "POST",
                "/",
                json!({"title": "Charmander", "description": "Fire", "price": price}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{price}");

        let body: Value = json_body(response.into_body()).await;
        assert_eq!(
            body["message"],
            "Key: 'Product.Price' Error:Field validation for 'Price' failed on the 'decimals' tag"
        );
        assert!(repo.get_all().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_update_sub_cent_price_is_422() {
    for price in [0.001, 0.005] {
        let repo = InMemoryProductRepository::new();
        let original = seed(&repo, "Charmander", Decimal::new(109345, 2)).await;

        let response = app(&repo)
            .oneshot(json_request(
                "PUT",
                &format!("/{}", original.id),
                json!({"price": price}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{price}");
        assert_eq!(repo.get_by_id(original.id).await.unwrap(), original);
    }
}

#[tokio::test]
async fn test_create_price_as_string_is_400() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo)
        .oneshot(json_request(
            "POST",
            "/",
            json!({"title": "Charmander", "description": "Fire", "price": "12.5"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Failed to decode product data");
}

#[tokio::test]
async fn test_create_null_price_is_422() {
    let repo = InMemoryProductRepository::new();

    let response = app(&repo)
        .oneshot(json_request(
            "POST",
            "/",
            json!({"title": "Charmander", "description": "Fire", "price": null}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(
        body["message"],
        "Key: 'Product.Price' Error:Field validation for 'Price' failed on the 'required' tag"
    );
}
