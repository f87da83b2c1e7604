//! Integration tests for the product catalog.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p saltbox-api)
//! - Seed data (cargo run -p saltbox-cli -- seed)
//!
//! Run with: cargo test -p saltbox-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use saltbox_integration_tests::{api_base_url, client};

// ============================================================================
// List & Pagination Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_list_envelope_shape() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");

    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());

    let pagination = &body["pagination"];
    assert_eq!(pagination["currentPage"], 1);
    assert!(pagination["totalPages"].is_i64());
    assert!(pagination["totalCount"].is_i64());
    assert_eq!(pagination["hasPrev"], false);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_list_pagination_consistency() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/products?page=1&limit=2"))
        .send()
        .await
        .expect("Failed to list products");
    let body: Value = resp.json().await.expect("Failed to parse response");

    let total = body["pagination"]["totalCount"].as_i64().expect("total");
    let total_pages = body["pagination"]["totalPages"].as_i64().expect("pages");

    // totalPages == ceil(total / limit)
    assert_eq!(total_pages, (total + 1) / 2);
    assert_eq!(
        body["pagination"]["hasNext"],
        Value::Bool(1 < total_pages)
    );
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_list_invalid_params_fall_back() {
    let client = client();
    let base_url = api_base_url();

    // Garbage page/limit/sort values must not error
    let resp = client
        .get(format!(
            "{base_url}/products?page=banana&limit=-3&sortBy=owner_id&sortOrder=up"
        ))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["pagination"]["currentPage"], 1);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_category_filter() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/products?category=pantry"))
        .send()
        .await
        .expect("Failed to list products");
    let body: Value = resp.json().await.expect("Failed to parse response");

    for product in body["data"].as_array().expect("array") {
        let category = product["category"].as_str().expect("category");
        assert!(category.to_lowercase().contains("pantry"));
    }
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_product_detail_not_found() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/products/999999"))
        .send()
        .await
        .expect("Failed to get product");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_product_create_requires_authentication() {
    let client = client();
    let base_url = api_base_url();

    let form = reqwest::multipart::Form::new()
        .text("name", "Unauthorized Product")
        .text("price", "10.00")
        .text("category", "pantry")
        .text("stock", "1");

    let resp = client
        .post(format!("{base_url}/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post product");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and an authenticated merchant session"]
async fn test_flash_sale_price_must_undercut_on_create_and_update() {
    let client = client();
    let base_url = api_base_url();

    // Create with a valid flash sale (price 100, sale 80)
    let form = reqwest::multipart::Form::new()
        .text("name", "Flash Sale Probe")
        .text("price", "100.00")
        .text("category", "confectionery")
        .text("stock", "5")
        .text("isFlashSale", "true")
        .text("flashSalePrice", "80.00")
        .part(
            "images",
            reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF])
                .file_name("probe.jpg")
                .mime_str("image/jpeg")
                .expect("mime"),
        );

    let resp = client
        .post(format!("{base_url}/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let id = body["data"]["id"].as_i64().expect("id");
    assert!(body["data"]["flashSaleEnd"].is_string());

    // Raising the sale price above the regular price must be rejected
    let form = reqwest::multipart::Form::new().text("flashSalePrice", "120.00");
    let resp = client
        .put(format!("{base_url}/products/{id}"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to update product");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{base_url}/products/{id}"))
        .send()
        .await
        .expect("Failed to re-read product");
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["flashSalePrice"], "80.00");
}

#[tokio::test]
#[ignore = "Requires running API server and a session that does NOT own the product"]
async fn test_update_by_non_owner_is_forbidden() {
    let client = client();
    let base_url = api_base_url();

    // Product 1 is owned by the seed merchant; this session is someone else
    let form = reqwest::multipart::Form::new().text("name", "Hijacked");
    let resp = client
        .put(format!("{base_url}/products/1"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send update");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The record must be unchanged
    let resp = client
        .get(format!("{base_url}/products/1"))
        .send()
        .await
        .expect("Failed to read product");
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_ne!(body["data"]["name"], "Hijacked");
}
