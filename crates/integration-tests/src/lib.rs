//! Integration tests for Saltbox.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p saltbox-cli -- migrate
//! cargo run -p saltbox-cli -- seed
//!
//! # Start the API
//! cargo run -p saltbox-api
//!
//! # Run integration tests
//! cargo test -p saltbox-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `api_products` - Catalog listing grammar and lifecycle rules
//! - `api_payments` - Payment listings, status transitions, analytics
//! - `api_settings` - Public projection and typed partial updates
//!
//! Every test is `#[ignore]`d because it needs a running server (and for
//! the write paths, an authenticated session established out of band).

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Create an HTTP client with a cookie store for session reuse.
///
/// # Panics
///
/// Panics if the client cannot be built; fine in test setup.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
