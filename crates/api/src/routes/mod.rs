//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (probes the database)
//!
//! # Products (public reads, owner-gated writes)
//! GET    /products              - Listing (search, category, price range, sort, pagination)
//! POST   /products              - Create (multipart: fields + images)
//! GET    /products/featured     - Featured products
//! GET    /products/flash-sales  - Products with an active flash sale
//! GET    /products/mine         - The authenticated account's products
//! GET    /products/{id}         - Detail
//! PUT    /products/{id}         - Update (owner only; multipart)
//! DELETE /products/{id}         - Delete (owner only)
//!
//! # Payments (admin)
//! GET /payments                 - Listing (status, date range, search, sort, pagination)
//! GET /payments/analytics       - Revenue analytics (period: daily|weekly|monthly)
//! PUT /payments/{id}/status     - Set status
//!
//! # Settings
//! GET /settings/config          - Public safe subset
//! GET /settings/admin           - Full settings (admin)
//! PUT /settings/admin           - Typed partial update (admin)
//! ```

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub mod payments;
pub mod products;
pub mod settings;

/// Assemble the application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Products
        .route("/products", get(products::list).post(products::create))
        .route("/products/featured", get(products::featured))
        .route("/products/flash-sales", get(products::flash_sales))
        .route("/products/mine", get(products::mine))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        // Payments
        .route("/payments", get(payments::list))
        .route("/payments/analytics", get(payments::analytics))
        .route("/payments/{id}/status", put(payments::update_status))
        // Settings
        .route("/settings/config", get(settings::public_config))
        .route(
            "/settings/admin",
            get(settings::admin_get).put(settings::admin_update),
        )
}
