//! Payment, order, and customer models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use saltbox_core::{CustomerId, Email, OrderId, PaymentIntentId, PaymentStatus};

/// A payment intent as stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    /// Reference assigned by the external payment provider.
    pub intent_id: String,
    pub order_id: OrderId,
    pub total_amount: Decimal,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer fields surfaced on payment listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
}

/// Order fields surfaced on payment listings, with the customer resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub customer: CustomerInfo,
}

/// A payment intent joined with its order and customer for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithOrder {
    #[serde(flatten)]
    pub intent: PaymentIntent,
    pub order: OrderInfo,
}
