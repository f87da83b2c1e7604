//! Payment administration route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;

use saltbox_core::{Pagination, PaymentIntentId, PaymentStatus, Price};

use crate::analytics::{AnalyticsReport, Period};
use crate::db::settings;
use crate::db::{PaymentFilter, PaymentRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::PaymentWithOrder;
use crate::query::{ListQuery, PAYMENT_PAGE_SIZE, PAYMENT_SORT_FIELDS};
use crate::response::ApiResponse;
use crate::state::AppState;

/// List payments with the shared filter grammar, joined with order and
/// customer. Search covers customer name/email, the provider's intent id,
/// and the order id, and is applied before pagination.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<PaymentWithOrder>>>> {
    let (start, end) = query.date_range();
    let filter = PaymentFilter {
        status: query.status_filter(),
        start,
        end,
        search: query.search_term().map(ToOwned::to_owned),
    };
    let sort = query.sort(PAYMENT_SORT_FIELDS);
    let page = query.page_params(PAYMENT_PAGE_SIZE);

    let repo = PaymentRepository::new(state.pool());
    let (payments, total) = repo.list(&filter, sort, page).await?;

    Ok(Json(ApiResponse::paginated(
        payments,
        Pagination::from_total(page.page, page.limit, total),
    )))
}

/// Analytics period selector.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<String>,
}

/// Revenue analytics: total revenue, per-status breakdown, and the
/// time-bucketed trend for the selected period.
pub async fn analytics(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<AnalyticsReport>>> {
    let period = Period::parse(query.period.as_deref());
    let repo = PaymentRepository::new(state.pool());

    let total_revenue = repo.total_revenue().await?;
    let statuses = repo.status_aggregates().await?;
    let trend = repo
        .revenue_trend(period.granularity(), period.window_start(Utc::now()))
        .await?;

    Ok(Json(ApiResponse::ok(AnalyticsReport::assemble(
        period,
        total_revenue,
        &statuses,
        trend,
    ))))
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// Set a payment's status (admin). Any target status in the enum is legal;
/// there is no transition table. Transitions to paid or refunded notify the
/// customer best-effort.
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<StatusBody>,
) -> Result<Json<ApiResponse<PaymentWithOrder>>> {
    let status: PaymentStatus = body
        .status
        .parse()
        .map_err(|e: String| AppError::Validation(e))?;

    let repo = PaymentRepository::new(state.pool());
    let payment = repo
        .update_status(PaymentIntentId::new(id), status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment {id}")))?;

    tracing::info!(admin = %admin.id, payment = %payment.intent.id, status = %status, "Payment status updated");

    notify_customer(&state, &payment, status).await;

    Ok(Json(ApiResponse::ok(payment)))
}

/// Send the customer a receipt or refund notice where the new status calls
/// for one. Delivery failure is logged and never fails the request.
async fn notify_customer(state: &AppState, payment: &PaymentWithOrder, status: PaymentStatus) {
    if !matches!(status, PaymentStatus::Paid | PaymentStatus::Refunded) {
        return;
    }

    // Amounts are displayed in the site currency.
    let currency = match settings::get(state.pool()).await {
        Ok(settings) => settings.currency,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load settings for notification; skipping email");
            return;
        }
    };
    let amount = Price::new(payment.intent.total_amount, currency).display();
    let customer = &payment.order.customer;

    let delivered = match status {
        PaymentStatus::Paid => {
            state
                .email()
                .try_send_payment_receipt(
                    customer.email.as_str(),
                    &customer.name,
                    &amount,
                    &payment.intent.intent_id,
                )
                .await
        }
        PaymentStatus::Refunded => {
            state
                .email()
                .try_send_refund_notice(
                    customer.email.as_str(),
                    &customer.name,
                    &amount,
                    &payment.intent.intent_id,
                )
                .await
        }
        _ => return,
    };

    if !delivered {
        tracing::warn!(payment = %payment.intent.id, "Customer notification not delivered");
    }
}
