//! Payment repository: joined listings, status updates, and aggregates.
//!
//! Listings always join the order and customer so the caller can display
//! who paid. Search runs inside the query, ahead of pagination, so counts
//! and page sizes stay correct.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use saltbox_core::{CustomerId, Email, OrderId, PaymentIntentId, PaymentStatus};

use super::RepositoryError;
use crate::models::payment::{CustomerInfo, OrderInfo, PaymentIntent, PaymentWithOrder};
use crate::query::{PageParams, Sort};

/// Joined select shared by every read path.
const SELECT_JOINED: &str = "SELECT p.id, p.intent_id, p.order_id, p.total_amount, p.status, \
     p.created_at, p.updated_at, \
     o.created_at AS order_created_at, \
     c.id AS customer_id, c.name AS customer_name, \
     c.email AS customer_email, c.phone AS customer_phone \
     FROM payment_intents p \
     JOIN orders o ON o.id = p.order_id \
     JOIN customers c ON c.id = o.customer_id";

const COUNT_JOINED: &str = "SELECT COUNT(*) \
     FROM payment_intents p \
     JOIN orders o ON o.id = p.order_id \
     JOIN customers c ON c.id = o.customer_id";

/// Filter directives for payment listings.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    /// Inclusive lower bound on creation time.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time (already end-of-day normalized).
    pub end: Option<DateTime<Utc>>,
    /// Case-insensitive substring over customer name/email, the provider's
    /// intent id, and the order id.
    pub search: Option<String>,
}

/// A flat row from the joined select.
#[derive(Debug, sqlx::FromRow)]
struct JoinedRow {
    id: PaymentIntentId,
    intent_id: String,
    order_id: OrderId,
    total_amount: Decimal,
    status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    order_created_at: DateTime<Utc>,
    customer_id: CustomerId,
    customer_name: String,
    customer_email: Email,
    customer_phone: Option<String>,
}

impl From<JoinedRow> for PaymentWithOrder {
    fn from(row: JoinedRow) -> Self {
        Self {
            intent: PaymentIntent {
                id: row.id,
                intent_id: row.intent_id,
                order_id: row.order_id,
                total_amount: row.total_amount,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            order: OrderInfo {
                id: row.order_id,
                created_at: row.order_created_at,
                customer: CustomerInfo {
                    id: row.customer_id,
                    name: row.customer_name,
                    email: row.customer_email,
                    phone: row.customer_phone,
                },
            },
        }
    }
}

/// A per-status aggregate row.
#[derive(Debug, sqlx::FromRow)]
pub struct StatusAggregateRow {
    pub status: PaymentStatus,
    pub count: i64,
    pub amount: Decimal,
}

/// A time-bucketed revenue row.
#[derive(Debug, sqlx::FromRow)]
pub struct TrendRow {
    /// Bucket start as returned by `date_trunc`.
    pub bucket: DateTime<Utc>,
    pub revenue: Decimal,
    pub orders: i64,
}

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List payments matching `filter`, joined with order and customer,
    /// together with the total count of matches across all pages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &PaymentFilter,
        sort: Sort,
        page: PageParams,
    ) -> Result<(Vec<PaymentWithOrder>, i64), RepositoryError> {
        let mut count_query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("{COUNT_JOINED} WHERE TRUE"));
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("{SELECT_JOINED} WHERE TRUE"));
        push_filters(&mut query, filter);
        query.push(format!(
            " ORDER BY p.{} {}",
            sort.column,
            sort.direction.as_sql()
        ));
        query.push(" LIMIT ");
        query.push_bind(page.limit);
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let rows: Vec<JoinedRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Get one payment joined with its order and customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: PaymentIntentId,
    ) -> Result<Option<PaymentWithOrder>, RepositoryError> {
        let row: Option<JoinedRow> = sqlx::query_as(&format!("{SELECT_JOINED} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Set a payment's status and return the joined record, or `None` if
    /// the id does not resolve.
    ///
    /// Any status may be set; there is no transition table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_status(
        &self,
        id: PaymentIntentId,
        status: PaymentStatus,
    ) -> Result<Option<PaymentWithOrder>, RepositoryError> {
        let result =
            sqlx::query("UPDATE payment_intents SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(status)
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Total revenue: the sum over paid records, unbounded by date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_revenue(&self) -> Result<Decimal, RepositoryError> {
        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0) FROM payment_intents WHERE status = 'paid'",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    /// Count and summed amount per status, for statuses present in the data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_aggregates(&self) -> Result<Vec<StatusAggregateRow>, RepositoryError> {
        let rows: Vec<StatusAggregateRow> = sqlx::query_as(
            "SELECT status, COUNT(*) AS count, COALESCE(SUM(total_amount), 0) AS amount \
             FROM payment_intents GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue over paid records since `since`, bucketed by `granularity`
    /// (a `date_trunc` field: `day`, `week`, or `month`), ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_trend(
        &self,
        granularity: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TrendRow>, RepositoryError> {
        let rows: Vec<TrendRow> = sqlx::query_as(
            "SELECT date_trunc($1, created_at) AS bucket, \
                    COALESCE(SUM(total_amount), 0) AS revenue, \
                    COUNT(*) AS orders \
             FROM payment_intents \
             WHERE status = 'paid' AND created_at >= $2 \
             GROUP BY bucket ORDER BY bucket ASC",
        )
        .bind(granularity)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// Append filter clauses shared by the count and select queries.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &PaymentFilter) {
    if let Some(status) = filter.status {
        query.push(" AND p.status = ");
        query.push_bind(status);
    }
    if let Some(start) = filter.start {
        query.push(" AND p.created_at >= ");
        query.push_bind(start);
    }
    if let Some(end) = filter.end {
        query.push(" AND p.created_at <= ");
        query.push_bind(end);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        query.push(" AND (c.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR c.email ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.intent_id ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR o.id::TEXT ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}
