//! Demo data seeding for local development.
//!
//! Inserts a merchant and an admin account, a small catalog, and a spread
//! of payment records across statuses and dates so listings and analytics
//! have something to show. Idempotent: re-running skips existing rows.

use rust_decimal::Decimal;
use sqlx::PgPool;

use saltbox_core::{PaymentStatus, UserRole};

use super::{CommandError, connect};

/// A seed product row.
struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    category: &'static str,
    stock: i32,
    is_featured: bool,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Sea Salt Caramels",
        description: "Small-batch caramels finished with flaky sea salt.",
        price: "14.50",
        category: "confectionery",
        stock: 40,
        is_featured: true,
    },
    SeedProduct {
        name: "Smoked Chili Flakes",
        description: "Oak-smoked chili flakes, medium heat.",
        price: "8.00",
        category: "pantry",
        stock: 120,
        is_featured: false,
    },
    SeedProduct {
        name: "Cold Brew Concentrate",
        description: "1:4 concentrate, single-origin beans.",
        price: "19.00",
        category: "beverages",
        stock: 25,
        is_featured: true,
    },
];

/// Payment seed rows: (intent reference, amount, status, days ago).
const PAYMENTS: &[(&str, &str, &str, i32)] = &[
    ("pi_seed_0001", "43.50", "paid", 2),
    ("pi_seed_0002", "14.50", "paid", 9),
    ("pi_seed_0003", "27.00", "pending", 1),
    ("pi_seed_0004", "19.00", "failed", 5),
    ("pi_seed_0005", "62.00", "paid", 40),
    ("pi_seed_0006", "8.00", "refunded", 20),
];

/// Seed the database.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let merchant_id =
        upsert_user(&pool, "merchant@saltbox.sh", "Demo Merchant", UserRole::Merchant).await?;
    upsert_user(&pool, "admin@saltbox.sh", "Demo Admin", UserRole::Admin).await?;

    for product in PRODUCTS {
        seed_product(&pool, merchant_id, product).await?;
    }

    for (reference, amount, status, days_ago) in PAYMENTS {
        seed_payment(&pool, reference, amount, status, *days_ago).await?;
    }

    tracing::info!("Seed data in place");
    Ok(())
}

async fn upsert_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    role: UserRole,
) -> Result<i32, CommandError> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, name, role) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(email)
    .bind(name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn seed_product(
    pool: &PgPool,
    owner_id: i32,
    product: &SeedProduct,
) -> Result<(), CommandError> {
    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM products WHERE owner_id = $1 AND name = $2")
            .bind(owner_id)
            .bind(product.name)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Ok(());
    }

    let price: Decimal = product.price.parse().unwrap_or_default();
    let product_id: i32 = sqlx::query_scalar(
        "INSERT INTO products (owner_id, name, description, price, category, stock, is_featured) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(owner_id)
    .bind(product.name)
    .bind(product.description)
    .bind(price)
    .bind(product.category)
    .bind(product.stock)
    .bind(product.is_featured)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        "INSERT INTO product_images (product_id, file_id, url, position) \
         VALUES ($1, $2, $3, 0)",
    )
    .bind(product_id)
    .bind(format!("saltbox/seed-{product_id}"))
    .bind(format!("https://img.saltbox.sh/seed-{product_id}.jpg"))
    .execute(pool)
    .await?;

    tracing::info!(product = product.name, "Seeded product");
    Ok(())
}

async fn seed_payment(
    pool: &PgPool,
    reference: &str,
    amount: &str,
    status: &str,
    days_ago: i32,
) -> Result<(), CommandError> {
    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM payment_intents WHERE intent_id = $1")
            .bind(reference)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Ok(());
    }

    let customer_id: i32 = sqlx::query_scalar(
        "INSERT INTO customers (name, email, phone) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind("Casey Buyer")
    .bind(format!("casey+{reference}@example.com"))
    .bind("+1 555 0101")
    .fetch_one(pool)
    .await?;

    let order_id: i32 = sqlx::query_scalar(
        "INSERT INTO orders (customer_id, created_at) \
         VALUES ($1, NOW() - make_interval(days => $2)) RETURNING id",
    )
    .bind(customer_id)
    .bind(days_ago)
    .fetch_one(pool)
    .await?;

    let status: PaymentStatus = status
        .parse()
        .map_err(CommandError::InvalidData)?;

    let total: Decimal = amount.parse().unwrap_or_default();
    sqlx::query(
        "INSERT INTO payment_intents (intent_id, order_id, total_amount, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, NOW() - make_interval(days => $5), NOW())",
    )
    .bind(reference)
    .bind(order_id)
    .bind(total)
    .bind(status)
    .bind(days_ago)
    .execute(pool)
    .await?;

    tracing::info!(reference, status = %status, "Seeded payment");
    Ok(())
}
