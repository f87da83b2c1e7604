//! Product repository: filtered listings and lifecycle operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use saltbox_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::product::{ImageRef, NewProduct, Product, ProductImage, ProductPatch,
    ProductWithImages};
use crate::query::{PageParams, Sort};

/// Columns selected for a product row.
const PRODUCT_COLUMNS: &str = "id, owner_id, name, description, price, category, stock, \
     is_featured, is_flash_sale, flash_sale_price, flash_sale_start, flash_sale_end, \
     created_at, updated_at";

/// Filter directives for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring over name OR description OR category.
    pub search: Option<String>,
    /// Case-insensitive substring over category alone.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Restrict to one owner's products.
    pub owner: Option<UserId>,
    /// Restrict to featured products.
    pub featured_only: bool,
    /// Restrict to products with an active flash sale.
    pub flash_sale_only: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, sorted and paginated, together with
    /// the total count of matches across all pages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort: Sort,
        page: PageParams,
    ) -> Result<(Vec<ProductWithImages>, i64), RepositoryError> {
        let mut count_query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM products WHERE TRUE");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));
        push_filters(&mut query, filter);
        query.push(format!(
            " ORDER BY {} {}",
            sort.column,
            sort.direction.as_sql()
        ));
        query.push(" LIMIT ");
        query.push_bind(page.limit);
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let products: Vec<Product> = query.build_query_as().fetch_all(self.pool).await?;
        let with_images = self.attach_images(products).await?;

        Ok((with_images, total))
    }

    /// Get a product with its images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductWithImages>, RepositoryError> {
        let product: Option<Product> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        match product {
            Some(product) => {
                let mut with_images = self.attach_images(vec![product]).await?;
                Ok(with_images.pop())
            }
            None => Ok(None),
        }
    }

    /// Insert a product and its images in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on constraint violations (e.g.
    /// negative stock) and `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        new: &NewProduct,
        images: &[ImageRef],
    ) -> Result<ProductWithImages, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product: Product = sqlx::query_as(&format!(
            "INSERT INTO products \
             (owner_id, name, description, price, category, stock, is_featured, \
              is_flash_sale, flash_sale_price, flash_sale_start, flash_sale_end) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(new.owner_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.category)
        .bind(new.stock)
        .bind(new.is_featured)
        .bind(new.is_flash_sale)
        .bind(new.flash_sale_price)
        .bind(new.flash_sale_start)
        .bind(new.flash_sale_end)
        .fetch_one(&mut *tx)
        .await
        .map_err(check_violation)?;

        let stored = insert_images(&mut tx, product.id, images).await?;

        tx.commit().await?;

        Ok(ProductWithImages {
            product,
            images: stored,
        })
    }

    /// Apply a patch to a product, optionally stamping a fresh flash-sale
    /// window, and return the updated row.
    ///
    /// The caller is responsible for ownership checks and for validating
    /// the flash-sale invariant against the merged values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product vanished, and
    /// `RepositoryError::Database` on other failures.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        flash_sale_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Product, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE products SET updated_at = NOW()");

        if let Some(name) = &patch.name {
            query.push(", name = ");
            query.push_bind(name.clone());
        }
        if let Some(description) = &patch.description {
            query.push(", description = ");
            query.push_bind(description.clone());
        }
        if let Some(price) = patch.price {
            query.push(", price = ");
            query.push_bind(price);
        }
        if let Some(category) = &patch.category {
            query.push(", category = ");
            query.push_bind(category.clone());
        }
        if let Some(stock) = patch.stock {
            query.push(", stock = ");
            query.push_bind(stock);
        }
        if let Some(is_featured) = patch.is_featured {
            query.push(", is_featured = ");
            query.push_bind(is_featured);
        }
        if let Some(is_flash_sale) = patch.is_flash_sale {
            query.push(", is_flash_sale = ");
            query.push_bind(is_flash_sale);
        }
        if let Some(flash_sale_price) = patch.flash_sale_price {
            query.push(", flash_sale_price = ");
            query.push_bind(flash_sale_price);
        }
        if let Some((start, end)) = flash_sale_window {
            query.push(", flash_sale_start = ");
            query.push_bind(start);
            query.push(", flash_sale_end = ");
            query.push_bind(end);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {PRODUCT_COLUMNS}"));

        let product: Option<Product> = query
            .build_query_as()
            .fetch_optional(self.pool)
            .await
            .map_err(check_violation)?;

        product.ok_or(RepositoryError::NotFound)
    }

    /// Replace a product's image set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn replace_images(
        &self,
        id: ProductId,
        images: &[ImageRef],
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let stored = insert_images(&mut tx, id, images).await?;

        tx.commit().await?;
        Ok(stored)
    }

    /// Delete a product; image rows cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Load images for a batch of products and zip them together.
    async fn attach_images(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithImages>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        let images: Vec<ProductImage> = sqlx::query_as(
            "SELECT id, product_id, file_id, url, position \
             FROM product_images WHERE product_id = ANY($1) \
             ORDER BY product_id, position",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_product: HashMap<i32, Vec<ProductImage>> = HashMap::new();
        for image in images {
            by_product
                .entry(image.product_id.as_i32())
                .or_default()
                .push(image);
        }

        Ok(products
            .into_iter()
            .map(|product| ProductWithImages {
                images: by_product.remove(&product.id.as_i32()).unwrap_or_default(),
                product,
            })
            .collect())
    }
}

/// Append filter clauses shared by the count and select queries.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        query.push(" AND (name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR description ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR category ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
    if let Some(category) = &filter.category {
        query.push(" AND category ILIKE ");
        query.push_bind(format!("%{category}%"));
    }
    if let Some(min_price) = filter.min_price {
        query.push(" AND price >= ");
        query.push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        query.push(" AND price <= ");
        query.push_bind(max_price);
    }
    if let Some(owner) = filter.owner {
        query.push(" AND owner_id = ");
        query.push_bind(owner);
    }
    if filter.featured_only {
        query.push(" AND is_featured");
    }
    if filter.flash_sale_only {
        query.push(" AND is_flash_sale AND flash_sale_end > NOW()");
    }
}

/// Insert image rows for a product inside an open transaction.
async fn insert_images(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    product_id: ProductId,
    images: &[ImageRef],
) -> Result<Vec<ProductImage>, RepositoryError> {
    let mut stored = Vec::with_capacity(images.len());
    for (position, image) in images.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| RepositoryError::Conflict("too many images".to_owned()))?;
        let row: ProductImage = sqlx::query_as(
            "INSERT INTO product_images (product_id, file_id, url, position) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, product_id, file_id, url, position",
        )
        .bind(product_id)
        .bind(&image.file_id)
        .bind(&image.url)
        .bind(position)
        .fetch_one(&mut **tx)
        .await?;
        stored.push(row);
    }
    Ok(stored)
}

/// Map check-constraint violations to `Conflict` instead of a bare
/// database error.
fn check_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_check_violation()
    {
        return RepositoryError::Conflict(db_err.message().to_owned());
    }
    RepositoryError::Database(e)
}
