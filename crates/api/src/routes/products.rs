//! Product route handlers.
//!
//! Create and update accept multipart forms: scalar fields alongside
//! uploaded image files (`images`). On update, `existingImages` carries the
//! JSON list of image descriptors to retain.

use std::collections::{HashMap, HashSet};

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use rust_decimal::Decimal;

use saltbox_core::{Pagination, ProductId};

use crate::db::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::product::{
    ImageRef, NewProduct, ProductPatch, ProductWithImages, flash_sale_window,
    resolve_image_update, validate_flash_sale,
};
use crate::query::{ListQuery, PRODUCT_PAGE_SIZE, PRODUCT_SORT_FIELDS};
use crate::response::ApiResponse;
use crate::state::AppState;

// =============================================================================
// Listings
// =============================================================================

/// Public product listing with the shared filter grammar.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductWithImages>>>> {
    let filter = base_filter(&query);
    run_listing(&state, filter, &query).await
}

/// Featured products.
pub async fn featured(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductWithImages>>>> {
    let filter = ProductFilter {
        featured_only: true,
        ..base_filter(&query)
    };
    run_listing(&state, filter, &query).await
}

/// Products with a currently active flash sale.
pub async fn flash_sales(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductWithImages>>>> {
    let filter = ProductFilter {
        flash_sale_only: true,
        ..base_filter(&query)
    };
    run_listing(&state, filter, &query).await
}

/// The authenticated account's own products.
pub async fn mine(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductWithImages>>>> {
    let filter = ProductFilter {
        owner: Some(user.id),
        ..base_filter(&query)
    };
    run_listing(&state, filter, &query).await
}

/// Public product detail.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProductWithImages>>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ApiResponse::ok(product)))
}

fn base_filter(query: &ListQuery) -> ProductFilter {
    let (min_price, max_price) = query.price_range();
    ProductFilter {
        search: query.search_term().map(ToOwned::to_owned),
        category: query.category_filter().map(ToOwned::to_owned),
        min_price,
        max_price,
        ..ProductFilter::default()
    }
}

async fn run_listing(
    state: &AppState,
    filter: ProductFilter,
    query: &ListQuery,
) -> Result<Json<ApiResponse<Vec<ProductWithImages>>>> {
    let sort = query.sort(PRODUCT_SORT_FIELDS);
    let page = query.page_params(PRODUCT_PAGE_SIZE);

    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, sort, page)
        .await?;

    Ok(Json(ApiResponse::paginated(
        products,
        Pagination::from_total(page.page, page.limit, total),
    )))
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Create a product (authenticated owner).
///
/// Requires the scalar fields and at least one uploaded image. Images go to
/// object storage before anything is persisted; an upload failure fails the
/// whole operation.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ProductWithImages>>)> {
    let form = read_form(multipart).await?;

    let name = require_field(&form.fields, "name")?;
    let category = require_field(&form.fields, "category")?;
    let price = parse_decimal(&require_field(&form.fields, "price")?, "price")?;
    let stock = parse_stock(&require_field(&form.fields, "stock")?)?;
    let description = form.fields.get("description").cloned().unwrap_or_default();
    let is_featured = bool_field(&form.fields, "isFeatured").unwrap_or(false);
    let is_flash_sale = bool_field(&form.fields, "isFlashSale").unwrap_or(false);
    let flash_sale_price = form
        .fields
        .get("flashSalePrice")
        .map(|v| parse_decimal(v, "flashSalePrice"))
        .transpose()?;

    validate_flash_sale(is_flash_sale, price, flash_sale_price)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if form.files.is_empty() {
        return Err(AppError::Validation(
            "at least one product image is required".to_string(),
        ));
    }

    let (flash_sale_start, flash_sale_end) = is_flash_sale
        .then(|| flash_sale_window(Utc::now()))
        .unzip();

    let images = upload_all(&state, form.files).await?;

    let new = NewProduct {
        owner_id: user.id,
        name,
        description,
        price,
        category,
        stock,
        is_featured,
        is_flash_sale,
        flash_sale_price,
        flash_sale_start,
        flash_sale_end,
    };

    let product = ProductRepository::new(state.pool())
        .create(&new, &images)
        .await?;

    tracing::info!(owner = %user.id, product = %product.product.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(product, "Product created")),
    ))
}

/// Update a product (owner only).
///
/// Scalar fields merge over the existing row; the flash-sale invariant is
/// re-checked against the merged values. The image set is replaced by the
/// retained descriptors plus any new uploads; when both are empty the
/// existing images stay untouched.
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProductWithImages>>> {
    let id = ProductId::new(id);
    let repo = ProductRepository::new(state.pool());

    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    if existing.product.owner_id != user.id {
        return Err(AppError::Forbidden(
            "only the owner may modify this product".to_string(),
        ));
    }

    let form = read_form(multipart).await?;
    let patch = patch_from_fields(&form.fields)?;

    patch
        .validate_against(&existing.product)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let window = patch
        .activates_flash_sale(&existing.product)
        .then(|| flash_sale_window(Utc::now()));

    // Uploads happen before any row changes so an upload failure leaves the
    // product untouched.
    let uploaded = upload_all(&state, form.files).await?;
    let retained = form.existing_images.unwrap_or_default();

    let product = repo.update(id, &patch, window).await?;

    let images = match resolve_image_update(retained, uploaded) {
        Some(images) => {
            let replaced = repo.replace_images(id, &images).await?;
            cleanup_dropped(&state, &existing.images, &images).await;
            replaced
        }
        None => existing.images,
    };

    tracing::info!(owner = %user.id, product = %id, "Product updated");

    Ok(Json(ApiResponse::ok_with_message(
        ProductWithImages { product, images },
        "Product updated",
    )))
}

/// Delete a product (owner only).
///
/// Stored images are deleted first; if storage cleanup fails the database
/// record is left in place.
pub async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>> {
    let id = ProductId::new(id);
    let repo = ProductRepository::new(state.pool());

    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    if existing.product.owner_id != user.id {
        return Err(AppError::Forbidden(
            "only the owner may delete this product".to_string(),
        ));
    }

    for image in &existing.images {
        state.storage().delete(&image.file_id).await?;
    }

    repo.delete(id).await?;

    tracing::info!(owner = %user.id, product = %id, "Product deleted");

    Ok(Json(ApiResponse::message("Product deleted")))
}

// =============================================================================
// Multipart form handling
// =============================================================================

/// An image file lifted out of the multipart stream.
struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Parsed multipart payload for create/update.
#[derive(Default)]
struct ProductForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
    existing_images: Option<Vec<ImageRef>>,
}

async fn read_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "images" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(bad_multipart)?.to_vec();
            form.files.push(UploadedFile {
                filename,
                content_type,
                bytes,
            });
        } else if name == "existingImages" {
            let value = field.text().await.map_err(bad_multipart)?;
            let refs: Vec<ImageRef> = serde_json::from_str(&value).map_err(|_| {
                AppError::Validation(
                    "existingImages must be a JSON array of image descriptors".to_string(),
                )
            })?;
            form.existing_images = Some(refs);
        } else if !name.is_empty() {
            let value = field.text().await.map_err(bad_multipart)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("malformed multipart request: {e}"))
}

fn require_field(fields: &HashMap<String, String>, name: &str) -> Result<String> {
    fields
        .get(name)
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{field} must be a decimal number")))
}

fn parse_stock(value: &str) -> Result<i32> {
    let stock: i32 = value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("stock must be an integer".to_string()))?;
    if stock < 0 {
        return Err(AppError::Validation(
            "stock must be zero or greater".to_string(),
        ));
    }
    Ok(stock)
}

fn bool_field(fields: &HashMap<String, String>, name: &str) -> Option<bool> {
    fields
        .get(name)
        .map(|v| matches!(v.trim(), "true" | "1" | "on"))
}

fn patch_from_fields(fields: &HashMap<String, String>) -> Result<ProductPatch> {
    let stock = fields.get("stock").map(|v| parse_stock(v)).transpose()?;
    let price = fields
        .get("price")
        .map(|v| parse_decimal(v, "price"))
        .transpose()?;
    let flash_sale_price = fields
        .get("flashSalePrice")
        .map(|v| parse_decimal(v, "flashSalePrice"))
        .transpose()?;

    Ok(ProductPatch {
        name: fields.get("name").cloned(),
        description: fields.get("description").cloned(),
        price,
        category: fields.get("category").cloned(),
        stock,
        is_featured: bool_field(fields, "isFeatured"),
        is_flash_sale: bool_field(fields, "isFlashSale"),
        flash_sale_price,
    })
}

async fn upload_all(state: &AppState, files: Vec<UploadedFile>) -> Result<Vec<ImageRef>> {
    let mut images = Vec::with_capacity(files.len());
    for file in files {
        let image = state
            .storage()
            .upload(&file.filename, &file.content_type, file.bytes)
            .await?;
        images.push(image);
    }
    Ok(images)
}

/// Best-effort storage cleanup of images dropped by a replacement set.
async fn cleanup_dropped(state: &AppState, before: &[crate::models::ProductImage], kept: &[ImageRef]) {
    let kept_ids: HashSet<&str> = kept.iter().map(|image| image.file_id.as_str()).collect();
    for image in before {
        if !kept_ids.contains(image.file_id.as_str()) {
            if let Err(e) = state.storage().delete(&image.file_id).await {
                tracing::warn!(file_id = %image.file_id, error = %e, "Failed to delete replaced image");
            }
        }
    }
}
