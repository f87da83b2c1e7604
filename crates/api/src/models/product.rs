//! Catalog product model, patch type, and flash-sale rules.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saltbox_core::{ProductId, ProductImageId, UserId};

/// Length of a flash-sale window, counted from activation.
pub const FLASH_SALE_WINDOW_DAYS: i64 = 7;

/// A catalog product as stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    pub is_featured: bool,
    pub is_flash_sale: bool,
    pub flash_sale_price: Option<Decimal>,
    pub flash_sale_start: Option<DateTime<Utc>>,
    pub flash_sale_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored product image.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    /// Identifier assigned by the object-storage service; used for deletion.
    pub file_id: String,
    pub url: String,
    pub position: i32,
}

/// A product joined with its images, as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

/// A client-supplied or freshly-uploaded image descriptor.
///
/// On update, the client sends the subset of existing images to retain in
/// this shape; newly uploaded files are appended after them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub file_id: String,
    pub url: String,
}

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    pub is_featured: bool,
    pub is_flash_sale: bool,
    pub flash_sale_price: Option<Decimal>,
    pub flash_sale_start: Option<DateTime<Utc>>,
    pub flash_sale_end: Option<DateTime<Utc>>,
}

/// Partial update for a product.
///
/// Every field is optional; only `Some` fields are applied. This makes the
/// merge rule explicit in the type instead of relying on runtime truthiness,
/// so an intentional empty string or `false` is a legal update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub is_featured: Option<bool>,
    pub is_flash_sale: Option<bool>,
    pub flash_sale_price: Option<Decimal>,
}

/// Violations of the flash-sale pricing invariant.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlashSaleError {
    /// Flash sale enabled without a sale price.
    #[error("flash sale requires a flash sale price")]
    MissingSalePrice,
    /// Sale price does not undercut the regular price.
    #[error("flash sale price must be less than the regular price")]
    PriceNotBelowRegular,
}

/// Check the flash-sale invariant for a given flag/price combination.
///
/// The invariant only binds while the flash sale is active: an inactive
/// product may carry any leftover `flash_sale_price`.
///
/// # Errors
///
/// Returns a [`FlashSaleError`] when `is_flash_sale` is set and the sale
/// price is missing or not strictly below the regular price.
pub fn validate_flash_sale(
    is_flash_sale: bool,
    price: Decimal,
    flash_sale_price: Option<Decimal>,
) -> Result<(), FlashSaleError> {
    if !is_flash_sale {
        return Ok(());
    }
    match flash_sale_price {
        None => Err(FlashSaleError::MissingSalePrice),
        Some(sale) if sale >= price => Err(FlashSaleError::PriceNotBelowRegular),
        Some(_) => Ok(()),
    }
}

/// The flash-sale window starting at `now`.
#[must_use]
pub fn flash_sale_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::days(FLASH_SALE_WINDOW_DAYS))
}

impl ProductPatch {
    /// True when the patch carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.is_featured.is_none()
            && self.is_flash_sale.is_none()
            && self.flash_sale_price.is_none()
    }

    /// Validate the flash-sale invariant against the merged result of
    /// applying this patch to `current`.
    ///
    /// The invariant must hold at update time too: raising the sale price
    /// above the (possibly also patched) regular price is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`FlashSaleError`] when the merged values violate the
    /// invariant.
    pub fn validate_against(&self, current: &Product) -> Result<(), FlashSaleError> {
        let is_flash_sale = self.is_flash_sale.unwrap_or(current.is_flash_sale);
        let price = self.price.unwrap_or(current.price);
        let flash_sale_price = self.flash_sale_price.or(current.flash_sale_price);
        validate_flash_sale(is_flash_sale, price, flash_sale_price)
    }

    /// Whether applying this patch newly activates a flash sale,
    /// which stamps a fresh 7-day window.
    #[must_use]
    pub fn activates_flash_sale(&self, current: &Product) -> bool {
        self.is_flash_sale == Some(true) && !current.is_flash_sale
    }
}

/// Resolve the image set for an update.
///
/// Returns the replacement list when the retained subset plus the newly
/// uploaded images form a non-empty set, and `None` when both are empty,
/// in which case the existing images are left unchanged (an update never
/// clears a product's images).
#[must_use]
pub fn resolve_image_update(
    retained: Vec<ImageRef>,
    uploaded: Vec<ImageRef>,
) -> Option<Vec<ImageRef>> {
    if retained.is_empty() && uploaded.is_empty() {
        return None;
    }
    let mut images = retained;
    images.extend(uploaded);
    Some(images)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: &str, is_flash_sale: bool, sale: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            owner_id: UserId::new(1),
            name: "Sea Salt Caramel".to_string(),
            description: "Small-batch caramel".to_string(),
            price: price.parse().unwrap(),
            category: "confectionery".to_string(),
            stock: 5,
            is_featured: false,
            is_flash_sale,
            flash_sale_price: sale.map(|s| s.parse().unwrap()),
            flash_sale_start: is_flash_sale.then_some(now),
            flash_sale_end: is_flash_sale.then(|| now + Duration::days(FLASH_SALE_WINDOW_DAYS)),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_flash_sale_price_must_undercut() {
        let price: Decimal = "100".parse().unwrap();
        assert_eq!(
            validate_flash_sale(true, price, Some("100".parse().unwrap())),
            Err(FlashSaleError::PriceNotBelowRegular)
        );
        assert_eq!(
            validate_flash_sale(true, price, Some("120".parse().unwrap())),
            Err(FlashSaleError::PriceNotBelowRegular)
        );
        assert!(validate_flash_sale(true, price, Some("80".parse().unwrap())).is_ok());
    }

    #[test]
    fn test_flash_sale_requires_sale_price() {
        let price: Decimal = "100".parse().unwrap();
        assert_eq!(
            validate_flash_sale(true, price, None),
            Err(FlashSaleError::MissingSalePrice)
        );
    }

    #[test]
    fn test_inactive_flash_sale_is_unconstrained() {
        let price: Decimal = "100".parse().unwrap();
        assert!(validate_flash_sale(false, price, None).is_ok());
        assert!(validate_flash_sale(false, price, Some("999".parse().unwrap())).is_ok());
    }

    #[test]
    fn test_patch_validation_uses_merged_values() {
        // Active sale at 80 against price 100; raising the sale price to 120
        // must be rejected even though the patch leaves `price` untouched.
        let current = product("100", true, Some("80"));
        let patch = ProductPatch {
            flash_sale_price: Some("120".parse().unwrap()),
            ..ProductPatch::default()
        };
        assert_eq!(
            patch.validate_against(&current),
            Err(FlashSaleError::PriceNotBelowRegular)
        );

        // Lowering the regular price below the existing sale price is also
        // a violation at update time.
        let patch = ProductPatch {
            price: Some("70".parse().unwrap()),
            ..ProductPatch::default()
        };
        assert_eq!(
            patch.validate_against(&current),
            Err(FlashSaleError::PriceNotBelowRegular)
        );
    }

    #[test]
    fn test_patch_activation_detection() {
        let inactive = product("100", false, None);
        let active = product("100", true, Some("80"));

        let patch = ProductPatch {
            is_flash_sale: Some(true),
            flash_sale_price: Some("50".parse().unwrap()),
            ..ProductPatch::default()
        };
        assert!(patch.activates_flash_sale(&inactive));
        assert!(!patch.activates_flash_sale(&active));

        let noop = ProductPatch::default();
        assert!(!noop.activates_flash_sale(&inactive));
    }

    #[test]
    fn test_flash_sale_window_length() {
        let now = Utc::now();
        let (start, end) = flash_sale_window(now);
        assert_eq!(start, now);
        assert_eq!(end - start, Duration::days(7));
    }

    #[test]
    fn test_image_update_skipped_when_both_lists_empty() {
        assert_eq!(resolve_image_update(vec![], vec![]), None);
    }

    #[test]
    fn test_image_update_retains_then_appends() {
        let kept = ImageRef {
            file_id: "catalog/abc".to_string(),
            url: "https://img.example.com/abc".to_string(),
        };
        let new = ImageRef {
            file_id: "catalog/def".to_string(),
            url: "https://img.example.com/def".to_string(),
        };
        let resolved = resolve_image_update(vec![kept.clone()], vec![new.clone()]).unwrap();
        assert_eq!(resolved, vec![kept, new]);
    }

    #[test]
    fn test_empty_patch_detection() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            stock: Some(3),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
