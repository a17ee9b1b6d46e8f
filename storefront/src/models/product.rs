// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
  pub id: i64,
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
  pub sort_order: i32,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
  /// Major currency units.
  pub price: Decimal,
  pub compare_at_price: Option<Decimal>,
  pub category_id: Option<i64>,
  pub is_active: bool,
  pub is_featured: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductImage {
  pub id: i64,
  pub product_id: i64,
  pub url: String,
  pub alt_text: Option<String>,
  pub sort_order: i32,
  pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductVariant {
  pub id: i64,
  pub product_id: i64,
  /// Unique per product.
  pub size: String,
  /// Never negative.
  pub stock: i32,
  pub sku: Option<String>,
}

/// A product together with its images and size variants, as the catalog hands it out.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetails {
  #[serde(flatten)]
  pub product: Product,
  pub images: Vec<ProductImage>,
  pub variants: Vec<ProductVariant>,
}

impl ProductDetails {
  pub fn variant_for_size(&self, size: &str) -> Option<&ProductVariant> {
    self.variants.iter().find(|v| v.size == size)
  }

  /// The image flagged primary, if any. No fallback to the first image.
  pub fn primary_image(&self) -> Option<&ProductImage> {
    self.images.iter().find(|i| i.is_primary)
  }
}
