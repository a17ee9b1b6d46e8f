// storefront/src/models/order_item.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A purchased line. Name and unit price are copied from the catalog when the order is
/// recorded and never follow later catalog edits.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub product_name: String,
  pub size: String,
  pub quantity: i32,
  pub unit_price: Decimal,
}
