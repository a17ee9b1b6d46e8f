// storefront/src/store/mod.rs

//! The inventory store: catalog reads, order lookups and the atomic order write.

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{Order, OrderItem, OrderStatus, ProductDetails};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("schema migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),
}

/// One order item to write, with name and price already copied from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineDraft {
  pub product_id: i64,
  pub product_name: String,
  pub size: String,
  pub quantity: i32,
  pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
  pub stripe_session_id: String,
  pub customer_email: String,
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub lines: Vec<OrderLineDraft>,
}

impl OrderDraft {
  /// Line indices ordered by `(product_id, size)`. Variant rows are locked in this order so
  /// two orders touching the same variants cannot wait on each other.
  pub fn stock_lock_order(&self) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..self.lines.len()).collect();
    indices.sort_by(|&a, &b| {
      let (a, b) = (&self.lines[a], &self.lines[b]);
      (a.product_id, a.size.as_str()).cmp(&(b.product_id, b.size.as_str()))
    });
    indices
  }
}

/// What happened to one line's variant stock during `record_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockOutcome {
  Decremented { remaining: i32 },
  /// No variant with the line's size exists any more. The item is still recorded.
  VariantMissing,
}

#[derive(Debug, Clone)]
pub enum RecordOutcome {
  /// `stock` lines up index for index with the draft's lines.
  Recorded { order: Order, stock: Vec<StockOutcome> },
  /// An order for this session already exists. Nothing was written.
  Duplicate,
}

#[async_trait]
pub trait Store: Send + Sync {
  /// Looks a product up regardless of its active flag.
  async fn find_product(&self, id: i64) -> Result<Option<ProductDetails>, StoreError>;

  /// Active products ordered by id, optionally only the featured ones.
  async fn list_active_products(&self, featured_only: bool) -> Result<Vec<ProductDetails>, StoreError>;

  async fn find_order_by_session(&self, session_id: &str) -> Result<Option<Order>, StoreError>;

  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StoreError>;

  /// Inserts the order and its items and decrements each line's variant stock by the line
  /// quantity, clamped at zero, as one atomic unit. The unique session id decides between
  /// `Recorded` and `Duplicate`, so concurrent deliveries of one session write once.
  async fn record_order(&self, draft: OrderDraft) -> Result<RecordOutcome, StoreError>;
}
