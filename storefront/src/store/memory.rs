// storefront/src/store/memory.rs

use super::{OrderDraft, RecordOutcome, StockOutcome, Store, StoreError};
use crate::models::{Order, OrderItem, ProductDetails};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Default)]
struct Inner {
  products: BTreeMap<i64, ProductDetails>,
  orders: Vec<Order>,
  order_ids_by_session: HashMap<String, i64>,
  items: Vec<OrderItem>,
  next_order_id: i64,
  next_item_id: i64,
}

/// Process-local store. Every operation runs under one lock, which gives `record_order`
/// the same all-or-nothing behavior as the database transaction.
#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_catalog(products: impl IntoIterator<Item = ProductDetails>) -> Self {
    let store = Self::new();
    for product in products {
      store.upsert_product(product);
    }
    store
  }

  pub fn upsert_product(&self, product: ProductDetails) {
    self.inner.lock().products.insert(product.product.id, product);
  }

  /// Catalog edit hook. Returns false when the product does not exist.
  pub fn update_product(&self, id: i64, edit: impl FnOnce(&mut ProductDetails)) -> bool {
    match self.inner.lock().products.get_mut(&id) {
      Some(product) => {
        edit(product);
        true
      }
      None => false,
    }
  }

  pub fn remove_product(&self, id: i64) -> Option<ProductDetails> {
    self.inner.lock().products.remove(&id)
  }

  pub fn variant_stock(&self, product_id: i64, size: &str) -> Option<i32> {
    let inner = self.inner.lock();
    inner
      .products
      .get(&product_id)
      .and_then(|p| p.variant_for_size(size))
      .map(|v| v.stock)
  }

  pub fn order_count(&self) -> usize {
    self.inner.lock().orders.len()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn find_product(&self, id: i64) -> Result<Option<ProductDetails>, StoreError> {
    Ok(self.inner.lock().products.get(&id).cloned())
  }

  async fn list_active_products(&self, featured_only: bool) -> Result<Vec<ProductDetails>, StoreError> {
    let inner = self.inner.lock();
    Ok(
      inner
        .products
        .values()
        .filter(|p| p.product.is_active && (!featured_only || p.product.is_featured))
        .cloned()
        .collect(),
    )
  }

  async fn find_order_by_session(&self, session_id: &str) -> Result<Option<Order>, StoreError> {
    let inner = self.inner.lock();
    Ok(
      inner
        .order_ids_by_session
        .get(session_id)
        .and_then(|id| inner.orders.iter().find(|o| o.id == *id))
        .cloned(),
    )
  }

  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StoreError> {
    let inner = self.inner.lock();
    Ok(inner.items.iter().filter(|i| i.order_id == order_id).cloned().collect())
  }

  async fn record_order(&self, draft: OrderDraft) -> Result<RecordOutcome, StoreError> {
    let mut guard = self.inner.lock();
    let inner = &mut *guard;
    if inner.order_ids_by_session.contains_key(&draft.stripe_session_id) {
      debug!(session_id = %draft.stripe_session_id, "Order already recorded for session.");
      return Ok(RecordOutcome::Duplicate);
    }

    inner.next_order_id += 1;
    let order = Order {
      id: inner.next_order_id,
      stripe_session_id: draft.stripe_session_id.clone(),
      customer_email: draft.customer_email,
      total_amount: draft.total_amount,
      status: draft.status,
      created_at: Utc::now(),
    };

    let mut stock = Vec::with_capacity(draft.lines.len());
    for line in draft.lines {
      inner.next_item_id += 1;
      let outcome = match inner
        .products
        .get_mut(&line.product_id)
        .and_then(|p| p.variants.iter_mut().find(|v| v.size == line.size))
      {
        Some(variant) => {
          variant.stock = (variant.stock - line.quantity).max(0);
          StockOutcome::Decremented {
            remaining: variant.stock,
          }
        }
        None => StockOutcome::VariantMissing,
      };
      inner.items.push(OrderItem {
        id: inner.next_item_id,
        order_id: order.id,
        product_id: line.product_id,
        product_name: line.product_name,
        size: line.size,
        quantity: line.quantity,
        unit_price: line.unit_price,
      });
      stock.push(outcome);
    }

    inner.order_ids_by_session.insert(draft.stripe_session_id, order.id);
    inner.orders.push(order.clone());
    Ok(RecordOutcome::Recorded { order, stock })
  }
}
