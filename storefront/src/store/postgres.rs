// storefront/src/store/postgres.rs

use super::seed::DemoCatalog;
use super::{OrderDraft, RecordOutcome, StockOutcome, Store, StoreError};
use crate::models::{Order, OrderItem, Product, ProductDetails, ProductImage, ProductVariant};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, compare_at_price, category_id, is_active, is_featured, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, stripe_session_id, customer_email, total_amount, status, created_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  /// Connects and brings the schema up to date.
  pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    info!("Successfully connected to the database.");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database schema is up to date.");
    Ok(Self::new(pool))
  }

  /// Inserts the demo catalog. Rows that already exist are left alone.
  pub async fn seed(&self, catalog: &DemoCatalog) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;
    for c in &catalog.categories {
      sqlx::query(
        "INSERT INTO categories (id, name, slug, description, sort_order) VALUES ($1, $2, $3, $4, $5) ON CONFLICT DO NOTHING",
      )
      .bind(c.id)
      .bind(&c.name)
      .bind(&c.slug)
      .bind(&c.description)
      .bind(c.sort_order)
      .execute(&mut *tx)
      .await?;
    }
    for details in &catalog.products {
      let p = &details.product;
      sqlx::query(
        "INSERT INTO products (id, name, slug, description, price, compare_at_price, category_id, is_active, is_featured) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT DO NOTHING",
      )
      .bind(p.id)
      .bind(&p.name)
      .bind(&p.slug)
      .bind(&p.description)
      .bind(p.price)
      .bind(p.compare_at_price)
      .bind(p.category_id)
      .bind(p.is_active)
      .bind(p.is_featured)
      .execute(&mut *tx)
      .await?;
      for img in &details.images {
        sqlx::query(
          "INSERT INTO product_images (id, product_id, url, alt_text, sort_order, is_primary) VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT DO NOTHING",
        )
        .bind(img.id)
        .bind(img.product_id)
        .bind(&img.url)
        .bind(&img.alt_text)
        .bind(img.sort_order)
        .bind(img.is_primary)
        .execute(&mut *tx)
        .await?;
      }
      for v in &details.variants {
        sqlx::query(
          "INSERT INTO product_variants (id, product_id, size, stock, sku) VALUES ($1, $2, $3, $4, $5) ON CONFLICT DO NOTHING",
        )
        .bind(v.id)
        .bind(v.product_id)
        .bind(&v.size)
        .bind(v.stock)
        .bind(&v.sku)
        .execute(&mut *tx)
        .await?;
      }
    }
    // Explicit ids leave the sequences behind.
    for table in ["categories", "products", "product_images", "product_variants"] {
      sqlx::query(&format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), COALESCE((SELECT MAX(id) FROM {table}), 1))"
      ))
      .execute(&mut *tx)
      .await?;
    }
    tx.commit().await?;
    info!(
      categories = catalog.categories.len(),
      products = catalog.products.len(),
      "Demo catalog seeded."
    );
    Ok(())
  }

  async fn attach_details(&self, products: Vec<Product>) -> Result<Vec<ProductDetails>, StoreError> {
    if products.is_empty() {
      return Ok(Vec::new());
    }
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();

    let images: Vec<ProductImage> = sqlx::query_as(
      "SELECT id, product_id, url, alt_text, sort_order, is_primary FROM product_images WHERE product_id = ANY($1) ORDER BY sort_order ASC, id ASC",
    )
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;
    let variants: Vec<ProductVariant> = sqlx::query_as(
      "SELECT id, product_id, size, stock, sku FROM product_variants WHERE product_id = ANY($1) ORDER BY id ASC",
    )
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;

    let mut images_by_product: HashMap<i64, Vec<ProductImage>> = HashMap::new();
    for img in images {
      images_by_product.entry(img.product_id).or_default().push(img);
    }
    let mut variants_by_product: HashMap<i64, Vec<ProductVariant>> = HashMap::new();
    for v in variants {
      variants_by_product.entry(v.product_id).or_default().push(v);
    }

    Ok(
      products
        .into_iter()
        .map(|product| ProductDetails {
          images: images_by_product.remove(&product.id).unwrap_or_default(),
          variants: variants_by_product.remove(&product.id).unwrap_or_default(),
          product,
        })
        .collect(),
    )
  }
}

#[async_trait]
impl Store for PgStore {
  #[instrument(skip(self))]
  async fn find_product(&self, id: i64) -> Result<Option<ProductDetails>, StoreError> {
    let product: Option<Product> = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    match product {
      Some(product) => Ok(self.attach_details(vec![product]).await?.pop()),
      None => Ok(None),
    }
  }

  #[instrument(skip(self))]
  async fn list_active_products(&self, featured_only: bool) -> Result<Vec<ProductDetails>, StoreError> {
    let products: Vec<Product> = sqlx::query_as(&format!(
      "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active AND (NOT $1 OR is_featured) ORDER BY id ASC"
    ))
    .bind(featured_only)
    .fetch_all(&self.pool)
    .await?;
    self.attach_details(products).await
  }

  #[instrument(skip(self))]
  async fn find_order_by_session(&self, session_id: &str) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE stripe_session_id = $1"))
      .bind(session_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(order)
  }

  #[instrument(skip(self))]
  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StoreError> {
    let items = sqlx::query_as(
      "SELECT id, order_id, product_id, product_name, size, quantity, unit_price FROM order_items WHERE order_id = $1 ORDER BY id ASC",
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  #[instrument(skip(self, draft), fields(session_id = %draft.stripe_session_id, lines = draft.lines.len()))]
  async fn record_order(&self, draft: OrderDraft) -> Result<RecordOutcome, StoreError> {
    let mut tx = self.pool.begin().await?;

    // A concurrent delivery of the same session blocks here on the unique index and then
    // takes the DO NOTHING branch once the first transaction commits.
    let inserted: Option<Order> = sqlx::query_as(&format!(
      "INSERT INTO orders (stripe_session_id, customer_email, total_amount, status) VALUES ($1, $2, $3, $4) \
       ON CONFLICT (stripe_session_id) DO NOTHING RETURNING {ORDER_COLUMNS}"
    ))
    .bind(&draft.stripe_session_id)
    .bind(&draft.customer_email)
    .bind(draft.total_amount)
    .bind(draft.status)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(order) = inserted else {
      tx.rollback().await?;
      debug!("Order already recorded for session.");
      return Ok(RecordOutcome::Duplicate);
    };

    for line in &draft.lines {
      sqlx::query(
        "INSERT INTO order_items (order_id, product_id, product_name, size, quantity, unit_price) VALUES ($1, $2, $3, $4, $5, $6)",
      )
      .bind(order.id)
      .bind(line.product_id)
      .bind(&line.product_name)
      .bind(&line.size)
      .bind(line.quantity)
      .bind(line.unit_price)
      .execute(&mut *tx)
      .await?;
    }

    let mut stock = vec![StockOutcome::VariantMissing; draft.lines.len()];
    for index in draft.stock_lock_order() {
      let line = &draft.lines[index];
      let remaining: Option<i32> = sqlx::query_scalar(
        "UPDATE product_variants SET stock = GREATEST(stock - $1, 0) WHERE product_id = $2 AND size = $3 RETURNING stock",
      )
      .bind(line.quantity)
      .bind(line.product_id)
      .bind(&line.size)
      .fetch_optional(&mut *tx)
      .await?;
      if let Some(remaining) = remaining {
        stock[index] = StockOutcome::Decremented { remaining };
      }
    }

    tx.commit().await?;
    Ok(RecordOutcome::Recorded { order, stock })
  }
}
