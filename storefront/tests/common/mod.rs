// tests/common/mod.rs
#![allow(dead_code)]

use actix_web::web::Bytes;
use chrono::Utc;
use conveyor::{ContextData, PipelineResult};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use storefront::config::AppConfig;
use storefront::errors::AppError;
use storefront::models::cart::encode_cart_snapshot;
use storefront::models::{CartLine, Product, ProductDetails, ProductImage, ProductVariant};
use storefront::pipelines::contexts::{CheckoutCtxData, PaymentWebhookCtxData};
use storefront::services::payments::MockGateway;
use storefront::state::AppState;
use storefront::store::MemoryStore;

pub const BASE_URL: &str = "http://shop.test";
pub const WEBHOOK_SECRET: &str = "whsec_integration";

pub struct Harness {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
  pub gateway: Arc<MockGateway>,
}

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: None,
    app_base_url: BASE_URL.to_string(),
    currency: "usd".to_string(),
    stripe_secret_key: None,
    stripe_api_base: "http://stripe.invalid".to_string(),
    stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
    webhook_tolerance_secs: 300,
    seed_db: false,
  }
}

pub fn harness(products: Vec<ProductDetails>) -> Harness {
  harness_with(test_config(), products)
}

pub fn harness_with(config: AppConfig, products: Vec<ProductDetails>) -> Harness {
  setup_tracing();
  let store = Arc::new(MemoryStore::with_catalog(products));
  let gateway = Arc::new(MockGateway::new());
  let state = AppState::new(Arc::new(config), store.clone(), gateway.clone()).unwrap();
  Harness { state, store, gateway }
}

/// An active product with one primary image and the given `(size, stock)` variants.
pub fn product(id: i64, name: &str, price: Decimal, sizes: &[(&str, i32)]) -> ProductDetails {
  let now = Utc::now();
  ProductDetails {
    product: Product {
      id,
      name: name.to_string(),
      slug: name.to_lowercase().replace(' ', "-"),
      description: None,
      price,
      compare_at_price: None,
      category_id: None,
      is_active: true,
      is_featured: false,
      created_at: now,
      updated_at: now,
    },
    images: vec![ProductImage {
      id,
      product_id: id,
      url: "/placeholder.svg".to_string(),
      alt_text: Some(name.to_string()),
      sort_order: 0,
      is_primary: true,
    }],
    variants: sizes
      .iter()
      .enumerate()
      .map(|(i, (size, stock))| ProductVariant {
        id: id * 100 + i as i64,
        product_id: id,
        size: size.to_string(),
        stock: *stock,
        sku: None,
      })
      .collect(),
  }
}

pub fn line(product_id: i64, size: &str, quantity: i32) -> CartLine {
  CartLine {
    product_id,
    size: size.to_string(),
    quantity,
  }
}

/// A `checkout.session.completed` body carrying `lines` as its cart snapshot.
pub fn completed_event(session_id: &str, amount_total: i64, email: Option<&str>, lines: &[CartLine]) -> Vec<u8> {
  let metadata = encode_cart_snapshot(lines).unwrap();
  serde_json::to_vec(&json!({
    "id": format!("evt_{}", session_id),
    "object": "event",
    "type": "checkout.session.completed",
    "data": {"object": {
      "id": session_id,
      "object": "checkout.session",
      "amount_total": amount_total,
      "currency": "usd",
      "customer_details": email.map(|e| json!({"email": e})),
      "metadata": metadata,
      "payment_status": "paid"
    }}
  }))
  .unwrap()
}

pub fn sign(h: &Harness, payload: &[u8]) -> String {
  h.state.verifier.sign(payload, Utc::now().timestamp()).unwrap()
}

pub async fn run_checkout(
  h: &Harness,
  lines: Vec<CartLine>,
) -> (Result<PipelineResult, AppError>, ContextData<CheckoutCtxData>) {
  let ctx = ContextData::new(CheckoutCtxData::new(h.state.clone(), lines));
  let result = h.state.conveyor.run(ctx.clone()).await;
  (result, ctx)
}

pub async fn deliver(
  h: &Harness,
  payload: Vec<u8>,
  signature: Option<String>,
) -> (Result<PipelineResult, AppError>, ContextData<PaymentWebhookCtxData>) {
  let ctx = ContextData::new(PaymentWebhookCtxData::new(h.state.clone(), Bytes::from(payload), signature));
  let result = h.state.conveyor.run(ctx.clone()).await;
  (result, ctx)
}

/// Signs and delivers `payload`.
pub async fn deliver_signed(
  h: &Harness,
  payload: Vec<u8>,
) -> (Result<PipelineResult, AppError>, ContextData<PaymentWebhookCtxData>) {
  let signature = sign(h, &payload);
  deliver(h, payload, Some(signature)).await
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
