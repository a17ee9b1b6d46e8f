// tests/checkout_tests.rs
mod common;

use common::*;
use conveyor::PipelineResult;
use rust_decimal_macros::dec;
use storefront::errors::AppError;
use storefront::models::cart::decode_cart_snapshot;
use storefront::services::payments::SessionMode;

fn catalog() -> Vec<storefront::models::ProductDetails> {
  vec![
    product(1, "Silk Camisole", dec!(89.00), &[("S", 1), ("M", 5)]),
    product(2, "Cashmere Scarf", dec!(19.995), &[("One Size", 3)]),
  ]
}

#[tokio::test]
async fn test_valid_cart_opens_session_without_touching_stock() {
  let h = harness(catalog());
  let lines = vec![line(1, "M", 2), line(2, "One Size", 1)];

  let (result, ctx) = run_checkout(&h, lines.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let session = ctx.read().session.clone().unwrap();
  assert!(session.id.starts_with("cs_mock_"));
  assert!(session.url.ends_with(&session.id));

  assert_eq!(h.store.variant_stock(1, "M"), Some(5));
  assert_eq!(h.store.variant_stock(2, "One Size"), Some(3));
  assert_eq!(h.store.order_count(), 0);

  let requests = h.gateway.requests();
  assert_eq!(requests.len(), 1);
  let request = &requests[0];
  assert_eq!(request.mode, SessionMode::Payment);
  assert_eq!(request.success_url, format!("{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}", BASE_URL));
  assert_eq!(request.cancel_url, format!("{}/cart", BASE_URL));
  assert_eq!(decode_cart_snapshot(&request.metadata), lines);

  let camisole = &request.line_items[0];
  assert_eq!(camisole.currency, "usd");
  assert_eq!(camisole.unit_amount, 8900);
  assert_eq!(camisole.name, "Silk Camisole");
  assert_eq!(camisole.description, "Size: M");
  assert_eq!(camisole.images, vec![format!("{}/placeholder.svg", BASE_URL)]);
  assert_eq!(camisole.quantity, 2);

  // 19.995 rounds half away from zero.
  assert_eq!(request.line_items[1].unit_amount, 2000);
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
  let h = harness(catalog());
  let (result, _) = run_checkout(&h, vec![]).await;
  assert!(matches!(result, Err(AppError::EmptyCart)));
  assert!(h.gateway.requests().is_empty());
}

#[tokio::test]
async fn test_non_positive_quantity_is_rejected() {
  let h = harness(catalog());
  let (result, _) = run_checkout(&h, vec![line(1, "M", 1), line(1, "S", 0)]).await;
  match result {
    Err(AppError::InvalidCartLine { index, .. }) => assert_eq!(index, 1),
    other => panic!("Expected InvalidCartLine, got {:?}", other),
  }
  assert!(h.gateway.requests().is_empty());
}

#[tokio::test]
async fn test_unknown_and_inactive_products_are_not_found() {
  let h = harness(catalog());
  let (result, _) = run_checkout(&h, vec![line(99, "M", 1)]).await;
  assert!(matches!(result, Err(AppError::ProductNotFound(99))));

  h.store.update_product(1, |p| p.product.is_active = false);
  let (result, _) = run_checkout(&h, vec![line(1, "M", 1)]).await;
  assert!(matches!(result, Err(AppError::ProductNotFound(1))));
  assert!(h.gateway.requests().is_empty());
}

#[tokio::test]
async fn test_unknown_size_is_rejected() {
  let h = harness(catalog());
  let (result, _) = run_checkout(&h, vec![line(1, "XL", 1)]).await;
  match result {
    Err(AppError::VariantNotFound { name, size }) => {
      assert_eq!(name, "Silk Camisole");
      assert_eq!(size, "XL");
    }
    other => panic!("Expected VariantNotFound, got {:?}", other),
  }
}

#[tokio::test]
async fn test_insufficient_stock_creates_no_session_and_no_order() {
  let h = harness(catalog());
  let (result, ctx) = run_checkout(&h, vec![line(1, "M", 10)]).await;

  let err = result.unwrap_err();
  assert_eq!(err.to_string(), "insufficient stock for Silk Camisole (M)");
  assert!(ctx.read().session.is_none());
  assert!(h.gateway.requests().is_empty());
  assert_eq!(h.store.variant_stock(1, "M"), Some(5));
  assert_eq!(h.store.order_count(), 0);
}

#[tokio::test]
async fn test_first_bad_line_fails_the_whole_cart() {
  let h = harness(catalog());
  let (result, ctx) = run_checkout(&h, vec![line(1, "M", 1), line(1, "S", 2), line(42, "M", 1)]).await;
  // Line 2 fails on stock before line 3 is ever looked up.
  assert!(matches!(result, Err(AppError::InsufficientStock { .. })));
  assert!(ctx.read().resolved.is_empty());
  assert!(h.gateway.requests().is_empty());
}

#[tokio::test]
async fn test_processor_failure_surfaces_as_payment_session_error() {
  let h = harness(catalog());
  h.gateway.set_failure(Some("processor down".to_string()));

  let (result, ctx) = run_checkout(&h, vec![line(1, "M", 1)]).await;

  match result {
    Err(AppError::PaymentSession(detail)) => assert!(detail.contains("processor down")),
    other => panic!("Expected PaymentSession, got {:?}", other),
  }
  assert!(ctx.read().session.is_none());
  assert_eq!(h.gateway.requests().len(), 1);
  assert_eq!(h.store.order_count(), 0);
  assert_eq!(h.store.variant_stock(1, "M"), Some(5));
}

#[tokio::test]
async fn test_product_without_primary_image_sends_no_image() {
  let mut bare = product(3, "Wrap Midi Dress", dec!(195), &[("M", 2)]);
  bare.images.clear();
  let h = harness(vec![bare]);

  let (result, _) = run_checkout(&h, vec![line(3, "M", 1)]).await;
  assert!(result.is_ok());
  assert!(h.gateway.requests()[0].line_items[0].images.is_empty());
}

#[tokio::test]
async fn test_zero_decimal_currency_is_not_scaled() {
  let mut config = test_config();
  config.currency = "jpy".to_string();
  let h = harness_with(config, vec![product(5, "Kimono Robe", dec!(12000), &[("M", 1)])]);

  let (result, _) = run_checkout(&h, vec![line(5, "M", 1)]).await;
  assert!(result.is_ok());
  let item = &h.gateway.requests()[0].line_items[0];
  assert_eq!(item.currency, "jpy");
  assert_eq!(item.unit_amount, 12000);
}
