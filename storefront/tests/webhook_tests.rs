// tests/webhook_tests.rs
mod common;

use common::*;
use conveyor::PipelineResult;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use storefront::errors::AppError;
use storefront::models::OrderStatus;
use storefront::pipelines::contexts::{LineStatus, SkipReason, WebhookDisposition};
use storefront::pipelines::webhook_pipeline::UNKNOWN_CUSTOMER_EMAIL;
use storefront::store::Store;

fn camisole_harness(stock: i32) -> Harness {
  harness(vec![product(1, "Silk Camisole", dec!(89.00), &[("S", stock), ("M", stock)])])
}

#[tokio::test]
async fn test_completed_payment_records_order_and_decrements_stock() {
  let h = camisole_harness(5);
  let payload = completed_event("cs_1", 17800, Some("ada@example.com"), &[line(1, "M", 2)]);

  let (result, ctx) = deliver_signed(&h, payload).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let order_id = match ctx.read().disposition {
    WebhookDisposition::Recorded { order_id } => order_id,
    ref other => panic!("Expected Recorded, got {:?}", other),
  };

  let order = h.store.find_order_by_session("cs_1").await.unwrap().unwrap();
  assert_eq!(order.id, order_id);
  assert_eq!(order.customer_email, "ada@example.com");
  assert_eq!(order.total_amount, dec!(178.00));
  assert_eq!(order.status, OrderStatus::Completed);

  let items = h.store.order_items(order.id).await.unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].product_name, "Silk Camisole");
  assert_eq!(items[0].size, "M");
  assert_eq!(items[0].quantity, 2);
  assert_eq!(items[0].unit_price, dec!(89.00));

  assert_eq!(h.store.variant_stock(1, "M"), Some(3));
  assert_eq!(h.store.variant_stock(1, "S"), Some(5));
  assert_eq!(
    ctx.read().outcomes[0].status,
    LineStatus::Fulfilled { remaining_stock: 3 }
  );
}

#[tokio::test]
async fn test_redelivery_is_acknowledged_without_second_order() {
  let h = camisole_harness(5);
  let payload = completed_event("cs_dup", 17800, Some("ada@example.com"), &[line(1, "M", 2)]);

  let (first, _) = deliver_signed(&h, payload.clone()).await;
  assert_eq!(first.unwrap(), PipelineResult::Completed);

  let (second, ctx) = deliver_signed(&h, payload).await;
  assert_eq!(second.unwrap(), PipelineResult::Stopped);
  assert!(matches!(
    ctx.read().disposition,
    WebhookDisposition::AlreadyRecorded { .. }
  ));

  assert_eq!(h.store.order_count(), 1);
  assert_eq!(h.store.variant_stock(1, "M"), Some(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deliveries_record_exactly_one_order() {
  let h = Arc::new(camisole_harness(5));
  let payload = completed_event("cs_race", 8900, Some("ada@example.com"), &[line(1, "M", 1)]);

  let deliveries = (0..8).map(|_| {
    let h = h.clone();
    let payload = payload.clone();
    tokio::spawn(async move {
      let (result, ctx) = deliver_signed(&h, payload).await;
      let disposition = ctx.read().disposition.clone();
      (result, disposition)
    })
  });
  let results = futures_util::future::join_all(deliveries).await;

  let mut recorded = 0;
  for joined in results {
    let (result, disposition) = joined.unwrap();
    assert!(result.is_ok(), "every delivery is acknowledged: {:?}", result);
    match disposition {
      WebhookDisposition::Recorded { .. } => recorded += 1,
      WebhookDisposition::AlreadyRecorded { .. } | WebhookDisposition::LostRace => {}
      other => panic!("Unexpected disposition {:?}", other),
    }
  }

  assert_eq!(recorded, 1);
  assert_eq!(h.store.order_count(), 1);
  assert_eq!(h.store.variant_stock(1, "M"), Some(4));
}

#[tokio::test]
async fn test_missing_signature_is_rejected_before_anything_else() {
  let h = camisole_harness(5);
  let payload = completed_event("cs_nosig", 8900, None, &[line(1, "M", 1)]);

  let (result, ctx) = deliver(&h, payload.clone(), None).await;
  assert!(matches!(result, Err(AppError::MissingSignature)));
  assert!(ctx.read().event.is_none());

  let (result, _) = deliver(&h, payload, Some("   ".to_string())).await;
  assert!(matches!(result, Err(AppError::MissingSignature)));
  assert_eq!(h.store.order_count(), 0);
}

#[tokio::test]
async fn test_invalid_signature_changes_nothing() {
  let h = camisole_harness(5);
  let payload = completed_event("cs_forged", 8900, None, &[line(1, "M", 1)]);
  let signature = sign(&h, &payload);

  let mut tampered = payload.clone();
  tampered.extend_from_slice(b" ");
  let (result, ctx) = deliver(&h, tampered, Some(signature)).await;
  assert!(matches!(result, Err(AppError::InvalidSignature)));
  assert!(ctx.read().event.is_none());

  let (result, _) = deliver(&h, payload, Some("t=1,v1=deadbeef".to_string())).await;
  assert!(matches!(result, Err(AppError::InvalidSignature)));

  assert_eq!(h.store.order_count(), 0);
  assert_eq!(h.store.variant_stock(1, "M"), Some(5));
}

#[tokio::test]
async fn test_verified_but_unparsable_body_is_invalid_payload() {
  let h = camisole_harness(5);
  let (result, _) = deliver_signed(&h, b"not json at all".to_vec()).await;
  assert!(matches!(result, Err(AppError::InvalidPayload(_))));
  assert_eq!(h.store.order_count(), 0);
}

#[tokio::test]
async fn test_other_event_types_are_acknowledged_and_ignored() {
  let h = camisole_harness(5);
  let payload = serde_json::to_vec(&json!({
    "id": "evt_refund",
    "type": "charge.refunded",
    "data": {"object": {"id": "ch_1"}}
  }))
  .unwrap();

  let (result, ctx) = deliver_signed(&h, payload).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  assert_eq!(
    ctx.read().disposition,
    WebhookDisposition::Ignored {
      event_type: "charge.refunded".to_string()
    }
  );
  assert_eq!(h.store.order_count(), 0);
}

#[tokio::test]
async fn test_missing_email_is_stored_as_unknown() {
  let h = camisole_harness(5);
  let (result, _) = deliver_signed(&h, completed_event("cs_anon", 8900, None, &[line(1, "S", 1)])).await;
  assert!(result.is_ok());

  let order = h.store.find_order_by_session("cs_anon").await.unwrap().unwrap();
  assert_eq!(order.customer_email, UNKNOWN_CUSTOMER_EMAIL);
}

#[tokio::test]
async fn test_missing_cart_snapshot_records_order_without_items() {
  let h = camisole_harness(5);
  let payload = serde_json::to_vec(&json!({
    "id": "evt_bare",
    "type": "checkout.session.completed",
    "data": {"object": {"id": "cs_bare", "amount_total": null, "metadata": {}}}
  }))
  .unwrap();

  let (result, ctx) = deliver_signed(&h, payload).await;
  assert_eq!(result.unwrap(), PipelineResult::Completed);
  assert!(ctx.read().outcomes.is_empty());

  let order = h.store.find_order_by_session("cs_bare").await.unwrap().unwrap();
  assert_eq!(order.total_amount, dec!(0));
  assert!(h.store.order_items(order.id).await.unwrap().is_empty());
  assert_eq!(h.store.variant_stock(1, "M"), Some(5));
}

#[tokio::test]
async fn test_null_metadata_records_order_without_items() {
  let h = camisole_harness(5);
  let payload = serde_json::to_vec(&json!({
    "id": "evt_null",
    "type": "checkout.session.completed",
    "data": {"object": {"id": "cs_null", "amount_total": 8900, "metadata": null}}
  }))
  .unwrap();

  let (result, ctx) = deliver_signed(&h, payload).await;
  assert_eq!(result.unwrap(), PipelineResult::Completed);
  assert!(ctx.read().cart.is_empty());

  let order = h.store.find_order_by_session("cs_null").await.unwrap().unwrap();
  assert_eq!(order.total_amount, dec!(89.00));
  assert!(h.store.order_items(order.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_total_uses_the_session_currency_exponent() {
  let h = camisole_harness(5);
  let payload = serde_json::to_vec(&json!({
    "id": "evt_yen",
    "type": "checkout.session.completed",
    "data": {"object": {"id": "cs_yen", "amount_total": 12000, "currency": "jpy", "metadata": {}}}
  }))
  .unwrap();

  let (result, _) = deliver_signed(&h, payload).await;
  assert!(result.is_ok());
  let order = h.store.find_order_by_session("cs_yen").await.unwrap().unwrap();
  assert_eq!(order.total_amount, dec!(12000));
}

#[tokio::test]
async fn test_deleted_product_line_is_skipped_and_the_rest_recorded() {
  let h = harness(vec![
    product(1, "Silk Camisole", dec!(89), &[("M", 5)]),
    product(2, "Cashmere Scarf", dec!(120), &[("One Size", 4)]),
  ]);
  let payload = completed_event(
    "cs_partial",
    29800,
    Some("ada@example.com"),
    &[line(1, "M", 1), line(2, "One Size", 1)],
  );
  h.store.remove_product(1);

  let (result, ctx) = deliver_signed(&h, payload).await;
  assert!(result.is_ok());

  let outcomes = ctx.read().outcomes.clone();
  assert_eq!(outcomes[0].status, LineStatus::Skipped(SkipReason::ProductMissing));
  assert_eq!(outcomes[1].status, LineStatus::Fulfilled { remaining_stock: 3 });

  let order = h.store.find_order_by_session("cs_partial").await.unwrap().unwrap();
  // The charged total stands even though a line was skipped.
  assert_eq!(order.total_amount, dec!(298.00));
  let items = h.store.order_items(order.id).await.unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].product_id, 2);
}

#[tokio::test]
async fn test_missing_variant_records_item_without_stock_change() {
  let h = camisole_harness(5);
  let payload = completed_event("cs_nosize", 8900, Some("ada@example.com"), &[line(1, "XL", 1)]);

  let (result, ctx) = deliver_signed(&h, payload).await;
  assert!(result.is_ok());
  assert_eq!(
    ctx.read().outcomes[0].status,
    LineStatus::Skipped(SkipReason::VariantMissing)
  );

  let order = h.store.find_order_by_session("cs_nosize").await.unwrap().unwrap();
  let items = h.store.order_items(order.id).await.unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].size, "XL");
  assert_eq!(h.store.variant_stock(1, "M"), Some(5));
  assert_eq!(h.store.variant_stock(1, "S"), Some(5));
}

#[tokio::test]
async fn test_oversold_stock_floors_at_zero() {
  let h = camisole_harness(1);

  // Both checkouts passed validation while one unit was left.
  let (a, _) = deliver_signed(&h, completed_event("cs_a", 8900, None, &[line(1, "M", 1)])).await;
  let (b, ctx) = deliver_signed(&h, completed_event("cs_b", 17800, None, &[line(1, "M", 2)])).await;

  assert!(a.is_ok());
  assert!(b.is_ok());
  assert_eq!(h.store.order_count(), 2);
  assert_eq!(h.store.variant_stock(1, "M"), Some(0));
  assert_eq!(
    ctx.read().outcomes[0].status,
    LineStatus::Fulfilled { remaining_stock: 0 }
  );
}

#[tokio::test]
async fn test_recorded_items_are_not_rewritten_by_catalog_edits() {
  let h = camisole_harness(5);
  let (result, _) = deliver_signed(&h, completed_event("cs_hist", 8900, None, &[line(1, "M", 1)])).await;
  assert!(result.is_ok());

  assert!(h.store.update_product(1, |p| {
    p.product.name = "Silk Camisole II".to_string();
    p.product.price = dec!(99);
  }));

  let order = h.store.find_order_by_session("cs_hist").await.unwrap().unwrap();
  let items = h.store.order_items(order.id).await.unwrap();
  assert_eq!(items[0].product_name, "Silk Camisole");
  assert_eq!(items[0].unit_price, dec!(89.00));
}
