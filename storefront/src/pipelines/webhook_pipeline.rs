// storefront/src/pipelines/webhook_pipeline.rs

//! Payment-completed webhook: verify, then materialize the order exactly once per session.
//!
//! Only a missing or invalid signature, an unparsable verified body or a storage failure
//! produce an error. Everything after verification that is merely unexpected (other event
//! types, repeat deliveries, vanished products) is logged and acknowledged, because the
//! payment has already been taken and the processor retries anything not acknowledged.

use crate::errors::AppError;
use crate::models::cart::{decode_cart_snapshot, from_minor_units};
use crate::models::OrderStatus;
use crate::pipelines::contexts::{
  LineOutcome, LineStatus, PaymentWebhookCtxData, PlannedLine, SkipReason, WebhookDisposition,
};
use crate::services::payments::PaymentEvent;
use crate::store::{OrderDraft, OrderLineDraft, RecordOutcome, StockOutcome};
use conveyor::{ContextData, Conveyor, ConveyorResult, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::{info, warn};

/// Stored when the completed session carries no customer email.
pub const UNKNOWN_CUSTOMER_EMAIL: &str = "unknown";

pub fn register_webhook_pipeline(conveyor: &Arc<Conveyor<AppError>>) -> ConveyorResult<()> {
  let mut p = Pipeline::<PaymentWebhookCtxData, AppError>::new(&[
    ("require_signature", false, None),
    ("verify_signature", false, None),
    ("parse_event", false, None),
    ("check_existing_order", false, None),
    ("decode_cart_snapshot", false, None),
    ("resolve_order_lines", false, None),
    ("record_order", false, None),
    ("acknowledge", false, None),
  ]);

  p.on_root("require_signature", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let present = ctx_data
        .read()
        .signature_header
        .as_deref()
        .is_some_and(|h| !h.trim().is_empty());
      if !present {
        warn!("Webhook Pipeline: signature header missing.");
        return Err(AppError::MissingSignature);
      }
      Ok(PipelineControl::Continue)
    })
  })?;

  // The raw bytes are verified as received. Nothing is parsed before this passes.
  p.on_root("verify_signature", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let (verifier, payload, header) = {
        let guard = ctx_data.read();
        (
          guard.app_state.verifier.clone(),
          guard.raw_payload.clone(),
          guard.signature_header.clone().unwrap_or_default(),
        )
      };
      verifier.verify(&payload, &header).map_err(|e| {
        warn!(reason = %e, "Webhook Pipeline: signature rejected.");
        AppError::InvalidSignature
      })?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  p.on_root("parse_event", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let payload = ctx_data.read().raw_payload.clone();
      let event: PaymentEvent = serde_json::from_slice(&payload).map_err(|e| {
        warn!(error = %e, "Webhook Pipeline: verified body is not a payment event.");
        AppError::InvalidPayload(e.to_string())
      })?;

      if !event.is_checkout_completed() {
        info!(event_id = %event.id, event_type = %event.event_type, "Webhook Pipeline: ignoring event type.");
        let mut guard = ctx_data.write();
        guard.disposition = WebhookDisposition::Ignored {
          event_type: event.event_type.clone(),
        };
        guard.event = Some(event);
        return Ok(PipelineControl::Stop);
      }

      let session = event.completed_session().map_err(|e| {
        warn!(event_id = %event.id, error = %e, "Webhook Pipeline: completed event carries no usable session.");
        AppError::InvalidPayload(e.to_string())
      })?;
      info!(event_id = %event.id, session_id = %session.id, "Webhook Pipeline: checkout session completed.");

      let mut guard = ctx_data.write();
      guard.session = Some(session);
      guard.event = Some(event);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Fast path for repeat deliveries. `record_order` is what actually guarantees one order.
  p.on_root("check_existing_order", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let (store, session_id) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.session.as_ref().map(|s| s.id.clone()),
        )
      };
      let session_id =
        session_id.ok_or_else(|| AppError::Internal("completed session missing from webhook context".to_string()))?;

      if let Some(order) = store.find_order_by_session(&session_id).await? {
        info!(%session_id, order_id = order.id, "Webhook Pipeline: order already recorded; acknowledging.");
        ctx_data.write().disposition = WebhookDisposition::AlreadyRecorded { order_id: order.id };
        return Ok(PipelineControl::Stop);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  p.on_root("decode_cart_snapshot", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let cart = {
        let guard = ctx_data.read();
        guard
          .session
          .as_ref()
          .map(|s| decode_cart_snapshot(&s.metadata))
          .unwrap_or_default()
      };
      info!(lines = cart.len(), "Webhook Pipeline: cart snapshot decoded.");
      ctx_data.write().cart = cart;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Name and unit price come from the catalog as it is now.
  p.on_root("resolve_order_lines", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let (store, cart) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.cart.clone())
      };

      let mut planned = Vec::with_capacity(cart.len());
      for line in cart {
        let draft = match store.find_product(line.product_id).await? {
          Some(details) => Some(OrderLineDraft {
            product_id: line.product_id,
            product_name: details.product.name,
            size: line.size.clone(),
            quantity: line.quantity,
            unit_price: details.product.price,
          }),
          None => {
            warn!(product_id = line.product_id, size = %line.size, "Webhook Pipeline: product no longer exists; skipping line.");
            None
          }
        };
        planned.push(PlannedLine { line, draft });
      }

      ctx_data.write().planned = planned;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  p.on_root("record_order", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let (store, session, planned, default_currency) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.session.clone(),
          guard.planned.clone(),
          guard.app_state.config.currency.clone(),
        )
      };
      let session =
        session.ok_or_else(|| AppError::Internal("completed session missing from webhook context".to_string()))?;

      let draft = OrderDraft {
        stripe_session_id: session.id.clone(),
        customer_email: session
          .customer_email()
          .unwrap_or(UNKNOWN_CUSTOMER_EMAIL)
          .to_string(),
        total_amount: from_minor_units(
          session.amount_total.unwrap_or(0),
          session.currency.as_deref().unwrap_or(&default_currency),
        ),
        status: OrderStatus::Completed,
        lines: planned.iter().filter_map(|planned_line| planned_line.draft.clone()).collect(),
      };

      match store.record_order(draft).await? {
        RecordOutcome::Duplicate => {
          info!(session_id = %session.id, "Webhook Pipeline: concurrent delivery recorded the order first.");
          ctx_data.write().disposition = WebhookDisposition::LostRace;
          Ok(PipelineControl::Stop)
        }
        RecordOutcome::Recorded { order, stock } => {
          let mut stock = stock.into_iter();
          let outcomes: Vec<LineOutcome> = planned
            .into_iter()
            .map(|planned_line| {
              let status = match planned_line.draft {
                None => LineStatus::Skipped(SkipReason::ProductMissing),
                Some(_) => match stock.next() {
                  Some(StockOutcome::Decremented { remaining }) => LineStatus::Fulfilled {
                    remaining_stock: remaining,
                  },
                  Some(StockOutcome::VariantMissing) | None => LineStatus::Skipped(SkipReason::VariantMissing),
                },
              };
              LineOutcome {
                product_id: planned_line.line.product_id,
                size: planned_line.line.size,
                quantity: planned_line.line.quantity,
                status,
              }
            })
            .collect();

          let mut guard = ctx_data.write();
          guard.outcomes = outcomes;
          guard.disposition = WebhookDisposition::Recorded { order_id: order.id };
          Ok::<_, AppError>(PipelineControl::Continue)
        }
      }
    })
  })?;

  p.on_root("acknowledge", |ctx_data: ContextData<PaymentWebhookCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let mut fulfilled = 0usize;
      for outcome in &guard.outcomes {
        match outcome.status {
          LineStatus::Fulfilled { remaining_stock } => {
            fulfilled += 1;
            info!(
              product_id = outcome.product_id,
              size = %outcome.size,
              quantity = outcome.quantity,
              remaining_stock,
              "Webhook Pipeline: line fulfilled."
            );
          }
          LineStatus::Skipped(reason) => warn!(
            product_id = outcome.product_id,
            size = %outcome.size,
            quantity = outcome.quantity,
            ?reason,
            "Webhook Pipeline: line skipped."
          ),
        }
      }
      info!(
        disposition = ?guard.disposition,
        fulfilled,
        skipped = guard.outcomes.len() - fulfilled,
        "Webhook Pipeline: payment recorded; acknowledging."
      );
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  conveyor.register_pipeline(p);
  info!("Payment webhook pipeline registered.");
  Ok(())
}
