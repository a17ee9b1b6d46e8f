// storefront/src/pipelines/contexts.rs

//! Pipeline context data. Handlers receive these wrapped in `conveyor::ContextData`.

use crate::models::CartLine;
use crate::models::ProductDetails;
use crate::services::payments::{CheckoutSession, CompletedSession, PaymentEvent, SessionLineItem};
use crate::state::AppState;
use crate::store::OrderLineDraft;
use actix_web::web::Bytes;

// --- Checkout ---

/// A cart line that passed catalog and stock validation.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
  pub line: CartLine,
  pub product: ProductDetails,
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub lines: Vec<CartLine>,
  pub resolved: Vec<ResolvedLine>,
  pub line_items: Vec<SessionLineItem>,
  pub session: Option<CheckoutSession>,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, lines: Vec<CartLine>) -> Self {
    Self {
      app_state,
      lines,
      resolved: Vec::new(),
      line_items: Vec::new(),
      session: None,
    }
  }
}

// --- Payment webhook ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// The product was deleted between checkout and payment. No item is recorded.
  ProductMissing,
  /// The item is recorded but no stock was decremented.
  VariantMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
  Fulfilled { remaining_stock: i32 },
  Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOutcome {
  pub product_id: i64,
  pub size: String,
  pub quantity: i32,
  pub status: LineStatus,
}

/// How the webhook run ended. Every variant is acknowledged to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookDisposition {
  Pending,
  /// Not a completed-session event.
  Ignored { event_type: String },
  /// An order for the session existed before this delivery.
  AlreadyRecorded { order_id: i64 },
  /// A concurrent delivery recorded the order first.
  LostRace,
  Recorded { order_id: i64 },
}

/// A snapshot line, with the order item it becomes when its product still exists.
#[derive(Debug, Clone)]
pub struct PlannedLine {
  pub line: CartLine,
  pub draft: Option<OrderLineDraft>,
}

#[derive(Clone)]
pub struct PaymentWebhookCtxData {
  pub app_state: AppState,
  pub raw_payload: Bytes,
  pub signature_header: Option<String>,
  pub event: Option<PaymentEvent>,
  pub session: Option<CompletedSession>,
  pub cart: Vec<CartLine>,
  pub planned: Vec<PlannedLine>,
  pub outcomes: Vec<LineOutcome>,
  pub disposition: WebhookDisposition,
}

impl PaymentWebhookCtxData {
  pub fn new(app_state: AppState, raw_payload: Bytes, signature_header: Option<String>) -> Self {
    Self {
      app_state,
      raw_payload,
      signature_header,
      event: None,
      session: None,
      cart: Vec::new(),
      planned: Vec::new(),
      outcomes: Vec::new(),
      disposition: WebhookDisposition::Pending,
    }
  }
}
