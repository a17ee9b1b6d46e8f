// storefront/src/services/payments/mod.rs

//! The external payment processor: hosted checkout sessions and webhook events.

pub mod events;
pub mod mock;
pub mod signature;
pub mod stripe;

pub use events::{CompletedSession, PaymentEvent, CHECKOUT_SESSION_COMPLETED};
pub use mock::MockGateway;
pub use stripe::StripeGateway;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
  /// One-off charge for the listed items.
  Payment,
}

impl SessionMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      SessionMode::Payment => "payment",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLineItem {
  pub currency: String,
  /// Minor currency units.
  pub unit_amount: i64,
  pub name: String,
  pub description: String,
  pub images: Vec<String>,
  pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
  pub mode: SessionMode,
  pub line_items: Vec<SessionLineItem>,
  pub success_url: String,
  pub cancel_url: String,
  /// Returned verbatim on the completed-session event.
  pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
  pub id: String,
  /// Hosted payment page the customer is redirected to.
  pub url: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("payment processor request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("payment processor rejected the request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("payment processor returned an unusable response: {0}")]
  InvalidResponse(String),

  #[error("payment processor unavailable: {0}")]
  Unavailable(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Opens a hosted checkout session. Not retried; failures go straight back to the caller.
  async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession, GatewayError>;
}
