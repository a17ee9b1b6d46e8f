// storefront/src/services/payments/mock.rs
use super::{CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// In-process gateway for tests and for running without processor credentials.
#[derive(Default)]
pub struct MockGateway {
  requests: Mutex<Vec<CheckoutSessionRequest>>,
  sessions: Mutex<Vec<CheckoutSession>>,
  failure: Mutex<Option<String>>,
}

impl MockGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// While set, every session request fails with this message.
  pub fn set_failure(&self, message: Option<String>) {
    *self.failure.lock() = message;
  }

  pub fn requests(&self) -> Vec<CheckoutSessionRequest> {
    self.requests.lock().clone()
  }

  pub fn sessions(&self) -> Vec<CheckoutSession> {
    self.sessions.lock().clone()
  }
}

#[async_trait]
impl PaymentGateway for MockGateway {
  #[instrument(name = "MockGateway::create_checkout_session", skip_all, fields(line_items = request.line_items.len()))]
  async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession, GatewayError> {
    self.requests.lock().push(request);
    if let Some(message) = self.failure.lock().clone() {
      warn!(%message, "Simulating payment processor failure.");
      return Err(GatewayError::Unavailable(message));
    }

    let id = format!("cs_mock_{}", Uuid::new_v4().simple());
    let session = CheckoutSession {
      url: format!("https://checkout.mock.invalid/pay/{}", id),
      id,
    };
    info!(session_id = %session.id, "Simulated checkout session created.");
    self.sessions.lock().push(session.clone());
    Ok(session)
  }
}
