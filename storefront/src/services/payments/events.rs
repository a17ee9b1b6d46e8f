// storefront/src/services/payments/events.rs
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Envelope of every webhook notification. `data.object` depends on `type`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
  pub id: String,
  #[serde(rename = "type")]
  pub event_type: String,
  pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
  pub object: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
  pub email: Option<String>,
}

/// The `data.object` of a `checkout.session.completed` event.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletedSession {
  pub id: String,
  /// Charged total in minor units.
  pub amount_total: Option<i64>,
  /// Lowercase ISO code of `amount_total`.
  #[serde(default)]
  pub currency: Option<String>,
  pub customer_details: Option<CustomerDetails>,
  /// The processor sends `null` when a session has no metadata.
  #[serde(default, deserialize_with = "null_as_empty")]
  pub metadata: BTreeMap<String, String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PaymentEvent {
  pub fn is_checkout_completed(&self) -> bool {
    self.event_type == CHECKOUT_SESSION_COMPLETED
  }

  pub fn completed_session(&self) -> Result<CompletedSession, serde_json::Error> {
    CompletedSession::deserialize(&self.data.object)
  }
}

impl CompletedSession {
  pub fn customer_email(&self) -> Option<&str> {
    self
      .customer_details
      .as_ref()
      .and_then(|c| c.email.as_deref())
      .filter(|e| !e.is_empty())
  }
}
