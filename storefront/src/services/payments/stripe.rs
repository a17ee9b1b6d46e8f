// storefront/src/services/payments/stripe.rs
use super::{CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, instrument};

#[derive(Debug, Deserialize)]
struct SessionResponse {
  id: String,
  url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
  error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  message: Option<String>,
}

/// Hosted checkout over the processor's REST API.
#[derive(Clone)]
pub struct StripeGateway {
  client: reqwest::Client,
  secret_key: String,
  api_base: String,
}

impl StripeGateway {
  pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self, GatewayError> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      secret_key: secret_key.into(),
      api_base: api_base.into().trim_end_matches('/').to_string(),
    })
  }
}

/// Bracket-notation form fields, e.g. `line_items[0][price_data][unit_amount]`.
pub(crate) fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
  let mut form = vec![
    ("mode".to_string(), request.mode.as_str().to_string()),
    ("success_url".to_string(), request.success_url.clone()),
    ("cancel_url".to_string(), request.cancel_url.clone()),
  ];
  for (i, item) in request.line_items.iter().enumerate() {
    let prefix = format!("line_items[{i}]");
    form.push((format!("{prefix}[price_data][currency]"), item.currency.clone()));
    form.push((format!("{prefix}[price_data][unit_amount]"), item.unit_amount.to_string()));
    form.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
    form.push((
      format!("{prefix}[price_data][product_data][description]"),
      item.description.clone(),
    ));
    for (j, image) in item.images.iter().enumerate() {
      form.push((format!("{prefix}[price_data][product_data][images][{j}]"), image.clone()));
    }
    form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
  }
  for (key, value) in &request.metadata {
    form.push((format!("metadata[{key}]"), value.clone()));
  }
  form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
  #[instrument(name = "StripeGateway::create_checkout_session", skip_all, fields(line_items = request.line_items.len()))]
  async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession, GatewayError> {
    let response = self
      .client
      .post(format!("{}/v1/checkout/sessions", self.api_base))
      .bearer_auth(&self.secret_key)
      .form(&session_form(&request))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or(body);
      error!(status = status.as_u16(), %message, "Payment processor rejected checkout session.");
      return Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
      });
    }

    let session: SessionResponse = response.json().await?;
    let url = session
      .url
      .ok_or_else(|| GatewayError::InvalidResponse(format!("session {} has no hosted url", session.id)))?;
    info!(session_id = %session.id, "Checkout session created.");
    Ok(CheckoutSession { id: session.id, url })
  }
}
