// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::CartLine;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::state::AppState;
use conveyor::{ContextData, PipelineResult};

/// Lines are kept as raw JSON so a malformed line is reported with its index.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
  #[serde(default)]
  pub items: Option<Vec<Value>>,
}

impl CheckoutRequest {
  /// A missing or `null` list reads as an empty cart.
  pub fn into_cart_lines(self) -> Result<Vec<CartLine>, AppError> {
    self
      .items
      .unwrap_or_default()
      .into_iter()
      .enumerate()
      .map(|(index, item)| {
        serde_json::from_value::<CartLine>(item).map_err(|e| AppError::InvalidCartLine {
          index,
          reason: e.to_string(),
        })
      })
      .collect()
  }
}

#[instrument(
    name = "handler::create_checkout",
    skip(app_state, payload),
    fields(lines = payload.items.as_ref().map_or(0, Vec::len))
)]
pub async fn create_checkout_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let lines = payload.into_inner().into_cart_lines()?;
  let checkout_ctx = ContextData::new(CheckoutCtxData::new(app_state.get_ref().clone(), lines));

  match app_state.conveyor.run(checkout_ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let session = checkout_ctx
        .read()
        .session
        .clone()
        .ok_or_else(|| AppError::Internal("checkout completed without a payment session".to_string()))?;
      info!(session_id = %session.id, "Checkout session ready; redirecting customer.");
      Ok(HttpResponse::Ok().json(json!({ "url": session.url })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Checkout pipeline stopped before a payment session was opened.");
      Err(AppError::Internal(
        "checkout halted before a payment session was opened".to_string(),
      ))
    }
    Err(app_err) => {
      warn!(error = %app_err, "Checkout rejected.");
      Err(app_err)
    }
  }
}
