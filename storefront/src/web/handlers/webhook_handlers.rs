// storefront/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::errors::AppError;
use crate::pipelines::contexts::PaymentWebhookCtxData;
use crate::services::payments::signature::SIGNATURE_HEADER;
use crate::state::AppState;
use conveyor::ContextData;

/// Takes the body as raw bytes so the signature is checked against exactly what was sent.
#[instrument(
    name = "handler::payment_webhook",
    skip(app_state, req, body),
    fields(payload_bytes = body.len())
)]
pub async fn payment_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let signature_header = req
    .headers()
    .get(SIGNATURE_HEADER)
    .and_then(|h_val| h_val.to_str().ok())
    .map(String::from);

  let webhook_ctx = ContextData::new(PaymentWebhookCtxData::new(
    app_state.get_ref().clone(),
    body,
    signature_header,
  ));

  match app_state.conveyor.run(webhook_ctx.clone()).await {
    Ok(result) => {
      // Completed and Stopped are both acknowledged; Stopped covers ignored and repeat events.
      let disposition = webhook_ctx.read().disposition.clone();
      info!(?result, ?disposition, "Payment webhook acknowledged.");
      Ok(HttpResponse::Ok().json(json!({ "received": true })))
    }
    Err(app_err) => {
      error!(error = %app_err, "Payment webhook not acknowledged.");
      Err(app_err)
    }
  }
}
