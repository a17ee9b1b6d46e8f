// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

/// Order confirmation lookup for the checkout success page, keyed by the processor session.
#[instrument(name = "handler::get_order_by_session", skip(app_state, path), fields(session_id = %path.as_str()))]
pub async fn get_order_by_session_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let session_id = path.into_inner();
  let order = app_state
    .store
    .find_order_by_session(&session_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("no order for session {}", session_id)))?;
  let items = app_state.store.order_items(order.id).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order, "items": items })))
}
