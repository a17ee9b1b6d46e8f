// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use conveyor::ConveyorError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("empty cart")]
  EmptyCart,

  #[error("invalid cart line {index}: {reason}")]
  InvalidCartLine { index: usize, reason: String },

  #[error("{0}")]
  InvalidRequest(String),

  #[error("product not found: {0}")]
  ProductNotFound(i64),

  #[error("size not available for {name} ({size})")]
  VariantNotFound { name: String, size: String },

  #[error("insufficient stock for {name} ({size})")]
  InsufficientStock { name: String, size: String },

  #[error("missing stripe signature")]
  MissingSignature,

  #[error("invalid signature")]
  InvalidSignature,

  #[error("invalid webhook payload")]
  InvalidPayload(String),

  #[error("{0}")]
  NotFound(String),

  #[error("failed to create checkout session")]
  PaymentSession(String),

  #[error("Storage Error: {0}")]
  Store(#[from] StoreError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: ConveyorError,
  },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::EmptyCart
      | AppError::InvalidCartLine { .. }
      | AppError::InvalidRequest(_)
      | AppError::ProductNotFound(_)
      | AppError::VariantNotFound { .. }
      | AppError::InsufficientStock { .. }
      | AppError::MissingSignature
      | AppError::InvalidSignature
      | AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::PaymentSession(_) => StatusCode::BAD_GATEWAY,
      AppError::Store(_) | AppError::Workflow { .. } | AppError::Config(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Rejecting request");
    }
    let mut builder = HttpResponse::build(status);
    match self {
      AppError::PaymentSession(detail) => builder.json(json!({"error": self.to_string(), "detail": detail})),
      AppError::Store(_) => builder.json(json!({"error": "storage operation failed"})),
      AppError::Workflow { .. } => builder.json(json!({"error": "workflow processing failed"})),
      AppError::Config(_) => builder.json(json!({"error": "configuration issue"})),
      AppError::Internal(_) => builder.json(json!({"error": "an internal error occurred"})),
      _ => builder.json(json!({"error": self.to_string()})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
