// conveyor/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConveyorError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {context_type}")]
  PipelineNotRegistered { context_type: String },

  #[error("Context type mismatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Handler failed: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal conveyor error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for ConveyorError {
  fn from(source: AnyhowError) -> Self {
    ConveyorError::Handler { source }
  }
}

pub type ConveyorResult<T, E = ConveyorError> = std::result::Result<T, E>;
