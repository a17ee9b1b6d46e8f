// storefront/src/pipelines/mod.rs

//! Defines and registers the conveyor pipelines that drive checkout and payment webhooks.

use crate::errors::AppError;
use conveyor::{Conveyor, ConveyorResult};
use std::sync::Arc;

pub mod contexts;

pub mod checkout_pipeline;
pub mod webhook_pipeline;

/// Registers every pipeline. Called once while building `AppState`.
pub fn register_all_pipelines(conveyor: &Arc<Conveyor<AppError>>) -> ConveyorResult<()> {
  tracing::info!("Registering pipelines...");

  checkout_pipeline::register_checkout_pipeline(conveyor)?;
  webhook_pipeline::register_webhook_pipeline(conveyor)?;

  tracing::info!("All application pipelines registered.");
  Ok(())
}
