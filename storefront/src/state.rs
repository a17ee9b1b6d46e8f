// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::payments::signature::WebhookVerifier;
use crate::services::payments::PaymentGateway;
use crate::store::Store;
use conveyor::Conveyor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub verifier: Arc<WebhookVerifier>,
  pub conveyor: Arc<Conveyor<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers every pipeline on its conveyor.
  pub fn new(
    config: Arc<AppConfig>,
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
  ) -> Result<Self, AppError> {
    let verifier = Arc::new(WebhookVerifier::new(
      config.stripe_webhook_secret.clone(),
      config.webhook_tolerance_secs,
    ));
    let state = AppState {
      store,
      gateway,
      verifier,
      conveyor: Arc::new(Conveyor::<AppError>::new()),
      config,
    };
    crate::pipelines::register_all_pipelines(&state.conveyor)?;
    Ok(state)
  }
}
