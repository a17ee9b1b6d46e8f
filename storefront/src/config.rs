// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Absent means the in-memory store.
  pub database_url: Option<String>,
  /// Storefront origin used for redirect URLs and absolutized image paths.
  pub app_base_url: String,
  pub currency: String,

  /// Absent means the in-process mock gateway.
  pub stripe_secret_key: Option<String>,
  pub stripe_api_base: String,
  pub stripe_webhook_secret: String,
  pub webhook_tolerance_secs: u64,

  pub seed_db: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let get_optional = |var_name: &str| get_env(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_optional("DATABASE_URL");
    let app_base_url = get_optional("APP_BASE_URL")
      .or_else(|| get_optional("BASE_URL"))
      .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let currency = get_env("CURRENCY").unwrap_or_else(|_| "usd".to_string()).to_lowercase();

    let stripe_secret_key = get_optional("STRIPE_SECRET_KEY");
    let stripe_api_base = get_env("STRIPE_API_BASE").unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string());
    let stripe_webhook_secret = get_env("STRIPE_WEBHOOK_SECRET")?;
    if stripe_webhook_secret.is_empty() {
      return Err(AppError::Config("STRIPE_WEBHOOK_SECRET must not be empty".to_string()));
    }
    let webhook_tolerance_secs = get_env("WEBHOOK_TOLERANCE_SECS")
      .unwrap_or_else(|_| "300".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid WEBHOOK_TOLERANCE_SECS: {}", e)))?;

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    tracing::info!(
      database = database_url.is_some(),
      live_payments = stripe_secret_key.is_some(),
      %app_base_url,
      "Application configuration loaded."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      currency,
      stripe_secret_key,
      stripe_api_base,
      stripe_webhook_secret,
      webhook_tolerance_secs,
      seed_db,
    })
  }

  /// Redirect target after a completed payment. The processor substitutes the placeholder.
  pub fn success_url(&self) -> String {
    format!(
      "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
      self.app_base_url.trim_end_matches('/')
    )
  }

  pub fn cancel_url(&self) -> String {
    format!("{}/cart", self.app_base_url.trim_end_matches('/'))
  }

  /// Joins a stored image path onto the base URL. Absolute URLs pass through unchanged.
  pub fn absolute_url(&self, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
      return path.to_string();
    }
    format!(
      "{}/{}",
      self.app_base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}
