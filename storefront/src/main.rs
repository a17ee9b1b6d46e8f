// storefront/src/main.rs

use anyhow::Context;
use storefront::config::AppConfig;
use storefront::services::payments::{MockGateway, PaymentGateway, StripeGateway};
use storefront::state::AppState;
use storefront::store::{seed, MemoryStore, PgStore, Store};

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str())))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = Arc::new(AppConfig::from_env().context("failed to load application configuration")?);

  let store: Arc<dyn Store> = match &app_config.database_url {
    Some(database_url) => {
      let pg = PgStore::connect(database_url).await.context("database setup failed")?;
      if app_config.seed_db {
        pg.seed(&seed::demo_catalog()).await.context("database seeding failed")?;
      }
      Arc::new(pg)
    }
    None => {
      tracing::warn!("DATABASE_URL not set; orders and stock live in memory only.");
      if app_config.seed_db {
        Arc::new(MemoryStore::with_catalog(seed::demo_catalog().products))
      } else {
        Arc::new(MemoryStore::new())
      }
    }
  };

  let gateway: Arc<dyn PaymentGateway> = match &app_config.stripe_secret_key {
    Some(secret_key) => Arc::new(
      StripeGateway::new(secret_key.clone(), app_config.stripe_api_base.clone())
        .context("payment processor client setup failed")?,
    ),
    None => {
      tracing::warn!("STRIPE_SECRET_KEY not set; checkout sessions are simulated.");
      Arc::new(MockGateway::new())
    }
  };

  let app_state = AppState::new(app_config.clone(), store, gateway).context("pipeline registration failed")?;

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(storefront::web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("failed to bind {}", server_address))?
  .run()
  .await?;
  Ok(())
}
