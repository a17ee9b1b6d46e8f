// storefront/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::{checkout_handlers, order_handlers, product_handlers, webhook_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      // Malformed bodies and query strings answer 400 {"error"} like every other rejection.
      .app_data(
        web::JsonConfig::default().error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
      )
      .app_data(
        web::QueryConfig::default().error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
      )
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/checkout")
          .route("", web::post().to(checkout_handlers::create_checkout_handler))
          .route("/webhook", web::post().to(webhook_handlers::payment_webhook_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      .service(
        web::scope("/orders")
          .route("/session/{session_id}", web::get().to(order_handlers::get_order_by_session_handler)),
      ),
  );
}
