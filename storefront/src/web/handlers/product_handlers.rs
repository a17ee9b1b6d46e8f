// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  #[serde(default)]
  pub featured: bool,
}

#[instrument(name = "handler::list_products", skip(app_state, query_params), fields(featured = query_params.featured))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.store.list_active_products(query_params.featured).await?;
  info!("Fetched {} active products.", products.len());
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  match app_state.store.find_product(product_id).await? {
    Some(details) if details.product.is_active => Ok(HttpResponse::Ok().json(json!({ "product": details }))),
    _ => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound(format!("product {} not found", product_id)))
    }
  }
}
