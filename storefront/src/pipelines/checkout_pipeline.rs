// storefront/src/pipelines/checkout_pipeline.rs

//! Checkout initiation: validate the cart against the catalog, then open a hosted payment
//! session. Nothing is written locally and no stock is reserved.

use crate::errors::AppError;
use crate::models::cart::{encode_cart_snapshot, to_minor_units};
use crate::pipelines::contexts::{CheckoutCtxData, ResolvedLine};
use crate::services::payments::{CheckoutSessionRequest, SessionLineItem, SessionMode};
use conveyor::{ContextData, Conveyor, ConveyorResult, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::{error, info, warn};

pub fn register_checkout_pipeline(conveyor: &Arc<Conveyor<AppError>>) -> ConveyorResult<()> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("validate_cart_lines", false, None),
    ("resolve_catalog_and_stock", false, None),
    ("build_line_items", false, None),
    ("open_payment_session", false, None),
  ]);

  // Step 1: reject empty carts and malformed lines before touching the catalog.
  p.on_root("validate_cart_lines", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      if guard.lines.is_empty() {
        return Err(AppError::EmptyCart);
      }
      for (index, line) in guard.lines.iter().enumerate() {
        if let Some(reason) = line.rejection() {
          return Err(AppError::InvalidCartLine { index, reason });
        }
      }
      info!(lines = guard.lines.len(), "Checkout Pipeline: cart lines validated.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Step 2: every line must name an active product, an existing size and enough stock.
  // The first failing line fails the whole checkout.
  p.on_root("resolve_catalog_and_stock", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, lines) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.lines.clone())
      };

      let mut resolved = Vec::with_capacity(lines.len());
      for line in lines {
        let product = match store.find_product(line.product_id).await? {
          Some(details) if details.product.is_active => details,
          _ => {
            warn!(product_id = line.product_id, "Checkout Pipeline: product missing or inactive.");
            return Err(AppError::ProductNotFound(line.product_id));
          }
        };
        let Some(variant) = product.variant_for_size(&line.size) else {
          warn!(product_id = line.product_id, size = %line.size, "Checkout Pipeline: size not offered.");
          return Err(AppError::VariantNotFound {
            name: product.product.name.clone(),
            size: line.size.clone(),
          });
        };
        if variant.stock < line.quantity {
          warn!(
            product_id = line.product_id,
            size = %line.size,
            requested = line.quantity,
            available = variant.stock,
            "Checkout Pipeline: insufficient stock."
          );
          return Err(AppError::InsufficientStock {
            name: product.product.name.clone(),
            size: line.size.clone(),
          });
        }
        resolved.push(ResolvedLine { line, product });
      }

      ctx_data.write().resolved = resolved;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Step 3: one processor line item per cart line, priced in minor units.
  p.on_root("build_line_items", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (resolved, config) = {
        let guard = ctx_data.read();
        (guard.resolved.clone(), guard.app_state.config.clone())
      };

      let mut line_items = Vec::with_capacity(resolved.len());
      for ResolvedLine { line, product } in &resolved {
        let unit_amount = to_minor_units(product.product.price, &config.currency).ok_or_else(|| {
          AppError::Internal(format!(
            "price of product {} does not fit in minor units",
            product.product.id
          ))
        })?;
        line_items.push(SessionLineItem {
          currency: config.currency.clone(),
          unit_amount,
          name: product.product.name.clone(),
          description: format!("Size: {}", line.size),
          images: product
            .primary_image()
            .map(|image| config.absolute_url(&image.url))
            .into_iter()
            .collect(),
          quantity: line.quantity,
        });
      }

      ctx_data.write().line_items = line_items;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Step 4: open the hosted session with the validated cart as its metadata snapshot.
  p.on_root("open_payment_session", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (gateway, config, lines, line_items) = {
        let guard = ctx_data.read();
        (
          guard.app_state.gateway.clone(),
          guard.app_state.config.clone(),
          guard.lines.clone(),
          guard.line_items.clone(),
        )
      };

      let metadata = encode_cart_snapshot(&lines)
        .map_err(|e| AppError::Internal(format!("failed to encode cart snapshot: {}", e)))?;
      let request = CheckoutSessionRequest {
        mode: SessionMode::Payment,
        line_items,
        success_url: config.success_url(),
        cancel_url: config.cancel_url(),
        metadata,
      };

      let session = gateway.create_checkout_session(request).await.map_err(|e| {
        error!(error = %e, "Checkout Pipeline: payment session could not be created.");
        AppError::PaymentSession(e.to_string())
      })?;
      info!(session_id = %session.id, "Checkout Pipeline: payment session opened.");

      ctx_data.write().session = Some(session);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  conveyor.register_pipeline(p);
  info!("Checkout pipeline registered.");
  Ok(())
}
