// storefront/src/models/cart.rs

//! Cart lines, the cart snapshot carried in checkout session metadata, and money conversion.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub const CART_METADATA_KEY: &str = "cart";
pub const CART_VERSION_METADATA_KEY: &str = "cart_version";
pub const CART_SNAPSHOT_VERSION: u32 = 1;

/// One line of a client-held cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub product_id: i64,
  pub size: String,
  pub quantity: i32,
}

impl CartLine {
  /// Why this line can never be checked out, if it can't.
  pub fn rejection(&self) -> Option<String> {
    if self.quantity <= 0 {
      return Some(format!("quantity must be a positive integer, got {}", self.quantity));
    }
    if self.size.trim().is_empty() {
      return Some("size must not be empty".to_string());
    }
    None
  }
}

/// Session metadata entries for `lines`: the JSON array under `cart` plus its version.
pub fn encode_cart_snapshot(lines: &[CartLine]) -> Result<BTreeMap<String, String>, serde_json::Error> {
  let mut metadata = BTreeMap::new();
  metadata.insert(CART_METADATA_KEY.to_string(), serde_json::to_string(lines)?);
  metadata.insert(
    CART_VERSION_METADATA_KEY.to_string(),
    CART_SNAPSHOT_VERSION.to_string(),
  );
  Ok(metadata)
}

/// Reads the cart back out of session metadata.
///
/// The payment has already been taken when this runs, so nothing here fails: a missing,
/// unparsable or unknown-version snapshot is logged and read as an empty cart. Lines with a
/// non-positive quantity are dropped.
pub fn decode_cart_snapshot(metadata: &BTreeMap<String, String>) -> Vec<CartLine> {
  let version = metadata
    .get(CART_VERSION_METADATA_KEY)
    .map(|v| v.trim().parse::<u32>().ok())
    .unwrap_or(Some(CART_SNAPSHOT_VERSION));
  if version != Some(CART_SNAPSHOT_VERSION) {
    warn!(version = ?metadata.get(CART_VERSION_METADATA_KEY), "Unsupported cart snapshot version; treating cart as empty.");
    return Vec::new();
  }

  let Some(raw) = metadata.get(CART_METADATA_KEY) else {
    warn!("Cart snapshot missing from session metadata; treating cart as empty.");
    return Vec::new();
  };

  match serde_json::from_str::<Vec<CartLine>>(raw) {
    Ok(lines) => lines
      .into_iter()
      .filter(|line| {
        let keep = line.quantity > 0;
        if !keep {
          warn!(product_id = line.product_id, size = %line.size, quantity = line.quantity, "Dropping snapshot line with non-positive quantity.");
        }
        keep
      })
      .collect(),
    Err(e) => {
      warn!(error = %e, "Cart snapshot is not valid JSON; treating cart as empty.");
      Vec::new()
    }
  }
}

/// Currencies the processor charges in whole units.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
  "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv", "xaf", "xof", "xpf",
];
const THREE_DECIMAL_CURRENCIES: &[&str] = &["bhd", "jod", "kwd", "omr", "tnd"];

/// Decimal places between a major and a minor unit of `currency` (ISO code, any case).
pub fn currency_exponent(currency: &str) -> u32 {
  let code = currency.trim().to_ascii_lowercase();
  if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) {
    0
  } else if THREE_DECIMAL_CURRENCIES.contains(&code.as_str()) {
    3
  } else {
    2
  }
}

/// `price` in minor units of `currency`, rounded half away from zero. `None` on overflow.
pub fn to_minor_units(price: Decimal, currency: &str) -> Option<i64> {
  let scale = Decimal::from(10_i64.pow(currency_exponent(currency)));
  price
    .checked_mul(scale)?
    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    .to_i64()
}

pub fn from_minor_units(amount: i64, currency: &str) -> Decimal {
  Decimal::new(amount, currency_exponent(currency))
}
