// storefront/src/services/payments/signature.rs

//! Webhook authenticity check for `Stripe-Signature: t=<unix>,v1=<hex>[,v1=<hex>...]`.
//!
//! The signed payload is `"<t>."` followed by the raw request body bytes. The body must be
//! verified exactly as received, before it is parsed.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
  #[error("malformed signature header: {0}")]
  Malformed(&'static str),

  #[error("no signature matches the payload")]
  NoMatch,

  #[error("signature timestamp outside the {tolerance_secs}s tolerance")]
  OutsideTolerance { tolerance_secs: u64 },
}

#[derive(Debug, Clone)]
pub struct WebhookVerifier {
  secret: String,
  tolerance_secs: u64,
}

impl WebhookVerifier {
  pub fn new(secret: impl Into<String>, tolerance_secs: u64) -> Self {
    Self {
      secret: secret.into(),
      tolerance_secs,
    }
  }

  pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
    self.verify_at(payload, header, chrono::Utc::now().timestamp())
  }

  /// `verify` against an explicit clock.
  pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();
    for part in header.split(',') {
      let Some((key, value)) = part.trim().split_once('=') else {
        continue;
      };
      match key {
        "t" => {
          timestamp = Some(
            value
              .parse()
              .map_err(|_| SignatureError::Malformed("timestamp is not an integer"))?,
          )
        }
        // Undecodable values can never match, so they are dropped rather than rejected.
        "v1" => candidates.extend(hex::decode(value).ok()),
        _ => {}
      }
    }
    let timestamp = timestamp.ok_or(SignatureError::Malformed("missing timestamp"))?;
    if candidates.is_empty() {
      return Err(SignatureError::Malformed("missing v1 signature"));
    }

    let mac = self.signed_payload_mac(timestamp, payload)?;
    if !candidates.iter().any(|sig| mac.clone().verify_slice(sig).is_ok()) {
      return Err(SignatureError::NoMatch);
    }

    if now.abs_diff(timestamp) > self.tolerance_secs {
      return Err(SignatureError::OutsideTolerance {
        tolerance_secs: self.tolerance_secs,
      });
    }
    Ok(())
  }

  /// Header value the processor would send for `payload` at `timestamp`.
  pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, SignatureError> {
    let mac = self.signed_payload_mac(timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes())))
  }

  fn signed_payload_mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
      HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| SignatureError::Malformed("unusable secret"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
  }
}
