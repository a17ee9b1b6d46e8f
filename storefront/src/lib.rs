// storefront/src/lib.rs

//! Storefront checkout and payment-webhook service.
//!
//! Checkout validates a client cart against the catalog and opens a hosted payment session.
//! The processor's payment-completed webhook then records the order and decrements stock,
//! exactly once per session. Both flows run as conveyor pipelines.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
