// storefront/src/services/mod.rs

pub mod payments;
