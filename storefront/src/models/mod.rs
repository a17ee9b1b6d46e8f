// storefront/src/models/mod.rs

//! Catalog, order and cart types shared by the store, the pipelines and the HTTP layer.

pub mod cart;
pub mod order;
pub mod order_item;
pub mod product;

pub use cart::CartLine;
pub use order::{Order, OrderStatus};
pub use order_item::OrderItem;
pub use product::{Category, Product, ProductDetails, ProductImage, ProductVariant};
