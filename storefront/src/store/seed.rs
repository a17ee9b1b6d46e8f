// storefront/src/store/seed.rs

//! Demo catalog for development runs (`SEED_DB=true`).

use crate::models::{Category, Product, ProductDetails, ProductImage, ProductVariant};
use chrono::Utc;
use rust_decimal::Decimal;

pub const DEMO_STOCK_PER_SIZE: i32 = 10;
const APPAREL_SIZES: [&str; 5] = ["XS", "S", "M", "L", "XL"];
const ONE_SIZE: &str = "One Size";
const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

pub struct DemoCatalog {
  pub categories: Vec<Category>,
  pub products: Vec<ProductDetails>,
}

struct DemoProduct {
  name: &'static str,
  slug: &'static str,
  description: &'static str,
  price: i64,
  compare_at_price: Option<i64>,
  category_id: i64,
  featured: bool,
  one_size: bool,
}

const CATEGORIES: [(&str, &str, &str); 5] = [
  ("Tops", "tops", "Blouses, shirts, and tops"),
  ("Bottoms", "bottoms", "Pants, skirts, and shorts"),
  ("Dresses", "dresses", "Dresses and jumpsuits"),
  ("Outerwear", "outerwear", "Jackets, coats, and blazers"),
  ("Accessories", "accessories", "Bags, scarves, and jewelry"),
];

const PRODUCTS: [DemoProduct; 8] = [
  DemoProduct {
    name: "Silk Camisole",
    slug: "silk-camisole",
    description: "A luxurious silk camisole with delicate lace trim. Perfect for layering or wearing on its own for an elegant evening look.",
    price: 89,
    compare_at_price: Some(120),
    category_id: 1,
    featured: true,
    one_size: false,
  },
  DemoProduct {
    name: "Linen Wide-Leg Trousers",
    slug: "linen-wide-leg-trousers",
    description: "Breezy linen trousers with a wide-leg silhouette. Features a high waist and side pockets for effortless style.",
    price: 145,
    compare_at_price: None,
    category_id: 2,
    featured: true,
    one_size: false,
  },
  DemoProduct {
    name: "Wrap Midi Dress",
    slug: "wrap-midi-dress",
    description: "A flattering wrap dress in a beautiful midi length. The perfect desk-to-dinner piece that transitions seamlessly.",
    price: 195,
    compare_at_price: None,
    category_id: 3,
    featured: true,
    one_size: false,
  },
  DemoProduct {
    name: "Oversized Wool Blazer",
    slug: "oversized-wool-blazer",
    description: "A timeless oversized blazer crafted from premium wool blend. Features structured shoulders and a relaxed fit.",
    price: 285,
    compare_at_price: Some(340),
    category_id: 4,
    featured: true,
    one_size: false,
  },
  DemoProduct {
    name: "Cashmere Scarf",
    slug: "cashmere-scarf",
    description: "Ultra-soft cashmere scarf in a generous size. Adds warmth and sophistication to any outfit.",
    price: 125,
    compare_at_price: None,
    category_id: 5,
    featured: false,
    one_size: true,
  },
  DemoProduct {
    name: "Ribbed Knit Top",
    slug: "ribbed-knit-top",
    description: "A fitted ribbed knit top with a modern square neckline. A wardrobe essential that pairs with everything.",
    price: 65,
    compare_at_price: None,
    category_id: 1,
    featured: false,
    one_size: false,
  },
  DemoProduct {
    name: "Tailored Pencil Skirt",
    slug: "tailored-pencil-skirt",
    description: "A classic pencil skirt with modern tailoring. Features a back slit and hidden zipper closure.",
    price: 110,
    compare_at_price: None,
    category_id: 2,
    featured: false,
    one_size: false,
  },
  DemoProduct {
    name: "Satin Slip Dress",
    slug: "satin-slip-dress",
    description: "An elegant satin slip dress with adjustable straps. Minimalist design that lets the fabric speak for itself.",
    price: 165,
    compare_at_price: None,
    category_id: 3,
    featured: true,
    one_size: false,
  },
];

/// Builds the demo catalog with ids starting at 1. Every size starts at `DEMO_STOCK_PER_SIZE`.
pub fn demo_catalog() -> DemoCatalog {
  let now = Utc::now();
  let categories = CATEGORIES
    .iter()
    .zip(1..)
    .map(|((name, slug, description), id)| Category {
      id,
      name: name.to_string(),
      slug: slug.to_string(),
      description: Some(description.to_string()),
      sort_order: id as i32,
      created_at: now,
    })
    .collect();

  let mut next_variant_id = 0;
  let products = PRODUCTS
    .iter()
    .zip(1..)
    .map(|(demo, id): (&DemoProduct, i64)| {
      let sizes: Vec<&str> = if demo.one_size {
        vec![ONE_SIZE]
      } else {
        APPAREL_SIZES.to_vec()
      };
      let variants = sizes
        .into_iter()
        .map(|size| {
          next_variant_id += 1;
          ProductVariant {
            id: next_variant_id,
            product_id: id,
            size: size.to_string(),
            stock: DEMO_STOCK_PER_SIZE,
            sku: Some(format!("BST-{:03}-{}", id, size)),
          }
        })
        .collect();
      ProductDetails {
        product: Product {
          id,
          name: demo.name.to_string(),
          slug: demo.slug.to_string(),
          description: Some(demo.description.to_string()),
          price: Decimal::from(demo.price),
          compare_at_price: demo.compare_at_price.map(Decimal::from),
          category_id: Some(demo.category_id),
          is_active: true,
          is_featured: demo.featured,
          created_at: now,
          updated_at: now,
        },
        images: vec![ProductImage {
          id,
          product_id: id,
          url: PLACEHOLDER_IMAGE.to_string(),
          alt_text: Some(demo.name.to_string()),
          sort_order: 0,
          is_primary: true,
        }],
        variants,
      }
    })
    .collect();

  DemoCatalog { categories, products }
}
