use rand::seq::SliceRandom;
use rand::Rng;

use shared_models::{NewProduct, Product, ProductUpdate};

pub const CATEGORIES: [&str; 6] = ["Electronics", "Clothing", "Books", "Home", "Sports", "Toys"];
pub const DEFAULT_CATALOG_SIZE: usize = 50;

/// Sample products sessions pick from when creating. Built once at startup
/// and shared read-only between sessions.
#[derive(Debug, Clone)]
pub struct SampleCatalog {
    products: Vec<NewProduct>,
}

impl SampleCatalog {
    pub fn generate(size: usize) -> Self {
        Self::generate_with(size, &mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let products = (1..=size.max(1))
            .map(|i| NewProduct {
                name: format!("Product {}", i),
                description: format!("Description for product {}", i),
                price: random_price(&mut *rng),
                stock: rng.gen_range(0..=100),
                category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
            })
            .collect();

        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn products(&self) -> &[NewProduct] {
        &self.products
    }

    pub fn pick(&self) -> NewProduct {
        self.products
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| self.products[0].clone())
    }
}

impl Default for SampleCatalog {
    fn default() -> Self {
        Self::generate(DEFAULT_CATALOG_SIZE)
    }
}

/// Randomized edit applied to a product the session owns.
pub fn product_update(product: &Product) -> ProductUpdate {
    let mut rng = rand::thread_rng();
    ProductUpdate {
        name: format!("Updated {}", product.name),
        price: random_price(&mut rng),
        stock: rng.gen_range(0..=100),
        description: format!("Updated description for product {}", product.id),
    }
}

fn random_price<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.gen_range(10.0..=1000.0_f64) * 100.0).round() / 100.0
}
