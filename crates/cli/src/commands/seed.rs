//! Seed the catalog with demo products.

use tracing::{info, warn};

use velvet_fig_core::Price;
use velvet_fig_server::db::products::{ProductFilter, ProductRepository};
use velvet_fig_server::models::product::NewProduct;

/// Demo catalog for local development.
fn demo_products() -> Vec<NewProduct> {
    let entry = |name: &str, description: &str, price: &str, category: &str, image: &str, sku: &str| {
        NewProduct {
            name: name.to_owned(),
            description: description.to_owned(),
            price: Price::parse(price).expect("seed prices are valid decimals"),
            category: category.to_owned(),
            images: vec![format!("https://cdn.velvetfig.shop/seed/{image}")],
            in_stock: true,
            sku: Some(sku.to_owned()),
        }
    };

    vec![
        entry(
            "Silk Wrap Dress",
            "Bias-cut midi in washed silk with a self-tie waist.",
            "189.00",
            "dresses",
            "silk-wrap-dress.jpg",
            "VF-DR-001",
        ),
        entry(
            "Wool Trench Coat",
            "Double-breasted trench in brushed Italian wool.",
            "349.00",
            "outerwear",
            "wool-trench.jpg",
            "VF-OW-004",
        ),
        entry(
            "Linen Wide-Leg Trouser",
            "High-rise trouser in heavyweight European linen.",
            "129.00",
            "trousers",
            "linen-wide-leg.jpg",
            "VF-TR-011",
        ),
        entry(
            "Cashmere Crew Sweater",
            "Three-ply cashmere knit with ribbed trims.",
            "219.00",
            "knitwear",
            "cashmere-crew.jpg",
            "VF-KN-007",
        ),
        entry(
            "Leather Shoulder Bag",
            "Vegetable-tanned leather with brass hardware.",
            "259.00",
            "accessories",
            "leather-shoulder-bag.jpg",
            "VF-AC-015",
        ),
    ]
}

/// Insert demo products.
///
/// Refuses to touch a non-empty catalog unless `force` is set.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let repo = ProductRepository::new(&pool);

    let existing = repo.list(&ProductFilter::default()).await?.len();
    if existing > 0 && !force {
        warn!(existing, "Catalog is not empty; pass --force to seed anyway");
        return Ok(());
    }

    let mut inserted = 0usize;
    for product in demo_products() {
        let created = repo.create(&product).await?;
        info!(id = %created.id, name = %created.name, "Seeded product");
        inserted += 1;
    }

    info!(inserted, "Seeding complete");
    Ok(())
}
