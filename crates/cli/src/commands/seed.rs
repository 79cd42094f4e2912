//! Seed the catalog with demo products.
//!
//! Inserts are keyed on the product name, so re-running the command is
//! harmless.

use matchday_shop::db;

use super::migrate::{MigrationError, database_url};

/// A product row to seed.
struct SeedProduct {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    price: &'static str,
    stock: i32,
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Team Jersey",
        description: "Official home jersey, breathable mesh.",
        category: "apparel",
        price: "1499.00",
        stock: 40,
    },
    SeedProduct {
        name: "Training Football",
        description: "Size 5 match-quality ball.",
        category: "equipment",
        price: "899.00",
        stock: 60,
    },
    SeedProduct {
        name: "Shin Guards",
        description: "Lightweight guards with ankle sleeve.",
        category: "equipment",
        price: "449.00",
        stock: 100,
    },
    SeedProduct {
        name: "Captain Armband",
        description: "Elastic armband, one size.",
        category: "accessories",
        price: "149.00",
        stock: 75,
    },
    SeedProduct {
        name: "Water Bottle",
        description: "1L squeeze bottle with carry loop.",
        category: "accessories",
        price: "249.00",
        stock: 120,
    },
    SeedProduct {
        name: "Goalkeeper Gloves",
        description: "Latex palm, finger protection spines.",
        category: "equipment",
        price: "1299.00",
        stock: 25,
    },
];

/// Seed the catalog.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing or an insert fails.
pub async fn catalog() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let url = database_url()?;
    let pool = db::create_pool(&url).await?;

    let mut inserted = 0_u64;
    for product in CATALOG {
        let result = sqlx::query(
            "INSERT INTO products (name, description, category, price, stock) \
             VALUES ($1, $2, $3, $4::numeric, $5) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.category)
        .bind(product.price)
        .bind(product.stock)
        .execute(&pool)
        .await?;

        inserted += result.rows_affected();
    }

    tracing::info!(
        inserted,
        skipped = CATALOG.len() as u64 - inserted,
        "Catalog seeded"
    );
    Ok(())
}
