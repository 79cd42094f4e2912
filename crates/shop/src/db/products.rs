//! Product catalog repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use matchday_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::Product;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    price: Money,
    stock: i32,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let stock = u32::try_from(row.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative stock for product {}: {}",
                row.id, row.stock
            ))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            stock,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, price, stock, image_url, created_at";

/// Repository for catalog reads and the checkout stock decrement.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products with optional keyword search and category filter.
    ///
    /// The keyword matches name or description case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        keyword: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let pattern = keyword.map(|k| format!("%{}%", k.replace('%', "\\%").replace('_', "\\_")));

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1) \
               AND ($2::text IS NULL OR category = $2) \
             ORDER BY name ASC"
        ))
        .bind(pattern)
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Decrement stock for a product inside an open transaction.
    ///
    /// The `stock >= quantity` guard makes the decrement atomic: if another
    /// checkout drained the stock first, no row matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if stock is insufficient.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn decrement_stock(
        conn: &mut PgConnection,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let quantity = i32::try_from(quantity)
            .map_err(|_| RepositoryError::DataCorruption("quantity exceeds i32".to_owned()))?;

        let result = sqlx::query(
            "UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1",
        )
        .bind(quantity)
        .bind(product_id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict("insufficient stock".to_owned()));
        }

        Ok(())
    }
}
