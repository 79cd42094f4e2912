//! Cart repository.
//!
//! Carts are durable rows guarded by a revision counter. Every mutation runs
//! in a transaction that first bumps the revision with a compare-and-swap
//! (`WHERE revision = $expected`); a CAS miss means another request mutated
//! the cart concurrently and surfaces as `RepositoryError::Conflict`.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use matchday_core::{CartId, CartItemId, Money, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartItem};

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: Option<UserId>,
    revision: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    product_id: ProductId,
    name: String,
    price: Money,
    quantity: i32,
    image_url: Option<String>,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity on cart line {}: {}",
                row.id, row.quantity
            ))
        })?;

        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            quantity,
            image_url: row.image_url,
        })
    }
}

/// A product snapshot captured onto a cart line at add time.
pub struct LineSnapshot<'s> {
    pub product_id: ProductId,
    pub name: &'s str,
    pub price: Money,
    pub image_url: Option<&'s str>,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: Option<UserId>) -> Result<Cart, RepositoryError> {
        let row: CartRow = sqlx::query_as(
            "INSERT INTO carts (user_id) VALUES ($1) \
             RETURNING id, user_id, revision, created_at, updated_at",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(Cart {
            id: row.id,
            user_id: row.user_id,
            revision: row.revision,
            items: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Get a cart with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(
            "SELECT id, user_id, revision, created_at, updated_at FROM carts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = Self::load_items(self.pool, id).await?;

        Ok(Some(Cart {
            id: row.id,
            user_id: row.user_id,
            revision: row.revision,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    /// Stamp the authenticated user onto a cart at login.
    ///
    /// A no-op if the cart is already owned by this user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn claim_for_user(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE carts SET user_id = $1, updated_at = now() WHERE id = $2")
            .bind(user_id)
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Add a line or bump an existing line's quantity, with a CAS bump.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the revision check fails.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        expected_revision: i32,
        snapshot: &LineSnapshot<'_>,
        quantity: u32,
    ) -> Result<Cart, RepositoryError> {
        let quantity = i32::try_from(quantity)
            .map_err(|_| RepositoryError::DataCorruption("quantity exceeds i32".to_owned()))?;

        let mut tx = self.pool.begin().await?;

        Self::bump_revision(&mut *tx, cart_id, expected_revision).await?;

        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, name, price, quantity, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(snapshot.product_id)
        .bind(snapshot.name)
        .bind(snapshot.price)
        .bind(quantity)
        .bind(snapshot.image_url)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_expected(cart_id).await
    }

    /// Set a line's quantity; zero removes the line. CAS-guarded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the revision check fails.
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    pub async fn set_item_quantity(
        &self,
        cart_id: CartId,
        expected_revision: i32,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        Self::bump_revision(&mut *tx, cart_id, expected_revision).await?;

        let result = if quantity == 0 {
            sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
                .bind(item_id)
                .bind(cart_id)
                .execute(&mut *tx)
                .await?
        } else {
            let quantity = i32::try_from(quantity)
                .map_err(|_| RepositoryError::DataCorruption("quantity exceeds i32".to_owned()))?;
            sqlx::query("UPDATE cart_items SET quantity = $1 WHERE id = $2 AND cart_id = $3")
                .bind(quantity)
                .bind(item_id)
                .bind(cart_id)
                .execute(&mut *tx)
                .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        self.get_expected(cart_id).await
    }

    /// Remove a line. CAS-guarded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the revision check fails.
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        expected_revision: i32,
        item_id: CartItemId,
    ) -> Result<Cart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        Self::bump_revision(&mut *tx, cart_id, expected_revision).await?;

        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
            .bind(item_id)
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        self.get_expected(cart_id).await
    }

    /// Empty a cart inside an open transaction (checkout path).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the revision check fails.
    pub async fn clear_in_tx(
        conn: &mut PgConnection,
        cart_id: CartId,
        expected_revision: i32,
    ) -> Result<(), RepositoryError> {
        Self::bump_revision(conn, cart_id, expected_revision).await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Compare-and-swap bump of the revision counter.
    async fn bump_revision(
        conn: &mut PgConnection,
        cart_id: CartId,
        expected_revision: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE carts SET revision = revision + 1, updated_at = now() \
             WHERE id = $1 AND revision = $2",
        )
        .bind(cart_id)
        .bind(expected_revision)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "cart was modified concurrently".to_owned(),
            ));
        }

        Ok(())
    }

    /// Reload a cart that is known to exist.
    async fn get_expected(&self, cart_id: CartId) -> Result<Cart, RepositoryError> {
        self.get(cart_id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn load_items(pool: &PgPool, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(
            "SELECT id, product_id, name, price, quantity, image_url \
             FROM cart_items WHERE cart_id = $1 ORDER BY id ASC",
        )
        .bind(cart_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(CartItem::try_from).collect()
    }
}
