//! Cart service.
//!
//! Wraps the cart repository with stock and quantity validation. All
//! mutations go through the repository's revision guard; a concurrent
//! mutation from another tab surfaces as [`CartError::Conflict`] and the
//! client retries against the fresh cart.

use sqlx::PgPool;
use thiserror::Error;

use matchday_core::{CartId, CartItemId, MoneyError, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::carts::{CartRepository, LineSnapshot};
use crate::db::products::ProductRepository;
use crate::models::Cart;

/// Most units of one product a single cart line may hold.
const MAX_LINE_QUANTITY: u32 = 99;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product being added does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The cart line being changed does not exist.
    #[error("cart item not found")]
    ItemNotFound,

    /// The cart was modified by a concurrent request.
    #[error("cart was modified, please retry")]
    Conflict,

    /// Not enough stock to satisfy the requested quantity.
    #[error("only {available} left in stock")]
    InsufficientStock {
        /// Units still available.
        available: u32,
    },

    /// Quantity outside `1..=MAX_LINE_QUANTITY` (zero is a removal).
    #[error("quantity must be between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Monetary arithmetic failed while deriving totals.
    #[error("amount error: {0}")]
    Amount(#[from] MoneyError),
}

impl From<RepositoryError> for CartError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(_) => Self::Conflict,
            RepositoryError::NotFound => Self::ItemNotFound,
            other => Self::Repository(other),
        }
    }
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Load the session's cart, creating one if the ID is stale or absent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if a database operation fails.
    pub async fn get_or_create(
        &self,
        cart_id: Option<CartId>,
        user_id: Option<UserId>,
    ) -> Result<Cart, CartError> {
        if let Some(id) = cart_id
            && let Some(cart) = self.carts.get(id).await?
        {
            return Ok(cart);
        }

        Ok(self.carts.create(user_id).await?)
    }

    /// Stamp the authenticated user onto a cart at login.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the update fails.
    pub async fn claim_for_user(&self, cart_id: CartId, user_id: UserId) -> Result<(), CartError> {
        self.carts.claim_for_user(cart_id, user_id).await?;
        Ok(())
    }

    /// Add a product to the cart.
    ///
    /// The stock check covers what the cart already holds, so repeated adds
    /// cannot book more units than exist.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the product doesn't exist.
    /// Returns `CartError::InsufficientStock` if stock cannot cover the line.
    /// Returns `CartError::Conflict` if a concurrent mutation won the race.
    pub async fn add_item(
        &self,
        cart: &Cart,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        validate_quantity(quantity)?;

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        let already_held = cart.quantity_of(product_id);
        let wanted = already_held.saturating_add(quantity);
        if wanted > product.stock {
            return Err(CartError::InsufficientStock {
                available: product.stock.saturating_sub(already_held),
            });
        }
        if wanted > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }

        let snapshot = LineSnapshot {
            product_id: product.id,
            name: &product.name,
            price: product.price,
            image_url: product.image_url.as_deref(),
        };

        let updated = self
            .carts
            .add_item(cart.id, cart.revision, &snapshot, quantity)
            .await?;

        tracing::debug!(
            cart_id = %updated.id,
            product_id = %product_id,
            quantity,
            "Added product to cart"
        );

        Ok(updated)
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line doesn't exist.
    /// Returns `CartError::InsufficientStock` if stock cannot cover the line.
    /// Returns `CartError::Conflict` if a concurrent mutation won the race.
    pub async fn set_quantity(
        &self,
        cart: &Cart,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }

        if quantity > 0 {
            let line = cart
                .items
                .iter()
                .find(|item| item.id == item_id)
                .ok_or(CartError::ItemNotFound)?;

            let product = self
                .products
                .get(line.product_id)
                .await?
                .ok_or(CartError::ProductNotFound)?;

            if quantity > product.stock {
                return Err(CartError::InsufficientStock {
                    available: product.stock,
                });
            }
        }

        Ok(self
            .carts
            .set_item_quantity(cart.id, cart.revision, item_id, quantity)
            .await?)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line doesn't exist.
    /// Returns `CartError::Conflict` if a concurrent mutation won the race.
    pub async fn remove_item(&self, cart: &Cart, item_id: CartItemId) -> Result<Cart, CartError> {
        Ok(self
            .carts
            .remove_item(cart.id, cart.revision, item_id)
            .await?)
    }

    /// Reload a cart by ID.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` mapped from a missing cart row.
    pub async fn get(&self, cart_id: CartId) -> Result<Option<Cart>, CartError> {
        Ok(self.carts.get(cart_id).await?)
    }
}

fn validate_quantity(quantity: u32) -> Result<(), CartError> {
    if quantity == 0 || quantity > MAX_LINE_QUANTITY {
        return Err(CartError::InvalidQuantity);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(CartError::InvalidQuantity)
        ));
        assert!(matches!(
            validate_quantity(MAX_LINE_QUANTITY + 1),
            Err(CartError::InvalidQuantity)
        ));
    }

    #[test]
    fn test_repository_conflict_maps_to_cart_conflict() {
        let err = CartError::from(RepositoryError::Conflict("revision".to_owned()));
        assert!(matches!(err, CartError::Conflict));

        let err = CartError::from(RepositoryError::NotFound);
        assert!(matches!(err, CartError::ItemNotFound));
    }

    #[test]
    fn test_data_corruption_is_not_a_conflict() {
        // An out-of-range quantity is a server-side fault, not something the
        // client can resolve by retrying.
        let err = CartError::from(RepositoryError::DataCorruption(
            "quantity exceeds i32".to_owned(),
        ));
        assert!(matches!(err, CartError::Repository(_)));
    }
}
