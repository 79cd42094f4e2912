//! Checkout service.
//!
//! Converts a cart into an order in one database transaction: decrement
//! stock, persist the order as confirmed, debit the wallet, clear the cart.
//! If any step fails the transaction rolls back and nothing is charged,
//! nothing is reserved, and the cart is untouched.

use sqlx::PgPool;
use thiserror::Error;

use matchday_core::{Money, MoneyError, OrderId, OrderStatus, TransactionType, UserId};

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::models::{Cart, OrderItem, ShippingAddress, WalletTransaction};
use crate::services::wallet::{WalletError, WalletService};

/// The only payment method the shop accepts.
pub const PAYMENT_METHOD_WALLET: &str = "wallet";

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout with no cart lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A required shipping field is blank.
    #[error("missing shipping field: {0}")]
    IncompleteShippingInfo(&'static str),

    /// Only wallet payment is supported.
    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    /// A line's stock ran out between add-to-cart and checkout.
    #[error("{name} is out of stock")]
    OutOfStock {
        /// Product name from the cart snapshot.
        name: String,
    },

    /// The cart changed while checkout was running.
    #[error("cart was modified, please retry")]
    CartConflict,

    /// Wallet debit failed.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Monetary arithmetic failed while totaling the cart.
    #[error("amount error: {0}")]
    Amount(#[from] MoneyError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// The result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    /// The confirmed order.
    pub order_id: OrderId,
    /// Amount debited from the wallet.
    pub total: Money,
    /// The ledger entry for the payment.
    pub transaction: WalletTransaction,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run checkout for a cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    /// Returns `CheckoutError::IncompleteShippingInfo` for a blank field.
    /// Returns `CheckoutError::OutOfStock` if stock cannot cover a line.
    /// Returns `CheckoutError::Wallet` if the debit fails.
    /// Returns `CheckoutError::CartConflict` if the cart changed concurrently.
    pub async fn checkout(
        &self,
        user_id: UserId,
        cart: &Cart,
        address: &ShippingAddress,
        payment_method: &str,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let Some(field) = address.first_missing_field() {
            return Err(CheckoutError::IncompleteShippingInfo(field));
        }
        if payment_method != PAYMENT_METHOD_WALLET {
            return Err(CheckoutError::UnsupportedPaymentMethod(
                payment_method.to_owned(),
            ));
        }

        let total = cart.total_amount()?;
        let items: Vec<OrderItem> = cart
            .items
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                name: line.name.clone(),
                price: line.price,
                quantity: line.quantity,
            })
            .collect();

        let mut tx = self.pool.begin().await?;

        for item in &items {
            ProductRepository::decrement_stock(&mut tx, item.product_id, item.quantity)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(_) => CheckoutError::OutOfStock {
                        name: item.name.clone(),
                    },
                    other => CheckoutError::Repository(other),
                })?;
        }

        let order_id = OrderRepository::create_in_tx(
            &mut tx,
            user_id,
            OrderStatus::Confirmed,
            total,
            address,
            payment_method,
            &items,
        )
        .await
        .map_err(CheckoutError::Repository)?;

        let transaction = WalletService::apply_in_tx(
            &mut tx,
            user_id,
            TransactionType::Debit,
            total,
            &format!("Payment for order #{order_id}"),
            Some(order_id),
        )
        .await?;

        CartRepository::clear_in_tx(&mut tx, cart.id, cart.revision)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CheckoutError::CartConflict,
                other => CheckoutError::Repository(other),
            })?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            order_id = %order_id,
            total = %total,
            reference_id = %transaction.reference_id,
            "Checkout complete"
        );

        Ok(CheckoutReceipt {
            order_id,
            total,
            transaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_error_messages() {
        assert_eq!(CheckoutError::EmptyCart.to_string(), "cart is empty");
        assert_eq!(
            CheckoutError::IncompleteShippingInfo("postalCode").to_string(),
            "missing shipping field: postalCode"
        );
        assert_eq!(
            CheckoutError::OutOfStock {
                name: "Team Jersey".to_owned()
            }
            .to_string(),
            "Team Jersey is out of stock"
        );
    }

    #[test]
    fn test_wallet_error_is_transparent() {
        let err = CheckoutError::Wallet(WalletError::InsufficientFunds);
        assert_eq!(err.to_string(), "insufficient wallet balance");
    }
}
