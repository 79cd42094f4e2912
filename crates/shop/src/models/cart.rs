//! Cart domain types.
//!
//! A cart is a durable row plus line rows; the session only holds its ID.
//! `item_count` and `total_amount` are always derived from the lines, never
//! stored, so they cannot drift from the line data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use matchday_core::{CartId, CartItemId, Money, MoneyError, ProductId, UserId};

/// A single cart line with a price/name snapshot taken at add time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Database ID of this line.
    pub id: CartItemId,
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Product name at the time the line was added.
    pub name: String,
    /// Unit price at the time the line was added.
    pub price: Money,
    /// Quantity, always >= 1 (zero removes the line).
    pub quantity: u32,
    /// Image reference for display.
    pub image_url: Option<String>,
}

impl CartItem {
    /// Price × quantity for this line.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` on decimal overflow.
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.price.checked_mul_quantity(self.quantity)
    }
}

/// A durable cart.
///
/// `user_id` is `None` until a login stamps the authenticated user onto the
/// cart; the cart survives logout. `revision` is the compare-and-swap token
/// guarding concurrent mutations from multiple tabs.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Unique cart ID, held in the session.
    pub id: CartId,
    /// Owning user once known.
    pub user_id: Option<UserId>,
    /// Optimistic concurrency token, bumped on every mutation.
    pub revision: i32,
    /// Cart lines in insertion order.
    pub items: Vec<CartItem>,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// When the cart was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of price × quantity across all lines.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` on decimal overflow.
    pub fn total_amount(&self) -> Result<Money, MoneyError> {
        let mut total = Money::ZERO;
        for item in &self.items {
            total = total.checked_add(item.line_total()?)?;
        }
        Ok(total)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity already in the cart for a product, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, product: i32, price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product_id: ProductId::new(product),
            name: format!("product-{product}"),
            price: Money::from_rupees(price),
            quantity,
            image_url: None,
        }
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart {
            id: CartId::new(1),
            user_id: None,
            revision: 0,
            items,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = cart(vec![]);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total_amount().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_totals_derive_from_lines() {
        let cart = cart(vec![item(1, 10, 250, 2), item(2, 11, 100, 3)]);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total_amount().unwrap(), Money::from_rupees(800));
    }

    #[test]
    fn test_quantity_of() {
        let cart = cart(vec![item(1, 10, 250, 2)]);
        assert_eq!(cart.quantity_of(ProductId::new(10)), 2);
        assert_eq!(cart.quantity_of(ProductId::new(99)), 0);
    }

    #[test]
    fn test_line_total() {
        let line = item(1, 10, 99, 4);
        assert_eq!(line.line_total().unwrap(), Money::from_rupees(396));
    }
}
