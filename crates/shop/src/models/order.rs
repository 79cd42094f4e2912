//! Order domain types.
//!
//! Orders are immutable snapshots of a cart taken at checkout. There is no
//! cancel or reorder path; `OrderStatus::Cancelled` has no writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use matchday_core::{Money, OrderId, OrderStatus, ProductId, UserId};

/// Shipping address captured at checkout. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Name of the first empty field, if any. Whitespace-only counts as empty.
    #[must_use]
    pub fn first_missing_field(&self) -> Option<&'static str> {
        let fields: [(&'static str, &str); 6] = [
            ("fullName", &self.full_name),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postalCode", &self.postal_code),
            ("phone", &self.phone),
        ];
        fields
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }
}

/// A line on a persisted order, snapshotted from the cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

/// A durable order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Money,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Rao".to_string(),
            line1: "14 Stadium Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    #[test]
    fn test_complete_address() {
        assert_eq!(address().first_missing_field(), None);
    }

    #[test]
    fn test_missing_field_reported_by_name() {
        let mut addr = address();
        addr.city = String::new();
        assert_eq!(addr.first_missing_field(), Some("city"));
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut addr = address();
        addr.phone = "   ".to_string();
        assert_eq!(addr.first_missing_field(), Some("phone"));
    }
}
