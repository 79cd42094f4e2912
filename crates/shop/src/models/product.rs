//! Product catalog domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use matchday_core::{Money, ProductId};

/// A catalog product. Read-mostly; stock is only decremented at checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Longer description, searchable.
    pub description: String,
    /// Category used for filtering (e.g. "footwear", "apparel").
    pub category: String,
    /// Unit price.
    pub price: Money,
    /// Units currently in stock.
    pub stock: u32,
    /// Catalog image reference.
    pub image_url: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}
