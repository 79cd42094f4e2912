//! Order repository.
//!
//! Order creation only happens inside the checkout transaction, so the insert
//! methods take an open connection; reads go through the pool.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use matchday_core::{Money, OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, ShippingAddress};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    total: Money,
    ship_full_name: String,
    ship_line1: String,
    ship_city: String,
    ship_state: String,
    ship_postal_code: String,
    ship_phone: String,
    payment_method: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    product_id: ProductId,
    name: String,
    price: Money,
    quantity: i32,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            status: self.status,
            total: self.total,
            shipping_address: ShippingAddress {
                full_name: self.ship_full_name,
                line1: self.ship_line1,
                city: self.ship_city,
                state: self.ship_state,
                postal_code: self.ship_postal_code,
                phone: self.ship_phone,
            },
            payment_method: self.payment_method,
            items,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity on order {} line",
                row.order_id
            ))
        })?;

        Ok(Self {
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            quantity,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, status, total, ship_full_name, ship_line1, ship_city, \
                             ship_state, ship_postal_code, ship_phone, payment_method, created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn create_in_tx(
        conn: &mut PgConnection,
        user_id: UserId,
        status: OrderStatus,
        total: Money,
        address: &ShippingAddress,
        payment_method: &str,
        items: &[OrderItem],
    ) -> Result<OrderId, RepositoryError> {
        let (order_id,): (OrderId,) = sqlx::query_as(
            "INSERT INTO orders (user_id, status, total, ship_full_name, ship_line1, ship_city, \
                                 ship_state, ship_postal_code, ship_phone, payment_method) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(status)
        .bind(total)
        .bind(&address.full_name)
        .bind(&address.line1)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.phone)
        .bind(payment_method)
        .fetch_one(&mut *conn)
        .await?;

        for item in items {
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| RepositoryError::DataCorruption("quantity exceeds i32".to_owned()))?;
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, price, quantity) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.price)
            .bind(quantity)
            .execute(&mut *conn)
            .await?;
        }

        Ok(order_id)
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self
            .load_items(&[row.id])
            .await?
            .into_iter()
            .map(|(_, item)| item)
            .collect();
        Ok(Some(row.into_order(items)))
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let mut all_items = self.load_items(&ids).await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order_id = row.id;
            let (mine, rest): (Vec<_>, Vec<_>) = all_items
                .into_iter()
                .partition(|(id, _)| *id == order_id);
            all_items = rest;
            orders.push(row.into_order(mine.into_iter().map(|(_, item)| item).collect()));
        }

        Ok(orders)
    }

    /// Load lines for a set of orders, tagged with their order ID.
    async fn load_items(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<(OrderId, OrderItem)>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = order_ids.iter().map(|id| id.as_i32()).collect();
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT order_id, product_id, name, price, quantity \
             FROM order_items WHERE order_id = ANY($1) ORDER BY id ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let order_id = row.order_id;
                OrderItem::try_from(row).map(|item| (order_id, item))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use matchday_core::{Money, OrderStatus, ProductId, UserId};

    use super::*;

    fn row(id: i32) -> OrderRow {
        OrderRow {
            id: OrderId::new(id),
            user_id: UserId::new(1),
            status: OrderStatus::Confirmed,
            total: Money::from_rupees(500),
            ship_full_name: "Asha Rao".to_owned(),
            ship_line1: "14 Stadium Road".to_owned(),
            ship_city: "Pune".to_owned(),
            ship_state: "MH".to_owned(),
            ship_postal_code: "411001".to_owned(),
            ship_phone: "9876543210".to_owned(),
            payment_method: "wallet".to_owned(),
            created_at: Utc::now(),
        }
    }

    fn tagged(order: i32, product: i32) -> (OrderId, OrderItem) {
        (
            OrderId::new(order),
            OrderItem {
                product_id: ProductId::new(product),
                name: format!("product-{product}"),
                price: Money::from_rupees(250),
                quantity: 1,
            },
        )
    }

    #[test]
    fn test_tagged_items_collapse_into_order() {
        // Same untagging as the single-order read path.
        let items: Vec<OrderItem> = vec![tagged(7, 10), tagged(7, 11)]
            .into_iter()
            .map(|(_, item)| item)
            .collect();

        let order = row(7).into_order(items);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_id, ProductId::new(10));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let bad = OrderItemRow {
            order_id: OrderId::new(7),
            product_id: ProductId::new(10),
            name: "product-10".to_owned(),
            price: Money::from_rupees(250),
            quantity: -1,
        };
        assert!(matches!(
            OrderItem::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
