use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Centavos, NewOrder, Order, OrderItem, OrderStatus},
    jp_api::order_objects::OrderQueryFilter,
    traits::SalesError,
};

/// An order line that has already been validated against the catalog
#[derive(Debug, Clone)]
pub struct PricedItem {
    pub variation_id: i64,
    pub product_name: String,
    pub variation_name: String,
    pub quantity: i64,
    pub unit_price: Centavos,
}

/// Inserts a new order row using the given connection. This is not atomic. You can embed this call inside a
/// transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(
    order: &NewOrder,
    subtotal: Centavos,
    conn: &mut SqliteConnection,
) -> Result<Order, SalesError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (user_id, payment_plan, subtotal, shipping_address, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.payment_plan)
    .bind(subtotal)
    .bind(order.shipping_address.as_deref())
    .bind(order.notes.as_deref())
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} inserted for user #{} ({})", order.id, order.user_id, order.subtotal);
    Ok(order)
}

pub async fn insert_item(order_id: i64, item: PricedItem, conn: &mut SqliteConnection) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, variation_id, product_name, variation_name, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(item.variation_id)
    .bind(item.product_name)
    .bind(item.variation_name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .fetch_one(conn)
    .await
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await
}

pub async fn fetch_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id").bind(order_id).fetch_all(conn).await
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in descending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(user_id) = query.user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(user_id);
    }
    if let Some(statuses) = query.status.filter(|s| !s.is_empty()) {
        where_clause.push("status IN (");
        for (i, status) in statuses.into_iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(status);
        }
        where_clause.push_unseparated(")");
    }
    if let Some(plan) = query.payment_plan {
        where_clause.push("payment_plan = ");
        where_clause.push_bind_unseparated(plan);
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {}", orders.len());
    Ok(orders)
}

/// Sets the order status. `delivered_at` is only written when a value is given.
pub async fn update_order_status(
    order_id: i64,
    status: OrderStatus,
    delivered_at: Option<DateTime<Utc>>,
    conn: &mut SqliteConnection,
) -> Result<Order, SalesError> {
    let result: Option<Order> = sqlx::query_as(
        r#"UPDATE orders SET status = $1, delivered_at = COALESCE($2, delivered_at), updated_at = $3
           WHERE id = $4 RETURNING *"#,
    )
    .bind(status)
    .bind(delivered_at)
    .bind(Utc::now())
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(SalesError::OrderNotFound(order_id))
}
