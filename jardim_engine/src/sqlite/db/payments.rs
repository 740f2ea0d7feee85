use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::db_types::{Centavos, Payment, PaymentStatus, PaymentType};

pub async fn insert_payment(
    order_id: i64,
    payment_type: PaymentType,
    amount: Centavos,
    due_date: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Payment, sqlx::Error> {
    let payment: Payment = sqlx::query_as(
        r#"
            INSERT INTO payments (order_id, payment_type, amount, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(payment_type)
    .bind(amount)
    .bind(due_date)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Payment #{} ({payment_type}, {amount}) scheduled for order #{order_id}", payment.id);
    Ok(payment)
}

pub async fn fetch_payment(payment_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE id = $1").bind(payment_id).fetch_optional(conn).await
}

pub async fn fetch_payments_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY due_date, id").bind(order_id).fetch_all(conn).await
}

pub async fn mark_paid(
    payment_id: i64,
    gateway_id: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Payment, sqlx::Error> {
    let now = Utc::now();
    let payment: Payment = sqlx::query_as(
        r#"UPDATE payments SET status = $1, paid_at = $2, gateway_id = COALESCE($3, gateway_id), updated_at = $2
           WHERE id = $4 RETURNING *"#,
    )
    .bind(PaymentStatus::Pago)
    .bind(now)
    .bind(gateway_id)
    .bind(payment_id)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Payment #{payment_id} marked as paid");
    Ok(payment)
}

pub async fn mark_overdue(payment_id: i64, conn: &mut SqliteConnection) -> Result<Payment, sqlx::Error> {
    sqlx::query_as("UPDATE payments SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(PaymentStatus::Atrasado)
        .bind(Utc::now())
        .bind(payment_id)
        .fetch_one(conn)
        .await
}

/// Flags every pending payment due before `as_of` as overdue, skipping payments of cancelled orders.
pub async fn mark_all_overdue(as_of: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<Vec<Payment>, sqlx::Error> {
    let payments: Vec<Payment> = sqlx::query_as(
        r#"
        UPDATE payments SET status = 'ATRASADO', updated_at = $1
        WHERE status = 'PENDENTE' AND due_date < $2
          AND order_id IN (SELECT id FROM orders WHERE status <> 'CANCELADO')
        RETURNING *
        "#,
    )
    .bind(Utc::now())
    .bind(as_of)
    .fetch_all(conn)
    .await?;
    trace!("🗃️ {} payments flagged as overdue", payments.len());
    Ok(payments)
}

pub async fn count_overdue_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM payments p JOIN orders o ON p.order_id = o.id
        WHERE o.user_id = $1 AND p.status = 'ATRASADO'
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}
