use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Centavos, Commission};

/// Creates the commission for an order, or updates its amount if it already exists. A commission that has already been
/// paid out is left untouched.
pub async fn upsert_commission(
    order_id: i64,
    user_id: i64,
    amount: Centavos,
    conn: &mut SqliteConnection,
) -> Result<Commission, sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO commissions (order_id, user_id, amount, created_at, updated_at) VALUES ($1, $2, $3, $4, $4)
        ON CONFLICT (order_id) DO UPDATE SET amount = excluded.amount, updated_at = excluded.updated_at
        WHERE commissions.status = 'PENDENTE'
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .bind(amount)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    let commission: Commission =
        sqlx::query_as("SELECT * FROM commissions WHERE order_id = $1").bind(order_id).fetch_one(conn).await?;
    debug!("🗃️ Commission for order #{order_id} is now {}", commission.amount);
    Ok(commission)
}

pub async fn fetch_commissions(user_id: Option<i64>, conn: &mut SqliteConnection) -> Result<Vec<Commission>, sqlx::Error> {
    match user_id {
        Some(id) => {
            sqlx::query_as("SELECT * FROM commissions WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
                .bind(id)
                .fetch_all(conn)
                .await
        },
        None => sqlx::query_as("SELECT * FROM commissions ORDER BY created_at DESC, id DESC").fetch_all(conn).await,
    }
}

/// Pending commissions whose orders are fully paid. These are the ones a withdrawal can pay out.
pub async fn sum_withdrawable(user_id: i64, conn: &mut SqliteConnection) -> Result<Centavos, sqlx::Error> {
    let sum: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(c.amount), 0) FROM commissions c
        WHERE c.user_id = $1 AND c.status = 'PENDENTE'
          AND NOT EXISTS (SELECT 1 FROM payments p WHERE p.order_id = c.order_id AND p.status <> 'PAGO')
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(Centavos::from(sum))
}

/// The commissions a withdrawal can pay out, oldest first
pub async fn fetch_withdrawable(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Commission>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM commissions c
        WHERE c.user_id = $1 AND c.status = 'PENDENTE'
          AND NOT EXISTS (SELECT 1 FROM payments p WHERE p.order_id = c.order_id AND p.status <> 'PAGO')
        ORDER BY c.created_at, c.id
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

pub async fn mark_paid(commission_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    sqlx::query("UPDATE commissions SET status = 'PAGA', paid_at = $1, updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(commission_id)
        .execute(conn)
        .await?;
    Ok(())
}
