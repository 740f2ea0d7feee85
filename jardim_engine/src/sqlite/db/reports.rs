use sqlx::SqliteConnection;

use crate::{
    db_types::{Centavos, OrderStatus},
    traits::data_objects::{
        BonusReportRow,
        CommissionReportRow,
        OrderReportRow,
        StatusCount,
        WithdrawalReportRow,
    },
};

/// Order counts for a seller: (total, open, delivered)
pub async fn order_counts_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<(i64, i64, i64), sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(CASE WHEN status NOT IN ('ENTREGUE', 'CANCELADO') THEN 1 ELSE 0 END), 0),
               COALESCE(SUM(CASE WHEN status = 'ENTREGUE' THEN 1 ELSE 0 END), 0)
        FROM orders WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await
}

/// Commission totals for a seller: (pending, paid)
pub async fn commission_totals_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(Centavos, Centavos), sqlx::Error> {
    let (pending, paid): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(CASE WHEN status = 'PENDENTE' THEN amount ELSE 0 END), 0),
               COALESCE(SUM(CASE WHEN status = 'PAGA' THEN amount ELSE 0 END), 0)
        FROM commissions WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok((pending.into(), paid.into()))
}

/// Monetary bonus totals for a seller: (pending, paid)
pub async fn bonus_totals_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(Centavos, Centavos), sqlx::Error> {
    let (pending, paid): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(CASE WHEN status = 'PENDENTE' THEN value ELSE 0 END), 0),
               COALESCE(SUM(CASE WHEN status = 'PAGO' THEN value ELSE 0 END), 0)
        FROM bonuses WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok((pending.into(), paid.into()))
}

/// Seller counts: (total sellers, blocked sellers)
pub async fn seller_counts(conn: &mut SqliteConnection) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_blocked THEN 1 ELSE 0 END), 0)
        FROM users WHERE role = 'VENDEDORA'
        "#,
    )
    .fetch_one(conn)
    .await
}

pub async fn orders_by_status(conn: &mut SqliteConnection) -> Result<Vec<StatusCount>, sqlx::Error> {
    let rows: Vec<(OrderStatus, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status").fetch_all(conn).await?;
    Ok(rows.into_iter().map(|(status, count)| StatusCount { status, count }).collect())
}

/// Payment totals: (amount received, overdue count, overdue amount)
pub async fn payment_totals(conn: &mut SqliteConnection) -> Result<(Centavos, i64, Centavos), sqlx::Error> {
    let (received, overdue, overdue_amount): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(CASE WHEN status = 'PAGO' THEN amount ELSE 0 END), 0),
               COALESCE(SUM(CASE WHEN status = 'ATRASADO' THEN 1 ELSE 0 END), 0),
               COALESCE(SUM(CASE WHEN status = 'ATRASADO' THEN amount ELSE 0 END), 0)
        FROM payments
        "#,
    )
    .fetch_one(conn)
    .await?;
    Ok((received.into(), overdue, overdue_amount.into()))
}

pub async fn pending_commissions_total(conn: &mut SqliteConnection) -> Result<Centavos, sqlx::Error> {
    let sum: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM commissions WHERE status = 'PENDENTE'")
        .fetch_one(conn)
        .await?;
    Ok(sum.into())
}

/// Pending withdrawal requests: (count, amount)
pub async fn pending_withdrawals(conn: &mut SqliteConnection) -> Result<(i64, Centavos), sqlx::Error> {
    let (count, amount): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(amount), 0) FROM withdrawal_requests WHERE status = 'PENDENTE'",
    )
    .fetch_one(conn)
    .await?;
    Ok((count, amount.into()))
}

pub async fn pending_hotel_bookings(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM hotel_bookings WHERE status = 'PENDENTE'").fetch_one(conn).await
}

pub async fn orders_report(conn: &mut SqliteConnection) -> Result<Vec<OrderReportRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT o.id AS order_id, u.name AS seller_name, u.email AS seller_email, o.status, o.payment_plan, o.subtotal,
               COALESCE((SELECT SUM(p.amount) FROM payments p WHERE p.order_id = o.id AND p.status = 'PAGO'), 0)
                   AS amount_paid,
               o.created_at, o.delivered_at
        FROM orders o JOIN users u ON o.user_id = u.id
        ORDER BY o.created_at, o.id
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn commissions_report(conn: &mut SqliteConnection) -> Result<Vec<CommissionReportRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT c.id AS commission_id, c.order_id, u.name AS seller_name, u.email AS seller_email, c.amount, c.status,
               c.created_at, c.paid_at
        FROM commissions c JOIN users u ON c.user_id = u.id
        ORDER BY c.created_at, c.id
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn bonuses_report(conn: &mut SqliteConnection) -> Result<Vec<BonusReportRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT b.id AS bonus_id, u.name AS seller_name, u.email AS seller_email, b.bonus_type, b.value, b.status,
               b.created_at, b.paid_at
        FROM bonuses b JOIN users u ON b.user_id = u.id
        ORDER BY b.created_at, b.id
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn withdrawals_report(conn: &mut SqliteConnection) -> Result<Vec<WithdrawalReportRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT w.id AS withdrawal_id, u.name AS seller_name, u.email AS seller_email, w.amount, w.pix_key, w.status,
               w.admin_note, w.created_at
        FROM withdrawal_requests w JOIN users u ON w.user_id = u.id
        ORDER BY w.created_at, w.id
        "#,
    )
    .fetch_all(conn)
    .await
}
