use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::db_types::{Bonus, BonusStatus, BonusType, Centavos, HOTEL_MAJESTIC, META_PREFIX};

/// Counts qualifying sales for a user delivered at or after `since`: `ENTREGUE` orders, with at least one payment and
/// every payment `PAGO`, and a subtotal of at least `min_subtotal`.
pub async fn count_qualifying_sales(
    user_id: i64,
    since: DateTime<Utc>,
    min_subtotal: Centavos,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM orders o
        WHERE o.user_id = $1
          AND o.status = 'ENTREGUE'
          AND o.delivered_at >= $2
          AND o.subtotal >= $3
          AND EXISTS (SELECT 1 FROM payments p WHERE p.order_id = o.id)
          AND NOT EXISTS (SELECT 1 FROM payments p WHERE p.order_id = o.id AND p.status <> 'PAGO')
        "#,
    )
    .bind(user_id)
    .bind(since)
    .bind(min_subtotal)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ User #{user_id} has {count} qualifying sales since {since}");
    Ok(count)
}

/// Tier bonuses (`META*`) granted to the user at or after `since`
pub async fn count_tier_bonuses_since(
    user_id: i64,
    since: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM bonuses WHERE user_id = $1 AND bonus_type LIKE $2 AND created_at >= $3")
        .bind(user_id)
        .bind(format!("{META_PREFIX}%"))
        .bind(since)
        .fetch_one(conn)
        .await
}

pub async fn has_hotel_award(user_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bonuses WHERE user_id = $1 AND bonus_type = $2)")
            .bind(user_id)
            .bind(HOTEL_MAJESTIC)
            .fetch_one(conn)
            .await?;
    Ok(exists)
}

pub async fn insert_bonus(
    user_id: i64,
    bonus_type: BonusType,
    value: Centavos,
    conn: &mut SqliteConnection,
) -> Result<Bonus, sqlx::Error> {
    let bonus: Bonus = sqlx::query_as(
        "INSERT INTO bonuses (user_id, bonus_type, value, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(user_id)
    .bind(bonus_type.to_string())
    .bind(value)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Bonus {} ({}) granted to user #{user_id}", bonus.bonus_type, bonus.value);
    Ok(bonus)
}

pub async fn fetch_bonus(bonus_id: i64, conn: &mut SqliteConnection) -> Result<Option<Bonus>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bonuses WHERE id = $1").bind(bonus_id).fetch_optional(conn).await
}

pub async fn fetch_bonuses(user_id: Option<i64>, conn: &mut SqliteConnection) -> Result<Vec<Bonus>, sqlx::Error> {
    match user_id {
        Some(id) => {
            sqlx::query_as("SELECT * FROM bonuses WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
                .bind(id)
                .fetch_all(conn)
                .await
        },
        None => sqlx::query_as("SELECT * FROM bonuses ORDER BY created_at DESC, id DESC").fetch_all(conn).await,
    }
}

/// The user's hotel award, if it exists and has not been used yet
pub async fn fetch_unused_hotel_award(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Bonus>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bonuses WHERE user_id = $1 AND bonus_type = $2 AND status = $3")
        .bind(user_id)
        .bind(HOTEL_MAJESTIC)
        .bind(BonusStatus::Pendente)
        .fetch_optional(conn)
        .await
}

pub async fn set_bonus_status(bonus_id: i64, status: BonusStatus, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let paid_at = match status {
        BonusStatus::Pago => Some(Utc::now()),
        BonusStatus::Pendente => None,
    };
    sqlx::query("UPDATE bonuses SET status = $1, paid_at = $2 WHERE id = $3")
        .bind(status)
        .bind(paid_at)
        .bind(bonus_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Pending bonuses with a monetary value
pub async fn sum_withdrawable(user_id: i64, conn: &mut SqliteConnection) -> Result<Centavos, sqlx::Error> {
    let sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(value), 0) FROM bonuses WHERE user_id = $1 AND status = 'PENDENTE' AND value > 0",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(Centavos::from(sum))
}

/// Pending bonuses with a monetary value, oldest first
pub async fn fetch_withdrawable(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Bonus>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM bonuses WHERE user_id = $1 AND status = 'PENDENTE' AND value > 0 ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}
