use chrono::Utc;
use log::debug;
use sqlx::{QueryBuilder, SqliteConnection};

use super::{bonuses, commissions};
use crate::{
    db_types::{Centavos, NewWithdrawal, WithdrawalRequest, WithdrawalStatus},
    traits::data_objects::Balance,
};

pub async fn insert_withdrawal(
    withdrawal: NewWithdrawal,
    conn: &mut SqliteConnection,
) -> Result<WithdrawalRequest, sqlx::Error> {
    let request: WithdrawalRequest = sqlx::query_as(
        r#"
        INSERT INTO withdrawal_requests (user_id, amount, pix_key, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING *
        "#,
    )
    .bind(withdrawal.user_id)
    .bind(withdrawal.amount)
    .bind(withdrawal.pix_key)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Withdrawal request #{} for {} created by user #{}", request.id, request.amount, request.user_id);
    Ok(request)
}

pub async fn fetch_withdrawal(
    withdrawal_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<WithdrawalRequest>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM withdrawal_requests WHERE id = $1").bind(withdrawal_id).fetch_optional(conn).await
}

pub async fn search_withdrawals(
    user_id: Option<i64>,
    status: Option<WithdrawalStatus>,
    conn: &mut SqliteConnection,
) -> Result<Vec<WithdrawalRequest>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM withdrawal_requests ");
    if user_id.is_some() || status.is_some() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(id) = user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(id);
    }
    if let Some(status) = status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    builder.build_query_as::<WithdrawalRequest>().fetch_all(conn).await
}

/// Total of the user's withdrawal requests that are still waiting for a decision
pub async fn sum_pending(user_id: i64, conn: &mut SqliteConnection) -> Result<Centavos, sqlx::Error> {
    let sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM withdrawal_requests WHERE user_id = $1 AND status = 'PENDENTE'",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(Centavos::from(sum))
}

/// What approved withdrawals paid out beyond their amounts, net of what later approvals drew from it
pub async fn sum_carried_forward(user_id: i64, conn: &mut SqliteConnection) -> Result<Centavos, sqlx::Error> {
    let sum: i64 = sqlx::query_scalar(
        r#"SELECT COALESCE(SUM(paid_out - amount), 0) FROM withdrawal_requests
           WHERE user_id = $1 AND status = 'APROVADO'"#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(Centavos::from(sum))
}

/// Records the decision on a request. `paid_out` only applies to approvals; pass zero otherwise.
pub async fn decide(
    withdrawal_id: i64,
    status: WithdrawalStatus,
    note: Option<String>,
    paid_out: Centavos,
    conn: &mut SqliteConnection,
) -> Result<WithdrawalRequest, sqlx::Error> {
    sqlx::query_as(
        r#"UPDATE withdrawal_requests
           SET status = $1, admin_note = COALESCE($2, admin_note), paid_out = $3, updated_at = $4
           WHERE id = $5 RETURNING *"#,
    )
    .bind(status)
    .bind(note)
    .bind(paid_out)
    .bind(Utc::now())
    .bind(withdrawal_id)
    .fetch_one(conn)
    .await
}

pub async fn fetch_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Balance, sqlx::Error> {
    let pending_commissions = commissions::sum_withdrawable(user_id, &mut *conn).await?;
    let pending_bonuses = bonuses::sum_withdrawable(user_id, &mut *conn).await?;
    let carried_forward = sum_carried_forward(user_id, &mut *conn).await?;
    let pending_withdrawals = sum_pending(user_id, &mut *conn).await?;
    Ok(Balance::new(pending_commissions, pending_bonuses, carried_forward, pending_withdrawals))
}
