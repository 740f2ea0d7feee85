//! The accrual flows (bonus check, delinquency check and commission settlement) expressed over a single connection.
//!
//! None of these open a transaction themselves. The callers in [`crate::SqliteDatabase`] always run them inside one,
//! together with the change that triggered them.
use chrono::Utc;
use log::{debug, info, trace};
use sqlx::SqliteConnection;

use super::{bonuses, commissions, orders, payments, users};
use crate::{
    accrual::AccrualRules,
    db_types::{OrderStatus, PaymentStatus, UserStatus},
    traits::{
        data_objects::{BonusCheckResult, DelinquencyResult, SettlementResult},
        SalesError,
    },
};

/// Creates any tier bonuses and the hotel award the user is owed, but has not received yet.
pub async fn check_bonus(
    user_id: i64,
    rules: &AccrualRules,
    conn: &mut SqliteConnection,
) -> Result<BonusCheckResult, SalesError> {
    let since = rules.window_start(Utc::now());
    let qualifying_sales =
        bonuses::count_qualifying_sales(user_id, since, rules.qualifying_subtotal, &mut *conn).await?;
    let existing_tiers = bonuses::count_tier_bonuses_since(user_id, since, &mut *conn).await?;
    let has_hotel = bonuses::has_hotel_award(user_id, &mut *conn).await?;
    let due = rules.bonuses_due(qualifying_sales, existing_tiers, has_hotel);
    trace!(
        "🎁️ User #{user_id}: {qualifying_sales} qualifying sales, {existing_tiers} tiers already granted, {} bonuses due",
        due.len()
    );
    let mut new_bonuses = Vec::with_capacity(due.len());
    for bonus_type in due {
        let bonus = bonuses::insert_bonus(user_id, bonus_type, rules.bonus_value(&bonus_type), &mut *conn).await?;
        info!("🎁️ User #{user_id} earned {} worth {}", bonus.bonus_type, bonus.value);
        new_bonuses.push(bonus);
    }
    Ok(BonusCheckResult { user_id, qualifying_sales, new_bonuses })
}

/// Re-evaluates the user's block flag and status from their overdue payments.
pub async fn check_delinquency(
    user_id: i64,
    rules: &AccrualRules,
    conn: &mut SqliteConnection,
) -> Result<DelinquencyResult, SalesError> {
    let user = users::fetch_user(user_id, &mut *conn).await?.ok_or(SalesError::UserNotFound(user_id))?;
    let overdue_payments = payments::count_overdue_for_user(user_id, &mut *conn).await?;
    let state = rules.delinquency_state(overdue_payments);
    let changed = state.is_blocked != user.is_blocked || state.status != user.status;
    if changed {
        users::set_status(user_id, state.status, state.is_blocked, &mut *conn).await?;
        info!(
            "🎁️ User #{user_id} has {overdue_payments} overdue payments. Blocked: {} -> {}, status: {} -> {}",
            user.is_blocked, state.is_blocked, user.status, state.status
        );
    } else {
        trace!("🎁️ User #{user_id} has {overdue_payments} overdue payments. No change.");
    }
    Ok(DelinquencyResult {
        user_id,
        overdue_payments,
        is_blocked: state.is_blocked,
        status: state.status,
        changed,
    })
}

/// Marks the given payments of an order as paid, then recomputes the order's commission.
///
/// If every payment of the order is now paid:
/// * the commission is confirmed at its full value,
/// * the seller is unblocked and set to `ATIVA`,
/// * a `PENDENTE` order moves to `CONFIRMADO`,
/// * and the bonus check runs.
///
/// Otherwise, if one of the settled payments was overdue, the seller's delinquency is re-evaluated.
pub async fn settle(
    order_id: i64,
    payment_ids: &[i64],
    gateway_id: Option<&str>,
    rules: &AccrualRules,
    conn: &mut SqliteConnection,
) -> Result<SettlementResult, SalesError> {
    let order = orders::fetch_order(order_id, &mut *conn).await?.ok_or(SalesError::OrderNotFound(order_id))?;
    if order.status == OrderStatus::Cancelado {
        return Err(SalesError::PaymentModificationForbidden(format!("Order #{order_id} has been cancelled")));
    }
    let settled_overdue = payments::fetch_payments_for_order(order_id, &mut *conn)
        .await?
        .iter()
        .any(|p| p.status == PaymentStatus::Atrasado && payment_ids.contains(&p.id));
    let mut settled = Vec::with_capacity(payment_ids.len());
    for id in payment_ids {
        settled.push(payments::mark_paid(*id, gateway_id, &mut *conn).await?);
    }
    let statuses = payments::fetch_payments_for_order(order_id, &mut *conn)
        .await?
        .into_iter()
        .map(|p| p.status)
        .collect::<Vec<_>>();
    let fully_paid = statuses.iter().all(|s| *s == PaymentStatus::Pago);
    let amount = rules.commission_for(order.subtotal, &statuses);
    let commission = commissions::upsert_commission(order_id, order.user_id, amount, &mut *conn).await?;
    debug!("🔄️💰️ Order #{order_id}: {} payments settled, commission {}", settled.len(), commission.amount);
    if !fully_paid {
        let delinquency =
            if settled_overdue { Some(check_delinquency(order.user_id, rules, &mut *conn).await?) } else { None };
        return Ok(SettlementResult { order, settled, commission, fully_paid, bonus_check: None, delinquency });
    }
    let delinquency = unblock(order.user_id, &mut *conn).await?;
    if delinquency.changed {
        info!("🔄️💰️ Order #{order_id} is fully paid. User #{} is active and unblocked", order.user_id);
    }
    let order = if order.status == OrderStatus::Pendente {
        orders::update_order_status(order_id, OrderStatus::Confirmado, None, &mut *conn).await?
    } else {
        order
    };
    let bonus_check = check_bonus(order.user_id, rules, &mut *conn).await?;
    Ok(SettlementResult {
        order,
        settled,
        commission,
        fully_paid,
        bonus_check: Some(bonus_check),
        delinquency: Some(delinquency),
    })
}

async fn unblock(user_id: i64, conn: &mut SqliteConnection) -> Result<DelinquencyResult, SalesError> {
    let user = users::fetch_user(user_id, &mut *conn).await?.ok_or(SalesError::UserNotFound(user_id))?;
    let overdue_payments = payments::count_overdue_for_user(user_id, &mut *conn).await?;
    let changed = user.is_blocked || user.status != UserStatus::Ativa;
    if changed {
        users::set_status(user_id, UserStatus::Ativa, false, &mut *conn).await?;
    }
    Ok(DelinquencyResult { user_id, overdue_payments, is_blocked: false, status: UserStatus::Ativa, changed })
}
