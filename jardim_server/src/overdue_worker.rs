use std::time::Duration;

use chrono::Utc;
use jardim_engine::{db_types::Payment, events::EventProducers, OrderFlowApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the overdue payment worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// On every tick, pending payments of open orders that are past their due date are flagged as `ATRASADO`, and the
/// delinquency check runs for every seller affected.
pub fn start_overdue_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        let api = OrderFlowApi::new(db, producers);
        info!("🕰️ Overdue payment worker started. Running every {}s", period.as_secs());
        loop {
            timer.tick().await;
            debug!("🕰️ Running overdue payment job");
            match api.sweep_overdue_payments(Utc::now()).await {
                Ok(result) if result.is_empty() => trace!("🕰️ No overdue payments"),
                Ok(result) => {
                    info!("🕰️ {} payments are now overdue", result.payments.len());
                    debug!("🕰️ Overdue payments: {}", payment_list(&result.payments));
                    for d in result.delinquency.iter().filter(|d| d.changed) {
                        info!(
                            "🕰️ User #{} has {} overdue payments. Blocked: {}",
                            d.user_id, d.overdue_payments, d.is_blocked
                        );
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running overdue payment job: {e}");
                },
            }
        }
    })
}

fn payment_list(payments: &[Payment]) -> String {
    payments
        .iter()
        .map(|p| format!("[{}] order #{} {} {} due {}", p.id, p.order_id, p.payment_type, p.amount, p.due_date))
        .collect::<Vec<String>>()
        .join(", ")
}
