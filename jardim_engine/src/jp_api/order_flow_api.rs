use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    accrual::AccrualRules,
    db_types::{Centavos, NewOrder, Order, OrderStatus, Payment},
    events::{BonusGrantedEvent, DelinquencyChangedEvent, EventProducers, OrderDeliveredEvent},
    jp_api::{order_objects::OrderQueryFilter, payment_objects::GatewayNotification},
    traits::{
        data_objects::{
            BonusCheckResult,
            DelinquencyResult,
            FullOrder,
            OrderStatusChange,
            OverdueResult,
            OverdueSweepResult,
            SettlementResult,
        },
        SalesDatabase,
        SalesError,
    },
};

/// The default minimum order subtotal, R$150,00
pub const DEFAULT_MIN_ORDER_VALUE: Centavos = Centavos::from_reais(150);

/// `OrderFlowApi` is the primary API for the order and payment flows: placing orders, moving them through
/// fulfilment, settling and flagging payments, and running the accrual checks those changes trigger.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    rules: AccrualRules,
    min_order_value: Centavos,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi (min order {})", self.min_order_value)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, rules: AccrualRules::default(), min_order_value: DEFAULT_MIN_ORDER_VALUE }
    }

    pub fn with_rules(mut self, rules: AccrualRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_min_order_value(mut self, min_order_value: Centavos) -> Self {
        self.min_order_value = min_order_value;
        self
    }

    pub fn rules(&self) -> &AccrualRules {
        &self.rules
    }

    pub fn min_order_value(&self) -> Centavos {
        self.min_order_value
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: SalesDatabase
{
    /// Places a new order. Stock is reserved and the payment schedule is created in the same transaction.
    pub async fn place_order(&self, order: NewOrder) -> Result<FullOrder, SalesError> {
        let user_id = order.user_id;
        let order = self.db.place_order(order, self.min_order_value).await?;
        info!(
            "🔄️📦️ Order #{} placed by user #{user_id} for {} ({})",
            order.order.id, order.order.subtotal, order.order.payment_plan
        );
        Ok(order)
    }

    pub async fn order(&self, order_id: i64) -> Result<Option<Order>, SalesError> {
        self.db.fetch_order(order_id).await
    }

    pub async fn full_order(&self, order_id: i64) -> Result<Option<FullOrder>, SalesError> {
        self.db.fetch_full_order(order_id).await
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, SalesError> {
        trace!("🔄️📦️ Searching orders. {query}");
        self.db.search_orders(query).await
    }

    pub async fn payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, SalesError> {
        self.db.fetch_payments_for_order(order_id).await
    }

    /// Changes the fulfilment status of an order.
    ///
    /// The allowed transitions are summarised in this table. `→` marks an allowed change; everything else is
    /// `OrderModificationForbidden`, and a change to the same status is `OrderModificationNoOp`.
    ///
    /// | From \ To    | CONFIRMADO | EM_SEPARACAO | ENVIADO | ENTREGUE | CANCELADO |
    /// |--------------|------------|--------------|---------|----------|-----------|
    /// | PENDENTE     | →          | →            | →       | →        | →         |
    /// | CONFIRMADO   |            | →            | →       | →        | →         |
    /// | EM_SEPARACAO |            |              | →       | →        | →         |
    /// | ENVIADO      |            |              |         | →        |           |
    /// | ENTREGUE     |            |              |         |          |           |
    /// | CANCELADO    |            |              |         |          |           |
    ///
    /// ### Cancelling
    /// The stock reserved by the order is returned. Payments of a cancelled order are no longer swept as overdue and
    /// can no longer be settled.
    ///
    /// ### Delivering
    /// `delivered_at` is set and the bonus check runs for the seller. The `OnOrderDelivered` hook fires, and the
    /// `OnBonusGranted` hook fires for every bonus created.
    pub async fn modify_status_for_order(
        &self,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<OrderStatusChange, SalesError> {
        let change = self.db.update_order_status(order_id, new_status, &self.rules).await?;
        info!("🔄️📦️ Order #{order_id} moved from {} to {}", change.old_status, change.order.status);
        if change.order.status == OrderStatus::Entregue {
            self.call_order_delivered_hook(&change.order).await;
        }
        if let Some(check) = &change.bonus_check {
            self.call_bonus_granted_hook(check).await;
        }
        Ok(change)
    }

    /// Settles a single payment. See [`Self::settle_order`] for the side effects.
    pub async fn settle_payment(&self, payment_id: i64) -> Result<SettlementResult, SalesError> {
        let result = self.db.settle_payment(payment_id, None, &self.rules).await?;
        self.after_settlement(&result).await;
        Ok(result)
    }

    /// Settles every outstanding payment of an order.
    ///
    /// * The order's commission is created or updated: half of the full commission while the order is partly paid,
    ///   the full commission once it is fully paid.
    /// * Once fully paid, the seller is unblocked, a `PENDENTE` order is confirmed and the bonus check runs.
    pub async fn settle_order(&self, order_id: i64, gateway_id: Option<&str>) -> Result<SettlementResult, SalesError> {
        let result = self.db.settle_order(order_id, gateway_id, &self.rules).await?;
        self.after_settlement(&result).await;
        Ok(result)
    }

    async fn after_settlement(&self, result: &SettlementResult) {
        info!(
            "🔄️💰️ Order #{}: {} payments settled. Commission is now {}. Fully paid: {}",
            result.order.id,
            result.settled.len(),
            result.commission.amount,
            result.fully_paid
        );
        if let Some(delinquency) = &result.delinquency {
            self.call_delinquency_changed_hook(delinquency).await;
        }
        if let Some(check) = &result.bonus_check {
            self.call_bonus_granted_hook(check).await;
        }
    }

    /// Handles a payment gateway webhook.
    ///
    /// Only `approved` notifications change anything: every outstanding payment of the referenced order is settled.
    /// A repeat notification for an order that is already fully paid is acknowledged and returns `Ok(None)`, as do
    /// notifications with any other status.
    pub async fn process_gateway_notification(
        &self,
        notification: GatewayNotification,
    ) -> Result<Option<SettlementResult>, SalesError> {
        let gateway_id = notification.gateway_id().to_string();
        let Some(order_id) = notification.order_id() else {
            warn!(
                "🔄️💳️ Gateway notification [{gateway_id}] has an invalid order reference: '{}'",
                notification.data.external_reference
            );
            return Err(SalesError::InvalidGatewayNotification(format!(
                "'{}' is not an order id",
                notification.data.external_reference
            )));
        };
        if !notification.is_approved() {
            info!("🔄️💳️ Gateway reports payment [{gateway_id}] for order #{order_id} as '{}'", notification.data.status);
            return Ok(None);
        }
        match self.settle_order(order_id, Some(&gateway_id)).await {
            Ok(result) => Ok(Some(result)),
            Err(SalesError::PaymentModificationNoOp) => {
                info!("🔄️💳️ Order #{order_id} was already fully paid. Ignoring gateway payment [{gateway_id}]");
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    pub async fn mark_payment_overdue(&self, payment_id: i64) -> Result<OverdueResult, SalesError> {
        let result = self.db.mark_payment_overdue(payment_id, &self.rules).await?;
        info!("🔄️⏰️ Payment #{payment_id} of order #{} is overdue", result.payment.order_id);
        self.call_delinquency_changed_hook(&result.delinquency).await;
        Ok(result)
    }

    /// Flags every pending payment that fell due before `as_of` as overdue.
    pub async fn sweep_overdue_payments(&self, as_of: DateTime<Utc>) -> Result<OverdueSweepResult, SalesError> {
        let result = self.db.mark_overdue_payments(as_of, &self.rules).await?;
        for delinquency in &result.delinquency {
            self.call_delinquency_changed_hook(delinquency).await;
        }
        Ok(result)
    }

    pub async fn check_bonus(&self, user_id: i64) -> Result<BonusCheckResult, SalesError> {
        let result = self.db.check_bonus(user_id, &self.rules).await?;
        self.call_bonus_granted_hook(&result).await;
        Ok(result)
    }

    pub async fn check_delinquency(&self, user_id: i64) -> Result<DelinquencyResult, SalesError> {
        let result = self.db.check_delinquency(user_id, &self.rules).await?;
        self.call_delinquency_changed_hook(&result).await;
        Ok(result)
    }

    async fn call_bonus_granted_hook(&self, check: &BonusCheckResult) {
        for emitter in &self.producers.bonus_granted_producer {
            for bonus in &check.new_bonuses {
                debug!("🔄️🎁️ Notifying bonus granted hook subscribers");
                emitter.publish_event(BonusGrantedEvent::new(bonus.clone(), check.qualifying_sales)).await;
            }
        }
    }

    async fn call_delinquency_changed_hook(&self, result: &DelinquencyResult) {
        if !result.changed {
            return;
        }
        for emitter in &self.producers.delinquency_changed_producer {
            debug!("🔄️🚫️ Notifying delinquency changed hook subscribers");
            let event = DelinquencyChangedEvent {
                user_id: result.user_id,
                overdue_payments: result.overdue_payments,
                is_blocked: result.is_blocked,
                status: result.status,
            };
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_delivered_hook(&self, order: &Order) {
        for emitter in &self.producers.order_delivered_producer {
            debug!("🔄️📦️ Notifying order delivered hook subscribers");
            emitter.publish_event(OrderDeliveredEvent::new(order.clone())).await;
        }
    }
}
