use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    accrual::AccrualRules,
    db_types::{Centavos, NewOrder, Order, OrderStatus, Payment},
    jp_api::order_objects::OrderQueryFilter,
    traits::data_objects::{
        BonusCheckResult,
        DelinquencyResult,
        FullOrder,
        OrderStatusChange,
        OverdueResult,
        OverdueSweepResult,
        SettlementResult,
    },
};

/// This trait defines the highest level of behaviour for backends supporting the order and payment flows.
///
/// This behaviour includes:
/// * Placing orders, reserving stock and creating the payment schedule
/// * Order fulfilment status changes
/// * Settling payments, which accrues commission and unblocks the seller
/// * Flagging overdue payments, which can block the seller
/// * The qualifying-sales bonus check and the delinquency check
///
/// Every method that changes more than one row does so in a single atomic transaction, and the accrual checks run
/// inside the same transaction as the change that triggered them.
#[allow(async_fn_in_trait)]
pub trait SalesDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Places a new order for `order.user_id`.
    ///
    /// * The user must exist and may not be blocked or inactive.
    /// * Every item must reference an existing variation of an active product, with enough stock.
    /// * The subtotal must be at least `min_order_value`.
    ///
    /// Stock is reserved, prices are copied into the order items and the payments are created according to the
    /// payment plan.
    async fn place_order(&self, order: NewOrder, min_order_value: Centavos) -> Result<FullOrder, SalesError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, SalesError>;

    async fn fetch_full_order(&self, order_id: i64) -> Result<Option<FullOrder>, SalesError>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, SalesError>;

    async fn fetch_payment(&self, payment_id: i64) -> Result<Option<Payment>, SalesError>;

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, SalesError>;

    /// Moves an order to `new_status`.
    ///
    /// * Transitions not allowed by [`OrderStatus::can_transition_to`] are rejected.
    /// * Cancelling returns the reserved stock.
    /// * Delivering stamps `delivered_at` and runs the bonus check for the seller.
    async fn update_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        rules: &AccrualRules,
    ) -> Result<OrderStatusChange, SalesError>;

    /// Marks a single payment as `PAGO` and runs the commission settlement for its order.
    ///
    /// Settling a payment that is already `PAGO` returns [`SalesError::PaymentModificationNoOp`].
    async fn settle_payment(
        &self,
        payment_id: i64,
        gateway_id: Option<&str>,
        rules: &AccrualRules,
    ) -> Result<SettlementResult, SalesError>;

    /// Marks every outstanding payment of the order as `PAGO` and runs the commission settlement.
    async fn settle_order(
        &self,
        order_id: i64,
        gateway_id: Option<&str>,
        rules: &AccrualRules,
    ) -> Result<SettlementResult, SalesError>;

    /// Marks a `PENDENTE` payment as `ATRASADO` and re-evaluates the seller's delinquency.
    async fn mark_payment_overdue(&self, payment_id: i64, rules: &AccrualRules) -> Result<OverdueResult, SalesError>;

    /// Marks every `PENDENTE` payment due before `as_of` as `ATRASADO`, and re-evaluates delinquency for each seller
    /// affected. Payments of cancelled orders are ignored.
    async fn mark_overdue_payments(
        &self,
        as_of: DateTime<Utc>,
        rules: &AccrualRules,
    ) -> Result<OverdueSweepResult, SalesError>;

    /// The qualifying-sales bonus check. Creates any tier bonuses (and the hotel award) the user is owed and has not
    /// yet received. Running it again without new qualifying sales creates nothing.
    async fn check_bonus(&self, user_id: i64, rules: &AccrualRules) -> Result<BonusCheckResult, SalesError>;

    /// The delinquency check. A full re-evaluation of the user's block flag from their overdue payments.
    async fn check_delinquency(&self, user_id: i64, rules: &AccrualRules) -> Result<DelinquencyResult, SalesError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), SalesError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum SalesError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("User #{0} is blocked and cannot place new orders")]
    UserBlocked(i64),
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("Item quantities must be at least 1, got {0}")]
    InvalidQuantity(i64),
    #[error("Product variation #{0} does not exist")]
    VariationNotFound(i64),
    #[error("The product '{0}' is not available for sale")]
    ProductInactive(String),
    #[error("Not enough stock for {name}. Requested {requested}, available {available}")]
    InsufficientStock { name: String, requested: i64, available: i64 },
    #[error("The minimum order value is {minimum}, but the order subtotal is {subtotal}")]
    BelowMinimumOrder { minimum: Centavos, subtotal: Centavos },
    #[error("The requested order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("The requested payment #{0} does not exist")]
    PaymentNotFound(i64),
    #[error("The requested order change would result in a no-op.")]
    OrderModificationNoOp,
    #[error("An order cannot move from {from} to {to}.")]
    OrderModificationForbidden { from: OrderStatus, to: OrderStatus },
    #[error("The requested payment update would result in a no-op.")]
    PaymentModificationNoOp,
    #[error("The requested payment update is forbidden. {0}")]
    PaymentModificationForbidden(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
    #[error("Invalid payment gateway notification. {0}")]
    InvalidGatewayNotification(String),
}

impl From<sqlx::Error> for SalesError {
    fn from(e: sqlx::Error) -> Self {
        SalesError::DatabaseError(e.to_string())
    }
}
