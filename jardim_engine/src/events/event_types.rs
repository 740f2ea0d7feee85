use serde::{Deserialize, Serialize};

use crate::db_types::{Bonus, Order, UserStatus, WithdrawalRequest};

/// A tier bonus or the hotel award has just been created for a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusGrantedEvent {
    pub bonus: Bonus,
    pub qualifying_sales: i64,
}

impl BonusGrantedEvent {
    pub fn new(bonus: Bonus, qualifying_sales: i64) -> Self {
        Self { bonus, qualifying_sales }
    }
}

/// The delinquency check changed a seller's block flag or account status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelinquencyChangedEvent {
    pub user_id: i64,
    pub overdue_payments: i64,
    pub is_blocked: bool,
    pub status: UserStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalDecidedEvent {
    pub withdrawal: WithdrawalRequest,
}

impl WithdrawalDecidedEvent {
    pub fn new(withdrawal: WithdrawalRequest) -> Self {
        Self { withdrawal }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDeliveredEvent {
    pub order: Order,
}

impl OrderDeliveredEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    BonusGranted(BonusGrantedEvent),
    DelinquencyChanged(DelinquencyChangedEvent),
    WithdrawalDecided(WithdrawalDecidedEvent),
    OrderDelivered(OrderDeliveredEvent),
}
