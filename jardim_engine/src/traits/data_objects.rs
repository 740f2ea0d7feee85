use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{
    Bonus,
    BonusStatus,
    BonusType,
    Centavos,
    Commission,
    CommissionStatus,
    Order,
    OrderItem,
    OrderStatus,
    Payment,
    PaymentPlan,
    Product,
    ProductVariation,
    Role,
    UserStatus,
    WithdrawalRequest,
    WithdrawalStatus,
};

/// An order together with its items and payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWithVariations {
    #[serde(flatten)]
    pub product: Product,
    pub variations: Vec<ProductVariation>,
}

/// The result of a qualifying-sales bonus check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusCheckResult {
    pub user_id: i64,
    pub qualifying_sales: i64,
    pub new_bonuses: Vec<Bonus>,
}

/// The result of a delinquency check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelinquencyResult {
    pub user_id: i64,
    pub overdue_payments: i64,
    pub is_blocked: bool,
    pub status: UserStatus,
    /// True if the block flag or status changed as a result of the check
    pub changed: bool,
}

/// The result of settling one or more payments of a single order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub order: Order,
    pub settled: Vec<Payment>,
    pub commission: Commission,
    pub fully_paid: bool,
    /// Only present once the order is fully paid
    pub bonus_check: Option<BonusCheckResult>,
    /// Present once the order is fully paid, or when an overdue payment was settled
    pub delinquency: Option<DelinquencyResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChange {
    pub old_status: OrderStatus,
    pub order: Order,
    /// Only present when the order was delivered
    pub bonus_check: Option<BonusCheckResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueResult {
    pub payment: Payment,
    pub delinquency: DelinquencyResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueSweepResult {
    pub payments: Vec<Payment>,
    pub delinquency: Vec<DelinquencyResult>,
}

impl OverdueSweepResult {
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

/// Money a seller can request as a withdrawal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub pending_commissions: Centavos,
    pub pending_bonuses: Centavos,
    /// Paid out by earlier withdrawals beyond what they asked for
    pub carried_forward: Centavos,
    pub pending_withdrawals: Centavos,
    pub available: Centavos,
}

impl Balance {
    pub fn new(
        pending_commissions: Centavos,
        pending_bonuses: Centavos,
        carried_forward: Centavos,
        pending_withdrawals: Centavos,
    ) -> Self {
        let available = pending_commissions + pending_bonuses + carried_forward - pending_withdrawals;
        Self { pending_commissions, pending_bonuses, carried_forward, pending_withdrawals, available }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalDecision {
    pub withdrawal: WithdrawalRequest,
    pub commissions_paid: u64,
    pub bonuses_paid: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQueryFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub is_blocked: Option<bool>,
    /// Matches against name, email or CPF
    pub search: Option<String>,
}

impl UserQueryFilter {
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.status.is_none() && self.is_blocked.is_none() && self.search.is_none()
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }
}

//--------------------------------------     Dashboards        ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerDashboard {
    pub user_id: i64,
    pub total_orders: i64,
    pub open_orders: i64,
    pub delivered_orders: i64,
    pub qualifying_sales: i64,
    pub sales_to_next_tier: i64,
    pub has_hotel_award: bool,
    pub commissions_pending: Centavos,
    pub commissions_paid: Centavos,
    pub bonuses_pending: Centavos,
    pub bonuses_paid: Centavos,
    pub balance: Balance,
    pub overdue_payments: i64,
    pub unread_notifications: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_sellers: i64,
    pub blocked_sellers: i64,
    pub orders_by_status: Vec<StatusCount>,
    pub revenue_received: Centavos,
    pub overdue_payments: i64,
    pub overdue_amount: Centavos,
    pub commissions_pending: Centavos,
    pub pending_withdrawals: i64,
    pub pending_withdrawals_amount: Centavos,
    pub pending_hotel_bookings: i64,
}

//--------------------------------------   Report rows         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct OrderReportRow {
    pub order_id: i64,
    pub seller_name: String,
    pub seller_email: String,
    pub status: OrderStatus,
    pub payment_plan: PaymentPlan,
    pub subtotal: Centavos,
    pub amount_paid: Centavos,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct CommissionReportRow {
    pub commission_id: i64,
    pub order_id: i64,
    pub seller_name: String,
    pub seller_email: String,
    pub amount: Centavos,
    pub status: CommissionStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct BonusReportRow {
    pub bonus_id: i64,
    pub seller_name: String,
    pub seller_email: String,
    #[sqlx(try_from = "String")]
    pub bonus_type: BonusType,
    pub value: Centavos,
    pub status: BonusStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct WithdrawalReportRow {
    pub withdrawal_id: i64,
    pub seller_name: String,
    pub seller_email: String,
    pub amount: Centavos,
    pub pix_key: String,
    pub status: WithdrawalStatus,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Commission listing with running totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSummary {
    pub commissions: Vec<Commission>,
    pub total_pending: Centavos,
    pub total_paid: Centavos,
}

impl CommissionSummary {
    pub fn new(commissions: Vec<Commission>) -> Self {
        let total_pending =
            commissions.iter().filter(|c| c.status == CommissionStatus::Pendente).map(|c| c.amount).sum();
        let total_paid = commissions.iter().filter(|c| c.status == CommissionStatus::Paga).map(|c| c.amount).sum();
        Self { commissions, total_pending, total_paid }
    }
}
