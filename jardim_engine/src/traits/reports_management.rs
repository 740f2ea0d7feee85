use thiserror::Error;

use crate::{
    accrual::AccrualRules,
    traits::data_objects::{
        AdminDashboard,
        BonusReportRow,
        CommissionReportRow,
        OrderReportRow,
        SellerDashboard,
        WithdrawalReportRow,
    },
};

#[derive(Debug, Clone, Error)]
pub enum ReportsError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("Could not write report: {0}")]
    ExportError(String),
}

impl From<sqlx::Error> for ReportsError {
    fn from(e: sqlx::Error) -> Self {
        ReportsError::DatabaseError(e.to_string())
    }
}

impl From<csv::Error> for ReportsError {
    fn from(e: csv::Error) -> Self {
        ReportsError::ExportError(e.to_string())
    }
}

/// Read-only aggregate queries backing the dashboards and the CSV exports.
#[allow(async_fn_in_trait)]
pub trait ReportsManagement {
    async fn seller_dashboard(&self, user_id: i64, rules: &AccrualRules) -> Result<SellerDashboard, ReportsError>;

    async fn admin_dashboard(&self) -> Result<AdminDashboard, ReportsError>;

    async fn orders_report(&self) -> Result<Vec<OrderReportRow>, ReportsError>;

    async fn commissions_report(&self) -> Result<Vec<CommissionReportRow>, ReportsError>;

    async fn bonuses_report(&self) -> Result<Vec<BonusReportRow>, ReportsError>;

    async fn withdrawals_report(&self) -> Result<Vec<WithdrawalReportRow>, ReportsError>;
}
