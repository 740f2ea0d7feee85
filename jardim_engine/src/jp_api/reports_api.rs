//! Dashboards and CSV exports.
//!
//! Exports use a plain, spreadsheet-friendly format: money as decimal reais with a dot separator (`75.00`) and
//! timestamps in RFC 3339.
use std::{fmt::Debug, str::FromStr};

use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    accrual::AccrualRules,
    db_types::Centavos,
    traits::{
        data_objects::{AdminDashboard, SellerDashboard},
        ReportsError,
        ReportsManagement,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Orders,
    Commissions,
    Bonuses,
    Withdrawals,
}

impl ReportKind {
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Orders => "orders",
            ReportKind::Commissions => "commissions",
            ReportKind::Bonuses => "bonuses",
            ReportKind::Withdrawals => "withdrawals",
        }
    }
}

impl FromStr for ReportKind {
    type Err = ReportsError;

    /// Accepts the bare name or the file name, e.g. `orders` or `orders.csv`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches(".csv") {
            "orders" => Ok(ReportKind::Orders),
            "commissions" => Ok(ReportKind::Commissions),
            "bonuses" => Ok(ReportKind::Bonuses),
            "withdrawals" => Ok(ReportKind::Withdrawals),
            other => Err(ReportsError::ExportError(format!("Unknown report: {other}"))),
        }
    }
}

pub struct ReportsApi<B> {
    db: B,
    rules: AccrualRules,
}

impl<B: Debug> Debug for ReportsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReportsApi ({:?})", self.db)
    }
}

impl<B> ReportsApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, rules: AccrualRules::default() }
    }

    pub fn with_rules(mut self, rules: AccrualRules) -> Self {
        self.rules = rules;
        self
    }
}

impl<B> ReportsApi<B>
where B: ReportsManagement
{
    pub async fn seller_dashboard(&self, user_id: i64) -> Result<SellerDashboard, ReportsError> {
        self.db.seller_dashboard(user_id, &self.rules).await
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ReportsError> {
        self.db.admin_dashboard().await
    }

    /// Renders the requested report as CSV, header row first.
    pub async fn export_csv(&self, kind: ReportKind) -> Result<String, ReportsError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let rows = match kind {
            ReportKind::Orders => {
                let rows = self.db.orders_report().await?;
                writer.write_record([
                    "order_id",
                    "seller_name",
                    "seller_email",
                    "status",
                    "payment_plan",
                    "subtotal",
                    "amount_paid",
                    "created_at",
                    "delivered_at",
                ])?;
                for r in &rows {
                    writer.write_record([
                        r.order_id.to_string(),
                        r.seller_name.clone(),
                        r.seller_email.clone(),
                        r.status.to_string(),
                        r.payment_plan.to_string(),
                        money(r.subtotal),
                        money(r.amount_paid),
                        timestamp(&r.created_at),
                        r.delivered_at.as_ref().map(timestamp).unwrap_or_default(),
                    ])?;
                }
                rows.len()
            },
            ReportKind::Commissions => {
                let rows = self.db.commissions_report().await?;
                writer.write_record([
                    "commission_id",
                    "order_id",
                    "seller_name",
                    "seller_email",
                    "amount",
                    "status",
                    "created_at",
                    "paid_at",
                ])?;
                for r in &rows {
                    writer.write_record([
                        r.commission_id.to_string(),
                        r.order_id.to_string(),
                        r.seller_name.clone(),
                        r.seller_email.clone(),
                        money(r.amount),
                        r.status.to_string(),
                        timestamp(&r.created_at),
                        r.paid_at.as_ref().map(timestamp).unwrap_or_default(),
                    ])?;
                }
                rows.len()
            },
            ReportKind::Bonuses => {
                let rows = self.db.bonuses_report().await?;
                writer.write_record([
                    "bonus_id",
                    "seller_name",
                    "seller_email",
                    "bonus_type",
                    "value",
                    "status",
                    "created_at",
                    "paid_at",
                ])?;
                for r in &rows {
                    writer.write_record([
                        r.bonus_id.to_string(),
                        r.seller_name.clone(),
                        r.seller_email.clone(),
                        r.bonus_type.to_string(),
                        money(r.value),
                        r.status.to_string(),
                        timestamp(&r.created_at),
                        r.paid_at.as_ref().map(timestamp).unwrap_or_default(),
                    ])?;
                }
                rows.len()
            },
            ReportKind::Withdrawals => {
                let rows = self.db.withdrawals_report().await?;
                writer.write_record([
                    "withdrawal_id",
                    "seller_name",
                    "seller_email",
                    "amount",
                    "pix_key",
                    "status",
                    "admin_note",
                    "created_at",
                ])?;
                for r in &rows {
                    writer.write_record([
                        r.withdrawal_id.to_string(),
                        r.seller_name.clone(),
                        r.seller_email.clone(),
                        money(r.amount),
                        r.pix_key.clone(),
                        r.status.to_string(),
                        r.admin_note.clone().unwrap_or_default(),
                        timestamp(&r.created_at),
                    ])?;
                }
                rows.len()
            },
        };
        let bytes = writer.into_inner().map_err(|e| ReportsError::ExportError(e.to_string()))?;
        let csv = String::from_utf8(bytes).map_err(|e| ReportsError::ExportError(e.to_string()))?;
        debug!("🔄️📊️ Exported {rows} rows to {}", kind.file_name());
        Ok(csv)
    }
}

/// `R$ 1.234,56` is written as `1234.56`
pub fn money(value: Centavos) -> String {
    let v = value.value();
    let sign = if v < 0 { "-" } else { "" };
    format!("{sign}{}.{:02}", v.abs() / 100, v.abs() % 100)
}

fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339()
}
