use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use jardim_engine::{
    db_types::{Centavos, NewOrderItem, OrderStatus, PaymentPlan, User, WithdrawalStatus},
    order_objects::OrderQueryFilter,
    traits::data_objects::{BonusCheckResult, DelinquencyResult},
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//----------------------------------------------   Auth  ----------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

//----------------------------------------------   Orders  ----------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub items: Vec<NewOrderItem>,
    pub payment_plan: PaymentPlan,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Query parameters for the admin order search. `status` takes a comma-separated list, e.g.
/// `?status=ENVIADO,ENTREGUE&user_id=12`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSearchParams {
    pub user_id: Option<i64>,
    pub status: Option<String>,
    pub payment_plan: Option<PaymentPlan>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TryFrom<OrderSearchParams> for OrderQueryFilter {
    type Error = ServerError;

    fn try_from(params: OrderSearchParams) -> Result<Self, Self::Error> {
        let status = params
            .status
            .map(|s| {
                s.split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.parse::<OrderStatus>().map_err(|e| ServerError::ValidationError(e.to_string())))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(OrderQueryFilter {
            user_id: params.user_id,
            status,
            payment_plan: params.payment_plan,
            since: params.since,
            until: params.until,
        })
    }
}

//----------------------------------------------   Catalog  ----------------------------------------------------
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CatalogParams {
    /// Only admins see deactivated products
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockUpdate {
    pub stock: i64,
}

//----------------------------------------------   Rewards  ----------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequestBody {
    pub amount: Centavos,
    /// Falls back to the PIX key on the user's profile
    #[serde(default)]
    pub pix_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WithdrawalParams {
    pub status: Option<WithdrawalStatus>,
}

/// An optional note an admin attaches to a decision
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionNote {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NotificationParams {
    #[serde(default)]
    pub unread_only: bool,
}

/// The outcome of re-running the bonus and delinquency checks for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualCheckResult {
    pub bonus: BonusCheckResult,
    pub delinquency: DelinquencyResult,
}
