use thiserror::Error;

use crate::{
    db_types::{
        Bonus,
        BookingStatus,
        Centavos,
        Commission,
        HotelBooking,
        NewHotelBooking,
        NewWithdrawal,
        WithdrawalRequest,
        WithdrawalStatus,
    },
    traits::{
        data_objects::{Balance, WithdrawalDecision},
        UserApiError,
    },
};

#[derive(Debug, Clone, Error)]
pub enum RewardsError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("User #{0} is blocked")]
    UserBlocked(i64),
    #[error("Withdrawal amounts must be positive")]
    InvalidAmount,
    #[error("A PIX key is required for withdrawals")]
    MissingPixKey,
    #[error("Insufficient balance. Requested {requested}, available {available}")]
    InsufficientBalance { requested: Centavos, available: Centavos },
    #[error("Withdrawal request #{0} does not exist")]
    WithdrawalNotFound(i64),
    #[error("Withdrawal request #{0} has already been {1}")]
    WithdrawalAlreadyDecided(i64, WithdrawalStatus),
    #[error("User #{0} has no unused hotel award")]
    NoHotelAward(i64),
    #[error("There is already an open booking for this hotel award")]
    BookingAlreadyOpen,
    #[error("Invalid booking. {0}")]
    InvalidBooking(String),
    #[error("Hotel booking #{0} does not exist")]
    BookingNotFound(i64),
    #[error("Hotel booking #{0} cannot change from {1} to {2}")]
    BookingModificationForbidden(i64, BookingStatus, BookingStatus),
}

impl From<UserApiError> for RewardsError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::UserNotFound(id) => RewardsError::UserNotFound(id),
            other => RewardsError::DatabaseError(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for RewardsError {
    fn from(e: sqlx::Error) -> Self {
        RewardsError::DatabaseError(e.to_string())
    }
}

/// Commissions, bonuses and what sellers do with them: withdrawals and hotel bookings.
///
/// Commissions and bonuses are created by the [`crate::SalesDatabase`] flows; this trait only reads them, and marks
/// them as paid when a withdrawal or booking is approved.
#[allow(async_fn_in_trait)]
pub trait RewardsManagement {
    /// Commissions of one user, or of everyone when `user_id` is `None`. Newest first.
    async fn fetch_commissions(&self, user_id: Option<i64>) -> Result<Vec<Commission>, RewardsError>;

    /// Bonuses of one user, or of everyone when `user_id` is `None`. Newest first.
    async fn fetch_bonuses(&self, user_id: Option<i64>) -> Result<Vec<Bonus>, RewardsError>;

    /// The amount the user may still withdraw.
    ///
    /// Pending commissions count only once their order is fully paid. Non-monetary bonuses (the hotel award) never
    /// count.
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, RewardsError>;

    /// Records a withdrawal request after checking it against the available balance, atomically.
    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<WithdrawalRequest, RewardsError>;

    async fn fetch_withdrawal(&self, withdrawal_id: i64) -> Result<Option<WithdrawalRequest>, RewardsError>;

    async fn fetch_withdrawals(
        &self,
        user_id: Option<i64>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRequest>, RewardsError>;

    /// Approves a pending withdrawal, marking as paid the oldest withdrawable commissions and bonuses that cover its
    /// amount. Anything they add beyond it is carried forward in the balance.
    async fn approve_withdrawal(
        &self,
        withdrawal_id: i64,
        note: Option<String>,
    ) -> Result<WithdrawalDecision, RewardsError>;

    async fn reject_withdrawal(
        &self,
        withdrawal_id: i64,
        note: Option<String>,
    ) -> Result<WithdrawalRequest, RewardsError>;

    /// Books the user's unused hotel award. Only one open booking per award is allowed.
    async fn create_hotel_booking(&self, booking: NewHotelBooking) -> Result<HotelBooking, RewardsError>;

    async fn fetch_hotel_bookings(&self, user_id: Option<i64>) -> Result<Vec<HotelBooking>, RewardsError>;

    /// Confirming marks the hotel award as used; cancelling a confirmed booking releases it again.
    async fn update_hotel_booking(
        &self,
        booking_id: i64,
        status: BookingStatus,
        note: Option<String>,
    ) -> Result<HotelBooking, RewardsError>;
}
