use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{Bonus, BookingStatus, Centavos, HotelBooking, NewHotelBooking, NewWithdrawal, WithdrawalRequest, WithdrawalStatus},
    events::{EventProducers, WithdrawalDecidedEvent},
    traits::{
        data_objects::{Balance, CommissionSummary, WithdrawalDecision},
        RewardsError,
        RewardsManagement,
        UserManagement,
    },
};

pub const MAX_HOTEL_GUESTS: i64 = 4;

/// Commissions, bonuses, withdrawals and hotel bookings.
pub struct RewardsApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B: Debug> Debug for RewardsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RewardsApi ({:?})", self.db)
    }
}

impl<B> RewardsApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> RewardsApi<B>
where B: RewardsManagement + UserManagement
{
    /// Commissions for one seller, or for everyone when `user_id` is `None`.
    pub async fn commissions(&self, user_id: Option<i64>) -> Result<CommissionSummary, RewardsError> {
        let commissions = self.db.fetch_commissions(user_id).await?;
        Ok(CommissionSummary::new(commissions))
    }

    pub async fn bonuses(&self, user_id: Option<i64>) -> Result<Vec<Bonus>, RewardsError> {
        self.db.fetch_bonuses(user_id).await
    }

    pub async fn balance(&self, user_id: i64) -> Result<Balance, RewardsError> {
        self.db.fetch_balance(user_id).await
    }

    /// Requests a PIX payout. Without an explicit key, the key stored on the user's profile is used.
    pub async fn request_withdrawal(
        &self,
        user_id: i64,
        amount: Centavos,
        pix_key: Option<String>,
    ) -> Result<WithdrawalRequest, RewardsError> {
        if !amount.is_positive() {
            return Err(RewardsError::InvalidAmount);
        }
        let user = self.db.fetch_user(user_id).await?.ok_or(RewardsError::UserNotFound(user_id))?;
        let non_blank = |k: String| Some(k.trim().to_string()).filter(|k| !k.is_empty());
        let pix_key = pix_key
            .and_then(non_blank)
            .or_else(|| user.pix_key.and_then(non_blank))
            .ok_or(RewardsError::MissingPixKey)?;
        let request = self.db.create_withdrawal(NewWithdrawal { user_id, amount, pix_key }).await?;
        info!("🔄️💸️ User #{user_id} requested a withdrawal of {amount} (#{})", request.id);
        Ok(request)
    }

    pub async fn withdrawal(&self, withdrawal_id: i64) -> Result<Option<WithdrawalRequest>, RewardsError> {
        self.db.fetch_withdrawal(withdrawal_id).await
    }

    pub async fn withdrawals(
        &self,
        user_id: Option<i64>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRequest>, RewardsError> {
        self.db.fetch_withdrawals(user_id, status).await
    }

    /// Approves a pending withdrawal. The seller's withdrawable commissions and bonuses are marked as paid.
    pub async fn approve_withdrawal(
        &self,
        withdrawal_id: i64,
        note: Option<String>,
    ) -> Result<WithdrawalDecision, RewardsError> {
        let decision = self.db.approve_withdrawal(withdrawal_id, note).await?;
        info!(
            "🔄️💸️ Withdrawal #{withdrawal_id} approved. {} commissions and {} bonuses paid out",
            decision.commissions_paid, decision.bonuses_paid
        );
        self.call_withdrawal_decided_hook(&decision.withdrawal).await;
        Ok(decision)
    }

    pub async fn reject_withdrawal(
        &self,
        withdrawal_id: i64,
        note: Option<String>,
    ) -> Result<WithdrawalRequest, RewardsError> {
        let withdrawal = self.db.reject_withdrawal(withdrawal_id, note).await?;
        info!("🔄️💸️ Withdrawal #{withdrawal_id} rejected");
        self.call_withdrawal_decided_hook(&withdrawal).await;
        Ok(withdrawal)
    }

    /// Books the stay a seller earned with the hotel award.
    pub async fn request_hotel_booking(&self, booking: NewHotelBooking) -> Result<HotelBooking, RewardsError> {
        if booking.check_out <= booking.check_in {
            return Err(RewardsError::InvalidBooking("The check-out date must be after the check-in date".into()));
        }
        if booking.check_in < Utc::now().date_naive() {
            return Err(RewardsError::InvalidBooking("The check-in date is in the past".into()));
        }
        if !(1..=MAX_HOTEL_GUESTS).contains(&booking.guests) {
            return Err(RewardsError::InvalidBooking(format!("Bookings are for 1 to {MAX_HOTEL_GUESTS} guests")));
        }
        let user_id = booking.user_id;
        let booking = self.db.create_hotel_booking(booking).await?;
        info!(
            "🔄️🏨️ User #{user_id} requested hotel booking #{} from {} to {}",
            booking.id, booking.check_in, booking.check_out
        );
        Ok(booking)
    }

    pub async fn hotel_bookings(&self, user_id: Option<i64>) -> Result<Vec<HotelBooking>, RewardsError> {
        self.db.fetch_hotel_bookings(user_id).await
    }

    /// Confirms a pending booking. The hotel award is marked as used.
    pub async fn confirm_hotel_booking(&self, booking_id: i64, note: Option<String>) -> Result<HotelBooking, RewardsError> {
        let booking = self.db.update_hotel_booking(booking_id, BookingStatus::Confirmada, note).await?;
        info!("🔄️🏨️ Hotel booking #{booking_id} confirmed");
        Ok(booking)
    }

    /// Cancels a booking. Cancelling a confirmed booking gives the award back to the seller.
    pub async fn cancel_hotel_booking(&self, booking_id: i64, note: Option<String>) -> Result<HotelBooking, RewardsError> {
        let booking = self.db.update_hotel_booking(booking_id, BookingStatus::Cancelada, note).await?;
        info!("🔄️🏨️ Hotel booking #{booking_id} cancelled");
        Ok(booking)
    }

    async fn call_withdrawal_decided_hook(&self, withdrawal: &WithdrawalRequest) {
        for emitter in &self.producers.withdrawal_decided_producer {
            debug!("🔄️💸️ Notifying withdrawal decided hook subscribers");
            emitter.publish_event(WithdrawalDecidedEvent::new(withdrawal.clone())).await;
        }
    }
}
