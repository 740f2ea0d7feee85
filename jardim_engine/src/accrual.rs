//! # Accrual rules
//!
//! The arithmetic behind commissions, tier bonuses and delinquency, kept free of any storage concerns so that the
//! SQLite backend (or any other) can run it inside its own transactions.
//!
//! * **Qualifying sale**: an order that is `ENTREGUE`, whose payments are all `PAGO`, with an item subtotal of at least
//!   [`AccrualRules::qualifying_subtotal`].
//! * **Tier bonuses**: one bonus of [`AccrualRules::tier_bonus`] for every [`AccrualRules::tier_size`] qualifying sales
//!   inside the trailing window. Only the difference against the tiers already granted in that window is created.
//! * **Hotel award**: granted once per user, ever, when the window count reaches [`AccrualRules::hotel_threshold`].
//! * **Delinquency**: a user with [`AccrualRules::delinquency_threshold`] or more overdue payments is blocked.
//! * **Commission**: [`AccrualRules::commission_percent`] of the order subtotal. Half of it is earned while an
//!   installment order is partly paid, and the full figure once every payment is settled.
//! * **Payouts**: an approved withdrawal settles the oldest withdrawable items until their value covers the amount.
//!   Whatever the last item adds beyond that is carried forward in the balance, see [`payout_cover`].
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{BonusType, Centavos, PaymentStatus, UserStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualRules {
    pub commission_percent: i64,
    pub qualifying_subtotal: Centavos,
    pub window_months: u32,
    pub tier_size: i64,
    pub tier_bonus: Centavos,
    pub hotel_threshold: i64,
    pub hotel_bonus_value: Centavos,
    pub delinquency_threshold: i64,
}

impl Default for AccrualRules {
    fn default() -> Self {
        Self {
            commission_percent: 25,
            qualifying_subtotal: Centavos::from_reais(250),
            window_months: 3,
            tier_size: 10,
            tier_bonus: Centavos::from_reais(200),
            hotel_threshold: 60,
            hotel_bonus_value: Centavos::from(0),
            delinquency_threshold: 3,
        }
    }
}

/// The outcome of a delinquency evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelinquencyState {
    pub is_blocked: bool,
    pub status: UserStatus,
}

impl AccrualRules {
    /// Start of the trailing window that ends at `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.window_months)).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether a delivered order counts towards the bonus tiers.
    pub fn is_qualifying(&self, subtotal: Centavos, payments: &[PaymentStatus]) -> bool {
        subtotal >= self.qualifying_subtotal
            && !payments.is_empty()
            && payments.iter().all(|s| *s == PaymentStatus::Pago)
    }

    /// Number of tier bonuses owed for `qualifying_sales` sales in the window
    pub fn tiers_owed(&self, qualifying_sales: i64) -> i64 {
        if self.tier_size <= 0 || qualifying_sales <= 0 {
            return 0;
        }
        qualifying_sales / self.tier_size
    }

    /// Sales still needed to reach the next tier.
    pub fn sales_to_next_tier(&self, qualifying_sales: i64) -> i64 {
        let next = (self.tiers_owed(qualifying_sales) + 1) * self.tier_size;
        next - qualifying_sales.max(0)
    }

    /// The bonuses that must be created, given the window count and what has already been granted.
    ///
    /// `existing_tiers` is the number of tier bonuses recorded for the user inside the same window. New tiers are named
    /// after their thresholds, continuing from the existing ones. Calling this again with the counts updated to
    /// include its previous output always yields an empty list.
    pub fn bonuses_due(&self, qualifying_sales: i64, existing_tiers: i64, has_hotel_award: bool) -> Vec<BonusType> {
        let owed = self.tiers_owed(qualifying_sales);
        let mut due = ((existing_tiers.max(0) + 1)..=owed)
            .map(|tier| BonusType::Meta(tier * self.tier_size))
            .collect::<Vec<_>>();
        if qualifying_sales >= self.hotel_threshold && !has_hotel_award {
            due.push(BonusType::HotelMajestic);
        }
        due
    }

    pub fn bonus_value(&self, bonus_type: &BonusType) -> Centavos {
        match bonus_type {
            BonusType::Meta(_) => self.tier_bonus,
            BonusType::HotelMajestic => self.hotel_bonus_value,
        }
    }

    pub fn is_delinquent(&self, overdue_payments: i64) -> bool {
        overdue_payments >= self.delinquency_threshold
    }

    /// Full re-evaluation of a user's block flag and status. The outcome depends on the overdue count alone.
    pub fn delinquency_state(&self, overdue_payments: i64) -> DelinquencyState {
        let is_blocked = self.is_delinquent(overdue_payments);
        let status = if is_blocked { UserStatus::Inadimplente } else { UserStatus::Ativa };
        DelinquencyState { is_blocked, status }
    }

    pub fn full_commission(&self, subtotal: Centavos) -> Centavos {
        subtotal.percent(self.commission_percent)
    }

    /// Commission earned on an order, given the current status of each of its payments.
    ///
    /// The result only depends on how many payments are settled, not on which ones.
    pub fn commission_for(&self, subtotal: Centavos, payments: &[PaymentStatus]) -> Centavos {
        let full = self.full_commission(subtotal);
        let paid = payments.iter().filter(|s| **s == PaymentStatus::Pago).count();
        match paid {
            0 => Centavos::default(),
            n if n == payments.len() => full,
            _ => full.split_in_half().1,
        }
    }
}

/// The number of leading `items` whose total reaches `amount`, together with that total.
///
/// Returns `(0, 0)` for a non-positive amount, and `None` when all the items together fall short.
pub fn payout_cover(amount: Centavos, items: &[Centavos]) -> Option<(usize, Centavos)> {
    let mut covered = Centavos::default();
    let mut count = 0;
    for value in items {
        if covered >= amount {
            break;
        }
        covered += *value;
        count += 1;
    }
    (covered >= amount).then_some((count, covered))
}
