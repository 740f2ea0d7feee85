//! `SqliteDatabase` is a concrete implementation of a Jardim Privé backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::{collections::BTreeMap, fmt::Debug};

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{
    accrual,
    bonuses,
    commissions,
    db_url,
    hotel_bookings,
    new_pool,
    notifications,
    orders,
    payments,
    products,
    reports,
    users,
    withdrawals,
};
use crate::{
    accrual::{payout_cover, AccrualRules},
    db_types::{
        Bonus,
        BonusStatus,
        BookingStatus,
        Centavos,
        Commission,
        HotelBooking,
        NewHotelBooking,
        NewNotification,
        NewOrder,
        NewProduct,
        NewUser,
        NewVariation,
        NewWithdrawal,
        Notification,
        Order,
        OrderStatus,
        Payment,
        PaymentStatus,
        Product,
        ProductUpdate,
        ProductVariation,
        User,
        UserProfileUpdate,
        UserStatus,
        WithdrawalRequest,
        WithdrawalStatus,
    },
    jp_api::order_objects::OrderQueryFilter,
    traits::{
        data_objects::{
            AdminDashboard,
            Balance,
            BonusCheckResult,
            BonusReportRow,
            CommissionReportRow,
            DelinquencyResult,
            FullOrder,
            OrderReportRow,
            OrderStatusChange,
            OverdueResult,
            OverdueSweepResult,
            ProductWithVariations,
            SellerDashboard,
            SettlementResult,
            UserQueryFilter,
            WithdrawalDecision,
            WithdrawalReportRow,
        },
        CatalogError,
        CatalogManagement,
        NotificationError,
        NotificationManagement,
        ReportsError,
        ReportsManagement,
        RewardsError,
        RewardsManagement,
        SalesDatabase,
        SalesError,
        UserApiError,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl UserManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUser) -> Result<User, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(user, &mut conn).await
    }

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user(user_id, &mut conn).await?)
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user_by_email(email, &mut conn).await?)
    }

    async fn search_users(&self, query: UserQueryFilter) -> Result<Vec<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::search_users(query, &mut conn).await?)
    }

    async fn update_profile(&self, user_id: i64, update: UserProfileUpdate) -> Result<User, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        users::update_profile(user_id, update, &mut conn).await
    }

    async fn set_user_status(&self, user_id: i64, status: UserStatus, is_blocked: bool) -> Result<User, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::set_status(user_id, status, is_blocked, &mut conn).await?;
        user.ok_or(UserApiError::UserNotFound(user_id))
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn create_product(&self, product: NewProduct) -> Result<ProductWithVariations, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let variations = product.variations.clone();
        let product = products::insert_product(product, &mut tx).await?;
        let mut created = Vec::with_capacity(variations.len());
        for variation in variations {
            created.push(products::insert_variation(product.id, variation, &mut tx).await?);
        }
        tx.commit().await?;
        Ok(ProductWithVariations { product, variations: created })
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<ProductWithVariations>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product_with_variations(product_id, &mut conn).await?)
    }

    async fn fetch_products(&self, include_inactive: bool) -> Result<Vec<ProductWithVariations>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_products(include_inactive, &mut conn).await?)
    }

    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::update_product(product_id, update, &mut conn).await
    }

    async fn add_variation(&self, product_id: i64, variation: NewVariation) -> Result<ProductVariation, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_variation(product_id, variation, &mut conn).await
    }

    async fn set_variation_stock(&self, variation_id: i64, stock: i64) -> Result<ProductVariation, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let variation = products::set_stock(variation_id, stock, &mut conn).await?;
        variation.ok_or(CatalogError::VariationNotFound(variation_id))
    }
}

impl SalesDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn place_order(&self, order: NewOrder, min_order_value: Centavos) -> Result<FullOrder, SalesError> {
        if order.items.is_empty() {
            return Err(SalesError::EmptyOrder);
        }
        if let Some(item) = order.items.iter().find(|i| i.quantity < 1) {
            return Err(SalesError::InvalidQuantity(item.quantity));
        }
        // The same variation may be listed more than once; stock is checked against the combined quantity
        let mut quantities = BTreeMap::<i64, i64>::new();
        for item in &order.items {
            *quantities.entry(item.variation_id).or_default() += item.quantity;
        }
        let mut tx = self.pool.begin().await?;
        let user = users::fetch_user(order.user_id, &mut tx).await?.ok_or(SalesError::UserNotFound(order.user_id))?;
        if user.is_restricted() {
            return Err(SalesError::UserBlocked(user.id));
        }
        let mut priced = Vec::with_capacity(quantities.len());
        for (variation_id, quantity) in quantities {
            let v = products::fetch_sellable_variation(variation_id, &mut tx)
                .await?
                .ok_or(SalesError::VariationNotFound(variation_id))?;
            if !v.active {
                return Err(SalesError::ProductInactive(v.product_name));
            }
            if v.stock < quantity {
                let name = format!("{} ({})", v.product_name, v.variation_name);
                return Err(SalesError::InsufficientStock { name, requested: quantity, available: v.stock });
            }
            priced.push(orders::PricedItem {
                variation_id,
                product_name: v.product_name,
                variation_name: v.variation_name,
                quantity,
                unit_price: v.price,
            });
        }
        let subtotal = priced.iter().map(|i| Centavos::from(i.unit_price.value() * i.quantity)).sum::<Centavos>();
        if subtotal < min_order_value {
            return Err(SalesError::BelowMinimumOrder { minimum: min_order_value, subtotal });
        }
        let new_order = orders::insert_order(&order, subtotal, &mut tx).await?;
        let mut items = Vec::with_capacity(priced.len());
        for item in priced {
            let (variation_id, quantity) = (item.variation_id, item.quantity);
            if !products::adjust_stock(variation_id, -quantity, &mut tx).await? {
                return Err(SalesError::InsufficientStock {
                    name: format!("{} ({})", item.product_name, item.variation_name),
                    requested: quantity,
                    available: 0,
                });
            }
            items.push(orders::insert_item(new_order.id, item, &mut tx).await?);
        }
        let mut scheduled = Vec::with_capacity(2);
        for (payment_type, amount, due) in order.payment_plan.schedule(subtotal, new_order.created_at) {
            scheduled.push(payments::insert_payment(new_order.id, payment_type, amount, due, &mut tx).await?);
        }
        tx.commit().await?;
        debug!(
            "🗃️ Order #{} placed by user #{}: {} items, {subtotal}, {} payments",
            new_order.id,
            new_order.user_id,
            items.len(),
            scheduled.len()
        );
        Ok(FullOrder { order: new_order, items, payments: scheduled })
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, SalesError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order(order_id, &mut conn).await?)
    }

    async fn fetch_full_order(&self, order_id: i64) -> Result<Option<FullOrder>, SalesError> {
        let mut conn = self.pool.acquire().await?;
        let Some(order) = orders::fetch_order(order_id, &mut conn).await? else {
            return Ok(None);
        };
        let items = orders::fetch_items(order_id, &mut conn).await?;
        let payments = payments::fetch_payments_for_order(order_id, &mut conn).await?;
        Ok(Some(FullOrder { order, items, payments }))
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, SalesError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::search_orders(query, &mut conn).await?)
    }

    async fn fetch_payment(&self, payment_id: i64) -> Result<Option<Payment>, SalesError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::fetch_payment(payment_id, &mut conn).await?)
    }

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, SalesError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::fetch_payments_for_order(order_id, &mut conn).await?)
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        rules: &AccrualRules,
    ) -> Result<OrderStatusChange, SalesError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(order_id, &mut tx).await?.ok_or(SalesError::OrderNotFound(order_id))?;
        let old_status = order.status;
        if old_status == new_status {
            return Err(SalesError::OrderModificationNoOp);
        }
        if !old_status.can_transition_to(new_status) {
            return Err(SalesError::OrderModificationForbidden { from: old_status, to: new_status });
        }
        if new_status == OrderStatus::Cancelado {
            for item in orders::fetch_items(order_id, &mut tx).await? {
                products::adjust_stock(item.variation_id, item.quantity, &mut tx).await?;
            }
            debug!("🗃️ Stock for cancelled order #{order_id} has been returned");
        }
        let delivered_at = (new_status == OrderStatus::Entregue).then(Utc::now);
        let order = orders::update_order_status(order_id, new_status, delivered_at, &mut tx).await?;
        let bonus_check = match new_status {
            OrderStatus::Entregue => Some(accrual::check_bonus(order.user_id, rules, &mut tx).await?),
            _ => None,
        };
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} moved from {old_status} to {new_status}");
        Ok(OrderStatusChange { old_status, order, bonus_check })
    }

    async fn settle_payment(
        &self,
        payment_id: i64,
        gateway_id: Option<&str>,
        rules: &AccrualRules,
    ) -> Result<SettlementResult, SalesError> {
        let mut tx = self.pool.begin().await?;
        let payment =
            payments::fetch_payment(payment_id, &mut tx).await?.ok_or(SalesError::PaymentNotFound(payment_id))?;
        if payment.status == PaymentStatus::Pago {
            return Err(SalesError::PaymentModificationNoOp);
        }
        let result = accrual::settle(payment.order_id, &[payment_id], gateway_id, rules, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn settle_order(
        &self,
        order_id: i64,
        gateway_id: Option<&str>,
        rules: &AccrualRules,
    ) -> Result<SettlementResult, SalesError> {
        let mut tx = self.pool.begin().await?;
        let outstanding = payments::fetch_payments_for_order(order_id, &mut tx)
            .await?
            .into_iter()
            .filter(|p| p.status != PaymentStatus::Pago)
            .map(|p| p.id)
            .collect::<Vec<_>>();
        if outstanding.is_empty() {
            // Either the order does not exist, or everything was paid already
            return match orders::fetch_order(order_id, &mut tx).await? {
                Some(_) => Err(SalesError::PaymentModificationNoOp),
                None => Err(SalesError::OrderNotFound(order_id)),
            };
        }
        let result = accrual::settle(order_id, &outstanding, gateway_id, rules, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn mark_payment_overdue(&self, payment_id: i64, rules: &AccrualRules) -> Result<OverdueResult, SalesError> {
        let mut tx = self.pool.begin().await?;
        let payment =
            payments::fetch_payment(payment_id, &mut tx).await?.ok_or(SalesError::PaymentNotFound(payment_id))?;
        match payment.status {
            PaymentStatus::Pendente => {},
            PaymentStatus::Atrasado => return Err(SalesError::PaymentModificationNoOp),
            PaymentStatus::Pago => {
                return Err(SalesError::PaymentModificationForbidden(format!("Payment #{payment_id} is already paid")))
            },
        }
        let order = orders::fetch_order(payment.order_id, &mut tx)
            .await?
            .ok_or(SalesError::OrderNotFound(payment.order_id))?;
        let payment = payments::mark_overdue(payment_id, &mut tx).await?;
        let delinquency = accrual::check_delinquency(order.user_id, rules, &mut tx).await?;
        tx.commit().await?;
        Ok(OverdueResult { payment, delinquency })
    }

    async fn mark_overdue_payments(
        &self,
        as_of: DateTime<Utc>,
        rules: &AccrualRules,
    ) -> Result<OverdueSweepResult, SalesError> {
        let mut tx = self.pool.begin().await?;
        let overdue = payments::mark_all_overdue(as_of, &mut tx).await?;
        if overdue.is_empty() {
            tx.commit().await?;
            return Ok(OverdueSweepResult::default());
        }
        let mut user_ids = Vec::new();
        for payment in &overdue {
            if let Some(order) = orders::fetch_order(payment.order_id, &mut tx).await? {
                if !user_ids.contains(&order.user_id) {
                    user_ids.push(order.user_id);
                }
            }
        }
        let mut delinquency = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            delinquency.push(accrual::check_delinquency(user_id, rules, &mut tx).await?);
        }
        tx.commit().await?;
        info!("🗃️ {} payments are now overdue, affecting {} sellers", overdue.len(), delinquency.len());
        Ok(OverdueSweepResult { payments: overdue, delinquency })
    }

    async fn check_bonus(&self, user_id: i64, rules: &AccrualRules) -> Result<BonusCheckResult, SalesError> {
        let mut tx = self.pool.begin().await?;
        if users::fetch_user(user_id, &mut tx).await?.is_none() {
            return Err(SalesError::UserNotFound(user_id));
        }
        let result = accrual::check_bonus(user_id, rules, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn check_delinquency(&self, user_id: i64, rules: &AccrualRules) -> Result<DelinquencyResult, SalesError> {
        let mut tx = self.pool.begin().await?;
        let result = accrual::check_delinquency(user_id, rules, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn close(&mut self) -> Result<(), SalesError> {
        self.pool.close().await;
        Ok(())
    }
}

impl RewardsManagement for SqliteDatabase {
    async fn fetch_commissions(&self, user_id: Option<i64>) -> Result<Vec<Commission>, RewardsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(commissions::fetch_commissions(user_id, &mut conn).await?)
    }

    async fn fetch_bonuses(&self, user_id: Option<i64>) -> Result<Vec<Bonus>, RewardsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(bonuses::fetch_bonuses(user_id, &mut conn).await?)
    }

    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, RewardsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::fetch_balance(user_id, &mut conn).await?)
    }

    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<WithdrawalRequest, RewardsError> {
        if !withdrawal.amount.is_positive() {
            return Err(RewardsError::InvalidAmount);
        }
        let user_id = withdrawal.user_id;
        let mut tx = self.pool.begin().await?;
        let user = users::fetch_user(user_id, &mut tx).await?.ok_or(RewardsError::UserNotFound(user_id))?;
        if user.is_restricted() {
            return Err(RewardsError::UserBlocked(user_id));
        }
        let available = withdrawals::fetch_balance(user_id, &mut tx).await?.available;
        if withdrawal.amount > available {
            return Err(RewardsError::InsufficientBalance { requested: withdrawal.amount, available });
        }
        let request = withdrawals::insert_withdrawal(withdrawal, &mut tx).await?;
        tx.commit().await?;
        Ok(request)
    }

    async fn fetch_withdrawal(&self, withdrawal_id: i64) -> Result<Option<WithdrawalRequest>, RewardsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::fetch_withdrawal(withdrawal_id, &mut conn).await?)
    }

    async fn fetch_withdrawals(
        &self,
        user_id: Option<i64>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRequest>, RewardsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::search_withdrawals(user_id, status, &mut conn).await?)
    }

    async fn approve_withdrawal(
        &self,
        withdrawal_id: i64,
        note: Option<String>,
    ) -> Result<WithdrawalDecision, RewardsError> {
        let mut tx = self.pool.begin().await?;
        let request = withdrawals::fetch_withdrawal(withdrawal_id, &mut tx)
            .await?
            .ok_or(RewardsError::WithdrawalNotFound(withdrawal_id))?;
        if request.status != WithdrawalStatus::Pendente {
            return Err(RewardsError::WithdrawalAlreadyDecided(withdrawal_id, request.status));
        }
        let user_id = request.user_id;
        // Earlier approvals may have paid out more than they asked for
        let needed = request.amount - withdrawals::sum_carried_forward(user_id, &mut tx).await?;
        let open_commissions = commissions::fetch_withdrawable(user_id, &mut tx).await?;
        let open_bonuses = bonuses::fetch_withdrawable(user_id, &mut tx).await?;
        let values =
            open_commissions.iter().map(|c| c.amount).chain(open_bonuses.iter().map(|b| b.value)).collect::<Vec<_>>();
        let Some((count, paid_out)) = payout_cover(needed, &values) else {
            let available = withdrawals::fetch_balance(user_id, &mut tx).await?.available + request.amount;
            return Err(RewardsError::InsufficientBalance { requested: request.amount, available });
        };
        let commissions_paid = count.min(open_commissions.len());
        for commission in &open_commissions[..commissions_paid] {
            commissions::mark_paid(commission.id, &mut tx).await?;
        }
        for bonus in &open_bonuses[..count - commissions_paid] {
            bonuses::set_bonus_status(bonus.id, BonusStatus::Pago, &mut tx).await?;
        }
        let withdrawal =
            withdrawals::decide(withdrawal_id, WithdrawalStatus::Aprovado, note, paid_out, &mut tx).await?;
        tx.commit().await?;
        let bonuses_paid = (count - commissions_paid) as u64;
        let commissions_paid = commissions_paid as u64;
        debug!(
            "🗃️ Withdrawal #{withdrawal_id} approved. {commissions_paid} commissions and {bonuses_paid} bonuses worth \
             {paid_out} paid out"
        );
        Ok(WithdrawalDecision { withdrawal, commissions_paid, bonuses_paid })
    }

    async fn reject_withdrawal(
        &self,
        withdrawal_id: i64,
        note: Option<String>,
    ) -> Result<WithdrawalRequest, RewardsError> {
        let mut tx = self.pool.begin().await?;
        let request = withdrawals::fetch_withdrawal(withdrawal_id, &mut tx)
            .await?
            .ok_or(RewardsError::WithdrawalNotFound(withdrawal_id))?;
        if request.status != WithdrawalStatus::Pendente {
            return Err(RewardsError::WithdrawalAlreadyDecided(withdrawal_id, request.status));
        }
        let withdrawal =
            withdrawals::decide(withdrawal_id, WithdrawalStatus::Recusado, note, Centavos::default(), &mut tx).await?;
        tx.commit().await?;
        Ok(withdrawal)
    }

    async fn create_hotel_booking(&self, booking: NewHotelBooking) -> Result<HotelBooking, RewardsError> {
        let user_id = booking.user_id;
        let mut tx = self.pool.begin().await?;
        let user = users::fetch_user(user_id, &mut tx).await?.ok_or(RewardsError::UserNotFound(user_id))?;
        if user.is_restricted() {
            return Err(RewardsError::UserBlocked(user_id));
        }
        let award =
            bonuses::fetch_unused_hotel_award(user_id, &mut tx).await?.ok_or(RewardsError::NoHotelAward(user_id))?;
        if hotel_bookings::has_open_booking(award.id, &mut tx).await? {
            return Err(RewardsError::BookingAlreadyOpen);
        }
        let booking = hotel_bookings::insert_booking(booking, award.id, &mut tx).await?;
        tx.commit().await?;
        Ok(booking)
    }

    async fn fetch_hotel_bookings(&self, user_id: Option<i64>) -> Result<Vec<HotelBooking>, RewardsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(hotel_bookings::fetch_bookings(user_id, &mut conn).await?)
    }

    async fn update_hotel_booking(
        &self,
        booking_id: i64,
        status: BookingStatus,
        note: Option<String>,
    ) -> Result<HotelBooking, RewardsError> {
        let mut tx = self.pool.begin().await?;
        let booking =
            hotel_bookings::fetch_booking(booking_id, &mut tx).await?.ok_or(RewardsError::BookingNotFound(booking_id))?;
        let allowed = matches!(
            (booking.status, status),
            (BookingStatus::Pendente, BookingStatus::Confirmada)
                | (BookingStatus::Pendente, BookingStatus::Cancelada)
                | (BookingStatus::Confirmada, BookingStatus::Cancelada)
        );
        if !allowed {
            return Err(RewardsError::BookingModificationForbidden(booking_id, booking.status, status));
        }
        let updated = hotel_bookings::set_status(booking_id, status, note, &mut tx).await?;
        match (booking.status, status) {
            (_, BookingStatus::Confirmada) => bonuses::set_bonus_status(booking.bonus_id, BonusStatus::Pago, &mut tx).await?,
            (BookingStatus::Confirmada, BookingStatus::Cancelada) => {
                bonuses::set_bonus_status(booking.bonus_id, BonusStatus::Pendente, &mut tx).await?
            },
            _ => {},
        }
        tx.commit().await?;
        debug!("🗃️ Hotel booking #{booking_id} moved from {} to {status}", booking.status);
        Ok(updated)
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        Ok(notifications::insert_notification(notification, &mut conn).await?)
    }

    async fn fetch_notifications(&self, user_id: i64, unread_only: bool) -> Result<Vec<Notification>, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        Ok(notifications::fetch_notifications(user_id, unread_only, &mut conn).await?)
    }

    async fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<Notification, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let notification = notifications::mark_read(user_id, notification_id, &mut conn).await?;
        notification.ok_or(NotificationError::NotificationNotFound(notification_id))
    }
}

impl ReportsManagement for SqliteDatabase {
    async fn seller_dashboard(&self, user_id: i64, rules: &AccrualRules) -> Result<SellerDashboard, ReportsError> {
        let mut conn = self.pool.acquire().await?;
        if users::fetch_user(user_id, &mut conn).await?.is_none() {
            return Err(ReportsError::UserNotFound(user_id));
        }
        let (total_orders, open_orders, delivered_orders) = reports::order_counts_for_user(user_id, &mut conn).await?;
        let since = rules.window_start(Utc::now());
        let qualifying_sales =
            bonuses::count_qualifying_sales(user_id, since, rules.qualifying_subtotal, &mut conn).await?;
        let has_hotel_award = bonuses::has_hotel_award(user_id, &mut conn).await?;
        let (commissions_pending, commissions_paid) = reports::commission_totals_for_user(user_id, &mut conn).await?;
        let (bonuses_pending, bonuses_paid) = reports::bonus_totals_for_user(user_id, &mut conn).await?;
        let balance = withdrawals::fetch_balance(user_id, &mut conn).await?;
        let overdue_payments = payments::count_overdue_for_user(user_id, &mut conn).await?;
        let unread_notifications = notifications::count_unread(user_id, &mut conn).await?;
        Ok(SellerDashboard {
            user_id,
            total_orders,
            open_orders,
            delivered_orders,
            qualifying_sales,
            sales_to_next_tier: rules.sales_to_next_tier(qualifying_sales),
            has_hotel_award,
            commissions_pending,
            commissions_paid,
            bonuses_pending,
            bonuses_paid,
            balance,
            overdue_payments,
            unread_notifications,
        })
    }

    async fn admin_dashboard(&self) -> Result<AdminDashboard, ReportsError> {
        let mut conn = self.pool.acquire().await?;
        let (total_sellers, blocked_sellers) = reports::seller_counts(&mut conn).await?;
        let orders_by_status = reports::orders_by_status(&mut conn).await?;
        let (revenue_received, overdue_payments, overdue_amount) = reports::payment_totals(&mut conn).await?;
        let commissions_pending = reports::pending_commissions_total(&mut conn).await?;
        let (pending_withdrawals, pending_withdrawals_amount) = reports::pending_withdrawals(&mut conn).await?;
        let pending_hotel_bookings = reports::pending_hotel_bookings(&mut conn).await?;
        Ok(AdminDashboard {
            total_sellers,
            blocked_sellers,
            orders_by_status,
            revenue_received,
            overdue_payments,
            overdue_amount,
            commissions_pending,
            pending_withdrawals,
            pending_withdrawals_amount,
            pending_hotel_bookings,
        })
    }

    async fn orders_report(&self) -> Result<Vec<OrderReportRow>, ReportsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(reports::orders_report(&mut conn).await?)
    }

    async fn commissions_report(&self) -> Result<Vec<CommissionReportRow>, ReportsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(reports::commissions_report(&mut conn).await?)
    }

    async fn bonuses_report(&self) -> Result<Vec<BonusReportRow>, ReportsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(reports::bonuses_report(&mut conn).await?)
    }

    async fn withdrawals_report(&self) -> Result<Vec<WithdrawalReportRow>, ReportsError> {
        let mut conn = self.pool.acquire().await?;
        Ok(reports::withdrawals_report(&mut conn).await?)
    }
}
