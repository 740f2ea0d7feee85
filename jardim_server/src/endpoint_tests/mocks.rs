use chrono::{DateTime, Utc};
use jardim_engine::{
    accrual::AccrualRules,
    db_types::{
        Bonus,
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
        Product,
        ProductUpdate,
        ProductVariation,
        User,
        UserProfileUpdate,
        UserStatus,
        WithdrawalRequest,
        WithdrawalStatus,
    },
    order_objects::OrderQueryFilter,
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
use mockall::mock;

mock! {
    pub UserManager {}
    impl UserManagement for UserManager {
        async fn create_user(&self, user: NewUser) -> Result<User, UserApiError>;
        async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, UserApiError>;
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserApiError>;
        async fn search_users(&self, query: UserQueryFilter) -> Result<Vec<User>, UserApiError>;
        async fn update_profile(&self, user_id: i64, update: UserProfileUpdate) -> Result<User, UserApiError>;
        async fn set_user_status(&self, user_id: i64, status: UserStatus, is_blocked: bool) -> Result<User, UserApiError>;
    }
}

mock! {
    pub SalesManager {}
    impl Clone for SalesManager {
        fn clone(&self) -> Self;
    }
    impl SalesDatabase for SalesManager {
        fn url(&self) -> &str;
        async fn place_order(&self, order: NewOrder, min_order_value: Centavos) -> Result<FullOrder, SalesError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, SalesError>;
        async fn fetch_full_order(&self, order_id: i64) -> Result<Option<FullOrder>, SalesError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, SalesError>;
        async fn fetch_payment(&self, payment_id: i64) -> Result<Option<Payment>, SalesError>;
        async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, SalesError>;
        async fn update_order_status(&self, order_id: i64, new_status: OrderStatus, rules: &AccrualRules) -> Result<OrderStatusChange, SalesError>;
        async fn settle_payment<'a>(&self, payment_id: i64, gateway_id: Option<&'a str>, rules: &AccrualRules) -> Result<SettlementResult, SalesError>;
        async fn settle_order<'a>(&self, order_id: i64, gateway_id: Option<&'a str>, rules: &AccrualRules) -> Result<SettlementResult, SalesError>;
        async fn mark_payment_overdue(&self, payment_id: i64, rules: &AccrualRules) -> Result<OverdueResult, SalesError>;
        async fn mark_overdue_payments(&self, as_of: DateTime<Utc>, rules: &AccrualRules) -> Result<OverdueSweepResult, SalesError>;
        async fn check_bonus(&self, user_id: i64, rules: &AccrualRules) -> Result<BonusCheckResult, SalesError>;
        async fn check_delinquency(&self, user_id: i64, rules: &AccrualRules) -> Result<DelinquencyResult, SalesError>;
    }
}

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn create_product(&self, product: NewProduct) -> Result<ProductWithVariations, CatalogError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<ProductWithVariations>, CatalogError>;
        async fn fetch_products(&self, include_inactive: bool) -> Result<Vec<ProductWithVariations>, CatalogError>;
        async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, CatalogError>;
        async fn add_variation(&self, product_id: i64, variation: NewVariation) -> Result<ProductVariation, CatalogError>;
        async fn set_variation_stock(&self, variation_id: i64, stock: i64) -> Result<ProductVariation, CatalogError>;
    }
}

// Rewards routes need both traits from the same backend
mock! {
    pub RewardsManager {}
    impl RewardsManagement for RewardsManager {
        async fn fetch_commissions(&self, user_id: Option<i64>) -> Result<Vec<Commission>, RewardsError>;
        async fn fetch_bonuses(&self, user_id: Option<i64>) -> Result<Vec<Bonus>, RewardsError>;
        async fn fetch_balance(&self, user_id: i64) -> Result<Balance, RewardsError>;
        async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<WithdrawalRequest, RewardsError>;
        async fn fetch_withdrawal(&self, withdrawal_id: i64) -> Result<Option<WithdrawalRequest>, RewardsError>;
        async fn fetch_withdrawals(&self, user_id: Option<i64>, status: Option<WithdrawalStatus>) -> Result<Vec<WithdrawalRequest>, RewardsError>;
        async fn approve_withdrawal(&self, withdrawal_id: i64, note: Option<String>) -> Result<WithdrawalDecision, RewardsError>;
        async fn reject_withdrawal(&self, withdrawal_id: i64, note: Option<String>) -> Result<WithdrawalRequest, RewardsError>;
        async fn create_hotel_booking(&self, booking: NewHotelBooking) -> Result<HotelBooking, RewardsError>;
        async fn fetch_hotel_bookings(&self, user_id: Option<i64>) -> Result<Vec<HotelBooking>, RewardsError>;
        async fn update_hotel_booking(&self, booking_id: i64, status: BookingStatus, note: Option<String>) -> Result<HotelBooking, RewardsError>;
    }
    impl UserManagement for RewardsManager {
        async fn create_user(&self, user: NewUser) -> Result<User, UserApiError>;
        async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, UserApiError>;
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserApiError>;
        async fn search_users(&self, query: UserQueryFilter) -> Result<Vec<User>, UserApiError>;
        async fn update_profile(&self, user_id: i64, update: UserProfileUpdate) -> Result<User, UserApiError>;
        async fn set_user_status(&self, user_id: i64, status: UserStatus, is_blocked: bool) -> Result<User, UserApiError>;
    }
}

mock! {
    pub NotificationManager {}
    impl NotificationManagement for NotificationManager {
        async fn create_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError>;
        async fn fetch_notifications(&self, user_id: i64, unread_only: bool) -> Result<Vec<Notification>, NotificationError>;
        async fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<Notification, NotificationError>;
    }
}

mock! {
    pub ReportsManager {}
    impl ReportsManagement for ReportsManager {
        async fn seller_dashboard(&self, user_id: i64, rules: &AccrualRules) -> Result<SellerDashboard, ReportsError>;
        async fn admin_dashboard(&self) -> Result<AdminDashboard, ReportsError>;
        async fn orders_report(&self) -> Result<Vec<OrderReportRow>, ReportsError>;
        async fn commissions_report(&self) -> Result<Vec<CommissionReportRow>, ReportsError>;
        async fn bonuses_report(&self) -> Result<Vec<BonusReportRow>, ReportsError>;
        async fn withdrawals_report(&self) -> Result<Vec<WithdrawalReportRow>, ReportsError>;
    }
}
