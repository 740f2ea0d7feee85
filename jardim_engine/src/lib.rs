//! Jardim Privé engine
//!
//! The engine holds the business logic of the Jardim Privé back office: a seller storefront with an order and
//! installment-payment flow, commission and bonus accrual, withdrawals, and the admin reports.
//!
//! The library is divided into these sections:
//! 1. Storage ([`traits`] and [`SqliteDatabase`]). The traits define what a backend must provide; the SQLite backend
//!    implements all of them and runs every multi-row change in a single transaction. The domain types live in
//!    [`db_types`].
//! 2. The accrual rules ([`accrual`]): commission percentage, qualifying sales, bonus tiers, the hotel award and the
//!    delinquency threshold, together with the pure arithmetic behind them.
//! 3. The public API ([`mod@jp_api`]), one object per concern, each generic over its backend.
//!
//! The engine also emits events (bonus granted, delinquency changed, withdrawal decided, order delivered) that clients
//! can hook into through [`events`].
pub mod accrual;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod jp_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use accrual::AccrualRules;
pub use jp_api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    catalog_api::CatalogApi,
    errors::AuthApiError,
    notifications_api::NotificationsApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    reports_api::ReportsApi,
    rewards_api::RewardsApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
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
};
