//! # Storage backend contracts
//!
//! This module defines the behaviour that database backends need to expose in order to run the Jardim Privé back
//! office.
//!
//! * [`SalesDatabase`] defines the highest level of behaviour: the order, payment and accrual flows. Anything that
//!   grants a commission, a bonus or changes whether a seller is blocked goes through here.
//! * [`UserManagement`] stores sellers and admins.
//! * [`CatalogManagement`] manages products, their variations and stock.
//! * [`RewardsManagement`] reads commissions and bonuses, and handles withdrawals and hotel bookings.
//! * [`NotificationManagement`] stores the in-app notifications.
//! * [`ReportsManagement`] provides the aggregates behind dashboards and CSV exports.
mod catalog_management;
mod notification_management;
mod reports_management;
mod rewards_management;
mod sales_database;
mod user_management;

pub mod data_objects;

pub use catalog_management::{CatalogError, CatalogManagement};
pub use notification_management::{NotificationError, NotificationManagement};
pub use reports_management::{ReportsError, ReportsManagement};
pub use rewards_management::{RewardsError, RewardsManagement};
pub use sales_database::{SalesDatabase, SalesError};
pub use user_management::{UserApiError, UserManagement};
