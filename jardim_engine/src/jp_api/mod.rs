//! # Jardim Privé engine public API
//!
//! The `jp_api` module exposes the programmatic API of the back office. Each API object wraps a storage backend that
//! implements the traits it needs, so clients pick only the functionality they use.
//!
//! * [`auth_api`] handles registration, credential checks and the bootstrap admin.
//! * [`accounts_api`] reads and maintains user accounts.
//! * [`catalog_api`] manages products, variations and stock.
//! * [`order_flow_api`] is the primary API for the order and payment flows, and for the accrual checks they trigger.
//! * [`rewards_api`] covers commissions, bonuses, withdrawals and hotel bookings.
//! * [`notifications_api`] stores and reads in-app notifications.
//! * [`reports_api`] provides the dashboards and CSV exports.
//!
//! # API usage
//!
//! ```rust,ignore
//! use jardim_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/jardim_prive.db", 25).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let result = api.settle_order(42, Some("gateway-123")).await?;
//! ```
pub mod account_objects;
pub mod accounts_api;
pub mod auth_api;
pub mod catalog_api;
pub mod errors;
pub mod notifications_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_objects;
pub mod reports_api;
pub mod rewards_api;
