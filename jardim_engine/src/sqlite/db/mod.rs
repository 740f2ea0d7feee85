//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
//!
//! Timestamps are always bound from Rust rather than using `CURRENT_TIMESTAMP`, so that every stored time has the same
//! textual format and range comparisons in SQL behave.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod accrual;
pub mod bonuses;
pub mod commissions;
pub mod hotel_bookings;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reports;
pub mod users;
pub mod withdrawals;

const SQLITE_DB_URL: &str = "sqlite://data/jardim_prive.db";

pub fn db_url() -> String {
    let result = env::var("JP_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ JP_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
