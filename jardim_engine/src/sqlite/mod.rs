//! SQLite storage backend for the Jardim Privé back office.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
