use serde::{Deserialize, Serialize};

use crate::db_types::UserStatus;

/// A self-service sign-up. The password is plain text and is hashed by [`crate::AuthApi::register`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    #[serde(default)]
    pub pix_key: Option<String>,
}

/// Profile changes as submitted by the user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub pix_key: Option<String>,
    pub password: Option<String>,
}

/// An admin's change to a user's account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: UserStatus,
    #[serde(default)]
    pub is_blocked: Option<bool>,
}
