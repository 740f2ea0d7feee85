use thiserror::Error;

use crate::{
    helpers::{CpfError, PasswordError},
    traits::UserApiError,
};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid e-mail or password")]
    InvalidCredentials,
    #[error("This account has been deactivated")]
    AccountInactive,
    #[error("The e-mail address {0} is already registered")]
    EmailAlreadyRegistered(String),
    #[error("The CPF is already registered")]
    CpfAlreadyRegistered,
    #[error("Invalid registration data. {0}")]
    ValidationError(String),
    #[error("Could not process the password. {0}")]
    PasswordError(String),
}

impl From<UserApiError> for AuthApiError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::EmailAlreadyRegistered(email) => Self::EmailAlreadyRegistered(email),
            UserApiError::CpfAlreadyRegistered => Self::CpfAlreadyRegistered,
            UserApiError::ValidationError(s) => Self::ValidationError(s),
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

impl From<CpfError> for AuthApiError {
    fn from(e: CpfError) -> Self {
        Self::ValidationError(e.to_string())
    }
}

impl From<PasswordError> for AuthApiError {
    fn from(e: PasswordError) -> Self {
        Self::PasswordError(e.to_string())
    }
}
