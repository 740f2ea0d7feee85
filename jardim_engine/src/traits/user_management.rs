use thiserror::Error;

use crate::{
    db_types::{NewUser, User, UserProfileUpdate, UserStatus},
    traits::data_objects::UserQueryFilter,
};

#[derive(Debug, Clone, Error)]
pub enum UserApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("The e-mail address {0} is already registered")]
    EmailAlreadyRegistered(String),
    #[error("The CPF is already registered")]
    CpfAlreadyRegistered,
    #[error("Invalid user data. {0}")]
    ValidationError(String),
    #[error("The requested user change would result in a no-op.")]
    UserModificationNoOp,
}

impl From<sqlx::Error> for UserApiError {
    fn from(e: sqlx::Error) -> Self {
        UserApiError::DatabaseError(e.to_string())
    }
}

/// The `UserManagement` trait defines behaviour for storing and querying back-office users (sellers and admins).
///
/// Password hashing and credential checks are not the backend's concern; the backend only ever sees password hashes.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Stores a new user. E-mail addresses and CPFs are unique.
    async fn create_user(&self, user: NewUser) -> Result<User, UserApiError>;

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, UserApiError>;

    /// E-mail lookups are case-insensitive
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserApiError>;

    async fn search_users(&self, query: UserQueryFilter) -> Result<Vec<User>, UserApiError>;

    /// Applies a profile update. An empty update returns [`UserApiError::UserModificationNoOp`].
    async fn update_profile(&self, user_id: i64, update: UserProfileUpdate) -> Result<User, UserApiError>;

    /// Admin override of a user's status and block flag.
    async fn set_user_status(&self, user_id: i64, status: UserStatus, is_blocked: bool) -> Result<User, UserApiError>;
}
