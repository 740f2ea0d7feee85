//! Unifies API for reading and maintaining user accounts.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{User, UserProfileUpdate, UserStatus},
    helpers::hash_password,
    jp_api::{
        account_objects::{ProfileChanges, StatusChange},
        auth_api::MIN_PASSWORD_LENGTH,
    },
    traits::{data_objects::UserQueryFilter, UserApiError, UserManagement},
};

/// The `AccountApi` provides a unified API for accessing user accounts.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the user with the given id. If no user exists, `None` is returned.
    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, UserApiError> {
        self.db.fetch_user(user_id).await
    }

    pub async fn search_users(&self, query: UserQueryFilter) -> Result<Vec<User>, UserApiError> {
        self.db.search_users(query).await
    }

    /// Applies a user's own profile changes. A new password is hashed before it reaches the database.
    pub async fn update_profile(&self, user_id: i64, changes: ProfileChanges) -> Result<User, UserApiError> {
        let name = match changes.name.map(|n| n.trim().to_string()) {
            Some(n) if n.is_empty() => return Err(UserApiError::ValidationError("The name cannot be empty".into())),
            n => n,
        };
        let password_hash = match changes.password {
            Some(p) if p.chars().count() < MIN_PASSWORD_LENGTH => {
                return Err(UserApiError::ValidationError(format!(
                    "Passwords must have at least {MIN_PASSWORD_LENGTH} characters"
                )))
            },
            Some(p) => Some(hash_password(&p).map_err(|e| UserApiError::ValidationError(e.to_string()))?),
            None => None,
        };
        let update = UserProfileUpdate {
            name,
            phone: changes.phone.map(|p| p.trim().to_string()),
            pix_key: changes.pix_key.map(|p| p.trim().to_string()),
            password_hash,
        };
        if update.is_empty() {
            return Err(UserApiError::UserModificationNoOp);
        }
        let user = self.db.update_profile(user_id, update).await?;
        debug!("🔄️👤️ User #{user_id} updated their profile");
        Ok(user)
    }

    /// Admin activation toggle. `INADIMPLENTE` is owned by the delinquency check and cannot be set by hand.
    ///
    /// When `is_blocked` is omitted, the current block flag is kept.
    pub async fn set_user_status(&self, user_id: i64, change: StatusChange) -> Result<User, UserApiError> {
        if change.status == UserStatus::Inadimplente {
            return Err(UserApiError::ValidationError(
                "INADIMPLENTE is set by the delinquency check. Use ATIVA or INATIVA".into(),
            ));
        }
        let user = self.db.fetch_user(user_id).await?.ok_or(UserApiError::UserNotFound(user_id))?;
        let is_blocked = change.is_blocked.unwrap_or(user.is_blocked);
        if user.status == change.status && user.is_blocked == is_blocked {
            return Err(UserApiError::UserModificationNoOp);
        }
        let user = self.db.set_user_status(user_id, change.status, is_blocked).await?;
        info!("🔄️👤️ User #{user_id} is now {} (blocked: {})", user.status, user.is_blocked);
        Ok(user)
    }
}
