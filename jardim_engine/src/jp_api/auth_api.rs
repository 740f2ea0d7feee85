use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewUser, Role, User, UserStatus},
    helpers::{hash_password, is_valid_email, normalize_cpf, verify_password},
    jp_api::{account_objects::Registration, errors::AuthApiError},
    traits::UserManagement,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration, credential checks and the bootstrap admin account.
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    /// Signs up a new seller. New accounts are always `VENDEDORA`, `ATIVA` and unblocked.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthApiError> {
        let user = validate_registration(registration, Role::Vendedora)?;
        let user = self.db.create_user(user).await?;
        info!("🔑️ New seller #{} registered ({})", user.id, user.email);
        Ok(user)
    }

    /// Checks an e-mail and password pair. Unknown e-mails and wrong passwords are indistinguishable to the caller.
    ///
    /// Blocked sellers may still log in; accounts that an admin deactivated may not.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthApiError> {
        let user = self.db.fetch_user_by_email(email).await?.ok_or_else(|| {
            debug!("🔑️ Login attempt for unknown e-mail {email}");
            AuthApiError::InvalidCredentials
        })?;
        if !verify_password(password, &user.password_hash) {
            debug!("🔑️ Wrong password for user #{}", user.id);
            return Err(AuthApiError::InvalidCredentials);
        }
        if user.status == UserStatus::Inativa {
            return Err(AuthApiError::AccountInactive);
        }
        trace!("🔑️ User #{} authenticated", user.id);
        Ok(user)
    }

    /// Creates the admin account if no user with the given e-mail exists yet.
    pub async fn ensure_admin(&self, registration: Registration) -> Result<User, AuthApiError> {
        if let Some(user) = self.db.fetch_user_by_email(&registration.email).await? {
            if !user.is_admin() {
                warn!("🔑️ The bootstrap admin e-mail {} belongs to a seller account. It has not been promoted.", user.email);
            }
            return Ok(user);
        }
        let user = validate_registration(registration, Role::Admin)?;
        let user = self.db.create_user(user).await?;
        info!("🔑️ Admin account #{} ({}) created", user.id, user.email);
        Ok(user)
    }
}

fn validate_registration(registration: Registration, role: Role) -> Result<NewUser, AuthApiError> {
    let name = registration.name.trim().to_string();
    if name.is_empty() {
        return Err(AuthApiError::ValidationError("A name is required".into()));
    }
    let email = registration.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AuthApiError::ValidationError(format!("{email} is not a valid e-mail address")));
    }
    let cpf = normalize_cpf(&registration.cpf)?;
    if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthApiError::ValidationError(format!(
            "Passwords must have at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    let password_hash = hash_password(&registration.password)?;
    let phone = registration.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    let pix_key = registration.pix_key.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    Ok(NewUser { name, email, cpf, phone, password_hash, role, pix_key })
}
