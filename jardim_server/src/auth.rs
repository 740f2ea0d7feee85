//! Access tokens.
//!
//! Users log in with their e-mail and password (see [`jardim_engine::AuthApi`]) and receive an HS256-signed JWT. The
//! token carries the [`JwtClaims`] and is sent back on every `/api` call as `Authorization: Bearer <token>`.
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use futures::future::{ready, Ready};
use hmac::{Hmac, Mac};
use jardim_engine::db_types::{Role, User};
use jwt::{SignWithKey, VerifyWithKey};
use log::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    /// Expiry, in seconds since the Unix epoch
    pub exp: i64,
}

impl JwtClaims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on anyone's records. Sellers only on their own.
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

/// Extracts the claims that [`crate::middleware::JwtMiddlewareFactory`] placed in the request.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned().ok_or_else(|| {
            debug!("🔑️ No access token claims in request to {}", req.path());
            ServerError::AuthenticationError(AuthError::MissingToken)
        });
        ready(claims)
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    key: Hmac<Sha256>,
    expiry: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self, ServerError> {
        let key = Hmac::<Sha256>::new_from_slice(config.jwt_secret.reveal().as_bytes())
            .map_err(|e| ServerError::ConfigurationError(format!("Invalid JWT secret. {e}")))?;
        Ok(Self { key, expiry: config.token_expiry })
    }

    /// Issue a new access token for the given user.
    /// This method DOES NOT check the user's credentials. That must be done prior to calling `issue_token`.
    pub fn issue_token(&self, user: &User) -> Result<String, ServerError> {
        let claims = JwtClaims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: (Utc::now() + self.expiry).timestamp(),
        };
        let token = claims.sign_with_key(&self.key).map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))?;
        trace!("🔑️ Issued access token for user #{}", user.id);
        Ok(token)
    }

    /// Checks the token signature and expiry, returning the claims it carries.
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let claims: JwtClaims = token.verify_with_key(&self.key).map_err(|e| match e {
            jwt::Error::InvalidSignature => AuthError::ValidationError(e.to_string()),
            e => AuthError::PoorlyFormattedToken(e.to_string()),
        })?;
        if claims.exp < Utc::now().timestamp() {
            debug!("🔑️ Expired access token for user #{}", claims.user_id);
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}
