/// Session Manager
///
/// Orchestrates registration, login, refresh, revoke and per-request
/// authorization on top of the password hasher, the access token codec, the
/// refresh token generator and the credential extractor. It is the only
/// component that decides what a failure means; it never picks HTTP statuses.
///
/// Refresh token lifecycle: `Active -> Expired` (time) or `Active -> Revoked`
/// (explicit). Both end states are terminal. Access tokens are never stored
/// and cannot be revoked; they lapse at their expiry.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::credentials::{extract_bearer, verify_api_key};
use crate::auth::jwt::{issue_access_token, validate_access_token};
use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::auth::refresh_token::generate_refresh_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{Store, User};
use crate::validators::{is_valid_email, is_valid_password};

/// Tokens handed out by a successful login
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for LoginOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOutcome")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn Store>,
    jwt: JwtSettings,
    api_key: String,
}

impl SessionManager {
    pub fn new(store: Arc<dyn Store>, jwt: JwtSettings, api_key: String) -> Self {
        Self {
            store,
            jwt,
            api_key,
        }
    }

    /// Hash the password and create the user
    ///
    /// # Errors
    /// `Validation` for a malformed email or password, `DuplicateEmail` if taken
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = is_valid_email(email)?;
        is_valid_password(password)?;

        let password_hash = hash_password(password)?;
        let user = self.store.create_user(&email, &password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and open a new session
    ///
    /// An unknown email and a wrong password fail identically with
    /// `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = match self.store.find_user_by_email(email.trim()).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => {
                verify_dummy(password);
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e.into()),
        };

        if !verify_password(&user.hashed_password, password)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = issue_access_token(user.id, &self.jwt.secret, self.jwt.access_token_ttl())?;
        let refresh_token = generate_refresh_token()?;
        let expires_at = Utc::now() + self.jwt.refresh_token_ttl();
        self.store
            .store_refresh_token(&refresh_token, user.id, expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange the bearer refresh token for a new access token
    ///
    /// The refresh token itself is left untouched and stays usable.
    ///
    /// # Errors
    /// `MissingCredential` if no bearer token was sent; `InvalidOrExpiredToken`
    /// if it is unknown, revoked or expired (indistinguishably)
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let token = extract_bearer(headers)?;

        let record = match self.store.lookup_refresh_token(&token).await {
            Ok(record) => Some(record),
            Err(DatabaseError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let now = Utc::now();
        let user_id = match record {
            Some(record) if record.is_usable_at(now) => record.user_id,
            Some(record) => {
                tracing::debug!(
                    user_id = %record.user_id,
                    state = ?record.state_at(now),
                    "Refresh token rejected"
                );
                return Err(AuthError::InvalidOrExpiredToken.into());
            }
            None => {
                tracing::debug!("Refresh token not found");
                return Err(AuthError::InvalidOrExpiredToken.into());
            }
        };

        let access_token = issue_access_token(user_id, &self.jwt.secret, self.jwt.access_token_ttl())?;
        tracing::debug!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the bearer refresh token
    ///
    /// # Errors
    /// `InvalidOrExpiredToken` if the token is unknown or already revoked
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let token = extract_bearer(headers)?;

        match self.store.revoke_refresh_token(&token).await {
            Ok(()) => Ok(()),
            Err(DatabaseError::NotFound(_)) => Err(AuthError::InvalidOrExpiredToken.into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate a request by its bearer access token
    ///
    /// `MissingCredential`, `TokenInvalid` and `TokenExpired` pass through as is.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract_bearer(headers)?;
        validate_access_token(&token, &self.jwt.secret)
    }

    /// Authenticate the webhook caller by the configured pre-shared key
    pub fn authorize_service_key(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        verify_api_key(headers, &self.api_key)
    }

    /// Replace an authenticated user's email and password
    pub async fn update_user(
        &self,
        user_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let email = is_valid_email(email)?;
        is_valid_password(password)?;

        let password_hash = hash_password(password)?;
        let user = self.store.update_user(user_id, &email, &password_hash).await?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Mark a user as upgraded
    pub async fn upgrade_user(&self, user_id: Uuid) -> Result<(), AppError> {
        self.store.set_upgraded(user_id).await?;
        tracing::info!(user_id = %user_id, "User upgraded");
        Ok(())
    }
}
