/// Refresh Token Generation
///
/// Refresh tokens are opaque lookup keys: 32 bytes from the operating
/// system's CSPRNG, hex encoded. They carry no claims; everything about a
/// token (owner, expiry, revocation) lives in the store.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token
///
/// # Errors
/// Returns `CryptoError::Entropy` if the OS random source is unavailable
pub fn generate_refresh_token() -> Result<String, CryptoError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// A stored refresh token row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a stored refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

impl RefreshTokenRecord {
    /// Revocation wins over expiry; neither state is left once entered
    pub(crate) fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    /// Both conditions are always evaluated; the caller only learns yes or no
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        let not_revoked = self.revoked_at.is_none();
        let not_expired = now < self.expires_at;
        not_revoked & not_expired
    }
}
