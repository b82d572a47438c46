/// Access Token Codec
///
/// Issues and validates HS256-signed access tokens. Tokens are stateless:
/// validity is decided by signature, issuer and expiry alone.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, TOKEN_ISSUER};
use crate::error::{AppError, AuthError};

/// Issue a new access token for `user_id`, signed with `secret`
///
/// # Errors
/// Returns `AppError::Internal` if encoding fails
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return the user id it was issued to
///
/// No clock leeway is applied: a token is rejected from the second its
/// expiry is reached.
///
/// # Errors
/// - `TokenExpired` if the token is past its expiry
/// - `TokenInvalid` for a bad signature, wrong issuer, or malformed token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    // Expiry is checked below, after signature and issuer, so a foreign
    // token is never reported as merely expired.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = false;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "JWT validation error");
            AuthError::TokenInvalid
        })?;

    // exp == now counts as expired
    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    claims.user_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    #[test]
    fn test_issue_and_validate_token() {
        let user_id = Uuid::new_v4();

        let token = issue_access_token(user_id, SECRET, chrono::Duration::hours(1))
            .expect("Failed to generate token");
        let subject = validate_access_token(&token, SECRET).expect("Failed to validate token");

        assert_eq!(subject, user_id);
    }

    #[test]
    fn test_tokens_are_compact_jws() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::hours(1))
            .expect("Failed to generate token");
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_expired_token() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::seconds(-30))
            .expect("Failed to generate token");

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_token_expires_exactly_at_exp() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::zero())
            .expect("Failed to generate token");

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::hours(1))
            .expect("Failed to generate token");

        assert_eq!(
            validate_access_token(&token, "a-completely-different-secret"),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_invalid_token() {
        assert_eq!(
            validate_access_token("invalid.token.here", SECRET),
            Err(AuthError::TokenInvalid)
        );
        assert_eq!(validate_access_token("", SECRET), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_tampered_token() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::hours(1))
            .expect("Failed to generate token");

        // Swap the payload for one naming another user, keep the old signature
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::hours(1))
            .expect("Failed to generate token");
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;
        let tampered = parts.join(".");

        assert_eq!(validate_access_token(&tampered, SECRET), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_wrong_issuer() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: now + 3600,
            iat: now,
            iss: "someone-else".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_expired_token_with_wrong_issuer_is_invalid() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: now - 60,
            iat: now - 120,
            iss: "someone-else".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_expired_token_with_wrong_secret_is_invalid() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, chrono::Duration::seconds(-30))
            .expect("Failed to generate token");

        assert_eq!(
            validate_access_token(&token, "a-completely-different-secret"),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_non_uuid_subject() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            exp: now + 3600,
            iat: now,
            iss: TOKEN_ISSUER.to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::TokenInvalid));
    }
}
