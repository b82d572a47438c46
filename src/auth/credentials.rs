/// Credential Extraction
///
/// The single place inbound credentials are pulled out of request headers.
/// Pure parsing: no I/O, nothing is validated beyond shape.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Header carrying the webhook's pre-shared key
const API_KEY_HEADER: &str = "X-API-Key";

/// Read the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-sensitively.
///
/// # Errors
/// `MissingCredential` if the header is absent, not `Bearer`, or empty
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MissingCredential);
    }

    Ok(token.to_string())
}

/// Read the pre-shared key from the `X-API-Key` header
///
/// # Errors
/// `MissingCredential` if the header is absent, not visible ASCII, or empty
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(AuthError::MissingCredential);
    }

    Ok(key.to_string())
}

/// Extract the API key and require it to equal `expected`
///
/// Both sides are hashed first so the comparison time does not depend on
/// how many leading characters matched.
///
/// # Errors
/// `MissingCredential` from extraction, `Unauthorized` on mismatch
pub fn verify_api_key(headers: &HeaderMap, expected: &str) -> Result<(), AuthError> {
    let presented = extract_api_key(headers)?;

    let presented_digest = Sha256::digest(presented.as_bytes());
    let expected_digest = Sha256::digest(expected.as_bytes());

    if expected.is_empty() || presented_digest != expected_digest {
        return Err(AuthError::Unauthorized);
    }

    Ok(())
}
