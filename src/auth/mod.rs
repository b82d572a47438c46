/// Authentication module
///
/// Password hashing, access token issue/validation, refresh token
/// generation, credential extraction, and the session manager composing them.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::{Claims, TOKEN_ISSUER};
pub use credentials::{extract_api_key, extract_bearer, verify_api_key};
pub use jwt::{issue_access_token, validate_access_token};
pub use password::{hash_password, verify_password};
pub use refresh_token::{generate_refresh_token, RefreshTokenRecord};
pub use session::{LoginOutcome, SessionManager};
