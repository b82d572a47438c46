/// Session Routes
///
/// Login, access token refresh, and refresh token revocation. Refresh and
/// revoke read the refresh token from `Authorization: Bearer <token>`.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::auth::SessionManager;
use crate::error::{AppError, ErrorContext};
use crate::routes::users::{CredentialsRequest, UserResponse};

/// Login response: the user view plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: unknown email or wrong password (same response for both)
pub async fn login(
    form: web::Json<CredentialsRequest>,
    session: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let outcome = session
        .login(&form.email, &form.password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %outcome.user.id,
        "Session opened"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: outcome.user.into(),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Issues a new access token. The refresh token is not rotated.
///
/// # Errors
/// - 401: missing, unknown, revoked, or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    session: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let token = session.refresh(req.headers()).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// # Errors
/// - 401: missing, unknown, or already revoked refresh token
pub async fn revoke(
    req: HttpRequest,
    session: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revoke");

    session.revoke(req.headers()).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    tracing::info!(request_id = %context.request_id, "Refresh token revoked");
    Ok(HttpResponse::NoContent().finish())
}
