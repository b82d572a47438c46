/// Payment provider webhook
///
/// Authenticated by the pre-shared key, never by a user session.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::SessionManager;
use crate::error::{AppError, ErrorContext, ValidationError};

const USER_UPGRADED: &str = "user.upgraded";

/// Only `user.upgraded` is required to name a user
#[derive(Deserialize, Default)]
pub struct WebhookData {
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

/// POST /api/polka/webhooks
///
/// Events other than `user.upgraded` are acknowledged and ignored.
///
/// # Errors
/// - 400: malformed payload, or `user.upgraded` without a user id
/// - 401: missing or wrong API key
/// - 404: unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    session: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("polka_webhook");

    session.authorize_service_key(req.headers()).map_err(|kind| {
        let err = AppError::from(kind);
        context.log_error(&err);
        err
    })?;

    // Parsed only once the caller is known to hold the key
    let payload: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|_| ValidationError::InvalidFormat("webhook payload"))?;

    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = payload
        .data
        .user_id
        .ok_or(ValidationError::EmptyField("data.user_id"))?;

    session.upgrade_user(user_id).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    Ok(HttpResponse::NoContent().finish())
}
