/// Chirp Routes
///
/// Listing and reading chirps is public; creating and deleting them needs an
/// access token (checked by `JwtMiddleware` before these handlers run).

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::store::Store;
use crate::validators::is_valid_chirp_body;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat("chirp id").into())
}

/// POST /api/chirps
///
/// # Errors
/// - 400: empty body or longer than 140 characters
pub async fn create_chirp(
    caller: web::ReqData<AuthenticatedUser>,
    form: web::Json<CreateChirpRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let body = is_valid_chirp_body(&form.body)?;

    let chirp = store.create_chirp(caller.user_id, &body).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %caller.user_id, "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps
pub async fn list_chirps(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let chirps = store.list_chirps().await?;
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;
    let chirp = store.get_chirp(chirp_id).await?;
    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 403: the chirp belongs to someone else
/// - 404: no such chirp
pub async fn delete_chirp(
    caller: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_delete").with_user_id(caller.user_id);
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = store.get_chirp(chirp_id).await?;
    if chirp.user_id != caller.user_id {
        let err = AppError::from(AuthError::Forbidden);
        context.log_error(&err);
        return Err(err);
    }

    store.delete_chirp(chirp_id, caller.user_id).await?;

    tracing::info!(chirp_id = %chirp_id, user_id = %caller.user_id, "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}
