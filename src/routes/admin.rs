use actix_web::{web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::{AppError, AuthError};
use crate::middleware::RequestCounter;
use crate::store::Store;

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<RequestCounter>) -> HttpResponse {
    let body = format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        counter.get()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// POST /admin/reset
///
/// Only on the `dev` platform: zeroes the request counter and deletes every
/// user along with their refresh tokens and chirps.
pub async fn reset(
    application: web::Data<ApplicationSettings>,
    counter: web::Data<RequestCounter>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    if !application.is_dev() {
        tracing::warn!(platform = %application.platform, "Reset refused outside dev");
        return Err(AuthError::Forbidden.into());
    }

    counter.reset();
    store.delete_all_users().await?;

    tracing::warn!("All users deleted");
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("OK"))
}
