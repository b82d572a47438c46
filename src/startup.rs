use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionManager;
use crate::configuration::Settings;
use crate::middleware::{JwtMiddleware, RequestCounter, RequestMetrics};
use crate::routes::{
    create_chirp, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, register, reset, revoke, update_user,
};
use crate::store::Store;

/// Build the HTTP server on `listener`. The store and settings are shared
/// read-only across workers.
pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let session = SessionManager::new(
        store.clone(),
        settings.jwt.clone(),
        settings.polka.api_key.clone(),
    );
    let counter = RequestCounter::new();

    let session_data = web::Data::new(session.clone());
    let store_data: web::Data<dyn Store> = web::Data::from(store);
    let counter_data = web::Data::new(counter.clone());
    let application_data = web::Data::new(settings.application.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestMetrics::new(counter.clone()))
            // Shared state
            .app_data(session_data.clone())
            .app_data(store_data.clone())
            .app_data(counter_data.clone())
            .app_data(application_data.clone())
            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/polka/webhooks", web::post().to(polka_webhook))
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))
            .service(web::resource("/api/users").guard(guard::Post()).to(register))
            .service(web::resource("/api/chirps").guard(guard::Get()).to(list_chirps))
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .guard(guard::Get())
                    .to(get_chirp),
            )
            // Routes requiring an access token
            .service(
                web::resource("/api/users")
                    .guard(guard::Put())
                    .to(update_user)
                    .wrap(JwtMiddleware::new(session.clone())),
            )
            .service(
                web::resource("/api/chirps")
                    .guard(guard::Post())
                    .to(create_chirp)
                    .wrap(JwtMiddleware::new(session.clone())),
            )
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .guard(guard::Delete())
                    .to(delete_chirp)
                    .wrap(JwtMiddleware::new(session.clone())),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
