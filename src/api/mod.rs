pub mod auth;
pub mod health;
pub mod metrics;
pub mod requests;
pub mod swagger;
pub mod workers;

use actix_web::{error::JsonPayloadError, web, HttpRequest, ResponseError};

use crate::middleware::RequireAuth;
use crate::models::Role;
use crate::utils::error::ApiError;

/// Malformed or unknown-field JSON bodies become the usual 400 envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err: JsonPayloadError, req: &HttpRequest| {
            log::warn!("⚠️  {} {} - invalid JSON body: {}", req.method(), req.path(), err);
            let api_error = ApiError::Validation(format!("Invalid request body: {}", err));
            actix_web::error::InternalError::from_response(err, api_error.error_response()).into()
        })
}

/// Route table shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    let admin = || RequireAuth::allowed_roles(vec![Role::Admin]);
    let coordinator = || RequireAuth::allowed_roles(vec![Role::Coordinator]);
    let customer = || RequireAuth::allowed_roles(vec![Role::Customer]);

    cfg.app_data(json_config())
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Metrics
        .route("/metrics", web::get().to(metrics::get_metrics))
        // Accounts
        .service(
            web::scope("/api/v1/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/handoff/redeem", web::post().to(auth::redeem_handoff))
                .route("/handoff", web::post().to(auth::create_handoff).wrap(RequireAuth::any()))
                .route("/profile", web::get().to(auth::get_profile).wrap(RequireAuth::any()))
                .route(
                    "/create-coordinator",
                    web::post().to(auth::create_coordinator).wrap(admin()),
                )
                .route("/create-user", web::post().to(auth::create_user).wrap(admin()))
                .route(
                    "/{id}/assign-coordinator",
                    web::patch().to(auth::assign_coordinator).wrap(admin()),
                )
                .route(
                    "/",
                    web::get()
                        .to(auth::list_users)
                        .wrap(RequireAuth::allowed_roles(vec![Role::Coordinator, Role::Admin])),
                ),
        )
        // Worker directory: public reads, coordinator writes
        .service(
            web::scope("/api/v1/workers")
                .route("", web::get().to(workers::list_workers))
                .route("", web::post().to(workers::create_worker).wrap(coordinator()))
                .route("/{id}", web::get().to(workers::get_worker))
                .route("/{id}", web::patch().to(workers::update_worker).wrap(coordinator()))
                .route("/{id}", web::delete().to(workers::delete_worker).wrap(coordinator())),
        )
        // Service requests
        .service(
            web::scope("/api/v1/requests")
                .route("", web::post().to(requests::create_request).wrap(customer()))
                .route("/all", web::get().to(requests::get_all_requests).wrap(coordinator()))
                .route("/customer", web::get().to(requests::get_customer_requests).wrap(customer()))
                .route(
                    "/coordinator",
                    web::get().to(requests::get_coordinator_requests).wrap(coordinator()),
                )
                .route("/{id}", web::patch().to(requests::update_request).wrap(coordinator())),
        );
}
