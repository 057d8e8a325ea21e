use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HandiGO Service API",
        version = "1.0.0",
        description = "Accounts, field workers and service requests for the HandiGO marketplace.\n\n**Authentication:** send `Authorization: Bearer <token>`. Each route lists the roles it accepts.",
        contact(
            name = "HandiGO Team",
            email = "support@handigo.lk"
        )
    ),
    paths(
        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::create_coordinator,
        crate::api::auth::create_user,
        crate::api::auth::get_profile,
        crate::api::auth::list_users,
        crate::api::auth::assign_coordinator,
        crate::api::auth::create_handoff,
        crate::api::auth::redeem_handoff,

        // Workers
        crate::api::workers::create_worker,
        crate::api::workers::list_workers,
        crate::api::workers::get_worker,
        crate::api::workers::update_worker,
        crate::api::workers::delete_worker,

        // Requests
        crate::api::requests::create_request,
        crate::api::requests::get_all_requests,
        crate::api::requests::get_customer_requests,
        crate::api::requests::get_coordinator_requests,
        crate::api::requests::update_request,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::utils::error::ErrorResponse,

            // Auth
            crate::models::Role,
            crate::models::Avatar,
            crate::models::UserSummary,
            crate::models::UserProfile,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::CreateUserRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::auth_service::UserResponse,
            crate::services::auth_service::ProfileResponse,
            crate::services::auth_service::UserListResponse,
            crate::services::handoff_service::HandoffRequest,
            crate::services::handoff_service::HandoffResponse,
            crate::services::handoff_service::RedeemRequest,

            // Workers
            crate::models::WorkerStatus,
            crate::models::WorkerPatch,
            crate::models::WorkerResponse,
            crate::services::worker_service::WorkerEnvelope,
            crate::services::worker_service::WorkerDetailResponse,
            crate::services::worker_service::WorkerListResponse,
            crate::services::worker_service::MessageResponse,

            // Requests
            crate::models::RequestStatus,
            crate::models::Contact,
            crate::models::ServiceRequestResponse,
            crate::services::request_service::CreateRequestBody,
            crate::services::request_service::UpdateRequestBody,
            crate::services::request_service::RequestEnvelope,
            crate::services::request_service::RequestListResponse,

            // Health
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login, account administration and cross-app session handoff."),
        (name = "Workers", description = "Field worker directory. Reads are public; changes need a Coordinator token."),
        (name = "Requests", description = "Service request lifecycle: customers create, coordinators confirm, reject or assign."),
        (name = "Health", description = "Health check and request counters."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token from /api/v1/auth/login"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_every_surface() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/v1/auth/register",
            "/api/v1/auth/{id}/assign-coordinator",
            "/api/v1/auth/handoff/redeem",
            "/api/v1/workers/{id}",
            "/api/v1/requests/coordinator",
            "/health",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {}", expected);
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
