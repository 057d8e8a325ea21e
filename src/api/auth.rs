use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpRequest, HttpResponse, ResponseError};
use futures::StreamExt;

use crate::models::Avatar;
use crate::services::auth_service::{
    self, AuthResponse, Claims, CreateUserRequest, LoginRequest, ProfileResponse, RegisterRequest,
    UserListResponse, UserResponse,
};
use crate::services::handoff_service::{self, HandoffRequest, HandoffResponse, RedeemRequest};
use crate::state::AppState;
use crate::utils::error::{ApiError, ErrorResponse};
use crate::utils::multipart::{read_form, FormData, FormLimits, MAX_FILE_BYTES};

/// Folder coordinator avatars are uploaded to
const AVATAR_FOLDER: &str = "users";
/// JSON bodies read by hand in `create_coordinator`
const JSON_BODY_LIMIT: usize = 64 * 1024;
/// One optional `avatar` file
const COORDINATOR_FORM_LIMITS: FormLimits = FormLimits {
    files: &[("avatar", 1)],
    max_total_bytes: MAX_FILE_BYTES + JSON_BODY_LIMIT,
};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Customer account created", body = AuthResponse),
        (status = 400, description = "Invalid fields or user already exists", body = ErrorResponse)
    )
)]
pub async fn register(state: web::Data<AppState>, request: web::Json<RegisterRequest>) -> HttpResponse {
    log::info!("📝 POST /auth/register - email: {}", request.email);

    match auth_service::register(state.users.as_ref(), &state.keys, state.bcrypt_cost, &request).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {}", request.email);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid Credentials", body = ErrorResponse)
    )
)]
pub async fn login(state: web::Data<AppState>, request: web::Json<LoginRequest>) -> HttpResponse {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    match auth_service::login(state.users.as_ref(), &state.keys, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_json_body(mut payload: web::Payload) -> Result<RegisterRequest, ApiError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?;
        if body.len() + chunk.len() > JSON_BODY_LIMIT {
            return Err(ApiError::Validation("Request body is too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }

    serde_json::from_slice(&body).map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))
}

fn registration_from_form(form: &FormData) -> RegisterRequest {
    RegisterRequest {
        full_name: form.value("fullName").unwrap_or_default(),
        email: form.value("email").unwrap_or_default(),
        password: form.text.get("password").cloned().unwrap_or_default(),
    }
}

/// Upload failures don't block the account; the coordinator just has no avatar
async fn upload_avatar(state: &AppState, form: &FormData) -> Option<Avatar> {
    let file = form.files_named("avatar").next()?;

    if !state.images.is_enabled() {
        log::warn!("⚠️  Avatar ignored: image storage is not configured");
        return None;
    }

    match state.images.upload(file, AVATAR_FOLDER).await {
        Ok(image) => Some(Avatar::from(image)),
        Err(e) => {
            log::error!("❌ Avatar upload failed: {}", e);
            None
        }
    }
}

async fn create_coordinator_inner(
    state: &AppState,
    req: &HttpRequest,
    payload: web::Payload,
) -> Result<UserResponse, ApiError> {
    let (request, avatar) = if is_multipart(req) {
        let form = read_form(Multipart::new(req.headers(), payload), &COORDINATOR_FORM_LIMITS).await?;
        let request = registration_from_form(&form);
        // Validate first so a bad form never costs an upload
        auth_service::check_registration(&request)?;
        let avatar = upload_avatar(state, &form).await;
        (request, avatar)
    } else {
        (read_json_body(payload).await?, None)
    };

    auth_service::create_coordinator(state.users.as_ref(), state.bcrypt_cost, &request, avatar).await
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/create-coordinator",
    tag = "Auth",
    description = "Accepts JSON or multipart/form-data (`fullName`, `email`, `password`, optional `avatar` file).",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Coordinator created", body = UserResponse),
        (status = 400, description = "Invalid fields or user already exists", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_coordinator(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> HttpResponse {
    log::info!("👥 POST /auth/create-coordinator");

    match create_coordinator_inner(&state, &req, payload).await {
        Ok(response) => {
            log::info!("✅ Coordinator created: {}", response.user.id);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Coordinator creation failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/create-user",
    tag = "Auth",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid fields or user already exists", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(state: web::Data<AppState>, request: web::Json<CreateUserRequest>) -> HttpResponse {
    log::info!("👤 POST /auth/create-user - email: {}", request.email);

    match auth_service::create_user(state.users.as_ref(), state.bcrypt_cost, &request).await {
        Ok(response) => {
            log::info!("✅ User created: {} ({})", request.email, response.user.role);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ User creation failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("👤 GET /auth/profile - user: {}", claims.id);

    match auth_service::get_profile(state.users.as_ref(), &claims.id).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ Profile lookup failed: {} - {}", claims.id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/",
    tag = "Auth",
    responses(
        (status = 200, description = "All users, without password hashes", body = UserListResponse),
        (status = 403, description = "Coordinator or Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(state: web::Data<AppState>) -> HttpResponse {
    log::info!("📋 GET /auth/");

    match auth_service::list_users(state.users.as_ref()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/auth/{id}/assign-coordinator",
    tag = "Auth",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User promoted to Coordinator", body = UserResponse),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_coordinator(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let user_id = path.into_inner();
    log::info!("🎖️  PATCH /auth/{}/assign-coordinator", user_id);

    match auth_service::assign_coordinator(state.users.as_ref(), &user_id).await {
        Ok(response) => {
            log::info!("✅ User {} is now a Coordinator", user_id);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Role assignment failed: {} - {}", user_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/handoff",
    tag = "Auth",
    request_body = HandoffRequest,
    responses(
        (status = 200, description = "Single-use handoff token issued", body = HandoffResponse),
        (status = 400, description = "Malformed body or redirect target not allowed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_handoff(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<HandoffRequest>,
) -> HttpResponse {
    log::info!("🔀 POST /auth/handoff - user: {}", claims.id);

    match handoff_service::create_handoff(
        &state.keys,
        state.handoff_ttl_secs,
        &state.allowed_origins,
        &claims.id,
        &request,
    ) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ Handoff refused for {}: {}", claims.id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/handoff/redeem",
    tag = "Auth",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Fresh session token", body = AuthResponse),
        (status = 401, description = "Handoff invalid, expired or already used", body = ErrorResponse)
    )
)]
pub async fn redeem_handoff(state: web::Data<AppState>, request: web::Json<RedeemRequest>) -> HttpResponse {
    log::info!("🔀 POST /auth/handoff/redeem");

    match handoff_service::redeem_handoff(state.users.as_ref(), &state.keys, &state.handoffs, &request).await {
        Ok(response) => {
            log::info!("✅ Handoff redeemed for user {}", response.user.id);
            HttpResponse::Ok().json(response)
        }
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::api;
    use crate::database::memory::MemoryStore;
    use crate::database::UserRepository;
    use crate::models::Role;
    use crate::services::auth_service::{AuthResponse, UserListResponse, UserResponse};
    use crate::services::handoff_service::HandoffResponse;
    use crate::test_utils::{bearer, multipart_body, seed_user, test_state, FakeImageStore};
    use crate::utils::error::ErrorResponse;
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_register_ignores_requested_role() {
        let store = Arc::new(MemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(test_state(store.clone(), Arc::new(FakeImageStore::new())))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(serde_json::json!({
                "fullName": "Nimal Perera",
                "email": "nimal@example.com",
                "password": "secret123",
                "role": "Admin"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: AuthResponse = test::read_body_json(resp).await;
        assert_eq!(body.user.role, Role::Customer);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({ "email": "nimal@example.com", "password": "wrong" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Invalid Credentials");
    }

    #[actix_web::test]
    async fn test_malformed_json_gets_error_envelope() {
        let store = Arc::new(MemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(test_state(store, Arc::new(FakeImageStore::new())))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(!body.success);
        assert!(body.message.starts_with("Invalid request body"));
    }

    #[actix_web::test]
    async fn test_admin_creates_coordinator_with_avatar() {
        let store = Arc::new(MemoryStore::new());
        let images = Arc::new(FakeImageStore::new());
        let (_, admin) = seed_user(&store, "Admin", "admin@example.com", Role::Admin).await;
        let (_, customer) = seed_user(&store, "Cust", "cust@example.com", Role::Customer).await;
        let app = test::init_service(
            App::new()
                .app_data(test_state(store.clone(), images.clone()))
                .configure(api::configure),
        )
        .await;

        let form = || {
            multipart_body(
                &[("fullName", "Sunil Coord"), ("email", "sunil@example.com"), ("password", "secret123")],
                &[("avatar", "me.jpg")],
            )
        };

        let (content_type, body) = form();
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/create-coordinator")
            .insert_header(bearer(&customer))
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        assert!(store.find_by_email("sunil@example.com").await.unwrap().is_none());

        let (content_type, body) = form();
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/create-coordinator")
            .insert_header(bearer(&admin))
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: UserResponse = test::read_body_json(resp).await;
        assert_eq!(created.user.role, Role::Coordinator);
        let avatar = created.user.avatar.expect("avatar stored");
        assert_eq!(avatar.public_id, "users/me.jpg");
        assert_eq!(images.uploaded_folders(), vec!["users"]);
    }

    #[actix_web::test]
    async fn test_coordinator_created_without_avatar_when_upload_fails() {
        let store = Arc::new(MemoryStore::new());
        let (_, admin) = seed_user(&store, "Admin", "admin@example.com", Role::Admin).await;
        let app = test::init_service(
            App::new()
                .app_data(test_state(store.clone(), Arc::new(FakeImageStore::failing_on(&["me.jpg"]))))
                .configure(api::configure),
        )
        .await;

        let (content_type, body) = multipart_body(
            &[("fullName", "Sunil Coord"), ("email", "sunil@example.com"), ("password", "secret123")],
            &[("avatar", "me.jpg")],
        );
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/create-coordinator")
            .insert_header(bearer(&admin))
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: UserResponse = test::read_body_json(resp).await;
        assert_eq!(created.user.role, Role::Coordinator);
        assert!(created.user.avatar.is_none());
    }

    #[actix_web::test]
    async fn test_coordinator_created_from_json_body() {
        let store = Arc::new(MemoryStore::new());
        let (_, admin) = seed_user(&store, "Admin", "admin@example.com", Role::Admin).await;
        let app = test::init_service(
            App::new()
                .app_data(test_state(store.clone(), Arc::new(FakeImageStore::new())))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/create-coordinator")
            .insert_header(bearer(&admin))
            .set_json(serde_json::json!({
                "fullName": "Kumari Coord",
                "email": "kumari@example.com",
                "password": "secret123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: UserResponse = test::read_body_json(resp).await;
        assert_eq!(created.user.role, Role::Coordinator);
        assert!(created.user.avatar.is_none());
    }

    #[actix_web::test]
    async fn test_coordinator_form_accepts_a_single_avatar() {
        let store = Arc::new(MemoryStore::new());
        let images = Arc::new(FakeImageStore::new());
        let (_, admin) = seed_user(&store, "Admin", "admin@example.com", Role::Admin).await;
        let app = test::init_service(
            App::new()
                .app_data(test_state(store.clone(), images.clone()))
                .configure(api::configure),
        )
        .await;

        let (content_type, body) = multipart_body(
            &[("fullName", "Sunil Coord"), ("email", "sunil@example.com"), ("password", "secret123")],
            &[("avatar", "one.jpg"), ("avatar", "two.jpg")],
        );
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/create-coordinator")
            .insert_header(bearer(&admin))
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "A maximum of 1 file(s) is allowed in 'avatar'");

        assert!(store.find_by_email("sunil@example.com").await.unwrap().is_none());
        assert!(images.uploaded_folders().is_empty());
    }

    #[actix_web::test]
    async fn test_user_administration_routes() {
        let store = Arc::new(MemoryStore::new());
        let (_, admin) = seed_user(&store, "Admin", "admin@example.com", Role::Admin).await;
        let (customer, customer_token) = seed_user(&store, "Cust", "cust@example.com", Role::Customer).await;
        let app = test::init_service(
            App::new()
                .app_data(test_state(store.clone(), Arc::new(FakeImageStore::new())))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .insert_header(bearer(&customer_token))
            .to_request();
        let profile: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(profile["user"]["email"], "cust@example.com");
        assert!(profile["user"].get("password").is_none());

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/")
            .insert_header(bearer(&customer_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/")
            .insert_header(bearer(&admin))
            .to_request();
        let listed: UserListResponse = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(listed.count, 2);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/auth/{}/assign-coordinator", customer.id_hex()))
            .insert_header(bearer(&admin))
            .to_request();
        let promoted: UserResponse = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(promoted.user.role, Role::Coordinator);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/create-user")
            .insert_header(bearer(&admin))
            .set_json(serde_json::json!({
                "fullName": "Second Admin",
                "email": "admin2@example.com",
                "password": "secret123",
                "role": "Admin"
            }))
            .to_request();
        let created: UserResponse = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(created.user.role, Role::Admin);
    }

    #[actix_web::test]
    async fn test_handoff_redirect_redeems_once() {
        let store = Arc::new(MemoryStore::new());
        let (user, token) = seed_user(&store, "Cust", "cust@example.com", Role::Customer).await;
        let app = test::init_service(
            App::new()
                .app_data(test_state(store.clone(), Arc::new(FakeImageStore::new())))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/handoff")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({ "target": "https://evil.example/steal" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/handoff")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({ "target": "https://app.handigo.lk/customer" }))
            .to_request();
        let issued: HandoffResponse = test::read_body_json(test::call_service(&app, req).await).await;
        let redirect = issued.redirect_url.expect("redirect url");
        assert!(redirect.starts_with("https://app.handigo.lk/customer?handoff="));

        let redeem = || {
            test::TestRequest::post()
                .uri("/api/v1/auth/handoff/redeem")
                .set_json(serde_json::json!({ "handoff": issued.handoff }))
                .to_request()
        };
        let resp = test::call_service(&app, redeem()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let session: AuthResponse = test::read_body_json(resp).await;
        assert_eq!(session.user.id, user.id_hex());

        assert_eq!(test::call_service(&app, redeem()).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_handoff_rejects_malformed_body() {
        let store = Arc::new(MemoryStore::new());
        let (_, token) = seed_user(&store, "Cust", "cust@example.com", Role::Customer).await;
        let app = test::init_service(
            App::new()
                .app_data(test_state(store.clone(), Arc::new(FakeImageStore::new())))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/handoff")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({ "targt": "https://app.handigo.lk/customer" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.message.starts_with("Invalid request body"));

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/handoff")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let issued: HandoffResponse = test::read_body_json(resp).await;
        assert!(issued.redirect_url.is_none());
    }

    #[actix_web::test]
    async fn test_health_reports_missing_database() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(MemoryStore::new()), Arc::new(FakeImageStore::new())))
                .configure(api::configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "handigo-service");
        assert_eq!(body["database"], "not configured");
    }
}
