use actix_web::{web, HttpResponse, ResponseError};

use crate::services::auth_service::Claims;
use crate::services::request_service::{
    self, CreateRequestBody, RequestEnvelope, RequestListResponse, UpdateRequestBody,
};
use crate::state::AppState;
use crate::utils::error::ErrorResponse;

#[utoipa::path(
    post,
    path = "/api/v1/requests",
    tag = "Requests",
    request_body = CreateRequestBody,
    responses(
        (status = 201, description = "Request created (New, or Assigned with a worker)", body = RequestEnvelope),
        (status = 400, description = "Missing fields or malformed date", body = ErrorResponse),
        (status = 403, description = "Customer only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_request(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<CreateRequestBody>,
) -> HttpResponse {
    log::info!("📨 POST /requests - customer: {}", claims.id);

    match request_service::create_request(state.requests.as_ref(), state.users.as_ref(), &claims.id, &body).await {
        Ok(response) => {
            log::info!(
                "✅ Request created: {} ({})",
                response.request.id,
                response.request.status
            );
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Request creation failed: {} - {}", claims.id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/all",
    tag = "Requests",
    responses(
        (status = 200, description = "Every request, newest first", body = RequestListResponse),
        (status = 403, description = "Coordinator only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_all_requests(state: web::Data<AppState>) -> HttpResponse {
    log::info!("📋 GET /requests/all");

    match request_service::list_all(state.requests.as_ref(), state.users.as_ref()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/customer",
    tag = "Requests",
    responses(
        (status = 200, description = "The caller's own requests", body = RequestListResponse),
        (status = 403, description = "Customer only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_customer_requests(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("📋 GET /requests/customer - customer: {}", claims.id);

    match request_service::list_for_customer(state.requests.as_ref(), state.users.as_ref(), &claims.id).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/coordinator",
    tag = "Requests",
    responses(
        (status = 200, description = "Requests in New, Pending or Assigned", body = RequestListResponse),
        (status = 403, description = "Coordinator only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_coordinator_requests(state: web::Data<AppState>) -> HttpResponse {
    log::info!("📋 GET /requests/coordinator");

    match request_service::list_actionable(state.requests.as_ref(), state.users.as_ref()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}",
    tag = "Requests",
    params(("id" = String, Path, description = "Request ID")),
    request_body = UpdateRequestBody,
    responses(
        (status = 200, description = "Request updated", body = RequestEnvelope),
        (status = 400, description = "Invalid request ID or status", body = ErrorResponse),
        (status = 403, description = "Coordinator only", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_request(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateRequestBody>,
) -> HttpResponse {
    let request_id = path.into_inner();
    log::info!(
        "🔄 PATCH /requests/{} - status: {:?}, worker: {:?}",
        request_id,
        body.status,
        body.assigned_worker
    );

    match request_service::update_request(state.requests.as_ref(), state.users.as_ref(), &request_id, &body).await {
        Ok(response) => {
            log::info!("✅ Request {} is now {}", request_id, response.request.status);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Request update failed: {} - {}", request_id, e);
            e.error_response()
        }
    }
}
