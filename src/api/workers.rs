use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, ResponseError};

use crate::models::WorkerPatch;
use crate::services::worker_service::{
    self, MessageResponse, WorkerDetailResponse, WorkerEnvelope, WorkerListResponse,
    WORKER_FORM_LIMITS,
};
use crate::state::AppState;
use crate::utils::error::ErrorResponse;
use crate::utils::multipart::read_form;

#[utoipa::path(
    post,
    path = "/api/v1/workers",
    tag = "Workers",
    description = "multipart/form-data: `workerName`, `email`, `phone`, `skill`, `location`, \
                   `availabilityStatus`, `nationalId` and 1 to 8 files in `images`.",
    responses(
        (status = 201, description = "Worker created", body = WorkerEnvelope),
        (status = 400, description = "Missing fields, too many images or no image stored", body = ErrorResponse),
        (status = 403, description = "Coordinator only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_worker(state: web::Data<AppState>, payload: Multipart) -> HttpResponse {
    log::info!("🧰 POST /workers");

    let form = match read_form(payload, &WORKER_FORM_LIMITS).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("❌ Unreadable worker form: {}", e);
            return e.error_response();
        }
    };

    match worker_service::create_worker(state.workers.as_ref(), state.images.as_ref(), &form).await {
        Ok(response) => {
            log::info!(
                "✅ Worker created: {} ({} images)",
                response.worker.id,
                response.worker.image_urls.len()
            );
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Worker creation failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/workers",
    tag = "Workers",
    responses(
        (status = 200, description = "All workers sorted by name", body = WorkerListResponse)
    )
)]
pub async fn list_workers(state: web::Data<AppState>) -> HttpResponse {
    log::info!("📋 GET /workers");

    match worker_service::list_workers(state.workers.as_ref()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}",
    tag = "Workers",
    params(("id" = String, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Worker", body = WorkerDetailResponse),
        (status = 400, description = "Invalid worker ID", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn get_worker(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let worker_id = path.into_inner();
    log::info!("🔍 GET /workers/{}", worker_id);

    match worker_service::get_worker(state.workers.as_ref(), &worker_id).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/workers/{id}",
    tag = "Workers",
    params(("id" = String, Path, description = "Worker ID")),
    request_body = WorkerPatch,
    responses(
        (status = 200, description = "Worker updated", body = WorkerEnvelope),
        (status = 400, description = "Unknown, blank or invalid fields", body = ErrorResponse),
        (status = 403, description = "Coordinator only", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_worker(
    state: web::Data<AppState>,
    path: web::Path<String>,
    patch: web::Json<WorkerPatch>,
) -> HttpResponse {
    let worker_id = path.into_inner();
    log::info!("✏️  PATCH /workers/{}", worker_id);

    match worker_service::update_worker(state.workers.as_ref(), &worker_id, &patch).await {
        Ok(response) => {
            log::info!("✅ Worker updated: {} ({})", worker_id, response.worker.status);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Worker update failed: {} - {}", worker_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/workers/{id}",
    tag = "Workers",
    params(("id" = String, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Worker deleted", body = MessageResponse),
        (status = 403, description = "Coordinator only", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_worker(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let worker_id = path.into_inner();
    log::info!("🗑️  DELETE /workers/{}", worker_id);

    match worker_service::delete_worker(state.workers.as_ref(), &worker_id).await {
        Ok(response) => {
            log::info!("✅ Worker deleted: {}", worker_id);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Worker deletion failed: {} - {}", worker_id, e);
            e.error_response()
        }
    }
}
