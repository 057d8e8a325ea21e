use serde::{Deserialize, Serialize};

use crate::database::WorkerRepository;
use crate::models::{Worker, WorkerPatch, WorkerResponse, WorkerStatus};
use crate::services::auth_service::parse_object_id;
use crate::services::image_service::{upload_each, ImageStore};
use crate::utils::error::ApiError;
use crate::utils::multipart::{FormData, FormLimits, UploadedFile, MAX_FILE_BYTES};

/// Upper bound on `images` per worker
pub const MAX_WORKER_IMAGES: usize = 8;
pub const WORKER_IMAGE_FOLDER: &str = "workers";

/// `images` only, at most eight of them
pub const WORKER_FORM_LIMITS: FormLimits = FormLimits {
    files: &[("images", MAX_WORKER_IMAGES)],
    max_total_bytes: 4 * MAX_FILE_BYTES,
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WorkerEnvelope {
    pub success: bool,
    pub message: String,
    pub worker: WorkerResponse,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WorkerDetailResponse {
    pub success: bool,
    pub worker: WorkerResponse,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WorkerListResponse {
    pub success: bool,
    pub workers: Vec<WorkerResponse>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Text part of the worker form, checked before any upload happens
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerForm {
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub specialty: String,
    pub area: String,
    pub national_id: String,
    pub status: WorkerStatus,
}

impl WorkerForm {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        let required = [
            ("workerName", form.value("workerName")),
            ("phone", form.value("phone")),
            ("skill", form.value("skill")),
            ("location", form.value("location")),
            ("nationalId", form.value("nationalId")),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let status = match form.value("availabilityStatus") {
            Some(raw) => raw.parse::<WorkerStatus>().map_err(ApiError::Validation)?,
            None => WorkerStatus::default(),
        };

        let [name, contact_number, specialty, area, national_id] =
            required.map(|(_, value)| value.unwrap_or_default());

        Ok(WorkerForm {
            name,
            email: form.value("email").unwrap_or_default(),
            contact_number,
            specialty,
            area,
            national_id,
            status,
        })
    }

    fn into_worker(self, image_urls: Vec<String>) -> Worker {
        Worker {
            id: None,
            name: self.name,
            email: self.email,
            contact_number: self.contact_number,
            specialty: self.specialty,
            area: self.area,
            national_id: self.national_id,
            image_urls,
            status: self.status,
            joined_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Validates the form, uploads each image, then persists the worker.
/// Nothing is stored unless at least one upload succeeded.
pub async fn create_worker(
    workers: &dyn WorkerRepository,
    images: &dyn ImageStore,
    form: &FormData,
) -> Result<WorkerEnvelope, ApiError> {
    let fields = WorkerForm::from_form(form)?;

    let files: Vec<&UploadedFile> = form.files_named("images").collect();
    if files.len() > MAX_WORKER_IMAGES {
        return Err(ApiError::Validation(format!(
            "A maximum of {} images is allowed",
            MAX_WORKER_IMAGES
        )));
    }

    let stored = upload_each(images, &files, WORKER_IMAGE_FOLDER).await;
    if stored.is_empty() {
        log::warn!(
            "⚠️  Worker '{}' rejected: {} of {} images uploaded",
            fields.name,
            stored.len(),
            files.len()
        );
        return Err(ApiError::Validation("At least one image is required".to_string()));
    }

    let image_urls = stored.into_iter().map(|image| image.secure_url).collect();
    let worker = workers
        .insert(fields.into_worker(image_urls))
        .await
        .map_err(|e| ApiError::from_store("Server error while creating worker", e))?;

    Ok(WorkerEnvelope {
        success: true,
        message: "Worker created successfully".to_string(),
        worker: worker.into(),
    })
}

pub async fn list_workers(workers: &dyn WorkerRepository) -> Result<WorkerListResponse, ApiError> {
    let all = workers
        .list()
        .await
        .map_err(|e| ApiError::from_store("Server error while fetching workers", e))?;

    Ok(WorkerListResponse {
        success: true,
        workers: all.into_iter().map(WorkerResponse::from).collect(),
    })
}

pub async fn get_worker(workers: &dyn WorkerRepository, worker_id: &str) -> Result<WorkerDetailResponse, ApiError> {
    let id = parse_object_id(worker_id, "worker")?;
    let worker = workers
        .find_by_id(&id)
        .await
        .map_err(|e| ApiError::from_store("Server error while fetching worker", e))?
        .ok_or_else(|| ApiError::NotFound("Worker not found".to_string()))?;

    Ok(WorkerDetailResponse {
        success: true,
        worker: worker.into(),
    })
}

pub async fn update_worker(
    workers: &dyn WorkerRepository,
    worker_id: &str,
    patch: &WorkerPatch,
) -> Result<WorkerEnvelope, ApiError> {
    let id = parse_object_id(worker_id, "worker")?;

    if patch.is_empty() {
        return Err(ApiError::Validation("No updatable fields supplied".to_string()));
    }
    let blank = patch.blank_required_fields();
    if !blank.is_empty() {
        return Err(ApiError::Validation(format!(
            "Fields cannot be empty: {}",
            blank.join(", ")
        )));
    }

    let worker = workers
        .update(&id, patch)
        .await
        .map_err(|e| ApiError::from_store("Server error while updating worker", e))?
        .ok_or_else(|| ApiError::NotFound("Worker not found".to_string()))?;

    Ok(WorkerEnvelope {
        success: true,
        message: "Worker updated successfully".to_string(),
        worker: worker.into(),
    })
}

pub async fn delete_worker(workers: &dyn WorkerRepository, worker_id: &str) -> Result<MessageResponse, ApiError> {
    let id = parse_object_id(worker_id, "worker")?;
    let deleted = workers
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_store("Server error while deleting worker", e))?;

    if !deleted {
        return Err(ApiError::NotFound("Worker not found".to_string()));
    }

    Ok(MessageResponse {
        success: true,
        message: "Worker deleted successfully".to_string(),
    })
}
