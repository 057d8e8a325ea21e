use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Availability of a field worker. Any value may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum WorkerStatus {
    Available,
    #[serde(rename = "On Job")]
    OnJob,
    Unavailable,
}

impl Default for WorkerStatus {
    fn default() -> Self {
        WorkerStatus::Available
    }
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Available => "Available",
            WorkerStatus::OnJob => "On Job",
            WorkerStatus::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Available" => Ok(WorkerStatus::Available),
            "On Job" => Ok(WorkerStatus::OnJob),
            "Unavailable" => Ok(WorkerStatus::Unavailable),
            other => Err(format!(
                "Invalid availability status '{}'. Expected one of: Available, On Job, Unavailable",
                other
            )),
        }
    }
}

/// Field worker profile (collection `workers`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub contact_number: String,
    pub specialty: String,
    pub area: String,
    pub national_id: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub status: WorkerStatus,
    /// Unix timestamp (ms)
    pub joined_at: i64,
}

/// Allow-listed worker update. Anything outside these fields is rejected
/// at deserialization, so `nationalId` and `imageUrls` can't be overwritten.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub specialty: Option<String>,
    pub area: Option<String>,
    pub status: Option<WorkerStatus>,
}

impl WorkerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.contact_number.is_none()
            && self.specialty.is_none()
            && self.area.is_none()
            && self.status.is_none()
    }

    /// Required text fields can't be blanked out
    pub fn blank_required_fields(&self) -> Vec<&'static str> {
        let mut blank = Vec::new();
        let checks = [
            ("name", &self.name),
            ("contactNumber", &self.contact_number),
            ("specialty", &self.specialty),
            ("area", &self.area),
        ];
        for (field, value) in checks {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                blank.push(field);
            }
        }
        blank
    }
}

/// In-process counterpart of `database::workers::set_document`
#[cfg(test)]
impl WorkerPatch {
    pub fn apply(&self, worker: &mut Worker) {
        if let Some(name) = &self.name {
            worker.name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            worker.email = email.trim().to_string();
        }
        if let Some(contact_number) = &self.contact_number {
            worker.contact_number = contact_number.trim().to_string();
        }
        if let Some(specialty) = &self.specialty {
            worker.specialty = specialty.trim().to_string();
        }
        if let Some(area) = &self.area {
            worker.area = area.trim().to_string();
        }
        if let Some(status) = self.status {
            worker.status = status;
        }
    }
}

/// Response de worker
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub specialty: String,
    pub area: String,
    pub national_id: String,
    pub image_urls: Vec<String>,
    pub status: WorkerStatus,
    pub joined_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Worker> for WorkerResponse {
    fn from(worker: Worker) -> Self {
        WorkerResponse {
            id: worker.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: worker.name,
            email: worker.email,
            contact_number: worker.contact_number,
            specialty: worker.specialty,
            area: worker.area,
            national_id: worker.national_id,
            image_urls: worker.image_urls,
            status: worker.status,
            joined_at: chrono::DateTime::from_timestamp_millis(worker.joined_at),
        }
    }
}
