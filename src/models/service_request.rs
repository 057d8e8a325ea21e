use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a service request.
///
/// Customers create requests as `New` (or `Assigned` when they pre-select a
/// worker); coordinators move them to any other value. `Completed` and
/// `Cancelled` have no dedicated route and are only reachable through the
/// coordinator update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum RequestStatus {
    New,
    Pending,
    Assigned,
    Confirmed,
    Rejected,
    Completed,
    Cancelled,
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::New
    }
}

impl RequestStatus {
    /// Statuses a coordinator still has to act on
    pub const ACTIONABLE: [RequestStatus; 3] =
        [RequestStatus::New, RequestStatus::Pending, RequestStatus::Assigned];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "New",
            RequestStatus::Pending => "Pending",
            RequestStatus::Assigned => "Assigned",
            RequestStatus::Confirmed => "Confirmed",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Completed => "Completed",
            RequestStatus::Cancelled => "Cancelled",
        }
    }

    /// Initial status for a freshly created request
    pub fn on_create(assigned_worker: Option<&str>) -> Self {
        match assigned_worker {
            Some(worker) if !worker.trim().is_empty() => RequestStatus::Assigned,
            _ => RequestStatus::New,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Contact {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Service request (collection `requests`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer: ObjectId,
    pub service_type: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub preferred_start: Option<i64>,
    #[serde(default)]
    pub preferred_end: Option<i64>,
    #[serde(default)]
    pub contact: Contact,
    pub urgency: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: RequestStatus,
    /// Worker display name, not a reference
    #[serde(default)]
    pub assigned_worker: Option<String>,
    /// Unix timestamp (ms)
    pub created_at: i64,
}

/// Coordinator-side mutation. Each supplied field is set as-is; there is
/// no transition table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestUpdate {
    pub status: Option<RequestStatus>,
    pub assigned_worker: Option<String>,
}

impl RequestUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assigned_worker.is_none()
    }
}

/// In-process counterpart of the `$set` built by the Mongo repository
#[cfg(test)]
impl RequestUpdate {
    pub fn apply(&self, request: &mut ServiceRequest) {
        if let Some(status) = self.status {
            request.status = status;
        }
        if let Some(worker) = &self.assigned_worker {
            request.assigned_worker = Some(worker.clone());
        }
    }
}

/// Request as rendered to the front-ends, with the customer's name resolved
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestResponse {
    pub id: String,
    pub customer: String,
    pub customer_display: String,
    pub service_type: String,
    pub description: String,
    pub location: String,
    pub preferred_start: Option<chrono::DateTime<chrono::Utc>>,
    pub preferred_end: Option<chrono::DateTime<chrono::Utc>>,
    pub contact: Contact,
    pub urgency: String,
    pub category: String,
    pub status: RequestStatus,
    pub assigned_worker: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ServiceRequestResponse {
    pub fn new(request: ServiceRequest, customer_display: String) -> Self {
        ServiceRequestResponse {
            id: request.id.map(|id| id.to_hex()).unwrap_or_default(),
            customer: request.customer.to_hex(),
            customer_display,
            service_type: request.service_type,
            description: request.description,
            location: request.location,
            preferred_start: request.preferred_start.and_then(chrono::DateTime::from_timestamp_millis),
            preferred_end: request.preferred_end.and_then(chrono::DateTime::from_timestamp_millis),
            contact: request.contact,
            urgency: request.urgency,
            category: request.category,
            status: request.status,
            assigned_worker: request.assigned_worker,
            created_at: chrono::DateTime::from_timestamp_millis(request.created_at),
        }
    }
}
