use chrono::{NaiveDate, TimeZone, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::database::{RequestRepository, UserRepository};
use crate::models::{Contact, RequestStatus, RequestUpdate, ServiceRequest, ServiceRequestResponse};
use crate::services::auth_service::parse_object_id;
use crate::utils::error::ApiError;

/// Customer form body. `gigType` is what the customer app sends;
/// `serviceType` is accepted as well.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub gig_type: Option<String>,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub preferred_start: Option<String>,
    pub preferred_end: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub urgency: Option<String>,
    pub category: Option<String>,
    pub assigned_worker: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestBody {
    pub status: Option<String>,
    pub assigned_worker: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RequestEnvelope {
    pub success: bool,
    pub message: String,
    pub request: ServiceRequestResponse,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RequestListResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub requests: Vec<ServiceRequestResponse>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC); returns Unix ms
pub fn parse_preferred_date(field: &str, value: &str) -> Result<i64, ApiError> {
    let value = value.trim();

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp_millis())
        .ok_or_else(|| ApiError::Validation(format!("Invalid date for {}: '{}'", field, value)))
}

fn optional_date(field: &str, value: &Option<String>) -> Result<Option<i64>, ApiError> {
    non_empty(value)
        .map(|v| parse_preferred_date(field, &v))
        .transpose()
}

pub fn parse_status(value: &str) -> Result<RequestStatus, ApiError> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_string())).map_err(|_| {
        ApiError::Validation(format!(
            "Invalid status '{}'. Expected one of: New, Pending, Assigned, Confirmed, Rejected, Completed, Cancelled",
            value
        ))
    })
}

/// Builds the document for a customer's new request.
/// Status is `Assigned` when a worker was pre-selected, `New` otherwise.
pub fn build_request(customer: ObjectId, body: &CreateRequestBody) -> Result<ServiceRequest, ApiError> {
    let service_type = non_empty(&body.gig_type).or_else(|| non_empty(&body.service_type));
    let description = non_empty(&body.description);
    let location = non_empty(&body.location);

    let mut missing = Vec::new();
    if service_type.is_none() {
        missing.push("serviceType");
    }
    if description.is_none() {
        missing.push("description");
    }
    if location.is_none() {
        missing.push("location");
    }
    if !missing.is_empty() {
        return Err(ApiError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let assigned_worker = non_empty(&body.assigned_worker);

    Ok(ServiceRequest {
        id: None,
        customer,
        service_type: service_type.unwrap_or_default(),
        description: description.unwrap_or_default(),
        location: location.unwrap_or_default(),
        preferred_start: optional_date("preferredStart", &body.preferred_start)?,
        preferred_end: optional_date("preferredEnd", &body.preferred_end)?,
        contact: Contact {
            email: non_empty(&body.email).unwrap_or_default(),
            phone: non_empty(&body.phone).unwrap_or_default(),
        },
        urgency: non_empty(&body.urgency).unwrap_or_else(|| "Normal".to_string()),
        category: non_empty(&body.category).unwrap_or_default(),
        status: RequestStatus::on_create(assigned_worker.as_deref()),
        assigned_worker,
        created_at: Utc::now().timestamp_millis(),
    })
}

/// Empty strings count as "not supplied", like the customer app sends them
pub fn build_update(body: &UpdateRequestBody) -> Result<RequestUpdate, ApiError> {
    let status = non_empty(&body.status).map(|s| parse_status(&s)).transpose()?;

    Ok(RequestUpdate {
        status,
        assigned_worker: non_empty(&body.assigned_worker),
    })
}

/// Resolves each request's customer name with one batched lookup.
/// Falls back to the raw id when the user can't be found or the lookup
/// itself fails.
pub async fn with_customer_display(
    users: &dyn UserRepository,
    requests: Vec<ServiceRequest>,
) -> Vec<ServiceRequestResponse> {
    let mut ids: Vec<ObjectId> = requests.iter().map(|r| r.customer).collect();
    ids.sort();
    ids.dedup();

    let names: HashMap<ObjectId, String> = match users.find_by_ids(&ids).await {
        Ok(found) => found
            .into_iter()
            .filter_map(|u| u.id.map(|id| (id, u.full_name)))
            .filter(|(_, name)| !name.trim().is_empty())
            .collect(),
        Err(e) => {
            log::warn!("⚠️  Customer lookup failed, showing ids instead: {}", e);
            HashMap::new()
        }
    };

    requests
        .into_iter()
        .map(|request| {
            let display = names
                .get(&request.customer)
                .cloned()
                .unwrap_or_else(|| request.customer.to_hex());
            ServiceRequestResponse::new(request, display)
        })
        .collect()
}

pub async fn create_request(
    requests: &dyn RequestRepository,
    users: &dyn UserRepository,
    customer_id: &str,
    body: &CreateRequestBody,
) -> Result<RequestEnvelope, ApiError> {
    let customer = parse_object_id(customer_id, "customer")?;
    let request = build_request(customer, body)?;

    let saved = requests
        .insert(request)
        .await
        .map_err(|e| ApiError::from_store("Server error during request creation", e))?;

    let mut rendered = with_customer_display(users, vec![saved]).await;
    let request = rendered
        .pop()
        .ok_or_else(|| ApiError::internal("Server error during request creation", "empty render"))?;

    Ok(RequestEnvelope {
        success: true,
        message: "Service request created successfully".to_string(),
        request,
    })
}

pub async fn list_all(
    requests: &dyn RequestRepository,
    users: &dyn UserRepository,
) -> Result<RequestListResponse, ApiError> {
    let all = requests
        .list_all()
        .await
        .map_err(|e| ApiError::from_store("Server error fetching all requests", e))?;
    let rendered = with_customer_display(users, all).await;

    Ok(RequestListResponse {
        success: true,
        count: Some(rendered.len()),
        requests: rendered,
    })
}

pub async fn list_for_customer(
    requests: &dyn RequestRepository,
    users: &dyn UserRepository,
    customer_id: &str,
) -> Result<RequestListResponse, ApiError> {
    let customer = parse_object_id(customer_id, "customer")?;
    let own = requests
        .list_by_customer(&customer)
        .await
        .map_err(|e| ApiError::from_store("Server error getting customer requests", e))?;

    Ok(RequestListResponse {
        success: true,
        count: None,
        requests: with_customer_display(users, own).await,
    })
}

/// Requests a coordinator still has to act on
pub async fn list_actionable(
    requests: &dyn RequestRepository,
    users: &dyn UserRepository,
) -> Result<RequestListResponse, ApiError> {
    let open = requests
        .list_by_status(&RequestStatus::ACTIONABLE)
        .await
        .map_err(|e| ApiError::from_store("Server error getting coordinator requests", e))?;

    Ok(RequestListResponse {
        success: true,
        count: None,
        requests: with_customer_display(users, open).await,
    })
}

/// Sets status and/or assigned worker. Any status may follow any other.
pub async fn update_request(
    requests: &dyn RequestRepository,
    users: &dyn UserRepository,
    request_id: &str,
    body: &UpdateRequestBody,
) -> Result<RequestEnvelope, ApiError> {
    let id = parse_object_id(request_id, "request")?;
    let update = build_update(body)?;

    let updated = requests
        .update(&id, &update)
        .await
        .map_err(|e| ApiError::from_store("Server error updating request status", e))?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    let mut rendered = with_customer_display(users, vec![updated]).await;
    let request = rendered
        .pop()
        .ok_or_else(|| ApiError::internal("Server error updating request status", "empty render"))?;

    Ok(RequestEnvelope {
        success: true,
        message: "Request updated successfully".to_string(),
        request,
    })
}
