use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;

use super::{MongoDB, RequestRepository, REQUESTS};
use crate::models::{RequestStatus, RequestUpdate, ServiceRequest};
use crate::utils::error::StoreResult;

impl MongoDB {
    async fn find_requests(&self, filter: Document) -> StoreResult<Vec<ServiceRequest>> {
        let cursor = self
            .collection::<ServiceRequest>(REQUESTS)
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl RequestRepository for MongoDB {
    async fn insert(&self, mut request: ServiceRequest) -> StoreResult<ServiceRequest> {
        let result = self
            .collection::<ServiceRequest>(REQUESTS)
            .insert_one(&request)
            .await?;
        request.id = result.inserted_id.as_object_id();
        Ok(request)
    }

    async fn list_all(&self) -> StoreResult<Vec<ServiceRequest>> {
        self.find_requests(doc! {}).await
    }

    async fn list_by_customer(&self, customer: &ObjectId) -> StoreResult<Vec<ServiceRequest>> {
        self.find_requests(doc! { "customer": *customer }).await
    }

    async fn list_by_status(&self, statuses: &[RequestStatus]) -> StoreResult<Vec<ServiceRequest>> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        self.find_requests(doc! { "status": { "$in": statuses } }).await
    }

    async fn update(&self, id: &ObjectId, update: &RequestUpdate) -> StoreResult<Option<ServiceRequest>> {
        let collection = self.collection::<ServiceRequest>(REQUESTS);
        if update.is_empty() {
            return Ok(collection.find_one(doc! { "_id": *id }).await?);
        }

        let mut set = Document::new();
        if let Some(status) = update.status {
            set.insert("status", status.as_str());
        }
        if let Some(worker) = &update.assigned_worker {
            set.insert("assignedWorker", worker.as_str());
        }

        // Last write wins per field; there is no version check
        Ok(collection
            .find_one_and_update(doc! { "_id": *id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }
}
