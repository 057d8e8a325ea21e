use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;

use super::{MongoDB, WorkerRepository, WORKERS};
use crate::models::{Worker, WorkerPatch};
use crate::utils::error::StoreResult;

/// `$set` body for an allow-listed patch
fn set_document(patch: &WorkerPatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = &patch.name {
        set.insert("name", name.trim());
    }
    if let Some(email) = &patch.email {
        set.insert("email", email.trim());
    }
    if let Some(contact_number) = &patch.contact_number {
        set.insert("contactNumber", contact_number.trim());
    }
    if let Some(specialty) = &patch.specialty {
        set.insert("specialty", specialty.trim());
    }
    if let Some(area) = &patch.area {
        set.insert("area", area.trim());
    }
    if let Some(status) = patch.status {
        set.insert("status", status.as_str());
    }
    set
}

#[async_trait]
impl WorkerRepository for MongoDB {
    async fn insert(&self, mut worker: Worker) -> StoreResult<Worker> {
        let result = self.collection::<Worker>(WORKERS).insert_one(&worker).await?;
        worker.id = result.inserted_id.as_object_id();
        Ok(worker)
    }

    async fn list(&self) -> StoreResult<Vec<Worker>> {
        let cursor = self
            .collection::<Worker>(WORKERS)
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Worker>> {
        Ok(self.collection::<Worker>(WORKERS).find_one(doc! { "_id": *id }).await?)
    }

    async fn update(&self, id: &ObjectId, patch: &WorkerPatch) -> StoreResult<Option<Worker>> {
        Ok(self
            .collection::<Worker>(WORKERS)
            .find_one_and_update(doc! { "_id": *id }, doc! { "$set": set_document(patch) })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self
            .collection::<Worker>(WORKERS)
            .delete_one(doc! { "_id": *id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}
