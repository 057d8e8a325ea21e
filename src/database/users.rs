use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;

use super::{MongoDB, UserRepository, USERS};
use crate::models::{Role, User};
use crate::utils::error::StoreResult;

#[async_trait]
impl UserRepository for MongoDB {
    async fn insert(&self, mut user: User) -> StoreResult<User> {
        let result = self.collection::<User>(USERS).insert_one(&user).await?;
        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>> {
        Ok(self.collection::<User>(USERS).find_one(doc! { "_id": *id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .collection::<User>(USERS)
            .find_one(doc! { "email": email.trim() })
            .await?)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection::<User>(USERS)
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let cursor = self.collection::<User>(USERS).find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn set_role(&self, id: &ObjectId, role: Role) -> StoreResult<Option<User>> {
        let now = chrono::Utc::now().timestamp_millis();
        Ok(self
            .collection::<User>(USERS)
            .find_one_and_update(
                doc! { "_id": *id },
                doc! { "$set": { "role": role.as_str(), "updatedAt": now } },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }
}
