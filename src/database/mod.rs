pub mod requests;
pub mod users;
pub mod workers;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::{Client, Collection, Database};
use std::error::Error;

use crate::models::{RequestStatus, RequestUpdate, Role, ServiceRequest, User, Worker, WorkerPatch};
use crate::utils::error::StoreResult;

pub const USERS: &str = "users";
pub const WORKERS: &str = "workers";
pub const REQUESTS: &str = "requests";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Database name from the URI path, e.g. mongodb://host/handigo?retryWrites=true
        let db_name = database_name_from_uri(uri);
        let db = client.database(&db_name);

        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the handlers rely on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // Unique email keeps concurrent registrations from creating twins
        let users = self.collection::<mongodb::bson::Document>(USERS);
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::warn!("   ⚠️  Could not create users(email) index: {}", e),
        }

        let requests = self.collection::<mongodb::bson::Document>(REQUESTS);
        for keys in [
            doc! { "customer": 1, "createdAt": -1 },
            doc! { "status": 1, "createdAt": -1 },
        ] {
            let description = keys.keys().cloned().collect::<Vec<_>>().join(", ");
            match requests.create_index(IndexModel::builder().keys(keys).build()).await {
                Ok(_) => log::info!("   ✅ Index created: requests({})", description),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        let workers = self.collection::<mongodb::bson::Document>(WORKERS);
        match workers
            .create_index(IndexModel::builder().keys(doc! { "name": 1 }).build())
            .await
        {
            Ok(_) => log::info!("   ✅ Index created: workers(name)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub async fn ping(&self) -> bool {
        self.db
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await
            .is_ok()
    }
}

pub fn database_name_from_uri(uri: &str) -> String {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or_default())
        .filter(|name| !name.is_empty())
        .unwrap_or("handigo")
        .to_string()
}

/// Accounts. Shared by every surface so there is exactly one `User` shape.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> StoreResult<User>;
    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> StoreResult<Vec<User>>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn set_role(&self, id: &ObjectId, role: Role) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait WorkerRepository: Send + Sync {
    async fn insert(&self, worker: Worker) -> StoreResult<Worker>;
    /// All workers ordered by name
    async fn list(&self) -> StoreResult<Vec<Worker>>;
    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Worker>>;
    async fn update(&self, id: &ObjectId, patch: &WorkerPatch) -> StoreResult<Option<Worker>>;
    async fn delete(&self, id: &ObjectId) -> StoreResult<bool>;
}

/// Listing methods return newest first
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn insert(&self, request: ServiceRequest) -> StoreResult<ServiceRequest>;
    async fn list_all(&self) -> StoreResult<Vec<ServiceRequest>>;
    async fn list_by_customer(&self, customer: &ObjectId) -> StoreResult<Vec<ServiceRequest>>;
    async fn list_by_status(&self, statuses: &[RequestStatus]) -> StoreResult<Vec<ServiceRequest>>;
    async fn update(&self, id: &ObjectId, update: &RequestUpdate) -> StoreResult<Option<ServiceRequest>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/handigo_dev"), "handigo_dev");
        assert_eq!(
            database_name_from_uri("mongodb+srv://u:p@cluster0.x.mongodb.net/app?retryWrites=true"),
            "app"
        );
        assert_eq!(database_name_from_uri("mongodb://localhost:27017"), "handigo");
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/?w=majority"), "handigo");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();

        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/handigo_test".to_string());
        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
        assert!(db.unwrap().ping().await);
    }
}
