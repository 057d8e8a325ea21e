use std::sync::Arc;

use crate::config::Config;
use crate::database::{MongoDB, RequestRepository, UserRepository, WorkerRepository};
use crate::services::auth_service::TokenKeys;
use crate::services::handoff_service::HandoffLedger;
use crate::services::image_service::ImageStore;

/// Shared by every handler through `web::Data<AppState>`
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub workers: Arc<dyn WorkerRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub images: Arc<dyn ImageStore>,
    pub keys: TokenKeys,
    pub bcrypt_cost: u32,
    pub handoff_ttl_secs: i64,
    pub allowed_origins: Vec<String>,
    pub handoffs: HandoffLedger,
    /// Absent when running against in-process stores
    pub database: Option<MongoDB>,
}

impl AppState {
    pub fn new(config: &Config, db: MongoDB, images: Arc<dyn ImageStore>) -> Self {
        let store = Arc::new(db.clone());

        AppState {
            users: store.clone(),
            workers: store.clone(),
            requests: store,
            images,
            keys: TokenKeys::new(config.jwt_secret.clone(), config.jwt_expires_days),
            bcrypt_cost: config.bcrypt_cost,
            handoff_ttl_secs: config.handoff_ttl_secs,
            allowed_origins: config.allowed_origins.clone(),
            handoffs: HandoffLedger::new(),
            database: Some(db),
        }
    }
}
