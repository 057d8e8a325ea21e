//! Fixtures shared by the unit and handler tests.

use actix_web::web;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::{Arc, Mutex};

use crate::database::memory::MemoryStore;
use crate::database::{RequestRepository, UserRepository};
use crate::models::{RequestStatus, RequestUpdate, Role, ServiceRequest, User};
use crate::services::auth_service::{generate_jwt, hash_password, TokenKeys};
use crate::services::handoff_service::HandoffLedger;
use crate::services::image_service::{ImageStore, StorageError, StoredImage};
use crate::state::AppState;
use crate::utils::error::{StoreError, StoreResult};
use crate::utils::multipart::{FormData, UploadedFile};

/// Lowest cost bcrypt accepts; keeps the suite fast
pub const TEST_BCRYPT_COST: u32 = 4;
pub const TEST_PASSWORD: &str = "secret123";
pub const BOUNDARY: &str = "handigo-test-boundary";

pub fn test_keys() -> TokenKeys {
    TokenKeys::new("test-secret", 7)
}

/// Records every upload and fails the ones whose filename is listed
#[derive(Default)]
pub struct FakeImageStore {
    fail: Vec<String>,
    folders: Mutex<Vec<String>>,
}

impl FakeImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(filenames: &[&str]) -> Self {
        FakeImageStore {
            fail: filenames.iter().map(|f| f.to_string()).collect(),
            folders: Mutex::new(Vec::new()),
        }
    }

    /// Folders of the uploads that succeeded, in order
    pub fn uploaded_folders(&self) -> Vec<String> {
        self.folders.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn upload(&self, file: &UploadedFile, folder: &str) -> Result<StoredImage, StorageError> {
        let name = file.filename.clone().unwrap_or_default();
        if self.fail.contains(&name) {
            return Err(StorageError::Rejected {
                status: 400,
                body: format!("cannot store {}", name),
            });
        }

        let mut folders = self.folders.lock().unwrap();
        folders.push(folder.to_string());
        Ok(StoredImage {
            secure_url: format!("https://res.cloudinary.com/test/{}/{}-{}", folder, folders.len(), name),
            public_id: format!("{}/{}", folder, name),
        })
    }
}

pub fn image(field: &str, filename: &str) -> UploadedFile {
    UploadedFile {
        field: field.to_string(),
        filename: Some(filename.to_string()),
        content_type: Some("image/jpeg".to_string()),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}

/// A complete worker form with `images` named `1.jpg`..`n.jpg`
pub fn worker_form(images: usize) -> FormData {
    let mut form = FormData::default();
    for (name, value) in [
        ("workerName", "Kamal Silva"),
        ("email", "kamal@example.com"),
        ("phone", "0771234567"),
        ("skill", "Plumbing"),
        ("location", "Colombo"),
        ("nationalId", "199012345678"),
    ] {
        form.text.insert(name.to_string(), value.to_string());
    }
    for i in 1..=images {
        form.files.push(image("images", &format!("{}.jpg", i)));
    }
    form
}

/// Account and request store whose every call fails like a dropped connection
pub struct BrokenStore;

fn unavailable<T>() -> StoreResult<T> {
    Err(StoreError::Backend("connection reset by peer".to_string()))
}

#[async_trait]
impl UserRepository for BrokenStore {
    async fn insert(&self, _user: User) -> StoreResult<User> {
        unavailable()
    }

    async fn find_by_id(&self, _id: &ObjectId) -> StoreResult<Option<User>> {
        unavailable()
    }

    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
        unavailable()
    }

    async fn find_by_ids(&self, _ids: &[ObjectId]) -> StoreResult<Vec<User>> {
        unavailable()
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        unavailable()
    }

    async fn set_role(&self, _id: &ObjectId, _role: Role) -> StoreResult<Option<User>> {
        unavailable()
    }
}

#[async_trait]
impl RequestRepository for BrokenStore {
    async fn insert(&self, _request: ServiceRequest) -> StoreResult<ServiceRequest> {
        unavailable()
    }

    async fn list_all(&self) -> StoreResult<Vec<ServiceRequest>> {
        unavailable()
    }

    async fn list_by_customer(&self, _customer: &ObjectId) -> StoreResult<Vec<ServiceRequest>> {
        unavailable()
    }

    async fn list_by_status(&self, _statuses: &[RequestStatus]) -> StoreResult<Vec<ServiceRequest>> {
        unavailable()
    }

    async fn update(&self, _id: &ObjectId, _update: &RequestUpdate) -> StoreResult<Option<ServiceRequest>> {
        unavailable()
    }
}

/// Like `test_state`, but accounts and requests live in a `BrokenStore`
pub fn broken_store_state() -> web::Data<AppState> {
    web::Data::new(AppState {
        users: Arc::new(BrokenStore),
        workers: Arc::new(MemoryStore::new()),
        requests: Arc::new(BrokenStore),
        images: Arc::new(FakeImageStore::new()),
        keys: test_keys(),
        bcrypt_cost: TEST_BCRYPT_COST,
        handoff_ttl_secs: 60,
        allowed_origins: vec!["https://app.handigo.lk".to_string()],
        handoffs: HandoffLedger::new(),
        database: None,
    })
}

pub fn test_state(store: Arc<MemoryStore>, images: Arc<FakeImageStore>) -> web::Data<AppState> {
    web::Data::new(AppState {
        users: store.clone(),
        workers: store.clone(),
        requests: store,
        images,
        keys: test_keys(),
        bcrypt_cost: TEST_BCRYPT_COST,
        handoff_ttl_secs: 60,
        allowed_origins: vec!["https://app.handigo.lk".to_string()],
        handoffs: HandoffLedger::new(),
        database: None,
    })
}

/// Stores a user with [`TEST_PASSWORD`] and returns it with a session token
pub async fn seed_user(store: &MemoryStore, full_name: &str, email: &str, role: Role) -> (User, String) {
    let hash = hash_password(TEST_PASSWORD, TEST_BCRYPT_COST).unwrap();
    let user = UserRepository::insert(store, User::new(full_name, email, hash, role))
        .await
        .unwrap();
    let token = generate_jwt(&test_keys(), &user.id_hex(), role).unwrap();
    (user, token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Hand-built `multipart/form-data` body: text fields then `(field, filename)` files
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str)]) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, filename) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[0xFF, 0xD8, 0xFF]);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
