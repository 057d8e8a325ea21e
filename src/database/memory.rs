//! In-process repositories backing the handler tests.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Mutex;

use super::{RequestRepository, UserRepository, WorkerRepository};
use crate::models::{RequestStatus, RequestUpdate, Role, ServiceRequest, User, Worker, WorkerPatch};
use crate::utils::error::{StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    workers: Mutex<Vec<Worker>>,
    requests: Mutex<Vec<ServiceRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.lock().unwrap().len()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn newest_first(mut requests: Vec<ServiceRequest>) -> Vec<ServiceRequest> {
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, mut user: User) -> StoreResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(user.email));
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email.trim()).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> StoreResult<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.id.map(|id| ids.contains(&id)).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn set_role(&self, id: &ObjectId, role: Role) -> StoreResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id.as_ref() == Some(id)).map(|user| {
            user.role = role;
            user.clone()
        }))
    }
}

#[async_trait]
impl WorkerRepository for MemoryStore {
    async fn insert(&self, mut worker: Worker) -> StoreResult<Worker> {
        worker.id = Some(ObjectId::new());
        self.workers.lock().unwrap().push(worker.clone());
        Ok(worker)
    }

    async fn list(&self) -> StoreResult<Vec<Worker>> {
        let mut workers = self.workers.lock().unwrap().clone();
        workers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(workers)
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<Worker>> {
        let workers = self.workers.lock().unwrap();
        Ok(workers.iter().find(|w| w.id.as_ref() == Some(id)).cloned())
    }

    async fn update(&self, id: &ObjectId, patch: &WorkerPatch) -> StoreResult<Option<Worker>> {
        let mut workers = self.workers.lock().unwrap();
        Ok(workers.iter_mut().find(|w| w.id.as_ref() == Some(id)).map(|worker| {
            patch.apply(worker);
            worker.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut workers = self.workers.lock().unwrap();
        let before = workers.len();
        workers.retain(|w| w.id.as_ref() != Some(id));
        Ok(workers.len() < before)
    }
}

#[async_trait]
impl RequestRepository for MemoryStore {
    async fn insert(&self, mut request: ServiceRequest) -> StoreResult<ServiceRequest> {
        request.id = Some(ObjectId::new());
        self.requests.lock().unwrap().push(request.clone());
        Ok(request)
    }

    async fn list_all(&self) -> StoreResult<Vec<ServiceRequest>> {
        Ok(Self::newest_first(self.requests.lock().unwrap().clone()))
    }

    async fn list_by_customer(&self, customer: &ObjectId) -> StoreResult<Vec<ServiceRequest>> {
        let requests = self.requests.lock().unwrap();
        Ok(Self::newest_first(
            requests.iter().filter(|r| &r.customer == customer).cloned().collect(),
        ))
    }

    async fn list_by_status(&self, statuses: &[RequestStatus]) -> StoreResult<Vec<ServiceRequest>> {
        let requests = self.requests.lock().unwrap();
        Ok(Self::newest_first(
            requests.iter().filter(|r| statuses.contains(&r.status)).cloned().collect(),
        ))
    }

    async fn update(&self, id: &ObjectId, update: &RequestUpdate) -> StoreResult<Option<ServiceRequest>> {
        let mut requests = self.requests.lock().unwrap();
        Ok(requests.iter_mut().find(|r| r.id.as_ref() == Some(id)).map(|request| {
            update.apply(request);
            request.clone()
        }))
    }
}
