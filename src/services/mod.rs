pub mod auth_service;
pub mod handoff_service;
pub mod image_service;
pub mod request_service;
pub mod worker_service;
