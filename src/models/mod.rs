pub mod service_request;
pub mod user;
pub mod worker;

pub use service_request::*;
pub use user::*;
pub use worker::*;
