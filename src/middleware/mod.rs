pub mod auth;
pub mod metrics;

pub use auth::RequireAuth;
pub use metrics::RequestMetrics;
