pub mod error;
pub mod multipart;

pub use error::*;
