//! HTTP inbound adapter exposing REST endpoints.

pub mod api_key;
pub mod error;
pub mod feedback;
pub mod health;
pub mod rate_limit;
pub mod service_info;
pub mod state;
pub mod validation;

pub use error::{ApiError, ApiResult};
