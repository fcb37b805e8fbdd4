//! Middleware components for all services.

pub mod auth;
pub mod request_id;

// Re-export commonly used types
pub use auth::{auth_middleware, AdminUser, CurrentUser, SessionStore};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
