//! HTTP API module.
//!
//! REST endpoints for users, roles, personal details and announcements.

mod error;
mod extract;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extract::ApiJson;
pub use routes::{create_router, origin_allowed};
pub use state::{AppState, CorsSettings};
